//! # Bridge Configuration
//!
//! TOML file describing the duel config and the relay convention.
//!
//! ```toml
//! [duel]
//! generation = 3
//! seed = [1, 2, 3, 4]
//! flags = 190464        # MR5
//! enable_unsafe_libraries = false
//!
//! [duel.team1]
//! starting_lp = 8000
//! starting_draw_count = 5
//! draw_count_per_turn = 1
//!
//! [relay]
//! convention = "suspending"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{BridgeError, BridgeResult};
use crate::options::{
    AnyDuelConfig, DuelConfig, DuelConfigV1, DuelConfigV2, OptionsGeneration, PlayerConfig,
};
use crate::types::DuelMode;

/// Environment variable naming a config file for [`BridgeConfig::load`].
pub const CONFIG_ENV: &str = "OCGBRIDGE_CONFIG";

/// Top-level configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Duel settings.
    pub duel: DuelSection,
    /// Relay settings.
    pub relay: RelaySection,
}

/// `[duel]`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DuelSection {
    /// Options generation to build (1, 2 or 3).
    pub generation: u32,
    /// Seed words; missing words are zero.
    pub seed: Vec<u64>,
    /// Duel mode flags.
    pub flags: u64,
    /// First team.
    pub team1: TeamSection,
    /// Second team.
    pub team2: TeamSection,
    /// Only honored by generation 3.
    pub enable_unsafe_libraries: bool,
}

impl Default for DuelSection {
    fn default() -> Self {
        Self {
            generation: OptionsGeneration::V3.tag(),
            seed: vec![0],
            flags: DuelMode::MODE_MR5,
            team1: TeamSection::default(),
            team2: TeamSection::default(),
            enable_unsafe_libraries: false,
        }
    }
}

/// `[duel.team1]` / `[duel.team2]`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamSection {
    /// Starting life points.
    pub starting_lp: u32,
    /// Opening hand size.
    pub starting_draw_count: u32,
    /// Cards per draw phase.
    pub draw_count_per_turn: u32,
}

impl Default for TeamSection {
    fn default() -> Self {
        let standard = PlayerConfig::STANDARD;
        Self {
            starting_lp: standard.starting_lp,
            starting_draw_count: standard.starting_draw_count,
            draw_count_per_turn: standard.draw_count_per_turn,
        }
    }
}

impl From<TeamSection> for PlayerConfig {
    fn from(team: TeamSection) -> Self {
        Self {
            starting_lp: team.starting_lp,
            starting_draw_count: team.starting_draw_count,
            draw_count_per_turn: team.draw_count_per_turn,
        }
    }
}

/// `[relay]`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelaySection {
    /// Callback convention.
    pub convention: Convention,
}

/// How host handlers are called.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Convention {
    /// Handlers return directly.
    #[default]
    Blocking,
    /// Handlers are futures.
    Suspending,
}

impl BridgeConfig {
    /// Parses TOML text.
    ///
    /// # Errors
    ///
    /// [`BridgeError::InvalidConfig`] on a parse error.
    pub fn from_toml_str(text: &str) -> BridgeResult<Self> {
        toml::from_str(text).map_err(|e| BridgeError::InvalidConfig(e.to_string()))
    }

    /// Reads and parses a TOML file.
    ///
    /// # Errors
    ///
    /// [`BridgeError::InvalidConfig`] if the file cannot be read or parsed.
    pub fn from_path(path: impl AsRef<Path>) -> BridgeResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| BridgeError::InvalidConfig(format!("{}: {}", path.display(), e)))?;
        let config = Self::from_toml_str(&text)?;
        tracing::info!("Loaded bridge config from {}", path.display());
        Ok(config)
    }

    /// Loads the file named by [`CONFIG_ENV`], or defaults when unset.
    ///
    /// # Errors
    ///
    /// [`BridgeError::InvalidConfig`] if the named file is unreadable or
    /// malformed.
    pub fn load() -> BridgeResult<Self> {
        match std::env::var(CONFIG_ENV) {
            Ok(path) => Self::from_path(path),
            Err(_) => {
                tracing::debug!("{} not set, using built-in defaults", CONFIG_ENV);
                Ok(Self::default())
            }
        }
    }
}

impl DuelSection {
    /// Builds the options record of the configured generation.
    ///
    /// # Errors
    ///
    /// [`BridgeError::InvalidConfig`] for an unknown generation or a value
    /// the generation cannot hold.
    pub fn to_any_config(&self) -> BridgeResult<AnyDuelConfig> {
        let generation = OptionsGeneration::from_tag(self.generation)
            .map_err(|e| BridgeError::InvalidConfig(e.to_string()))?;
        let team1 = PlayerConfig::from(self.team1);
        let team2 = PlayerConfig::from(self.team2);

        let words = match generation {
            OptionsGeneration::V1 | OptionsGeneration::V2 => 1,
            OptionsGeneration::V3 => 4,
        };
        if self.seed.len() > words {
            return Err(BridgeError::InvalidConfig(format!(
                "generation {} takes {} seed word(s), got {}",
                self.generation,
                words,
                self.seed.len()
            )));
        }
        let first = self.seed.first().copied().unwrap_or(0);

        Ok(match generation {
            OptionsGeneration::V1 => {
                let narrow = |value: u64, field: &str| {
                    u32::try_from(value).map_err(|_| {
                        BridgeError::InvalidConfig(format!("{field} does not fit generation 1"))
                    })
                };
                AnyDuelConfig::V1(DuelConfigV1 {
                    seed: narrow(first, "seed")?,
                    flags: narrow(self.flags, "flags")?,
                    team1,
                    team2,
                })
            }
            OptionsGeneration::V2 => AnyDuelConfig::V2(DuelConfigV2 {
                seed: first,
                flags: self.flags,
                team1,
                team2,
            }),
            OptionsGeneration::V3 => {
                let mut seed = [0u64; 4];
                seed[..self.seed.len()].copy_from_slice(&self.seed);
                AnyDuelConfig::V3(
                    DuelConfig::new(seed, self.flags, team1, team2)
                        .with_unsafe_libraries(self.enable_unsafe_libraries),
                )
            }
        })
    }
}
