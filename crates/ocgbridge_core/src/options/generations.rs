//! Per-generation configuration records and their normalization.

use bytemuck::{Pod, Zeroable};

use crate::error::{BridgeError, BridgeResult};

/// One team's starting parameters. Same layout in every generation.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct PlayerConfig {
    /// Starting life points.
    pub starting_lp: u32,
    /// Cards drawn before the first turn.
    pub starting_draw_count: u32,
    /// Cards drawn each draw phase.
    pub draw_count_per_turn: u32,
}

impl PlayerConfig {
    /// 8000 LP, five-card opening hand, one draw per turn.
    pub const STANDARD: Self = Self {
        starting_lp: 8000,
        starting_draw_count: 5,
        draw_count_per_turn: 1,
    };
}

/// First generation: 32-bit seed and flags.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct DuelConfigV1 {
    /// Random seed.
    pub seed: u32,
    /// Duel mode flags (low 32 bits).
    pub flags: u32,
    /// First team.
    pub team1: PlayerConfig,
    /// Second team.
    pub team2: PlayerConfig,
}

/// Second generation: 64-bit seed and flags.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct DuelConfigV2 {
    /// Random seed.
    pub seed: u64,
    /// Duel mode flags.
    pub flags: u64,
    /// First team.
    pub team1: PlayerConfig,
    /// Second team.
    pub team2: PlayerConfig,
}

/// Canonical (third generation) configuration.
///
/// Padding is an explicit zeroed field so two equal configs are equal
/// byte for byte.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct DuelConfig {
    /// 256-bit seed as four words.
    pub seed: [u64; 4],
    /// Duel mode flags.
    pub flags: u64,
    /// First team.
    pub team1: PlayerConfig,
    /// Second team.
    pub team2: PlayerConfig,
    /// Non-zero lets scripts load unsafe Lua libraries.
    pub enable_unsafe_libraries: u8,
    _padding: [u8; 7],
}

impl DuelConfig {
    /// Builds a canonical config with the unsafe-libraries flag off.
    #[must_use]
    pub const fn new(seed: [u64; 4], flags: u64, team1: PlayerConfig, team2: PlayerConfig) -> Self {
        Self {
            seed,
            flags,
            team1,
            team2,
            enable_unsafe_libraries: 0,
            _padding: [0; 7],
        }
    }

    /// Sets the unsafe-libraries flag.
    #[must_use]
    pub const fn with_unsafe_libraries(mut self, enabled: bool) -> Self {
        self.enable_unsafe_libraries = enabled as u8;
        self
    }

    /// The raw bytes of this config.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}

/// Generation tag of an options record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum OptionsGeneration {
    /// 32-bit seed.
    V1 = 1,
    /// 64-bit seed.
    V2 = 2,
    /// 4x64-bit seed plus unsafe-libraries flag.
    V3 = 3,
}

impl OptionsGeneration {
    /// Parses a raw tag.
    ///
    /// # Errors
    ///
    /// [`BridgeError::UnknownGeneration`] for anything but 1, 2 or 3.
    pub const fn from_tag(tag: u32) -> BridgeResult<Self> {
        match tag {
            1 => Ok(Self::V1),
            2 => Ok(Self::V2),
            3 => Ok(Self::V3),
            other => Err(BridgeError::UnknownGeneration(other)),
        }
    }

    /// Raw tag value.
    #[must_use]
    pub const fn tag(self) -> u32 {
        self as u32
    }

    /// Size in bytes of this generation's config record.
    #[must_use]
    pub const fn record_size(self) -> usize {
        match self {
            Self::V1 => std::mem::size_of::<DuelConfigV1>(),
            Self::V2 => std::mem::size_of::<DuelConfigV2>(),
            Self::V3 => std::mem::size_of::<DuelConfig>(),
        }
    }
}

/// A config record of any supported generation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnyDuelConfig {
    /// First generation.
    V1(DuelConfigV1),
    /// Second generation.
    V2(DuelConfigV2),
    /// Canonical.
    V3(DuelConfig),
}

impl AnyDuelConfig {
    /// Decodes a raw record of the given generation.
    ///
    /// # Errors
    ///
    /// [`BridgeError::UnknownGeneration`] for an unknown tag,
    /// [`BridgeError::MalformedOptions`] when `bytes` is not exactly the
    /// generation's record size.
    pub fn decode(tag: u32, bytes: &[u8]) -> BridgeResult<Self> {
        let generation = OptionsGeneration::from_tag(tag)?;
        let expected = generation.record_size();
        let malformed = || BridgeError::MalformedOptions {
            generation: tag,
            expected,
            actual: bytes.len(),
        };
        if bytes.len() != expected {
            return Err(malformed());
        }

        Ok(match generation {
            OptionsGeneration::V1 => {
                Self::V1(bytemuck::try_pod_read_unaligned(bytes).map_err(|_| malformed())?)
            }
            OptionsGeneration::V2 => {
                Self::V2(bytemuck::try_pod_read_unaligned(bytes).map_err(|_| malformed())?)
            }
            OptionsGeneration::V3 => {
                let mut config: DuelConfig =
                    bytemuck::try_pod_read_unaligned(bytes).map_err(|_| malformed())?;
                config._padding = [0; 7];
                Self::V3(config)
            }
        })
    }

    /// Generation of this record.
    #[must_use]
    pub const fn generation(&self) -> OptionsGeneration {
        match self {
            Self::V1(_) => OptionsGeneration::V1,
            Self::V2(_) => OptionsGeneration::V2,
            Self::V3(_) => OptionsGeneration::V3,
        }
    }

    /// Widens the record into the canonical layout. Seed words and flag
    /// bits the generation cannot express are zero.
    #[must_use]
    pub fn normalize(&self) -> DuelConfig {
        match *self {
            Self::V1(v1) => DuelConfig::new(
                [u64::from(v1.seed), 0, 0, 0],
                u64::from(v1.flags),
                v1.team1,
                v1.team2,
            ),
            Self::V2(v2) => DuelConfig::new([v2.seed, 0, 0, 0], v2.flags, v2.team1, v2.team2),
            Self::V3(v3) => DuelConfig { _padding: [0; 7], ..v3 },
        }
    }
}

impl From<DuelConfigV1> for AnyDuelConfig {
    fn from(config: DuelConfigV1) -> Self {
        Self::V1(config)
    }
}

impl From<DuelConfigV2> for AnyDuelConfig {
    fn from(config: DuelConfigV2) -> Self {
        Self::V2(config)
    }
}

impl From<DuelConfig> for AnyDuelConfig {
    fn from(config: DuelConfig) -> Self {
        Self::V3(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DuelMode;

    #[test]
    fn test_record_sizes() {
        assert_eq!(std::mem::size_of::<PlayerConfig>(), 12);
        assert_eq!(OptionsGeneration::V1.record_size(), 32);
        assert_eq!(OptionsGeneration::V2.record_size(), 40);
        assert_eq!(OptionsGeneration::V3.record_size(), 72);
    }

    #[test]
    fn test_v1_seed_widens() {
        let v1 = DuelConfigV1 {
            seed: 42,
            flags: DuelMode::MODE_MR5 as u32,
            team1: PlayerConfig::STANDARD,
            team2: PlayerConfig::STANDARD,
        };
        let canonical = AnyDuelConfig::V1(v1).normalize();

        assert_eq!(canonical.seed, [42, 0, 0, 0]);
        assert_eq!(canonical.flags, DuelMode::MODE_MR5);
        assert_eq!(canonical.enable_unsafe_libraries, 0);
    }

    #[test]
    fn test_equivalent_configs_are_byte_identical() {
        let team = PlayerConfig::STANDARD;
        let v1 = AnyDuelConfig::V1(DuelConfigV1 { seed: 7, flags: 0x800, team1: team, team2: team });
        let v2 = AnyDuelConfig::V2(DuelConfigV2 { seed: 7, flags: 0x800, team1: team, team2: team });
        let v3 = AnyDuelConfig::V3(DuelConfig::new([7, 0, 0, 0], 0x800, team, team));

        let bytes = v1.normalize();
        assert_eq!(bytes.as_bytes(), v2.normalize().as_bytes());
        assert_eq!(bytes.as_bytes(), v3.normalize().as_bytes());
    }

    #[test]
    fn test_decode_rejects_bad_input() {
        assert_eq!(
            AnyDuelConfig::decode(4, &[0; 32]),
            Err(BridgeError::UnknownGeneration(4))
        );
        assert_eq!(
            AnyDuelConfig::decode(2, &[0; 32]),
            Err(BridgeError::MalformedOptions { generation: 2, expected: 40, actual: 32 })
        );
    }

    #[test]
    fn test_decode_v2_from_raw_bytes() {
        let original = DuelConfigV2 {
            seed: 0xDEAD_BEEF_0000_0001,
            flags: DuelMode::TCG_SEGOC_FIRSTTRIGGER,
            team1: PlayerConfig::STANDARD,
            team2: PlayerConfig { starting_lp: 4000, ..PlayerConfig::STANDARD },
        };
        let decoded = AnyDuelConfig::decode(2, bytemuck::bytes_of(&original)).unwrap();

        assert_eq!(decoded, AnyDuelConfig::V2(original));
        let canonical = decoded.normalize();
        assert_eq!(canonical.seed, [0xDEAD_BEEF_0000_0001, 0, 0, 0]);
        assert_eq!(canonical.team2.starting_lp, 4000);
    }

    #[test]
    fn test_decode_v3_clears_padding() {
        let mut raw = [0u8; 72];
        raw[0] = 9;
        raw[64] = 1;
        raw[70] = 0xFF;

        let canonical = AnyDuelConfig::decode(3, &raw).unwrap().normalize();
        assert_eq!(canonical.seed[0], 9);
        assert_eq!(canonical.enable_unsafe_libraries, 1);
        assert!(canonical.as_bytes()[65..].iter().all(|&b| b == 0));
    }
}
