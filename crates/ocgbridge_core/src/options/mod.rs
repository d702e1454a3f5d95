//! # Options Adapter
//!
//! The engine's duel configuration went through three layouts. Hosts may
//! hand in any of them; the adapter widens each into the canonical layout
//! and injects the relay hooks.
//!
//! | gen | seed        | flags | extra                  | bytes |
//! |-----|-------------|-------|------------------------|-------|
//! | 1   | `u32`       | `u32` | legacy script result   | 32    |
//! | 2   | `u64`       | `u64` |                        | 40    |
//! | 3   | `[u64; 4]`  | `u64` | unsafe-libraries flag  | 72    |

mod generations;
mod host;

pub use generations::{
    AnyDuelConfig, DuelConfig, DuelConfigV1, DuelConfigV2, OptionsGeneration, PlayerConfig,
};
pub use host::{
    AnyDuelOptions, AsyncAnyDuelOptions, AsyncDuelOptionsV1, AsyncDuelOptionsV2,
    AsyncDuelOptionsV3, AsyncLegacyScriptReader, DuelOptions, DuelOptionsV1, DuelOptionsV2,
    DuelOptionsV3, LegacyScript, LegacyScriptReader,
};
