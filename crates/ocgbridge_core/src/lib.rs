//! # OCGBRIDGE Core
//!
//! The adapter between an embedding host and the native duel engine
//! (ygopro "ocgcore" API v10).
//!
//! ## Architecture
//!
//! ```text
//!  HOST                          ADAPTER                        ENGINE
//! ┌──────────────┐   options   ┌─────────────────┐  DuelOptions ┌──────────┐
//! │ any config   │ ──────────▶ │ Options Adapter │ ───────────▶ │ create   │
//! │ generation   │             └─────────────────┘              │ duel     │
//! └──────────────┘                                              └────┬─────┘
//! ┌──────────────┐  handler   ┌─────────────────┐   EngineHooks      │
//! │ card/script/ │ ◀───────── │ Callback Relay  │ ◀──────────────────┘
//! │ log handlers │ ─────────▶ │ (fail-soft)     │ ──▶ Script Loader Bridge
//! └──────────────┘  result    └─────────────────┘      └──▶ ScriptSink::ingest
//! ```
//!
//! ## Rules
//!
//! 1. **Host faults stay on the host side** - a failing handler degrades to
//!    the empty result for that one request
//! 2. **Exactly-once release** - transient buffers are consumed on release
//! 3. **No retention** - engine buffers are borrowed until the next call
//!
//! ## Example
//!
//! ```rust,ignore
//! use ocgbridge_core::{AnyDuelOptions, BufferLedger, DuelOptionsV3};
//!
//! let ledger = BufferLedger::new();
//! let options = AnyDuelOptions::V3(v3).into_engine_options(&ledger);
//! let duel = engine.create_duel(options)?;
//! ```

#![deny(unsafe_code)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod card;
pub mod config;
pub mod engine;
pub mod error;
pub mod memory;
pub mod options;
pub mod relay;
pub mod types;
pub mod wire;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use card::{CardData, CardDataResponse, CardRecord};
pub use config::{BridgeConfig, Convention, DuelSection, RelaySection, TeamSection};
pub use engine::{DuelHandle, Engine, EngineDuel, ScriptSink};
pub use error::{BridgeError, BridgeResult, HandlerError, HandlerResult};
pub use memory::{BufferLedger, LedgerStats, OwnedBuffer};
pub use options::{
    AnyDuelConfig, AnyDuelOptions, AsyncAnyDuelOptions, AsyncDuelOptionsV1, AsyncDuelOptionsV2,
    AsyncDuelOptionsV3, AsyncLegacyScriptReader, DuelConfig, DuelConfigV1, DuelConfigV2,
    DuelOptions, DuelOptionsV1, DuelOptionsV2, DuelOptionsV3, LegacyScript, LegacyScriptReader,
    OptionsGeneration, PlayerConfig,
};
pub use relay::{
    AsyncCardReader, AsyncHostHandlers, AsyncLogHandler, AsyncScriptReader, BlockingRelay,
    CallbackRelay, CardReader, EngineHooks, HostHandlers, LogHandler, RequestKind, ScriptReader,
    SuspendingRelay,
};
pub use types::{
    DuelCreationStatus, DuelMode, Location, LogType, NewCardInfo, Position, ProcessStatus,
    QueryFlags, QueryInfo, OPERATION_FAILED, OPERATION_SUCCEEDED,
};

/// Engine API version this adapter targets (major).
pub const OCG_VERSION_MAJOR: i32 = 10;

/// Engine API version this adapter targets (minor).
pub const OCG_VERSION_MINOR: i32 = 0;
