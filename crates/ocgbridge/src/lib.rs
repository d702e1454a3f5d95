//! # OCGBRIDGE
//!
//! Host-facing surface for driving ocgcore duels.
//!
//! ## Conventions
//!
//! ```text
//! ┌───────────────┬──────────────────────────┬─────────────────────────────┐
//! │               │ DuelCore / Duel          │ AsyncDuelCore / AsyncDuel   │
//! ├───────────────┼──────────────────────────┼─────────────────────────────┤
//! │ options       │ AnyDuelOptions           │ AsyncAnyDuelOptions         │
//! │ handlers      │ HostHandlers (sync)      │ AsyncHostHandlers (await)   │
//! │ engine calls  │ caller's thread          │ blocking pool               │
//! │ engine buffer │ borrowed until next call │ copied, or `with_*` closure │
//! └───────────────┴──────────────────────────┴─────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use ocgbridge::{AnyDuelOptions, DuelCore, NativeEngine, ProcessStatus};
//!
//! let core = DuelCore::new(NativeEngine);
//! let mut duel = core.create_duel(AnyDuelOptions::V3(options))?;
//! duel.start();
//! while duel.process() != ProcessStatus::End as i32 {
//!     for frame in duel.messages()? {
//!         host.handle(frame);
//!     }
//! }
//! ```

#![warn(clippy::pedantic)]

pub mod async_duel;
pub mod duel;
#[cfg(any(test, feature = "golden-path"))]
pub mod golden;

pub use async_duel::{AsyncDuel, AsyncDuelCore};
pub use duel::{Duel, DuelCore};

pub use ocgbridge_core::{
    AnyDuelConfig, AnyDuelOptions, AsyncAnyDuelOptions, AsyncCardReader, AsyncDuelOptionsV1,
    AsyncDuelOptionsV2, AsyncDuelOptionsV3, AsyncHostHandlers, AsyncLegacyScriptReader,
    AsyncLogHandler, AsyncScriptReader, BridgeConfig, BridgeError, BridgeResult, BufferLedger,
    CardData, CardReader, Convention, DuelConfig, DuelConfigV1, DuelConfigV2, DuelCreationStatus,
    DuelHandle, DuelMode, DuelOptionsV1, DuelOptionsV2, DuelOptionsV3, Engine, EngineDuel,
    HandlerError, HandlerResult, HostHandlers, LegacyScript, Location, LogHandler, LogType,
    NewCardInfo, PlayerConfig, Position, ProcessStatus, QueryFlags, QueryInfo, ScriptReader,
    OPERATION_FAILED, OPERATION_SUCCEEDED,
};
pub use ocgbridge_core::wire;

#[cfg(feature = "native")]
pub use ocgbridge_ffi::{NativeDuel, NativeEngine};
