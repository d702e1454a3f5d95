//! # Callback Relay
//!
//! Forwards the engine's plugin hooks (card data, script source, log) to
//! host handlers.
//!
//! ## Conventions
//!
//! - [`BlockingRelay`]: handlers run inline on the engine thread
//! - [`SuspendingRelay`]: handler futures run on the host's tokio runtime
//!   while the engine thread waits
//!
//! ## Fail-soft
//!
//! Both relays swallow handler faults. An `Err`, a panic or a missing log
//! handler is logged and turned into the empty answer for that request.
//! The engine always gets an answer.

mod blocking;
mod handlers;
mod hooks;
pub mod script;
mod suspending;

use std::fmt;
use std::panic::{self, AssertUnwindSafe};

pub use blocking::BlockingRelay;
pub use handlers::{
    AsyncCardReader, AsyncHostHandlers, AsyncLogHandler, AsyncScriptReader, CardReader,
    HostHandlers, LogHandler, ScriptReader,
};
pub use hooks::EngineHooks;
pub use suspending::SuspendingRelay;

use crate::card::CardData;
use crate::engine::DuelHandle;
use crate::error::HandlerResult;
use crate::memory::{BufferLedger, OwnedBuffer};
use crate::types::LogType;

/// The three hook kinds the relay serves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RequestKind {
    /// Card-data lookup.
    CardData,
    /// Script-source lookup.
    ScriptSource,
    /// Log output.
    Log,
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::CardData => "card data",
            Self::ScriptSource => "script source",
            Self::Log => "log",
        })
    }
}

/// Host side of the engine hooks.
///
/// Implementations never fail: every fault is already absorbed.
pub trait CallbackRelay: Send + Sync {
    /// Card data for `code`, or `None`.
    fn card_data(&self, code: u32) -> Option<CardData>;

    /// Script text for `name`, moved into a ledger buffer, or `None`.
    fn script_source(&self, duel: DuelHandle, name: &str) -> Option<OwnedBuffer<u8>>;

    /// Delivers one log line.
    fn log(&self, kind: LogType, text: &str);

    /// Ledger that accounts for this relay's buffers.
    fn ledger(&self) -> &BufferLedger;
}

/// Runs one handler call, absorbing errors and panics.
pub(crate) fn fail_soft<T>(
    kind: RequestKind,
    subject: &dyn fmt::Display,
    call: impl FnOnce() -> HandlerResult<T>,
) -> Option<T> {
    match panic::catch_unwind(AssertUnwindSafe(call)) {
        Ok(Ok(value)) => Some(value),
        Ok(Err(err)) => {
            tracing::warn!("{} handler failed for {}: {}", kind, subject, err);
            None
        }
        Err(payload) => {
            tracing::warn!(
                "{} handler panicked for {}: {}",
                kind,
                subject,
                panic_message(payload.as_ref())
            );
            None
        }
    }
}

/// Log lines with no host handler end up here.
pub(crate) fn log_unhandled(kind: LogType, text: &str) {
    match kind {
        LogType::Error => tracing::error!("engine: {}", text),
        _ => tracing::warn!("discarded {:?} engine log: {}", kind, text),
    }
}

pub(crate) fn adopt_script(ledger: &BufferLedger, text: String) -> OwnedBuffer<u8> {
    ledger.adopt(text.into_bytes())
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(text) = payload.downcast_ref::<&'static str>() {
        text
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.as_str()
    } else {
        "non-string panic payload"
    }
}
