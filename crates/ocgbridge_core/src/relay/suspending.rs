//! Relay that suspends on host futures.
//!
//! The engine calls hooks from a blocking thread (see `AsyncDuel`, which
//! runs every engine call on `spawn_blocking`). Each hook parks that thread
//! on [`Handle::block_on`] while the host runtime keeps scheduling other
//! tasks. The engine has one request in flight per duel, so responses
//! always pair with their request.

use std::fmt;

use tokio::runtime::Handle;

use crate::card::CardData;
use crate::engine::DuelHandle;
use crate::error::HandlerResult;
use crate::memory::{BufferLedger, OwnedBuffer};
use crate::types::LogType;

use super::{
    adopt_script, fail_soft, log_unhandled, AsyncCardReader, AsyncHostHandlers, AsyncLogHandler,
    AsyncScriptReader, CallbackRelay, RequestKind,
};

/// Suspending convention.
pub struct SuspendingRelay {
    handlers: AsyncHostHandlers,
    runtime: Handle,
    ledger: BufferLedger,
}

impl SuspendingRelay {
    /// Wraps `handlers`, driving them on `runtime`.
    #[must_use]
    pub fn new(handlers: AsyncHostHandlers, runtime: Handle, ledger: BufferLedger) -> Self {
        Self {
            handlers,
            runtime,
            ledger,
        }
    }

    /// Parks the calling thread until `future` resolves.
    ///
    /// Panics (and is caught by `fail_soft`) if called from a runtime
    /// worker thread.
    fn suspend<T>(
        &self,
        kind: RequestKind,
        subject: &dyn fmt::Display,
        future: impl std::future::Future<Output = HandlerResult<T>>,
    ) -> Option<T> {
        fail_soft(kind, subject, || self.runtime.block_on(future))
    }
}

impl CallbackRelay for SuspendingRelay {
    fn card_data(&self, code: u32) -> Option<CardData> {
        tracing::debug!("card data request (suspending): {}", code);
        let reader = &self.handlers.card_reader;
        self.suspend(RequestKind::CardData, &code, reader.read_card(code)).flatten()
    }

    fn script_source(&self, duel: DuelHandle, name: &str) -> Option<OwnedBuffer<u8>> {
        tracing::debug!("script request (suspending) from duel {}: {}", duel, name);
        let reader = &self.handlers.script_reader;
        let text = self
            .suspend(RequestKind::ScriptSource, &name, reader.read_script(duel, name))
            .flatten()?;
        Some(adopt_script(&self.ledger, text))
    }

    fn log(&self, kind: LogType, text: &str) {
        match &self.handlers.log_handler {
            Some(handler) => {
                if self.suspend(RequestKind::Log, &text, handler.log(kind, text)).is_none() {
                    log_unhandled(kind, text);
                }
            }
            None => log_unhandled(kind, text),
        }
    }

    fn ledger(&self) -> &BufferLedger {
        &self.ledger
    }
}

impl fmt::Debug for SuspendingRelay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SuspendingRelay")
            .field("ledger", &self.ledger.stats())
            .finish_non_exhaustive()
    }
}
