//! Relay that calls host handlers inline.

use crate::card::CardData;
use crate::engine::DuelHandle;
use crate::memory::{BufferLedger, OwnedBuffer};
use crate::types::LogType;

use super::{
    adopt_script, fail_soft, log_unhandled, CallbackRelay, CardReader, HostHandlers, LogHandler,
    RequestKind, ScriptReader,
};

/// Blocking convention: each hook returns once the handler returns.
pub struct BlockingRelay {
    handlers: HostHandlers,
    ledger: BufferLedger,
}

impl BlockingRelay {
    /// Wraps `handlers`; buffers are accounted in `ledger`.
    #[must_use]
    pub fn new(handlers: HostHandlers, ledger: BufferLedger) -> Self {
        Self { handlers, ledger }
    }
}

impl CallbackRelay for BlockingRelay {
    fn card_data(&self, code: u32) -> Option<CardData> {
        tracing::debug!("card data request: {}", code);
        fail_soft(RequestKind::CardData, &code, || self.handlers.card_reader.read_card(code)).flatten()
    }

    fn script_source(&self, duel: DuelHandle, name: &str) -> Option<OwnedBuffer<u8>> {
        tracing::debug!("script request from duel {}: {}", duel, name);
        let text = fail_soft(RequestKind::ScriptSource, &name, || {
            self.handlers.script_reader.read_script(duel, name)
        })
        .flatten()?;
        Some(adopt_script(&self.ledger, text))
    }

    fn log(&self, kind: LogType, text: &str) {
        match &self.handlers.log_handler {
            Some(handler) => {
                if fail_soft(RequestKind::Log, &text, || handler.log(kind, text)).is_none() {
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
