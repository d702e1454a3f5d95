//! Engine-facing entry points of the relay.

use std::fmt;
use std::sync::Arc;

use crate::card::CardDataResponse;
use crate::engine::ScriptSink;
use crate::memory::BufferLedger;
use crate::types::LogType;

use super::script;
use super::CallbackRelay;

/// The four hooks injected into the engine at duel creation.
///
/// Each hook carries its context (the relay), so no payload pointer is
/// needed on this side of the boundary.
#[derive(Clone)]
pub struct EngineHooks {
    relay: Arc<dyn CallbackRelay>,
}

impl EngineHooks {
    /// Hooks over `relay`.
    #[must_use]
    pub fn new(relay: Arc<dyn CallbackRelay>) -> Self {
        Self { relay }
    }

    /// Card-data hook. Returns the empty sentinel when the host has nothing.
    #[must_use]
    pub fn read_card(&self, code: u32) -> CardDataResponse {
        match self.relay.card_data(code) {
            Some(data) => CardDataResponse::from_card(&data, self.relay.ledger()),
            None => CardDataResponse::empty(),
        }
    }

    /// Card-reader-done hook. Consumes the response, releasing its
    /// set-code array.
    pub fn card_read_done(&self, response: CardDataResponse) {
        tracing::trace!("card read done: {}", response.record.code);
        response.release();
    }

    /// Script hook; returns the status for the engine.
    pub fn read_script(&self, sink: &mut dyn ScriptSink, name: &str) -> i32 {
        script::load_script(self.relay.as_ref(), sink, name).status()
    }

    /// Log hook with the engine's raw log type.
    pub fn log(&self, text: &str, kind: i32) {
        self.relay.log(LogType::from_raw(kind), text);
    }

    /// Ledger used for this duel's buffers.
    #[must_use]
    pub fn ledger(&self) -> &BufferLedger {
        self.relay.ledger()
    }
}

impl fmt::Debug for EngineHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineHooks")
            .field("buffers", &self.relay.ledger().stats())
            .finish()
    }
}
