//! # Script Loader Bridge
//!
//! Completes a script request: fetch the source from the host, feed it to
//! the engine, free it.
//!
//! ```text
//! Requested ──▶ host answered ──┬─ content ──▶ Ingested (status from engine)
//!                               │         └──▶ Rejected (too long, not fed)
//!                               └─ none ─────▶ NotFound (OPERATION_FAILED)
//! ```
//!
//! The source buffer is released once on every path, including a panic
//! inside the engine's ingestion call.

use crate::engine::ScriptSink;
use crate::memory::OwnedBuffer;
use crate::types::OPERATION_FAILED;

use super::CallbackRelay;

/// How a script request ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScriptOutcome {
    /// The host had no such script; nothing was ingested.
    NotFound,
    /// The source was ingested; carries the engine's status.
    Ingested(i32),
    /// The source does not fit the engine's 32-bit length.
    Rejected {
        /// Byte length of the rejected source.
        len: usize,
    },
}

impl ScriptOutcome {
    /// Status code handed back to the engine.
    #[must_use]
    pub const fn status(self) -> i32 {
        match self {
            Self::Ingested(status) => status,
            Self::NotFound | Self::Rejected { .. } => OPERATION_FAILED,
        }
    }
}

/// Length the engine is told for `len` bytes of source, if representable.
#[inline]
#[must_use]
pub fn wire_length(len: usize) -> Option<u32> {
    u32::try_from(len).ok()
}

/// Serves one script request end to end.
pub fn load_script(relay: &dyn CallbackRelay, sink: &mut dyn ScriptSink, name: &str) -> ScriptOutcome {
    let duel = sink.duel();
    match relay.script_source(duel, name) {
        Some(source) => ingest(source, sink, name),
        None => {
            tracing::debug!("script not found for duel {}: {}", duel, name);
            ScriptOutcome::NotFound
        }
    }
}

/// Feeds owned source text to the engine and releases it.
pub fn ingest(source: OwnedBuffer<u8>, sink: &mut dyn ScriptSink, name: &str) -> ScriptOutcome {
    let len = source.len();
    if wire_length(len).is_none() {
        tracing::warn!("script {} is {} bytes, over the engine limit", name, len);
        source.release();
        return ScriptOutcome::Rejected { len };
    }

    // `source` drops during unwinding if ingestion panics.
    let status = sink.ingest(source.as_slice(), name);
    source.release();

    tracing::debug!("ingested {} ({} bytes): status {}", name, len, status);
    ScriptOutcome::Ingested(status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::DuelHandle;
    use crate::memory::BufferLedger;
    use crate::types::OPERATION_SUCCEEDED;

    #[derive(Default)]
    struct RecordingSink {
        calls: Vec<(usize, String)>,
    }

    impl ScriptSink for RecordingSink {
        fn duel(&self) -> DuelHandle {
            DuelHandle(1)
        }

        fn ingest(&mut self, source: &[u8], name: &str) -> i32 {
            self.calls.push((source.len(), name.to_owned()));
            OPERATION_SUCCEEDED
        }
    }

    struct PanickingSink;

    impl ScriptSink for PanickingSink {
        fn duel(&self) -> DuelHandle {
            DuelHandle(2)
        }

        fn ingest(&mut self, _source: &[u8], _name: &str) -> i32 {
            panic!("lua state corrupted")
        }
    }

    #[test]
    fn test_ingest_uses_byte_length() {
        let ledger = BufferLedger::new();
        let mut sink = RecordingSink::default();

        let source = ledger.adopt("-- é".to_owned().into_bytes());
        let outcome = ingest(source, &mut sink, "c4.lua");

        assert_eq!(outcome, ScriptOutcome::Ingested(OPERATION_SUCCEEDED));
        assert_eq!(sink.calls, vec![(5, "c4.lua".to_owned())]);
        assert_eq!(ledger.stats().outstanding, 0);
    }

    #[test]
    fn test_release_when_ingestion_panics() {
        let ledger = BufferLedger::new();
        let source = ledger.adopt(b"-- boom".to_vec());

        let result = std::panic::catch_unwind(move || {
            let mut sink = PanickingSink;
            ingest(source, &mut sink, "c1.lua")
        });

        assert!(result.is_err());
        assert_eq!(ledger.stats().released, 1);
    }

    #[test]
    fn test_outcome_status() {
        assert_eq!(ScriptOutcome::NotFound.status(), OPERATION_FAILED);
        assert_eq!(ScriptOutcome::Rejected { len: 0 }.status(), OPERATION_FAILED);
        assert_eq!(ScriptOutcome::Ingested(1).status(), 1);
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn test_oversized_length_is_not_representable() {
        assert_eq!(wire_length(u32::MAX as usize), Some(u32::MAX));
        assert_eq!(wire_length(u32::MAX as usize + 1), None);
    }
}
