//! # In-Memory Engine
//!
//! A scripted stand-in for the native engine. Each duel replays a list of
//! [`Step`]s from `process`, driving the injected hooks the way the real
//! engine does, and records everything in a shared [`Journal`].
//!
//! Card reads triggered by `new_card` are held and only signalled done at
//! the start of the next `process` call; reads inside `process` are
//! signalled right away.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::card::{CardDataResponse, CardRecord};
use crate::engine::{DuelHandle, Engine, EngineDuel, ScriptSink};
use crate::options::{DuelConfig, DuelOptions};
use crate::relay::EngineHooks;
use crate::types::{
    DuelCreationStatus, LogType, NewCardInfo, ProcessStatus, QueryInfo, OPERATION_FAILED,
    OPERATION_SUCCEEDED,
};

/// One scripted engine action.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Step {
    /// Ask the host for card data.
    RequestCard(u32),
    /// Ask the host for a script.
    RequestScript(String),
    /// Emit a log line.
    Log(LogType, String),
    /// Append raw bytes to the message buffer.
    Message(Vec<u8>),
    /// Return from `process` with this status.
    Status(ProcessStatus),
}

/// A script the engine ingested.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ingestion {
    /// Duel that ingested it.
    pub duel: DuelHandle,
    /// Script name.
    pub name: String,
    /// Byte length the engine received.
    pub len: usize,
    /// Status returned.
    pub status: i32,
}

/// A card-data answer as the engine saw it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CardRead {
    /// Requested code.
    pub code: u32,
    /// Scalar answer.
    pub record: CardRecord,
    /// Terminated set-code array, `None` for the empty sentinel.
    pub set_codes: Option<Vec<u16>>,
}

/// Everything the mock engine observed.
#[derive(Clone, Debug, Default)]
pub struct Journal {
    /// Canonical configs handed to `create_duel`.
    pub created: Vec<DuelConfig>,
    /// Duels destroyed.
    pub destroyed: Vec<DuelHandle>,
    /// Cards placed.
    pub new_cards: Vec<NewCardInfo>,
    /// Card answers received.
    pub card_reads: Vec<CardRead>,
    /// Done signals sent.
    pub cards_done: usize,
    /// Scripts ingested.
    pub ingested: Vec<Ingestion>,
    /// Statuses of script requests the engine made itself.
    pub script_statuses: Vec<i32>,
    /// Responses submitted.
    pub responses: Vec<Vec<u8>>,
    /// Duels started.
    pub started: usize,
}

#[derive(Clone, Debug, Default)]
struct Canned {
    card: Vec<u8>,
    location: Vec<u8>,
    field: Vec<u8>,
}

/// Scripted engine.
#[derive(Debug, Default)]
pub struct MockEngine {
    steps: Vec<Step>,
    rejected: HashSet<String>,
    canned: Canned,
    creation_failure: Option<DuelCreationStatus>,
    journal: Arc<Mutex<Journal>>,
    next_handle: AtomicU64,
}

impl MockEngine {
    /// Engine whose duels replay `steps`.
    #[must_use]
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            steps,
            next_handle: AtomicU64::new(1),
            ..Self::default()
        }
    }

    /// Makes ingestion of `name` fail with `OPERATION_FAILED`.
    #[must_use]
    pub fn reject_script(mut self, name: impl Into<String>) -> Self {
        self.rejected.insert(name.into());
        self
    }

    /// Makes `create_duel` fail.
    #[must_use]
    pub fn fail_creation(mut self, status: DuelCreationStatus) -> Self {
        self.creation_failure = Some(status);
        self
    }

    /// Buffer returned by `query`.
    #[must_use]
    pub fn with_card_query(mut self, buffer: Vec<u8>) -> Self {
        self.canned.card = buffer;
        self
    }

    /// Buffer returned by `query_location`.
    #[must_use]
    pub fn with_location_query(mut self, buffer: Vec<u8>) -> Self {
        self.canned.location = buffer;
        self
    }

    /// Buffer returned by `query_field`.
    #[must_use]
    pub fn with_field_query(mut self, buffer: Vec<u8>) -> Self {
        self.canned.field = buffer;
        self
    }

    /// Snapshot of the journal.
    #[must_use]
    pub fn journal(&self) -> Journal {
        self.journal.lock().clone()
    }

    /// Shared journal handle.
    #[must_use]
    pub fn journal_handle(&self) -> Arc<Mutex<Journal>> {
        Arc::clone(&self.journal)
    }
}

impl Engine for MockEngine {
    type Duel = MockDuel;

    fn version(&self) -> (i32, i32) {
        (crate::OCG_VERSION_MAJOR, crate::OCG_VERSION_MINOR)
    }

    fn create_duel(&self, options: DuelOptions) -> Result<MockDuel, DuelCreationStatus> {
        if let Some(status) = self.creation_failure {
            return Err(status);
        }
        self.journal.lock().created.push(options.config);

        let handle = DuelHandle(self.next_handle.fetch_add(1, Ordering::Relaxed).max(1));
        Ok(MockDuel {
            handle,
            hooks: options.hooks,
            steps: self.steps.clone(),
            cursor: 0,
            held: Vec::new(),
            pending: Vec::new(),
            message: Vec::new(),
            canned: self.canned.clone(),
            rejected: self.rejected.clone(),
            journal: Arc::clone(&self.journal),
        })
    }
}

/// A duel of the [`MockEngine`].
pub struct MockDuel {
    handle: DuelHandle,
    hooks: EngineHooks,
    steps: Vec<Step>,
    cursor: usize,
    held: Vec<CardDataResponse>,
    pending: Vec<u8>,
    message: Vec<u8>,
    canned: Canned,
    rejected: HashSet<String>,
    journal: Arc<Mutex<Journal>>,
}

impl MockDuel {
    fn read_card(&self, code: u32) -> CardDataResponse {
        let response = self.hooks.read_card(code);
        self.journal.lock().card_reads.push(CardRead {
            code,
            record: response.record,
            set_codes: response.set_codes_with_terminator().map(<[u16]>::to_vec),
        });
        response
    }

    fn done(&self, response: CardDataResponse) {
        self.hooks.card_read_done(response);
        self.journal.lock().cards_done += 1;
    }
}

struct MockSink<'a> {
    handle: DuelHandle,
    rejected: &'a HashSet<String>,
    journal: &'a Mutex<Journal>,
}

impl ScriptSink for MockSink<'_> {
    fn duel(&self) -> DuelHandle {
        self.handle
    }

    fn ingest(&mut self, source: &[u8], name: &str) -> i32 {
        let status = if self.rejected.contains(name) {
            OPERATION_FAILED
        } else {
            OPERATION_SUCCEEDED
        };
        self.journal.lock().ingested.push(Ingestion {
            duel: self.handle,
            name: name.to_owned(),
            len: source.len(),
            status,
        });
        status
    }
}

impl EngineDuel for MockDuel {
    fn handle(&self) -> DuelHandle {
        self.handle
    }

    fn new_card(&mut self, info: &NewCardInfo) {
        self.journal.lock().new_cards.push(*info);
        let response = self.read_card(info.code);
        self.held.push(response);
    }

    fn start(&mut self) {
        self.journal.lock().started += 1;
    }

    fn process(&mut self) -> i32 {
        for response in std::mem::take(&mut self.held) {
            self.done(response);
        }

        while let Some(step) = self.steps.get(self.cursor).cloned() {
            self.cursor += 1;
            match step {
                Step::RequestCard(code) => {
                    let response = self.read_card(code);
                    self.done(response);
                }
                Step::RequestScript(name) => {
                    let mut sink = MockSink {
                        handle: self.handle,
                        rejected: &self.rejected,
                        journal: &self.journal,
                    };
                    let status = self.hooks.read_script(&mut sink, &name);
                    self.journal.lock().script_statuses.push(status);
                }
                Step::Log(kind, text) => self.hooks.log(&text, kind as i32),
                Step::Message(bytes) => self.pending.extend_from_slice(&bytes),
                Step::Status(status) => return status as i32,
            }
        }
        ProcessStatus::End as i32
    }

    fn message(&mut self) -> &[u8] {
        self.message = std::mem::take(&mut self.pending);
        &self.message
    }

    fn set_response(&mut self, response: &[u8]) {
        self.journal.lock().responses.push(response.to_vec());
    }

    fn load_script(&mut self, source: &[u8], name: &str) -> i32 {
        let mut sink = MockSink {
            handle: self.handle,
            rejected: &self.rejected,
            journal: &self.journal,
        };
        sink.ingest(source, name)
    }

    fn query_count(&mut self, team: u8, location: u32) -> u32 {
        let journal = self.journal.lock();
        let placed = journal
            .new_cards
            .iter()
            .filter(|card| card.team == team && card.location & location != 0)
            .count();
        u32::try_from(placed).unwrap_or(u32::MAX)
    }

    fn query(&mut self, _info: &QueryInfo) -> &[u8] {
        &self.canned.card
    }

    fn query_location(&mut self, _info: &QueryInfo) -> &[u8] {
        &self.canned.location
    }

    fn query_field(&mut self) -> &[u8] {
        &self.canned.field
    }
}

impl Drop for MockDuel {
    fn drop(&mut self) {
        self.journal.lock().destroyed.push(self.handle);
    }
}
