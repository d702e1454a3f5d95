//! # Engine Contract
//!
//! What the adapter needs from a duel engine. The native binding in
//! `ocgbridge_ffi` implements these traits over the C API; the `testing`
//! feature provides an in-memory engine.
//!
//! Engine buffers (`message`, `query*`) are borrowed from the duel with a
//! `&mut` receiver, so they cannot be held across the next engine call.

use std::fmt;

use crate::options::DuelOptions;
use crate::types::{DuelCreationStatus, NewCardInfo, QueryInfo};

/// Opaque identifier of a live duel.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DuelHandle(pub u64);

impl fmt::Debug for DuelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Duel#{:x}", self.0)
    }
}

impl fmt::Display for DuelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:x}", self.0)
    }
}

/// A duel engine instance.
pub trait Engine: Send + Sync + 'static {
    /// Duel type produced by this engine.
    type Duel: EngineDuel;

    /// Engine API version as `(major, minor)`.
    fn version(&self) -> (i32, i32);

    /// Creates a duel. The engine keeps `options.hooks` for the duel's
    /// lifetime and calls them from inside `process` and `new_card`.
    ///
    /// # Errors
    ///
    /// Returns the engine's creation status when it is not `Success`.
    fn create_duel(&self, options: DuelOptions) -> Result<Self::Duel, DuelCreationStatus>;
}

/// One live duel. Destroyed on drop.
pub trait EngineDuel: Send {
    /// Handle naming this duel.
    fn handle(&self) -> DuelHandle;

    /// Places a card. May call the card-data hook.
    fn new_card(&mut self, info: &NewCardInfo);

    /// Starts the duel.
    fn start(&mut self);

    /// Advances the duel; returns the raw `ProcessStatus`.
    fn process(&mut self) -> i32;

    /// Messages produced since the last call.
    fn message(&mut self) -> &[u8];

    /// Submits the player's response.
    fn set_response(&mut self, response: &[u8]);

    /// Loads a script; returns the engine's status (1 success, 0 failure).
    fn load_script(&mut self, source: &[u8], name: &str) -> i32;

    /// Number of cards in `location` of `team`.
    fn query_count(&mut self, team: u8, location: u32) -> u32;

    /// Single card query.
    fn query(&mut self, info: &QueryInfo) -> &[u8];

    /// Location query.
    fn query_location(&mut self, info: &QueryInfo) -> &[u8];

    /// Whole-field query.
    fn query_field(&mut self) -> &[u8];
}

/// Script ingestion entry point, handed to the script hook while the
/// engine is inside `process`.
pub trait ScriptSink {
    /// Duel that asked for the script.
    fn duel(&self) -> DuelHandle;

    /// Ingests `source` under `name`; returns the engine status.
    fn ingest(&mut self, source: &[u8], name: &str) -> i32;
}
