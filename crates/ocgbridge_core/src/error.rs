//! # Bridge Error Types
//!
//! Two families, kept apart on purpose of where they may travel:
//!
//! - [`BridgeError`] fails the host call that triggered it (bad options,
//!   bad config, truncated engine buffer, a dead engine task).
//! - [`HandlerError`] is raised by host handlers and stops at the relay
//!   boundary. The engine never sees it.

use thiserror::Error;

use crate::types::DuelCreationStatus;

/// Errors surfaced to the host by the adapter.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BridgeError {
    /// The options generation tag is not one this adapter knows.
    #[error("unrecognized options generation: {0}")]
    UnknownGeneration(u32),

    /// The options record does not have the size its generation requires.
    #[error("malformed options for generation {generation}: expected {expected} bytes, got {actual}")]
    MalformedOptions {
        /// Generation tag that was requested.
        generation: u32,
        /// Size of that generation's record.
        expected: usize,
        /// Size that was supplied.
        actual: usize,
    },

    /// The engine refused to create the duel.
    #[error("duel creation failed: {0:?}")]
    CreationFailed(DuelCreationStatus),

    /// An engine buffer ended before a field could be read.
    #[error("truncated engine buffer: needed {needed} bytes, {available} available")]
    Truncated {
        /// Bytes the decoder needed.
        needed: usize,
        /// Bytes left in the buffer.
        available: usize,
    },

    /// Invalid configuration file.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The blocking task running an engine call died.
    #[error("engine task failed: {0}")]
    EngineTask(String),
}

/// Result type for adapter operations.
pub type BridgeResult<T> = Result<T, BridgeError>;

/// Fault raised by a host handler.
#[derive(Error, Debug)]
pub enum HandlerError {
    /// Handler reported a failure with a message.
    #[error("{0}")]
    Failed(String),

    /// Handler bubbled up some other error.
    #[error(transparent)]
    Source(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl HandlerError {
    /// Creates a handler failure from a message.
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

impl From<std::io::Error> for HandlerError {
    fn from(err: std::io::Error) -> Self {
        Self::Source(Box::new(err))
    }
}

/// Result type returned by host handlers.
pub type HandlerResult<T> = Result<T, HandlerError>;
