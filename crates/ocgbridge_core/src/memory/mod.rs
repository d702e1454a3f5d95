//! # Memory Management
//!
//! Transient buffers that cross the host/engine boundary.
//!
//! ## Design Philosophy
//!
//! Every buffer has exactly one owner at a time:
//! - Releasing consumes the value, so a second release does not compile
//! - Drop releases on every other exit path, unwinding included
//! - A shared ledger counts both sides so leaks show up in tests

mod buffer;

pub use buffer::{BufferLedger, LedgerStats, OwnedBuffer};
