//! # Owned Buffers
//!
//! Single-owner buffers for script source text and card set-code arrays.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use bytemuck::{Pod, Zeroable};

/// Counters shared by a ledger and every buffer it handed out.
#[derive(Debug, Default)]
struct LedgerCounters {
    /// Buffers created through `acquire` or `adopt`.
    acquired: AtomicU64,
    /// Buffers released (explicitly or on drop).
    released: AtomicU64,
}

/// Snapshot of a ledger's counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LedgerStats {
    /// Total buffers handed out.
    pub acquired: u64,
    /// Total buffers released.
    pub released: u64,
    /// Buffers currently alive.
    pub outstanding: u64,
}

/// Accounting source for [`OwnedBuffer`]s.
///
/// Cloning is cheap; clones share the same counters.
///
/// # Example
///
/// ```rust,ignore
/// let ledger = BufferLedger::new();
///
/// let script = ledger.adopt(b"-- empty".to_vec());
/// assert_eq!(ledger.stats().outstanding, 1);
///
/// script.release();
/// assert_eq!(ledger.stats().outstanding, 0);
/// ```
#[derive(Clone, Debug, Default)]
pub struct BufferLedger {
    counters: Arc<LedgerCounters>,
}

impl BufferLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a zeroed buffer of `len` elements.
    #[must_use]
    pub fn acquire<T: Pod>(&self, len: usize) -> OwnedBuffer<T> {
        self.adopt(vec![T::zeroed(); len])
    }

    /// Takes ownership of data produced elsewhere (the host).
    #[must_use]
    pub fn adopt<T: Pod>(&self, data: Vec<T>) -> OwnedBuffer<T> {
        self.counters.acquired.fetch_add(1, Ordering::Relaxed);
        OwnedBuffer {
            data: data.into_boxed_slice(),
            counters: Arc::clone(&self.counters),
        }
    }

    /// Returns the current counters.
    #[must_use]
    pub fn stats(&self) -> LedgerStats {
        let acquired = self.counters.acquired.load(Ordering::Acquire);
        let released = self.counters.released.load(Ordering::Acquire);
        LedgerStats {
            acquired,
            released,
            outstanding: acquired.saturating_sub(released),
        }
    }
}

/// A buffer with exactly one owner.
///
/// [`release`](Self::release) consumes the buffer. Dropping it releases it
/// too, so every exit path frees it once.
pub struct OwnedBuffer<T: Pod> {
    /// Backing storage; the heap address is stable for the buffer's life.
    data: Box<[T]>,
    /// Ledger this buffer reports to.
    counters: Arc<LedgerCounters>,
}

impl<T: Pod> OwnedBuffer<T> {
    /// Number of elements.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the buffer holds no elements.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Size in bytes.
    #[inline]
    #[must_use]
    pub fn byte_len(&self) -> usize {
        std::mem::size_of_val(&*self.data)
    }

    /// Element view.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Mutable element view.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Raw byte view.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.data)
    }

    /// Frees the buffer.
    pub fn release(self) {
        drop(self);
    }
}

impl<T: Pod> Drop for OwnedBuffer<T> {
    fn drop(&mut self) {
        self.counters.released.fetch_add(1, Ordering::AcqRel);
    }
}

impl<T: Pod + fmt::Debug> fmt::Debug for OwnedBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OwnedBuffer")
            .field("len", &self.data.len())
            .field("data", &&self.data[..self.data.len().min(16)])
            .finish()
    }
}
