//! Little-endian cursor over an engine buffer.

use crate::error::{BridgeError, BridgeResult};

/// Reads fixed-width little-endian values, failing with
/// [`BridgeError::Truncated`] instead of reading past the end.
#[derive(Clone, Debug)]
pub struct WireReader<'a> {
    data: &'a [u8],
    pos: usize,
}

macro_rules! read_le {
    ($($name:ident -> $ty:ty),* $(,)?) => {
        $(
            #[doc = concat!("Reads a little-endian `", stringify!($ty), "`.")]
            ///
            /// # Errors
            ///
            /// [`BridgeError::Truncated`] if too few bytes remain.
            #[inline]
            pub fn $name(&mut self) -> BridgeResult<$ty> {
                let bytes = self.take(std::mem::size_of::<$ty>())?;
                let mut raw = [0u8; std::mem::size_of::<$ty>()];
                raw.copy_from_slice(bytes);
                Ok(<$ty>::from_le_bytes(raw))
            }
        )*
    };
}

impl<'a> WireReader<'a> {
    /// Cursor at the start of `data`.
    #[must_use]
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Bytes left.
    #[inline]
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Returns true when nothing is left.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Current offset.
    #[inline]
    #[must_use]
    pub const fn position(&self) -> usize {
        self.pos
    }

    /// Borrows the next `len` bytes.
    ///
    /// # Errors
    ///
    /// [`BridgeError::Truncated`] if fewer than `len` bytes remain.
    pub fn take(&mut self, len: usize) -> BridgeResult<&'a [u8]> {
        let available = self.remaining();
        if len > available {
            return Err(BridgeError::Truncated { needed: len, available });
        }
        let slice = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    /// Skips `len` bytes.
    ///
    /// # Errors
    ///
    /// [`BridgeError::Truncated`] if fewer than `len` bytes remain.
    pub fn skip(&mut self, len: usize) -> BridgeResult<()> {
        self.take(len).map(|_| ())
    }

    /// Splits off a sub-reader over the next `len` bytes.
    ///
    /// # Errors
    ///
    /// [`BridgeError::Truncated`] if fewer than `len` bytes remain.
    pub fn sub(&mut self, len: usize) -> BridgeResult<WireReader<'a>> {
        self.take(len).map(WireReader::new)
    }

    /// Everything not yet read.
    pub fn rest(&mut self) -> &'a [u8] {
        let slice = &self.data[self.pos..];
        self.pos = self.data.len();
        slice
    }

    read_le! {
        u8 -> u8,
        u16 -> u16,
        u32 -> u32,
        i32 -> i32,
        u64 -> u64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_little_endian() {
        let mut reader = WireReader::new(&[0x01, 0x34, 0x12, 0xff, 0xff, 0xff, 0xff]);
        assert_eq!(reader.u8().unwrap(), 1);
        assert_eq!(reader.u16().unwrap(), 0x1234);
        assert_eq!(reader.i32().unwrap(), -1);
        assert!(reader.is_empty());
    }

    #[test]
    fn test_truncation_is_reported() {
        let mut reader = WireReader::new(&[1, 2, 3]);
        assert_eq!(
            reader.u32(),
            Err(BridgeError::Truncated { needed: 4, available: 3 })
        );
        // A failed read does not consume.
        assert_eq!(reader.remaining(), 3);
    }

    #[test]
    fn test_sub_reader_is_bounded() {
        let mut reader = WireReader::new(&[2, 0, 0, 0, 9, 9, 7]);
        let mut frame = reader.sub(4).unwrap();
        assert_eq!(frame.u32().unwrap(), 2);
        assert!(frame.u8().is_err());
        assert_eq!(reader.rest(), &[9, 9, 7]);
    }
}
