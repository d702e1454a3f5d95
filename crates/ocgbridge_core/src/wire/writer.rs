//! Little-endian builder for buffers the engine reads.

/// Appends fixed-width little-endian values to an owned buffer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WireWriter {
    buf: Vec<u8>,
}

macro_rules! write_le {
    ($($name:ident <- $ty:ty),* $(,)?) => {
        $(
            #[doc = concat!("Appends a little-endian `", stringify!($ty), "`.")]
            #[inline]
            pub fn $name(&mut self, value: $ty) -> &mut Self {
                self.buf.extend_from_slice(&value.to_le_bytes());
                self
            }
        )*
    };
}

impl WireWriter {
    /// Empty buffer.
    #[must_use]
    pub const fn new() -> Self {
        Self { buf: Vec::new() }
    }

    /// Bytes written so far.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Returns true when nothing was written.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Borrows the written bytes.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    /// Takes the written bytes.
    #[must_use]
    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }

    write_le! {
        u8 <- u8,
        i8 <- i8,
        u16 <- u16,
        i16 <- i16,
        u32 <- u32,
        i32 <- i32,
        u64 <- u64,
    }
}
