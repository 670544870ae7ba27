//! A labeled, forward-only cursor over the bytes of one stripe stream.

use std::sync::Arc;

use strata_common::{Result, error::Error};

/// A forward-only byte cursor over a single (already decompressed) stream.
///
/// The stream data is shared, so cloning an `InputStream` is cheap and yields
/// an independent cursor at the same position.
#[derive(Debug, Clone)]
pub struct InputStream {
    data: Arc<[u8]>,
    pos: usize,
    label: Arc<str>,
}

impl InputStream {
    /// Creates a cursor positioned at the start of `data`.
    ///
    /// `label` identifies the stream in diagnostics and I/O accounting.
    pub fn new(data: impl Into<Arc<[u8]>>, label: impl Into<Arc<str>>) -> InputStream {
        InputStream {
            data: data.into(),
            pos: 0,
            label: label.into(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Total size of the stream in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn is_exhausted(&self) -> bool {
        self.pos == self.data.len()
    }

    #[inline]
    pub fn read_byte(&mut self) -> Result<u8> {
        match self.data.get(self.pos) {
            Some(&byte) => {
                self.pos += 1;
                Ok(byte)
            }
            None => Err(self.unexpected_end(1)),
        }
    }

    /// Returns the next `len` bytes and advances past them.
    pub fn read_bytes(&mut self, len: usize) -> Result<&[u8]> {
        if len > self.remaining() {
            return Err(self.unexpected_end(len));
        }
        let start = self.pos;
        self.pos += len;
        Ok(&self.data[start..self.pos])
    }

    pub fn skip_bytes(&mut self, len: usize) -> Result<()> {
        self.read_bytes(len).map(|_| ())
    }

    #[cold]
    fn unexpected_end(&self, wanted: usize) -> Error {
        Error::invalid_format(format!(
            "stream '{}': wanted {wanted} bytes at offset {}, {} left",
            self.label,
            self.pos,
            self.remaining()
        ))
    }
}
