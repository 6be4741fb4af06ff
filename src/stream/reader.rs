//! Token and payload reader over a single forward-only cursor.
//!
//! Fast-export interleaves newline-terminated commands with length-prefixed
//! payloads that may contain raw newlines. [`BlockReader`] serves both from
//! the same buffered source so a `data <n>` payload is never split as lines.

use std::io::{BufRead, ErrorKind, Read, Write};

use crate::error::{StreamError, StreamResult};

/// Upper bound on the buffer reserved before a payload is read; the declared
/// length comes from the input and is not trusted.
const MAX_PAYLOAD_RESERVE: usize = 64 * 1024;

/// Reader that hands out newline-terminated tokens and fixed-length payloads.
#[derive(Debug)]
pub struct BlockReader<R> {
    inner: R,
    line: Vec<u8>,
}

impl<R: BufRead> BlockReader<R> {
    /// Wraps a buffered input channel.
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            line: Vec::with_capacity(128),
        }
    }

    /// Reads the next token, consuming its `\n` delimiter.
    ///
    /// Returns `Ok(None)` once the channel is exhausted with nothing read. A
    /// final token without a delimiter is still returned. One `\r` directly
    /// before the delimiter is dropped so CRLF streams are accepted.
    pub fn read_token(&mut self) -> StreamResult<Option<String>> {
        self.line.clear();
        let read = self.inner.read_until(b'\n', &mut self.line)?;
        if read == 0 {
            return Ok(None);
        }

        if self.line.last() == Some(&b'\n') {
            self.line.pop();
            if self.line.last() == Some(&b'\r') {
                self.line.pop();
            }
        }

        Ok(Some(String::from_utf8_lossy(&self.line).into_owned()))
    }

    /// Reads exactly `len` bytes, newlines included.
    pub fn read_bytes(&mut self, len: usize) -> StreamResult<Vec<u8>> {
        let mut buf = Vec::with_capacity(len.min(MAX_PAYLOAD_RESERVE));
        let actual = (&mut self.inner).take(len as u64).read_to_end(&mut buf)?;
        if actual < len {
            return Err(StreamError::ShortRead {
                expected: len,
                actual,
            });
        }
        Ok(buf)
    }

    /// Streams exactly `len` bytes into `sink`, at most `chunk_size` at a time.
    ///
    /// Returns the number of bytes copied, which always equals `len` on success.
    pub fn copy_bytes<W: Write>(
        &mut self,
        len: usize,
        chunk_size: usize,
        sink: &mut W,
    ) -> StreamResult<u64> {
        let chunk_size = chunk_size.max(1);
        let mut buf = vec![0u8; chunk_size.min(len)];
        let mut remaining = len;

        while remaining > 0 {
            let want = remaining.min(chunk_size);
            let got = self.fill(&mut buf[..want])?;
            if got < want {
                return Err(StreamError::ShortRead {
                    expected: len,
                    actual: len - remaining + got,
                });
            }
            sink.write_all(&buf[..want])?;
            remaining -= want;
        }

        Ok(len as u64)
    }

    /// Fills `buf` until it is full or the channel ends, returning the count read.
    fn fill(&mut self, buf: &mut [u8]) -> StreamResult<usize> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.inner.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(filled)
    }

    /// Returns the wrapped reader.
    pub fn into_inner(self) -> R {
        self.inner
    }
}
