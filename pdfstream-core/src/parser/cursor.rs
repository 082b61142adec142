//! Byte cursors
//!
//! The tokenizer reads its input through [`ByteCursor`]: one byte of peek,
//! single-byte reads, and a LIFO pushback used for lookahead corrections
//! and for handing back bytes a scan read past its end.

use super::ParseResult;
use std::io::{BufReader, ErrorKind, Read};

/// PDF whitespace (ISO 32000-1 Table 1)
pub(crate) fn is_whitespace(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\r' | b'\n' | b'\x0C' | b'\0')
}

/// A peekable byte source with bounded pushback
pub trait ByteCursor {
    /// Look at the next byte without consuming it
    fn peek(&mut self) -> ParseResult<Option<u8>>;

    /// Consume the next byte
    fn read(&mut self) -> ParseResult<Option<u8>>;

    /// Push a byte back so the next `peek`/`read` returns it. Bytes are
    /// returned in LIFO order; callers only push back bytes they read.
    fn unread(&mut self, byte: u8);

    /// Push back a run of previously read bytes so they are read again in
    /// their original order
    fn unread_slice(&mut self, bytes: &[u8]) {
        for &byte in bytes.iter().rev() {
            self.unread(byte);
        }
    }

    /// Number of bytes consumed so far
    fn position(&self) -> usize;

    /// Whether the source is exhausted
    fn is_eof(&mut self) -> ParseResult<bool> {
        Ok(self.peek()?.is_none())
    }

    /// Release the underlying source. Reads after `close` see end of input.
    fn close(&mut self) -> ParseResult<()> {
        Ok(())
    }
}

impl<C: ByteCursor + ?Sized> ByteCursor for &mut C {
    fn peek(&mut self) -> ParseResult<Option<u8>> {
        (**self).peek()
    }

    fn read(&mut self) -> ParseResult<Option<u8>> {
        (**self).read()
    }

    fn unread(&mut self, byte: u8) {
        (**self).unread(byte)
    }

    fn position(&self) -> usize {
        (**self).position()
    }

    fn is_eof(&mut self) -> ParseResult<bool> {
        (**self).is_eof()
    }

    fn close(&mut self) -> ParseResult<()> {
        (**self).close()
    }
}

/// Cursor over an in-memory buffer
#[derive(Debug, Clone)]
pub struct SliceCursor<'a> {
    input: &'a [u8],
    offset: usize,
    pushback: Vec<u8>,
}

impl<'a> SliceCursor<'a> {
    /// Create a cursor positioned at the start of `input`
    pub fn new(input: &'a [u8]) -> Self {
        Self {
            input,
            offset: 0,
            pushback: Vec::with_capacity(2),
        }
    }
}

impl ByteCursor for SliceCursor<'_> {
    fn peek(&mut self) -> ParseResult<Option<u8>> {
        if let Some(&byte) = self.pushback.last() {
            return Ok(Some(byte));
        }
        Ok(self.input.get(self.offset).copied())
    }

    fn read(&mut self) -> ParseResult<Option<u8>> {
        if let Some(byte) = self.pushback.pop() {
            return Ok(Some(byte));
        }
        let byte = self.input.get(self.offset).copied();
        if byte.is_some() {
            self.offset += 1;
        }
        Ok(byte)
    }

    fn unread(&mut self, byte: u8) {
        self.pushback.push(byte);
    }

    fn position(&self) -> usize {
        self.offset.saturating_sub(self.pushback.len())
    }

    fn close(&mut self) -> ParseResult<()> {
        self.offset = self.input.len();
        self.pushback.clear();
        Ok(())
    }
}

/// Cursor over any [`Read`] implementation, optionally capped at a number
/// of bytes.
#[derive(Debug)]
pub struct ReadCursor<R> {
    reader: Option<BufReader<R>>,
    pushback: Vec<u8>,
    consumed: usize,
    limit: Option<usize>,
}

impl<R: Read> ReadCursor<R> {
    /// Create a cursor reading from `reader`
    pub fn new(reader: R) -> Self {
        Self {
            reader: Some(BufReader::new(reader)),
            pushback: Vec::with_capacity(2),
            consumed: 0,
            limit: None,
        }
    }

    /// Create a cursor that fails once more than `limit` bytes are pulled
    /// from `reader`.
    pub fn with_limit(reader: R, limit: usize) -> Self {
        Self {
            limit: Some(limit),
            ..Self::new(reader)
        }
    }

    fn fetch(&mut self) -> ParseResult<Option<u8>> {
        let Some(reader) = self.reader.as_mut() else {
            return Ok(None);
        };

        let mut buf = [0u8; 1];
        loop {
            match reader.read(&mut buf) {
                Ok(0) => return Ok(None),
                Ok(_) => break,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }

        self.consumed += 1;
        if let Some(limit) = self.limit {
            if self.consumed > limit {
                return Err(std::io::Error::new(
                    ErrorKind::InvalidData,
                    format!("content stream exceeds {limit} bytes"),
                )
                .into());
            }
        }
        Ok(Some(buf[0]))
    }
}

impl<R: Read> ByteCursor for ReadCursor<R> {
    fn peek(&mut self) -> ParseResult<Option<u8>> {
        if let Some(&byte) = self.pushback.last() {
            return Ok(Some(byte));
        }
        let byte = self.fetch()?;
        if let Some(byte) = byte {
            self.pushback.push(byte);
        }
        Ok(byte)
    }

    fn read(&mut self) -> ParseResult<Option<u8>> {
        match self.pushback.pop() {
            Some(byte) => Ok(Some(byte)),
            None => self.fetch(),
        }
    }

    fn unread(&mut self, byte: u8) {
        self.pushback.push(byte);
    }

    fn position(&self) -> usize {
        self.consumed.saturating_sub(self.pushback.len())
    }

    fn close(&mut self) -> ParseResult<()> {
        self.reader = None;
        self.pushback.clear();
        Ok(())
    }
}
