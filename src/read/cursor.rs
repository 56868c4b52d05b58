//! Endian-aware scalar reads over an in-memory byte buffer.
//!
//! A `ByteCursor` is the one source of truth for "where are we" while
//! decoding. Every read advances it by exactly the width of the field, and
//! every read that would run off the end of the buffer fails with
//! `TruncatedInput` instead of panicking.

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use thiserror::Error;

/// Byte order of a multi-byte field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    Big,
    Little,
}

/// A read asked for more bytes than the buffer holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("truncated input at byte {offset}: wanted {wanted} bytes, only {available} remain")]
pub struct TruncatedInput {
    pub offset: usize,
    pub wanted: usize,
    pub available: usize,
}

#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    buf: &'a [u8],
    pos: usize,
    /// Added to `pos` when reporting offsets, so a cursor over a slice of a
    /// file still reports file offsets.
    base: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(buf: &'a [u8]) -> ByteCursor<'a> {
        ByteCursor { buf: buf, pos: 0, base: 0 }
    }

    /// A cursor over `buf`, whose first byte sits at `base` in some larger
    /// file.
    pub fn with_base(buf: &'a [u8], base: usize) -> ByteCursor<'a> {
        ByteCursor { buf: buf, pos: 0, base: base }
    }

    /// Position relative to the start of this cursor's buffer.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Position in file terms (including the base).
    pub fn offset(&self) -> usize {
        self.base + self.pos
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Returns the next `n` bytes and advances past them.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], TruncatedInput> {
        if n > self.remaining() {
            return Err(TruncatedInput {
                offset: self.offset(),
                wanted: n,
                available: self.remaining(),
            });
        }

        let ret = &self.buf[self.pos .. self.pos + n];
        self.pos += n;
        Ok(ret)
    }

    pub fn skip(&mut self, n: usize) -> Result<(), TruncatedInput> {
        self.read_bytes(n).map(|_| ())
    }

    pub fn read_u8(&mut self) -> Result<u8, TruncatedInput> {
        Ok(self.read_bytes(1)?[0])
    }

    pub fn read_i16(&mut self, endian: Endian) -> Result<i16, TruncatedInput> {
        let b = self.read_bytes(2)?;
        Ok(match endian {
            Endian::Big => BigEndian::read_i16(b),
            Endian::Little => LittleEndian::read_i16(b),
        })
    }

    pub fn read_u16(&mut self, endian: Endian) -> Result<u16, TruncatedInput> {
        let b = self.read_bytes(2)?;
        Ok(match endian {
            Endian::Big => BigEndian::read_u16(b),
            Endian::Little => LittleEndian::read_u16(b),
        })
    }

    pub fn read_i32(&mut self, endian: Endian) -> Result<i32, TruncatedInput> {
        let b = self.read_bytes(4)?;
        Ok(match endian {
            Endian::Big => BigEndian::read_i32(b),
            Endian::Little => LittleEndian::read_i32(b),
        })
    }

    pub fn read_u32(&mut self, endian: Endian) -> Result<u32, TruncatedInput> {
        let b = self.read_bytes(4)?;
        Ok(match endian {
            Endian::Big => BigEndian::read_u32(b),
            Endian::Little => LittleEndian::read_u32(b),
        })
    }

    pub fn read_f64(&mut self, endian: Endian) -> Result<f64, TruncatedInput> {
        let b = self.read_bytes(8)?;
        Ok(match endian {
            Endian::Big => BigEndian::read_f64(b),
            Endian::Little => LittleEndian::read_f64(b),
        })
    }

    /// Reads `n` bytes as a fixed-width field. The bytes are returned raw:
    /// the caller decides how to turn them into text.
    pub fn read_fixed_string(&mut self, n: usize) -> Result<&'a [u8], TruncatedInput> {
        self.read_bytes(n)
    }
}
