//! Bit-granular sequential I/O layered over a byte-oriented `Read`/`Write`.
//!
//! Bits are emitted and consumed most-significant-bit first within each byte,
//! the same convention `BitArray` uses. `BitWriter` buffers a partial byte
//! until 8 bits accumulate, then flushes a whole byte; the final partial byte
//! (if any) is flushed on `finish`, high bits first, low bits zero-padded.

use crate::bit_array::BitArray;
use crate::{Error, Result};
use std::io::{Read, Write};

/// Bit-granular writer over any byte sink.
pub struct BitWriter<W: Write> {
    inner: Option<W>,
    cur: u8,
    nbits: u8,
}

impl<W: Write> BitWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner: Some(inner),
            cur: 0,
            nbits: 0,
        }
    }

    /// Writes a single bit (MSB-first within the byte being assembled).
    pub fn put_bit(&mut self, bit: bool) -> Result<()> {
        if bit {
            self.cur |= 0x80 >> self.nbits;
        }
        self.nbits += 1;
        if self.nbits == 8 {
            self.flush_byte()?;
        }
        Ok(())
    }

    fn flush_byte(&mut self) -> Result<()> {
        let inner = self.inner.as_mut().expect("writer used after finish");
        inner.write_all(&[self.cur])?;
        self.cur = 0;
        self.nbits = 0;
        Ok(())
    }

    /// Writes a full byte, bit-aligned via the internal buffer.
    pub fn put_char(&mut self, c: u8) -> Result<()> {
        for i in 0..8 {
            self.put_bit(c & (0x80 >> i) != 0)?;
        }
        Ok(())
    }

    /// Writes the first `n` bits of `src`, MSB-first.
    pub fn put_bits(&mut self, src: &BitArray, n: usize) -> Result<()> {
        for bit in src.bits(n) {
            self.put_bit(bit)?;
        }
        Ok(())
    }

    /// Flushes any partial byte (high bits carry the remaining data, low bits
    /// zero-padded) and returns the inner writer.
    pub fn finish(mut self) -> Result<W> {
        self.flush_partial()?;
        Ok(self.inner.take().expect("writer used after finish"))
    }

    fn flush_partial(&mut self) -> Result<()> {
        if self.inner.is_none() {
            return Ok(());
        }
        if self.nbits > 0 {
            // remaining bits are already left-aligned in `cur` (high bits
            // filled first), so no further shift is needed before padding.
            let inner = self.inner.as_mut().expect("checked above");
            inner.write_all(&[self.cur])?;
            self.cur = 0;
            self.nbits = 0;
        }
        Ok(())
    }
}

impl<W: Write> Drop for BitWriter<W> {
    fn drop(&mut self) {
        // Safety net if `finish` was never called: flush whatever partial
        // byte remains so no data is silently lost. Errors are ignored here
        // since `Drop` cannot propagate them; callers that care use `finish`.
        let _ = self.flush_partial();
    }
}

/// Bit-granular reader over any byte source.
pub struct BitReader<R: Read> {
    inner: R,
    cur: u8,
    nbits: u8,
}

impl<R: Read> BitReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            cur: 0,
            nbits: 0,
        }
    }

    /// Reads a single bit. `Ok(None)` signals end-of-stream.
    pub fn get_bit(&mut self) -> Result<Option<bool>> {
        if self.nbits == 0 {
            let mut byte = [0u8; 1];
            let n = self.inner.read(&mut byte)?;
            if n == 0 {
                return Ok(None);
            }
            self.cur = byte[0];
            self.nbits = 8;
        }
        let bit = self.cur & 0x80 != 0;
        self.cur <<= 1;
        self.nbits -= 1;
        Ok(Some(bit))
    }

    /// Reads a full byte, bit-aligned via the internal buffer. `Ok(None)` on
    /// end-of-stream reached before any bit of the byte was read; a stream
    /// that ends mid-byte is always a malformed-input condition in this
    /// crate's callers, so it yields `Err` rather than silently zero-filling
    /// the unread trailing bits.
    pub fn get_char(&mut self) -> Result<Option<u8>> {
        let mut out = 0u8;
        for i in 0..8 {
            match self.get_bit()? {
                Some(bit) => {
                    if bit {
                        out |= 0x80 >> i;
                    }
                }
                None => {
                    if i == 0 {
                        return Ok(None);
                    }
                    return Err(Error::MalformedInput(
                        "stream ended mid-byte".into(),
                    ));
                }
            }
        }
        Ok(Some(out))
    }

    /// Reads `n` bits into a fresh `BitArray` of width `n`. `Ok(None)` if the
    /// stream ends before the first bit.
    pub fn get_bits(&mut self, n: usize) -> Result<Option<BitArray>> {
        let mut out = BitArray::new(n)?;
        for i in 0..n {
            match self.get_bit()? {
                Some(true) => out.set_bit(i)?,
                Some(false) => {}
                None => {
                    if i == 0 {
                        return Ok(None);
                    }
                    return Ok(Some(out));
                }
            }
        }
        Ok(Some(out))
    }
}
