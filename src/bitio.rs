//! MSB-first bit I/O over byte streams.
//!
//! Neither side buffers more than one partial byte; wrap files in
//! `BufReader`/`BufWriter` before handing them over.

use std::io::{ErrorKind, Read, Write};

use crate::error::{Error, Result};

/// Writes bits most-significant first into an `io::Write` sink.
#[derive(Debug)]
pub struct BitWriter<W: Write> {
    inner: W,
    /// Partial byte, filled from the low end and shifted up.
    current: u8,
    /// Bits held in `current` (0..8).
    filled: u8,
    bits_written: u64,
}

impl<W: Write> BitWriter<W> {
    /// Create a writer with an empty partial byte.
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            current: 0,
            filled: 0,
            bits_written: 0,
        }
    }

    /// Write a single bit.
    #[inline]
    pub fn write_bit(&mut self, bit: bool) -> Result<()> {
        self.current = (self.current << 1) | bit as u8;
        self.filled += 1;
        self.bits_written += 1;
        if self.filled == 8 {
            self.inner.write_all(&[self.current])?;
            self.current = 0;
            self.filled = 0;
        }
        Ok(())
    }

    /// Write `bit` followed by `follow` copies of its complement.
    pub fn write_bit_with_follow(&mut self, bit: bool, follow: u64) -> Result<()> {
        self.write_bit(bit)?;
        for _ in 0..follow {
            self.write_bit(!bit)?;
        }
        Ok(())
    }

    /// Write the low `n` bits of `value`, most significant first.
    pub fn write_bits(&mut self, value: u64, n: u32) -> Result<()> {
        debug_assert!(n <= 64);
        for shift in (0..n).rev() {
            self.write_bit((value >> shift) & 1 == 1)?;
        }
        Ok(())
    }

    /// Total bits written, padding excluded.
    pub fn bits_written(&self) -> u64 {
        self.bits_written
    }

    /// Pad the partial byte with zeros, write it out, and flush the sink.
    pub fn flush(&mut self) -> Result<()> {
        if self.filled > 0 {
            let byte = self.current << (8 - self.filled);
            self.inner.write_all(&[byte])?;
            self.current = 0;
            self.filled = 0;
        }
        self.inner.flush()?;
        Ok(())
    }

    /// Flush and hand back the sink.
    pub fn into_inner(mut self) -> Result<W> {
        self.flush()?;
        Ok(self.inner)
    }
}

/// Reads bits most-significant first from an `io::Read` source.
#[derive(Debug)]
pub struct BitReader<R: Read> {
    inner: R,
    current: u8,
    /// Unread bits left in `current`.
    remaining: u8,
    bits_read: u64,
}

impl<R: Read> BitReader<R> {
    /// Create a reader positioned at the first bit of `inner`.
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            current: 0,
            remaining: 0,
            bits_read: 0,
        }
    }

    /// Read one bit, or `None` at end of stream.
    fn next_bit(&mut self) -> Result<Option<bool>> {
        if self.remaining == 0 {
            let mut byte = [0u8; 1];
            match self.inner.read_exact(&mut byte) {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::UnexpectedEof => return Ok(None),
                Err(e) => return Err(e.into()),
            }
            self.current = byte[0];
            self.remaining = 8;
        }
        self.remaining -= 1;
        self.bits_read += 1;
        Ok(Some((self.current >> self.remaining) & 1 == 1))
    }

    /// Read a single bit.
    ///
    /// # Errors
    /// Returns `Error::ShortRead` at end of stream.
    #[inline]
    pub fn read_bit(&mut self) -> Result<bool> {
        self.next_bit()?.ok_or(Error::ShortRead {
            requested: 1,
            available: 0,
        })
    }

    /// Read `n` bits into the low end of the result, most significant first.
    ///
    /// # Errors
    /// Returns `Error::ShortRead` if fewer than `n` bits remain.
    pub fn read_bits(&mut self, n: u32) -> Result<u64> {
        debug_assert!(n <= 64);
        let mut value = 0u64;
        for got in 0..n {
            match self.next_bit()? {
                Some(bit) => value = (value << 1) | bit as u64,
                None => {
                    return Err(Error::ShortRead {
                        requested: n,
                        available: got,
                    })
                }
            }
        }
        Ok(value)
    }

    /// Total bits consumed so far.
    pub fn bits_read(&self) -> u64 {
        self.bits_read
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_msb_first_with_zero_padding() {
        let mut writer = BitWriter::new(Vec::new());
        writer.write_bits(0b101, 3).unwrap();
        writer.write_bits(0b11, 2).unwrap();
        assert_eq!(writer.bits_written(), 5);
        assert_eq!(writer.into_inner().unwrap(), vec![0b1011_1000]);
    }

    #[test]
    fn test_follow_bits_are_complemented() {
        let mut writer = BitWriter::new(Vec::new());
        writer.write_bit_with_follow(false, 3).unwrap();
        writer.write_bit_with_follow(true, 3).unwrap();
        assert_eq!(writer.into_inner().unwrap(), vec![0b0111_1000]);
    }

    #[test]
    fn test_header_is_big_endian() {
        let mut writer = BitWriter::new(Vec::new());
        writer.write_bits(0x0102_0304_0506_0708, 64).unwrap();
        let bytes = writer.into_inner().unwrap();
        assert_eq!(bytes, vec![1, 2, 3, 4, 5, 6, 7, 8]);

        let mut reader = BitReader::new(bytes.as_slice());
        assert_eq!(reader.read_bits(64).unwrap(), 0x0102_0304_0506_0708);
    }

    #[test]
    fn test_short_read_reports_available_bits() {
        let mut reader = BitReader::new(&[0xFFu8][..]);
        assert_eq!(reader.read_bits(3).unwrap(), 0b111);
        match reader.read_bits(8) {
            Err(Error::ShortRead {
                requested,
                available,
            }) => {
                assert_eq!(requested, 8);
                assert_eq!(available, 5);
            }
            other => panic!("expected short read, got {other:?}"),
        }
        assert!(matches!(reader.read_bit(), Err(Error::ShortRead { .. })));
    }

    proptest! {
        #[test]
        fn prop_bit_groups_read_back(
            groups in prop::collection::vec((any::<u64>(), 0u32..=64), 0..40),
        ) {
            let mut writer = BitWriter::new(Vec::new());
            for &(value, n) in &groups {
                writer.write_bits(value, n).unwrap();
            }
            let bytes = writer.into_inner().unwrap();

            let mut reader = BitReader::new(bytes.as_slice());
            for &(value, n) in &groups {
                let mask = if n == 64 { u64::MAX } else { (1u64 << n) - 1 };
                prop_assert_eq!(reader.read_bits(n).unwrap(), value & mask);
            }
        }
    }
}
