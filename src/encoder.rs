//! Adaptive arithmetic encoder.
//!
//! Output layout: a 64-bit big-endian symbol count, then the coded
//! payload, then the final `low` register in full, zero-padded to a byte.

use std::io::{Read, Write};

use tracing::debug;

use crate::bitio::BitWriter;
use crate::coder::{CoderState, Interval, Scale, ScaleAction};
use crate::config::{CoderConfig, HEADER_BITS};
use crate::error::{Error, Result, Stage};
use crate::table::FrequencyTable;

/// Emits the determined bit on E1/E2, defers one on E3.
struct Emit<'a, W: Write> {
    writer: &'a mut BitWriter<W>,
    bits_to_follow: &'a mut u64,
}

impl<W: Write> ScaleAction for Emit<'_, W> {
    const STAGE: Stage = Stage::Encode;

    fn scaled(&mut self, scale: Scale, _offset: u64) -> Result<()> {
        match scale {
            Scale::Lower => {
                self.writer.write_bit_with_follow(false, *self.bits_to_follow)?;
                *self.bits_to_follow = 0;
            }
            Scale::Upper => {
                self.writer.write_bit_with_follow(true, *self.bits_to_follow)?;
                *self.bits_to_follow = 0;
            }
            Scale::Middle => *self.bits_to_follow += 1,
        }
        Ok(())
    }
}

/// Streaming encoder over an `io::Write` sink.
///
/// The symbol count goes into the header up front, so it must be known
/// before the first byte is encoded.
pub struct Encoder<W: Write> {
    writer: BitWriter<W>,
    table: FrequencyTable,
    interval: Interval,
    bits_to_follow: u64,
    config: CoderConfig,
    declared: u64,
    encoded: u64,
}

impl<W: Write> Encoder<W> {
    /// Create an encoder and write the header for `symbol_count` symbols.
    pub fn new(inner: W, config: CoderConfig, symbol_count: u64) -> Result<Self> {
        let mut writer = BitWriter::new(inner);
        writer.write_bits(symbol_count, HEADER_BITS)?;
        debug!(symbol_count, "wrote header");
        Ok(Self {
            writer,
            table: FrequencyTable::new(&config),
            interval: Interval::new(&config),
            bits_to_follow: 0,
            config,
            declared: symbol_count,
            encoded: 0,
        })
    }

    /// Encode one byte.
    pub fn encode_symbol(&mut self, symbol: u8) -> Result<()> {
        let total = self.table.total();
        self.interval.narrow(
            self.table.interval_start(symbol),
            self.table.interval_end(symbol),
            total,
        );

        let mut emit = Emit {
            writer: &mut self.writer,
            bits_to_follow: &mut self.bits_to_follow,
        };
        self.interval.renormalize(&mut emit, self.encoded)?;

        self.table.update(symbol);
        self.encoded += 1;
        Ok(())
    }

    /// Encode every byte of `symbols` in order.
    pub fn encode_all(&mut self, symbols: &[u8]) -> Result<()> {
        for &symbol in symbols {
            self.encode_symbol(symbol)?;
        }
        Ok(())
    }

    /// Current working interval.
    pub fn state(&self) -> CoderState {
        self.interval.state()
    }

    /// Opposite-polarity bits deferred by middle-quarter scaling.
    pub fn pending_bits(&self) -> u64 {
        self.bits_to_follow
    }

    /// Symbols encoded so far.
    pub fn symbols_encoded(&self) -> u64 {
        self.encoded
    }

    /// The adaptive model as it stands after the last symbol.
    pub fn table(&self) -> &FrequencyTable {
        &self.table
    }

    /// Terminate the final interval, flush, and return the sink.
    ///
    /// # Errors
    /// Returns `Error::SymbolCountMismatch` if the number of encoded symbols
    /// differs from the count written in the header.
    pub fn finish(mut self) -> Result<W> {
        if self.encoded != self.declared {
            return Err(Error::SymbolCountMismatch {
                declared: self.declared,
                encoded: self.encoded,
            });
        }

        self.bits_to_follow += 1;
        let bit = self.interval.low() >= self.interval.first_quarter();
        self.writer.write_bit_with_follow(bit, self.bits_to_follow)?;
        self.bits_to_follow = 0;
        self.writer
            .write_bits(self.interval.low(), self.config.interval_bits())?;

        debug!(
            symbols = self.encoded,
            bits = self.writer.bits_written(),
            rescales = self.table.rescales(),
            "finished encoding"
        );
        self.writer.into_inner()
    }
}

/// Encode `input` with the default configuration.
pub fn encode(input: &[u8]) -> Result<Vec<u8>> {
    encode_with(input, CoderConfig::default())
}

/// Encode `input` with an explicit configuration.
pub fn encode_with(input: &[u8], config: CoderConfig) -> Result<Vec<u8>> {
    let sink = Vec::with_capacity(input.len() / 2 + 16);
    let mut encoder = Encoder::new(sink, config, input.len() as u64)?;
    encoder.encode_all(input)?;
    encoder.finish()
}

/// Encode exactly `len` bytes pulled from `reader` into `writer`.
pub fn encode_stream<R: Read, W: Write>(
    mut reader: R,
    len: u64,
    writer: W,
    config: CoderConfig,
) -> Result<W> {
    let mut encoder = Encoder::new(writer, config, len)?;
    let mut buf = [0u8; 8192];
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        encoder.encode_all(&buf[..n])?;
    }
    encoder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_layout() {
        let encoded = encode(&[]).unwrap();
        // header, terminator, one follow bit, 32-bit low: 98 bits -> 13 bytes.
        assert_eq!(encoded.len(), 13);
        assert_eq!(&encoded[..8], &[0u8; 8]);
        // low = 0 < first quarter, so the terminator is 0 then one follow bit 1.
        assert_eq!(encoded[8], 0b0100_0000);
        assert_eq!(&encoded[9..], &[0, 0, 0, 0]);
    }

    #[test]
    fn test_state_stays_normalized() {
        let config = CoderConfig::default();
        let mut encoder = Encoder::new(Vec::new(), config, 64).unwrap();
        for i in 0..64u8 {
            encoder.encode_symbol(i.wrapping_mul(37)).unwrap();
            let state = encoder.state();
            assert!(state.low < config.half());
            assert!(state.high >= config.half());
            assert!(state.high - state.low > config.first_quarter());
        }
        assert_eq!(encoder.symbols_encoded(), 64);
        assert_eq!(encoder.table().total(), 256 + 64);
    }

    #[test]
    fn test_middle_scaling_defers_bits() {
        let config = CoderConfig::new(16, 10, 2).unwrap();
        let mut encoder = Encoder::new(Vec::new(), config, 2).unwrap();
        // Symbol 0 sits in the lower half: eight E1 shifts, nothing deferred.
        encoder.encode_symbol(0).unwrap();
        assert_eq!(encoder.pending_bits(), 0);
        // With total 257, symbol 127 owns [0x7F80, 0x807E] and straddles the
        // midpoint until the interval is wide again.
        encoder.encode_symbol(127).unwrap();
        assert_eq!(encoder.pending_bits(), 8);
        assert_eq!(encoder.state().low, 0);
        assert_eq!(encoder.state().high, 0xFEFF);
        // header, 8 payload bits, terminator + 9 follow bits, 16-bit low.
        assert_eq!(encoder.finish().unwrap().len(), 13);
    }

    #[test]
    fn test_finish_rejects_count_mismatch() {
        let mut encoder = Encoder::new(Vec::new(), CoderConfig::default(), 3).unwrap();
        encoder.encode_all(b"ab").unwrap();
        assert!(matches!(
            encoder.finish(),
            Err(Error::SymbolCountMismatch {
                declared: 3,
                encoded: 2
            })
        ));
    }

    #[test]
    fn test_stream_matches_slice() {
        let input: Vec<u8> = (0..20_000u32).map(|i| (i % 251) as u8).collect();
        let streamed =
            encode_stream(input.as_slice(), input.len() as u64, Vec::new(), CoderConfig::default())
                .unwrap();
        assert_eq!(streamed, encode(&input).unwrap());
    }
}
