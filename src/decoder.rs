//! Adaptive arithmetic decoder.
//!
//! Mirrors [`Encoder`](crate::Encoder) step for step: same narrowing, same
//! renormalization decisions, same table updates. Where the encoder emits a
//! bit the decoder shifts one into `value`.

use std::io::{Read, Write};

use tracing::debug;

use crate::bitio::BitReader;
use crate::coder::{CoderState, Interval, Scale, ScaleAction};
use crate::config::{CoderConfig, HEADER_BITS};
use crate::error::{Error, Result, Stage};
use crate::table::FrequencyTable;

/// Rebases `value` like `low`/`high` and pulls in the next bit.
struct Consume<'a, R: Read> {
    reader: &'a mut BitReader<R>,
    value: &'a mut u64,
}

impl<R: Read> ScaleAction for Consume<'_, R> {
    const STAGE: Stage = Stage::Decode;

    fn scaled(&mut self, _scale: Scale, offset: u64) -> Result<()> {
        let bit = self.reader.read_bit()?;
        *self.value = ((*self.value - offset) << 1) | bit as u64;
        Ok(())
    }

    fn register(&self) -> Option<u64> {
        Some(*self.value)
    }
}

/// Streaming decoder over an `io::Read` source.
pub struct Decoder<R: Read> {
    reader: BitReader<R>,
    table: FrequencyTable,
    interval: Interval,
    value: u64,
    symbol_count: u64,
    decoded: u64,
}

impl<R: Read> Decoder<R> {
    /// Read the header and the initial value window.
    ///
    /// # Errors
    /// Returns `Error::ShortRead` if the stream is too short to hold them.
    pub fn new(inner: R, config: CoderConfig) -> Result<Self> {
        let mut reader = BitReader::new(inner);
        let symbol_count = reader.read_bits(HEADER_BITS)?;
        debug!(symbol_count, "read header");
        let value = reader.read_bits(config.interval_bits())?;
        Ok(Self {
            reader,
            table: FrequencyTable::new(&config),
            interval: Interval::new(&config),
            value,
            symbol_count,
            decoded: 0,
        })
    }

    /// Number of symbols the header declares.
    pub fn symbol_count(&self) -> u64 {
        self.symbol_count
    }

    /// Symbols still to be decoded.
    pub fn remaining(&self) -> u64 {
        self.symbol_count.saturating_sub(self.decoded)
    }

    /// Current working interval.
    pub fn state(&self) -> CoderState {
        self.interval.state()
    }

    /// Current value register; always within [`state`](Self::state).
    pub fn value(&self) -> u64 {
        self.value
    }

    /// The adaptive model as it stands after the last symbol.
    pub fn table(&self) -> &FrequencyTable {
        &self.table
    }

    /// Decode the next symbol.
    ///
    /// Calling this after all declared symbols were produced decodes past
    /// the end of the message; [`remaining`](Self::remaining) bounds the loop.
    ///
    /// # Errors
    /// Returns `Error::Truncated` if the payload runs out of bits.
    pub fn decode_symbol(&mut self) -> Result<u8> {
        let index = self.decoded;
        let symbol_count = self.symbol_count;
        let total = self.table.total();
        let width = self.interval.width();
        let state = self.interval.state();
        debug_assert!(state.low <= self.value && self.value <= state.high);

        let position = ((self.value - state.low + 1) * total - 1) / width;
        let symbol = self.table.symbol_for_position(position);

        self.interval.narrow(
            self.table.interval_start(symbol),
            self.table.interval_end(symbol),
            total,
        );

        let mut consume = Consume {
            reader: &mut self.reader,
            value: &mut self.value,
        };
        self.interval
            .renormalize(&mut consume, index)
            .map_err(|e| match e {
                Error::ShortRead { .. } => Error::Truncated {
                    symbol_index: index,
                    symbol_count,
                },
                other => other,
            })?;

        self.table.update(symbol);
        self.decoded += 1;
        Ok(symbol)
    }
}

impl<R: Read> Iterator for Decoder<R> {
    type Item = Result<u8>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.decoded == self.symbol_count {
            return None;
        }
        Some(self.decode_symbol())
    }
}

/// Read the symbol count from an encoded buffer without decoding it.
pub fn read_symbol_count(encoded: &[u8]) -> Result<u64> {
    BitReader::new(encoded).read_bits(HEADER_BITS)
}

/// Decode a buffer produced by [`encode`](crate::encode).
pub fn decode(encoded: &[u8]) -> Result<Vec<u8>> {
    decode_with(encoded, CoderConfig::default())
}

/// Decode a buffer with an explicit configuration.
pub fn decode_with(encoded: &[u8], config: CoderConfig) -> Result<Vec<u8>> {
    let decoder = Decoder::new(encoded, config)?;
    // A corrupt header must not drive the allocation.
    let capacity = decoder.symbol_count().min(encoded.len() as u64 * 8) as usize;
    let mut output = Vec::with_capacity(capacity);
    for symbol in decoder {
        output.push(symbol?);
    }
    Ok(output)
}

/// Decode from `reader` into `writer`, returning the number of bytes written.
pub fn decode_stream<R: Read, W: Write>(
    reader: R,
    mut writer: W,
    config: CoderConfig,
) -> Result<u64> {
    let decoder = Decoder::new(reader, config)?;
    let count = decoder.symbol_count();
    let mut buf = Vec::with_capacity(8192);
    for symbol in decoder {
        buf.push(symbol?);
        if buf.len() == buf.capacity() {
            writer.write_all(&buf)?;
            buf.clear();
        }
    }
    writer.write_all(&buf)?;
    writer.flush()?;
    debug!(symbols = count, "finished decoding");
    Ok(count)
}
