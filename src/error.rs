//! Error types for the arithmetic coder.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Which half of the codec was running when an error surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Encoding: narrowing the interval and emitting bits.
    Encode,
    /// Decoding: narrowing the interval and consuming bits.
    Decode,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Encode => f.write_str("encode"),
            Stage::Decode => f.write_str("decode"),
        }
    }
}

/// Error variants for arithmetic coding operations.
#[derive(Debug, Error)]
pub enum Error {
    /// An I/O error occurred while reading or writing the underlying stream.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream ended before the requested number of bits could be read.
    #[error("short read: requested {requested} bits, only {available} available")]
    ShortRead {
        /// Bits asked for.
        requested: u32,
        /// Bits that were actually left in the stream.
        available: u32,
    },

    /// A coder register no longer fits the configured interval width after a shift.
    #[error("interval overflow during {stage} at symbol {symbol_index}")]
    IntervalOverflow {
        /// Encoder or decoder.
        stage: Stage,
        /// Zero-based index of the symbol being processed.
        symbol_index: u64,
    },

    /// The payload ran out before every symbol declared in the header was decoded.
    #[error("truncated stream: ran out of bits at symbol {symbol_index} of {symbol_count}")]
    Truncated {
        /// Zero-based index of the symbol being decoded.
        symbol_index: u64,
        /// Symbol count from the header.
        symbol_count: u64,
    },

    /// The encoder was finished after a different number of symbols than its header declared.
    #[error("symbol count mismatch: header declared {declared}, encoded {encoded}")]
    SymbolCountMismatch {
        /// Count written into the header.
        declared: u64,
        /// Count actually encoded.
        encoded: u64,
    },

    /// Input and output name the same file; creating the output would destroy the input.
    #[error("input and output are the same file: {}", path.display())]
    SameFile {
        /// The offending output path.
        path: PathBuf,
    },

    /// The coder configuration cannot produce a working codec.
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

/// A specialized Result type for arithmetic coding operations.
pub type Result<T> = std::result::Result<T, Error>;
