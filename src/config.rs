//! Coder configuration.
//!
//! None of these values are transmitted in the stream, so encoder and
//! decoder must be built from the same [`CoderConfig`]. They are part of
//! the wire format.

use crate::error::{Error, Result};

/// Number of distinct symbols: one per byte value.
pub const ALPHABET_SIZE: usize = 256;

/// Width of the symbol-count header in bits.
pub const HEADER_BITS: u32 = 64;

/// Fixed-point widths and rescale policy shared by encoder and decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoderConfig {
    interval_bits: u32,
    count_bits: u32,
    rescale_divisor: u64,
}

impl CoderConfig {
    /// Build a validated configuration.
    ///
    /// # Errors
    /// Returns `Error::InvalidConfig` when the widths cannot coexist:
    /// the initial uniform total must sit below the count ceiling, every
    /// symbol must keep a non-empty sub-interval after renormalization,
    /// and `interval * count` products must fit in a `u64`.
    pub fn new(interval_bits: u32, count_bits: u32, rescale_divisor: u64) -> Result<Self> {
        if count_bits < 9 {
            return Err(Error::InvalidConfig(format!(
                "count_bits {count_bits} leaves no room above the initial total {ALPHABET_SIZE}"
            )));
        }
        if interval_bits > 62 {
            return Err(Error::InvalidConfig(format!(
                "interval_bits {interval_bits} exceeds 62"
            )));
        }
        if count_bits + 2 > interval_bits {
            return Err(Error::InvalidConfig(format!(
                "count_bits {count_bits} must be at most interval_bits - 2 ({interval_bits} - 2)"
            )));
        }
        if interval_bits + count_bits > 64 {
            return Err(Error::InvalidConfig(format!(
                "interval_bits + count_bits = {} overflows 64-bit products",
                interval_bits + count_bits
            )));
        }
        if rescale_divisor < 2 {
            return Err(Error::InvalidConfig(format!(
                "rescale_divisor {rescale_divisor} must be at least 2"
            )));
        }
        Ok(Self {
            interval_bits,
            count_bits,
            rescale_divisor,
        })
    }

    /// Bit width of `low`, `high` and `value`.
    pub fn interval_bits(&self) -> u32 {
        self.interval_bits
    }

    /// Bit width bounding the table's total count.
    pub fn count_bits(&self) -> u32 {
        self.count_bits
    }

    /// Divisor applied to every count on rescale.
    pub fn rescale_divisor(&self) -> u64 {
        self.rescale_divisor
    }

    /// Largest representable interval bound, `2^interval_bits - 1`.
    pub fn top(&self) -> u64 {
        (1u64 << self.interval_bits) - 1
    }

    /// `(top + 1) / 4`.
    pub fn first_quarter(&self) -> u64 {
        (self.top() + 1) / 4
    }

    /// `2 * first_quarter`.
    pub fn half(&self) -> u64 {
        self.first_quarter() * 2
    }

    /// `3 * first_quarter`.
    pub fn third_quarter(&self) -> u64 {
        self.first_quarter() * 3
    }

    /// Total count at which the frequency table rescales, `2^count_bits - 1`.
    pub fn max_total_count(&self) -> u64 {
        (1u64 << self.count_bits) - 1
    }
}

impl Default for CoderConfig {
    fn default() -> Self {
        Self {
            interval_bits: 32,
            count_bits: 16,
            rescale_divisor: 2,
        }
    }
}
