//! Adaptive frequency table.
//!
//! Maps each byte to a sub-range of `[0, total)` proportional to how often
//! it has been seen so far. Encoder and decoder each own one and update it
//! with the same symbol after every step, so the model never has to be
//! transmitted.
//!
//! `cumulative` is zero-indexed with a leading sentinel: `cumulative[0] = 0`
//! and `cumulative[s + 1] = cumulative[s] + count[s]`, so symbol `s` owns
//! `[cumulative[s], cumulative[s + 1])` and `cumulative[256] == total`.

use tracing::trace;

use crate::config::{CoderConfig, ALPHABET_SIZE};

/// Per-symbol counts and their prefix sums over the byte alphabet.
#[derive(Clone, Debug)]
pub struct FrequencyTable {
    counts: [u64; ALPHABET_SIZE],
    cumulative: [u64; ALPHABET_SIZE + 1],
    total: u64,
    max_total: u64,
    divisor: u64,
    rescales: u64,
}

impl FrequencyTable {
    /// Create a table with every count set to 1.
    pub fn new(config: &CoderConfig) -> Self {
        let mut table = Self {
            counts: [1; ALPHABET_SIZE],
            cumulative: [0; ALPHABET_SIZE + 1],
            total: ALPHABET_SIZE as u64,
            max_total: config.max_total_count(),
            divisor: config.rescale_divisor(),
            rescales: 0,
        };
        table.rebuild_from(0);
        table
    }

    /// Cumulative upper bound of `symbol`'s range (exclusive).
    #[inline]
    pub fn interval_end(&self, symbol: u8) -> u64 {
        self.cumulative[symbol as usize + 1]
    }

    /// Cumulative lower bound of `symbol`'s range; 0 for symbol 0.
    #[inline]
    pub fn interval_start(&self, symbol: u8) -> u64 {
        self.cumulative[symbol as usize]
    }

    /// Sum of all counts, the normalizing denominator.
    #[inline]
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Current count of `symbol`. Never zero.
    pub fn count(&self, symbol: u8) -> u64 {
        self.counts[symbol as usize]
    }

    /// Prefix sums, `ALPHABET_SIZE + 1` entries starting with the 0 sentinel.
    pub fn cumulative(&self) -> &[u64] {
        &self.cumulative
    }

    /// Number of rescales performed so far.
    pub fn rescales(&self) -> u64 {
        self.rescales
    }

    /// Find the symbol whose range contains `position`.
    ///
    /// Returns the smallest `s` with `interval_end(s) > position`.
    /// `position` must be below [`total`](Self::total).
    pub fn symbol_for_position(&self, position: u64) -> u8 {
        debug_assert!(position < self.total, "position {position} >= total {}", self.total);
        let index = self.cumulative[1..].partition_point(|&end| end <= position);
        index.min(ALPHABET_SIZE - 1) as u8
    }

    /// Record one more occurrence of `symbol`, rescaling if the total hits the ceiling.
    pub fn update(&mut self, symbol: u8) {
        let s = symbol as usize;
        self.counts[s] += 1;
        self.total += 1;

        if self.total >= self.max_total {
            self.rescale();
            return;
        }

        self.rebuild_from(s);
    }

    fn rescale(&mut self) {
        let before = self.total;
        self.total = 0;
        for count in self.counts.iter_mut() {
            *count = (*count / self.divisor).max(1);
            self.total += *count;
        }
        self.rebuild_from(0);
        self.rescales += 1;
        trace!(before, after = self.total, rescales = self.rescales, "rescaled frequency table");
    }

    /// Recompute prefix sums for `from` and every symbol above it.
    fn rebuild_from(&mut self, from: usize) {
        for s in from..ALPHABET_SIZE {
            self.cumulative[s + 1] = self.cumulative[s] + self.counts[s];
        }
    }
}
