//! Working interval and the renormalization loop shared by both drivers.
//!
//! Encoder and decoder must make identical E1/E2/E3 decisions on identical
//! `[low, high]` values, so the decision logic lives here once. What
//! differs is what happens on each doubling: the encoder emits bits, the
//! decoder pulls bits into its value register. That part is a
//! [`ScaleAction`].

use crate::config::CoderConfig;
use crate::error::{Error, Result, Stage};

/// Inclusive bounds of the working interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoderState {
    /// Lower bound.
    pub low: u64,
    /// Upper bound.
    pub high: u64,
}

/// Which rescaling rule fired during a renormalization step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Scale {
    /// E2: interval entirely in the lower half. Next bit is 0.
    Lower,
    /// E1: interval entirely in the upper half. Next bit is 1.
    Upper,
    /// E3: interval straddles the midpoint inside the middle quarters.
    Middle,
}

/// Per-doubling side effect: emit a bit or consume one.
pub(crate) trait ScaleAction {
    const STAGE: Stage;

    /// Called after `low` and `high` have been rebased by `offset` and doubled.
    fn scaled(&mut self, scale: Scale, offset: u64) -> Result<()>;

    /// Any additional register that must stay within `top` after a shift.
    fn register(&self) -> Option<u64> {
        None
    }
}

/// Fixed-point interval `[low, high]` within `[0, top]`.
#[derive(Debug, Clone)]
pub(crate) struct Interval {
    low: u64,
    high: u64,
    top: u64,
    first_quarter: u64,
    half: u64,
    third_quarter: u64,
}

impl Interval {
    pub(crate) fn new(config: &CoderConfig) -> Self {
        Self {
            low: 0,
            high: config.top(),
            top: config.top(),
            first_quarter: config.first_quarter(),
            half: config.half(),
            third_quarter: config.third_quarter(),
        }
    }

    pub(crate) fn state(&self) -> CoderState {
        CoderState {
            low: self.low,
            high: self.high,
        }
    }

    #[inline]
    pub(crate) fn low(&self) -> u64 {
        self.low
    }

    #[inline]
    pub(crate) fn first_quarter(&self) -> u64 {
        self.first_quarter
    }

    /// Width of the interval, `high - low + 1`.
    #[inline]
    pub(crate) fn width(&self) -> u64 {
        self.high - self.low + 1
    }

    /// Shrink to the sub-interval `[start, end)` of `total`.
    ///
    /// Truncating division here must match on both sides bit for bit.
    #[inline]
    pub(crate) fn narrow(&mut self, start: u64, end: u64, total: u64) {
        let width = self.width();
        self.high = self.low + end * width / total - 1;
        self.low += start * width / total;
    }

    /// Double the interval until it straddles the midpoint widely enough.
    pub(crate) fn renormalize<A: ScaleAction>(
        &mut self,
        action: &mut A,
        symbol_index: u64,
    ) -> Result<()> {
        loop {
            let (scale, offset) = if self.high < self.half {
                (Scale::Lower, 0)
            } else if self.low >= self.half {
                (Scale::Upper, self.half)
            } else if self.low >= self.first_quarter && self.high < self.third_quarter {
                (Scale::Middle, self.first_quarter)
            } else {
                return Ok(());
            };

            self.low = (self.low - offset) << 1;
            self.high = ((self.high - offset) << 1) | 1;
            action.scaled(scale, offset)?;

            let register_fits = action.register().map_or(true, |r| r & self.top == r);
            if self.low & self.top != self.low || self.high & self.top != self.high || !register_fits
            {
                return Err(Error::IntervalOverflow {
                    stage: A::STAGE,
                    symbol_index,
                });
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn set(&mut self, low: u64, high: u64) {
        self.low = low;
        self.high = high;
    }
}
