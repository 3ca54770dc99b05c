//! # Adaptive Arithmetic Coding
//!
//! *Lossless byte-stream compression with a model learned on the fly.*
//!
//! ## Intuition First
//!
//! Picture the interval `[0, 1)` as a ruler. Every possible message is a
//! point on it. To encode the first byte, cut the ruler into 256 pieces, one
//! per byte value, each as long as that byte's estimated probability, and
//! keep only the piece for the byte you saw. Cut that piece again for the
//! second byte, and so on. After the whole message you hold a tiny interval,
//! and any number inside it identifies the message. Likely bytes shrink the
//! interval less, so they cost fewer bits to pin down.
//!
//! ## The Problem
//!
//! Real rulers have finite precision. After a few dozen bytes the interval
//! is narrower than any machine word can represent. The fix is to keep a
//! fixed-width window `[low, high]` and, as soon as the leading bit of every
//! point in it is settled, emit that bit and double the window:
//!
//! - **E2**: `high < half`. The next bit is 0.
//! - **E1**: `low >= half`. The next bit is 1.
//! - **E3**: the window straddles `half` but sits inside the middle two
//!   quarters. The next bit is not known yet, but it will be followed by its
//!   complement. Count it as pending and double around the midpoint.
//!
//! ## Historical Context
//!
//! ```text
//! 1948  Shannon     Entropy bound; Shannon-Fano-Elias interval codes
//! 1976  Rissanen    Arithmetic coding with finite-precision arithmetic
//! 1976  Pasco       Independent formulation of the same idea
//! 1979  Rubin       Incremental transmission via renormalization
//! 1987  Witten,     Practical integer coder with bits-to-follow (CACM)
//!       Neal,
//!       Cleary
//! 1998  Moffat,     Revisited: shift-add implementations and model structures
//!       Neal,
//!       Witten
//! ```
//!
//! ## Mathematical Formulation
//!
//! With cumulative counts `C(s)` (sum of counts below `s`), total `T`, and
//! window width `w = high - low + 1`, coding symbol `s` narrows to
//!
//! ```text
//! high' = low + floor(C(s+1) * w / T) - 1
//! low'  = low + floor(C(s)   * w / T)
//! ```
//!
//! The decoder inverts this by locating
//! `floor(((value - low + 1) * T - 1) / w)` in the cumulative table.
//!
//! ## Complexity Analysis
//!
//! - **Time**: O(1) amortized interval work per symbol, plus O(log 256) to
//!   look up a symbol and O(256) worst case to update prefix sums.
//! - **Space**: O(1); one 256-entry table per codec.
//!
//! ## Failure Modes
//!
//! 1. **Desynchronized models**: encoder and decoder must apply identical
//!    updates and rescales. Any difference corrupts everything after it.
//! 2. **Precision budget**: the count total must stay below a quarter of the
//!    interval range or some symbols become unrepresentable. [`CoderConfig`]
//!    rejects such combinations.
//!
//! ## Implementation Notes
//!
//! This crate provides:
//! - [`FrequencyTable`]: adaptive counts over the byte alphabet with
//!   halving rescale.
//! - [`Encoder`] / [`Decoder`]: streaming drivers sharing one
//!   renormalization routine.
//! - [`file`]: whole-file helpers behind the `arith` binary.
//!
//! The stream is a 64-bit symbol count followed by the coded payload. No
//! model is transmitted.
//!
//! ```
//! let input = b"abracadabra abracadabra";
//! let packed = arith::encode(input).unwrap();
//! assert_eq!(arith::decode(&packed).unwrap(), input);
//! ```
//!
//! ## References
//!
//! - Witten, I. H., Neal, R. M., Cleary, J. G. (1987). "Arithmetic coding for data compression." CACM 30(6).
//! - Moffat, A., Neal, R. M., Witten, I. H. (1998). "Arithmetic coding revisited." ACM TOIS 16(3).

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod bitio;
mod coder;
pub mod config;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod file;
pub mod table;

pub use coder::CoderState;
pub use config::{CoderConfig, ALPHABET_SIZE};
pub use decoder::{decode, decode_stream, decode_with, read_symbol_count, Decoder};
pub use encoder::{encode, encode_stream, encode_with, Encoder};
pub use error::{Error, Result, Stage};
pub use table::FrequencyTable;
