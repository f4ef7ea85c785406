//! # Matching statistics over a run-length encoded BWT
//!
//! Matchstats computes **matching statistics pointers** of query
//! patterns against highly repetitive texts, using an r-index style
//! representation of the Burrows-Wheeler Transform augmented with
//! per-run thresholds and suffix-array samples.
//!
//! For every position `k` of a pattern `P`, a query reports a text
//! position beginning an occurrence whose common prefix with `P[k..]`
//! is longest among all suffixes starting with `P[k]`. The index is
//! built once from precomputed artifacts and answers each query in
//! time proportional to the pattern length, in space proportional to
//! the number $`r`$ of BWT runs rather than the text length $`n`$ —
//! practical for gigabase-scale collections such as pangenomes and
//! versioned corpora.
//!
//! ## Design policy
//!
//! - **Run-compressed throughout:** every component is $`O(r)`$ words;
//!   nothing materializes the text or the full BWT.
//! - **Immutable after construction:** queries take `&self` and may run
//!   concurrently without synchronization.
//! - **Total queries:** after a successful build, no pattern can make
//!   [`MsIndex::query`] fail.
//! - **Pure Rust, 64-bit targets.**
//!
//! ## Components
//!
//! - [`bit_vectors`] — rank/select dictionaries: plain bits with a
//!   rank9 index and Elias-Fano sparse vectors.
//! - [`int_vectors`] — fixed-width packed integers.
//! - [`char_sequences`] — a byte wavelet matrix for the run heads.
//! - [`rlbwt`] — the run-length encoded BWT.
//! - [`samples`] — loaders for suffix-array samples and thresholds.
//! - [`index`] + the query scan — the matching statistics index.
//!
//! ## Input artifacts
//!
//! [`MsIndex::from_files`] consumes four little-endian files produced
//! by an external construction pipeline: `<prefix>.bwt` (raw BWT bytes,
//! byte `0` absent, byte `1` the terminator), `<prefix>.ssa` and
//! `<prefix>.esa` (suffix-array samples at run starts and ends, as
//! pairs of 5-byte integers), and `<prefix>.thr_pos` (per-run
//! thresholds, 5 bytes each).
//!
//! ## Example
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use matchstats::MsIndex;
//!
//! let index: MsIndex = MsIndex::from_files("data/chr21")?;
//! let pointers = index.query(b"GATTACA");
//! assert_eq!(pointers.len(), 7);
//! # Ok(())
//! # }
//! ```
#![deny(missing_docs)]

#[cfg(not(target_pointer_width = "64"))]
compile_error!("`target_pointer_width` must be 64");

pub mod bit_vectors;
pub mod broadword;
pub mod char_sequences;
pub mod error;
pub mod index;
pub mod int_vectors;
pub mod query;
pub mod rlbwt;
pub mod samples;
pub mod serialization;
pub mod utils;

pub use bit_vectors::{DenseVector, SdVector};
pub use error::{Error, Result};
pub use index::MsIndex;
pub use rlbwt::RleBwt;
pub use serialization::Serialize;

/// Byte value reserved as the unique end-of-text sentinel.
///
/// Byte `0` must never appear in a BWT handed to this crate; builders
/// remap any byte `<= 1` to this value.
pub const TERMINATOR: u8 = 1;

/// Width in bytes of one suffix-array sample integer in `.ssa`/`.esa`
/// files.
pub const SSABYTES: usize = 5;

/// Width in bytes of one threshold record in `.thr_pos` files.
pub const THRBYTES: usize = 5;

/// Width in bytes of one run length in run-length encoded BWT inputs.
pub const LENBYTES: usize = 5;
