//! Integer vectors in packed form.
//!
//! [`CompactVector`] stores a sequence of $`n`$ integers from $`[0, u)`$
//! in $`n \lceil \lg u \rceil`$ bits. The crate uses it for the per-run
//! suffix-array samples and for the low halves of Elias-Fano encoded
//! bitvectors.
pub mod compact_vector;

pub use compact_vector::CompactVector;
