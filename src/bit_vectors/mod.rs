//! Bit vectors with rank/select support.
//!
//! # Introduction
//!
//! Let $`S \subseteq \{ 0,1,\dots,u-1 \}`$ be a set of positions
//! at which bits are set in a bit vector of length $`u`$.
//! Our bit vectors support the following queries:
//!
//! - $`\textrm{Access}(i)`$ returns `true` if $`i \in S`$ or `false` otherwise
//!   (implemented by [`Access`]).
//! - $`\textrm{Rank}(i)`$ returns the cardinality of $`\{ x \in S \mid x < i \}`$
//!   (implemented by [`Rank`]).
//! - $`\textrm{Select}(k)`$ returns the $`k`$-th smallest position in $`S`$
//!   (implemented by [`Select`]).
//!
//! # Data structures
//!
//! | Implementation | Space (bits) | Use |
//! | --- | --- | --- |
//! | [`BitVector<Rank9SelIndex>`] | $`u + o(u)`$ | wavelet matrix layers, dense run markers |
//! | [`SdVector`] | $`k \lceil \lg (u/k) \rceil + 2k + o(k)`$ | sparse run markers |
//!
//! [`SdVector`] is the default marker representation of the run-length
//! encoded BWT; [`DenseVector`] is the plain alternative trading space
//! for constant-time rank. Both close the [`MarkerBits`] construction
//! seam so the higher layers stay agnostic of the choice.
pub mod bit_vector;
pub mod rank9sel;
pub mod sd_vector;

pub use bit_vector::{BitVector, BitVectorData, BitVectorIndex, NoIndex};
pub use rank9sel::Rank9SelIndex;
pub use sd_vector::{DenseVector, SdVector};

use crate::serialization::Serialize;

/// Interface for reporting basic statistics of a bit vector.
pub trait NumBits {
    /// Returns the number of bits stored.
    fn num_bits(&self) -> usize;

    /// Returns the number of bits set.
    fn num_ones(&self) -> usize;

    /// Returns the number of bits unset.
    #[inline(always)]
    fn num_zeros(&self) -> usize {
        self.num_bits() - self.num_ones()
    }
}

/// Interface for accessing elements on bit arrays.
pub trait Access {
    /// Returns the `pos`-th bit, or [`None`] if out of bounds.
    fn access(&self, pos: usize) -> Option<bool>;
}

/// Interface for rank queries on bit vectors.
pub trait Rank {
    /// Returns the number of ones in `[0, pos)`, or [`None`] if
    /// `pos` exceeds the number of bits.
    fn rank1(&self, pos: usize) -> Option<usize>;

    /// Returns the number of zeros in `[0, pos)`, or [`None`] if
    /// `pos` exceeds the number of bits.
    fn rank0(&self, pos: usize) -> Option<usize>;
}

/// Interface for select queries on bit vectors.
pub trait Select {
    /// Returns the position of the `k`-th one, or [`None`] if fewer
    /// than `k + 1` bits are set.
    fn select1(&self, k: usize) -> Option<usize>;

    /// Returns the position of the `k`-th zero, or [`None`] if fewer
    /// than `k + 1` bits are unset.
    fn select0(&self, k: usize) -> Option<usize>;
}

/// Construction contract for the run-marker bitvectors of the
/// run-length encoded BWT.
///
/// Implementors are immutable rank/select dictionaries built once from
/// a bit stream.
pub trait MarkerBits: NumBits + Access + Rank + Select + Serialize {
    /// Builds the dictionary from a stream of bits.
    fn from_bits<I>(bits: I) -> Self
    where
        I: IntoIterator<Item = bool>;
}
