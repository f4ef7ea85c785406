//! Sparse bitvectors in Elias-Fano form, plus a plain dense alternative.

use std::io::{Read, Write};

use crate::bit_vectors::bit_vector::{BitVector, BitVectorData};
use crate::bit_vectors::rank9sel::Rank9SelIndex;
use crate::bit_vectors::{Access, MarkerBits, NumBits, Rank, Select};
use crate::broadword;
use crate::error::Result;
use crate::int_vectors::CompactVector;
use crate::serialization::Serialize;

/// Sparse bitvector over $`[0, u)`$ with $`k`$ set bits in Elias-Fano form.
///
/// Set positions are split into upper parts, unary-coded into a plain
/// bit vector with a rank9 index, and `⌊lg(u/k)⌋` low bits per element
/// packed in a [`CompactVector`].
///
/// # Complexity
///
/// [`select1`](Select::select1) runs in $`O(\lg u)`$ dominated by the
/// hinted high-bits selection; [`rank1`](Rank::rank1) locates the
/// high-bits bucket with one `select0` and binary-searches the low
/// parts, in $`O(\lg u)`$ overall. [`access`](Access::access) is two
/// rank queries.
///
/// # Examples
///
/// ```
/// use matchstats::bit_vectors::{MarkerBits, NumBits, Rank, Select, SdVector};
///
/// let sv = SdVector::from_bits([true, false, false, true, false]);
///
/// assert_eq!(sv.num_bits(), 5);
/// assert_eq!(sv.num_ones(), 2);
/// assert_eq!(sv.rank1(4), Some(2));
/// assert_eq!(sv.select1(1), Some(3));
/// ```
///
/// # References
///
/// - D. Okanohara, and K. Sadakane, "Practical Entropy-Compressed
///   Rank/Select Dictionary," In ALENEX, 2007.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SdVector {
    high: BitVector<Rank9SelIndex>,
    low: CompactVector,
    num_bits: usize,
    num_ones: usize,
    low_width: usize,
}

impl SdVector {
    /// Creates a new vector from the sorted positions of set bits and
    /// the universe size.
    ///
    /// # Panics
    ///
    /// Panics if `positions` is unsorted or contains a value
    /// `>= universe`.
    pub fn from_ones<I>(positions: I, universe: usize) -> Self
    where
        I: IntoIterator<Item = usize>,
    {
        let positions: Vec<usize> = positions.into_iter().collect();
        let num_ones = positions.len();
        if num_ones == 0 {
            return Self {
                high: BitVector::from_bits([]),
                low: CompactVector::new(1).unwrap(),
                num_bits: universe,
                num_ones: 0,
                low_width: 1,
            };
        }

        let quot = universe / num_ones;
        let low_width = broadword::msb(quot as u64).unwrap_or(0).max(1);
        let high_len = (universe >> low_width) + num_ones + 1;

        let mut high = BitVectorData::default();
        let mut low = CompactVector::new(low_width).unwrap();
        let mut prev = 0;
        let mut next_one = positions.iter().enumerate().map(|(k, &v)| {
            assert!(v < universe, "position {v} out of universe {universe}");
            (v >> low_width) + k
        });
        let mut pending = next_one.next();
        for pos in 0..high_len {
            let bit = pending == Some(pos);
            if bit {
                pending = next_one.next();
            }
            high.push_bit(bit);
        }
        assert!(pending.is_none(), "positions must be sorted");
        for &v in &positions {
            debug_assert!(prev <= v);
            prev = v;
            low.push_int(v & Self::low_mask(low_width)).unwrap();
        }

        Self {
            high: BitVector::new(high),
            low,
            num_bits: universe,
            num_ones,
            low_width,
        }
    }

    #[inline(always)]
    const fn low_mask(width: usize) -> usize {
        (1 << width) - 1
    }

    /// Returns the position of the `k`-th set bit without bounds checks
    /// beyond the high-bits selection.
    #[inline(always)]
    fn position_of(&self, k: usize) -> Option<usize> {
        let p = self.high.select1(k)?;
        Some(((p - k) << self.low_width) | self.low.get_int(k).unwrap())
    }
}

impl NumBits for SdVector {
    #[inline(always)]
    fn num_bits(&self) -> usize {
        self.num_bits
    }

    #[inline(always)]
    fn num_ones(&self) -> usize {
        self.num_ones
    }
}

impl Access for SdVector {
    fn access(&self, pos: usize) -> Option<bool> {
        if self.num_bits <= pos {
            return None;
        }
        Some(self.rank1(pos + 1).unwrap() - self.rank1(pos).unwrap() == 1)
    }
}

impl Rank for SdVector {
    fn rank1(&self, pos: usize) -> Option<usize> {
        if self.num_bits < pos {
            return None;
        }
        if self.num_ones == 0 {
            return Some(0);
        }
        if pos == self.num_bits {
            return Some(self.num_ones);
        }
        let bucket = pos >> self.low_width;
        // Ones preceding the b-th zero of the high bits are exactly the
        // elements whose upper part is at most b.
        let start_k = if bucket == 0 {
            0
        } else {
            self.high.select0(bucket - 1).unwrap() + 1 - bucket
        };
        let end_k = self.high.select0(bucket).unwrap() - bucket;
        let low_pos = pos & Self::low_mask(self.low_width);
        let (mut a, mut b) = (start_k, end_k);
        while a < b {
            let mid = a + (b - a) / 2;
            if self.low.get_int(mid).unwrap() < low_pos {
                a = mid + 1;
            } else {
                b = mid;
            }
        }
        Some(a)
    }

    fn rank0(&self, pos: usize) -> Option<usize> {
        Some(pos - self.rank1(pos)?)
    }
}

impl Select for SdVector {
    fn select1(&self, k: usize) -> Option<usize> {
        if self.num_ones <= k {
            return None;
        }
        self.position_of(k)
    }

    /// Unsupported on the sparse representation; always returns [`None`].
    fn select0(&self, _k: usize) -> Option<usize> {
        None
    }
}

impl Serialize for SdVector {
    fn serialize_into<W: Write>(&self, writer: &mut W) -> Result<usize> {
        let mut written = self.num_bits.serialize_into(writer)?;
        written += self.num_ones.serialize_into(writer)?;
        written += self.low_width.serialize_into(writer)?;
        written += self.high.serialize_into(writer)?;
        written += self.low.serialize_into(writer)?;
        Ok(written)
    }

    fn deserialize_from<R: Read>(reader: &mut R) -> Result<Self> {
        let num_bits = usize::deserialize_from(reader)?;
        let num_ones = usize::deserialize_from(reader)?;
        let low_width = usize::deserialize_from(reader)?;
        let high = BitVector::deserialize_from(reader)?;
        let low = CompactVector::deserialize_from(reader)?;
        Ok(Self {
            high,
            low,
            num_bits,
            num_ones,
            low_width,
        })
    }

    fn size_in_bytes(&self) -> usize {
        self.num_bits.size_in_bytes()
            + self.num_ones.size_in_bytes()
            + self.low_width.size_in_bytes()
            + self.high.size_in_bytes()
            + self.low.size_in_bytes()
    }
}

impl MarkerBits for SdVector {
    fn from_bits<I>(bits: I) -> Self
    where
        I: IntoIterator<Item = bool>,
    {
        let mut positions = vec![];
        let mut universe = 0;
        for bit in bits {
            if bit {
                positions.push(universe);
            }
            universe += 1;
        }
        Self::from_ones(positions, universe)
    }
}

/// Plain bitvector with a rank9 index behind the [`MarkerBits`] seam.
///
/// Uses $`u + o(u)`$ bits regardless of density, with constant-time
/// rank. An alternative to [`SdVector`] when the run markers are dense
/// enough that the Elias-Fano form stops paying off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DenseVector {
    bits: BitVector<Rank9SelIndex>,
}

impl NumBits for DenseVector {
    #[inline(always)]
    fn num_bits(&self) -> usize {
        self.bits.num_bits()
    }

    #[inline(always)]
    fn num_ones(&self) -> usize {
        self.bits.num_ones()
    }
}

impl Access for DenseVector {
    fn access(&self, pos: usize) -> Option<bool> {
        self.bits.access(pos)
    }
}

impl Rank for DenseVector {
    fn rank1(&self, pos: usize) -> Option<usize> {
        self.bits.rank1(pos)
    }

    fn rank0(&self, pos: usize) -> Option<usize> {
        self.bits.rank0(pos)
    }
}

impl Select for DenseVector {
    fn select1(&self, k: usize) -> Option<usize> {
        self.bits.select1(k)
    }

    fn select0(&self, k: usize) -> Option<usize> {
        self.bits.select0(k)
    }
}

impl Serialize for DenseVector {
    fn serialize_into<W: Write>(&self, writer: &mut W) -> Result<usize> {
        self.bits.serialize_into(writer)
    }

    fn deserialize_from<R: Read>(reader: &mut R) -> Result<Self> {
        Ok(Self {
            bits: BitVector::deserialize_from(reader)?,
        })
    }

    fn size_in_bytes(&self) -> usize {
        self.bits.size_in_bytes()
    }
}

impl MarkerBits for DenseVector {
    fn from_bits<I>(bits: I) -> Self
    where
        I: IntoIterator<Item = bool>,
    {
        Self {
            bits: BitVector::from_bits(bits),
        }
    }
}
