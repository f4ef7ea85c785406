//! Wavelet matrix over byte sequences.

use std::io::{Read, Write};

use crate::bit_vectors::{Access, BitVector, NumBits, Rank, Rank9SelIndex, Select};
use crate::error::{Error, Result};
use crate::serialization::Serialize;
use crate::utils;

/// Wavelet matrix over a byte sequence.
///
/// Stores $`n`$ bytes from $`[0, \sigma)`$ in $`n \lceil \lg \sigma \rceil`$
/// bits (plus rank/select overhead) and answers access, per-character
/// rank, and per-character select in $`O(\lg \sigma)`$ time.
///
/// Layers are built level-wise with double buffering: each level's bits
/// are extracted, then the sequence is stably partitioned by that bit
/// before descending.
///
/// # Examples
///
/// ```
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use matchstats::char_sequences::WaveletMatrix;
///
/// let wm = WaveletMatrix::from_seq(b"banana")?;
///
/// assert_eq!(wm.len(), 6);
/// assert_eq!(wm.access(2), Some(b'n'));
/// assert_eq!(wm.rank(3, b'a'), Some(1));
/// assert_eq!(wm.select(1, b'n'), Some(4));
/// # Ok(())
/// # }
/// ```
///
/// # References
///
/// - F. Claude, and G. Navarro, "The Wavelet Matrix," In SPIRE 2012.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaveletMatrix {
    layers: Vec<BitVector<Rank9SelIndex>>,
    len: usize,
    alph_size: usize,
}

impl WaveletMatrix {
    /// Builds a wavelet matrix from a byte sequence.
    ///
    /// The alphabet size is the maximum byte value plus one.
    ///
    /// # Errors
    ///
    /// An error is returned if `seq` is empty.
    pub fn from_seq(seq: &[u8]) -> Result<Self> {
        if seq.is_empty() {
            return Err(Error::invalid_argument("seq must not be empty."));
        }
        let alph_size = usize::from(*seq.iter().max().unwrap()) + 1;
        let alph_width = utils::needed_bits(alph_size - 1);

        let mut layers = Vec::with_capacity(alph_width);
        let mut cur: Vec<u8> = seq.to_vec();
        let mut next: Vec<u8> = Vec::with_capacity(seq.len());
        for depth in 0..alph_width {
            let shift = alph_width - depth - 1;
            let layer: BitVector<Rank9SelIndex> =
                BitVector::from_bits(cur.iter().map(|&v| (v >> shift) & 1 == 1));
            next.clear();
            next.extend(cur.iter().filter(|&&v| (v >> shift) & 1 == 0));
            next.extend(cur.iter().filter(|&&v| (v >> shift) & 1 == 1));
            std::mem::swap(&mut cur, &mut next);
            layers.push(layer);
        }

        Ok(Self {
            layers,
            len: seq.len(),
            alph_size,
        })
    }

    /// Returns the `pos`-th byte, or [`None`] if out of bounds.
    ///
    /// # Complexity
    ///
    /// $`O(\lg \sigma)`$
    #[inline(always)]
    pub fn access(&self, mut pos: usize) -> Option<u8> {
        if self.len <= pos {
            return None;
        }
        let mut val = 0u8;
        for layer in &self.layers {
            val <<= 1;
            // NOTE: rank is safe after the length precheck.
            if layer.access(pos).unwrap() {
                val |= 1;
                pos = layer.rank1(pos).unwrap() + layer.num_zeros();
            } else {
                pos = layer.rank0(pos).unwrap();
            }
        }
        Some(val)
    }

    /// Returns the number of occurrences of `val` in the range `0..pos`,
    /// or [`None`] if `self.len() < pos`.
    ///
    /// # Complexity
    ///
    /// $`O(\lg \sigma)`$
    #[inline]
    pub fn rank(&self, pos: usize, val: u8) -> Option<usize> {
        if self.len < pos {
            return None;
        }
        if usize::from(val) >= self.alph_size {
            return Some(0);
        }
        let mut start_pos = 0;
        let mut end_pos = pos;
        for (depth, layer) in self.layers.iter().enumerate() {
            // NOTE: rank is safe after the length precheck.
            if self.msb_of(val, depth) {
                start_pos = layer.rank1(start_pos).unwrap() + layer.num_zeros();
                end_pos = layer.rank1(end_pos).unwrap() + layer.num_zeros();
            } else {
                start_pos = layer.rank0(start_pos).unwrap();
                end_pos = layer.rank0(end_pos).unwrap();
            }
        }
        Some(end_pos - start_pos)
    }

    /// Returns the position of the `k`-th occurrence of `val`,
    /// or [`None`] if there is no such occurrence.
    ///
    /// # Complexity
    ///
    /// $`O(\lg \sigma)`$
    #[inline(always)]
    pub fn select(&self, k: usize, val: u8) -> Option<usize> {
        if self.rank(self.len, val).unwrap() <= k {
            return None;
        }
        self.select_helper(k, val, 0, 0)
    }

    fn select_helper(&self, mut k: usize, val: u8, mut pos: usize, depth: usize) -> Option<usize> {
        if depth == self.layers.len() {
            return Some(pos + k);
        }
        let layer = &self.layers[depth];
        if self.msb_of(val, depth) {
            let zeros = layer.num_zeros();
            pos = layer.rank1(pos).unwrap() + zeros;
            k = self.select_helper(k, val, pos, depth + 1)?;
            layer.select1(k - zeros)
        } else {
            pos = layer.rank0(pos).unwrap();
            k = self.select_helper(k, val, pos, depth + 1)?;
            layer.select0(k)
        }
    }

    #[inline(always)]
    fn msb_of(&self, val: u8, depth: usize) -> bool {
        (val >> (self.layers.len() - depth - 1)) & 1 == 1
    }

    /// Returns the number of bytes stored.
    #[inline(always)]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Checks if the sequence is empty.
    #[inline(always)]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the maximum stored byte value plus one.
    #[inline(always)]
    pub const fn alph_size(&self) -> usize {
        self.alph_size
    }

    /// Returns the number of layers, i.e., $`\lceil \lg \sigma \rceil`$.
    #[inline(always)]
    pub fn alph_width(&self) -> usize {
        self.layers.len()
    }
}

impl Serialize for WaveletMatrix {
    fn serialize_into<W: Write>(&self, writer: &mut W) -> Result<usize> {
        let mut written = self.len.serialize_into(writer)?;
        written += self.alph_size.serialize_into(writer)?;
        written += self.layers.len().serialize_into(writer)?;
        for layer in &self.layers {
            written += layer.serialize_into(writer)?;
        }
        Ok(written)
    }

    fn deserialize_from<R: Read>(reader: &mut R) -> Result<Self> {
        let len = usize::deserialize_from(reader)?;
        let alph_size = usize::deserialize_from(reader)?;
        let num_layers = usize::deserialize_from(reader)?;
        let mut layers = Vec::with_capacity(num_layers);
        for _ in 0..num_layers {
            let layer: BitVector<Rank9SelIndex> = BitVector::deserialize_from(reader)?;
            if layer.len() != len {
                return Err(Error::invalid_data("wavelet matrix layer length mismatch"));
            }
            layers.push(layer);
        }
        Ok(Self {
            layers,
            len,
            alph_size,
        })
    }

    fn size_in_bytes(&self) -> usize {
        self.len.size_in_bytes()
            + self.alph_size.size_in_bytes()
            + self.layers.len().size_in_bytes()
            + self
                .layers
                .iter()
                .map(|layer| layer.size_in_bytes())
                .sum::<usize>()
    }
}
