//! Raw bit storage and the generic data/index wrapper.

use std::io::{Read, Write};

use crate::bit_vectors::{Access, NumBits, Rank, Select};
use crate::broadword::{self, WORD_LEN};
use crate::error::Result;
use crate::serialization::Serialize;

/// Immutable bit vector data without auxiliary indexes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BitVectorData {
    words: Vec<u64>,
    len: usize,
}

impl BitVectorData {
    /// Creates bit vector data from a bit iterator.
    pub fn from_bits<I: IntoIterator<Item = bool>>(bits: I) -> Self {
        let mut this = Self::default();
        for b in bits {
            this.push_bit(b);
        }
        this
    }

    /// Appends a bit at the end.
    pub fn push_bit(&mut self, bit: bool) {
        let shift = self.len % WORD_LEN;
        if shift == 0 {
            self.words.push(0);
        }
        if bit {
            *self.words.last_mut().unwrap() |= 1u64 << shift;
        }
        self.len += 1;
    }

    /// Returns the number of bits stored.
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Checks if no bits are stored.
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the raw word slice.
    pub fn words(&self) -> &[u64] {
        &self.words
    }

    /// Returns the number of words stored.
    pub fn num_words(&self) -> usize {
        self.words.len()
    }
}

impl Access for BitVectorData {
    fn access(&self, pos: usize) -> Option<bool> {
        if pos < self.len {
            let (block, shift) = (pos / WORD_LEN, pos % WORD_LEN);
            Some((self.words[block] >> shift) & 1 == 1)
        } else {
            None
        }
    }
}

impl Serialize for BitVectorData {
    fn serialize_into<W: Write>(&self, writer: &mut W) -> Result<usize> {
        let mut written = self.len.serialize_into(writer)?;
        written += self.words.serialize_into(writer)?;
        Ok(written)
    }

    fn deserialize_from<R: Read>(reader: &mut R) -> Result<Self> {
        let len = usize::deserialize_from(reader)?;
        let words = Vec::<u64>::deserialize_from(reader)?;
        if words.len() != (len + WORD_LEN - 1) / WORD_LEN {
            return Err(crate::error::Error::invalid_data(
                "bit vector word count does not match its length",
            ));
        }
        Ok(Self { words, len })
    }

    fn size_in_bytes(&self) -> usize {
        self.len.size_in_bytes() + self.words.size_in_bytes()
    }
}

/// Index trait for bit vector data.
pub trait BitVectorIndex {
    /// Builds the index over `data`.
    fn build(data: &BitVectorData) -> Self;

    /// Counts set bits in the data.
    fn num_ones(&self, data: &BitVectorData) -> usize;

    /// Rank query for ones.
    fn rank1(&self, data: &BitVectorData, pos: usize) -> Option<usize>;

    /// Rank query for zeros.
    fn rank0(&self, data: &BitVectorData, pos: usize) -> Option<usize> {
        Some(pos - self.rank1(data, pos)?)
    }

    /// Select query for ones.
    fn select1(&self, data: &BitVectorData, k: usize) -> Option<usize>;

    /// Select query for zeros.
    fn select0(&self, data: &BitVectorData, k: usize) -> Option<usize>;
}

/// Placeholder index that performs linear scans over the data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoIndex;

impl BitVectorIndex for NoIndex {
    fn build(_data: &BitVectorData) -> Self {
        Self
    }

    fn num_ones(&self, data: &BitVectorData) -> usize {
        data.words.iter().map(|&w| broadword::popcount(w)).sum()
    }

    fn rank1(&self, data: &BitVectorData, pos: usize) -> Option<usize> {
        if data.len() < pos {
            return None;
        }
        let (wpos, left) = (pos / WORD_LEN, pos % WORD_LEN);
        let mut r = 0;
        for &w in &data.words[..wpos] {
            r += broadword::popcount(w);
        }
        if left != 0 {
            r += broadword::popcount(data.words[wpos] << (WORD_LEN - left));
        }
        Some(r)
    }

    fn select1(&self, data: &BitVectorData, k: usize) -> Option<usize> {
        let mut wpos = 0;
        let mut cur_rank = 0;
        while wpos < data.words.len() {
            let cnt = broadword::popcount(data.words[wpos]);
            if k < cur_rank + cnt {
                let sel =
                    wpos * WORD_LEN + broadword::select_in_word(data.words[wpos], k - cur_rank)?;
                return (sel < data.len()).then_some(sel);
            }
            wpos += 1;
            cur_rank += cnt;
        }
        None
    }

    fn select0(&self, data: &BitVectorData, k: usize) -> Option<usize> {
        let mut wpos = 0;
        let mut cur_rank = 0;
        while wpos < data.words.len() {
            let cnt = broadword::popcount(!data.words[wpos]);
            if k < cur_rank + cnt {
                let sel =
                    wpos * WORD_LEN + broadword::select_in_word(!data.words[wpos], k - cur_rank)?;
                return (sel < data.len()).then_some(sel);
            }
            wpos += 1;
            cur_rank += cnt;
        }
        None
    }
}

/// Immutable bit vector data combined with an auxiliary index.
///
/// The index is a pure function of the data, so only the data takes
/// part in equality and serialization; deserialization rebuilds the
/// index.
#[derive(Debug, Clone)]
pub struct BitVector<I> {
    data: BitVectorData,
    index: I,
}

impl<I: PartialEq> PartialEq for BitVector<I> {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
    }
}

impl<I: Eq> Eq for BitVector<I> {}

impl<I: BitVectorIndex> BitVector<I> {
    /// Creates a new wrapper indexing `data`.
    pub fn new(data: BitVectorData) -> Self {
        let index = I::build(&data);
        Self { data, index }
    }

    /// Creates an indexed bit vector from a bit iterator.
    pub fn from_bits<It: IntoIterator<Item = bool>>(bits: It) -> Self {
        Self::new(BitVectorData::from_bits(bits))
    }

    /// Returns the underlying raw data.
    pub const fn data(&self) -> &BitVectorData {
        &self.data
    }

    /// Returns the number of bits stored.
    pub const fn len(&self) -> usize {
        self.data.len()
    }

    /// Checks if no bits are stored.
    pub const fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl<I: BitVectorIndex> NumBits for BitVector<I> {
    fn num_bits(&self) -> usize {
        self.data.len()
    }

    fn num_ones(&self) -> usize {
        self.index.num_ones(&self.data)
    }
}

impl<I> Access for BitVector<I> {
    fn access(&self, pos: usize) -> Option<bool> {
        self.data.access(pos)
    }
}

impl<I: BitVectorIndex> Rank for BitVector<I> {
    fn rank1(&self, pos: usize) -> Option<usize> {
        self.index.rank1(&self.data, pos)
    }

    fn rank0(&self, pos: usize) -> Option<usize> {
        self.index.rank0(&self.data, pos)
    }
}

impl<I: BitVectorIndex> Select for BitVector<I> {
    fn select1(&self, k: usize) -> Option<usize> {
        self.index.select1(&self.data, k)
    }

    fn select0(&self, k: usize) -> Option<usize> {
        self.index.select0(&self.data, k)
    }
}

impl<I: BitVectorIndex> Serialize for BitVector<I> {
    fn serialize_into<W: Write>(&self, writer: &mut W) -> Result<usize> {
        self.data.serialize_into(writer)
    }

    fn deserialize_from<R: Read>(reader: &mut R) -> Result<Self> {
        let data = BitVectorData::deserialize_from(reader)?;
        Ok(Self::new(data))
    }

    fn size_in_bytes(&self) -> usize {
        self.data.size_in_bytes()
    }
}
