//! Run-length encoded BWT with rank, select, and run navigation.

use std::io::{Read, Write};
use std::iter;

use byteorder::{LittleEndian, ReadBytesExt};

use crate::bit_vectors::{MarkerBits, NumBits as _, Rank as _, SdVector, Select as _};
use crate::char_sequences::WaveletMatrix;
use crate::error::{Error, Result};
use crate::serialization::Serialize;
use crate::{LENBYTES, TERMINATOR};

/// Block parameter of the main run-marker bitvector.
///
/// The marker bitvector carries one set bit per `DEFAULT_BLOCK` runs;
/// navigation scans at most that many runs after one rank/select pair.
pub const DEFAULT_BLOCK: usize = 2;

/// Run-length encoded BWT string `L[0..n)` over bytes.
///
/// The string is represented by three components:
///
/// - `run_heads`: the head character of each run, in run order;
/// - `runs`: a marker bitvector of length $`n`$ whose set bits mark the
///   last position of every `B`-th run;
/// - `runs_per_letter[c]`: for each byte `c`, a marker bitvector over
///   the occurrences of `c` in `L` (in `L` order) whose set bits mark
///   the last position of each `c`-run.
///
/// Space is $`O(r)`$ words for $`r`$ runs, independent of $`n`$.
/// `access`, `rank`, `select`, and `run_of_position` each perform
/// $`O(B)`$ rank/select calls on the underlying dictionaries.
///
/// The marker representation is chosen via the type parameter;
/// [`SdVector`] is the default, [`DenseVector`](crate::bit_vectors::DenseVector)
/// trades space for faster rank.
///
/// # Examples
///
/// ```
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use matchstats::rlbwt::RleBwt;
///
/// // BWT of "mississippi" with terminator, as raw bytes.
/// let bwt = b"ipssm\x01pissii";
/// let rlbwt: RleBwt = RleBwt::from_reader(&mut &bwt[..], 2)?;
///
/// assert_eq!(rlbwt.len(), 12);
/// assert_eq!(rlbwt.num_runs(), 9);
/// assert_eq!(rlbwt.access(3), Some(b's'));
/// assert_eq!(rlbwt.rank(5, b's'), Some(2));
/// assert_eq!(rlbwt.select(2, b's'), Some(8));
/// assert_eq!(rlbwt.run_of_position(3), Some(2));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RleBwt<V = SdVector> {
    block: usize,
    len: usize,
    num_runs: usize,
    runs: V,
    runs_per_letter: Vec<V>,
    run_heads: WaveletMatrix,
}

impl<V: MarkerBits> RleBwt<V> {
    /// Run-length encodes a raw BWT byte stream.
    ///
    /// Bytes `<= 1` are remapped to [`TERMINATOR`].
    ///
    /// # Errors
    ///
    /// An error is returned if reading fails, if the stream is empty,
    /// or if `block` is zero.
    pub fn from_reader<R: Read>(reader: &mut R, block: usize) -> Result<Self> {
        let mut heads = vec![];
        let mut lengths = vec![];
        let mut buf = [0u8; 1 << 16];
        loop {
            let got = reader.read(&mut buf)?;
            if got == 0 {
                break;
            }
            for &byte in &buf[..got] {
                let c = byte.max(TERMINATOR);
                match heads.last() {
                    Some(&last) if last == c => *lengths.last_mut().unwrap() += 1,
                    _ => {
                        heads.push(c);
                        lengths.push(1usize);
                    }
                }
            }
        }
        Self::from_run_pairs(heads, lengths, block)
    }

    /// Builds the string from a run-length encoded BWT given as `r`
    /// head bytes and `r` little-endian [`LENBYTES`]-byte run lengths.
    ///
    /// Head bytes `<= 1` are remapped to [`TERMINATOR`].
    ///
    /// # Errors
    ///
    /// An error is returned if reading fails, if a run length is zero,
    /// if the head sequence is empty, or if `block` is zero.
    pub fn from_runs<R1: Read, R2: Read>(
        heads: &mut R1,
        lengths: &mut R2,
        block: usize,
    ) -> Result<Self> {
        let mut head_bytes = vec![];
        heads.read_to_end(&mut head_bytes)?;
        for c in head_bytes.iter_mut() {
            *c = (*c).max(TERMINATOR);
        }
        let mut length_vals = Vec::with_capacity(head_bytes.len());
        for _ in 0..head_bytes.len() {
            let len = lengths.read_uint::<LittleEndian>(LENBYTES)? as usize;
            if len == 0 {
                return Err(Error::invalid_data("run lengths must be positive"));
            }
            length_vals.push(len);
        }
        Self::from_run_pairs(head_bytes, length_vals, block)
    }

    fn from_run_pairs(heads: Vec<u8>, lengths: Vec<usize>, block: usize) -> Result<Self> {
        debug_assert_eq!(heads.len(), lengths.len());
        if block == 0 {
            return Err(Error::invalid_argument("block must be at least 1"));
        }
        if heads.is_empty() {
            return Err(Error::invalid_argument("the BWT must not be empty"));
        }

        let num_runs = heads.len();
        let len = lengths.iter().sum::<usize>();

        let runs = V::from_bits(lengths.iter().enumerate().flat_map(|(i, &l)| {
            iter::repeat(false)
                .take(l - 1)
                .chain(iter::once(i % block == block - 1))
        }));

        let mut letter_run_lens: Vec<Vec<usize>> = vec![vec![]; 256];
        for (&c, &l) in heads.iter().zip(&lengths) {
            letter_run_lens[usize::from(c)].push(l);
        }
        let runs_per_letter = letter_run_lens
            .iter()
            .map(|lens| {
                V::from_bits(lens.iter().flat_map(|&l| {
                    iter::repeat(false).take(l - 1).chain(iter::once(true))
                }))
            })
            .collect::<Vec<_>>();

        let run_heads = WaveletMatrix::from_seq(&heads)?;

        debug_assert_eq!(
            runs_per_letter.iter().map(|v| v.num_bits()).sum::<usize>(),
            len
        );
        Ok(Self {
            block,
            len,
            num_runs,
            runs,
            runs_per_letter,
            run_heads,
        })
    }

    /// Returns the length `n` of the string.
    #[inline(always)]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Checks if the string is empty. Always `false` for a built
    /// instance, kept for interface completeness.
    #[inline(always)]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number `r` of equal-letter runs.
    #[inline(always)]
    pub const fn num_runs(&self) -> usize {
        self.num_runs
    }

    /// Returns the block parameter `B`.
    #[inline(always)]
    pub const fn block(&self) -> usize {
        self.block
    }

    /// Returns the number of occurrences of `c` in the string.
    #[inline(always)]
    pub fn num_occ(&self, c: u8) -> usize {
        self.runs_per_letter[usize::from(c)].num_bits()
    }

    /// Returns the number of `c`-runs in the string.
    #[inline(always)]
    pub fn num_runs_of(&self, c: u8) -> usize {
        self.runs_per_letter[usize::from(c)].num_ones()
    }

    /// Returns the length of the `j`-th run, or [`None`] if
    /// `self.num_runs() <= j`.
    pub fn run_len(&self, j: usize) -> Option<usize> {
        let c = self.run_heads.access(j)?;
        let k = self.run_heads.rank(j, c).unwrap();
        let rpl = &self.runs_per_letter[usize::from(c)];
        let end = rpl.select1(k).unwrap();
        let start = if k == 0 {
            0
        } else {
            rpl.select1(k - 1).unwrap() + 1
        };
        Some(end - start + 1)
    }

    /// Returns the index of the run containing position `i`, or
    /// [`None`] if `self.len() <= i`.
    ///
    /// Ranks the block markers, jumps to the first run of the block,
    /// and walks at most `B` runs forward.
    pub fn run_of_position(&self, i: usize) -> Option<usize> {
        if self.len <= i {
            return None;
        }
        let last_block = self.runs.rank1(i).unwrap();
        let mut current_run = last_block * self.block;
        let mut pos = if last_block > 0 {
            self.runs.select1(last_block - 1).unwrap() + 1
        } else {
            0
        };
        while pos < i {
            pos += self.run_len(current_run).unwrap();
            current_run += 1;
        }
        if pos > i {
            current_run -= 1;
        }
        Some(current_run)
    }

    /// Returns the character at position `i`, or [`None`] if
    /// `self.len() <= i`.
    pub fn access(&self, i: usize) -> Option<u8> {
        self.run_heads.access(self.run_of_position(i)?)
    }

    /// Returns the number of occurrences of `c` in `[0, i)`, or
    /// [`None`] if `self.len() < i`.
    pub fn rank(&self, i: usize, c: u8) -> Option<usize> {
        if self.len < i {
            return None;
        }
        let rpl = &self.runs_per_letter[usize::from(c)];
        if rpl.num_bits() == 0 {
            return Some(0);
        }
        if i == self.len {
            return Some(rpl.num_bits());
        }

        let last_block = self.runs.rank1(i).unwrap();
        let mut current_run = last_block * self.block;
        let mut pos = if last_block > 0 {
            self.runs.select1(last_block - 1).unwrap() + 1
        } else {
            0
        };
        // Offset of i inside the run that will turn out to contain it.
        let mut dist = i - pos;
        while pos < i {
            pos += self.run_len(current_run).unwrap();
            current_run += 1;
            if pos <= i {
                dist = i - pos;
            }
        }
        if pos > i {
            current_run -= 1;
        }

        let rk = self.run_heads.rank(current_run, c).unwrap();
        let tail = if self.run_heads.access(current_run) == Some(c) {
            dist
        } else {
            0
        };
        if rk == 0 {
            Some(tail)
        } else {
            Some(rpl.select1(rk - 1).unwrap() + 1 + tail)
        }
    }

    /// Returns the position of the `k`-th occurrence of `c` (zero
    /// based), or [`None`] if `self.num_occ(c) <= k`.
    pub fn select(&self, k: usize, c: u8) -> Option<usize> {
        let rpl = &self.runs_per_letter[usize::from(c)];
        if rpl.num_bits() <= k {
            return None;
        }
        // The k-th c lies in the j-th c-run, at offset `before`.
        let j = rpl.rank1(k).unwrap();
        let before = if j == 0 {
            k
        } else {
            k - (rpl.select1(j - 1).unwrap() + 1)
        };
        // Global index of the j-th c-run, then its starting position.
        let g = self.run_heads.select(j, c)?;
        let marked = g / self.block;
        let mut pos = if marked > 0 {
            self.runs.select1(marked - 1).unwrap() + 1
        } else {
            0
        };
        for t in marked * self.block..g {
            pos += self.run_len(t).unwrap();
        }
        Some(pos + before)
    }
}

impl<V: MarkerBits> Serialize for RleBwt<V> {
    fn serialize_into<W: Write>(&self, writer: &mut W) -> Result<usize> {
        let mut written = self.block.serialize_into(writer)?;
        written += self.len.serialize_into(writer)?;
        written += self.num_runs.serialize_into(writer)?;
        written += self.runs.serialize_into(writer)?;
        for rpl in &self.runs_per_letter {
            written += rpl.serialize_into(writer)?;
        }
        written += self.run_heads.serialize_into(writer)?;
        Ok(written)
    }

    fn deserialize_from<R: Read>(reader: &mut R) -> Result<Self> {
        let block = usize::deserialize_from(reader)?;
        let len = usize::deserialize_from(reader)?;
        let num_runs = usize::deserialize_from(reader)?;
        let runs = V::deserialize_from(reader)?;
        let mut runs_per_letter = Vec::with_capacity(256);
        for _ in 0..256 {
            runs_per_letter.push(V::deserialize_from(reader)?);
        }
        let run_heads = WaveletMatrix::deserialize_from(reader)?;
        if run_heads.len() != num_runs {
            return Err(Error::invalid_data(
                "run head count does not match the number of runs",
            ));
        }
        Ok(Self {
            block,
            len,
            num_runs,
            runs,
            runs_per_letter,
            run_heads,
        })
    }

    fn size_in_bytes(&self) -> usize {
        self.block.size_in_bytes()
            + self.len.size_in_bytes()
            + self.num_runs.size_in_bytes()
            + self.runs.size_in_bytes()
            + self
                .runs_per_letter
                .iter()
                .map(|rpl| rpl.size_in_bytes())
                .sum::<usize>()
            + self.run_heads.size_in_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bit_vectors::DenseVector;
    use byteorder::WriteBytesExt;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaChaRng;

    fn check_against_naive<V: MarkerBits>(text: &[u8], block: usize) {
        let remapped: Vec<u8> = text.iter().map(|&c| c.max(TERMINATOR)).collect();
        let rlbwt: RleBwt<V> = RleBwt::from_reader(&mut &text[..], block).unwrap();

        let mut naive_runs = 1;
        for w in remapped.windows(2) {
            if w[0] != w[1] {
                naive_runs += 1;
            }
        }
        assert_eq!(rlbwt.len(), remapped.len());
        assert_eq!(rlbwt.num_runs(), naive_runs);

        for (i, &c) in remapped.iter().enumerate() {
            assert_eq!(rlbwt.access(i), Some(c), "access({i})");
        }
        assert_eq!(rlbwt.access(remapped.len()), None);

        // Runs cover the string and agree with run_of_position.
        let mut pos = 0;
        for j in 0..rlbwt.num_runs() {
            let l = rlbwt.run_len(j).unwrap();
            for off in 0..l {
                assert_eq!(rlbwt.run_of_position(pos + off), Some(j));
            }
            pos += l;
        }
        assert_eq!(pos, rlbwt.len());
        assert_eq!(rlbwt.run_len(rlbwt.num_runs()), None);

        let mut counts = [0usize; 256];
        for &c in &remapped {
            counts[usize::from(c)] += 1;
        }
        let mut total = 0;
        for c in 0..=255u8 {
            assert_eq!(rlbwt.num_occ(c), counts[usize::from(c)], "num_occ({c})");
            total += rlbwt.num_occ(c);
        }
        assert_eq!(total, rlbwt.len());

        for &c in remapped.iter().chain(b"\x01AZz") {
            let mut rank = 0;
            for i in 0..=remapped.len() {
                assert_eq!(rlbwt.rank(i, c), Some(rank), "rank({i}, {c})");
                if i < remapped.len() && remapped[i] == c {
                    assert_eq!(rlbwt.select(rank, c), Some(i), "select({rank}, {c})");
                    rank += 1;
                }
            }
            assert_eq!(rlbwt.select(rank, c), None);
        }
    }

    #[test]
    fn mississippi_bwt() {
        check_against_naive::<SdVector>(b"ipssm\x01pissii", 2);
        check_against_naive::<DenseVector>(b"ipssm\x01pissii", 2);
    }

    #[test]
    fn various_blocks() {
        for block in 1..=5 {
            check_against_naive::<SdVector>(b"GGGGAAATTTACAG\x01CCCC", block);
        }
    }

    #[test]
    fn single_run() {
        check_against_naive::<SdVector>(b"AAAAAAAA", 2);
    }

    #[test]
    fn single_char() {
        check_against_naive::<SdVector>(b"\x01", 2);
    }

    #[test]
    fn remaps_zero_bytes() {
        let rlbwt: RleBwt = RleBwt::from_reader(&mut &b"A\x00\x01B"[..], 2).unwrap();
        assert_eq!(rlbwt.access(1), Some(TERMINATOR));
        assert_eq!(rlbwt.access(2), Some(TERMINATOR));
        assert_eq!(rlbwt.num_occ(TERMINATOR), 2);
        assert_eq!(rlbwt.num_runs(), 3);
    }

    #[test]
    fn randomized_runs() {
        let mut rng = ChaChaRng::seed_from_u64(23);
        for _ in 0..5 {
            let mut text = vec![];
            while text.len() < 400 {
                let c = b"ACGTN"[rng.gen_range(0..5)];
                let l = rng.gen_range(1..20);
                text.extend(std::iter::repeat(c).take(l));
            }
            check_against_naive::<SdVector>(&text, 2);
        }
    }

    #[test]
    fn heads_and_lengths_constructor() {
        let heads = b"is\x00m";
        let mut lengths = vec![];
        for l in [2u64, 3, 1, 4] {
            lengths.write_uint::<LittleEndian>(l, LENBYTES).unwrap();
        }
        let rlbwt: RleBwt =
            RleBwt::from_runs(&mut &heads[..], &mut &lengths[..], DEFAULT_BLOCK).unwrap();
        assert_eq!(rlbwt.len(), 10);
        assert_eq!(rlbwt.num_runs(), 4);
        let expect = b"iisss\x01mmmm";
        for (i, &c) in expect.iter().enumerate() {
            assert_eq!(rlbwt.access(i), Some(c));
        }

        // Matches the equivalent raw-byte construction.
        let other: RleBwt = RleBwt::from_reader(&mut &expect[..], DEFAULT_BLOCK).unwrap();
        assert_eq!(rlbwt, other);
    }

    #[test]
    fn short_lengths_stream() {
        let heads = b"ab";
        let mut lengths = vec![];
        lengths.write_uint::<LittleEndian>(1, LENBYTES).unwrap();
        let e: Result<RleBwt> = RleBwt::from_runs(&mut &heads[..], &mut &lengths[..], 2);
        assert!(matches!(e, Err(Error::Io(_))));
    }

    #[test]
    fn roundtrip() {
        let rlbwt: RleBwt = RleBwt::from_reader(&mut &b"ipssm\x01pissii"[..], 2).unwrap();
        let mut buf = vec![];
        let written = rlbwt.serialize_into(&mut buf).unwrap();
        assert_eq!(written, rlbwt.size_in_bytes());
        let other: RleBwt = RleBwt::deserialize_from(&mut buf.as_slice()).unwrap();
        assert_eq!(rlbwt, other);
    }
}
