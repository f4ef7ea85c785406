//! Rank9 index with hinted selection over plain bit vector data.

use crate::bit_vectors::bit_vector::{BitVectorData, BitVectorIndex};
use crate::broadword::{self, WORD_LEN};

const BLOCK_LEN: usize = 8;
const SELECT_ONES_PER_HINT: usize = 64 * BLOCK_LEN * 2;
const SELECT_ZEROS_PER_HINT: usize = SELECT_ONES_PER_HINT;

/// Rank/select index over [`BitVectorData`], kept separate from the data.
///
/// Blocks of eight words store their absolute rank together with seven
/// 9-bit in-block subranks packed in one word, giving constant-time
/// [`rank1`](Self::rank1). Selection binary-searches the blocks inside a
/// hinted range and finishes inside one word.
///
/// # Credits
///
/// Yet another take on Vigna's Rank9 with hints,
/// "Broadword implementation of rank/select queries," In WEA 2008.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rank9SelIndex {
    len: usize,
    block_rank_pairs: Vec<usize>,
    select1_hints: Vec<usize>,
    select0_hints: Vec<usize>,
}

impl Rank9SelIndex {
    /// Builds the index over `data`.
    pub fn new(data: &BitVectorData) -> Self {
        let mut block_rank_pairs = vec![0];
        let mut next_rank = 0;
        let mut cur_subrank = 0;
        let mut subranks = 0;
        let mut num_words = 0;
        for &word in data.words() {
            let shift = num_words % BLOCK_LEN;
            if shift != 0 {
                subranks <<= 9;
                subranks |= cur_subrank;
            }
            let pop = broadword::popcount(word);
            next_rank += pop;
            cur_subrank += pop;
            num_words += 1;
            if shift == BLOCK_LEN - 1 {
                block_rank_pairs.push(subranks);
                block_rank_pairs.push(next_rank);
                subranks = 0;
                cur_subrank = 0;
            }
        }
        let left = BLOCK_LEN - num_words % BLOCK_LEN;
        for _ in 0..left {
            subranks <<= 9;
            subranks |= cur_subrank;
        }
        block_rank_pairs.push(subranks);
        if num_words % BLOCK_LEN != 0 {
            block_rank_pairs.push(next_rank);
            block_rank_pairs.push(0);
        }

        let mut this = Self {
            len: data.len(),
            block_rank_pairs,
            select1_hints: vec![],
            select0_hints: vec![],
        };
        this.build_select1_hints();
        this.build_select0_hints();
        this
    }

    fn build_select1_hints(&mut self) {
        let mut hints = vec![];
        let mut threshold = SELECT_ONES_PER_HINT;
        for i in 0..self.num_blocks() {
            while self.block_rank(i + 1) > threshold {
                hints.push(i);
                threshold += SELECT_ONES_PER_HINT;
            }
        }
        hints.push(self.num_blocks());
        self.select1_hints = hints;
    }

    fn build_select0_hints(&mut self) {
        let mut hints = vec![];
        let mut threshold = SELECT_ZEROS_PER_HINT;
        for i in 0..self.num_blocks() {
            while self.block_rank0(i + 1) > threshold {
                hints.push(i);
                threshold += SELECT_ZEROS_PER_HINT;
            }
        }
        hints.push(self.num_blocks());
        self.select0_hints = hints;
    }

    /// Gets the number of bits set.
    #[inline(always)]
    pub fn count_ones(&self) -> usize {
        self.block_rank_pairs[self.block_rank_pairs.len() - 2]
    }

    /// Gets the number of bits unset.
    #[inline(always)]
    pub fn count_zeros(&self) -> usize {
        self.len - self.count_ones()
    }

    #[inline(always)]
    fn num_blocks(&self) -> usize {
        self.block_rank_pairs.len() / 2 - 1
    }

    #[inline(always)]
    fn block_rank(&self, block: usize) -> usize {
        self.block_rank_pairs[block * 2]
    }

    #[inline(always)]
    fn sub_block_ranks(&self, block: usize) -> usize {
        self.block_rank_pairs[block * 2 + 1]
    }

    #[inline(always)]
    fn sub_block_rank(&self, sub_bpos: usize) -> usize {
        let (block, left) = (sub_bpos / BLOCK_LEN, sub_bpos % BLOCK_LEN);
        self.block_rank(block) + ((self.sub_block_ranks(block) >> ((7 - left) * 9)) & 0x1FF)
    }

    #[inline(always)]
    fn block_rank0(&self, block: usize) -> usize {
        block * BLOCK_LEN * WORD_LEN - self.block_rank(block)
    }

    #[inline(always)]
    fn sub_block_rank0(&self, sub_bpos: usize) -> usize {
        sub_bpos * WORD_LEN - self.sub_block_rank(sub_bpos)
    }
}

impl BitVectorIndex for Rank9SelIndex {
    fn build(data: &BitVectorData) -> Self {
        Self::new(data)
    }

    fn num_ones(&self, _data: &BitVectorData) -> usize {
        self.count_ones()
    }

    fn rank1(&self, data: &BitVectorData, pos: usize) -> Option<usize> {
        if data.len() < pos {
            return None;
        }
        if pos == data.len() {
            return Some(self.count_ones());
        }
        let (sub_bpos, sub_left) = (pos / WORD_LEN, pos % WORD_LEN);
        let mut r = self.sub_block_rank(sub_bpos);
        if sub_left != 0 {
            r += broadword::popcount(data.words()[sub_bpos] << (WORD_LEN - sub_left));
        }
        Some(r)
    }

    fn select1(&self, data: &BitVectorData, k: usize) -> Option<usize> {
        if self.count_ones() <= k {
            return None;
        }

        let block = {
            let chunk = k / SELECT_ONES_PER_HINT;
            let mut a = if chunk != 0 {
                self.select1_hints[chunk - 1]
            } else {
                0
            };
            let mut b = self.select1_hints[chunk] + 1;
            while b - a > 1 {
                let mid = a + (b - a) / 2;
                if self.block_rank(mid) <= k {
                    a = mid;
                } else {
                    b = mid;
                }
            }
            a
        };

        let mut word_idx = block * BLOCK_LEN;
        let mut cur_rank = self.block_rank(block);
        for t in 1..BLOCK_LEN {
            let r = self.sub_block_rank(block * BLOCK_LEN + t);
            if r > k {
                break;
            }
            word_idx = block * BLOCK_LEN + t;
            cur_rank = r;
        }
        let sel =
            word_idx * WORD_LEN + broadword::select_in_word(data.words()[word_idx], k - cur_rank)?;
        Some(sel)
    }

    fn select0(&self, data: &BitVectorData, k: usize) -> Option<usize> {
        if self.count_zeros() <= k {
            return None;
        }

        let block = {
            let chunk = k / SELECT_ZEROS_PER_HINT;
            let mut a = if chunk != 0 {
                self.select0_hints[chunk - 1]
            } else {
                0
            };
            let mut b = self.select0_hints[chunk] + 1;
            while b - a > 1 {
                let mid = a + (b - a) / 2;
                if self.block_rank0(mid) <= k {
                    a = mid;
                } else {
                    b = mid;
                }
            }
            a
        };

        let mut word_idx = block * BLOCK_LEN;
        let mut cur_rank = self.block_rank0(block);
        for t in 1..BLOCK_LEN {
            let r = self.sub_block_rank0(block * BLOCK_LEN + t);
            if r > k {
                break;
            }
            word_idx = block * BLOCK_LEN + t;
            cur_rank = r;
        }
        let sel =
            word_idx * WORD_LEN + broadword::select_in_word(!data.words()[word_idx], k - cur_rank)?;
        Some(sel)
    }
}
