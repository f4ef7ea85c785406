//! Reference construction of index artifacts for small texts.
//!
//! Builds the suffix array, BWT, per-run suffix-array samples, and
//! per-run thresholds of a terminated text by brute force, and writes
//! them in the on-disk formats the index consumes.

use std::path::{Path, PathBuf};

use byteorder::{LittleEndian, WriteBytesExt};
use matchstats::{LENBYTES, SSABYTES, TERMINATOR, THRBYTES};

/// A text with its brute-force suffix array and BWT.
pub struct Reference {
    /// The text, terminator included as its last byte.
    pub text: Vec<u8>,
    /// Suffix array of `text`.
    pub sa: Vec<usize>,
    /// BWT of `text` derived from `sa`.
    pub bwt: Vec<u8>,
    /// Start row of each BWT run.
    pub run_starts: Vec<usize>,
    /// End row (inclusive) of each BWT run.
    pub run_ends: Vec<usize>,
}

impl Reference {
    /// Builds the reference structures for `text` (terminator appended
    /// here; do not include it).
    pub fn new(text_without_term: &[u8]) -> Self {
        assert!(text_without_term.iter().all(|&c| c > TERMINATOR));
        let mut text = text_without_term.to_vec();
        text.push(TERMINATOR);
        let n = text.len();

        let mut sa: Vec<usize> = (0..n).collect();
        sa.sort_by(|&a, &b| text[a..].cmp(&text[b..]));

        let bwt: Vec<u8> = sa.iter().map(|&s| text[(s + n - 1) % n]).collect();

        let mut run_starts = vec![0];
        let mut run_ends = vec![];
        for i in 1..n {
            if bwt[i] != bwt[i - 1] {
                run_ends.push(i - 1);
                run_starts.push(i);
            }
        }
        run_ends.push(n - 1);

        Self {
            text,
            sa,
            bwt,
            run_starts,
            run_ends,
        }
    }

    /// Returns the text length including the terminator.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Returns the number of BWT runs.
    pub fn num_runs(&self) -> usize {
        self.run_starts.len()
    }

    /// Longest common prefix length of the two byte slices.
    pub fn lcp(a: &[u8], b: &[u8]) -> usize {
        a.iter().zip(b).take_while(|(x, y)| x == y).count()
    }

    fn lcp_array(&self) -> Vec<usize> {
        let mut lcp = vec![0; self.len()];
        for i in 1..self.len() {
            lcp[i] = Self::lcp(&self.text[self.sa[i - 1]..], &self.text[self.sa[i]..]);
        }
        lcp
    }

    /// Computes the per-run thresholds: for each run, the BWT row
    /// between the end of the previous same-character run and the start
    /// of this one where the LCP array is minimal; rows below it are
    /// closer to the previous run. The first run of each character gets
    /// threshold zero.
    pub fn thresholds(&self) -> Vec<usize> {
        let lcp = self.lcp_array();
        let mut thresholds = vec![0; self.num_runs()];
        for j in 0..self.num_runs() {
            let head = self.bwt[self.run_starts[j]];
            let prev = (0..j).rev().find(|&p| self.bwt[self.run_starts[p]] == head);
            let Some(prev) = prev else {
                continue;
            };
            let lo = self.run_ends[prev] + 1;
            let hi = self.run_starts[j];
            let mut best = lo;
            for i in lo..=hi {
                if lcp[i] < lcp[best] {
                    best = i;
                }
            }
            thresholds[j] = best;
        }
        thresholds
    }

    /// For pattern position `k`, the longest common prefix achievable
    /// between `pattern[k..]` and any text suffix starting with
    /// `pattern[k]`, or [`None`] if `pattern[k]` does not occur.
    pub fn best_match_len(&self, pattern: &[u8], k: usize) -> Option<usize> {
        (0..self.len())
            .filter(|&i| self.text[i] == pattern[k])
            .map(|i| Self::lcp(&self.text[i..], &pattern[k..]))
            .max()
    }

    /// Row holding the suffix `(sa_value - 1) mod n`, i.e. the
    /// reference image of one LF step from row `i`.
    pub fn lf_reference(&self, i: usize) -> usize {
        let n = self.len();
        let target = (self.sa[i] + n - 1) % n;
        self.sa.iter().position(|&s| s == target).unwrap()
    }

    /// Writes `<prefix>.bwt`, `<prefix>.ssa`, `<prefix>.esa`, and
    /// `<prefix>.thr_pos` under `dir` and returns the prefix.
    pub fn write_artifacts(&self, dir: &Path, name: &str) -> PathBuf {
        let prefix = dir.join(name);
        std::fs::write(prefix.with_extension("bwt"), &self.bwt).unwrap();
        write_pairs(
            &prefix.with_extension("ssa"),
            self.run_starts.iter().map(|&p| (p, self.sa[p])),
        );
        write_pairs(
            &prefix.with_extension("esa"),
            self.run_ends.iter().map(|&p| (p, self.sa[p])),
        );
        let mut buf = vec![];
        for &t in &self.thresholds() {
            buf.write_uint::<LittleEndian>(t as u64, THRBYTES).unwrap();
        }
        std::fs::write(prefix.with_extension("thr_pos"), buf).unwrap();
        prefix
    }

    /// Writes the run heads and 5-byte run lengths of the BWT, for the
    /// run-length encoded constructor.
    pub fn write_runs(&self, dir: &Path, name: &str) -> (PathBuf, PathBuf) {
        let heads_path = dir.join(format!("{name}.heads"));
        let lens_path = dir.join(format!("{name}.len"));
        let heads: Vec<u8> = self.run_starts.iter().map(|&p| self.bwt[p]).collect();
        std::fs::write(&heads_path, heads).unwrap();
        let mut buf = vec![];
        for (&s, &e) in self.run_starts.iter().zip(&self.run_ends) {
            buf.write_uint::<LittleEndian>((e - s + 1) as u64, LENBYTES)
                .unwrap();
        }
        std::fs::write(&lens_path, buf).unwrap();
        (heads_path, lens_path)
    }
}

fn write_pairs<I: Iterator<Item = (usize, usize)>>(path: &Path, pairs: I) {
    let mut buf = vec![];
    for (x, y) in pairs {
        buf.write_uint::<LittleEndian>(x as u64, SSABYTES).unwrap();
        buf.write_uint::<LittleEndian>(y as u64, SSABYTES).unwrap();
    }
    std::fs::write(path, buf).unwrap();
}
