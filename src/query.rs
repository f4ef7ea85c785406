//! Matching statistics queries: the backward pattern scan.

use crate::bit_vectors::MarkerBits;
use crate::index::MsIndex;

impl<V: MarkerBits> MsIndex<V> {
    /// Computes the matching statistics pointers for `pattern`.
    ///
    /// The pattern is scanned backwards while one BWT row carrying the
    /// surviving match candidate is maintained together with its
    /// suffix-array sample. For every pattern position `k`, the
    /// returned vector holds a text position beginning an occurrence
    /// whose common prefix with `P[k..]` is longest among all suffixes
    /// starting with `P[k]`. Positions whose character does not occur
    /// in the text at all report `0`.
    ///
    /// On a matching character the sample slides one text position to
    /// the left (modulo `n`, the suffix-array wrap over the
    /// terminator). On a mismatch the scan jumps to the nearest run of
    /// the wanted character: the run threshold decides whether the
    /// preceding run (taking its last sample) or the following run
    /// (taking its first sample) preserves the longer match.
    ///
    /// Queries are total: no input pattern can make them fail, and the
    /// output length always equals the pattern length.
    ///
    /// # Complexity
    ///
    /// $`O(m)`$ rank/select operations on the RLBWT for a pattern of
    /// length $`m`$.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// use matchstats::MsIndex;
    ///
    /// let index: MsIndex = MsIndex::from_files("data/chr21")?;
    /// let pointers = index.query(b"GATTACA");
    /// assert_eq!(pointers.len(), 7);
    /// # Ok(())
    /// # }
    /// ```
    pub fn query(&self, pattern: &[u8]) -> Vec<usize> {
        let m = pattern.len();
        let n = self.len();
        let mut pointers = vec![0; m];

        // Start from the empty suffix: the row after the last one.
        let mut pos = n - 1;
        let mut sample = self.last_run_sample();

        for i in 0..m {
            let c = pattern[m - i - 1];

            if self.bwt.num_occ(c) == 0 {
                // The character never occurs: report the sentinel and
                // restart from the empty suffix, since no match can
                // extend across this position.
                pointers[m - i - 1] = 0;
                pos = n - 1;
                sample = self.last_run_sample();
                continue;
            }

            if pos < n && self.bwt.access(pos) == Some(c) {
                // The match extends: the row above in the same run holds
                // the previous text position.
                sample = if sample == 0 { n - 1 } else { sample - 1 };
            } else {
                // NOTE: rank/select are safe; c occurs in the BWT and
                // pos never exceeds n.
                let rnk = self.bwt.rank(pos, c).unwrap();
                let mut thr = n + 1;
                let mut next_pos = pos;

                if rnk < self.bwt.num_occ(c) {
                    // j is the first position of the next run of c's.
                    let j = self.bwt.select(rnk, c).unwrap();
                    let run_of_j = self.bwt.run_of_position(j).unwrap();

                    // Zero for the first c-run, so the branch below is
                    // never taken there.
                    thr = self.thresholds[run_of_j];
                    sample = self.samples_start[run_of_j];
                    next_pos = j;
                }

                if pos < thr {
                    // Rows below the threshold are closer to the
                    // preceding run of c's.
                    let j = self.bwt.select(rnk - 1, c).unwrap();
                    let run_of_j = self.bwt.run_of_position(j).unwrap();
                    sample = self.samples_last.get_int(run_of_j).unwrap();
                    next_pos = j;
                }

                pos = next_pos;
            }

            pointers[m - i - 1] = sample;

            // One backward step.
            pos = self.lf(pos, c);
        }

        pointers
    }
}
