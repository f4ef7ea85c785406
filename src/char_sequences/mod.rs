//! Character sequences with rank/select support.
//!
//! [`WaveletMatrix`] stores a byte sequence and answers
//! $`\textrm{access}`$, $`\textrm{rank}_c`$, and $`\textrm{select}_c`$
//! in $`O(\lg \sigma)`$ time. The crate uses it for the run-head
//! characters of the run-length encoded BWT.
pub mod wavelet_matrix;

pub use wavelet_matrix::WaveletMatrix;
