//! The matching statistics index: F column, LF mapping, build and
//! persistence.

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::bit_vectors::MarkerBits;
use crate::error::{Error, Result};
use crate::int_vectors::CompactVector;
use crate::rlbwt::{RleBwt, DEFAULT_BLOCK};
use crate::samples::{read_run_samples, read_thresholds};
use crate::serialization::Serialize;
use crate::utils;
use crate::{SdVector, TERMINATOR};

/// Matching statistics index over a run-length encoded BWT.
///
/// Owns the RLBWT, the F column, the per-run suffix-array samples
/// (`samples_start` unpacked, `samples_last` packed in
/// $`\lceil \lg n \rceil`$ bits), and the per-run thresholds. Immutable
/// after construction; any number of [`query`](Self::query) calls may
/// run concurrently on a shared reference.
///
/// Built from four artifact files produced by an external pipeline:
/// `<prefix>.bwt` (raw BWT bytes), `<prefix>.ssa`/`<prefix>.esa`
/// (suffix-array samples at run starts/ends), and `<prefix>.thr_pos`
/// (per-run thresholds). See [`MsIndex::from_files`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MsIndex<V = SdVector> {
    pub(crate) terminator_position: usize,
    pub(crate) f: Vec<usize>,
    pub(crate) bwt: RleBwt<V>,
    pub(crate) samples_start: Vec<usize>,
    pub(crate) samples_last: CompactVector,
    pub(crate) thresholds: Vec<usize>,
}

impl<V: MarkerBits> MsIndex<V> {
    /// Builds the index from `<prefix>.bwt`, `<prefix>.ssa`,
    /// `<prefix>.esa`, and `<prefix>.thr_pos` with the default block
    /// parameter.
    ///
    /// # Errors
    ///
    /// Any open, stat, or read failure on the four input files is
    /// fatal and reports the offending path; so are a `.thr_pos` size
    /// that is not a multiple of the record width and sample or
    /// threshold files whose record count disagrees with the number of
    /// BWT runs. No partial index is ever returned.
    pub fn from_files<P: AsRef<Path>>(prefix: P) -> Result<Self> {
        Self::from_files_with_block(prefix, DEFAULT_BLOCK)
    }

    /// Builds the index as [`Self::from_files`] with an explicit block
    /// parameter for the RLBWT run markers.
    pub fn from_files_with_block<P: AsRef<Path>>(prefix: P, block: usize) -> Result<Self> {
        let prefix = prefix.as_ref();
        let bwt_path = suffixed(prefix, ".bwt");

        info!("run-length encoding the BWT from {}", bwt_path.display());
        let file = File::open(&bwt_path).map_err(|e| Error::file(&bwt_path, e))?;
        let mut reader = BufReader::new(file);
        let bwt =
            RleBwt::from_reader(&mut reader, block).map_err(|e| attach_path(e, &bwt_path))?;

        let n = bwt.len();
        let r = bwt.num_runs();
        debug!(
            n,
            r,
            rate = n as f64 / r as f64,
            log_n = utils::needed_bits(n),
            log_r = utils::needed_bits(r),
            "BWT statistics"
        );

        reader
            .seek(SeekFrom::Start(0))
            .map_err(|e| Error::file(&bwt_path, e))?;
        let (f, terminator_position) =
            build_f(&mut reader).map_err(|e| attach_path(e, &bwt_path))?;

        info!("reading suffix-array samples");
        let ssa_path = suffixed(prefix, ".ssa");
        let samples_start = read_run_samples(&ssa_path, n)?;
        if samples_start.len() != r {
            return Err(Error::shape_mismatch(format!(
                "{} holds {} samples for {} runs",
                ssa_path.display(),
                samples_start.len(),
                r
            )));
        }

        let esa_path = suffixed(prefix, ".esa");
        let samples_last_vec = read_run_samples(&esa_path, n)?;
        if samples_last_vec.len() != r {
            return Err(Error::shape_mismatch(format!(
                "{} holds {} samples for {} runs",
                esa_path.display(),
                samples_last_vec.len(),
                r
            )));
        }
        let mut samples_last =
            CompactVector::with_len(r, utils::needed_bits(n.saturating_sub(1)))?;
        for (i, &s) in samples_last_vec.iter().enumerate() {
            samples_last.set_int(i, s)?;
        }

        info!("reading thresholds");
        let thr_path = suffixed(prefix, ".thr_pos");
        let thresholds = read_thresholds(&thr_path)?;
        if thresholds.len() != r {
            return Err(Error::shape_mismatch(format!(
                "{} holds {} thresholds for {} runs",
                thr_path.display(),
                thresholds.len(),
                r
            )));
        }

        info!("index construction complete");
        Ok(Self {
            terminator_position,
            f,
            bwt,
            samples_start,
            samples_last,
            thresholds,
        })
    }

    /// Returns the BWT length `n`.
    #[inline(always)]
    pub const fn len(&self) -> usize {
        self.bwt.len()
    }

    /// Checks if the index is empty. Always `false` for a built
    /// instance, kept for interface completeness.
    #[inline(always)]
    pub const fn is_empty(&self) -> bool {
        self.bwt.is_empty()
    }

    /// Returns the number of BWT runs `r`.
    #[inline(always)]
    pub const fn num_runs(&self) -> usize {
        self.bwt.num_runs()
    }

    /// Returns the BWT position of the terminator.
    #[inline(always)]
    pub const fn terminator_position(&self) -> usize {
        self.terminator_position
    }

    /// Returns the run-length encoded BWT.
    #[inline(always)]
    pub const fn bwt(&self) -> &RleBwt<V> {
        &self.bwt
    }

    /// Returns the F column: 257 exclusive prefix sums of the character
    /// histogram, so that `f()[c]` is the first BWT row starting with
    /// `c` and `f()[256]` is `n`.
    #[inline(always)]
    pub fn f(&self) -> &[usize] {
        &self.f
    }

    /// Returns the per-run suffix-array samples taken at run starts.
    #[inline(always)]
    pub fn samples_start(&self) -> &[usize] {
        &self.samples_start
    }

    /// Returns the per-run suffix-array samples taken at run ends,
    /// packed in $`\lceil \lg n \rceil`$ bits each.
    #[inline(always)]
    pub const fn samples_last(&self) -> &CompactVector {
        &self.samples_last
    }

    /// Returns the per-run thresholds.
    #[inline(always)]
    pub fn thresholds(&self) -> &[usize] {
        &self.thresholds
    }

    /// Maps BWT position `i` to the row of the occurrence of `c`
    /// preceding row `i`'s suffix, i.e. the standard backward step.
    ///
    /// Callers only invoke this with characters occurring in the BWT.
    #[inline(always)]
    pub fn lf(&self, i: usize, c: u8) -> usize {
        // NOTE: rank is safe for i <= n.
        self.f[usize::from(c)] + self.bwt.rank(i, c).unwrap()
    }

    /// Returns the suffix-array sample associated with the row after
    /// the last BWT row, the scan state before any character is
    /// consumed.
    #[inline(always)]
    pub(crate) fn last_run_sample(&self) -> usize {
        (self.samples_last.get_int(self.num_runs() - 1).unwrap() + 1) % self.len()
    }
}

impl<V: MarkerBits> Serialize for MsIndex<V> {
    fn serialize_into<W: Write>(&self, writer: &mut W) -> Result<usize> {
        let mut written = self.terminator_position.serialize_into(writer)?;
        written += self.f.serialize_into(writer)?;
        written += self.bwt.serialize_into(writer)?;
        written += self.samples_last.serialize_into(writer)?;
        written += self.thresholds.serialize_into(writer)?;
        written += self.samples_start.serialize_into(writer)?;
        Ok(written)
    }

    fn deserialize_from<R: Read>(reader: &mut R) -> Result<Self> {
        let terminator_position = usize::deserialize_from(reader)?;
        let f = Vec::<usize>::deserialize_from(reader)?;
        let bwt = RleBwt::<V>::deserialize_from(reader)?;
        let samples_last = CompactVector::deserialize_from(reader)?;
        let thresholds = Vec::<usize>::deserialize_from(reader)?;
        let samples_start = Vec::<usize>::deserialize_from(reader)?;

        let r = bwt.num_runs();
        if f.len() != 257 {
            return Err(Error::invalid_data("F column must hold 257 entries"));
        }
        if samples_last.len() != r || thresholds.len() != r || samples_start.len() != r {
            return Err(Error::invalid_data(
                "sample and threshold lengths do not match the number of runs",
            ));
        }
        Ok(Self {
            terminator_position,
            f,
            bwt,
            samples_start,
            samples_last,
            thresholds,
        })
    }

    fn size_in_bytes(&self) -> usize {
        self.terminator_position.size_in_bytes()
            + self.f.size_in_bytes()
            + self.bwt.size_in_bytes()
            + self.samples_last.size_in_bytes()
            + self.thresholds.size_in_bytes()
            + self.samples_start.size_in_bytes()
    }
}

/// Appends `ext` to `prefix` without touching existing dots in it.
fn suffixed(prefix: &Path, ext: &str) -> PathBuf {
    let mut os = prefix.as_os_str().to_os_string();
    os.push(ext);
    PathBuf::from(os)
}

/// Attaches `path` to bare I/O errors raised while streaming a file.
fn attach_path(err: Error, path: &Path) -> Error {
    match err {
        Error::Io(source) => Error::file(path, source),
        other => other,
    }
}

/// Computes the F column and the terminator position in one pass over
/// the BWT bytes.
///
/// Bytes `<= 1` count as [`TERMINATOR`]; the result holds 257 exclusive
/// prefix sums with `f[0] = 0` and `f[256] = n`.
fn build_f<R: Read>(reader: &mut R) -> Result<(Vec<usize>, usize)> {
    let mut counts = vec![0usize; 257];
    let mut terminator_position = 0;
    let mut pos = 0;
    let mut buf = [0u8; 1 << 16];
    loop {
        let got = reader.read(&mut buf)?;
        if got == 0 {
            break;
        }
        for &byte in &buf[..got] {
            if byte <= TERMINATOR {
                counts[usize::from(TERMINATOR)] += 1;
                terminator_position = pos;
            } else {
                counts[usize::from(byte)] += 1;
            }
            pos += 1;
        }
    }
    let mut f = vec![0usize; 257];
    for c in 0..256 {
        f[c + 1] = f[c] + counts[c];
    }
    Ok((f, terminator_position))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn f_counts_and_terminator() {
        let bwt = b"ipssm\x01pissii";
        let (f, term) = build_f(&mut &bwt[..]).unwrap();
        assert_eq!(term, 5);
        assert_eq!(f.len(), 257);
        assert_eq!(f[0], 0);
        assert_eq!(f[256], bwt.len());
        // One terminator, then i < m < p < s in lexicographic order.
        assert_eq!(f[usize::from(TERMINATOR)], 0);
        assert_eq!(f[usize::from(b'i')], 1);
        assert_eq!(f[usize::from(b'm')], 5);
        assert_eq!(f[usize::from(b'p')], 6);
        assert_eq!(f[usize::from(b's')], 8);
        assert_eq!(f[usize::from(b's') + 1], 12);
    }

    #[test]
    fn f_remaps_zero() {
        let (f, term) = build_f(&mut &b"\x00A"[..]).unwrap();
        assert_eq!(term, 0);
        assert_eq!(f[usize::from(TERMINATOR)], 0);
        assert_eq!(f[usize::from(TERMINATOR) + 1], 1);
    }

    #[test]
    fn suffixed_keeps_dots() {
        let p = suffixed(Path::new("data/chr21.v1"), ".thr_pos");
        assert_eq!(p, PathBuf::from("data/chr21.v1.thr_pos"));
    }
}
