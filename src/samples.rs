//! Loaders for the per-run suffix-array samples and thresholds.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt};

use crate::error::{Error, Result};
use crate::{SSABYTES, THRBYTES};

/// Reads a file of `(x, y)` sample pairs, each integer [`SSABYTES`]
/// bytes wide in little-endian order, and returns one suffix-array
/// sample per pair.
///
/// The `y` field is the suffix-array value of the sampled BWT row; the
/// returned sample is the text position of the row's BWT character,
/// `y == 0 ? n - 1 : y - 1`. The `x` field orders the pairs and is
/// ignored; files are taken in run order.
///
/// # Errors
///
/// An error is returned if the file cannot be opened or statted, or if
/// its size is not a multiple of one pair (a trailing partial record is
/// a short read).
pub fn read_run_samples<P: AsRef<Path>>(path: P, n: usize) -> Result<Vec<usize>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| Error::file(path, e))?;
    let size = file
        .metadata()
        .map_err(|e| Error::file(path, e))?
        .len() as usize;
    let pair_bytes = 2 * SSABYTES;
    if size % pair_bytes != 0 {
        return Err(Error::file(
            path,
            std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "trailing partial sample pair",
            ),
        ));
    }

    let mut reader = BufReader::new(file);
    let mut samples = Vec::with_capacity(size / pair_bytes);
    for _ in 0..size / pair_bytes {
        let _x = read_record(&mut reader, SSABYTES).map_err(|e| Error::file(path, e))?;
        let y = read_record(&mut reader, SSABYTES).map_err(|e| Error::file(path, e))?;
        samples.push(if y == 0 { n - 1 } else { y - 1 });
    }
    Ok(samples)
}

/// Reads a file of tightly packed [`THRBYTES`]-byte little-endian
/// thresholds.
///
/// # Errors
///
/// An error is returned if the file cannot be opened or statted, if its
/// size is not a multiple of [`THRBYTES`], or on a short read.
pub fn read_thresholds<P: AsRef<Path>>(path: P) -> Result<Vec<usize>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| Error::file(path, e))?;
    let size = file
        .metadata()
        .map_err(|e| Error::file(path, e))?
        .len() as usize;
    if size % THRBYTES != 0 {
        return Err(Error::corrupt(
            path,
            format!("size {size} is not a multiple of {THRBYTES}"),
        ));
    }

    let mut reader = BufReader::new(file);
    let mut thresholds = Vec::with_capacity(size / THRBYTES);
    for _ in 0..size / THRBYTES {
        let t = read_record(&mut reader, THRBYTES).map_err(|e| Error::file(path, e))?;
        thresholds.push(t);
    }
    Ok(thresholds)
}

fn read_record<R: Read>(reader: &mut R, nbytes: usize) -> std::io::Result<usize> {
    Ok(reader.read_uint::<LittleEndian>(nbytes)? as usize)
}
