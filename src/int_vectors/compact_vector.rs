//! Compact vector in which each integer is represented in a fixed number of bits.

use std::io::{Read, Write};

use num_traits::ToPrimitive;

use crate::broadword::WORD_LEN;
use crate::error::{Error, Result};
use crate::serialization::Serialize;
use crate::utils;

/// Compact vector in which each integer is represented in a fixed number of bits.
///
/// # Memory usage
///
/// $`n \lceil \lg u \rceil`$ bits for $`n`$ integers in which a value is in $`[0,u)`$.
///
/// # Examples
///
/// ```
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use matchstats::int_vectors::CompactVector;
///
/// let mut cv = CompactVector::with_len(2, 3)?;
/// cv.set_int(0, 5)?;
/// cv.set_int(1, 7)?;
///
/// assert_eq!(cv.len(), 2);
/// assert_eq!(cv.width(), 3);
/// assert_eq!(cv.get_int(0), Some(5));
/// assert_eq!(cv.get_int(1), Some(7));
/// assert_eq!(cv.get_int(2), None);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompactVector {
    words: Vec<u64>,
    len: usize,
    width: usize,
}

impl CompactVector {
    /// Creates an empty vector storing integers in `width` bits.
    ///
    /// # Errors
    ///
    /// An error is returned if `width` is not in `1..=64`.
    pub fn new(width: usize) -> Result<Self> {
        if !(1..=WORD_LEN).contains(&width) {
            return Err(Error::invalid_argument(format!(
                "width must be in 1..=64, but got {width}."
            )));
        }
        Ok(Self {
            words: vec![],
            len: 0,
            width,
        })
    }

    /// Creates a vector of `len` zeros, each stored in `width` bits.
    ///
    /// # Errors
    ///
    /// An error is returned if `width` is not in `1..=64`.
    pub fn with_len(len: usize, width: usize) -> Result<Self> {
        let mut this = Self::new(width)?;
        this.words = vec![0; (len * width + WORD_LEN - 1) / WORD_LEN];
        this.len = len;
        Ok(this)
    }

    /// Creates a vector from a slice of integers `vals`.
    ///
    /// The width of each element automatically fits to the maximum value in `vals`.
    ///
    /// # Errors
    ///
    /// An error is returned if `vals` contains an integer that cannot be cast to [`usize`].
    ///
    /// # Examples
    ///
    /// ```
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// use matchstats::int_vectors::CompactVector;
    ///
    /// let cv = CompactVector::from_slice(&[7, 2])?;
    /// assert_eq!(cv.len(), 2);
    /// assert_eq!(cv.width(), 3);
    /// assert_eq!(cv.get_int(0), Some(7));
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_slice<T>(vals: &[T]) -> Result<Self>
    where
        T: ToPrimitive,
    {
        let mut max_int = 0;
        for x in vals {
            max_int = max_int.max(x.to_usize().ok_or_else(|| {
                Error::invalid_argument("vals must consist only of values castable into usize.")
            })?);
        }
        let mut this = Self::with_len(vals.len(), utils::needed_bits(max_int))?;
        for (i, x) in vals.iter().enumerate() {
            this.set_int(i, x.to_usize().unwrap())?;
        }
        Ok(this)
    }

    /// Appends `val` at the end.
    ///
    /// # Errors
    ///
    /// An error is returned if `val` does not fit in [`Self::width()`] bits.
    pub fn push_int(&mut self, val: usize) -> Result<()> {
        self.check_fits(val)?;
        let end = (self.len + 1) * self.width;
        while self.words.len() * WORD_LEN < end {
            self.words.push(0);
        }
        self.len += 1;
        self.set_int(self.len - 1, val)
    }

    /// Sets the `pos`-th integer to `val`.
    ///
    /// # Errors
    ///
    /// An error is returned if `pos` is out of bounds or if `val` does not
    /// fit in [`Self::width()`] bits.
    pub fn set_int(&mut self, pos: usize, val: usize) -> Result<()> {
        if self.len <= pos {
            return Err(Error::invalid_argument(format!(
                "pos must be less than self.len()={}, but got {pos}.",
                self.len
            )));
        }
        self.check_fits(val)?;
        let val = val as u64;
        let (block, shift) = (pos * self.width / WORD_LEN, pos * self.width % WORD_LEN);
        let mask = Self::mask(self.width);
        self.words[block] &= !(mask << shift);
        self.words[block] |= (val & mask) << shift;
        if shift + self.width > WORD_LEN {
            let spill = WORD_LEN - shift;
            let mask_hi = Self::mask(self.width - spill);
            self.words[block + 1] &= !mask_hi;
            self.words[block + 1] |= (val >> spill) & mask_hi;
        }
        Ok(())
    }

    /// Returns the `pos`-th integer, or [`None`] if out of bounds.
    ///
    /// # Complexity
    ///
    /// Constant
    #[inline(always)]
    pub fn get_int(&self, pos: usize) -> Option<usize> {
        if self.len <= pos {
            return None;
        }
        let (block, shift) = (pos * self.width / WORD_LEN, pos * self.width % WORD_LEN);
        let mask = Self::mask(self.width);
        let mut val = self.words[block] >> shift;
        if shift + self.width > WORD_LEN {
            val |= self.words[block + 1] << (WORD_LEN - shift);
        }
        Some((val & mask) as usize)
    }

    #[inline(always)]
    fn mask(width: usize) -> u64 {
        if width == WORD_LEN {
            u64::MAX
        } else {
            (1u64 << width) - 1
        }
    }

    fn check_fits(&self, val: usize) -> Result<()> {
        if self.width < WORD_LEN && (val as u64) >> self.width != 0 {
            return Err(Error::invalid_argument(format!(
                "val must fit in self.width()={} bits, but got {val}.",
                self.width
            )));
        }
        Ok(())
    }

    /// Gets the number of integers.
    #[inline(always)]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Checks if the vector is empty.
    #[inline(always)]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Gets the number of bits to represent an integer.
    #[inline(always)]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Creates an iterator for enumerating integers.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.len).map(move |i| self.get_int(i).unwrap())
    }

    /// Collects all integers into a `Vec<usize>` for inspection.
    pub fn to_vec(&self) -> Vec<usize> {
        self.iter().collect()
    }
}

impl Serialize for CompactVector {
    fn serialize_into<W: Write>(&self, writer: &mut W) -> Result<usize> {
        let mut written = self.len.serialize_into(writer)?;
        written += self.width.serialize_into(writer)?;
        written += self.words.serialize_into(writer)?;
        Ok(written)
    }

    fn deserialize_from<R: Read>(reader: &mut R) -> Result<Self> {
        let len = usize::deserialize_from(reader)?;
        let width = usize::deserialize_from(reader)?;
        if !(1..=WORD_LEN).contains(&width) {
            return Err(Error::invalid_data("compact vector width out of range"));
        }
        let words = Vec::<u64>::deserialize_from(reader)?;
        if words.len() != (len * width + WORD_LEN - 1) / WORD_LEN {
            return Err(Error::invalid_data(
                "compact vector word count does not match its length",
            ));
        }
        Ok(Self { words, len, width })
    }

    fn size_in_bytes(&self) -> usize {
        self.len.size_in_bytes() + self.width.size_in_bytes() + self.words.size_in_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn width_oob_0() {
        let e = CompactVector::new(0);
        assert_eq!(
            e.err().map(|x| x.to_string()),
            Some("width must be in 1..=64, but got 0.".to_string())
        );
    }

    #[test]
    fn width_oob_65() {
        let e = CompactVector::new(65);
        assert_eq!(
            e.err().map(|x| x.to_string()),
            Some("width must be in 1..=64, but got 65.".to_string())
        );
    }

    #[test]
    fn set_int_unfit() {
        let mut cv = CompactVector::with_len(1, 2).unwrap();
        let e = cv.set_int(0, 4);
        assert_eq!(
            e.err().map(|x| x.to_string()),
            Some("val must fit in self.width()=2 bits, but got 4.".to_string())
        );
    }

    #[test]
    fn set_int_oob() {
        let mut cv = CompactVector::with_len(1, 2).unwrap();
        let e = cv.set_int(1, 1);
        assert_eq!(
            e.err().map(|x| x.to_string()),
            Some("pos must be less than self.len()=1, but got 1.".to_string())
        );
    }

    #[test]
    fn cross_word_boundaries() {
        // Width 9 lets values straddle 64-bit word boundaries.
        let vals: Vec<usize> = (0..100).map(|i| (i * 37) % 512).collect();
        let mut cv = CompactVector::new(9).unwrap();
        for &v in &vals {
            cv.push_int(v).unwrap();
        }
        assert_eq!(cv.to_vec(), vals);
    }

    #[test]
    fn full_width() {
        let mut cv = CompactVector::new(64).unwrap();
        cv.push_int(usize::MAX).unwrap();
        cv.push_int(42).unwrap();
        assert_eq!(cv.get_int(0), Some(usize::MAX));
        assert_eq!(cv.get_int(1), Some(42));
    }

    #[test]
    fn from_slice_fits_width() {
        let cv = CompactVector::from_slice(&[5, 256, 0]).unwrap();
        assert_eq!(cv.width(), 9);
        assert_eq!(cv.to_vec(), vec![5, 256, 0]);
    }

    #[test]
    fn roundtrip() {
        let cv = CompactVector::from_slice(&[4, 5, 6, 1023]).unwrap();
        let mut buf = vec![];
        let written = cv.serialize_into(&mut buf).unwrap();
        assert_eq!(written, cv.size_in_bytes());
        let other = CompactVector::deserialize_from(&mut buf.as_slice()).unwrap();
        assert_eq!(cv, other);
    }
}
