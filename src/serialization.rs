//! Copying serialization into sequential byte regions.
//!
//! Every persistent structure in this crate writes itself as one
//! contiguous little-endian byte region and reads itself back from the
//! same region. Auxiliary rank/select indexes are never persisted; they
//! are rebuilt from the raw data on load.

use std::io::{Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::error::Result;

/// Types that can be written to and restored from a byte stream.
pub trait Serialize: Sized {
    /// Writes `self` into `writer`, returning the number of bytes written.
    fn serialize_into<W: Write>(&self, writer: &mut W) -> Result<usize>;

    /// Reads an instance back from `reader`.
    fn deserialize_from<R: Read>(reader: &mut R) -> Result<Self>;

    /// Returns the number of bytes the serialized form occupies.
    fn size_in_bytes(&self) -> usize;
}

impl Serialize for usize {
    fn serialize_into<W: Write>(&self, writer: &mut W) -> Result<usize> {
        writer.write_u64::<LittleEndian>(*self as u64)?;
        Ok(std::mem::size_of::<u64>())
    }

    fn deserialize_from<R: Read>(reader: &mut R) -> Result<Self> {
        Ok(reader.read_u64::<LittleEndian>()? as usize)
    }

    fn size_in_bytes(&self) -> usize {
        std::mem::size_of::<u64>()
    }
}

impl Serialize for Vec<usize> {
    fn serialize_into<W: Write>(&self, writer: &mut W) -> Result<usize> {
        writer.write_u64::<LittleEndian>(self.len() as u64)?;
        for &x in self {
            writer.write_u64::<LittleEndian>(x as u64)?;
        }
        Ok(self.size_in_bytes())
    }

    fn deserialize_from<R: Read>(reader: &mut R) -> Result<Self> {
        let len = reader.read_u64::<LittleEndian>()? as usize;
        let mut vals = Vec::with_capacity(len);
        for _ in 0..len {
            vals.push(reader.read_u64::<LittleEndian>()? as usize);
        }
        Ok(vals)
    }

    fn size_in_bytes(&self) -> usize {
        std::mem::size_of::<u64>() * (self.len() + 1)
    }
}

impl Serialize for Vec<u64> {
    fn serialize_into<W: Write>(&self, writer: &mut W) -> Result<usize> {
        writer.write_u64::<LittleEndian>(self.len() as u64)?;
        for &x in self {
            writer.write_u64::<LittleEndian>(x)?;
        }
        Ok(self.size_in_bytes())
    }

    fn deserialize_from<R: Read>(reader: &mut R) -> Result<Self> {
        let len = reader.read_u64::<LittleEndian>()? as usize;
        let mut vals = Vec::with_capacity(len);
        for _ in 0..len {
            vals.push(reader.read_u64::<LittleEndian>()?);
        }
        Ok(vals)
    }

    fn size_in_bytes(&self) -> usize {
        std::mem::size_of::<u64>() * (self.len() + 1)
    }
}
