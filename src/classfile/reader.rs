//! Binary reading primitives, ported from the big-endian reader the teacher
//! uses for class files: [`FromReader`]/[`ValueReaderExt`] plus
//! [`read_byte_chunk`]. Shared by [`super::constant_pool`] and by
//! [`ClassReader`], the entry point the classpath loader calls on library
//! `.class` bytes.
use std::io::{self, Read};

pub(crate) trait ValueReaderExt: Read {
    fn read_value<T: FromReader>(&mut self) -> io::Result<T>;
}

pub(crate) trait FromReader {
    fn from_reader<R: Read + ?Sized>(reader: &mut R) -> io::Result<Self>
    where
        Self: Sized;
}

impl<R: Read + ?Sized> ValueReaderExt for R {
    fn read_value<T: FromReader>(&mut self) -> io::Result<T> {
        T::from_reader(self)
    }
}

impl<const N: usize> FromReader for [u8; N] {
    fn from_reader<R: Read + ?Sized>(reader: &mut R) -> io::Result<Self> {
        let mut buf = [0u8; N];
        reader.read_exact(&mut buf)?;
        Ok(buf)
    }
}

#[trait_gen::trait_gen(T -> u8, u16, u32, i8, i16, i32, i64, f32, f64)]
impl FromReader for T {
    fn from_reader<R: Read + ?Sized>(reader: &mut R) -> io::Result<Self> {
        let buf = reader.read_value()?;
        Ok(Self::from_be_bytes(buf))
    }
}

/// Reads exactly `len` bytes, advancing the reader.
pub(crate) fn read_byte_chunk<R: Read + ?Sized>(reader: &mut R, len: usize) -> io::Result<Vec<u8>> {
    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf)?;
    Ok(buf)
}

/// Reads a `u16`-prefixed list via `item`, the shape JVMS uses for every
/// `_count` / table pair (`interfaces`, `fields`, `methods`, attribute
/// tables, ...).
pub(crate) fn read_u16_prefixed_list<R, T, F>(reader: &mut R, mut item: F) -> io::Result<Vec<T>>
where
    R: Read + ?Sized,
    F: FnMut(&mut R) -> io::Result<T>,
{
    let count: u16 = reader.read_value()?;
    (0..count).map(|_| item(reader)).collect()
}
