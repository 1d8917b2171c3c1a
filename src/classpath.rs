//! Classpath reading (§6 "Classpath inputs", §4.classpath): turning a
//! caller-supplied [`ByteSupplier`] into [`BytecodeBoundClass`]es, plus the
//! `ct.sym` release-version naming scheme JDK platform classpaths use.
//!
//! Turbine itself never opens a jar or a `ct.sym` file -- a caller hands this
//! module a [`ByteSupplier`], and [`Classpath`] memoizes the parsed result
//! the same way the teacher's `CachingClassLoader` memoizes parsed
//! [`crate::jvm`]-style classes, just backed by `RefCell` instead of
//! `RwLock` since the whole pipeline runs on one thread (§5).
use std::cell::RefCell;
use std::collections::HashMap;
use std::io::{self, Read};
use std::str::FromStr;

use crate::bound::BytecodeBoundClass;
use crate::classfile::access_flags::ClassAccessFlags;
use crate::classfile::constant_pool::{BadConstantPoolIndex, ConstantPool};
use crate::classfile::reader::{read_byte_chunk, read_u16_prefixed_list, ValueReaderExt};
use crate::collab::{ByteSupplier, ProcessingHost};
use crate::sym::ClassSymbol;
use crate::types::descriptor::{FieldDescriptor, InvalidDescriptor, MethodDescriptor};

/// An error parsing a `.class` file's ABI-relevant header.
#[derive(Debug, thiserror::Error)]
pub enum ClassFileParseError {
    /// The leading 4 bytes weren't `0xCAFEBABE`.
    #[error("bad magic number: {0:#010x}")]
    BadMagic(u32),
    /// A constant pool index pointed outside the pool or at the wrong tag.
    #[error(transparent)]
    BadConstantPoolIndex(#[from] BadConstantPoolIndex),
    /// A field or method descriptor string didn't parse.
    #[error(transparent)]
    InvalidDescriptor(#[from] InvalidDescriptor),
    /// The byte stream ended before the declared structure did.
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Parses the ABI-relevant header of a `.class` file: access flags, this
/// class, superclass, interfaces, and field/method name-and-descriptor
/// pairs. Attribute bodies (code, debug info, annotations) are skipped by
/// length rather than interpreted, since [`BytecodeBoundClass`] only carries
/// erased member shapes.
///
/// # Errors
/// Returns [`ClassFileParseError`] if `bytes` is not a well-formed class
/// file header.
pub fn parse_bytecode_bound_class(bytes: &[u8]) -> Result<BytecodeBoundClass, ClassFileParseError> {
    let mut reader = bytes;

    let magic: u32 = reader.read_value()?;
    if magic != 0xCAFE_BABE {
        return Err(ClassFileParseError::BadMagic(magic));
    }
    let _minor: u16 = reader.read_value()?;
    let _major: u16 = reader.read_value()?;

    let constant_pool_count: u16 = reader.read_value()?;
    let pool = ConstantPool::from_reader(&mut reader, constant_pool_count)?;

    let access_flags_bits: u16 = reader.read_value()?;
    let _access_flags = ClassAccessFlags::from_bits_truncate(access_flags_bits);

    let this_class_index: u16 = reader.read_value()?;
    let sym = ClassSymbol::new(pool.get_class_name(this_class_index)?);

    let super_class_index: u16 = reader.read_value()?;
    let superclass = if super_class_index == 0 {
        None
    } else {
        Some(ClassSymbol::new(pool.get_class_name(super_class_index)?))
    };

    let interfaces = read_u16_prefixed_list(&mut reader, |r| {
        let index: u16 = r.read_value()?;
        Ok(index)
    })?
    .into_iter()
    .map(|index| pool.get_class_name(index).map(ClassSymbol::new))
    .collect::<Result<Vec<_>, _>>()?;

    let raw_fields = read_u16_prefixed_list(&mut reader, |r| read_member(r, &pool))?;
    let mut fields = Vec::with_capacity(raw_fields.len());
    for (name, descriptor) in raw_fields {
        fields.push((name, FieldDescriptor::from_str(&descriptor)?));
    }

    let raw_methods = read_u16_prefixed_list(&mut reader, |r| read_member(r, &pool))?;
    let mut methods = Vec::with_capacity(raw_methods.len());
    for (name, descriptor) in raw_methods {
        methods.push((name, MethodDescriptor::from_str(&descriptor)?));
    }

    Ok(BytecodeBoundClass {
        sym,
        superclass,
        interfaces,
        fields,
        methods,
    })
}

/// Reads one `field_info`/`method_info` structure (JVMS §4.5/§4.6), which
/// share a layout: access flags, name index, descriptor index, then an
/// attribute table. Returns the member's name and descriptor string;
/// attribute bodies are skipped wholesale.
fn read_member<R: Read + ?Sized>(
    reader: &mut R,
    pool: &ConstantPool,
) -> io::Result<(String, String)> {
    let _access_flags: u16 = reader.read_value()?;
    let name_index: u16 = reader.read_value()?;
    let descriptor_index: u16 = reader.read_value()?;
    skip_attributes(reader)?;

    let name = pool
        .get_utf8(name_index)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))?
        .to_owned();
    let descriptor = pool
        .get_utf8(descriptor_index)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))?
        .to_owned();
    Ok((name, descriptor))
}

/// Skips an `attributes` table (JVMS §4.7): a `u16` count followed by
/// `{name_index: u16, length: u32, info: [u8; length]}` entries.
fn skip_attributes<R: Read + ?Sized>(reader: &mut R) -> io::Result<()> {
    let count: u16 = reader.read_value()?;
    for _ in 0..count {
        let _name_index: u16 = reader.read_value()?;
        let length: u32 = reader.read_value()?;
        read_byte_chunk(reader, length as usize)?;
    }
    Ok(())
}

/// An error formatting a JDK feature-release number as its `ct.sym` release
/// letter/digit.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FormatReleaseVersionError {
    /// `version` did not parse as an unsigned integer.
    #[error("not a valid release number: {0}")]
    NotANumber(String),
    /// `ct.sym` has no entry for this release (too old to matter, or beyond
    /// the single base-36 digit the scheme allows).
    #[error("unsupported release: {0}")]
    UnsupportedRelease(u32),
}

/// Formats a JDK feature-release number (`"8"`, `"17"`, ...) the way
/// `ct.sym` directory entries name it: releases 1-9 as themselves, and
/// releases 10-35 as a single upper-case base-36 digit (`10` → `"A"`, `17` →
/// `"H"`, `35` → `"Z"`). `ct.sym` carries no entries for releases `<= 4` or
/// `>= 36`.
///
/// # Errors
/// Returns [`FormatReleaseVersionError`] if `version` isn't a number, or is
/// out of the range `ct.sym` supports.
pub fn format_release_version(version: &str) -> Result<String, FormatReleaseVersionError> {
    let release: u32 = version
        .parse()
        .map_err(|_| FormatReleaseVersionError::NotANumber(version.to_owned()))?;
    if release <= 4 || release >= 36 {
        return Err(FormatReleaseVersionError::UnsupportedRelease(release));
    }
    if release <= 9 {
        Ok(release.to_string())
    } else {
        let letter = u8::try_from(release - 10).expect("bounds checked above");
        Ok(char::from(b'A' + letter).to_string())
    }
}

/// A classpath: an ordered list of [`ByteSupplier`]s searched in order
/// (bootclasspath before user classpath, per the search order invariant),
/// memoizing each name's parsed [`BytecodeBoundClass`] the first time it's
/// asked for.
pub struct Classpath {
    entries: Vec<Box<dyn ByteSupplier>>,
    cache: RefCell<HashMap<String, Option<BytecodeBoundClass>>>,
}

impl std::fmt::Debug for Classpath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Classpath")
            .field("entries", &self.entries.len())
            .finish_non_exhaustive()
    }
}

impl Classpath {
    /// Builds a classpath searching `entries` in order; the first supplier
    /// to produce bytes for a given binary name wins.
    #[must_use]
    pub fn new(entries: Vec<Box<dyn ByteSupplier>>) -> Self {
        Self {
            entries,
            cache: RefCell::new(HashMap::new()),
        }
    }

    fn load(&self, binary_name: &str) -> Option<BytecodeBoundClass> {
        if let Some(cached) = self.cache.borrow().get(binary_name) {
            return cached.clone();
        }
        let parsed = self
            .entries
            .iter()
            .find_map(|entry| entry.bytes_for(binary_name))
            .and_then(|bytes| parse_bytecode_bound_class(&bytes).ok());
        self.cache
            .borrow_mut()
            .insert(binary_name.to_owned(), parsed.clone());
        parsed
    }
}

impl ProcessingHost for Classpath {
    fn classpath_class(&self, sym: &ClassSymbol) -> Option<BytecodeBoundClass> {
        self.load(sym.binary_name())
    }
}
