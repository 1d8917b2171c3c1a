//! The constant pool (JVMS §4.4).
//!
//! `ConstantPool` here is bidirectional, unlike the teacher's read-only
//! version: lowering (§4.J) builds one up entry by entry while emitting a
//! header class, and the classpath reader (§4.classpath) parses one back out
//! of an existing `.class` file to recover a library class's ABI.
use std::collections::HashMap;
use std::io::{self, Read};

use crate::classfile::reader::{FromReader, ValueReaderExt};

#[derive(Debug, Clone)]
enum Slot {
    Entry(Entry),
    Padding,
}

/// An entry in the [`ConstantPool`], tagged per JVMS §4.4 Table 4.4-A.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Entry {
    /// `CONSTANT_Utf8`, modified-UTF-8 encoded via `cesu8`.
    Utf8(String),
    /// `CONSTANT_Integer`.
    Integer(i32),
    /// `CONSTANT_Float`.
    Float(f32),
    /// `CONSTANT_Long`, occupies two consecutive pool entries.
    Long(i64),
    /// `CONSTANT_Double`, occupies two consecutive pool entries.
    Double(f64),
    /// `CONSTANT_Class`.
    Class {
        /// Index of the `Utf8` entry holding the binary name.
        name_index: u16,
    },
    /// `CONSTANT_String`.
    String {
        /// Index of the `Utf8` entry holding the string's value.
        string_index: u16,
    },
    /// `CONSTANT_Fieldref`.
    FieldRef {
        /// Index of the `Class` entry of the declaring class.
        class_index: u16,
        /// Index of the `NameAndType` entry.
        name_and_type_index: u16,
    },
    /// `CONSTANT_Methodref`.
    MethodRef {
        /// Index of the `Class` entry of the declaring class.
        class_index: u16,
        /// Index of the `NameAndType` entry.
        name_and_type_index: u16,
    },
    /// `CONSTANT_InterfaceMethodref`.
    InterfaceMethodRef {
        /// Index of the `Class` entry of the declaring interface.
        class_index: u16,
        /// Index of the `NameAndType` entry.
        name_and_type_index: u16,
    },
    /// `CONSTANT_NameAndType`.
    NameAndType {
        /// Index of the `Utf8` entry holding the name.
        name_index: u16,
        /// Index of the `Utf8` entry holding the descriptor.
        descriptor_index: u16,
    },
    /// `CONSTANT_MethodHandle`.
    MethodHandle {
        /// The kind of method handle, JVMS Table 4.4.8-A.
        reference_kind: u8,
        /// Index of the referenced `Fieldref`/`Methodref`/`InterfaceMethodref`.
        reference_index: u16,
    },
    /// `CONSTANT_MethodType`.
    MethodType {
        /// Index of the `Utf8` entry holding the method descriptor.
        descriptor_index: u16,
    },
    /// `CONSTANT_Dynamic`.
    Dynamic {
        /// Index into the `BootstrapMethods` attribute's table.
        bootstrap_method_attr_index: u16,
        /// Index of the `NameAndType` entry.
        name_and_type_index: u16,
    },
    /// `CONSTANT_InvokeDynamic`. Turbine never writes one (no bodies are
    /// lowered) but the classpath reader must still be able to skip over it.
    InvokeDynamic {
        /// Index into the `BootstrapMethods` attribute's table.
        bootstrap_method_attr_index: u16,
        /// Index of the `NameAndType` entry.
        name_and_type_index: u16,
    },
    /// `CONSTANT_Module`.
    Module {
        /// Index of the `Utf8` entry holding the module name.
        name_index: u16,
    },
    /// `CONSTANT_Package`.
    Package {
        /// Index of the `Utf8` entry holding the package name.
        name_index: u16,
    },
}

impl Entry {
    const fn tag(&self) -> u8 {
        match self {
            Self::Utf8(_) => 1,
            Self::Integer(_) => 3,
            Self::Float(_) => 4,
            Self::Long(_) => 5,
            Self::Double(_) => 6,
            Self::Class { .. } => 7,
            Self::String { .. } => 8,
            Self::FieldRef { .. } => 9,
            Self::MethodRef { .. } => 10,
            Self::InterfaceMethodRef { .. } => 11,
            Self::NameAndType { .. } => 12,
            Self::MethodHandle { .. } => 15,
            Self::MethodType { .. } => 16,
            Self::Dynamic { .. } => 17,
            Self::InvokeDynamic { .. } => 18,
            Self::Module { .. } => 19,
            Self::Package { .. } => 20,
        }
    }

    fn write_to(&self, out: &mut Vec<u8>) {
        out.push(self.tag());
        match self {
            Self::Utf8(s) => {
                let bytes = cesu8::to_java_cesu8(s);
                out.extend_from_slice(&(bytes.len() as u16).to_be_bytes());
                out.extend_from_slice(&bytes);
            }
            Self::Integer(v) => out.extend_from_slice(&v.to_be_bytes()),
            Self::Float(v) => out.extend_from_slice(&v.to_be_bytes()),
            Self::Long(v) => out.extend_from_slice(&v.to_be_bytes()),
            Self::Double(v) => out.extend_from_slice(&v.to_be_bytes()),
            Self::Class { name_index } | Self::Module { name_index } | Self::Package { name_index } => {
                out.extend_from_slice(&name_index.to_be_bytes());
            }
            Self::String { string_index } => out.extend_from_slice(&string_index.to_be_bytes()),
            Self::FieldRef { class_index, name_and_type_index }
            | Self::MethodRef { class_index, name_and_type_index }
            | Self::InterfaceMethodRef { class_index, name_and_type_index } => {
                out.extend_from_slice(&class_index.to_be_bytes());
                out.extend_from_slice(&name_and_type_index.to_be_bytes());
            }
            Self::NameAndType { name_index, descriptor_index } => {
                out.extend_from_slice(&name_index.to_be_bytes());
                out.extend_from_slice(&descriptor_index.to_be_bytes());
            }
            Self::MethodHandle { reference_kind, reference_index } => {
                out.push(*reference_kind);
                out.extend_from_slice(&reference_index.to_be_bytes());
            }
            Self::MethodType { descriptor_index } => out.extend_from_slice(&descriptor_index.to_be_bytes()),
            Self::Dynamic { bootstrap_method_attr_index, name_and_type_index }
            | Self::InvokeDynamic { bootstrap_method_attr_index, name_and_type_index } => {
                out.extend_from_slice(&bootstrap_method_attr_index.to_be_bytes());
                out.extend_from_slice(&name_and_type_index.to_be_bytes());
            }
        }
    }

    /// A hashable, total-ordered key for constant-pool deduplication.
    /// `f32`/`f64` are hashed by bit pattern so `Entry` itself need not
    /// implement `Eq`/`Hash` (JVMS never treats `NaN` specially here, and a
    /// writer just wants byte-identical floats to intern to the same slot).
    fn dedup_key(&self) -> DedupKey {
        match self {
            Self::Utf8(s) => DedupKey::Utf8(s.clone()),
            Self::Integer(v) => DedupKey::Bits32(3, *v as u32),
            Self::Float(v) => DedupKey::Bits32(4, v.to_bits()),
            Self::Long(v) => DedupKey::Bits64(5, *v as u64),
            Self::Double(v) => DedupKey::Bits64(6, v.to_bits()),
            Self::Class { name_index } | Self::Module { name_index } | Self::Package { name_index } => {
                DedupKey::Pair(self.tag(), *name_index, 0)
            }
            Self::String { string_index } => DedupKey::Pair(self.tag(), *string_index, 0),
            Self::FieldRef { class_index, name_and_type_index }
            | Self::MethodRef { class_index, name_and_type_index }
            | Self::InterfaceMethodRef { class_index, name_and_type_index }
            | Self::Dynamic { bootstrap_method_attr_index: class_index, name_and_type_index }
            | Self::InvokeDynamic { bootstrap_method_attr_index: class_index, name_and_type_index } => {
                DedupKey::Pair(self.tag(), *class_index, *name_and_type_index)
            }
            Self::NameAndType { name_index, descriptor_index } => {
                DedupKey::Pair(self.tag(), *name_index, *descriptor_index)
            }
            Self::MethodHandle { reference_kind, reference_index } => {
                DedupKey::Pair(self.tag(), u16::from(*reference_kind), *reference_index)
            }
            Self::MethodType { descriptor_index } => DedupKey::Pair(self.tag(), *descriptor_index, 0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum DedupKey {
    Utf8(String),
    Bits32(u8, u32),
    Bits64(u8, u64),
    Pair(u8, u16, u16),
}

/// An error getting an out-of-range or wrongly-typed constant pool entry.
#[derive(Debug, thiserror::Error)]
#[error("bad constant pool index: {0}")]
pub struct BadConstantPoolIndex(pub u16);

/// The constant pool of a class file, supporting both incremental writing
/// (during lowering) and indexed reading (when parsing a classpath entry).
#[derive(Debug, Clone, Default)]
pub struct ConstantPool {
    inner: Vec<Slot>,
    interned: HashMap<DedupKey, u16>,
}

impl ConstantPool {
    /// An empty pool with the mandatory padding at index 0.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: vec![Slot::Padding],
            interned: HashMap::new(),
        }
    }

    /// Interns `entry`, returning its index. Identical entries (by value)
    /// always return the same index, matching `javac`'s constant pool
    /// sharing behavior.
    pub fn intern(&mut self, entry: Entry) -> u16 {
        let key = entry.dedup_key();
        if let Some(&index) = self.interned.get(&key) {
            return index;
        }
        let is_wide = matches!(entry, Entry::Long(_) | Entry::Double(_));
        let index = u16::try_from(self.inner.len()).expect("constant pool overflow");
        self.inner.push(Slot::Entry(entry));
        if is_wide {
            self.inner.push(Slot::Padding);
        }
        self.interned.insert(key, index);
        index
    }

    /// Interns a `Utf8` entry and returns its index.
    pub fn utf8(&mut self, value: impl Into<String>) -> u16 {
        self.intern(Entry::Utf8(value.into()))
    }

    /// Interns a `Class` entry (and its backing `Utf8`) for `binary_name`.
    pub fn class_info(&mut self, binary_name: &str) -> u16 {
        let name_index = self.utf8(binary_name);
        self.intern(Entry::Class { name_index })
    }

    /// Interns a `NameAndType` entry (and its backing `Utf8`s).
    pub fn name_and_type(&mut self, name: &str, descriptor: &str) -> u16 {
        let name_index = self.utf8(name);
        let descriptor_index = self.utf8(descriptor);
        self.intern(Entry::NameAndType { name_index, descriptor_index })
    }

    /// The number of slots in the pool, including the leading padding slot
    /// and one padding slot per wide entry -- i.e. JVMS `constant_pool_count`.
    #[must_use]
    pub fn count(&self) -> u16 {
        u16::try_from(self.inner.len()).expect("constant pool overflow")
    }

    /// Serializes the pool as the `cp_info` table body (not including the
    /// `constant_pool_count` field, which the caller already knows).
    #[must_use]
    pub fn write_to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for slot in self.inner.iter().skip(1) {
            if let Slot::Entry(entry) = slot {
                entry.write_to(&mut out);
            }
        }
        out
    }

    /// Parses a constant pool of `constant_pool_count` slots (JVMS §4.1)
    /// from a classpath entry being read back in.
    ///
    /// # Errors
    /// Returns an I/O error if the reader is truncated or malformed.
    pub fn from_reader<R: Read + ?Sized>(
        reader: &mut R,
        constant_pool_count: u16,
    ) -> io::Result<Self> {
        let count: usize = constant_pool_count.into();
        let mut inner = Vec::with_capacity(count);
        inner.push(Slot::Padding);
        while inner.len() < count {
            let entry = read_entry(reader)?;
            let is_wide = matches!(entry, Entry::Long(_) | Entry::Double(_));
            inner.push(Slot::Entry(entry));
            if is_wide {
                inner.push(Slot::Padding);
            }
        }
        Ok(Self {
            inner,
            interned: HashMap::new(),
        })
    }

    /// Looks up the entry at `index`.
    ///
    /// # Errors
    /// Returns [`BadConstantPoolIndex`] if `index` is zero, out of range, or
    /// the second slot of a wide entry.
    pub fn get_entry(&self, index: u16) -> Result<&Entry, BadConstantPoolIndex> {
        match self.inner.get(usize::from(index)) {
            Some(Slot::Entry(entry)) => Ok(entry),
            _ => Err(BadConstantPoolIndex(index)),
        }
    }

    /// Looks up a `Utf8` entry's string value at `index`.
    ///
    /// # Errors
    /// Returns [`BadConstantPoolIndex`] if `index` does not point at a
    /// `Utf8` entry.
    pub fn get_utf8(&self, index: u16) -> Result<&str, BadConstantPoolIndex> {
        match self.get_entry(index)? {
            Entry::Utf8(s) => Ok(s),
            _ => Err(BadConstantPoolIndex(index)),
        }
    }

    /// Looks up a `Class` entry's binary name at `index`.
    ///
    /// # Errors
    /// Returns [`BadConstantPoolIndex`] if `index` does not point at a
    /// `Class` entry, or its name isn't a `Utf8` entry.
    pub fn get_class_name(&self, index: u16) -> Result<&str, BadConstantPoolIndex> {
        match self.get_entry(index)? {
            Entry::Class { name_index } => self.get_utf8(*name_index),
            _ => Err(BadConstantPoolIndex(index)),
        }
    }
}

fn read_entry<R: Read + ?Sized>(reader: &mut R) -> io::Result<Entry> {
    let tag: u8 = reader.read_value()?;
    Ok(match tag {
        1 => {
            let len: u16 = reader.read_value()?;
            let bytes = crate::classfile::reader::read_byte_chunk(reader, len.into())?;
            let s = cesu8::from_java_cesu8(&bytes)
                .map(|c| c.into_owned())
                .unwrap_or_else(|_| String::from_utf8_lossy(&bytes).into_owned());
            Entry::Utf8(s)
        }
        3 => Entry::Integer(reader.read_value()?),
        4 => Entry::Float(reader.read_value()?),
        5 => Entry::Long(reader.read_value()?),
        6 => Entry::Double(reader.read_value()?),
        7 => Entry::Class { name_index: reader.read_value()? },
        8 => Entry::String { string_index: reader.read_value()? },
        9 => Entry::FieldRef {
            class_index: reader.read_value()?,
            name_and_type_index: reader.read_value()?,
        },
        10 => Entry::MethodRef {
            class_index: reader.read_value()?,
            name_and_type_index: reader.read_value()?,
        },
        11 => Entry::InterfaceMethodRef {
            class_index: reader.read_value()?,
            name_and_type_index: reader.read_value()?,
        },
        12 => Entry::NameAndType {
            name_index: reader.read_value()?,
            descriptor_index: reader.read_value()?,
        },
        15 => Entry::MethodHandle {
            reference_kind: reader.read_value()?,
            reference_index: reader.read_value()?,
        },
        16 => Entry::MethodType { descriptor_index: reader.read_value()? },
        17 => Entry::Dynamic {
            bootstrap_method_attr_index: reader.read_value()?,
            name_and_type_index: reader.read_value()?,
        },
        18 => Entry::InvokeDynamic {
            bootstrap_method_attr_index: reader.read_value()?,
            name_and_type_index: reader.read_value()?,
        },
        19 => Entry::Module { name_index: reader.read_value()? },
        20 => Entry::Package { name_index: reader.read_value()? },
        other => {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("unknown constant pool tag {other}"),
            ))
        }
    })
}
