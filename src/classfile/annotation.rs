//! Writers for `Runtime{Visible,Invisible}[Type]Annotations` bodies (JVMS
//! §4.7.16, §4.7.20), adapted from the teacher's `jvm::annotation` data
//! shapes into write-only form.
use crate::sym::ClassSymbol;
use crate::types::const_value::{Const, Value};
use crate::types::descriptor::FieldDescriptor;

use super::constant_pool::ConstantPool;

/// A fully-resolved annotation instance, ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationValue {
    /// The annotation interface.
    pub annotation_type: ClassSymbol,
    /// Name/value pairs, in source order.
    pub elements: Vec<(String, Value)>,
}

/// Where a type annotation attaches, JVMS §4.7.20.1 `target_type`/`target_info`.
#[derive(Debug, Clone, PartialEq)]
pub enum TargetInfo {
    /// `0x00`/`0x01`: a type parameter of a class or method.
    TypeParameter {
        /// `0x00` for a class type parameter, `0x01` for a method one.
        on_method: bool,
        /// Index of the type parameter declaration.
        index: u8,
    },
    /// `0x10`: a type in the `extends`/`implements` clause.
    SuperType {
        /// `u16::MAX` for the superclass, otherwise an interface index.
        index: u16,
    },
    /// `0x11`/`0x12`: a bound of a type parameter.
    TypeParameterBound {
        /// `0x11` for a class type parameter bound, `0x12` for a method one.
        on_method: bool,
        /// Index of the type parameter declaration.
        type_parameter_index: u8,
        /// Index of the bound within that declaration.
        bound_index: u8,
    },
    /// `0x13`/`0x14`/`0x15`: field type, return type, or receiver type.
    Empty {
        /// Which of the three `0x13`/`0x14`/`0x15` target types this is.
        kind: u8,
    },
    /// `0x16`: a formal parameter type.
    FormalParameter {
        /// Index of the formal parameter.
        index: u8,
    },
    /// `0x17`: a type in the `throws` clause.
    Throws {
        /// Index of the type in the `throws` clause.
        index: u16,
    },
}

impl TargetInfo {
    fn write_to(&self, out: &mut Vec<u8>) {
        match self {
            Self::TypeParameter { on_method, index } => {
                out.push(if *on_method { 0x01 } else { 0x00 });
                out.push(*index);
            }
            Self::SuperType { index } => {
                out.push(0x10);
                out.extend_from_slice(&index.to_be_bytes());
            }
            Self::TypeParameterBound { on_method, type_parameter_index, bound_index } => {
                out.push(if *on_method { 0x12 } else { 0x11 });
                out.push(*type_parameter_index);
                out.push(*bound_index);
            }
            Self::Empty { kind } => out.push(*kind),
            Self::FormalParameter { index } => {
                out.push(0x16);
                out.push(*index);
            }
            Self::Throws { index } => {
                out.push(0x17);
                out.extend_from_slice(&index.to_be_bytes());
            }
        }
    }
}

/// One step of a `type_path`, JVMS §4.7.20.2 Table 4.7.20.2-A.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TypePathKind {
    /// Annotation is deeper in an array type.
    Array,
    /// Annotation is deeper in a nested type.
    Nested,
    /// Annotation is on a wildcard bound.
    WildcardBound,
    /// Annotation is on a type argument, carrying its index.
    TypeArgument(u8),
}

impl TypePathKind {
    fn write_to(&self, out: &mut Vec<u8>) {
        let (kind, argument_index) = match self {
            Self::Array => (0u8, 0u8),
            Self::Nested => (1, 0),
            Self::WildcardBound => (2, 0),
            Self::TypeArgument(idx) => (3, *idx),
        };
        out.push(kind);
        out.push(argument_index);
    }
}

/// A resolved type annotation, ready to be written as one entry of a
/// `RuntimeVisibleTypeAnnotations`/`RuntimeInvisibleTypeAnnotations` table.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeAnnotationValue {
    /// Where this annotation attaches.
    pub target_info: TargetInfo,
    /// The path to the annotated part of a compound type.
    pub target_path: Vec<TypePathKind>,
    /// The annotation itself.
    pub annotation: AnnotationValue,
}

pub(crate) fn write_value(pool: &mut ConstantPool, value: &Value, out: &mut Vec<u8>) {
    match value {
        Value::Const(c) => write_const(pool, c, out),
        Value::Class(sym) => {
            out.push(b'c');
            let descriptor = FieldDescriptor::Object(sym.clone()).descriptor_string();
            let index = pool.utf8(descriptor);
            out.extend_from_slice(&index.to_be_bytes());
        }
        Value::EnumConstant { enum_type, const_name } => {
            out.push(b'e');
            let descriptor = FieldDescriptor::Object(enum_type.clone()).descriptor_string();
            let type_index = pool.utf8(descriptor);
            let name_index = pool.utf8(const_name.clone());
            out.extend_from_slice(&type_index.to_be_bytes());
            out.extend_from_slice(&name_index.to_be_bytes());
        }
        Value::Annotation { annotation_type, elements } => {
            out.push(b'@');
            write_annotation(
                pool,
                &AnnotationValue {
                    annotation_type: annotation_type.clone(),
                    elements: elements.clone(),
                },
                out,
            );
        }
        Value::Array(values) => {
            out.push(b'[');
            out.extend_from_slice(&(values.len() as u16).to_be_bytes());
            for v in values {
                write_value(pool, v, out);
            }
        }
    }
}

fn write_const(pool: &mut ConstantPool, c: &Const, out: &mut Vec<u8>) {
    use super::constant_pool::Entry;
    let (tag, index) = match c {
        Const::Boolean(b) => (b'Z', pool.intern(Entry::Integer(i32::from(*b)))),
        Const::Byte(b) => (b'B', pool.intern(Entry::Integer(i32::from(*b)))),
        Const::Char(c) => (b'C', pool.intern(Entry::Integer(i32::from(*c)))),
        Const::Short(s) => (b'S', pool.intern(Entry::Integer(i32::from(*s)))),
        Const::Int(i) => (b'I', pool.intern(Entry::Integer(*i))),
        Const::Long(l) => (b'J', pool.intern(Entry::Long(*l))),
        Const::Float(f) => (b'F', pool.intern(Entry::Float(*f))),
        Const::Double(d) => (b'D', pool.intern(Entry::Double(*d))),
        Const::String(s) => {
            let utf8 = pool.utf8(s.clone());
            (b's', utf8)
        }
    };
    out.push(tag);
    out.extend_from_slice(&index.to_be_bytes());
}

/// Writes one `annotation` structure (JVMS §4.7.16).
pub fn write_annotation(pool: &mut ConstantPool, annotation: &AnnotationValue, out: &mut Vec<u8>) {
    let descriptor = FieldDescriptor::Object(annotation.annotation_type.clone()).descriptor_string();
    let type_index = pool.utf8(descriptor);
    out.extend_from_slice(&type_index.to_be_bytes());
    out.extend_from_slice(&(annotation.elements.len() as u16).to_be_bytes());
    for (name, value) in &annotation.elements {
        let name_index = pool.utf8(name.clone());
        out.extend_from_slice(&name_index.to_be_bytes());
        write_value(pool, value, out);
    }
}

/// Writes one `type_annotation` structure (JVMS §4.7.20).
pub fn write_type_annotation(
    pool: &mut ConstantPool,
    annotation: &TypeAnnotationValue,
    out: &mut Vec<u8>,
) {
    annotation.target_info.write_to(out);
    out.push(annotation.target_path.len() as u8);
    for step in &annotation.target_path {
        step.write_to(out);
    }
    write_annotation(pool, &annotation.annotation, out);
}

/// Writes a full `RuntimeVisibleAnnotations`-shaped body: a `u2` count
/// followed by that many `annotation` structures.
#[must_use]
pub fn write_annotations_body(pool: &mut ConstantPool, annotations: &[AnnotationValue]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&(annotations.len() as u16).to_be_bytes());
    for a in annotations {
        write_annotation(pool, a, &mut out);
    }
    out
}

/// Writes a full `RuntimeVisibleTypeAnnotations`-shaped body.
#[must_use]
pub fn write_type_annotations_body(
    pool: &mut ConstantPool,
    annotations: &[TypeAnnotationValue],
) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&(annotations.len() as u16).to_be_bytes());
    for a in annotations {
        write_type_annotation(pool, a, &mut out);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_annotation_writes_type_index_and_zero_count() {
        let mut pool = ConstantPool::new();
        let annotation = AnnotationValue {
            annotation_type: ClassSymbol::new("java/lang/Override"),
            elements: Vec::new(),
        };
        let mut out = Vec::new();
        write_annotation(&mut pool, &annotation, &mut out);
        assert_eq!(&out[2..4], &[0, 0]);
    }

    #[test]
    fn const_value_element_uses_correct_tag() {
        let mut pool = ConstantPool::new();
        let mut out = Vec::new();
        write_value(&mut pool, &Value::Const(Const::Int(5)), &mut out);
        assert_eq!(out[0], b'I');
    }

    #[test]
    fn array_value_writes_count_then_elements() {
        let mut pool = ConstantPool::new();
        let mut out = Vec::new();
        write_value(
            &mut pool,
            &Value::Array(vec![Value::Const(Const::Int(1)), Value::Const(Const::Int(2))]),
            &mut out,
        );
        assert_eq!(out[0], b'[');
        assert_eq!(&out[1..3], &[0, 2]);
    }
}
