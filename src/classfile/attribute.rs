//! Attribute bodies (JVMS §4.7), write-only.
//!
//! Each function here writes one attribute's *body* -- the bytes after its
//! `attribute_length` field -- and [`write_attribute`] wraps that body with
//! the `attribute_name_index`/`attribute_length` header every attribute
//! shares. Turbine never needs `Code`, `LineNumberTable`, or any of the
//! other attributes that only make sense once method bodies exist; the set
//! below is exactly what a header-only class file can carry.
use crate::classfile::access_flags::NestedClassAccessFlags;
use crate::classfile::annotation::{self, AnnotationValue, TypeAnnotationValue};
use crate::sym::ClassSymbol;
use crate::types::const_value::{Const, Value};

use super::constant_pool::{ConstantPool, Entry};

/// Writes one attribute as `attribute_name_index(u2) attribute_length(u4) body`.
pub fn write_attribute(pool: &mut ConstantPool, name: &str, body: &[u8], out: &mut Vec<u8>) {
    let name_index = pool.utf8(name);
    out.extend_from_slice(&name_index.to_be_bytes());
    out.extend_from_slice(&(body.len() as u32).to_be_bytes());
    out.extend_from_slice(body);
}

/// Writes a `ConstantValue` attribute body (JVMS §4.7.2).
#[must_use]
pub fn constant_value_body(pool: &mut ConstantPool, value: &Const) -> Vec<u8> {
    let index = match value {
        Const::Boolean(b) => pool.intern(Entry::Integer(i32::from(*b))),
        Const::Byte(b) => pool.intern(Entry::Integer(i32::from(*b))),
        Const::Char(c) => pool.intern(Entry::Integer(i32::from(*c))),
        Const::Short(s) => pool.intern(Entry::Integer(i32::from(*s))),
        Const::Int(i) => pool.intern(Entry::Integer(*i)),
        Const::Long(l) => pool.intern(Entry::Long(*l)),
        Const::Float(f) => pool.intern(Entry::Float(*f)),
        Const::Double(d) => pool.intern(Entry::Double(*d)),
        Const::String(s) => {
            let utf8 = pool.utf8(s.clone());
            pool.intern(Entry::String { string_index: utf8 })
        }
    };
    index.to_be_bytes().to_vec()
}

/// Writes a `Signature` attribute body (JVMS §4.7.9): one `u2` constant
/// pool index into a `Utf8` holding the signature.
#[must_use]
pub fn signature_body(pool: &mut ConstantPool, signature: &str) -> Vec<u8> {
    pool.utf8(signature).to_be_bytes().to_vec()
}

/// Writes a `SourceFile` attribute body (JVMS §4.7.10).
#[must_use]
pub fn source_file_body(pool: &mut ConstantPool, file_name: &str) -> Vec<u8> {
    pool.utf8(file_name).to_be_bytes().to_vec()
}

/// Writes an `Exceptions` attribute body (JVMS §4.7.5).
#[must_use]
pub fn exceptions_body(pool: &mut ConstantPool, checked: &[ClassSymbol]) -> Vec<u8> {
    let mut out = (checked.len() as u16).to_be_bytes().to_vec();
    for sym in checked {
        let idx = pool.class_info(sym.binary_name());
        out.extend_from_slice(&idx.to_be_bytes());
    }
    out
}

/// One entry of the `InnerClasses` attribute (JVMS §4.7.6).
#[derive(Debug, Clone)]
pub struct InnerClassEntry {
    /// The inner class itself.
    pub inner_class: ClassSymbol,
    /// The immediately enclosing class, `None` for a local/anonymous class.
    pub outer_class: Option<ClassSymbol>,
    /// The source-level simple name, `None` for an anonymous class.
    pub inner_name: Option<String>,
    /// The inner class's access flags as they appeared at the point of
    /// declaration (JVMS §4.7.6: this can differ from the flags on the
    /// inner class's own class file).
    pub access_flags: NestedClassAccessFlags,
}

/// Writes an `InnerClasses` attribute body.
#[must_use]
pub fn inner_classes_body(pool: &mut ConstantPool, entries: &[InnerClassEntry]) -> Vec<u8> {
    let mut out = (entries.len() as u16).to_be_bytes().to_vec();
    for entry in entries {
        let inner_index = pool.class_info(entry.inner_class.binary_name());
        let outer_index = entry
            .outer_class
            .as_ref()
            .map_or(0, |c| pool.class_info(c.binary_name()));
        let name_index = entry
            .inner_name
            .as_ref()
            .map_or(0, |n| pool.utf8(n.clone()));
        out.extend_from_slice(&inner_index.to_be_bytes());
        out.extend_from_slice(&outer_index.to_be_bytes());
        out.extend_from_slice(&name_index.to_be_bytes());
        out.extend_from_slice(&entry.access_flags.bits().to_be_bytes());
    }
    out
}

/// Writes an `EnclosingMethod` attribute body (JVMS §4.7.7).
#[must_use]
pub fn enclosing_method_body(
    pool: &mut ConstantPool,
    class: &ClassSymbol,
    method: Option<(&str, &str)>,
) -> Vec<u8> {
    let class_index = pool.class_info(class.binary_name());
    let method_index = method.map_or(0, |(name, descriptor)| pool.name_and_type(name, descriptor));
    let mut out = class_index.to_be_bytes().to_vec();
    out.extend_from_slice(&method_index.to_be_bytes());
    out
}

/// Writes a `NestHost` attribute body (JVMS §4.7.28).
#[must_use]
pub fn nest_host_body(pool: &mut ConstantPool, host: &ClassSymbol) -> Vec<u8> {
    pool.class_info(host.binary_name()).to_be_bytes().to_vec()
}

/// Writes a `NestMembers` attribute body (JVMS §4.7.29).
#[must_use]
pub fn nest_members_body(pool: &mut ConstantPool, members: &[ClassSymbol]) -> Vec<u8> {
    let mut out = (members.len() as u16).to_be_bytes().to_vec();
    for member in members {
        let idx = pool.class_info(member.binary_name());
        out.extend_from_slice(&idx.to_be_bytes());
    }
    out
}

/// Writes a `PermittedSubclasses` attribute body (JVMS §4.7.31).
#[must_use]
pub fn permitted_subclasses_body(pool: &mut ConstantPool, subclasses: &[ClassSymbol]) -> Vec<u8> {
    nest_members_body(pool, subclasses)
}

/// One component of a `Record` attribute (JVMS §4.7.30).
#[derive(Debug, Clone)]
pub struct RecordComponentEntry {
    /// The component's name.
    pub name: String,
    /// The component's erased type descriptor.
    pub descriptor: String,
    /// The component's generic signature, if it uses type variables.
    pub signature: Option<String>,
    /// Annotations carried on the component's declaration.
    pub annotations: Vec<AnnotationValue>,
}

/// Writes a `Record` attribute body.
#[must_use]
pub fn record_body(pool: &mut ConstantPool, components: &[RecordComponentEntry]) -> Vec<u8> {
    let mut out = (components.len() as u16).to_be_bytes().to_vec();
    for component in components {
        let name_index = pool.utf8(component.name.clone());
        let descriptor_index = pool.utf8(component.descriptor.clone());
        out.extend_from_slice(&name_index.to_be_bytes());
        out.extend_from_slice(&descriptor_index.to_be_bytes());
        let mut sub_attributes = Vec::new();
        let mut sub_count = 0u16;
        if let Some(sig) = &component.signature {
            let body = signature_body(pool, sig);
            write_attribute(pool, "Signature", &body, &mut sub_attributes);
            sub_count += 1;
        }
        if !component.annotations.is_empty() {
            let body = super::annotation::write_annotations_body(pool, &component.annotations);
            write_attribute(pool, "RuntimeVisibleAnnotations", &body, &mut sub_attributes);
            sub_count += 1;
        }
        out.extend_from_slice(&sub_count.to_be_bytes());
        out.extend_from_slice(&sub_attributes);
    }
    out
}

/// One entry of the `BootstrapMethods` attribute (JVMS §4.7.23). Turbine
/// only ever needs this for a record's or enum's synthetic
/// `invokedynamic`-backed members that reference it structurally (it never
/// emits the `invokedynamic` instruction itself, since no bodies are
/// lowered), so this exists for completeness of the attribute set rather
/// than because lowering currently produces one.
#[derive(Debug, Clone)]
pub struct BootstrapMethodEntry {
    /// Reference kind (JVMS Table 4.4.8-A), e.g. 6 for `REF_invokeStatic`.
    pub reference_kind: u8,
    /// The owner of the bootstrap method.
    pub owner: ClassSymbol,
    /// The bootstrap method's name.
    pub name: String,
    /// The bootstrap method's descriptor.
    pub descriptor: String,
    /// Static arguments passed to the bootstrap method.
    pub arguments: Vec<Const>,
}

/// Writes a `BootstrapMethods` attribute body.
#[must_use]
pub fn bootstrap_methods_body(pool: &mut ConstantPool, methods: &[BootstrapMethodEntry]) -> Vec<u8> {
    let mut out = (methods.len() as u16).to_be_bytes().to_vec();
    for method in methods {
        let class_index = pool.class_info(method.owner.binary_name());
        let nat_index = pool.name_and_type(&method.name, &method.descriptor);
        let method_ref = pool.intern(Entry::MethodRef {
            class_index,
            name_and_type_index: nat_index,
        });
        let handle_index = pool.intern(Entry::MethodHandle {
            reference_kind: method.reference_kind,
            reference_index: method_ref,
        });
        out.extend_from_slice(&handle_index.to_be_bytes());
        out.extend_from_slice(&(method.arguments.len() as u16).to_be_bytes());
        for arg in &method.arguments {
            let body = constant_value_body(pool, arg);
            out.extend_from_slice(&body);
        }
    }
    out
}

/// Writes a flag-only marker attribute (`Synthetic`, `Deprecated`): both
/// have zero-length bodies.
#[must_use]
pub fn marker_body() -> Vec<u8> {
    Vec::new()
}

/// Writes an `AnnotationDefault` attribute body (JVMS §4.7.22): a single
/// `element_value`, the default an annotation-interface element declares.
#[must_use]
pub fn annotation_default_body(pool: &mut ConstantPool, value: &Value) -> Vec<u8> {
    let mut out = Vec::new();
    annotation::write_value(pool, value, &mut out);
    out
}

/// Writes a `RuntimeVisibleParameterAnnotations`/
/// `RuntimeInvisibleParameterAnnotations` attribute body (JVMS §4.7.18/
/// §4.7.19): a `u1` parameter count, then per parameter a `u2` annotation
/// count and that many `annotation` structures. `parameters` must be in
/// formal-parameter order and include an empty `Vec` for a parameter with
/// no annotation of this visibility.
#[must_use]
pub fn parameter_annotations_body(pool: &mut ConstantPool, parameters: &[Vec<AnnotationValue>]) -> Vec<u8> {
    let mut out = vec![parameters.len() as u8];
    for annotations in parameters {
        out.extend_from_slice(&(annotations.len() as u16).to_be_bytes());
        for a in annotations {
            annotation::write_annotation(pool, a, &mut out);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_value_body_is_two_bytes() {
        let mut pool = ConstantPool::new();
        let body = constant_value_body(&mut pool, &Const::Int(7));
        assert_eq!(body.len(), 2);
    }

    #[test]
    fn inner_classes_body_has_eight_bytes_per_entry() {
        let mut pool = ConstantPool::new();
        let entries = vec![InnerClassEntry {
            inner_class: ClassSymbol::new("a/Outer$Inner"),
            outer_class: Some(ClassSymbol::new("a/Outer")),
            inner_name: Some("Inner".to_owned()),
            access_flags: NestedClassAccessFlags::PUBLIC | NestedClassAccessFlags::STATIC,
        }];
        let body = inner_classes_body(&mut pool, &entries);
        assert_eq!(body.len(), 2 + 8);
    }

    #[test]
    fn marker_body_is_empty() {
        assert!(marker_body().is_empty());
    }

    #[test]
    fn annotation_default_body_writes_one_element_value() {
        let mut pool = ConstantPool::new();
        let body = annotation_default_body(&mut pool, &Value::Const(Const::Int(5)));
        assert_eq!(body[0], b'I');
        assert_eq!(body.len(), 3);
    }

    #[test]
    fn parameter_annotations_body_counts_parameters_then_per_parameter_annotations() {
        let mut pool = ConstantPool::new();
        let parameters = vec![
            Vec::new(),
            vec![AnnotationValue { annotation_type: ClassSymbol::new("a/NonNull"), elements: Vec::new() }],
        ];
        let body = parameter_annotations_body(&mut pool, &parameters);
        assert_eq!(body[0], 2);
        assert_eq!(&body[1..3], &[0, 0]);
        assert_eq!(&body[3..5], &[0, 1]);
    }

    #[test]
    fn write_attribute_prefixes_name_and_length() {
        let mut pool = ConstantPool::new();
        let mut out = Vec::new();
        write_attribute(&mut pool, "Deprecated", &marker_body(), &mut out);
        assert_eq!(out.len(), 2 + 4);
        assert_eq!(&out[2..6], &[0, 0, 0, 0]);
    }
}
