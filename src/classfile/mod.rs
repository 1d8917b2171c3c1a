//! The JVMS §4.1 `ClassFile` structure, write-only.
//!
//! This is the codec half of the design: lowering (§4.J) builds one of
//! these from a bound class and calls [`ClassFile::write`] to get the exact
//! bytes of a `.class` file with no `Code` attribute on any method. The
//! shape mirrors the teacher's `jvm::class::Class`, trimmed to the fields a
//! header-only compiler ever populates, plus a writer instead of a reader.
pub mod access_flags;
pub mod annotation;
pub mod attribute;
pub mod constant_pool;
pub mod reader;

use crate::sym::ClassSymbol;
use crate::types::const_value::{Const, Value};
use crate::types::descriptor::{FieldDescriptor, MethodDescriptor};

use access_flags::{ClassAccessFlags, FieldAccessFlags, MethodAccessFlags};
use annotation::{AnnotationValue, TypeAnnotationValue};
use attribute::{BootstrapMethodEntry, InnerClassEntry, RecordComponentEntry};
use constant_pool::ConstantPool;

/// The class file magic number, JVMS §4.1.
pub const MAGIC: u32 = 0xCAFE_BABE;

/// A field member of a [`ClassFile`], with no `ConstantValue` resolution
/// beyond what the caller already computed (§4.H runs first).
#[derive(Debug, Clone)]
pub struct FieldInfo {
    /// Access flags.
    pub access_flags: FieldAccessFlags,
    /// The field's simple name.
    pub name: String,
    /// The field's erased type.
    pub descriptor: FieldDescriptor,
    /// The constant initializer, for a `static final` field whose
    /// initializer is a constant expression.
    pub constant_value: Option<Const>,
    /// The field's generic signature, if it uses a type variable.
    pub signature: Option<String>,
    /// `true` if the field was synthesized by the compiler.
    pub is_synthetic: bool,
    /// `true` if the field is `@Deprecated`.
    pub is_deprecated: bool,
    /// Runtime-visible annotations.
    pub visible_annotations: Vec<AnnotationValue>,
    /// Runtime-invisible annotations.
    pub invisible_annotations: Vec<AnnotationValue>,
    /// Runtime-visible type annotations.
    pub visible_type_annotations: Vec<TypeAnnotationValue>,
    /// Runtime-invisible type annotations.
    pub invisible_type_annotations: Vec<TypeAnnotationValue>,
}

/// A method member of a [`ClassFile`]. Never carries a `Code` attribute:
/// Turbine produces ABI-only class files, so every method here is either
/// abstract, native, or simply has its body omitted.
#[derive(Debug, Clone)]
pub struct MethodInfo {
    /// Access flags.
    pub access_flags: MethodAccessFlags,
    /// The method's simple name, including `<init>` and `<clinit>`.
    pub name: String,
    /// The method's erased descriptor.
    pub descriptor: MethodDescriptor,
    /// The method's generic signature, if it uses a type variable.
    pub signature: Option<String>,
    /// Checked exceptions declared in a `throws` clause.
    pub exceptions: Vec<ClassSymbol>,
    /// `true` if the method was synthesized by the compiler.
    pub is_synthetic: bool,
    /// `true` if the method is `@Deprecated`.
    pub is_deprecated: bool,
    /// Runtime-visible annotations.
    pub visible_annotations: Vec<AnnotationValue>,
    /// Runtime-invisible annotations.
    pub invisible_annotations: Vec<AnnotationValue>,
    /// Runtime-visible type annotations.
    pub visible_type_annotations: Vec<TypeAnnotationValue>,
    /// Runtime-invisible type annotations.
    pub invisible_type_annotations: Vec<TypeAnnotationValue>,
    /// The `default` value of an annotation-interface element, if declared.
    pub annotation_default: Option<Value>,
    /// Per-parameter runtime-visible annotations, one entry per formal
    /// parameter in declaration order (an empty `Vec` for an unannotated
    /// parameter).
    pub visible_parameter_annotations: Vec<Vec<AnnotationValue>>,
    /// Per-parameter runtime-invisible annotations.
    pub invisible_parameter_annotations: Vec<Vec<AnnotationValue>>,
}

/// A fully-assembled header class file, ready to be serialized.
#[derive(Debug, Clone)]
pub struct ClassFile {
    /// Major version, JVMS §4.1 (minor is always 0 for Turbine's output).
    pub major_version: u16,
    /// Access flags.
    pub access_flags: ClassAccessFlags,
    /// This class.
    pub this_class: ClassSymbol,
    /// The superclass; `None` only for `java/lang/Object`.
    pub super_class: Option<ClassSymbol>,
    /// Directly implemented/extended interfaces.
    pub interfaces: Vec<ClassSymbol>,
    /// Declared fields.
    pub fields: Vec<FieldInfo>,
    /// Declared methods.
    pub methods: Vec<MethodInfo>,
    /// The source file name, for `SourceFile`.
    pub source_file: Option<String>,
    /// The class's generic signature, if it declares or uses type variables.
    pub signature: Option<String>,
    /// `InnerClasses` entries.
    pub inner_classes: Vec<InnerClassEntry>,
    /// The enclosing class and method, for a local or anonymous class.
    pub enclosing_method: Option<(ClassSymbol, Option<(String, String)>)>,
    /// The nest host, if this class is a nest member (not the host itself).
    pub nest_host: Option<ClassSymbol>,
    /// Nest members, if this class is a nest host.
    pub nest_members: Vec<ClassSymbol>,
    /// Permitted subclasses, for a `sealed` class or interface.
    pub permitted_subclasses: Vec<ClassSymbol>,
    /// Record components, for a `record` class.
    pub record_components: Option<Vec<RecordComponentEntry>>,
    /// `true` if the class was synthesized by the compiler.
    pub is_synthetic: bool,
    /// `true` if the class is `@Deprecated`.
    pub is_deprecated: bool,
    /// Runtime-visible annotations.
    pub visible_annotations: Vec<AnnotationValue>,
    /// Runtime-invisible annotations.
    pub invisible_annotations: Vec<AnnotationValue>,
    /// Runtime-visible type annotations.
    pub visible_type_annotations: Vec<TypeAnnotationValue>,
    /// Runtime-invisible type annotations.
    pub invisible_type_annotations: Vec<TypeAnnotationValue>,
    /// Bootstrap methods, see [`BootstrapMethodEntry`].
    pub bootstrap_methods: Vec<BootstrapMethodEntry>,
}

impl ClassFile {
    /// Serializes `self` to the exact bytes of a `.class` file.
    #[must_use]
    pub fn write(&self) -> Vec<u8> {
        let mut pool = ConstantPool::new();
        let mut body = Vec::new();

        let this_index = pool.class_info(self.this_class.binary_name());
        let super_index = self
            .super_class
            .as_ref()
            .map_or(0, |s| pool.class_info(s.binary_name()));

        let mut interfaces_bytes = (self.interfaces.len() as u16).to_be_bytes().to_vec();
        for iface in &self.interfaces {
            let idx = pool.class_info(iface.binary_name());
            interfaces_bytes.extend_from_slice(&idx.to_be_bytes());
        }

        let fields_bytes = self.write_fields(&mut pool);
        let methods_bytes = self.write_methods(&mut pool);
        let class_attributes = self.write_class_attributes(&mut pool);

        body.extend_from_slice(&self.access_flags.bits().to_be_bytes());
        body.extend_from_slice(&this_index.to_be_bytes());
        body.extend_from_slice(&super_index.to_be_bytes());
        body.extend_from_slice(&interfaces_bytes);
        body.extend_from_slice(&fields_bytes);
        body.extend_from_slice(&methods_bytes);
        body.extend_from_slice(&class_attributes);

        let mut out = Vec::with_capacity(body.len() + pool.write_to_bytes().len() + 16);
        out.extend_from_slice(&MAGIC.to_be_bytes());
        out.extend_from_slice(&0u16.to_be_bytes());
        out.extend_from_slice(&self.major_version.to_be_bytes());
        out.extend_from_slice(&pool.count().to_be_bytes());
        out.extend_from_slice(&pool.write_to_bytes());
        out.extend_from_slice(&body);
        out
    }

    fn write_fields(&self, pool: &mut ConstantPool) -> Vec<u8> {
        let mut out = (self.fields.len() as u16).to_be_bytes().to_vec();
        for field in &self.fields {
            out.extend_from_slice(&field.access_flags.bits().to_be_bytes());
            let name_index = pool.utf8(field.name.clone());
            let descriptor_index = pool.utf8(field.descriptor.descriptor_string());
            out.extend_from_slice(&name_index.to_be_bytes());
            out.extend_from_slice(&descriptor_index.to_be_bytes());

            let mut attributes = Vec::new();
            let mut count = 0u16;
            if let Some(value) = &field.constant_value {
                let body = attribute::constant_value_body(pool, value);
                attribute::write_attribute(pool, "ConstantValue", &body, &mut attributes);
                count += 1;
            }
            count += write_common_member_attributes(
                pool,
                field.is_synthetic,
                field.is_deprecated,
                &field.signature,
                &field.visible_annotations,
                &field.invisible_annotations,
                &field.visible_type_annotations,
                &field.invisible_type_annotations,
                attribute::signature_body,
                &mut attributes,
            );
            out.extend_from_slice(&count.to_be_bytes());
            out.extend_from_slice(&attributes);
        }
        out
    }

    fn write_methods(&self, pool: &mut ConstantPool) -> Vec<u8> {
        let mut out = (self.methods.len() as u16).to_be_bytes().to_vec();
        for method in &self.methods {
            out.extend_from_slice(&method.access_flags.bits().to_be_bytes());
            let name_index = pool.utf8(method.name.clone());
            let descriptor_index = pool.utf8(method.descriptor.descriptor_string());
            out.extend_from_slice(&name_index.to_be_bytes());
            out.extend_from_slice(&descriptor_index.to_be_bytes());

            let mut attributes = Vec::new();
            let mut count = 0u16;
            if !method.exceptions.is_empty() {
                let body = attribute::exceptions_body(pool, &method.exceptions);
                attribute::write_attribute(pool, "Exceptions", &body, &mut attributes);
                count += 1;
            }
            if let Some(value) = &method.annotation_default {
                let body = attribute::annotation_default_body(pool, value);
                attribute::write_attribute(pool, "AnnotationDefault", &body, &mut attributes);
                count += 1;
            }
            if method.visible_parameter_annotations.iter().any(|p| !p.is_empty()) {
                let body = attribute::parameter_annotations_body(pool, &method.visible_parameter_annotations);
                attribute::write_attribute(pool, "RuntimeVisibleParameterAnnotations", &body, &mut attributes);
                count += 1;
            }
            if method.invisible_parameter_annotations.iter().any(|p| !p.is_empty()) {
                let body = attribute::parameter_annotations_body(pool, &method.invisible_parameter_annotations);
                attribute::write_attribute(pool, "RuntimeInvisibleParameterAnnotations", &body, &mut attributes);
                count += 1;
            }
            count += write_common_member_attributes(
                pool,
                method.is_synthetic,
                method.is_deprecated,
                &method.signature,
                &method.visible_annotations,
                &method.invisible_annotations,
                &method.visible_type_annotations,
                &method.invisible_type_annotations,
                attribute::signature_body,
                &mut attributes,
            );
            out.extend_from_slice(&count.to_be_bytes());
            out.extend_from_slice(&attributes);
        }
        out
    }

    fn write_class_attributes(&self, pool: &mut ConstantPool) -> Vec<u8> {
        let mut attributes = Vec::new();
        let mut count = 0u16;

        if let Some(file) = &self.source_file {
            let body = attribute::source_file_body(pool, file);
            attribute::write_attribute(pool, "SourceFile", &body, &mut attributes);
            count += 1;
        }
        if !self.inner_classes.is_empty() {
            let body = attribute::inner_classes_body(pool, &self.inner_classes);
            attribute::write_attribute(pool, "InnerClasses", &body, &mut attributes);
            count += 1;
        }
        if let Some((class, method)) = &self.enclosing_method {
            let body = attribute::enclosing_method_body(
                pool,
                class,
                method.as_ref().map(|(n, d)| (n.as_str(), d.as_str())),
            );
            attribute::write_attribute(pool, "EnclosingMethod", &body, &mut attributes);
            count += 1;
        }
        if let Some(host) = &self.nest_host {
            let body = attribute::nest_host_body(pool, host);
            attribute::write_attribute(pool, "NestHost", &body, &mut attributes);
            count += 1;
        }
        if !self.nest_members.is_empty() {
            let body = attribute::nest_members_body(pool, &self.nest_members);
            attribute::write_attribute(pool, "NestMembers", &body, &mut attributes);
            count += 1;
        }
        if !self.permitted_subclasses.is_empty() {
            let body = attribute::permitted_subclasses_body(pool, &self.permitted_subclasses);
            attribute::write_attribute(pool, "PermittedSubclasses", &body, &mut attributes);
            count += 1;
        }
        if let Some(components) = &self.record_components {
            let body = attribute::record_body(pool, components);
            attribute::write_attribute(pool, "Record", &body, &mut attributes);
            count += 1;
        }
        if !self.bootstrap_methods.is_empty() {
            let body = attribute::bootstrap_methods_body(pool, &self.bootstrap_methods);
            attribute::write_attribute(pool, "BootstrapMethods", &body, &mut attributes);
            count += 1;
        }
        count += write_common_member_attributes(
            pool,
            self.is_synthetic,
            self.is_deprecated,
            &self.signature,
            &self.visible_annotations,
            &self.invisible_annotations,
            &self.visible_type_annotations,
            &self.invisible_type_annotations,
            attribute::signature_body,
            &mut attributes,
        );

        let mut out = count.to_be_bytes().to_vec();
        out.extend_from_slice(&attributes);
        out
    }
}

/// The `Synthetic`/`Deprecated`/`Signature`/annotation attributes shared by
/// classes, fields, and methods, written once here instead of duplicated in
/// all three of the functions above.
#[allow(clippy::too_many_arguments)]
fn write_common_member_attributes(
    pool: &mut ConstantPool,
    is_synthetic: bool,
    is_deprecated: bool,
    signature: &Option<String>,
    visible_annotations: &[AnnotationValue],
    invisible_annotations: &[AnnotationValue],
    visible_type_annotations: &[TypeAnnotationValue],
    invisible_type_annotations: &[TypeAnnotationValue],
    signature_body: fn(&mut ConstantPool, &str) -> Vec<u8>,
    out: &mut Vec<u8>,
) -> u16 {
    let mut count = 0u16;
    if is_synthetic {
        attribute::write_attribute(pool, "Synthetic", &attribute::marker_body(), out);
        count += 1;
    }
    if is_deprecated {
        attribute::write_attribute(pool, "Deprecated", &attribute::marker_body(), out);
        count += 1;
    }
    if let Some(sig) = signature {
        let body = signature_body(pool, sig);
        attribute::write_attribute(pool, "Signature", &body, out);
        count += 1;
    }
    if !visible_annotations.is_empty() {
        let body = annotation::write_annotations_body(pool, visible_annotations);
        attribute::write_attribute(pool, "RuntimeVisibleAnnotations", &body, out);
        count += 1;
    }
    if !invisible_annotations.is_empty() {
        let body = annotation::write_annotations_body(pool, invisible_annotations);
        attribute::write_attribute(pool, "RuntimeInvisibleAnnotations", &body, out);
        count += 1;
    }
    if !visible_type_annotations.is_empty() {
        let body = annotation::write_type_annotations_body(pool, visible_type_annotations);
        attribute::write_attribute(pool, "RuntimeVisibleTypeAnnotations", &body, out);
        count += 1;
    }
    if !invisible_type_annotations.is_empty() {
        let body = annotation::write_type_annotations_body(pool, invisible_type_annotations);
        attribute::write_attribute(pool, "RuntimeInvisibleTypeAnnotations", &body, out);
        count += 1;
    }
    count
}
