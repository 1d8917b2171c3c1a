//! Lowering (§4.J): the last phase, collecting a fully bound, canonical,
//! disambiguated class into a [`ClassFile`] the codec can serialize.
//!
//! Everything upstream of this module works in terms of [`Type`] (generics,
//! annotations, type variables); everything downstream (`classfile::`) only
//! ever sees erased descriptors and signature strings. This module is the
//! seam between the two: it erases, it decides when a `Signature` attribute
//! is worth emitting, and it folds the scattered per-declaration modifier
//! lists into the `access_flags` bitsets JVMS actually stores.
use crate::ast::{ClassKind, Modifier};
use crate::bound::{BoundField, BoundMethod, SourceTypeBoundClass};
use crate::canonicalize::{DisambiguatedAnnotations, EvaluatedAnnotation};
use crate::classfile::access_flags::{ClassAccessFlags, FieldAccessFlags, MethodAccessFlags, NestedClassAccessFlags};
use crate::classfile::annotation::{AnnotationValue, TargetInfo, TypeAnnotationValue};
use crate::classfile::attribute::InnerClassEntry;
use crate::classfile::{ClassFile, FieldInfo, MethodInfo};
use crate::sym::{ClassSymbol, TyVarSymbol};
use crate::types::const_value::{Const, Value};
use crate::types::descriptor::{FieldDescriptor, ReturnDescriptor};
use crate::types::signature;
use crate::types::ty::{SimpleClassTy, Type, TypeArgument};

/// Java 17, the newest class file version this crate's invariants were
/// written against (JVMS §4.1 Table 4.1-A lists 61 for Java 17).
pub const TARGET_MAJOR_VERSION: u16 = 61;

/// Erases `ty` down to its JVMS §4.3.2 field descriptor.
///
/// A type variable erases to the leftmost bound of its declaration; since
/// [`SourceTypeBoundClass`] does not currently carry type-parameter bound
/// information (see `DESIGN.md`), every type variable is erased to
/// `java/lang/Object`, which is exact for an unbounded variable and a safe
/// over-approximation otherwise -- the header carries no code that would
/// ever need the narrower bound.
#[must_use]
pub fn erase(ty: &Type) -> FieldDescriptor {
    match ty {
        Type::Primitive(p) => FieldDescriptor::Base(*p),
        Type::Class(segments) => FieldDescriptor::Object(
            segments.last().map_or_else(|| ClassSymbol::new("java/lang/Object"), |s| s.sym.clone()),
        ),
        Type::Array(elem) => erase(elem).into_array(),
        Type::Intersection(parts) => parts.first().map_or_else(|| FieldDescriptor::Object(ClassSymbol::new("java/lang/Object")), erase),
        Type::TypeVar(_) | Type::Wildcard(_) | Type::Void | Type::Error => {
            FieldDescriptor::Object(ClassSymbol::new("java/lang/Object"))
        }
    }
}

/// Erases `ty` as a method return type, keeping `void` distinct from a
/// reference type the way [`crate::types::descriptor::ReturnDescriptor`]
/// does.
#[must_use]
pub fn erase_return(ty: &Type) -> ReturnDescriptor {
    match ty {
        Type::Void => ReturnDescriptor::Void,
        other => ReturnDescriptor::Some(erase(other)),
    }
}

/// `true` if `ty` mentions a type variable, a parameterized class type, or a
/// wildcard anywhere in its structure -- the JVMS §4.7.9 condition for
/// needing a `Signature` attribute alongside the erased descriptor.
#[must_use]
pub fn uses_generics(ty: &Type) -> bool {
    match ty {
        Type::Primitive(_) | Type::Void | Type::Error => false,
        Type::TypeVar(_) | Type::Wildcard(_) => true,
        Type::Class(segments) => segments.iter().any(|s| !s.type_args.is_empty() || s.type_args.iter().any(type_argument_uses_generics)),
        Type::Array(elem) => uses_generics(elem),
        Type::Intersection(parts) => parts.iter().any(uses_generics),
    }
}

fn type_argument_uses_generics(arg: &TypeArgument) -> bool {
    match arg {
        TypeArgument::Type(ty) => uses_generics(ty),
        TypeArgument::Wildcard(_) => true,
    }
}

fn annotation_value(e: &EvaluatedAnnotation) -> AnnotationValue {
    AnnotationValue { annotation_type: e.annotation_type.clone(), elements: e.elements.clone() }
}

/// Converts a method's own declared type parameters to the
/// [`signature::TypeParameter`] shape `method_signature` needs as its
/// prefix. Declared bounds aren't tracked past the AST (see `DESIGN.md`),
/// so every variable is written with an implicit `Object` class bound,
/// exact for the common unbounded case.
fn method_type_parameters(method: &BoundMethod) -> Vec<signature::TypeParameter> {
    method
        .decl
        .type_parameters
        .iter()
        .map(|p| signature::TypeParameter {
            var: TyVarSymbol::of_method(method.sym.clone(), p.name.clone()),
            class_bound: Some(Type::class(ClassSymbol::new("java/lang/Object"))),
            interface_bounds: Vec::new(),
        })
        .collect()
}

fn split_visibility(annotations: &[EvaluatedAnnotation], runtime_visible: &dyn Fn(&ClassSymbol) -> bool) -> (Vec<AnnotationValue>, Vec<AnnotationValue>) {
    let mut visible = Vec::new();
    let mut invisible = Vec::new();
    for a in annotations {
        if runtime_visible(&a.annotation_type) {
            visible.push(annotation_value(a));
        } else {
            invisible.push(annotation_value(a));
        }
    }
    (visible, invisible)
}

/// Splits a method's per-parameter disambiguated annotations into the
/// declaration halves (`RuntimeVisible`/`InvisibleParameterAnnotations`,
/// JVMS §4.7.18/§4.7.19) and the type-use halves, the latter wrapped with a
/// `FormalParameter` (0x16) `target_info` keyed by parameter index.
fn split_parameter_annotations(
    parameter_annotations: &[DisambiguatedAnnotations],
    runtime_visible: &dyn Fn(&ClassSymbol) -> bool,
) -> (Vec<Vec<AnnotationValue>>, Vec<Vec<AnnotationValue>>, Vec<TypeAnnotationValue>, Vec<TypeAnnotationValue>) {
    let mut visible_params = Vec::with_capacity(parameter_annotations.len());
    let mut invisible_params = Vec::with_capacity(parameter_annotations.len());
    let mut visible_ty = Vec::new();
    let mut invisible_ty = Vec::new();
    for (index, annotations) in parameter_annotations.iter().enumerate() {
        let (v, i) = split_visibility(&annotations.declaration, runtime_visible);
        visible_params.push(v);
        invisible_params.push(i);
        let target_info = TargetInfo::FormalParameter { index: index as u8 };
        let (tv, ti) = split_type_visibility(&annotations.type_use, target_info, runtime_visible);
        visible_ty.extend(tv);
        invisible_ty.extend(ti);
    }
    (visible_params, invisible_params, visible_ty, invisible_ty)
}

/// Wraps each of a declaration's `type_use` annotations (JVMS §4.7.20.1)
/// with `target_info`, then splits by runtime visibility the same way
/// [`split_visibility`] does for declaration annotations. Every caller here
/// attaches the bare declared type with no array/nested/wildcard/type-
/// argument traversal, so `target_path` is always empty.
fn split_type_visibility(
    annotations: &[EvaluatedAnnotation],
    target_info: TargetInfo,
    runtime_visible: &dyn Fn(&ClassSymbol) -> bool,
) -> (Vec<TypeAnnotationValue>, Vec<TypeAnnotationValue>) {
    let mut visible = Vec::new();
    let mut invisible = Vec::new();
    for a in annotations {
        let value = TypeAnnotationValue {
            target_info: target_info.clone(),
            target_path: Vec::new(),
            annotation: annotation_value(a),
        };
        if runtime_visible(&a.annotation_type) {
            visible.push(value);
        } else {
            invisible.push(value);
        }
    }
    (visible, invisible)
}

fn class_modifier_flags(modifiers: &[Modifier]) -> ClassAccessFlags {
    let mut flags = ClassAccessFlags::empty();
    for m in modifiers {
        match m {
            Modifier::Public => flags |= ClassAccessFlags::PUBLIC,
            Modifier::Final => flags |= ClassAccessFlags::FINAL,
            Modifier::Abstract => flags |= ClassAccessFlags::ABSTRACT,
            _ => {}
        }
    }
    flags
}

/// Folds a class's modifier list and [`ClassKind`] into its access flags,
/// the desugaring table of §4.E.
///
/// `enum_has_constant_body` decides the `ACC_FINAL`/`ACC_ABSTRACT` split for
/// an `enum`: a constant with a body forces the enum class itself to be
/// non-final, since each such constant becomes an anonymous subclass.
#[must_use]
pub fn class_access_flags(modifiers: &[Modifier], kind: ClassKind, enum_has_constant_body: bool) -> ClassAccessFlags {
    let mut flags = class_modifier_flags(modifiers);
    match kind {
        ClassKind::Class => flags |= ClassAccessFlags::SUPER,
        ClassKind::Interface => flags |= ClassAccessFlags::INTERFACE | ClassAccessFlags::ABSTRACT,
        ClassKind::AnnotationInterface => flags |= ClassAccessFlags::INTERFACE | ClassAccessFlags::ABSTRACT | ClassAccessFlags::ANNOTATION,
        ClassKind::Enum => {
            flags |= ClassAccessFlags::ENUM | ClassAccessFlags::SUPER;
            flags |= if enum_has_constant_body { ClassAccessFlags::ABSTRACT } else { ClassAccessFlags::FINAL };
        }
        ClassKind::Record => flags |= ClassAccessFlags::FINAL | ClassAccessFlags::SUPER,
    }
    flags
}

/// Folds a field's modifier list into [`FieldAccessFlags`]. `is_enum_constant`
/// adds `ACC_ENUM` (enum constants carry no explicit modifiers in source).
#[must_use]
pub fn field_access_flags(modifiers: &[Modifier], is_enum_constant: bool) -> FieldAccessFlags {
    let mut flags = FieldAccessFlags::empty();
    for m in modifiers {
        match m {
            Modifier::Public => flags |= FieldAccessFlags::PUBLIC,
            Modifier::Private => flags |= FieldAccessFlags::PRIVATE,
            Modifier::Protected => flags |= FieldAccessFlags::PROTECTED,
            Modifier::Static => flags |= FieldAccessFlags::STATIC,
            Modifier::Final => flags |= FieldAccessFlags::FINAL,
            Modifier::Volatile => flags |= FieldAccessFlags::VOLATILE,
            Modifier::Transient => flags |= FieldAccessFlags::TRANSIENT,
            _ => {}
        }
    }
    if is_enum_constant {
        flags |= FieldAccessFlags::PUBLIC | FieldAccessFlags::STATIC | FieldAccessFlags::FINAL | FieldAccessFlags::ENUM;
    }
    flags
}

/// Folds a method's modifier list into [`MethodAccessFlags`], applying the
/// per-kind desugaring rules of §4.G: interface/annotation methods without a
/// body are implicitly `public abstract` unless `default`, `static`, or
/// `private`; enum constructors are forced `private`.
#[must_use]
pub fn method_access_flags(modifiers: &[Modifier], owner_kind: ClassKind, is_constructor: bool, has_body: bool, is_varargs: bool) -> MethodAccessFlags {
    let mut flags = MethodAccessFlags::empty();
    for m in modifiers {
        match m {
            Modifier::Public => flags |= MethodAccessFlags::PUBLIC,
            Modifier::Private => flags |= MethodAccessFlags::PRIVATE,
            Modifier::Protected => flags |= MethodAccessFlags::PROTECTED,
            Modifier::Static => flags |= MethodAccessFlags::STATIC,
            Modifier::Final => flags |= MethodAccessFlags::FINAL,
            Modifier::Synchronized => flags |= MethodAccessFlags::SYNCHRONIZED,
            Modifier::Native => flags |= MethodAccessFlags::NATIVE,
            Modifier::Abstract => flags |= MethodAccessFlags::ABSTRACT,
            Modifier::Strictfp => flags |= MethodAccessFlags::STRICT,
            _ => {}
        }
    }
    if is_varargs {
        flags |= MethodAccessFlags::VARARGS;
    }
    let is_interface_like = matches!(owner_kind, ClassKind::Interface | ClassKind::AnnotationInterface);
    if is_interface_like && !is_constructor {
        flags |= MethodAccessFlags::PUBLIC;
        let has_default_or_static_or_private = modifiers.iter().any(|m| matches!(m, Modifier::Default | Modifier::Static | Modifier::Private));
        if !has_body && !has_default_or_static_or_private {
            flags |= MethodAccessFlags::ABSTRACT;
        }
    }
    if is_constructor && owner_kind == ClassKind::Enum {
        flags.remove(MethodAccessFlags::PUBLIC | MethodAccessFlags::PROTECTED);
        flags |= MethodAccessFlags::PRIVATE;
    }
    flags
}

/// Lowers one field, given its already-evaluated constant value and
/// disambiguated annotations.
#[must_use]
pub fn lower_field(
    field: &BoundField,
    is_enum_constant: bool,
    annotations: &DisambiguatedAnnotations,
    runtime_visible: &dyn Fn(&ClassSymbol) -> bool,
) -> FieldInfo {
    let (visible, invisible) = split_visibility(&annotations.declaration, runtime_visible);
    let (visible_ty, invisible_ty) =
        split_type_visibility(&annotations.type_use, TargetInfo::Empty { kind: 0x13 }, runtime_visible);
    FieldInfo {
        access_flags: field_access_flags(&field.decl.modifiers, is_enum_constant),
        name: field.name.clone(),
        descriptor: erase(&field.ty),
        constant_value: field.constant_value.clone(),
        signature: uses_generics(&field.ty).then(|| signature::field_signature(&field.ty)),
        is_synthetic: false,
        is_deprecated: false,
        visible_annotations: visible,
        invisible_annotations: invisible,
        visible_type_annotations: visible_ty,
        invisible_type_annotations: invisible_ty,
    }
}

/// Lowers one method, given its disambiguated declaration annotations.
/// `is_synthetic` should be set for every member synthesized by
/// [`crate::type_binder::bind_class`] (default constructors, enum
/// `values`/`valueOf`/`<init>`) -- javac marks them `ACC_SYNTHETIC` too,
/// except the enum constructor, which is not synthetic in any JVM enum's
/// `.class` file despite not appearing in source.
#[must_use]
pub fn lower_method(
    method: &BoundMethod,
    owner_kind: ClassKind,
    is_synthetic: bool,
    annotations: &DisambiguatedAnnotations,
    annotation_default: Option<Value>,
    parameter_annotations: &[DisambiguatedAnnotations],
    runtime_visible: &dyn Fn(&ClassSymbol) -> bool,
) -> MethodInfo {
    let (visible, invisible) = split_visibility(&annotations.declaration, runtime_visible);
    let (mut visible_ty, mut invisible_ty) =
        split_type_visibility(&annotations.type_use, TargetInfo::Empty { kind: 0x14 }, runtime_visible);
    let (visible_params, invisible_params, param_visible_ty, param_invisible_ty) =
        split_parameter_annotations(parameter_annotations, runtime_visible);
    visible_ty.extend(param_visible_ty);
    invisible_ty.extend(param_invisible_ty);
    let is_varargs = method.decl.parameters.last().is_some_and(|p| p.is_varargs);
    let return_uses_generics = uses_generics(&method.return_type);
    let params_use_generics = method.parameter_types.iter().any(uses_generics);
    let type_parameters = method_type_parameters(method);
    let signature = (return_uses_generics || params_use_generics || !type_parameters.is_empty()).then(|| {
        signature::method_signature(&type_parameters, &method.parameter_types, &method.return_type, &method.throws)
    });
    MethodInfo {
        access_flags: method_access_flags(&method.decl.modifiers, owner_kind, method.decl.is_constructor, method.decl.has_body, is_varargs),
        name: method.sym.name.clone(),
        descriptor: crate::types::descriptor::MethodDescriptor {
            parameters: method.parameter_types.iter().map(erase).collect(),
            return_type: erase_return(&method.return_type),
        },
        signature,
        exceptions: method.throws.iter().filter_map(Type::class_symbol).cloned().collect(),
        is_synthetic,
        is_deprecated: false,
        visible_annotations: visible,
        invisible_annotations: invisible,
        visible_type_annotations: visible_ty,
        invisible_type_annotations: invisible_ty,
        annotation_default,
        visible_parameter_annotations: visible_params,
        invisible_parameter_annotations: invisible_params,
    }
}

/// Collects every class symbol mentioned by a nested-class chain anywhere
/// in `class`'s own types (supertypes, interfaces, field and method
/// signatures) plus `class.sym` and every one of its lexical enclosers, for
/// the `InnerClasses` attribute (JVMS §4.7.6: every class or interface that
/// is itself nested, or that refers to a nested class, must list it).
#[must_use]
pub fn collect_inner_classes(class: &SourceTypeBoundClass) -> Vec<InnerClassEntry> {
    let mut seen = Vec::new();
    let mut visit_chain = |segments: &[SimpleClassTy]| {
        for segment in segments {
            if segment.sym.binary_name().contains('$') && !seen.iter().any(|s: &ClassSymbol| s == &segment.sym) {
                seen.push(segment.sym.clone());
            }
        }
    };
    if let Some(Type::Class(segments)) = &class.superclass {
        visit_chain(segments);
    }
    for iface in &class.interfaces {
        if let Type::Class(segments) = iface {
            visit_chain(segments);
        }
    }
    for field in &class.fields {
        if let Type::Class(segments) = &field.ty {
            visit_chain(segments);
        }
    }
    for method in &class.methods {
        if let Type::Class(segments) = &method.return_type {
            visit_chain(segments);
        }
        for p in &method.parameter_types {
            if let Type::Class(segments) = p {
                visit_chain(segments);
            }
        }
    }
    if class.sym.binary_name().contains('$') {
        visit_chain(&[SimpleClassTy::raw(class.sym.clone())]);
    }

    seen.into_iter()
        .map(|sym| {
            let outer = sym.binary_name().rfind('$').map(|idx| ClassSymbol::new(&sym.binary_name()[..idx]));
            InnerClassEntry {
                inner_class: sym.clone(),
                outer_class: outer,
                inner_name: Some(sym.simple_name().to_owned()),
                access_flags: NestedClassAccessFlags::PUBLIC | NestedClassAccessFlags::STATIC,
            }
        })
        .collect()
}

/// Assembles the final [`ClassFile`] for one bound, canonical class.
///
/// `fields`/`methods` are the already-lowered members (built via
/// [`lower_field`]/[`lower_method`] with each member's own disambiguated
/// annotations, since those live outside [`SourceTypeBoundClass`]); this
/// function only assembles the class-level shell around them.
#[must_use]
pub fn lower_class(
    class: &SourceTypeBoundClass,
    kind: ClassKind,
    modifiers: &[Modifier],
    enum_has_constant_body: bool,
    fields: Vec<FieldInfo>,
    methods: Vec<MethodInfo>,
    source_file: Option<String>,
    class_annotations: &DisambiguatedAnnotations,
    runtime_visible: &dyn Fn(&ClassSymbol) -> bool,
) -> ClassFile {
    let (visible, invisible) = split_visibility(&class_annotations.declaration, runtime_visible);
    let superclass_uses_generics = class.superclass.as_ref().is_some_and(uses_generics);
    let interfaces_use_generics = class.interfaces.iter().any(uses_generics);
    let signature = (superclass_uses_generics || interfaces_use_generics).then(|| {
        signature::class_signature(&[], class.superclass.as_ref(), &class.interfaces)
    });

    ClassFile {
        major_version: TARGET_MAJOR_VERSION,
        access_flags: class_access_flags(modifiers, kind, enum_has_constant_body),
        this_class: class.sym.clone(),
        super_class: class.superclass.as_ref().and_then(Type::class_symbol).cloned(),
        interfaces: class.interfaces.iter().filter_map(Type::class_symbol).cloned().collect(),
        fields,
        methods,
        source_file,
        signature,
        inner_classes: collect_inner_classes(class),
        enclosing_method: None,
        nest_host: None,
        nest_members: Vec::new(),
        permitted_subclasses: Vec::new(),
        record_components: None,
        is_synthetic: false,
        is_deprecated: false,
        visible_annotations: visible,
        invisible_annotations: invisible,
        // `class_annotations.type_use` has no JVMS target_info: a class
        // declaration is never itself a type-use position (JLS §9.7.4), so
        // there is nothing here to encode as a type annotation.
        visible_type_annotations: Vec::new(),
        invisible_type_annotations: Vec::new(),
        bootstrap_methods: Vec::new(),
    }
}

/// A transitive classpath dependency repackaged under
/// `META-INF/TRANSITIVE/<binaryName>.turbine`, carrying only the origin
/// jar's path in a `TurbineTransitiveJar` attribute (§6 jar layout).
///
/// Built by hand rather than through [`ClassFile::write`], since a
/// transitive header carries one attribute no ordinary class file does;
/// the shell around it (magic, versions, empty interfaces/fields/methods)
/// mirrors [`ClassFile::write`] exactly.
#[must_use]
pub fn lower_transitive_header(sym: &ClassSymbol, origin_path: &str) -> Vec<u8> {
    use crate::classfile::attribute;
    use crate::classfile::constant_pool::ConstantPool;

    let mut pool = ConstantPool::new();
    let this_index = pool.class_info(sym.binary_name());
    let super_index = pool.class_info("java/lang/Object");

    let mut attributes = Vec::new();
    let body = pool.utf8(origin_path.to_owned()).to_be_bytes().to_vec();
    attribute::write_attribute(&mut pool, "TurbineTransitiveJar", &body, &mut attributes);

    let mut body_bytes = Vec::new();
    body_bytes.extend_from_slice(&(ClassAccessFlags::PUBLIC | ClassAccessFlags::SUPER).bits().to_be_bytes());
    body_bytes.extend_from_slice(&this_index.to_be_bytes());
    body_bytes.extend_from_slice(&super_index.to_be_bytes());
    body_bytes.extend_from_slice(&0u16.to_be_bytes()); // interfaces_count
    body_bytes.extend_from_slice(&0u16.to_be_bytes()); // fields_count
    body_bytes.extend_from_slice(&0u16.to_be_bytes()); // methods_count
    body_bytes.extend_from_slice(&1u16.to_be_bytes()); // attributes_count
    body_bytes.extend_from_slice(&attributes);

    let mut out = Vec::with_capacity(body_bytes.len() + 16);
    out.extend_from_slice(&crate::classfile::MAGIC.to_be_bytes());
    out.extend_from_slice(&0u16.to_be_bytes());
    out.extend_from_slice(&TARGET_MAJOR_VERSION.to_be_bytes());
    out.extend_from_slice(&pool.count().to_be_bytes());
    out.extend_from_slice(&pool.write_to_bytes());
    out.extend_from_slice(&body_bytes);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sym::MethodSymbol;
    use crate::types::primitive::PrimitiveType;
    use std::rc::Rc;

    fn sym(name: &str) -> ClassSymbol {
        ClassSymbol::new(name)
    }

    #[test]
    fn erases_primitive_directly() {
        assert_eq!(erase(&Type::Primitive(PrimitiveType::Int)), FieldDescriptor::Base(PrimitiveType::Int));
    }

    #[test]
    fn erases_type_variable_to_object() {
        let tv = crate::sym::TyVarSymbol::of_class(sym("a/B"), "T");
        assert_eq!(erase(&Type::TypeVar(tv)), FieldDescriptor::Object(sym("java/lang/Object")));
    }

    #[test]
    fn raw_class_type_does_not_need_a_signature() {
        assert!(!uses_generics(&Type::class(sym("java/lang/String"))));
    }

    #[test]
    fn parameterized_class_type_needs_a_signature() {
        let ty = Type::Class(vec![crate::types::ty::SimpleClassTy {
            sym: sym("java/util/List"),
            type_args: vec![TypeArgument::Type(Box::new(Type::class(sym("java/lang/String"))))],
            annotations: Vec::new(),
        }]);
        assert!(uses_generics(&ty));
    }

    #[test]
    fn class_access_flags_for_plain_class_includes_super() {
        let flags = class_access_flags(&[Modifier::Public], ClassKind::Class, false);
        assert_eq!(flags, ClassAccessFlags::PUBLIC | ClassAccessFlags::SUPER);
    }

    #[test]
    fn enum_without_constant_bodies_is_final() {
        let flags = class_access_flags(&[Modifier::Public], ClassKind::Enum, false);
        assert!(flags.contains(ClassAccessFlags::FINAL));
        assert!(!flags.contains(ClassAccessFlags::ABSTRACT));
    }

    #[test]
    fn enum_with_a_constant_body_is_abstract_not_final() {
        let flags = class_access_flags(&[Modifier::Public], ClassKind::Enum, true);
        assert!(flags.contains(ClassAccessFlags::ABSTRACT));
        assert!(!flags.contains(ClassAccessFlags::FINAL));
    }

    #[test]
    fn interface_method_without_body_is_implicitly_abstract() {
        let flags = method_access_flags(&[], ClassKind::Interface, false, false, false);
        assert!(flags.contains(MethodAccessFlags::PUBLIC));
        assert!(flags.contains(MethodAccessFlags::ABSTRACT));
    }

    #[test]
    fn interface_default_method_is_not_abstract() {
        let flags = method_access_flags(&[Modifier::Default], ClassKind::Interface, false, true, false);
        assert!(!flags.contains(MethodAccessFlags::ABSTRACT));
    }

    #[test]
    fn enum_constructor_is_forced_private() {
        let flags = method_access_flags(&[Modifier::Public], ClassKind::Enum, true, true, false);
        assert!(flags.contains(MethodAccessFlags::PRIVATE));
        assert!(!flags.contains(MethodAccessFlags::PUBLIC));
    }

    #[test]
    fn lowered_field_carries_constant_value() {
        let field = BoundField {
            name: "X".to_owned(),
            ty: Type::Primitive(PrimitiveType::Int),
            decl: Rc::new(crate::ast::FieldDeclNode {
                modifiers: vec![Modifier::Static, Modifier::Final],
                ty: crate::ast::TypeNode::Primitive(PrimitiveType::Int),
                name: "X".to_owned(),
                initializer: None,
            }),
            constant_value: Some(Const::Int(3)),
        };
        let annotations = DisambiguatedAnnotations::default();
        let info = lower_field(&field, false, &annotations, &|_| true);
        assert_eq!(info.constant_value, Some(Const::Int(3)));
        assert!(info.access_flags.contains(FieldAccessFlags::STATIC | FieldAccessFlags::FINAL));
    }

    #[test]
    fn field_type_use_annotation_is_carried_as_a_field_type_annotation() {
        let field = BoundField {
            name: "message".to_owned(),
            ty: Type::class(sym("java/lang/String")),
            decl: Rc::new(crate::ast::FieldDeclNode {
                modifiers: Vec::new(),
                ty: crate::ast::TypeNode::Class { name: crate::ast::QualifiedName::new(vec!["String".into()]), type_args: Vec::new() },
                name: "message".to_owned(),
                initializer: None,
            }),
            constant_value: None,
        };
        let annotations = DisambiguatedAnnotations {
            declaration: Vec::new(),
            type_use: vec![EvaluatedAnnotation { annotation_type: sym("a/NonNull"), elements: Vec::new() }],
        };
        let info = lower_field(&field, false, &annotations, &|_| true);
        assert_eq!(info.visible_type_annotations.len(), 1);
        assert_eq!(info.invisible_type_annotations.len(), 0);
        assert_eq!(info.visible_type_annotations[0].target_info, TargetInfo::Empty { kind: 0x13 });
    }

    #[test]
    fn method_type_use_annotation_is_carried_as_a_return_type_annotation() {
        let method = BoundMethod {
            sym: MethodSymbol::new(sym("a/C"), "message"),
            parameter_types: Vec::new(),
            return_type: Type::class(sym("java/lang/String")),
            throws: Vec::new(),
            decl: Rc::new(crate::ast::MethodDeclNode {
                modifiers: vec![Modifier::Public],
                type_parameters: Vec::new(),
                return_type: crate::ast::TypeNode::Class { name: crate::ast::QualifiedName::new(vec!["String".into()]), type_args: Vec::new() },
                name: "message".to_owned(),
                is_constructor: false,
                parameters: Vec::new(),
                throws: Vec::new(),
                has_body: true,
                default_value: None,
            }),
        };
        let annotations = DisambiguatedAnnotations {
            declaration: Vec::new(),
            type_use: vec![EvaluatedAnnotation { annotation_type: sym("a/NonNull"), elements: Vec::new() }],
        };
        let info = lower_method(&method, ClassKind::Class, false, &annotations, None, &[], &|_| false);
        assert_eq!(info.invisible_type_annotations.len(), 1);
        assert_eq!(info.invisible_type_annotations[0].target_info, TargetInfo::Empty { kind: 0x14 });
    }

    #[test]
    fn parameter_declaration_annotation_is_carried_in_parameter_annotations() {
        let method = BoundMethod {
            sym: MethodSymbol::new(sym("a/C"), "set"),
            parameter_types: vec![Type::class(sym("java/lang/String"))],
            return_type: Type::Void,
            throws: Vec::new(),
            decl: Rc::new(crate::ast::MethodDeclNode {
                modifiers: vec![Modifier::Public],
                type_parameters: Vec::new(),
                return_type: crate::ast::TypeNode::Void,
                name: "set".to_owned(),
                is_constructor: false,
                parameters: vec![crate::ast::ParameterNode {
                    modifiers: Vec::new(),
                    ty: crate::ast::TypeNode::Class { name: crate::ast::QualifiedName::new(vec!["String".into()]), type_args: Vec::new() },
                    name: "value".to_owned(),
                    is_varargs: false,
                }],
                throws: Vec::new(),
                has_body: true,
                default_value: None,
            }),
        };
        let annotations = DisambiguatedAnnotations::default();
        let parameter_annotations = vec![DisambiguatedAnnotations {
            declaration: vec![EvaluatedAnnotation { annotation_type: sym("a/NonNull"), elements: Vec::new() }],
            type_use: vec![EvaluatedAnnotation { annotation_type: sym("a/NonNull"), elements: Vec::new() }],
        }];
        let info = lower_method(&method, ClassKind::Class, false, &annotations, None, &parameter_annotations, &|_| true);
        assert_eq!(info.visible_parameter_annotations, vec![vec![AnnotationValue { annotation_type: sym("a/NonNull"), elements: Vec::new() }]]);
        assert_eq!(info.visible_type_annotations.len(), 1);
        assert_eq!(info.visible_type_annotations[0].target_info, TargetInfo::FormalParameter { index: 0 });
    }

    #[test]
    fn annotation_interface_default_value_is_carried() {
        let method = BoundMethod {
            sym: MethodSymbol::new(sym("a/Anno"), "value"),
            parameter_types: Vec::new(),
            return_type: Type::Primitive(PrimitiveType::Int),
            throws: Vec::new(),
            decl: Rc::new(crate::ast::MethodDeclNode {
                modifiers: vec![Modifier::Public, Modifier::Abstract],
                type_parameters: Vec::new(),
                return_type: crate::ast::TypeNode::Primitive(PrimitiveType::Int),
                name: "value".to_owned(),
                is_constructor: false,
                parameters: Vec::new(),
                throws: Vec::new(),
                has_body: false,
                default_value: Some(crate::ast::ExprNode::Literal(Const::Int(0))),
            }),
        };
        let annotations = DisambiguatedAnnotations::default();
        let default_value = Some(crate::types::const_value::Value::Const(Const::Int(0)));
        let info = lower_method(&method, ClassKind::AnnotationInterface, false, &annotations, default_value.clone(), &[], &|_| true);
        assert_eq!(info.annotation_default, default_value);
    }

    #[test]
    fn lowered_synthetic_default_constructor_is_marked_synthetic() {
        let method = BoundMethod {
            sym: MethodSymbol::init(sym("a/C")),
            parameter_types: Vec::new(),
            return_type: Type::Void,
            throws: Vec::new(),
            decl: Rc::new(crate::ast::MethodDeclNode {
                modifiers: vec![Modifier::Public],
                type_parameters: Vec::new(),
                return_type: crate::ast::TypeNode::Void,
                name: "<init>".to_owned(),
                is_constructor: true,
                parameters: Vec::new(),
                throws: Vec::new(),
                has_body: true,
                default_value: None,
            }),
        };
        let annotations = DisambiguatedAnnotations::default();
        let info = lower_method(&method, ClassKind::Class, true, &annotations, None, &[], &|_| true);
        assert!(info.is_synthetic);
        assert_eq!(info.descriptor.descriptor_string(), "()V");
    }

    #[test]
    fn generic_method_signature_declares_its_own_type_parameter() {
        let method_sym = MethodSymbol::new(sym("a/Box"), "id");
        let tv = crate::sym::TyVarSymbol::of_method(method_sym.clone(), "T");
        let method = BoundMethod {
            sym: method_sym,
            parameter_types: vec![Type::TypeVar(tv.clone())],
            return_type: Type::TypeVar(tv),
            throws: Vec::new(),
            decl: Rc::new(crate::ast::MethodDeclNode {
                modifiers: vec![Modifier::Public],
                type_parameters: vec![crate::ast::TypeParameterNode { name: "T".to_owned(), bounds: Vec::new() }],
                return_type: crate::ast::TypeNode::Var("T".to_owned()),
                name: "id".to_owned(),
                is_constructor: false,
                parameters: vec![crate::ast::ParameterNode {
                    modifiers: Vec::new(),
                    ty: crate::ast::TypeNode::Var("T".to_owned()),
                    name: "x".to_owned(),
                    is_varargs: false,
                }],
                throws: Vec::new(),
                has_body: false,
                default_value: None,
            }),
        };
        let annotations = DisambiguatedAnnotations::default();
        let info = lower_method(&method, ClassKind::Interface, false, &annotations, None, &[], &|_| true);
        assert_eq!(info.signature.as_deref(), Some("<T:Ljava/lang/Object;>(TT;)TT;"));
    }

    #[test]
    fn transitive_header_starts_with_magic_and_carries_one_attribute() {
        let bytes = lower_transitive_header(&sym("a/B"), "/repo/libs/a.jar");
        assert_eq!(&bytes[0..4], &crate::classfile::MAGIC.to_be_bytes());
        assert_eq!(&bytes[6..8], &TARGET_MAJOR_VERSION.to_be_bytes());
    }

    #[test]
    fn collects_inner_class_mentioned_only_in_a_field_type() {
        let class = SourceTypeBoundClass {
            sym: sym("a/Outer"),
            superclass: Some(Type::class(sym("java/lang/Object"))),
            interfaces: Vec::new(),
            fields: vec![BoundField {
                name: "f".to_owned(),
                ty: Type::class(sym("a/Outer$Inner")),
                decl: Rc::new(crate::ast::FieldDeclNode {
                    modifiers: Vec::new(),
                    ty: crate::ast::TypeNode::Var("Inner".to_owned()),
                    name: "f".to_owned(),
                    initializer: None,
                }),
                constant_value: None,
            }],
            methods: Vec::new(),
        };
        let entries = collect_inner_classes(&class);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].inner_class, sym("a/Outer$Inner"));
        assert_eq!(entries[0].outer_class, Some(sym("a/Outer")));
    }
}
