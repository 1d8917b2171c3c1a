//! Annotation disambiguation (§4.I) splits a declaration's annotation list
//! into the half that binds to the declaration and the half that binds to
//! the type written there, based on the annotation type's `@Target`.

use turbine::ast::{AnnotationNode, QualifiedName};
use turbine::canonicalize::{disambiguate, AnnotationTargets, DeclarationKind};
use turbine::diagnostic::Diagnostics;
use turbine::sym::ClassSymbol;

fn anno(simple_name: &str) -> AnnotationNode {
    AnnotationNode { name: QualifiedName::new(vec![simple_name.to_owned()]), arguments: Vec::new() }
}

fn owner() -> ClassSymbol {
    ClassSymbol::new("a/Owner")
}

/// `@Target({ElementType.FIELD, ElementType.TYPE_USE})` on a field
/// declaration lands in both halves at once.
#[test]
fn annotation_targeting_both_field_and_type_use_lands_in_both_halves() {
    let mut diagnostics = Diagnostics::new();
    let both = AnnotationTargets { declaration_kinds: vec!["FIELD".to_owned()], type_use: true };
    let result = disambiguate(
        &[anno("NonNull")],
        DeclarationKind::Field,
        &owner(),
        &|_| Some(both.clone()),
        &|_| None,
        &|_| None,
        &|_| Some(ClassSymbol::new("a/NonNull")),
        &mut diagnostics,
    );
    assert_eq!(result.declaration.len(), 1);
    assert_eq!(result.type_use.len(), 1);
    assert!(!diagnostics.has_errors());
}

/// An annotation targeted at `METHOD` only, written on a field, is dropped
/// from both halves rather than misapplied.
#[test]
fn annotation_not_targeting_this_declaration_kind_is_dropped() {
    let mut diagnostics = Diagnostics::new();
    let method_only = AnnotationTargets { declaration_kinds: vec!["METHOD".to_owned()], type_use: false };
    let result = disambiguate(
        &[anno("Deprecated")],
        DeclarationKind::Field,
        &owner(),
        &|_| Some(method_only.clone()),
        &|_| None,
        &|_| None,
        &|_| Some(ClassSymbol::new("a/Deprecated")),
        &mut diagnostics,
    );
    assert!(result.declaration.is_empty());
    assert!(result.type_use.is_empty());
}

/// No explicit `@Target` falls back to the JLS default set, which covers a
/// constructor declaration but not `TYPE_USE`.
#[test]
fn absent_target_falls_back_to_default_declaration_kinds() {
    let mut diagnostics = Diagnostics::new();
    let result = disambiguate(
        &[anno("Inject")],
        DeclarationKind::Constructor,
        &owner(),
        &|_| None,
        &|_| None,
        &|_| None,
        &|_| Some(ClassSymbol::new("a/Inject")),
        &mut diagnostics,
    );
    assert_eq!(result.declaration.len(), 1);
    assert!(result.type_use.is_empty());
}

/// A name that does not resolve to a known annotation type is reported and
/// excluded from both halves.
#[test]
fn unresolvable_annotation_name_is_reported_and_dropped() {
    let mut diagnostics = Diagnostics::new();
    let result = disambiguate(
        &[anno("Bogus")],
        DeclarationKind::Method,
        &owner(),
        &|_| None,
        &|_| None,
        &|_| None,
        &|_| None,
        &mut diagnostics,
    );
    assert!(result.declaration.is_empty());
    assert!(diagnostics.has_errors());
}

/// Two annotations of types with different targets are disambiguated
/// independently of each other.
#[test]
fn mixed_annotation_list_splits_each_by_its_own_target() {
    let mut diagnostics = Diagnostics::new();
    let decl_only = AnnotationTargets { declaration_kinds: vec!["PARAMETER".to_owned()], type_use: false };
    let type_use_only = AnnotationTargets { declaration_kinds: Vec::new(), type_use: true };
    let result = disambiguate(
        &[anno("Named"), anno("NonNull")],
        DeclarationKind::Parameter,
        &owner(),
        &|sym| match sym.binary_name() {
            "a/Named" => Some(decl_only.clone()),
            "a/NonNull" => Some(type_use_only.clone()),
            _ => None,
        },
        &|_| None,
        &|_| None,
        &|name| match name {
            "Named" => Some(ClassSymbol::new("a/Named")),
            "NonNull" => Some(ClassSymbol::new("a/NonNull")),
            _ => None,
        },
        &mut diagnostics,
    );
    assert_eq!(result.declaration.len(), 1);
    assert_eq!(result.declaration[0].annotation_type, ClassSymbol::new("a/Named"));
    assert_eq!(result.type_use.len(), 1);
    assert_eq!(result.type_use[0].annotation_type, ClassSymbol::new("a/NonNull"));
}
