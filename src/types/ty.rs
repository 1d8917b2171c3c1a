//! The generic [`Type`] IR: what a `TypeBinder` (§4.G) produces from a
//! parsed type-use AST node.
//!
//! Unlike [`crate::types::descriptor::FieldDescriptor`], a `Type` carries
//! type arguments, wildcards, and the type-use annotations attached to each
//! syntactic position (JVMS §4.7.20). Lowering (§4.J) erases a `Type` down
//! to a descriptor right before it reaches the codec.
use std::fmt::Display;

use itertools::Itertools;

use crate::sym::{ClassSymbol, TyVarSymbol};

use super::primitive::PrimitiveType;

/// A single `@Anno` annotation attached to a type-use position. Bodies are
/// kept as constant values rather than re-parsed AST, since by the time a
/// `Type` exists every annotation argument has already been const-evaluated
/// (§4.H runs before §4.G's output is finalized).
#[derive(Debug, Clone, PartialEq)]
pub struct TypeAnnotation {
    /// The annotation interface.
    pub annotation_type: ClassSymbol,
}

/// One segment of a (possibly qualified) class type, e.g. the `Map` and the
/// `Entry` in `Map<K, V>.Entry`. Kept as a chain rather than flattened so
/// canonicalization (§4.I) can rewrite only the qualifying prefix.
#[derive(Debug, Clone, PartialEq)]
pub struct SimpleClassTy {
    /// The class this segment names.
    pub sym: ClassSymbol,
    /// Type arguments supplied at this segment, empty for a raw or
    /// non-generic use.
    pub type_args: Vec<TypeArgument>,
    /// Annotations written directly on this segment.
    pub annotations: Vec<TypeAnnotation>,
}

impl SimpleClassTy {
    /// A segment with no type arguments and no annotations.
    #[must_use]
    pub fn raw(sym: ClassSymbol) -> Self {
        Self {
            sym,
            type_args: Vec::new(),
            annotations: Vec::new(),
        }
    }
}

/// An actual type argument: a concrete type or a wildcard.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeArgument {
    /// A concrete type argument, e.g. the `String` in `List<String>`.
    Type(Box<Type>),
    /// `?`, `? extends T`, or `? super T`.
    Wildcard(Wildcard),
}

/// A wildcard type argument.
#[derive(Debug, Clone, PartialEq)]
pub enum Wildcard {
    /// `?`
    Unbounded,
    /// `? extends T`
    Upper(Box<Type>),
    /// `? super T`
    Lower(Box<Type>),
}

/// A resolved, bound type.
///
/// This is the output of the type binder (§4.G): every name in it is a
/// [`crate::sym::ClassSymbol`] or [`crate::sym::TyVarSymbol`], not an
/// unresolved AST name.
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    /// A primitive type; never carries type-use annotations of its own
    /// beyond what [`Type::Annotated`] wraps it in.
    Primitive(PrimitiveType),
    /// The `void` pseudo-type, valid only as a method return type.
    Void,
    /// A possibly-qualified class type, represented as the chain of
    /// segments from outermost to innermost.
    Class(Vec<SimpleClassTy>),
    /// An array type.
    Array(Box<Type>),
    /// A reference to a type variable in scope.
    TypeVar(TyVarSymbol),
    /// A wildcard, only valid as a [`TypeArgument`]; kept as a `Type`
    /// variant too so error-recovery nodes can hold one without a second
    /// representation.
    Wildcard(Wildcard),
    /// An intersection type `A & B & C`, arising from a cast or a type
    /// variable's bound list with more than one interface.
    Intersection(Vec<Type>),
    /// A placeholder produced when binding failed; carries no further
    /// information beyond the fact that a diagnostic was already logged.
    Error,
}

impl Type {
    /// A non-generic, non-annotated, single-segment class type.
    #[must_use]
    pub fn class(sym: ClassSymbol) -> Self {
        Self::Class(vec![SimpleClassTy::raw(sym)])
    }

    /// Wraps `self` in one array dimension.
    #[must_use]
    pub fn into_array(self) -> Self {
        Self::Array(Box::new(self))
    }

    /// The innermost [`SimpleClassTy`] segment, if this is a class type.
    #[must_use]
    pub fn as_class_tail(&self) -> Option<&SimpleClassTy> {
        match self {
            Self::Class(segments) => segments.last(),
            _ => None,
        }
    }

    /// The class symbol this type erases to, for [`Self::Class`] and
    /// [`Self::Array`] of class element type; `None` otherwise.
    #[must_use]
    pub fn class_symbol(&self) -> Option<&ClassSymbol> {
        match self {
            Self::Class(segments) => segments.last().map(|s| &s.sym),
            Self::Array(elem) => elem.class_symbol(),
            _ => None,
        }
    }

    /// `true` for the types JLS calls reference types: class types, array
    /// types, and type variables.
    #[must_use]
    pub fn is_reference(&self) -> bool {
        matches!(self, Self::Class(_) | Self::Array(_) | Self::TypeVar(_))
    }
}

impl Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Primitive(p) => write!(f, "{p}"),
            Self::Void => write!(f, "void"),
            Self::Class(segments) => {
                write!(
                    f,
                    "{}",
                    segments
                        .iter()
                        .map(|s| if s.type_args.is_empty() {
                            s.sym.simple_name().to_owned()
                        } else {
                            format!(
                                "{}<{}>",
                                s.sym.simple_name(),
                                s.type_args.iter().map(ToString::to_string).join(", ")
                            )
                        })
                        .join(".")
                )
            }
            Self::Array(elem) => write!(f, "{elem}[]"),
            Self::TypeVar(tv) => write!(f, "{tv}"),
            Self::Wildcard(w) => write!(f, "{w}"),
            Self::Intersection(parts) => {
                write!(f, "{}", parts.iter().map(ToString::to_string).join(" & "))
            }
            Self::Error => write!(f, "<error>"),
        }
    }
}

impl Display for Wildcard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unbounded => write!(f, "?"),
            Self::Upper(bound) => write!(f, "? extends {bound}"),
            Self::Lower(bound) => write!(f, "? super {bound}"),
        }
    }
}

impl Display for TypeArgument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Type(ty) => write!(f, "{ty}"),
            Self::Wildcard(w) => write!(f, "{w}"),
        }
    }
}
