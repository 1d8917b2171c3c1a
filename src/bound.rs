//! Snapshots of a class at each binding phase.
//!
//! Each phase (§4.C-§4.H) consumes the previous phase's bound class and
//! produces a new one with more resolved; nothing is ever mutated in
//! place, so a completer in [`crate::env::LazyEnv`] can safely hand out a
//! shared, immutable `Rc` of a finished phase to every class that depends
//! on it.
use std::rc::Rc;

use crate::ast::{AnnotationNode, ClassDeclNode, ClassKind, FieldDeclNode, MethodDeclNode};
use crate::sym::{ClassSymbol, MethodSymbol};
use crate::types::const_value::Const;
use crate::types::ty::Type;

/// Output of preprocessing (§4.E): a class with its simple name resolved
/// to a full [`ClassSymbol`] and its AST retained, but nothing about its
/// supertypes or members looked up yet.
#[derive(Debug, Clone)]
pub struct SourceBoundClass {
    /// This class's symbol.
    pub sym: ClassSymbol,
    /// The original declaration.
    pub decl: Rc<ClassDeclNode>,
    /// The enclosing class, `None` for a top-level declaration.
    pub owner: Option<ClassSymbol>,
}

/// The unnamed or named package a [`SourceBoundClass`] lives in, tracked
/// separately since package annotations (`package-info.java`) bind
/// independently of any one class.
#[derive(Debug, Clone)]
pub struct PackageSourceBoundClass {
    /// The package's binary name, empty for the unnamed package.
    pub name: String,
    /// Annotations from this package's `package-info.java`, if compiled.
    pub annotations: Vec<AnnotationNode>,
}

/// Output of hierarchy binding (§4.F): supertypes resolved to symbols, but
/// not yet to full [`Type`]s (no generics substitution has happened).
#[derive(Debug, Clone)]
pub struct SourceHeaderBoundClass {
    /// This class's symbol.
    pub sym: ClassSymbol,
    /// What kind of declaration this is.
    pub kind: ClassKind,
    /// The resolved superclass; `None` only for `java/lang/Object`.
    pub superclass: Option<ClassSymbol>,
    /// Resolved direct interfaces.
    pub interfaces: Vec<ClassSymbol>,
}

/// Output of type binding (§4.G): every type-use position in the class
/// resolved to a full generic [`Type`].
#[derive(Debug, Clone)]
pub struct SourceTypeBoundClass {
    /// This class's symbol.
    pub sym: ClassSymbol,
    /// The fully-typed superclass type (with type arguments substituted).
    pub superclass: Option<Type>,
    /// The fully-typed direct interfaces.
    pub interfaces: Vec<Type>,
    /// Bound field declarations.
    pub fields: Vec<BoundField>,
    /// Bound method declarations.
    pub methods: Vec<BoundMethod>,
}

/// A field after type binding, before constant evaluation.
#[derive(Debug, Clone)]
pub struct BoundField {
    /// The field's simple name.
    pub name: String,
    /// The field's bound type.
    pub ty: Type,
    /// The original declaration, kept so §4.H can re-walk the initializer.
    pub decl: Rc<FieldDeclNode>,
    /// The field's constant value, filled in by §4.H; `None` until then,
    /// and remains `None` for a field whose initializer isn't a constant
    /// expression.
    pub constant_value: Option<Const>,
}

/// A method after type binding.
#[derive(Debug, Clone)]
pub struct BoundMethod {
    /// The method's symbol.
    pub sym: MethodSymbol,
    /// Bound parameter types, in declaration order.
    pub parameter_types: Vec<Type>,
    /// The bound return type.
    pub return_type: Type,
    /// Bound `throws` types.
    pub throws: Vec<Type>,
    /// The original declaration.
    pub decl: Rc<MethodDeclNode>,
}

/// A class whose ABI comes from a compiled `.class` file on the classpath,
/// rather than from source. Its members are already erased descriptors, so
/// it never goes through the source-bound phases above; the hierarchy and
/// type binders treat this and [`SourceHeaderBoundClass`]/
/// [`SourceTypeBoundClass`] uniformly through [`crate::collab::ProcessingHost`].
#[derive(Debug, Clone, PartialEq)]
pub struct BytecodeBoundClass {
    /// This class's symbol.
    pub sym: ClassSymbol,
    /// The resolved superclass, read back out of the `.class` file's
    /// `super_class` constant pool entry.
    pub superclass: Option<ClassSymbol>,
    /// Resolved direct interfaces.
    pub interfaces: Vec<ClassSymbol>,
    /// Field name/erased-descriptor pairs.
    pub fields: Vec<(String, crate::types::descriptor::FieldDescriptor)>,
    /// Method name/erased-descriptor pairs.
    pub methods: Vec<(String, crate::types::descriptor::MethodDescriptor)>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytecode_bound_class_holds_erased_members() {
        let class = BytecodeBoundClass {
            sym: ClassSymbol::new("java/lang/Object"),
            superclass: None,
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
        };
        assert_eq!(class.sym.binary_name(), "java/lang/Object");
        assert!(class.superclass.is_none());
    }
}
