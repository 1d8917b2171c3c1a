//! Type binding (§4.G): resolving every type-use position to a full
//! generic [`Type`].
//!
//! Builds on hierarchy binding (§4.F), which already knows each class's
//! supertypes as bare symbols; this phase additionally threads type
//! arguments and looks up type-variable references against the type
//! parameters in scope (the class's own, then any enclosing class's, then
//! the method's, innermost first).
use std::collections::HashMap;
use std::rc::Rc;

use crate::ast::{ClassKind, MethodDeclNode, Modifier, ParameterNode, QualifiedName, TypeArgumentNode, TypeNode};
use crate::bound::{BoundField, BoundMethod, SourceBoundClass, SourceTypeBoundClass};
use crate::diagnostic::{Diagnostics, ErrorKind};
use crate::index::{CompoundTopLevelIndex, LookupResult};
use crate::sym::{ClassSymbol, MethodSymbol, TyVarOwner, TyVarSymbol};
use crate::types::primitive::PrimitiveType;
use crate::types::ty::{SimpleClassTy, Type, TypeArgument, Wildcard};

/// The type variables visible at one point, innermost scope first:
/// a method's own type parameters, then its owner's, then that owner's
/// enclosing class, and so on (JLS §6.3).
#[derive(Debug, Clone, Default)]
pub struct TypeVarScope {
    owners: Vec<TyVarOwner>,
    names: HashMap<String, TyVarSymbol>,
}

impl TypeVarScope {
    /// An empty scope (top-level class with no type parameters).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a layer of type variables owned by `owner`, shadowing any
    /// same-named variable from an outer layer already present.
    pub fn push(&mut self, owner: TyVarOwner, names: impl IntoIterator<Item = String>) {
        for name in names {
            self.names.insert(
                name.clone(),
                TyVarSymbol { owner: owner.clone(), name },
            );
        }
        self.owners.push(owner);
    }

    /// Looks up `name` as a type variable.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<TyVarSymbol> {
        self.names.get(name).cloned()
    }
}

/// Binds a [`TypeNode`] to a full [`Type`], resolving class names through
/// `scope` and type-variable names through `tyvars`.
pub fn bind_type(
    node: &TypeNode,
    scope: &CompoundTopLevelIndex,
    tyvars: &TypeVarScope,
    diagnostics: &mut Diagnostics,
) -> Type {
    match node {
        TypeNode::Primitive(p) => Type::Primitive(*p),
        TypeNode::Void => Type::Void,
        TypeNode::Array(elem) => bind_type(elem, scope, tyvars, diagnostics).into_array(),
        TypeNode::Var(name) => tyvars.resolve(name).map_or_else(
            || bind_class_name(name, &[], scope, tyvars, diagnostics),
            Type::TypeVar,
        ),
        TypeNode::Class { name, type_args } => {
            if type_args.is_empty() {
                if let Some(tv) = tyvars.resolve(name.simple_name()) {
                    return Type::TypeVar(tv);
                }
            }
            bind_class_name(name.simple_name(), type_args, scope, tyvars, diagnostics)
        }
    }
}

fn bind_class_name(
    simple_name: &str,
    type_args: &[TypeArgumentNode],
    scope: &CompoundTopLevelIndex,
    tyvars: &TypeVarScope,
    diagnostics: &mut Diagnostics,
) -> Type {
    match scope.resolve(simple_name) {
        LookupResult::Type(sym) => {
            let bound_args = type_args
                .iter()
                .map(|arg| bind_type_argument(arg, scope, tyvars, diagnostics))
                .collect();
            Type::Class(vec![SimpleClassTy {
                sym,
                type_args: bound_args,
                annotations: Vec::new(),
            }])
        }
        _ => {
            diagnostics.log(crate::diagnostic::Diagnostic::error(
                ErrorKind::CannotResolve(simple_name.to_owned()),
                None,
            ));
            Type::Error
        }
    }
}

fn bind_type_argument(
    node: &TypeArgumentNode,
    scope: &CompoundTopLevelIndex,
    tyvars: &TypeVarScope,
    diagnostics: &mut Diagnostics,
) -> TypeArgument {
    match node {
        TypeArgumentNode::Type(ty) => {
            TypeArgument::Type(Box::new(bind_type(ty, scope, tyvars, diagnostics)))
        }
        TypeArgumentNode::Unbounded => TypeArgument::Wildcard(Wildcard::Unbounded),
        TypeArgumentNode::Upper(ty) => TypeArgument::Wildcard(Wildcard::Upper(Box::new(
            bind_type(ty, scope, tyvars, diagnostics),
        ))),
        TypeArgumentNode::Lower(ty) => TypeArgument::Wildcard(Wildcard::Lower(Box::new(
            bind_type(ty, scope, tyvars, diagnostics),
        ))),
    }
}

/// Binds every type-use position of `source`'s declaration, producing its
/// fields and methods, and synthesises the members Java would otherwise have
/// javac insert for us: a default constructor when no constructor is
/// declared, and (for an `enum`) its implicit constructor, `values()`, and
/// `valueOf(String)`.
///
/// `source.decl.fields` carries enum constants as plain [`FieldDeclNode`]s
/// (per its own doc comment); nothing in the AST marks which fields are
/// constants versus ordinary ones. Since a constant is always the whole of
/// an enum body's field list, we bind every field the same way regardless
/// and only branch on `kind` for the synthesized members below.
#[must_use]
pub fn bind_class(
    source: &SourceBoundClass,
    scope: &CompoundTopLevelIndex,
    diagnostics: &mut Diagnostics,
) -> SourceTypeBoundClass {
    let decl = &source.decl;
    let mut tyvars = TypeVarScope::new();
    tyvars.push(
        TyVarOwner::Class(source.sym.clone()),
        decl.type_parameters.iter().map(|p| p.name.clone()),
    );

    let is_interface = matches!(decl.kind, ClassKind::Interface | ClassKind::AnnotationInterface);
    let superclass = if source.sym.binary_name() == "java/lang/Object" || is_interface {
        None
    } else if let Some(extends) = decl.extends.first() {
        Some(bind_type(extends, scope, &tyvars, diagnostics))
    } else {
        Some(bind_class_name("Object", &[], scope, &tyvars, diagnostics))
    };

    let mut interface_nodes: Vec<&TypeNode> = decl.implements.iter().collect();
    if is_interface {
        interface_nodes.extend(decl.extends.iter());
    }
    let interfaces = interface_nodes
        .into_iter()
        .map(|ty| bind_type(ty, scope, &tyvars, diagnostics))
        .collect();

    let fields = decl
        .fields
        .iter()
        .map(|f| BoundField {
            name: f.name.clone(),
            ty: bind_type(&f.ty, scope, &tyvars, diagnostics),
            decl: Rc::new(f.clone()),
            constant_value: None,
        })
        .collect();

    let mut methods: Vec<BoundMethod> = decl
        .methods
        .iter()
        .map(|m| bind_method(&source.sym, m, scope, &tyvars, diagnostics))
        .collect();

    let has_constructor = decl.methods.iter().any(|m| m.is_constructor);
    if !has_constructor && decl.kind == ClassKind::Class {
        methods.push(synthesize_default_constructor(&source.sym));
    }

    if decl.kind == ClassKind::Enum {
        if !has_constructor {
            methods.push(synthesize_enum_constructor(&source.sym));
        }
        methods.push(synthesize_enum_values(&source.sym));
        methods.push(synthesize_enum_value_of(&source.sym));
    }

    SourceTypeBoundClass {
        sym: source.sym.clone(),
        superclass,
        interfaces,
        fields,
        methods,
    }
}

fn bind_method(
    owner: &ClassSymbol,
    node: &MethodDeclNode,
    scope: &CompoundTopLevelIndex,
    outer_tyvars: &TypeVarScope,
    diagnostics: &mut Diagnostics,
) -> BoundMethod {
    let sym = MethodSymbol::new(owner.clone(), node.name.clone());
    let mut tyvars = outer_tyvars.clone();
    tyvars.push(
        TyVarOwner::Method(sym.clone()),
        node.type_parameters.iter().map(|p| p.name.clone()),
    );

    let parameter_types = node
        .parameters
        .iter()
        .map(|p| bind_type(&p.ty, scope, &tyvars, diagnostics))
        .collect();
    let return_type = if node.is_constructor {
        Type::Void
    } else {
        bind_type(&node.return_type, scope, &tyvars, diagnostics)
    };
    let throws = node
        .throws
        .iter()
        .map(|t| bind_type(t, scope, &tyvars, diagnostics))
        .collect();

    BoundMethod { sym, parameter_types, return_type, throws, decl: Rc::new(node.clone()) }
}

fn string_type() -> TypeNode {
    TypeNode::Class { name: QualifiedName::new(vec!["java".into(), "lang".into(), "String".into()]), type_args: Vec::new() }
}

fn synthesized_method_decl(modifiers: Vec<Modifier>, return_type: TypeNode, name: &str, is_constructor: bool, parameters: Vec<ParameterNode>) -> Rc<MethodDeclNode> {
    Rc::new(MethodDeclNode {
        modifiers,
        type_parameters: Vec::new(),
        return_type,
        name: name.to_owned(),
        is_constructor,
        parameters,
        throws: Vec::new(),
        has_body: true,
        default_value: None,
    })
}

/// `public C()`, javac's implicit no-arg constructor (JLS §8.8.9) for a
/// class that declares none.
fn synthesize_default_constructor(owner: &ClassSymbol) -> BoundMethod {
    BoundMethod {
        sym: MethodSymbol::init(owner.clone()),
        parameter_types: Vec::new(),
        return_type: Type::Void,
        throws: Vec::new(),
        decl: synthesized_method_decl(vec![Modifier::Public], TypeNode::Void, "<init>", true, Vec::new()),
    }
}

/// `private E(String name, int ordinal)`, the hidden two leading parameters
/// every enum constructor carries (JLS §8.9.2) when the source declares no
/// constructor of its own.
fn synthesize_enum_constructor(owner: &ClassSymbol) -> BoundMethod {
    let parameters = vec![
        ParameterNode { modifiers: Vec::new(), ty: string_type(), name: "$enum$name".to_owned(), is_varargs: false },
        ParameterNode { modifiers: Vec::new(), ty: TypeNode::Primitive(PrimitiveType::Int), name: "$enum$ordinal".to_owned(), is_varargs: false },
    ];
    BoundMethod {
        sym: MethodSymbol::init(owner.clone()),
        parameter_types: vec![
            Type::Class(vec![SimpleClassTy { sym: ClassSymbol::new("java/lang/String"), type_args: Vec::new(), annotations: Vec::new() }]),
            Type::Primitive(PrimitiveType::Int),
        ],
        return_type: Type::Void,
        throws: Vec::new(),
        decl: synthesized_method_decl(vec![Modifier::Private], TypeNode::Void, "<init>", true, parameters),
    }
}

/// `public static E[] values()`.
fn synthesize_enum_values(owner: &ClassSymbol) -> BoundMethod {
    let element = Type::Class(vec![SimpleClassTy { sym: owner.clone(), type_args: Vec::new(), annotations: Vec::new() }]);
    BoundMethod {
        sym: MethodSymbol::new(owner.clone(), "values"),
        parameter_types: Vec::new(),
        return_type: element.into_array(),
        throws: Vec::new(),
        decl: synthesized_method_decl(vec![Modifier::Public, Modifier::Static], TypeNode::Array(Box::new(class_type_node(owner))), "values", false, Vec::new()),
    }
}

/// `public static E valueOf(String name)`.
fn synthesize_enum_value_of(owner: &ClassSymbol) -> BoundMethod {
    let parameters = vec![ParameterNode { modifiers: Vec::new(), ty: string_type(), name: "name".to_owned(), is_varargs: false }];
    BoundMethod {
        sym: MethodSymbol::new(owner.clone(), "valueOf"),
        parameter_types: vec![Type::Class(vec![SimpleClassTy { sym: ClassSymbol::new("java/lang/String"), type_args: Vec::new(), annotations: Vec::new() }])],
        return_type: Type::Class(vec![SimpleClassTy { sym: owner.clone(), type_args: Vec::new(), annotations: Vec::new() }]),
        throws: Vec::new(),
        decl: synthesized_method_decl(vec![Modifier::Public, Modifier::Static], class_type_node(owner), "valueOf", false, parameters),
    }
}

fn class_type_node(owner: &ClassSymbol) -> TypeNode {
    TypeNode::Class { name: QualifiedName::new(vec![owner.simple_name().to_owned()]), type_args: Vec::new() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{TopLevelIndex, WildImportScope};

    fn scope_with(index: &TopLevelIndex) -> CompoundTopLevelIndex {
        CompoundTopLevelIndex {
            high_priority: vec![],
            wild_imports: vec![],
            index,
        }
    }

    #[test]
    fn binds_primitive_directly() {
        let index = TopLevelIndex::new();
        let scope = scope_with(&index);
        let tyvars = TypeVarScope::new();
        let mut diagnostics = Diagnostics::new();
        let ty = bind_type(&TypeNode::Primitive(PrimitiveType::Int), &scope, &tyvars, &mut diagnostics);
        assert_eq!(ty, Type::Primitive(PrimitiveType::Int));
    }

    #[test]
    fn resolves_type_variable_over_same_named_class() {
        let mut index = TopLevelIndex::new();
        index.insert(ClassSymbol::new("T"));
        let scope = scope_with(&index);
        let mut tyvars = TypeVarScope::new();
        tyvars.push(
            TyVarOwner::Class(ClassSymbol::new("a/B")),
            vec!["T".to_owned()],
        );
        let mut diagnostics = Diagnostics::new();
        let node = TypeNode::Class {
            name: QualifiedName::new(vec!["T".into()]),
            type_args: Vec::new(),
        };
        let ty = bind_type(&node, &scope, &tyvars, &mut diagnostics);
        assert!(matches!(ty, Type::TypeVar(_)));
    }

    #[test]
    fn unresolvable_name_logs_diagnostic_and_yields_error_type() {
        let index = TopLevelIndex::new();
        let scope = scope_with(&index);
        let tyvars = TypeVarScope::new();
        let mut diagnostics = Diagnostics::new();
        let node = TypeNode::Class {
            name: QualifiedName::new(vec!["Ghost".into()]),
            type_args: Vec::new(),
        };
        let ty = bind_type(&node, &scope, &tyvars, &mut diagnostics);
        assert_eq!(ty, Type::Error);
        assert!(diagnostics.has_errors());
    }

    fn index_with_java_lang() -> (TopLevelIndex, WildImportScope) {
        let mut index = TopLevelIndex::new();
        index.insert(ClassSymbol::new("java/lang/Object"));
        index.insert(ClassSymbol::new("java/lang/String"));
        let mut java_lang = WildImportScope::new();
        java_lang.add("java/lang");
        (index, java_lang)
    }

    fn empty_class(name: &str, kind: ClassKind) -> Rc<crate::ast::ClassDeclNode> {
        Rc::new(crate::ast::ClassDeclNode {
            modifiers: Vec::new(),
            kind,
            name: name.to_owned(),
            type_parameters: Vec::new(),
            extends: Vec::new(),
            implements: Vec::new(),
            record_components: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            nested_classes: Vec::new(),
        })
    }

    #[test]
    fn class_with_no_declared_constructor_gets_a_synthetic_default_one() {
        let (index, java_lang) = index_with_java_lang();
        let scope = CompoundTopLevelIndex { high_priority: vec![], wild_imports: vec![&java_lang], index: &index };
        let source = SourceBoundClass {
            sym: ClassSymbol::new("a/C"),
            decl: empty_class("C", ClassKind::Class),
            owner: None,
        };
        let mut diagnostics = Diagnostics::new();
        let bound = bind_class(&source, &scope, &mut diagnostics);

        assert_eq!(bound.superclass, Some(Type::Class(vec![SimpleClassTy { sym: ClassSymbol::new("java/lang/Object"), type_args: Vec::new(), annotations: Vec::new() }])));
        assert_eq!(bound.methods.len(), 1);
        assert_eq!(bound.methods[0].sym.name, "<init>");
        assert!(bound.methods[0].parameter_types.is_empty());
    }

    #[test]
    fn class_with_declared_constructor_gets_no_synthetic_one() {
        let (index, java_lang) = index_with_java_lang();
        let scope = CompoundTopLevelIndex { high_priority: vec![], wild_imports: vec![&java_lang], index: &index };
        let mut decl = (*empty_class("C", ClassKind::Class)).clone();
        decl.methods.push(MethodDeclNode {
            modifiers: vec![Modifier::Public],
            type_parameters: Vec::new(),
            return_type: TypeNode::Void,
            name: "<init>".to_owned(),
            is_constructor: true,
            parameters: Vec::new(),
            throws: Vec::new(),
            has_body: true,
            default_value: None,
        });
        let source = SourceBoundClass { sym: ClassSymbol::new("a/C"), decl: Rc::new(decl), owner: None };
        let mut diagnostics = Diagnostics::new();
        let bound = bind_class(&source, &scope, &mut diagnostics);

        assert_eq!(bound.methods.len(), 1);
    }

    #[test]
    fn enum_gets_values_value_of_and_hidden_constructor() {
        let (index, java_lang) = index_with_java_lang();
        let scope = CompoundTopLevelIndex { high_priority: vec![], wild_imports: vec![&java_lang], index: &index };
        let source = SourceBoundClass {
            sym: ClassSymbol::new("a/Color"),
            decl: empty_class("Color", ClassKind::Enum),
            owner: None,
        };
        let mut diagnostics = Diagnostics::new();
        let bound = bind_class(&source, &scope, &mut diagnostics);

        let names: Vec<&str> = bound.methods.iter().map(|m| m.sym.name.as_str()).collect();
        assert!(names.contains(&"<init>"));
        assert!(names.contains(&"values"));
        assert!(names.contains(&"valueOf"));

        let values = bound.methods.iter().find(|m| m.sym.name == "values").unwrap();
        assert_eq!(values.return_type, Type::Class(vec![SimpleClassTy { sym: ClassSymbol::new("a/Color"), type_args: Vec::new(), annotations: Vec::new() }]).into_array());
    }
}
