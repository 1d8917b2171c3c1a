//! Hand-built compilation units standing in for a real `.java` parse.
//!
//! No parser ships with this crate (see [`turbine::collab::Parser`]), so this
//! demo constructs a handful of [`CompilationUnit`]s directly, the same
//! shapes a parser would hand the driver.

use turbine::ast::{
    ClassDeclNode, ClassKind, CompilationUnit, ExprNode, FieldDeclNode, ImportDeclNode,
    MethodDeclNode, Modifier, ParameterNode, QualifiedName, TypeNode,
};
use turbine::types::const_value::Const;
use turbine::types::primitive::PrimitiveType;

fn name(segments: &[&str]) -> QualifiedName {
    QualifiedName::new(segments.iter().map(|s| (*s).to_owned()).collect())
}

fn class_type(simple: &str) -> TypeNode {
    TypeNode::Class {
        name: name(&[simple]),
        type_args: Vec::new(),
    }
}

fn empty_class(kind: ClassKind, simple: &str) -> ClassDeclNode {
    ClassDeclNode {
        modifiers: vec![Modifier::Public],
        kind,
        name: simple.to_owned(),
        type_parameters: Vec::new(),
        extends: Vec::new(),
        implements: Vec::new(),
        record_components: Vec::new(),
        fields: Vec::new(),
        methods: Vec::new(),
        nested_classes: Vec::new(),
    }
}

fn unit(package: Option<&str>, types: Vec<ClassDeclNode>) -> CompilationUnit {
    CompilationUnit {
        package: package.map(|p| name(&p.split('.').collect::<Vec<_>>())),
        package_annotations: Vec::new(),
        imports: vec![ImportDeclNode::OnDemand(name(&["java", "util"]))],
        types,
    }
}

/// A plain class: a constant field, an instance field, a no-arg constructor
/// implicit default, a getter, and a nested inner class.
fn plain_class() -> CompilationUnit {
    let mut greeting = empty_class(ClassKind::Class, "Greeting");
    greeting.fields = vec![
        FieldDeclNode {
            modifiers: vec![Modifier::Public, Modifier::Static, Modifier::Final],
            ty: TypeNode::Primitive(PrimitiveType::Int),
            name: "DEFAULT_VOLUME".to_owned(),
            initializer: Some(ExprNode::Literal(Const::Int(11))),
        },
        FieldDeclNode {
            modifiers: vec![Modifier::Private],
            ty: class_type("String"),
            name: "message".to_owned(),
            initializer: None,
        },
    ];
    greeting.methods = vec![MethodDeclNode {
        modifiers: vec![Modifier::Public],
        type_parameters: Vec::new(),
        return_type: class_type("String"),
        name: "message".to_owned(),
        is_constructor: false,
        parameters: Vec::new(),
        throws: Vec::new(),
        has_body: true,
        default_value: None,
    }];
    let mut inner = empty_class(ClassKind::Class, "Tuning");
    inner.methods = vec![MethodDeclNode {
        modifiers: vec![Modifier::Public],
        type_parameters: Vec::new(),
        return_type: TypeNode::Void,
        name: "<init>".to_owned(),
        is_constructor: true,
        parameters: Vec::new(),
        throws: Vec::new(),
        has_body: true,
        default_value: None,
    }];
    greeting.nested_classes = vec![inner];
    unit(Some("demo.greeting"), vec![greeting])
}

/// An interface with one abstract method and one constant field.
fn interface() -> CompilationUnit {
    let mut speaker = empty_class(ClassKind::Interface, "Speaker");
    speaker.fields = vec![FieldDeclNode {
        modifiers: vec![Modifier::Public, Modifier::Static, Modifier::Final],
        ty: class_type("String"),
        name: "DEFAULT_LANGUAGE".to_owned(),
        initializer: Some(ExprNode::Literal(Const::String("en".to_owned()))),
    }];
    speaker.methods = vec![MethodDeclNode {
        modifiers: Vec::new(),
        type_parameters: Vec::new(),
        return_type: TypeNode::Void,
        name: "speak".to_owned(),
        is_constructor: false,
        parameters: vec![ParameterNode {
            modifiers: Vec::new(),
            ty: class_type("String"),
            name: "phrase".to_owned(),
            is_varargs: false,
        }],
        throws: Vec::new(),
        has_body: false,
        default_value: None,
    }];
    unit(Some("demo.greeting"), vec![speaker])
}

/// An enum whose constants are represented (per the AST) as fields.
fn an_enum() -> CompilationUnit {
    let mut volume = empty_class(ClassKind::Enum, "Volume");
    volume.fields = vec![
        FieldDeclNode {
            modifiers: Vec::new(),
            ty: class_type("Volume"),
            name: "QUIET".to_owned(),
            initializer: None,
        },
        FieldDeclNode {
            modifiers: Vec::new(),
            ty: class_type("Volume"),
            name: "LOUD".to_owned(),
            initializer: None,
        },
    ];
    unit(Some("demo.greeting"), vec![volume])
}

/// Every named fixture this demo can emit, in a stable order.
pub fn all() -> Vec<(&'static str, CompilationUnit)> {
    vec![
        ("Greeting", plain_class()),
        ("Speaker", interface()),
        ("Volume", an_enum()),
    ]
}
