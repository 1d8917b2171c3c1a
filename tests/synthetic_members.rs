//! Default constructor and enum member synthesis (§4.G), carried through to
//! lowering's `ACC_SYNTHETIC`/`Synthetic`-attribute marking (§4.J).

use turbine::ast::{ClassDeclNode, ClassKind};
use turbine::bound::SourceBoundClass;
use turbine::canonicalize::DisambiguatedAnnotations;
use turbine::diagnostic::Diagnostics;
use turbine::index::{CompoundTopLevelIndex, TopLevelIndex, WildImportScope};
use turbine::lower::lower_method;
use turbine::sym::ClassSymbol;
use turbine::type_binder::bind_class;

fn empty_class(name: &str, kind: ClassKind) -> ClassDeclNode {
    ClassDeclNode {
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
    }
}

fn java_lang_scope() -> (TopLevelIndex, WildImportScope) {
    let mut index = TopLevelIndex::new();
    index.insert(ClassSymbol::new("java/lang/Object"));
    index.insert(ClassSymbol::new("java/lang/String"));
    let mut java_lang = WildImportScope::new();
    java_lang.add("java/lang");
    (index, java_lang)
}

/// A class declaring no constructor gets exactly one synthesized
/// `ACC_SYNTHETIC` no-arg `<init>`.
#[test]
fn default_constructor_is_synthesized_and_marked_synthetic() {
    let (index, java_lang) = java_lang_scope();
    let scope = CompoundTopLevelIndex { high_priority: vec![], wild_imports: vec![&java_lang], index: &index };
    let source = SourceBoundClass {
        sym: ClassSymbol::new("a/Plain"),
        decl: std::rc::Rc::new(empty_class("Plain", ClassKind::Class)),
        owner: None,
    };
    let mut diagnostics = Diagnostics::new();
    let bound = bind_class(&source, &scope, &mut diagnostics);

    assert_eq!(bound.methods.len(), 1);
    let ctor = &bound.methods[0];
    assert_eq!(ctor.sym.name, "<init>");

    let annotations = DisambiguatedAnnotations::default();
    let info = lower_method(ctor, ClassKind::Class, true, &annotations, &|_| false);
    assert!(info.is_synthetic, "javac marks the implicit default constructor synthetic");
    assert_eq!(info.descriptor.descriptor_string(), "()V");
}

/// An enum with no declared constructor gets `values`, `valueOf`, and a
/// hidden two-argument `<init>` -- the first two synthetic, the last one
/// deliberately not (it is never absent from a real enum's `.class` file).
#[test]
fn enum_synthesis_marks_values_and_value_of_synthetic_but_not_the_constructor() {
    let (index, java_lang) = java_lang_scope();
    let scope = CompoundTopLevelIndex { high_priority: vec![], wild_imports: vec![&java_lang], index: &index };
    let source = SourceBoundClass {
        sym: ClassSymbol::new("a/Suit"),
        decl: std::rc::Rc::new(empty_class("Suit", ClassKind::Enum)),
        owner: None,
    };
    let mut diagnostics = Diagnostics::new();
    let bound = bind_class(&source, &scope, &mut diagnostics);

    let annotations = DisambiguatedAnnotations::default();
    for method in &bound.methods {
        let is_synthetic_member = method.sym.name != "<init>";
        let info = lower_method(method, ClassKind::Enum, is_synthetic_member, &annotations, &|_| false);
        match method.sym.name.as_str() {
            "<init>" => {
                assert!(!info.is_synthetic, "the enum constructor itself is never synthetic");
                assert_eq!(info.descriptor.descriptor_string(), "(Ljava/lang/String;I)V");
            }
            "values" => {
                assert!(info.is_synthetic);
                assert_eq!(info.descriptor.descriptor_string(), "()[La/Suit;");
            }
            "valueOf" => {
                assert!(info.is_synthetic);
                assert_eq!(info.descriptor.descriptor_string(), "(Ljava/lang/String;)La/Suit;");
            }
            other => panic!("unexpected synthesized member {other}"),
        }
    }
}

/// A class that already declares a constructor gets no synthesized one.
#[test]
fn declared_constructor_suppresses_synthesis() {
    let (index, java_lang) = java_lang_scope();
    let scope = CompoundTopLevelIndex { high_priority: vec![], wild_imports: vec![&java_lang], index: &index };
    let mut decl = empty_class("HasCtor", ClassKind::Class);
    decl.methods.push(turbine::ast::MethodDeclNode {
        modifiers: vec![turbine::ast::Modifier::Public],
        type_parameters: Vec::new(),
        return_type: turbine::ast::TypeNode::Void,
        name: "<init>".to_owned(),
        is_constructor: true,
        parameters: Vec::new(),
        throws: Vec::new(),
        has_body: true,
        default_value: None,
    });
    let source = SourceBoundClass { sym: ClassSymbol::new("a/HasCtor"), decl: std::rc::Rc::new(decl), owner: None };
    let mut diagnostics = Diagnostics::new();
    let bound = bind_class(&source, &scope, &mut diagnostics);
    assert_eq!(bound.methods.len(), 1);
}
