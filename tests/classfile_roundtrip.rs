//! Writing a [`ClassFile`] and reading it back as a [`BytecodeBoundClass`]
//! must reproduce the same this-class, superclass, interfaces, and erased
//! member shapes that went in.

use std::str::FromStr;

use turbine::bound::BytecodeBoundClass;
use turbine::classfile::access_flags::{ClassAccessFlags, FieldAccessFlags, MethodAccessFlags};
use turbine::classfile::{ClassFile, FieldInfo, MethodInfo};
use turbine::classpath::parse_bytecode_bound_class;
use turbine::sym::ClassSymbol;
use turbine::types::descriptor::{FieldDescriptor, MethodDescriptor};
use turbine::types::primitive::PrimitiveType;

fn empty_field(name: &str, descriptor: FieldDescriptor) -> FieldInfo {
    FieldInfo {
        access_flags: FieldAccessFlags::PUBLIC,
        name: name.to_owned(),
        descriptor,
        constant_value: None,
        signature: None,
        is_synthetic: false,
        is_deprecated: false,
        visible_annotations: Vec::new(),
        invisible_annotations: Vec::new(),
        visible_type_annotations: Vec::new(),
        invisible_type_annotations: Vec::new(),
    }
}

fn empty_method(name: &str, descriptor: MethodDescriptor) -> MethodInfo {
    MethodInfo {
        access_flags: MethodAccessFlags::PUBLIC,
        name: name.to_owned(),
        descriptor,
        signature: None,
        exceptions: Vec::new(),
        is_synthetic: false,
        is_deprecated: false,
        visible_annotations: Vec::new(),
        invisible_annotations: Vec::new(),
        visible_type_annotations: Vec::new(),
        invisible_type_annotations: Vec::new(),
        annotation_default: None,
        visible_parameter_annotations: Vec::new(),
        invisible_parameter_annotations: Vec::new(),
    }
}

fn base_class(this: &str, super_name: Option<&str>) -> ClassFile {
    ClassFile {
        major_version: 61,
        access_flags: ClassAccessFlags::PUBLIC | ClassAccessFlags::SUPER,
        this_class: ClassSymbol::new(this),
        super_class: super_name.map(ClassSymbol::new),
        interfaces: Vec::new(),
        fields: Vec::new(),
        methods: Vec::new(),
        source_file: Some(format!("{}.java", this.rsplit('/').next().unwrap())),
        signature: None,
        inner_classes: Vec::new(),
        enclosing_method: None,
        nest_host: None,
        nest_members: Vec::new(),
        permitted_subclasses: Vec::new(),
        record_components: None,
        is_synthetic: false,
        is_deprecated: false,
        visible_annotations: Vec::new(),
        invisible_annotations: Vec::new(),
        visible_type_annotations: Vec::new(),
        invisible_type_annotations: Vec::new(),
        bootstrap_methods: Vec::new(),
    }
}

#[test]
fn bare_class_round_trips() {
    let class = base_class("a/Plain", Some("java/lang/Object"));
    let bytes = class.write();
    let bound = parse_bytecode_bound_class(&bytes).unwrap();
    assert_eq!(
        bound,
        BytecodeBoundClass {
            sym: ClassSymbol::new("a/Plain"),
            superclass: Some(ClassSymbol::new("java/lang/Object")),
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
        }
    );
}

#[test]
fn interfaces_and_members_round_trip() {
    let mut class = base_class("a/Widget", Some("java/lang/Object"));
    class.interfaces = vec![ClassSymbol::new("java/io/Serializable")];
    class.fields = vec![
        empty_field("count", FieldDescriptor::Base(PrimitiveType::Int)),
        empty_field(
            "name",
            FieldDescriptor::Object(ClassSymbol::new("java/lang/String")),
        ),
        empty_field(
            "tags",
            FieldDescriptor::Object(ClassSymbol::new("java/lang/String")).into_array(),
        ),
    ];
    class.methods = vec![empty_method(
        "rename",
        MethodDescriptor::from_str("(Ljava/lang/String;)V").unwrap(),
    )];

    let bound = parse_bytecode_bound_class(&class.write()).unwrap();
    assert_eq!(bound.sym, ClassSymbol::new("a/Widget"));
    assert_eq!(bound.interfaces, vec![ClassSymbol::new("java/io/Serializable")]);
    assert_eq!(bound.fields.len(), 3);
    assert_eq!(bound.fields[2].1.descriptor_string(), "[Ljava/lang/String;");
    assert_eq!(bound.methods, vec![(
        "rename".to_owned(),
        MethodDescriptor::from_str("(Ljava/lang/String;)V").unwrap()
    )]);
}

#[test]
fn object_itself_has_no_superclass() {
    let class = base_class("java/lang/Object", None);
    let bound = parse_bytecode_bound_class(&class.write()).unwrap();
    assert_eq!(bound.superclass, None);
}

#[test]
fn constant_value_attribute_does_not_break_the_reader() {
    let mut class = base_class("a/Consts", Some("java/lang/Object"));
    let mut field = empty_field("X", FieldDescriptor::Base(PrimitiveType::Int));
    field.access_flags |= FieldAccessFlags::STATIC | FieldAccessFlags::FINAL;
    field.constant_value = Some(turbine::types::const_value::Const::Int(42));
    class.fields = vec![field];

    let bound = parse_bytecode_bound_class(&class.write()).unwrap();
    assert_eq!(bound.fields, vec![("X".to_owned(), FieldDescriptor::Base(PrimitiveType::Int))]);
}
