//! The type system: primitives, erased descriptors, the generic `Type` IR,
//! signature encoding, and constant/annotation values.

pub mod const_value;
pub mod descriptor;
pub mod primitive;
pub mod signature;
pub mod ty;

pub use const_value::{Const, Value};
pub use descriptor::{FieldDescriptor, InvalidDescriptor, MethodDescriptor, ReturnDescriptor};
pub use primitive::PrimitiveType;
pub use ty::{SimpleClassTy, Type, TypeAnnotation, TypeArgument, Wildcard};
