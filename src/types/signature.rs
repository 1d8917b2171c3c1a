//! JVMS §4.7.9.1 signature encoding.
//!
//! The teacher's `signitures` module was a stub (`type ClassSignature = String`);
//! lowering (§4.J) needs a real writer, since any class, field, or method
//! that uses a type variable or a parameterized type must carry a
//! `Signature` attribute in addition to its erased descriptor.
use itertools::Itertools;

use crate::sym::TyVarSymbol;

use super::primitive::PrimitiveType;
use super::ty::{SimpleClassTy, Type, TypeArgument, Wildcard};

/// Writes the JVMS §4.7.9.1 `JavaTypeSignature` for `ty`.
///
/// Primitive types and `void` encode identically to their descriptor form;
/// everything else gets the longer generics-aware encoding.
#[must_use]
pub fn type_signature(ty: &Type) -> String {
    match ty {
        Type::Primitive(p) => p.descriptor_str().to_owned(),
        Type::Void => "V".to_owned(),
        Type::Class(segments) => class_type_signature(segments),
        Type::Array(elem) => format!("[{}", type_signature(elem)),
        Type::TypeVar(tv) => format!("T{};", tv.name),
        Type::Wildcard(w) => wildcard_signature(w),
        Type::Intersection(parts) => parts.iter().map(type_signature).join(""),
        Type::Error => "Ljava/lang/Object;".to_owned(),
    }
}

fn class_type_signature(segments: &[SimpleClassTy]) -> String {
    let Some((first, rest)) = segments.split_first() else {
        return "Ljava/lang/Object;".to_owned();
    };
    let mut out = format!("L{}", first.sym.binary_name());
    out.push_str(&type_args_signature(&first.type_args));
    for segment in rest {
        out.push('.');
        out.push_str(segment.sym.simple_name());
        out.push_str(&type_args_signature(&segment.type_args));
    }
    out.push(';');
    out
}

fn type_args_signature(args: &[TypeArgument]) -> String {
    if args.is_empty() {
        return String::new();
    }
    let inner = args
        .iter()
        .map(|arg| match arg {
            TypeArgument::Type(ty) => type_signature(ty),
            TypeArgument::Wildcard(w) => wildcard_signature(w),
        })
        .join("");
    format!("<{inner}>")
}

fn wildcard_signature(w: &Wildcard) -> String {
    match w {
        Wildcard::Unbounded => "*".to_owned(),
        Wildcard::Upper(bound) => format!("+{}", type_signature(bound)),
        Wildcard::Lower(bound) => format!("-{}", type_signature(bound)),
    }
}

/// One entry of a type parameter's bound list: `T:Bound1:Bound2`.
///
/// The first bound is the class bound and may be empty (written as a bare
/// `:`) when a type variable's first bound is an interface, per JVMS
/// §4.7.9.1's `ClassBound` / `InterfaceBound` split.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeParameter {
    /// The type variable this entry declares.
    pub var: TyVarSymbol,
    /// The class bound, `None` when the first bound is an interface.
    pub class_bound: Option<Type>,
    /// Interface bounds, in declaration order.
    pub interface_bounds: Vec<Type>,
}

fn type_parameter_signature(param: &TypeParameter) -> String {
    let mut out = format!("{}:", param.var.name);
    if let Some(bound) = &param.class_bound {
        out.push_str(&type_signature(bound));
    }
    for bound in &param.interface_bounds {
        out.push(':');
        out.push_str(&type_signature(bound));
    }
    out
}

fn type_parameters_signature(params: &[TypeParameter]) -> String {
    if params.is_empty() {
        return String::new();
    }
    let inner = params.iter().map(type_parameter_signature).join("");
    format!("<{inner}>")
}

/// Writes the JVMS §4.7.9.1 `ClassSignature` for a class declaration.
///
/// `super_class` is `None` only for `java/lang/Object` itself.
#[must_use]
pub fn class_signature(
    type_parameters: &[TypeParameter],
    super_class: Option<&Type>,
    interfaces: &[Type],
) -> String {
    let mut out = type_parameters_signature(type_parameters);
    out.push_str(&super_class.map(type_signature).unwrap_or_else(|| {
        type_signature(&Type::class(crate::sym::ClassSymbol::new("java/lang/Object")))
    }));
    for iface in interfaces {
        out.push_str(&type_signature(iface));
    }
    out
}

/// Writes the JVMS §4.7.9.1 `MethodSignature` for a method declaration.
#[must_use]
pub fn method_signature(
    type_parameters: &[TypeParameter],
    parameters: &[Type],
    return_type: &Type,
    throws: &[Type],
) -> String {
    let mut out = type_parameters_signature(type_parameters);
    out.push('(');
    for param in parameters {
        out.push_str(&type_signature(param));
    }
    out.push(')');
    out.push_str(&type_signature(return_type));
    for t in throws {
        out.push('^');
        out.push_str(&type_signature(t));
    }
    out
}

/// Writes the JVMS §4.7.9.1 `FieldSignature` for a field declaration.
///
/// Identical to [`type_signature`], kept as its own function since the
/// `Signature` attribute writer (§4.B) dispatches on declaration kind, not
/// on type shape.
#[must_use]
pub fn field_signature(ty: &Type) -> String {
    type_signature(ty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sym::ClassSymbol;

    fn sym(name: &str) -> ClassSymbol {
        ClassSymbol::new(name)
    }

    #[test]
    fn primitive_signature_matches_descriptor() {
        assert_eq!(type_signature(&Type::Primitive(PrimitiveType::Int)), "I");
    }

    #[test]
    fn type_var_signature_is_t_name_semicolon() {
        let tv = TyVarSymbol::of_class(sym("a/B"), "T");
        assert_eq!(type_signature(&Type::TypeVar(tv)), "TT;");
    }

    #[test]
    fn generic_class_signature_has_angle_brackets() {
        let ty = Type::Class(vec![SimpleClassTy {
            sym: sym("java/util/List"),
            type_args: vec![TypeArgument::Type(Box::new(Type::class(sym(
                "java/lang/String",
            ))))],
            annotations: Vec::new(),
        }]);
        assert_eq!(
            type_signature(&ty),
            "Ljava/util/List<Ljava/lang/String;>;"
        );
    }

    #[test]
    fn wildcard_signatures() {
        assert_eq!(
            wildcard_signature(&Wildcard::Upper(Box::new(Type::class(sym("a/B"))))),
            "+La/B;"
        );
        assert_eq!(wildcard_signature(&Wildcard::Unbounded), "*");
    }

    #[test]
    fn method_signature_with_type_parameter() {
        let param = TypeParameter {
            var: TyVarSymbol::of_method(crate::sym::MethodSymbol::new(sym("a/B"), "m"), "T"),
            class_bound: Some(Type::class(sym("java/lang/Object"))),
            interface_bounds: Vec::new(),
        };
        let sig = method_signature(
            &[param],
            &[Type::TypeVar(TyVarSymbol::of_method(
                crate::sym::MethodSymbol::new(sym("a/B"), "m"),
                "T",
            ))],
            &Type::Void,
            &[],
        );
        assert_eq!(sig, "<T:Ljava/lang/Object;>(TT;)V");
    }

    #[test]
    fn class_signature_defaults_super_to_object() {
        let sig = class_signature(&[], None, &[]);
        assert_eq!(sig, "Ljava/lang/Object;");
    }
}
