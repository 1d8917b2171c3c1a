//! Erased JVMS §4.3 descriptors.
//!
//! A [`crate::types::Type`] carries generics and annotations; a descriptor
//! does not. Lowering (§4.J) always erases a bound `Type` down to a
//! [`FieldDescriptor`] or [`MethodDescriptor`] before it reaches the codec,
//! and the classpath reader goes the other way when it materializes a
//! [`crate::bound::BytecodeBoundClass`]'s members. Keeping erasure as its
//! own small grammar (rather than a method on `Type`) means the codec layer
//! never needs to know about generics at all.
use std::{fmt::Display, str::FromStr};

use itertools::Itertools;

use crate::sym::ClassSymbol;

use super::primitive::PrimitiveType;

/// An error indicating that a descriptor string is malformed.
#[derive(Debug, PartialEq, Eq, Clone, thiserror::Error)]
#[error("invalid descriptor: {0}")]
pub struct InvalidDescriptor(pub String);

/// An erased field (or local variable, or array element) type.
#[derive(Debug, PartialEq, Eq, Hash, Clone, derive_more::Display)]
pub enum FieldDescriptor {
    /// A primitive type.
    #[display("{_0}")]
    Base(PrimitiveType),
    /// A reference type (except arrays).
    #[display("{_0}")]
    Object(ClassSymbol),
    /// An array type.
    #[display("{_0}[]")]
    Array(Box<FieldDescriptor>),
}

impl FieldDescriptor {
    /// Wraps `self` in one array dimension.
    #[must_use]
    pub fn into_array(self) -> Self {
        Self::Array(Box::new(self))
    }

    /// The JVMS §4.3.2 descriptor string, e.g. `[Ljava/lang/String;`.
    #[must_use]
    pub fn descriptor_string(&self) -> String {
        match self {
            Self::Base(p) => p.descriptor_str().to_owned(),
            Self::Object(sym) => format!("L{};", sym.binary_name()),
            Self::Array(elem) => format!("[{}", elem.descriptor_string()),
        }
    }
}

impl FromStr for FieldDescriptor {
    type Err = InvalidDescriptor;

    fn from_str(descriptor: &str) -> Result<Self, Self::Err> {
        let mut chars = descriptor.chars();
        match chars.next() {
            Some('[') => FieldDescriptor::from_str(chars.as_str()).map(FieldDescriptor::into_array),
            Some('L') => {
                let name = chars.take_while_ref(|c| *c != ';').collect::<String>();
                match (chars.next(), chars.next()) {
                    (Some(';'), None) => Ok(Self::Object(ClassSymbol::new(name))),
                    _ => Err(InvalidDescriptor(descriptor.to_owned())),
                }
            }
            Some(c) if chars.next().is_none() => {
                PrimitiveType::try_from(c).map(Self::Base)
            }
            _ => Err(InvalidDescriptor(descriptor.to_owned())),
        }
    }
}

/// The return type of a method: either `void` or a [`FieldDescriptor`].
#[derive(Debug, PartialEq, Eq, Hash, Clone, derive_more::Display, derive_more::From)]
pub enum ReturnDescriptor {
    /// The method returns a value of this type.
    Some(FieldDescriptor),
    /// The method is declared `void`.
    #[display("void")]
    Void,
}

impl ReturnDescriptor {
    /// The JVMS descriptor fragment for the return type: `V` for void, or
    /// the field descriptor otherwise.
    #[must_use]
    pub fn descriptor_string(&self) -> String {
        match self {
            Self::Some(f) => f.descriptor_string(),
            Self::Void => "V".to_owned(),
        }
    }
}

impl FromStr for ReturnDescriptor {
    type Err = InvalidDescriptor;

    fn from_str(descriptor: &str) -> Result<Self, Self::Err> {
        if descriptor == "V" {
            Ok(Self::Void)
        } else {
            FieldDescriptor::from_str(descriptor).map(Self::Some)
        }
    }
}

/// The erased descriptor of a method: parameter types plus return type.
#[derive(Debug, PartialEq, Eq, Hash, Clone, derive_more::Display)]
#[display(
    "({}){return_type}",
    parameters.iter().map(FieldDescriptor::descriptor_string).join("")
)]
pub struct MethodDescriptor {
    /// The erased parameter types, in declaration order.
    pub parameters: Vec<FieldDescriptor>,
    /// The erased return type.
    pub return_type: ReturnDescriptor,
}

impl MethodDescriptor {
    /// The full JVMS §4.3.3 descriptor string, e.g. `(I)Ljava/lang/String;`.
    #[must_use]
    pub fn descriptor_string(&self) -> String {
        let params = self
            .parameters
            .iter()
            .map(FieldDescriptor::descriptor_string)
            .join("");
        format!("({params}){}", self.return_type.descriptor_string())
    }
}

impl FromStr for MethodDescriptor {
    type Err = InvalidDescriptor;

    fn from_str(descriptor: &str) -> Result<Self, Self::Err> {
        let remaining = descriptor.strip_prefix('(').ok_or_else(|| InvalidDescriptor(descriptor.to_owned()))?;
        let (parameters, remaining) = parse_params(remaining, descriptor)?;
        let return_type = ReturnDescriptor::from_str(remaining)?;
        Ok(Self {
            parameters,
            return_type,
        })
    }
}

fn parse_params<'a>(
    mut remaining: &'a str,
    whole: &str,
) -> Result<(Vec<FieldDescriptor>, &'a str), InvalidDescriptor> {
    let mut parameters = Vec::new();
    loop {
        if let Some(rest) = remaining.strip_prefix(')') {
            return Ok((parameters, rest));
        }
        if remaining.is_empty() {
            return Err(InvalidDescriptor(whole.to_owned()));
        }
        let (param, rest) = parse_one_field_type(remaining, whole)?;
        parameters.push(param);
        remaining = rest;
    }
}

fn parse_one_field_type<'a>(
    input: &'a str,
    whole: &str,
) -> Result<(FieldDescriptor, &'a str), InvalidDescriptor> {
    let mut chars = input.chars();
    match chars.next() {
        Some('[') => {
            let (inner, rest) = parse_one_field_type(chars.as_str(), whole)?;
            Ok((inner.into_array(), rest))
        }
        Some('L') => {
            let rest_str = chars.as_str();
            let (name, rest) = rest_str
                .split_once(';')
                .ok_or_else(|| InvalidDescriptor(whole.to_owned()))?;
            Ok((FieldDescriptor::Object(ClassSymbol::new(name)), rest))
        }
        Some(c) => PrimitiveType::try_from(c)
            .map(|p| (FieldDescriptor::Base(p), chars.as_str()))
            .map_err(|_| InvalidDescriptor(whole.to_owned())),
        None => Err(InvalidDescriptor(whole.to_owned())),
    }
}

impl Display for FieldDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.descriptor_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_descriptor_round_trip_primitive() {
        assert_eq!(
            FieldDescriptor::from_str("I"),
            Ok(FieldDescriptor::Base(PrimitiveType::Int))
        );
    }

    #[test]
    fn field_descriptor_round_trip_object() {
        let d = FieldDescriptor::from_str("Ljava/lang/String;").unwrap();
        assert_eq!(d.descriptor_string(), "Ljava/lang/String;");
    }

    #[test]
    fn field_descriptor_round_trip_array() {
        let d = FieldDescriptor::from_str("[[I").unwrap();
        assert_eq!(d.descriptor_string(), "[[I");
        assert_eq!(
            d,
            FieldDescriptor::Base(PrimitiveType::Int)
                .into_array()
                .into_array()
        );
    }

    #[test]
    fn method_descriptor_round_trip() {
        let d = MethodDescriptor::from_str("(ILjava/lang/String;)V").unwrap();
        assert_eq!(d.parameters.len(), 2);
        assert_eq!(d.return_type, ReturnDescriptor::Void);
        assert_eq!(d.descriptor_string(), "(ILjava/lang/String;)V");
    }

    #[test]
    fn method_descriptor_no_params() {
        let d = MethodDescriptor::from_str("()I").unwrap();
        assert!(d.parameters.is_empty());
        assert_eq!(d.return_type, ReturnDescriptor::Some(FieldDescriptor::Base(PrimitiveType::Int)));
    }

    #[test]
    fn rejects_missing_paren() {
        assert!(MethodDescriptor::from_str("I)V").is_err());
    }

    #[test]
    fn rejects_missing_semicolon() {
        assert!(MethodDescriptor::from_str("(Ljava/lang/StringI)V").is_err());
    }

    #[test]
    fn rejects_empty() {
        assert!(MethodDescriptor::from_str("").is_err());
    }
}
