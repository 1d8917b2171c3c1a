//! The eight JVM primitive types, shared by the generic [`crate::types::Type`]
//! IR and the erased [`crate::types::descriptor`] encoding.
use std::{fmt::Display, str::FromStr};

use super::descriptor::InvalidDescriptor;

/// A primitive type in Java.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
#[cfg_attr(test, derive(proptest_derive::Arbitrary))]
pub enum PrimitiveType {
    /// The `boolean` type.
    Boolean,
    /// The `char` type.
    Char,
    /// The `float` type.
    Float,
    /// The `double` type.
    Double,
    /// The `byte` type.
    Byte,
    /// The `short` type.
    Short,
    /// The `int` type.
    Int,
    /// The `long` type.
    Long,
}

impl PrimitiveType {
    /// The single-character JVMS §4.3.2 descriptor for this primitive.
    #[must_use]
    pub const fn descriptor_str(self) -> &'static str {
        match self {
            Self::Boolean => "Z",
            Self::Char => "C",
            Self::Float => "F",
            Self::Double => "D",
            Self::Byte => "B",
            Self::Short => "S",
            Self::Int => "I",
            Self::Long => "J",
        }
    }

    /// `true` for `long` and `double`, which occupy two local-variable
    /// slots and two constant-pool entries.
    #[must_use]
    pub const fn is_wide(self) -> bool {
        matches!(self, Self::Long | Self::Double)
    }
}

impl Display for PrimitiveType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Boolean => write!(f, "boolean"),
            Self::Char => write!(f, "char"),
            Self::Float => write!(f, "float"),
            Self::Double => write!(f, "double"),
            Self::Byte => write!(f, "byte"),
            Self::Short => write!(f, "short"),
            Self::Int => write!(f, "int"),
            Self::Long => write!(f, "long"),
        }
    }
}

impl TryFrom<char> for PrimitiveType {
    type Error = InvalidDescriptor;

    fn try_from(descriptor: char) -> Result<Self, Self::Error> {
        match descriptor {
            'Z' => Ok(Self::Boolean),
            'C' => Ok(Self::Char),
            'F' => Ok(Self::Float),
            'D' => Ok(Self::Double),
            'B' => Ok(Self::Byte),
            'S' => Ok(Self::Short),
            'I' => Ok(Self::Int),
            'J' => Ok(Self::Long),
            unexpected => Err(InvalidDescriptor(unexpected.to_string())),
        }
    }
}

impl FromStr for PrimitiveType {
    type Err = InvalidDescriptor;

    fn from_str(descriptor: &str) -> Result<Self, Self::Err> {
        let mut chars = descriptor.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::try_from(c),
            _ => Err(InvalidDescriptor(descriptor.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_round_trips() {
        for p in [
            PrimitiveType::Boolean,
            PrimitiveType::Char,
            PrimitiveType::Float,
            PrimitiveType::Double,
            PrimitiveType::Byte,
            PrimitiveType::Short,
            PrimitiveType::Int,
            PrimitiveType::Long,
        ] {
            let s = p.descriptor_str();
            assert_eq!(PrimitiveType::from_str(s), Ok(p));
        }
    }

    #[test]
    fn wide_types_are_long_and_double() {
        assert!(PrimitiveType::Long.is_wide());
        assert!(PrimitiveType::Double.is_wide());
        assert!(!PrimitiveType::Int.is_wide());
    }

    #[test]
    fn rejects_unknown_letter() {
        assert!(PrimitiveType::from_str("Q").is_err());
        assert!(PrimitiveType::from_str("II").is_err());
    }
}
