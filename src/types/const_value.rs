//! Constant and annotation-argument values (JVMS §4.4, §4.7.16.1).
//!
//! [`ConstEvaluator`](crate::const_eval) folds a constant-expression AST
//! node down to a [`Value`]; annotation arguments share the same shape with
//! two extra cases (nested annotations and enum constants) that plain
//! constant expressions cannot produce.
use crate::sym::ClassSymbol;

/// A compile-time constant of one of the eight primitive types or `String`.
///
/// This is what JLS §15.28 constant expressions fold to, and what a
/// `ConstantValue` attribute (JVMS §4.7.2) stores.
#[derive(Debug, Clone, PartialEq)]
pub enum Const {
    /// A `boolean` constant. Folded to `int` for `ConstantValue` purposes
    /// (§4.7.2), but kept distinct here so annotation typechecking (§4.H)
    /// can tell a `boolean` argument from an `int` one.
    Boolean(bool),
    /// A `char` constant.
    Char(u16),
    /// A `byte` constant.
    Byte(i8),
    /// A `short` constant.
    Short(i16),
    /// An `int` constant.
    Int(i32),
    /// A `long` constant.
    Long(i64),
    /// A `float` constant.
    Float(f32),
    /// A `double` constant.
    Double(f64),
    /// A `String` constant.
    String(String),
}

impl Const {
    /// The JVMS §4.4 constant-pool tag this constant would be written as by
    /// the `ConstantValue` attribute, after `boolean`/`byte`/`char`/`short`
    /// promotion to `int` (JVMS §4.7.2).
    #[must_use]
    pub fn constant_value_tag(&self) -> &'static str {
        match self {
            Self::Boolean(_) | Self::Byte(_) | Self::Short(_) | Self::Char(_) | Self::Int(_) => {
                "Integer"
            }
            Self::Long(_) => "Long",
            Self::Float(_) => "Float",
            Self::Double(_) => "Double",
            Self::String(_) => "String",
        }
    }

    /// The promoted `int` bit pattern used when this constant is written as
    /// a JVMS `CONSTANT_Integer_info`, per §4.7.2's narrowing-is-forbidden,
    /// widening-to-int rule for `boolean`/`byte`/`char`/`short`.
    #[must_use]
    pub fn as_promoted_int(&self) -> Option<i32> {
        match *self {
            Self::Boolean(b) => Some(i32::from(b)),
            Self::Byte(b) => Some(i32::from(b)),
            Self::Short(s) => Some(i32::from(s)),
            Self::Char(c) => Some(i32::from(c)),
            Self::Int(i) => Some(i),
            _ => None,
        }
    }
}

/// A value supplied as an annotation element (JVMS §4.7.16.1).
///
/// A superset of [`Const`]: annotations can also nest other annotations,
/// reference enum constants, and hold arrays, none of which a plain
/// constant expression can produce.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A constant-expression value.
    Const(Const),
    /// A `Class` literal argument, e.g. `@Anno(String.class)`.
    Class(ClassSymbol),
    /// An enum constant argument, e.g. `@Anno(Day.MONDAY)`.
    EnumConstant {
        /// The enum class.
        enum_type: ClassSymbol,
        /// The constant's name.
        const_name: String,
    },
    /// A nested annotation argument.
    Annotation {
        /// The nested annotation's interface.
        annotation_type: ClassSymbol,
        /// Name/value pairs, in source order.
        elements: Vec<(String, Value)>,
    },
    /// An array argument. JVMS permits nesting only one level (array
    /// elements cannot themselves be arrays), but that invariant is
    /// enforced by the binder, not the type.
    Array(Vec<Value>),
}

impl From<Const> for Value {
    fn from(c: Const) -> Self {
        Self::Const(c)
    }
}
