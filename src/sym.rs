//! Symbols: value-typed identifiers for classes, members, and type variables.
//!
//! Symbols carry no bound information themselves; they are keys into an
//! [`crate::env::Env`]. Equality is by value, mirroring
//! [`crate::classfile::ClassRef`] in the codec, which is the same idea one
//! layer down (a binary name with no attached `Info`).
use std::fmt::Display;

/// The binary name of a class, JVMS §4.2.1 (`java/util/Map$Entry`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassSymbol {
    binary_name: String,
}

impl ClassSymbol {
    /// Creates a class symbol from its binary name.
    ///
    /// `binary_name` must already be slash-separated and use `$` between an
    /// outer and inner simple name; this constructor does no validation
    /// beyond that, mirroring `ClassRef::new` in the codec.
    #[must_use]
    pub fn new(binary_name: impl Into<String>) -> Self {
        Self {
            binary_name: binary_name.into(),
        }
    }

    /// The binary name, e.g. `java/util/Map$Entry`.
    #[must_use]
    pub fn binary_name(&self) -> &str {
        &self.binary_name
    }

    /// The package name derived from the binary name, e.g. `java/util`.
    /// The unnamed package yields an empty string.
    #[must_use]
    pub fn package_name(&self) -> &str {
        match self.binary_name.rfind('/') {
            Some(idx) => &self.binary_name[..idx],
            None => "",
        }
    }

    /// The simple name: everything after the last `/` or `$`.
    #[must_use]
    pub fn simple_name(&self) -> &str {
        let after_slash = match self.binary_name.rfind('/') {
            Some(idx) => &self.binary_name[idx + 1..],
            None => &self.binary_name,
        };
        match after_slash.rfind('$') {
            Some(idx) => &after_slash[idx + 1..],
            None => after_slash,
        }
    }

    /// Mints the symbol for a class nested directly inside `self` with the
    /// given simple name, per JVMS §4.2.1 (`Outer$Inner`).
    #[must_use]
    pub fn nested(&self, simple_name: &str) -> Self {
        Self::new(format!("{}${simple_name}", self.binary_name))
    }

    /// `true` if `self` is in the same nest family as `other`, i.e. one is
    /// a prefix of the other split on `$`. Used by the disambiguator to
    /// decide default nest-host membership.
    #[must_use]
    pub fn is_member_of(&self, outer: &ClassSymbol) -> bool {
        self.binary_name
            .strip_prefix(outer.binary_name.as_str())
            .is_some_and(|rest| rest.starts_with('$'))
    }
}

impl Display for ClassSymbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.binary_name)
    }
}

/// A JPMS module name, e.g. `java.base`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModuleSymbol {
    name: String,
}

impl ModuleSymbol {
    /// Creates a module symbol from its name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// The module's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Display for ModuleSymbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A field, identified by its owner and simple name.
///
/// Unlike methods, fields cannot be overloaded, so the symbol alone
/// disambiguates within one class.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldSymbol {
    /// The class that declares the field.
    pub owner: ClassSymbol,
    /// The field's simple name.
    pub name: String,
}

impl FieldSymbol {
    /// Creates a field symbol.
    #[must_use]
    pub fn new(owner: ClassSymbol, name: impl Into<String>) -> Self {
        Self {
            owner,
            name: name.into(),
        }
    }
}

impl Display for FieldSymbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.owner, self.name)
    }
}

/// A method, identified by its owner and simple name.
///
/// Methods are not overload-distinguished at the symbol level: `java/lang/String.valueOf`
/// names every overload of `valueOf` in `String`. Resolution that needs a
/// specific overload compares descriptors separately, after looking up all
/// methods under this symbol.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodSymbol {
    /// The class that declares the method.
    pub owner: ClassSymbol,
    /// The method's simple name, including `<init>` and `<clinit>`.
    pub name: String,
}

impl MethodSymbol {
    /// Creates a method symbol.
    #[must_use]
    pub fn new(owner: ClassSymbol, name: impl Into<String>) -> Self {
        Self {
            owner,
            name: name.into(),
        }
    }

    /// The symbol for the instance initializer of `owner`.
    #[must_use]
    pub fn init(owner: ClassSymbol) -> Self {
        Self::new(owner, "<init>")
    }
}

impl Display for MethodSymbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.owner, self.name)
    }
}

/// The owner of a type variable: either a class or a method, since both
/// `class Foo<T>` and `<T> void bar(T t)` introduce type variables.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TyVarOwner {
    /// A class-level type parameter.
    Class(ClassSymbol),
    /// A method-level type parameter.
    Method(MethodSymbol),
}

/// A type variable, identified by its owner and declared name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TyVarSymbol {
    /// The class or method that declares the type variable.
    pub owner: TyVarOwner,
    /// The declared name, e.g. `T`.
    pub name: String,
}

impl TyVarSymbol {
    /// Creates a type variable symbol owned by a class.
    #[must_use]
    pub fn of_class(owner: ClassSymbol, name: impl Into<String>) -> Self {
        Self {
            owner: TyVarOwner::Class(owner),
            name: name.into(),
        }
    }

    /// Creates a type variable symbol owned by a method.
    #[must_use]
    pub fn of_method(owner: MethodSymbol, name: impl Into<String>) -> Self {
        Self {
            owner: TyVarOwner::Method(owner),
            name: name.into(),
        }
    }
}

impl Display for TyVarSymbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binary_name_round_trips_package_and_simple_name() {
        let sym = ClassSymbol::new("java/util/Map$Entry");
        assert_eq!(sym.package_name(), "java/util");
        assert_eq!(sym.simple_name(), "Entry");
    }

    #[test]
    fn unnamed_package_has_empty_package_name() {
        let sym = ClassSymbol::new("Top");
        assert_eq!(sym.package_name(), "");
        assert_eq!(sym.simple_name(), "Top");
    }

    #[test]
    fn nested_mints_dollar_separated_name() {
        let outer = ClassSymbol::new("a/Outer");
        let inner = outer.nested("Inner");
        assert_eq!(inner.binary_name(), "a/Outer$Inner");
        assert!(inner.is_member_of(&outer));
    }

    #[test]
    fn is_member_of_rejects_unrelated_prefix() {
        let a = ClassSymbol::new("a/OuterMore");
        let outer = ClassSymbol::new("a/Outer");
        assert!(!a.is_member_of(&outer));
    }
}
