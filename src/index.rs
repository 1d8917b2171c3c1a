//! Name resolution scopes and the top-level class index.
//!
//! `TopLevelIndex` answers "does a class with this qualified name exist at
//! all" (built once, from every classpath and sourcepath entry).  `Scope`
//! answers "what does this simple name mean here" -- the imports, single
//! and wildcard, plus the member and package scopes JLS §6.3 stacks in a
//! fixed priority order at every point in a source file.
use std::collections::HashMap;

use crate::sym::ClassSymbol;

/// What a name resolved to, or didn't.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupResult {
    /// The name refers to this class.
    Type(ClassSymbol),
    /// The name is a (possibly partial) package prefix, not yet a class.
    Package,
    /// Nothing in this scope claims the name.
    NotFound,
}

/// A trie over package-qualified simple names, used to tell a package
/// prefix from an unresolvable name during qualified-name resolution
/// (JLS §6.5.3).
#[derive(Debug, Default)]
pub struct TopLevelIndex {
    classes: HashMap<String, ClassSymbol>,
    packages: HashMap<String, ()>,
}

impl TopLevelIndex {
    /// An empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a known class and every package prefix of its name.
    pub fn insert(&mut self, class: ClassSymbol) {
        let mut prefix = String::new();
        for segment in class.package_name().split('/').filter(|s| !s.is_empty()) {
            if !prefix.is_empty() {
                prefix.push('/');
            }
            prefix.push_str(segment);
            self.packages.insert(prefix.clone(), ());
        }
        self.classes.insert(class.binary_name().to_owned(), class);
    }

    /// Resolves a fully-qualified binary name.
    #[must_use]
    pub fn lookup(&self, qualified_name: &str) -> LookupResult {
        if let Some(class) = self.classes.get(qualified_name) {
            return LookupResult::Type(class.clone());
        }
        if self.packages.contains_key(qualified_name) {
            return LookupResult::Package;
        }
        LookupResult::NotFound
    }
}

/// One level of name-resolution scope, tried in JLS §6.5.5.1 priority order:
/// single-type imports and in-scope declarations outrank on-demand (wildcard)
/// imports.
pub trait Scope {
    /// Resolves `simple_name` within this scope alone.
    fn resolve(&self, simple_name: &str) -> LookupResult;
}

/// Single-type imports: `import java.util.Map;` binds `Map` to exactly one
/// class, shadowing anything an on-demand import would otherwise supply.
#[derive(Debug, Default)]
pub struct ImportScope {
    imports: HashMap<String, ClassSymbol>,
}

impl ImportScope {
    /// An empty import scope.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a single-type import under its simple name.
    pub fn add(&mut self, simple_name: impl Into<String>, class: ClassSymbol) {
        self.imports.insert(simple_name.into(), class);
    }
}

impl Scope for ImportScope {
    fn resolve(&self, simple_name: &str) -> LookupResult {
        self.imports
            .get(simple_name)
            .cloned()
            .map_or(LookupResult::NotFound, LookupResult::Type)
    }
}

/// On-demand imports: `import java.util.*;`. Resolution here means
/// "look the name up in each named package, in import order, and take the
/// first class that exists" -- this scope only records the candidate
/// packages; the actual lookup is against a [`TopLevelIndex`].
#[derive(Debug, Default)]
pub struct WildImportScope {
    packages: Vec<String>,
}

impl WildImportScope {
    /// An empty on-demand-import scope.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an on-demand-imported package, in declaration order.
    pub fn add(&mut self, package: impl Into<String>) {
        self.packages.push(package.into());
    }

    /// Resolves `simple_name` against the index, trying each imported
    /// package in order.
    #[must_use]
    pub fn resolve_against(&self, simple_name: &str, index: &TopLevelIndex) -> LookupResult {
        for package in &self.packages {
            let candidate = format!("{package}/{simple_name}");
            if let found @ LookupResult::Type(_) = index.lookup(&candidate) {
                return found;
            }
        }
        LookupResult::NotFound
    }
}

/// Member types of the class currently being bound and its supertypes,
/// visible under their simple names without qualification (JLS §6.5.5.1).
#[derive(Debug, Default)]
pub struct MemberImportIndex {
    members: HashMap<String, ClassSymbol>,
}

impl MemberImportIndex {
    /// An empty member scope.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a visible member type.
    pub fn add(&mut self, simple_name: impl Into<String>, class: ClassSymbol) {
        self.members.insert(simple_name.into(), class);
    }
}

impl Scope for MemberImportIndex {
    fn resolve(&self, simple_name: &str) -> LookupResult {
        self.members
            .get(simple_name)
            .cloned()
            .map_or(LookupResult::NotFound, LookupResult::Type)
    }
}

/// A fixed-priority chain of scopes: single imports and member types first,
/// then on-demand imports, then the top-level index itself for
/// same-package and java.lang lookups.
pub struct CompoundTopLevelIndex<'a> {
    /// Tried first, in order: single-type imports, then visible members.
    pub high_priority: Vec<&'a dyn Scope>,
    /// Tried after `high_priority` fails, resolved against `index`.
    pub wild_imports: Vec<&'a WildImportScope>,
    /// The full top-level index, for same-package and absolute lookups.
    pub index: &'a TopLevelIndex,
}

impl CompoundTopLevelIndex<'_> {
    /// Resolves `simple_name` through the whole priority chain.
    #[must_use]
    pub fn resolve(&self, simple_name: &str) -> LookupResult {
        for scope in &self.high_priority {
            if let found @ LookupResult::Type(_) = scope.resolve(simple_name) {
                return found;
            }
        }
        for wild in &self.wild_imports {
            if let found @ LookupResult::Type(_) = wild.resolve_against(simple_name, self.index) {
                return found;
            }
        }
        LookupResult::NotFound
    }
}
