//! Hierarchy binding (§4.F): resolving `extends`/`implements` to symbols.
//!
//! Runs as a [`crate::env::Completer`] over [`crate::env::LazyEnv`], so a
//! class whose supertype is still mid-completion (an inheritance cycle)
//! reports [`crate::env::LazyBindingError::Cycle`] instead of recursing
//! forever -- the same shape as the teacher's `CachingClassLoader`
//! completer, applied to supertype resolution instead of class loading.
use crate::ast::{ClassDeclNode, ClassKind, TypeNode};
use crate::bound::{SourceBoundClass, SourceHeaderBoundClass};
use crate::collab::ProcessingHost;
use crate::diagnostic::{Diagnostic, Diagnostics, ErrorKind};
use crate::env::{Completer, LazyBindingError, LazyEnv};
use crate::index::{CompoundTopLevelIndex, LookupResult};
use crate::sym::ClassSymbol;

/// Resolves a [`TypeNode`]'s bare name to a [`ClassSymbol`] via `scope`,
/// ignoring any type arguments (hierarchy binding only needs the erasure).
fn resolve_supertype_name(
    ty: &TypeNode,
    scope: &CompoundTopLevelIndex,
) -> Option<ClassSymbol> {
    match ty {
        TypeNode::Class { name, .. } => match scope.resolve(name.simple_name()) {
            LookupResult::Type(sym) => Some(sym),
            _ => None,
        },
        _ => None,
    }
}

/// The completer [`LazyEnv<ClassSymbol, SourceHeaderBoundClass, _>`] runs
/// for each class symbol.
pub struct HierarchyCompleter<'a, H> {
    /// Every preprocessed source class, keyed for lookup by symbol.
    pub source_classes: &'a [SourceBoundClass],
    /// Resolves a name to a symbol at the point a class's `extends`/
    /// `implements` clause is written; callers build one
    /// `CompoundTopLevelIndex` per class since imports are per-compilation-unit.
    pub scope_for: &'a dyn Fn(&ClassSymbol) -> CompoundTopLevelIndex<'a>,
    /// Supplies classpath ABI for symbols not found in `source_classes`.
    pub host: &'a H,
}

impl<H: ProcessingHost> Completer<ClassSymbol, SourceHeaderBoundClass> for HierarchyCompleter<'_, H> {
    fn complete(
        &self,
        key: &ClassSymbol,
        env: &LazyEnv<ClassSymbol, SourceHeaderBoundClass, Self>,
    ) -> Result<SourceHeaderBoundClass, LazyBindingError<ClassSymbol>> {
        let Some(source) = self.source_classes.iter().find(|c| &c.sym == key) else {
            // A classpath class's superclass/interfaces are already fully
            // resolved symbols in its own `.class` file; no name resolution
            // is needed, just a reshape of what the reader extracted.
            // `BytecodeBoundClass` carries no interface-vs-class distinction
            // (the reader never looks at `access_flags`), so every classpath
            // entry is reported as `ClassKind::Class` here.
            return Ok(self.host.classpath_class(key).map_or_else(
                || SourceHeaderBoundClass {
                    sym: key.clone(),
                    kind: ClassKind::Class,
                    superclass: None,
                    interfaces: Vec::new(),
                },
                |bytecode| SourceHeaderBoundClass {
                    sym: key.clone(),
                    kind: ClassKind::Class,
                    superclass: bytecode.superclass,
                    interfaces: bytecode.interfaces,
                },
            ));
        };

        let decl: &ClassDeclNode = &source.decl;
        let scope = (self.scope_for)(key);

        let superclass = if key.binary_name() == "java/lang/Object" {
            None
        } else if let Some(extends) = decl.extends.first() {
            resolve_supertype_name(extends, &scope)
        } else if decl.kind == ClassKind::Interface || decl.kind == ClassKind::AnnotationInterface
        {
            None
        } else {
            Some(ClassSymbol::new("java/lang/Object"))
        };

        // Touch the superclass's own completion now so a cycle is detected
        // here rather than silently accepted.
        if let Some(super_sym) = &superclass {
            let _ = env.get(super_sym)?;
        }

        let interfaces = decl
            .implements
            .iter()
            .chain(if decl.kind == ClassKind::Interface {
                decl.extends.iter()
            } else {
                [].iter()
            })
            .filter_map(|ty| resolve_supertype_name(ty, &scope))
            .collect::<Vec<_>>();

        for iface in &interfaces {
            let _ = env.get(iface)?;
        }

        Ok(SourceHeaderBoundClass {
            sym: key.clone(),
            kind: decl.kind,
            superclass,
            interfaces,
        })
    }
}

/// Runs hierarchy binding over every class in `env`'s backing source set,
/// logging a [`ErrorKind::CyclicHierarchy`] diagnostic for any cycle found
/// rather than propagating it, so the rest of the classes in the same
/// compilation can still be reported on.
pub fn bind_all<H: ProcessingHost>(
    env: &LazyEnv<ClassSymbol, SourceHeaderBoundClass, HierarchyCompleter<H>>,
    symbols: impl IntoIterator<Item = ClassSymbol>,
    diagnostics: &mut Diagnostics,
) {
    for sym in symbols {
        if let Err(LazyBindingError::Cycle(cyclic)) = env.get(&sym) {
            diagnostics.log(Diagnostic::error(
                ErrorKind::CyclicHierarchy(cyclic.to_string()),
                Some(sym),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::QualifiedName;
    use crate::bound::BytecodeBoundClass;
    use crate::index::TopLevelIndex;
    use std::rc::Rc;

    struct NoClasspath;
    impl ProcessingHost for NoClasspath {
        fn classpath_class(&self, _sym: &ClassSymbol) -> Option<BytecodeBoundClass> {
            None
        }
    }

    fn class_named(name: &str, extends: Vec<TypeNode>) -> ClassDeclNode {
        ClassDeclNode {
            modifiers: Vec::new(),
            kind: ClassKind::Class,
            name: name.to_owned(),
            type_parameters: Vec::new(),
            extends,
            implements: Vec::new(),
            record_components: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            nested_classes: Vec::new(),
        }
    }

    fn type_named(name: &str) -> TypeNode {
        TypeNode::Class {
            name: QualifiedName::new(vec![name.to_owned()]),
            type_args: Vec::new(),
        }
    }

    #[test]
    fn defaults_superclass_to_object() {
        let decl = class_named("A", Vec::new());
        let source = vec![SourceBoundClass {
            sym: ClassSymbol::new("A"),
            decl: Rc::new(decl),
            owner: None,
        }];
        let index = TopLevelIndex::new();
        let scope_for = |_: &ClassSymbol| CompoundTopLevelIndex {
            high_priority: vec![],
            wild_imports: vec![],
            index: &index,
        };
        let completer = HierarchyCompleter {
            source_classes: &source,
            scope_for: &scope_for,
            host: &NoClasspath,
        };
        let env = LazyEnv::new(completer);
        let bound = env.get(&ClassSymbol::new("A")).unwrap();
        assert_eq!(bound.superclass, Some(ClassSymbol::new("java/lang/Object")));
    }

    #[test]
    fn detects_cyclic_hierarchy() {
        let a = class_named("A", vec![type_named("B")]);
        let b = class_named("B", vec![type_named("A")]);
        let source = vec![
            SourceBoundClass { sym: ClassSymbol::new("A"), decl: Rc::new(a), owner: None },
            SourceBoundClass { sym: ClassSymbol::new("B"), decl: Rc::new(b), owner: None },
        ];
        let mut index = TopLevelIndex::new();
        index.insert(ClassSymbol::new("A"));
        index.insert(ClassSymbol::new("B"));
        let scope_for = |_: &ClassSymbol| CompoundTopLevelIndex {
            high_priority: vec![],
            wild_imports: vec![],
            index: &index,
        };
        let completer = HierarchyCompleter {
            source_classes: &source,
            scope_for: &scope_for,
            host: &NoClasspath,
        };
        let env = LazyEnv::new(completer);
        let mut diagnostics = Diagnostics::new();
        bind_all(&env, vec![ClassSymbol::new("A")], &mut diagnostics);
        assert!(diagnostics.has_errors());
    }
}
