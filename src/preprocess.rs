//! Preprocessing (§4.E): the first binder phase.
//!
//! Walks a [`crate::ast::CompilationUnit`] and mints a
//! [`crate::bound::SourceBoundClass`] for every type declaration, including
//! nested ones, assigning each its [`crate::sym::ClassSymbol`] before any
//! name in the program has been resolved against another class. This is
//! also where declaration-order duplicate simple names in one scope are
//! caught (JLS §8.1, §9.1: two top-level types in the same compilation
//! unit, or two nested types in the same enclosing class, cannot share a
//! simple name).
use std::collections::HashSet;
use std::rc::Rc;

use crate::ast::{ClassDeclNode, CompilationUnit};
use crate::bound::SourceBoundClass;
use crate::diagnostic::{Diagnostics, ErrorKind};
use crate::sym::ClassSymbol;

/// Walks `unit`, producing one [`SourceBoundClass`] per type declaration
/// (including nested types, depth-first).
pub fn preprocess(unit: &CompilationUnit, diagnostics: &mut Diagnostics) -> Vec<SourceBoundClass> {
    let package = unit
        .package
        .as_ref()
        .map(|p| p.segments.join("/"))
        .unwrap_or_default();

    let mut out = Vec::new();
    let mut seen_top_level = HashSet::new();
    for decl in &unit.types {
        if !seen_top_level.insert(decl.name.clone()) {
            diagnostics.log(crate::diagnostic::Diagnostic::error(
                ErrorKind::DuplicateDeclaration(decl.name.clone()),
                None,
            ));
            continue;
        }
        let sym = if package.is_empty() {
            ClassSymbol::new(decl.name.clone())
        } else {
            ClassSymbol::new(format!("{package}/{}", decl.name))
        };
        bind_recursively(decl, sym, None, diagnostics, &mut out);
    }
    out
}

fn bind_recursively(
    decl: &ClassDeclNode,
    sym: ClassSymbol,
    owner: Option<ClassSymbol>,
    diagnostics: &mut Diagnostics,
    out: &mut Vec<SourceBoundClass>,
) {
    out.push(SourceBoundClass {
        sym: sym.clone(),
        decl: Rc::new(decl.clone()),
        owner,
    });

    let mut seen_nested = HashSet::new();
    for nested in &decl.nested_classes {
        if !seen_nested.insert(nested.name.clone()) {
            diagnostics.error(
                &sym,
                ErrorKind::DuplicateDeclaration(nested.name.clone()),
            );
            continue;
        }
        let nested_sym = sym.nested(&nested.name);
        bind_recursively(nested, nested_sym, Some(sym.clone()), diagnostics, out);
    }
}
