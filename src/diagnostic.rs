//! Accumulating diagnostics and the phase-boundary abort mechanism.
//!
//! The binder never throws on the first error it sees: a phase runs to
//! completion over every class in a compilation, logging one [`Diagnostic`]
//! per problem, and only after the phase finishes does the driver call
//! [`Diagnostics::check`] (the `maybeThrow` of the design) to decide whether
//! to keep going.
use std::fmt::Display;

use crate::sym::ClassSymbol;

/// The severity of a logged [`Diagnostic`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Informational; does not affect `Diagnostics::check`.
    Note,
    /// A recoverable problem; the phase continues but the driver will abort
    /// at the next phase boundary.
    Error,
}

/// A non-exhaustive classification of what went wrong.
///
/// See §7 of the design: these are not exceptions, they are accumulated and
/// inspected, so the set is expected to grow without it being a breaking
/// change to add a variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ErrorKind {
    /// A name could not be resolved to any symbol.
    #[error("symbol not found: {0}")]
    SymbolNotFound(String),
    /// A classpath entry named a class that could not be located.
    #[error("class file not found: {0}")]
    ClassFileNotFound(String),
    /// Two declarations in the same scope claim the same simple name.
    #[error("duplicate declaration: {0}")]
    DuplicateDeclaration(String),
    /// `LazyEnv` detected a completer re-entering itself through the
    /// inheritance graph.
    #[error("cyclic hierarchy involving {0}")]
    CyclicHierarchy(String),
    /// A qualified name could not be resolved against the current scopes.
    #[error("cannot resolve {0}")]
    CannotResolve(String),
    /// A type-variable reference was followed by a member-type qualifier.
    #[error("type parameter used as a qualifier: {0}")]
    TypeParameterQualifier(String),
    /// Constant-expression evaluation failed outside a speculative context.
    #[error("not a constant expression: {0}")]
    ExpressionError(String),
    /// An annotation argument did not typecheck against the element's type.
    #[error("invalid annotation argument for {0}")]
    InvalidAnnotationArgument(String),
    /// An annotation was applied to something that is not an annotation type.
    #[error("{0} is not an annotation interface")]
    NotAnAnnotation(String),
    /// An annotation was repeated without a `@Repeatable` container.
    #[error("{0} is not @Repeatable")]
    NonrepeatableAnnotation(String),
    /// A type parameter appeared where none is permitted.
    #[error("unexpected type parameter on {0}")]
    UnexpectedTypeParameter(String),
    /// A literal could not be parsed.
    #[error("invalid literal: {0}")]
    InvalidLiteral(String),
    /// The AST contained a token the binder did not expect.
    #[error("unexpected token: {0}")]
    UnexpectedToken(String),
    /// A `module-info` declaration was malformed.
    #[error("bad module-info: {0}")]
    BadModuleInfo(String),
}

/// One accumulated diagnostic, optionally attributed to a class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// What went wrong.
    pub kind: ErrorKind,
    /// How severe this is.
    pub severity: Severity,
    /// The class the diagnostic is about, if any.
    pub class: Option<ClassSymbol>,
}

impl Diagnostic {
    /// Creates an error-severity diagnostic about the given class.
    #[must_use]
    pub fn error(kind: ErrorKind, class: Option<ClassSymbol>) -> Self {
        Self {
            kind,
            severity: Severity::Error,
            class,
        }
    }

    /// Creates a note-severity diagnostic about the given class.
    #[must_use]
    pub fn note(kind: ErrorKind, class: Option<ClassSymbol>) -> Self {
        Self {
            kind,
            severity: Severity::Note,
            class,
        }
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.class {
            Some(class) => write!(f, "{}: {}", class.binary_name(), self.kind),
            None => write!(f, "{}", self.kind),
        }
    }
}

/// Raised by [`Diagnostics::check`] when a phase boundary finds errors.
#[derive(Debug, Clone, thiserror::Error)]
#[error("compilation aborted with {} error(s)", .0.len())]
pub struct Thrown(pub Vec<Diagnostic>);

/// An accumulating, append-only diagnostic logger.
///
/// One `Diagnostics` instance lives for the whole compilation; each phase
/// logs into it and the driver checkpoints it at phase boundaries.
#[derive(Debug, Default)]
pub struct Diagnostics {
    log: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Creates an empty logger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a diagnostic. Iteration order of diagnostics matches
    /// insertion order, which in turn matches the binder's fixed traversal
    /// order (declaration order, then bootclasspath, then user classpath).
    pub fn log(&mut self, diagnostic: Diagnostic) {
        log::debug!("diagnostic: {diagnostic}");
        self.log.push(diagnostic);
    }

    /// Convenience for logging an error about a class.
    pub fn error(&mut self, class: &ClassSymbol, kind: ErrorKind) {
        self.log(Diagnostic::error(kind, Some(class.clone())));
    }

    /// All diagnostics logged so far, in insertion order.
    #[must_use]
    pub fn entries(&self) -> &[Diagnostic] {
        &self.log
    }

    /// `true` if any diagnostic at [`Severity::Error`] has been logged.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.log.iter().any(|d| d.severity == Severity::Error)
    }

    /// The `maybeThrow` of the design: called at a phase boundary, aborts
    /// the remaining phases by returning every logged diagnostic if any of
    /// them is an error.
    ///
    /// # Errors
    /// Returns [`Thrown`] carrying every diagnostic logged so far if at
    /// least one has [`Severity::Error`].
    pub fn check(&self) -> Result<(), Thrown> {
        if self.has_errors() {
            log::error!("aborting: {} diagnostic(s) logged", self.log.len());
            Err(Thrown(self.log.clone()))
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_logger_checks_clean() {
        let diagnostics = Diagnostics::new();
        assert!(diagnostics.check().is_ok());
    }

    #[test]
    fn error_trips_check() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.error(
            &ClassSymbol::new("a/B"),
            ErrorKind::SymbolNotFound("a.B.c".into()),
        );
        let thrown = diagnostics.check().unwrap_err();
        assert_eq!(thrown.0.len(), 1);
    }

    #[test]
    fn note_does_not_trip_check() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.log(Diagnostic::note(
            ErrorKind::SymbolNotFound("a.B.c".into()),
            None,
        ));
        assert!(diagnostics.check().is_ok());
    }

    #[test]
    fn insertion_order_is_preserved() {
        let mut diagnostics = Diagnostics::new();
        for i in 0..5 {
            diagnostics.error(
                &ClassSymbol::new(format!("a/C{i}")),
                ErrorKind::CannotResolve(i.to_string()),
            );
        }
        let names: Vec<_> = diagnostics
            .entries()
            .iter()
            .map(|d| d.class.as_ref().unwrap().binary_name().to_owned())
            .collect();
        assert_eq!(names, vec!["a/C0", "a/C1", "a/C2", "a/C3", "a/C4"]);
    }
}
