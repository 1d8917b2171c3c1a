//! Collaborator traits at the crate's external boundaries (§6).
//!
//! Turbine itself never reads a `.java` file or writes a `.d` file; callers
//! implement these traits and hand the results (or sinks) to
//! [`crate::driver::Driver`]. This mirrors the teacher's
//! `jvm::class_loader::ClassPath` trait boundary -- the library defines the
//! shape of "give me bytes for a name", the caller decides where they
//! actually come from (filesystem, jar, jrt-fs, in-memory test fixture).
use crate::ast::CompilationUnit;
use crate::bound::BytecodeBoundClass;
use crate::sym::ClassSymbol;

/// Turns source text into an AST. Implemented by the caller's own Java
/// parser; Turbine's binder only ever consumes the result.
pub trait Parser {
    /// The parser's own error type.
    type Error: std::error::Error + 'static;

    /// Parses one compilation unit from `source`, naming it `file_name` in
    /// any diagnostics the parser itself produces.
    ///
    /// # Errors
    /// Returns `Self::Error` if `source` is not syntactically valid Java.
    fn parse(&self, file_name: &str, source: &str) -> Result<CompilationUnit, Self::Error>;
}

/// Supplies the raw bytes of a classpath entry on demand.
///
/// A `ByteSupplier` implementation is expected to memoize its own I/O (the
/// teacher's `CachingClassLoader` does this with an `RwLock<HashMap<..>>>`);
/// [`crate::classpath::Classpath`] only calls it once per class and trusts
/// the result is stable for the lifetime of one compilation.
pub trait ByteSupplier {
    /// Returns the bytes of the `.class` file for `binary_name`, or `None`
    /// if no classpath entry provides it.
    fn bytes_for(&self, binary_name: &str) -> Option<Vec<u8>>;
}

/// The seam between the binder and whatever owns class lookup across
/// compilation units: given a symbol, produce its bound form, whether that
/// means binding source still in flight or reading it off the classpath.
///
/// This is the generalization of the teacher's `analysis::ResolutionContext`:
/// there, resolution distinguished "application" classes (being compiled)
/// from "library" classes (on the classpath) for diagnostic purposes. Here
/// the same distinction exists but drives which of
/// [`crate::bound::SourceHeaderBoundClass`] or
/// [`crate::bound::BytecodeBoundClass`] the host hands back.
pub trait ProcessingHost {
    /// Returns the classpath-resolved ABI for `sym`, if it is a library
    /// class rather than one being compiled in this invocation.
    fn classpath_class(&self, sym: &ClassSymbol) -> Option<BytecodeBoundClass>;
}

/// Receives the dependency edges the binder discovers while resolving
/// names, for build systems that want a `.d`-file-equivalent dependency
/// record without re-deriving it from scratch.
pub trait DepsWriter {
    /// Records that `from` depends on `to` (as a supertype, a field type, a
    /// parameter type, or any other ABI-visible reference).
    fn record_dependency(&mut self, from: &ClassSymbol, to: &ClassSymbol);
}

/// A [`DepsWriter`] that discards everything, for callers that don't need
/// dependency tracking.
#[derive(Debug, Default)]
pub struct NoopDepsWriter;

impl DepsWriter for NoopDepsWriter {
    fn record_dependency(&mut self, _from: &ClassSymbol, _to: &ClassSymbol) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_deps_writer_accepts_any_edge() {
        let mut writer = NoopDepsWriter;
        writer.record_dependency(&ClassSymbol::new("a/B"), &ClassSymbol::new("a/C"));
    }
}
