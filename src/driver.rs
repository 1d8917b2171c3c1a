//! The compilation pipeline (§5): wires every phase from source text to
//! finished `.class` file bytes, in the fixed order A-J.
//!
//! Nothing in this module does name resolution, constant folding, or
//! lowering itself -- that all lives in the sibling phase modules. This
//! module's only job is sequencing them and checkpointing [`Diagnostics`]
//! at each phase boundary, the same shape as the teacher's top-level
//! `compile` entry point stringing together `HierarchyBinder`,
//! `ConstantEvaluator`, and class writing in order.
use std::collections::HashMap;
use std::rc::Rc;

use crate::ast::{AnnotationNode, ClassDeclNode, ClassKind, ExprNode, ImportDeclNode, Modifier, QualifiedName};
use crate::bound::{BoundField, BoundMethod, SourceBoundClass, SourceHeaderBoundClass, SourceTypeBoundClass};
use crate::canonicalize::{self, AnnotationTargets, DeclarationKind, HierarchyLookup};
use crate::collab::{DepsWriter, Parser, ProcessingHost};
use crate::const_eval::eval_const;
use crate::diagnostic::{Diagnostics, Thrown};
use crate::env::LazyEnv;
use crate::hierarchy::{self, HierarchyCompleter};
use crate::index::{CompoundTopLevelIndex, ImportScope, LookupResult, TopLevelIndex, WildImportScope};
use crate::lower;
use crate::preprocess;
use crate::sym::{ClassSymbol, TyVarSymbol};
use crate::type_binder;
use crate::types::const_value::{Const, Value};
use crate::types::ty::Type;

/// One named unit of source text to compile, paired with a synthetic file
/// name used only for diagnostics the [`Parser`] itself raises.
#[derive(Debug, Clone)]
pub struct SourceInput {
    /// The name attributed to parse errors, e.g. `"A.java"`.
    pub file_name: String,
    /// The Java source text.
    pub source: String,
}

/// One finished header class file.
#[derive(Debug, Clone)]
pub struct CompiledClass {
    /// The class's binary name.
    pub sym: ClassSymbol,
    /// The encoded `.class` file bytes.
    pub bytes: Vec<u8>,
}

/// Everything that can go wrong running [`Driver::compile`]: either the
/// input wasn't syntactically valid Java (the [`Parser`]'s own error,
/// raised immediately rather than accumulated, since a broken parse leaves
/// no AST for any later phase to work with), or the input parsed but
/// didn't bind (accumulated [`Diagnostics`], surfaced as [`Thrown`] at
/// whichever phase boundary first found errors).
#[derive(Debug, thiserror::Error)]
pub enum DriverError<E: std::error::Error + 'static> {
    /// Parsing `file_name` failed.
    #[error("parsing {file_name}: {source}")]
    Parse {
        /// The input's file name.
        file_name: String,
        /// The parser's own error.
        #[source]
        source: E,
    },
    /// A later phase logged at least one error diagnostic.
    #[error(transparent)]
    Binding(#[from] Thrown),
}

/// Drives one compilation: every phase of §4, in order, over every class
/// declared across a set of [`SourceInput`]s.
pub struct Driver<'a, P, H> {
    parser: &'a P,
    host: &'a H,
    /// Every binary name the classpath can answer for, needed to resolve
    /// on-demand imports (`import java.util.*;`) against library types.
    /// [`crate::collab::ByteSupplier`] only answers "give me the bytes for
    /// this exact name", not "what names do you have" -- the caller already
    /// knows this list (e.g. a jar's directory listing), so it is supplied
    /// here rather than derived.
    classpath_names: &'a [ClassSymbol],
}

impl<'a, P, H> Driver<'a, P, H>
where
    P: Parser,
    H: ProcessingHost,
{
    /// Builds a driver over `parser` and `host`, given every binary name
    /// `host` can resolve (for on-demand import expansion).
    #[must_use]
    pub fn new(parser: &'a P, host: &'a H, classpath_names: &'a [ClassSymbol]) -> Self {
        Self { parser, host, classpath_names }
    }

    /// Compiles every declaration across `inputs` to a header class file.
    ///
    /// # Errors
    /// Returns [`DriverError::Parse`] if any input fails to parse, or
    /// [`DriverError::Binding`] if binding logs at least one error
    /// diagnostic at a phase boundary.
    pub fn compile(
        &self,
        inputs: &[SourceInput],
        deps: &mut dyn DepsWriter,
    ) -> Result<Vec<CompiledClass>, DriverError<P::Error>> {
        let mut diagnostics = Diagnostics::new();

        // Parsing and preprocessing (§4.E).
        let mut units = Vec::with_capacity(inputs.len());
        for input in inputs {
            let unit = self
                .parser
                .parse(&input.file_name, &input.source)
                .map_err(|source| DriverError::Parse { file_name: input.file_name.clone(), source })?;
            units.push(unit);
        }

        let mut source_classes: Vec<SourceBoundClass> = Vec::new();
        let mut unit_of: HashMap<String, usize> = HashMap::new();
        for (i, unit) in units.iter().enumerate() {
            let before = source_classes.len();
            source_classes.extend(preprocess::preprocess(unit, &mut diagnostics));
            for class in &source_classes[before..] {
                unit_of.insert(class.sym.binary_name().to_owned(), i);
            }
        }
        diagnostics.check()?;

        let decl_by_name: HashMap<String, Rc<ClassDeclNode>> = source_classes
            .iter()
            .map(|c| (c.sym.binary_name().to_owned(), Rc::clone(&c.decl)))
            .collect();

        // The master name index: every class this compilation declares,
        // plus every name the classpath can answer for.
        let mut top_level = TopLevelIndex::new();
        for class in &source_classes {
            top_level.insert(class.sym.clone());
        }
        for sym in self.classpath_names {
            top_level.insert(sym.clone());
        }

        // One import scope per compilation unit; `java.lang` is always
        // implicitly on-demand imported (JLS §7.5.3).
        let mut wild_imports: Vec<WildImportScope> = Vec::with_capacity(units.len());
        let mut single_imports: Vec<ImportScope> = Vec::with_capacity(units.len());
        for unit in &units {
            let mut wild = WildImportScope::new();
            wild.add("java/lang");
            let mut single = ImportScope::new();
            for import in &unit.imports {
                match import {
                    ImportDeclNode::Single(name) => {
                        if let LookupResult::Type(sym) = top_level.lookup(&name.segments.join("/")) {
                            single.add(name.simple_name(), sym);
                        }
                    }
                    ImportDeclNode::OnDemand(name) => wild.add(name.segments.join("/")),
                    // Static imports name members, not types; irrelevant to
                    // type-name resolution.
                    ImportDeclNode::StaticSingle(_) | ImportDeclNode::StaticOnDemand(_) => {}
                }
            }
            wild_imports.push(wild);
            single_imports.push(single);
        }

        let scope_for = |sym: &ClassSymbol| -> CompoundTopLevelIndex<'_> {
            let i = unit_of.get(sym.binary_name()).copied().unwrap_or(0);
            CompoundTopLevelIndex {
                high_priority: vec![&single_imports[i]],
                wild_imports: vec![&wild_imports[i]],
                index: &top_level,
            }
        };

        // Hierarchy binding (§4.F).
        let completer = HierarchyCompleter {
            source_classes: &source_classes,
            scope_for: &scope_for,
            host: self.host,
        };
        let hierarchy_env: LazyEnv<ClassSymbol, SourceHeaderBoundClass, HierarchyCompleter<'_, H>> =
            LazyEnv::new(completer);
        hierarchy::bind_all(&hierarchy_env, source_classes.iter().map(|c| c.sym.clone()), &mut diagnostics);
        diagnostics.check()?;

        // Type binding (§4.G).
        let mut type_bound: HashMap<String, SourceTypeBoundClass> = HashMap::new();
        for source in &source_classes {
            let scope = scope_for(&source.sym);
            let bound = type_binder::bind_class(source, &scope, &mut diagnostics);
            type_bound.insert(source.sym.binary_name().to_owned(), bound);
        }
        diagnostics.check()?;

        // Constant evaluation (§4.H): two passes so sibling fields that
        // reference each other resolve regardless of declaration order; the
        // first pass runs against a scratch log so a reference that only
        // resolves on the second pass doesn't spuriously report an error.
        let mut constants: HashMap<(String, String), Const> = HashMap::new();
        for is_final_pass in [false, true] {
            let mut scratch = Diagnostics::new();
            let log = if is_final_pass { &mut diagnostics } else { &mut scratch };
            for source in &source_classes {
                let Some(bound) = type_bound.get_mut(source.sym.binary_name()) else { continue };
                let scope = scope_for(&source.sym);
                for field in &mut bound.fields {
                    if field.constant_value.is_some() {
                        continue;
                    }
                    let Some(initializer) = field.decl.initializer.clone() else { continue };
                    let owner = source.sym.clone();
                    let resolve_name = |name: &QualifiedName| resolve_constant_name(name, &owner, &scope, &constants);
                    if let Some(value) = eval_const(&initializer, &resolve_name, &source.sym, log) {
                        constants.insert((source.sym.binary_name().to_owned(), field.name.clone()), value.clone());
                        field.constant_value = Some(value);
                    }
                }
            }
        }
        diagnostics.check()?;

        // Canonicalization, disambiguation, and lowering (§4.I-§4.J).
        let lookup = DriverHierarchyLookup { decl_by_name: &decl_by_name, type_bound: &type_bound };
        let mut results = Vec::with_capacity(source_classes.len());
        for source in &source_classes {
            let Some(bound) = type_bound.get(source.sym.binary_name()) else { continue };
            let decl = &source.decl;
            let scope = scope_for(&source.sym);

            let canon_class = SourceTypeBoundClass {
                sym: bound.sym.clone(),
                superclass: bound.superclass.as_ref().map(|t| canonicalize::canonicalize_type(t, &lookup)),
                interfaces: bound.interfaces.iter().map(|t| canonicalize::canonicalize_type(t, &lookup)).collect(),
                fields: bound
                    .fields
                    .iter()
                    .map(|f| BoundField { ty: canonicalize::canonicalize_type(&f.ty, &lookup), ..f.clone() })
                    .collect(),
                methods: bound
                    .methods
                    .iter()
                    .map(|m| BoundMethod {
                        parameter_types: m.parameter_types.iter().map(|t| canonicalize::canonicalize_type(t, &lookup)).collect(),
                        return_type: canonicalize::canonicalize_type(&m.return_type, &lookup),
                        throws: m.throws.iter().map(|t| canonicalize::canonicalize_type(t, &lookup)).collect(),
                        ..m.clone()
                    })
                    .collect(),
            };

            record_type_dependencies(&source.sym, &canon_class, deps);

            let owner = source.sym.clone();
            let resolve_name = |name: &QualifiedName| resolve_constant_name(name, &owner, &scope, &constants);
            let annotation_type_of = |simple_name: &str| match scope.resolve(simple_name) {
                LookupResult::Type(sym) => Some(sym),
                _ => None,
            };
            // Meta-annotation resolution is approximate: this crate's AST
            // has no array-literal expression, so a `@Target({FIELD,
            // METHOD})`-style argument can't be evaluated and `declared_targets`
            // falls through to `None`, letting the JLS §9.6.4.1 default
            // target set apply. A single-valued `@Target(ElementType.X)` is
            // read exactly. `@Repeatable` containers are never synthesized
            // (see `canonicalize::group_repeated`), so repeated annotations
            // without one are flagged but not lowered.
            let target_of = |sym: &ClassSymbol| -> Option<AnnotationTargets> {
                decl_by_name.get(sym.binary_name()).and_then(|d| declared_targets(d))
            };
            let repeatable_container_of = |_: &ClassSymbol| -> Option<ClassSymbol> { None };
            let runtime_visible = |sym: &ClassSymbol| decl_by_name.get(sym.binary_name()).is_some_and(|d| retention_is_runtime(d));

            let has_constructor = decl.methods.iter().any(|m| m.is_constructor);

            let mut fields_info = Vec::with_capacity(canon_class.fields.len());
            for field in &canon_class.fields {
                let annotations = canonicalize::disambiguate(
                    &annotation_nodes(&field.decl.modifiers),
                    DeclarationKind::Field,
                    &source.sym,
                    &target_of,
                    &repeatable_container_of,
                    &resolve_name,
                    &annotation_type_of,
                    &mut diagnostics,
                );
                let is_enum_constant = decl.kind == ClassKind::Enum;
                fields_info.push(lower::lower_field(field, is_enum_constant, &annotations, &runtime_visible));
            }

            let mut methods_info = Vec::with_capacity(canon_class.methods.len());
            for method in &canon_class.methods {
                let decl_kind = if method.decl.is_constructor { DeclarationKind::Constructor } else { DeclarationKind::Method };
                let annotations = canonicalize::disambiguate(
                    &annotation_nodes(&method.decl.modifiers),
                    decl_kind,
                    &source.sym,
                    &target_of,
                    &repeatable_container_of,
                    &resolve_name,
                    &annotation_type_of,
                    &mut diagnostics,
                );
                let parameter_annotations: Vec<_> = method
                    .decl
                    .parameters
                    .iter()
                    .map(|p| {
                        canonicalize::disambiguate(
                            &annotation_nodes(&p.modifiers),
                            DeclarationKind::Parameter,
                            &source.sym,
                            &target_of,
                            &repeatable_container_of,
                            &resolve_name,
                            &annotation_type_of,
                            &mut diagnostics,
                        )
                    })
                    .collect();
                let annotation_default = method.decl.default_value.as_ref().map(|expr| {
                    eval_const(expr, &resolve_name, &source.sym, &mut diagnostics)
                        .map_or(Value::Array(Vec::new()), Value::Const)
                });
                let is_synthetic = is_synthesized_method(decl.kind, has_constructor, method);
                methods_info.push(lower::lower_method(
                    method,
                    decl.kind,
                    is_synthetic,
                    &annotations,
                    annotation_default,
                    &parameter_annotations,
                    &runtime_visible,
                ));
            }

            let class_annotations = canonicalize::disambiguate(
                &annotation_nodes(&decl.modifiers),
                DeclarationKind::Type,
                &source.sym,
                &target_of,
                &repeatable_container_of,
                &resolve_name,
                &annotation_type_of,
                &mut diagnostics,
            );

            // `enum_has_constant_body` is always `false`: this crate's
            // `ClassDeclNode` has no representation of a per-constant class
            // body (enum constants are plain fields, see
            // `type_binder::bind_class`'s own doc comment), so the
            // `ACC_ABSTRACT` enum case in `lower::class_access_flags` is
            // unreachable from this driver.
            let class_file = lower::lower_class(
                &canon_class,
                decl.kind,
                &decl.modifiers,
                false,
                fields_info,
                methods_info,
                Some(format!("{}.java", top_level_simple_name(decl))),
                &class_annotations,
                &runtime_visible,
            );
            results.push(CompiledClass { sym: source.sym.clone(), bytes: class_file.write() });
        }
        diagnostics.check()?;

        Ok(results)
    }
}

fn top_level_simple_name(decl: &ClassDeclNode) -> &str {
    &decl.name
}

fn annotation_nodes(modifiers: &[Modifier]) -> Vec<AnnotationNode> {
    modifiers
        .iter()
        .filter_map(|m| match m {
            Modifier::Annotation(a) => Some(a.clone()),
            _ => None,
        })
        .collect()
}

/// `true` if `decl`'s own `@Retention` (if any) names `RUNTIME`. Checked by
/// matching the raw expression rather than running it through
/// [`eval_const`], since an enum-constant reference like
/// `RetentionPolicy.RUNTIME` has no [`Const`] representation -- only its
/// textual shape is needed here.
fn retention_is_runtime(decl: &ClassDeclNode) -> bool {
    let Some(retention) = decl.modifiers.iter().find_map(|m| match m {
        Modifier::Annotation(a) if a.name.simple_name() == "Retention" => Some(a),
        _ => None,
    }) else {
        return false;
    };
    retention
        .arguments
        .iter()
        .any(|(_, expr)| matches!(expr, ExprNode::Name(name) if name.simple_name() == "RUNTIME"))
}

/// `decl`'s own declared `@Target`, if any, read the same approximate way
/// [`retention_is_runtime`] reads `@Retention`: only a single-valued
/// `@Target(ElementType.X)` argument can be matched, since this crate's AST
/// has no array-literal expression to evaluate `@Target({A, B})` against.
/// Returns `None` for a multi-valued or absent `@Target`, letting the caller
/// fall back to [`AnnotationTargets::default_targets`].
fn declared_targets(decl: &ClassDeclNode) -> Option<AnnotationTargets> {
    let target = decl.modifiers.iter().find_map(|m| match m {
        Modifier::Annotation(a) if a.name.simple_name() == "Target" => Some(a),
        _ => None,
    })?;
    let (_, expr) = target.arguments.first()?;
    let ExprNode::Name(name) = expr else { return None };
    Some(match name.simple_name() {
        "TYPE_USE" => AnnotationTargets { declaration_kinds: Vec::new(), type_use: true },
        other => AnnotationTargets { declaration_kinds: vec![other.to_owned()], type_use: false },
    })
}

/// `true` if `method` was synthesized by [`type_binder::bind_class`] rather
/// than declared in source, recomputed from the same conditions that
/// function used to synthesize it (no hidden flag survives type binding).
/// The enum constructor is deliberately excluded per
/// [`lower::lower_method`]'s own contract: unlike `values`/`valueOf`, it is
/// never `ACC_SYNTHETIC` in a real `javac`-compiled enum.
fn is_synthesized_method(kind: ClassKind, has_constructor: bool, method: &BoundMethod) -> bool {
    match kind {
        ClassKind::Enum => matches!(method.sym.name.as_str(), "values" | "valueOf"),
        ClassKind::Class => !has_constructor && method.sym.name == "<init>" && method.decl.parameters.is_empty(),
        _ => false,
    }
}

/// Resolves a constant-expression name reference: a bare name against the
/// referencing class's own already-evaluated fields, or a qualified name
/// (`Other.FIELD`) against another class's, with the class prefix resolved
/// through `scope`.
fn resolve_constant_name(
    name: &QualifiedName,
    owner: &ClassSymbol,
    scope: &CompoundTopLevelIndex<'_>,
    constants: &HashMap<(String, String), Const>,
) -> Option<Const> {
    if name.segments.len() == 1 {
        if let Some(value) = constants.get(&(owner.binary_name().to_owned(), name.segments[0].clone())) {
            return Some(value.clone());
        }
    }
    let (field_name, class_segments) = name.segments.split_last()?;
    let simple = class_segments.last()?;
    match scope.resolve(simple) {
        LookupResult::Type(sym) => constants.get(&(sym.binary_name().to_owned(), field_name.clone())).cloned(),
        _ => None,
    }
}

/// Records every ABI-visible type reference of a canonicalized class as a
/// dependency edge, for callers that want a `.d`-file-equivalent build
/// dependency record (§6).
fn record_type_dependencies(owner: &ClassSymbol, class: &SourceTypeBoundClass, deps: &mut dyn DepsWriter) {
    let mut visit = |ty: &Type| {
        if let Some(sym) = ty.class_symbol() {
            deps.record_dependency(owner, sym);
        }
    };
    if let Some(superclass) = &class.superclass {
        visit(superclass);
    }
    for iface in &class.interfaces {
        visit(iface);
    }
    for field in &class.fields {
        visit(&field.ty);
    }
    for method in &class.methods {
        visit(&method.return_type);
        for p in &method.parameter_types {
            visit(p);
        }
        for t in &method.throws {
            visit(t);
        }
    }
}

/// The [`HierarchyLookup`] canonicalization needs, backed by this driver's
/// already-computed binder state: source declarations for type-parameter
/// names, and type-bound classes for superclass types.
struct DriverHierarchyLookup<'a> {
    decl_by_name: &'a HashMap<String, Rc<ClassDeclNode>>,
    type_bound: &'a HashMap<String, SourceTypeBoundClass>,
}

impl HierarchyLookup for DriverHierarchyLookup<'_> {
    fn type_parameters(&self, class: &ClassSymbol) -> Vec<TyVarSymbol> {
        self.decl_by_name.get(class.binary_name()).map_or_else(Vec::new, |decl| {
            decl.type_parameters
                .iter()
                .map(|p| TyVarSymbol::of_class(class.clone(), p.name.clone()))
                .collect()
        })
    }

    fn superclass_type(&self, class: &ClassSymbol) -> Option<Type> {
        self.type_bound.get(class.binary_name()).and_then(|b| b.superclass.clone())
    }
}
