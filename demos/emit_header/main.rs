//! Emits header-only `.class` files for a handful of fixture compilation
//! units, to give the library something runnable end to end without
//! shipping a `.java` parser.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use clap::Parser as ClapParser;
use thiserror::Error;
use turbine::ast::CompilationUnit;
use turbine::collab::{NoopDepsWriter, ProcessingHost, Parser as TurbineParser};
use turbine::bound::BytecodeBoundClass;
use turbine::driver::{Driver, SourceInput};
use turbine::sym::ClassSymbol;

mod fixtures;

#[derive(ClapParser)]
#[command(name = "turbine-demo")]
#[command(about = "Compiles fixture Java sources to header-only .class files", long_about = None)]
struct Args {
    /// Directory the compiled `.class` files are written into, one per
    /// binary name (package directories created as needed).
    #[arg(short, long, default_value = "target/turbine-demo")]
    output: PathBuf,
}

/// Hands back the pre-built fixture matching `file_name`; never invoked with
/// anything else since the fixtures and the driver inputs are built from the
/// same list.
struct FixtureParser {
    units: HashMap<String, CompilationUnit>,
}

#[derive(Debug, Error)]
#[error("no fixture registered for {0}")]
struct UnknownFixture(String);

impl TurbineParser for FixtureParser {
    type Error = UnknownFixture;

    fn parse(&self, file_name: &str, _source: &str) -> Result<CompilationUnit, Self::Error> {
        self.units
            .get(file_name)
            .cloned()
            .ok_or_else(|| UnknownFixture(file_name.to_owned()))
    }
}

/// No classpath behind this demo; every name outside the fixture set
/// resolves as though it were `java.lang.Object` itself, i.e. not found.
struct NoClasspath;

impl ProcessingHost for NoClasspath {
    fn classpath_class(&self, _sym: &ClassSymbol) -> Option<BytecodeBoundClass> {
        None
    }
}

fn main() {
    let args = Args::parse();

    let units = fixtures::all();
    let parser = FixtureParser {
        units: units
            .iter()
            .map(|(name, unit)| (format!("{name}.java"), unit.clone()))
            .collect(),
    };
    let inputs: Vec<SourceInput> = units
        .iter()
        .map(|(name, _)| SourceInput {
            file_name: format!("{name}.java"),
            source: String::new(),
        })
        .collect();

    let host = NoClasspath;
    let driver = Driver::new(&parser, &host, &[]);
    let mut deps = NoopDepsWriter;

    match driver.compile(&inputs, &mut deps) {
        Ok(compiled) => {
            for class in &compiled {
                if let Err(err) = write_class(&args.output, class) {
                    eprintln!("failed to write {}: {err}", class.sym.binary_name());
                }
            }
            println!("wrote {} class file(s) to {}", compiled.len(), args.output.display());
        }
        Err(err) => {
            eprintln!("compilation failed: {err}");
            std::process::exit(1);
        }
    }
}

fn write_class(output: &PathBuf, class: &turbine::driver::CompiledClass) -> std::io::Result<()> {
    let path = output.join(format!("{}.class", class.sym.binary_name()));
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, &class.bytes)
}
