//! MicroPython Binding Generator - Code Generation
//!
//! This crate turns a module descriptor into the C source of a MicroPython
//! user module and its qstr table. It includes:
//!
//! - Signature classification into native calling conventions
//! - Annotation and default value mapping
//! - Fragment emission in declaration order
//! - Formatting and identifier table collection

pub mod classify;
pub mod emit;
pub mod format;
pub mod fragment;
pub mod naming;
pub mod plan;
pub mod symbols;
pub mod typemap;

pub use classify::classify;
pub use emit::Emitter;
pub use format::{CFormatter, Formatter};
pub use fragment::{Fragment, FragmentKind};
pub use naming::Naming;
pub use plan::ModulePlan;
pub use symbols::{SymbolCollector, SymbolTable};

use log::info;
use mpgen_common::{GenError, ModuleDescriptor};

/// Both generated artifacts of a module
#[derive(Debug, Clone)]
pub struct GeneratedModule {
    /// File name of the C source
    pub source_file: String,
    pub source: String,
    /// File name of the identifier table
    pub symbol_file: String,
    pub symbols: String,
    pub table: SymbolTable,
}

/// Main entry point for code generation
pub fn generate(module: &ModuleDescriptor) -> Result<GeneratedModule, GenError> {
    generate_with(module, &CFormatter::default())
}

/// Generate with a specific formatter
pub fn generate_with(
    module: &ModuleDescriptor,
    formatter: &dyn Formatter,
) -> Result<GeneratedModule, GenError> {
    // Methods must know their class before constructors can be told apart
    let mut module = module.clone();
    module.adopt_methods();
    module.validate()?;

    let naming = Naming::new(&module.name);
    let plan = ModulePlan::build(&module)?;

    let mut collector = SymbolCollector::new();
    let fragments = Emitter::new(&module.name, &mut collector).emit_module(&plan);
    let source = formatter.render(&fragments);

    let table = collector.finalize();
    let symbols = table.render(&naming.feature_flag());
    info!(
        "Generated '{}': {} fragments, {} symbols",
        module.name,
        fragments.len(),
        table.symbols().len()
    );

    Ok(GeneratedModule {
        source_file: naming.source_file(),
        source,
        symbol_file: naming.symbol_file(),
        symbols,
        table,
    })
}
