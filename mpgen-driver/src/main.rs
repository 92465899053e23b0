//! MicroPython Binding Generator Driver
//!
//! Loads a module descriptor, generates the C binding source and its qstr
//! table, and writes both next to each other.

mod loader;
mod writer;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use std::path::PathBuf;
use std::process::ExitCode;

use writer::WriteOutcome;

#[derive(Parser, Debug)]
#[command(name = "mpgen")]
#[command(about = "Generate MicroPython C module bindings from a descriptor")]
#[command(version)]
struct Cli {
    /// Name of the module to generate
    #[arg(default_value = "example")]
    module: String,

    /// Overwrite existing output files
    #[arg(short, long)]
    force: bool,

    /// Descriptor file (defaults to <MODULE>.json)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Directory receiving the generated files
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Print both artifacts to stdout instead of writing them
    #[arg(long)]
    dry_run: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let input = cli
        .input
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("{}.json", cli.module)));

    let descriptor = loader::load_descriptor(&cli.module, &input)
        .with_context(|| format!("Failed to load {}", input.display()))?;

    let generated = mpgen_codegen::generate(&descriptor)
        .with_context(|| format!("Failed to generate bindings for '{}'", cli.module))?;

    if cli.dry_run {
        println!("// ===== {} =====", generated.source_file);
        print!("{}", generated.source);
        println!("// ===== {} =====", generated.symbol_file);
        print!("{}", generated.symbols);
        return Ok(());
    }

    let outcome = writer::write_artifacts(&generated, &cli.output_dir, cli.force)
        .with_context(|| format!("Failed to write into {}", cli.output_dir.display()))?;

    match outcome {
        WriteOutcome::Written(paths) => {
            for path in &paths {
                info!("Wrote {}", path.display());
            }
            println!(
                "Generated {} and {}",
                generated.source_file, generated.symbol_file
            );
        }
        WriteOutcome::Skipped { existing } => {
            for path in &existing {
                eprintln!("{} already exists", path.display());
            }
            eprintln!("Nothing written; use --force to overwrite");
        }
    }
    Ok(())
}
