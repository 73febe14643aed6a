use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, ValueHint};
use mana_compiler::{compile_file, format_diagnostics, CompilerError, CompilerOptions};
use mana_compiler_mir::LoweringConfig;
use tracing::Level;

/// Mana compiler: lowers a syntax tree to MIR
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Syntax tree to compile, as JSON
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    input: PathBuf,

    /// Source file the syntax tree came from, used to show snippets in diagnostics
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    source: Option<PathBuf>,

    /// Name of the produced module
    #[arg(long, default_value = "program")]
    module_name: String,

    /// Name of the function holding the top-level statements
    #[arg(long, default_value = "main")]
    entry_point: String,

    /// Do not declare the runtime `print` function
    #[arg(long)]
    no_builtins: bool,

    /// Enable verbose output (shows MIR); repeat for debug logs
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let args = Args::parse();
    if args.verbose > 0 {
        let level = if args.verbose > 1 {
            Level::DEBUG
        } else {
            Level::INFO
        };
        tracing_subscriber::fmt().with_max_level(level).init();
    }

    let source = args
        .source
        .as_ref()
        .map(|path| {
            fs::read_to_string(path)
                .with_context(|| format!("Error reading file '{}'", path.display()))
        })
        .transpose()?;

    let options = CompilerOptions {
        verbose: args.verbose > 0,
        lowering: LoweringConfig::default()
            .with_module_name(args.module_name)
            .with_entry_point(args.entry_point)
            .with_builtins(!args.no_builtins),
    };

    match compile_file(&args.input, &options) {
        Ok(output) => {
            if !output.diagnostics.is_empty() {
                eprintln!(
                    "{}",
                    format_diagnostics(&output.diagnostics, source.as_deref(), true)
                );
            }
            if options.verbose {
                println!("{}", output.module.dump());
            }
            println!(
                "Compilation successful: {} function(s)",
                output.module.function_count()
            );
            Ok(())
        }
        Err(CompilerError::LoweringErrors(diagnostics)) => {
            eprintln!(
                "{}",
                format_diagnostics(&diagnostics, source.as_deref(), true)
            );
            bail!("compilation failed with {} diagnostic(s)", diagnostics.len())
        }
        Err(error) => Err(error.into()),
    }
}
