//! Mana compiler library
//!
//! Ties the phases together: a syntax tree, handed over as a value or as the
//! JSON a front end produced, is lowered to a verified MIR module.

use std::fs;
use std::path::{Path, PathBuf};

use mana_compiler_ast::Program;
use mana_compiler_diagnostics::{build_diagnostic_message, Diagnostic, DiagnosticCollection};
use mana_compiler_mir::{lower_program, LoweringConfig, MirModule};
use thiserror::Error;

/// Result type for compilation operations
pub type Result<T> = std::result::Result<T, CompilerError>;

/// Errors that can occur during compilation
#[derive(Debug, Error)]
pub enum CompilerError {
    /// The input is not a valid serialized syntax tree
    #[error("Invalid syntax tree: {0}")]
    InvalidAst(#[from] serde_json::Error),
    #[error("Error reading '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Lowering reported at least one error; holds every diagnostic of the run
    #[error("Lowering failed: {} errors found", count_errors(.0))]
    LoweringErrors(Vec<Diagnostic>),
}

fn count_errors(diagnostics: &[Diagnostic]) -> usize {
    diagnostics
        .iter()
        .filter(|diagnostic| diagnostic.severity.is_error())
        .count()
}

/// Options for compilation
#[derive(Debug, Clone, Default)]
pub struct CompilerOptions {
    /// Enable verbose output
    pub verbose: bool,
    pub lowering: LoweringConfig,
}

/// Compilation output including the lowered module and any diagnostics
#[derive(Debug)]
pub struct CompilerOutput {
    pub module: MirModule,
    /// Warnings generated during compilation
    pub diagnostics: Vec<Diagnostic>,
}

/// Lowers a program
///
/// # Returns
/// * `Ok(CompilerOutput)` - The module, with any warnings
/// * `Err(CompilerError::LoweringErrors)` - Lowering reported errors; the
///   module is discarded
pub fn compile_program(program: &Program, options: &CompilerOptions) -> Result<CompilerOutput> {
    tracing::info!(
        statements = program.statements.len(),
        module = %options.lowering.module_name,
        "lowering program"
    );

    let mut diagnostics = DiagnosticCollection::new();
    let module = lower_program(program, &options.lowering, &mut diagnostics);
    diagnostics.sort();

    if diagnostics.has_errors() {
        tracing::warn!("{}", diagnostics.summary());
        return Err(CompilerError::LoweringErrors(diagnostics.into_iter().collect()));
    }

    tracing::info!(functions = module.function_count(), "lowering succeeded");
    if options.verbose {
        tracing::debug!("\n{}", module.dump());
    }

    Ok(CompilerOutput {
        module,
        diagnostics: diagnostics.into_iter().collect(),
    })
}

/// Lowers a program given as the JSON form of [`Program`]
pub fn compile_json(json: &str, options: &CompilerOptions) -> Result<CompilerOutput> {
    let program: Program = serde_json::from_str(json)?;
    compile_program(&program, options)
}

/// Reads a JSON syntax tree from `path` and lowers it
pub fn compile_file(path: &Path, options: &CompilerOptions) -> Result<CompilerOutput> {
    tracing::info!("reading {}", path.display());
    let json = fs::read_to_string(path).map_err(|source| CompilerError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    compile_json(&json, options)
}

/// Renders diagnostics one per paragraph, with source snippets when the
/// source text is known
pub fn format_diagnostics(
    diagnostics: &[Diagnostic],
    source: Option<&str>,
    with_color: bool,
) -> String {
    diagnostics
        .iter()
        .map(|diagnostic| build_diagnostic_message(source, diagnostic, with_color))
        .collect::<Vec<_>>()
        .join("\n")
}
