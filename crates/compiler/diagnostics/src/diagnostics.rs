//! # Diagnostic System
//!
//! This module provides the diagnostic infrastructure for reporting errors,
//! warnings and informational notes while a program is lowered.

use ariadne::ReportKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A position in a source file, 1-based. Line 0 means "unknown".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    pub file: String,
    pub line: u32,
    pub column: u32,
}

impl SourceLocation {
    pub fn new(file: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }

    /// Returns true if this location does not point anywhere
    pub const fn is_unknown(&self) -> bool {
        self.line == 0
    }
}

impl Default for SourceLocation {
    fn default() -> Self {
        Self::new("<unknown>", 0, 0)
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// A diagnostic message emitted during compilation
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Diagnostic {
    pub severity: DiagnosticSeverity,
    pub code: DiagnosticCode,
    pub message: String,
    /// Source location where this diagnostic applies
    pub location: SourceLocation,
    /// Optional related locations for additional context
    pub related: Vec<(SourceLocation, String)>,
}

/// Severity of a diagnostic, most severe first so that sorting puts the
/// worst problems at the top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiagnosticSeverity {
    Fatal,
    Error,
    Warning,
    Info,
}

impl DiagnosticSeverity {
    /// Returns true for severities that make the compilation unusable
    pub const fn is_error(self) -> bool {
        matches!(self, Self::Fatal | Self::Error)
    }
}

impl From<ReportKind<'static>> for DiagnosticSeverity {
    fn from(kind: ReportKind<'static>) -> Self {
        match kind {
            ReportKind::Error => Self::Error,
            ReportKind::Warning => Self::Warning,
            ReportKind::Advice => Self::Info,
            ReportKind::Custom(_, _) => Self::Info,
        }
    }
}

impl From<DiagnosticSeverity> for ReportKind<'static> {
    fn from(severity: DiagnosticSeverity) -> Self {
        match severity {
            DiagnosticSeverity::Fatal => ReportKind::Custom("Fatal", ariadne::Color::Red),
            DiagnosticSeverity::Error => ReportKind::Error,
            DiagnosticSeverity::Warning => ReportKind::Warning,
            DiagnosticSeverity::Info => ReportKind::Advice,
        }
    }
}

impl fmt::Display for DiagnosticSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fatal => write!(f, "fatal"),
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
            Self::Info => write!(f, "info"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCode {
    // Scope-related errors (1000-1999)
    UndeclaredVariable,
    UndeclaredFunction,
    DuplicateDefinition,

    // Type-related errors (2000-2999)
    TypeMismatch,
    InvalidFunctionCall,
    NotCallable,
    InvalidAssignment,
    InvalidReturnType,

    // Malformed constructs (3000-3999)
    MissingInitializer,
    ReturnOutsideFunction,
    UnreachableCode,

    // Structural failures (4000-4999)
    FunctionVerification,
    ModuleVerification,
}

impl From<DiagnosticCode> for u32 {
    fn from(code: DiagnosticCode) -> Self {
        match code {
            DiagnosticCode::UndeclaredVariable => 1001,
            DiagnosticCode::UndeclaredFunction => 1002,
            DiagnosticCode::DuplicateDefinition => 1003,
            DiagnosticCode::TypeMismatch => 2001,
            DiagnosticCode::InvalidFunctionCall => 2002,
            DiagnosticCode::NotCallable => 2003,
            DiagnosticCode::InvalidAssignment => 2004,
            DiagnosticCode::InvalidReturnType => 2005,
            DiagnosticCode::MissingInitializer => 3001,
            DiagnosticCode::ReturnOutsideFunction => 3002,
            DiagnosticCode::UnreachableCode => 3003,
            DiagnosticCode::FunctionVerification => 4001,
            DiagnosticCode::ModuleVerification => 4002,
        }
    }
}

impl Diagnostic {
    pub fn new(severity: DiagnosticSeverity, code: DiagnosticCode, message: String) -> Self {
        Self {
            severity,
            code,
            message,
            location: SourceLocation::default(),
            related: Vec::new(),
        }
    }

    /// Create a fatal diagnostic
    pub fn fatal(code: DiagnosticCode, message: String) -> Self {
        Self::new(DiagnosticSeverity::Fatal, code, message)
    }

    /// Create an error diagnostic
    pub fn error(code: DiagnosticCode, message: String) -> Self {
        Self::new(DiagnosticSeverity::Error, code, message)
    }

    /// Create a warning diagnostic
    pub fn warning(code: DiagnosticCode, message: String) -> Self {
        Self::new(DiagnosticSeverity::Warning, code, message)
    }

    /// Create an info diagnostic
    pub fn info(code: DiagnosticCode, message: String) -> Self {
        Self::new(DiagnosticSeverity::Info, code, message)
    }

    /// Add location information to this diagnostic
    pub fn with_location(mut self, location: SourceLocation) -> Self {
        self.location = location;
        self
    }

    /// Add a related location with context message
    pub fn with_related(mut self, location: SourceLocation, message: String) -> Self {
        self.related.push((location, message));
        self
    }

    /// Convenience method for an unresolved variable
    pub fn undeclared_variable(name: &str, location: SourceLocation) -> Self {
        Self::error(
            DiagnosticCode::UndeclaredVariable,
            format!("Unknown variable name: {name}"),
        )
        .with_location(location)
    }

    /// Convenience method for an unresolved function
    pub fn undeclared_function(name: &str, location: SourceLocation) -> Self {
        Self::error(
            DiagnosticCode::UndeclaredFunction,
            format!("Unknown function name: {name}"),
        )
        .with_location(location)
    }

    /// Convenience method for duplicate definition error
    pub fn duplicate_definition(name: &str, location: SourceLocation) -> Self {
        Self::error(
            DiagnosticCode::DuplicateDefinition,
            format!("Duplicate definition of '{name}'"),
        )
        .with_location(location)
    }

    /// Convenience method for operator/operand type errors
    pub fn type_mismatch(message: String, location: SourceLocation) -> Self {
        Self::error(DiagnosticCode::TypeMismatch, message).with_location(location)
    }

    pub fn not_callable(location: SourceLocation) -> Self {
        Self::error(
            DiagnosticCode::NotCallable,
            "Expression is not callable".to_string(),
        )
        .with_location(location)
    }

    /// Convenience method for `const` declarations without a value
    pub fn missing_initializer(name: &str, location: SourceLocation) -> Self {
        Self::error(
            DiagnosticCode::MissingInitializer,
            format!("Constant '{name}' must be initialized"),
        )
        .with_location(location)
    }

    pub fn return_outside_function(location: SourceLocation) -> Self {
        Self::error(
            DiagnosticCode::ReturnOutsideFunction,
            "Return statement outside of function".to_string(),
        )
        .with_location(location)
    }

    /// Convenience method for unreachable code warning
    pub fn unreachable_code(statement_type: &str, location: SourceLocation) -> Self {
        Self::warning(
            DiagnosticCode::UnreachableCode,
            format!("Unreachable {statement_type}"),
        )
        .with_location(location)
    }

    pub fn function_verification_failed(
        name: &str,
        reason: &str,
        location: SourceLocation,
    ) -> Self {
        Self::error(
            DiagnosticCode::FunctionVerification,
            format!("Function verification failed: {name}: {reason}"),
        )
        .with_location(location)
    }

    pub fn module_verification_failed(reason: &str) -> Self {
        Self::fatal(
            DiagnosticCode::ModuleVerification,
            format!("Module verification failed: {reason}"),
        )
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.location, self.severity, self.message)?;
        for (location, message) in &self.related {
            write!(f, "\n  note: {message} (at {location})")?;
        }
        Ok(())
    }
}

/// Collection of diagnostics produced by one compilation.
///
/// This is the sink handed explicitly to every phase. Its had-errors flag is
/// sticky: once an ERROR or FATAL diagnostic has been recorded it stays set
/// until [`DiagnosticCollection::clear`] is called.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct DiagnosticCollection {
    diagnostics: Vec<Diagnostic>,
    had_errors: bool,
}

impl DiagnosticCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a diagnostic with the given severity at `location`
    pub fn report(
        &mut self,
        severity: DiagnosticSeverity,
        code: DiagnosticCode,
        message: impl Into<String>,
        location: SourceLocation,
    ) {
        self.add(Diagnostic::new(severity, code, message.into()).with_location(location));
    }

    /// Add a diagnostic to the collection
    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.had_errors |= diagnostic.severity.is_error();
        self.diagnostics.push(diagnostic);
    }

    /// Add multiple diagnostics
    pub fn extend(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        for diagnostic in diagnostics {
            self.add(diagnostic);
        }
    }

    pub fn all(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Get error and fatal diagnostics
    pub fn errors(&self) -> Vec<&Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity.is_error())
            .collect()
    }

    /// Get only warning diagnostics
    pub fn warnings(&self) -> Vec<&Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == DiagnosticSeverity::Warning)
            .collect()
    }

    /// The aggregate had-errors flag
    pub const fn has_errors(&self) -> bool {
        self.had_errors
    }

    /// Get the total number of diagnostics
    pub const fn len(&self) -> usize {
        self.diagnostics.len()
    }

    /// Check if the collection is empty
    pub const fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Drops every diagnostic and resets the had-errors flag
    pub fn clear(&mut self) {
        self.diagnostics.clear();
        self.had_errors = false;
    }

    /// Sort diagnostics by severity (fatal first) and then by location
    pub fn sort(&mut self) {
        self.diagnostics.sort_by(|a, b| {
            a.severity
                .cmp(&b.severity)
                .then(a.location.line.cmp(&b.location.line))
                .then(a.location.column.cmp(&b.location.column))
                .then(a.message.cmp(&b.message))
        });
    }

    /// Get summary statistics
    pub fn summary(&self) -> String {
        let errors = self.errors().len();
        let warnings = self.warnings().len();

        if self.diagnostics.is_empty() {
            "No issues found".to_string()
        } else {
            format!("{errors} errors, {warnings} warnings")
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.diagnostics.iter()
    }
}

impl From<Vec<Diagnostic>> for DiagnosticCollection {
    fn from(diagnostics: Vec<Diagnostic>) -> Self {
        let mut collection = Self::new();
        collection.extend(diagnostics);
        collection
    }
}

impl IntoIterator for DiagnosticCollection {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.diagnostics.into_iter()
    }
}

impl<'a> IntoIterator for &'a DiagnosticCollection {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.diagnostics.iter()
    }
}
