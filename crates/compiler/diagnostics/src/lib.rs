//! # Mana Diagnostics
//!
//! Diagnostic types shared by every compiler phase. Phases never print
//! anything themselves: they push [`Diagnostic`]s into a
//! [`DiagnosticCollection`] handed to them by the caller, and the caller
//! decides how to render them (see [`build_diagnostic_message`]).

mod diagnostics;
mod reporting;

pub use diagnostics::{
    Diagnostic, DiagnosticCode, DiagnosticCollection, DiagnosticSeverity, SourceLocation,
};
pub use reporting::{build_diagnostic_message, line_column_to_offset};
