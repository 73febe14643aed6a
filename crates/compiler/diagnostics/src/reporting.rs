//! # Error Reporting Utilities
//!
//! Rendering of diagnostics for humans. When the original source text is
//! available the report is drawn by ariadne with a caret under the offending
//! location; otherwise the plain `file:line:col: severity: message` form is used.

use crate::Diagnostic;
use ariadne::{Label, Report, Source};

/// Converts a 1-based line/column pair into a byte offset into `source`.
///
/// Positions past the end of a line clamp to the line's end, and lines past
/// the end of the file clamp to the end of the text.
pub fn line_column_to_offset(source: &str, line: u32, column: u32) -> usize {
    if line == 0 {
        return 0;
    }
    let mut offset = 0;
    for (index, text) in source.split_inclusive('\n').enumerate() {
        if index + 1 == line as usize {
            let content = text.trim_end_matches(['\n', '\r']);
            let column = (column.max(1) - 1) as usize;
            let within = content
                .char_indices()
                .nth(column)
                .map_or(content.len(), |(byte, _)| byte);
            return offset + within;
        }
        offset += text.len();
    }
    source.len()
}

/// Build a formatted message for a diagnostic
///
/// `source` is the text of the file the diagnostic's location points into, if
/// the caller has it.
pub fn build_diagnostic_message(
    source: Option<&str>,
    diagnostic: &Diagnostic,
    with_color: bool,
) -> String {
    let Some(source) = source else {
        return diagnostic.to_string();
    };

    let location = &diagnostic.location;
    let start = line_column_to_offset(source, location.line, location.column);
    let end = (start + 1).min(source.len()).max(start);
    let code_u32: u32 = diagnostic.code.into();

    let mut report = Report::build(diagnostic.severity.into(), ((), start..end))
        .with_config(
            ariadne::Config::new()
                .with_index_type(ariadne::IndexType::Byte)
                .with_color(with_color),
        )
        .with_code(code_u32)
        .with_message(format!("{location}: {}", diagnostic.message))
        .with_label(Label::new(((), start..end)).with_message(&diagnostic.message));

    for (related, message) in &diagnostic.related {
        let offset = line_column_to_offset(source, related.line, related.column);
        let related_end = (offset + 1).min(source.len()).max(offset);
        report = report.with_label(Label::new(((), offset..related_end)).with_message(message));
    }

    let mut write_buffer = Vec::new();
    match report
        .finish()
        .write(Source::from(source), &mut write_buffer)
    {
        Ok(()) => String::from_utf8_lossy(&write_buffer).to_string(),
        Err(_) => diagnostic.to_string(),
    }
}
