//! Line classification: comments, variable definitions and rule statements

use super::error::{CompileError, CompileErrorKind};
use crate::config::compile_time::compiler::MAX_STATEMENTS;
use crate::config::compile_time::file_processing::MAX_LINE_LENGTH;

/// One `;`-separated statement with the line it was written on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub line: usize,
    /// Full original line, kept for diagnostics
    pub source: String,
    pub kind: StatementKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatementKind {
    Variable { name: String, value: String },
    Rule { text: String },
}

impl Statement {
    pub fn error(&self, kind: CompileErrorKind) -> CompileError {
        CompileError::new(self.line, &self.source, kind)
    }
}

/// Whether a line is a comment
///
/// Only a `#` that starts the line counts; inside a rule `#` is the word boundary.
pub fn is_comment(line: &str) -> bool {
    line.trim_start().starts_with('#')
}

/// Whether a statement defines a variable (`=` before any `>`)
pub fn is_variable_definition(statement: &str) -> bool {
    match (statement.find('='), statement.find('>')) {
        (Some(eq), Some(gt)) => eq < gt,
        (Some(_), None) => true,
        _ => false,
    }
}

/// Variable names are non-empty and purely alphanumeric
pub fn is_valid_variable_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(char::is_alphanumeric)
}

/// Split a `name = value` statement
pub fn parse_variable(statement: &str) -> Result<(String, String), CompileErrorKind> {
    let (name, value) = statement
        .split_once('=')
        .ok_or_else(|| CompileErrorKind::malformed_variable("missing '='"))?;

    let name = name.trim();
    let value = value.trim();

    if name.is_empty() {
        return Err(CompileErrorKind::malformed_variable("missing name"));
    }
    if !is_valid_variable_name(name) {
        return Err(CompileErrorKind::malformed_variable(&format!(
            "'{}' is not an alphanumeric name",
            name
        )));
    }
    if value.is_empty() {
        return Err(CompileErrorKind::malformed_variable(&format!(
            "'{}' has no value",
            name
        )));
    }
    if value.contains('=') {
        return Err(CompileErrorKind::malformed_variable("more than one '='"));
    }

    Ok((name.to_string(), value.to_string()))
}

/// Split rule text into classified statements, dropping blanks and comments
pub fn classify(text: &str) -> Result<Vec<Statement>, CompileError> {
    let mut statements = Vec::new();

    for (index, raw_line) in text.lines().enumerate() {
        let line = index + 1;

        let length = raw_line.chars().count();
        if length > MAX_LINE_LENGTH {
            return Err(CompileError::new(
                line,
                raw_line,
                CompileErrorKind::LineTooLong {
                    length,
                    max: MAX_LINE_LENGTH,
                },
            ));
        }

        if raw_line.trim().is_empty() || is_comment(raw_line) {
            continue;
        }

        for piece in raw_line.split(';') {
            let piece = piece.trim();
            if piece.is_empty() {
                continue;
            }

            let kind = if is_variable_definition(piece) {
                let (name, value) = parse_variable(piece)
                    .map_err(|kind| CompileError::new(line, raw_line, kind))?;
                StatementKind::Variable { name, value }
            } else {
                StatementKind::Rule {
                    text: piece.to_string(),
                }
            };

            statements.push(Statement {
                line,
                source: raw_line.to_string(),
                kind,
            });

            if statements.len() > MAX_STATEMENTS {
                return Err(CompileError::new(
                    line,
                    raw_line,
                    CompileErrorKind::LimitExceeded {
                        what: "statements",
                        count: statements.len(),
                        max: MAX_STATEMENTS,
                    },
                ));
            }
        }
    }

    Ok(statements)
}
