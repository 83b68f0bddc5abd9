//! Error types for snippet synthesis.

use thiserror::Error;

/// Errors that can occur while turning statements into a program.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SynthError {
    /// No statements were given.
    #[error("no statements to run")]
    NoStatements,

    /// An explicit import is not a valid Rust path.
    #[error("invalid import {path:?}: {message}")]
    InvalidImport { path: String, message: String },

    /// Two explicit imports end in the same name.
    #[error("multiple {name:?} imports specified")]
    DuplicateImport { name: String },

    /// The statements don't parse. Positions are relative to the
    /// statement the error was found in, starting at 1:1.
    #[error("{}", format_parse_error(.statement, .statement_count, .line, .column, .message))]
    Parse {
        statement: usize,
        statement_count: usize,
        line: usize,
        column: usize,
        message: String,
    },

    /// A name is used but nothing provides it.
    #[error("undefined name {name:?}, did you forget the -i flag?")]
    UndefinedName { name: String },

    /// A name matches more than one item in the standard library.
    #[error("multiple {name:?} items in std, use flag {}", flag_choices(.candidates))]
    AmbiguousName { name: String, candidates: Vec<String> },
}

fn format_parse_error(
    statement: &usize,
    statement_count: &usize,
    line: &usize,
    column: &usize,
    message: &str,
) -> String {
    if *statement_count > 1 {
        format!("statement {}: {}:{}: {}", statement, line, column, message)
    } else {
        format!("{}:{}: {}", line, column, message)
    }
}

fn flag_choices(candidates: &[String]) -> String {
    candidates
        .iter()
        .map(|path| format!("\"-i {}\"", path))
        .collect::<Vec<_>>()
        .join(" or ")
}

/// Result type for synthesis operations.
pub type Result<T> = std::result::Result<T, SynthError>;
