//! @ai:module:intent Define error types for difflint
//! @ai:module:layer domain
//! @ai:module:public_api Error, ErrorCategory, Result
//! @ai:module:stateless true

use std::path::PathBuf;
use thiserror::Error;

/// @ai:intent Unified error type for all difflint operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No directive template for file {path} (extension {extension:?})")]
    NoTemplateForFile {
        path: String,
        extension: Option<String>,
    },

    #[error("Directive template {template:?} is missing its '?' placeholder")]
    MissingPlaceholder { template: String },

    #[error("Unknown directive {directive:?} at {file}:{line}")]
    UnknownDirective {
        file: String,
        line: usize,
        directive: String,
    },

    #[error("Unexpected IF at {file}:{line}: rule opened at line {open_line} is not closed")]
    UnexpectedIf {
        file: String,
        line: usize,
        open_line: usize,
    },

    #[error("Unexpected END at {file}:{line}: no open rule")]
    UnexpectedEnd { file: String, line: usize },

    #[error("Unterminated rule at {file}:{line}: missing END")]
    UnterminatedRule { file: String, line: usize },

    #[error("Too many END arguments at {file}:{line}: {args:?}")]
    TooManyEndArguments {
        file: String,
        line: usize,
        args: Vec<String>,
    },

    #[error("Invalid target {target:?} at {file}:{line}")]
    InvalidTarget {
        file: String,
        line: usize,
        target: String,
    },

    #[error("Malformed diff at line {line}: {message}")]
    MalformedDiff { line: usize, message: String },

    #[error("Invalid glob pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("Invalid config {path}: {message}")]
    Config { path: PathBuf, message: String },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// @ai:intent Coarse classification of errors for reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Syntax,
    Io,
}

impl Error {
    /// @ai:intent Classify the error as configuration, syntax or IO
    /// @ai:effects pure
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::NoTemplateForFile { .. }
            | Error::MissingPlaceholder { .. }
            | Error::InvalidPattern { .. }
            | Error::Config { .. } => ErrorCategory::Configuration,
            Error::UnknownDirective { .. }
            | Error::UnexpectedIf { .. }
            | Error::UnexpectedEnd { .. }
            | Error::UnterminatedRule { .. }
            | Error::TooManyEndArguments { .. }
            | Error::InvalidTarget { .. } => ErrorCategory::Syntax,
            Error::Io(_) | Error::FileRead { .. } | Error::MalformedDiff { .. } | Error::Json(_) => {
                ErrorCategory::Io
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_error_message_names_file_and_line() {
        let err = Error::UnexpectedEnd {
            file: "main.py".to_string(),
            line: 7,
        };
        assert_eq!(err.to_string(), "Unexpected END at main.py:7: no open rule");
        assert_eq!(err.category(), ErrorCategory::Syntax);
    }

    #[test]
    fn test_categories() {
        let config = Error::MissingPlaceholder {
            template: "#LINT.".to_string(),
        };
        assert_eq!(config.category(), ErrorCategory::Configuration);

        let io = Error::MalformedDiff {
            line: 3,
            message: "bad header".to_string(),
        };
        assert_eq!(io.category(), ErrorCategory::Io);
    }
}
