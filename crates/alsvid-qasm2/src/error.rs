//! Error types for the QASM 2.0 front end.

use std::path::PathBuf;

use thiserror::Error;

use crate::coordinate::Coordinate;

/// Errors that can occur while tokenizing or parsing.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// No token rule matched the input.
    #[error("{coordinate}: no token matches the input here")]
    Tokenize { coordinate: Coordinate },

    /// Unexpected token.
    #[error("{coordinate}: expected {expected}, found {found}")]
    UnexpectedToken {
        coordinate: Coordinate,
        expected: String,
        found: String,
    },

    /// Input ended in the middle of a construct.
    #[error("unexpected end of input: expected {0}")]
    UnexpectedEof(String),

    /// An included file could not be read.
    #[error("{coordinate}: cannot read included file {path:?}")]
    Include {
        coordinate: Coordinate,
        path: PathBuf,
        source: std::io::Error,
    },

    /// The top-level source file could not be read.
    #[error("cannot read {path:?}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;
