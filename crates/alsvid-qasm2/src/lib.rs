//! `OpenQASM` 2.0 front end for Alsvid
//!
//! This crate turns QASM 2.0 source text into an owned abstract syntax tree:
//! tokens are produced by a [logos](https://docs.rs/logos) lexer, carry
//! [`Coordinate`]s back into the source, and are consumed by a recursive
//! descent parser. `include` directives are resolved here — relative to the
//! including file's directory, absolute paths as-is — and arrive in the tree
//! as [`ast::CommandKind::Include`] nodes wrapping the child file's commands.
//!
//! The tree is the input of `alsvid-compile`, which lowers it into a flat
//! instruction stream.
//!
//! # Example
//!
//! ```rust
//! use alsvid_qasm2::parse_source;
//!
//! let program = parse_source(
//!     "OPENQASM 2.0;\nqreg q[2];\ncreg c[2];\nCX q[0], q[1];",
//!     "bell.qasm",
//! )
//! .unwrap();
//!
//! assert_eq!(program.commands.len(), 3);
//! ```

pub mod ast;
pub mod coordinate;
pub mod error;
pub mod lexer;
pub mod parser;

pub use coordinate::Coordinate;
pub use error::{ParseError, ParseResult};
pub use parser::{parse_file, parse_source};
