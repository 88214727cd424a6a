//! Alsvid compiler: QASM 2.0 tree → instruction stream
//!
//! [`compile`] lowers the tree produced by `alsvid-qasm2` into an
//! [`alsvid_ir::Program`] in a single traversal: register declarations
//! allocate dense global ids, user gate declarations are recorded and
//! expanded at their call sites (with broadcast over whole-register
//! arguments), and `if` guards become [`alsvid_ir::Instruction::Condition`]
//! entries carrying a forward skip offset.
//!
//! Parameter expressions are folded to `f64` by [`eval::eval`] against the
//! enclosing gate scope's constants.
//!
//! # Example
//!
//! ```rust
//! use alsvid_compile::compile;
//! use alsvid_qasm2::parse_source;
//!
//! let ast = parse_source(
//!     "OPENQASM 2.0;\nqreg q[2];\ncreg c[2];\nCX q[0], q[1];\nmeasure q -> c;",
//!     "bell.qasm",
//! )
//! .unwrap();
//!
//! let program = compile(&ast).unwrap();
//! assert_eq!(program.instructions().len(), 3);
//! ```

pub mod compiler;
pub mod error;
pub mod eval;

pub use compiler::compile;
pub use error::{CompileError, CompileResult};
