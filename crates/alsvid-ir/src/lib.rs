//! Alsvid instruction stream representation
//!
//! The compiler (`alsvid-compile`) lowers a parsed QASM 2.0 tree into the
//! types of this crate; the simulator (`alsvid-sim`) walks them. The design
//! is deliberately flat: no graph, no symbolic operands — just a
//! [`Vec<Instruction>`] over dense global [`QubitId`]/[`BitId`] indices, with
//! conditionals expressed as forward skip offsets.
//!
//! # Example
//!
//! ```rust
//! use alsvid_ir::{Instruction, QubitId};
//!
//! let cx = Instruction::CX {
//!     control: QubitId(0),
//!     target: QubitId(1),
//! };
//! assert_eq!(cx.name(), "cx");
//! ```

pub mod instruction;
pub mod program;
pub mod register;

pub use instruction::Instruction;
pub use program::Program;
pub use register::{BitId, QubitId};
