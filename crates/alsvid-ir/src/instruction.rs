//! The flat instruction set executed by the simulator.

use serde::{Deserialize, Serialize};
use std::io;

use crate::register::{BitId, QubitId};

/// One instruction of a compiled program.
///
/// Instructions refer to qubits and classical bits exclusively by global id;
/// register names survive only in the program's layout table for result
/// printing. `Condition` guards the following `jump` instructions: when its
/// criteria does not match at run time, the program counter skips them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Instruction {
    /// The built-in single-qubit unitary `U(θ, φ, λ)`.
    U {
        theta: f64,
        phi: f64,
        lambda: f64,
        qubit: QubitId,
    },
    /// The built-in controlled-NOT.
    CX { control: QubitId, target: QubitId },
    /// Scheduling barrier; a no-op at execution time.
    Barrier { qubit: QubitId },
    /// Project a qubit onto |0⟩ and renormalize.
    Reset { qubit: QubitId },
    /// Projective measurement of a qubit into a classical bit.
    Measure { qubit: QubitId, bit: BitId },
    /// Conditional guard over the next `jump` instructions.
    Condition {
        bits: Vec<BitId>,
        criteria: u64,
        jump: usize,
    },
}

impl Instruction {
    /// Mnemonic of the instruction.
    pub fn name(&self) -> &str {
        match self {
            Instruction::U { .. } => "u",
            Instruction::CX { .. } => "cx",
            Instruction::Barrier { .. } => "barrier",
            Instruction::Reset { .. } => "reset",
            Instruction::Measure { .. } => "measure",
            Instruction::Condition { .. } => "condition",
        }
    }

    /// Check if this is a conditional guard.
    pub fn is_condition(&self) -> bool {
        matches!(self, Instruction::Condition { .. })
    }

    /// Write the listing line for this instruction.
    ///
    /// With `qe` the output approximates what the IBM Quantum Experience
    /// accepts: `U` renders as `u3`, and a `Condition` asks the caller to
    /// comment out its guarded payload by returning the number of following
    /// lines to prefix with `// `.
    pub fn write_listing_line(&self, out: &mut impl io::Write, qe: bool) -> io::Result<usize> {
        match self {
            Instruction::U {
                theta,
                phi,
                lambda,
                qubit,
            } => {
                let mnemonic = if qe { "u3" } else { "u" };
                writeln!(out, "{mnemonic} ({theta}, {phi}, {lambda}) {qubit};")?;
                Ok(0)
            }
            Instruction::CX { control, target } => {
                writeln!(out, "cx {control}, {target};")?;
                Ok(0)
            }
            Instruction::Barrier { qubit } => {
                writeln!(out, "barrier {qubit};")?;
                Ok(0)
            }
            Instruction::Reset { qubit } => {
                writeln!(out, "reset {qubit};")?;
                Ok(0)
            }
            Instruction::Measure { qubit, bit } => {
                writeln!(out, "measure {qubit} -> {bit};")?;
                Ok(0)
            }
            Instruction::Condition {
                bits,
                criteria,
                jump,
            } => {
                if qe {
                    write!(out, "// conditions are not supported in the Quantum Experience ")?;
                }
                write!(out, "condition (")?;
                for (i, bit) in bits.iter().enumerate() {
                    if i > 0 {
                        write!(out, ", ")?;
                    }
                    write!(out, "{bit}")?;
                }
                writeln!(out, " == {criteria}): {jump};")?;
                Ok(if qe { *jump } else { 0 })
            }
        }
    }
}
