//! The compiled program container.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io;

use crate::instruction::Instruction;
use crate::register::BitId;

/// A compiled program: the instruction stream plus the register bookkeeping
/// the executor and result printer need.
///
/// The classical register layout maps each declared `creg` name to its
/// ordered list of global bit ids. A `BTreeMap` keeps result lines in a
/// stable name order across runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Program {
    bit_count: u32,
    qubit_count: u32,
    creg_layout: BTreeMap<String, Vec<BitId>>,
    instructions: Vec<Instruction>,
}

impl Program {
    /// Assemble a program from compiler output.
    pub fn new(
        bit_count: u32,
        qubit_count: u32,
        creg_layout: BTreeMap<String, Vec<BitId>>,
        instructions: Vec<Instruction>,
    ) -> Self {
        Self {
            bit_count,
            qubit_count,
            creg_layout,
            instructions,
        }
    }

    /// Total number of classical bits.
    pub fn bit_count(&self) -> u32 {
        self.bit_count
    }

    /// Total number of qubits.
    pub fn qubit_count(&self) -> u32 {
        self.qubit_count
    }

    /// The instruction stream.
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// The classical register layout, keyed by register name.
    pub fn creg_layout(&self) -> &BTreeMap<String, Vec<BitId>> {
        &self.creg_layout
    }

    /// Write a one-line-per-instruction listing.
    ///
    /// A `Condition` in `qe` mode reports how many payload lines to comment
    /// out; the counter threads through the loop so nested output stays
    /// aligned with execution order.
    pub fn write_listing(&self, out: &mut impl io::Write, qe: bool) -> io::Result<()> {
        let mut comment = 0usize;
        for instruction in &self.instructions {
            if comment > 0 {
                comment -= 1;
                write!(out, "// ")?;
            }
            comment = instruction.write_listing_line(out, qe)?;
        }
        Ok(())
    }
}
