//! Abstract syntax tree for `OpenQASM` 2.0.
//!
//! The tree is fully owned: every node owns its children by value, and the
//! compiler consumes it read-only. Each node carries the [`Coordinate`] it
//! was parsed at for error reporting.

use serde::{Deserialize, Serialize};

use crate::coordinate::Coordinate;

/// A complete QASM 2.0 program.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Program {
    /// Declared language version (`OPENQASM 2.0;`).
    pub version: f64,
    /// Top-level commands in source order.
    pub commands: Vec<Command>,
    /// Coordinate of the `OPENQASM` keyword.
    pub coordinate: Coordinate,
}

/// A command with its source coordinate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Command {
    pub coordinate: Coordinate,
    pub kind: CommandKind,
}

/// The kind of command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CommandKind {
    /// `include "file";` — the child file's commands, parsed inline.
    Include { commands: Vec<Command> },

    /// `creg name[size];`
    CregDecl { name: String, size: u64 },

    /// `qreg name[size];`
    QregDecl { name: String, size: u64 },

    /// `gate name(params) args { body }`
    GateDecl(GateDecl),

    /// `opaque name(params) args;`
    OpaqueDecl {
        name: String,
        params: Vec<String>,
        args: Vec<String>,
    },

    /// A gate invocation.
    GateCall(GateCall),

    /// `barrier regs;`
    Barrier { args: Vec<RegRef> },

    /// `reset reg;`
    Reset { target: RegRef },

    /// `measure qreg -> creg;`
    Measure { source: RegRef, target: RegRef },

    /// `if (creg == criteria) command`
    Condition {
        reg: RegRef,
        criteria: u64,
        command: Box<Command>,
    },
}

impl Command {
    /// Short name of the command kind, for error messages and debugging.
    pub fn name(&self) -> &str {
        match &self.kind {
            CommandKind::Include { .. } => "include",
            CommandKind::CregDecl { .. } => "creg",
            CommandKind::QregDecl { .. } => "qreg",
            CommandKind::GateDecl(_) => "gate declaration",
            CommandKind::OpaqueDecl { .. } => "opaque declaration",
            CommandKind::GateCall(_) => "gate call",
            CommandKind::Barrier { .. } => "barrier",
            CommandKind::Reset { .. } => "reset",
            CommandKind::Measure { .. } => "measure",
            CommandKind::Condition { .. } => "condition",
        }
    }
}

/// A user gate declaration.
///
/// The body is restricted by the compiler to gate calls and barriers; the
/// parser accepts exactly that subset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateDecl {
    /// Gate name.
    pub name: String,
    /// Formal parameter names (angle expressions at the call site).
    pub params: Vec<String>,
    /// Formal argument names (single qubits at expansion time).
    pub args: Vec<String>,
    /// Body commands.
    pub body: Vec<Command>,
}

/// A gate invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateCall {
    /// Gate name (`U`, `CX`, or a declared gate).
    pub name: String,
    /// Parameter expressions.
    pub params: Vec<Expression>,
    /// Register arguments.
    pub args: Vec<RegRef>,
}

/// A reference to a register, optionally narrowed to one element.
///
/// Used for both classical and quantum registers; which one is meant is
/// determined by the position in the grammar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegRef {
    pub coordinate: Coordinate,
    pub name: String,
    pub index: Option<u64>,
}

impl RegRef {
    /// Reference to a whole register.
    pub fn whole(coordinate: Coordinate, name: impl Into<String>) -> Self {
        Self {
            coordinate,
            name: name.into(),
            index: None,
        }
    }

    /// Reference to a single element of a register.
    pub fn indexed(coordinate: Coordinate, name: impl Into<String>, index: u64) -> Self {
        Self {
            coordinate,
            name: name.into(),
            index: Some(index),
        }
    }
}

/// A parameter expression with its source coordinate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expression {
    pub coordinate: Coordinate,
    pub kind: ExprKind,
}

/// The kind of expression.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ExprKind {
    /// A binary operation.
    Operation {
        op: BinOp,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    /// A numeric literal.
    Value(f64),
    /// A named constant (a gate-scope parameter, or `pi`).
    Constant(String),
    /// A call to one of the built-in real functions.
    Function { name: String, arg: Box<Expression> },
}

/// Binary operators in parameter expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}
