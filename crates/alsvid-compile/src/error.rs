//! Compile errors.
//!
//! Every variant carries the source [`Coordinate`] of the offending node.
//! The first error aborts compilation.

use thiserror::Error;

use alsvid_qasm2::Coordinate;

/// Errors raised while lowering a parsed program.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CompileError {
    #[error("{coordinate}: Invalid program version")]
    InvalidVersion { coordinate: Coordinate },

    #[error("{coordinate}: Incorrect command")]
    IncorrectCommand { coordinate: Coordinate },

    #[error("{coordinate}: Opaques are not supported")]
    OpaqueUnsupported { coordinate: Coordinate },

    #[error("{coordinate}: Only built in gates can contain uppercase characters")]
    UppercaseGateName { coordinate: Coordinate },

    #[error("{coordinate}: Duplicate gate declaration")]
    DuplicateGate { coordinate: Coordinate },

    #[error("{coordinate}: Gate not declared yet")]
    UnknownGate { coordinate: Coordinate },

    #[error("{coordinate}: Too few parameters")]
    TooFewParameters { coordinate: Coordinate },

    #[error("{coordinate}: Too many parameters")]
    TooManyParameters { coordinate: Coordinate },

    #[error("{coordinate}: Too few arguments")]
    TooFewArguments { coordinate: Coordinate },

    #[error("{coordinate}: Too many arguments")]
    TooManyArguments { coordinate: Coordinate },

    #[error("{coordinate}: Register size is incompatible with the other registers")]
    IncompatibleBroadcast { coordinate: Coordinate },

    #[error("{coordinate}: Register sizes don't match")]
    RegisterSizeMismatch { coordinate: Coordinate },

    #[error("{coordinate}: Register not declared yet")]
    UnknownRegister { coordinate: Coordinate },

    #[error("{coordinate}: Qubit index is out of range")]
    QubitIndexOutOfRange { coordinate: Coordinate },

    #[error("{coordinate}: Bit index is out of range")]
    BitIndexOutOfRange { coordinate: Coordinate },

    #[error("{coordinate}: Local qubit can't be indexed")]
    LocalQubitIndexed { coordinate: Coordinate },

    #[error("{coordinate}: Local qubit doesn't exist")]
    UnknownLocalQubit { coordinate: Coordinate },

    #[error("{coordinate}: Unknown constant")]
    UnknownConstant { coordinate: Coordinate },

    #[error("{coordinate}: Unknown function")]
    UnknownFunction { coordinate: Coordinate },
}

/// Result type for compilation.
pub type CompileResult<T> = Result<T, CompileError>;
