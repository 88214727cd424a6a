//! Error types for shot execution.

use thiserror::Error;

use alsvid_ir::BitId;

/// Errors that can occur while executing a shot.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SimError {
    /// A classical bit was assigned something other than 0 or 1.
    #[error("value {value} is out of range for classical bit {bit}")]
    BitValueOutOfRange { bit: BitId, value: u8 },
}

/// Result type for simulation operations.
pub type SimResult<T> = Result<T, SimError>;
