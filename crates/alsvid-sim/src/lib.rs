//! Alsvid state-vector simulator
//!
//! Executes compiled instruction streams from `alsvid-ir` against a dense
//! complex state vector. Each shot owns a fresh [`Environment`] — classical
//! bit cells plus `2^Q` amplitudes — and walks the program with a program
//! counter that honours conditional skip offsets. Finished shots fold the
//! classical bits into a histogram bucket on the [`Simulator`].
//!
//! Measurement randomness is injected: any [`rand::Rng`] works, so tests can
//! seed a [`rand::rngs::StdRng`] and get reproducible outcome sequences.
//!
//! # Example
//!
//! ```rust
//! use alsvid_ir::{BitId, Instruction, Program, QubitId};
//! use alsvid_sim::Simulator;
//! use std::collections::BTreeMap;
//! use std::f64::consts::PI;
//!
//! let mut layout = BTreeMap::new();
//! layout.insert("c".to_string(), vec![BitId(0)]);
//!
//! // Flip the qubit, then measure: every shot lands in bucket 1.
//! let program = Program::new(
//!     1,
//!     1,
//!     layout,
//!     vec![
//!         Instruction::U {
//!             theta: PI,
//!             phi: 0.0,
//!             lambda: PI,
//!             qubit: QubitId(0),
//!         },
//!         Instruction::Measure {
//!             qubit: QubitId(0),
//!             bit: BitId(0),
//!         },
//!     ],
//! );
//!
//! let mut simulator = Simulator::new(program);
//! simulator.run(100).unwrap();
//! assert_eq!(simulator.counts()[1], 100);
//! ```

pub mod environment;
pub mod error;
pub mod executor;

pub use environment::Environment;
pub use error::{SimError, SimResult};
pub use executor::{Simulator, step};
