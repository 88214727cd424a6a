//! The shot executor: a micro-interpreter over the instruction stream.

use num_complex::Complex64;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io;
use tracing::debug;

use alsvid_ir::{BitId, Instruction, Program};

use crate::environment::Environment;
use crate::error::SimResult;

/// Execute one instruction against an environment.
///
/// Returns the number of instructions the program counter must additionally
/// skip; only a failed [`Instruction::Condition`] ever returns non-zero.
pub fn step(
    instruction: &Instruction,
    env: &mut Environment,
    rng: &mut impl Rng,
) -> SimResult<usize> {
    let zero = Complex64::new(0.0, 0.0);

    match instruction {
        Instruction::U {
            theta,
            phi,
            lambda,
            qubit,
        } => {
            let c = (theta / 2.0).cos();
            let s = (theta / 2.0).sin();
            let matrix = [
                [
                    Complex64::from_polar(c, -(phi + lambda) / 2.0),
                    -Complex64::from_polar(s, -(phi - lambda) / 2.0),
                ],
                [
                    Complex64::from_polar(s, (phi - lambda) / 2.0),
                    Complex64::from_polar(c, (phi + lambda) / 2.0),
                ],
            ];
            env.apply_single(*qubit, &matrix);
            Ok(0)
        }
        Instruction::CX { control, target } => {
            let one = Complex64::new(1.0, 0.0);
            let matrix = [
                [one, zero, zero, zero],
                [zero, zero, zero, one],
                [zero, zero, one, zero],
                [zero, one, zero, zero],
            ];
            env.apply_double(*control, *target, &matrix);
            Ok(0)
        }
        Instruction::Barrier { .. } => Ok(0),
        Instruction::Reset { qubit } => {
            let one = Complex64::new(1.0, 0.0);
            env.apply_single(*qubit, &[[one, zero], [zero, zero]]);
            env.normalize();
            Ok(0)
        }
        Instruction::Measure { qubit, bit } => {
            let random: f64 = rng.r#gen();
            let chance = env.qubit_chance(*qubit);
            // With random uniform in [0, 1), P(outcome = 1) = chance.
            let outcome: u8 = if random > chance { 0 } else { 1 };

            let kept = Complex64::new(f64::from(outcome), 0.0);
            let dropped = Complex64::new(f64::from(1 - outcome), 0.0);
            env.apply_single(*qubit, &[[dropped, zero], [zero, kept]]);
            env.normalize();
            env.set_bit(*bit, outcome)?;
            Ok(0)
        }
        Instruction::Condition {
            bits,
            criteria,
            jump,
        } => {
            let mut value = 0u64;
            for (i, bit) in bits.iter().enumerate() {
                value += u64::from(env.bit(*bit)) << i;
            }

            Ok(if value == *criteria { 0 } else { *jump })
        }
    }
}

/// Executes a compiled program shot by shot, accumulating a histogram over
/// the final classical register configuration.
///
/// The randomness source is injected so tests can pin measurement outcomes;
/// [`Simulator::new`] seeds a [`StdRng`] from OS entropy.
pub struct Simulator<R: Rng = StdRng> {
    program: Program,
    results: Vec<u64>,
    execution_count: u64,
    rng: R,
}

impl Simulator<StdRng> {
    /// Create a simulator with an entropy-seeded generator.
    pub fn new(program: Program) -> Self {
        Self::with_rng(program, StdRng::from_entropy())
    }
}

impl<R: Rng> Simulator<R> {
    /// Create a simulator with a caller-supplied randomness source.
    pub fn with_rng(program: Program, rng: R) -> Self {
        let results = vec![0; 1usize << program.bit_count()];
        Self {
            program,
            results,
            execution_count: 0,
            rng,
        }
    }

    /// The program under execution.
    pub fn program(&self) -> &Program {
        &self.program
    }

    /// Histogram buckets, indexed by the packed classical register state
    /// (bit `i`'s final value at position `i`).
    pub fn counts(&self) -> &[u64] {
        &self.results
    }

    /// Number of completed shots.
    pub fn execution_count(&self) -> u64 {
        self.execution_count
    }

    /// Run one shot from a fresh environment and record its outcome.
    pub fn run_shot(&mut self) -> SimResult<()> {
        let Simulator {
            program,
            results,
            execution_count,
            rng,
        } = self;

        let mut env = Environment::new(
            program.bit_count() as usize,
            program.qubit_count() as usize,
        );

        let instructions = program.instructions();
        let mut pc = 0;
        while pc < instructions.len() {
            pc += step(&instructions[pc], &mut env, rng)?;
            pc += 1;
        }

        let mut index = 0usize;
        for bit in 0..program.bit_count() {
            index += usize::from(env.bit(BitId(bit))) << bit;
        }
        results[index] += 1;
        *execution_count += 1;
        Ok(())
    }

    /// Run `shots` independent shots.
    pub fn run(&mut self, shots: u64) -> SimResult<()> {
        debug!(
            "Starting simulation: {} qubits, {} shots",
            self.program.qubit_count(),
            shots
        );

        for shot in 0..shots {
            self.run_shot()?;
            if shot > 0 && shot % 1000 == 0 {
                debug!("Completed {} shots", shot);
            }
        }
        Ok(())
    }

    /// Write the histogram as one line per non-zero bucket.
    ///
    /// Each line lists every classical register with its bit string — the
    /// register's bit list iterated in reverse declaration order — followed
    /// by the bucket's relative frequency. Nothing is written before the
    /// first shot.
    #[allow(clippy::cast_precision_loss)]
    pub fn write_results(&self, out: &mut impl io::Write) -> io::Result<()> {
        if self.execution_count == 0 {
            return Ok(());
        }

        for (state, &count) in self.results.iter().enumerate() {
            if count == 0 {
                continue;
            }
            let chance = count as f64 / self.execution_count as f64;

            for (name, bits) in self.program.creg_layout() {
                write!(out, "{name}[")?;
                for bit in bits.iter().rev() {
                    write!(out, "{}", (state >> bit.index()) & 1)?;
                }
                write!(out, "] ")?;
            }
            writeln!(out, ": {chance}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alsvid_ir::QubitId;
    use std::collections::BTreeMap;
    use std::f64::consts::PI;

    fn seeded() -> StdRng {
        StdRng::seed_from_u64(0x5eed)
    }

    fn u(theta: f64, phi: f64, lambda: f64, qubit: u32) -> Instruction {
        Instruction::U {
            theta,
            phi,
            lambda,
            qubit: QubitId(qubit),
        }
    }

    #[test]
    fn test_identity_u_leaves_every_state() {
        let mut env = Environment::new(0, 2);
        let mut rng = seeded();

        step(&u(0.0, 0.0, 0.0, 0), &mut env, &mut rng).unwrap();
        step(&u(0.0, 0.0, 0.0, 1), &mut env, &mut rng).unwrap();

        assert!((env.state_chance(0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_u_pi_flips_qubit() {
        let mut env = Environment::new(0, 1);
        let mut rng = seeded();

        step(&u(PI, 0.0, PI, 0), &mut env, &mut rng).unwrap();
        assert!((env.state_chance(1) - 1.0).abs() < 1e-12);

        step(&u(PI, 0.0, PI, 0), &mut env, &mut rng).unwrap();
        assert!((env.state_chance(0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_u_norm_conservation() {
        let mut env = Environment::new(0, 3);
        let mut rng = seeded();

        for qubit in 0..3 {
            step(&u(1.1, 0.4, 2.2, qubit), &mut env, &mut rng).unwrap();
        }
        step(
            &Instruction::CX {
                control: QubitId(0),
                target: QubitId(2),
            },
            &mut env,
            &mut rng,
        )
        .unwrap();

        assert!((env.total_chance() - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_measure_deterministic_states() {
        // |1⟩ measures 1 with certainty, |0⟩ measures 0.
        let mut rng = seeded();

        let mut env = Environment::new(1, 1);
        step(&u(PI, 0.0, PI, 0), &mut env, &mut rng).unwrap();
        step(
            &Instruction::Measure {
                qubit: QubitId(0),
                bit: BitId(0),
            },
            &mut env,
            &mut rng,
        )
        .unwrap();
        assert_eq!(env.bit(BitId(0)), 1);
        assert!((env.state_chance(1) - 1.0).abs() < 1e-12);

        let mut env = Environment::new(1, 1);
        step(
            &Instruction::Measure {
                qubit: QubitId(0),
                bit: BitId(0),
            },
            &mut env,
            &mut rng,
        )
        .unwrap();
        assert_eq!(env.bit(BitId(0)), 0);
    }

    #[test]
    fn test_condition_jump_values() {
        let mut env = Environment::new(2, 1);
        let mut rng = seeded();

        let guard = Instruction::Condition {
            bits: vec![BitId(0), BitId(1)],
            criteria: 2,
            jump: 5,
        };

        // Bits 00 → value 0 ≠ 2: skip.
        assert_eq!(step(&guard, &mut env, &mut rng).unwrap(), 5);

        // Bits 01 (bit0=0, bit1=1) → value 2: execute.
        env.set_bit(BitId(1), 1).unwrap();
        assert_eq!(step(&guard, &mut env, &mut rng).unwrap(), 0);
    }

    #[test]
    fn test_histogram_counts_sum_to_execution_count() {
        let mut layout = BTreeMap::new();
        layout.insert("c".to_string(), vec![BitId(0)]);
        let program = Program::new(
            1,
            1,
            layout,
            vec![
                u(PI / 2.0, 0.0, PI, 0),
                Instruction::Measure {
                    qubit: QubitId(0),
                    bit: BitId(0),
                },
            ],
        );

        let mut simulator = Simulator::with_rng(program, seeded());
        simulator.run(500).unwrap();

        assert_eq!(simulator.execution_count(), 500);
        assert_eq!(simulator.counts().iter().sum::<u64>(), 500);
    }

    #[test]
    fn test_write_results_empty_before_first_shot() {
        let program = Program::new(1, 1, BTreeMap::new(), Vec::new());
        let simulator = Simulator::with_rng(program, seeded());

        let mut out = Vec::new();
        simulator.write_results(&mut out).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_write_results_reverses_register_bits() {
        let mut layout = BTreeMap::new();
        layout.insert("c".to_string(), vec![BitId(0), BitId(1)]);
        let program = Program::new(
            2,
            1,
            layout,
            vec![
                u(PI, 0.0, PI, 0),
                Instruction::Measure {
                    qubit: QubitId(0),
                    bit: BitId(0),
                },
            ],
        );

        let mut simulator = Simulator::with_rng(program, seeded());
        simulator.run_shot().unwrap();

        let mut out = Vec::new();
        simulator.write_results(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        // Bit 0 ended up 1, bit 1 stayed 0; printed last-declared-first.
        assert_eq!(text, "c[01] : 1\n");
    }
}
