//! Lowering from the parsed tree to the flat instruction stream.
//!
//! A single traversal resolves register names to dense global ids, expands
//! user gate declarations at their call sites, broadcasts gate applications
//! over whole registers, and turns `if` guards into forward skip offsets.

use rustc_hash::FxHashMap;
use std::collections::BTreeMap;
use tracing::debug;

use alsvid_ir::{BitId, Instruction, Program, QubitId};
use alsvid_qasm2::Coordinate;
use alsvid_qasm2::ast::{self, Command, CommandKind, GateCall, GateDecl, RegRef};

use crate::error::{CompileError, CompileResult};
use crate::eval::eval;

/// Lower a parsed program into an executable [`Program`].
#[allow(clippy::float_cmp)]
pub fn compile(program: &ast::Program) -> CompileResult<Program> {
    if program.version != 2.0 {
        return Err(CompileError::InvalidVersion {
            coordinate: program.coordinate.clone(),
        });
    }

    let mut compiler = Compiler::default();
    let instructions = compiler.compile_commands(&program.commands)?;

    debug!(
        "Compiled {} instructions ({} qubits, {} bits)",
        instructions.len(),
        compiler.qubit_count,
        compiler.bit_count
    );

    Ok(Program::new(
        compiler.bit_count,
        compiler.qubit_count,
        compiler.cregs,
        instructions,
    ))
}

/// Compiler state for one traversal.
///
/// Gate declarations are stored as plain references into the parse tree;
/// the tree outlives the compiler, and nothing is cloned until expansion
/// produces instructions.
#[derive(Default)]
struct Compiler<'a> {
    bit_count: u32,
    qubit_count: u32,
    cregs: BTreeMap<String, Vec<BitId>>,
    qregs: FxHashMap<String, Vec<QubitId>>,
    gates: FxHashMap<String, &'a GateDecl>,
}

/// Bindings of a user gate expansion: formal argument names to the global
/// qubit ids of the current broadcast iteration, formal parameter names to
/// their evaluated values.
struct GateScope {
    qubits: FxHashMap<String, QubitId>,
    constants: FxHashMap<String, f64>,
}

impl GateScope {
    fn local_qubit(&self, reg: &RegRef) -> CompileResult<QubitId> {
        if reg.index.is_some() {
            return Err(CompileError::LocalQubitIndexed {
                coordinate: reg.coordinate.clone(),
            });
        }
        self.qubits
            .get(&reg.name)
            .copied()
            .ok_or_else(|| CompileError::UnknownLocalQubit {
                coordinate: reg.coordinate.clone(),
            })
    }
}

impl<'a> Compiler<'a> {
    fn compile_commands(&mut self, commands: &'a [Command]) -> CompileResult<Vec<Instruction>> {
        let mut instructions = Vec::new();

        for command in commands {
            match &command.kind {
                CommandKind::Include { commands } => {
                    instructions.extend(self.compile_commands(commands)?);
                }
                CommandKind::CregDecl { name, size } => self.compile_creg_decl(name, *size),
                CommandKind::QregDecl { name, size } => self.compile_qreg_decl(name, *size),
                CommandKind::GateDecl(decl) => {
                    self.compile_gate_decl(&command.coordinate, decl)?;
                }
                CommandKind::OpaqueDecl { .. } => {
                    return Err(CompileError::OpaqueUnsupported {
                        coordinate: command.coordinate.clone(),
                    });
                }
                CommandKind::GateCall(call) => {
                    instructions.extend(self.compile_gate_call(&command.coordinate, call, None)?);
                }
                CommandKind::Barrier { args } => {
                    instructions.extend(self.compile_barrier(args, None)?);
                }
                CommandKind::Reset { target } => {
                    instructions.extend(self.compile_reset(target)?);
                }
                CommandKind::Measure { source, target } => {
                    instructions.extend(self.compile_measure(
                        &command.coordinate,
                        source,
                        target,
                    )?);
                }
                CommandKind::Condition {
                    reg,
                    criteria,
                    command,
                } => {
                    instructions.extend(self.compile_condition(reg, *criteria, command)?);
                }
            }
        }

        Ok(instructions)
    }

    /// Allocate dense bit ids for a `creg`. A redeclaration overwrites the
    /// name binding; the previously allocated ids stay reserved.
    fn compile_creg_decl(&mut self, name: &str, size: u64) {
        let ids = (0..size)
            .map(|_| {
                let id = BitId(self.bit_count);
                self.bit_count += 1;
                id
            })
            .collect();
        self.cregs.insert(name.to_string(), ids);
    }

    /// Allocate dense qubit ids for a `qreg`; same overwrite rule as `creg`.
    fn compile_qreg_decl(&mut self, name: &str, size: u64) {
        let ids = (0..size)
            .map(|_| {
                let id = QubitId(self.qubit_count);
                self.qubit_count += 1;
                id
            })
            .collect();
        self.qregs.insert(name.to_string(), ids);
    }

    /// Validate and register a gate declaration. The body is not expanded
    /// here; it is re-walked at every call site.
    fn compile_gate_decl(
        &mut self,
        coordinate: &Coordinate,
        decl: &'a GateDecl,
    ) -> CompileResult<()> {
        if decl.name.chars().any(|c| c.is_ascii_uppercase()) {
            return Err(CompileError::UppercaseGateName {
                coordinate: coordinate.clone(),
            });
        }
        if self.gates.contains_key(&decl.name) {
            return Err(CompileError::DuplicateGate {
                coordinate: coordinate.clone(),
            });
        }

        for command in &decl.body {
            match &command.kind {
                CommandKind::GateCall(call) => {
                    if call.name != "U" && call.name != "CX" && !self.gates.contains_key(&call.name)
                    {
                        return Err(CompileError::UnknownGate {
                            coordinate: command.coordinate.clone(),
                        });
                    }
                }
                CommandKind::Barrier { .. } => {}
                _ => {
                    return Err(CompileError::IncorrectCommand {
                        coordinate: command.coordinate.clone(),
                    });
                }
            }
        }

        self.gates.insert(decl.name.clone(), decl);
        Ok(())
    }

    /// Compile one gate invocation, broadcasting over register arguments.
    ///
    /// `scope` is `Some` inside a user gate body, where register arguments
    /// resolve through the formal-argument bindings and are always scalar.
    fn compile_gate_call(
        &mut self,
        coordinate: &Coordinate,
        call: &'a GateCall,
        scope: Option<&GateScope>,
    ) -> CompileResult<Vec<Instruction>> {
        let declaration = self.gates.get(&call.name).copied();
        let (param_count, arg_count) = match declaration {
            Some(decl) => (decl.params.len(), decl.args.len()),
            None => match call.name.as_str() {
                "U" => (3, 1),
                "CX" => (0, 2),
                _ => {
                    return Err(CompileError::UnknownGate {
                        coordinate: coordinate.clone(),
                    });
                }
            },
        };

        if call.params.len() < param_count {
            return Err(CompileError::TooFewParameters {
                coordinate: coordinate.clone(),
            });
        }
        if call.params.len() > param_count {
            return Err(CompileError::TooManyParameters {
                coordinate: coordinate.clone(),
            });
        }
        if call.args.len() < arg_count {
            return Err(CompileError::TooFewArguments {
                coordinate: coordinate.clone(),
            });
        }
        if call.args.len() > arg_count {
            return Err(CompileError::TooManyArguments {
                coordinate: coordinate.clone(),
            });
        }

        let no_constants = FxHashMap::default();
        let constants = scope.map_or(&no_constants, |s| &s.constants);
        let params = call
            .params
            .iter()
            .map(|param| eval(param, constants))
            .collect::<CompileResult<Vec<f64>>>()?;

        let argument_ids = call
            .args
            .iter()
            .map(|arg| match scope {
                Some(scope) => scope.local_qubit(arg).map(|id| vec![id]),
                None => self.qreg_ids(arg),
            })
            .collect::<CompileResult<Vec<Vec<QubitId>>>>()?;

        // Broadcast width: scalars repeat, vectors must all share one length.
        let mut iterations = 1;
        for ids in &argument_ids {
            if ids.len() > 1 && iterations > 1 && ids.len() != iterations {
                return Err(CompileError::IncompatibleBroadcast {
                    coordinate: coordinate.clone(),
                });
            }
            iterations = iterations.max(ids.len());
        }

        let mut instructions = Vec::new();
        for i in 0..iterations {
            let mut selected = Vec::with_capacity(argument_ids.len());
            for (arg, ids) in call.args.iter().zip(&argument_ids) {
                let index = if ids.len() > 1 { i } else { 0 };
                let id = ids.get(index).copied().ok_or_else(|| {
                    CompileError::QubitIndexOutOfRange {
                        coordinate: arg.coordinate.clone(),
                    }
                })?;
                selected.push(id);
            }

            match declaration {
                None => {
                    if call.name == "U" {
                        instructions.push(Instruction::U {
                            theta: params[0],
                            phi: params[1],
                            lambda: params[2],
                            qubit: selected[0],
                        });
                    } else {
                        instructions.push(Instruction::CX {
                            control: selected[0],
                            target: selected[1],
                        });
                    }
                }
                Some(decl) => {
                    let scope = GateScope {
                        qubits: decl.args.iter().cloned().zip(selected).collect(),
                        constants: decl.params.iter().cloned().zip(params.iter().copied()).collect(),
                    };

                    for command in &decl.body {
                        match &command.kind {
                            CommandKind::GateCall(nested) => {
                                instructions.extend(self.compile_gate_call(
                                    &command.coordinate,
                                    nested,
                                    Some(&scope),
                                )?);
                            }
                            CommandKind::Barrier { args } => {
                                instructions.extend(self.compile_barrier(args, Some(&scope))?);
                            }
                            _ => {
                                return Err(CompileError::IncorrectCommand {
                                    coordinate: command.coordinate.clone(),
                                });
                            }
                        }
                    }
                }
            }
        }

        Ok(instructions)
    }

    /// Compile a barrier: one instruction per guarded qubit.
    fn compile_barrier(
        &mut self,
        args: &[RegRef],
        scope: Option<&GateScope>,
    ) -> CompileResult<Vec<Instruction>> {
        let mut qubits = Vec::new();
        for arg in args {
            match scope {
                Some(scope) => qubits.push(scope.local_qubit(arg)?),
                None => qubits.extend(self.qreg_ids(arg)?),
            }
        }

        Ok(qubits
            .into_iter()
            .map(|qubit| Instruction::Barrier { qubit })
            .collect())
    }

    /// Compile a reset: one instruction per qubit of the target.
    fn compile_reset(&mut self, target: &RegRef) -> CompileResult<Vec<Instruction>> {
        Ok(self
            .qreg_ids(target)?
            .into_iter()
            .map(|qubit| Instruction::Reset { qubit })
            .collect())
    }

    /// Compile a measure: both sides must resolve to id lists of one length.
    fn compile_measure(
        &mut self,
        coordinate: &Coordinate,
        source: &RegRef,
        target: &RegRef,
    ) -> CompileResult<Vec<Instruction>> {
        let qubits = self.qreg_ids(source)?;
        let bits = self.creg_ids(target)?;

        if qubits.len() != bits.len() {
            return Err(CompileError::RegisterSizeMismatch {
                coordinate: coordinate.clone(),
            });
        }

        Ok(qubits
            .into_iter()
            .zip(bits)
            .map(|(qubit, bit)| Instruction::Measure { qubit, bit })
            .collect())
    }

    /// Compile a condition guard: the guarded command's instructions follow
    /// the guard, which skips exactly that many slots on mismatch.
    fn compile_condition(
        &mut self,
        reg: &RegRef,
        criteria: u64,
        command: &'a Command,
    ) -> CompileResult<Vec<Instruction>> {
        let bits = self.creg_ids(reg)?;

        let compiled = match &command.kind {
            CommandKind::GateCall(call) => {
                self.compile_gate_call(&command.coordinate, call, None)?
            }
            CommandKind::Reset { target } => self.compile_reset(target)?,
            CommandKind::Measure { source, target } => {
                self.compile_measure(&command.coordinate, source, target)?
            }
            _ => {
                return Err(CompileError::IncorrectCommand {
                    coordinate: command.coordinate.clone(),
                });
            }
        };

        let mut instructions = Vec::with_capacity(compiled.len() + 1);
        instructions.push(Instruction::Condition {
            bits,
            criteria,
            jump: compiled.len(),
        });
        instructions.extend(compiled);
        Ok(instructions)
    }

    /// Resolve a quantum register reference to its global id list.
    fn qreg_ids(&self, reg: &RegRef) -> CompileResult<Vec<QubitId>> {
        let ids = self
            .qregs
            .get(&reg.name)
            .ok_or_else(|| CompileError::UnknownRegister {
                coordinate: reg.coordinate.clone(),
            })?;

        match reg.index {
            Some(index) => {
                let id = ids.get(index as usize).copied().ok_or_else(|| {
                    CompileError::QubitIndexOutOfRange {
                        coordinate: reg.coordinate.clone(),
                    }
                })?;
                Ok(vec![id])
            }
            None => Ok(ids.clone()),
        }
    }

    /// Resolve a classical register reference to its global id list.
    fn creg_ids(&self, reg: &RegRef) -> CompileResult<Vec<BitId>> {
        let ids = self
            .cregs
            .get(&reg.name)
            .ok_or_else(|| CompileError::UnknownRegister {
                coordinate: reg.coordinate.clone(),
            })?;

        match reg.index {
            Some(index) => {
                let id = ids.get(index as usize).copied().ok_or_else(|| {
                    CompileError::BitIndexOutOfRange {
                        coordinate: reg.coordinate.clone(),
                    }
                })?;
                Ok(vec![id])
            }
            None => Ok(ids.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alsvid_qasm2::parse_source;
    use std::f64::consts::PI;

    fn compile_str(source: &str) -> CompileResult<Program> {
        let full = format!("OPENQASM 2.0;\n{source}");
        compile(&parse_source(&full, "test.qasm").unwrap())
    }

    #[test]
    fn test_broadcast_single_qubit_gate() {
        let program = compile_str("qreg q[3];\nU(0, 0, 0) q;").unwrap();

        let instructions = program.instructions();
        assert_eq!(instructions.len(), 3);
        for (i, instruction) in instructions.iter().enumerate() {
            assert!(matches!(
                instruction,
                Instruction::U { qubit, .. } if qubit.index() == i
            ));
        }
    }

    #[test]
    fn test_broadcast_mixed_scalar_and_vector() {
        let program = compile_str("qreg a[1];\nqreg b[3];\nCX a[0], b;").unwrap();

        let instructions = program.instructions();
        assert_eq!(instructions.len(), 3);
        for (i, instruction) in instructions.iter().enumerate() {
            assert!(matches!(
                instruction,
                Instruction::CX { control, target }
                    if control.index() == 0 && target.index() == 1 + i
            ));
        }
    }

    #[test]
    fn test_broadcast_size_mismatch() {
        let err = compile_str("qreg a[2];\nqreg b[3];\nCX a, b;").unwrap_err();
        assert!(err
            .to_string()
            .contains("Register size is incompatible with the other registers"));
    }

    #[test]
    fn test_uppercase_gate_name_rejected() {
        let err = compile_str("qreg q[1];\ngate Foo a { U(0, 0, 0) a; }").unwrap_err();
        assert!(err
            .to_string()
            .contains("Only built in gates can contain uppercase characters"));
    }

    #[test]
    fn test_opaque_rejected() {
        let err = compile_str("opaque o a;").unwrap_err();
        assert!(err.to_string().contains("Opaques are not supported"));
    }

    #[test]
    fn test_builtin_arity() {
        let err = compile_str("qreg q[1];\nU(0, 0) q[0];").unwrap_err();
        assert!(err.to_string().contains("Too few parameters"));

        let err = compile_str("qreg q[1];\nU(0, 0, 0, 0) q[0];").unwrap_err();
        assert!(err.to_string().contains("Too many parameters"));

        let err = compile_str("qreg q[2];\nCX q[0];").unwrap_err();
        assert!(err.to_string().contains("Too few arguments"));

        let err = compile_str("qreg q[2];\nU(0, 0, 0) q[0], q[1];").unwrap_err();
        assert!(err.to_string().contains("Too many arguments"));
    }

    #[test]
    fn test_gate_expansion_binds_parameters() {
        let program = compile_str(
            "qreg q[1];\ngate rz(phi) a { U(0, 0, phi) a; }\nrz(pi / 2) q[0];",
        )
        .unwrap();

        let instructions = program.instructions();
        assert_eq!(instructions.len(), 1);
        let Instruction::U { lambda, qubit, .. } = &instructions[0] else {
            panic!("expected U, got {:?}", instructions[0]);
        };
        assert!((lambda - PI / 2.0).abs() < 1e-12);
        assert_eq!(qubit.index(), 0);
    }

    #[test]
    fn test_gate_expansion_broadcasts_body() {
        let program = compile_str(
            "qreg q[3];\ngate h a { U(pi / 2, 0, pi) a; }\nh q;",
        )
        .unwrap();

        let instructions = program.instructions();
        assert_eq!(instructions.len(), 3);
        for (i, instruction) in instructions.iter().enumerate() {
            assert!(matches!(
                instruction,
                Instruction::U { qubit, .. } if qubit.index() == i
            ));
        }
    }

    #[test]
    fn test_nested_gate_calls_previously_declared_gate() {
        let program = compile_str(
            "qreg q[2];\n\
             gate flip a { U(pi, 0, pi) a; }\n\
             gate flip2 a, b { flip a; flip b; }\n\
             flip2 q[0], q[1];",
        )
        .unwrap();

        let instructions = program.instructions();
        assert_eq!(instructions.len(), 2);
        assert!(matches!(instructions[0], Instruction::U { qubit, .. } if qubit.index() == 0));
        assert!(matches!(instructions[1], Instruction::U { qubit, .. } if qubit.index() == 1));
    }

    #[test]
    fn test_gate_body_unknown_gate_rejected() {
        let err = compile_str("gate g a { h a; }").unwrap_err();
        assert!(err.to_string().contains("Gate not declared yet"));
    }

    #[test]
    fn test_duplicate_gate_rejected() {
        let err =
            compile_str("gate g a { U(0, 0, 0) a; }\ngate g a { U(0, 0, 0) a; }").unwrap_err();
        assert!(err.to_string().contains("Duplicate gate declaration"));
    }

    #[test]
    fn test_local_qubit_cannot_be_indexed() {
        let err = compile_str(
            "qreg q[1];\ngate g a { U(0, 0, 0) a[0]; }\ng q[0];",
        )
        .unwrap_err();
        assert!(err.to_string().contains("Local qubit can't be indexed"));
    }

    #[test]
    fn test_local_qubit_must_exist() {
        let err = compile_str(
            "qreg q[1];\ngate g a { U(0, 0, 0) b; }\ng q[0];",
        )
        .unwrap_err();
        assert!(err.to_string().contains("Local qubit doesn't exist"));
    }

    #[test]
    fn test_condition_layout() {
        let program = compile_str(
            "qreg q[2];\ncreg c[2];\nif (c == 3) measure q -> c;",
        )
        .unwrap();

        let instructions = program.instructions();
        assert_eq!(instructions.len(), 3);
        let Instruction::Condition {
            bits,
            criteria,
            jump,
        } = &instructions[0]
        else {
            panic!("expected condition, got {:?}", instructions[0]);
        };
        assert_eq!(bits.len(), 2);
        assert_eq!(*criteria, 3);
        assert_eq!(*jump, 2);
        assert!(instructions[1..].iter().all(|i| matches!(i, Instruction::Measure { .. })));
    }

    #[test]
    fn test_condition_on_indexed_bit() {
        let program = compile_str(
            "qreg q[1];\ncreg c[2];\nif (c[1] == 1) U(0, 0, 0) q[0];",
        )
        .unwrap();

        let Instruction::Condition { bits, .. } = &program.instructions()[0] else {
            panic!("expected condition");
        };
        assert_eq!(bits.as_slice(), &[BitId(1)]);
    }

    #[test]
    fn test_measure_register_size_mismatch() {
        let err = compile_str("qreg q[2];\ncreg c[3];\nmeasure q -> c;").unwrap_err();
        assert!(err.to_string().contains("Register sizes don't match"));
    }

    #[test]
    fn test_barrier_expands_registers() {
        let program = compile_str("qreg a[2];\nqreg b[1];\nbarrier a, b;").unwrap();

        let instructions = program.instructions();
        assert_eq!(instructions.len(), 3);
        assert!(instructions.iter().all(|i| matches!(i, Instruction::Barrier { .. })));
    }

    #[test]
    fn test_reset_expands_register() {
        let program = compile_str("qreg q[2];\nreset q;").unwrap();
        assert_eq!(program.instructions().len(), 2);
    }

    #[test]
    fn test_unknown_register() {
        let err = compile_str("U(0, 0, 0) q;").unwrap_err();
        assert!(err.to_string().contains("Register not declared yet"));
    }

    #[test]
    fn test_index_out_of_range() {
        let err = compile_str("qreg q[2];\nU(0, 0, 0) q[2];").unwrap_err();
        assert!(err.to_string().contains("Qubit index is out of range"));

        let err = compile_str("qreg q[1];\ncreg c[1];\nmeasure q[0] -> c[1];").unwrap_err();
        assert!(err.to_string().contains("Bit index is out of range"));
    }

    #[test]
    fn test_version_check() {
        let program = parse_source("OPENQASM 3.0;\nqreg q[1];", "t.qasm").unwrap();
        let err = compile(&program).unwrap_err();
        assert!(err.to_string().contains("Invalid program version"));
    }

    #[test]
    fn test_register_redeclaration_overwrites() {
        let program = compile_str("qreg q[1];\nqreg q[2];\nU(0, 0, 0) q;").unwrap();

        // The second declaration wins; its ids start after the first one's.
        let instructions = program.instructions();
        assert_eq!(program.qubit_count(), 3);
        assert_eq!(instructions.len(), 2);
        assert!(matches!(instructions[0], Instruction::U { qubit, .. } if qubit.index() == 1));
        assert!(matches!(instructions[1], Instruction::U { qubit, .. } if qubit.index() == 2));
    }

    #[test]
    fn test_creg_layout_records_declaration_ids() {
        let program = compile_str("creg x[2];\ncreg y[1];").unwrap();

        let layout = program.creg_layout();
        assert_eq!(layout["x"], vec![BitId(0), BitId(1)]);
        assert_eq!(layout["y"], vec![BitId(2)]);
        assert_eq!(program.bit_count(), 3);
    }

    #[test]
    fn test_include_commands_compile_inline() {
        // Simulate an include by compiling the same tree shape the parser
        // produces: declarations inside the include node take effect at the
        // include site.
        let dir = std::env::temp_dir().join("alsvid-compile-include-test");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("gates.inc"), "gate x a { U(pi, 0, pi) a; }\n").unwrap();
        std::fs::write(
            dir.join("main.qasm"),
            "OPENQASM 2.0;\ninclude \"gates.inc\";\nqreg q[1];\nx q[0];\n",
        )
        .unwrap();

        let ast = alsvid_qasm2::parse_file(dir.join("main.qasm")).unwrap();
        let program = compile(&ast).unwrap();
        assert_eq!(program.instructions().len(), 1);
    }
}
