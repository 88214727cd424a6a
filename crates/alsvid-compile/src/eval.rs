//! Numeric folding of parameter expressions.

use rustc_hash::FxHashMap;
use std::f64::consts::PI;

use alsvid_qasm2::ast::{BinOp, ExprKind, Expression};

use crate::error::{CompileError, CompileResult};

/// Evaluate a parameter expression against a set of local constants.
///
/// Gate-scope parameters live in `constants`; `pi` is always available as a
/// fallback. The only functions are the six real ones of QASM 2.0.
pub fn eval(expression: &Expression, constants: &FxHashMap<String, f64>) -> CompileResult<f64> {
    match &expression.kind {
        ExprKind::Operation { op, left, right } => {
            let left = eval(left, constants)?;
            let right = eval(right, constants)?;
            Ok(match op {
                BinOp::Add => left + right,
                BinOp::Sub => left - right,
                BinOp::Mul => left * right,
                BinOp::Div => left / right,
                BinOp::Pow => left.powf(right),
            })
        }
        ExprKind::Value(value) => Ok(*value),
        ExprKind::Constant(name) => match constants.get(name) {
            Some(value) => Ok(*value),
            None if name == "pi" => Ok(PI),
            None => Err(CompileError::UnknownConstant {
                coordinate: expression.coordinate.clone(),
            }),
        },
        ExprKind::Function { name, arg } => {
            let value = eval(arg, constants)?;
            match name.as_str() {
                "sin" => Ok(value.sin()),
                "cos" => Ok(value.cos()),
                "tan" => Ok(value.tan()),
                "exp" => Ok(value.exp()),
                "ln" => Ok(value.ln()),
                "sqrt" => Ok(value.sqrt()),
                _ => Err(CompileError::UnknownFunction {
                    coordinate: expression.coordinate.clone(),
                }),
            }
        }
    }
}
