//! Property-based tests for the parameter expression evaluator.
//!
//! The evaluator must be a pure function: identical inputs yield identical
//! outputs, and folding a parsed expression agrees with computing the same
//! arithmetic directly.

use proptest::prelude::*;
use rustc_hash::FxHashMap;

use alsvid_compile::eval::eval;
use alsvid_qasm2::ast::{CommandKind, Expression};
use alsvid_qasm2::parse_source;

/// Parse `text` as the single parameter of a `U` call and return the tree.
fn parse_parameter(text: &str) -> Expression {
    let source = format!("OPENQASM 2.0;\nU({text}, 0, 0) q;");
    let program = parse_source(&source, "prop.qasm").expect("parameter should parse");
    let CommandKind::GateCall(call) = &program.commands[0].kind else {
        panic!("expected gate call");
    };
    call.params[0].clone()
}

/// Small exact doubles (multiples of 1/16), parenthesized so that negative
/// values read back as plain operands rather than triggering the
/// whole-expression unary-sign rule.
fn arb_operand() -> impl Strategy<Value = f64> {
    (-100_000i32..=100_000).prop_map(|v| f64::from(v) / 16.0)
}

fn literal(value: f64) -> String {
    format!("({value:?})")
}

proptest! {
    /// Evaluating the same expression twice yields bit-identical results.
    #[test]
    fn test_eval_is_deterministic(a in arb_operand(), b in arb_operand()) {
        let text = format!("{} * {} + sin({})", literal(a), literal(b), literal(a));
        let expression = parse_parameter(&text);
        let constants = FxHashMap::default();

        let first = eval(&expression, &constants).unwrap();
        let second = eval(&expression, &constants).unwrap();

        prop_assert_eq!(first.to_bits(), second.to_bits());
    }

    /// Folding a parsed sum/product agrees with direct IEEE arithmetic.
    #[test]
    fn test_eval_matches_direct_arithmetic(a in arb_operand(), b in arb_operand()) {
        let constants = FxHashMap::default();

        let sum = parse_parameter(&format!("{} + {}", literal(a), literal(b)));
        prop_assert_eq!(eval(&sum, &constants).unwrap(), a + b);

        let product = parse_parameter(&format!("{} * {}", literal(a), literal(b)));
        prop_assert_eq!(eval(&product, &constants).unwrap(), a * b);
    }

    /// Constants resolve through the local map before the pi fallback,
    /// and repeated evaluation of the same inputs never drifts.
    #[test]
    fn test_local_constants_shadow(value in arb_operand()) {
        let expression = parse_parameter("theta / 2");

        let mut constants = FxHashMap::default();
        constants.insert("theta".to_string(), value);

        let folded = eval(&expression, &constants).unwrap();
        prop_assert_eq!(folded, value / 2.0);
        prop_assert_eq!(eval(&expression, &constants).unwrap(), folded);
    }
}
