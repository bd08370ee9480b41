/*
 * evaluator.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! IF condition evaluation.

use crate::context::{DataContext, string_to_number, to_display_string, to_number};
use crate::instruction::{Condition, Operator};

/// Evaluate a condition against a data context.
///
/// `left` is a dotted path into the context; `right` is a literal.
/// Equality operators compare string renderings, ordering operators compare
/// numeric renderings (any NaN makes them false). Unknown operators, and
/// conditions that could not be split, are false.
pub fn evaluate_condition(condition: &Condition, context: &DataContext) -> bool {
    let Some(operator) = Operator::from_symbol(&condition.operator) else {
        return false;
    };
    let actual = context.get(&condition.left);
    let expected = condition.right.as_str();

    match operator {
        Operator::Eq => to_display_string(actual) == expected,
        Operator::Ne => to_display_string(actual) != expected,
        Operator::Lt | Operator::Gt | Operator::Le | Operator::Ge => {
            let lhs = to_number(actual);
            let rhs = string_to_number(expected);
            match operator {
                Operator::Lt => lhs < rhs,
                Operator::Gt => lhs > rhs,
                Operator::Le => lhs <= rhs,
                _ => lhs >= rhs,
            }
        }
    }
}
