//! FILENAME: cube-engine/src/aggregate.rs
//! Aggregators used by the roll-up operator.
//!
//! An aggregator folds one data row into a group's accumulator. Callers can
//! pass any closure of the right shape, or one of the `AggregationType`
//! built-ins, which fold element-wise across the accumulator positions.

use std::cmp::Ordering;
use serde::{Deserialize, Serialize};
use crate::value::Value;

/// Folds a data row into an accumulator and returns the new accumulator.
///
/// The accumulator width is not checked against the cube fields; producing
/// rows of the declared width is the aggregator's job.
pub trait Aggregator {
    fn fold(&self, accumulator: Vec<Value>, row: &[Value]) -> Vec<Value>;
}

impl<F> Aggregator for F
where
    F: Fn(Vec<Value>, &[Value]) -> Vec<Value>,
{
    fn fold(&self, accumulator: Vec<Value>, row: &[Value]) -> Vec<Value> {
        self(accumulator, row)
    }
}

// ============================================================================
// BUILT-IN AGGREGATIONS
// ============================================================================

/// Element-wise aggregation functions.
///
/// Position `i` of the accumulator is folded with position `i` of the row;
/// extra positions on either side are ignored. Numeric folds skip null and
/// non-numeric inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AggregationType {
    Sum,
    Count,
    Min,
    Max,
    Product,
}

impl Default for AggregationType {
    fn default() -> Self {
        AggregationType::Sum
    }
}

impl AggregationType {
    /// The accumulator a new group starts from.
    pub fn initial_value(&self, width: usize) -> Vec<Value> {
        let seed = match self {
            AggregationType::Sum | AggregationType::Count => Value::Integer(0),
            AggregationType::Product => Value::Integer(1),
            AggregationType::Min | AggregationType::Max => Value::Null,
        };
        vec![seed; width]
    }

    fn combine(&self, current: Value, value: &Value) -> Value {
        match self {
            AggregationType::Count if value.is_null() => current,
            AggregationType::Count => add(&current, &Value::Integer(1)),
            _ if !value.is_numeric() => current,
            _ if !current.is_numeric() => value.clone(),
            AggregationType::Sum => add(&current, value),
            AggregationType::Product => multiply(&current, value),
            AggregationType::Min => pick(current, value, Ordering::Less),
            AggregationType::Max => pick(current, value, Ordering::Greater),
        }
    }
}

impl Aggregator for AggregationType {
    fn fold(&self, mut accumulator: Vec<Value>, row: &[Value]) -> Vec<Value> {
        for (slot, value) in accumulator.iter_mut().zip(row) {
            let current = std::mem::take(slot);
            *slot = self.combine(current, value);
        }
        accumulator
    }
}

// ============================================================================
// ARITHMETIC
// ============================================================================

// Integers stay integers until they overflow or meet a float.

fn add(a: &Value, b: &Value) -> Value {
    match (a, b) {
        (Value::Integer(x), Value::Integer(y)) => x
            .checked_add(*y)
            .map_or(Value::Float(*x as f64 + *y as f64), Value::Integer),
        (Value::Null, other) | (other, Value::Null) => other.clone(),
        _ => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => Value::Float(x + y),
            _ => a.clone(),
        },
    }
}

fn multiply(a: &Value, b: &Value) -> Value {
    match (a, b) {
        (Value::Integer(x), Value::Integer(y)) => x
            .checked_mul(*y)
            .map_or(Value::Float(*x as f64 * *y as f64), Value::Integer),
        _ => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => Value::Float(x * y),
            _ => a.clone(),
        },
    }
}

/// Keeps `current` unless `value` compares as `wanted` against it.
fn pick(current: Value, value: &Value, wanted: Ordering) -> Value {
    let ordering = match (&current, value) {
        (Value::Integer(x), Value::Integer(y)) => y.cmp(x),
        _ => match (current.as_f64(), value.as_f64()) {
            (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
            _ => Ordering::Equal,
        },
    };
    if ordering == wanted {
        value.clone()
    } else {
        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fold_all(aggregation: AggregationType, rows: &[Vec<Value>]) -> Vec<Value> {
        let width = rows.first().map_or(0, Vec::len);
        let mut acc = aggregation.initial_value(width);
        for row in rows {
            acc = aggregation.fold(acc, row);
        }
        acc
    }

    fn sample_rows() -> Vec<Vec<Value>> {
        vec![
            vec![Value::from(100), Value::from(2.5)],
            vec![Value::from(10), Value::Null],
            vec![Value::from(15), Value::from(0.5)],
        ]
    }

    #[test]
    fn test_sum_is_element_wise() {
        let result = fold_all(AggregationType::Sum, &sample_rows());
        assert_eq!(result, vec![Value::Integer(125), Value::Float(3.0)]);
    }

    #[test]
    fn test_count_skips_nulls() {
        let result = fold_all(AggregationType::Count, &sample_rows());
        assert_eq!(result, vec![Value::Integer(3), Value::Integer(2)]);
    }

    #[test]
    fn test_min_max() {
        let rows = sample_rows();
        assert_eq!(
            fold_all(AggregationType::Min, &rows),
            vec![Value::Integer(10), Value::Float(0.5)]
        );
        assert_eq!(
            fold_all(AggregationType::Max, &rows),
            vec![Value::Integer(100), Value::Float(2.5)]
        );
    }

    #[test]
    fn test_product() {
        let rows = vec![vec![Value::from(2)], vec![Value::from(3)], vec![Value::from(1.5)]];
        assert_eq!(fold_all(AggregationType::Product, &rows), vec![Value::Float(9.0)]);
    }

    #[test]
    fn test_sum_ignores_text() {
        let rows = vec![vec![Value::from(4)], vec![Value::from("n/a")], vec![Value::from(6)]];
        assert_eq!(fold_all(AggregationType::Sum, &rows), vec![Value::Integer(10)]);
    }

    #[test]
    fn test_integer_overflow_widens_to_float() {
        let result = AggregationType::Sum.fold(vec![Value::Integer(i64::MAX)], &[Value::Integer(1)]);
        assert!(matches!(result[0], Value::Float(_)));
    }

    #[test]
    fn test_closure_aggregator() {
        let first_only = |acc: Vec<Value>, row: &[Value]| -> Vec<Value> {
            if let (Value::Integer(a), Value::Integer(b)) = (&acc[0], &row[0]) {
                return vec![Value::Integer(a + b)];
            }
            acc
        };
        let result = first_only.fold(vec![Value::Integer(1)], &[Value::Integer(41), Value::Integer(7)]);
        assert_eq!(result, vec![Value::Integer(42)]);
    }
}
