//! Physical Expression Evaluation
//!
//! Binary operators require both operands to have the same declared type;
//! there is no implicit widening. Comparisons use each type's native
//! ordering, so a NaN is never less than, greater than or equal to anything.

use crate::datatypes::{ColumnVector, ScalarValue, build_array};
use crate::error::{QuillError, QuillResult};
use crate::sql::planner::{BinaryOperator, PhysicalExpr, ScalarFunction};
use arrow::array::*;
use arrow::compute;
use arrow::datatypes::*;
use std::cmp::Ordering;
use std::sync::Arc;

/// Evaluate a PhysicalExpr against a RecordBatch.
///
/// Literals come back as [`ColumnVector::Literal`] and are materialized only
/// when an operator needs an array.
pub fn evaluate_expr(expr: &PhysicalExpr, batch: &RecordBatch) -> QuillResult<ColumnVector> {
    match expr {
        PhysicalExpr::Column(idx) => batch
            .columns()
            .get(*idx)
            .map(|array| ColumnVector::Array(Arc::clone(array)))
            .ok_or_else(|| {
                QuillError::execution(
                    format!(
                        "column index {idx} out of range ({})",
                        batch.num_columns()
                    ),
                    "evaluate_expr",
                )
            }),
        PhysicalExpr::Literal(value) => Ok(ColumnVector::literal(value.clone(), batch.num_rows())),
        PhysicalExpr::Cast { expr, data_type } => {
            cast_column(evaluate_expr(expr, batch)?, data_type)
        }
        PhysicalExpr::BinaryOp { left, op, right } => {
            let left = evaluate_expr(left, batch)?;
            let right = evaluate_expr(right, batch)?;
            evaluate_binary_op(left, *op, right)
        }
        PhysicalExpr::UnaryMath { func, expr } => unary_math(*func, evaluate_expr(expr, batch)?),
    }
}

fn evaluate_binary_op(
    left: ColumnVector,
    op: BinaryOperator,
    right: ColumnVector,
) -> QuillResult<ColumnVector> {
    if left.data_type() != right.data_type() {
        return Err(QuillError::type_mismatch(
            format!("{:?} on both sides of {op}", left.data_type()),
            format!("{:?}", right.data_type()),
        ));
    }
    let left = left.into_array()?;
    let right = right.into_array()?;

    let result = if op.is_arithmetic() {
        arithmetic_op(&left, &right, op)?
    } else if op.is_boolean() {
        logical_op(&left, &right, op)?
    } else {
        comparison_op(&left, &right, op)?
    };
    Ok(ColumnVector::Array(result))
}

// ===== Arithmetic =====

fn arithmetic_op(left: &ArrayRef, right: &ArrayRef, op: BinaryOperator) -> QuillResult<ArrayRef> {
    match left.data_type() {
        DataType::Int8 => arithmetic::<Int8Type>(left, right, op),
        DataType::Int16 => arithmetic::<Int16Type>(left, right, op),
        DataType::Int32 => arithmetic::<Int32Type>(left, right, op),
        DataType::Int64 => arithmetic::<Int64Type>(left, right, op),
        DataType::Float32 => arithmetic::<Float32Type>(left, right, op),
        DataType::Float64 => arithmetic::<Float64Type>(left, right, op),
        dt => Err(QuillError::type_mismatch(
            "Int8|Int16|Int32|Int64|Float32|Float64",
            format!("{dt:?}"),
        )),
    }
}

/// Integer arithmetic wraps on overflow; float arithmetic follows IEEE-754.
fn arithmetic<T: ArrowPrimitiveType>(
    left: &ArrayRef,
    right: &ArrayRef,
    op: BinaryOperator,
) -> QuillResult<ArrayRef> {
    let integer = T::DATA_TYPE.is_integer();
    let left = left.as_primitive::<T>();
    let right = right.as_primitive::<T>();
    let mut builder = PrimitiveBuilder::<T>::with_capacity(left.len());

    for i in 0..left.len() {
        if left.is_null(i) || right.is_null(i) {
            builder.append_null();
            continue;
        }
        let (l, r) = (left.value(i), right.value(i));
        let value = match op {
            BinaryOperator::Plus => l.add_wrapping(r),
            BinaryOperator::Minus => l.sub_wrapping(r),
            BinaryOperator::Multiply => l.mul_wrapping(r),
            BinaryOperator::Divide => {
                if integer && r.is_zero() {
                    return Err(QuillError::execution("division by zero", op.name()));
                }
                l.div_wrapping(r)
            }
            other => {
                return Err(QuillError::Unsupported(format!(
                    "{other} is not an arithmetic operator"
                )));
            }
        };
        builder.append_value(value);
    }
    Ok(Arc::new(builder.finish()))
}

// ===== Comparison =====

fn comparison_op(left: &ArrayRef, right: &ArrayRef, op: BinaryOperator) -> QuillResult<ArrayRef> {
    let test = ordering_test(op)?;
    let result = match left.data_type() {
        DataType::Boolean => compare(left.as_boolean(), right.as_boolean(), test),
        DataType::Int8 => compare(
            left.as_primitive::<Int8Type>(),
            right.as_primitive::<Int8Type>(),
            test,
        ),
        DataType::Int16 => compare(
            left.as_primitive::<Int16Type>(),
            right.as_primitive::<Int16Type>(),
            test,
        ),
        DataType::Int32 => compare(
            left.as_primitive::<Int32Type>(),
            right.as_primitive::<Int32Type>(),
            test,
        ),
        DataType::Int64 => compare(
            left.as_primitive::<Int64Type>(),
            right.as_primitive::<Int64Type>(),
            test,
        ),
        DataType::Float32 => compare(
            left.as_primitive::<Float32Type>(),
            right.as_primitive::<Float32Type>(),
            test,
        ),
        DataType::Float64 => compare(
            left.as_primitive::<Float64Type>(),
            right.as_primitive::<Float64Type>(),
            test,
        ),
        DataType::Utf8 => compare(left.as_string::<i32>(), right.as_string::<i32>(), test),
        dt => {
            return Err(QuillError::type_mismatch(
                "Boolean|Int8|Int16|Int32|Int64|Float32|Float64|Utf8",
                format!("{dt:?}"),
            ));
        }
    };
    Ok(result)
}

/// `partial_cmp` outcome → result. `None` (a NaN operand) only satisfies `!=`.
fn ordering_test(op: BinaryOperator) -> QuillResult<fn(Option<Ordering>) -> bool> {
    let test: fn(Option<Ordering>) -> bool = match op {
        BinaryOperator::Eq => |o| o == Some(Ordering::Equal),
        BinaryOperator::NotEq => |o| o != Some(Ordering::Equal),
        BinaryOperator::Lt => |o| o == Some(Ordering::Less),
        BinaryOperator::LtEq => |o| matches!(o, Some(Ordering::Less | Ordering::Equal)),
        BinaryOperator::Gt => |o| o == Some(Ordering::Greater),
        BinaryOperator::GtEq => |o| matches!(o, Some(Ordering::Greater | Ordering::Equal)),
        other => {
            return Err(QuillError::Unsupported(format!(
                "{other} is not a comparison operator"
            )));
        }
    };
    Ok(test)
}

/// A null on either side compares false.
fn compare<A>(left: A, right: A, test: fn(Option<Ordering>) -> bool) -> ArrayRef
where
    A: ArrayAccessor,
    A::Item: PartialOrd,
{
    let values: Vec<bool> = (0..left.len())
        .map(|i| {
            if left.is_null(i) || right.is_null(i) {
                return false;
            }
            test(left.value(i).partial_cmp(&right.value(i)))
        })
        .collect();
    Arc::new(BooleanArray::from(values))
}

// ===== Logical =====

/// Both sides are always evaluated. A null on either side yields null.
fn logical_op(left: &ArrayRef, right: &ArrayRef, op: BinaryOperator) -> QuillResult<ArrayRef> {
    let left = truth_values(left)?;
    let right = truth_values(right)?;
    let result: BooleanArray = left
        .into_iter()
        .zip(right)
        .map(|pair| match pair {
            (Some(l), Some(r)) => Ok(Some(match op {
                BinaryOperator::And => l && r,
                BinaryOperator::Or => l || r,
                other => {
                    return Err(QuillError::Unsupported(format!(
                        "{other} is not a boolean operator"
                    )));
                }
            })),
            _ => Ok(None),
        })
        .collect::<QuillResult<_>>()?;
    Ok(Arc::new(result))
}

/// Boolean columns as-is; integer columns must hold only 0 and 1.
fn truth_values(array: &ArrayRef) -> QuillResult<Vec<Option<bool>>> {
    match array.data_type() {
        DataType::Boolean => Ok(array.as_boolean().iter().collect()),
        dt if dt.is_integer() => {
            let ints = compute::cast(array, &DataType::Int64)?;
            ints.as_primitive::<Int64Type>()
                .iter()
                .map(|v| match v {
                    None => Ok(None),
                    Some(0) => Ok(Some(false)),
                    Some(1) => Ok(Some(true)),
                    Some(n) => Err(QuillError::type_mismatch(
                        "Boolean or integer 0/1",
                        format!("{dt:?} value {n}"),
                    )),
                })
                .collect()
        }
        dt => Err(QuillError::type_mismatch(
            "Boolean or integer 0/1",
            format!("{dt:?}"),
        )),
    }
}

// ===== Cast / math =====

fn cast_column(input: ColumnVector, target: &DataType) -> QuillResult<ColumnVector> {
    if input.data_type() == target {
        return Ok(input);
    }
    match input {
        ColumnVector::Literal { value, len, .. } => Ok(ColumnVector::Literal {
            value: value.cast_to(target)?,
            data_type: target.clone(),
            len,
        }),
        ColumnVector::Array(array) => {
            let values = (0..array.len())
                .map(|i| ScalarValue::from_array(&array, i)?.cast_to(target))
                .collect::<QuillResult<Vec<_>>>()?;
            Ok(ColumnVector::Array(build_array(target, &values)?))
        }
    }
}

/// SQRT / LN over Float64 input; nulls stay null.
fn unary_math(func: ScalarFunction, input: ColumnVector) -> QuillResult<ColumnVector> {
    if input.data_type() != &DataType::Float64 {
        return Err(QuillError::Unsupported(format!(
            "{}({:?}) is only implemented for Float64",
            func.name(),
            input.data_type()
        )));
    }
    let f: fn(f64) -> f64 = match func {
        ScalarFunction::Sqrt => f64::sqrt,
        ScalarFunction::Ln => f64::ln,
    };
    let array = input.into_array()?;
    let result = array
        .as_primitive::<Float64Type>()
        .unary::<_, Float64Type>(f);
    Ok(ColumnVector::Array(Arc::new(result)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn batch(columns: Vec<(&str, ArrayRef)>) -> RecordBatch {
        RecordBatch::try_from_iter(columns).unwrap()
    }

    fn col(i: usize) -> Box<PhysicalExpr> {
        Box::new(PhysicalExpr::Column(i))
    }

    fn lit(value: ScalarValue) -> Box<PhysicalExpr> {
        Box::new(PhysicalExpr::Literal(value))
    }

    fn binary(left: Box<PhysicalExpr>, op: BinaryOperator, right: Box<PhysicalExpr>) -> PhysicalExpr {
        PhysicalExpr::BinaryOp { left, op, right }
    }

    fn eval(expr: &PhysicalExpr, batch: &RecordBatch) -> ArrayRef {
        evaluate_expr(expr, batch).unwrap().into_array().unwrap()
    }

    fn bools(array: &ArrayRef) -> Vec<Option<bool>> {
        array.as_boolean().iter().collect()
    }

    #[test]
    fn test_column_and_literal() {
        let b = batch(vec![("a", Arc::new(Int64Array::from(vec![1, 2, 3])) as ArrayRef)]);
        let column = evaluate_expr(&PhysicalExpr::Column(0), &b).unwrap();
        assert_eq!(column.len(), 3);
        let literal = evaluate_expr(&PhysicalExpr::Literal(ScalarValue::Utf8("x".into())), &b).unwrap();
        assert!(matches!(literal, ColumnVector::Literal { len: 3, .. }));
        assert!(evaluate_expr(&PhysicalExpr::Column(5), &b).is_err());
    }

    #[test]
    fn test_integer_arithmetic_wraps() {
        let b = batch(vec![(
            "a",
            Arc::new(Int64Array::from(vec![Some(i64::MAX), Some(4), None])) as ArrayRef,
        )]);
        let sum = eval(&binary(col(0), BinaryOperator::Plus, lit(ScalarValue::Int64(1))), &b);
        let sum = sum.as_primitive::<Int64Type>();
        assert_eq!(sum.value(0), i64::MIN);
        assert_eq!(sum.value(1), 5);
        assert!(sum.is_null(2));

        let div = eval(&binary(col(0), BinaryOperator::Divide, lit(ScalarValue::Int64(3))), &b);
        assert_eq!(div.as_primitive::<Int64Type>().value(1), 1);
    }

    #[test]
    fn test_integer_division_by_zero() {
        let b = batch(vec![("a", Arc::new(Int32Array::from(vec![1])) as ArrayRef)]);
        let err = evaluate_expr(
            &binary(col(0), BinaryOperator::Divide, lit(ScalarValue::Int32(0))),
            &b,
        )
        .unwrap_err();
        assert!(matches!(err, QuillError::Execution { message, .. } if message == "division by zero"));
    }

    #[test]
    fn test_float_division_by_zero_is_infinite() {
        let b = batch(vec![("a", Arc::new(Float64Array::from(vec![1.0, 0.0])) as ArrayRef)]);
        let out = eval(&binary(col(0), BinaryOperator::Divide, lit(ScalarValue::Float64(0.0))), &b);
        let out = out.as_primitive::<Float64Type>();
        assert!(out.value(0).is_infinite());
        assert!(out.value(1).is_nan());
    }

    #[test]
    fn test_type_mismatch_has_no_widening() {
        let b = batch(vec![
            ("i", Arc::new(Int32Array::from(vec![1])) as ArrayRef),
            ("l", Arc::new(Int64Array::from(vec![1])) as ArrayRef),
        ]);
        let err = evaluate_expr(&binary(col(0), BinaryOperator::Eq, col(1)), &b).unwrap_err();
        assert!(matches!(err, QuillError::TypeMismatch { .. }));
        let err = evaluate_expr(&binary(col(0), BinaryOperator::Plus, col(1)), &b).unwrap_err();
        assert!(matches!(err, QuillError::TypeMismatch { .. }));
    }

    #[test]
    fn test_string_comparison() {
        let b = batch(vec![(
            "s",
            Arc::new(StringArray::from(vec![Some("CA"), Some("CO"), None])) as ArrayRef,
        )]);
        let eq = eval(&binary(col(0), BinaryOperator::Eq, lit(ScalarValue::Utf8("CO".into()))), &b);
        assert_eq!(bools(&eq), vec![Some(false), Some(true), Some(false)]);
        let lt = eval(&binary(col(0), BinaryOperator::Lt, lit(ScalarValue::Utf8("CB".into()))), &b);
        assert_eq!(bools(&lt), vec![Some(true), Some(false), Some(false)]);
    }

    #[test]
    fn test_nan_comparisons() {
        let b = batch(vec![("f", Arc::new(Float64Array::from(vec![f64::NAN])) as ArrayRef)]);
        for op in [
            BinaryOperator::Eq,
            BinaryOperator::Lt,
            BinaryOperator::LtEq,
            BinaryOperator::Gt,
            BinaryOperator::GtEq,
        ] {
            let out = eval(&binary(col(0), op, col(0)), &b);
            assert_eq!(bools(&out), vec![Some(false)], "NaN {op} NaN");
        }
        let out = eval(&binary(col(0), BinaryOperator::NotEq, col(0)), &b);
        assert_eq!(bools(&out), vec![Some(true)]);
    }

    #[test]
    fn test_logical_ops_accept_zero_one_integers() {
        let b = batch(vec![
            ("x", Arc::new(Int32Array::from(vec![1, 1, 0])) as ArrayRef),
            ("y", Arc::new(Int32Array::from(vec![1, 0, 0])) as ArrayRef),
            ("z", Arc::new(Int32Array::from(vec![2, 0, 0])) as ArrayRef),
        ]);
        let and = eval(&binary(col(0), BinaryOperator::And, col(1)), &b);
        assert_eq!(bools(&and), vec![Some(true), Some(false), Some(false)]);
        let or = eval(&binary(col(0), BinaryOperator::Or, col(1)), &b);
        assert_eq!(bools(&or), vec![Some(true), Some(true), Some(false)]);

        let err = evaluate_expr(&binary(col(0), BinaryOperator::And, col(2)), &b).unwrap_err();
        assert!(matches!(err, QuillError::TypeMismatch { .. }));
    }

    #[test]
    fn test_logical_ops_on_comparisons() {
        let b = batch(vec![("a", Arc::new(Int64Array::from(vec![1, 5, 10])) as ArrayRef)]);
        let expr = binary(
            Box::new(binary(col(0), BinaryOperator::Gt, lit(ScalarValue::Int64(2)))),
            BinaryOperator::And,
            Box::new(binary(col(0), BinaryOperator::Lt, lit(ScalarValue::Int64(8)))),
        );
        assert_eq!(bools(&eval(&expr, &b)), vec![Some(false), Some(true), Some(false)]);
    }

    #[test]
    fn test_cast() {
        let b = batch(vec![(
            "s",
            Arc::new(StringArray::from(vec![Some("12"), None, Some("-3")])) as ArrayRef,
        )]);
        let expr = PhysicalExpr::Cast {
            expr: col(0),
            data_type: DataType::Int32,
        };
        let out = eval(&expr, &b);
        let out = out.as_primitive::<Int32Type>();
        assert_eq!(out.value(0), 12);
        assert!(out.is_null(1));
        assert_eq!(out.value(2), -3);

        let bad = batch(vec![("s", Arc::new(StringArray::from(vec!["abc"])) as ArrayRef)]);
        assert!(matches!(
            evaluate_expr(&expr, &bad),
            Err(QuillError::Execution { .. })
        ));
    }

    #[test]
    fn test_cast_literal_stays_literal() {
        let b = batch(vec![("a", Arc::new(Int64Array::from(vec![1, 2])) as ArrayRef)]);
        let expr = PhysicalExpr::Cast {
            expr: lit(ScalarValue::Int64(7)),
            data_type: DataType::Float64,
        };
        match evaluate_expr(&expr, &b).unwrap() {
            ColumnVector::Literal { value, data_type, len } => {
                assert_eq!(value, ScalarValue::Float64(7.0));
                assert_eq!(data_type, DataType::Float64);
                assert_eq!(len, 2);
            }
            other => panic!("expected literal, got {other:?}"),
        }
    }

    #[test]
    fn test_unary_math() {
        let b = batch(vec![
            ("f", Arc::new(Float64Array::from(vec![Some(4.0), None])) as ArrayRef),
            ("i", Arc::new(Int64Array::from(vec![4, 9])) as ArrayRef),
        ]);
        let out = eval(
            &PhysicalExpr::UnaryMath {
                func: ScalarFunction::Sqrt,
                expr: col(0),
            },
            &b,
        );
        let out = out.as_primitive::<Float64Type>();
        assert_eq!(out.value(0), 2.0);
        assert!(out.is_null(1));

        let err = evaluate_expr(
            &PhysicalExpr::UnaryMath {
                func: ScalarFunction::Ln,
                expr: col(1),
            },
            &b,
        )
        .unwrap_err();
        assert!(matches!(err, QuillError::Unsupported(_)));
    }

    /// `a >= b` over single-row columns.
    fn gt_eq(a: ArrayRef, b: ArrayRef) -> bool {
        let rb = batch(vec![("a", a), ("b", b)]);
        let out = eval(&binary(col(0), BinaryOperator::GtEq, col(1)), &rb);
        out.as_boolean().value(0)
    }

    proptest! {
        #[test]
        fn prop_gt_eq_matches_native_i8(a in any::<i8>(), b in any::<i8>()) {
            let out = gt_eq(Arc::new(Int8Array::from(vec![a])), Arc::new(Int8Array::from(vec![b])));
            prop_assert_eq!(out, a >= b);
        }

        #[test]
        fn prop_gt_eq_matches_native_i16(a in any::<i16>(), b in any::<i16>()) {
            let out = gt_eq(Arc::new(Int16Array::from(vec![a])), Arc::new(Int16Array::from(vec![b])));
            prop_assert_eq!(out, a >= b);
        }

        #[test]
        fn prop_gt_eq_matches_native_i32(a in any::<i32>(), b in any::<i32>()) {
            let out = gt_eq(Arc::new(Int32Array::from(vec![a])), Arc::new(Int32Array::from(vec![b])));
            prop_assert_eq!(out, a >= b);
        }

        #[test]
        fn prop_gt_eq_matches_native_i64(a in any::<i64>(), b in any::<i64>()) {
            let out = gt_eq(Arc::new(Int64Array::from(vec![a])), Arc::new(Int64Array::from(vec![b])));
            prop_assert_eq!(out, a >= b);
        }

        // any::<f32>() / any::<f64>() include NaN and the infinities
        #[test]
        fn prop_gt_eq_matches_native_f32(a in any::<f32>(), b in any::<f32>()) {
            let out = gt_eq(Arc::new(Float32Array::from(vec![a])), Arc::new(Float32Array::from(vec![b])));
            prop_assert_eq!(out, a >= b);
        }

        #[test]
        fn prop_gt_eq_matches_native_f64(a in any::<f64>(), b in any::<f64>()) {
            let out = gt_eq(Arc::new(Float64Array::from(vec![a])), Arc::new(Float64Array::from(vec![b])));
            prop_assert_eq!(out, a >= b);
        }

        #[test]
        fn prop_gt_eq_matches_native_string(a in ".{0,12}", b in ".{0,12}") {
            let out = gt_eq(
                Arc::new(StringArray::from(vec![a.as_str()])),
                Arc::new(StringArray::from(vec![b.as_str()])),
            );
            prop_assert_eq!(out, a >= b);
        }

        #[test]
        fn prop_lt_matches_native_i32(a in any::<i32>(), b in any::<i32>()) {
            let rb = batch(vec![
                ("a", Arc::new(Int32Array::from(vec![a])) as ArrayRef),
                ("b", Arc::new(Int32Array::from(vec![b])) as ArrayRef),
            ]);
            let out = eval(&binary(col(0), BinaryOperator::Lt, col(1)), &rb);
            prop_assert_eq!(out.as_boolean().value(0), a < b);
        }
    }

    #[test]
    fn test_gt_eq_edges() {
        assert!(gt_eq(
            Arc::new(Int8Array::from(vec![i8::MAX])),
            Arc::new(Int8Array::from(vec![i8::MIN]))
        ));
        assert!(!gt_eq(
            Arc::new(Float32Array::from(vec![f32::NAN])),
            Arc::new(Float32Array::from(vec![1.0]))
        ));
        assert!(!gt_eq(
            Arc::new(Float32Array::from(vec![1.0])),
            Arc::new(Float32Array::from(vec![f32::NAN]))
        ));
        assert!(gt_eq(
            Arc::new(StringArray::from(vec!["ab"])),
            Arc::new(StringArray::from(vec!["a"]))
        ));
    }
}
