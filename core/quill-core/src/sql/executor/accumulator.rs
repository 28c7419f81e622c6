//! 집계 누적기 — MAX / MIN / SUM
//!
//! 누적기의 타입은 처음 들어온 non-null 값으로 정해지며, 이후 다른 타입의
//! 값은 Unsupported 오류입니다. null 입력은 무시합니다.

use crate::datatypes::ScalarValue;
use crate::error::{QuillError, QuillResult};
use crate::sql::planner::{AggregateFunction, PhysicalAggExpr};
use std::cmp::Ordering;

/// 그룹 하나에 대한 집계 상태
pub trait Accumulator: Send {
    fn accumulate(&mut self, value: ScalarValue) -> QuillResult<()>;

    /// 현재 결과 (값이 하나도 없으면 Null)
    fn final_value(&self) -> ScalarValue;
}

impl PhysicalAggExpr {
    /// Fresh accumulator for one group.
    pub fn create_accumulator(&self) -> QuillResult<Box<dyn Accumulator>> {
        let accumulator: Box<dyn Accumulator> = match self.function {
            AggregateFunction::Max => Box::new(ExtremumAccumulator::max()),
            AggregateFunction::Min => Box::new(ExtremumAccumulator::min()),
            AggregateFunction::Sum => Box::new(SumAccumulator::default()),
            AggregateFunction::Count | AggregateFunction::Avg => {
                return Err(QuillError::Unsupported(format!(
                    "unsupported aggregate function: {self}"
                )));
            }
        };
        Ok(accumulator)
    }
}

/// MAX (keeps `Greater`) or MIN (keeps `Less`).
#[derive(Debug)]
pub struct ExtremumAccumulator {
    keep: Ordering,
    value: Option<ScalarValue>,
}

impl ExtremumAccumulator {
    pub fn max() -> Self {
        Self {
            keep: Ordering::Greater,
            value: None,
        }
    }

    pub fn min() -> Self {
        Self {
            keep: Ordering::Less,
            value: None,
        }
    }

    fn name(&self) -> &'static str {
        if self.keep == Ordering::Greater {
            "MAX"
        } else {
            "MIN"
        }
    }
}

impl Accumulator for ExtremumAccumulator {
    fn accumulate(&mut self, value: ScalarValue) -> QuillResult<()> {
        match &value {
            ScalarValue::Null => return Ok(()),
            ScalarValue::Boolean(_) => {
                return Err(unsupported_value(self.name(), &value));
            }
            _ => {}
        }
        let replace = match &self.value {
            None => true,
            Some(current) => {
                if current.data_type() != value.data_type() {
                    return Err(mixed_types(self.name(), current, &value));
                }
                value.partial_cmp_same_type(current) == Some(self.keep)
            }
        };
        if replace {
            self.value = Some(value);
        }
        Ok(())
    }

    fn final_value(&self) -> ScalarValue {
        self.value.clone().unwrap_or(ScalarValue::Null)
    }
}

/// Running total; integer sums wrap on overflow.
#[derive(Debug, Default)]
pub struct SumAccumulator {
    value: Option<ScalarValue>,
}

impl Accumulator for SumAccumulator {
    fn accumulate(&mut self, value: ScalarValue) -> QuillResult<()> {
        if value.is_null() {
            return Ok(());
        }
        let total = match self.value.take() {
            None => match value {
                ScalarValue::Boolean(_) | ScalarValue::Utf8(_) => {
                    return Err(unsupported_value("SUM", &value));
                }
                numeric => numeric,
            },
            Some(current) => match (current, value) {
                (ScalarValue::Int8(a), ScalarValue::Int8(b)) => ScalarValue::Int8(a.wrapping_add(b)),
                (ScalarValue::Int16(a), ScalarValue::Int16(b)) => {
                    ScalarValue::Int16(a.wrapping_add(b))
                }
                (ScalarValue::Int32(a), ScalarValue::Int32(b)) => {
                    ScalarValue::Int32(a.wrapping_add(b))
                }
                (ScalarValue::Int64(a), ScalarValue::Int64(b)) => {
                    ScalarValue::Int64(a.wrapping_add(b))
                }
                (ScalarValue::Float32(a), ScalarValue::Float32(b)) => ScalarValue::Float32(a + b),
                (ScalarValue::Float64(a), ScalarValue::Float64(b)) => ScalarValue::Float64(a + b),
                (current, value) => {
                    let err = mixed_types("SUM", &current, &value);
                    self.value = Some(current);
                    return Err(err);
                }
            },
        };
        self.value = Some(total);
        Ok(())
    }

    fn final_value(&self) -> ScalarValue {
        self.value.clone().unwrap_or(ScalarValue::Null)
    }
}

fn unsupported_value(function: &str, value: &ScalarValue) -> QuillError {
    QuillError::Unsupported(format!(
        "{function} is not supported for {:?} input",
        value.data_type()
    ))
}

fn mixed_types(function: &str, current: &ScalarValue, value: &ScalarValue) -> QuillError {
    QuillError::Unsupported(format!(
        "{function} accumulator holds {:?}, got {:?}",
        current.data_type(),
        value.data_type()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::planner::PhysicalExpr;

    fn feed(acc: &mut dyn Accumulator, values: Vec<ScalarValue>) {
        for v in values {
            acc.accumulate(v).unwrap();
        }
    }

    #[test]
    fn test_max_min_numeric() {
        let values = vec![
            ScalarValue::Int64(3),
            ScalarValue::Null,
            ScalarValue::Int64(9),
            ScalarValue::Int64(-2),
        ];
        let mut max = ExtremumAccumulator::max();
        feed(&mut max, values.clone());
        assert_eq!(max.final_value(), ScalarValue::Int64(9));

        let mut min = ExtremumAccumulator::min();
        feed(&mut min, values);
        assert_eq!(min.final_value(), ScalarValue::Int64(-2));
    }

    #[test]
    fn test_max_strings_lexicographic() {
        let mut max = ExtremumAccumulator::max();
        feed(
            &mut max,
            vec![
                ScalarValue::Utf8("CA".into()),
                ScalarValue::Utf8("NY".into()),
                ScalarValue::Utf8("CO".into()),
            ],
        );
        assert_eq!(max.final_value(), ScalarValue::Utf8("NY".into()));
    }

    #[test]
    fn test_only_nulls_is_null() {
        let mut sum = SumAccumulator::default();
        feed(&mut sum, vec![ScalarValue::Null, ScalarValue::Null]);
        assert_eq!(sum.final_value(), ScalarValue::Null);
    }

    #[test]
    fn test_sum_wraps_and_floats() {
        let mut sum = SumAccumulator::default();
        feed(&mut sum, vec![ScalarValue::Int8(i8::MAX), ScalarValue::Int8(1)]);
        assert_eq!(sum.final_value(), ScalarValue::Int8(i8::MIN));

        let mut sum = SumAccumulator::default();
        feed(
            &mut sum,
            vec![ScalarValue::Float64(1.5), ScalarValue::Null, ScalarValue::Float64(2.0)],
        );
        assert_eq!(sum.final_value(), ScalarValue::Float64(3.5));
    }

    #[test]
    fn test_mixed_types_rejected() {
        let mut sum = SumAccumulator::default();
        sum.accumulate(ScalarValue::Int32(1)).unwrap();
        let err = sum.accumulate(ScalarValue::Int64(1)).unwrap_err();
        assert!(matches!(err, QuillError::Unsupported(_)));
        // state survives the failed call
        assert_eq!(sum.final_value(), ScalarValue::Int32(1));

        let mut max = ExtremumAccumulator::max();
        max.accumulate(ScalarValue::Utf8("a".into())).unwrap();
        assert!(max.accumulate(ScalarValue::Float64(1.0)).is_err());
    }

    #[test]
    fn test_unsupported_inputs() {
        let mut sum = SumAccumulator::default();
        assert!(sum.accumulate(ScalarValue::Utf8("x".into())).is_err());
        let mut max = ExtremumAccumulator::max();
        assert!(max.accumulate(ScalarValue::Boolean(true)).is_err());
    }

    #[test]
    fn test_create_accumulator() {
        let expr = PhysicalAggExpr {
            function: AggregateFunction::Min,
            input: PhysicalExpr::Column(0),
        };
        let mut acc = expr.create_accumulator().unwrap();
        acc.accumulate(ScalarValue::Float32(2.5)).unwrap();
        acc.accumulate(ScalarValue::Float32(0.5)).unwrap();
        assert_eq!(acc.final_value(), ScalarValue::Float32(0.5));

        let count = PhysicalAggExpr {
            function: AggregateFunction::Count,
            input: PhysicalExpr::Column(0),
        };
        assert!(matches!(
            count.create_accumulator(),
            Err(QuillError::Unsupported(msg)) if msg.contains("COUNT(#0)")
        ));
    }
}
