//! Single typed values.
//!
//! `ScalarValue` is the closed value variant every row-level evaluator works
//! with: accumulators, casts, grouping keys and literal vectors.

use crate::error::{QuillError, QuillResult};
use arrow::array::*;
use arrow::datatypes::*;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

/// One value of a supported column type, or null.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    Null,
    Boolean(bool),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
    Utf8(String),
}

impl ScalarValue {
    /// Get the Arrow DataType for this value.
    pub fn data_type(&self) -> DataType {
        match self {
            ScalarValue::Null => DataType::Null,
            ScalarValue::Boolean(_) => DataType::Boolean,
            ScalarValue::Int8(_) => DataType::Int8,
            ScalarValue::Int16(_) => DataType::Int16,
            ScalarValue::Int32(_) => DataType::Int32,
            ScalarValue::Int64(_) => DataType::Int64,
            ScalarValue::Float32(_) => DataType::Float32,
            ScalarValue::Float64(_) => DataType::Float64,
            ScalarValue::Utf8(_) => DataType::Utf8,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ScalarValue::Null)
    }

    /// Extract a value from an Arrow array at the given index.
    ///
    /// Binary and large-string columns are read as text so that byte keys
    /// compare and group by their textual form.
    pub fn from_array(array: &ArrayRef, idx: usize) -> QuillResult<Self> {
        if array.is_null(idx) {
            return Ok(ScalarValue::Null);
        }
        match array.data_type() {
            DataType::Boolean => Ok(ScalarValue::Boolean(array.as_boolean().value(idx))),
            DataType::Int8 => Ok(ScalarValue::Int8(array.as_primitive::<Int8Type>().value(idx))),
            DataType::Int16 => Ok(ScalarValue::Int16(
                array.as_primitive::<Int16Type>().value(idx),
            )),
            DataType::Int32 => Ok(ScalarValue::Int32(
                array.as_primitive::<Int32Type>().value(idx),
            )),
            DataType::Int64 => Ok(ScalarValue::Int64(
                array.as_primitive::<Int64Type>().value(idx),
            )),
            DataType::Float32 => Ok(ScalarValue::Float32(
                array.as_primitive::<Float32Type>().value(idx),
            )),
            DataType::Float64 => Ok(ScalarValue::Float64(
                array.as_primitive::<Float64Type>().value(idx),
            )),
            DataType::Utf8 => Ok(ScalarValue::Utf8(
                array.as_string::<i32>().value(idx).to_string(),
            )),
            DataType::LargeUtf8 => Ok(ScalarValue::Utf8(
                array.as_string::<i64>().value(idx).to_string(),
            )),
            DataType::Binary => Ok(ScalarValue::Utf8(
                String::from_utf8_lossy(array.as_binary::<i32>().value(idx)).into_owned(),
            )),
            dt => Err(QuillError::type_mismatch(
                "Boolean|Int8|Int16|Int32|Int64|Float32|Float64|Utf8",
                format!("{dt:?}"),
            )),
        }
    }

    /// Build an array of `len` copies of this value with the given type.
    pub fn to_array_of_size(&self, data_type: &DataType, len: usize) -> QuillResult<ArrayRef> {
        let array: ArrayRef = match self {
            ScalarValue::Null => return Ok(new_null_array(data_type, len)),
            ScalarValue::Boolean(v) => Arc::new(BooleanArray::from(vec![*v; len])),
            ScalarValue::Int8(v) => Arc::new(Int8Array::from_value(*v, len)),
            ScalarValue::Int16(v) => Arc::new(Int16Array::from_value(*v, len)),
            ScalarValue::Int32(v) => Arc::new(Int32Array::from_value(*v, len)),
            ScalarValue::Int64(v) => Arc::new(Int64Array::from_value(*v, len)),
            ScalarValue::Float32(v) => Arc::new(Float32Array::from_value(*v, len)),
            ScalarValue::Float64(v) => Arc::new(Float64Array::from_value(*v, len)),
            ScalarValue::Utf8(v) => Arc::new(StringArray::from(vec![v.as_str(); len])),
        };
        if array.data_type() != data_type {
            return Err(QuillError::type_mismatch(
                format!("{data_type:?}"),
                format!("{:?}", array.data_type()),
            ));
        }
        Ok(array)
    }

    /// Compare two non-null values of the same variant using the native
    /// ordering of that type. `None` for mismatched variants and for
    /// unordered float pairs (NaN).
    pub fn partial_cmp_same_type(&self, other: &ScalarValue) -> Option<Ordering> {
        match (self, other) {
            (ScalarValue::Boolean(a), ScalarValue::Boolean(b)) => a.partial_cmp(b),
            (ScalarValue::Int8(a), ScalarValue::Int8(b)) => a.partial_cmp(b),
            (ScalarValue::Int16(a), ScalarValue::Int16(b)) => a.partial_cmp(b),
            (ScalarValue::Int32(a), ScalarValue::Int32(b)) => a.partial_cmp(b),
            (ScalarValue::Int64(a), ScalarValue::Int64(b)) => a.partial_cmp(b),
            (ScalarValue::Float32(a), ScalarValue::Float32(b)) => a.partial_cmp(b),
            (ScalarValue::Float64(a), ScalarValue::Float64(b)) => a.partial_cmp(b),
            (ScalarValue::Utf8(a), ScalarValue::Utf8(b)) => a.partial_cmp(b),
            _ => None,
        }
    }

    /// Convert to `target` using the target type's textual/numeric rules.
    /// Null stays null; unparseable text is an error.
    pub fn cast_to(&self, target: &DataType) -> QuillResult<ScalarValue> {
        if self.is_null() {
            return Ok(ScalarValue::Null);
        }
        let fail = || {
            QuillError::execution(
                format!("cannot cast {self} to {target:?}"),
                "CAST".to_string(),
            )
        };
        let value = match target {
            DataType::Boolean => ScalarValue::Boolean(match self {
                ScalarValue::Boolean(b) => *b,
                ScalarValue::Utf8(s) => match s.to_ascii_lowercase().as_str() {
                    "true" => true,
                    "false" => false,
                    _ => return Err(fail()),
                },
                other => match other.as_i64() {
                    Some(0) => false,
                    Some(1) => true,
                    _ => return Err(fail()),
                },
            }),
            DataType::Int8 => ScalarValue::Int8(match self {
                ScalarValue::Utf8(s) => s.parse().map_err(|_| fail())?,
                other => other.as_i64().ok_or_else(fail)? as i8,
            }),
            DataType::Int16 => ScalarValue::Int16(match self {
                ScalarValue::Utf8(s) => s.parse().map_err(|_| fail())?,
                other => other.as_i64().ok_or_else(fail)? as i16,
            }),
            DataType::Int32 => ScalarValue::Int32(match self {
                ScalarValue::Utf8(s) => s.parse().map_err(|_| fail())?,
                other => other.as_i64().ok_or_else(fail)? as i32,
            }),
            DataType::Int64 => ScalarValue::Int64(match self {
                ScalarValue::Utf8(s) => s.parse().map_err(|_| fail())?,
                other => other.as_i64().ok_or_else(fail)?,
            }),
            DataType::Float32 => ScalarValue::Float32(match self {
                ScalarValue::Utf8(s) => s.parse().map_err(|_| fail())?,
                other => other.as_f64().ok_or_else(fail)? as f32,
            }),
            DataType::Float64 => ScalarValue::Float64(match self {
                ScalarValue::Utf8(s) => s.parse().map_err(|_| fail())?,
                other => other.as_f64().ok_or_else(fail)?,
            }),
            DataType::Utf8 => ScalarValue::Utf8(self.to_string()),
            other => {
                return Err(QuillError::Unsupported(format!(
                    "cast to {other:?} is not supported"
                )));
            }
        };
        Ok(value)
    }

    /// Numeric view, truncating floats toward zero (saturating).
    fn as_i64(&self) -> Option<i64> {
        match self {
            ScalarValue::Boolean(b) => Some(i64::from(*b)),
            ScalarValue::Int8(v) => Some(i64::from(*v)),
            ScalarValue::Int16(v) => Some(i64::from(*v)),
            ScalarValue::Int32(v) => Some(i64::from(*v)),
            ScalarValue::Int64(v) => Some(*v),
            ScalarValue::Float32(v) => Some(*v as i64),
            ScalarValue::Float64(v) => Some(*v as i64),
            ScalarValue::Null | ScalarValue::Utf8(_) => None,
        }
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            ScalarValue::Boolean(b) => Some(if *b { 1.0 } else { 0.0 }),
            ScalarValue::Int8(v) => Some(f64::from(*v)),
            ScalarValue::Int16(v) => Some(f64::from(*v)),
            ScalarValue::Int32(v) => Some(f64::from(*v)),
            ScalarValue::Int64(v) => Some(*v as f64),
            ScalarValue::Float32(v) => Some(f64::from(*v)),
            ScalarValue::Float64(v) => Some(*v),
            ScalarValue::Null | ScalarValue::Utf8(_) => None,
        }
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarValue::Null => write!(f, "null"),
            ScalarValue::Boolean(v) => write!(f, "{v}"),
            ScalarValue::Int8(v) => write!(f, "{v}"),
            ScalarValue::Int16(v) => write!(f, "{v}"),
            ScalarValue::Int32(v) => write!(f, "{v}"),
            ScalarValue::Int64(v) => write!(f, "{v}"),
            ScalarValue::Float32(v) => write!(f, "{v:?}"),
            ScalarValue::Float64(v) => write!(f, "{v:?}"),
            ScalarValue::Utf8(v) => write!(f, "{v}"),
        }
    }
}

/// Hashable form of a `ScalarValue`, used as a hash-aggregate key part.
///
/// Floats are keyed by bit pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GroupKey {
    Null,
    Boolean(bool),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Float32(u32),
    Float64(u64),
    Utf8(String),
}

impl From<ScalarValue> for GroupKey {
    fn from(value: ScalarValue) -> Self {
        match value {
            ScalarValue::Null => GroupKey::Null,
            ScalarValue::Boolean(v) => GroupKey::Boolean(v),
            ScalarValue::Int8(v) => GroupKey::Int8(v),
            ScalarValue::Int16(v) => GroupKey::Int16(v),
            ScalarValue::Int32(v) => GroupKey::Int32(v),
            ScalarValue::Int64(v) => GroupKey::Int64(v),
            ScalarValue::Float32(v) => GroupKey::Float32(v.to_bits()),
            ScalarValue::Float64(v) => GroupKey::Float64(v.to_bits()),
            ScalarValue::Utf8(v) => GroupKey::Utf8(v),
        }
    }
}

impl From<&GroupKey> for ScalarValue {
    fn from(key: &GroupKey) -> Self {
        match key {
            GroupKey::Null => ScalarValue::Null,
            GroupKey::Boolean(v) => ScalarValue::Boolean(*v),
            GroupKey::Int8(v) => ScalarValue::Int8(*v),
            GroupKey::Int16(v) => ScalarValue::Int16(*v),
            GroupKey::Int32(v) => ScalarValue::Int32(*v),
            GroupKey::Int64(v) => ScalarValue::Int64(*v),
            GroupKey::Float32(bits) => ScalarValue::Float32(f32::from_bits(*bits)),
            GroupKey::Float64(bits) => ScalarValue::Float64(f64::from_bits(*bits)),
            GroupKey::Utf8(v) => ScalarValue::Utf8(v.clone()),
        }
    }
}

/// Build an array of `data_type` from row values. Nulls become array nulls;
/// a value of any other type is a type mismatch.
pub fn build_array(data_type: &DataType, values: &[ScalarValue]) -> QuillResult<ArrayRef> {
    macro_rules! build_primitive {
        ($builder:ty, $variant:ident) => {{
            let mut builder = <$builder>::with_capacity(values.len());
            for value in values {
                match value {
                    ScalarValue::$variant(v) => builder.append_value(*v),
                    ScalarValue::Null => builder.append_null(),
                    other => return Err(mismatch(data_type, other)),
                }
            }
            Arc::new(builder.finish()) as ArrayRef
        }};
    }

    let array = match data_type {
        DataType::Boolean => build_primitive!(BooleanBuilder, Boolean),
        DataType::Int8 => build_primitive!(Int8Builder, Int8),
        DataType::Int16 => build_primitive!(Int16Builder, Int16),
        DataType::Int32 => build_primitive!(Int32Builder, Int32),
        DataType::Int64 => build_primitive!(Int64Builder, Int64),
        DataType::Float32 => build_primitive!(Float32Builder, Float32),
        DataType::Float64 => build_primitive!(Float64Builder, Float64),
        DataType::Utf8 => {
            let mut builder = StringBuilder::with_capacity(values.len(), values.len() * 8);
            for value in values {
                match value {
                    ScalarValue::Utf8(v) => builder.append_value(v),
                    ScalarValue::Null => builder.append_null(),
                    other => return Err(mismatch(data_type, other)),
                }
            }
            Arc::new(builder.finish()) as ArrayRef
        }
        DataType::Null => new_null_array(&DataType::Null, values.len()),
        dt => {
            return Err(QuillError::Unsupported(format!(
                "cannot build a column of type {dt:?}"
            )));
        }
    };
    Ok(array)
}

fn mismatch(expected: &DataType, actual: &ScalarValue) -> QuillError {
    QuillError::type_mismatch(format!("{expected:?}"), format!("{:?}", actual.data_type()))
}
