//! Column vectors produced by expression evaluation.

use crate::datatypes::ScalarValue;
use crate::error::QuillResult;
use arrow::array::{Array, ArrayRef};
use arrow::datatypes::DataType;

/// A typed, read-only column of `len()` values.
///
/// `Literal` repeats one scalar without materializing it; evaluators call
/// [`ColumnVector::into_array`] only when they need a real Arrow array.
#[derive(Debug, Clone)]
pub enum ColumnVector {
    Array(ArrayRef),
    Literal {
        value: ScalarValue,
        data_type: DataType,
        len: usize,
    },
}

impl ColumnVector {
    /// A literal vector typed after its value.
    pub fn literal(value: ScalarValue, len: usize) -> Self {
        let data_type = value.data_type();
        ColumnVector::Literal {
            value,
            data_type,
            len,
        }
    }

    pub fn data_type(&self) -> &DataType {
        match self {
            ColumnVector::Array(array) => array.data_type(),
            ColumnVector::Literal { data_type, .. } => data_type,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ColumnVector::Array(array) => array.len(),
            ColumnVector::Literal { len, .. } => *len,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_null(&self, i: usize) -> bool {
        match self {
            ColumnVector::Array(array) => array.is_null(i),
            ColumnVector::Literal { value, .. } => value.is_null(),
        }
    }

    /// Value at row `i`.
    pub fn value(&self, i: usize) -> QuillResult<ScalarValue> {
        match self {
            ColumnVector::Array(array) => ScalarValue::from_array(array, i),
            ColumnVector::Literal { value, .. } => Ok(value.clone()),
        }
    }

    /// Materialize as an Arrow array, repeating a literal `len` times.
    pub fn into_array(self) -> QuillResult<ArrayRef> {
        match self {
            ColumnVector::Array(array) => Ok(array),
            ColumnVector::Literal {
                value,
                data_type,
                len,
            } => value.to_array_of_size(&data_type, len),
        }
    }
}

impl From<ArrayRef> for ColumnVector {
    fn from(array: ArrayRef) -> Self {
        ColumnVector::Array(array)
    }
}
