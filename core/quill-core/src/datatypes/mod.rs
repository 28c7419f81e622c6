//! Column-batch data model.
//!
//! Schemas, fields and record batches are Arrow's own types; this module adds
//! the scalar value variant, the column vector abstraction and schema helpers.

mod column;
mod scalar;
mod schema;

pub use column::ColumnVector;
pub use scalar::{GroupKey, ScalarValue, build_array};
pub use schema::{format_schema, is_supported_type, projection_indices, select_schema};

pub use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
pub use arrow::record_batch::RecordBatch;
