//! Schema projection helpers.

use crate::error::{QuillError, QuillResult};
use arrow::datatypes::{DataType, Field, Schema};

/// Indices of `names` in `schema`, in the requested order.
/// An empty list selects every field.
pub fn projection_indices(schema: &Schema, names: &[String]) -> QuillResult<Vec<usize>> {
    if names.is_empty() {
        return Ok((0..schema.fields().len()).collect());
    }
    names
        .iter()
        .map(|name| {
            schema
                .index_of(name)
                .map_err(|_| QuillError::Schema(format!("no column named '{name}'")))
        })
        .collect()
}

/// Narrow `schema` to `names`, keeping the requested order.
pub fn select_schema(schema: &Schema, names: &[String]) -> QuillResult<Schema> {
    let fields: Vec<Field> = projection_indices(schema, names)?
        .into_iter()
        .map(|i| schema.field(i).clone())
        .collect();
    Ok(Schema::new(fields))
}

/// Types the expression evaluators and accumulators operate on.
pub fn is_supported_type(data_type: &DataType) -> bool {
    matches!(
        data_type,
        DataType::Boolean
            | DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::Float32
            | DataType::Float64
            | DataType::Utf8
    )
}

/// `[name: Type, ...]`, as used by plan pretty-printers.
pub fn format_schema(schema: &Schema) -> String {
    let fields: Vec<String> = schema
        .fields()
        .iter()
        .map(|f| format!("{}: {:?}", f.name(), f.data_type()))
        .collect();
    format!("[{}]", fields.join(", "))
}
