//! In-memory table backed by pre-built record batches.

use super::{BatchStream, DataSource};
use crate::datatypes::projection_indices;
use crate::error::{QuillError, QuillResult};
use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;

/// Batches held in memory, all sharing one schema.
#[derive(Debug, Clone)]
pub struct MemoryDataSource {
    schema: SchemaRef,
    batches: Vec<RecordBatch>,
}

impl MemoryDataSource {
    pub fn try_new(schema: SchemaRef, batches: Vec<RecordBatch>) -> QuillResult<Self> {
        for batch in &batches {
            if batch.schema().fields() != schema.fields() {
                return Err(QuillError::Schema(format!(
                    "batch schema {:?} does not match table schema {:?}",
                    batch.schema(),
                    schema
                )));
            }
        }
        Ok(Self { schema, batches })
    }
}

impl DataSource for MemoryDataSource {
    fn schema(&self) -> SchemaRef {
        SchemaRef::clone(&self.schema)
    }

    fn scan(&self, projection: &[String]) -> QuillResult<BatchStream> {
        let indices = projection_indices(&self.schema, projection)?;
        let batches = self.batches.clone();
        Ok(Box::new(
            batches
                .into_iter()
                .map(move |batch| batch.project(&indices).map_err(QuillError::from)),
        ))
    }
}
