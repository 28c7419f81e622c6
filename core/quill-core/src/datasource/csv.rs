//! Delimited-text tables read with Arrow's CSV reader.

use super::{BatchStream, DataSource, file_order};
use crate::config::ExecutionConfig;
use crate::datatypes::projection_indices;
use crate::error::{QuillError, QuillResult};
use arrow::csv::ReaderBuilder;
use arrow::csv::reader::Format;
use arrow::datatypes::SchemaRef;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// A CSV file scanned lazily, one batch per pull.
#[derive(Debug, Clone)]
pub struct CsvDataSource {
    path: PathBuf,
    schema: SchemaRef,
    has_header: bool,
    batch_size: usize,
}

impl CsvDataSource {
    /// Open `path`. Without an explicit schema, types are inferred from the
    /// first `config.csv_infer_rows` records.
    pub fn try_new(
        path: impl AsRef<Path>,
        schema: Option<SchemaRef>,
        has_header: bool,
        config: &ExecutionConfig,
    ) -> QuillResult<Self> {
        let path = path.as_ref().to_path_buf();
        let schema = match schema {
            Some(schema) => schema,
            None => {
                let file = File::open(&path)?;
                let (inferred, records) = Format::default()
                    .with_header(has_header)
                    .infer_schema(file, Some(config.csv_infer_rows))?;
                debug!(
                    target: "quill::exec",
                    path = %path.display(),
                    records,
                    fields = inferred.fields().len(),
                    "inferred CSV schema"
                );
                Arc::new(inferred)
            }
        };
        Ok(Self {
            path,
            schema,
            has_header,
            batch_size: config.batch_size,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DataSource for CsvDataSource {
    fn schema(&self) -> SchemaRef {
        SchemaRef::clone(&self.schema)
    }

    fn scan(&self, projection: &[String]) -> QuillResult<BatchStream> {
        let indices = projection_indices(&self.schema, projection)?;
        let (read, reorder) = file_order(&indices);
        let file = File::open(&self.path)?;
        let reader = ReaderBuilder::new(SchemaRef::clone(&self.schema))
            .with_header(self.has_header)
            .with_batch_size(self.batch_size)
            .with_projection(read)
            .build(file)?;
        Ok(Box::new(reader.map(move |batch| {
            let batch = batch?;
            batch.project(&reorder).map_err(QuillError::from)
        })))
    }
}
