//! Parquet tables read through the Arrow record batch reader.

use super::{BatchStream, DataSource, file_order};
use crate::config::ExecutionConfig;
use crate::datatypes::projection_indices;
use crate::error::{QuillError, QuillResult};
use arrow::datatypes::SchemaRef;
use parquet::arrow::ProjectionMask;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use std::fs::File;
use std::path::{Path, PathBuf};

/// A Parquet file; only the projected columns are decoded.
#[derive(Debug, Clone)]
pub struct ParquetDataSource {
    path: PathBuf,
    schema: SchemaRef,
    batch_size: usize,
}

impl ParquetDataSource {
    /// Open `path` and read its schema from the footer.
    pub fn try_new(path: impl AsRef<Path>, config: &ExecutionConfig) -> QuillResult<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)?;
        let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
        let schema = SchemaRef::clone(builder.schema());
        Ok(Self {
            path,
            schema,
            batch_size: config.batch_size,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DataSource for ParquetDataSource {
    fn schema(&self) -> SchemaRef {
        SchemaRef::clone(&self.schema)
    }

    fn scan(&self, projection: &[String]) -> QuillResult<BatchStream> {
        let indices = projection_indices(&self.schema, projection)?;
        let file = File::open(&self.path)?;
        let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
        let (read, reorder) = file_order(&indices);
        // roots()는 최상위 필드 인덱스를 받는다; nested leaf 개수와 무관
        let mask = ProjectionMask::roots(builder.parquet_schema(), read);
        let reader = builder
            .with_projection(mask)
            .with_batch_size(self.batch_size)
            .build()?;

        // The reader yields columns in file order.
        Ok(Box::new(reader.map(move |batch| {
            let batch = batch?;
            batch.project(&reorder).map_err(QuillError::from)
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Array, ArrayRef, Float64Array, Int32Array, RecordBatch, StringArray, StructArray};
    use arrow::datatypes::{DataType, Field, Schema};
    use parquet::arrow::ArrowWriter;
    use std::sync::Arc;
    use tempfile::NamedTempFile;

    fn write_fixture(rows: usize) -> NamedTempFile {
        let schema = Arc::new(Schema::new(vec![
            Field::new("id", DataType::Int32, false),
            Field::new("name", DataType::Utf8, false),
            Field::new("value", DataType::Float64, true),
        ]));
        let ids: Vec<i32> = (0..rows as i32).collect();
        let names: Vec<String> = (0..rows).map(|i| format!("item_{i}")).collect();
        let values: Vec<f64> = (0..rows).map(|i| i as f64 * 1.5).collect();
        let batch = RecordBatch::try_new(
            Arc::clone(&schema),
            vec![
                Arc::new(Int32Array::from(ids)),
                Arc::new(StringArray::from(names)),
                Arc::new(Float64Array::from(values)),
            ],
        )
        .unwrap();

        let tmp = NamedTempFile::new().unwrap();
        let file = tmp.reopen().unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();
        tmp
    }

    #[test]
    fn test_reads_schema() {
        let tmp = write_fixture(10);
        let source = ParquetDataSource::try_new(tmp.path(), &ExecutionConfig::default()).unwrap();
        let names: Vec<String> = source
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect();
        assert_eq!(names, vec!["id", "name", "value"]);
    }

    #[test]
    fn test_scan_projection_in_requested_order() {
        let tmp = write_fixture(10);
        let source = ParquetDataSource::try_new(tmp.path(), &ExecutionConfig::default()).unwrap();
        let stream = source
            .scan(&["value".to_string(), "id".to_string()])
            .unwrap();
        let batches = super::super::collect(stream).unwrap();
        let batch = &batches[0];
        assert_eq!(batch.num_columns(), 2);
        assert_eq!(batch.schema().field(0).name(), "value");
        assert_eq!(batch.schema().field(1).name(), "id");
        let ids = batch.column(1).as_any().downcast_ref::<Int32Array>().unwrap();
        assert_eq!(ids.value(3), 3);
    }

    #[test]
    fn test_batch_size_honoured() {
        let tmp = write_fixture(10);
        let config = ExecutionConfig::default().with_batch_size(4);
        let source = ParquetDataSource::try_new(tmp.path(), &config).unwrap();
        let batches = super::super::collect(source.scan(&[]).unwrap()).unwrap();
        let sizes: Vec<usize> = batches.iter().map(|b| b.num_rows()).collect();
        assert_eq!(sizes, vec![4, 4, 2]);
    }

    #[test]
    fn test_projection_after_struct_column() {
        let point = StructArray::from(vec![
            (
                Arc::new(Field::new("x", DataType::Float64, false)),
                Arc::new(Float64Array::from(vec![0.0, 1.0, 2.0])) as ArrayRef,
            ),
            (
                Arc::new(Field::new("y", DataType::Float64, false)),
                Arc::new(Float64Array::from(vec![5.0, 6.0, 7.0])) as ArrayRef,
            ),
        ]);
        let schema = Arc::new(Schema::new(vec![
            Field::new("id", DataType::Int32, false),
            Field::new("point", point.data_type().clone(), false),
            Field::new("value", DataType::Float64, false),
        ]));
        let batch = RecordBatch::try_new(
            Arc::clone(&schema),
            vec![
                Arc::new(Int32Array::from(vec![1, 2, 3])),
                Arc::new(point),
                Arc::new(Float64Array::from(vec![10.5, 20.5, 30.5])),
            ],
        )
        .unwrap();
        let tmp = NamedTempFile::new().unwrap();
        let mut writer = ArrowWriter::try_new(tmp.reopen().unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        // "value" is root 2 but leaf 3
        let source = ParquetDataSource::try_new(tmp.path(), &ExecutionConfig::default()).unwrap();
        let batches = super::super::collect(source.scan(&["value".to_string()]).unwrap()).unwrap();
        let batch = &batches[0];
        assert_eq!(batch.num_columns(), 1);
        assert_eq!(batch.schema().field(0).name(), "value");
        let values = batch.column(0).as_any().downcast_ref::<Float64Array>().unwrap();
        assert_eq!(values.values().to_vec(), vec![10.5, 20.5, 30.5]);

        let batches = super::super::collect(
            source.scan(&["value".to_string(), "point".to_string()]).unwrap(),
        )
        .unwrap();
        assert_eq!(batches[0].schema().field(1).name(), "point");
        assert!(matches!(batches[0].schema().field(1).data_type(), DataType::Struct(_)));
    }
}
