//! Scan Operator — pulls batches from a DataSource

use crate::datasource::{BatchStream, DataSource};
use crate::error::QuillResult;
use crate::sql::executor::operators::PhysicalOperator;
use arrow::datatypes::{Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use std::sync::Arc;
use tracing::trace;

/// 테이블 스캔 연산자 — 데이터 소스의 배치를 그대로 전달
pub struct ScanOperator {
    source: Arc<dyn DataSource>,
    projection: Vec<String>,
    schema: SchemaRef,
    /// Opened lazily on the first pull
    stream: Option<BatchStream>,
    finished: bool,
}

impl ScanOperator {
    pub fn new(source: Arc<dyn DataSource>, projection: Vec<String>, schema: SchemaRef) -> Self {
        Self {
            source,
            projection,
            schema,
            stream: None,
            finished: false,
        }
    }
}

impl PhysicalOperator for ScanOperator {
    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn next(&mut self) -> QuillResult<Option<RecordBatch>> {
        if self.finished {
            return Ok(None);
        }
        if self.stream.is_none() {
            trace!(target: "quill::exec", projection = ?self.projection, "opening scan");
            self.stream = Some(self.source.scan(&self.projection)?);
        }
        let batch = match self.stream.as_mut() {
            Some(stream) => stream.next().transpose()?,
            None => None,
        };
        if batch.is_none() {
            // 소스 끝: reader를 닫는다
            self.finished = true;
            self.stream = None;
        }
        Ok(batch)
    }
}
