//! Projection Operator — SELECT column computation

use crate::error::QuillResult;
use crate::sql::executor::evaluate_expr;
use crate::sql::executor::operators::PhysicalOperator;
use crate::sql::planner::PhysicalExpr;
use arrow::array::{ArrayRef, RecordBatchOptions};
use arrow::datatypes::{Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use std::sync::Arc;

/// Projection 연산자 (SELECT 컬럼 계산) — 입력 배치와 행 수가 같음
pub struct ProjectionOperator {
    input: Box<dyn PhysicalOperator>,
    schema: SchemaRef,
    /// Expressions to evaluate for each output column
    exprs: Vec<PhysicalExpr>,
}

impl ProjectionOperator {
    pub fn new(input: Box<dyn PhysicalOperator>, schema: SchemaRef, exprs: Vec<PhysicalExpr>) -> Self {
        Self {
            input,
            schema,
            exprs,
        }
    }
}

impl PhysicalOperator for ProjectionOperator {
    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn next(&mut self) -> QuillResult<Option<RecordBatch>> {
        let Some(batch) = self.input.next()? else {
            return Ok(None);
        };

        let columns: Vec<ArrayRef> = self
            .exprs
            .iter()
            .map(|expr| evaluate_expr(expr, &batch)?.into_array())
            .collect::<QuillResult<_>>()?;

        let options = RecordBatchOptions::new().with_row_count(Some(batch.num_rows()));
        Ok(Some(RecordBatch::try_new_with_options(
            Arc::clone(&self.schema),
            columns,
            &options,
        )?))
    }
}
