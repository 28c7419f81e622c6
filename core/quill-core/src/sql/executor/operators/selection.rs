//! Selection Operator — WHERE clause evaluation

use crate::error::{QuillError, QuillResult};
use crate::sql::executor::evaluate_expr;
use crate::sql::executor::operators::PhysicalOperator;
use crate::sql::planner::PhysicalExpr;
use arrow::array::{Array, AsArray};
use arrow::compute;
use arrow::datatypes::{DataType, Schema};
use arrow::record_batch::RecordBatch;

/// 필터 연산자 (WHERE 조건) — predicate가 true인 행만 남김
///
/// Column types are kept as declared. A batch with no matching rows is
/// emitted as an empty batch.
pub struct SelectionOperator {
    input: Box<dyn PhysicalOperator>,
    predicate: PhysicalExpr,
}

impl SelectionOperator {
    pub fn new(input: Box<dyn PhysicalOperator>, predicate: PhysicalExpr) -> Self {
        Self { input, predicate }
    }
}

impl PhysicalOperator for SelectionOperator {
    fn schema(&self) -> &Schema {
        self.input.schema()
    }

    fn next(&mut self) -> QuillResult<Option<RecordBatch>> {
        let Some(batch) = self.input.next()? else {
            return Ok(None);
        };

        let mask = evaluate_expr(&self.predicate, &batch)?.into_array()?;
        if mask.data_type() != &DataType::Boolean {
            return Err(QuillError::type_mismatch(
                "Boolean predicate",
                format!("{:?}", mask.data_type()),
            ));
        }

        // Null mask slots drop the row.
        Ok(Some(compute::filter_record_batch(&batch, mask.as_boolean())?))
    }
}
