//! HashAggregate Operator — GROUP BY and aggregate functions

use crate::datatypes::{ColumnVector, GroupKey, ScalarValue, build_array};
use crate::error::QuillResult;
use crate::sql::executor::accumulator::Accumulator;
use crate::sql::executor::evaluate_expr;
use crate::sql::executor::operators::PhysicalOperator;
use crate::sql::planner::{PhysicalAggExpr, PhysicalExpr};
use ahash::AHashMap;
use arrow::array::{ArrayRef, RecordBatchOptions};
use arrow::compute;
use arrow::datatypes::{DataType, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use smallvec::SmallVec;
use std::sync::Arc;
use tracing::debug;

type Key = SmallVec<[GroupKey; 4]>;

/// Hash Aggregate 연산자 (GROUP BY) — AHashMap 기반 집계
///
/// 첫 `next()`에서 입력 전체를 소비하고, 그룹당 한 행으로 된 배치 하나를
/// 반환합니다. 그룹 순서는 처음 등장한 순서입니다.
pub struct HashAggregateOperator {
    input: Box<dyn PhysicalOperator>,
    schema: SchemaRef,
    group_exprs: Vec<PhysicalExpr>,
    aggregate_exprs: Vec<PhysicalAggExpr>,
    /// Whether result has been produced
    done: bool,
}

/// Groups in first-seen order, plus key → slot lookup.
#[derive(Default)]
struct GroupTable {
    slots: AHashMap<Key, usize>,
    groups: Vec<(Key, Vec<Box<dyn Accumulator>>)>,
}

impl HashAggregateOperator {
    pub fn new(
        input: Box<dyn PhysicalOperator>,
        schema: SchemaRef,
        group_exprs: Vec<PhysicalExpr>,
        aggregate_exprs: Vec<PhysicalAggExpr>,
    ) -> Self {
        Self {
            input,
            schema,
            group_exprs,
            aggregate_exprs,
            done: false,
        }
    }

    fn aggregate_all(&mut self) -> QuillResult<RecordBatch> {
        let mut table = GroupTable::default();
        let mut rows_in = 0usize;

        while let Some(batch) = self.input.next()? {
            rows_in += batch.num_rows();
            let keys = self
                .group_exprs
                .iter()
                .map(|expr| evaluate_expr(expr, &batch))
                .collect::<QuillResult<Vec<ColumnVector>>>()?;
            let inputs = self
                .aggregate_exprs
                .iter()
                .map(|agg| evaluate_expr(&agg.input, &batch))
                .collect::<QuillResult<Vec<ColumnVector>>>()?;

            for row in 0..batch.num_rows() {
                let key = keys
                    .iter()
                    .map(|column| column.value(row).map(GroupKey::from))
                    .collect::<QuillResult<Key>>()?;
                let slot = match table.slots.get(&key) {
                    Some(&slot) => slot,
                    None => {
                        let accumulators = self
                            .aggregate_exprs
                            .iter()
                            .map(PhysicalAggExpr::create_accumulator)
                            .collect::<QuillResult<Vec<_>>>()?;
                        let slot = table.groups.len();
                        table.groups.push((key.clone(), accumulators));
                        table.slots.insert(key, slot);
                        slot
                    }
                };
                let accumulators = &mut table.groups[slot].1;
                for (accumulator, input) in accumulators.iter_mut().zip(&inputs) {
                    accumulator.accumulate(input.value(row)?)?;
                }
            }
        }

        debug!(
            target: "quill::exec",
            rows_in,
            groups = table.groups.len(),
            "hash aggregate drained input"
        );

        if table.groups.is_empty() {
            return Ok(RecordBatch::new_empty(Arc::clone(&self.schema)));
        }
        self.build_output(&table)
    }

    /// Group values first, then one column per aggregate.
    fn build_output(&self, table: &GroupTable) -> QuillResult<RecordBatch> {
        let fields = self.schema.fields();
        let mut columns: Vec<ArrayRef> = Vec::with_capacity(fields.len());

        for i in 0..self.group_exprs.len() {
            let values: Vec<ScalarValue> = table
                .groups
                .iter()
                .map(|(key, _)| ScalarValue::from(&key[i]))
                .collect();
            columns.push(build_column(fields[i].data_type(), &values)?);
        }
        for (j, _) in self.aggregate_exprs.iter().enumerate() {
            let values: Vec<ScalarValue> = table
                .groups
                .iter()
                .map(|(_, accumulators)| accumulators[j].final_value())
                .collect();
            let field = &fields[self.group_exprs.len() + j];
            columns.push(build_column(field.data_type(), &values)?);
        }

        let options = RecordBatchOptions::new().with_row_count(Some(table.groups.len()));
        Ok(RecordBatch::try_new_with_options(
            Arc::clone(&self.schema),
            columns,
            &options,
        )?)
    }
}

/// Byte and large-string keys were grouped by their text; convert back.
fn build_column(data_type: &DataType, values: &[ScalarValue]) -> QuillResult<ArrayRef> {
    match data_type {
        DataType::LargeUtf8 | DataType::Binary => {
            let text = build_array(&DataType::Utf8, values)?;
            Ok(compute::cast(&text, data_type)?)
        }
        _ => build_array(data_type, values),
    }
}

impl PhysicalOperator for HashAggregateOperator {
    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn next(&mut self) -> QuillResult<Option<RecordBatch>> {
        if self.done {
            return Ok(None);
        }
        self.done = true;
        self.aggregate_all().map(Some)
    }
}
