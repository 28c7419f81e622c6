//! SQL Query Executor Module
//!
//! PhysicalPlan → operator tree, pulled one batch at a time.

use crate::error::QuillResult;
use crate::sql::planner::PhysicalPlan;
use arrow::array::RecordBatch;
use std::sync::Arc;

pub mod accumulator;
pub mod expr;
pub mod operators;

pub use accumulator::{Accumulator, ExtremumAccumulator, SumAccumulator};
pub use expr::evaluate_expr;
pub use operators::{
    HashAggregateOperator, PhysicalOperator, ProjectionOperator, ScanOperator, SelectionOperator,
};

/// Build the operator tree for `plan`. Nothing is read until the first pull.
pub fn build_operator(plan: &PhysicalPlan) -> QuillResult<Box<dyn PhysicalOperator>> {
    let operator: Box<dyn PhysicalOperator> = match plan {
        PhysicalPlan::Scan {
            source,
            projection,
            schema,
        } => Box::new(ScanOperator::new(
            Arc::clone(source),
            projection.clone(),
            Arc::clone(schema),
        )),
        PhysicalPlan::Selection { input, predicate } => Box::new(SelectionOperator::new(
            build_operator(input)?,
            predicate.clone(),
        )),
        PhysicalPlan::Projection {
            input,
            schema,
            exprs,
        } => Box::new(ProjectionOperator::new(
            build_operator(input)?,
            Arc::clone(schema),
            exprs.clone(),
        )),
        PhysicalPlan::HashAggregate {
            input,
            group_exprs,
            aggregate_exprs,
            schema,
        } => Box::new(HashAggregateOperator::new(
            build_operator(input)?,
            Arc::clone(schema),
            group_exprs.clone(),
            aggregate_exprs.clone(),
        )),
    };
    Ok(operator)
}

/// Iterator adapter over the root operator. Stops after the first error.
pub struct OperatorStream {
    operator: Box<dyn PhysicalOperator>,
    finished: bool,
}

impl OperatorStream {
    pub fn new(operator: Box<dyn PhysicalOperator>) -> Self {
        Self {
            operator,
            finished: false,
        }
    }
}

impl Iterator for OperatorStream {
    type Item = QuillResult<RecordBatch>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.operator.next() {
            Ok(Some(batch)) => Some(Ok(batch)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}
