//! QueryPlanner 구현
//!
//! LogicalPlan → PhysicalPlan 변환

use super::types::*;
use crate::datatypes::{ScalarValue, is_supported_type};
use crate::error::{QuillError, QuillResult};
use arrow::datatypes::Schema;
use std::sync::Arc;
use tracing::debug;

/// 물리 플랜 빌더 — LogicalPlan → PhysicalPlan 변환
#[derive(Debug, Default, Clone, Copy)]
pub struct QueryPlanner;

impl QueryPlanner {
    pub fn new() -> Self {
        Self
    }

    /// Convert LogicalPlan → PhysicalPlan
    pub fn create_physical_plan(&self, plan: &LogicalPlan) -> QuillResult<PhysicalPlan> {
        let physical = self.plan(plan)?;
        debug!(target: "quill::planner", plan = %physical.pretty(), "physical plan");
        Ok(physical)
    }

    /// Children are planned first; each node reuses its input's physical
    /// schema instead of re-deriving the logical one.
    fn plan(&self, plan: &LogicalPlan) -> QuillResult<PhysicalPlan> {
        match plan {
            LogicalPlan::Scan {
                source, projection, ..
            } => Ok(PhysicalPlan::Scan {
                source: source.clone(),
                projection: projection.clone(),
                schema: plan.schema()?,
            }),
            LogicalPlan::Selection { input, expr } => {
                let input = self.plan(input)?;
                let predicate = self.physical_expr(expr, &input.schema())?;
                Ok(PhysicalPlan::Selection {
                    input: Box::new(input),
                    predicate,
                })
            }
            LogicalPlan::Projection { input, exprs } => {
                let input = self.plan(input)?;
                let input_schema = input.schema();
                let physical_exprs = exprs
                    .iter()
                    .map(|e| self.physical_expr(e, &input_schema))
                    .collect::<QuillResult<Vec<_>>>()?;
                let fields = exprs
                    .iter()
                    .map(|e| e.field_in(&input_schema))
                    .collect::<QuillResult<Vec<_>>>()?;
                Ok(PhysicalPlan::Projection {
                    input: Box::new(input),
                    schema: Arc::new(Schema::new(fields)),
                    exprs: physical_exprs,
                })
            }
            LogicalPlan::Aggregate {
                input,
                group_exprs,
                aggregate_exprs,
            } => {
                let input = self.plan(input)?;
                let input_schema = input.schema();
                let mut fields = Vec::with_capacity(group_exprs.len() + aggregate_exprs.len());
                let mut physical_groups = Vec::with_capacity(group_exprs.len());
                for expr in group_exprs {
                    physical_groups.push(self.physical_expr(expr, &input_schema)?);
                    fields.push(expr.field_in(&input_schema)?);
                }
                let mut physical_aggs = Vec::with_capacity(aggregate_exprs.len());
                for agg in aggregate_exprs {
                    physical_aggs.push(self.create_aggregate_expr(agg, &input_schema)?);
                    fields.push(agg.field_in(&input_schema)?);
                }
                Ok(PhysicalPlan::HashAggregate {
                    input: Box::new(input),
                    group_exprs: physical_groups,
                    aggregate_exprs: physical_aggs,
                    schema: Arc::new(Schema::new(fields)),
                })
            }
        }
    }

    fn create_aggregate_expr(
        &self,
        agg: &AggregateExpr,
        input: &Schema,
    ) -> QuillResult<PhysicalAggExpr> {
        match agg.function {
            AggregateFunction::Max | AggregateFunction::Min | AggregateFunction::Sum => {
                Ok(PhysicalAggExpr {
                    function: agg.function,
                    input: self.physical_expr(&agg.expr, input)?,
                })
            }
            AggregateFunction::Count | AggregateFunction::Avg => Err(QuillError::Unsupported(
                format!("unsupported aggregate function: {agg}"),
            )),
        }
    }

    /// Compile `expr`, resolving column names against `input`'s schema.
    pub fn create_physical_expr(
        &self,
        expr: &LogicalExpr,
        input: &LogicalPlan,
    ) -> QuillResult<PhysicalExpr> {
        self.physical_expr(expr, &*input.schema()?)
    }

    fn physical_expr(&self, expr: &LogicalExpr, input: &Schema) -> QuillResult<PhysicalExpr> {
        match expr {
            LogicalExpr::LiteralLong(n) => Ok(PhysicalExpr::Literal(ScalarValue::Int64(*n))),
            LogicalExpr::LiteralDouble(n) => Ok(PhysicalExpr::Literal(ScalarValue::Float64(*n))),
            LogicalExpr::LiteralString(s) => {
                Ok(PhysicalExpr::Literal(ScalarValue::Utf8(s.clone())))
            }
            LogicalExpr::ColumnIndex(i) => {
                let width = input.fields().len();
                if *i >= width {
                    return Err(QuillError::Schema(format!(
                        "column index {i} out of range for {width} fields"
                    )));
                }
                Ok(PhysicalExpr::Column(*i))
            }
            LogicalExpr::Column(name) => input
                .index_of(name)
                .map(PhysicalExpr::Column)
                .map_err(|_| QuillError::Schema(format!("no column named '{name}'"))),
            // An alias only names the planning-time field.
            LogicalExpr::Alias { expr, .. } => self.physical_expr(expr, input),
            LogicalExpr::Cast { expr, data_type } => {
                if !is_supported_type(data_type) {
                    return Err(QuillError::Unsupported(format!(
                        "cast to {data_type:?} is not supported"
                    )));
                }
                Ok(PhysicalExpr::Cast {
                    expr: Box::new(self.physical_expr(expr, input)?),
                    data_type: data_type.clone(),
                })
            }
            LogicalExpr::BinaryExpr { left, op, right } => Ok(PhysicalExpr::BinaryOp {
                left: Box::new(self.physical_expr(left, input)?),
                op: *op,
                right: Box::new(self.physical_expr(right, input)?),
            }),
            LogicalExpr::ScalarFunction { func, args } => match args.as_slice() {
                [arg] => Ok(PhysicalExpr::UnaryMath {
                    func: *func,
                    expr: Box::new(self.physical_expr(arg, input)?),
                }),
                _ => Err(QuillError::Unsupported(format!(
                    "{} expects one argument, got {}",
                    func.name(),
                    args.len()
                ))),
            },
            LogicalExpr::Aggregate(agg) => Err(QuillError::Unsupported(format!(
                "aggregate expression {agg} outside an aggregate plan"
            ))),
        }
    }
}
