//! Rule: Projection Pushdown
//!
//! 상위 노드가 참조하는 컬럼만 Scan이 읽도록 프로젝션을 내려보냄

use std::collections::BTreeSet;

use crate::error::{QuillError, QuillResult};
use crate::sql::planner::{AggregateExpr, LogicalExpr, LogicalPlan};
use tracing::debug;

use super::OptimizationRule;

/// 불필요한 컬럼을 조기 제거하여 메모리 절감
pub struct ProjectionPushdownRule;

impl OptimizationRule for ProjectionPushdownRule {
    fn name(&self) -> &str {
        "ProjectionPushdown"
    }

    fn apply(&self, plan: LogicalPlan) -> QuillResult<LogicalPlan> {
        self.push_down(plan, BTreeSet::new())
    }
}

impl ProjectionPushdownRule {
    /// Rewrite `plan` so its scan reads only `required` plus whatever the
    /// nodes below need. Each subtree gets its own copy of the set.
    fn push_down(
        &self,
        plan: LogicalPlan,
        mut required: BTreeSet<String>,
    ) -> QuillResult<LogicalPlan> {
        match plan {
            LogicalPlan::Projection { input, exprs } => {
                let exprs = extract_columns(exprs, &input, &mut required)?;
                Ok(LogicalPlan::Projection {
                    input: Box::new(self.push_down(*input, required)?),
                    exprs,
                })
            }
            LogicalPlan::Selection { input, expr } => {
                let expr = extract_column(expr, &input, &mut required)?;
                Ok(LogicalPlan::Selection {
                    input: Box::new(self.push_down(*input, required)?),
                    expr,
                })
            }
            LogicalPlan::Aggregate {
                input,
                group_exprs,
                aggregate_exprs,
            } => {
                let group_exprs = extract_columns(group_exprs, &input, &mut required)?;
                let aggregate_exprs = aggregate_exprs
                    .into_iter()
                    .map(|mut agg| -> QuillResult<AggregateExpr> {
                        agg.expr = Box::new(extract_column(*agg.expr, &input, &mut required)?);
                        Ok(agg)
                    })
                    .collect::<QuillResult<Vec<_>>>()?;
                Ok(LogicalPlan::Aggregate {
                    input: Box::new(self.push_down(*input, required)?),
                    group_exprs,
                    aggregate_exprs,
                })
            }
            LogicalPlan::Scan { path, source, .. } => {
                // BTreeSet iteration is already sorted and distinct.
                let schema = source.schema();
                let projection: Vec<String> = required
                    .into_iter()
                    .filter(|name| schema.field_with_name(name).is_ok())
                    .collect();
                debug!(
                    target: "quill::optimizer",
                    %path,
                    columns = ?projection,
                    "scan projection pushed down"
                );
                Ok(LogicalPlan::Scan {
                    path,
                    source,
                    projection,
                })
            }
        }
    }
}

fn extract_columns(
    exprs: Vec<LogicalExpr>,
    input: &LogicalPlan,
    out: &mut BTreeSet<String>,
) -> QuillResult<Vec<LogicalExpr>> {
    exprs
        .into_iter()
        .map(|expr| extract_column(expr, input, out))
        .collect()
}

/// Collect column names referenced by `expr` into `out`.
///
/// Index references are resolved through `input`'s schema and come back as
/// name references, since the narrowed scan no longer has the same layout.
fn extract_column(
    expr: LogicalExpr,
    input: &LogicalPlan,
    out: &mut BTreeSet<String>,
) -> QuillResult<LogicalExpr> {
    let expr = match expr {
        LogicalExpr::Column(name) => {
            out.insert(name.clone());
            LogicalExpr::Column(name)
        }
        LogicalExpr::ColumnIndex(i) => {
            let schema = input.schema()?;
            let field = schema.fields().get(i).ok_or_else(|| {
                QuillError::Schema(format!(
                    "column index {i} out of range for {} fields",
                    schema.fields().len()
                ))
            })?;
            out.insert(field.name().clone());
            LogicalExpr::Column(field.name().clone())
        }
        LogicalExpr::BinaryExpr { left, op, right } => LogicalExpr::BinaryExpr {
            left: Box::new(extract_column(*left, input, out)?),
            op,
            right: Box::new(extract_column(*right, input, out)?),
        },
        LogicalExpr::Alias { expr, alias } => LogicalExpr::Alias {
            expr: Box::new(extract_column(*expr, input, out)?),
            alias,
        },
        LogicalExpr::Cast { expr, data_type } => LogicalExpr::Cast {
            expr: Box::new(extract_column(*expr, input, out)?),
            data_type,
        },
        LogicalExpr::ScalarFunction { func, args } => LogicalExpr::ScalarFunction {
            func,
            args: extract_columns(args, input, out)?,
        },
        literal @ (LogicalExpr::LiteralLong(_)
        | LogicalExpr::LiteralDouble(_)
        | LogicalExpr::LiteralString(_)) => literal,
        LogicalExpr::Aggregate(agg) => {
            return Err(QuillError::Unsupported(format!(
                "cannot push projection through aggregate expression {agg}"
            )));
        }
    };
    Ok(expr)
}
