//! SQL 논리 플래너 — AST → DataFrame 변환
//!
//! Resolves the table against a name → DataFrame registry and replays the
//! statement through the DataFrame builder.

use super::dataframe::DataFrame;
use super::types::{AggregateExpr, AggregateFunction, BinaryOperator, LogicalExpr, ScalarFunction};
use crate::error::{QuillError, QuillResult};
use crate::sql::ast::{SqlExpr, SqlSelect};
use arrow::datatypes::DataType;
use std::collections::HashMap;
use tracing::{debug, warn};

/// SQL 연산자 텍스트 → BinaryOperator 변환
pub fn convert_binary_op(op: &str) -> QuillResult<BinaryOperator> {
    BinaryOperator::from_sql(op).ok_or_else(|| QuillError::SqlNotSupported {
        feature: format!("binary operator {op}"),
        hint: "supported: + - * / = != < <= > >= AND OR".to_string(),
    })
}

/// CAST 타입 이름 → DataType 변환
pub fn convert_data_type(name: &str) -> QuillResult<DataType> {
    let data_type = match name.to_ascii_uppercase().as_str() {
        "INT" | "INTEGER" => DataType::Int32,
        "BIGINT" | "LONG" => DataType::Int64,
        "TINYINT" => DataType::Int8,
        "SMALLINT" => DataType::Int16,
        "FLOAT" | "REAL" => DataType::Float32,
        "DOUBLE" => DataType::Float64,
        "STRING" | "VARCHAR" | "TEXT" | "UTF8" => DataType::Utf8,
        "BOOL" | "BOOLEAN" => DataType::Boolean,
        _ => {
            return Err(QuillError::SqlNotSupported {
                feature: format!("type {name}"),
                hint: "use INT, BIGINT, TINYINT, SMALLINT, FLOAT, DOUBLE, VARCHAR or BOOLEAN"
                    .to_string(),
            });
        }
    };
    Ok(data_type)
}

/// SQL 플래너 — SqlSelect → DataFrame
#[derive(Debug, Default, Clone, Copy)]
pub struct SqlPlanner;

impl SqlPlanner {
    pub fn new() -> Self {
        Self
    }

    pub fn plan(
        &self,
        select: &SqlSelect,
        tables: &HashMap<String, DataFrame>,
    ) -> QuillResult<DataFrame> {
        let mut df = tables
            .get(&select.table_name)
            .cloned()
            .ok_or_else(|| QuillError::TableNotFound(select.table_name.clone()))?;

        if let Some(selection) = &select.selection {
            df = df.filter(self.create_logical_expr(selection)?);
        }

        if let Some(having) = &select.having {
            warn!(target: "quill::planner", %having, "HAVING is parsed but not applied");
        }
        if !select.order_by.is_empty() {
            warn!(
                target: "quill::planner",
                items = select.order_by.len(),
                "ORDER BY is parsed but not applied"
            );
        }

        let projection = select
            .projection
            .iter()
            .map(|e| self.create_logical_expr(e))
            .collect::<QuillResult<Vec<_>>>()?;

        let df = if select.group_by.is_empty() {
            df.project(projection)
        } else {
            let group_exprs = select
                .group_by
                .iter()
                .map(|e| self.create_logical_expr(e))
                .collect::<QuillResult<Vec<_>>>()?;
            let aggregate_exprs = projection
                .into_iter()
                .map(into_aggregate)
                .collect::<QuillResult<Vec<_>>>()?;
            df.aggregate(group_exprs, aggregate_exprs)
        };

        debug!(target: "quill::planner", table = %select.table_name, "planned SQL statement");
        Ok(df)
    }

    /// AST 표현식 → LogicalExpr 변환
    pub fn create_logical_expr(&self, expr: &SqlExpr) -> QuillResult<LogicalExpr> {
        match expr {
            SqlExpr::Identifier(name) => Ok(LogicalExpr::Column(name.clone())),
            SqlExpr::Str(s) => Ok(LogicalExpr::LiteralString(s.clone())),
            SqlExpr::Long(n) => Ok(LogicalExpr::LiteralLong(*n)),
            SqlExpr::Double(n) => Ok(LogicalExpr::LiteralDouble(*n)),
            SqlExpr::BinaryExpr { left, op, right } => Ok(LogicalExpr::BinaryExpr {
                left: Box::new(self.create_logical_expr(left)?),
                op: convert_binary_op(op)?,
                right: Box::new(self.create_logical_expr(right)?),
            }),
            SqlExpr::Alias { expr, alias } => Ok(LogicalExpr::Alias {
                expr: Box::new(self.create_logical_expr(expr)?),
                alias: alias.clone(),
            }),
            SqlExpr::Cast { expr, data_type } => Ok(LogicalExpr::Cast {
                expr: Box::new(self.create_logical_expr(expr)?),
                data_type: convert_data_type(data_type)?,
            }),
            SqlExpr::Function { name, args } => self.create_function(name, args),
            SqlExpr::Sort { .. } => Err(QuillError::SqlNotSupported {
                feature: format!("sort expression {expr} outside ORDER BY"),
                hint: "ASC/DESC may only follow ORDER BY items".to_string(),
            }),
            SqlExpr::Select(_) => Err(QuillError::SqlNotSupported {
                feature: "subquery".to_string(),
                hint: "register the inner query's result as a table".to_string(),
            }),
        }
    }

    fn create_function(&self, name: &str, args: &[SqlExpr]) -> QuillResult<LogicalExpr> {
        let arg = match args {
            [arg] => self.create_logical_expr(arg)?,
            _ => {
                return Err(QuillError::SqlNotSupported {
                    feature: format!("{name} with {} arguments", args.len()),
                    hint: "functions take exactly one argument".to_string(),
                });
            }
        };
        if let Some(function) = AggregateFunction::from_name(name) {
            return Ok(LogicalExpr::Aggregate(AggregateExpr::new(function, arg)));
        }
        if let Some(func) = ScalarFunction::from_name(name) {
            return Ok(LogicalExpr::ScalarFunction {
                func,
                args: vec![arg],
            });
        }
        Err(QuillError::SqlNotSupported {
            feature: format!("function {name}"),
            hint: "supported: MAX, MIN, SUM, COUNT, AVG, SQRT, LN".to_string(),
        })
    }
}

/// Projection item of a grouped query: an aggregate call, optionally aliased.
fn into_aggregate(expr: LogicalExpr) -> QuillResult<AggregateExpr> {
    match expr {
        LogicalExpr::Aggregate(agg) => Ok(agg),
        LogicalExpr::Alias { expr, alias } => match *expr {
            LogicalExpr::Aggregate(agg) => Ok(agg.with_alias(alias)),
            other => Err(not_an_aggregate(&other)),
        },
        other => Err(not_an_aggregate(&other)),
    }
}

fn not_an_aggregate(expr: &LogicalExpr) -> QuillError {
    QuillError::SqlNotSupported {
        feature: format!("non-aggregate projection {expr} in a GROUP BY query"),
        hint: "grouping columns are emitted automatically; project only aggregates".to_string(),
    }
}
