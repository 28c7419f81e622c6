//! DataFrame — fluent builder over logical plans.
//!
//! Each call wraps the current plan in a new node and returns a new
//! DataFrame; plans are never modified in place.

use super::types::{
    AggregateExpr, AggregateFunction, LogicalExpr, LogicalPlan, ScalarFunction,
};
use crate::error::QuillResult;
use arrow::datatypes::{DataType, SchemaRef};

#[derive(Debug, Clone, PartialEq)]
pub struct DataFrame {
    plan: LogicalPlan,
}

impl DataFrame {
    pub fn new(plan: LogicalPlan) -> Self {
        Self { plan }
    }

    pub fn project(self, exprs: Vec<LogicalExpr>) -> DataFrame {
        DataFrame::new(LogicalPlan::Projection {
            input: Box::new(self.plan),
            exprs,
        })
    }

    pub fn filter(self, expr: LogicalExpr) -> DataFrame {
        DataFrame::new(LogicalPlan::Selection {
            input: Box::new(self.plan),
            expr,
        })
    }

    pub fn aggregate(self, group_exprs: Vec<LogicalExpr>, aggregate_exprs: Vec<AggregateExpr>) -> DataFrame {
        DataFrame::new(LogicalPlan::Aggregate {
            input: Box::new(self.plan),
            group_exprs,
            aggregate_exprs,
        })
    }

    pub fn schema(&self) -> QuillResult<SchemaRef> {
        self.plan.schema()
    }

    pub fn logical_plan(&self) -> &LogicalPlan {
        &self.plan
    }

    pub fn into_plan(self) -> LogicalPlan {
        self.plan
    }
}

impl From<LogicalPlan> for DataFrame {
    fn from(plan: LogicalPlan) -> Self {
        DataFrame::new(plan)
    }
}

// ===== Expression helpers =====

pub fn col(name: impl Into<String>) -> LogicalExpr {
    LogicalExpr::Column(name.into())
}

pub fn col_index(index: usize) -> LogicalExpr {
    LogicalExpr::ColumnIndex(index)
}

pub fn lit_long(n: i64) -> LogicalExpr {
    LogicalExpr::LiteralLong(n)
}

pub fn lit_double(n: f64) -> LogicalExpr {
    LogicalExpr::LiteralDouble(n)
}

pub fn lit_str(s: impl Into<String>) -> LogicalExpr {
    LogicalExpr::LiteralString(s.into())
}

pub fn cast(expr: LogicalExpr, data_type: DataType) -> LogicalExpr {
    LogicalExpr::Cast {
        expr: Box::new(expr),
        data_type,
    }
}

pub fn max(expr: LogicalExpr) -> AggregateExpr {
    AggregateExpr::new(AggregateFunction::Max, expr)
}

pub fn min(expr: LogicalExpr) -> AggregateExpr {
    AggregateExpr::new(AggregateFunction::Min, expr)
}

pub fn sum(expr: LogicalExpr) -> AggregateExpr {
    AggregateExpr::new(AggregateFunction::Sum, expr)
}

pub fn count(expr: LogicalExpr) -> AggregateExpr {
    AggregateExpr::new(AggregateFunction::Count, expr)
}

pub fn avg(expr: LogicalExpr) -> AggregateExpr {
    AggregateExpr::new(AggregateFunction::Avg, expr)
}

pub fn sqrt(expr: LogicalExpr) -> LogicalExpr {
    LogicalExpr::ScalarFunction {
        func: ScalarFunction::Sqrt,
        args: vec![expr],
    }
}

pub fn ln(expr: LogicalExpr) -> LogicalExpr {
    LogicalExpr::ScalarFunction {
        func: ScalarFunction::Ln,
        args: vec![expr],
    }
}
