//! SQL 플래너 타입 정의
//!
//! LogicalPlan, LogicalExpr, PhysicalPlan, PhysicalExpr 등의 핵심 타입들을 정의합니다.
//! Every tree is a closed enum; formatters, the optimizer, the planners and the
//! evaluators match on them exhaustively.

use crate::datasource::{BatchStream, DataSource};
use crate::datatypes::{ScalarValue, format_schema, select_schema};
use crate::error::{QuillError, QuillResult};
use crate::sql::executor::{OperatorStream, build_operator};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use std::fmt;
use std::sync::Arc;

/// 논리 플랜 — 쿼리의 논리적 표현
#[derive(Debug, Clone, PartialEq)]
pub enum LogicalPlan {
    /// 테이블 스캔
    Scan {
        path: String,
        source: Arc<dyn DataSource>,
        /// Columns to read; empty reads every column.
        projection: Vec<String>,
    },
    /// WHERE 조건 필터
    Selection {
        input: Box<LogicalPlan>,
        expr: LogicalExpr,
    },
    /// 컬럼 선택/계산
    Projection {
        input: Box<LogicalPlan>,
        exprs: Vec<LogicalExpr>,
    },
    /// GROUP BY + 집계
    Aggregate {
        input: Box<LogicalPlan>,
        group_exprs: Vec<LogicalExpr>,
        aggregate_exprs: Vec<AggregateExpr>,
    },
}

impl LogicalPlan {
    /// Output schema, derived from the children.
    pub fn schema(&self) -> QuillResult<SchemaRef> {
        match self {
            LogicalPlan::Scan {
                source, projection, ..
            } => Ok(Arc::new(select_schema(&source.schema(), projection)?)),
            LogicalPlan::Selection { input, .. } => input.schema(),
            LogicalPlan::Projection { input, exprs } => {
                let input_schema = input.schema()?;
                let fields = exprs
                    .iter()
                    .map(|e| e.field_in(&input_schema))
                    .collect::<QuillResult<Vec<_>>>()?;
                Ok(Arc::new(Schema::new(fields)))
            }
            LogicalPlan::Aggregate {
                input,
                group_exprs,
                aggregate_exprs,
            } => {
                let input_schema = input.schema()?;
                let mut fields = group_exprs
                    .iter()
                    .map(|e| e.field_in(&input_schema))
                    .collect::<QuillResult<Vec<_>>>()?;
                for agg in aggregate_exprs {
                    fields.push(agg.field_in(&input_schema)?);
                }
                Ok(Arc::new(Schema::new(fields)))
            }
        }
    }

    pub fn children(&self) -> Vec<&LogicalPlan> {
        match self {
            LogicalPlan::Scan { .. } => vec![],
            LogicalPlan::Selection { input, .. }
            | LogicalPlan::Projection { input, .. }
            | LogicalPlan::Aggregate { input, .. } => vec![input.as_ref()],
        }
    }

    /// One line per node, children indented by one tab per level.
    pub fn pretty(&self) -> String {
        let mut out = String::new();
        format_tree(self, LogicalPlan::children, 0, &mut out);
        out
    }
}

impl fmt::Display for LogicalPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicalPlan::Scan {
                path, projection, ..
            } => {
                if projection.is_empty() {
                    write!(f, "Scan: {path}; projection=None")
                } else {
                    write!(f, "Scan: {path}; projection=[{}]", projection.join(", "))
                }
            }
            LogicalPlan::Selection { expr, .. } => write!(f, "Selection: {expr}"),
            LogicalPlan::Projection { exprs, .. } => write!(f, "Projection: {}", join(exprs)),
            LogicalPlan::Aggregate {
                group_exprs,
                aggregate_exprs,
                ..
            } => write!(
                f,
                "Aggregate: groupExpr=[{}], aggregateExpr=[{}]",
                join(group_exprs),
                join(aggregate_exprs)
            ),
        }
    }
}

/// 논리 표현식 — 컬럼, 리터럴, 연산자, 함수
#[derive(Debug, Clone, PartialEq)]
pub enum LogicalExpr {
    /// 이름으로 컬럼 참조
    Column(String),
    /// 위치로 컬럼 참조
    ColumnIndex(usize),
    LiteralLong(i64),
    LiteralDouble(f64),
    LiteralString(String),
    Alias {
        expr: Box<LogicalExpr>,
        alias: String,
    },
    Cast {
        expr: Box<LogicalExpr>,
        data_type: DataType,
    },
    /// 이항 연산 (+, -, *, /, =, !=, <, >, AND, OR)
    BinaryExpr {
        left: Box<LogicalExpr>,
        op: BinaryOperator,
        right: Box<LogicalExpr>,
    },
    /// 스칼라 함수 호출 (SQRT, LN)
    ScalarFunction {
        func: ScalarFunction,
        args: Vec<LogicalExpr>,
    },
    /// 집계 함수 호출 (MAX, MIN, SUM, COUNT, AVG)
    Aggregate(AggregateExpr),
}

impl LogicalExpr {
    /// Name and type of the value this expression produces over `input`.
    pub fn to_field(&self, input: &LogicalPlan) -> QuillResult<Field> {
        self.field_in(&*input.schema()?)
    }

    /// [`LogicalExpr::to_field`] against an already derived input schema.
    pub fn field_in(&self, schema: &Schema) -> QuillResult<Field> {
        match self {
            LogicalExpr::Column(name) => {
                let field = schema
                    .field_with_name(name)
                    .map_err(|_| QuillError::Schema(format!("no column named '{name}'")))?;
                Ok(field.clone())
            }
            LogicalExpr::ColumnIndex(i) => {
                schema.fields().get(*i).map(|f| Field::clone(f)).ok_or_else(|| {
                    QuillError::Schema(format!(
                        "column index {i} out of range for {} fields",
                        schema.fields().len()
                    ))
                })
            }
            LogicalExpr::LiteralLong(n) => Ok(Field::new(n.to_string(), DataType::Int64, false)),
            LogicalExpr::LiteralDouble(n) => Ok(Field::new(
                ScalarValue::Float64(*n).to_string(),
                DataType::Float64,
                false,
            )),
            LogicalExpr::LiteralString(s) => Ok(Field::new(s.as_str(), DataType::Utf8, false)),
            LogicalExpr::Alias { expr, alias } => {
                let inner = expr.field_in(schema)?;
                Ok(Field::new(alias.as_str(), inner.data_type().clone(), inner.is_nullable()))
            }
            LogicalExpr::Cast { expr, data_type } => {
                let inner = expr.field_in(schema)?;
                Ok(Field::new(inner.name(), data_type.clone(), inner.is_nullable()))
            }
            LogicalExpr::BinaryExpr { left, op, .. } => {
                let data_type = if op.is_arithmetic() {
                    left.field_in(schema)?.data_type().clone()
                } else {
                    DataType::Boolean
                };
                Ok(Field::new(op.name(), data_type, true))
            }
            LogicalExpr::ScalarFunction { func, .. } => {
                Ok(Field::new(func.name(), DataType::Float64, true))
            }
            LogicalExpr::Aggregate(agg) => agg.field_in(schema),
        }
    }

    fn binary(self, op: BinaryOperator, right: LogicalExpr) -> LogicalExpr {
        LogicalExpr::BinaryExpr {
            left: Box::new(self),
            op,
            right: Box::new(right),
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn eq(self, right: LogicalExpr) -> LogicalExpr {
        self.binary(BinaryOperator::Eq, right)
    }

    pub fn neq(self, right: LogicalExpr) -> LogicalExpr {
        self.binary(BinaryOperator::NotEq, right)
    }

    pub fn gt(self, right: LogicalExpr) -> LogicalExpr {
        self.binary(BinaryOperator::Gt, right)
    }

    pub fn gt_eq(self, right: LogicalExpr) -> LogicalExpr {
        self.binary(BinaryOperator::GtEq, right)
    }

    pub fn lt(self, right: LogicalExpr) -> LogicalExpr {
        self.binary(BinaryOperator::Lt, right)
    }

    pub fn lt_eq(self, right: LogicalExpr) -> LogicalExpr {
        self.binary(BinaryOperator::LtEq, right)
    }

    pub fn and(self, right: LogicalExpr) -> LogicalExpr {
        self.binary(BinaryOperator::And, right)
    }

    pub fn or(self, right: LogicalExpr) -> LogicalExpr {
        self.binary(BinaryOperator::Or, right)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn add(self, right: LogicalExpr) -> LogicalExpr {
        self.binary(BinaryOperator::Plus, right)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn sub(self, right: LogicalExpr) -> LogicalExpr {
        self.binary(BinaryOperator::Minus, right)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn mul(self, right: LogicalExpr) -> LogicalExpr {
        self.binary(BinaryOperator::Multiply, right)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn div(self, right: LogicalExpr) -> LogicalExpr {
        self.binary(BinaryOperator::Divide, right)
    }

    pub fn alias(self, alias: impl Into<String>) -> LogicalExpr {
        LogicalExpr::Alias {
            expr: Box::new(self),
            alias: alias.into(),
        }
    }
}

impl fmt::Display for LogicalExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicalExpr::Column(name) => write!(f, "#{name}"),
            LogicalExpr::ColumnIndex(i) => write!(f, "#{i}"),
            LogicalExpr::LiteralLong(n) => write!(f, "{n}"),
            LogicalExpr::LiteralDouble(n) => write!(f, "{}", ScalarValue::Float64(*n)),
            LogicalExpr::LiteralString(s) => write!(f, "'{s}'"),
            LogicalExpr::Alias { expr, alias } => write!(f, "{expr} as {alias}"),
            LogicalExpr::Cast { expr, data_type } => write!(f, "CAST({expr} AS {data_type:?})"),
            LogicalExpr::BinaryExpr { left, op, right } => write!(f, "{left} {op} {right}"),
            LogicalExpr::ScalarFunction { func, args } => {
                write!(f, "{}({})", func.name(), join(args))
            }
            LogicalExpr::Aggregate(agg) => write!(f, "{agg}"),
        }
    }
}

/// 이항 연산자
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    // 산술
    Plus,
    Minus,
    Multiply,
    Divide,
    // 비교
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    // 논리
    And,
    Or,
}

impl BinaryOperator {
    /// Operator for a parsed operator text (`<>` already folded to `!=`).
    pub fn from_sql(op: &str) -> Option<Self> {
        let op = match op.to_ascii_uppercase().as_str() {
            "+" => BinaryOperator::Plus,
            "-" => BinaryOperator::Minus,
            "*" => BinaryOperator::Multiply,
            "/" => BinaryOperator::Divide,
            "=" => BinaryOperator::Eq,
            "!=" | "<>" => BinaryOperator::NotEq,
            "<" => BinaryOperator::Lt,
            "<=" => BinaryOperator::LtEq,
            ">" => BinaryOperator::Gt,
            ">=" => BinaryOperator::GtEq,
            "AND" => BinaryOperator::And,
            "OR" => BinaryOperator::Or,
            _ => return None,
        };
        Some(op)
    }

    pub fn is_arithmetic(self) -> bool {
        matches!(
            self,
            BinaryOperator::Plus
                | BinaryOperator::Minus
                | BinaryOperator::Multiply
                | BinaryOperator::Divide
        )
    }

    pub fn is_boolean(self) -> bool {
        matches!(self, BinaryOperator::And | BinaryOperator::Or)
    }

    /// Field name given to the result column.
    pub fn name(self) -> &'static str {
        match self {
            BinaryOperator::Plus => "add",
            BinaryOperator::Minus => "subtract",
            BinaryOperator::Multiply => "multiply",
            BinaryOperator::Divide => "divide",
            BinaryOperator::Eq => "eq",
            BinaryOperator::NotEq => "neq",
            BinaryOperator::Lt => "lt",
            BinaryOperator::LtEq => "lteq",
            BinaryOperator::Gt => "gt",
            BinaryOperator::GtEq => "gteq",
            BinaryOperator::And => "and",
            BinaryOperator::Or => "or",
        }
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            BinaryOperator::Plus => "+",
            BinaryOperator::Minus => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::Eq => "=",
            BinaryOperator::NotEq => "!=",
            BinaryOperator::Lt => "<",
            BinaryOperator::LtEq => "<=",
            BinaryOperator::Gt => ">",
            BinaryOperator::GtEq => ">=",
            BinaryOperator::And => "AND",
            BinaryOperator::Or => "OR",
        };
        f.write_str(symbol)
    }
}

/// 집계 함수
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateFunction {
    Count,
    Sum,
    Avg,
    Min,
    Max,
}

impl AggregateFunction {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "COUNT" => Some(AggregateFunction::Count),
            "SUM" => Some(AggregateFunction::Sum),
            "AVG" => Some(AggregateFunction::Avg),
            "MIN" => Some(AggregateFunction::Min),
            "MAX" => Some(AggregateFunction::Max),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            AggregateFunction::Count => "COUNT",
            AggregateFunction::Sum => "SUM",
            AggregateFunction::Avg => "AVG",
            AggregateFunction::Min => "MIN",
            AggregateFunction::Max => "MAX",
        }
    }
}

/// 집계 표현식
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateExpr {
    pub function: AggregateFunction,
    pub expr: Box<LogicalExpr>,
    pub alias: Option<String>,
}

impl AggregateExpr {
    pub fn new(function: AggregateFunction, expr: LogicalExpr) -> Self {
        Self {
            function,
            expr: Box::new(expr),
            alias: None,
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn to_field(&self, input: &LogicalPlan) -> QuillResult<Field> {
        self.field_in(&*input.schema()?)
    }

    pub fn field_in(&self, schema: &Schema) -> QuillResult<Field> {
        let name = self.alias.as_deref().unwrap_or(self.function.name());
        let data_type = match self.function {
            AggregateFunction::Max | AggregateFunction::Min | AggregateFunction::Sum => {
                self.expr.field_in(schema)?.data_type().clone()
            }
            AggregateFunction::Count => DataType::Int32,
            AggregateFunction::Avg => DataType::Float64,
        };
        Ok(Field::new(name, data_type, true))
    }
}

impl fmt::Display for AggregateExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.function.name(), self.expr)?;
        if let Some(alias) = &self.alias {
            write!(f, " as {alias}")?;
        }
        Ok(())
    }
}

/// 스칼라 함수 (행별 처리)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarFunction {
    Sqrt,
    Ln,
}

impl ScalarFunction {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "SQRT" => Some(ScalarFunction::Sqrt),
            "LN" => Some(ScalarFunction::Ln),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ScalarFunction::Sqrt => "SQRT",
            ScalarFunction::Ln => "LN",
        }
    }
}

// ===== Physical Plan =====

/// 물리 플랜 — 실행 가능한 쿼리 플랜
#[derive(Debug, Clone, PartialEq)]
pub enum PhysicalPlan {
    /// 테이블 스캔
    Scan {
        source: Arc<dyn DataSource>,
        projection: Vec<String>,
        schema: SchemaRef,
    },
    /// 필터
    Selection {
        input: Box<PhysicalPlan>,
        predicate: PhysicalExpr,
    },
    /// Projection
    Projection {
        input: Box<PhysicalPlan>,
        schema: SchemaRef,
        exprs: Vec<PhysicalExpr>,
    },
    /// Hash Aggregate
    HashAggregate {
        input: Box<PhysicalPlan>,
        group_exprs: Vec<PhysicalExpr>,
        aggregate_exprs: Vec<PhysicalAggExpr>,
        schema: SchemaRef,
    },
}

impl PhysicalPlan {
    pub fn schema(&self) -> SchemaRef {
        match self {
            PhysicalPlan::Scan { schema, .. }
            | PhysicalPlan::Projection { schema, .. }
            | PhysicalPlan::HashAggregate { schema, .. } => SchemaRef::clone(schema),
            PhysicalPlan::Selection { input, .. } => input.schema(),
        }
    }

    pub fn children(&self) -> Vec<&PhysicalPlan> {
        match self {
            PhysicalPlan::Scan { .. } => vec![],
            PhysicalPlan::Selection { input, .. }
            | PhysicalPlan::Projection { input, .. }
            | PhysicalPlan::HashAggregate { input, .. } => vec![input.as_ref()],
        }
    }

    pub fn pretty(&self) -> String {
        let mut out = String::new();
        format_tree(self, PhysicalPlan::children, 0, &mut out);
        out
    }

    /// Build the operator tree and return its output as a lazy stream.
    pub fn execute(&self) -> QuillResult<BatchStream> {
        let operator = build_operator(self)?;
        Ok(Box::new(OperatorStream::new(operator)))
    }
}

impl fmt::Display for PhysicalPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhysicalPlan::Scan {
                projection, schema, ..
            } => write!(
                f,
                "ScanExec: schema={}, projection=[{}]",
                format_schema(schema),
                projection.join(", ")
            ),
            PhysicalPlan::Selection { predicate, .. } => write!(f, "SelectionExec: {predicate}"),
            PhysicalPlan::Projection { exprs, .. } => write!(f, "ProjectionExec: [{}]", join(exprs)),
            PhysicalPlan::HashAggregate {
                group_exprs,
                aggregate_exprs,
                ..
            } => write!(
                f,
                "HashAggregateExec: groupExpr=[{}], aggrExpr=[{}]",
                join(group_exprs),
                join(aggregate_exprs)
            ),
        }
    }
}

/// 물리 표현식 — 하나의 RecordBatch에 대해 하나의 컬럼으로 평가
#[derive(Debug, Clone, PartialEq)]
pub enum PhysicalExpr {
    Column(usize),
    Literal(ScalarValue),
    Cast {
        expr: Box<PhysicalExpr>,
        data_type: DataType,
    },
    BinaryOp {
        left: Box<PhysicalExpr>,
        op: BinaryOperator,
        right: Box<PhysicalExpr>,
    },
    /// 단항 수학 함수
    UnaryMath {
        func: ScalarFunction,
        expr: Box<PhysicalExpr>,
    },
}

impl fmt::Display for PhysicalExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhysicalExpr::Column(i) => write!(f, "#{i}"),
            PhysicalExpr::Literal(ScalarValue::Utf8(s)) => write!(f, "'{s}'"),
            PhysicalExpr::Literal(value) => write!(f, "{value}"),
            PhysicalExpr::Cast { expr, data_type } => write!(f, "CAST({expr} AS {data_type:?})"),
            PhysicalExpr::BinaryOp { left, op, right } => write!(f, "{left} {op} {right}"),
            PhysicalExpr::UnaryMath { func, expr } => write!(f, "{}({expr})", func.name()),
        }
    }
}

/// 물리 집계 표현식 — 그룹마다 새 accumulator를 만든다
#[derive(Debug, Clone, PartialEq)]
pub struct PhysicalAggExpr {
    pub function: AggregateFunction,
    pub input: PhysicalExpr,
}

impl fmt::Display for PhysicalAggExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.function.name(), self.input)
    }
}

fn join<T: fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(|item| item.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn format_tree<P: fmt::Display>(
    plan: &P,
    children: fn(&P) -> Vec<&P>,
    indent: usize,
    out: &mut String,
) {
    for _ in 0..indent {
        out.push('\t');
    }
    out.push_str(&plan.to_string());
    out.push('\n');
    for child in children(plan) {
        format_tree(child, children, indent + 1, out);
    }
}
