//! # Quill — Embedded SQL Query Engine
//!
//! Quill은 Apache Arrow 컬럼 배치 위에서 동작하는 임베디드 SQL 쿼리 엔진입니다.
//! SQL 문자열이나 DataFrame 빌더로 논리 플랜을 만들고, 규칙 기반 최적화 후
//! Pull 방식의 물리 연산자로 실행합니다.
//!
//! ## 주요 특징
//!
//! - **SQL 지원**: SELECT, WHERE, GROUP BY, CAST, MAX/MIN/SUM, SQRT/LN
//! - **DataFrame API**: `project` / `filter` / `aggregate` 체이닝
//! - **데이터 소스**: 인메모리 배치, CSV, Parquet
//! - **Projection Pushdown**: 필요한 컬럼만 스캔
//! - **엄격한 타입**: 암묵적 숫자 확장 없음
//!
//! ## 빠른 시작
//!
//! ```rust
//! use std::sync::Arc;
//! use arrow::array::{Int64Array, RecordBatch, StringArray};
//! use arrow::datatypes::{DataType, Field, Schema};
//! use quill_core::ExecutionContext;
//! use quill_core::datasource::{MemoryDataSource, collect};
//!
//! # fn main() -> quill_core::QuillResult<()> {
//! let schema = Arc::new(Schema::new(vec![
//!     Field::new("state", DataType::Utf8, false),
//!     Field::new("salary", DataType::Int64, false),
//! ]));
//! let batch = RecordBatch::try_new(
//!     schema.clone(),
//!     vec![
//!         Arc::new(StringArray::from(vec!["CO", "CA", "CO"])),
//!         Arc::new(Int64Array::from(vec![10, 20, 30])),
//!     ],
//! )?;
//!
//! let mut ctx = ExecutionContext::new();
//! ctx.register_data_source("employee", Arc::new(MemoryDataSource::try_new(schema, vec![batch])?));
//!
//! let df = ctx.sql("SELECT MAX(salary) FROM employee GROUP BY state")?;
//! let batches = collect(ctx.execute(&df)?)?;
//! assert_eq!(batches[0].num_rows(), 2);
//! # Ok(())
//! # }
//! ```
//!
//! ## SQL 실행 파이프라인
//!
//! ```text
//! SQL 문자열 → Lexer → Parser → AST → SqlPlanner → LogicalPlan
//!          → Optimizer → QueryPlanner → PhysicalPlan → RecordBatch
//! ```
//!
//! ## 모듈 구조
//!
//! - [`context`] — 실행 컨텍스트 ([`ExecutionContext`])
//! - [`sql`] — SQL 렉서, 파서, 플래너, 최적화기, 실행기
//! - [`datasource`] — 데이터 소스 (Memory, CSV, Parquet)
//! - [`datatypes`] — 스칼라 값, 컬럼 벡터, 스키마 헬퍼

pub mod config;
pub mod context;
pub mod datasource;
pub mod datatypes;
pub mod error;
pub mod sql;

// Logging utilities
pub mod logging;

#[cfg(test)]
pub(crate) mod test_util;

// Re-export commonly used types
pub use config::ExecutionConfig;
pub use context::ExecutionContext;
pub use error::{QuillError, QuillResult};
pub use sql::planner::{DataFrame, LogicalExpr, LogicalPlan, PhysicalPlan};
