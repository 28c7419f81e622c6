//! ExecutionContext — 테이블 레지스트리와 SQL 실행 파이프라인
//!
//! ```text
//! SQL 문자열 → Lexer → Parser → AST → SqlPlanner → LogicalPlan
//!          → Optimizer → QueryPlanner → PhysicalPlan → BatchStream
//! ```

use crate::config::ExecutionConfig;
use crate::datasource::{BatchStream, CsvDataSource, DataSource, ParquetDataSource};
use crate::error::QuillResult;
use crate::sql::optimizer::QueryOptimizer;
use crate::sql::parser::SqlParser;
use crate::sql::planner::{DataFrame, LogicalPlan, QueryPlanner, SqlPlanner};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Host object for queries: owns the table registry and the settings used
/// by file-backed sources it creates.
pub struct ExecutionContext {
    tables: HashMap<String, DataFrame>,
    config: ExecutionConfig,
    parser: SqlParser,
    optimizer: QueryOptimizer,
}

impl ExecutionContext {
    /// Context with default settings.
    pub fn new() -> Self {
        Self::with_config(ExecutionConfig::default())
    }

    pub fn with_config(config: ExecutionConfig) -> Self {
        Self {
            tables: HashMap::new(),
            config,
            parser: SqlParser::new(),
            optimizer: QueryOptimizer::new(),
        }
    }

    /// Context configured from a `name → value` settings map
    /// (e.g. `quill.csv.batchSize`); `QUILL_*` environment variables win.
    pub fn from_settings(settings: &HashMap<String, String>) -> QuillResult<Self> {
        let config = ExecutionConfig::from_settings(settings)?.with_env_overrides()?;
        Ok(Self::with_config(config))
    }

    pub fn config(&self) -> &ExecutionConfig {
        &self.config
    }

    // ════════════════════════════════════════════
    // DataFrame constructors
    // ════════════════════════════════════════════

    /// DataFrame over a CSV file with a header row; types are inferred.
    pub fn csv(&self, path: impl AsRef<Path>) -> QuillResult<DataFrame> {
        let source = CsvDataSource::try_new(path.as_ref(), None, true, &self.config)?;
        Ok(scan(path.as_ref(), Arc::new(source)))
    }

    /// DataFrame over a Parquet file.
    pub fn parquet(&self, path: impl AsRef<Path>) -> QuillResult<DataFrame> {
        let source = ParquetDataSource::try_new(path.as_ref(), &self.config)?;
        Ok(scan(path.as_ref(), Arc::new(source)))
    }

    // ════════════════════════════════════════════
    // Table registry
    // ════════════════════════════════════════════

    /// Register a DataFrame under `name`, replacing any previous table.
    pub fn register(&mut self, name: impl Into<String>, df: DataFrame) {
        let name = name.into();
        info!(target: "quill::context", table = %name, "registered table");
        self.tables.insert(name, df);
    }

    pub fn register_data_source(&mut self, name: impl Into<String>, source: Arc<dyn DataSource>) {
        let name = name.into();
        let df = DataFrame::new(LogicalPlan::Scan {
            path: name.clone(),
            source,
            projection: vec![],
        });
        self.register(name, df);
    }

    pub fn register_csv(&mut self, name: impl Into<String>, path: impl AsRef<Path>) -> QuillResult<()> {
        let df = self.csv(path)?;
        self.register(name, df);
        Ok(())
    }

    pub fn register_parquet(
        &mut self,
        name: impl Into<String>,
        path: impl AsRef<Path>,
    ) -> QuillResult<()> {
        let df = self.parquet(path)?;
        self.register(name, df);
        Ok(())
    }

    pub fn table(&self, name: &str) -> Option<&DataFrame> {
        self.tables.get(name)
    }

    // ════════════════════════════════════════════
    // SQL Execution Pipeline
    // ════════════════════════════════════════════

    /// Parse and plan a SELECT statement against the registered tables.
    pub fn sql(&self, sql: &str) -> QuillResult<DataFrame> {
        let select = self.parser.parse(sql)?;
        SqlPlanner::new().plan(&select, &self.tables)
    }

    /// Optimize → PhysicalPlan → lazy batch stream.
    pub fn execute(&self, df: &DataFrame) -> QuillResult<BatchStream> {
        let optimized = self.optimizer.optimize(df.logical_plan().clone())?;
        debug!(target: "quill::context", plan = %optimized.pretty(), "optimized logical plan");
        let physical = QueryPlanner::new().create_physical_plan(&optimized)?;
        physical.execute()
    }
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self::new()
    }
}

fn scan(path: &Path, source: Arc<dyn DataSource>) -> DataFrame {
    DataFrame::new(LogicalPlan::Scan {
        path: path.display().to_string(),
        source,
        projection: vec![],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datasource::collect;
    use crate::error::QuillError;
    use crate::test_util::employee_source;
    use arrow::array::AsArray;
    use arrow::datatypes::Int64Type;

    fn context() -> ExecutionContext {
        let mut ctx = ExecutionContext::new();
        ctx.register_data_source("employee", employee_source());
        ctx
    }

    #[test]
    fn test_sql_end_to_end() {
        let ctx = context();
        let df = ctx
            .sql("SELECT id, first_name FROM employee WHERE state = 'CO'")
            .unwrap();
        let batches = collect(ctx.execute(&df).unwrap()).unwrap();
        let ids: Vec<i64> = batches
            .iter()
            .flat_map(|b| b.column(0).as_primitive::<Int64Type>().values().to_vec())
            .collect();
        assert_eq!(ids, vec![1, 2, 4]);
    }

    #[test]
    fn test_unknown_table() {
        let ctx = context();
        assert!(matches!(
            ctx.sql("SELECT a FROM missing"),
            Err(QuillError::TableNotFound(_))
        ));
    }

    #[test]
    fn test_register_replaces() {
        let mut ctx = context();
        let df = ctx.table("employee").unwrap().clone().filter(
            crate::sql::planner::col("id").eq(crate::sql::planner::lit_long(1)),
        );
        ctx.register("employee", df.clone());
        assert_eq!(ctx.table("employee"), Some(&df));
    }

    #[test]
    fn test_from_settings() {
        let mut settings = HashMap::new();
        settings.insert(crate::config::BATCH_SIZE_KEY.to_string(), "7".to_string());
        let ctx = ExecutionContext::from_settings(&settings).unwrap();
        assert_eq!(ctx.config().batch_size, 7);

        settings.insert(crate::config::BATCH_SIZE_KEY.to_string(), "zero".to_string());
        assert!(matches!(
            ExecutionContext::from_settings(&settings),
            Err(QuillError::Config(_))
        ));
    }
}
