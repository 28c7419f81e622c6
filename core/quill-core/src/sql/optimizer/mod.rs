//! SQL 쿼리 옵티마이저 — 규칙 기반 최적화
//!
//! LogicalPlan을 재작성하여 스캔이 읽는 컬럼을 줄입니다.
//! 현재 규칙: ProjectionPushdown

mod projection_pushdown;


use crate::error::QuillResult;
use crate::sql::planner::LogicalPlan;
use tracing::trace;

pub use projection_pushdown::ProjectionPushdownRule;

/// 최적화 규칙 트레이트
pub trait OptimizationRule: Send + Sync {
    /// 규칙 이름
    fn name(&self) -> &str;

    /// LogicalPlan에 규칙 적용
    fn apply(&self, plan: LogicalPlan) -> QuillResult<LogicalPlan>;
}

/// 쿼리 옵티마이저
pub struct QueryOptimizer {
    rules: Vec<Box<dyn OptimizationRule>>,
}

impl QueryOptimizer {
    /// 기본 최적화 규칙으로 생성
    pub fn new() -> Self {
        Self {
            rules: vec![Box::new(ProjectionPushdownRule)],
        }
    }

    /// 모든 규칙 적용
    pub fn optimize(&self, plan: LogicalPlan) -> QuillResult<LogicalPlan> {
        let mut optimized = plan;
        for rule in &self.rules {
            optimized = rule.apply(optimized)?;
            trace!(target: "quill::optimizer", rule = rule.name(), "rule applied");
        }
        Ok(optimized)
    }
}

impl Default for QueryOptimizer {
    fn default() -> Self {
        Self::new()
    }
}
