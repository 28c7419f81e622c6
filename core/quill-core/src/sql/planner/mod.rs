//! SQL 플래너 모듈
//!
//! LogicalPlan을 만들고(DataFrame, SqlPlanner) PhysicalPlan으로 변환합니다(QueryPlanner).

pub mod dataframe;
pub mod logical;
pub mod physical;
pub mod types;

#[cfg(test)]
mod tests;

// Re-export main types
pub use dataframe::*;
pub use logical::SqlPlanner;
pub use physical::QueryPlanner;
pub use types::*;
