//! Physical Operators Module

mod hash_aggregate;
mod physical_operator;
mod projection;
mod selection;
mod table_scan;

pub use hash_aggregate::HashAggregateOperator;
pub use physical_operator::PhysicalOperator;
pub use projection::ProjectionOperator;
pub use selection::SelectionOperator;
pub use table_scan::ScanOperator;
