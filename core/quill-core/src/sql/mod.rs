// SQL 모듈 진입점
pub mod ast;
pub mod executor;
pub mod lexer;
pub mod optimizer;
pub mod parser;
pub mod planner;
pub mod pratt;
pub mod token;

pub use ast::{SqlExpr, SqlSelect};
pub use executor::{
    HashAggregateOperator, PhysicalOperator, ProjectionOperator, ScanOperator, SelectionOperator,
    evaluate_expr,
};
pub use lexer::{Lexer, tokenize};
pub use optimizer::{OptimizationRule, ProjectionPushdownRule, QueryOptimizer};
pub use parser::SqlParser;
pub use planner::{
    AggregateExpr, AggregateFunction, BinaryOperator, DataFrame, LogicalExpr, LogicalPlan,
    PhysicalAggExpr, PhysicalExpr, PhysicalPlan, QueryPlanner, ScalarFunction, SqlPlanner,
};
pub use pratt::PrattParser;
pub use token::{Keyword, Symbol, Token, TokenKind};
