use super::*;
use crate::error::{QuillError, QuillResult};
use crate::sql::SqlParser;
use crate::test_util::{employee_df, employee_scan};
use arrow::datatypes::DataType;
use std::collections::HashMap;

fn field_names(df: &DataFrame) -> Vec<String> {
    df.schema()
        .unwrap()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect()
}

fn tables() -> HashMap<String, DataFrame> {
    let mut tables = HashMap::new();
    tables.insert("employee".to_string(), employee_df());
    tables
}

fn plan_sql(sql: &str) -> QuillResult<DataFrame> {
    let select = SqlParser::new().parse(sql)?;
    SqlPlanner::new().plan(&select, &tables())
}

// ── Logical plan & DataFrame ──

#[test]
fn test_pretty_print_employee_query() {
    let df = employee_df()
        .filter(col("state").eq(lit_str("CO")))
        .project(vec![col("id"), col("first_name"), col("last_name")]);
    assert_eq!(
        df.logical_plan().pretty(),
        "Projection: #id, #first_name, #last_name\n\
         \tSelection: #state = 'CO'\n\
         \t\tScan: employee; projection=None\n"
    );
}

#[test]
fn test_scan_with_projection_display() {
    let plan = LogicalPlan::Scan {
        path: "employee".to_string(),
        source: crate::test_util::employee_source(),
        projection: vec!["id".to_string(), "state".to_string()],
    };
    assert_eq!(plan.to_string(), "Scan: employee; projection=[id, state]");
    let names: Vec<String> = plan
        .schema()
        .unwrap()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    assert_eq!(names, vec!["id", "state"]);
}

#[test]
fn test_scan_projection_unknown_column() {
    let plan = LogicalPlan::Scan {
        path: "employee".to_string(),
        source: crate::test_util::employee_source(),
        projection: vec!["bonus".to_string()],
    };
    assert!(matches!(plan.schema(), Err(QuillError::Schema(_))));
}

#[test]
fn test_aggregate_display() {
    let df = employee_df().aggregate(
        vec![col("state")],
        vec![max(cast(col("salary"), DataType::Int32))],
    );
    assert_eq!(
        df.logical_plan().to_string(),
        "Aggregate: groupExpr=[#state], aggregateExpr=[MAX(CAST(#salary AS Int32))]"
    );
}

#[test]
fn test_projection_schema_follows_exprs() {
    let df = employee_df().project(vec![
        col("id"),
        col("salary").mul(lit_long(2)).alias("double_salary"),
        lit_str("x"),
        lit_double(1.5),
        col("salary").gt(lit_long(10000)),
        sqrt(cast(col("salary"), DataType::Float64)),
    ]);
    assert_eq!(
        field_names(&df),
        vec!["id", "double_salary", "x", "1.5", "gt", "SQRT"]
    );
    let schema = df.schema().unwrap();
    assert_eq!(schema.field(1).data_type(), &DataType::Int64);
    assert_eq!(schema.field(3).data_type(), &DataType::Float64);
    assert_eq!(schema.field(4).data_type(), &DataType::Boolean);
    assert_eq!(schema.field(5).data_type(), &DataType::Float64);
}

#[test]
fn test_aggregate_schema_group_then_aggregates() {
    let df = employee_df().aggregate(
        vec![col("state")],
        vec![
            min(col("salary")),
            max(col("salary")).with_alias("top"),
            count(col("id")),
            avg(col("salary")),
        ],
    );
    assert_eq!(field_names(&df), vec!["state", "MIN", "top", "COUNT", "AVG"]);
    let schema = df.schema().unwrap();
    assert_eq!(schema.field(1).data_type(), &DataType::Int64);
    assert_eq!(schema.field(3).data_type(), &DataType::Int32);
    assert_eq!(schema.field(4).data_type(), &DataType::Float64);
}

#[test]
fn test_column_index_resolves_by_position() {
    let df = employee_df().project(vec![col_index(3)]);
    assert_eq!(field_names(&df), vec!["state"]);
    assert_eq!(df.logical_plan().to_string(), "Projection: #3");
}

#[test]
fn test_unknown_column_in_schema() {
    let df = employee_df().project(vec![col("bonus")]);
    let err = df.schema().unwrap_err();
    assert!(matches!(err, QuillError::Schema(msg) if msg.contains("bonus")));
}

#[test]
fn test_expression_display() {
    assert_eq!(col("a").alias("b").to_string(), "#a as b");
    assert_eq!(lit_double(2.0).to_string(), "2.0");
    assert_eq!(
        col("a").add(lit_long(1)).lt_eq(col("b")).to_string(),
        "#a + 1 <= #b"
    );
    assert_eq!(ln(col("x")).to_string(), "LN(#x)");
}

#[test]
fn test_children() {
    let df = employee_df().filter(col("id").eq(lit_long(1)));
    let plan = df.logical_plan();
    assert_eq!(plan.children().len(), 1);
    assert!(plan.children()[0].children().is_empty());
}

// ── SQL planner ──

#[test]
fn test_sql_planner_employee_query() {
    let df = plan_sql("SELECT id, first_name, last_name FROM employee WHERE state = 'CO'").unwrap();
    assert_eq!(
        df.logical_plan().pretty(),
        "Projection: #id, #first_name, #last_name\n\
         \tSelection: #state = 'CO'\n\
         \t\tScan: employee; projection=None\n"
    );
}

#[test]
fn test_sql_planner_group_by() {
    let df = plan_sql("SELECT MAX(salary), min(salary) AS low FROM employee GROUP BY state").unwrap();
    assert_eq!(
        df.logical_plan().to_string(),
        "Aggregate: groupExpr=[#state], aggregateExpr=[MAX(#salary), MIN(#salary) as low]"
    );
    assert_eq!(field_names(&df), vec!["state", "MAX", "low"]);
}

#[test]
fn test_sql_planner_cast_types() {
    let df = plan_sql("SELECT CAST(salary AS double), CAST(id AS varchar) FROM employee").unwrap();
    let schema = df.schema().unwrap();
    assert_eq!(schema.field(0).data_type(), &DataType::Float64);
    assert_eq!(schema.field(1).data_type(), &DataType::Utf8);
}

#[test]
fn test_sql_planner_unknown_cast_type() {
    let err = plan_sql("SELECT CAST(id AS decimal) FROM employee").unwrap_err();
    assert!(matches!(err, QuillError::SqlNotSupported { .. }));
}

#[test]
fn test_sql_planner_unknown_table() {
    let err = plan_sql("SELECT a FROM nowhere").unwrap_err();
    assert!(matches!(err, QuillError::TableNotFound(t) if t == "nowhere"));
}

#[test]
fn test_sql_planner_group_by_requires_aggregates() {
    let err = plan_sql("SELECT state, MAX(salary) FROM employee GROUP BY state").unwrap_err();
    assert!(matches!(err, QuillError::SqlNotSupported { .. }));
}

#[test]
fn test_sql_planner_unknown_function() {
    let err = plan_sql("SELECT MEDIAN(salary) FROM employee").unwrap_err();
    assert!(matches!(err, QuillError::SqlNotSupported { feature, .. } if feature.contains("MEDIAN")));
}

#[test]
fn test_sql_planner_ignores_order_by_and_having() {
    let df = plan_sql(
        "SELECT MAX(salary) FROM employee GROUP BY state HAVING state = 'CO' ORDER BY state",
    )
    .unwrap();
    assert!(matches!(df.logical_plan(), LogicalPlan::Aggregate { .. }));
}

// ── Query planner ──

#[test]
fn test_query_planner_pretty() {
    let df = employee_df()
        .filter(col("state").eq(lit_str("CO")))
        .project(vec![col("id"), col("salary").alias("pay")]);
    let plan = QueryPlanner::new()
        .create_physical_plan(df.logical_plan())
        .unwrap();
    assert_eq!(
        plan.pretty(),
        "ProjectionExec: [#0, #4]\n\
         \tSelectionExec: #3 = 'CO'\n\
         \t\tScanExec: schema=[id: Int64, first_name: Utf8, last_name: Utf8, state: Utf8, salary: Int64], projection=[]\n"
    );
    assert_eq!(plan.schema().field(1).name(), "pay");
}

#[test]
fn test_query_planner_aggregate() {
    let df = employee_df().aggregate(vec![col("state")], vec![sum(col("salary"))]);
    let plan = QueryPlanner::new()
        .create_physical_plan(df.logical_plan())
        .unwrap();
    assert_eq!(
        plan.to_string(),
        "HashAggregateExec: groupExpr=[#3], aggrExpr=[SUM(#4)]"
    );
}

#[test]
fn test_query_planner_rejects_count() {
    let df = employee_df().aggregate(vec![col("state")], vec![count(col("id"))]);
    let err = QueryPlanner::new()
        .create_physical_plan(df.logical_plan())
        .unwrap_err();
    assert!(matches!(err, QuillError::Unsupported(msg) if msg.contains("COUNT(#id)")));
}

#[test]
fn test_query_planner_missing_column() {
    let plan = LogicalPlan::Selection {
        input: Box::new(employee_scan()),
        expr: col("bonus").gt(lit_long(1)),
    };
    let err = QueryPlanner::new().create_physical_plan(&plan).unwrap_err();
    assert!(matches!(err, QuillError::Schema(msg) if msg.contains("no column named 'bonus'")));
}

#[test]
fn test_query_planner_rejects_stray_aggregate() {
    let df = employee_df().project(vec![LogicalExpr::Aggregate(max(col("salary")))]);
    let err = QueryPlanner::new()
        .create_physical_plan(df.logical_plan())
        .unwrap_err();
    assert!(matches!(err, QuillError::Unsupported(_)));
}

#[test]
fn test_query_planner_rejects_unsupported_cast_target() {
    let df = employee_df().project(vec![cast(col("id"), DataType::Date32)]);
    let err = QueryPlanner::new()
        .create_physical_plan(df.logical_plan())
        .unwrap_err();
    assert!(matches!(err, QuillError::Unsupported(msg) if msg.contains("Date32")));
}

#[test]
fn test_physical_schema_matches_logical_schema() {
    let df = employee_df()
        .filter(col("salary").gt(lit_long(1000)))
        .aggregate(
            vec![col("state")],
            vec![max(col("salary")), sum(col("salary")).with_alias("total")],
        )
        .project(vec![
            col("state"),
            col_index(2).alias("payroll"),
            cast(col("MAX"), DataType::Float64).mul(lit_double(1.5)),
        ]);
    let plan = QueryPlanner::new()
        .create_physical_plan(df.logical_plan())
        .unwrap();
    assert_eq!(plan.schema(), df.schema().unwrap());
    let input = plan.children()[0];
    assert_eq!(input.schema().fields().len(), 3);
    assert_eq!(input.schema().field(2).name(), "total");
}

#[test]
fn test_field_in_matches_to_field() {
    let df = employee_df();
    let plan = df.logical_plan();
    let schema = plan.schema().unwrap();
    for expr in [
        col("first_name"),
        col_index(4).add(lit_long(1)),
        col("salary").gt_eq(lit_long(0)).alias("paid"),
    ] {
        assert_eq!(expr.field_in(&schema).unwrap(), expr.to_field(plan).unwrap());
    }
    let agg = min(col("salary"));
    assert_eq!(agg.field_in(&schema).unwrap(), agg.to_field(plan).unwrap());
}
