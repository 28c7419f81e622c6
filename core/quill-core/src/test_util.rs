//! Shared fixtures for unit tests.

use crate::datasource::{DataSource, MemoryDataSource};
use crate::sql::planner::{DataFrame, LogicalPlan};
use arrow::array::{ArrayRef, Int64Array, RecordBatch, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use std::sync::Arc;

pub fn employee_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("id", DataType::Int64, false),
        Field::new("first_name", DataType::Utf8, false),
        Field::new("last_name", DataType::Utf8, false),
        Field::new("state", DataType::Utf8, false),
        Field::new("salary", DataType::Int64, true),
    ]))
}

/// Four employees, three in CO.
pub fn employee_source() -> Arc<dyn DataSource> {
    let schema = employee_schema();
    let columns: Vec<ArrayRef> = vec![
        Arc::new(Int64Array::from(vec![1, 2, 3, 4])),
        Arc::new(StringArray::from(vec!["Bill", "Gregg", "John", "Von"])),
        Arc::new(StringArray::from(vec!["Hopkins", "Langford", "Travis", "Mill"])),
        Arc::new(StringArray::from(vec!["CO", "CO", "CA", "CO"])),
        Arc::new(Int64Array::from(vec![Some(12000), Some(10000), Some(11500), None])),
    ];
    let batch = RecordBatch::try_new(Arc::clone(&schema), columns).unwrap();
    Arc::new(MemoryDataSource::try_new(schema, vec![batch]).unwrap())
}

pub fn employee_scan() -> LogicalPlan {
    LogicalPlan::Scan {
        path: "employee".to_string(),
        source: employee_source(),
        projection: vec![],
    }
}

pub fn employee_df() -> DataFrame {
    DataFrame::new(employee_scan())
}
