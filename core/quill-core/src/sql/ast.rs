//! SQL syntax tree produced by the parser and consumed by the SQL planner.

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum SqlExpr {
    /// Table or column name.
    Identifier(String),
    BinaryExpr {
        left: Box<SqlExpr>,
        op: String,
        right: Box<SqlExpr>,
    },
    Str(String),
    Long(i64),
    Double(f64),
    Function {
        name: String,
        args: Vec<SqlExpr>,
    },
    Alias {
        expr: Box<SqlExpr>,
        alias: String,
    },
    Cast {
        expr: Box<SqlExpr>,
        data_type: String,
    },
    Sort {
        expr: Box<SqlExpr>,
        asc: bool,
    },
    Select(Box<SqlSelect>),
}

/// `SELECT <projection> FROM <table> [WHERE] [GROUP BY] [HAVING] [ORDER BY]`
#[derive(Debug, Clone, PartialEq)]
pub struct SqlSelect {
    pub projection: Vec<SqlExpr>,
    pub selection: Option<SqlExpr>,
    pub group_by: Vec<SqlExpr>,
    /// Every item is a `SqlExpr::Sort`.
    pub order_by: Vec<SqlExpr>,
    pub having: Option<SqlExpr>,
    pub table_name: String,
}

impl fmt::Display for SqlExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlExpr::Identifier(id) => write!(f, "{id}"),
            SqlExpr::BinaryExpr { left, op, right } => write!(f, "{left} {op} {right}"),
            SqlExpr::Str(s) => write!(f, "'{s}'"),
            SqlExpr::Long(n) => write!(f, "{n}"),
            SqlExpr::Double(n) => write!(f, "{n:?}"),
            SqlExpr::Function { name, args } => {
                let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
                write!(f, "{name}({})", args.join(", "))
            }
            SqlExpr::Alias { expr, alias } => write!(f, "{expr} AS {alias}"),
            SqlExpr::Cast { expr, data_type } => write!(f, "CAST({expr} AS {data_type})"),
            SqlExpr::Sort { expr, asc } => {
                write!(f, "{expr} {}", if *asc { "ASC" } else { "DESC" })
            }
            SqlExpr::Select(select) => write!(f, "{select}"),
        }
    }
}

impl fmt::Display for SqlSelect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let list = |items: &[SqlExpr]| {
            items
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        };
        write!(f, "SELECT {} FROM {}", list(&self.projection), self.table_name)?;
        if let Some(selection) = &self.selection {
            write!(f, " WHERE {selection}")?;
        }
        if !self.group_by.is_empty() {
            write!(f, " GROUP BY {}", list(&self.group_by))?;
        }
        if let Some(having) = &self.having {
            write!(f, " HAVING {having}")?;
        }
        if !self.order_by.is_empty() {
            write!(f, " ORDER BY {}", list(&self.order_by))?;
        }
        Ok(())
    }
}
