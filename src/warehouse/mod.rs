//! Warehouse access: the query seam used by every pipeline phase

pub mod auth;
pub mod bigquery;

use std::fmt;
use std::time::Instant;

use serde_json::Value;

use crate::error::Result;

pub use bigquery::BigQueryClient;

/// One result row, columns kept in the order the warehouse returned them
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    pub columns: Vec<(String, Value)>,
}

impl Row {
    pub fn new(columns: Vec<(String, Value)>) -> Self {
        Self { columns }
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }
}

impl<S: Into<String>> FromIterator<(S, Value)> for Row {
    fn from_iter<I: IntoIterator<Item = (S, Value)>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Rendered as a mapping: `{'client_id': 42, 'fee': 'abc'}`
impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (name, value)) in self.columns.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "'{}': {}", name, DisplayValue(value))?;
        }
        write!(f, "}}")
    }
}

struct DisplayValue<'a>(&'a Value);

impl fmt::Display for DisplayValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Value::Null => write!(f, "None"),
            Value::Bool(true) => write!(f, "True"),
            Value::Bool(false) => write!(f, "False"),
            Value::String(s) => write!(f, "'{}'", s),
            Value::Number(n) => write!(f, "{}", n),
            Value::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", DisplayValue(item))?;
                }
                write!(f, "]")
            }
            Value::Object(fields) => {
                write!(f, "{{")?;
                for (i, (name, item)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "'{}': {}", name, DisplayValue(item))?;
                }
                write!(f, "}}")
            }
        }
    }
}

/// Fully materialized rows of a finished query
pub type QueryResult = Vec<Row>;

/// Something that can run SQL and block until the job is finished.
///
/// Implementations must not retry; the first error is returned as-is.
pub trait Warehouse {
    /// Run one statement and return every row it produced
    fn query(&self, sql: &str) -> Result<QueryResult>;
}

/// Execute a transformation statement, discarding any rows it returns
pub fn run_query<W: Warehouse + ?Sized>(warehouse: &W, sql: &str) -> Result<()> {
    let start_time = Instant::now();
    let rows = warehouse.query(sql)?;
    tracing::info!(
        rows = rows.len(),
        elapsed = ?start_time.elapsed(),
        "statement finished"
    );
    Ok(())
}
