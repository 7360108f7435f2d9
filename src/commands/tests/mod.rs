//! Tests for the DQ runner and the pipeline driver against a scripted warehouse


use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::json;

use crate::commands::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::warehouse::{QueryResult, Row, Warehouse};

/// Warehouse double: records every statement, answers through a closure
pub struct ScriptedWarehouse {
    pub executed: RefCell<Vec<String>>,
    handler: Box<dyn Fn(&str) -> Result<QueryResult>>,
}

impl ScriptedWarehouse {
    pub fn new(handler: impl Fn(&str) -> Result<QueryResult> + 'static) -> Self {
        Self {
            executed: RefCell::new(Vec::new()),
            handler: Box::new(handler),
        }
    }

    /// Every statement succeeds with no rows
    pub fn empty() -> Self {
        Self::new(|_| Ok(Vec::new()))
    }

    pub fn executed(&self) -> Vec<String> {
        self.executed.borrow().clone()
    }
}

impl Warehouse for ScriptedWarehouse {
    fn query(&self, sql: &str) -> Result<QueryResult> {
        self.executed.borrow_mut().push(sql.to_string());
        (self.handler)(sql)
    }
}

pub fn row(id: i64) -> Row {
    vec![("client_id", json!(id)), ("fee", json!("negative"))]
        .into_iter()
        .collect()
}

pub fn query_error() -> PipelineError {
    PipelineError::query("Not found: Table acme:bronze.fees_raw", "notFound")
}

pub fn write_sql(dir: &Path, name: &str, sql: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, sql).unwrap();
    path
}

pub fn config_for(dir: &Path, transformations: Vec<PathBuf>, dq_sql: &str) -> PipelineConfig {
    PipelineConfig {
        project_id: "acme".to_string(),
        transformations,
        dq_file: write_sql(dir, "dq/checks.sql", dq_sql),
        ..PipelineConfig::default()
    }
}

pub fn output_text(out: Vec<u8>) -> String {
    String::from_utf8(out).unwrap()
}
