//! Data-quality checks: every statement is an anomaly query, any row is a failure

use colored::Colorize;
use std::io::Write;

use crate::commands::config::PipelineConfig;
use crate::error::Result;
use crate::sql_engine::loader::load_sql;
use crate::sql_engine::statements::split_statements;
use crate::warehouse::{Row, Warehouse};

/// Result of one DQ statement
#[derive(Debug, Clone, PartialEq)]
pub struct CheckOutcome {
    pub name: String,
    /// Rows the anomaly query returned; empty means the check passed
    pub failing_rows: Vec<Row>,
}

impl CheckOutcome {
    pub fn passed(&self) -> bool {
        self.failing_rows.is_empty()
    }
}

/// Outcomes of a whole DQ run, in file order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DqSummary {
    pub outcomes: Vec<CheckOutcome>,
}

impl DqSummary {
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.passed()).count()
    }

    pub fn passed(&self) -> usize {
        self.total() - self.failed()
    }
}

/// Run every statement of the configured DQ file and report each result to `out`.
///
/// Failed checks never produce an error. Only loading, splitting, query and
/// output failures do, and those stop the run at the statement that hit them.
pub fn run_dq_checks<W: Warehouse + ?Sized>(
    warehouse: &W,
    config: &PipelineConfig,
    out: &mut dyn Write,
) -> Result<DqSummary> {
    writeln!(out, "Running data quality checks...")?;

    let sql = load_sql(&config.dq_file, &config.project_id)?;
    let statements = split_statements(&sql, config.statement_splitting)?;
    tracing::info!(
        file = %config.dq_file.display(),
        statements = statements.len(),
        "loaded data quality checks"
    );

    let mut summary = DqSummary::default();

    for statement in statements {
        writeln!(out, "Checking: {}", statement.name)?;
        let rows = warehouse.query(&statement.sql)?;

        if !rows.is_empty() {
            tracing::warn!(check = %statement.name, rows = rows.len(), "data quality check failed");
            writeln!(
                out,
                "{}",
                format!(
                    "Data Quality Check for '{}' failed for below data:",
                    statement.name
                )
                .red()
            )?;
            for row in &rows {
                writeln!(out, "{}", row)?;
            }
        }

        summary.outcomes.push(CheckOutcome {
            name: statement.name,
            failing_rows: rows,
        });
    }

    let line = format!(
        "Data Quality checks completed with {} out of {} checks passed.",
        summary.passed(),
        summary.total()
    );
    if summary.failed() == 0 {
        writeln!(out, "{}", line.green())?;
    } else {
        writeln!(out, "{}", line.yellow())?;
    }

    Ok(summary)
}
