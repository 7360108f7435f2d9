//! The fixed pipeline: transformation scripts in order, then the DQ checks

use colored::Colorize;
use std::io::Write;
use std::time::Instant;

use crate::commands::check::{run_dq_checks, DqSummary};
use crate::commands::config::PipelineConfig;
use crate::error::Result;
use crate::sql_engine::loader::load_sql;
use crate::warehouse::{run_query, Warehouse};

/// Run every transformation file, then the DQ checks.
///
/// The first error stops the run: later files and the DQ phase are skipped and
/// the completion line is never written. Failed DQ checks do not count as errors.
pub fn run_pipeline<W: Warehouse + ?Sized>(
    warehouse: &W,
    config: &PipelineConfig,
    out: &mut dyn Write,
) -> Result<DqSummary> {
    let start_time = Instant::now();
    writeln!(out, "Starting pipeline...")?;

    for file in &config.transformations {
        writeln!(out, "Running {}", file.display())?;
        let sql = load_sql(file, &config.project_id)?;
        run_query(warehouse, &sql)?;
    }

    let summary = run_dq_checks(warehouse, config, out)?;

    writeln!(out, "{}", "Pipeline completed successfully".green())?;
    tracing::info!(
        transformations = config.transformations.len(),
        checks_failed = summary.failed(),
        elapsed = ?start_time.elapsed(),
        "pipeline finished"
    );

    Ok(summary)
}
