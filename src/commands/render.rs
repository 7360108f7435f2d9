//! Preview of the SQL the pipeline would submit, without touching the warehouse

use colored::Colorize;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::commands::config::PipelineConfig;
use crate::error::Result;
use crate::sql_engine::loader::load_sql;
use crate::sql_engine::statements::split_statements;

/// Print each file after placeholder substitution.
///
/// With no explicit files every configured script is rendered. The DQ file is
/// also shown split into its named checks.
pub fn render_command(
    config: &PipelineConfig,
    files: &[PathBuf],
    out: &mut dyn Write,
) -> Result<()> {
    let files: Vec<&Path> = if files.is_empty() {
        config
            .transformations
            .iter()
            .chain(std::iter::once(&config.dq_file))
            .map(PathBuf::as_path)
            .collect()
    } else {
        files.iter().map(PathBuf::as_path).collect()
    };

    for file in files {
        let sql = load_sql(file, &config.project_id)?;
        writeln!(out, "{}", format!("-- {}", file.display()).bold())?;

        if file == config.dq_file {
            let statements = split_statements(&sql, config.statement_splitting)?;
            for (i, statement) in statements.iter().enumerate() {
                writeln!(out, "{}", format!("-- check {}: {}", i + 1, statement.name).cyan())?;
                writeln!(out, "{};", statement.sql)?;
            }
        } else {
            writeln!(out, "{}", sql.trim_end())?;
        }
        writeln!(out)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_render_substitutes_and_names_checks() {
        colored::control::set_override(false);
        let dir = tempfile::tempdir().unwrap();
        let transform = dir.path().join("load.sql");
        let dq = dir.path().join("dq.sql");
        fs::write(&transform, "CREATE TABLE {{ project_id }}.ds.t AS SELECT 1\n").unwrap();
        fs::write(&dq, "-- no nulls\nSELECT 1 FROM {{ project_id }}.ds.t WHERE x IS NULL;").unwrap();

        let config = PipelineConfig {
            project_id: "acme".to_string(),
            transformations: vec![transform.clone()],
            dq_file: dq.clone(),
            ..PipelineConfig::default()
        };

        let mut out = Vec::new();
        render_command(&config, &[], &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("CREATE TABLE acme.ds.t AS SELECT 1"));
        assert!(text.contains("-- check 1: no nulls"));
        assert!(text.contains("SELECT 1 FROM acme.ds.t WHERE x IS NULL;"));
        assert!(!text.contains("{{ project_id }}"));
    }

    #[test]
    fn test_render_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let config = PipelineConfig::default();
        let result = render_command(&config, &[dir.path().join("missing.sql")], &mut Vec::new());
        assert!(result.is_err());
    }
}
