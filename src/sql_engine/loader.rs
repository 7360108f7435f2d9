//! Reads SQL scripts from disk and fills in the project placeholder

use std::fs;
use std::path::Path;

use crate::error::{PipelineError, Result};

/// Literal token replaced with the active project identifier
pub const PROJECT_ID_PLACEHOLDER: &str = "{{ project_id }}";

/// Read a SQL file and substitute every placeholder with `project_id`.
///
/// There is no escaping of the substituted value; a malformed identifier
/// only fails once the warehouse sees the statement.
pub fn load_sql(path: &Path, project_id: &str) -> Result<String> {
    let sql = fs::read_to_string(path).map_err(|e| PipelineError::io(path, e))?;
    tracing::debug!(path = %path.display(), bytes = sql.len(), "loaded SQL file");
    Ok(substitute_project_id(&sql, project_id))
}

/// Replace every occurrence of the placeholder token in `sql`
pub fn substitute_project_id(sql: &str, project_id: &str) -> String {
    sql.replace(PROJECT_ID_PLACEHOLDER, project_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_substitutes_every_occurrence() {
        let sql = "INSERT INTO {{ project_id }}.silver.fees SELECT * FROM {{ project_id }}.bronze.fees";
        assert_eq!(
            substitute_project_id(sql, "acme"),
            "INSERT INTO acme.silver.fees SELECT * FROM acme.bronze.fees"
        );
    }

    #[test]
    fn test_text_without_token_is_unchanged() {
        let sql = "SELECT {{project_id}} FROM t";
        assert_eq!(substitute_project_id(sql, "acme"), sql);
    }

    #[test]
    fn test_load_sql_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "SELECT * FROM {{{{ project_id }}}}.ds.t").unwrap();

        let sql = load_sql(file.path(), "acme").unwrap();
        assert_eq!(sql, "SELECT * FROM acme.ds.t");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.sql");

        match load_sql(&missing, "acme") {
            Err(PipelineError::Io { path, .. }) => assert_eq!(path, missing),
            other => panic!("expected Io error, got {:?}", other),
        }
    }
}
