//! Loading and splitting working together on realistic DQ scripts

use pretty_assertions::assert_eq;
use std::fs;

use crate::sql_engine::loader::load_sql;
use crate::sql_engine::statements::{split_statements, SplitMode};

const DQ_SCRIPT: &str = r#"
-- Client LTV must never be negative
SELECT client_id, ltv
FROM `{{ project_id }}.gold.client_ltv`
WHERE ltv < 0;

-- Duplicate fee rows in silver
SELECT fee_id, COUNT(*) AS copies
FROM `{{ project_id }}.silver.fees_clean`
GROUP BY fee_id
HAVING COUNT(*) > 1;

-- Advisers without clients
SELECT a.adviser_id
FROM `{{ project_id }}.gold.adviser_ltv` a
WHERE a.client_count = 0;
"#;

#[test]
fn test_dq_script_loads_and_splits() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data_quality_checks.sql");
    fs::write(&path, DQ_SCRIPT).unwrap();

    let sql = load_sql(&path, "pocs19").unwrap();
    let statements = split_statements(&sql, SplitMode::Naive).unwrap();

    let names: Vec<&str> = statements.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "Client LTV must never be negative",
            "Duplicate fee rows in silver",
            "Advisers without clients",
        ]
    );
    assert!(statements[0].sql.contains("`pocs19.gold.client_ltv`"));
    assert!(statements.iter().all(|s| !s.sql.ends_with(';')));
}

#[test]
fn test_both_modes_agree_on_plain_dq_script() {
    let sql = DQ_SCRIPT.replace("{{ project_id }}", "pocs19");
    assert_eq!(
        split_statements(&sql, SplitMode::Naive).unwrap(),
        split_statements(&sql, SplitMode::SqlAware).unwrap()
    );
}

#[test]
fn test_unterminated_literal_fails_sql_aware_split() {
    let result = split_statements("SELECT 'oops; SELECT 1", SplitMode::SqlAware);
    assert!(result.is_err());
    assert_eq!(
        split_statements("SELECT 'oops; SELECT 1", SplitMode::Naive)
            .unwrap()
            .len(),
        2
    );
}
