//! Splitting multi-statement DQ scripts into individually executable checks

use serde::{Deserialize, Serialize};
use sqlparser::dialect::BigQueryDialect;
use sqlparser::tokenizer::{Location, Token, Tokenizer};

use crate::error::{PipelineError, Result};

/// How a multi-statement script is cut into statements
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitMode {
    /// Cut on every `;` character, including ones inside literals or comments
    #[default]
    Naive,
    /// Cut only on `;` tokens, as seen by the BigQuery tokenizer
    SqlAware,
}

/// A single statement taken from a DQ script
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    /// Display name derived from the first line
    pub name: String,
    /// Trimmed statement text, as sent to the warehouse
    pub sql: String,
}

impl Statement {
    pub fn new(sql: impl Into<String>) -> Self {
        let sql = sql.into();
        let name = statement_name(&sql);
        Self { name, sql }
    }
}

/// Split `sql` into trimmed, non-empty statements in textual order
pub fn split_statements(sql: &str, mode: SplitMode) -> Result<Vec<Statement>> {
    let pieces = match mode {
        SplitMode::Naive => sql.split(';').collect::<Vec<_>>(),
        SplitMode::SqlAware => split_on_semicolon_tokens(sql)?,
    };

    Ok(pieces
        .into_iter()
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .map(Statement::new)
        .collect())
}

/// First line of the statement with one leading `--` removed.
///
/// A statement that does not start with a comment is named after its raw first line.
pub fn statement_name(sql: &str) -> String {
    let first_line = sql.lines().next().unwrap_or_default().trim();
    match first_line.strip_prefix("--") {
        Some(rest) => rest.trim().to_string(),
        None => first_line.to_string(),
    }
}

fn split_on_semicolon_tokens(sql: &str) -> Result<Vec<&str>> {
    let dialect = BigQueryDialect {};
    let tokens = Tokenizer::new(&dialect, sql)
        .tokenize_with_location()
        .map_err(|e| PipelineError::Split(e.to_string()))?;

    let line_starts = line_starts(sql);
    let mut pieces = Vec::new();
    let mut start = 0;

    for token in tokens {
        if token.token == Token::SemiColon {
            let end = byte_offset(sql, &line_starts, token.span.start);
            pieces.push(&sql[start..end]);
            start = end + 1;
        }
    }
    pieces.push(&sql[start..]);

    Ok(pieces)
}

fn line_starts(sql: &str) -> Vec<usize> {
    std::iter::once(0)
        .chain(sql.match_indices('\n').map(|(i, _)| i + 1))
        .collect()
}

// Tokenizer locations are 1-based and count characters, not bytes.
fn byte_offset(sql: &str, line_starts: &[usize], location: Location) -> usize {
    let line_index = (location.line.max(1) - 1) as usize;
    let Some(&line_start) = line_starts.get(line_index) else {
        return sql.len();
    };
    let column = (location.column.max(1) - 1) as usize;

    sql[line_start..]
        .char_indices()
        .nth(column)
        .map(|(i, _)| line_start + i)
        .unwrap_or(sql.len())
}
