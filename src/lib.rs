//! Runs the bronze/silver/gold SQL transformations against BigQuery, then the
//! data-quality checks, reporting pass/fail to the console.

pub mod commands;
pub mod display;
pub mod error;
pub mod sql_engine;
pub mod warehouse;
