//! Command implementations for the `dqp` binary

pub mod check;
pub mod config;
pub mod render;
pub mod run;

#[cfg(test)]
mod tests;
