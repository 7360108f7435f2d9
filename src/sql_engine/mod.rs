//! SQL handling: loading templated scripts and cutting them into statements

pub mod loader;
pub mod statements;

#[cfg(test)]
mod tests;
