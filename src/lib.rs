//! Spark library exports for the binary and integration tests

pub mod content;
pub mod core;
pub mod inference;
pub mod repl;
pub mod runtime;

#[cfg(test)]
pub mod test_support;
