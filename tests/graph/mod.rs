//! Dependency graph tests
//!
//! Impact analysis over compiled batches and over arbitrary graphs.

pub mod tests_impact;
