//! End-to-end compile tests
//!
//! Multi-document batches through the whole pipeline:
//! - Cross-file reference resolution and cycle reporting
//! - Semantic checks over the merged batch
//! - Version checks and migration of legacy documents
//! - Loading and compiling a directory

pub mod tests_project;
pub mod tests_resolution;
pub mod tests_semantic;
pub mod tests_versioning;
