//! Loading spec documents from disk.

mod loader;

pub use loader::{LoadError, collect_file_paths, load_directory, load_file};

use std::path::Path;

use crate::compiler::{CompileResult, Compiler};

/// Load every document under `dir` and compile them as one batch.
pub fn compile_directory(compiler: &Compiler, dir: &Path) -> Result<CompileResult, LoadError> {
    let documents = load_directory(dir)?;
    Ok(compiler.compile(&documents))
}
