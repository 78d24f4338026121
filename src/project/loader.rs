use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, trace};
use walkdir::WalkDir;

use crate::parser::{DocumentFormat, SourceDocument};

/// Failure to read spec documents from disk.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("directory not found: {}", .0.display())]
    NotADirectory(PathBuf),
    #[error("{}: unsupported document extension", .0.display())]
    UnsupportedExtension(PathBuf),
    #[error("failed to load {} file(s):\n  {}", .0.len(), join_errors(.0))]
    Many(Vec<LoadError>),
}

fn join_errors(errors: &[LoadError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n  ")
}

/// Every spec document under `dir`, recursively, in path order.
///
/// Unreadable directory entries are skipped.
pub fn collect_file_paths(dir: &Path) -> Result<Vec<PathBuf>, LoadError> {
    if !dir.is_dir() {
        return Err(LoadError::NotADirectory(dir.to_path_buf()));
    }
    let mut paths: Vec<PathBuf> = WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| DocumentFormat::from_path(p).is_some())
        .collect();
    paths.sort();
    Ok(paths)
}

/// Read one document, picking the format from its extension.
pub fn load_file(path: &Path) -> Result<SourceDocument, LoadError> {
    let format = DocumentFormat::from_path(path)
        .ok_or_else(|| LoadError::UnsupportedExtension(path.to_path_buf()))?;
    let text = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    trace!(path = %path.display(), bytes = text.len(), "loaded document");
    Ok(SourceDocument::new(path.display().to_string(), text, format))
}

/// Read every spec document under `dir`.
///
/// All files are attempted; read failures are returned together.
pub fn load_directory(dir: &Path) -> Result<Vec<SourceDocument>, LoadError> {
    let paths = collect_file_paths(dir)?;
    let mut documents = Vec::with_capacity(paths.len());
    let mut errors = Vec::new();
    for path in paths {
        match load_file(&path) {
            Ok(document) => documents.push(document),
            Err(e) => errors.push(e),
        }
    }
    debug!(
        dir = %dir.display(),
        loaded = documents.len(),
        failed = errors.len(),
        "loaded directory"
    );
    if errors.is_empty() {
        Ok(documents)
    } else {
        Err(LoadError::Many(errors))
    }
}
