//! Common trait for IR export formats.

use std::io::Write;
use std::path::Path;

use super::InterchangeError;
use crate::ir::DesignSystemIR;

/// An export format for [`DesignSystemIR`].
///
/// Exports are write-only: generators read the IR in memory, and the
/// rendered forms exist for tooling and snapshots.
pub trait IrFormat: Send + Sync {
    /// Human-readable name of the format.
    fn name(&self) -> &'static str;

    /// File extension(s) for this format.
    fn extensions(&self) -> &'static [&'static str];

    fn mime_type(&self) -> &'static str;

    /// Serialize the IR to bytes.
    fn write(&self, ir: &DesignSystemIR) -> Result<Vec<u8>, InterchangeError>;

    /// Serialize the IR into a file, replacing any existing content.
    fn write_file(&self, ir: &DesignSystemIR, path: &Path) -> Result<(), InterchangeError> {
        let bytes = self.write(ir)?;
        let mut file = std::fs::File::create(path)?;
        file.write_all(&bytes)?;
        Ok(())
    }
}

/// Pretty-printed JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct Json;

impl IrFormat for Json {
    fn name(&self) -> &'static str {
        "JSON"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["json"]
    }

    fn mime_type(&self) -> &'static str {
        "application/json"
    }

    fn write(&self, ir: &DesignSystemIR) -> Result<Vec<u8>, InterchangeError> {
        serde_json::to_vec_pretty(ir).map_err(|e| InterchangeError::json(e.to_string()))
    }
}

/// YAML, same structure as [`Json`].
#[cfg(feature = "yaml")]
#[derive(Debug, Clone, Copy, Default)]
pub struct Yaml;

#[cfg(feature = "yaml")]
impl IrFormat for Yaml {
    fn name(&self) -> &'static str {
        "YAML"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["yaml", "yml"]
    }

    fn mime_type(&self) -> &'static str {
        "application/x-yaml"
    }

    fn write(&self, ir: &DesignSystemIR) -> Result<Vec<u8>, InterchangeError> {
        serde_yaml::to_string(ir)
            .map(String::into_bytes)
            .map_err(|e| InterchangeError::yaml(e.to_string()))
    }
}
