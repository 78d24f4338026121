//! IR export formats.
//!
//! Renders a [`DesignSystemIR`](crate::ir::DesignSystemIR) for tooling that
//! lives outside the process: snapshot tests, "show what would change"
//! diffs, editor integrations.
//!
//! ```ignore
//! use specforge::interchange::{IrFormat, Json};
//!
//! let bytes = Json.write(&result.ir)?;
//! ```

mod error;
mod format;

pub use error::InterchangeError;
pub use format::{IrFormat, Json};

#[cfg(feature = "yaml")]
pub use format::Yaml;
