//! Ordered set of registered migrations.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use super::Migration;
use super::builtin;
use crate::base::SchemaVersion;
use crate::base::constants::CURRENT_SCHEMA_VERSION;

/// Misconfigured migration registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The migration does not move the version forward.
    #[error("migration '{description}' does not advance the version ({from} -> {to})")]
    NonIncreasing {
        description: String,
        from: SchemaVersion,
        to: SchemaVersion,
    },

    /// Two migrations cover part of the same version range.
    #[error("migration {from} -> {to} overlaps registered migration {existing_from} -> {existing_to}")]
    Overlap {
        from: SchemaVersion,
        to: SchemaVersion,
        existing_from: SchemaVersion,
        existing_to: SchemaVersion,
    },

    /// No registered migration starts where the previous one ends.
    #[error("no migration covers {from} -> {to}")]
    Gap { from: SchemaVersion, to: SchemaVersion },

    /// The migration targets a version newer than the registry's current one.
    #[error("migration {from} -> {to} targets a version newer than current {current}")]
    BeyondCurrent {
        from: SchemaVersion,
        to: SchemaVersion,
        current: SchemaVersion,
    },
}

/// Registered migrations, kept sorted by `from_version`.
///
/// Constructed explicitly and handed to the compiler; there is no global
/// registry.
#[derive(Clone)]
pub struct MigrationRegistry {
    migrations: Vec<Arc<dyn Migration>>,
    current: SchemaVersion,
}

impl MigrationRegistry {
    /// Empty registry targeting `current`.
    pub fn new(current: SchemaVersion) -> Self {
        Self {
            migrations: Vec::new(),
            current,
        }
    }

    /// Registry with the built-in migration chain up to
    /// [`CURRENT_SCHEMA_VERSION`].
    pub fn builtin() -> Self {
        Self {
            migrations: builtin::all(),
            current: CURRENT_SCHEMA_VERSION,
        }
    }

    pub fn current_version(&self) -> SchemaVersion {
        self.current
    }

    /// Add a migration, keeping the list sorted by `from_version`.
    pub fn register(&mut self, migration: impl Migration + 'static) -> Result<(), RegistryError> {
        let from = migration.from_version();
        let to = migration.to_version();

        if to <= from {
            return Err(RegistryError::NonIncreasing {
                description: migration.description().to_string(),
                from,
                to,
            });
        }
        if to > self.current {
            return Err(RegistryError::BeyondCurrent {
                from,
                to,
                current: self.current,
            });
        }
        if let Some(existing) = self
            .migrations
            .iter()
            .find(|m| from < m.to_version() && m.from_version() < to)
        {
            return Err(RegistryError::Overlap {
                from,
                to,
                existing_from: existing.from_version(),
                existing_to: existing.to_version(),
            });
        }

        let index = self
            .migrations
            .partition_point(|m| m.from_version() < from);
        self.migrations.insert(index, Arc::new(migration));
        Ok(())
    }

    /// Builder form of [`register`](Self::register).
    pub fn with(mut self, migration: impl Migration + 'static) -> Result<Self, RegistryError> {
        self.register(migration)?;
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.migrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.migrations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Migration> {
        self.migrations.iter().map(|m| m.as_ref())
    }

    /// Migrations whose target lies in `(from, to]`, in ascending order.
    ///
    /// Fails with [`RegistryError::Gap`] unless each migration starts at or
    /// before the version the previous one reached and the last reaches `to`.
    pub fn chain(
        &self,
        from: SchemaVersion,
        to: SchemaVersion,
    ) -> Result<Vec<&dyn Migration>, RegistryError> {
        let chain: Vec<&dyn Migration> = self
            .iter()
            .filter(|m| m.to_version() > from && m.to_version() <= to)
            .collect();

        let mut reached = from;
        for migration in &chain {
            if migration.from_version() > reached {
                return Err(RegistryError::Gap {
                    from: reached,
                    to: migration.from_version(),
                });
            }
            reached = migration.to_version();
        }
        if reached < to {
            return Err(RegistryError::Gap { from: reached, to });
        }
        Ok(chain)
    }
}

impl Default for MigrationRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl fmt::Debug for MigrationRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MigrationRegistry")
            .field("current", &self.current)
            .field(
                "migrations",
                &self
                    .iter()
                    .map(|m| format!("{} -> {}: {}", m.from_version(), m.to_version(), m.description()))
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}
