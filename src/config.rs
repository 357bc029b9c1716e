//! Session configuration.

use std::path::{Path, PathBuf};

use crate::error::SessionResult;

/// Where the database lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseLocation {
    /// In-memory database, discarded when the session closes.
    InMemory,
    /// File-based database.
    File(PathBuf),
}

impl DatabaseLocation {
    /// Human-readable form for log lines.
    pub fn describe(&self) -> String {
        match self {
            Self::InMemory => ":memory:".to_string(),
            Self::File(path) => path.display().to_string(),
        }
    }
}

/// Database access mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AccessMode {
    /// Read-write access (default).
    #[default]
    ReadWrite,
    /// Read-only access.
    ReadOnly,
}

/// Configuration for an analytics session.
///
/// Engine tuning settings are applied with `SET` statements right after the
/// connection handle opens.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Database location.
    pub location: DatabaseLocation,
    /// Access mode.
    pub access_mode: AccessMode,
    /// Number of threads for parallel execution.
    pub threads: Option<usize>,
    /// Memory limit (e.g., "4GB").
    pub memory_limit: Option<String>,
    /// Temporary directory for spilling.
    pub temp_directory: Option<PathBuf>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            location: DatabaseLocation::InMemory,
            access_mode: AccessMode::ReadWrite,
            threads: None,
            memory_limit: None,
            temp_directory: None,
        }
    }
}

impl SessionConfig {
    /// Create a new in-memory configuration.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Create a configuration for a database file.
    ///
    /// Ensures the parent directory exists so the engine can create the file.
    pub fn from_path(path: impl AsRef<Path>) -> SessionResult<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.exists() && !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        Ok(Self {
            location: DatabaseLocation::File(path.to_path_buf()),
            ..Self::default()
        })
    }

    /// Create a builder for more complex configurations.
    pub fn builder() -> SessionConfigBuilder {
        SessionConfigBuilder::default()
    }

    /// Check if this is an in-memory database.
    pub fn is_in_memory(&self) -> bool {
        matches!(self.location, DatabaseLocation::InMemory)
    }

    /// Check if this is a read-only configuration.
    pub fn is_read_only(&self) -> bool {
        matches!(self.access_mode, AccessMode::ReadOnly)
    }
}

/// Builder for session configuration.
#[derive(Debug, Clone, Default)]
pub struct SessionConfigBuilder {
    config: SessionConfig,
}

impl SessionConfigBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the database file path.
    pub fn path(mut self, path: impl AsRef<Path>) -> Self {
        self.config.location = DatabaseLocation::File(path.as_ref().to_path_buf());
        self
    }

    /// Use an in-memory database.
    pub fn in_memory(mut self) -> Self {
        self.config.location = DatabaseLocation::InMemory;
        self
    }

    /// Set the access mode.
    pub fn access_mode(mut self, mode: AccessMode) -> Self {
        self.config.access_mode = mode;
        self
    }

    /// Set read-only mode.
    pub fn read_only(mut self) -> Self {
        self.config.access_mode = AccessMode::ReadOnly;
        self
    }

    /// Set the number of threads.
    pub fn threads(mut self, threads: usize) -> Self {
        self.config.threads = Some(threads);
        self
    }

    /// Set the memory limit.
    pub fn memory_limit(mut self, limit: impl Into<String>) -> Self {
        self.config.memory_limit = Some(limit.into());
        self
    }

    /// Set the temporary directory.
    pub fn temp_directory(mut self, path: impl AsRef<Path>) -> Self {
        self.config.temp_directory = Some(path.as_ref().to_path_buf());
        self
    }

    /// Build the configuration.
    pub fn build(self) -> SessionConfig {
        self.config
    }
}
