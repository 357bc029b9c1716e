//! Registry of objects created through the session.
//!
//! The engine catalog remains the source of truth for schemas; this registry
//! only holds what the catalog cannot answer: when the wrapper created an
//! object and from what source. Schemas stored here are captured from the
//! catalog immediately after creation.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of catalog object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    /// A persisted table.
    Table,
    /// A view.
    View,
}

impl ObjectKind {
    /// Lowercase label, as it appears in serialized metadata.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Table => "table",
            Self::View => "view",
        }
    }
}

/// One column of a table or view: name plus declared type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    /// Column name.
    pub name: String,
    /// Declared type, as reported by the engine (e.g. `INTEGER`, `VARCHAR`).
    pub data_type: String,
}

impl ColumnInfo {
    /// Create a column descriptor.
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
        }
    }
}

/// Metadata for one object created through the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectMetadata {
    /// Table or view.
    pub kind: ObjectKind,
    /// When the wrapper created the object.
    pub created_at: DateTime<Utc>,
    /// Source description: the defining SQL, an ingestion path, or a script.
    pub source: String,
    /// Ordered column schema captured from the catalog at creation time.
    pub schema: Vec<ColumnInfo>,
}

/// Name-keyed registry of session-created objects.
///
/// Only objects created through the session's own creation operations appear
/// here; objects created by raw SQL are not tracked (script runs are the
/// exception, see [`AnalyticsSession::run_script`]).
///
/// [`AnalyticsSession::run_script`]: crate::session::AnalyticsSession::run_script
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct MetadataRegistry {
    entries: BTreeMap<String, ObjectMetadata>,
}

impl MetadataRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record (or replace) an entry.
    pub fn record(&mut self, name: impl Into<String>, metadata: ObjectMetadata) {
        self.entries.insert(name.into(), metadata);
    }

    /// Look up an entry by object name.
    pub fn get(&self, name: &str) -> Option<&ObjectMetadata> {
        self.entries.get(name)
    }

    /// Whether an object is tracked.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Iterate entries in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &ObjectMetadata)> {
        self.entries.iter()
    }

    /// Tracked object names, in order.
    pub fn names(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    /// Number of tracked objects.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop all entries.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
