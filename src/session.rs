//! Analytics session: connection lifecycle, SQL operations, and the
//! metadata registry.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::Utc;
use serde_json::Value as JsonValue;
use tracing::{debug, info, instrument, warn};

use crate::config::SessionConfig;
use crate::connection::EngineConnection;
use crate::error::{SessionError, SessionResult};
use crate::metadata::{ColumnInfo, MetadataRegistry, ObjectKind, ObjectMetadata};
use crate::table::Table;
use crate::types::SqlValue;

/// File formats the session can ingest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Delimited text with a header row.
    Csv,
    /// Columnar binary container.
    Parquet,
    /// Line-delimited or array JSON, schema inferred.
    Json,
}

impl SourceFormat {
    /// Engine table function reading this format, with schema inference.
    fn reader(&self, path_literal: &str) -> String {
        match self {
            Self::Csv => format!("read_csv_auto({})", path_literal),
            Self::Parquet => format!("read_parquet({})", path_literal),
            Self::Json => format!("read_json_auto({})", path_literal),
        }
    }
}

/// A session against the embedded analytical engine.
///
/// Owns at most one connection handle. All operations are synchronous and
/// run exactly once; failures surface as [`SessionError`] values rather
/// than being swallowed. The session must not be shared across threads.
///
/// The connection model is strict: every operation other than [`connect`]
/// and [`disconnect`] requires an open handle and fails with
/// [`SessionError::NotConnected`] otherwise.
///
/// [`connect`]: AnalyticsSession::connect
/// [`disconnect`]: AnalyticsSession::disconnect
///
/// # Example
///
/// ```rust,no_run
/// use mallard::{AnalyticsSession, SourceFormat};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut session = AnalyticsSession::in_memory();
/// session.connect()?;
/// session.ingest("data/sales.csv", "sales", SourceFormat::Csv, true)?;
/// let revenue = session.fetch(
///     "SELECT product, SUM(amount) AS revenue FROM sales GROUP BY product",
/// )?;
/// println!("{revenue}");
/// session.disconnect();
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct AnalyticsSession {
    config: SessionConfig,
    conn: Option<EngineConnection>,
    metadata: MetadataRegistry,
}

impl AnalyticsSession {
    /// Create a session for the given configuration. Does not connect.
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            conn: None,
            metadata: MetadataRegistry::new(),
        }
    }

    /// Create a session backed by an in-memory database.
    pub fn in_memory() -> Self {
        Self::new(SessionConfig::in_memory())
    }

    /// Create a session backed by a database file.
    pub fn open_path(path: impl AsRef<Path>) -> SessionResult<Self> {
        Ok(Self::new(SessionConfig::from_path(path)?))
    }

    /// The configuration this session was built with.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Whether a connection handle is currently open.
    pub fn is_connected(&self) -> bool {
        self.conn.is_some()
    }

    /// Open the connection handle. Idempotent: a no-op if already open.
    ///
    /// On engine rejection the handle stays absent and the error is
    /// returned.
    pub fn connect(&mut self) -> SessionResult<()> {
        if self.conn.is_some() {
            debug!("connect called on an already-open session");
            return Ok(());
        }

        let conn = EngineConnection::establish(&self.config)?;
        info!(location = %self.config.location.describe(), "connected");
        self.conn = Some(conn);
        Ok(())
    }

    /// Close and discard the handle if present; a no-op otherwise.
    ///
    /// The metadata registry only lives as long as the connection and is
    /// cleared here.
    pub fn disconnect(&mut self) {
        if self.conn.take().is_some() {
            self.metadata.clear();
            info!(location = %self.config.location.describe(), "disconnected");
        }
    }

    fn engine(&self) -> SessionResult<&EngineConnection> {
        self.conn.as_ref().ok_or(SessionError::NotConnected)
    }

    /// Send a single SQL statement to the engine.
    ///
    /// Returns `Some(rows)` when the statement produces a result set and
    /// `None` otherwise (DDL).
    pub fn execute(&self, sql: &str) -> SessionResult<Option<Vec<Vec<JsonValue>>>> {
        self.execute_with_params(sql, &[])
    }

    /// Like [`execute`], with values bound to `?` placeholders.
    ///
    /// [`execute`]: AnalyticsSession::execute
    pub fn execute_with_params(
        &self,
        sql: &str,
        params: &[SqlValue],
    ) -> SessionResult<Option<Vec<Vec<JsonValue>>>> {
        let (columns, rows) = self.engine()?.query(sql, params)?;
        if columns.is_empty() {
            Ok(None)
        } else {
            Ok(Some(rows))
        }
    }

    /// Run a query and materialize the full result as a [`Table`].
    #[instrument(skip(self), fields(sql = %sql))]
    pub fn fetch(&self, sql: &str) -> SessionResult<Table> {
        let (columns, rows) = self.engine()?.query(sql, &[])?;
        Ok(Table::new(columns, rows))
    }

    /// Create or replace a persistent table holding the result of `sql`
    /// (CTAS) and record its metadata.
    #[instrument(skip(self, sql), fields(table = %name))]
    pub fn create_table_from_query(&mut self, name: &str, sql: &str) -> SessionResult<()> {
        let ident = quote_ident(name)?;
        self.engine()?
            .execute_batch(&format!("CREATE OR REPLACE TABLE {} AS {}", ident, sql))?;

        self.record_object(name, ObjectKind::Table, sql.to_string())?;
        info!(table = %name, "table created from query");
        Ok(())
    }

    /// Create or replace a view defined by `sql` and record its metadata.
    #[instrument(skip(self, sql), fields(view = %name))]
    pub fn create_view(&mut self, name: &str, sql: &str) -> SessionResult<()> {
        let ident = quote_ident(name)?;
        self.engine()?
            .execute_batch(&format!("CREATE OR REPLACE VIEW {} AS {}", ident, sql))?;

        self.record_object(name, ObjectKind::View, sql.to_string())?;
        info!(view = %name, "view created");
        Ok(())
    }

    /// Load data from a file into `table`, inferring the schema from the
    /// file content.
    ///
    /// With `create_table` the table is created or replaced and a metadata
    /// entry recorded; otherwise rows are appended to an existing table and
    /// the registry is untouched. The file must exist; this is checked
    /// before any SQL reaches the engine.
    #[instrument(skip(self, path), fields(table = %table, format = ?format))]
    pub fn ingest(
        &mut self,
        path: impl AsRef<Path>,
        table: &str,
        format: SourceFormat,
        create_table: bool,
    ) -> SessionResult<()> {
        let path = path.as_ref();
        if !path.exists() {
            warn!(path = %path.display(), "ingestion source missing");
            return Err(SessionError::NotFound(path.to_path_buf()));
        }

        let ident = quote_ident(table)?;
        let reader = format.reader(&path_literal(path));

        if create_table {
            self.engine()?.execute_batch(&format!(
                "CREATE OR REPLACE TABLE {} AS SELECT * FROM {}",
                ident, reader
            ))?;
            self.record_object(
                table,
                ObjectKind::Table,
                format!("ingestion from {}", path.display()),
            )?;
            info!(table = %table, path = %path.display(), "ingested into new table");
        } else {
            self.engine()?
                .execute_batch(&format!("INSERT INTO {} SELECT * FROM {}", ident, reader))?;
            info!(table = %table, path = %path.display(), "appended to existing table");
        }

        Ok(())
    }

    /// Run `sql` and write the result to `path` as a header-first CSV,
    /// overwriting any existing content.
    #[instrument(skip(self, sql), fields(path = %path.as_ref().display()))]
    pub fn export_csv(&self, sql: &str, path: impl AsRef<Path>) -> SessionResult<()> {
        let path = path.as_ref();
        self.engine()?.execute_batch(&format!(
            "COPY ({}) TO {} (FORMAT CSV, HEADER)",
            sql,
            path_literal(path)
        ))?;

        info!(path = %path.display(), "exported query result to CSV");
        Ok(())
    }

    /// Read the SQL file at `path` and submit it as one multi-statement
    /// batch.
    ///
    /// Objects the script created are discovered by re-scanning the catalog
    /// afterwards and recorded with source `script: <path>`.
    #[instrument(skip(self), fields(path = %path.as_ref().display()))]
    pub fn run_script(&mut self, path: impl AsRef<Path>) -> SessionResult<()> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SessionError::NotFound(path.to_path_buf()));
        }
        let script = std::fs::read_to_string(path)?;

        let before = self.catalog_objects()?;
        self.engine()?.execute_batch(&script)?;
        let after = self.catalog_objects()?;

        let source = format!("script: {}", path.display());
        for (name, kind) in after {
            if !before.contains_key(&name) {
                self.record_object(&name, kind, source.clone())?;
            }
        }

        info!(path = %path.display(), "script executed");
        Ok(())
    }

    /// Ask the engine to reclaim space and reorganize storage.
    pub fn compact(&self) -> SessionResult<()> {
        self.engine()?.execute_batch("VACUUM;")?;
        info!("database compacted");
        Ok(())
    }

    /// Ordered column list (name, declared type) for an existing table or
    /// view, read straight from the engine catalog.
    pub fn schema_of(&self, name: &str) -> SessionResult<Vec<ColumnInfo>> {
        let (columns, rows) = self.engine()?.query(
            &format!("PRAGMA table_info({})", path_literal_str(name)),
            &[],
        )?;

        let name_idx = columns.iter().position(|c| c == "name");
        let type_idx = columns.iter().position(|c| c == "type");
        let (name_idx, type_idx) = match (name_idx, type_idx) {
            (Some(n), Some(t)) => (n, t),
            _ => return Ok(Vec::new()),
        };

        Ok(rows
            .iter()
            .map(|row| {
                ColumnInfo::new(
                    row[name_idx].as_str().unwrap_or_default(),
                    row[type_idx].as_str().unwrap_or_default(),
                )
            })
            .collect())
    }

    /// Read-only snapshot of the metadata registry.
    pub fn metadata(&self) -> &MetadataRegistry {
        &self.metadata
    }

    /// Record a created object, re-deriving its schema from the catalog so
    /// the entry reflects the just-created shape.
    fn record_object(&mut self, name: &str, kind: ObjectKind, source: String) -> SessionResult<()> {
        let schema = self.schema_of(name)?;
        self.metadata.record(
            name,
            ObjectMetadata {
                kind,
                created_at: Utc::now(),
                source,
                schema,
            },
        );
        Ok(())
    }

    /// Tables and views currently present in the main schema.
    fn catalog_objects(&self) -> SessionResult<BTreeMap<String, ObjectKind>> {
        let (_, rows) = self.engine()?.query(
            "SELECT table_name, table_type FROM information_schema.tables \
             WHERE table_schema = 'main'",
            &[],
        )?;

        Ok(rows
            .iter()
            .filter_map(|row| {
                let name = row.first()?.as_str()?.to_string();
                let kind = match row.get(1)?.as_str()? {
                    "VIEW" => ObjectKind::View,
                    _ => ObjectKind::Table,
                };
                Some((name, kind))
            })
            .collect())
    }
}

/// Validate a table or view name and wrap it in double quotes.
///
/// Names are restricted to ASCII identifiers; anything else is rejected
/// before it can reach the engine inside interpolated SQL.
fn quote_ident(name: &str) -> SessionResult<String> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };

    if valid {
        Ok(format!("\"{}\"", name))
    } else {
        Err(SessionError::InvalidIdentifier(name.to_string()))
    }
}

/// Quote a path as a SQL string literal.
fn path_literal(path: &Path) -> String {
    path_literal_str(&path.to_string_lossy())
}

fn path_literal_str(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}
