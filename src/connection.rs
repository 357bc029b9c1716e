//! Connection handle to the embedded engine.

use duckdb::Connection;
use serde_json::Value as JsonValue;
use tracing::{debug, instrument};

use crate::config::{DatabaseLocation, SessionConfig};
use crate::error::{SessionError, SessionResult};
use crate::types::{engine_value_ref_to_json, SqlValue};

/// An open handle to the embedded engine.
///
/// Owns the underlying `duckdb::Connection` exclusively. The handle is
/// synchronous and must not be shared across threads; the session model is
/// strictly single-threaded.
pub struct EngineConnection {
    conn: Connection,
}

impl EngineConnection {
    /// Open a handle for the given configuration and apply its settings.
    ///
    /// Any engine rejection of the location (invalid path, corrupt file) is
    /// reported as a connection error.
    pub fn establish(config: &SessionConfig) -> SessionResult<Self> {
        let conn = match &config.location {
            DatabaseLocation::InMemory => Connection::open_in_memory(),
            DatabaseLocation::File(path) if config.is_read_only() => {
                let engine_config = duckdb::Config::default()
                    .access_mode(duckdb::AccessMode::ReadOnly)
                    .map_err(|e| SessionError::connection(e.to_string()))?;
                Connection::open_with_flags(path, engine_config)
            }
            DatabaseLocation::File(path) => Connection::open(path),
        }
        .map_err(|e| SessionError::connection(e.to_string()))?;

        let handle = Self { conn };
        handle.apply_settings(config)?;
        Ok(handle)
    }

    /// Apply tuning settings with `SET` statements.
    fn apply_settings(&self, config: &SessionConfig) -> SessionResult<()> {
        if let Some(threads) = config.threads {
            self.conn
                .execute(&format!("SET threads = {}", threads), [])
                .map_err(|e| SessionError::connection(e.to_string()))?;
        }

        if let Some(ref limit) = config.memory_limit {
            self.conn
                .execute(&format!("SET memory_limit = '{}'", limit), [])
                .map_err(|e| SessionError::connection(e.to_string()))?;
        }

        if let Some(ref temp_dir) = config.temp_directory {
            let path = temp_dir.to_string_lossy();
            self.conn
                .execute(&format!("SET temp_directory = '{}'", path), [])
                .map_err(|e| SessionError::connection(e.to_string()))?;
        }

        Ok(())
    }

    /// Run a statement and collect column names plus all rows as JSON.
    ///
    /// Statements without a result set (DDL) come back with an empty column
    /// list.
    #[instrument(skip(self, params), fields(sql = %sql))]
    pub fn query(
        &self,
        sql: &str,
        params: &[SqlValue],
    ) -> SessionResult<(Vec<String>, Vec<Vec<JsonValue>>)> {
        debug!("executing statement");

        let mut stmt = self.conn.prepare(sql)?;

        let param_refs: Vec<&dyn duckdb::ToSql> =
            params.iter().map(|p| p as &dyn duckdb::ToSql).collect();
        let mut rows = stmt.query(param_refs.as_slice())?;

        let columns: Vec<String> = rows
            .as_ref()
            .map(|stmt| stmt.column_names())
            .unwrap_or_default();

        let mut collected = Vec::new();
        while let Some(row) = rows.next()? {
            let mut values = Vec::with_capacity(columns.len());
            for i in 0..columns.len() {
                values.push(engine_value_ref_to_json(row.get_ref(i)?));
            }
            collected.push(values);
        }

        Ok((columns, collected))
    }

    /// Run a statement and return the number of affected rows.
    #[instrument(skip(self, params), fields(sql = %sql))]
    pub fn execute(&self, sql: &str, params: &[SqlValue]) -> SessionResult<usize> {
        debug!("executing statement");

        let mut stmt = self.conn.prepare(sql)?;
        let param_refs: Vec<&dyn duckdb::ToSql> =
            params.iter().map(|p| p as &dyn duckdb::ToSql).collect();

        Ok(stmt.execute(param_refs.as_slice())?)
    }

    /// Run a multi-statement batch.
    #[instrument(skip(self, sql), fields(sql_len = %sql.len()))]
    pub fn execute_batch(&self, sql: &str) -> SessionResult<()> {
        debug!("executing batch");
        self.conn.execute_batch(sql)?;
        Ok(())
    }
}

impl std::fmt::Debug for EngineConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineConnection").finish_non_exhaustive()
    }
}
