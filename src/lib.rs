//! Embedded analytics sessions on DuckDB.
//!
//! `mallard` wraps the in-process DuckDB engine behind a small synchronous
//! session type: connect to a file or in-memory database, ingest CSV /
//! Parquet / JSON files, run SQL, create tables and views from queries,
//! export results to CSV, and keep a registry describing the objects the
//! session created. Query execution, storage, and optimization are entirely
//! the engine's job; this crate is the orchestration layer around it.
//!
//! # Example
//!
//! ```rust,no_run
//! use mallard::{AnalyticsSession, SessionConfig, SourceFormat};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SessionConfig::from_path("./analytics.duckdb")?;
//!     let mut session = AnalyticsSession::new(config);
//!     session.connect()?;
//!
//!     session.ingest("data/sales.csv", "sales", SourceFormat::Csv, true)?;
//!     session.create_view(
//!         "top_products",
//!         "SELECT product, SUM(amount) AS revenue
//!          FROM sales GROUP BY product ORDER BY revenue DESC",
//!     )?;
//!
//!     let table = session.fetch("SELECT * FROM top_products")?;
//!     println!("{table}");
//!
//!     session.export_csv("SELECT * FROM top_products", "out/top_products.csv")?;
//!     session.disconnect();
//!     Ok(())
//! }
//! ```
//!
//! # Design notes
//!
//! - **Strict connection model**: operations on a disconnected session fail
//!   with [`SessionError::NotConnected`]; there is no implicit reconnect.
//! - **Catalog as source of truth**: [`AnalyticsSession::schema_of`] always
//!   reads the engine catalog. The [`MetadataRegistry`] records only what
//!   the catalog cannot answer: creation time and source description.
//! - **Single-threaded**: the session owns one raw engine handle and must
//!   not be shared across threads.

pub mod config;
pub mod connection;
pub mod error;
pub mod metadata;
pub mod session;
pub mod table;
pub mod types;

pub use config::{AccessMode, DatabaseLocation, SessionConfig, SessionConfigBuilder};
pub use connection::EngineConnection;
pub use error::{SessionError, SessionResult};
pub use metadata::{ColumnInfo, MetadataRegistry, ObjectKind, ObjectMetadata};
pub use session::{AnalyticsSession, SourceFormat};
pub use table::Table;
pub use types::SqlValue;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::config::{AccessMode, SessionConfig, SessionConfigBuilder};
    pub use crate::error::{SessionError, SessionResult};
    pub use crate::metadata::{ColumnInfo, ObjectKind, ObjectMetadata};
    pub use crate::session::{AnalyticsSession, SourceFormat};
    pub use crate::table::Table;
    pub use crate::types::SqlValue;
}
