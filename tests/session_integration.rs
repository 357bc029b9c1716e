//! End-to-end workflows against a real engine: ingestion, analytics,
//! export round trips, scripts, and lifecycle behavior.

use std::fs;
use std::path::PathBuf;

use mallard::{AnalyticsSession, ColumnInfo, ObjectKind, SessionError, SourceFormat};
use tempfile::TempDir;

const SALES_CSV: &str = "\
id,product,amount,sale_date
1,Laptop,1200.00,2025-01-01
2,Mouse,25.00,2025-01-02
3,Keyboard,75.00,2025-01-03
4,Laptop,1500.00,2025-01-04
";

fn write_sales_csv(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("sales.csv");
    fs::write(&path, SALES_CSV).unwrap();
    path
}

fn connected() -> AnalyticsSession {
    let mut session = AnalyticsSession::in_memory();
    session.connect().unwrap();
    session
}

#[test]
fn sales_scenario_grouped_revenue() {
    let dir = TempDir::new().unwrap();
    let csv = write_sales_csv(&dir);

    let mut session = connected();
    session.ingest(&csv, "sales", SourceFormat::Csv, true).unwrap();

    let table = session
        .fetch(
            "SELECT product, SUM(amount) AS revenue \
             FROM sales GROUP BY product ORDER BY revenue DESC",
        )
        .unwrap();

    assert_eq!(
        table.columns().to_vec(),
        vec!["product".to_string(), "revenue".to_string()]
    );
    let extract = |i: usize| {
        (
            table.get(i, "product").unwrap().as_str().unwrap().to_string(),
            table.get(i, "revenue").unwrap().as_f64().unwrap(),
        )
    };
    assert_eq!(extract(0), ("Laptop".to_string(), 2700.0));
    assert_eq!(extract(1), ("Keyboard".to_string(), 75.0));
    assert_eq!(extract(2), ("Mouse".to_string(), 25.0));
}

#[test]
fn ingest_then_schema_matches_header() {
    let dir = TempDir::new().unwrap();
    let csv = write_sales_csv(&dir);

    let mut session = connected();
    session.ingest(&csv, "sales", SourceFormat::Csv, true).unwrap();

    let schema = session.schema_of("sales").unwrap();
    let names: Vec<&str> = schema.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["id", "product", "amount", "sale_date"]);

    let meta = session.metadata().get("sales").unwrap();
    assert_eq!(meta.kind, ObjectKind::Table);
    assert!(meta.source.contains("sales.csv"));
    assert_eq!(meta.schema, schema);
}

#[test]
fn ingest_append_adds_rows_without_metadata() {
    let dir = TempDir::new().unwrap();
    let csv = write_sales_csv(&dir);

    let mut session = connected();
    session.ingest(&csv, "sales", SourceFormat::Csv, true).unwrap();
    session.ingest(&csv, "sales", SourceFormat::Csv, false).unwrap();

    let table = session.fetch("SELECT COUNT(*) AS n FROM sales").unwrap();
    assert_eq!(table.get(0, "n").unwrap().as_i64(), Some(8));
    // only the creating ingest wrote metadata
    assert_eq!(session.metadata().len(), 1);
}

#[test]
fn ingest_missing_file_leaves_no_trace() {
    let dir = TempDir::new().unwrap();
    let csv = write_sales_csv(&dir);
    let missing = dir.path().join("nope.csv");

    let mut session = connected();

    // createTable = true: no table appears
    let err = session
        .ingest(&missing, "ghost", SourceFormat::Csv, true)
        .unwrap_err();
    assert!(err.is_not_found());
    assert!(session.fetch("SELECT * FROM ghost").is_err());

    // createTable = false: no rows appended to an existing table
    session.ingest(&csv, "sales", SourceFormat::Csv, true).unwrap();
    let err = session
        .ingest(&missing, "sales", SourceFormat::Csv, false)
        .unwrap_err();
    assert!(err.is_not_found());
    let table = session.fetch("SELECT COUNT(*) AS n FROM sales").unwrap();
    assert_eq!(table.get(0, "n").unwrap().as_i64(), Some(4));
}

#[test]
fn json_ingestion_infers_schema() {
    let dir = TempDir::new().unwrap();
    let json = dir.path().join("customers.json");
    fs::write(
        &json,
        r#"[{"customer_id": "C001", "name": "Alice", "city": "NY"},
            {"customer_id": "C002", "name": "Bob", "city": "LA"}]"#,
    )
    .unwrap();

    let mut session = connected();
    session
        .ingest(&json, "customers", SourceFormat::Json, true)
        .unwrap();

    let schema = session.schema_of("customers").unwrap();
    let names: Vec<&str> = schema.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["customer_id", "name", "city"]);

    let table = session
        .fetch("SELECT name FROM customers ORDER BY customer_id")
        .unwrap();
    assert_eq!(table.get(0, "name").unwrap().as_str(), Some("Alice"));
}

#[test]
fn parquet_round_trip() {
    let dir = TempDir::new().unwrap();
    let parquet = dir.path().join("products.parquet");

    let mut session = connected();
    session
        .execute(&format!(
            "COPY (SELECT 'P' || i AS product_id, i * 10 AS price \
             FROM generate_series(1, 3) AS t(i)) \
             TO '{}' (FORMAT PARQUET)",
            parquet.display()
        ))
        .unwrap();

    session
        .ingest(&parquet, "products", SourceFormat::Parquet, true)
        .unwrap();

    let table = session.fetch("SELECT COUNT(*) AS n FROM products").unwrap();
    assert_eq!(table.get(0, "n").unwrap().as_i64(), Some(3));

    let names: Vec<String> = session
        .schema_of("products")
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(names, vec!["product_id", "price"]);
}

#[test]
fn export_then_reingest_preserves_row_count() {
    let dir = TempDir::new().unwrap();
    let csv = write_sales_csv(&dir);
    let exported = dir.path().join("laptops.csv");

    let mut session = connected();
    session.ingest(&csv, "sales", SourceFormat::Csv, true).unwrap();

    let sql = "SELECT * FROM sales WHERE product = 'Laptop'";
    let direct = session.fetch(sql).unwrap();
    session.export_csv(sql, &exported).unwrap();

    session
        .ingest(&exported, "laptops", SourceFormat::Csv, true)
        .unwrap();
    let reingested = session.fetch("SELECT * FROM laptops").unwrap();
    assert_eq!(reingested.row_count(), direct.row_count());

    // header row present in the exported file
    let text = fs::read_to_string(&exported).unwrap();
    assert!(text.lines().next().unwrap().contains("product"));
    assert_eq!(text.lines().count(), direct.row_count() + 1);
}

#[test]
fn export_overwrites_existing_file() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("out.csv");
    fs::write(&out, "stale content that should disappear").unwrap();

    let session = connected();
    session.export_csv("SELECT 1 AS x", &out).unwrap();

    let text = fs::read_to_string(&out).unwrap();
    assert!(!text.contains("stale"));
    assert!(text.starts_with("x"));
}

#[test]
fn ctas_matches_direct_query() {
    let mut session = connected();
    session
        .execute(
            "CREATE TABLE raw AS \
             SELECT i AS id, i % 3 AS bucket FROM generate_series(1, 9) AS t(i)",
        )
        .unwrap();

    let sql = "SELECT bucket, COUNT(*) AS n FROM raw GROUP BY bucket ORDER BY bucket";
    let direct = session.fetch(sql).unwrap();

    session.create_table_from_query("buckets", sql).unwrap();
    let materialized = session
        .fetch("SELECT * FROM buckets ORDER BY bucket")
        .unwrap();

    assert_eq!(materialized.rows(), direct.rows());
}

#[test]
fn view_metadata_scenario() {
    let mut session = connected();
    session.create_view("v", "SELECT 1 AS x").unwrap();

    let meta = session.metadata().get("v").unwrap();
    assert_eq!(meta.kind.as_str(), "view");
    assert_eq!(
        session.schema_of("v").unwrap(),
        vec![ColumnInfo::new("x", "INTEGER")]
    );
}

#[test]
fn script_execution_tracks_new_objects() {
    let dir = TempDir::new().unwrap();
    let script = dir.path().join("setup.sql");
    fs::write(
        &script,
        "CREATE TABLE regions (id INTEGER, name VARCHAR);\n\
         INSERT INTO regions VALUES (1, 'north'), (2, 'south');\n\
         CREATE VIEW region_names AS SELECT name FROM regions;\n",
    )
    .unwrap();

    let mut session = connected();
    session.run_script(&script).unwrap();

    let table = session.fetch("SELECT COUNT(*) AS n FROM regions").unwrap();
    assert_eq!(table.get(0, "n").unwrap().as_i64(), Some(2));

    let regions = session.metadata().get("regions").unwrap();
    assert_eq!(regions.kind, ObjectKind::Table);
    assert!(regions.source.starts_with("script: "));
    assert_eq!(
        session.metadata().get("region_names").unwrap().kind,
        ObjectKind::View
    );
}

#[test]
fn script_missing_file_fails_fast() {
    let mut session = connected();
    let err = session.run_script("/definitely/missing.sql").unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn script_error_tracks_nothing() {
    let dir = TempDir::new().unwrap();
    let script = dir.path().join("broken.sql");
    fs::write(&script, "CREATE TABLE t (id INTEGER;\n").unwrap();

    let mut session = connected();
    assert!(session.run_script(&script).is_err());
    assert!(session.metadata().is_empty());
}

#[test]
fn disconnect_is_strict_never_stale() {
    let mut session = connected();
    session.execute("CREATE TABLE t (id INTEGER)").unwrap();

    session.disconnect();
    let err = session.fetch("SELECT * FROM t").unwrap_err();
    assert!(matches!(err, SessionError::NotConnected));
}

#[test]
fn file_backed_database_persists_across_sessions() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("analytics.duckdb");
    let csv = write_sales_csv(&dir);

    {
        let mut session = AnalyticsSession::open_path(&db).unwrap();
        session.connect().unwrap();
        session.ingest(&csv, "sales", SourceFormat::Csv, true).unwrap();
        session.compact().unwrap();
        session.disconnect();
    }

    let mut session = AnalyticsSession::open_path(&db).unwrap();
    session.connect().unwrap();

    // data survived, the registry did not: it is session-scoped
    let table = session.fetch("SELECT COUNT(*) AS n FROM sales").unwrap();
    assert_eq!(table.get(0, "n").unwrap().as_i64(), Some(4));
    assert!(session.metadata().is_empty());
}

#[test]
fn connect_rejects_corrupt_file() {
    let dir = TempDir::new().unwrap();
    let bogus = dir.path().join("corrupt.duckdb");
    fs::write(&bogus, "this is not a database").unwrap();

    let mut session = AnalyticsSession::open_path(&bogus).unwrap();
    let err = session.connect().unwrap_err();
    assert!(matches!(err, SessionError::Connection(_)));
    assert!(!session.is_connected());
}
