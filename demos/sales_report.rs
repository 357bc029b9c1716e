//! # Sales Report Demo
//!
//! End-to-end tour of an analytics session: ingest CSV / JSON / Parquet
//! sources, run join and aggregation queries, materialize a summary table
//! (CTAS), inspect the metadata registry, export to CSV, and clean up with
//! a SQL script.
//!
//! ## Running this demo
//!
//! ```bash
//! cargo run --example sales_report
//!
//! # with operational detail
//! MALLARD_LOG=debug cargo run --example sales_report
//! ```

use std::error::Error;
use std::fs;

use mallard::{AnalyticsSession, SourceFormat};
use tracing_subscriber::EnvFilter;

fn banner(title: &str) {
    println!("{}", "=".repeat(60));
    println!("{}", title);
    println!("{}", "=".repeat(60));
}

fn section(title: &str) {
    println!("\n--- {} ---", title);
}

fn main() -> Result<(), Box<dyn Error>> {
    let level = std::env::var("MALLARD_LOG").unwrap_or_else(|_| "info".into());
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(format!("mallard={}", level))
                .unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .compact()
        .init();

    banner("DuckDB Embedded Analytics - Sales Report Demo");

    let data_dir = tempfile::tempdir()?;
    let dir = data_dir.path();

    // Sample source files
    let sales_csv = dir.join("sample_sales.csv");
    fs::write(
        &sales_csv,
        "transaction_id,product,amount,customer_id,sale_date\n\
         1,Laptop,1200.00,C001,2025-01-01\n\
         2,Mouse,25.00,C002,2025-01-02\n\
         3,Keyboard,75.00,C001,2025-01-03\n\
         4,Monitor,300.00,C003,2025-01-04\n",
    )?;

    let customers_json = dir.join("sample_customers.json");
    fs::write(
        &customers_json,
        r#"[{"customer_id": "C001", "name": "Alice", "city": "NY"},
            {"customer_id": "C002", "name": "Bob", "city": "LA"},
            {"customer_id": "C003", "name": "Charlie", "city": "NY"}]"#,
    )?;

    let mut session = AnalyticsSession::open_path(dir.join("analytics.duckdb"))?;
    session.connect()?;

    // A Parquet source, produced by the engine itself
    let products_parquet = dir.join("sample_products.parquet");
    session.execute(&format!(
        "COPY (SELECT * FROM (VALUES \
            ('P1', 'Laptop',   'Electronics'), \
            ('P2', 'Mouse',    'Electronics'), \
            ('P3', 'Keyboard', 'Peripherals')) \
            AS t(product_id, product_name, category)) \
         TO '{}' (FORMAT PARQUET)",
        products_parquet.display()
    ))?;

    section("Ingestion");
    session.ingest(&sales_csv, "sales", SourceFormat::Csv, true)?;
    println!("✓ sales ingested from {}", sales_csv.display());
    session.ingest(&customers_json, "customers", SourceFormat::Json, true)?;
    println!("✓ customers ingested from {}", customers_json.display());
    session.ingest(&products_parquet, "products", SourceFormat::Parquet, true)?;
    println!("✓ products ingested from {}", products_parquet.display());

    section("Total spend per customer and city");
    let spend = session.fetch(
        "SELECT
             c.name AS customer_name,
             c.city,
             SUM(s.amount) AS total_spent,
             COUNT(s.transaction_id) AS total_transactions
         FROM sales s
         JOIN customers c ON s.customer_id = c.customer_id
         GROUP BY c.name, c.city
         ORDER BY total_spent DESC",
    )?;
    println!("{spend}");

    section("Revenue per product and category");
    let revenue = session.fetch(
        "SELECT
             p.category,
             p.product_name,
             SUM(s.amount) AS revenue
         FROM sales s
         JOIN products p ON s.product = p.product_name
         GROUP BY p.category, p.product_name
         ORDER BY revenue DESC",
    )?;
    println!("{revenue}");

    section("Transformation (CTAS)");
    session.create_table_from_query(
        "customer_summary",
        "SELECT
             c.customer_id,
             c.name,
             c.city,
             SUM(s.amount) AS total_lifetime_value,
             COUNT(s.transaction_id) AS total_orders
         FROM customers c
         LEFT JOIN sales s ON c.customer_id = s.customer_id
         GROUP BY c.customer_id, c.name, c.city",
    )?;
    println!("✓ customer_summary created");
    println!("{}", session.fetch("SELECT * FROM customer_summary ORDER BY customer_id")?);

    section("Tracked metadata");
    println!("{}", serde_json::to_string_pretty(session.metadata())?);

    section("Export");
    let export_path = dir.join("customer_summary.csv");
    session.export_csv(
        "SELECT * FROM customer_summary ORDER BY customer_id",
        &export_path,
    )?;
    println!("✓ exported to {}\n", export_path.display());
    print!("{}", fs::read_to_string(&export_path)?);

    section("Cleanup script");
    let script_path = dir.join("cleanup.sql");
    fs::write(
        &script_path,
        "DROP TABLE IF EXISTS sales;\n\
         DROP TABLE IF EXISTS customers;\n\
         DROP TABLE IF EXISTS products;\n\
         DROP TABLE IF EXISTS customer_summary;\n",
    )?;
    session.run_script(&script_path)?;
    session.compact()?;
    println!("✓ tables dropped and database compacted");

    session.disconnect();

    banner("Demo complete");
    Ok(())
}
