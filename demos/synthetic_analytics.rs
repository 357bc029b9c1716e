//! # Synthetic Analytics Demo
//!
//! Seeds a synthetic customers / products / transactions dataset straight
//! in SQL (via `generate_series`), then runs the analytical query shapes
//! DuckDB is built for: aggregations over joins, CTEs, and window-function
//! rankings.
//!
//! ## Running this demo
//!
//! ```bash
//! cargo run --example synthetic_analytics
//! ```

use std::error::Error;

use mallard::AnalyticsSession;
use tracing_subscriber::EnvFilter;

const NUM_CUSTOMERS: usize = 100;
const NUM_PRODUCTS: usize = 50;
const NUM_TRANSACTIONS: usize = 1000;

fn seed(session: &AnalyticsSession) -> Result<(), Box<dyn Error>> {
    session.execute(&format!(
        "CREATE TABLE customers AS
         SELECT
             i AS customer_id,
             'Customer ' || i AS name,
             'City ' || (i % 10) AS city,
             DATE '2020-01-01' + (i % 1800) * INTERVAL 1 DAY AS registration_date
         FROM generate_series(1, {NUM_CUSTOMERS}) AS t(i)"
    ))?;

    session.execute(&format!(
        "CREATE TABLE products AS
         SELECT
             i AS product_id,
             'Product ' || i AS product_name,
             ['Electronics', 'Books', 'Clothing', 'Food', 'Home'][1 + i % 5] AS category,
             ROUND(10 + (i * 37) % 990 + 0.99, 2) AS price,
             (i * 13) % 500 AS stock_quantity
         FROM generate_series(1, {NUM_PRODUCTS}) AS t(i)"
    ))?;

    session.execute(&format!(
        "CREATE TABLE transactions AS
         SELECT
             i AS transaction_id,
             1 + (i * 7) % {NUM_CUSTOMERS} AS customer_id,
             1 + (i * 11) % {NUM_PRODUCTS} AS product_id,
             1 + i % 5 AS quantity,
             TIMESTAMP '2025-01-01 00:00:00' + (i % 365) * INTERVAL 1 DAY AS transaction_date
         FROM generate_series(1, {NUM_TRANSACTIONS}) AS t(i)"
    ))?;

    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new("mallard=info").unwrap_or_else(|_| EnvFilter::new("warn")))
        .compact()
        .init();

    println!("{}", "=".repeat(60));
    println!("DuckDB Embedded Analytics - Synthetic Data Demo");
    println!("{}", "=".repeat(60));

    let mut session = AnalyticsSession::in_memory();
    session.connect()?;

    println!(
        "\nSeeding {} customers, {} products, {} transactions...",
        NUM_CUSTOMERS, NUM_PRODUCTS, NUM_TRANSACTIONS
    );
    seed(&session)?;

    println!("\n1. Total sales value per product category:");
    println!(
        "{}",
        session.fetch(
            "SELECT
                 p.category,
                 SUM(t.quantity * p.price) AS total_sales_value
             FROM transactions t
             JOIN products p ON t.product_id = p.product_id
             GROUP BY p.category
             ORDER BY total_sales_value DESC"
        )?
    );

    println!("2. Top 10 customers by spend:");
    println!(
        "{}",
        session.fetch(
            "SELECT
                 c.name,
                 c.city,
                 SUM(t.quantity * p.price) AS total_spent
             FROM transactions t
             JOIN customers c ON t.customer_id = c.customer_id
             JOIN products p ON t.product_id = p.product_id
             GROUP BY c.name, c.city
             ORDER BY total_spent DESC
             LIMIT 10"
        )?
    );

    println!("3. Average transactions per customer, by city (CTE):");
    println!(
        "{}",
        session.fetch(
            "WITH customer_transactions AS (
                 SELECT
                     c.customer_id,
                     c.city,
                     COUNT(t.transaction_id) AS num_transactions
                 FROM customers c
                 JOIN transactions t ON c.customer_id = t.customer_id
                 GROUP BY c.customer_id, c.city
             )
             SELECT
                 city,
                 AVG(num_transactions) AS avg_transactions_per_customer
             FROM customer_transactions
             GROUP BY city
             ORDER BY avg_transactions_per_customer DESC
             LIMIT 5"
        )?
    );

    println!("4. Best-selling product per category (window ranking):");
    println!(
        "{}",
        session.fetch(
            "SELECT category, product_name, revenue
             FROM (
                 SELECT
                     p.category,
                     p.product_name,
                     SUM(t.quantity * p.price) AS revenue,
                     RANK() OVER (
                         PARTITION BY p.category
                         ORDER BY SUM(t.quantity * p.price) DESC
                     ) AS rank_in_category
                 FROM transactions t
                 JOIN products p ON t.product_id = p.product_id
                 GROUP BY p.category, p.product_name
             )
             WHERE rank_in_category = 1
             ORDER BY revenue DESC"
        )?
    );

    session.disconnect();

    println!("{}", "=".repeat(60));
    println!("Demo complete");
    println!("{}", "=".repeat(60));
    Ok(())
}
