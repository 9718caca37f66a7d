//! Schema migrations, embedded and applied with `refinery`.
//!
//! The migrations under `crates/jobly/migrations` are embedded at compile time.
//! Every statement is `CREATE ... IF NOT EXISTS`, so [`SCHEMA_SQL`] can also be
//! applied directly inside a throwaway transaction.
//!
//! # Example
//!
//! ```ignore
//! let pool = jobly::create_pool(&settings.database)?;
//! let report = jobly::migrate::run_pool(&pool).await?;
//! ```

use crate::error::{JoblyError, JoblyResult};

#[cfg(feature = "migrate")]
pub use refinery::Report;

/// The initial schema: companies, jobs, users, applications.
pub const SCHEMA_SQL: &str = include_str!("../migrations/V1__jobly_schema.sql");

#[cfg(feature = "migrate")]
mod embedded {
    refinery::embed_migrations!("migrations");
}

/// Names of the embedded migrations in version order, e.g. `V1__jobly_schema`.
#[cfg(feature = "migrate")]
pub fn embedded_names() -> Vec<String> {
    embedded::migrations::runner()
        .get_migrations()
        .iter()
        .map(|m| format!("V{}__{}", m.version(), m.name()))
        .collect()
}

/// Apply all pending embedded migrations on a single connection.
#[cfg(feature = "migrate")]
pub async fn run(client: &mut tokio_postgres::Client) -> JoblyResult<Report> {
    let report = embedded::migrations::runner().run_async(client).await?;
    for m in report.applied_migrations() {
        tracing::info!(
            target: "jobly.migrate",
            version = m.version(),
            name = m.name(),
            "applied migration"
        );
    }
    Ok(report)
}

/// Acquire a connection from a pool and apply pending migrations on it.
#[cfg(all(feature = "migrate", feature = "pool"))]
pub async fn run_pool(pool: &deadpool_postgres::Pool) -> JoblyResult<Report> {
    let mut client = pool.get().await?;
    run(&mut client).await
}

/// Apply [`SCHEMA_SQL`] through an open transaction without touching migration history.
pub async fn apply_schema(tx: &tokio_postgres::Transaction<'_>) -> JoblyResult<()> {
    tx.batch_execute(SCHEMA_SQL)
        .await
        .map_err(JoblyError::from_db_error)
}
