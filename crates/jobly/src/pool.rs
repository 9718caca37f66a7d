//! Connection pool construction

use crate::config::DatabaseSettings;
use crate::error::{JoblyError, JoblyResult};
use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod};
use tokio_postgres::NoTls;

/// Create a connection pool from database settings.
///
/// # Example
///
/// ```ignore
/// let settings = jobly::Settings::from_env()?;
/// let pool = jobly::create_pool(&settings.database)?;
/// let client = pool.get().await?;
/// ```
pub fn create_pool(settings: &DatabaseSettings) -> JoblyResult<Pool> {
    create_pool_from_url(&settings.url, settings.max_pool_size)
}

/// Create a connection pool from a database URL and maximum size.
pub fn create_pool_from_url(database_url: &str, max_size: usize) -> JoblyResult<Pool> {
    let pg_config: tokio_postgres::Config = database_url
        .parse()
        .map_err(|e: tokio_postgres::Error| JoblyError::Connection(e.to_string()))?;

    let manager_config = ManagerConfig {
        recycling_method: RecyclingMethod::Fast,
    };
    let mgr = Manager::from_config(pg_config, NoTls, manager_config);
    Pool::builder(mgr)
        .max_size(max_size)
        .build()
        .map_err(|e| JoblyError::Pool(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_url_is_connection_error() {
        let err = create_pool_from_url("postgres://localhost:notaport/jobly", 4).unwrap_err();
        assert!(matches!(err, JoblyError::Connection(_)));
    }
}
