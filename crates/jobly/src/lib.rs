//! # jobly
//!
//! Postgres repositories for a small job board: companies, jobs, users and
//! their applications.
//!
//! ## Features
//!
//! - **Dynamic filters**: caller-supplied filter sets compile to parameterized
//!   `WHERE` predicates from fixed per-entity tables (`sql::filter`)
//! - **Partial updates**: any non-empty field set compiles to a `SET` clause with
//!   API names mapped to columns (`sql::update`)
//! - **Values never touch SQL text**: every caller value is bound to a `$n` placeholder
//! - **Transaction-friendly**: pass a transaction anywhere a `GenericClient` is expected
//! - **Statement logging**: wrap any client in `TracingClient`
//!
//! ## Example
//!
//! ```ignore
//! use jobly::{FilterSet, Job, JobUpdate, TracingClient};
//!
//! let conn = TracingClient::new(&client);
//!
//! let jobs = Job::find_all(&conn, &FilterSet::new().with("title", "engineer")).await?;
//!
//! let job = Job::update(&conn, jobs[0].id, &JobUpdate {
//!     salary: Some(Some(120_000)),
//!     ..Default::default()
//! }).await?;
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod ident;
pub mod migrate;
pub mod models;
pub mod row;
pub mod sql;
pub mod trace;
pub mod validate;

pub use client::GenericClient;
pub use config::{DatabaseSettings, Settings, SqlLogSettings};
pub use error::{JoblyError, JoblyResult};
pub use ident::{ColumnMap, Ident};
pub use models::{
    Company, CompanyUpdate, Job, JobDetail, JobListing, JobUpdate, NewJob, User, UserDetail,
    UserUpdate,
};
pub use row::{FromRow, RowExt};
pub use sql::{
    FilterSet, FilterValue, Query, SetClause, SqlValue, UpdateSet, WhereClause, query,
    sql_for_partial_update,
};
pub use trace::{QueryType, TracingClient};

#[cfg(feature = "pool")]
pub mod pool;

#[cfg(feature = "pool")]
pub use pool::{create_pool, create_pool_from_url};
