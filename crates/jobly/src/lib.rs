//! # jobly
//!
//! Company and job record access for PostgreSQL.
//!
//! ## Features
//!
//! - **Partial updates**: [`sql_for_partial_update`] turns whichever fields a
//!   caller supplied into a parameterized `SET` list
//! - **Filtered search**: per-entity filters build an optional, AND-joined
//!   `WHERE` clause whose placeholders are numbered for you
//! - **Transaction-friendly**: every record operation takes a `GenericClient`
//! - **Not-found is an error**: updating or deleting a missing key fails
//!   instead of silently doing nothing
//!
//! ## Example
//!
//! ```ignore
//! use jobly::models::job::{self, JobFilter};
//! use jobly::FieldValues;
//!
//! let filter = JobFilter { min_salary: Some(1500), has_equity: Some(true), title: None };
//! let listings = job::find_all(&client, Some(&filter)).await?;
//!
//! let patch = FieldValues::new().set("salary", 50000).set("equity", "0.55");
//! let updated = job::update(&client, listings[0].id, &patch).await?;
//! ```

pub mod clause;
pub mod client;
pub mod config;
pub mod error;
pub mod filter;
pub mod models;
pub mod partial_update;
pub mod query;
pub mod row;
pub mod value;

pub use clause::ClauseFragment;
pub use client::GenericClient;
pub use config::{DatabaseConfig, JoblyConfig};
pub use error::{JoblyError, JoblyResult};
pub use filter::{CompareOp, FilterBuilder, Predicate};
pub use partial_update::{
    ColumnAliases, FieldValues, sql_for_partial_update, sql_for_partial_update_with_offset,
};
pub use query::{Query, query};
pub use row::{FromRow, RowExt};
pub use value::SqlValue;

#[cfg(feature = "pool")]
pub mod pool;

#[cfg(feature = "pool")]
pub use pool::{create_pool, create_pool_from, create_pool_with_config};

#[cfg(feature = "migrate")]
pub mod migrate;
