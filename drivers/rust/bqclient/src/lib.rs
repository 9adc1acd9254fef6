//! # bqclient
//!
//! A small async client for the BigQuery REST API (v2), covering what an
//! interactive SQL shell needs: synchronous queries (including dry runs),
//! dataset and table listing, and table metadata.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bqclient::{Client, Config, QueryOptions};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), bqclient::Error> {
//!     let client = Client::new(Config::builder().project("my-project").build())?;
//!
//!     let result = client
//!         .query("SELECT 1 AS one", &QueryOptions::default().max_results(10))
//!         .await?;
//!     for row in &result.rows {
//!         println!("{:?}", row);
//!     }
//!     Ok(())
//! }
//! ```

mod auth;
mod client;
mod config;
mod error;
mod result;

pub use auth::{default_project, TokenSource};
pub use client::{Client, QueryOptions};
pub use config::{Config, ConfigBuilder};
pub use error::{Error, ErrorProto};
pub use result::{DatasetEntry, Field, QueryResult, Table, TableEntry};
