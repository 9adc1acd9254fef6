//! # bqcli
//!
//! Interactive SQL shell for BigQuery.
//!
//! Each buffer is validated with a dry run before it is accepted. Accepted
//! queries run with a row cap and are rendered as psql-style tables.
//! Backslash meta-commands (`\d`, `\d DATASET`, `\d DATASET.TABLE`) inspect
//! datasets and schemas.
//!
//! The shell is written against the [`service::QueryService`] capability;
//! [`bigquery::BigQueryService`] implements it on top of the `bqclient`
//! driver.

pub mod bigquery;
pub mod config;
pub mod helper;
pub mod highlight;
pub mod history;
pub mod keybinding;
pub mod metacmd;
pub mod pager;
pub mod render;
pub mod repl;
pub mod service;
pub mod session;
pub mod validator;
