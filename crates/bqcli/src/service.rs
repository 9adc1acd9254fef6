//! The query-service capability the shell is written against.
//!
//! The REPL, the dry-run validator and the meta-commands only ever talk to a
//! [`QueryService`]. [`crate::bigquery::BigQueryService`] implements it over
//! the REST API; tests plug in a mock.

use serde_json::Value;
use thiserror::Error;

/// Options for a single query submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryOptions {
    pub dry_run: bool,
    pub use_query_cache: bool,
    /// Rows to fetch; `None` leaves it to the service.
    pub max_results: Option<u32>,
}

impl QueryOptions {
    /// Validation-only submission that bypasses the query cache.
    pub fn dry_run() -> Self {
        Self {
            dry_run: true,
            use_query_cache: false,
            max_results: None,
        }
    }

    /// Regular execution fetching at most `cap` rows.
    pub fn capped(cap: u32) -> Self {
        Self {
            dry_run: false,
            use_query_cache: true,
            max_results: Some(cap),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub field_type: String,
}

/// Tabular query result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowSet {
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<Value>>,
    /// Rows matched by the query; may exceed `rows.len()`.
    pub total_rows: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSummary {
    pub table_id: String,
    pub partitioning_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldInfo {
    pub name: String,
    pub field_type: String,
    pub mode: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDetail {
    /// `project:dataset.table`
    pub full_table_id: String,
    pub fields: Vec<FieldInfo>,
}

/// One structured error entry reported by the service.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorEntry {
    pub message: String,
    pub reason: Option<String>,
    pub location: Option<String>,
}

impl ErrorEntry {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Error)]
pub enum ServiceError {
    /// The service rejected the request (invalid query, missing table...).
    #[error("{message}")]
    Rejected {
        message: String,
        errors: Vec<ErrorEntry>,
    },

    /// The request never got a service verdict (network, auth, decoding).
    #[error("{0}")]
    Transport(String),
}

impl ServiceError {
    pub fn rejected(message: impl Into<String>, errors: Vec<ErrorEntry>) -> Self {
        ServiceError::Rejected {
            message: message.into(),
            errors,
        }
    }

    pub fn errors(&self) -> &[ErrorEntry] {
        match self {
            ServiceError::Rejected { errors, .. } => errors,
            ServiceError::Transport(_) => &[],
        }
    }

    /// Message of the first structured entry, or the display text when the
    /// error carries none.
    pub fn first_message(&self) -> String {
        self.errors()
            .first()
            .map(|e| e.message.clone())
            .unwrap_or_else(|| self.to_string())
    }
}

/// Blocking query-service capability.
pub trait QueryService {
    fn query(&self, sql: &str, options: &QueryOptions) -> Result<RowSet, ServiceError>;

    fn list_datasets(&self) -> Result<Vec<String>, ServiceError>;

    fn list_tables(&self, dataset: &str) -> Result<Vec<TableSummary>, ServiceError>;

    fn get_table(&self, dataset: &str, table: &str) -> Result<TableDetail, ServiceError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_message_prefers_entries() {
        let err = ServiceError::rejected(
            "Query error",
            vec![
                ErrorEntry::new("Unrecognized name: foo at [1:8]"),
                ErrorEntry::new("second"),
            ],
        );
        assert_eq!(err.first_message(), "Unrecognized name: foo at [1:8]");
        assert_eq!(err.to_string(), "Query error");
    }

    #[test]
    fn test_first_message_falls_back_to_display() {
        let err = ServiceError::Transport("connection refused".into());
        assert!(err.errors().is_empty());
        assert_eq!(err.first_message(), "connection refused");

        let err = ServiceError::rejected("Access Denied", Vec::new());
        assert_eq!(err.first_message(), "Access Denied");
    }

    #[test]
    fn test_query_options() {
        let dry = QueryOptions::dry_run();
        assert!(dry.dry_run);
        assert!(!dry.use_query_cache);

        let run = QueryOptions::capped(100);
        assert!(!run.dry_run);
        assert_eq!(run.max_results, Some(100));
    }
}
