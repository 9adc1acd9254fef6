#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;

use bqcli::service::{
    Column, ErrorEntry, FieldInfo, QueryOptions, QueryService, RowSet, ServiceError, TableDetail,
    TableSummary,
};
use serde_json::{json, Value};

/// In-memory stand-in for the query service. Records every call.
#[derive(Default)]
pub struct MockService {
    pub datasets: Vec<String>,
    pub tables: HashMap<String, Vec<TableSummary>>,
    pub details: HashMap<(String, String), TableDetail>,
    pub rows: RowSet,
    /// Reject every query with these entries.
    pub reject: Option<Vec<ErrorEntry>>,
    /// Fail every query without reaching the service.
    pub transport: Option<String>,
    pub calls: RefCell<Vec<String>>,
    pub query_options: RefCell<Vec<QueryOptions>>,
}

fn not_found(what: &str) -> ServiceError {
    let message = format!("Not found: {}", what);
    ServiceError::rejected(
        message.clone(),
        vec![ErrorEntry {
            message,
            reason: Some("notFound".into()),
            location: None,
        }],
    )
}

impl MockService {
    /// Two datasets; `sales` holds a partitioned `orders` table and an
    /// unpartitioned `events` table.
    pub fn catalog() -> Self {
        let mut tables = HashMap::new();
        tables.insert(
            "sales".to_string(),
            vec![
                TableSummary {
                    table_id: "orders".into(),
                    partitioning_type: Some("DAY".into()),
                },
                TableSummary {
                    table_id: "events".into(),
                    partitioning_type: None,
                },
            ],
        );
        tables.insert("analytics".to_string(), Vec::new());

        let mut details = HashMap::new();
        details.insert(
            ("sales".to_string(), "orders".to_string()),
            TableDetail {
                full_table_id: "mock-project:sales.orders".into(),
                fields: vec![
                    FieldInfo {
                        name: "order_id".into(),
                        field_type: "INTEGER".into(),
                        mode: "REQUIRED".into(),
                        description: Some("primary key".into()),
                    },
                    FieldInfo {
                        name: "note".into(),
                        field_type: "STRING".into(),
                        mode: "NULLABLE".into(),
                        description: None,
                    },
                ],
            },
        );

        Self {
            datasets: vec!["analytics".into(), "sales".into()],
            tables,
            details,
            ..Default::default()
        }
    }

    /// `total_rows` matched, of which `fetched` rows are returned.
    pub fn with_rows(total_rows: u64, fetched: usize) -> Self {
        let rows = (0..fetched)
            .map(|i| vec![json!(format!("word{}", i)), json!(i.to_string())])
            .collect::<Vec<Vec<Value>>>();
        Self {
            rows: RowSet {
                columns: vec![
                    Column {
                        name: "word".into(),
                        field_type: "STRING".into(),
                    },
                    Column {
                        name: "word_count".into(),
                        field_type: "INTEGER".into(),
                    },
                ],
                rows,
                total_rows,
            },
            ..Default::default()
        }
    }

    pub fn rejecting(message: &str) -> Self {
        Self {
            reject: Some(vec![
                ErrorEntry {
                    message: message.to_string(),
                    reason: Some("invalidQuery".into()),
                    location: Some("q".into()),
                },
                ErrorEntry::new("a second, less useful entry"),
            ]),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn record(&self, call: String) {
        self.calls.borrow_mut().push(call);
    }
}

impl QueryService for MockService {
    fn query(&self, sql: &str, options: &QueryOptions) -> Result<RowSet, ServiceError> {
        self.record(format!("query:{}", sql));
        self.query_options.borrow_mut().push(options.clone());

        if let Some(message) = &self.transport {
            return Err(ServiceError::Transport(message.clone()));
        }
        if let Some(errors) = &self.reject {
            return Err(ServiceError::rejected("Query rejected", errors.clone()));
        }
        if options.dry_run {
            return Ok(RowSet {
                columns: self.rows.columns.clone(),
                ..Default::default()
            });
        }
        Ok(self.rows.clone())
    }

    fn list_datasets(&self) -> Result<Vec<String>, ServiceError> {
        self.record("list_datasets".into());
        Ok(self.datasets.clone())
    }

    fn list_tables(&self, dataset: &str) -> Result<Vec<TableSummary>, ServiceError> {
        self.record(format!("list_tables:{}", dataset));
        self.tables
            .get(dataset)
            .cloned()
            .ok_or_else(|| not_found(&format!("Dataset mock-project:{}", dataset)))
    }

    fn get_table(&self, dataset: &str, table: &str) -> Result<TableDetail, ServiceError> {
        self.record(format!("get_table:{}.{}", dataset, table));
        self.details
            .get(&(dataset.to_string(), table.to_string()))
            .cloned()
            .ok_or_else(|| not_found(&format!("Table mock-project:{}.{}", dataset, table)))
    }
}
