use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Result of a query execution.
#[derive(Debug, Clone, Default)]
pub struct QueryResult {
    /// Column schema in result order.
    pub schema: Vec<Field>,

    /// Fetched rows; one value per column. Scalars arrive as strings, the
    /// way the REST API encodes them.
    pub rows: Vec<Vec<Value>>,

    /// Total rows matched by the query, which may exceed `rows.len()`.
    pub total_rows: u64,

    /// Job that produced the result (absent for dry runs).
    pub job_id: Option<String>,

    /// Bytes the query processes (or would process, for a dry run).
    pub total_bytes_processed: Option<u64>,

    /// Whether the result came from the query cache.
    pub cache_hit: bool,
}

impl QueryResult {
    /// Number of fetched rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Check if no rows were fetched.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Column names in order.
    pub fn column_names(&self) -> Vec<String> {
        self.schema.iter().map(|f| f.name.clone()).collect()
    }
}

/// A schema field (column).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(rename = "type", default)]
    pub field_type: String,
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<Field>,
}

impl Field {
    /// Field mode; the API omits it for `NULLABLE` columns.
    pub fn mode(&self) -> &str {
        self.mode.as_deref().unwrap_or("NULLABLE")
    }

    pub fn is_repeated(&self) -> bool {
        self.mode() == "REPEATED"
    }

    pub fn is_record(&self) -> bool {
        matches!(self.field_type.as_str(), "RECORD" | "STRUCT")
    }
}

/// Dataset listing entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetEntry {
    pub project_id: String,
    pub dataset_id: String,
    pub location: Option<String>,
}

/// Table listing entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableEntry {
    pub project_id: String,
    pub dataset_id: String,
    pub table_id: String,
    pub table_type: Option<String>,
    /// Time-partitioning type (`DAY`, `HOUR`, `MONTH`, `YEAR`), if any.
    pub partitioning_type: Option<String>,
}

/// Full table metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// `project:dataset.table`
    pub full_table_id: String,
    pub project_id: String,
    pub dataset_id: String,
    pub table_id: String,
    pub table_type: Option<String>,
    pub description: Option<String>,
    pub num_rows: Option<u64>,
    pub partitioning_type: Option<String>,
    pub schema: Vec<Field>,
}

// Wire types

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct QueryRequest<'a> {
    pub query: &'a str,
    pub use_legacy_sql: bool,
    pub dry_run: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_query_cache: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_results: Option<u32>,
    pub timeout_ms: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<&'a str>,
}

/// Shared shape of `jobs.query` and `jobs.getQueryResults` responses.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct QueryResponse {
    #[serde(default)]
    pub schema: Option<TableSchema>,
    #[serde(default)]
    pub job_reference: Option<JobReference>,
    #[serde(default)]
    pub total_rows: Option<String>,
    #[serde(default)]
    pub rows: Option<Vec<TableRow>>,
    #[serde(default)]
    pub job_complete: Option<bool>,
    #[serde(default)]
    pub total_bytes_processed: Option<String>,
    #[serde(default)]
    pub cache_hit: Option<bool>,
}

impl QueryResponse {
    pub fn is_complete(&self) -> bool {
        self.job_complete.unwrap_or(true)
    }

    pub fn into_result(self) -> QueryResult {
        let schema = self.schema.map(|s| s.fields).unwrap_or_default();
        let rows = self
            .rows
            .unwrap_or_default()
            .into_iter()
            .map(|row| decode_row(&schema, row))
            .collect::<Vec<_>>();
        let total_rows = parse_u64(self.total_rows.as_deref()).unwrap_or(rows.len() as u64);

        QueryResult {
            schema,
            rows,
            total_rows,
            job_id: self.job_reference.map(|j| j.job_id),
            total_bytes_processed: parse_u64(self.total_bytes_processed.as_deref()),
            cache_hit: self.cache_hit.unwrap_or(false),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct TableSchema {
    #[serde(default)]
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct JobReference {
    pub job_id: String,
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TableRow {
    #[serde(default)]
    pub f: Vec<TableCell>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TableCell {
    #[serde(default)]
    pub v: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DatasetList {
    #[serde(default)]
    pub datasets: Vec<DatasetListItem>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DatasetListItem {
    pub dataset_reference: DatasetReference,
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DatasetReference {
    pub dataset_id: String,
    #[serde(default)]
    pub project_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TableList {
    #[serde(default)]
    pub tables: Vec<TableResource>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TableReference {
    #[serde(default)]
    pub project_id: String,
    #[serde(default)]
    pub dataset_id: String,
    pub table_id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TimePartitioning {
    #[serde(rename = "type", default)]
    pub partition_type: Option<String>,
}

/// Used for both list items and `tables.get`; list items carry no schema.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TableResource {
    #[serde(default)]
    pub id: Option<String>,
    pub table_reference: TableReference,
    #[serde(rename = "type", default)]
    pub table_type: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub num_rows: Option<String>,
    #[serde(default)]
    pub time_partitioning: Option<TimePartitioning>,
    #[serde(default)]
    pub schema: Option<TableSchema>,
}

impl TableResource {
    fn partitioning_type(&self) -> Option<String> {
        self.time_partitioning
            .as_ref()
            .and_then(|p| p.partition_type.clone())
    }

    pub fn into_entry(self) -> TableEntry {
        let partitioning_type = self.partitioning_type();
        TableEntry {
            project_id: self.table_reference.project_id,
            dataset_id: self.table_reference.dataset_id,
            table_id: self.table_reference.table_id,
            table_type: self.table_type,
            partitioning_type,
        }
    }

    pub fn into_table(self) -> Table {
        let partitioning_type = self.partitioning_type();
        let reference = self.table_reference;
        let full_table_id = self.id.unwrap_or_else(|| {
            format!(
                "{}:{}.{}",
                reference.project_id, reference.dataset_id, reference.table_id
            )
        });

        Table {
            full_table_id,
            project_id: reference.project_id,
            dataset_id: reference.dataset_id,
            table_id: reference.table_id,
            table_type: self.table_type,
            description: self.description,
            num_rows: parse_u64(self.num_rows.as_deref()),
            partitioning_type,
            schema: self.schema.map(|s| s.fields).unwrap_or_default(),
        }
    }
}

fn parse_u64(value: Option<&str>) -> Option<u64> {
    value.and_then(|v| v.parse().ok())
}

fn decode_row(schema: &[Field], row: TableRow) -> Vec<Value> {
    row.f
        .into_iter()
        .enumerate()
        .map(|(i, cell)| decode_value(cell.v, schema.get(i), true))
        .collect()
}

/// Unwrap the `{"f": [{"v": ..}]}` / `[{"v": ..}]` envelopes used for
/// records and repeated fields. Record fields become JSON objects keyed by
/// sub-field name.
fn decode_value(value: Value, field: Option<&Field>, outer: bool) -> Value {
    let Some(field) = field else {
        return value;
    };

    if outer && field.is_repeated() {
        if let Value::Array(items) = value {
            return Value::Array(
                items
                    .into_iter()
                    .map(|item| match item {
                        Value::Object(mut obj) => {
                            let inner = obj.remove("v").unwrap_or(Value::Null);
                            decode_value(inner, Some(field), false)
                        }
                        other => other,
                    })
                    .collect(),
            );
        }
        return value;
    }

    if field.is_record() {
        if let Value::Object(mut obj) = value {
            let cells = match obj.remove("f") {
                Some(Value::Array(cells)) => cells,
                _ => return Value::Object(obj),
            };
            let mut record = Map::new();
            for (i, cell) in cells.into_iter().enumerate() {
                let sub = field.fields.get(i);
                let inner = match cell {
                    Value::Object(mut c) => c.remove("v").unwrap_or(Value::Null),
                    other => other,
                };
                let name = sub
                    .map(|f| f.name.clone())
                    .unwrap_or_else(|| format!("f{}", i));
                record.insert(name, decode_value(inner, sub, true));
            }
            return Value::Object(record);
        }
    }

    value
}
