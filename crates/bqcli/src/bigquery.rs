//! [`QueryService`] over the BigQuery REST API.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use bqclient::{Client, Config as ClientConfig, Error as ClientError, Field, TokenSource};
use tokio::runtime::Runtime;
use tracing::{debug, info};

use crate::config::Settings;
use crate::service::{
    Column, ErrorEntry, FieldInfo, QueryOptions, QueryService, RowSet, ServiceError, TableDetail,
    TableSummary,
};

/// Blocking adapter around the async driver. Owns a current-thread runtime
/// and drives every call to completion with `block_on`.
pub struct BigQueryService {
    runtime: Runtime,
    client: Client,
}

impl BigQueryService {
    /// Resolve the project and build the client. Fails when no project can
    /// be determined.
    pub fn connect(settings: &Settings) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("failed to start the async runtime")?;

        let project = match settings.project.clone() {
            Some(project) => project,
            None => runtime
                .block_on(bqclient::default_project())?
                .ok_or_else(|| {
                    anyhow!(
                        "no project configured; set `project` in config.toml, \
                         GOOGLE_CLOUD_PROJECT, or run `gcloud config set project`"
                    )
                })?,
        };

        let client = Client::new(client_config(settings, &project))?;
        info!(project = %project, "using project");

        Ok(Self { runtime, client })
    }

    pub fn project(&self) -> &str {
        &self.client.config().project
    }
}

impl QueryService for BigQueryService {
    fn query(&self, sql: &str, options: &QueryOptions) -> Result<RowSet, ServiceError> {
        let mut opts = bqclient::QueryOptions::default().use_query_cache(options.use_query_cache);
        opts.dry_run = options.dry_run;
        if let Some(max) = options.max_results {
            opts = opts.max_results(max);
        }

        let result = self
            .runtime
            .block_on(self.client.query(sql, &opts))
            .map_err(service_error)?;

        Ok(RowSet {
            columns: result
                .schema
                .iter()
                .map(|f| Column {
                    name: f.name.clone(),
                    field_type: f.field_type.clone(),
                })
                .collect(),
            rows: result.rows,
            total_rows: result.total_rows,
        })
    }

    fn list_datasets(&self) -> Result<Vec<String>, ServiceError> {
        let datasets = self
            .runtime
            .block_on(self.client.list_datasets())
            .map_err(service_error)?;
        Ok(datasets.into_iter().map(|d| d.dataset_id).collect())
    }

    fn list_tables(&self, dataset: &str) -> Result<Vec<TableSummary>, ServiceError> {
        let tables = self
            .runtime
            .block_on(self.client.list_tables(dataset))
            .map_err(service_error)?;
        Ok(tables
            .into_iter()
            .map(|t| TableSummary {
                table_id: t.table_id,
                partitioning_type: t.partitioning_type,
            })
            .collect())
    }

    fn get_table(&self, dataset: &str, table: &str) -> Result<TableDetail, ServiceError> {
        let table = self
            .runtime
            .block_on(self.client.get_table(dataset, table))
            .map_err(service_error)?;
        Ok(TableDetail {
            full_table_id: table.full_table_id,
            fields: table.schema.iter().map(field_info).collect(),
        })
    }
}

/// Driver configuration for `project`, with overrides from the settings.
fn client_config(settings: &Settings, project: &str) -> ClientConfig {
    let mut builder = ClientConfig::builder().project(project);
    if let Some(location) = &settings.location {
        builder = builder.location(location);
    }
    if let Some(token) = &settings.token {
        builder = builder.token_source(TokenSource::Static(token.clone()));
    }
    if let Some(secs) = settings.request_timeout_secs {
        builder = builder.request_timeout(Duration::from_secs(secs));
    }
    if let Some(secs) = settings.job_timeout_secs {
        builder = builder.job_timeout(Duration::from_secs(secs));
    }
    builder.build()
}

fn field_info(field: &Field) -> FieldInfo {
    FieldInfo {
        name: field.name.clone(),
        field_type: field.field_type.clone(),
        mode: field.mode().to_string(),
        description: field.description.clone(),
    }
}

fn service_error(err: ClientError) -> ServiceError {
    debug!(error = %err, "service call failed");
    match err {
        ClientError::Api {
            message, errors, ..
        } => ServiceError::Rejected {
            message,
            errors: errors
                .into_iter()
                .map(|e| ErrorEntry {
                    message: e.message,
                    reason: e.reason,
                    location: e.location,
                })
                .collect(),
        },
        other => ServiceError::Transport(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bqclient::ErrorProto;

    #[test]
    fn test_api_errors_become_rejections() {
        let err = service_error(ClientError::Api {
            status: 400,
            message: "Syntax error: Unexpected end of script at [1:7]".into(),
            errors: vec![ErrorProto {
                message: "Syntax error: Unexpected end of script at [1:7]".into(),
                reason: Some("invalidQuery".into()),
                location: Some("q".into()),
            }],
        });

        assert_eq!(err.errors().len(), 1);
        assert_eq!(err.errors()[0].reason.as_deref(), Some("invalidQuery"));
        assert_eq!(
            err.first_message(),
            "Syntax error: Unexpected end of script at [1:7]"
        );
    }

    #[test]
    fn test_other_errors_become_transport() {
        let err = service_error(ClientError::Auth("gcloud not found".into()));
        assert!(matches!(err, ServiceError::Transport(_)));
        assert_eq!(err.first_message(), "Authentication error: gcloud not found");
    }

    #[test]
    fn test_client_config_applies_settings() {
        let settings = Settings {
            location: Some("EU".into()),
            token: Some("ya29.fixed".into()),
            request_timeout_secs: Some(5),
            job_timeout_secs: Some(90),
            ..Default::default()
        };
        let config = client_config(&settings, "analytics-prod");

        assert_eq!(config.project, "analytics-prod");
        assert_eq!(config.location.as_deref(), Some("EU"));
        assert_eq!(config.token_source, TokenSource::Static("ya29.fixed".into()));
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.job_timeout, Duration::from_secs(90));
    }

    #[test]
    fn test_client_config_keeps_driver_defaults() {
        let config = client_config(&Settings::default(), "p");
        let defaults = ClientConfig::default();

        assert!(config.location.is_none());
        assert_eq!(config.request_timeout, defaults.request_timeout);
        assert_eq!(config.job_timeout, defaults.job_timeout);
    }

    #[test]
    fn test_field_info_defaults_mode() {
        let field = Field {
            name: "note".into(),
            field_type: "STRING".into(),
            ..Default::default()
        };
        let info = field_info(&field);
        assert_eq!(info.mode, "NULLABLE");
        assert!(info.description.is_none());
    }
}
