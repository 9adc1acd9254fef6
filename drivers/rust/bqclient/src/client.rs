use crate::config::Config;
use crate::error::Error;
use crate::result::{
    DatasetEntry, DatasetList, QueryRequest, QueryResponse, QueryResult, Table, TableEntry,
    TableList, TableResource,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, trace};

/// How long a `gcloud` token is reused before fetching a new one.
const TOKEN_TTL: Duration = Duration::from_secs(45 * 60);

/// Per-query options.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryOptions {
    /// Validate and estimate the query without running it.
    pub dry_run: bool,
    /// `None` uses the service default (enabled).
    pub use_query_cache: Option<bool>,
    /// Upper bound on rows returned with the first page.
    pub max_results: Option<u32>,
}

impl QueryOptions {
    /// Options for a dry run with the query cache disabled.
    pub fn dry_run() -> Self {
        Self {
            dry_run: true,
            use_query_cache: Some(false),
            max_results: None,
        }
    }

    pub fn use_query_cache(mut self, enabled: bool) -> Self {
        self.use_query_cache = Some(enabled);
        self
    }

    pub fn max_results(mut self, max: u32) -> Self {
        self.max_results = Some(max);
        self
    }
}

struct CachedToken {
    value: String,
    fetched_at: Instant,
}

/// BigQuery REST client.
pub struct Client {
    http: reqwest::Client,
    config: Config,
    token: Mutex<Option<CachedToken>>,
}

impl Client {
    /// Create a client. No request is made until the first call.
    pub fn new(config: Config) -> Result<Self, Error> {
        if config.project.trim().is_empty() {
            return Err(Error::InvalidArgument("project must not be empty".into()));
        }

        let http = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .user_agent(concat!("bqclient/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            config,
            token: Mutex::new(None),
        })
    }

    /// The client's configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run a standard-SQL query and wait for it to complete.
    ///
    /// Only the first page of rows is fetched; `max_results` bounds it while
    /// `QueryResult::total_rows` still reports the full count.
    pub async fn query(&self, sql: &str, options: &QueryOptions) -> Result<QueryResult, Error> {
        let request = QueryRequest {
            query: sql,
            use_legacy_sql: false,
            dry_run: options.dry_run,
            use_query_cache: options.use_query_cache,
            max_results: options.max_results,
            timeout_ms: self.config.poll_wait_ms,
            location: self.config.location.as_deref(),
        };

        debug!(dry_run = options.dry_run, "submitting query");
        let url = self.url(&["projects", &self.config.project, "queries"]);
        let mut response: QueryResponse = self.post(&url, &request).await?;

        if options.dry_run {
            return Ok(response.into_result());
        }

        let started = Instant::now();
        while !response.is_complete() {
            let job = response.job_reference.clone().ok_or_else(|| {
                Error::InvalidArgument("incomplete query response without a job reference".into())
            })?;

            if started.elapsed() >= self.config.job_timeout {
                return Err(Error::Timeout(format!(
                    "job {} did not complete within {:?}",
                    job.job_id, self.config.job_timeout
                )));
            }

            trace!(job_id = %job.job_id, "polling query results");
            let url = self.url(&["projects", &self.config.project, "queries", &job.job_id]);
            let mut params = vec![("timeoutMs", self.config.poll_wait_ms.to_string())];
            if let Some(max) = options.max_results {
                params.push(("maxResults", max.to_string()));
            }
            if let Some(location) = job.location.or_else(|| self.config.location.clone()) {
                params.push(("location", location));
            }
            response = self.get(&url, &params).await?;
        }

        let result = response.into_result();
        debug!(
            job_id = result.job_id.as_deref().unwrap_or(""),
            total_rows = result.total_rows,
            fetched = result.row_count(),
            "query complete"
        );
        Ok(result)
    }

    /// List datasets in the client's project, following pagination.
    pub async fn list_datasets(&self) -> Result<Vec<DatasetEntry>, Error> {
        let url = self.url(&["projects", &self.config.project, "datasets"]);
        let mut entries = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let params = page_params(page_token.take());
            let page: DatasetList = self.get(&url, &params).await?;
            entries.extend(page.datasets.into_iter().map(|d| DatasetEntry {
                project_id: d.dataset_reference.project_id,
                dataset_id: d.dataset_reference.dataset_id,
                location: d.location,
            }));
            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        debug!(count = entries.len(), "listed datasets");
        Ok(entries)
    }

    /// List tables in a dataset, following pagination.
    pub async fn list_tables(&self, dataset: &str) -> Result<Vec<TableEntry>, Error> {
        check_id("dataset", dataset)?;
        let url = self.url(&["projects", &self.config.project, "datasets", dataset, "tables"]);
        let mut entries = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let params = page_params(page_token.take());
            let page: TableList = self.get(&url, &params).await?;
            entries.extend(page.tables.into_iter().map(TableResource::into_entry));
            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        debug!(dataset, count = entries.len(), "listed tables");
        Ok(entries)
    }

    /// Fetch table metadata including its schema.
    pub async fn get_table(&self, dataset: &str, table: &str) -> Result<Table, Error> {
        check_id("dataset", dataset)?;
        check_id("table", table)?;
        let url = self.url(&[
            "projects",
            &self.config.project,
            "datasets",
            dataset,
            "tables",
            table,
        ]);
        let resource: TableResource = self.get(&url, &[]).await?;
        Ok(resource.into_table())
    }

    fn url(&self, segments: &[&str]) -> String {
        build_url(&self.config.api_base, segments)
    }

    async fn bearer(&self) -> Result<String, Error> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            if !self.config.token_source.expires() || token.fetched_at.elapsed() < TOKEN_TTL {
                return Ok(token.value.clone());
            }
        }

        debug!("fetching access token");
        let value = self.config.token_source.fetch().await?;
        *cached = Some(CachedToken {
            value: value.clone(),
            fetched_at: Instant::now(),
        });
        Ok(value)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<T, Error> {
        let token = self.bearer().await?;
        let response = self
            .http
            .get(url)
            .bearer_auth(token)
            .query(params)
            .send()
            .await?;
        decode(response).await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(&self, url: &str, body: &B) -> Result<T, Error> {
        let token = self.bearer().await?;
        let response = self
            .http
            .post(url)
            .bearer_auth(token)
            .json(body)
            .send()
            .await?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, Error> {
    let status = response.status();
    let body = response.text().await?;
    trace!(status = status.as_u16(), bytes = body.len(), "response");

    if !status.is_success() {
        return Err(Error::from_response(status.as_u16(), &body));
    }
    Ok(serde_json::from_str(&body)?)
}

fn page_params(page_token: Option<String>) -> Vec<(&'static str, String)> {
    page_token
        .map(|token| vec![("pageToken", token)])
        .unwrap_or_default()
}

/// Dataset and table ids are letters, digits, underscores and (for tables)
/// dashes; reject anything that would escape the URL path segment.
fn check_id(kind: &str, id: &str) -> Result<(), Error> {
    if id.is_empty() || id.contains(['/', '?', '#']) {
        return Err(Error::InvalidArgument(format!("invalid {} id: {:?}", kind, id)));
    }
    Ok(())
}

fn build_url(base: &str, segments: &[&str]) -> String {
    let mut url = base.trim_end_matches('/').to_string();
    for segment in segments {
        url.push('/');
        url.push_str(segment);
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::TokenSource;
    use serde_json::json;

    #[test]
    fn test_new_rejects_empty_project() {
        let config = Config::builder()
            .token_source(TokenSource::Static("t".into()))
            .build();
        let err = Client::new(config).err().unwrap();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn test_url_building() {
        let config = Config::builder()
            .project("proj")
            .token_source(TokenSource::Static("t".into()))
            .api_base("http://localhost:9050/bigquery/v2/")
            .build();
        let client = Client::new(config).unwrap();
        assert_eq!(
            client.url(&["projects", "proj", "datasets", "sales", "tables"]),
            "http://localhost:9050/bigquery/v2/projects/proj/datasets/sales/tables"
        );
    }

    #[test]
    fn test_check_id() {
        assert!(check_id("dataset", "sales_2024").is_ok());
        assert!(check_id("table", "events-raw").is_ok());
        assert!(check_id("dataset", "").is_err());
        assert!(check_id("table", "a/b").is_err());
    }

    #[test]
    fn test_query_request_body() {
        let request = QueryRequest {
            query: "SELECT 1",
            use_legacy_sql: false,
            dry_run: true,
            use_query_cache: Some(false),
            max_results: None,
            timeout_ms: 10_000,
            location: Some("EU"),
        };
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(
            body,
            json!({
                "query": "SELECT 1",
                "useLegacySql": false,
                "dryRun": true,
                "useQueryCache": false,
                "timeoutMs": 10000,
                "location": "EU"
            })
        );
    }

    #[test]
    fn test_query_options() {
        let opts = QueryOptions::dry_run();
        assert!(opts.dry_run);
        assert_eq!(opts.use_query_cache, Some(false));

        let opts = QueryOptions::default().max_results(100).use_query_cache(true);
        assert!(!opts.dry_run);
        assert_eq!(opts.max_results, Some(100));
        assert_eq!(opts.use_query_cache, Some(true));
    }

    #[test]
    fn test_page_params() {
        assert!(page_params(None).is_empty());
        assert_eq!(page_params(Some("abc".into())), vec![("pageToken", "abc".to_string())]);
    }

    #[tokio::test]
    async fn test_static_token_is_cached() {
        let config = Config::builder()
            .project("p")
            .token_source(TokenSource::Static("ya29.static".into()))
            .build();
        let client = Client::new(config).unwrap();
        assert_eq!(client.bearer().await.unwrap(), "ya29.static");
        assert_eq!(client.bearer().await.unwrap(), "ya29.static");
        assert!(client.token.lock().await.is_some());
    }
}
