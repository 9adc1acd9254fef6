use std::time::Duration;

use crate::auth::TokenSource;

/// Default REST endpoint.
pub const DEFAULT_API_BASE: &str = "https://bigquery.googleapis.com/bigquery/v2";

/// Configuration options for the BigQuery client.
#[derive(Clone, Debug)]
pub struct Config {
    /// Project that owns query jobs and is used to resolve unqualified
    /// dataset references.
    pub project: String,

    /// Job location (e.g. `US`, `europe-west1`). `None` lets the service pick.
    pub location: Option<String>,

    /// REST endpoint, overridable for emulators and tests.
    pub api_base: String,

    /// Where access tokens come from.
    pub token_source: TokenSource,

    /// Connection timeout.
    pub connect_timeout: Duration,

    /// Per-request timeout.
    pub request_timeout: Duration,

    /// Upper bound on waiting for a query job to complete.
    pub job_timeout: Duration,

    /// Server-side wait per `getQueryResults` poll, in milliseconds.
    pub poll_wait_ms: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            project: String::new(),
            location: None,
            api_base: DEFAULT_API_BASE.to_string(),
            token_source: TokenSource::from_env(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(60),
            job_timeout: Duration::from_secs(600),
            poll_wait_ms: 10_000,
        }
    }
}

impl Config {
    /// Create a new Config builder.
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for Config.
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the billing/default project.
    pub fn project(mut self, project: impl Into<String>) -> Self {
        self.config.project = project.into();
        self
    }

    /// Set the job location.
    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.config.location = Some(location.into());
        self
    }

    /// Set the REST endpoint.
    pub fn api_base(mut self, base: impl Into<String>) -> Self {
        self.config.api_base = base.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the token source.
    pub fn token_source(mut self, source: TokenSource) -> Self {
        self.config.token_source = source;
        self
    }

    /// Set connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Set per-request timeout.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    /// Set the job completion timeout.
    pub fn job_timeout(mut self, timeout: Duration) -> Self {
        self.config.job_timeout = timeout;
        self
    }

    /// Set the server-side wait per poll in milliseconds.
    pub fn poll_wait_ms(mut self, wait: u32) -> Self {
        self.config.poll_wait_ms = wait;
        self
    }

    /// Build the Config.
    pub fn build(self) -> Config {
        self.config
    }
}
