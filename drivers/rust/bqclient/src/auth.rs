//! Access-token and default-project discovery.
//!
//! The client never runs an OAuth flow itself. Tokens come either from the
//! environment or from an installed and logged-in `gcloud` CLI.

use std::env;

use tokio::process::Command;
use tracing::debug;

use crate::error::Error;

const TOKEN_ENV_VARS: &[&str] = &["BQCLI_ACCESS_TOKEN", "GOOGLE_OAUTH_ACCESS_TOKEN"];
const PROJECT_ENV_VARS: &[&str] = &["GOOGLE_CLOUD_PROJECT", "CLOUDSDK_CORE_PROJECT"];

/// Where bearer tokens are obtained from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TokenSource {
    /// A fixed token, used as-is for every request.
    Static(String),
    /// `gcloud auth print-access-token`, refreshed periodically.
    Gcloud,
}

impl TokenSource {
    /// Pick a static token from the environment if one is set, otherwise
    /// fall back to `gcloud`.
    pub fn from_env() -> Self {
        TOKEN_ENV_VARS
            .iter()
            .filter_map(|var| env::var(var).ok())
            .map(|token| token.trim().to_string())
            .find(|token| !token.is_empty())
            .map(TokenSource::Static)
            .unwrap_or(TokenSource::Gcloud)
    }

    /// Whether fetched tokens should be refreshed after a while.
    pub(crate) fn expires(&self) -> bool {
        matches!(self, TokenSource::Gcloud)
    }

    pub(crate) async fn fetch(&self) -> Result<String, Error> {
        match self {
            TokenSource::Static(token) => Ok(token.clone()),
            TokenSource::Gcloud => {
                let token = gcloud(&["auth", "print-access-token"])
                    .await
                    .map_err(Error::Auth)?;
                if token.is_empty() {
                    return Err(Error::Auth(
                        "gcloud returned an empty access token; run `gcloud auth login`".into(),
                    ));
                }
                Ok(token)
            }
        }
    }
}

/// Resolve the default project from the environment or the active `gcloud`
/// configuration. Returns `Ok(None)` when nothing is configured.
pub async fn default_project() -> Result<Option<String>, Error> {
    if let Some(project) = PROJECT_ENV_VARS
        .iter()
        .filter_map(|var| env::var(var).ok())
        .map(|p| p.trim().to_string())
        .find(|p| !p.is_empty())
    {
        return Ok(Some(project));
    }

    match gcloud(&["config", "get-value", "project"]).await {
        Ok(project) if !project.is_empty() && project != "(unset)" => Ok(Some(project)),
        Ok(_) => Ok(None),
        Err(msg) => {
            debug!(error = %msg, "gcloud project lookup failed");
            Ok(None)
        }
    }
}

async fn gcloud(args: &[&str]) -> Result<String, String> {
    debug!(?args, "running gcloud");
    let output = Command::new("gcloud")
        .args(args)
        .output()
        .await
        .map_err(|e| format!("failed to run gcloud: {}", e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!("gcloud {} failed: {}", args.join(" "), stderr.trim()));
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_token_is_returned_verbatim() {
        let source = TokenSource::Static("ya29.abc".into());
        assert_eq!(source.fetch().await.unwrap(), "ya29.abc");
        assert!(!source.expires());
    }

    #[test]
    fn test_gcloud_tokens_expire() {
        assert!(TokenSource::Gcloud.expires());
    }
}
