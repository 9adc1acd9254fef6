use serde::Deserialize;
use thiserror::Error;

/// Error type for BigQuery operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Transport-level HTTP failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with an error status.
    #[error("BigQuery error ({status}): {message}")]
    Api {
        status: u16,
        message: String,
        errors: Vec<ErrorProto>,
    },

    /// No usable access token.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Job did not complete in time.
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Invalid client-side argument or configuration.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Structured error entries reported by the service, if any.
    pub fn errors(&self) -> &[ErrorProto] {
        match self {
            Error::Api { errors, .. } => errors,
            _ => &[],
        }
    }

    /// Build an `Api` error from a non-success response body.
    pub(crate) fn from_response(status: u16, body: &str) -> Self {
        match serde_json::from_str::<ErrorEnvelope>(body) {
            Ok(envelope) => Error::Api {
                status,
                message: envelope.error.message,
                errors: envelope.error.errors,
            },
            Err(_) => Error::Api {
                status,
                message: if body.trim().is_empty() {
                    format!("HTTP {}", status)
                } else {
                    body.trim().to_string()
                },
                errors: Vec::new(),
            },
        }
    }
}

/// One entry of the `errors` array in a BigQuery error payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ErrorProto {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    errors: Vec<ErrorProto>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_response_structured() {
        let body = r#"{
            "error": {
                "code": 400,
                "message": "Syntax error: Unexpected end of script at [1:7]",
                "errors": [
                    {
                        "message": "Syntax error: Unexpected end of script at [1:7]",
                        "domain": "global",
                        "reason": "invalidQuery",
                        "location": "q",
                        "locationType": "parameter"
                    }
                ],
                "status": "INVALID_ARGUMENT"
            }
        }"#;
        let err = Error::from_response(400, body);
        assert_eq!(err.errors().len(), 1);
        assert_eq!(err.errors()[0].reason.as_deref(), Some("invalidQuery"));
        assert_eq!(
            err.to_string(),
            "BigQuery error (400): Syntax error: Unexpected end of script at [1:7]"
        );
    }

    #[test]
    fn test_from_response_plain_body() {
        let err = Error::from_response(502, "Bad Gateway\n");
        assert!(err.errors().is_empty());
        assert_eq!(err.to_string(), "BigQuery error (502): Bad Gateway");

        let err = Error::from_response(503, "");
        assert_eq!(err.to_string(), "BigQuery error (503): HTTP 503");
    }

    #[test]
    fn test_not_found() {
        let body = r#"{"error":{"code":404,"message":"Not found: Dataset p:missing","errors":[{"message":"Not found: Dataset p:missing","reason":"notFound"}]}}"#;
        let err = Error::from_response(404, body);
        assert_eq!(err.errors()[0].reason.as_deref(), Some("notFound"));
        assert_eq!(
            err.to_string(),
            "BigQuery error (404): Not found: Dataset p:missing"
        );
        assert!(Error::Auth("no token".into()).errors().is_empty());
    }
}
