//! Transport errors.
//!
//! A failed [`Fetch`](crate::Fetch) ends in exactly one [`Error`]. Failures
//! that came back as an HTTP response keep their status, see
//! [`Error::status`].

use std::time::Duration;

/// Result type alias for sf-client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// A failed page fetch.
#[derive(Debug, thiserror::Error)]
#[error("{kind}")]
pub struct Error {
    pub kind: ErrorKind,
    /// Lower-level cause (reqwest, url parsing), when there is one.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl Error {
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind, source: None }
    }

    pub fn with_source(
        kind: ErrorKind,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            source: Some(Box::new(source)),
        }
    }

    /// HTTP status the server answered with. `None` when no response arrived.
    pub fn status(&self) -> Option<u16> {
        match &self.kind {
            ErrorKind::Status { status, .. } | ErrorKind::SalesforceApi { status, .. } => {
                Some(*status)
            }
            ErrorKind::RateLimited { .. } => Some(429),
            ErrorKind::Unauthorized(_) => Some(401),
            ErrorKind::Forbidden(_) => Some(403),
            ErrorKind::NotFound(_) => Some(404),
            _ => None,
        }
    }

    /// Salesforce `errorCode` from a structured error body, e.g. `MALFORMED_QUERY`.
    pub fn error_code(&self) -> Option<&str> {
        match &self.kind {
            ErrorKind::SalesforceApi { error_code, .. } => Some(error_code),
            _ => None,
        }
    }

    /// Wait the server asked for in `Retry-After` on a 429.
    pub fn retry_after(&self) -> Option<Duration> {
        match &self.kind {
            ErrorKind::RateLimited { retry_after } => *retry_after,
            _ => None,
        }
    }

    /// The access token was rejected (expired or revoked session).
    pub fn is_session_invalid(&self) -> bool {
        matches!(self.kind, ErrorKind::Unauthorized(_))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    /// Non-success response without a Salesforce error body.
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// HTTP 429, with the server's `Retry-After` when it sent one.
    #[error("Rate limited{}", retry_after_suffix(*retry_after))]
    RateLimited { retry_after: Option<Duration> },

    /// HTTP 401.
    #[error("Session rejected: {0}")]
    Unauthorized(String),

    /// HTTP 403.
    #[error("Access denied: {0}")]
    Forbidden(String),

    /// HTTP 404, typically an expired query locator.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Non-success response carrying a Salesforce `[{errorCode, message}]` body.
    #[error("Salesforce API error ({status}): {error_code} - {message}")]
    SalesforceApi {
        status: u16,
        error_code: String,
        message: String,
        fields: Vec<String>,
    },

    #[error("Request timeout")]
    Timeout,

    #[error("Connection error: {0}")]
    Connection(String),

    /// The response started but its body could not be read.
    #[error("Response body error: {0}")]
    Body(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

fn retry_after_suffix(retry_after: Option<Duration>) -> String {
    retry_after
        .map(|d| format!(", retry after {}s", d.as_secs()))
        .unwrap_or_default()
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            ErrorKind::Timeout
        } else if err.is_connect() {
            ErrorKind::Connection(err.to_string())
        } else if err.is_body() || err.is_decode() {
            ErrorKind::Body(err.to_string())
        } else if let Some(status) = err.status() {
            ErrorKind::Status {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            ErrorKind::Other(err.to_string())
        };

        Error::with_source(kind, err)
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::with_source(ErrorKind::InvalidUrl(err.to_string()), err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_for_response_failures() {
        let cases: Vec<(ErrorKind, Option<u16>)> = vec![
            (
                ErrorKind::Status {
                    status: 502,
                    message: "Bad Gateway".into(),
                },
                Some(502),
            ),
            (ErrorKind::RateLimited { retry_after: None }, Some(429)),
            (ErrorKind::Unauthorized("INVALID_SESSION_ID".into()), Some(401)),
            (ErrorKind::Forbidden("API_DISABLED_FOR_ORG".into()), Some(403)),
            (ErrorKind::NotFound("locator".into()), Some(404)),
            (
                ErrorKind::SalesforceApi {
                    status: 400,
                    error_code: "INVALID_QUERY_LOCATOR".into(),
                    message: "invalid query locator".into(),
                    fields: vec![],
                },
                Some(400),
            ),
            (ErrorKind::Timeout, None),
            (ErrorKind::Connection("refused".into()), None),
            (ErrorKind::Body("truncated".into()), None),
            (ErrorKind::InvalidUrl("empty host".into()), None),
        ];

        for (kind, expected) in cases {
            let label = kind.to_string();
            assert_eq!(Error::new(kind).status(), expected, "{label}");
        }
    }

    #[test]
    fn test_error_code_only_for_api_errors() {
        let err = Error::new(ErrorKind::SalesforceApi {
            status: 400,
            error_code: "MALFORMED_QUERY".into(),
            message: "unexpected token: FORM".into(),
            fields: vec![],
        });
        assert_eq!(err.error_code(), Some("MALFORMED_QUERY"));
        assert_eq!(
            err.to_string(),
            "Salesforce API error (400): MALFORMED_QUERY - unexpected token: FORM"
        );

        assert_eq!(Error::new(ErrorKind::Timeout).error_code(), None);
    }

    #[test]
    fn test_rate_limited_display_and_wait() {
        let err = Error::new(ErrorKind::RateLimited {
            retry_after: Some(Duration::from_secs(30)),
        });
        assert_eq!(err.retry_after(), Some(Duration::from_secs(30)));
        assert_eq!(err.to_string(), "Rate limited, retry after 30s");

        let err = Error::new(ErrorKind::RateLimited { retry_after: None });
        assert_eq!(err.retry_after(), None);
        assert_eq!(err.to_string(), "Rate limited");
    }

    #[test]
    fn test_session_invalid() {
        assert!(Error::new(ErrorKind::Unauthorized("expired".into())).is_session_invalid());
        assert!(!Error::new(ErrorKind::Forbidden("no access".into())).is_session_invalid());
    }

    #[test]
    fn test_source_chain() {
        let err = Error::with_source(
            ErrorKind::Body("connection closed mid-body".into()),
            std::io::Error::other("socket closed"),
        );
        let source = std::error::Error::source(&err).unwrap();
        assert_eq!(source.to_string(), "socket closed");
        assert_eq!(err.to_string(), "Response body error: connection closed mid-body");
    }

    #[test]
    fn test_from_url_parse_error() {
        let url_err = url::Url::parse("not a url").unwrap_err();
        let err: Error = url_err.into();
        assert!(matches!(err.kind, ErrorKind::InvalidUrl(_)));
        assert!(err.source.is_some());
        assert_eq!(err.status(), None);
    }
}
