//! Error types for sf-query.

use crate::record::NormalizeError;

/// Result type alias for sf-query operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for sf-query operations.
#[derive(Debug, thiserror::Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional source error.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl Error {
    /// Create a new error with the given kind.
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind, source: None }
    }

    /// Create a new error with the given kind and source.
    pub fn with_source(
        kind: ErrorKind,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            source: Some(Box::new(source)),
        }
    }

    /// Returns true if the fetch capability failed.
    pub fn is_transport(&self) -> bool {
        matches!(self.kind, ErrorKind::Transport(_))
    }

    /// Returns true if a response body did not decode as a page.
    pub fn is_decode(&self) -> bool {
        matches!(self.kind, ErrorKind::Decode(_))
    }

    /// Returns true if a record had a malformed `attributes` block.
    pub fn is_normalize(&self) -> bool {
        matches!(self.kind, ErrorKind::Normalize { .. })
    }

    /// The transport error exactly as the fetcher returned it.
    pub fn transport_error(&self) -> Option<&busbar_sf_client::Error> {
        if !self.is_transport() {
            return None;
        }
        self.source.as_deref()?.downcast_ref()
    }

    /// Take ownership of the transport error.
    pub fn into_transport_error(self) -> Option<busbar_sf_client::Error> {
        if !self.is_transport() {
            return None;
        }
        self.source?
            .downcast::<busbar_sf_client::Error>()
            .ok()
            .map(|err| *err)
    }
}

/// The kind of error that occurred.
#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    /// The fetch capability reported an error; the original error is the
    /// [`Error`] source.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Response bytes are not a query page.
    #[error("Decode error: {0}")]
    Decode(String),

    /// A record in the page could not be normalized.
    #[error("Normalization error in record {index}: {error}")]
    Normalize { index: usize, error: NormalizeError },

    /// The configured page bound was reached before the server reported done.
    #[error("Page limit of {max_pages} exceeded")]
    PageLimitExceeded { max_pages: usize },

    /// Invalid query configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<busbar_sf_client::Error> for Error {
    fn from(err: busbar_sf_client::Error) -> Self {
        Error::with_source(ErrorKind::Transport(err.to_string()), err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::with_source(ErrorKind::Decode(err.to_string()), err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use busbar_sf_client::ErrorKind as ClientErrorKind;

    #[test]
    fn test_transport_error_is_kept_intact() {
        let client_err = busbar_sf_client::Error::new(ClientErrorKind::Status {
            status: 502,
            message: "Bad Gateway".to_string(),
        });
        let err: Error = client_err.into();

        assert!(err.is_transport());
        assert!(!err.is_decode());
        assert!(matches!(
            err.transport_error().map(|e| &e.kind),
            Some(ClientErrorKind::Status { status: 502, .. })
        ));
        assert!(err.to_string().contains("Bad Gateway"));

        let source = std::error::Error::source(&err).unwrap();
        assert_eq!(source.to_string(), "HTTP 502: Bad Gateway");

        let inner = err.into_transport_error().unwrap();
        assert_eq!(inner.status(), Some(502));
    }

    #[test]
    fn test_transport_accessors_ignore_other_kinds() {
        let err = Error::with_source(
            ErrorKind::Config("no fetcher configured".into()),
            busbar_sf_client::Error::new(ClientErrorKind::Timeout),
        );
        assert!(err.transport_error().is_none());
        assert!(err.into_transport_error().is_none());
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: Error = json_err.into();
        assert!(err.is_decode());
        assert!(err.source.is_some());
        assert!(err.transport_error().is_none());
    }

    #[test]
    fn test_error_kind_display_messages() {
        let cases: Vec<(ErrorKind, &str)> = vec![
            (ErrorKind::Decode("EOF".into()), "Decode error: EOF"),
            (
                ErrorKind::Normalize {
                    index: 3,
                    error: NormalizeError::MissingAttributes,
                },
                "Normalization error in record 3",
            ),
            (
                ErrorKind::PageLimitExceeded { max_pages: 10 },
                "Page limit of 10 exceeded",
            ),
            (
                ErrorKind::Config("no fetcher configured".into()),
                "Configuration error: no fetcher configured",
            ),
        ];

        for (kind, expected_substring) in cases {
            let display = kind.to_string();
            assert!(
                display.contains(expected_substring),
                "Expected '{display}' to contain '{expected_substring}'"
            );
        }
    }
}
