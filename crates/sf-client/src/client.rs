//! reqwest-backed implementation of [`Fetch`].
//!
//! ## Security
//!
//! - Access tokens are redacted in Debug output
//! - Error messages taken from response bodies are sanitized

use std::sync::LazyLock;
use std::time::Duration;

use bytes::Bytes;
use serde::Deserialize;
use tracing::{debug, info, instrument};

use crate::config::ClientConfig;
use crate::error::{Error, ErrorKind, Result};
use crate::fetch::{Fetch, FetchFuture};

/// HTTP client that fetches Salesforce REST resources as raw bytes.
///
/// Each call performs exactly one GET. Non-success responses are mapped to
/// [`ErrorKind`] and never retried.
///
/// # Example
///
/// ```rust,ignore
/// use busbar_sf_client::{ClientConfig, SfHttpClient};
///
/// let client = SfHttpClient::new(ClientConfig::default())?
///     .with_access_token(creds.access_token());
/// let body = client.get_bytes(&url).await?;
/// ```
#[derive(Clone)]
pub struct SfHttpClient {
    inner: reqwest::Client,
    config: ClientConfig,
    access_token: Option<String>,
}

impl std::fmt::Debug for SfHttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SfHttpClient")
            .field("config", &self.config)
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "[REDACTED]"),
            )
            .finish_non_exhaustive()
    }
}

impl SfHttpClient {
    /// Create a new HTTP client with the given configuration.
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;

        let inner = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(config.pool_idle_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .user_agent(&config.user_agent)
            .gzip(config.accept_compressed)
            .deflate(config.accept_compressed)
            .build()
            .map_err(|e| Error::with_source(ErrorKind::Config(e.to_string()), e))?;

        Ok(Self {
            inner,
            config,
            access_token: None,
        })
    }

    /// Create a new HTTP client with default configuration.
    pub fn default_client() -> Result<Self> {
        Self::new(ClientConfig::default())
    }

    /// Send `Authorization: Bearer <token>` with every request.
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Get the client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// GET `url` and return the response body.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn get_bytes(&self, url: &str) -> Result<Bytes> {
        let parsed = url::Url::parse(url)?;

        let mut req = self
            .inner
            .get(parsed)
            .header("Accept", "application/json");
        if let Some(ref token) = self.access_token {
            req = req.bearer_auth(token);
        }

        if self.config.enable_tracing {
            debug!(url = %url, "Sending request");
        }

        let response = req.send().await?;
        let status = response.status().as_u16();

        if self.config.enable_tracing {
            let content_length = response.content_length();
            if response.status().is_success() {
                debug!(status, content_length, "Response received");
            } else {
                info!(status, content_length, "Non-success response");
            }
        }

        if response.status().is_success() {
            return response.bytes().await.map_err(Into::into);
        }

        if status == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_secs);
            return Err(Error::new(ErrorKind::RateLimited { retry_after }));
        }

        let body = response.text().await.unwrap_or_default();
        Err(parse_error_response(status, &body))
    }
}

impl Fetch for SfHttpClient {
    fn fetch<'a>(&'a self, url: &'a str) -> FetchFuture<'a> {
        Box::pin(self.get_bytes(url))
    }
}

/// Salesforce error body entry.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SalesforceErrorResponse {
    error_code: String,
    message: String,
    #[serde(default)]
    fields: Option<Vec<String>>,
}

/// Map a non-success status and its body to an error.
fn parse_error_response(status: u16, body: &str) -> Error {
    // Salesforce reports errors as an array of objects
    if let Ok(errors) = serde_json::from_str::<Vec<SalesforceErrorResponse>>(body) {
        if let Some(err) = errors.into_iter().next() {
            return salesforce_error(status, err);
        }
    }

    if let Ok(err) = serde_json::from_str::<SalesforceErrorResponse>(body) {
        return salesforce_error(status, err);
    }

    let sanitized = sanitize_error_message(body);
    let kind = match status {
        401 => ErrorKind::Unauthorized(sanitized),
        403 => ErrorKind::Forbidden(sanitized),
        404 => ErrorKind::NotFound(sanitized),
        _ => ErrorKind::Status {
            status,
            message: sanitized,
        },
    };

    Error::new(kind)
}

fn salesforce_error(status: u16, err: SalesforceErrorResponse) -> Error {
    let message = sanitize_error_message(&err.message);
    let kind = match status {
        401 => ErrorKind::Unauthorized(format!("{}: {}", err.error_code, message)),
        _ => ErrorKind::SalesforceApi {
            status,
            error_code: err.error_code,
            message,
            fields: err.fields.unwrap_or_default(),
        },
    };
    Error::new(kind)
}

static TOKEN_PATTERN: LazyLock<regex_lite::Regex> = LazyLock::new(|| {
    regex_lite::Regex::new(r"00[A-Za-z0-9]{13,}[!][A-Za-z0-9_.]+").expect("token pattern")
});

static SESSION_PATTERN: LazyLock<regex_lite::Regex> =
    LazyLock::new(|| regex_lite::Regex::new(r"sid=[A-Za-z0-9]{20,}").expect("session pattern"));

/// Redact tokens and session ids and cap the length of a message.
fn sanitize_error_message(message: &str) -> String {
    const MAX_LENGTH: usize = 500;

    let sanitized = TOKEN_PATTERN.replace_all(message, "[REDACTED_TOKEN]");
    let mut sanitized = SESSION_PATTERN
        .replace_all(&sanitized, "sid=[REDACTED]")
        .into_owned();

    if sanitized.len() > MAX_LENGTH {
        let cut = (0..=MAX_LENGTH)
            .rev()
            .find(|i| sanitized.is_char_boundary(*i))
            .unwrap_or(0);
        sanitized.truncate(cut);
        sanitized.push_str("...[truncated]");
    }

    sanitized
}
