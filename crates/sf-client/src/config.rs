//! HTTP client configuration.

use std::time::Duration;

use crate::error::{Error, ErrorKind, Result};

/// Settings for [`SfHttpClient`](crate::SfHttpClient).
///
/// `timeout` bounds one page fetch end to end, body included.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Whole-request timeout for a single page fetch.
    pub timeout: Duration,
    /// TCP/TLS connect timeout.
    pub connect_timeout: Duration,
    /// How long an idle pooled connection is kept for the next page.
    pub pool_idle_timeout: Duration,
    /// Idle connections kept per host.
    pub pool_max_idle_per_host: usize,
    /// Value of the `User-Agent` header.
    pub user_agent: String,
    /// Advertise and transparently decode gzip/deflate bodies.
    pub accept_compressed: bool,
    /// Emit per-request `tracing` events.
    pub enable_tracing: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            pool_idle_timeout: Duration::from_secs(90),
            pool_max_idle_per_host: 10,
            user_agent: crate::USER_AGENT.to_string(),
            accept_compressed: true,
            enable_tracing: true,
        }
    }
}

impl ClientConfig {
    /// Start from the defaults.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Reject settings reqwest would accept but that can never fetch a page.
    pub fn validate(&self) -> Result<()> {
        if self.timeout.is_zero() {
            return Err(config_error("timeout must be greater than zero"));
        }
        if self.connect_timeout.is_zero() {
            return Err(config_error("connect timeout must be greater than zero"));
        }
        if self.user_agent.trim().is_empty() {
            return Err(config_error("user agent must not be empty"));
        }
        if self.user_agent.chars().any(char::is_control) {
            return Err(config_error("user agent contains control characters"));
        }
        Ok(())
    }
}

fn config_error(message: &str) -> Error {
    Error::new(ErrorKind::Config(message.to_string()))
}

/// Builder for [`ClientConfig`]. Later calls overwrite earlier ones.
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    pub fn with_pool_idle_timeout(mut self, timeout: Duration) -> Self {
        self.config.pool_idle_timeout = timeout;
        self
    }

    pub fn with_pool_max_idle(mut self, max: usize) -> Self {
        self.config.pool_max_idle_per_host = max;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    pub fn with_compression(mut self, enabled: bool) -> Self {
        self.config.accept_compressed = enabled;
        self
    }

    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.config.enable_tracing = enabled;
        self
    }

    /// Validate and return the configuration.
    pub fn build(self) -> Result<ClientConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
