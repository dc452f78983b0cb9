//! Query configuration and request URL construction.
//!
//! A [`QueryOptions`] starts from named defaults and is shaped by an ordered
//! list of [`QueryOption`] mutators. Each mutator sets exactly one field, so
//! when two mutators target the same field the one applied last wins.
//!
//! ```rust,ignore
//! use busbar_sf_query::{api_version, instance_url, qs, tooling, QueryOptions};
//!
//! let options = QueryOptions::from_options([
//!     instance_url("https://myorg.my.salesforce.com"),
//!     api_version("v61.0"),
//!     tooling(),
//!     qs("SELECT Id, Name FROM ApexClass"),
//! ]);
//! assert_eq!(
//!     options.url(),
//!     "https://myorg.my.salesforce.com/services/data/v61.0/tooling/query?q=SELECT%20Id%2C%20Name%20FROM%20ApexClass",
//! );
//! ```

use std::fmt;
use std::sync::Arc;

use busbar_sf_client::{Fetch, DEFAULT_API_VERSION};

/// Root of the versioned REST resources.
pub const SERVICES_DATA_PATH: &str = "/services/data";

/// Command used when no mutator selects another one.
pub const DEFAULT_COMMAND: QueryCommand = QueryCommand::Query;

/// REST query resource to call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryCommand {
    /// `query`: live records only.
    #[default]
    Query,
    /// `queryAll`: includes soft-deleted and archived records.
    QueryAll,
}

impl QueryCommand {
    /// Path segment for this command.
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryCommand::Query => "query",
            QueryCommand::QueryAll => "queryAll",
        }
    }
}

impl fmt::Display for QueryCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single configuration mutator.
#[derive(Clone)]
pub enum QueryOption {
    /// Use the `queryAll` command.
    All,
    /// Route through the Tooling API (`tooling/` before the command).
    Tooling,
    /// Base URL of the org, e.g. `https://myorg.my.salesforce.com`.
    InstanceUrl(String),
    /// Raw path that replaces the composed `/services/data/...` path.
    /// An empty string clears a previous override.
    Tail(String),
    /// API version segment, used verbatim (e.g. `v62.0`).
    ApiVersion(String),
    /// SOQL text sent as the `q` parameter. An empty string clears it.
    QueryString(String),
    /// The byte-fetching capability.
    Fetcher(Arc<dyn Fetch>),
    /// Upper bound on the number of pages fetched.
    MaxPages(usize),
}

impl fmt::Debug for QueryOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryOption::All => f.write_str("All"),
            QueryOption::Tooling => f.write_str("Tooling"),
            QueryOption::InstanceUrl(url) => f.debug_tuple("InstanceUrl").field(url).finish(),
            QueryOption::Tail(tail) => f.debug_tuple("Tail").field(tail).finish(),
            QueryOption::ApiVersion(v) => f.debug_tuple("ApiVersion").field(v).finish(),
            QueryOption::QueryString(q) => f.debug_tuple("QueryString").field(q).finish(),
            QueryOption::Fetcher(_) => f.write_str("Fetcher(..)"),
            QueryOption::MaxPages(n) => f.debug_tuple("MaxPages").field(n).finish(),
        }
    }
}

/// Select the `queryAll` command.
pub fn all() -> QueryOption {
    QueryOption::All
}

/// Enable tooling mode.
pub fn tooling() -> QueryOption {
    QueryOption::Tooling
}

/// Set the instance URL.
pub fn instance_url(url: impl Into<String>) -> QueryOption {
    QueryOption::InstanceUrl(url.into())
}

/// Override the request path.
pub fn tail(tail: impl Into<String>) -> QueryOption {
    QueryOption::Tail(tail.into())
}

/// Set the API version segment.
pub fn api_version(version: impl Into<String>) -> QueryOption {
    QueryOption::ApiVersion(version.into())
}

/// Set the SOQL query text.
pub fn qs(soql: impl Into<String>) -> QueryOption {
    QueryOption::QueryString(soql.into())
}

/// Set the byte-fetching capability.
pub fn fetcher(fetcher: impl Fetch + 'static) -> QueryOption {
    QueryOption::Fetcher(Arc::new(fetcher))
}

/// Bound the number of pages a single run may fetch.
pub fn max_pages(max: usize) -> QueryOption {
    QueryOption::MaxPages(max)
}

/// Fully resolved query configuration.
///
/// Read-only once built; the pager only borrows it.
#[derive(Clone)]
pub struct QueryOptions {
    api_version: String,
    command: QueryCommand,
    tooling: bool,
    instance_url: String,
    tail: Option<String>,
    query_string: Option<String>,
    max_pages: Option<usize>,
    fetcher: Option<Arc<dyn Fetch>>,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            api_version: DEFAULT_API_VERSION.to_string(),
            command: DEFAULT_COMMAND,
            tooling: false,
            instance_url: String::new(),
            tail: None,
            query_string: None,
            max_pages: None,
            fetcher: None,
        }
    }
}

impl fmt::Debug for QueryOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryOptions")
            .field("api_version", &self.api_version)
            .field("command", &self.command)
            .field("tooling", &self.tooling)
            .field("instance_url", &self.instance_url)
            .field("tail", &self.tail)
            .field("query_string", &self.query_string)
            .field("max_pages", &self.max_pages)
            .field("fetcher", &self.fetcher.as_ref().map(|_| ".."))
            .finish()
    }
}

impl QueryOptions {
    /// Create a new options builder.
    pub fn builder() -> QueryOptionsBuilder {
        QueryOptionsBuilder::default()
    }

    /// Apply `options` in order on top of the defaults.
    pub fn from_options(options: impl IntoIterator<Item = QueryOption>) -> Self {
        options
            .into_iter()
            .fold(Self::default(), |acc, option| acc.apply(option))
    }

    /// Return a copy with one mutator applied.
    pub fn apply(mut self, option: QueryOption) -> Self {
        match option {
            QueryOption::All => self.command = QueryCommand::QueryAll,
            QueryOption::Tooling => self.tooling = true,
            QueryOption::InstanceUrl(url) => self.instance_url = url,
            QueryOption::Tail(tail) => self.tail = Some(tail).filter(|t| !t.is_empty()),
            QueryOption::ApiVersion(version) => self.api_version = version,
            QueryOption::QueryString(q) => self.query_string = Some(q).filter(|q| !q.is_empty()),
            QueryOption::Fetcher(fetcher) => self.fetcher = Some(fetcher),
            QueryOption::MaxPages(max) => self.max_pages = Some(max),
        }
        self
    }

    /// API version segment.
    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    /// Query command.
    pub fn command(&self) -> QueryCommand {
        self.command
    }

    /// Whether the Tooling API namespace is used.
    pub fn is_tooling(&self) -> bool {
        self.tooling
    }

    /// Instance URL.
    pub fn instance_url(&self) -> &str {
        &self.instance_url
    }

    /// Path override, if any.
    pub fn tail(&self) -> Option<&str> {
        self.tail.as_deref()
    }

    /// SOQL text, if any.
    pub fn query_string(&self) -> Option<&str> {
        self.query_string.as_deref()
    }

    /// Page bound, if any.
    pub fn max_pages(&self) -> Option<usize> {
        self.max_pages
    }

    /// The configured fetch capability.
    pub fn fetcher(&self) -> Option<&dyn Fetch> {
        self.fetcher.as_deref()
    }

    /// Path component of the first request.
    ///
    /// The tail override wins when set; otherwise
    /// `/services/data/<version>/[tooling/]<command>`.
    pub fn path(&self) -> String {
        if let Some(ref tail) = self.tail {
            return tail.clone();
        }
        let namespace = if self.tooling { "tooling/" } else { "" };
        format!(
            "{}/{}/{}{}",
            SERVICES_DATA_PATH, self.api_version, namespace, self.command
        )
    }

    /// URL of the first page: `<instanceUrl><path>[?q=<escaped soql>]`.
    pub fn url(&self) -> String {
        let mut url = format!("{}{}", self.instance_url, self.path());
        if let Some(ref soql) = self.query_string {
            url.push_str("?q=");
            url.push_str(&urlencoding::encode(soql));
        }
        url
    }

    /// Absolute URL for a server-supplied continuation path.
    pub fn next_url(&self, next_records_url: &str) -> String {
        format!("{}{}", self.instance_url, next_records_url)
    }
}

impl FromIterator<QueryOption> for QueryOptions {
    fn from_iter<I: IntoIterator<Item = QueryOption>>(iter: I) -> Self {
        Self::from_options(iter)
    }
}

/// Builder for [`QueryOptions`].
///
/// Every method is a named [`QueryOption`]; calls are applied in order.
#[derive(Debug, Default)]
pub struct QueryOptionsBuilder {
    options: QueryOptions,
}

impl QueryOptionsBuilder {
    /// Apply an arbitrary mutator.
    pub fn with_option(mut self, option: QueryOption) -> Self {
        self.options = self.options.apply(option);
        self
    }

    /// Use the `queryAll` command.
    pub fn with_all(self) -> Self {
        self.with_option(all())
    }

    /// Route through the Tooling API.
    pub fn with_tooling(self) -> Self {
        self.with_option(tooling())
    }

    /// Set the instance URL.
    pub fn with_instance_url(self, url: impl Into<String>) -> Self {
        self.with_option(instance_url(url))
    }

    /// Override the request path.
    pub fn with_tail(self, path: impl Into<String>) -> Self {
        self.with_option(tail(path))
    }

    /// Set the API version segment.
    pub fn with_api_version(self, version: impl Into<String>) -> Self {
        self.with_option(api_version(version))
    }

    /// Set the SOQL query text.
    pub fn with_query(self, soql: impl Into<String>) -> Self {
        self.with_option(qs(soql))
    }

    /// Set the fetch capability.
    pub fn with_fetcher(self, f: impl Fetch + 'static) -> Self {
        self.with_option(fetcher(f))
    }

    /// Bound the number of pages.
    pub fn with_max_pages(self, max: usize) -> Self {
        self.with_option(max_pages(max))
    }

    /// Build the options.
    pub fn build(self) -> QueryOptions {
        self.options
    }
}
