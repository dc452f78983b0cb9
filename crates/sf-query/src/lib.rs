//! # sf-query
//!
//! Paged SOQL query execution against the Salesforce REST and Tooling query
//! resources.
//!
//! - **Options** - compose the request URL from ordered mutators
//! - **Records** - split each raw record into `attributes` metadata and fields
//! - **Pager** - follow `nextRecordsUrl` until done, stopped, or failed
//!
//! The network is reached only through an injected
//! [`busbar_sf_client::Fetch`]; this crate never opens a connection itself.
//!
//! ## Example
//!
//! ```rust,ignore
//! use busbar_sf_client::{ClientConfig, SfHttpClient};
//! use busbar_sf_query::{all, eager, fetcher, instance_url, qs};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let http = SfHttpClient::new(ClientConfig::default())?
//!         .with_access_token("00D...!AQ...");
//!
//!     let records = eager([
//!         instance_url("https://myorg.my.salesforce.com"),
//!         qs("SELECT Id, Name FROM Account"),
//!         all(),
//!         fetcher(http),
//!     ])
//!     .await?;
//!
//!     for record in &records {
//!         println!("{} {:?}", record.type_name(), record.get("Name"));
//!     }
//!     Ok(())
//! }
//! ```

mod error;
mod options;
mod page;
mod pager;
mod record;

// Error types
pub use error::{Error, ErrorKind, Result};

// Configuration and mutators
pub use options::{
    all, api_version, fetcher, instance_url, max_pages, qs, tail, tooling, QueryCommand,
    QueryOption, QueryOptions, QueryOptionsBuilder, DEFAULT_COMMAND, SERVICES_DATA_PATH,
};

// Wire page
pub use page::PageResult;

// Page loop
pub use pager::{eager, query, Page, PageControl, Pager};

// Records
pub use record::{normalize_records, Attributes, NormalizeError, Record, ATTRIBUTES_KEY};

// Re-export sf-client types that users might need
pub use busbar_sf_client::{fetch_fn, Fetch, DEFAULT_API_VERSION};
