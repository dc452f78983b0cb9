//! # busbar-sf-pager
//!
//! Paged SOQL queries for Salesforce with a pluggable transport.
//!
//! ## Crates
//!
//! - **busbar-sf-client** - The `Fetch` capability and a reqwest-backed HTTP client
//! - **busbar-sf-query** - Query options, record normalization and the page loop
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use busbar_sf_pager::{fetcher, instance_url, qs, query, PageControl, SfHttpClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let http = SfHttpClient::default_client()?.with_access_token(token);
//!
//!     query(
//!         |_parent, records| {
//!             for record in records {
//!                 println!("{:?}", record.get("Name"));
//!             }
//!             PageControl::Continue
//!         },
//!         [
//!             instance_url("https://myorg.my.salesforce.com"),
//!             qs("SELECT Id, Name FROM Account"),
//!             fetcher(http),
//!         ],
//!     )
//!     .await?;
//!
//!     Ok(())
//! }
//! ```

// Re-export all crates for convenient access
pub use busbar_sf_client as client;
pub use busbar_sf_query as soql;

// Re-export commonly used types at the top level
pub use busbar_sf_client::{fetch_fn, ClientConfig, Fetch, SfHttpClient};
pub use busbar_sf_query::{
    all, api_version, eager, fetcher, instance_url, max_pages, normalize_records, qs, query, tail,
    tooling, Error, ErrorKind, Page, PageControl, Pager, QueryOption, QueryOptions, Record, Result,
};
