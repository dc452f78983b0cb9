//! # sf-client
//!
//! Transport layer for Salesforce query paging.
//!
//! This crate provides:
//! - The [`Fetch`] capability: "given a URL, return the response bytes"
//! - [`fetch_fn`], an adapter turning an async closure into a [`Fetch`]
//! - [`SfHttpClient`], a reqwest-backed [`Fetch`] with bearer authentication,
//!   compression and Salesforce error mapping
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      sf-query                               │
//! │  - Builds query URLs, drives the page loop                  │
//! └─────────────────────────────────────────────────────────────┘
//!                              │  Fetch::fetch(url)
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │              SfHttpClient  /  fetch_fn(closure)             │
//! │  - One GET per call, no retry                               │
//! │  - Maps HTTP failures to ErrorKind                          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use busbar_sf_client::{ClientConfig, Fetch, SfHttpClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), busbar_sf_client::Error> {
//!     let client = SfHttpClient::new(ClientConfig::default())?
//!         .with_access_token("00D...!AQ...");
//!
//!     let body = client
//!         .fetch("https://myorg.my.salesforce.com/services/data/v62.0/limits")
//!         .await?;
//!     println!("{} bytes", body.len());
//!     Ok(())
//! }
//! ```

mod client;
mod config;
mod error;
mod fetch;

pub use client::SfHttpClient;
pub use config::{ClientConfig, ClientConfigBuilder};
pub use error::{Error, ErrorKind, Result};
pub use fetch::{fetch_fn, Fetch, FetchFuture, FnFetcher};

/// Default Salesforce API version, as it appears in REST paths.
pub const DEFAULT_API_VERSION: &str = "v62.0";

/// User-Agent string for the client
pub const USER_AGENT: &str = concat!("busbar-sf-pager/", env!("CARGO_PKG_VERSION"));
