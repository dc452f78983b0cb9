//! Wire shape of one query page.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{Error, ErrorKind, Result};
use crate::record::{normalize_indexed, Record};

/// One decoded response from a query resource.
///
/// ```json
/// {
///   "totalSize": 4500,
///   "done": false,
///   "nextRecordsUrl": "/services/data/v62.0/query/01gD0000002HU6KIAW-2000",
///   "records": [ ... ]
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResult {
    /// No further pages remain.
    pub done: bool,
    /// Total number of records matching the query.
    #[serde(default)]
    pub total_size: u64,
    /// Path of the next page, relative to the instance URL.
    #[serde(default)]
    pub next_records_url: Option<String>,
    /// Raw records, in server order. An absent list is an empty page.
    #[serde(default)]
    pub records: Vec<Map<String, Value>>,
}

impl PageResult {
    /// Decode a response body.
    pub fn from_slice(body: &[u8]) -> Result<Self> {
        serde_json::from_slice(body).map_err(Into::into)
    }

    /// Continuation path, if the server supplied a non-empty one.
    pub fn next_locator(&self) -> Option<&str> {
        self.next_records_url.as_deref().filter(|url| !url.is_empty())
    }

    /// Normalize every record in order. The first malformed record fails the
    /// whole page.
    pub fn into_records(self) -> Result<Vec<Record>> {
        normalize_indexed(self.records).map_err(|(index, error)| {
            Error::with_source(
                ErrorKind::Normalize {
                    index,
                    error: error.clone(),
                },
                error,
            )
        })
    }
}
