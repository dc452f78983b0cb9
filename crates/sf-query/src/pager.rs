//! The page loop.
//!
//! [`Pager`] is a two-state machine (`Paging` / `Done`) that fetches one page
//! per [`Pager::next_page`] call. [`query`] drives it with a callback that
//! decides after every page whether to continue; [`eager`] collects every
//! record.
//!
//! Pages are strictly sequential: the next fetch is only issued after the
//! previous page has been handed to the caller. Any transport, decode or
//! normalization failure ends the run and is returned as-is; nothing is
//! retried.

use busbar_sf_client::Fetch;
use tracing::{debug, instrument, warn};

use crate::error::{Error, ErrorKind, Result};
use crate::options::{QueryOption, QueryOptions};
use crate::page::PageResult;
use crate::record::Record;

/// Decision returned by a page callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageControl {
    /// Fetch the next page if the server has one.
    Continue,
    /// Stop now, even if more pages exist.
    Stop,
}

impl PageControl {
    /// Returns true for [`PageControl::Stop`].
    pub fn is_stop(self) -> bool {
        self == PageControl::Stop
    }
}

impl From<bool> for PageControl {
    /// `true` means "get the next page".
    fn from(next: bool) -> Self {
        if next {
            PageControl::Continue
        } else {
            PageControl::Stop
        }
    }
}

/// One normalized page.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// Records in server order.
    pub records: Vec<Record>,
    /// Total number of records matching the query.
    pub total_size: u64,
    /// The server reported this as the last page.
    pub done: bool,
}

#[derive(Debug)]
enum PagerState {
    Paging { locator: Locator },
    Done,
}

/// Where the next fetch goes. Continuation paths are kept as the server sent
/// them and only joined to the instance URL when fetched.
#[derive(Debug)]
enum Locator {
    Query,
    Next(String),
}

impl Locator {
    fn resolve(&self, options: &QueryOptions) -> String {
        match self {
            Locator::Query => options.url(),
            Locator::Next(path) => options.next_url(path),
        }
    }
}

/// Pull-style page iterator over a [`QueryOptions`].
///
/// # Example
///
/// ```rust,ignore
/// let mut pager = Pager::new(&options)?;
/// while let Some(page) = pager.next_page().await? {
///     println!("{} of {}", page.records.len(), page.total_size);
/// }
/// ```
pub struct Pager<'a> {
    options: &'a QueryOptions,
    fetcher: &'a dyn Fetch,
    state: PagerState,
    pages_fetched: usize,
}

impl std::fmt::Debug for Pager<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pager")
            .field("state", &self.state)
            .field("pages_fetched", &self.pages_fetched)
            .finish_non_exhaustive()
    }
}

impl<'a> Pager<'a> {
    /// Start paging at `options.url()`.
    ///
    /// Fails with [`ErrorKind::Config`] when no fetcher is configured.
    pub fn new(options: &'a QueryOptions) -> Result<Self> {
        let fetcher = options
            .fetcher()
            .ok_or_else(|| Error::new(ErrorKind::Config("no fetcher configured".to_string())))?;

        Ok(Self {
            options,
            fetcher,
            state: PagerState::Paging {
                locator: Locator::Query,
            },
            pages_fetched: 0,
        })
    }

    /// No further page will be fetched.
    pub fn is_done(&self) -> bool {
        matches!(self.state, PagerState::Done)
    }

    /// Number of fetches issued so far.
    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    /// URL the next call to [`Pager::next_page`] will fetch.
    pub fn next_url(&self) -> Option<String> {
        match &self.state {
            PagerState::Paging { locator } => Some(locator.resolve(self.options)),
            PagerState::Done => None,
        }
    }

    /// The `nextRecordsUrl` the last page pointed at, as received.
    ///
    /// `None` before the first page and once paging is done.
    pub fn continuation(&self) -> Option<&str> {
        match &self.state {
            PagerState::Paging {
                locator: Locator::Next(path),
            } => Some(path.as_str()),
            _ => None,
        }
    }

    /// Stop paging. Later calls to [`Pager::next_page`] return `None`.
    pub fn stop(&mut self) {
        self.state = PagerState::Done;
    }

    /// Fetch, decode and normalize the next page.
    ///
    /// Returns `Ok(None)` once done. After an error the pager is done.
    pub async fn next_page(&mut self) -> Result<Option<Page>> {
        let locator = match std::mem::replace(&mut self.state, PagerState::Done) {
            PagerState::Paging { locator } => locator,
            PagerState::Done => return Ok(None),
        };

        if let Some(max_pages) = self.options.max_pages() {
            if self.pages_fetched >= max_pages {
                return Err(Error::new(ErrorKind::PageLimitExceeded { max_pages }));
            }
        }

        let url = locator.resolve(self.options);
        let body = self.fetcher.fetch(&url).await.inspect_err(|err| {
            warn!(
                page = self.pages_fetched + 1,
                status = ?err.status(),
                error_code = ?err.error_code(),
                error = %err,
                "Page fetch failed"
            )
        })?;
        self.pages_fetched += 1;

        let result = PageResult::from_slice(&body)?;
        let next = result.next_locator().map(str::to_string);
        let total_size = result.total_size;
        let done = result.done;
        let records = result.into_records()?;

        debug!(
            page = self.pages_fetched,
            records = records.len(),
            total_size,
            done,
            "Fetched query page"
        );

        if !done {
            match next {
                Some(path) => {
                    self.state = PagerState::Paging {
                        locator: Locator::Next(path),
                    }
                }
                None => warn!(
                    page = self.pages_fetched,
                    "Page not marked done but has no nextRecordsUrl, stopping"
                ),
            }
        }

        Ok(Some(Page {
            records,
            total_size,
            done,
        }))
    }
}

impl QueryOptions {
    /// Run the page loop, handing each page to `callback`.
    ///
    /// The first callback argument is a parent record slot reserved for
    /// nested paging; it is always `None` here.
    #[instrument(skip_all, fields(command = %self.command(), tooling = self.is_tooling()))]
    pub async fn query<F>(&self, mut callback: F) -> Result<()>
    where
        F: FnMut(Option<&Record>, Vec<Record>) -> PageControl,
    {
        let mut pager = Pager::new(self)?;
        while let Some(page) = pager.next_page().await? {
            if callback(None, page.records).is_stop() {
                debug!(pages = pager.pages_fetched(), "Paging stopped by caller");
                pager.stop();
                break;
            }
        }
        Ok(())
    }

    /// Fetch every page and return all records in order.
    pub async fn eager(&self) -> Result<Vec<Record>> {
        let mut records = Vec::with_capacity(128);
        self.query(|_parent, page| {
            records.extend(page);
            PageControl::Continue
        })
        .await?;
        Ok(records)
    }
}

/// Build options from `options` and run the page loop.
///
/// # Example
///
/// ```rust,ignore
/// use busbar_sf_query::{fetcher, instance_url, qs, query, PageControl};
///
/// let mut seen = 0;
/// query(
///     |_parent, records| {
///         seen += records.len();
///         if seen >= 5_000 { PageControl::Stop } else { PageControl::Continue }
///     },
///     [
///         instance_url(creds.instance_url()),
///         qs("SELECT Id, Name FROM Account"),
///         fetcher(http_client),
///     ],
/// )
/// .await?;
/// ```
pub async fn query<F>(callback: F, options: impl IntoIterator<Item = QueryOption>) -> Result<()>
where
    F: FnMut(Option<&Record>, Vec<Record>) -> PageControl,
{
    QueryOptions::from_options(options).query(callback).await
}

/// Build options from `options` and collect every record.
pub async fn eager(options: impl IntoIterator<Item = QueryOption>) -> Result<Vec<Record>> {
    QueryOptions::from_options(options).eager().await
}
