//! The byte-fetching capability consumed by the query pager.

use std::future::Future;
use std::sync::Arc;

use bytes::Bytes;
use futures::future::BoxFuture;

use crate::error::Result;

/// Future returned by [`Fetch::fetch`].
pub type FetchFuture<'a> = BoxFuture<'a, Result<Bytes>>;

/// Fetch the raw response body for an absolute URL.
///
/// Implementations own every transport concern: authentication headers,
/// timeouts, cancellation. The pager calls `fetch` once per page and never
/// issues a second call while one is outstanding.
///
/// The trait is object safe so a fetcher can be stored as `Arc<dyn Fetch>`.
pub trait Fetch: Send + Sync {
    /// Fetch `url` and return the response body.
    fn fetch<'a>(&'a self, url: &'a str) -> FetchFuture<'a>;
}

impl<T: Fetch + ?Sized> Fetch for Arc<T> {
    fn fetch<'a>(&'a self, url: &'a str) -> FetchFuture<'a> {
        (**self).fetch(url)
    }
}

impl<T: Fetch + ?Sized> Fetch for Box<T> {
    fn fetch<'a>(&'a self, url: &'a str) -> FetchFuture<'a> {
        (**self).fetch(url)
    }
}

/// A [`Fetch`] backed by an async closure. Created with [`fetch_fn`].
#[derive(Clone)]
pub struct FnFetcher<F> {
    f: F,
}

impl<F> std::fmt::Debug for FnFetcher<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnFetcher").finish_non_exhaustive()
    }
}

/// Wrap a closure `Fn(String) -> impl Future<Output = Result<Bytes>>` as a
/// [`Fetch`].
///
/// # Example
///
/// ```rust,ignore
/// use busbar_sf_client::{fetch_fn, Error, ErrorKind};
///
/// let offline = fetch_fn(|url: String| async move {
///     Err(Error::new(ErrorKind::Connection(format!("offline: {url}"))))
/// });
/// ```
pub fn fetch_fn<F, Fut>(f: F) -> FnFetcher<F>
where
    F: Fn(String) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Bytes>> + Send + 'static,
{
    FnFetcher { f }
}

impl<F, Fut> Fetch for FnFetcher<F>
where
    F: Fn(String) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Bytes>> + Send + 'static,
{
    fn fetch<'a>(&'a self, url: &'a str) -> FetchFuture<'a> {
        Box::pin((self.f)(url.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, ErrorKind};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_fetch_fn_passes_url_through() {
        let fetcher = fetch_fn(|url: String| async move { Ok::<_, Error>(Bytes::from(url)) });

        let body = fetcher.fetch("https://na1.salesforce.com/x").await.unwrap();
        assert_eq!(&body[..], b"https://na1.salesforce.com/x");
    }

    #[tokio::test]
    async fn test_fetch_fn_error_is_returned_unchanged() {
        let fetcher = fetch_fn(|_url: String| async move {
            Err(Error::new(ErrorKind::Connection("refused".to_string())))
        });

        let err = fetcher.fetch("https://na1.salesforce.com").await.unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Connection(ref msg) if msg == "refused"));
    }

    #[tokio::test]
    async fn test_arc_dyn_fetch() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let fetcher: Arc<dyn Fetch> = Arc::new(fetch_fn(move |_url: String| {
            counter.fetch_add(1, Ordering::SeqCst);
            async move { Ok::<_, Error>(Bytes::from_static(b"{}")) }
        }));

        fetcher.fetch("a").await.unwrap();
        fetcher.fetch("b").await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_fn_fetcher_debug() {
        let fetcher = fetch_fn(|_url: String| async move { Ok::<_, Error>(Bytes::new()) });
        assert!(format!("{:?}", fetcher).starts_with("FnFetcher"));
    }
}
