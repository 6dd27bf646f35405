//! Capability traits at the seams of the login flow.
//!
//! The callback handler only depends on these traits:
//! - [`TokenExchanger`] builds authorization URLs and trades a code for a token
//! - [`ResourceFetcher`] turns a token into a [`ResourceSnapshot`]
//!
//! A [`ResourceFetcher`] is normally a [`ComposedFetcher`] built from a
//! [`CalendarSource`] and a [`FileSource`], so each capability can be
//! replaced independently in tests.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use gglance_core::{CalendarEvent, DriveFile, MAX_EVENTS, MAX_FILES, ResourceSnapshot};
use tracing::debug;

use crate::error::ProviderResult;
use crate::google::TokenInfo;

/// A boxed future for async trait methods.
///
/// Boxed futures keep the traits object-safe so they can live behind
/// `Arc<dyn ...>` in shared server state.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Exchanges authorization codes for access tokens.
pub trait TokenExchanger: Send + Sync {
    /// Builds the authorization URL carrying the given state token.
    fn authorization_url(&self, state: &str) -> String;

    /// Trades a single-use authorization code for an access token.
    fn exchange<'a>(&'a self, code: &'a str) -> BoxFuture<'a, ProviderResult<TokenInfo>>;
}

/// Reads upcoming events on behalf of a user.
pub trait CalendarSource: Send + Sync {
    /// Lists at most `max_results` upcoming events.
    fn upcoming_events<'a>(
        &'a self,
        token: &'a TokenInfo,
        max_results: usize,
    ) -> BoxFuture<'a, ProviderResult<Vec<CalendarEvent>>>;
}

/// Lists files on behalf of a user.
pub trait FileSource: Send + Sync {
    /// Lists at most `page_size` files.
    fn list_files<'a>(
        &'a self,
        token: &'a TokenInfo,
        page_size: usize,
    ) -> BoxFuture<'a, ProviderResult<Vec<DriveFile>>>;
}

/// Fetches everything shown after a successful login.
pub trait ResourceFetcher: Send + Sync {
    /// Performs the authenticated reads for `token`.
    fn fetch_resources<'a>(
        &'a self,
        token: &'a TokenInfo,
    ) -> BoxFuture<'a, ProviderResult<ResourceSnapshot>>;
}

/// A [`ResourceFetcher`] built from a calendar and a file source.
///
/// The calendar is read first; a calendar failure skips the file listing.
/// Either failure fails the whole snapshot.
#[derive(Clone)]
pub struct ComposedFetcher {
    calendar: Arc<dyn CalendarSource>,
    files: Arc<dyn FileSource>,
}

impl ComposedFetcher {
    /// Creates a fetcher from the two capabilities.
    pub fn new(calendar: Arc<dyn CalendarSource>, files: Arc<dyn FileSource>) -> Self {
        Self { calendar, files }
    }
}

impl std::fmt::Debug for ComposedFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComposedFetcher").finish_non_exhaustive()
    }
}

impl ResourceFetcher for ComposedFetcher {
    fn fetch_resources<'a>(
        &'a self,
        token: &'a TokenInfo,
    ) -> BoxFuture<'a, ProviderResult<ResourceSnapshot>> {
        Box::pin(async move {
            let events = self.calendar.upcoming_events(token, MAX_EVENTS).await?;
            let files = self.files.list_files(token, MAX_FILES).await?;
            debug!(
                events = events.len(),
                files = files.len(),
                "fetched resources"
            );
            Ok(ResourceSnapshot::new(events, files))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ProviderError, ProviderErrorCode};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeCalendar {
        result: Result<Vec<CalendarEvent>, &'static str>,
        calls: AtomicUsize,
    }

    impl CalendarSource for FakeCalendar {
        fn upcoming_events<'a>(
            &'a self,
            token: &'a TokenInfo,
            max_results: usize,
        ) -> BoxFuture<'a, ProviderResult<Vec<CalendarEvent>>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            assert_eq!(token.secret(), "tok");
            assert_eq!(max_results, MAX_EVENTS);
            let result = self
                .result
                .clone()
                .map_err(|m| ProviderError::server(m).with_provider("calendar"));
            Box::pin(async move { result })
        }
    }

    struct FakeFiles {
        result: Result<Vec<DriveFile>, &'static str>,
        calls: AtomicUsize,
    }

    impl FileSource for FakeFiles {
        fn list_files<'a>(
            &'a self,
            _token: &'a TokenInfo,
            page_size: usize,
        ) -> BoxFuture<'a, ProviderResult<Vec<DriveFile>>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            assert_eq!(page_size, MAX_FILES);
            let result = self
                .result
                .clone()
                .map_err(|m| ProviderError::server(m).with_provider("drive"));
            Box::pin(async move { result })
        }
    }

    #[tokio::test]
    async fn composes_calendar_then_files() {
        let calendar = Arc::new(FakeCalendar {
            result: Ok(vec![CalendarEvent::new("Standup", "2024-03-15T09:00:00Z")]),
            calls: AtomicUsize::new(0),
        });
        let files = Arc::new(FakeFiles {
            result: Ok(vec![DriveFile::new("notes", "f1")]),
            calls: AtomicUsize::new(0),
        });
        let fetcher = ComposedFetcher::new(calendar.clone(), files.clone());

        let snapshot = fetcher
            .fetch_resources(&TokenInfo::bearer("tok"))
            .await
            .unwrap();

        assert_eq!(snapshot.events[0].summary, "Standup");
        assert_eq!(snapshot.files[0].id, "f1");
        assert_eq!(calendar.calls.load(Ordering::SeqCst), 1);
        assert_eq!(files.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn calendar_failure_skips_files() {
        let calendar = Arc::new(FakeCalendar {
            result: Err("backend unavailable"),
            calls: AtomicUsize::new(0),
        });
        let files = Arc::new(FakeFiles {
            result: Ok(vec![]),
            calls: AtomicUsize::new(0),
        });
        let fetcher = ComposedFetcher::new(calendar, files.clone());

        let err = fetcher
            .fetch_resources(&TokenInfo::bearer("tok"))
            .await
            .unwrap_err();

        assert_eq!(err.code(), ProviderErrorCode::ServerError);
        assert_eq!(err.provider(), Some("calendar"));
        assert_eq!(files.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn drive_failure_fails_snapshot() {
        let calendar = Arc::new(FakeCalendar {
            result: Ok(vec![CalendarEvent::new("Standup", "2024-03-15T09:00:00Z")]),
            calls: AtomicUsize::new(0),
        });
        let files = Arc::new(FakeFiles {
            result: Err("quota exceeded"),
            calls: AtomicUsize::new(0),
        });
        let fetcher = ComposedFetcher::new(calendar.clone(), files);

        let err = fetcher
            .fetch_resources(&TokenInfo::bearer("tok"))
            .await
            .unwrap_err();

        assert_eq!(err.provider(), Some("drive"));
        assert!(err.message().contains("quota exceeded"));
        assert_eq!(calendar.calls.load(Ordering::SeqCst), 1);
    }
}
