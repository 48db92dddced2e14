use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::fetch::{CsvFetcher, HttpFetcher};
use crate::review::Review;
use crate::reviews_from_text;

/// What the testimonials panel renders from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReviewsState {
    /// Source URL of the latest cycle, `None` before the first one.
    pub source: Option<String>,
    /// Latest accepted reviews. Kept as-is when a later cycle fails.
    pub reviews: Vec<Review>,
    pub average: f64,
    pub loading: bool,
    pub error: Option<String>,
}

/// Runs fetch → parse → map → aggregate for a source URL and publishes the
/// result through a [`watch`] channel.
///
/// Every cycle takes a generation number when it starts. A cycle whose
/// generation is no longer the latest when its fetch resolves is dropped,
/// so a slow response for an old URL never overwrites a newer one.
pub struct ReviewsAccessor<F = HttpFetcher> {
    fetcher: F,
    generation: AtomicU64,
    state: watch::Sender<ReviewsState>,
}

impl ReviewsAccessor<HttpFetcher> {
    pub fn http() -> Self {
        Self::new(HttpFetcher::new())
    }
}

impl<F: CsvFetcher> ReviewsAccessor<F> {
    pub fn new(fetcher: F) -> Self {
        let (state, _) = watch::channel(ReviewsState::default());
        Self {
            fetcher,
            generation: AtomicU64::new(0),
            state,
        }
    }

    /// Current state.
    pub fn snapshot(&self) -> ReviewsState {
        self.state.borrow().clone()
    }

    /// Receiver notified on every published change.
    pub fn subscribe(&self) -> watch::Receiver<ReviewsState> {
        self.state.subscribe()
    }

    /// Point the accessor at `url`. Runs a cycle only if the URL differs from
    /// the current one; resolves once that cycle settles or is superseded.
    pub async fn set_source(&self, url: impl Into<String>) {
        let url = url.into();
        let mut started = None;
        self.state.send_if_modified(|s| {
            if s.source.as_deref() == Some(url.as_str()) {
                return false;
            }
            started = Some(self.begin(s, &url));
            true
        });

        if let Some(generation) = started {
            self.complete(generation, url).await;
        }
    }

    /// Re-run the current source, if any. This is the retry hook.
    pub async fn refresh(&self) {
        let mut started = None;
        self.state.send_if_modified(|s| match s.source.clone() {
            Some(url) => {
                started = Some((self.begin(s, &url), url));
                true
            }
            None => false,
        });

        if let Some((generation, url)) = started {
            self.complete(generation, url).await;
        }
    }

    // Generation is only bumped or compared while the watch lock is held.
    fn begin(&self, s: &mut ReviewsState, url: &str) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        s.source = Some(url.to_string());
        s.loading = true;
        s.error = None;
        debug!(url, generation, "review cycle started");
        generation
    }

    async fn complete(&self, generation: u64, url: String) {
        let fetched = self.fetcher.fetch_text(&url).await;

        let published = self.state.send_if_modified(|s| {
            if self.generation.load(Ordering::SeqCst) != generation {
                return false;
            }
            match fetched {
                Ok(text) => {
                    let feed = reviews_from_text(&text);
                    info!(
                        url,
                        reviews = feed.reviews.len(),
                        dropped = feed.dropped,
                        average = feed.average,
                        "reviews loaded"
                    );
                    s.reviews = feed.reviews;
                    s.average = feed.average;
                }
                Err(err) => {
                    warn!(url, error = %err, "failed to load reviews");
                    s.error = Some(err.to_string());
                }
            }
            s.loading = false;
            true
        });

        if !published {
            debug!(url, generation, "discarded superseded review cycle");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ReviewsError, ReviewsResult};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    #[derive(Default)]
    struct FakeFetcher {
        responses: HashMap<String, (u64, Result<String, u16>)>,
        calls: AtomicUsize,
    }

    impl FakeFetcher {
        fn ok(mut self, url: &str, delay_ms: u64, body: &str) -> Self {
            self.responses
                .insert(url.into(), (delay_ms, Ok(body.into())));
            self
        }

        fn status(mut self, url: &str, delay_ms: u64, status: u16) -> Self {
            self.responses.insert(url.into(), (delay_ms, Err(status)));
            self
        }
    }

    #[async_trait]
    impl CsvFetcher for FakeFetcher {
        async fn fetch_text(&self, url: &str) -> ReviewsResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let (delay, outcome) = self.responses[url].clone();
            tokio::time::sleep(Duration::from_millis(delay)).await;
            outcome.map_err(|status| ReviewsError::HttpStatus {
                status,
                status_text: "Not Found".into(),
            })
        }
    }

    const A: &str = "Name,Review,Rating\nAnn,From A,1\n";
    const B: &str = "Name,Review,Rating\nBea,From B,5\nCal,Also B,4\n";

    #[tokio::test(start_paused = true)]
    async fn loads_reviews_and_average() {
        let acc = ReviewsAccessor::new(FakeFetcher::default().ok("b", 5, B));
        acc.set_source("b").await;

        let state = acc.snapshot();
        assert!(!state.loading);
        assert_eq!(state.error, None);
        assert_eq!(state.reviews.len(), 2);
        assert_eq!(state.average, 4.5);
        assert_eq!(state.source.as_deref(), Some("b"));
    }

    #[tokio::test(start_paused = true)]
    async fn loading_while_in_flight() {
        let acc = ReviewsAccessor::new(FakeFetcher::default().ok("b", 50, B));
        let mut rx = acc.subscribe();

        tokio::join!(acc.set_source("b"), async {
            rx.changed().await.unwrap();
            assert!(rx.borrow_and_update().loading);
        });
        assert!(!acc.snapshot().loading);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_old_response_is_discarded() {
        let fetcher = FakeFetcher::default().ok("a", 100, A).ok("b", 10, B);
        let acc = ReviewsAccessor::new(fetcher);

        tokio::join!(acc.set_source("a"), acc.set_source("b"));

        let state = acc.snapshot();
        assert_eq!(state.source.as_deref(), Some("b"));
        assert_eq!(state.reviews[0].text, "From B");
        assert_eq!(state.average, 4.5);
        assert!(!state.loading);
    }

    #[tokio::test(start_paused = true)]
    async fn fast_old_response_is_discarded() {
        let fetcher = FakeFetcher::default().ok("a", 1, A).ok("b", 50, B);
        let acc = ReviewsAccessor::new(fetcher);
        let mut rx = acc.subscribe();

        tokio::join!(acc.set_source("a"), acc.set_source("b"), async {
            // nothing from "a" may ever be published
            while rx.changed().await.is_ok() {
                let s = rx.borrow_and_update();
                assert!(s.reviews.iter().all(|r| r.text != "From A"));
                if !s.loading {
                    break;
                }
            }
        });

        assert_eq!(acc.snapshot().reviews.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn old_error_does_not_override_new_success() {
        let fetcher = FakeFetcher::default().status("a", 100, 500).ok("b", 10, B);
        let acc = ReviewsAccessor::new(fetcher);

        tokio::join!(acc.set_source("a"), acc.set_source("b"));

        let state = acc.snapshot();
        assert_eq!(state.error, None);
        assert_eq!(state.reviews.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn same_source_does_not_refetch() {
        let acc = ReviewsAccessor::new(FakeFetcher::default().ok("b", 1, B));
        acc.set_source("b").await;
        acc.set_source("b").await;
        assert_eq!(acc.fetcher.calls.load(Ordering::SeqCst), 1);

        acc.refresh().await;
        assert_eq!(acc.fetcher.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_without_source_is_noop() {
        let acc = ReviewsAccessor::new(FakeFetcher::default());
        acc.refresh().await;
        assert_eq!(acc.snapshot(), ReviewsState::default());
        assert_eq!(acc.fetcher.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn failure_keeps_previous_reviews() {
        let fetcher = FakeFetcher::default().ok("b", 1, B).status("gone", 1, 404);
        let acc = ReviewsAccessor::new(fetcher);

        acc.set_source("b").await;
        acc.set_source("gone").await;

        let state = acc.snapshot();
        assert_eq!(state.error.as_deref(), Some("CSV fetch failed: 404 Not Found"));
        assert_eq!(state.reviews.len(), 2);
        assert_eq!(state.average, 4.5);
        assert!(!state.loading);
    }

    #[tokio::test(start_paused = true)]
    async fn new_cycle_clears_error() {
        let fetcher = FakeFetcher::default().status("gone", 1, 404).ok("b", 1, B);
        let acc = ReviewsAccessor::new(fetcher);

        acc.set_source("gone").await;
        assert!(acc.snapshot().error.is_some());
        acc.set_source("b").await;
        assert_eq!(acc.snapshot().error, None);
    }
}
