//! Pagination driver over a search backend.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info};

use crate::Result;
use crate::store::ResultStore;
use crate::traits::SearchApi;
use crate::types::SearchTerm;

/// Outcome of a page request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NextPage {
    /// A page was fetched and appended to the store.
    Fetched { page: u32, records: usize },
    /// A fetch is already in flight; nothing was issued.
    AlreadyLoading,
    /// No search has been started yet; nothing to paginate from.
    NoSession,
    /// The last known page has been reached. Terminal, not an error.
    Exhausted,
    /// The response belonged to a superseded search and was discarded.
    Superseded,
}

/// Drives "fetch next page" decisions over a [`SearchApi`] backend.
///
/// All store state sits behind a lock and the in-flight flag is atomic, so
/// a `Pager` can be shared behind an `Arc` while keeping mutation
/// serialized. At most one search request is in flight at a time; pages are
/// strictly sequential, so there is nothing to gain from overlapping them.
///
/// There is no cancellation: a fetch outlived by a newer [`new_search`]
/// completes normally, but its response carries the generation it was
/// issued under and is discarded when that generation is no longer current.
///
/// [`new_search`]: Pager::new_search
pub struct Pager<S> {
    client: S,
    state: Mutex<PagerState>,
    loading: AtomicBool,
}

#[derive(Debug)]
struct PagerState {
    store: ResultStore,
    term: Option<SearchTerm>,
    generation: u64,
}

impl<S: SearchApi> Pager<S> {
    /// Create a pager with a default-configured store.
    pub fn new(client: S) -> Self {
        Self::with_store(client, ResultStore::default())
    }

    /// Create a pager over a pre-configured store.
    pub fn with_store(client: S, store: ResultStore) -> Self {
        Self {
            client,
            state: Mutex::new(PagerState {
                store,
                term: None,
                generation: 0,
            }),
            loading: AtomicBool::new(false),
        }
    }

    /// Start a fresh session for `term`: reset the store and fetch page 1.
    ///
    /// This does not wait for a fetch already in flight; bumping the
    /// session generation makes the eventual stale response harmless.
    pub async fn new_search(&self, term: SearchTerm) -> Result<NextPage> {
        let generation = {
            let mut state = self.state.lock().unwrap();
            state.store.reset();
            state.term = Some(term.clone());
            state.generation += 1;
            state.generation
        };
        info!(%term, "starting search session");

        self.loading.store(true, Ordering::Release);
        let outcome = self.fetch(&term, 1, generation).await;
        self.loading.store(false, Ordering::Release);
        outcome
    }

    /// Fetch the page after the last one in the store.
    ///
    /// No-ops (without issuing a request) while a fetch is in flight, before
    /// any page has been fetched, and once the last page has been reached.
    pub async fn next_page(&self) -> Result<NextPage> {
        let (term, page, generation) = {
            let state = self.state.lock().unwrap();
            let Some(term) = state.term.clone() else {
                return Ok(NextPage::NoSession);
            };
            let Some(last) = state.store.last_page() else {
                return Ok(NextPage::NoSession);
            };
            if last.is_last() {
                debug!(%term, page = last.page(), "pagination exhausted");
                return Ok(NextPage::Exhausted);
            }
            (term, last.page() + 1, state.generation)
        };

        if self.loading.swap(true, Ordering::AcqRel) {
            return Ok(NextPage::AlreadyLoading);
        }
        let outcome = self.fetch(&term, page, generation).await;
        self.loading.store(false, Ordering::Release);
        outcome
    }

    async fn fetch(&self, term: &SearchTerm, page: u32, generation: u64) -> Result<NextPage> {
        let result = self.client.search(term, page).await;

        let mut state = self.state.lock().unwrap();
        if state.generation != generation {
            debug!(%term, page, "discarding response from superseded search");
            return Ok(NextPage::Superseded);
        }

        let fetched = result?;
        let page_no = fetched.page();
        let records = fetched.len();
        state.store.append(fetched)?;
        debug!(%term, page = page_no, records, "page appended");
        Ok(NextPage::Fetched {
            page: page_no,
            records,
        })
    }

    /// Whether a fetch is currently in flight.
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    /// The current session's term, if a search has been started.
    pub fn current_term(&self) -> Option<SearchTerm> {
        self.state.lock().unwrap().term.clone()
    }

    /// Number of pages fetched this session.
    pub fn page_count(&self) -> usize {
        self.state.lock().unwrap().store.len()
    }

    /// Total record count across fetched pages.
    pub fn record_count(&self) -> usize {
        self.state.lock().unwrap().store.record_count()
    }

    /// Run a closure against the store, e.g. to render its contents.
    pub fn read_store<R>(&self, f: impl FnOnce(&ResultStore) -> R) -> R {
        let state = self.state.lock().unwrap();
        f(&state.store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PhotoRecord, SearchResultPage};
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;
    use tokio::sync::Notify;
    use tokio::task::yield_now;

    fn term(s: &str) -> SearchTerm {
        SearchTerm::new(s).unwrap()
    }

    fn page(t: &SearchTerm, page_no: u32, pages: u32) -> SearchResultPage {
        let record = PhotoRecord::new(format!("photo-{}", page_no), 66, "65535", "cafe");
        SearchResultPage::new(t.clone(), page_no, pages, vec![record])
    }

    /// Serves pages from a fixed total, parking on a gate from a given page
    /// number onward.
    #[derive(Clone)]
    struct StubApi {
        total_pages: u32,
        gate_from: u32,
        gate: Arc<Notify>,
        calls: Arc<AtomicUsize>,
    }

    impl StubApi {
        fn new(total_pages: u32) -> Self {
            Self {
                total_pages,
                gate_from: u32::MAX,
                gate: Arc::new(Notify::new()),
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn gated_from(total_pages: u32, gate_from: u32) -> Self {
            Self {
                gate_from,
                ..Self::new(total_pages)
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SearchApi for StubApi {
        async fn search(&self, t: &SearchTerm, page_no: u32) -> Result<SearchResultPage> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if page_no >= self.gate_from {
                self.gate.notified().await;
            }
            Ok(page(t, page_no, self.total_pages))
        }
    }

    async fn wait_for_loading<S: SearchApi>(pager: &Pager<S>) {
        for _ in 0..100 {
            if pager.is_loading() {
                return;
            }
            yield_now().await;
        }
        panic!("fetch never started");
    }

    #[tokio::test]
    async fn next_page_without_session_is_noop() {
        let stub = StubApi::new(3);
        let pager = Pager::new(stub.clone());
        assert_eq!(pager.next_page().await.unwrap(), NextPage::NoSession);
        assert_eq!(stub.calls(), 0);
    }

    #[tokio::test]
    async fn new_search_fetches_page_one() {
        let pager = Pager::new(StubApi::new(3));
        let outcome = pager.new_search(term("cats")).await.unwrap();
        assert_eq!(outcome, NextPage::Fetched { page: 1, records: 1 });
        assert_eq!(pager.page_count(), 1);
        assert_eq!(pager.current_term(), Some(term("cats")));
        assert!(!pager.is_loading());
    }

    #[tokio::test]
    async fn paginates_sequentially_until_exhausted() {
        let stub = StubApi::new(3);
        let pager = Pager::new(stub.clone());
        pager.new_search(term("cats")).await.unwrap();

        assert_eq!(
            pager.next_page().await.unwrap(),
            NextPage::Fetched { page: 2, records: 1 }
        );
        assert_eq!(
            pager.next_page().await.unwrap(),
            NextPage::Fetched { page: 3, records: 1 }
        );
        assert_eq!(pager.next_page().await.unwrap(), NextPage::Exhausted);
        assert_eq!(stub.calls(), 3);
        assert_eq!(pager.page_count(), 3);
    }

    #[tokio::test]
    async fn single_page_session_is_immediately_exhausted() {
        let stub = StubApi::new(1);
        let pager = Pager::new(stub.clone());
        pager.new_search(term("cats")).await.unwrap();
        assert_eq!(pager.next_page().await.unwrap(), NextPage::Exhausted);
        assert_eq!(stub.calls(), 1);
    }

    #[tokio::test]
    async fn next_page_is_noop_while_loading() {
        let stub = StubApi::gated_from(3, 2);
        let pager = Arc::new(Pager::new(stub.clone()));
        pager.new_search(term("cats")).await.unwrap();

        let task = tokio::spawn({
            let pager = Arc::clone(&pager);
            async move { pager.next_page().await }
        });
        wait_for_loading(&pager).await;

        assert_eq!(pager.next_page().await.unwrap(), NextPage::AlreadyLoading);

        stub.gate.notify_one();
        let outcome = task.await.unwrap().unwrap();
        assert_eq!(outcome, NextPage::Fetched { page: 2, records: 1 });
        assert_eq!(stub.calls(), 2);
    }

    #[tokio::test]
    async fn new_search_resets_previous_session() {
        let pager = Pager::new(StubApi::new(5));
        pager.new_search(term("cats")).await.unwrap();
        pager.next_page().await.unwrap();
        assert_eq!(pager.page_count(), 2);

        pager.new_search(term("dogs")).await.unwrap();
        assert_eq!(pager.page_count(), 1);
        assert_eq!(pager.current_term(), Some(term("dogs")));
        pager.read_store(|store| {
            assert_eq!(store.current_term(), Some(&term("dogs")));
        });
    }

    #[tokio::test]
    async fn superseded_response_is_discarded() {
        let stub = StubApi::gated_from(3, 2);
        let pager = Arc::new(Pager::new(stub.clone()));
        pager.new_search(term("cats")).await.unwrap();

        // Park a page-2 fetch for the old session.
        let stale = tokio::spawn({
            let pager = Arc::clone(&pager);
            async move { pager.next_page().await }
        });
        wait_for_loading(&pager).await;

        // A new term supersedes the in-flight fetch rather than waiting
        // for it.
        let outcome = pager.new_search(term("dogs")).await.unwrap();
        assert_eq!(outcome, NextPage::Fetched { page: 1, records: 1 });

        stub.gate.notify_one();
        assert_eq!(stale.await.unwrap().unwrap(), NextPage::Superseded);

        // The stale page never reached the store.
        assert_eq!(pager.page_count(), 1);
        assert_eq!(pager.current_term(), Some(term("dogs")));
    }
}
