//! Session result store with windowed thumbnail eviction.

use tracing::debug;

use crate::Result;
use crate::error::StoreError;
use crate::types::{PhotoRecord, SearchResultPage, SearchTerm};

/// Default number of most-recent pages whose thumbnails stay decoded in
/// memory.
pub const DEFAULT_RETAIN_PAGES: usize = 5;

/// Ordered pages fetched for the current search session.
///
/// Pages share one term and appear in strictly increasing page order with
/// no gaps. After each append, pages that fall outside the retention window
/// have their records' thumbnails cleared; the records themselves and their
/// metadata stay addressable for the life of the session.
#[derive(Debug)]
pub struct ResultStore {
    pages: Vec<SearchResultPage>,
    retain: usize,
    // Pages below this index have already been evicted and are not
    // re-scanned.
    evicted_below: usize,
}

impl Default for ResultStore {
    fn default() -> Self {
        Self::new(DEFAULT_RETAIN_PAGES)
    }
}

impl ResultStore {
    /// Create a store retaining thumbnails for the most recent `retain`
    /// pages.
    pub fn new(retain: usize) -> Self {
        Self {
            pages: Vec::new(),
            retain,
            evicted_below: 0,
        }
    }

    /// Discard all pages. Called when a new term is submitted or the query
    /// is cleared.
    pub fn reset(&mut self) {
        if !self.pages.is_empty() {
            debug!(pages = self.pages.len(), "resetting result store");
        }
        self.pages.clear();
        self.evicted_below = 0;
    }

    /// Append a fetched page and evict thumbnails that fall outside the
    /// retention window.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the page's term differs from the current
    /// session's term, or if the page does not extend the sequence by
    /// exactly one.
    pub fn append(&mut self, page: SearchResultPage) -> Result<()> {
        if let Some(current) = self.current_term() {
            if current != page.term() {
                return Err(StoreError::TermMismatch {
                    current: current.to_string(),
                    offered: page.term().to_string(),
                }
                .into());
            }
        }

        let expected = self.pages.last().map_or(1, |last| last.page() + 1);
        if page.page() != expected {
            return Err(StoreError::NonSequentialPage {
                expected,
                got: page.page(),
            }
            .into());
        }

        self.pages.push(page);
        self.evict();
        Ok(())
    }

    fn evict(&mut self) {
        let cutoff = self.pages.len().saturating_sub(self.retain);
        if cutoff <= self.evicted_below {
            return;
        }

        let mut cleared = 0usize;
        for page in &mut self.pages[self.evicted_below..cutoff] {
            for record in page.records_mut() {
                if record.thumbnail().is_some() {
                    record.clear_thumbnail();
                    cleared += 1;
                }
            }
        }
        debug!(
            pages_evicted = cutoff - self.evicted_below,
            thumbnails_cleared = cleared,
            "evicted thumbnails outside retention window"
        );
        self.evicted_below = cutoff;
    }

    /// The term of the current session, if any pages have been fetched.
    pub fn current_term(&self) -> Option<&SearchTerm> {
        self.pages.first().map(|p| p.term())
    }

    /// The most recently appended page.
    pub fn last_page(&self) -> Option<&SearchResultPage> {
        self.pages.last()
    }

    /// All pages fetched this session, in page order.
    pub fn pages(&self) -> &[SearchResultPage] {
        &self.pages
    }

    /// All records across pages, grouped by page in display order.
    pub fn records(&self) -> impl Iterator<Item = &PhotoRecord> {
        self.pages.iter().flat_map(|p| p.records().iter())
    }

    /// Number of pages fetched this session.
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// Whether no pages have been fetched yet.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Total record count across all pages.
    pub fn record_count(&self) -> usize {
        self.pages.iter().map(SearchResultPage::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::DynamicImage;

    fn term(s: &str) -> SearchTerm {
        SearchTerm::new(s).unwrap()
    }

    fn page_with_thumbnails(t: &SearchTerm, page_no: u32, pages: u32) -> SearchResultPage {
        let mut records = vec![
            PhotoRecord::new(format!("{}-a", page_no), 66, "65535", "s1"),
            PhotoRecord::new(format!("{}-b", page_no), 66, "65535", "s2"),
        ];
        for record in &mut records {
            record.set_thumbnail(DynamicImage::new_rgba8(1, 1));
        }
        SearchResultPage::new(t.clone(), page_no, pages, records)
    }

    #[test]
    fn append_builds_sequence() {
        let t = term("cats");
        let mut store = ResultStore::default();
        store.append(page_with_thumbnails(&t, 1, 9)).unwrap();
        store.append(page_with_thumbnails(&t, 2, 9)).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.record_count(), 4);
        assert_eq!(store.current_term(), Some(&t));
        assert_eq!(store.last_page().unwrap().page(), 2);
    }

    #[test]
    fn rejects_term_mismatch() {
        let mut store = ResultStore::default();
        store
            .append(page_with_thumbnails(&term("cats"), 1, 9))
            .unwrap();
        let err = store
            .append(page_with_thumbnails(&term("dogs"), 2, 9))
            .unwrap_err();
        assert!(err.to_string().contains("dogs"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn rejects_gap_in_sequence() {
        let t = term("cats");
        let mut store = ResultStore::default();
        store.append(page_with_thumbnails(&t, 1, 9)).unwrap();
        assert!(store.append(page_with_thumbnails(&t, 3, 9)).is_err());
        assert!(store.append(page_with_thumbnails(&t, 1, 9)).is_err());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn first_page_must_be_one() {
        let t = term("cats");
        let mut store = ResultStore::default();
        assert!(store.append(page_with_thumbnails(&t, 2, 9)).is_err());
    }

    #[test]
    fn evicts_thumbnails_outside_window() {
        let t = term("cats");
        let mut store = ResultStore::new(2);
        for n in 1..=5 {
            store.append(page_with_thumbnails(&t, n, 9)).unwrap();
        }

        // Pages 1..3 are outside the window, 4..5 inside.
        for page in &store.pages()[..3] {
            assert!(page.records().iter().all(|r| r.thumbnail().is_none()));
        }
        for page in &store.pages()[3..] {
            assert!(page.records().iter().all(|r| r.thumbnail().is_some()));
        }

        // Eviction never removes records, only their thumbnails.
        assert_eq!(store.len(), 5);
        assert_eq!(store.record_count(), 10);
    }

    #[test]
    fn eviction_does_not_rescan_old_pages() {
        let t = term("cats");
        let mut store = ResultStore::new(1);
        for n in 1..=3 {
            store.append(page_with_thumbnails(&t, n, 9)).unwrap();
        }

        // Re-populate a thumbnail on an already-evicted page; the watermark
        // keeps later evictions from touching it again.
        store.pages[0].records_mut()[0].set_thumbnail(DynamicImage::new_rgba8(1, 1));
        store.append(page_with_thumbnails(&t, 4, 9)).unwrap();
        assert!(store.pages()[0].records()[0].thumbnail().is_some());
        assert!(store.pages()[2].records()[0].thumbnail().is_none());
    }

    #[test]
    fn reset_clears_everything() {
        let t = term("cats");
        let mut store = ResultStore::default();
        store.append(page_with_thumbnails(&t, 1, 9)).unwrap();
        store.reset();
        assert!(store.is_empty());
        assert!(store.current_term().is_none());

        // A different term is accepted after reset.
        store
            .append(page_with_thumbnails(&term("dogs"), 1, 9))
            .unwrap();
        assert_eq!(store.current_term(), Some(&term("dogs")));
    }

    #[test]
    fn records_iterate_in_page_order() {
        let t = term("cats");
        let mut store = ResultStore::default();
        store.append(page_with_thumbnails(&t, 1, 2)).unwrap();
        store.append(page_with_thumbnails(&t, 2, 2)).unwrap();
        let ids: Vec<_> = store.records().map(|r| r.id().to_string()).collect();
        assert_eq!(ids, ["1-a", "1-b", "2-a", "2-b"]);
    }
}
