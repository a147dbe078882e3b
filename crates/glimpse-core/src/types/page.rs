//! One page of search results.

use serde::{Deserialize, Serialize};

use super::{PhotoRecord, SearchTerm};

/// One page of results for a fixed term, with pagination metadata.
///
/// Created atomically from one successful response parse. The page itself
/// is immutable; only the thumbnail slots inside its records mutate.
/// `records` keeps the server's response order, which is display order.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SearchResultPage {
    term: SearchTerm,
    page: u32,
    pages: u32,
    records: Vec<PhotoRecord>,
}

impl SearchResultPage {
    /// Create a page from parsed response data.
    pub fn new(term: SearchTerm, page: u32, pages: u32, records: Vec<PhotoRecord>) -> Self {
        Self {
            term,
            page,
            pages,
            records,
        }
    }

    /// The term this page was fetched for.
    pub fn term(&self) -> &SearchTerm {
        &self.term
    }

    /// 1-based page number.
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Total page count known to the server at fetch time.
    pub fn pages(&self) -> u32 {
        self.pages
    }

    /// Records in server response order.
    pub fn records(&self) -> &[PhotoRecord] {
        &self.records
    }

    pub(crate) fn records_mut(&mut self) -> &mut [PhotoRecord] {
        &mut self.records
    }

    /// Whether pagination ends here.
    ///
    /// The server reports `pages: 0` for a term with no hits, so an empty
    /// page 1 is terminal as well.
    pub fn is_last(&self) -> bool {
        self.page >= self.pages
    }

    /// Number of records on this page.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether this page carries no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
