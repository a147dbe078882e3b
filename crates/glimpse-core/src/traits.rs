//! Trait seam for search backends.

use async_trait::async_trait;

use crate::Result;
use crate::types::{SearchResultPage, SearchTerm};

/// A paginated photo-search backend.
///
/// The returned future resolves exactly once, on the awaiting task, which
/// is where the original callback contract marshaled its completion.
#[async_trait]
pub trait SearchApi: Send + Sync {
    /// Fetch one page of results for a term. `page` is 1-based.
    ///
    /// An empty page is a valid success; errors are terminal for this
    /// request and never retried internally.
    async fn search(&self, term: &SearchTerm, page: u32) -> Result<SearchResultPage>;
}
