//! glimpse-core - Core photo-search types, session store, and pagination.

pub mod cache;
pub mod error;
pub mod pager;
pub mod store;
pub mod traits;
pub mod types;

pub use cache::CacheDir;
pub use error::Error;
pub use pager::{NextPage, Pager};
pub use store::{DEFAULT_RETAIN_PAGES, ResultStore};
pub use traits::SearchApi;
pub use types::{ApiKey, PhotoRecord, PhotoSize, SearchResultPage, SearchTerm};

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
