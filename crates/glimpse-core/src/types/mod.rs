//! Core photo-search types.
//!
//! These types enforce their invariants at construction time,
//! ensuring invalid states are unrepresentable.

mod api_key;
mod page;
mod photo;
mod search_term;

pub use api_key::ApiKey;
pub use page::SearchResultPage;
pub use photo::{PhotoRecord, PhotoSize};
pub use search_term::SearchTerm;
