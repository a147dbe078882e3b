//! glimpse-flickr - Flickr REST-backed search implementation.

mod client;
mod response;
mod search;

pub use client::{DEFAULT_ENDPOINT, PER_PAGE};
pub use search::{DEFAULT_THUMBNAIL_CONCURRENCY, FlickrConfig, FlickrSearch};
