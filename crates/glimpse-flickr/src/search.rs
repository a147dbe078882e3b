//! Flickr-backed implementation of the core search trait.

use async_trait::async_trait;
use futures_util::{StreamExt, stream};
use image::DynamicImage;
use tracing::{debug, instrument, warn};
use url::Url;

use glimpse_core::error::{Error, UnknownResponseError};
use glimpse_core::{
    ApiKey, CacheDir, PhotoRecord, PhotoSize, Result, SearchApi, SearchResultPage, SearchTerm,
};

use crate::client::{DEFAULT_ENDPOINT, RestClient};
use crate::response::{PhotosPayload, decode_search, project_records};

/// Default cap on concurrent thumbnail fetches per page.
pub const DEFAULT_THUMBNAIL_CONCURRENCY: usize = 8;

/// Configuration for [`FlickrSearch`].
#[derive(Debug, Clone)]
pub struct FlickrConfig {
    api_key: ApiKey,
    endpoint: Url,
    thumbnail_concurrency: usize,
    prefetch_thumbnails: bool,
    static_base: Option<Url>,
    cache: Option<CacheDir>,
}

impl FlickrConfig {
    /// Create a configuration with defaults for everything but the key.
    pub fn new(api_key: ApiKey) -> Self {
        Self {
            api_key,
            endpoint: Url::parse(DEFAULT_ENDPOINT).expect("default endpoint is a valid URL"),
            thumbnail_concurrency: DEFAULT_THUMBNAIL_CONCURRENCY,
            prefetch_thumbnails: true,
            static_base: None,
            cache: None,
        }
    }

    /// Override the REST endpoint.
    pub fn endpoint(mut self, endpoint: Url) -> Self {
        self.endpoint = endpoint;
        self
    }

    /// Cap on concurrent thumbnail fetches per page. Clamped to at least 1.
    pub fn thumbnail_concurrency(mut self, concurrency: usize) -> Self {
        self.thumbnail_concurrency = concurrency.max(1);
        self
    }

    /// Whether to prefetch thumbnails while handling a search response.
    pub fn prefetch_thumbnails(mut self, prefetch: bool) -> Self {
        self.prefetch_thumbnails = prefetch;
        self
    }

    /// Override the static-image host. Thumbnails are then fetched from
    /// `<base>/<server>/<id>_<secret>_<size>.jpg` instead of the per-record
    /// farm host.
    pub fn static_base(mut self, base: Url) -> Self {
        self.static_base = Some(base);
        self
    }

    /// Resolve a local cache path onto every parsed record.
    pub fn cache(mut self, cache: CacheDir) -> Self {
        self.cache = Some(cache);
        self
    }
}

/// Paginated photo search against the Flickr REST API.
///
/// One instance serves one endpoint and key; it is cheap to clone and safe
/// to share.
#[derive(Debug, Clone)]
pub struct FlickrSearch {
    client: RestClient,
    config: FlickrConfig,
}

impl FlickrSearch {
    /// Create a search backend from a configuration.
    pub fn new(config: FlickrConfig) -> Self {
        let client = RestClient::new(config.endpoint.clone(), config.api_key.clone());
        Self { client, config }
    }

    fn thumbnail_url(&self, record: &PhotoRecord) -> Result<Url> {
        match &self.config.static_base {
            Some(base) => {
                let raw = format!(
                    "{}/{}/{}_{}_{}.jpg",
                    base.as_str().trim_end_matches('/'),
                    record.server(),
                    record.id(),
                    record.secret(),
                    PhotoSize::Thumbnail
                );
                Url::parse(&raw).map_err(|e| {
                    Error::from(UnknownResponseError::Url {
                        value: raw,
                        reason: e.to_string(),
                    })
                })
            }
            None => record.image_url(PhotoSize::Thumbnail),
        }
    }

    /// Best-effort thumbnail prefetch with bounded fan-out. Individual
    /// fetch or decode failures leave the slot empty and are only logged.
    async fn prefetch_thumbnails(&self, records: &mut [PhotoRecord]) {
        let tasks: Vec<_> = records
            .iter()
            .enumerate()
            .map(|(index, record)| {
                let url = self.thumbnail_url(record);
                async move {
                    let image = match url {
                        Ok(url) => self.fetch_thumbnail(url).await,
                        Err(error) => {
                            debug!(%error, "skipping thumbnail with unbuildable URL");
                            None
                        }
                    };
                    (index, image)
                }
            })
            .collect();
        let fetched: Vec<(usize, Option<DynamicImage>)> = stream::iter(tasks)
            .buffer_unordered(self.config.thumbnail_concurrency)
            .collect()
            .await;

        for (index, image) in fetched {
            if let Some(image) = image {
                records[index].set_thumbnail(image);
            }
        }
    }

    async fn fetch_thumbnail(&self, url: Url) -> Option<DynamicImage> {
        let bytes = match self.client.fetch_bytes(url).await {
            Ok(bytes) => bytes,
            Err(error) => {
                debug!(%error, "thumbnail fetch failed");
                return None;
            }
        };
        match image::load_from_memory(&bytes) {
            Ok(image) => Some(image),
            Err(error) => {
                debug!(%error, "thumbnail decode failed");
                None
            }
        }
    }
}

#[async_trait]
impl SearchApi for FlickrSearch {
    #[instrument(skip(self))]
    async fn search(&self, term: &SearchTerm, page: u32) -> Result<SearchResultPage> {
        let body = self.client.search_body(term, page).await?;
        let PhotosPayload {
            page: page_no,
            pages,
            photo,
        } = decode_search(&body)?;

        let descriptors = photo.len();
        let mut records = project_records(photo);
        if records.len() < descriptors {
            warn!(
                dropped = descriptors - records.len(),
                page = page_no,
                "dropped malformed photo descriptors"
            );
        }

        if let Some(cache) = &self.config.cache {
            for record in &mut records {
                let path = cache.photo_path(record.id());
                record.set_local_cache_path(path);
            }
        }

        if self.config.prefetch_thumbnails && !records.is_empty() {
            self.prefetch_thumbnails(&mut records).await;
        }

        debug!(
            page = page_no,
            pages,
            records = records.len(),
            "search page decoded"
        );
        Ok(SearchResultPage::new(term.clone(), page_no, pages, records))
    }
}
