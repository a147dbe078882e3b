//! HTTP client for the Flickr REST endpoint.

use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use tracing::{debug, instrument, trace};
use url::Url;

use glimpse_core::error::{Error, TransportError, UnknownResponseError};
use glimpse_core::{ApiKey, Result, SearchTerm};

/// Results requested per page. Fixed by the protocol this client speaks,
/// not configurable.
pub const PER_PAGE: u32 = 48;

/// Default Flickr REST endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.flickr.com/services/rest/";

/// Map a reqwest failure onto the transport error kinds.
pub(crate) fn map_transport(err: reqwest::Error) -> Error {
    let transport = if err.is_timeout() {
        TransportError::Timeout {
            message: err.to_string(),
        }
    } else if err.is_connect() {
        TransportError::Connection {
            message: err.to_string(),
        }
    } else {
        TransportError::Http {
            message: err.to_string(),
        }
    };
    Error::Transport(transport)
}

/// Thin wrapper over reqwest for the one REST method this crate speaks.
#[derive(Debug, Clone)]
pub(crate) struct RestClient {
    client: reqwest::Client,
    endpoint: Url,
    api_key: ApiKey,
}

impl RestClient {
    pub fn new(endpoint: Url, api_key: ApiKey) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(concat!("glimpse/", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("failed to build HTTP client");

        Self {
            client,
            endpoint,
            api_key,
        }
    }

    /// Build the photos.search request URL for a term and page.
    ///
    /// The term is percent-encoded over the full non-alphanumeric set, the
    /// strictest escaping the endpoint accepts.
    pub fn search_url(&self, term: &SearchTerm, page: u32) -> Result<Url> {
        let text = utf8_percent_encode(term.as_str(), NON_ALPHANUMERIC);
        let raw = format!(
            "{}?method=flickr.photos.search&api_key={}&text={}&per_page={}&format=json&nojsoncallback=1&safe_search=1&page={}",
            self.endpoint,
            self.api_key.as_str(),
            text,
            PER_PAGE,
            page
        );
        Url::parse(&raw).map_err(|e| {
            UnknownResponseError::Url {
                value: raw,
                reason: e.to_string(),
            }
            .into()
        })
    }

    /// Execute a search request and return the raw response body.
    #[instrument(skip(self), fields(endpoint = %self.endpoint))]
    pub async fn search_body(&self, term: &SearchTerm, page: u32) -> Result<String> {
        let url = self.search_url(term, page)?;
        debug!(%term, page, "photo search request");

        let response = self.client.get(url).send().await.map_err(map_transport)?;
        trace!(status = %response.status(), "photo search response");

        response.text().await.map_err(map_transport)
    }

    /// Fetch raw bytes from a URL. Non-2xx statuses count as failure.
    #[instrument(skip(self))]
    pub async fn fetch_bytes(&self, url: Url) -> Result<Vec<u8>> {
        let response = self.client.get(url).send().await.map_err(map_transport)?;
        let bytes = response
            .error_for_status()
            .map_err(map_transport)?
            .bytes()
            .await
            .map_err(map_transport)?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> RestClient {
        RestClient::new(
            Url::parse(DEFAULT_ENDPOINT).unwrap(),
            ApiKey::new("test-key").unwrap(),
        )
    }

    fn url_for(term: &str) -> Url {
        client()
            .search_url(&SearchTerm::new(term).unwrap(), 1)
            .unwrap()
    }

    #[test]
    fn search_url_host_and_path() {
        let url = url_for("any");
        assert_eq!(url.host_str(), Some("api.flickr.com"));
        assert_eq!(url.path(), "/services/rest/");
    }

    #[test]
    fn search_url_carries_fixed_parameters() {
        let url = url_for("any");
        let query = url.query().unwrap();
        assert!(query.contains("method=flickr.photos.search"));
        assert!(query.contains("api_key=test-key"));
        assert!(query.contains("per_page=48"));
        assert!(query.contains("format=json"));
        assert!(query.contains("nojsoncallback=1"));
        assert!(query.contains("safe_search=1"));
        assert!(query.contains("page=1"));
    }

    #[test]
    fn search_url_percent_encodes_term() {
        let url = url_for("cute cats");
        assert!(url.query().unwrap().contains("text=cute%20cats"));
    }

    #[test]
    fn search_url_targets_requested_page() {
        let url = client()
            .search_url(&SearchTerm::new("any").unwrap(), 7)
            .unwrap();
        assert!(url.query().unwrap().ends_with("page=7"));
    }
}
