//! Photo record and its derived image locator.

use std::fmt;
use std::path::{Path, PathBuf};

use image::DynamicImage;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Error, UnknownResponseError};

/// Flickr static-image size tokens.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PhotoSize {
    /// 75x75 square crop (`s`).
    Square,
    /// Longest side 100px (`t`), the default for grid display.
    #[default]
    Thumbnail,
    /// Longest side 240px (`m`).
    Small,
    /// Longest side 1024px (`b`).
    Large,
}

impl PhotoSize {
    /// The size token used in static-image URLs.
    pub fn token(self) -> &'static str {
        match self {
            PhotoSize::Square => "s",
            PhotoSize::Thumbnail => "t",
            PhotoSize::Small => "m",
            PhotoSize::Large => "b",
        }
    }
}

impl fmt::Display for PhotoSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.token())
    }
}

/// One search result: photo identity plus a mutable thumbnail slot.
///
/// The four identity fields are immutable after construction; only the
/// thumbnail and the local cache path mutate over the record's life. The
/// thumbnail is set shortly after parse by the search backend's prefetch and
/// cleared again when the owning page leaves the retention window.
#[derive(Clone, Serialize, Deserialize)]
pub struct PhotoRecord {
    id: String,
    farm: u32,
    server: String,
    secret: String,
    #[serde(skip)]
    thumbnail: Option<DynamicImage>,
    local_cache_path: Option<PathBuf>,
}

impl PhotoRecord {
    /// Create a new record from its identity fields.
    pub fn new(
        id: impl Into<String>,
        farm: u32,
        server: impl Into<String>,
        secret: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            farm,
            server: server.into(),
            secret: secret.into(),
            thumbnail: None,
            local_cache_path: None,
        }
    }

    /// Opaque photo identifier, stable across pages.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Farm number of the hosting static server.
    pub fn farm(&self) -> u32 {
        self.farm
    }

    /// Static server identifier.
    pub fn server(&self) -> &str {
        &self.server
    }

    /// Per-photo URL secret.
    pub fn secret(&self) -> &str {
        &self.secret
    }

    /// Derive the static-image URL for this record at the given size.
    ///
    /// This is a pure function of the identity fields.
    ///
    /// # Errors
    ///
    /// Returns `UnknownResponse` if the URL cannot be constructed, which
    /// would take identity fields the server should never produce.
    pub fn image_url(&self, size: PhotoSize) -> Result<Url, Error> {
        let raw = format!(
            "https://farm{}.static.flickr.com/{}/{}_{}_{}.jpg",
            self.farm, self.server, self.id, self.secret, size
        );
        Url::parse(&raw).map_err(|e| {
            UnknownResponseError::Url {
                value: raw,
                reason: e.to_string(),
            }
            .into()
        })
    }

    /// The decoded in-memory thumbnail, if currently retained.
    pub fn thumbnail(&self) -> Option<&DynamicImage> {
        self.thumbnail.as_ref()
    }

    /// Store a decoded thumbnail.
    pub fn set_thumbnail(&mut self, image: DynamicImage) {
        self.thumbnail = Some(image);
    }

    /// Drop the decoded thumbnail, freeing its memory. Metadata and the
    /// local cache path stay addressable.
    pub fn clear_thumbnail(&mut self) {
        self.thumbnail = None;
    }

    /// The resolved local cache location for this photo, if configured.
    pub fn local_cache_path(&self) -> Option<&Path> {
        self.local_cache_path.as_deref()
    }

    /// Record where a persisted copy of this photo would live.
    pub fn set_local_cache_path(&mut self, path: PathBuf) {
        self.local_cache_path = Some(path);
    }
}

impl fmt::Debug for PhotoRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhotoRecord")
            .field("id", &self.id)
            .field("farm", &self.farm)
            .field("server", &self.server)
            .field("secret", &self.secret)
            .field(
                "thumbnail",
                &self.thumbnail.as_ref().map(|t| (t.width(), t.height())),
            )
            .field("local_cache_path", &self.local_cache_path)
            .finish()
    }
}
