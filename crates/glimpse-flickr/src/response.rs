//! Wire types and decoding for photos.search responses.
//!
//! Decoding runs in two stages: the body is parsed loosely first, then each
//! photo descriptor is projected into a strict record individually, so one
//! malformed descriptor drops that entry instead of failing the page.

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use glimpse_core::error::{ApiError, UnknownResponseError};
use glimpse_core::{PhotoRecord, Result};

/// The `photos` section of a successful response. Descriptors stay loosely
/// typed until projection.
#[derive(Debug, Deserialize)]
pub(crate) struct PhotosPayload {
    pub page: u32,
    pub pages: u32,
    pub photo: Vec<Value>,
}

/// One strict photo descriptor. Extra response fields are ignored.
#[derive(Debug, Deserialize)]
struct PhotoDescriptor {
    id: String,
    farm: u32,
    server: String,
    secret: String,
}

/// Decode a response body, enforcing the `stat` contract.
pub(crate) fn decode_search(body: &str) -> Result<PhotosPayload> {
    let root: Value = serde_json::from_str(body).map_err(|e| UnknownResponseError::Json {
        reason: e.to_string(),
    })?;

    let stat = root
        .get("stat")
        .and_then(Value::as_str)
        .ok_or(UnknownResponseError::MissingField { field: "stat" })?;

    match stat {
        "ok" => {}
        "fail" => {
            let code = root.get("code").and_then(Value::as_i64);
            let message = root
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_owned);
            return Err(ApiError::new(code, message).into());
        }
        other => {
            return Err(UnknownResponseError::UnexpectedStat {
                stat: other.to_owned(),
            }
            .into());
        }
    }

    let photos = root
        .get("photos")
        .cloned()
        .ok_or(UnknownResponseError::MissingField { field: "photos" })?;
    serde_json::from_value(photos).map_err(|e| {
        UnknownResponseError::Json {
            reason: e.to_string(),
        }
        .into()
    })
}

/// Project loose descriptors into records, silently dropping entries that
/// are missing any identity field or carry one with the wrong type.
pub(crate) fn project_records(descriptors: Vec<Value>) -> Vec<PhotoRecord> {
    descriptors
        .into_iter()
        .filter_map(
            |value| match serde_json::from_value::<PhotoDescriptor>(value) {
                Ok(d) => Some(PhotoRecord::new(d.id, d.farm, d.server, d.secret)),
                Err(reason) => {
                    debug!(%reason, "dropping malformed photo descriptor");
                    None
                }
            },
        )
        .collect()
}
