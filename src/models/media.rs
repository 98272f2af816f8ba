use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Metadata for a media payload stored on disk.
///
/// The row is keyed by the object path (e.g. `bookCovers/Dune.png`); the
/// bytes themselves live under the storage directory.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug)]
pub struct MediaObject {
    /// Path-like key of the object, relative to the storage directory.
    pub path: String,

    /// Content type served back on reads.
    pub content_type: String,

    /// Size in bytes.
    pub size_bytes: i64,

    /// MD5 checksum of the payload.
    pub etag: String,

    /// Timestamp of the last write.
    pub last_modified: DateTime<Utc>,
}
