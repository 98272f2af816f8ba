//! MediaService — object storage for uploaded images, backed by SQLite for
//! metadata and local disk for payloads, plus capability-bearing signed
//! read URLs served by this process.
//!
//! Covers arrive inline as base64 data-URIs, so writes are buffered; reads
//! stream from disk. Objects are never updated or deleted by the catalog
//! handlers.

use base64::{Engine as _, engine::general_purpose};
use bytes::Bytes;
use chrono::Utc;
use sha2::{Digest, Sha256};
use sqlx::SqlitePool;
use std::{
    io::{self, ErrorKind},
    path::{Path, PathBuf},
    sync::Arc,
};
use subtle::ConstantTimeEq;
use thiserror::Error;
use tokio::{
    fs::{self, File},
    io::AsyncWriteExt,
};
use tracing::debug;
use uuid::Uuid;

use crate::models::MediaObject;

/// Storage prefix for book cover images.
pub const BOOK_COVER_PREFIX: &str = "bookCovers";

/// Expiry used for cover-image URLs: 2491-03-09T00:00:00Z, i.e. effectively
/// permanent.
pub const FAR_FUTURE_EXPIRY_UNIX: i64 = 16_447_017_600;

const MAX_OBJECT_KEY_LEN: usize = 1024;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("invalid object key")]
    InvalidObjectKey,
    #[error("image is not a valid base64 data-URI")]
    MalformedDataUri,
    #[error("media object `{0}` not found")]
    ObjectNotFound(String),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type MediaResult<T> = Result<T, MediaError>;

/// A decoded `data:<mime>;base64,<payload>` image.
#[derive(Debug, Clone)]
pub struct DataUriImage {
    pub mime: String,
    pub bytes: Bytes,
}

/// Parse a strict `data:<mime>;base64,<payload>` string.
pub fn parse_data_uri(input: &str) -> MediaResult<DataUriImage> {
    let rest = input
        .strip_prefix("data:")
        .ok_or(MediaError::MalformedDataUri)?;
    let (header, payload) = rest.split_once(',').ok_or(MediaError::MalformedDataUri)?;
    let mime = header
        .strip_suffix(";base64")
        .ok_or(MediaError::MalformedDataUri)?;

    let (kind, subtype) = mime.split_once('/').ok_or(MediaError::MalformedDataUri)?;
    if kind.is_empty() || subtype.is_empty() {
        return Err(MediaError::MalformedDataUri);
    }

    let bytes = general_purpose::STANDARD
        .decode(payload)
        .map_err(|_| MediaError::MalformedDataUri)?;

    Ok(DataUriImage {
        mime: mime.to_string(),
        bytes: Bytes::from(bytes),
    })
}

/// File extension for a detected MIME type. Unknown subtypes fall back to
/// the subtype itself.
pub fn extension_for_mime(mime: &str) -> &str {
    match mime {
        "image/jpeg" => "jpg",
        "image/png" => "png",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "image/svg+xml" => "svg",
        other => other.rsplit('/').next().unwrap_or("bin"),
    }
}

/// Object storage handle: metadata in SQLite, payloads on disk under
/// `base_path`, signed URLs rooted at `public_base_url`.
#[derive(Clone)]
pub struct MediaService {
    pub db: Arc<SqlitePool>,
    pub base_path: PathBuf,
    public_base_url: String,
    signing_secret: String,
}

impl MediaService {
    pub fn new(
        db: Arc<SqlitePool>,
        base_path: impl Into<PathBuf>,
        public_base_url: impl Into<String>,
        signing_secret: impl Into<String>,
    ) -> Self {
        let mut public_base_url = public_base_url.into();
        while public_base_url.ends_with('/') {
            public_base_url.pop();
        }
        Self {
            db,
            base_path: base_path.into(),
            public_base_url,
            signing_secret: signing_secret.into(),
        }
    }

    /// Basic key validation to avoid trivial path traversal vectors.
    ///
    /// Rejects empty or oversized keys, keys that begin with `/`, and keys
    /// containing `..`, control bytes, or backslashes.
    fn ensure_key_safe(&self, key: &str) -> MediaResult<()> {
        if key.is_empty() || key.len() > MAX_OBJECT_KEY_LEN {
            return Err(MediaError::InvalidObjectKey);
        }
        if key.starts_with('/') || key.contains("..") {
            return Err(MediaError::InvalidObjectKey);
        }
        if key
            .bytes()
            .any(|b| b.is_ascii_control() || b == b'\\' || b == b'\0')
        {
            return Err(MediaError::InvalidObjectKey);
        }
        Ok(())
    }

    fn object_path(&self, key: &str) -> PathBuf {
        let mut path = self.base_path.clone();
        path.push(key);
        path
    }

    /// Write an object durably and upsert its metadata row.
    ///
    /// Bytes go to a temporary file first, then fsync + rename into place,
    /// so a crash never leaves a partial object at the final path.
    pub async fn store(
        &self,
        key: &str,
        bytes: Bytes,
        content_type: &str,
    ) -> MediaResult<MediaObject> {
        self.ensure_key_safe(key)?;

        let file_path = self.object_path(key);
        let parent = file_path.parent().map(Path::to_path_buf).ok_or_else(|| {
            MediaError::Io(io::Error::other("object path missing parent directory"))
        })?;
        fs::create_dir_all(&parent).await?;

        let tmp_path = parent.join(format!(".tmp-{}", Uuid::new_v4()));
        let mut file = File::create(&tmp_path).await?;
        let write_result = async {
            file.write_all(&bytes).await?;
            file.flush().await?;
            file.sync_all().await
        }
        .await;
        if let Err(err) = write_result {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(MediaError::Io(err));
        }

        if let Err(err) = fs::rename(&tmp_path, &file_path).await {
            if err.kind() == ErrorKind::AlreadyExists {
                fs::remove_file(&file_path).await?;
                fs::rename(&tmp_path, &file_path).await?;
            } else {
                let _ = fs::remove_file(&tmp_path).await;
                return Err(MediaError::Io(err));
            }
        }

        let etag = format!("{:x}", md5::compute(&bytes));
        let last_modified = Utc::now();

        let object = sqlx::query_as::<_, MediaObject>(
            "INSERT INTO media_objects (path, content_type, size_bytes, etag, last_modified)
             VALUES (?, ?, ?, ?, ?)
             ON CONFLICT(path) DO UPDATE SET
                 content_type = excluded.content_type,
                 size_bytes = excluded.size_bytes,
                 etag = excluded.etag,
                 last_modified = excluded.last_modified
             RETURNING path, content_type, size_bytes, etag, last_modified",
        )
        .bind(key)
        .bind(content_type)
        .bind(bytes.len() as i64)
        .bind(&etag)
        .bind(last_modified)
        .fetch_one(&*self.db)
        .await?;

        debug!(key, size = bytes.len(), content_type, "stored media object");
        Ok(object)
    }

    /// Signed, time-scoped read URL for a stored object.
    pub fn signed_read_url(&self, key: &str, expires_unix: i64) -> String {
        let signature = self.signature_for(key, expires_unix);
        format!(
            "{}/media/{}?expires={}&signature={}",
            self.public_base_url, key, expires_unix, signature
        )
    }

    /// Check a presented signature against the expected one in constant
    /// time. Expired timestamps fail regardless of the signature.
    pub fn verify_signature(&self, key: &str, expires_unix: i64, signature: &str) -> bool {
        if expires_unix < Utc::now().timestamp() {
            return false;
        }
        let expected = self.signature_for(key, expires_unix);
        expected.as_bytes().ct_eq(signature.as_bytes()).into()
    }

    fn signature_for(&self, key: &str, expires_unix: i64) -> String {
        let mut hasher = Sha256::new();
        hasher.update(key.as_bytes());
        hasher.update(b"\n");
        hasher.update(expires_unix.to_string().as_bytes());
        hasher.update(b"\n");
        hasher.update(self.signing_secret.as_bytes());
        general_purpose::URL_SAFE_NO_PAD.encode(hasher.finalize())
    }

    /// Fetch an object for reading: metadata plus an opened file handle.
    pub async fn open_reader(&self, key: &str) -> MediaResult<(MediaObject, File)> {
        self.ensure_key_safe(key)?;

        let object = sqlx::query_as::<_, MediaObject>(
            "SELECT path, content_type, size_bytes, etag, last_modified
             FROM media_objects WHERE path = ?",
        )
        .bind(key)
        .fetch_optional(&*self.db)
        .await?
        .ok_or_else(|| MediaError::ObjectNotFound(key.to_string()))?;

        let file = File::open(self.object_path(key)).await.map_err(|err| {
            if err.kind() == ErrorKind::NotFound {
                MediaError::ObjectNotFound(key.to_string())
            } else {
                MediaError::Io(err)
            }
        })?;

        Ok((object, file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database;
    use sqlx::sqlite::SqlitePoolOptions;
    use tokio::io::AsyncReadExt;

    // 1x1 transparent PNG.
    const PNG_DATA_URI: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

    async fn service() -> MediaService {
        let db = Arc::new(
            SqlitePoolOptions::new()
                .max_connections(1)
                .connect("sqlite::memory:")
                .await
                .unwrap(),
        );
        database::run_migrations(&db).await.unwrap();
        let base = std::env::temp_dir().join(format!("bookclub-media-{}", Uuid::new_v4()));
        MediaService::new(db, base, "http://localhost:3000/", "test-secret")
    }

    #[test]
    fn parses_valid_data_uri() {
        let image = parse_data_uri(PNG_DATA_URI).unwrap();
        assert_eq!(image.mime, "image/png");
        // PNG magic bytes survive the round trip.
        assert_eq!(&image.bytes[..4], &[0x89, b'P', b'N', b'G']);
    }

    #[test]
    fn rejects_malformed_data_uris() {
        for input in [
            "image/png;base64,AAAA",
            "data:image/png,AAAA",
            "data:;base64,AAAA",
            "data:image/png;base64,not!!base64",
            "data:image-png;base64,AAAA",
        ] {
            assert!(
                matches!(parse_data_uri(input), Err(MediaError::MalformedDataUri)),
                "expected malformed: {input}"
            );
        }
    }

    #[test]
    fn maps_mime_types_to_extensions() {
        assert_eq!(extension_for_mime("image/jpeg"), "jpg");
        assert_eq!(extension_for_mime("image/png"), "png");
        assert_eq!(extension_for_mime("image/svg+xml"), "svg");
        assert_eq!(extension_for_mime("image/x-icon"), "x-icon");
    }

    #[tokio::test]
    async fn signed_urls_verify_and_tampering_fails() {
        let service = service().await;
        let url = service.signed_read_url("bookCovers/Dune.png", FAR_FUTURE_EXPIRY_UNIX);
        assert!(url.starts_with("http://localhost:3000/media/bookCovers/Dune.png?expires="));

        let signature = url.rsplit("signature=").next().unwrap();
        assert!(service.verify_signature("bookCovers/Dune.png", FAR_FUTURE_EXPIRY_UNIX, signature));
        assert!(!service.verify_signature("bookCovers/Other.png", FAR_FUTURE_EXPIRY_UNIX, signature));
        assert!(!service.verify_signature("bookCovers/Dune.png", FAR_FUTURE_EXPIRY_UNIX, "forged"));
    }

    #[tokio::test]
    async fn expired_signatures_fail() {
        let service = service().await;
        let past = Utc::now().timestamp() - 60;
        let signature = service.signature_for("bookCovers/Dune.png", past);
        assert!(!service.verify_signature("bookCovers/Dune.png", past, &signature));
    }

    #[tokio::test]
    async fn store_then_open_reader_round_trips() {
        let service = service().await;
        let image = parse_data_uri(PNG_DATA_URI).unwrap();

        let stored = service
            .store("bookCovers/Dune.png", image.bytes.clone(), &image.mime)
            .await
            .unwrap();
        assert_eq!(stored.content_type, "image/png");
        assert_eq!(stored.size_bytes, image.bytes.len() as i64);

        let (meta, mut file) = service.open_reader("bookCovers/Dune.png").await.unwrap();
        assert_eq!(meta.etag, stored.etag);
        let mut read_back = Vec::new();
        file.read_to_end(&mut read_back).await.unwrap();
        assert_eq!(read_back, image.bytes);
    }

    #[tokio::test]
    async fn traversal_keys_are_rejected() {
        let service = service().await;
        let err = service
            .store("../escape.png", Bytes::from_static(b"x"), "image/png")
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::InvalidObjectKey));

        let err = service.open_reader("/etc/passwd").await.unwrap_err();
        assert!(matches!(err, MediaError::InvalidObjectKey));
    }

    #[tokio::test]
    async fn missing_objects_are_not_found() {
        let service = service().await;
        let err = service.open_reader("bookCovers/nope.png").await.unwrap_err();
        assert!(matches!(err, MediaError::ObjectNotFound(_)));
    }
}
