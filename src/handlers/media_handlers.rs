//! Signed media reads. The signed URL issued at upload time is the only
//! read capability; no other authentication applies here.

use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::Response,
};
use serde::Deserialize;
use tokio_util::io::ReaderStream;

use crate::{errors::AppError, models::MediaObject, state::AppState};

/// Query params carried by a signed read URL.
#[derive(Debug, Deserialize)]
pub struct SignedReadQuery {
    pub expires: i64,
    pub signature: String,
}

/// `GET /media/{*key}?expires=&signature=` — stream a stored object.
///
/// The signature covers the key and expiry; a mismatch or an expired
/// timestamp is rejected before any storage access.
pub async fn get_media(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Query(query): Query<SignedReadQuery>,
) -> Result<Response, AppError> {
    if !state
        .media
        .verify_signature(&key, query.expires, &query.signature)
    {
        return Err(AppError::permission_denied(
            "signature is invalid or expired",
        ));
    }

    let (meta, file) = state.media.open_reader(&key).await?;
    let stream = ReaderStream::new(file);

    let mut response = Response::new(Body::from_stream(stream));
    *response.status_mut() = StatusCode::OK;
    set_media_headers(response.headers_mut(), &meta);

    Ok(response)
}

fn set_media_headers(headers: &mut HeaderMap, meta: &MediaObject) {
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(&meta.content_type)
            .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream")),
    );

    headers.insert(
        header::CONTENT_LENGTH,
        HeaderValue::from_str(&meta.size_bytes.max(0).to_string())
            .unwrap_or_else(|_| HeaderValue::from_static("0")),
    );

    let quoted_etag = format!("\"{}\"", meta.etag);
    if let Ok(value) = HeaderValue::from_str(&quoted_etag) {
        headers.insert(header::ETAG, value);
    }

    if let Ok(value) = HeaderValue::from_str(&meta.last_modified.to_rfc2822()) {
        headers.insert(header::LAST_MODIFIED, value);
    }
}
