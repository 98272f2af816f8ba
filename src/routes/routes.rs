//! Route table for the catalog API.
//!
//! ## Structure
//! - **Catalog operations** (JSON, bearer-token callers)
//!   - `POST /api/authors`  — create author (admin)
//!   - `POST /api/books`    — create book + cover upload (admin)
//!   - `POST /api/profiles` — create the caller's public profile
//!   - `POST /api/comments` — post a comment on a book
//!
//! - **Media**
//!   - `GET /media/{*key}` — stream a stored object; authorized by the
//!     signed URL issued at upload time. The wildcard allows nested keys
//!     like `bookCovers/Dune.png`.
//!
//! - **Probes**: `GET /healthz`, `GET /readyz`.

use crate::{
    handlers::{
        author_handlers::create_author,
        book_handlers::create_book,
        comment_handlers::post_comment,
        health_handlers::{healthz, readyz},
        media_handlers::get_media,
        profile_handlers::create_profile,
    },
    state::AppState,
};
use axum::{
    Router,
    routing::{get, post},
};

/// Build and return the router for all catalog and media routes.
///
/// The router carries shared state (`AppState`) to all handlers.
pub fn routes() -> Router<AppState> {
    Router::new()
        // health endpoints (mounted at root)
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // catalog operations
        .route("/api/authors", post(create_author))
        .route("/api/books", post(create_book))
        .route("/api/profiles", post(create_profile))
        .route("/api/comments", post(post_comment))
        // signed media reads
        .route("/media/{*key}", get(get_media))
}
