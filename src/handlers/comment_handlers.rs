use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;

use crate::{
    auth::{self, CallerContext},
    collections,
    errors::AppError,
    models::{Comment, DocRef},
    state::AppState,
    validation::{self, FieldType, Schema},
};

const POST_COMMENT_SCHEMA: &Schema = &[
    ("bookId", FieldType::String),
    ("text", FieldType::String),
];

#[derive(Serialize, Debug)]
struct CommentCreated {
    id: String,
}

/// `POST /api/comments` — post a comment on a book.
///
/// The comment's `username` is the id of the caller's public-profile
/// document; a caller without a profile gets `not-found`.
pub async fn post_comment(
    State(state): State<AppState>,
    ctx: CallerContext,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    let uid = auth::check_access(&ctx, false)?;

    let payload = validation::as_object(&body)?;
    validation::validate(payload, POST_COMMENT_SCHEMA)?;
    let book_id = validation::str_field(payload, "bookId")?;
    let text = validation::str_field(payload, "text")?;

    let profile = state
        .documents
        .find_one(collections::PUBLIC_PROFILES, "userId", uid)
        .await?
        .ok_or_else(|| AppError::not_found("no public profile exists for this user"))?;

    let comment = Comment {
        text: text.to_string(),
        username: profile.id,
        date_created: Utc::now(),
        book: DocRef::new(collections::BOOKS, book_id),
    };
    let id = state
        .documents
        .insert(collections::BOOK_COMMENTS, &serde_json::to_value(&comment)?)
        .await?;

    tracing::info!(id = %id, book_id, "posted comment");
    Ok((StatusCode::CREATED, Json(CommentCreated { id })))
}
