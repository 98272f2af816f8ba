use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use serde_json::Value;

use crate::{
    auth::{self, CallerContext},
    collections,
    errors::AppError,
    models::Author,
    state::AppState,
    validation::{self, FieldType, Schema},
};

const CREATE_AUTHOR_SCHEMA: &Schema = &[("authorName", FieldType::String)];

#[derive(Serialize, Debug)]
struct AuthorCreated {
    id: String,
}

/// `POST /api/authors` — create an author. Admin only.
///
/// Author names are unique: a pre-insert lookup rejects duplicates with
/// `already-exists`.
pub async fn create_author(
    State(state): State<AppState>,
    ctx: CallerContext,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    auth::check_access(&ctx, true)?;

    let payload = validation::as_object(&body)?;
    validation::validate(payload, CREATE_AUTHOR_SCHEMA)?;
    let author_name = validation::str_field(payload, "authorName")?;

    let existing = state
        .documents
        .find_one(collections::AUTHORS, "name", author_name)
        .await?;
    if existing.is_some() {
        return Err(AppError::already_exists("this author already exists"));
    }

    let author = Author {
        name: author_name.to_string(),
    };
    let id = state
        .documents
        .insert(collections::AUTHORS, &serde_json::to_value(&author)?)
        .await?;

    tracing::info!(id = %id, name = author_name, "created author");
    Ok((StatusCode::CREATED, Json(AuthorCreated { id })))
}
