use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use serde_json::Value;

use crate::{
    auth::{self, CallerContext},
    collections,
    errors::AppError,
    models::{Book, DocRef},
    services::media_service::{
        self, BOOK_COVER_PREFIX, DataUriImage, FAR_FUTURE_EXPIRY_UNIX, extension_for_mime,
    },
    state::AppState,
    validation::{self, FieldType, Schema},
};

const CREATE_BOOK_SCHEMA: &Schema = &[
    ("authorId", FieldType::String),
    ("bookCover", FieldType::String),
    ("bookName", FieldType::String),
    ("summary", FieldType::String),
];

#[derive(Serialize, Debug)]
struct BookCreated {
    id: String,
}

/// `POST /api/books` — create a book with its cover image. Admin only.
///
/// `bookCover` is a base64 data-URI; the decoded bytes are stored under
/// `bookCovers/<bookName>.<ext>` and the book document records a
/// far-future signed read URL. The author reference is written as given,
/// without checking that the author exists, and a stored cover is not
/// rolled back if the document insert fails.
pub async fn create_book(
    State(state): State<AppState>,
    ctx: CallerContext,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    auth::check_access(&ctx, true)?;

    let payload = validation::as_object(&body)?;
    validation::validate(payload, CREATE_BOOK_SCHEMA)?;
    let author_id = validation::str_field(payload, "authorId")?;
    let book_cover = validation::str_field(payload, "bookCover")?;
    let book_name = validation::str_field(payload, "bookName")?;
    let summary = validation::str_field(payload, "summary")?;

    let DataUriImage { mime, bytes } = media_service::parse_data_uri(book_cover)?;
    let key = format!(
        "{}/{}.{}",
        BOOK_COVER_PREFIX,
        book_name,
        extension_for_mime(&mime)
    );

    state.media.store(&key, bytes, &mime).await?;
    let image_uri = state.media.signed_read_url(&key, FAR_FUTURE_EXPIRY_UNIX);

    let book = Book {
        author: DocRef::new(collections::AUTHORS, author_id),
        image_uri,
        summary: summary.to_string(),
        title: book_name.to_string(),
    };
    let id = state
        .documents
        .insert(collections::BOOKS, &serde_json::to_value(&book)?)
        .await?;

    tracing::info!(id = %id, title = book_name, "created book");
    Ok((StatusCode::CREATED, Json(BookCreated { id })))
}
