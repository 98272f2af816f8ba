use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use serde_json::Value;

use crate::{
    auth::{self, CallerContext},
    collections,
    errors::AppError,
    models::PublicProfile,
    state::AppState,
    validation::{self, FieldType, Schema},
};

const CREATE_PROFILE_SCHEMA: &Schema = &[
    ("firstname", FieldType::String),
    ("lastname", FieldType::String),
    ("username", FieldType::String),
];

#[derive(Serialize, Debug)]
struct ProfileCreated {
    username: String,
}

/// `POST /api/profiles` — create the caller's public profile.
///
/// A caller gets at most one profile, and a username belongs to at most
/// one caller; both are pre-insert checks. Creating a profile with the
/// configured administrator email grants the admin claim (idempotent).
pub async fn create_profile(
    State(state): State<AppState>,
    ctx: CallerContext,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    let uid = auth::check_access(&ctx, false)?;

    let payload = validation::as_object(&body)?;
    validation::validate(payload, CREATE_PROFILE_SCHEMA)?;
    let firstname = validation::str_field(payload, "firstname")?;
    let lastname = validation::str_field(payload, "lastname")?;
    let username = validation::str_field(payload, "username")?;

    let existing_profile = state
        .documents
        .find_one(collections::PUBLIC_PROFILES, "userId", uid)
        .await?;
    if existing_profile.is_some() {
        return Err(AppError::already_exists(
            "this user already has a public profile",
        ));
    }

    let existing_username = state
        .documents
        .get(collections::PUBLIC_PROFILES, username)
        .await?;
    if existing_username.is_some() {
        return Err(AppError::already_exists(
            "this username already belongs to an existing user",
        ));
    }

    let user = state.identity.get_user(uid).await?;
    if user.email == state.admin_email {
        state.identity.set_admin_claim(uid, true).await?;
    }

    let profile = PublicProfile {
        user_id: uid.to_string(),
        first_name: firstname.to_string(),
        last_name: lastname.to_string(),
    };
    state
        .documents
        .set(
            collections::PUBLIC_PROFILES,
            username,
            &serde_json::to_value(&profile)?,
        )
        .await?;

    tracing::info!(uid, username, "created public profile");
    Ok((
        StatusCode::CREATED,
        Json(ProfileCreated {
            username: username.to_string(),
        }),
    ))
}
