use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// An identity record.
///
/// `api_token` is the opaque bearer credential handed to the user at
/// provisioning time; it is resolved on every request and never included
/// in HTTP responses. `is_admin` is the elevated-privilege claim.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug)]
pub struct UserRecord {
    pub uid: String,
    pub email: String,
    pub display_name: Option<String>,
    pub api_token: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}
