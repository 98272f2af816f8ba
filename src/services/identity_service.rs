//! IdentityService — identity records, bearer-token resolution, and the
//! elevated-privilege claim.
//!
//! Callers authenticate with an opaque API token minted at provisioning
//! time. The token is resolved on every request into the caller's uid and
//! admin claim; there is no session state.

use base64::{Engine as _, engine::general_purpose};
use chrono::Utc;
use rand::{RngCore, rngs::OsRng};
use sqlx::SqlitePool;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::models::UserRecord;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("no identity record for uid `{0}`")]
    UnknownUser(String),
    #[error("email `{0}` is already registered")]
    EmailTaken(String),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

pub type IdentityResult<T> = Result<T, IdentityError>;

/// The identity and claims attached to an inbound request.
#[derive(Debug, Clone)]
pub struct Claims {
    pub uid: String,
    pub admin: bool,
}

#[derive(Clone)]
pub struct IdentityService {
    db: Arc<SqlitePool>,
}

impl IdentityService {
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }

    /// Resolve a bearer token into the caller's claims. Unknown tokens
    /// resolve to `None` — the access guard turns that into
    /// `unauthenticated`.
    pub async fn resolve_token(&self, token: &str) -> IdentityResult<Option<Claims>> {
        let row = sqlx::query_as::<_, (String, bool)>(
            "SELECT uid, is_admin FROM users WHERE api_token = ?",
        )
        .bind(token)
        .fetch_optional(&*self.db)
        .await?;

        Ok(row.map(|(uid, admin)| Claims { uid, admin }))
    }

    /// Fetch the identity record behind a uid. Uids are minted by this
    /// service, so an unknown uid is a collaborator failure, not caller
    /// error.
    pub async fn get_user(&self, uid: &str) -> IdentityResult<UserRecord> {
        sqlx::query_as::<_, UserRecord>(
            "SELECT uid, email, display_name, api_token, is_admin, created_at
             FROM users WHERE uid = ?",
        )
        .bind(uid)
        .fetch_optional(&*self.db)
        .await?
        .ok_or_else(|| IdentityError::UnknownUser(uid.to_string()))
    }

    /// Grant or revoke the admin claim. Idempotent.
    pub async fn set_admin_claim(&self, uid: &str, admin: bool) -> IdentityResult<()> {
        let result = sqlx::query("UPDATE users SET is_admin = ? WHERE uid = ?")
            .bind(admin)
            .bind(uid)
            .execute(&*self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(IdentityError::UnknownUser(uid.to_string()));
        }

        info!(uid, admin, "updated privilege claim");
        Ok(())
    }

    /// Create an identity record and mint its API token. Used by the
    /// provisioning CLI; there is no HTTP signup surface.
    pub async fn create_user(
        &self,
        email: &str,
        display_name: Option<&str>,
        admin: bool,
    ) -> IdentityResult<UserRecord> {
        let user = UserRecord {
            uid: Uuid::new_v4().to_string(),
            email: email.to_string(),
            display_name: display_name.map(str::to_string),
            api_token: generate_token(),
            is_admin: admin,
            created_at: Utc::now(),
        };

        let inserted = sqlx::query(
            "INSERT INTO users (uid, email, display_name, api_token, is_admin, created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&user.uid)
        .bind(&user.email)
        .bind(&user.display_name)
        .bind(&user.api_token)
        .bind(user.is_admin)
        .bind(user.created_at)
        .execute(&*self.db)
        .await;

        match inserted {
            Ok(_) => {
                info!(uid = %user.uid, email, "created identity record");
                Ok(user)
            }
            Err(err) if is_unique_violation(&err) => {
                Err(IdentityError::EmailTaken(email.to_string()))
            }
            Err(err) => Err(IdentityError::Sqlx(err)),
        }
    }
}

/// 256-bit random token, URL-safe base64 without padding.
fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db_err) if db_err.message().to_ascii_lowercase().contains("unique")
    )
}
