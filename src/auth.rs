//! Caller identity and the access guard.
//!
//! The extractor resolves `Authorization: Bearer <token>` into a
//! [`CallerContext`]. Resolution never rejects on its own for missing or
//! unknown credentials — it produces an unauthenticated context and leaves
//! classification to [`check_access`], which every handler runs before any
//! collaborator call.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use crate::{errors::AppError, state::AppState};

/// The authenticated identity and claims attached to an inbound request.
#[derive(Debug, Clone, Default)]
pub struct CallerContext {
    pub uid: Option<String>,
    pub admin: bool,
}

impl CallerContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn is_authenticated(&self) -> bool {
        self.uid.is_some()
    }
}

impl FromRequestParts<AppState> for CallerContext {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "));

        let Some(token) = token else {
            return Ok(Self::anonymous());
        };

        match state.identity.resolve_token(token).await? {
            Some(claims) => Ok(Self {
                uid: Some(claims.uid),
                admin: claims.admin,
            }),
            None => Ok(Self::anonymous()),
        }
    }
}

/// Gate a handler on authentication and, optionally, the admin claim.
/// Returns the caller's uid on success.
pub fn check_access(ctx: &CallerContext, require_admin: bool) -> Result<&str, AppError> {
    let Some(uid) = ctx.uid.as_deref() else {
        return Err(AppError::unauthenticated(
            "you must be signed in to use this feature",
        ));
    };

    if require_admin && !ctx.admin {
        return Err(AppError::permission_denied(
            "you must be an admin to use this feature",
        ));
    }

    Ok(uid)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caller(uid: Option<&str>, admin: bool) -> CallerContext {
        CallerContext {
            uid: uid.map(str::to_string),
            admin,
        }
    }

    #[test]
    fn anonymous_is_unauthenticated_even_without_admin_requirement() {
        for require_admin in [false, true] {
            let err = check_access(&CallerContext::anonymous(), require_admin).unwrap_err();
            assert_eq!(err.code, "unauthenticated");
        }
    }

    #[test]
    fn authenticated_non_admin_is_denied_only_when_admin_required() {
        let ctx = caller(Some("u1"), false);
        assert_eq!(check_access(&ctx, false).unwrap(), "u1");

        let err = check_access(&ctx, true).unwrap_err();
        assert_eq!(err.code, "permission-denied");
    }

    #[test]
    fn admin_passes_both_modes() {
        let ctx = caller(Some("u1"), true);
        assert_eq!(check_access(&ctx, false).unwrap(), "u1");
        assert_eq!(check_access(&ctx, true).unwrap(), "u1");
    }
}
