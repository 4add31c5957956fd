use async_trait::async_trait;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;
use uuid::Uuid;

use super::jwt::JwtKeys;
use crate::{error::AppError, state::AppState, users::repo_types::Role};

/// Identity resolved from the bearer token of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub id: Uuid,
    pub role: Role,
}

impl Caller {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// True when `raw_id` names the caller, or the caller is an admin.
    /// Ids that do not parse never match.
    pub fn can_access(&self, raw_id: &str) -> bool {
        self.is_admin() || Uuid::parse_str(raw_id).is_ok_and(|id| id == self.id)
    }

    pub fn ensure_access(&self, raw_id: &str) -> Result<(), AppError> {
        if self.can_access(raw_id) {
            Ok(())
        } else {
            warn!(caller = %self.id, target = raw_id, "record access denied");
            Err(AppError::Unauthorized)
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for Caller {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or(AppError::Unauthenticated("missing Authorization header"))?;

        // Expect "Bearer <token>"
        let token = auth
            .strip_prefix("Bearer ")
            .or_else(|| auth.strip_prefix("bearer "))
            .ok_or(AppError::Unauthenticated("invalid auth scheme"))?;

        let claims = JwtKeys::from_ref(state)
            .verify(token)
            .map_err(|_| AppError::Unauthenticated("invalid or expired token"))?;

        // Role decisions use the stored record, so deleted users and role
        // changes take effect before the token expires.
        let user = state
            .users
            .find_by_id(claims.sub)
            .await?
            .ok_or(AppError::Unauthenticated("token subject no longer exists"))?;

        Ok(Caller {
            id: user.id,
            role: user.role,
        })
    }
}

/// A [`Caller`] holding the Admin role.
#[derive(Debug, Clone, Copy)]
pub struct AdminCaller(pub Caller);

#[async_trait]
impl FromRequestParts<AppState> for AdminCaller {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let caller = Caller::from_request_parts(parts, state).await?;
        if !caller.is_admin() {
            warn!(caller = %caller.id, "admin route denied");
            return Err(AppError::Unauthorized);
        }
        Ok(AdminCaller(caller))
    }
}
