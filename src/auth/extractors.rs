use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;
use uuid::Uuid;

use super::jwt::{JwtKeys, TokenKind};
use super::repo_types::UserProfile;
use crate::{error::AppError, state::AppState};

/// Validated bearer token bound to a live session.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub session_id: Uuid,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        // Read Authorization header
        let auth = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".into()))?;

        // Expect "Bearer <token>"
        let token = auth
            .strip_prefix("Bearer ")
            .or_else(|| auth.strip_prefix("bearer "))
            .ok_or_else(|| AppError::Unauthorized("Invalid Authorization header".into()))?;

        let keys = JwtKeys::from_ref(state);
        let claims = keys.verify(token).map_err(|_| {
            warn!("invalid or expired token");
            AppError::Unauthorized("Invalid or expired token".into())
        })?;

        if claims.kind != TokenKind::Access {
            return Err(AppError::Unauthorized("Access token required".into()));
        }

        if !state.store.session_active(claims.sid).await? {
            return Err(AppError::Unauthorized("Session has ended".into()));
        }

        Ok(AuthUser {
            user_id: claims.sub,
            session_id: claims.sid,
        })
    }
}

async fn load_profile(parts: &mut Parts, state: &AppState) -> Result<UserProfile, AppError> {
    let auth = AuthUser::from_request_parts(parts, state).await?;
    state
        .store
        .get_profile(auth.user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Profile not found".into()))
}

/// Signed-in user with the `client` role.
pub struct ClientUser(pub UserProfile);

#[async_trait]
impl FromRequestParts<AppState> for ClientUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let profile = load_profile(parts, state).await?;
        if profile.is_admin() {
            return Err(AppError::Forbidden("Admin accounts use the admin console".into()));
        }
        Ok(ClientUser(profile))
    }
}

/// Signed-in user with the `admin` role.
pub struct AdminUser(pub UserProfile);

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let profile = load_profile(parts, state).await?;
        if !profile.is_admin() {
            warn!(user_id = %profile.id, "non-admin hit admin route");
            return Err(AppError::Forbidden("Admin access required".into()));
        }
        Ok(AdminUser(profile))
    }
}
