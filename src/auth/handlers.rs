use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, PublicProfile, RefreshRequest, SignupRequest},
        email::{is_valid_email, is_work_email},
        extractors::AuthUser,
        jwt::JwtKeys,
        password::{check_length, hash_password, verify_password},
        repo_types::{NewUser, UserProfile},
    },
    error::AppError,
    state::AppState,
};

pub const WORK_EMAIL_REQUIRED: &str =
    "Please use a work email address. Personal emails (Gmail, Yahoo, etc.) are not allowed.";

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
        .route("/auth/logout", post(logout))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me))
}

fn issue_tokens(
    state: &AppState,
    profile: UserProfile,
    session_id: Uuid,
) -> Result<AuthResponse, AppError> {
    let keys = JwtKeys::from_ref(state);
    let access_token = keys.sign_access(profile.id, session_id)?;
    let refresh_token = keys.sign_refresh(profile.id, session_id)?;
    Ok(AuthResponse {
        access_token,
        refresh_token,
        user: profile.into(),
    })
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    Json(mut payload): Json<SignupRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    payload.email = payload.email.trim().to_lowercase();

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(AppError::BadRequest("Invalid email".into()));
    }

    if !is_work_email(&payload.email) {
        warn!(email = %payload.email, "personal email rejected");
        return Err(AppError::BadRequest(WORK_EMAIL_REQUIRED.into()));
    }

    if let Err(msg) = check_length(&payload.password) {
        warn!("password too short");
        return Err(AppError::BadRequest(msg));
    }

    // Ensure email is not taken
    if state.store.find_user_by_email(&payload.email).await?.is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err(AppError::Conflict("Email already registered".into()));
    }

    let password_hash = hash_password(&payload.password)?;
    let profile = state
        .store
        .create_user(NewUser {
            email: payload.email,
            password_hash,
            name: payload.name.trim().to_string(),
            company: payload.company.trim().to_string(),
        })
        .await?;
    let session_id = state.store.create_session(profile.id).await?;

    info!(user_id = %profile.id, email = %profile.email, "user signed up");
    Ok((StatusCode::CREATED, Json(issue_tokens(&state, profile, session_id)?)))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    payload.email = payload.email.trim().to_lowercase();

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(AppError::BadRequest("Invalid email".into()));
    }

    let Some(user) = state.store.find_user_by_email(&payload.email).await? else {
        warn!(email = %payload.email, "login unknown email");
        return Err(AppError::Unauthorized("Invalid credentials".into()));
    };

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(email = %payload.email, user_id = %user.id, "login invalid password");
        return Err(AppError::Unauthorized("Invalid credentials".into()));
    }

    let profile = state
        .store
        .get_profile(user.id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Profile not found".into()))?;
    let session_id = state.store.create_session(user.id).await?;

    info!(user_id = %user.id, role = %profile.role, "user logged in");
    Ok(Json(issue_tokens(&state, profile, session_id)?))
}

#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let keys = JwtKeys::from_ref(&state);
    let claims = keys
        .verify_refresh(&payload.refresh_token)
        .map_err(|e| AppError::Unauthorized(e.to_string()))?;

    if !state.store.session_active(claims.sid).await? {
        return Err(AppError::Unauthorized("Session has ended".into()));
    }

    let profile = state
        .store
        .get_profile(claims.sub)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found".into()))?;

    Ok(Json(issue_tokens(&state, profile, claims.sid)?))
}

#[instrument(skip(state))]
pub async fn logout(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<StatusCode, AppError> {
    state.store.revoke_session(auth.session_id).await?;
    info!(user_id = %auth.user_id, "user signed out");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<PublicProfile>, AppError> {
    let profile = state
        .store
        .get_profile(auth.user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found".into()))?;
    Ok(Json(profile.into()))
}

#[cfg(test)]
mod me_tests {
    use super::*;
    use time::OffsetDateTime;

    #[test]
    fn public_profile_hides_nothing_sensitive() {
        let profile = UserProfile {
            id: Uuid::new_v4(),
            email: "test@acme.com".into(),
            name: "Test".into(),
            company: "Acme".into(),
            credits: 7,
            role: "client".into(),
            status: "active".into(),
            created_at: OffsetDateTime::now_utc(),
        };

        let json = serde_json::to_string(&PublicProfile::from(profile)).unwrap();
        assert!(json.contains("test@acme.com"));
        assert!(json.contains("\"credits\":7"));
        assert!(!json.contains("password"));
    }
}
