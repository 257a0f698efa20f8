use axum::{
    extract::{DefaultBodyLimit, FromRequest, Multipart, Request, State},
    http::header,
    routing::{get, post},
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{info, instrument, warn};

use super::dto::Stats;
use crate::{
    auth::{extractors::AdminUser, repo_types::UserProfile},
    error::AppError,
    leads::{
        dto::ImportResponse,
        import::{has_csv_extension, parse_leads, ImportError},
        repo_types::Lead,
    },
    ledger::{
        dto::{GrantRequest, GrantResponse},
        services,
    },
    state::AppState,
};

/// Largest accepted lead upload.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/leads", get(list_leads))
        .route(
            "/admin/leads/import",
            post(import_leads).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/admin/users", get(list_users))
        .route("/admin/stats", get(stats))
        .route("/admin/credits/grant", post(grant_credits))
}

#[instrument(skip(state, _admin))]
pub async fn list_leads(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> Result<Json<Vec<Lead>>, AppError> {
    Ok(Json(state.store.list_leads(None).await?))
}

#[instrument(skip(state, _admin))]
pub async fn list_users(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> Result<Json<Vec<UserProfile>>, AppError> {
    Ok(Json(state.store.list_profiles().await?))
}

#[instrument(skip(state, _admin))]
pub async fn stats(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> Result<Json<Stats>, AppError> {
    let leads = state.store.list_leads(None).await?;
    let users = state.store.list_profiles().await?;
    Ok(Json(Stats::compute(leads.len(), &users)))
}

/// Accepts a multipart form with a `file` part, or a raw `text/csv` body.
#[instrument(skip(state, admin, req), fields(admin_id = %admin.id))]
pub async fn import_leads(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    req: Request,
) -> Result<Json<ImportResponse>, AppError> {
    let text = read_upload(req, &state).await?;
    let leads = parse_leads(&text, OffsetDateTime::now_utc())?;

    let imported = state
        .store
        .insert_leads(leads)
        .await
        .map_err(ImportError::Store)?;

    info!(imported, "leads imported");
    Ok(Json(ImportResponse { imported }))
}

async fn read_upload(req: Request, state: &AppState) -> Result<String, AppError> {
    let content_type = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase();

    if content_type.starts_with("multipart/form-data") {
        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?
        {
            if field.name() != Some("file") {
                continue;
            }
            if !field.file_name().is_some_and(has_csv_extension) {
                warn!(file_name = ?field.file_name(), "rejected non-csv upload");
                return Err(ImportError::NotCsv.into());
            }
            return field
                .text()
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()));
        }
        return Err(AppError::BadRequest("Missing `file` field".into()));
    }

    if content_type.starts_with("text/csv") {
        return String::from_request(req, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()));
    }

    Err(ImportError::NotCsv.into())
}

#[instrument(skip(state, admin, body), fields(admin_id = %admin.id))]
pub async fn grant_credits(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(body): Json<GrantRequest>,
) -> Result<Json<GrantResponse>, AppError> {
    let credits = services::grant(state.store.as_ref(), admin.id, body.user_id, &body.amount).await?;
    Ok(Json(GrantResponse {
        user_id: body.user_id,
        credits,
    }))
}
