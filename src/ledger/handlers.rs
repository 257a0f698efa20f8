use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue},
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use super::{
    dto::{DownloadRequest, Quote, QuoteRequest},
    repo_types::CreditTransaction,
    selection::Selection,
    services,
};
use crate::{
    auth::extractors::ClientUser, error::AppError, export::CSV_CONTENT_TYPE, state::AppState,
};

pub fn ledger_routes() -> Router<AppState> {
    Router::new()
        .route("/leads/quote", post(quote))
        .route("/leads/download", post(download))
        .route("/credits/transactions", get(list_transactions))
}

#[instrument(skip(state, profile, body), fields(user_id = %profile.id))]
pub async fn quote(
    State(state): State<AppState>,
    ClientUser(profile): ClientUser,
    Json(body): Json<QuoteRequest>,
) -> Result<Json<Quote>, AppError> {
    let selection = Selection::from_ids(body.lead_ids);
    let quote = services::quote(state.store.as_ref(), profile.id, &selection).await?;
    Ok(Json(quote))
}

/// POST /leads/download → CSV attachment; the charge commits first.
#[instrument(skip(state, profile, body), fields(user_id = %profile.id))]
pub async fn download(
    State(state): State<AppState>,
    ClientUser(profile): ClientUser,
    Json(body): Json<DownloadRequest>,
) -> Result<(HeaderMap, String), AppError> {
    let selection = Selection::from_ids(body.lead_ids);
    let out = services::download(
        state.store.as_ref(),
        profile.id,
        &selection,
        body.request_id,
        services::today(),
    )
    .await?;

    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{}\"", out.filename))
        .map_err(|e| AppError::Internal(e.into()))?;
    let request_id = HeaderValue::from_str(&out.receipt.request_id.to_string())
        .map_err(|e| AppError::Internal(e.into()))?;

    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(CSV_CONTENT_TYPE));
    headers.insert(header::CONTENT_DISPOSITION, disposition);
    headers.insert("x-credits-charged", HeaderValue::from(out.receipt.charged));
    headers.insert("x-credits-balance", HeaderValue::from(out.receipt.balance));
    headers.insert("x-request-id", request_id);

    Ok((headers, out.csv))
}

#[instrument(skip(state, profile), fields(user_id = %profile.id))]
pub async fn list_transactions(
    State(state): State<AppState>,
    ClientUser(profile): ClientUser,
) -> Result<Json<Vec<CreditTransaction>>, AppError> {
    Ok(Json(state.store.list_transactions(profile.id).await?))
}
