use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use tracing::instrument;

use super::{
    dto::{LeadPage, LeadView},
    filter::{industries, LeadFilter},
    repo_types::STATUS_AVAILABLE,
};
use crate::{auth::extractors::ClientUser, error::AppError, state::AppState};

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/leads", get(list_leads))
        .route("/leads/industries", get(list_industries))
}

#[instrument(skip(state, profile), fields(user_id = %profile.id))]
pub async fn list_leads(
    State(state): State<AppState>,
    ClientUser(profile): ClientUser,
    Query(filter): Query<LeadFilter>,
) -> Result<Json<LeadPage>, AppError> {
    let leads = state.store.list_leads(Some(STATUS_AVAILABLE)).await?;
    let unlocked = state.store.downloaded_lead_ids(profile.id).await?;

    let rows: Vec<LeadView> = filter
        .apply(&leads)
        .into_iter()
        .map(|l| LeadView::new(l, unlocked.contains(&l.id)))
        .collect();

    Ok(Json(LeadPage {
        total: rows.len(),
        leads: rows,
    }))
}

#[instrument(skip(state, _profile))]
pub async fn list_industries(
    State(state): State<AppState>,
    ClientUser(_profile): ClientUser,
) -> Result<Json<Vec<String>>, AppError> {
    let leads = state.store.list_leads(Some(STATUS_AVAILABLE)).await?;
    Ok(Json(industries(&leads)))
}
