use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};

use crate::db::models::SeriesListingRow;
use crate::error::AppError;
use crate::sync::SyncOrchestrator;
use crate::types::{SubResource, SubResourceReport, SyncReport};

#[derive(Clone)]
pub struct ApiState {
    pub orchestrator: Arc<SyncOrchestrator>,
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/series", get(list_series))
        .route("/series/:id/sync", post(full_sync))
        .route("/series/:id/:resource", get(get_sub_resource))
        .route("/series/:id/:resource/refresh", post(refresh_sub_resource))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn list_series(State(state): State<ApiState>) -> Result<Json<Vec<SeriesListingRow>>, AppError> {
    Ok(Json(state.orchestrator.store().list().await?))
}

async fn get_sub_resource(
    State(state): State<ApiState>,
    Path((series_id, resource)): Path<(String, String)>,
) -> Result<Json<SubResourceReport>, AppError> {
    let resource: SubResource = resource.parse()?;
    Ok(Json(state.orchestrator.get_or_sync(&series_id, resource).await?))
}

async fn refresh_sub_resource(
    State(state): State<ApiState>,
    Path((series_id, resource)): Path<(String, String)>,
) -> Result<Json<SubResourceReport>, AppError> {
    let resource: SubResource = resource.parse()?;
    Ok(Json(state.orchestrator.force_refresh(&series_id, resource).await?))
}

async fn full_sync(
    State(state): State<ApiState>,
    Path(series_id): Path<String>,
) -> Result<Json<SyncReport>, AppError> {
    Ok(Json(state.orchestrator.full_sync(&series_id).await?))
}
