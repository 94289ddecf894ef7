//! Order tracking API.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;
use tracing::instrument;

use crate::error::Result;
use crate::models::TrackedOrder;
use crate::services::orders;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct TrackOrderResponse {
    pub status: &'static str,
    pub data: Vec<TrackedOrder>,
}

/// `GET /rest/track-order/{id}`
///
/// Always succeeds for a working store; unknown numbers are echoed back as
/// `{ orderId }`.
#[instrument(skip(state))]
pub async fn track_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TrackOrderResponse>> {
    let tracked = orders::track(state.store(), &id).await?;

    Ok(Json(TrackOrderResponse {
        status: "success",
        data: vec![tracked],
    }))
}
