//! Training challenge progress.

use axum::{Json, extract::State};

use crate::challenges::ChallengeStatus;
use crate::state::AppState;

/// `GET /rest/challenges`
pub async fn list(State(state): State<AppState>) -> Json<Vec<ChallengeStatus>> {
    Json(state.challenges().list())
}
