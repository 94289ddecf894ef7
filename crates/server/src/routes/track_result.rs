//! Order tracking page.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Query, State};
use serde::Deserialize;
use tracing::instrument;

use pulp_core::DeliveryStatus;

use crate::error::Result;
use crate::services::orders::{self, TrackingView};
use crate::state::AppState;

/// Query parameters of the tracking page.
#[derive(Debug, Deserialize)]
pub struct TrackResultQuery {
    #[serde(default)]
    pub id: String,
}

/// One stage of the progress bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusStep {
    pub label: &'static str,
    /// The order has reached this stage.
    pub reached: bool,
    /// This is the order's current stage.
    pub current: bool,
}

impl StatusStep {
    fn all(status: DeliveryStatus) -> Vec<Self> {
        DeliveryStatus::ALL
            .iter()
            .map(|&step| Self {
                label: step.label(),
                reached: step <= status,
                current: step == status,
            })
            .collect()
    }
}

/// Tracking page template.
#[derive(Template, WebTemplate)]
#[template(path = "track_result.html")]
pub struct TrackResultTemplate {
    pub view: TrackingView,
    pub steps: Vec<StatusStep>,
}

impl TrackResultTemplate {
    fn new(view: TrackingView) -> Self {
        let steps = StatusStep::all(view.status);
        Self { view, steps }
    }
}

/// `GET /track-result?id=`
#[instrument(skip(state))]
pub async fn track_result(
    State(state): State<AppState>,
    Query(query): Query<TrackResultQuery>,
) -> Result<TrackResultTemplate> {
    render(&state, &query.id, false).await
}

/// `GET /track-result/new?id=`, reached right after checkout.
#[instrument(skip(state))]
pub async fn track_new_order(
    State(state): State<AppState>,
    Query(query): Query<TrackResultQuery>,
) -> Result<TrackResultTemplate> {
    render(&state, &query.id, true).await
}

async fn render(state: &AppState, id: &str, new_order_route: bool) -> Result<TrackResultTemplate> {
    let tracked = orders::track(state.store(), id).await?;
    Ok(TrackResultTemplate::new(TrackingView::new(
        tracked,
        new_order_route,
    )))
}
