pub(crate) mod epics;
pub(crate) mod initiatives;
pub(crate) mod portfolios;
pub(crate) mod requirements;
pub(crate) mod sponsors;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use super::AppState;
use crate::domain::model::DashboardSummary;
use crate::utils::error::Result;

pub(crate) fn dashboard_routes() -> Router<AppState> {
    Router::new().route("/dashboard/summary", get(summary))
}

async fn summary(State(state): State<AppState>) -> Result<Json<DashboardSummary>> {
    Ok(Json(state.dashboard.summary().await?))
}
