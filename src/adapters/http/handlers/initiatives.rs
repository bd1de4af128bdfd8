use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use crate::adapters::http::params::{json_body, query_params, ListParams};
use crate::adapters::http::AppState;
use crate::domain::model::{Epic, Initiative, InitiativePatch, NewInitiative};
use crate::domain::query::PaginatedResponse;
use crate::utils::error::Result;

pub(crate) fn routes() -> Router<AppState> {
    Router::new()
        .route("/initiatives", get(list).post(create))
        .route("/initiatives/{id}", get(show).patch(update).delete(remove))
        .route("/initiatives/{id}/epics", get(epics))
}

async fn list(
    State(state): State<AppState>,
    params: std::result::Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<PaginatedResponse<Initiative>>> {
    let query = query_params(params)?.into_query()?;
    Ok(Json(state.initiatives.list(&query).await?))
}

async fn show(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Json<Initiative>> {
    Ok(Json(state.initiatives.get(id).await?))
}

async fn epics(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Json<Vec<Epic>>> {
    Ok(Json(state.initiatives.epics_of(id).await?))
}

async fn create(
    State(state): State<AppState>,
    body: std::result::Result<Json<NewInitiative>, JsonRejection>,
) -> Result<(StatusCode, Json<Initiative>)> {
    let input = json_body(body)?;
    let initiative = state.initiatives.create(input).await?;
    Ok((StatusCode::CREATED, Json(initiative)))
}

async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    body: std::result::Result<Json<InitiativePatch>, JsonRejection>,
) -> Result<Json<Initiative>> {
    let patch = json_body(body)?;
    Ok(Json(state.initiatives.update(id, patch).await?))
}

async fn remove(State(state): State<AppState>, Path(id): Path<i64>) -> Result<StatusCode> {
    state.initiatives.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
