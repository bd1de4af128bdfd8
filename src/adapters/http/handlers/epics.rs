use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use crate::adapters::http::params::{json_body, query_params, ListParams};
use crate::adapters::http::AppState;
use crate::domain::model::{Epic, EpicPatch, NewEpic, Requirement};
use crate::domain::query::PaginatedResponse;
use crate::utils::error::Result;

pub(crate) fn routes() -> Router<AppState> {
    Router::new()
        .route("/epics", get(list).post(create))
        .route("/epics/{id}", get(show).patch(update).delete(remove))
        .route("/epics/{id}/requirements", get(requirements))
}

async fn list(
    State(state): State<AppState>,
    params: std::result::Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<PaginatedResponse<Epic>>> {
    let query = query_params(params)?.into_query()?;
    Ok(Json(state.epics.list(&query).await?))
}

async fn show(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Json<Epic>> {
    Ok(Json(state.epics.get(id).await?))
}

async fn requirements(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<Requirement>>> {
    Ok(Json(state.epics.requirements_of(id).await?))
}

async fn create(
    State(state): State<AppState>,
    body: std::result::Result<Json<NewEpic>, JsonRejection>,
) -> Result<(StatusCode, Json<Epic>)> {
    let input = json_body(body)?;
    let epic = state.epics.create(input).await?;
    Ok((StatusCode::CREATED, Json(epic)))
}

async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    body: std::result::Result<Json<EpicPatch>, JsonRejection>,
) -> Result<Json<Epic>> {
    let patch = json_body(body)?;
    Ok(Json(state.epics.update(id, patch).await?))
}

async fn remove(State(state): State<AppState>, Path(id): Path<i64>) -> Result<StatusCode> {
    state.epics.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
