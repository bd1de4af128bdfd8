use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use crate::adapters::http::params::{json_body, query_params, ListParams};
use crate::adapters::http::AppState;
use crate::domain::model::{NewRequirement, Requirement, RequirementPatch};
use crate::domain::query::PaginatedResponse;
use crate::utils::error::Result;

pub(crate) fn routes() -> Router<AppState> {
    Router::new()
        .route("/requirements", get(list).post(create))
        .route("/requirements/{id}", get(show).patch(update).delete(remove))
}

async fn list(
    State(state): State<AppState>,
    params: std::result::Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<PaginatedResponse<Requirement>>> {
    let query = query_params(params)?.into_query()?;
    Ok(Json(state.requirements.list(&query).await?))
}

async fn show(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Json<Requirement>> {
    Ok(Json(state.requirements.get(id).await?))
}

async fn create(
    State(state): State<AppState>,
    body: std::result::Result<Json<NewRequirement>, JsonRejection>,
) -> Result<(StatusCode, Json<Requirement>)> {
    let input = json_body(body)?;
    let requirement = state.requirements.create(input).await?;
    Ok((StatusCode::CREATED, Json(requirement)))
}

async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    body: std::result::Result<Json<RequirementPatch>, JsonRejection>,
) -> Result<Json<Requirement>> {
    let patch = json_body(body)?;
    Ok(Json(state.requirements.update(id, patch).await?))
}

async fn remove(State(state): State<AppState>, Path(id): Path<i64>) -> Result<StatusCode> {
    state.requirements.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
