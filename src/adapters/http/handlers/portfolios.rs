use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use crate::adapters::http::params::{json_body, query_params, ListParams};
use crate::adapters::http::AppState;
use crate::domain::model::{Initiative, NewPortfolio, Portfolio, PortfolioPatch};
use crate::domain::query::PaginatedResponse;
use crate::utils::error::Result;

pub(crate) fn routes() -> Router<AppState> {
    Router::new()
        .route("/portfolios", get(list).post(create))
        .route("/portfolios/{id}", get(show).patch(update).delete(remove))
        .route("/portfolios/{id}/initiatives", get(initiatives))
}

async fn list(
    State(state): State<AppState>,
    params: std::result::Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<PaginatedResponse<Portfolio>>> {
    let query = query_params(params)?.into_query()?;
    Ok(Json(state.portfolios.list(&query).await?))
}

async fn show(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Json<Portfolio>> {
    Ok(Json(state.portfolios.get(id).await?))
}

async fn initiatives(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<Initiative>>> {
    Ok(Json(state.portfolios.initiatives_of(id).await?))
}

async fn create(
    State(state): State<AppState>,
    body: std::result::Result<Json<NewPortfolio>, JsonRejection>,
) -> Result<(StatusCode, Json<Portfolio>)> {
    let input = json_body(body)?;
    let portfolio = state.portfolios.create(input).await?;
    Ok((StatusCode::CREATED, Json(portfolio)))
}

async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    body: std::result::Result<Json<PortfolioPatch>, JsonRejection>,
) -> Result<Json<Portfolio>> {
    let patch = json_body(body)?;
    Ok(Json(state.portfolios.update(id, patch).await?))
}

async fn remove(State(state): State<AppState>, Path(id): Path<i64>) -> Result<StatusCode> {
    state.portfolios.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
