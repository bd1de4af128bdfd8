use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use crate::adapters::http::params::{json_body, query_params, ListParams};
use crate::adapters::http::AppState;
use crate::domain::model::{NewSponsor, Portfolio, Sponsor, SponsorPatch};
use crate::domain::query::PaginatedResponse;
use crate::utils::error::Result;

pub(crate) fn routes() -> Router<AppState> {
    Router::new()
        .route("/sponsors", get(list).post(create))
        .route("/sponsors/{id}", get(show).patch(update).delete(remove))
        .route("/sponsors/{id}/portfolios", get(portfolios))
}

async fn list(
    State(state): State<AppState>,
    params: std::result::Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<PaginatedResponse<Sponsor>>> {
    let query = query_params(params)?.into_query()?;
    Ok(Json(state.sponsors.list(&query).await?))
}

async fn show(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Json<Sponsor>> {
    Ok(Json(state.sponsors.get(id).await?))
}

async fn portfolios(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<Portfolio>>> {
    Ok(Json(state.sponsors.portfolios_of(id).await?))
}

async fn create(
    State(state): State<AppState>,
    body: std::result::Result<Json<NewSponsor>, JsonRejection>,
) -> Result<(StatusCode, Json<Sponsor>)> {
    let input = json_body(body)?;
    let sponsor = state.sponsors.create(input).await?;
    Ok((StatusCode::CREATED, Json(sponsor)))
}

async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    body: std::result::Result<Json<SponsorPatch>, JsonRejection>,
) -> Result<Json<Sponsor>> {
    let patch = json_body(body)?;
    Ok(Json(state.sponsors.update(id, patch).await?))
}

async fn remove(State(state): State<AppState>, Path(id): Path<i64>) -> Result<StatusCode> {
    state.sponsors.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
