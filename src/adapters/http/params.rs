use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Json, Query};
use serde::Deserialize;

use crate::domain::query::{
    ListFilters, ListQuery, SortOrder, DEFAULT_LIMIT, DEFAULT_PAGE, MAX_LIMIT,
};
use crate::utils::error::{AppError, Result};
use crate::utils::validation::{validate_min, validate_range};

/// Raw list query string. Validated here, before it reaches the query contract.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub status: Option<String>,
    pub search: Option<String>,
    pub sponsor_id: Option<i64>,
    pub portfolio_id: Option<i64>,
    pub initiative_id: Option<i64>,
    pub epic_id: Option<i64>,
}

impl ListParams {
    pub fn into_query(self) -> Result<ListQuery> {
        let page = self.page.unwrap_or(i64::from(DEFAULT_PAGE));
        validate_min("page", page, 1)?;
        let page = u32::try_from(page).map_err(|_| AppError::ValidationError {
            field: "page".to_string(),
            value: page.to_string(),
            reason: "Value is too large".to_string(),
        })?;

        let limit = self.limit.unwrap_or(i64::from(DEFAULT_LIMIT));
        validate_range("limit", limit, 1, i64::from(MAX_LIMIT))?;

        let sort_order = match self.sort_order.as_deref() {
            None | Some("") => SortOrder::default(),
            Some(raw) => SortOrder::parse(raw).ok_or_else(|| AppError::ValidationError {
                field: "sortOrder".to_string(),
                value: raw.to_string(),
                reason: "Expected ASC or DESC".to_string(),
            })?,
        };

        Ok(ListQuery {
            page,
            // 已經在 1..=100 範圍內
            limit: limit as u32,
            sort_by: self.sort_by.filter(|s| !s.trim().is_empty()),
            sort_order,
            filters: ListFilters {
                status: self.status.filter(|s| !s.is_empty()),
                search: self.search.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()),
                sponsor_id: self.sponsor_id,
                portfolio_id: self.portfolio_id,
                initiative_id: self.initiative_id,
                epic_id: self.epic_id,
            },
        })
    }
}

pub(crate) fn query_params<T>(query: std::result::Result<Query<T>, QueryRejection>) -> Result<T> {
    query
        .map(|Query(params)| params)
        .map_err(|rejection| AppError::ValidationError {
            field: "query".to_string(),
            value: String::new(),
            reason: rejection.body_text(),
        })
}

pub(crate) fn json_body<T>(body: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    body.map(|Json(value)| value)
        .map_err(|rejection| AppError::ValidationError {
            field: "body".to_string(),
            value: String::new(),
            reason: rejection.body_text(),
        })
}
