//! Transaction endpoints.
//!
//! ```text
//! POST /api/transactions            create   → 201 TransactionRecord
//! GET  /api/transactions            list     → { data, meta }
//! GET  /api/transactions/summary    summary  → TransactionSummary
//! GET  /api/transactions/{id}       get      → TransactionRecord
//! ```

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use gasdepot_core::{
    TransactionFilter, TransactionPage, TransactionRecord, TransactionRequest, TransactionSummary,
};
use tracing::debug;

use crate::auth::Principal;
use crate::error::ApiError;
use crate::AppState;

pub async fn create(
    State(state): State<AppState>,
    principal: Principal,
    payload: Result<Json<TransactionRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<TransactionRecord>), ApiError> {
    let Json(request) = payload?;

    let record = state
        .recorder
        .create(&principal.store_id, principal.staff_id.as_deref(), request)
        .await?;

    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn list(
    State(state): State<AppState>,
    principal: Principal,
    filter: Result<Query<TransactionFilter>, QueryRejection>,
) -> Result<Json<TransactionPage>, ApiError> {
    let Query(mut filter) = filter?;
    if filter.limit.is_none() {
        filter.limit = Some(state.history.default_limit);
    }

    debug!(store_id = %principal.store_id, ?filter, "Listing transactions");

    let page = state
        .db
        .transactions()
        .list(&principal.store_id, &filter)
        .await?;

    Ok(Json(page))
}

pub async fn summary(
    State(state): State<AppState>,
    principal: Principal,
    filter: Result<Query<TransactionFilter>, QueryRejection>,
) -> Result<Json<TransactionSummary>, ApiError> {
    let Query(filter) = filter?;

    let summary = state
        .db
        .transactions()
        .summary(&principal.store_id, &filter)
        .await?;

    Ok(Json(summary))
}

pub async fn get(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<String>,
) -> Result<Json<TransactionRecord>, ApiError> {
    let record = state.db.transactions().get(&principal.store_id, &id).await?;
    Ok(Json(record))
}
