//! Table management endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::TableId;
use common::model::{Table, TableStatus};
use serde::Deserialize;
use store::Store;

use super::AppState;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct CreateTableRequest {
    pub name: String,
    pub capacity: u32,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTableRequest {
    pub name: String,
    pub capacity: u32,
    pub status: TableStatus,
}

/// GET /tables
#[tracing::instrument(skip(state))]
pub async fn list<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<Table>>, ApiError> {
    Ok(Json(state.floor.list_tables().await?))
}

/// POST /tables: create a table; it starts Available.
#[tracing::instrument(skip(state))]
pub async fn create<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<CreateTableRequest>,
) -> Result<(StatusCode, Json<Table>), ApiError> {
    let table = state.floor.create_table(&req.name, req.capacity).await?;
    Ok((StatusCode::CREATED, Json(table)))
}

/// PUT /tables/{id}: direct edit, including status.
#[tracing::instrument(skip(state))]
pub async fn update<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<TableId>,
    Json(req): Json<UpdateTableRequest>,
) -> Result<Json<Table>, ApiError> {
    let table = state
        .floor
        .update_table(id, &req.name, req.capacity, req.status)
        .await?;
    Ok(Json(table))
}

/// DELETE /tables/{id}
#[tracing::instrument(skip(state))]
pub async fn delete<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<TableId>,
) -> Result<StatusCode, ApiError> {
    state.floor.delete_table(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /tables/{id}/release: mark the table Available.
#[tracing::instrument(skip(state))]
pub async fn release<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<TableId>,
) -> Result<Json<Table>, ApiError> {
    Ok(Json(state.floor.release_table(id).await?))
}
