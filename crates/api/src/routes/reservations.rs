//! Reservation endpoints, including billing a seated reservation.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::model::Reservation;
use common::{CustomerId, ReservationId, TableId};
use domain::ServiceKind;
use serde::Deserialize;
use store::Store;

use super::AppState;
use super::invoices::InvoiceResponse;
use super::sales::{SelectionRequest, selections};
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct CreateReservationRequest {
    /// `YYYY-MM-DD HH:MM` or `YYYY-MM-DDTHH:MM`.
    pub scheduled_for: String,
    pub party_size: u32,
    pub customer_id: CustomerId,
    pub table_id: TableId,
}

#[derive(Debug, Deserialize)]
pub struct InvoiceReservationRequest {
    #[serde(default)]
    pub selections: Vec<SelectionRequest>,
    /// Defaults to dine-in.
    pub service: Option<ServiceKind>,
}

/// GET /reservations: latest first.
#[tracing::instrument(skip(state))]
pub async fn list<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<Reservation>>, ApiError> {
    Ok(Json(state.floor.list_reservations().await?))
}

/// POST /reservations: book and seat a party; the table becomes Occupied.
#[tracing::instrument(skip(state))]
pub async fn create<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<CreateReservationRequest>,
) -> Result<(StatusCode, Json<Reservation>), ApiError> {
    let reservation = state
        .floor
        .create_reservation(
            &req.scheduled_for,
            req.party_size,
            req.customer_id,
            req.table_id,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(reservation)))
}

/// GET /reservations/{id}
#[tracing::instrument(skip(state))]
pub async fn get<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<ReservationId>,
) -> Result<Json<Reservation>, ApiError> {
    Ok(Json(state.floor.get_reservation(id).await?))
}

/// DELETE /reservations/{id}: cancel and free the table.
#[tracing::instrument(skip(state))]
pub async fn cancel<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<ReservationId>,
) -> Result<StatusCode, ApiError> {
    state.floor.cancel_reservation(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /reservations/{id}/invoice: bill the reservation and free its table.
#[tracing::instrument(skip(state, req))]
pub async fn invoice<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<ReservationId>,
    Json(req): Json<InvoiceReservationRequest>,
) -> Result<(StatusCode, Json<InvoiceResponse>), ApiError> {
    let kind = req.service.unwrap_or(ServiceKind::DineIn);
    let invoice = state
        .billing
        .process_sale(id, &selections(req.selections), kind)
        .await?;
    Ok((StatusCode::CREATED, Json(invoice.into())))
}
