//! Open tab endpoints: line edits, kitchen transitions and checkout.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use common::model::{Order, OrderLine, OrderStatus};
use common::{CustomerId, MenuItemId, OrderId, OrderLineId, TableId};
use serde::{Deserialize, Serialize};
use store::Store;

use super::AppState;
use super::invoices::InvoiceResponse;
use crate::error::ApiError;

// -- Request types --

#[derive(Debug, Deserialize)]
pub struct OpenOrderRequest {
    pub table_id: TableId,
    pub customer_id: Option<CustomerId>,
}

#[derive(Debug, Deserialize)]
pub struct AddLineRequest {
    pub menu_item_id: MenuItemId,
    pub quantity: u32,
    pub note: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateLineRequest {
    pub quantity: u32,
}

#[derive(Debug, Deserialize)]
pub struct OrderListParams {
    pub status: Option<String>,
}

// -- Response types --

#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub id: String,
    pub table_id: String,
    pub customer_id: Option<String>,
    pub opened_at: DateTime<Utc>,
    pub status: String,
    pub lines: Vec<OrderLineResponse>,
}

#[derive(Debug, Serialize)]
pub struct OrderLineResponse {
    pub id: String,
    pub menu_item_id: String,
    pub quantity: u32,
    pub note: Option<String>,
}

impl From<&OrderLine> for OrderLineResponse {
    fn from(line: &OrderLine) -> Self {
        Self {
            id: line.id.to_string(),
            menu_item_id: line.menu_item_id.to_string(),
            quantity: line.quantity,
            note: line.note.clone(),
        }
    }
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            id: order.id.to_string(),
            table_id: order.table_id.to_string(),
            customer_id: order.customer_id.map(|id| id.to_string()),
            opened_at: order.opened_at,
            status: order.status.to_string(),
            lines: order.lines.iter().map(OrderLineResponse::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LineAddedResponse {
    pub line_id: String,
    pub order: OrderResponse,
}

#[derive(Debug, Serialize)]
pub struct OrderTotalResponse {
    pub order_id: String,
    pub total_cents: i64,
}

// -- Handlers --

/// GET /orders: latest first, optionally filtered by `?status=`.
#[tracing::instrument(skip(state))]
pub async fn list<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Query(params): Query<OrderListParams>,
) -> Result<Json<Vec<OrderResponse>>, ApiError> {
    let status = params
        .status
        .as_deref()
        .map(str::parse::<OrderStatus>)
        .transpose()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let orders = state.orders.list_orders(status).await?;
    Ok(Json(orders.into_iter().map(OrderResponse::from).collect()))
}

/// POST /orders: open a tab at a table.
#[tracing::instrument(skip(state))]
pub async fn open<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<OpenOrderRequest>,
) -> Result<(StatusCode, Json<OrderResponse>), ApiError> {
    let order = state
        .orders
        .open_order(req.table_id, req.customer_id)
        .await?;
    Ok((StatusCode::CREATED, Json(order.into())))
}

/// GET /orders/{id}
#[tracing::instrument(skip(state))]
pub async fn get<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<OrderId>,
) -> Result<Json<OrderResponse>, ApiError> {
    Ok(Json(state.orders.get_order(id).await?.into()))
}

/// POST /orders/{id}/lines
#[tracing::instrument(skip(state))]
pub async fn add_line<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<OrderId>,
    Json(req): Json<AddLineRequest>,
) -> Result<(StatusCode, Json<LineAddedResponse>), ApiError> {
    let (order, line_id) = state
        .orders
        .add_line(id, req.menu_item_id, req.quantity, req.note)
        .await?;
    let response = LineAddedResponse {
        line_id: line_id.to_string(),
        order: order.into(),
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// PUT /orders/{id}/lines/{line_id}
#[tracing::instrument(skip(state))]
pub async fn update_line<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path((id, line_id)): Path<(OrderId, OrderLineId)>,
    Json(req): Json<UpdateLineRequest>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order = state
        .orders
        .update_line_quantity(id, line_id, req.quantity)
        .await?;
    Ok(Json(order.into()))
}

/// DELETE /orders/{id}/lines/{line_id}
#[tracing::instrument(skip(state))]
pub async fn remove_line<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path((id, line_id)): Path<(OrderId, OrderLineId)>,
) -> Result<Json<OrderResponse>, ApiError> {
    Ok(Json(state.orders.remove_line(id, line_id).await?.into()))
}

/// POST /orders/{id}/kitchen
#[tracing::instrument(skip(state))]
pub async fn send_to_kitchen<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<OrderId>,
) -> Result<Json<OrderResponse>, ApiError> {
    Ok(Json(state.orders.send_to_kitchen(id).await?.into()))
}

/// POST /orders/{id}/served
#[tracing::instrument(skip(state))]
pub async fn mark_served<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<OrderId>,
) -> Result<Json<OrderResponse>, ApiError> {
    Ok(Json(state.orders.mark_served(id).await?.into()))
}

/// POST /orders/{id}/cancel
#[tracing::instrument(skip(state))]
pub async fn cancel<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<OrderId>,
) -> Result<Json<OrderResponse>, ApiError> {
    Ok(Json(state.orders.cancel_order(id).await?.into()))
}

/// POST /orders/{id}/checkout: bill the tab at current prices and free the table.
#[tracing::instrument(skip(state))]
pub async fn checkout<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<OrderId>,
) -> Result<(StatusCode, Json<InvoiceResponse>), ApiError> {
    let invoice = state.billing.checkout_order(id).await?;
    Ok((StatusCode::CREATED, Json(invoice.into())))
}

/// GET /orders/{id}/total: live total at the menu's current prices.
#[tracing::instrument(skip(state))]
pub async fn total<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<OrderId>,
) -> Result<Json<OrderTotalResponse>, ApiError> {
    let total = state.orders.order_total(id).await?;
    Ok(Json(OrderTotalResponse {
        order_id: id.to_string(),
        total_cents: total.cents(),
    }))
}
