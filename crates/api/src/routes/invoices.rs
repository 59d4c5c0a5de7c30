//! Invoice ledger endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use chrono::{DateTime, Utc};
use common::model::{Invoice, InvoiceLine};
use common::{CustomerId, InvoiceId};
use serde::{Deserialize, Serialize};
use store::{InvoiceQuery, Store};

use super::AppState;
use crate::error::ApiError;

/// Upper bound on `limit` for a single page.
const MAX_PAGE_SIZE: usize = 500;

// -- Request types --

#[derive(Debug, Default, Deserialize)]
pub struct InvoiceListParams {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub customer_id: Option<CustomerId>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl From<InvoiceListParams> for InvoiceQuery {
    fn from(params: InvoiceListParams) -> Self {
        InvoiceQuery {
            customer_id: params.customer_id,
            from: params.from,
            to: params.to,
            limit: params.limit.map(|limit| limit.min(MAX_PAGE_SIZE)),
            offset: params.offset,
        }
    }
}

// -- Response types --

#[derive(Debug, Serialize)]
pub struct InvoiceResponse {
    pub id: String,
    pub reservation_id: String,
    pub customer_id: String,
    pub created_at: DateTime<Utc>,
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub service_charge_cents: i64,
    pub total_cents: i64,
    pub lines: Vec<InvoiceLineResponse>,
}

#[derive(Debug, Serialize)]
pub struct InvoiceLineResponse {
    pub id: String,
    pub menu_item_id: Option<String>,
    pub description: String,
    pub quantity: u32,
    pub unit_price_cents: i64,
    pub line_total_cents: i64,
}

impl From<&InvoiceLine> for InvoiceLineResponse {
    fn from(line: &InvoiceLine) -> Self {
        Self {
            id: line.id.to_string(),
            menu_item_id: line.menu_item_id.map(|id| id.to_string()),
            description: line.description.clone(),
            quantity: line.quantity,
            unit_price_cents: line.unit_price.cents(),
            line_total_cents: line.line_total.cents(),
        }
    }
}

impl From<Invoice> for InvoiceResponse {
    fn from(invoice: Invoice) -> Self {
        Self {
            id: invoice.id.to_string(),
            reservation_id: invoice.reservation_id.to_string(),
            customer_id: invoice.customer_id.to_string(),
            created_at: invoice.created_at,
            subtotal_cents: invoice.subtotal.cents(),
            tax_cents: invoice.tax.cents(),
            service_charge_cents: invoice.service_charge.cents(),
            total_cents: invoice.total.cents(),
            lines: invoice.lines.iter().map(InvoiceLineResponse::from).collect(),
        }
    }
}

// -- Handlers --

/// GET /invoices: newest first; filters `from`, `to` (RFC 3339, inclusive),
/// `customer_id`, and paging via `limit`/`offset`.
#[tracing::instrument(skip(state))]
pub async fn list<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Query(params): Query<InvoiceListParams>,
) -> Result<Json<Vec<InvoiceResponse>>, ApiError> {
    let invoices = state.ledger.query_invoices(&params.into()).await?;
    Ok(Json(invoices.into_iter().map(InvoiceResponse::from).collect()))
}

/// GET /invoices/{id}
#[tracing::instrument(skip(state))]
pub async fn get<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<InvoiceId>,
) -> Result<Json<InvoiceResponse>, ApiError> {
    Ok(Json(state.ledger.get_invoice(id).await?.into()))
}
