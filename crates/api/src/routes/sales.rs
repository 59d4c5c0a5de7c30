//! Sale endpoints and the selection payload shared by every billing route.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use common::{CustomerId, MenuItemId};
use domain::Selection;
use serde::Deserialize;
use store::Store;

use super::AppState;
use super::invoices::InvoiceResponse;
use crate::error::ApiError;

/// A quantity as submitted: a JSON number, a string, or anything else.
///
/// It is handed to the billing engine as text, where anything but a plain
/// non-negative integer counts as zero. Booleans, arrays and objects become
/// blank text.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawQuantity {
    Number(serde_json::Number),
    Text(String),
    Other(serde_json::Value),
}

impl RawQuantity {
    fn into_text(self) -> String {
        match self {
            RawQuantity::Number(n) => n.to_string(),
            RawQuantity::Text(s) => s,
            RawQuantity::Other(_) => String::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SelectionRequest {
    pub menu_item_id: MenuItemId,
    #[serde(default)]
    pub quantity: Option<RawQuantity>,
}

impl From<SelectionRequest> for Selection {
    fn from(req: SelectionRequest) -> Self {
        Selection::new(
            req.menu_item_id,
            req.quantity.map(RawQuantity::into_text).unwrap_or_default(),
        )
    }
}

pub(crate) fn selections(requests: Vec<SelectionRequest>) -> Vec<Selection> {
    requests.into_iter().map(Selection::from).collect()
}

#[derive(Debug, Deserialize)]
pub struct DirectSaleRequest {
    pub customer_id: CustomerId,
    #[serde(default)]
    pub selections: Vec<SelectionRequest>,
}

/// POST /sales: walk-in (takeout) sale for a customer.
#[tracing::instrument(skip(state, req))]
pub async fn create<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<DirectSaleRequest>,
) -> Result<(StatusCode, Json<InvoiceResponse>), ApiError> {
    let invoice = state
        .billing
        .direct_sale(req.customer_id, &selections(req.selections))
        .await?;
    Ok((StatusCode::CREATED, Json(invoice.into())))
}
