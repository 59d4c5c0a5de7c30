//! Customer directory endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use common::CustomerId;
use common::model::Customer;
use domain::CustomerDetails;
use serde::Deserialize;
use store::Store;

use super::AppState;
use crate::error::ApiError;

// -- Request types --

#[derive(Debug, Deserialize)]
pub struct CustomerRequest {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl From<CustomerRequest> for CustomerDetails {
    fn from(req: CustomerRequest) -> Self {
        CustomerDetails {
            name: req.name,
            phone: req.phone,
            email: req.email,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

// -- Handlers --

/// GET /customers: list customers, optionally filtered by `?q=`.
#[tracing::instrument(skip(state))]
pub async fn list<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Customer>>, ApiError> {
    let customers = state.customers.list_customers(params.q.as_deref()).await?;
    Ok(Json(customers))
}

/// POST /customers: create a customer.
#[tracing::instrument(skip(state, req))]
pub async fn create<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<CustomerRequest>,
) -> Result<(StatusCode, Json<Customer>), ApiError> {
    let customer = state.customers.create_customer(req.into()).await?;
    Ok((StatusCode::CREATED, Json(customer)))
}

/// GET /customers/{id}
#[tracing::instrument(skip(state))]
pub async fn get<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<CustomerId>,
) -> Result<Json<Customer>, ApiError> {
    Ok(Json(state.customers.get_customer(id).await?))
}

/// PUT /customers/{id}
#[tracing::instrument(skip(state, req))]
pub async fn update<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<CustomerId>,
    Json(req): Json<CustomerRequest>,
) -> Result<Json<Customer>, ApiError> {
    Ok(Json(state.customers.update_customer(id, req.into()).await?))
}

/// DELETE /customers/{id}: refused while the customer has history.
#[tracing::instrument(skip(state))]
pub async fn delete<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<CustomerId>,
) -> Result<StatusCode, ApiError> {
    state.customers.delete_customer(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
