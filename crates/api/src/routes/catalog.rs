//! Category and menu item endpoints. Prices travel as integer cents.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::model::{Category, MenuItem};
use common::{CategoryId, MenuItemId, Money};
use serde::{Deserialize, Serialize};
use store::Store;

use super::AppState;
use crate::error::ApiError;

// -- Request types --

#[derive(Debug, Deserialize)]
pub struct CategoryRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct MenuItemRequest {
    pub name: String,
    pub price_cents: i64,
    pub category_id: CategoryId,
}

// -- Response types --

#[derive(Debug, Serialize)]
pub struct MenuItemResponse {
    pub id: String,
    pub name: String,
    pub price_cents: i64,
    pub category_id: String,
}

impl From<MenuItem> for MenuItemResponse {
    fn from(item: MenuItem) -> Self {
        Self {
            id: item.id.to_string(),
            name: item.name,
            price_cents: item.price.cents(),
            category_id: item.category_id.to_string(),
        }
    }
}

// -- Handlers --

/// GET /categories
#[tracing::instrument(skip(state))]
pub async fn list_categories<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<Category>>, ApiError> {
    Ok(Json(state.catalog.list_categories().await?))
}

/// POST /categories
#[tracing::instrument(skip(state))]
pub async fn create_category<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<CategoryRequest>,
) -> Result<(StatusCode, Json<Category>), ApiError> {
    let category = state.catalog.create_category(&req.name).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// DELETE /categories/{id}: refused while it owns menu items.
#[tracing::instrument(skip(state))]
pub async fn delete_category<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<CategoryId>,
) -> Result<StatusCode, ApiError> {
    state.catalog.delete_category(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /menu-items
#[tracing::instrument(skip(state))]
pub async fn list_menu_items<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<MenuItemResponse>>, ApiError> {
    let items = state.catalog.list_menu_items().await?;
    Ok(Json(items.into_iter().map(MenuItemResponse::from).collect()))
}

/// POST /menu-items
#[tracing::instrument(skip(state))]
pub async fn create_menu_item<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<MenuItemRequest>,
) -> Result<(StatusCode, Json<MenuItemResponse>), ApiError> {
    let item = state
        .catalog
        .create_menu_item(&req.name, Money::from_cents(req.price_cents), req.category_id)
        .await?;
    Ok((StatusCode::CREATED, Json(item.into())))
}

/// GET /menu-items/{id}
#[tracing::instrument(skip(state))]
pub async fn get_menu_item<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<MenuItemId>,
) -> Result<Json<MenuItemResponse>, ApiError> {
    Ok(Json(state.catalog.get_menu_item(id).await?.into()))
}

/// PUT /menu-items/{id}: past invoices keep their billed price.
#[tracing::instrument(skip(state))]
pub async fn update_menu_item<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<MenuItemId>,
    Json(req): Json<MenuItemRequest>,
) -> Result<Json<MenuItemResponse>, ApiError> {
    let item = state
        .catalog
        .update_menu_item(
            id,
            &req.name,
            Money::from_cents(req.price_cents),
            req.category_id,
        )
        .await?;
    Ok(Json(item.into()))
}

/// DELETE /menu-items/{id}: refused once the item has been sold or ordered.
#[tracing::instrument(skip(state))]
pub async fn delete_menu_item<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<MenuItemId>,
) -> Result<StatusCode, ApiError> {
    state.catalog.delete_menu_item(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
