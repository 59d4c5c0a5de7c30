//! HTTP API server for the restaurant front of house.
//!
//! Exposes the floor, catalog, order and billing services as REST endpoints,
//! with structured logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post, put};
use domain::{
    BillingService, CatalogService, CustomerService, FloorService, LedgerService, OrderService,
};
use metrics_exporter_prometheus::PrometheusHandle;
use store::Store;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use routes::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: Store + Clone + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check::<S>))
        // Customers
        .route(
            "/customers",
            get(routes::customers::list::<S>).post(routes::customers::create::<S>),
        )
        .route(
            "/customers/{id}",
            get(routes::customers::get::<S>)
                .put(routes::customers::update::<S>)
                .delete(routes::customers::delete::<S>),
        )
        // Tables
        .route(
            "/tables",
            get(routes::tables::list::<S>).post(routes::tables::create::<S>),
        )
        .route(
            "/tables/{id}",
            put(routes::tables::update::<S>).delete(routes::tables::delete::<S>),
        )
        .route("/tables/{id}/release", post(routes::tables::release::<S>))
        // Reservations
        .route(
            "/reservations",
            get(routes::reservations::list::<S>).post(routes::reservations::create::<S>),
        )
        .route(
            "/reservations/{id}",
            get(routes::reservations::get::<S>).delete(routes::reservations::cancel::<S>),
        )
        .route(
            "/reservations/{id}/invoice",
            post(routes::reservations::invoice::<S>),
        )
        // Catalog
        .route(
            "/categories",
            get(routes::catalog::list_categories::<S>)
                .post(routes::catalog::create_category::<S>),
        )
        .route(
            "/categories/{id}",
            axum::routing::delete(routes::catalog::delete_category::<S>),
        )
        .route(
            "/menu-items",
            get(routes::catalog::list_menu_items::<S>)
                .post(routes::catalog::create_menu_item::<S>),
        )
        .route(
            "/menu-items/{id}",
            get(routes::catalog::get_menu_item::<S>)
                .put(routes::catalog::update_menu_item::<S>)
                .delete(routes::catalog::delete_menu_item::<S>),
        )
        // Orders
        .route(
            "/orders",
            get(routes::orders::list::<S>).post(routes::orders::open::<S>),
        )
        .route("/orders/{id}", get(routes::orders::get::<S>))
        .route("/orders/{id}/lines", post(routes::orders::add_line::<S>))
        .route(
            "/orders/{id}/lines/{line_id}",
            put(routes::orders::update_line::<S>).delete(routes::orders::remove_line::<S>),
        )
        .route(
            "/orders/{id}/kitchen",
            post(routes::orders::send_to_kitchen::<S>),
        )
        .route("/orders/{id}/served", post(routes::orders::mark_served::<S>))
        .route("/orders/{id}/cancel", post(routes::orders::cancel::<S>))
        .route("/orders/{id}/checkout", post(routes::orders::checkout::<S>))
        .route("/orders/{id}/total", get(routes::orders::total::<S>))
        // Billing and ledger
        .route("/sales", post(routes::sales::create::<S>))
        .route("/invoices", get(routes::invoices::list::<S>))
        .route("/invoices/{id}", get(routes::invoices::get::<S>))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the application state, wiring every service to the same store.
pub fn create_default_state<S: Store + Clone + 'static>(store: S) -> Arc<AppState<S>> {
    Arc::new(AppState {
        customers: CustomerService::new(store.clone()),
        floor: FloorService::new(store.clone()),
        catalog: CatalogService::new(store.clone()),
        orders: OrderService::new(store.clone()),
        billing: BillingService::new(store.clone()),
        ledger: LedgerService::new(store.clone()),
        store,
    })
}
