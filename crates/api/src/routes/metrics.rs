//! Prometheus metrics endpoint.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use metrics::Unit;
use metrics_exporter_prometheus::PrometheusHandle;

/// Registers descriptions for the metrics the services record.
pub fn describe() {
    metrics::describe_counter!(
        "sales_processed_total",
        "Invoices written, labelled by service (dine_in, takeout)"
    );
    metrics::describe_counter!(
        "sales_rejected_total",
        "Sales refused or rolled back, labelled by reason"
    );
    metrics::describe_histogram!(
        "invoice_total_cents",
        Unit::Count,
        "Invoice totals in cents"
    );
    metrics::describe_counter!("orders_opened_total", "Orders opened");
    metrics::describe_counter!("orders_cancelled_total", "Orders cancelled");
    metrics::describe_counter!("store_commits_total", "Write batches committed");
    metrics::describe_counter!(
        "store_commit_failures_total",
        "Write batches rolled back"
    );
}

/// GET /metrics: returns Prometheus-formatted metrics.
pub async fn get(State(handle): State<PrometheusHandle>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        handle.render(),
    )
}
