//! Business counters exported in Prometheus text format at `/metrics`.

use axum::http::header;
use axum::response::IntoResponse;
use lazy_static::lazy_static;
use crate::errors::ServiceError;
use prometheus::{
    register_int_counter, register_int_counter_vec, Encoder, IntCounter, IntCounterVec,
    TextEncoder,
};

lazy_static! {
    pub static ref ORDERS_CREATED: IntCounterVec = register_int_counter_vec!(
        "modas_orders_created_total",
        "Retail orders created, by payment channel",
        &["payment_method"]
    )
    .expect("metric can be created");
    pub static ref ORDER_STATUS_UPDATES: IntCounterVec = register_int_counter_vec!(
        "modas_order_status_updates_total",
        "Retail order status changes, by new status",
        &["status"]
    )
    .expect("metric can be created");
    pub static ref ORDER_STATUS_UPDATE_FAILURES: IntCounter = register_int_counter!(
        "modas_order_status_update_failures_total",
        "Rejected retail order status changes"
    )
    .expect("metric can be created");
    pub static ref CUSTOM_ORDER_MUTATIONS: IntCounterVec = register_int_counter_vec!(
        "modas_custom_order_mutations_total",
        "Tailoring order changes, by kind",
        &["kind"]
    )
    .expect("metric can be created");
    pub static ref PAYMENT_PROVIDER_CALLS: IntCounterVec = register_int_counter_vec!(
        "modas_payment_provider_calls_total",
        "Calls to the payment processor, by operation and outcome",
        &["operation", "outcome"]
    )
    .expect("metric can be created");
    pub static ref CODE_COLLISIONS: IntCounter = register_int_counter!(
        "modas_order_code_collisions_total",
        "Generated order codes that were already taken"
    )
    .expect("metric can be created");
}

/// Renders every registered metric in the Prometheus text format.
pub fn render() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder.encode(&prometheus::gather(), &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}

/// `GET /metrics`
pub async fn metrics_handler() -> Result<impl IntoResponse, ServiceError> {
    let body = render().map_err(|e| ServiceError::InternalError(format!("metrics encoding: {e}")))?;
    Ok((
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        body,
    ))
}
