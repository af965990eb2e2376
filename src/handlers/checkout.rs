//! Storefront checkout. Each channel answers with where to send the shopper
//! next; only PayPal involves a second round trip.

use axum::{extract::State, Json};

use crate::{
    handlers::common::{created, validate_input, ApiResult, Created},
    services::checkout::{
        CheckoutRequest, CheckoutResponse, PaypalCaptureRequest, PaypalOrderRequest,
        PaypalOrderResponse,
    },
    ApiResponse, AppState,
};

#[utoipa::path(
    post,
    path = "/api/v1/checkout/whatsapp",
    summary = "Checkout via WhatsApp",
    description = "Creates a `Recibido` order and returns a wa.me link prefilled with the order code",
    request_body = CheckoutRequest,
    responses(
        (status = 201, description = "Order created", body = ApiResponse<CheckoutResponse>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Unknown product", body = crate::errors::ErrorResponse),
        (status = 503, description = "Shop in maintenance", body = crate::errors::ErrorResponse)
    ),
    tag = "checkout"
)]
pub async fn checkout_whatsapp(
    State(state): State<AppState>,
    Json(payload): Json<CheckoutRequest>,
) -> Created<CheckoutResponse> {
    validate_input(&payload)?;
    created(state.services.checkout.checkout_whatsapp(payload).await?)
}

#[utoipa::path(
    post,
    path = "/api/v1/checkout/qr",
    summary = "Checkout via QR transfer",
    description = "Creates a `Recibido` order and returns its tracking page",
    request_body = CheckoutRequest,
    responses(
        (status = 201, description = "Order created", body = ApiResponse<CheckoutResponse>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Unknown product", body = crate::errors::ErrorResponse)
    ),
    tag = "checkout"
)]
pub async fn checkout_qr(
    State(state): State<AppState>,
    Json(payload): Json<CheckoutRequest>,
) -> Created<CheckoutResponse> {
    validate_input(&payload)?;
    created(state.services.checkout.checkout_qr(payload).await?)
}

#[utoipa::path(
    post,
    path = "/api/v1/checkout/paypal/orders",
    summary = "Open a PayPal order",
    description = "Converts the local price to the settlement currency, adds processor fees, and opens a remote order. Nothing is stored locally.",
    request_body = PaypalOrderRequest,
    responses(
        (status = 200, description = "Remote order opened", body = ApiResponse<PaypalOrderResponse>),
        (status = 404, description = "Unknown product", body = crate::errors::ErrorResponse),
        (status = 502, description = "Payment provider unavailable", body = crate::errors::ErrorResponse)
    ),
    tag = "checkout"
)]
pub async fn create_paypal_order(
    State(state): State<AppState>,
    Json(payload): Json<PaypalOrderRequest>,
) -> ApiResult<PaypalOrderResponse> {
    validate_input(&payload)?;
    let response = state.services.checkout.create_paypal_order(payload).await?;
    Ok(Json(ApiResponse::success(response)))
}

#[utoipa::path(
    post,
    path = "/api/v1/checkout/paypal/capture",
    summary = "Capture a PayPal order",
    description = "Captures an approved remote order and records it as a `Pagado` order",
    request_body = PaypalCaptureRequest,
    responses(
        (status = 201, description = "Payment captured and order created", body = ApiResponse<CheckoutResponse>),
        (status = 409, description = "Remote order already recorded", body = crate::errors::ErrorResponse),
        (status = 502, description = "Capture failed or not completed", body = crate::errors::ErrorResponse)
    ),
    tag = "checkout"
)]
pub async fn capture_paypal_order(
    State(state): State<AppState>,
    Json(payload): Json<PaypalCaptureRequest>,
) -> Created<CheckoutResponse> {
    validate_input(&payload)?;
    created(state.services.checkout.capture_paypal_order(payload).await?)
}
