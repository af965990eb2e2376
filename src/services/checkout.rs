//! Storefront checkout. Every channel ends in a retail order; the channel
//! decides the initial status and where the shopper is sent next.

use crate::{
    entities::{order::PaymentMethod, product::Entity as Product},
    errors::ServiceError,
    services::{
        contact::{self, whatsapp_digits},
        orders::{NewOrder, OrderDetail, OrderService},
        payments::{effective_rate, settlement_amount, PaymentGateway, RemoteOrderRequest},
        settings, Actor,
    },
};
use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use sea_orm::{DatabaseConnection, EntityTrait};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use url::Url;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

lazy_static! {
    static ref PAYPAL_ORDER_ID: Regex =
        Regex::new(r"^[A-Za-z0-9-]{1,64}$").expect("PayPal order id pattern compiles");
}

fn validate_paypal_order_id(value: &str) -> Result<(), ValidationError> {
    if PAYPAL_ORDER_ID.is_match(value) {
        Ok(())
    } else {
        let mut err = ValidationError::new("paypal_order_id");
        err.message = Some("must be letters, digits and hyphens".into());
        Err(err)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CheckoutRequest {
    #[validate(range(min = 1))]
    pub product_id: i32,
    #[validate(length(max = 500))]
    pub image_url: Option<String>,
    /// Local currency. Defaults to the product price.
    pub total: Option<Decimal>,
    #[validate(length(max = 2000))]
    pub order_notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CheckoutResponse {
    pub order_code: String,
    pub redirect_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct PaypalOrderRequest {
    #[validate(range(min = 1))]
    pub product_id: i32,
    pub total: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PaypalOrderResponse {
    pub paypal_order_id: String,
    pub approve_url: Option<String>,
    /// Settlement amount after conversion and fees.
    pub amount: Decimal,
    pub currency: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct PaypalCaptureRequest {
    #[validate(custom = "validate_paypal_order_id")]
    pub paypal_order_id: String,
    pub total: Option<Decimal>,
    #[validate(length(max = 500))]
    pub image_url: Option<String>,
    #[validate(length(max = 2000))]
    pub order_notes: Option<String>,
}

/// Processor fee schedule and currency.
#[derive(Debug, Clone)]
pub struct PaymentTerms {
    pub currency: String,
    pub percent_fee: Decimal,
    pub fixed_fee: Decimal,
    pub fallback_rate: Decimal,
}

#[derive(Clone)]
pub struct CheckoutService {
    db: Arc<DatabaseConnection>,
    orders: Arc<OrderService>,
    gateway: Arc<dyn PaymentGateway>,
    terms: PaymentTerms,
    storefront_base_url: String,
}

impl CheckoutService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        orders: Arc<OrderService>,
        gateway: Arc<dyn PaymentGateway>,
        terms: PaymentTerms,
        storefront_base_url: impl Into<String>,
    ) -> Self {
        Self {
            db,
            orders,
            gateway,
            terms,
            storefront_base_url: storefront_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn tracking_url(&self, order_code: &str) -> String {
        format!("{}/api/v1/orders/track/{}", self.storefront_base_url, order_code)
    }

    /// Creates a `Recibido` order and points the shopper at a WhatsApp chat
    /// prefilled with the order code.
    #[instrument(skip(self, request), fields(product_id = request.product_id))]
    pub async fn checkout_whatsapp(
        &self,
        request: CheckoutRequest,
    ) -> Result<CheckoutResponse, ServiceError> {
        request.validate()?;
        let detail = self
            .place_order(
                request.product_id,
                PaymentMethod::Whatsapp,
                request.total,
                request.image_url,
                request.order_notes,
                None,
            )
            .await?;

        let contact = contact::load_or_create(&*self.db).await?;
        let number = contact
            .whatsapp
            .as_deref()
            .map(whatsapp_digits)
            .unwrap_or_default();
        let product_name = detail
            .product
            .as_ref()
            .map(|p| p.name.as_str())
            .unwrap_or("producto");
        let message = format!(
            "Hola, quiero confirmar mi pedido {}.\nProducto: {}\nTotal: Bs {}\nSeguimiento: {}",
            detail.order.order_code,
            product_name,
            detail.order.total.round_dp(2),
            self.tracking_url(&detail.order.order_code),
        );
        let redirect_url = whatsapp_link(&number, &message)?;

        Ok(CheckoutResponse {
            order_code: detail.order.order_code,
            redirect_url,
        })
    }

    /// Creates a `Recibido` order for an offline QR transfer and sends the
    /// shopper to the tracking page.
    #[instrument(skip(self, request), fields(product_id = request.product_id))]
    pub async fn checkout_qr(
        &self,
        request: CheckoutRequest,
    ) -> Result<CheckoutResponse, ServiceError> {
        request.validate()?;
        let detail = self
            .place_order(
                request.product_id,
                PaymentMethod::Qr,
                request.total,
                request.image_url,
                request.order_notes,
                None,
            )
            .await?;
        let redirect_url = self.tracking_url(&detail.order.order_code);
        Ok(CheckoutResponse {
            order_code: detail.order.order_code,
            redirect_url,
        })
    }

    /// Opens a remote order for the product's settlement amount. Nothing is
    /// stored locally until capture.
    #[instrument(skip(self, request), fields(product_id = request.product_id))]
    pub async fn create_paypal_order(
        &self,
        request: PaypalOrderRequest,
    ) -> Result<PaypalOrderResponse, ServiceError> {
        request.validate()?;
        let product = Product::find_by_id(request.product_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Product {} not found", request.product_id))
            })?;
        let local_total = request.total.unwrap_or(product.price);
        let amount = self.settlement_for(local_total).await?;

        let remote = self
            .gateway
            .create_order(RemoteOrderRequest {
                custom_id: product.id.to_string(),
                description: product.name.chars().take(127).collect(),
                amount,
                currency: self.terms.currency.clone(),
            })
            .await?;

        info!(paypal_order_id = %remote.id, %amount, "PayPal order opened");
        Ok(PaypalOrderResponse {
            paypal_order_id: remote.id,
            approve_url: remote.approve_url,
            amount,
            currency: self.terms.currency.clone(),
        })
    }

    /// Captures an approved remote order and records it as a `Pagado` order.
    /// Captures that do not complete leave no local trace.
    #[instrument(skip(self, request), fields(paypal_order_id = %request.paypal_order_id))]
    pub async fn capture_paypal_order(
        &self,
        request: PaypalCaptureRequest,
    ) -> Result<CheckoutResponse, ServiceError> {
        request.validate()?;
        if let Some(existing) = self
            .orders
            .find_by_payment_reference(&request.paypal_order_id)
            .await?
        {
            return Err(ServiceError::Conflict(format!(
                "Payment already recorded as order {}",
                existing.order_code
            )));
        }

        let capture = self.gateway.capture_order(&request.paypal_order_id).await?;
        if !capture.is_completed() {
            warn!(status = %capture.status, "PayPal capture did not complete");
            return Err(ServiceError::ExternalServiceError(format!(
                "PayPal capture status {}",
                capture.status
            )));
        }

        let product_id = capture
            .custom_id
            .as_deref()
            .and_then(|id| id.trim().parse::<i32>().ok())
            .ok_or_else(|| {
                ServiceError::ExternalServiceError(
                    "PayPal capture is missing the product reference".to_string(),
                )
            })?;
        let product = Product::find_by_id(product_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", product_id)))?;

        let local_total = request.total.unwrap_or(product.price);
        let expected = self.settlement_for(local_total).await?;
        let currency_matches = capture
            .currency
            .as_deref()
            .is_some_and(|c| c.eq_ignore_ascii_case(&self.terms.currency));
        let amount_covers = capture.amount.is_some_and(|paid| paid >= expected);
        if !currency_matches || !amount_covers {
            warn!(
                paid = ?capture.amount,
                currency = ?capture.currency,
                %expected,
                "PayPal capture does not cover the order"
            );
            return Err(ServiceError::Conflict(format!(
                "Captured payment does not cover {} {}",
                expected, self.terms.currency
            )));
        }

        let detail = self
            .orders
            .create_order(
                NewOrder {
                    product_id,
                    payment_method: PaymentMethod::Paypal,
                    total: Some(local_total),
                    image_url: request.image_url,
                    notes: request.order_notes.filter(|n| !n.trim().is_empty()),
                    payment_reference: Some(request.paypal_order_id.clone()),
                    history_note: Some(format!(
                        "Pago PayPal capturado ({})",
                        request.paypal_order_id
                    )),
                },
                &Actor::storefront(),
            )
            .await?;

        let redirect_url = self.tracking_url(&detail.order.order_code);
        Ok(CheckoutResponse {
            order_code: detail.order.order_code,
            redirect_url,
        })
    }

    /// Amount to charge in the settlement currency for a local total, at the
    /// site's current rate.
    async fn settlement_for(&self, local_total: Decimal) -> Result<Decimal, ServiceError> {
        let site = settings::load_or_create(&*self.db).await?;
        let rate = effective_rate(site.exchange_rate, self.terms.fallback_rate);
        settlement_amount(
            local_total,
            rate,
            self.terms.percent_fee,
            self.terms.fixed_fee,
        )
    }

    async fn place_order(
        &self,
        product_id: i32,
        payment_method: PaymentMethod,
        total: Option<Decimal>,
        image_url: Option<String>,
        notes: Option<String>,
        payment_reference: Option<String>,
    ) -> Result<OrderDetail, ServiceError> {
        self.orders
            .create_order(
                NewOrder {
                    product_id,
                    payment_method,
                    total,
                    image_url,
                    notes: notes.filter(|n| !n.trim().is_empty()),
                    payment_reference,
                    history_note: None,
                },
                &Actor::storefront(),
            )
            .await
    }
}

/// `https://wa.me/<digits>?text=<message>`. Without a number the link opens
/// the share picker.
pub fn whatsapp_link(number: &str, message: &str) -> Result<String, ServiceError> {
    let base = format!("https://wa.me/{}", number);
    let url = Url::parse_with_params(&base, &[("text", message)])
        .map_err(|e| ServiceError::InternalError(format!("Invalid WhatsApp link: {}", e)))?;
    Ok(url.to_string())
}
