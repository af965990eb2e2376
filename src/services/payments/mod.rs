//! Card payments through an external processor, plus conversion from the
//! store's local currency into the processor's settlement currency.

pub mod paypal;

use crate::errors::ServiceError;
use async_trait::async_trait;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

pub use paypal::PaypalGateway;

/// What the store asks the processor to charge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteOrderRequest {
    /// Echoed back on capture so the order can be tied to a product.
    pub custom_id: String,
    pub description: String,
    pub amount: Decimal,
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteOrder {
    pub id: String,
    pub status: String,
    /// Where the shopper approves the payment.
    pub approve_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapturedPayment {
    pub order_id: String,
    pub status: String,
    pub custom_id: Option<String>,
    pub amount: Option<Decimal>,
    pub currency: Option<String>,
}

impl CapturedPayment {
    pub fn is_completed(&self) -> bool {
        self.status.eq_ignore_ascii_case("COMPLETED")
    }
}

/// Remote payment processor. Failures surface as
/// [`ServiceError::ExternalServiceError`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_order(&self, request: RemoteOrderRequest) -> Result<RemoteOrder, ServiceError>;

    async fn capture_order(&self, remote_order_id: &str) -> Result<CapturedPayment, ServiceError>;
}

/// Converts a local price into the amount to charge so that, after the
/// processor keeps `percent_fee` of the gross plus `fixed_fee`, the store
/// receives the local price at `rate` local units per settlement unit.
pub fn settlement_amount(
    local_amount: Decimal,
    rate: Decimal,
    percent_fee: Decimal,
    fixed_fee: Decimal,
) -> Result<Decimal, ServiceError> {
    if rate <= Decimal::ZERO {
        return Err(ServiceError::ValidationError(
            "exchange rate must be positive".to_string(),
        ));
    }
    if percent_fee < Decimal::ZERO || percent_fee >= Decimal::ONE {
        return Err(ServiceError::ValidationError(
            "percent fee must be in [0, 1)".to_string(),
        ));
    }
    if local_amount.is_sign_negative() {
        return Err(ServiceError::ValidationError(
            "amount cannot be negative".to_string(),
        ));
    }

    let net = local_amount / rate;
    let gross = (net + fixed_fee) / (Decimal::ONE - percent_fee);
    Ok(gross.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
}

/// The configured site rate when it is set and positive, otherwise `fallback`.
pub fn effective_rate(site_rate: Option<Decimal>, fallback: Decimal) -> Decimal {
    site_rate.filter(|r| *r > Decimal::ZERO).unwrap_or(fallback)
}
