use super::{CapturedPayment, PaymentGateway, RemoteOrder, RemoteOrderRequest};
use crate::{config::AppConfig, errors::ServiceError, metrics::PAYMENT_PROVIDER_CALLS};
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use std::{str::FromStr, time::Duration};
use tracing::{info, instrument, warn};
use url::Url;

/// PayPal REST client: client-credentials token, order create, order capture.
#[derive(Clone)]
pub struct PaypalGateway {
    client: reqwest::Client,
    base_url: Url,
    credentials: Option<(String, String)>,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct Link {
    href: String,
    rel: String,
}

#[derive(Deserialize)]
struct OrderResponse {
    id: String,
    status: String,
    #[serde(default)]
    links: Vec<Link>,
    #[serde(default)]
    purchase_units: Vec<PurchaseUnit>,
}

#[derive(Deserialize)]
struct PurchaseUnit {
    custom_id: Option<String>,
    payments: Option<Payments>,
}

#[derive(Deserialize)]
struct Payments {
    #[serde(default)]
    captures: Vec<Capture>,
}

#[derive(Deserialize)]
struct Capture {
    custom_id: Option<String>,
    amount: Option<Amount>,
}

#[derive(Deserialize)]
struct Amount {
    currency_code: String,
    value: String,
}

impl PaypalGateway {
    pub fn new(
        base_url: impl Into<String>,
        credentials: Option<(String, String)>,
        timeout: Duration,
    ) -> Result<Self, ServiceError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ServiceError::InternalError(format!("HTTP client setup failed: {}", e)))?;
        let base_url = Url::parse(&base_url.into()).map_err(|e| {
            ServiceError::InternalError(format!("Invalid PayPal base URL: {}", e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ServiceError::InternalError(
                "Invalid PayPal base URL: not a base".to_string(),
            ));
        }
        Ok(Self {
            client,
            base_url,
            credentials,
        })
    }

    /// Appends `segments` to the base URL, percent-encoding each one so a
    /// segment can never add path components or a query.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    pub fn from_app_config(config: &AppConfig) -> Result<Self, ServiceError> {
        let credentials = match (&config.paypal_client_id, &config.paypal_client_secret) {
            (Some(id), Some(secret)) if !id.is_empty() && !secret.is_empty() => {
                Some((id.clone(), secret.clone()))
            }
            _ => None,
        };
        Self::new(
            config.paypal_base_url.clone(),
            credentials,
            Duration::from_secs(config.payment_timeout_secs),
        )
    }

    async fn access_token(&self) -> Result<String, ServiceError> {
        let (client_id, secret) = self.credentials.as_ref().ok_or_else(|| {
            ServiceError::ExternalServiceError("PayPal credentials are not configured".to_string())
        })?;

        let response = self
            .client
            .post(self.endpoint(&["v1", "oauth2", "token"]))
            .basic_auth(client_id, Some(secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| upstream("token", e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(upstream("token", format!("HTTP {}: {}", status, body)));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| upstream("token", format!("unreadable response: {}", e)))?;
        Ok(token.access_token)
    }
}

fn upstream(operation: &str, detail: String) -> ServiceError {
    PAYMENT_PROVIDER_CALLS
        .with_label_values(&[operation, "error"])
        .inc();
    warn!(operation, %detail, "PayPal call failed");
    ServiceError::ExternalServiceError(format!("PayPal {} failed: {}", operation, detail))
}

#[async_trait]
impl PaymentGateway for PaypalGateway {
    #[instrument(skip(self, request), fields(amount = %request.amount, currency = %request.currency))]
    async fn create_order(&self, request: RemoteOrderRequest) -> Result<RemoteOrder, ServiceError> {
        let token = self.access_token().await?;
        let body = json!({
            "intent": "CAPTURE",
            "purchase_units": [{
                "custom_id": request.custom_id,
                "description": request.description,
                "amount": {
                    "currency_code": request.currency,
                    "value": format!("{:.2}", request.amount),
                },
            }],
        });

        let response = self
            .client
            .post(self.endpoint(&["v2", "checkout", "orders"]))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .map_err(|e| upstream("create", e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(upstream("create", format!("HTTP {}: {}", status, text)));
        }

        let order: OrderResponse = response
            .json()
            .await
            .map_err(|e| upstream("create", format!("unreadable response: {}", e)))?;

        let approve_url = order
            .links
            .iter()
            .find(|l| l.rel == "approve" || l.rel == "payer-action")
            .map(|l| l.href.clone());

        PAYMENT_PROVIDER_CALLS
            .with_label_values(&["create", "ok"])
            .inc();
        info!(paypal_order_id = %order.id, status = %order.status, "PayPal order created");
        Ok(RemoteOrder {
            id: order.id,
            status: order.status,
            approve_url,
        })
    }

    #[instrument(skip(self))]
    async fn capture_order(&self, remote_order_id: &str) -> Result<CapturedPayment, ServiceError> {
        let token = self.access_token().await?;
        let response = self
            .client
            .post(self.endpoint(&["v2", "checkout", "orders", remote_order_id, "capture"]))
            .bearer_auth(token)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body("{}")
            .send()
            .await
            .map_err(|e| upstream("capture", e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(upstream("capture", format!("HTTP {}: {}", status, text)));
        }

        let order: OrderResponse = response
            .json()
            .await
            .map_err(|e| upstream("capture", format!("unreadable response: {}", e)))?;

        let unit = order.purchase_units.first();
        let capture = unit
            .and_then(|u| u.payments.as_ref())
            .and_then(|p| p.captures.first());
        let custom_id = capture
            .and_then(|c| c.custom_id.clone())
            .or_else(|| unit.and_then(|u| u.custom_id.clone()));
        let amount = capture.and_then(|c| c.amount.as_ref());

        PAYMENT_PROVIDER_CALLS
            .with_label_values(&["capture", "ok"])
            .inc();
        info!(paypal_order_id = %order.id, status = %order.status, "PayPal capture returned");
        Ok(CapturedPayment {
            order_id: order.id,
            status: order.status,
            custom_id,
            amount: amount.and_then(|a| Decimal::from_str(&a.value).ok()),
            currency: amount.map(|a| a.currency_code.clone()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;
    use wiremock::{
        matchers::{header, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    async fn gateway(server: &MockServer) -> PaypalGateway {
        Mock::given(method("POST"))
            .and(path("/v1/oauth2/token"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"access_token": "tok-1"})),
            )
            .mount(server)
            .await;
        PaypalGateway::new(
            server.uri(),
            Some(("id".into(), "secret".into())),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn create_returns_approve_link() {
        let server = MockServer::start().await;
        let gateway = gateway(&server).await;
        Mock::given(method("POST"))
            .and(path("/v2/checkout/orders"))
            .and(header("authorization", "Bearer tok-1"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "id": "PP-1",
                "status": "CREATED",
                "links": [
                    {"href": "https://example.test/self", "rel": "self"},
                    {"href": "https://example.test/approve", "rel": "approve"}
                ]
            })))
            .mount(&server)
            .await;

        let order = gateway
            .create_order(RemoteOrderRequest {
                custom_id: "7".into(),
                description: "Pollera".into(),
                amount: dec!(10.67),
                currency: "USD".into(),
            })
            .await
            .unwrap();

        assert_eq!(order.id, "PP-1");
        assert_eq!(order.approve_url.as_deref(), Some("https://example.test/approve"));
    }

    #[tokio::test]
    async fn capture_reads_custom_id_from_capture() {
        let server = MockServer::start().await;
        let gateway = gateway(&server).await;
        Mock::given(method("POST"))
            .and(path("/v2/checkout/orders/PP-1/capture"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "id": "PP-1",
                "status": "COMPLETED",
                "purchase_units": [{
                    "payments": {"captures": [{
                        "custom_id": "7",
                        "amount": {"currency_code": "USD", "value": "10.67"}
                    }]}
                }]
            })))
            .mount(&server)
            .await;

        let capture = gateway.capture_order("PP-1").await.unwrap();
        assert!(capture.is_completed());
        assert_eq!(capture.custom_id.as_deref(), Some("7"));
        assert_eq!(capture.amount, Some(dec!(10.67)));
    }

    #[tokio::test]
    async fn order_ids_stay_inside_one_path_segment() {
        let server = MockServer::start().await;
        let gateway = gateway(&server).await;

        let err = gateway
            .capture_order("../../../v1/reporting/transactions?")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::ExternalServiceError(_)));

        let requests = server.received_requests().await.unwrap();
        let paths: Vec<_> = requests.iter().map(|r| r.url.path().to_string()).collect();
        assert_eq!(paths.len(), 2, "{paths:?}");
        assert_eq!(paths[0], "/v1/oauth2/token");
        assert!(paths[1].starts_with("/v2/checkout/orders/"), "{}", paths[1]);
        assert!(paths[1].ends_with("/capture"), "{}", paths[1]);
        assert!(requests[1].url.query().is_none());
    }

    #[test]
    fn base_path_is_kept() {
        let gateway = PaypalGateway::new(
            "https://api.example.test/sandbox/",
            None,
            Duration::from_secs(1),
        )
        .unwrap();
        assert_eq!(
            gateway.endpoint(&["v2", "checkout", "orders"]).as_str(),
            "https://api.example.test/sandbox/v2/checkout/orders"
        );
    }

    #[tokio::test]
    async fn failing_token_endpoint_is_an_upstream_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/oauth2/token"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;
        let gateway = PaypalGateway::new(
            server.uri(),
            Some(("id".into(), "bad".into())),
            Duration::from_secs(5),
        )
        .unwrap();

        let err = gateway.capture_order("PP-1").await.unwrap_err();
        assert!(matches!(err, ServiceError::ExternalServiceError(_)));
    }

    #[tokio::test]
    async fn missing_credentials_never_call_out() {
        let gateway =
            PaypalGateway::new("http://127.0.0.1:9", None, Duration::from_secs(1)).unwrap();
        let err = gateway.capture_order("PP-1").await.unwrap_err();
        assert!(matches!(err, ServiceError::ExternalServiceError(_)));
    }
}
