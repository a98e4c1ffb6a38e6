use crate::config::{AdapterConfig, Credentials};
use crate::domain::ports::{GatewayResult, NewOrder, PaymentGateway, Resource};
use crate::error::{GatewayError, Result};
use async_trait::async_trait;
use reqwest::{RequestBuilder, StatusCode};
use serde::Deserialize;
use serde_json::json;

/// Razorpay REST API client.
///
/// Authenticates with HTTP basic auth (`key_id:key_secret`). Every request is
/// bounded by the configured client timeout; nothing here retries.
#[derive(Debug, Clone)]
pub struct RazorpayClient {
    http: reqwest::Client,
    base_url: String,
    credentials: Credentials,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: String,
    #[serde(default)]
    description: String,
}

impl RazorpayClient {
    pub fn new(config: &AdapterConfig) -> Result<Self> {
        let credentials = config.credentials()?;
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(GatewayError::from)?;
        Ok(Self {
            http,
            base_url: config.api_base_url().trim_end_matches('/').to_string(),
            credentials,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn send(&self, request: RequestBuilder) -> GatewayResult<Resource> {
        let response = request
            .basic_auth(&self.credentials.key_id, Some(&self.credentials.key_secret))
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<Resource>().await?);
        }

        let text = response.text().await.unwrap_or_default();
        Err(api_error(status, &text))
    }
}

fn api_error(status: StatusCode, body: &str) -> GatewayError {
    if status == StatusCode::NOT_FOUND {
        return GatewayError::NotFound(body.to_string());
    }
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => GatewayError::Api {
            status: status.as_u16(),
            code: envelope.error.code,
            description: envelope.error.description,
        },
        Err(_) => GatewayError::Api {
            status: status.as_u16(),
            code: String::new(),
            description: body.to_string(),
        },
    }
}

/// Gateway identifiers are alphanumeric with underscores; anything else would
/// alter the request path.
fn path_segment(id: &str) -> GatewayResult<&str> {
    if !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        Ok(id)
    } else {
        Err(GatewayError::NotFound(format!("malformed identifier {id:?}")))
    }
}

#[async_trait]
impl PaymentGateway for RazorpayClient {
    async fn create_order(&self, order: NewOrder) -> GatewayResult<Resource> {
        self.send(self.http.post(self.url("orders")).json(&order))
            .await
    }

    async fn fetch_order(&self, order_id: &str) -> GatewayResult<Resource> {
        let path = format!("orders/{}", path_segment(order_id)?);
        self.send(self.http.get(self.url(&path))).await
    }

    async fn fetch_payment(&self, payment_id: &str) -> GatewayResult<Resource> {
        let path = format!("payments/{}", path_segment(payment_id)?);
        self.send(self.http.get(self.url(&path))).await
    }

    async fn capture_payment(
        &self,
        payment_id: &str,
        amount: i64,
        currency: &str,
    ) -> GatewayResult<Resource> {
        let path = format!("payments/{}/capture", path_segment(payment_id)?);
        let body = json!({ "amount": amount, "currency": currency });
        self.send(self.http.post(self.url(&path)).json(&body)).await
    }
}
