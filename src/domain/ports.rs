use crate::error::GatewayError;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};

/// A gateway resource (order or payment) as free-form JSON.
pub type Resource = Map<String, Value>;

pub type GatewayResult<T> = std::result::Result<T, GatewayError>;

/// Order creation request sent at initiation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewOrder {
    /// Amount in subunits.
    pub amount: i64,
    pub currency: String,
    pub receipt: String,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub notes: Map<String, Value>,
}

/// The remote payment gateway operations the adapter relies on.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_order(&self, order: NewOrder) -> GatewayResult<Resource>;
    async fn fetch_order(&self, order_id: &str) -> GatewayResult<Resource>;
    async fn fetch_payment(&self, payment_id: &str) -> GatewayResult<Resource>;
    async fn capture_payment(
        &self,
        payment_id: &str,
        amount: i64,
        currency: &str,
    ) -> GatewayResult<Resource>;
}

pub type PaymentGatewayBox = Box<dyn PaymentGateway>;
