use crate::domain::ports::{GatewayResult, NewOrder, PaymentGateway, Resource};
use crate::error::GatewayError;
use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::RwLock;

/// A thread-safe in-memory stand-in for the payment gateway.
///
/// Orders and payments live in `Arc<RwLock<HashMap<..>>>` so clones share state.
/// Reads can be forced to fail to exercise the adapter's degraded paths, and
/// every remote call is counted.
#[derive(Default, Clone)]
pub struct InMemoryGateway {
    orders: Arc<RwLock<HashMap<String, Resource>>>,
    payments: Arc<RwLock<HashMap<String, Resource>>>,
    fail_reads: Arc<AtomicBool>,
    calls: Arc<AtomicUsize>,
    next_id: Arc<AtomicUsize>,
}

impl InMemoryGateway {
    /// Creates a new, empty gateway.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a payment against `order_id`, as the hosted checkout would.
    pub async fn insert_payment(&self, payment_id: &str, order_id: &str, amount: i64, status: &str) {
        let payment = resource(json!({
            "id": payment_id,
            "entity": "payment",
            "order_id": order_id,
            "amount": amount,
            "currency": "INR",
            "status": status,
        }));
        self.payments
            .write()
            .await
            .insert(payment_id.to_string(), payment);
    }

    pub async fn set_order_status(&self, order_id: &str, status: &str) {
        if let Some(order) = self.orders.write().await.get_mut(order_id) {
            order.insert("status".into(), Value::from(status));
        }
    }

    pub async fn order(&self, order_id: &str) -> Option<Resource> {
        self.orders.read().await.get(order_id).cloned()
    }

    pub async fn order_count(&self) -> usize {
        self.orders.read().await.len()
    }

    /// Makes every fetch fail with a transport error until reset.
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Number of gateway operations invoked so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    fn check_reads(&self) -> GatewayResult<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            Err(GatewayError::Transport("connection reset".into()))
        } else {
            Ok(())
        }
    }
}

fn resource(value: Value) -> Resource {
    match value {
        Value::Object(map) => map,
        _ => Resource::new(),
    }
}

#[async_trait]
impl PaymentGateway for InMemoryGateway {
    async fn create_order(&self, order: NewOrder) -> GatewayResult<Resource> {
        self.record_call();
        let mut orders = self.orders.write().await;

        // The gateway deduplicates on receipt.
        if let Some(existing) = orders
            .values()
            .find(|o| o.get("receipt").and_then(Value::as_str) == Some(order.receipt.as_str()))
        {
            return Ok(existing.clone());
        }

        let id = format!("order_{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        let created = resource(json!({
            "id": id,
            "entity": "order",
            "amount": order.amount,
            "currency": order.currency,
            "receipt": order.receipt,
            "notes": order.notes,
            "status": "created",
        }));
        orders.insert(id, created.clone());
        Ok(created)
    }

    async fn fetch_order(&self, order_id: &str) -> GatewayResult<Resource> {
        self.record_call();
        self.check_reads()?;
        self.orders
            .read()
            .await
            .get(order_id)
            .cloned()
            .ok_or_else(|| GatewayError::NotFound(order_id.to_string()))
    }

    async fn fetch_payment(&self, payment_id: &str) -> GatewayResult<Resource> {
        self.record_call();
        self.check_reads()?;
        self.payments
            .read()
            .await
            .get(payment_id)
            .cloned()
            .ok_or_else(|| GatewayError::NotFound(payment_id.to_string()))
    }

    async fn capture_payment(
        &self,
        payment_id: &str,
        amount: i64,
        currency: &str,
    ) -> GatewayResult<Resource> {
        self.record_call();
        let mut payments = self.payments.write().await;
        let payment = payments
            .get_mut(payment_id)
            .ok_or_else(|| GatewayError::NotFound(payment_id.to_string()))?;

        let rejected = |description: &str| GatewayError::Api {
            status: 400,
            code: "BAD_REQUEST_ERROR".into(),
            description: description.to_string(),
        };
        if payment.get("status").and_then(Value::as_str) != Some("authorized") {
            return Err(rejected("This payment has already been captured or is not authorized"));
        }
        if payment.get("amount").and_then(Value::as_i64) != Some(amount) {
            return Err(rejected("Capture amount must be equal to the amount authorized"));
        }
        if payment.get("currency").and_then(Value::as_str) != Some(currency) {
            return Err(rejected("Currency does not match the payment currency"));
        }

        payment.insert("status".into(), Value::from("captured"));
        payment.insert("captured".into(), Value::Bool(true));
        Ok(payment.clone())
    }
}
