#![allow(dead_code)]

use razorpay_session::application::adapter::PaymentSessionAdapter;
use razorpay_session::config::AdapterConfig;
use razorpay_session::domain::signature;
use razorpay_session::infrastructure::in_memory::InMemoryGateway;
use razorpay_session::interfaces::webhook::{SIGNATURE_HEADER, WebhookHeaders};
use serde_json::{Map, Value};

pub const KEY_ID: &str = "rzp_test_1DP5mmOlF5G5ag";
pub const KEY_SECRET: &str = "thisisasupersecret";
pub const WEBHOOK_SECRET: &str = "whsec_local";

pub fn adapter(gateway: &InMemoryGateway) -> PaymentSessionAdapter {
    let config = AdapterConfig::new(KEY_ID, KEY_SECRET);
    PaymentSessionAdapter::new(&config, Box::new(gateway.clone())).unwrap()
}

pub fn adapter_with_webhook_secret(gateway: &InMemoryGateway) -> PaymentSessionAdapter {
    let config = AdapterConfig::new(KEY_ID, KEY_SECRET).with_webhook_secret(WEBHOOK_SECRET);
    PaymentSessionAdapter::new(&config, Box::new(gateway.clone())).unwrap()
}

/// Patch the storefront sends back after the hosted checkout completes.
pub fn checkout_patch(order_id: &str, payment_id: &str) -> Map<String, Value> {
    let mut patch = Map::new();
    patch.insert("payment_id".into(), Value::from(payment_id));
    patch.insert(
        "signature".into(),
        Value::from(signature::sign_checkout(KEY_SECRET, order_id, payment_id).unwrap()),
    );
    patch
}

pub fn signed_headers(body: &[u8]) -> WebhookHeaders {
    let mut headers = WebhookHeaders::new();
    headers.insert(
        SIGNATURE_HEADER.to_string(),
        signature::sign_hex(WEBHOOK_SECRET, body).unwrap().as_str().into(),
    );
    headers
}
