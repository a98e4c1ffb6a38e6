//! Inbound webhook handling: header lookup, payload coercion and event mapping.
//!
//! The gateway's webhook body is loosely typed. Decoding first tries the
//! documented schema and falls back to optional-path lookups on a generic JSON
//! value, so a shape mismatch degrades to `not_supported` instead of an error.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Cow;
use std::collections::HashMap;
use tracing::debug;

/// Header carrying the hex HMAC-SHA256 of the raw body.
pub const SIGNATURE_HEADER: &str = "x-razorpay-signature";

/// A header that arrived either once or several times.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HeaderValue {
    Single(String),
    Multiple(Vec<String>),
}

impl HeaderValue {
    pub fn first(&self) -> Option<&str> {
        match self {
            HeaderValue::Single(value) => Some(value.as_str()),
            HeaderValue::Multiple(values) => values.first().map(String::as_str),
        }
    }
}

impl From<&str> for HeaderValue {
    fn from(value: &str) -> Self {
        HeaderValue::Single(value.to_string())
    }
}

pub type WebhookHeaders = HashMap<String, HeaderValue>;

/// Case-insensitive lookup of the signature header.
pub fn signature_header(headers: &WebhookHeaders) -> Option<&str> {
    headers
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(SIGNATURE_HEADER))
        .and_then(|(_, value)| value.first())
}

/// Webhook body as handed over by the host.
#[derive(Debug, Clone, PartialEq)]
pub enum WebhookPayload {
    /// The exact bytes received on the wire.
    Raw(Vec<u8>),
    /// A body the host already parsed; its raw bytes are gone.
    Parsed(Value),
}

impl WebhookPayload {
    /// Bytes the signature is computed over. Parsed bodies are re-serialized
    /// compactly in their original key order, which matches what the gateway
    /// sends as long as the host kept that order.
    pub fn signed_bytes(&self) -> Cow<'_, [u8]> {
        match self {
            WebhookPayload::Raw(bytes) => Cow::Borrowed(bytes.as_slice()),
            WebhookPayload::Parsed(value) => Cow::Owned(value.to_string().into_bytes()),
        }
    }

    /// Structured view of the body. A JSON string holding JSON is unwrapped once.
    pub fn to_value(&self) -> Option<Value> {
        let value = match self {
            WebhookPayload::Raw(bytes) => serde_json::from_slice::<Value>(bytes).ok()?,
            WebhookPayload::Parsed(value) => value.clone(),
        };
        match value {
            Value::String(inner) => serde_json::from_str(&inner).ok(),
            other => Some(other),
        }
    }
}

impl From<Vec<u8>> for WebhookPayload {
    fn from(bytes: Vec<u8>) -> Self {
        WebhookPayload::Raw(bytes)
    }
}

impl From<&str> for WebhookPayload {
    fn from(body: &str) -> Self {
        WebhookPayload::Raw(body.as_bytes().to_vec())
    }
}

impl From<Value> for WebhookPayload {
    fn from(value: Value) -> Self {
        WebhookPayload::Parsed(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WebhookAction {
    Authorized,
    Captured,
    Canceled,
    Failed,
    NotSupported,
}

/// Gateway event name → action. Anything not listed is `NotSupported`.
pub const EVENT_ACTION_TABLE: &[(&str, WebhookAction)] = &[
    ("payment.authorized", WebhookAction::Authorized),
    ("payment.captured", WebhookAction::Captured),
    ("order.paid", WebhookAction::Captured),
    ("payment.failed", WebhookAction::Canceled),
];

impl WebhookAction {
    pub fn from_event(event: &str) -> Self {
        EVENT_ACTION_TABLE
            .iter()
            .find(|(name, _)| *name == event)
            .map(|(_, action)| *action)
            .unwrap_or(WebhookAction::NotSupported)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct WebhookData {
    /// Gateway order id; matches `SessionState::order_id`.
    pub correlation_id: String,
    /// Amount in subunits, zero when the event carries none.
    pub amount: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookOutcome {
    pub action: WebhookAction,
    pub data: WebhookData,
}

impl WebhookOutcome {
    pub fn failed() -> Self {
        Self {
            action: WebhookAction::Failed,
            data: WebhookData::default(),
        }
    }
}

/// Fields extracted from a webhook body.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WebhookEvent {
    pub name: Option<String>,
    pub correlation_id: Option<String>,
    pub amount: i64,
}

impl WebhookEvent {
    pub fn into_outcome(self) -> WebhookOutcome {
        let action = self
            .name
            .as_deref()
            .map(WebhookAction::from_event)
            .unwrap_or(WebhookAction::NotSupported);
        WebhookOutcome {
            action,
            data: WebhookData {
                correlation_id: self.correlation_id.unwrap_or_default(),
                amount: self.amount,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct TypedEvent {
    event: Option<String>,
    event_type: Option<String>,
    #[serde(default)]
    payload: TypedPayload,
}

#[derive(Debug, Deserialize, Default)]
struct TypedPayload {
    payment: Option<TypedWrapper>,
    order: Option<TypedWrapper>,
}

#[derive(Debug, Deserialize)]
struct TypedWrapper {
    entity: TypedEntity,
}

#[derive(Debug, Deserialize)]
struct TypedEntity {
    id: Option<String>,
    order_id: Option<String>,
    amount: Option<i64>,
}

impl From<TypedEvent> for WebhookEvent {
    fn from(typed: TypedEvent) -> Self {
        let payment = typed.payload.payment.map(|w| w.entity);
        let order = typed.payload.order.map(|w| w.entity);

        let correlation_id = payment
            .as_ref()
            .and_then(|p| p.order_id.clone())
            .filter(|id| !id.is_empty())
            .or_else(|| order.as_ref().and_then(|o| o.id.clone()))
            .filter(|id| !id.is_empty());
        let amount = payment
            .as_ref()
            .and_then(|p| p.amount)
            .or_else(|| order.as_ref().and_then(|o| o.amount))
            .unwrap_or(0);

        Self {
            name: typed.event.or(typed.event_type),
            correlation_id,
            amount,
        }
    }
}

/// Extracts the event from any JSON value without failing.
pub fn parse_event(value: &Value) -> WebhookEvent {
    match serde_json::from_value::<TypedEvent>(value.clone()) {
        Ok(typed) => typed.into(),
        Err(err) => {
            debug!(error = %err, "webhook body does not match schema, using lenient lookup");
            parse_generic(value)
        }
    }
}

fn parse_generic(value: &Value) -> WebhookEvent {
    let text = |pointer: &str| {
        value
            .pointer(pointer)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    WebhookEvent {
        name: text("/event").or_else(|| text("/event_type")),
        correlation_id: text("/payload/payment/entity/order_id")
            .or_else(|| text("/payload/order/entity/id")),
        amount: value
            .pointer("/payload/payment/entity/amount")
            .and_then(coerce_amount)
            .or_else(|| {
                value
                    .pointer("/payload/order/entity/amount")
                    .and_then(coerce_amount)
            })
            .unwrap_or(0),
    }
}

fn coerce_amount(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
