use super::money::CurrencyCode;
use super::ports::Resource;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Patch keys accepted from untrusted client input.
pub const PATCHABLE_FIELDS: &[&str] = &["order_id", "payment_id", "signature"];

/// State threaded through every adapter call.
///
/// The host persists this record verbatim between calls and hands it back on
/// the next one. `amount_subunits` and `currency_code` are fixed at initiation;
/// every later operation returns a superset of what it was given.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Default)]
pub struct SessionState {
    /// Gateway order id, doubles as the session id and webhook correlation id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    /// Amount fixed at initiation, in subunits. Source of truth for capture.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_subunits: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency_code: Option<CurrencyCode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<String>,
    /// Checkout proof supplied by the client; not trusted until verified.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    /// Last payment resource fetched from the gateway.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_snapshot: Option<Resource>,
    /// Last order resource fetched from the gateway.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_snapshot: Option<Resource>,
}

/// The order/payment/signature triple needed to verify a completed checkout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CheckoutProof<'a> {
    pub order_id: &'a str,
    pub payment_id: &'a str,
    pub signature: &'a str,
}

impl SessionState {
    pub fn initiated(order_id: String, amount_subunits: i64, currency_code: CurrencyCode) -> Self {
        Self {
            order_id: Some(order_id),
            amount_subunits: Some(amount_subunits),
            currency_code: Some(currency_code),
            ..Self::default()
        }
    }

    /// Returns a copy with whitelisted string fields from `patch` merged in.
    ///
    /// Unknown keys and non-string values are dropped. Existing fields are never
    /// removed, and an `order_id` that is already set is never replaced.
    pub fn apply_patch(&self, patch: &Map<String, Value>) -> Self {
        let mut next = self.clone();

        for (key, value) in patch {
            let Some(value) = value.as_str() else {
                debug!(field = %key, "ignoring non-string patch field");
                continue;
            };
            match key.as_str() {
                "order_id" => match next.order_id.as_deref() {
                    None => next.order_id = Some(value.to_string()),
                    Some(existing) if existing != value => {
                        warn!(
                            order_id = existing,
                            "ignoring patch that attempts to replace order_id"
                        );
                    }
                    Some(_) => {}
                },
                "payment_id" => next.payment_id = Some(value.to_string()),
                "signature" => next.signature = Some(value.to_string()),
                other => debug!(field = %other, "ignoring non-whitelisted patch field"),
            }
        }

        next
    }

    /// Present once the client has completed the hosted checkout.
    pub fn checkout_proof(&self) -> Option<CheckoutProof<'_>> {
        Some(CheckoutProof {
            order_id: non_empty(self.order_id.as_deref())?,
            payment_id: non_empty(self.payment_id.as_deref())?,
            signature: non_empty(self.signature.as_deref())?,
        })
    }

    pub fn snapshot_payment_id(&self) -> Option<&str> {
        non_empty(self.payment_snapshot.as_ref()?.get("id")?.as_str())
    }

    pub fn snapshot_status(&self) -> Option<&str> {
        self.payment_snapshot.as_ref()?.get("status")?.as_str()
    }

    pub fn with_payment_snapshot(mut self, snapshot: Resource) -> Self {
        self.payment_snapshot = Some(snapshot);
        self
    }

    pub fn with_order_snapshot(mut self, snapshot: Resource) -> Self {
        self.order_snapshot = Some(snapshot);
        self
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
