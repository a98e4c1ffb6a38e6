use crate::config::{AdapterConfig, Credentials};
use crate::domain::money::{Amount, CurrencyCode};
use crate::domain::ports::{NewOrder, PaymentGatewayBox, Resource};
use crate::domain::session::{CheckoutProof, SessionState};
use crate::domain::signature;
use crate::domain::status::PaymentStatus;
use crate::error::{GatewayError, PaymentError, Result};
use crate::infrastructure::razorpay::RazorpayClient;
use crate::interfaces::webhook::{
    WebhookOutcome, WebhookPayload, WebhookHeaders, parse_event, signature_header,
};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

/// Longest receipt the gateway accepts.
const MAX_RECEIPT_LEN: usize = 40;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InitiateResponse {
    /// Gateway order id, also stored as `data.order_id`.
    pub id: String,
    pub data: SessionState,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthorizeResponse {
    pub status: PaymentStatus,
    pub data: SessionState,
}

/// Latest gateway view of a session.
enum Fetched {
    Payment(Resource),
    Order(Resource),
}

/// Mediates a single payment attempt between the host checkout and Razorpay.
///
/// The adapter keeps no per-session state. Each operation receives the
/// [`SessionState`] the host stored and returns the state to store next, so
/// it is safe to share across concurrent requests for different sessions.
/// Ordering between a webhook and a checkout return for the same session is
/// the host's responsibility.
pub struct PaymentSessionAdapter {
    gateway: PaymentGatewayBox,
    credentials: Credentials,
    webhook_secret: Option<String>,
    auto_capture: bool,
}

impl PaymentSessionAdapter {
    /// Creates an adapter over an already constructed gateway.
    ///
    /// Fails with `InvalidInput` if `key_id` or `key_secret` is missing.
    pub fn new(config: &AdapterConfig, gateway: PaymentGatewayBox) -> Result<Self> {
        Ok(Self {
            gateway,
            credentials: config.credentials()?,
            webhook_secret: config.webhook_secret().map(str::to_string),
            auto_capture: config.auto_capture,
        })
    }

    /// Creates an adapter backed by the Razorpay REST API.
    pub fn connect(config: &AdapterConfig) -> Result<Self> {
        let client = RazorpayClient::new(config)?;
        Self::new(config, Box::new(client))
    }

    pub fn key_id(&self) -> &str {
        &self.credentials.key_id
    }

    /// Whether the merchant account is set up to capture automatically.
    /// Informational; the adapter only captures when `capture` is called.
    pub fn auto_capture(&self) -> bool {
        self.auto_capture
    }

    /// Creates a gateway order for `amount` and returns the initial session state.
    ///
    /// The amount is converted to subunits once, here, rounding half away from
    /// zero. Without an idempotency hint the receipt is derived from the clock,
    /// so a retried call creates a second order.
    pub async fn initiate(
        &self,
        amount: Decimal,
        currency_code: Option<&str>,
        idempotency_hint: Option<&str>,
    ) -> Result<InitiateResponse> {
        let amount_subunits = Amount::new(amount)?.to_subunits()?;
        let currency = CurrencyCode::or_default(currency_code)?;
        let hint = idempotency_hint.map(str::trim).filter(|h| !h.is_empty());

        let receipt = match hint {
            Some(hint) => hint.chars().take(MAX_RECEIPT_LEN).collect(),
            None => format!("rcpt_{}", Utc::now().timestamp_millis()),
        };
        let mut notes = Map::new();
        if let Some(hint) = hint {
            notes.insert("session_id".into(), Value::from(hint));
        }

        let order = self
            .gateway
            .create_order(NewOrder {
                amount: amount_subunits,
                currency: currency.to_string(),
                receipt,
                notes,
            })
            .await?;

        let order_id = order
            .get("id")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| GatewayError::Decode("order response has no id".into()))?
            .to_string();

        info!(order_id = %order_id, amount_subunits, currency = %currency, "created gateway order");

        Ok(InitiateResponse {
            id: order_id.clone(),
            data: SessionState::initiated(order_id, amount_subunits, currency),
        })
    }

    /// Merges the client's checkout result into the session. No remote calls.
    pub fn update_payment(&self, state: &SessionState, patch: &Map<String, Value>) -> SessionState {
        state.apply_patch(patch)
    }

    /// Verifies the checkout proof and reports the payment's status.
    ///
    /// Without a complete proof this returns `pending` without contacting the
    /// gateway. A bad signature is a hard `SignatureInvalid`. A failed fetch
    /// after a good signature is logged and reported as `pending`, leaving the
    /// session for the webhook to resolve.
    pub async fn authorize(&self, state: SessionState) -> Result<AuthorizeResponse> {
        let Some(proof) = state.checkout_proof() else {
            debug!(order_id = ?state.order_id, "no checkout proof yet, awaiting webhook");
            return Ok(AuthorizeResponse {
                status: PaymentStatus::Pending,
                data: state,
            });
        };
        self.verify_proof(&proof)?;
        let payment_id = proof.payment_id.to_string();

        match self.gateway.fetch_payment(&payment_id).await {
            Ok(snapshot) => {
                let status = payment_status(&snapshot);
                info!(payment_id = %payment_id, status = status.as_str(), "payment verified");
                Ok(AuthorizeResponse {
                    status,
                    data: state.with_payment_snapshot(snapshot),
                })
            }
            Err(err) => {
                warn!(payment_id = %payment_id, error = %err, "payment fetch failed after verification");
                Ok(AuthorizeResponse {
                    status: PaymentStatus::Pending,
                    data: state,
                })
            }
        }
    }

    /// Captures the amount fixed at initiation against the verified payment.
    pub async fn capture(&self, state: SessionState) -> Result<SessionState> {
        let payment_id = self
            .trusted_payment_id(&state)?
            .ok_or_else(|| {
                PaymentError::InvalidInput("capture requires a verified payment id".into())
            })?
            .to_string();
        let amount = state.amount_subunits.filter(|a| *a > 0).ok_or_else(|| {
            PaymentError::InvalidInput("session has no amount fixed at initiation".into())
        })?;
        let currency = state.currency_code.clone().ok_or_else(|| {
            PaymentError::InvalidInput("session has no currency fixed at initiation".into())
        })?;

        if state.snapshot_status() == Some("captured") {
            debug!(payment_id = %payment_id, "payment already captured");
            return Ok(state);
        }

        let snapshot = self
            .gateway
            .capture_payment(&payment_id, amount, currency.as_str())
            .await?;
        info!(payment_id = %payment_id, amount_subunits = amount, "payment captured");
        Ok(state.with_payment_snapshot(snapshot))
    }

    /// There is no gateway-side cancellation; the state is returned as is.
    pub fn cancel(&self, state: SessionState) -> SessionState {
        state
    }

    pub fn delete_payment(&self, state: SessionState) -> SessionState {
        state
    }

    /// Refreshes the payment (or, failing that, the order) snapshot.
    /// Fetch failures leave the state untouched.
    pub async fn retrieve(&self, state: SessionState) -> SessionState {
        match self.fetch_latest(&state).await {
            Some(Fetched::Payment(snapshot)) => state.with_payment_snapshot(snapshot),
            Some(Fetched::Order(snapshot)) => state.with_order_snapshot(snapshot),
            None => state,
        }
    }

    /// Current host status. Never fails; anything unknown is `pending`.
    pub async fn get_status(&self, state: &SessionState) -> PaymentStatus {
        match self.fetch_latest(state).await {
            Some(Fetched::Payment(snapshot)) => payment_status(&snapshot),
            Some(Fetched::Order(snapshot)) => PaymentStatus::from_order_status(
                snapshot.get("status").and_then(Value::as_str).unwrap_or_default(),
            ),
            None => PaymentStatus::Pending,
        }
    }

    pub fn refund(&self, _state: &SessionState, _amount: Decimal) -> Result<SessionState> {
        Err(PaymentError::CapabilityNotSupported("refund"))
    }

    /// Verifies and decodes a webhook delivery.
    ///
    /// Never fails: a missing or wrong signature yields `failed`, and a body
    /// that cannot be understood yields `not_supported`.
    pub fn handle_webhook(
        &self,
        payload: &WebhookPayload,
        headers: &WebhookHeaders,
    ) -> WebhookOutcome {
        if let Some(secret) = self.webhook_secret.as_deref() {
            let Some(provided) = signature_header(headers) else {
                warn!("webhook rejected: signature header missing");
                return WebhookOutcome::failed();
            };
            if !signature::verify_hex(secret, &payload.signed_bytes(), provided) {
                warn!("webhook rejected: signature mismatch");
                return WebhookOutcome::failed();
            }
        }

        let event = match payload.to_value() {
            Some(value) => parse_event(&value),
            None => {
                warn!("webhook body is not JSON");
                Default::default()
            }
        };
        let outcome = event.into_outcome();
        info!(
            action = ?outcome.action,
            correlation_id = %outcome.data.correlation_id,
            amount = outcome.data.amount,
            "webhook processed"
        );
        outcome
    }

    fn verify_proof(&self, proof: &CheckoutProof<'_>) -> Result<()> {
        if signature::verify_checkout(
            &self.credentials.key_secret,
            proof.order_id,
            proof.payment_id,
            proof.signature,
        ) {
            Ok(())
        } else {
            warn!(order_id = proof.order_id, payment_id = proof.payment_id, "checkout signature mismatch");
            Err(PaymentError::SignatureInvalid)
        }
    }

    /// The snapshot's id, or the client-supplied id once its signature checks out.
    fn trusted_payment_id<'a>(&self, state: &'a SessionState) -> Result<Option<&'a str>> {
        if let Some(id) = state.snapshot_payment_id() {
            return Ok(Some(id));
        }
        match state.checkout_proof() {
            Some(proof) => {
                self.verify_proof(&proof)?;
                Ok(Some(proof.payment_id))
            }
            None => Ok(None),
        }
    }

    async fn fetch_latest(&self, state: &SessionState) -> Option<Fetched> {
        // An unverifiable payment id is ignored in favour of the order.
        if let Some(payment_id) = self.trusted_payment_id(state).ok().flatten() {
            return match self.gateway.fetch_payment(payment_id).await {
                Ok(snapshot) => Some(Fetched::Payment(snapshot)),
                Err(err) => {
                    warn!(payment_id, error = %err, "payment fetch failed");
                    None
                }
            };
        }

        let order_id = state.order_id.as_deref().filter(|id| !id.is_empty())?;
        match self.gateway.fetch_order(order_id).await {
            Ok(snapshot) => Some(Fetched::Order(snapshot)),
            Err(err) => {
                warn!(order_id, error = %err, "order fetch failed");
                None
            }
        }
    }
}

fn payment_status(snapshot: &Resource) -> PaymentStatus {
    PaymentStatus::from_payment_status(
        snapshot
            .get("status")
            .and_then(Value::as_str)
            .unwrap_or_default(),
    )
}
