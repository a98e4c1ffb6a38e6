//! Application layer containing the payment session orchestration.
//!
//! This module defines the `PaymentSessionAdapter`, the single entry point the
//! host checkout calls for every lifecycle event of a payment session. It owns
//! the gateway handle and credentials; all per-session state travels in and
//! out through `SessionState`.

pub mod adapter;
