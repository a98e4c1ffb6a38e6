//! HMAC-SHA256 signing used for both checkout proofs and webhook bodies.

use crate::error::PaymentError;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

fn keyed(secret: &str, message: &[u8]) -> Result<HmacSha256, PaymentError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| PaymentError::InvalidInput("invalid signing secret".to_string()))?;
    mac.update(message);
    Ok(mac)
}

/// Lowercase hex HMAC-SHA256 of `message` keyed with `secret`.
pub fn sign_hex(secret: &str, message: &[u8]) -> Result<String, PaymentError> {
    let mac = keyed(secret, message)?;
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Message signed by the gateway's hosted checkout: `"{order_id}|{payment_id}"`.
pub fn checkout_message(order_id: &str, payment_id: &str) -> String {
    format!("{order_id}|{payment_id}")
}

/// Signature the hosted checkout hands back to the client for this order/payment pair.
pub fn sign_checkout(secret: &str, order_id: &str, payment_id: &str) -> Result<String, PaymentError> {
    sign_hex(secret, checkout_message(order_id, payment_id).as_bytes())
}

/// Checks `provided` against the expected tag in constant time.
///
/// Only the lowercase hex encoding the gateway emits is accepted.
pub fn verify_hex(secret: &str, message: &[u8], provided: &str) -> bool {
    if provided.bytes().any(|b| b.is_ascii_uppercase()) {
        return false;
    }
    let Ok(tag) = hex::decode(provided) else {
        return false;
    };
    match keyed(secret, message) {
        Ok(mac) => mac.verify_slice(&tag).is_ok(),
        Err(_) => false,
    }
}

pub fn verify_checkout(secret: &str, order_id: &str, payment_id: &str, provided: &str) -> bool {
    verify_hex(
        secret,
        checkout_message(order_id, payment_id).as_bytes(),
        provided,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_hex_known_vector() {
        // RFC 4231 test case 2
        let sig = sign_hex("Jefe", b"what do ya want for nothing?").unwrap();
        assert_eq!(
            sig,
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn test_verify_checkout_roundtrip() {
        let sig = sign_checkout("secret", "order_1", "pay_1").unwrap();
        assert!(verify_checkout("secret", "order_1", "pay_1", &sig));
        assert!(!verify_checkout("other", "order_1", "pay_1", &sig));
        assert!(!verify_checkout("secret", "order_2", "pay_1", &sig));
        assert!(!verify_checkout("secret", "order_1", "pay_2", &sig));
    }

    #[test]
    fn test_verify_is_case_sensitive() {
        let sig = sign_checkout("secret", "order_1", "pay_1").unwrap();
        assert!(!verify_checkout(
            "secret",
            "order_1",
            "pay_1",
            &sig.to_ascii_uppercase()
        ));
    }

    #[test]
    fn test_verify_rejects_malformed_hex() {
        let sig = sign_checkout("secret", "order_1", "pay_1").unwrap();

        assert!(!verify_checkout("secret", "order_1", "pay_1", &sig[..62]));
        assert!(!verify_checkout("secret", "order_1", "pay_1", &sig[..63]));
        assert!(!verify_checkout("secret", "order_1", "pay_1", &format!("{sig}00")));
        assert!(!verify_checkout("secret", "order_1", "pay_1", &sig.replace(&sig[..1], "z")));
        assert!(!verify_checkout("secret", "order_1", "pay_1", ""));
        assert!(!verify_checkout("secret", "order_1", "pay_1", &format!(" {sig}")));
    }
}
