use serde::{Deserialize, Serialize};

/// Payment status as reported to the host checkout system.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Authorized,
    Captured,
    Canceled,
}

/// Gateway payment status → host status. Anything not listed is `Pending`.
pub const PAYMENT_STATUS_TABLE: &[(&str, PaymentStatus)] = &[
    ("captured", PaymentStatus::Captured),
    ("authorized", PaymentStatus::Authorized),
    ("failed", PaymentStatus::Canceled),
];

/// Gateway order status → host status. Anything not listed is `Pending`.
pub const ORDER_STATUS_TABLE: &[(&str, PaymentStatus)] = &[("paid", PaymentStatus::Captured)];

fn lookup(table: &[(&str, PaymentStatus)], status: &str) -> PaymentStatus {
    table
        .iter()
        .find(|(gateway, _)| *gateway == status)
        .map(|(_, host)| *host)
        .unwrap_or_default()
}

impl PaymentStatus {
    pub fn from_payment_status(status: &str) -> Self {
        lookup(PAYMENT_STATUS_TABLE, status)
    }

    pub fn from_order_status(status: &str) -> Self {
        lookup(ORDER_STATUS_TABLE, status)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Authorized => "authorized",
            PaymentStatus::Captured => "captured",
            PaymentStatus::Canceled => "canceled",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_status_table() {
        assert_eq!(
            PaymentStatus::from_payment_status("captured"),
            PaymentStatus::Captured
        );
        assert_eq!(
            PaymentStatus::from_payment_status("authorized"),
            PaymentStatus::Authorized
        );
        assert_eq!(
            PaymentStatus::from_payment_status("failed"),
            PaymentStatus::Canceled
        );
        for other in ["created", "refunded", "", "CAPTURED"] {
            assert_eq!(
                PaymentStatus::from_payment_status(other),
                PaymentStatus::Pending
            );
        }
    }

    #[test]
    fn test_order_status_table() {
        assert_eq!(PaymentStatus::from_order_status("paid"), PaymentStatus::Captured);
        assert_eq!(PaymentStatus::from_order_status("attempted"), PaymentStatus::Pending);
        assert_eq!(PaymentStatus::from_order_status("created"), PaymentStatus::Pending);
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&PaymentStatus::Canceled).unwrap();
        assert_eq!(json, "\"canceled\"");
    }
}
