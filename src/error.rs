use thiserror::Error;

/// Failures reported by a [`PaymentGateway`](crate::domain::ports::PaymentGateway) call.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GatewayError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("gateway rejected request ({status} {code}): {description}")]
    Api {
        status: u16,
        code: String,
        description: String,
    },
    #[error("unexpected gateway response: {0}")]
    Decode(String),
    #[error("resource not found: {0}")]
    NotFound(String),
}

#[derive(Error, Debug)]
pub enum PaymentError {
    /// Malformed amount, missing identifiers or missing credentials.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Checkout proof did not match the expected HMAC.
    #[error("payment signature verification failed")]
    SignatureInvalid,
    #[error("{0} is not supported by the razorpay provider")]
    CapabilityNotSupported(&'static str),
    #[error("gateway error: {0}")]
    Gateway(#[from] GatewayError),
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            GatewayError::Decode(err.to_string())
        } else {
            GatewayError::Transport(err.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, PaymentError>;
