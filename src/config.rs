use crate::error::{PaymentError, Result};
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "https://api.razorpay.com/v1";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Provider options as supplied by the host, typically deserialized from its
/// own configuration file or environment.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdapterConfig {
    pub key_id: Option<String>,
    pub key_secret: Option<String>,
    /// Webhook signatures are not checked when this is unset.
    pub webhook_secret: Option<String>,
    /// Advisory only; the adapter never captures on its own.
    #[serde(default)]
    pub auto_capture: bool,
    pub api_base_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

/// Validated API credentials.
#[derive(Clone)]
pub struct Credentials {
    pub key_id: String,
    pub key_secret: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("key_id", &self.key_id)
            .field("key_secret", &"<redacted>")
            .finish()
    }
}

impl AdapterConfig {
    pub fn new(key_id: impl Into<String>, key_secret: impl Into<String>) -> Self {
        Self {
            key_id: Some(key_id.into()),
            key_secret: Some(key_secret.into()),
            ..Self::default()
        }
    }

    pub fn with_webhook_secret(mut self, secret: impl Into<String>) -> Self {
        self.webhook_secret = Some(secret.into());
        self
    }

    /// Fails with `InvalidInput` when either key is absent or blank.
    pub fn credentials(&self) -> Result<Credentials> {
        let key_id = present(self.key_id.as_deref())
            .ok_or_else(|| PaymentError::InvalidInput("key_id is required".to_string()))?;
        let key_secret = present(self.key_secret.as_deref())
            .ok_or_else(|| PaymentError::InvalidInput("key_secret is required".to_string()))?;
        Ok(Credentials {
            key_id: key_id.to_string(),
            key_secret: key_secret.to_string(),
        })
    }

    pub fn webhook_secret(&self) -> Option<&str> {
        present(self.webhook_secret.as_deref())
    }

    pub fn api_base_url(&self) -> &str {
        present(self.api_base_url.as_deref()).unwrap_or(DEFAULT_API_BASE_URL)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_required() {
        assert!(AdapterConfig::new("rzp_test", "secret").credentials().is_ok());

        let missing_secret = AdapterConfig {
            key_id: Some("rzp_test".into()),
            ..AdapterConfig::default()
        };
        assert!(matches!(
            missing_secret.credentials(),
            Err(PaymentError::InvalidInput(_))
        ));

        let blank_id = AdapterConfig::new("  ", "secret");
        assert!(matches!(
            blank_id.credentials(),
            Err(PaymentError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_blank_webhook_secret_is_absent() {
        let config = AdapterConfig::new("id", "secret").with_webhook_secret("");
        assert_eq!(config.webhook_secret(), None);
        let config = AdapterConfig::new("id", "secret").with_webhook_secret("whsec");
        assert_eq!(config.webhook_secret(), Some("whsec"));
    }

    #[test]
    fn test_deserialize_defaults() {
        let config: AdapterConfig =
            serde_json::from_str(r#"{ "key_id": "id", "key_secret": "secret" }"#).unwrap();
        assert!(!config.auto_capture);
        assert_eq!(config.api_base_url(), DEFAULT_API_BASE_URL);
        assert_eq!(config.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let creds = AdapterConfig::new("id", "hunter2").credentials().unwrap();
        assert!(!format!("{creds:?}").contains("hunter2"));
    }
}
