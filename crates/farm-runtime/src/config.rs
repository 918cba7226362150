//! Runtime Configuration
//!
//! Typed settings read from the environment.

use farm_core::{FarmError, Result};
use secrecy::{ExposeSecret, SecretString};

/// Farm backend settings
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Base URL every endpoint name is appended to
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api/".into(),
            timeout_secs: 30,
        }
    }
}

impl ApiConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let base_url = std::env::var("FARM_API_URL").unwrap_or(defaults.base_url);
        let timeout_secs = std::env::var("FARM_API_TIMEOUT_SECS")
            .ok()
            .and_then(|t| t.parse().ok())
            .unwrap_or(defaults.timeout_secs);

        Self {
            base_url,
            timeout_secs,
        }
    }

    /// Full URL of a backend endpoint
    pub fn endpoint(&self, name: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        let name = name.trim_start_matches('/');
        format!("{base}/{name}")
    }
}

/// Stripe client-side settings
#[derive(Clone, Debug)]
pub struct StripeConfig {
    /// Publishable key (`pk_…`)
    pub publishable_key: SecretString,

    /// API root, overridable for a local stripe-mock
    pub api_base: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl StripeConfig {
    pub const DEFAULT_API_BASE: &'static str = "https://api.stripe.com";

    /// Config for `publishable_key` against the live API
    ///
    /// Secret keys are refused: this client runs with browser-level rights.
    pub fn new(publishable_key: impl Into<String>) -> Result<Self> {
        let key = publishable_key.into();
        if !key.starts_with("pk_") {
            return Err(FarmError::Config(
                "STRIPE_PUBLISHABLE_KEY must be a publishable key (pk_...)".into(),
            ));
        }

        Ok(Self {
            publishable_key: SecretString::from(key),
            api_base: Self::DEFAULT_API_BASE.into(),
            timeout_secs: 30,
        })
    }

    pub fn from_env() -> Result<Self> {
        let key = std::env::var("STRIPE_PUBLISHABLE_KEY")
            .map_err(|_| FarmError::Config("STRIPE_PUBLISHABLE_KEY is not set".into()))?;
        let mut config = Self::new(key)?;

        if let Ok(base) = std::env::var("STRIPE_API_BASE") {
            config.api_base = base;
        }
        Ok(config)
    }

    /// Full URL of a Stripe API path
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.api_base.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub(crate) fn key(&self) -> &str {
        self.publishable_key.expose_secret()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_join() {
        let config = ApiConfig {
            base_url: "https://api.example.com/v2/".into(),
            timeout_secs: 5,
        };
        assert_eq!(config.endpoint("stripePrices"), "https://api.example.com/v2/stripePrices");

        let config = ApiConfig {
            base_url: "https://api.example.com/v2".into(),
            timeout_secs: 5,
        };
        assert_eq!(config.endpoint("/farmer"), "https://api.example.com/v2/farmer");
    }

    #[test]
    fn test_stripe_rejects_secret_key() {
        assert!(matches!(StripeConfig::new("sk_test_123"), Err(FarmError::Config(_))));
        let config = StripeConfig::new("pk_test_123").unwrap();
        assert_eq!(config.key(), "pk_test_123");
        assert_eq!(config.url("/v1/payment_methods"), "https://api.stripe.com/v1/payment_methods");
    }

    #[test]
    fn test_key_redacted_in_debug() {
        let config = StripeConfig::new("pk_test_123").unwrap();
        assert!(!format!("{config:?}").contains("pk_test_123"));
    }
}
