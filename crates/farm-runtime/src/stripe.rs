//! Stripe Processor
//!
//! `PaymentProcessor` against the Stripe REST API, authenticated with the
//! publishable key only: it can tokenize cards and confirm intents for which
//! it holds the client secret, nothing else.

use std::time::Duration;

use async_trait::async_trait;
use farm_core::{CardCapture, FarmError, PaymentIntent, PaymentMethod, PaymentProcessor, Result};
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::config::StripeConfig;

/// Stripe error envelope
#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    error: StripeError,
}

#[derive(Debug, Deserialize)]
struct StripeError {
    #[serde(default)]
    message: Option<String>,

    #[serde(default)]
    code: Option<String>,
}

/// Card processor backed by Stripe
pub struct StripeProcessor {
    client: Client,
    config: StripeConfig,
}

impl std::fmt::Debug for StripeProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeProcessor")
            .field("api_base", &self.config.api_base)
            .field("publishable_key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl StripeProcessor {
    pub fn new(config: StripeConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| FarmError::Config(format!("HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(StripeConfig::from_env()?)
    }

    async fn post_form<T: DeserializeOwned>(
        &self,
        path: &str,
        form: &[(&str, String)],
    ) -> Result<T> {
        let response = self
            .client
            .post(self.config.url(path))
            .bearer_auth(self.config.key())
            .form(form)
            .send()
            .await
            .map_err(|e| FarmError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| FarmError::Transport(e.to_string()))?;

        if !status.is_success() {
            let error = processor_error(&body);
            tracing::warn!(path, status = status.as_u16(), error = %error, "Stripe rejected request");
            return Err(error);
        }
        serde_json::from_str(&body).map_err(|e| FarmError::Decode(format!("stripe {path}: {e}")))
    }
}

#[async_trait]
impl PaymentProcessor for StripeProcessor {
    async fn create_payment_method(
        &self,
        card: &CardCapture,
        billing_email: &str,
    ) -> Result<PaymentMethod> {
        let form = payment_method_form(card, billing_email)?;
        let method: PaymentMethod = self.post_form("/v1/payment_methods", &form).await?;
        tracing::info!(payment_method = %method.id, "Card tokenized");
        Ok(method)
    }

    async fn confirm_card_payment(&self, client_secret: &str) -> Result<PaymentIntent> {
        let intent_id = intent_id(client_secret)?;
        let path = format!("/v1/payment_intents/{intent_id}/confirm");
        let form = [("client_secret", client_secret.to_string())];

        let intent: PaymentIntent = self.post_form(&path, &form).await?;
        tracing::info!(payment_intent = %intent.id, status = ?intent.status, "Intent confirmed");
        Ok(intent)
    }

    fn name(&self) -> &str {
        "Stripe"
    }
}

/// Form body for `POST /v1/payment_methods`
///
/// Incomplete cards are refused locally with the wording Stripe.js uses.
fn payment_method_form(card: &CardCapture, billing_email: &str) -> Result<Vec<(&'static str, String)>> {
    let incomplete = |what: &str| FarmError::Processor(Some(format!("Your {what} is incomplete.")));

    let number = card.number().ok_or_else(|| incomplete("card number"))?;
    let (month, year) = card
        .expiry()
        .ok_or_else(|| incomplete("card's expiration date"))?;
    let cvc = card.cvc().ok_or_else(|| incomplete("card's security code"))?;

    let mut form = vec![
        ("type", "card".to_string()),
        ("card[number]", number.to_string()),
        ("card[exp_month]", month.to_string()),
        ("card[exp_year]", year.to_string()),
        ("card[cvc]", cvc.to_string()),
    ];
    if !billing_email.is_empty() {
        form.push(("billing_details[email]", billing_email.to_string()));
    }
    Ok(form)
}

/// Intent id is the client secret up to `_secret_`
fn intent_id(client_secret: &str) -> Result<&str> {
    client_secret
        .split_once("_secret_")
        .map(|(id, _)| id)
        .filter(|id| id.starts_with("pi_"))
        .ok_or_else(|| FarmError::Validation("malformed payment intent client secret".into()))
}

fn processor_error(body: &str) -> FarmError {
    match serde_json::from_str::<StripeErrorBody>(body) {
        Ok(envelope) => {
            tracing::debug!(code = ?envelope.error.code, "Stripe error code");
            FarmError::Processor(envelope.error.message)
        }
        Err(_) => FarmError::Processor(None),
    }
}
