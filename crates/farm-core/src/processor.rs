//! Payment Processor Strategy
//!
//! The hosted payment processor is an opaque collaborator: it hands out a
//! card capture surface, turns captured card data into a payment-method
//! token, and confirms payment intents with a client secret.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One of the independent card input surfaces
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CardField {
    CardNumber,
    CardExpiry,
    CardCvc,
}

impl CardField {
    pub const ALL: [Self; 3] = [Self::CardNumber, Self::CardExpiry, Self::CardCvc];
}

/// Captured card data, mounted as three separate fields
#[derive(Debug, Default)]
pub struct CardCapture {
    number: Option<SecretString>,
    expiry: Option<String>,
    cvc: Option<SecretString>,
}

impl CardCapture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fields this surface exposes, in mount order
    pub const fn fields(&self) -> [CardField; 3] {
        CardField::ALL
    }

    /// Set the content of one field; blank input clears it
    pub fn fill(&mut self, field: CardField, value: impl Into<String>) {
        let value: String = value.into();
        let trimmed = value.trim();
        let value = (!trimmed.is_empty()).then(|| trimmed.to_string());
        match field {
            CardField::CardNumber => {
                self.number = value.map(|v| SecretString::from(v.replace(' ', "")));
            }
            CardField::CardExpiry => self.expiry = value,
            CardField::CardCvc => self.cvc = value.map(SecretString::from),
        }
    }

    pub fn is_filled(&self, field: CardField) -> bool {
        match field {
            CardField::CardNumber => self.number.is_some(),
            CardField::CardExpiry => self.expiry.is_some(),
            CardField::CardCvc => self.cvc.is_some(),
        }
    }

    pub fn is_complete(&self) -> bool {
        CardField::ALL.iter().all(|f| self.is_filled(*f))
    }

    pub fn number(&self) -> Option<&str> {
        self.number.as_ref().map(|s| s.expose_secret())
    }

    pub fn cvc(&self) -> Option<&str> {
        self.cvc.as_ref().map(|s| s.expose_secret())
    }

    /// Expiry as `(month, four-digit year)`, accepting `MM/YY` and `MM/YYYY`
    pub fn expiry(&self) -> Option<(u8, u16)> {
        let raw = self.expiry.as_deref()?;
        let (month, year) = raw.split_once('/')?;
        let month: u8 = month.trim().parse().ok()?;
        if !(1..=12).contains(&month) {
            return None;
        }
        let year = year.trim();
        let year: u16 = match year.len() {
            2 => 2000 + year.parse::<u16>().ok()?,
            4 => year.parse().ok()?,
            _ => return None,
        };
        Some((month, year))
    }

    /// Empty every field
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Tokenized card
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PaymentMethod {
    pub id: String,
}

/// Status of a confirmed payment intent
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentIntentStatus {
    Succeeded,
    RequiresAction,
    RequiresPaymentMethod,
    Processing,

    #[default]
    #[serde(other)]
    Other,
}

/// Payment intent after client-side confirmation
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub id: String,

    #[serde(default)]
    pub status: PaymentIntentStatus,
}

/// Hosted payment processor
///
/// Rejections surface as [`FarmError::Processor`](crate::FarmError::Processor)
/// with the processor's human-readable message.
#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    /// Create a fresh capture surface with the card number, expiry and CVC fields
    fn card_capture(&self) -> CardCapture {
        CardCapture::new()
    }

    /// Tokenize captured card data
    async fn create_payment_method(
        &self,
        card: &CardCapture,
        billing_email: &str,
    ) -> Result<PaymentMethod>;

    /// Confirm a pending payment intent
    async fn confirm_card_payment(&self, client_secret: &str) -> Result<PaymentIntent>;

    /// Processor name
    fn name(&self) -> &str;
}
