//! Checkout Outcomes

use farm_core::{FarmError, LookupKey, PaymentIntentStatus};
use thiserror::Error;

/// Why a checkout did not complete
#[derive(Error, Debug)]
pub enum CheckoutFailure {
    /// The selected plan has no published price
    #[error("No published price for {0}")]
    MissingPrice(LookupKey),

    /// The processor refused to tokenize the card
    #[error("Card rejected: {0}")]
    CardRejected(#[source] FarmError),

    /// `stripeCustomer` failed
    #[error("Customer creation failed: {0}")]
    CustomerCreation(#[source] FarmError),

    /// `stripeSubscription` failed
    #[error("Subscription creation failed: {0}")]
    SubscriptionCreation(#[source] FarmError),

    /// Confirmation was requested without a client secret
    #[error("Subscription requires confirmation but has no client secret")]
    MissingClientSecret,

    /// The processor refused to confirm the payment
    #[error("Payment confirmation failed: {0}")]
    PaymentConfirmation(#[source] FarmError),

    /// Confirmation went through but the payment did not succeed
    #[error("Payment intent ended as {0:?}")]
    PaymentNotSucceeded(PaymentIntentStatus),

    /// The subscription came back in a state the workflow does not handle
    #[error("Unhandled subscription status")]
    UnhandledStatus,
}

impl CheckoutFailure {
    /// Stable machine-readable code
    pub const fn code(&self) -> &'static str {
        match self {
            Self::MissingPrice(_) => "missing_price",
            Self::CardRejected(_) => "card_rejected",
            Self::CustomerCreation(_) => "customer_creation",
            Self::SubscriptionCreation(_) => "subscription_creation",
            Self::MissingClientSecret => "missing_client_secret",
            Self::PaymentConfirmation(_) => "payment_confirmation",
            Self::PaymentNotSucceeded(_) => "payment_not_succeeded",
            Self::UnhandledStatus => "unhandled_status",
        }
    }
}

/// Result of one submission attempt
#[derive(Debug)]
pub enum CheckoutOutcome {
    /// Subscription active, user sent to onboarding
    Completed,

    /// Required billing fields were empty; nothing was sent
    Blocked { missing: Vec<&'static str> },

    /// The failure was shown to the user
    Notified(CheckoutFailure),

    /// The failure was only logged
    Aborted(CheckoutFailure),
}

impl CheckoutOutcome {
    pub const fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }

    pub const fn failure(&self) -> Option<&CheckoutFailure> {
        match self {
            Self::Notified(failure) | Self::Aborted(failure) => Some(failure),
            Self::Completed | Self::Blocked { .. } => None,
        }
    }

    /// Stable machine-readable label
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Blocked { .. } => "blocked",
            Self::Notified(_) => "notified",
            Self::Aborted(_) => "aborted",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_codes() {
        let failure = CheckoutFailure::CustomerCreation(FarmError::Backend {
            status: 500,
            message: None,
        });
        assert_eq!(failure.code(), "customer_creation");
        assert!(std::error::Error::source(&failure).is_some());
    }

    #[test]
    fn test_outcome_accessors() {
        assert!(CheckoutOutcome::Completed.is_completed());
        assert!(CheckoutOutcome::Completed.failure().is_none());

        let outcome = CheckoutOutcome::Aborted(CheckoutFailure::UnhandledStatus);
        assert_eq!(outcome.label(), "aborted");
        assert_eq!(outcome.failure().map(CheckoutFailure::code), Some("unhandled_status"));
    }
}
