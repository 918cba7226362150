//! Billing Domain Model
//!
//! Typed shapes for the backend's billing endpoints.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Published price plan identifier
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LookupKey {
    #[serde(rename = "paid_monthly")]
    PaidMonthly,

    #[serde(rename = "paid_yearly")]
    PaidYearly,

    /// Any other lookup key published on the account
    #[serde(other)]
    Other,
}

impl LookupKey {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PaidMonthly => "paid_monthly",
            Self::PaidYearly => "paid_yearly",
            Self::Other => "other",
        }
    }

    /// Billing period length sent to the backend when subscribing
    pub const fn plan_months(&self) -> u8 {
        match self {
            Self::PaidYearly => 12,
            Self::PaidMonthly | Self::Other => 1,
        }
    }
}

impl std::fmt::Display for LookupKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coupon attached to a price
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedCoupon {
    pub id: String,

    #[serde(default)]
    pub name: Option<String>,
}

impl AppliedCoupon {
    /// Coupon name, falling back to its id
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.id)
    }
}

/// A price record as returned by `GET stripePrices`
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PricePlan {
    pub id: String,

    #[serde(default)]
    pub lookup_key: Option<LookupKey>,

    /// Amount in minor currency units (cents)
    #[serde(default)]
    pub unit_amount: Option<i64>,

    /// Amount after the applied coupon, in minor units
    #[serde(default)]
    pub discounted_amount: Option<i64>,

    #[serde(default, rename = "appliedCoupon")]
    pub applied_coupon: Option<AppliedCoupon>,
}

impl PricePlan {
    /// Unit amount in major currency units
    pub fn unit_price(&self) -> Option<Decimal> {
        self.unit_amount.map(|cents| Decimal::new(cents, 2))
    }

    /// Discounted amount in major currency units
    pub fn discounted_price(&self) -> Option<Decimal> {
        self.discounted_amount.map(|cents| Decimal::new(cents, 2))
    }
}

/// Billing details entered on the payment screen
///
/// The email and card fields are not part of the form: the email is read from
/// the session and card data lives in the processor's [`CardCapture`](crate::CardCapture).
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutForm {
    #[serde(default)]
    pub card_name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub postal_code: String,
}

impl CheckoutForm {
    /// Names of required fields that are empty
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("address", &self.address),
            ("city", &self.city),
            ("state", &self.state),
            ("postalCode", &self.postal_code),
            ("cardName", &self.card_name),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(name, _)| name)
        .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }
}

/// Body of `POST stripeCustomer`
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCustomerRequest {
    pub email: String,
    pub payment_method_id: String,
    pub user_id: Option<i64>,
    pub address: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub name: String,
    pub payment_plan_months: u8,
}

/// Successful `POST stripeCustomer` response
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerCreated {
    pub customer_id: String,
}

/// Body of `POST stripeSubscription`
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubscriptionRequest {
    pub customer_id: String,
    pub price_id: String,
}

/// Status of a freshly created subscription
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    /// Payment intent needs client-side confirmation
    RequiresConfirmation,

    /// Payment already went through
    Succeeded,

    /// Anything else, including an absent status
    #[default]
    #[serde(other)]
    Other,
}

/// Successful `POST stripeSubscription` response
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionResult {
    #[serde(default)]
    pub subscription_id: Option<String>,

    #[serde(default)]
    pub client_secret: Option<String>,

    #[serde(default)]
    pub status: SubscriptionStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_price_plan_parsing() {
        let json = r#"[
            {"id": "price_m", "lookup_key": "paid_monthly", "unit_amount": 5000},
            {"id": "price_y", "lookup_key": "paid_yearly", "unit_amount": 4000,
             "discounted_amount": 3000, "appliedCoupon": {"id": "SPRING", "name": "Spring"}},
            {"id": "price_x", "lookup_key": "legacy_plan", "unit_amount": 100},
            {"id": "price_n", "lookup_key": null}
        ]"#;

        let plans: Vec<PricePlan> = serde_json::from_str(json).unwrap();
        assert_eq!(plans.len(), 4);
        assert_eq!(plans[0].lookup_key, Some(LookupKey::PaidMonthly));
        assert_eq!(plans[0].unit_price(), Some(dec!(50.00)));
        assert_eq!(plans[1].discounted_price(), Some(dec!(30.00)));
        assert_eq!(
            plans[1].applied_coupon.as_ref().map(AppliedCoupon::display_name),
            Some("Spring")
        );
        assert_eq!(plans[2].lookup_key, Some(LookupKey::Other));
        assert_eq!(plans[3].lookup_key, None);
        assert_eq!(plans[3].unit_price(), None);
    }

    #[test]
    fn test_coupon_name_falls_back_to_id() {
        let coupon = AppliedCoupon {
            id: "WELCOME".into(),
            name: None,
        };
        assert_eq!(coupon.display_name(), "WELCOME");
    }

    #[test]
    fn test_missing_fields() {
        let form = CheckoutForm {
            card_name: "Jeanne Martin".into(),
            address: "1 rue des Champs".into(),
            city: String::new(),
            state: "Bretagne".into(),
            postal_code: String::new(),
        };
        assert_eq!(form.missing_fields(), vec!["city", "postalCode"]);
        assert!(!form.is_complete());
    }

    #[test]
    fn test_whitespace_counts_as_filled() {
        let form = CheckoutForm {
            card_name: "Jeanne Martin".into(),
            address: "1 rue des Champs".into(),
            city: " ".into(),
            state: "Bretagne".into(),
            postal_code: "  ".into(),
        };
        assert!(form.missing_fields().is_empty());
        assert!(form.is_complete());
    }

    #[test]
    fn test_subscription_status_parsing() {
        let result: SubscriptionResult = serde_json::from_str(
            r#"{"subscriptionId": "sub_1", "clientSecret": "pi_1_secret_x", "status": "requires_confirmation"}"#,
        )
        .unwrap();
        assert_eq!(result.status, SubscriptionStatus::RequiresConfirmation);

        let result: SubscriptionResult =
            serde_json::from_str(r#"{"subscriptionId": "sub_1", "status": "incomplete"}"#).unwrap();
        assert_eq!(result.status, SubscriptionStatus::Other);

        let result: SubscriptionResult = serde_json::from_str(r"{}").unwrap();
        assert_eq!(result.status, SubscriptionStatus::Other);
    }

    #[test]
    fn test_customer_request_shape() {
        let request = CreateCustomerRequest {
            email: "farmer@example.com".into(),
            payment_method_id: "pm_1".into(),
            user_id: Some(42),
            address: "1 rue des Champs".into(),
            city: "Rennes".into(),
            state: "Bretagne".into(),
            postal_code: "35000".into(),
            name: "Jeanne Martin".into(),
            payment_plan_months: LookupKey::PaidYearly.plan_months(),
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["paymentMethodId"], "pm_1");
        assert_eq!(value["postalCode"], "35000");
        assert_eq!(value["paymentPlanMonths"], 12);
        assert_eq!(value["userId"], 42);
    }
}
