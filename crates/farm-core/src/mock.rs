//! Mock Collaborators
//!
//! Scripted in-memory backend, processor and farm service for testing and
//! demo purposes. Every call is recorded by name so tests can assert on the
//! exact sequence of network calls a workflow made.

use async_trait::async_trait;
use std::sync::Mutex;

use crate::backend::BackendApi;
use crate::error::{FarmError, Result};
use crate::model::{
    CreateCustomerRequest, CreateSubscriptionRequest, CustomerCreated, PricePlan,
    SubscriptionResult, SubscriptionStatus,
};
use crate::processor::{CardCapture, PaymentIntent, PaymentIntentStatus, PaymentMethod, PaymentProcessor};
use crate::session::UserSession;
use crate::surface::FarmData;

/// Failure a scripted call answers with
#[derive(Clone, Debug)]
pub enum MockFailure {
    Http { status: u16, message: Option<String> },
    Transport(String),
    Processor(Option<String>),
}

impl From<MockFailure> for FarmError {
    fn from(failure: MockFailure) -> Self {
        match failure {
            MockFailure::Http { status, message } => Self::Backend { status, message },
            MockFailure::Transport(msg) => Self::Transport(msg),
            MockFailure::Processor(msg) => Self::Processor(msg),
        }
    }
}

/// Scripted answer of a mock call
pub type Scripted<T> = std::result::Result<T, MockFailure>;

#[derive(Default)]
struct CallLog(Mutex<Vec<String>>);

impl CallLog {
    fn record(&self, call: impl Into<String>) {
        if let Ok(mut calls) = self.0.lock() {
            calls.push(call.into());
        }
    }

    fn snapshot(&self) -> Vec<String> {
        self.0.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

/// Scripted backend
pub struct MockBackend {
    prices: Scripted<Vec<PricePlan>>,
    customer: Scripted<CustomerCreated>,
    subscription: Scripted<SubscriptionResult>,
    profile: Scripted<Option<UserSession>>,
    verified: Scripted<Option<UserSession>>,
    link: Scripted<()>,
    products: Vec<String>,
    customer_requests: Mutex<Vec<CreateCustomerRequest>>,
    subscription_requests: Mutex<Vec<CreateSubscriptionRequest>>,
    calls: CallLog,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    /// Backend whose every call succeeds with an empty or placeholder payload
    pub fn new() -> Self {
        Self {
            prices: Ok(Vec::new()),
            customer: Ok(CustomerCreated {
                customer_id: "cus_mock".into(),
            }),
            subscription: Ok(SubscriptionResult {
                subscription_id: Some("sub_mock".into()),
                client_secret: Some("pi_mock_secret_mock".into()),
                status: SubscriptionStatus::Succeeded,
            }),
            profile: Ok(None),
            verified: Ok(None),
            link: Ok(()),
            products: Vec::new(),
            customer_requests: Mutex::new(Vec::new()),
            subscription_requests: Mutex::new(Vec::new()),
            calls: CallLog::default(),
        }
    }

    #[must_use]
    pub fn with_prices(mut self, prices: Vec<PricePlan>) -> Self {
        self.prices = Ok(prices);
        self
    }

    #[must_use]
    pub fn with_customer(mut self, customer: Scripted<CustomerCreated>) -> Self {
        self.customer = customer;
        self
    }

    #[must_use]
    pub fn with_subscription(mut self, subscription: Scripted<SubscriptionResult>) -> Self {
        self.subscription = subscription;
        self
    }

    #[must_use]
    pub fn with_profile(mut self, profile: Option<UserSession>) -> Self {
        self.profile = Ok(profile);
        self
    }

    #[must_use]
    pub fn with_verified(mut self, verified: Scripted<Option<UserSession>>) -> Self {
        self.verified = verified;
        self
    }

    #[must_use]
    pub fn with_link(mut self, link: Scripted<()>) -> Self {
        self.link = link;
        self
    }

    #[must_use]
    pub fn with_products(mut self, products: Vec<String>) -> Self {
        self.products = products;
        self
    }

    /// Names of the calls made so far, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls.snapshot()
    }

    /// Bodies sent to `stripeCustomer`
    pub fn customer_requests(&self) -> Vec<CreateCustomerRequest> {
        self.customer_requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    /// Bodies sent to `stripeSubscription`
    pub fn subscription_requests(&self) -> Vec<CreateSubscriptionRequest> {
        self.subscription_requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl BackendApi for MockBackend {
    async fn stripe_prices(&self) -> Result<Vec<PricePlan>> {
        self.calls.record("stripePrices");
        self.prices.clone().map_err(Into::into)
    }

    async fn create_customer(&self, request: &CreateCustomerRequest) -> Result<CustomerCreated> {
        self.calls.record("stripeCustomer");
        if let Ok(mut requests) = self.customer_requests.lock() {
            requests.push(request.clone());
        }
        self.customer.clone().map_err(Into::into)
    }

    async fn create_subscription(
        &self,
        request: &CreateSubscriptionRequest,
    ) -> Result<SubscriptionResult> {
        self.calls.record("stripeSubscription");
        if let Ok(mut requests) = self.subscription_requests.lock() {
            requests.push(request.clone());
        }
        self.subscription.clone().map_err(Into::into)
    }

    async fn farmer_profile(&self) -> Result<Option<UserSession>> {
        self.calls.record("farmer");
        self.profile.clone().map_err(Into::into)
    }

    async fn verify_email(&self, token: &str) -> Result<Option<UserSession>> {
        self.calls.record(format!("verifyEmail:{token}"));
        self.verified.clone().map_err(Into::into)
    }

    async fn link_connection(&self, connection_id: &str) -> Result<()> {
        self.calls.record(format!("powenConnection:{connection_id}"));
        self.link.clone().map_err(Into::into)
    }

    async fn product_names(&self) -> Result<Vec<String>> {
        self.calls.record("productsName");
        Ok(self.products.clone())
    }
}

/// Scripted payment processor
pub struct MockProcessor {
    payment_method: Scripted<PaymentMethod>,
    confirmation: Scripted<PaymentIntentStatus>,
    calls: CallLog,
}

impl Default for MockProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl MockProcessor {
    /// Processor that accepts every card and confirms every intent
    pub fn new() -> Self {
        Self {
            payment_method: Ok(PaymentMethod {
                id: "pm_mock".into(),
            }),
            confirmation: Ok(PaymentIntentStatus::Succeeded),
            calls: CallLog::default(),
        }
    }

    /// Reject card tokenization with `message`
    #[must_use]
    pub fn rejecting_card(mut self, message: Option<&str>) -> Self {
        self.payment_method = Err(MockFailure::Processor(message.map(String::from)));
        self
    }

    #[must_use]
    pub fn with_confirmation(mut self, confirmation: Scripted<PaymentIntentStatus>) -> Self {
        self.confirmation = confirmation;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.snapshot()
    }
}

#[async_trait]
impl PaymentProcessor for MockProcessor {
    async fn create_payment_method(
        &self,
        _card: &CardCapture,
        billing_email: &str,
    ) -> Result<PaymentMethod> {
        self.calls.record(format!("createPaymentMethod:{billing_email}"));
        self.payment_method.clone().map_err(Into::into)
    }

    async fn confirm_card_payment(&self, client_secret: &str) -> Result<PaymentIntent> {
        self.calls.record(format!("confirmCardPayment:{client_secret}"));
        let status = self.confirmation.clone().map_err(FarmError::from)?;
        Ok(PaymentIntent {
            id: client_secret
                .split("_secret_")
                .next()
                .unwrap_or(client_secret)
                .to_string(),
            status,
        })
    }

    fn name(&self) -> &str {
        "MockProcessor"
    }
}

/// Farm data service with a fixed onboarding state
#[derive(Default)]
pub struct MockFarmData {
    onboarding_completed: bool,
    calls: CallLog,
}

impl MockFarmData {
    pub fn new(onboarding_completed: bool) -> Self {
        Self {
            onboarding_completed,
            calls: CallLog::default(),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.snapshot()
    }
}

#[async_trait]
impl FarmData for MockFarmData {
    async fn initialize_data(&self) -> Result<()> {
        self.calls.record("initializeData");
        Ok(())
    }

    async fn fetch_product_names(&self) -> Result<Vec<String>> {
        self.calls.record("getProductsName");
        Ok(Vec::new())
    }

    fn is_onboarding_completed(&self) -> bool {
        self.onboarding_completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_backend_records_calls() {
        let backend = MockBackend::new().with_customer(Err(MockFailure::Http {
            status: 500,
            message: Some("boom".into()),
        }));

        backend.stripe_prices().await.unwrap();
        let err = backend
            .create_customer(&CreateCustomerRequest {
                email: String::new(),
                payment_method_id: "pm".into(),
                user_id: None,
                address: String::new(),
                city: String::new(),
                state: String::new(),
                postal_code: String::new(),
                name: String::new(),
                payment_plan_months: 1,
            })
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(500));
        assert_eq!(backend.calls(), vec!["stripePrices", "stripeCustomer"]);
        assert_eq!(backend.customer_requests().len(), 1);
    }

    #[tokio::test]
    async fn test_mock_processor_intent_id() {
        let processor = MockProcessor::new();
        let intent = processor.confirm_card_payment("pi_123_secret_abc").await.unwrap();
        assert_eq!(intent.id, "pi_123");
        assert_eq!(intent.status, PaymentIntentStatus::Succeeded);
    }
}
