//! Checkout Orchestrator
//!
//! Owns the payment screen state and drives the checkout sequence against
//! the processor and the backend.

use std::sync::Arc;

use farm_core::{
    BackendApi, CardCapture, CardField, CheckoutForm, CreateCustomerRequest,
    CreateSubscriptionRequest, FarmData, FarmError, LookupKey, Navigator, Notification,
    Notifier, PaymentCopy, PaymentIntentStatus, PaymentProcessor, PersistPolicy, Result, Route,
    SessionStore, SubscriptionStatus, refresh_profile,
};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::outcome::{CheckoutFailure, CheckoutOutcome};
use crate::pricing::{CouponDisplay, PriceCatalog, annual_savings_percent};
use crate::toggle::PlanToggle;

/// Snapshot of the payment screen
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentView {
    pub email: String,
    pub monthly_price: Option<Decimal>,
    pub yearly_price: Option<Decimal>,
    pub yearly_saving_percentage: u32,
    pub toggle: PlanToggle,
    pub selected_plan: LookupKey,
    pub coupon: CouponDisplay,
    pub card_fields: [CardField; 3],
    pub submitting: bool,
}

/// The payment screen workflow
pub struct CheckoutOrchestrator {
    backend: Arc<dyn BackendApi>,
    processor: Arc<dyn PaymentProcessor>,
    sessions: Arc<dyn SessionStore>,
    farm: Arc<dyn FarmData>,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
    copy: PaymentCopy,

    catalog: PriceCatalog,
    toggle: PlanToggle,
    card: CardCapture,
    email: String,
    monthly_price: Option<Decimal>,
    yearly_price: Option<Decimal>,
    savings_percent: u32,
    coupon: CouponDisplay,
    submitting: bool,
}

impl CheckoutOrchestrator {
    pub fn builder() -> CheckoutBuilder {
        CheckoutBuilder::new()
    }

    /// Load the user's email and the published prices, mount the card fields
    pub async fn initialize(&mut self) -> Result<()> {
        let user = self
            .sessions
            .current()?
            .ok_or_else(|| FarmError::Session("no signed-in user".into()))?;
        self.email = user.email;

        let plans = self.backend.stripe_prices().await?;
        tracing::info!(count = plans.len(), "Loaded published prices");
        self.catalog = PriceCatalog::new(plans);
        if self.catalog.is_empty() {
            tracing::warn!("No published prices; checkout will be refused");
        }

        self.yearly_price = self.catalog.unit_price(LookupKey::PaidYearly);
        self.monthly_price = self.catalog.unit_price(LookupKey::PaidMonthly);
        self.savings_percent = annual_savings_percent(self.monthly_price, self.yearly_price);

        self.card = self.processor.card_capture();
        tracing::debug!(
            processor = self.processor.name(),
            fields = ?self.card.fields(),
            "Mounted card fields"
        );

        self.refresh_coupon();
        Ok(())
    }

    /// Monthly switch changed
    pub fn toggle_monthly(&mut self, selected: bool) {
        self.toggle.set_monthly(selected);
        self.refresh_coupon();
    }

    /// Annual switch changed
    pub fn toggle_annual(&mut self, selected: bool) {
        self.toggle.set_annual(selected);
        self.refresh_coupon();
    }

    /// New language strings arrived
    pub fn on_language_loaded(&mut self, copy: PaymentCopy) {
        self.copy = copy;
        self.refresh_coupon();
    }

    /// Recompute the coupon banner for the selected plan
    ///
    /// Without a published price for the plan the banner is left as is.
    pub fn refresh_coupon(&mut self) {
        if let Some(plan) = self.catalog.find(self.toggle.selected()) {
            self.coupon = CouponDisplay::for_plan(plan, &self.copy);
        }
    }

    /// Card fields, for the UI to fill
    pub const fn card_mut(&mut self) -> &mut CardCapture {
        &mut self.card
    }

    pub const fn toggle(&self) -> PlanToggle {
        self.toggle
    }

    pub const fn coupon(&self) -> &CouponDisplay {
        &self.coupon
    }

    pub const fn savings_percent(&self) -> u32 {
        self.savings_percent
    }

    pub const fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn view(&self) -> PaymentView {
        PaymentView {
            email: self.email.clone(),
            monthly_price: self.monthly_price,
            yearly_price: self.yearly_price,
            yearly_saving_percentage: self.savings_percent,
            toggle: self.toggle,
            selected_plan: self.toggle.selected(),
            coupon: self.coupon.clone(),
            card_fields: self.card.fields(),
            submitting: self.submitting,
        }
    }

    /// Run the checkout sequence for the selected plan
    pub async fn submit(&mut self, form: &CheckoutForm) -> CheckoutOutcome {
        let missing = form.missing_fields();
        if !missing.is_empty() {
            tracing::debug!(?missing, "Checkout blocked by empty billing fields");
            return CheckoutOutcome::Blocked { missing };
        }

        self.submitting = true;
        let outcome = self.run_checkout(form).await;
        self.submitting = false;

        tracing::info!(outcome = outcome.label(), "Checkout finished");
        outcome
    }

    async fn run_checkout(&self, form: &CheckoutForm) -> CheckoutOutcome {
        let plan = self.toggle.selected();
        let Some(price_id) = self.catalog.price_id(plan) else {
            tracing::error!(plan = %plan, "No published price for selected plan");
            self.show_error(None);
            return CheckoutOutcome::Notified(CheckoutFailure::MissingPrice(plan));
        };

        let payment_method = match self
            .processor
            .create_payment_method(&self.card, &self.email)
            .await
        {
            Ok(method) => method,
            Err(e) => {
                tracing::error!(error = %e, "createPaymentMethod failed");
                self.show_error(e.user_message());
                return CheckoutOutcome::Notified(CheckoutFailure::CardRejected(e));
            }
        };

        let user_id = self.sessions.current().ok().flatten().and_then(|s| s.id);
        let customer_request = CreateCustomerRequest {
            email: self.email.clone(),
            payment_method_id: payment_method.id,
            user_id,
            address: form.address.clone(),
            city: form.city.clone(),
            state: form.state.clone(),
            postal_code: form.postal_code.clone(),
            name: form.card_name.clone(),
            payment_plan_months: plan.plan_months(),
        };
        let customer = match self.backend.create_customer(&customer_request).await {
            Ok(customer) => customer,
            Err(e) => return self.backend_failure(e, CheckoutFailure::CustomerCreation),
        };
        tracing::info!(customer_id = %customer.customer_id, "Created customer");

        let subscription_request = CreateSubscriptionRequest {
            customer_id: customer.customer_id,
            price_id: price_id.to_string(),
        };
        let subscription = match self.backend.create_subscription(&subscription_request).await {
            Ok(subscription) => subscription,
            Err(e) => return self.subscription_failure(e),
        };
        tracing::info!(
            subscription_id = ?subscription.subscription_id,
            status = ?subscription.status,
            "Created subscription"
        );

        match subscription.status {
            SubscriptionStatus::RequiresConfirmation => {
                let Some(client_secret) = subscription.client_secret else {
                    tracing::error!("Subscription requires confirmation without a client secret");
                    self.show_error(None);
                    return CheckoutOutcome::Notified(CheckoutFailure::MissingClientSecret);
                };
                match self.processor.confirm_card_payment(&client_secret).await {
                    Err(e) => {
                        tracing::error!(error = %e, "Payment confirmation failed");
                        self.show_error(e.user_message());
                        CheckoutOutcome::Notified(CheckoutFailure::PaymentConfirmation(e))
                    }
                    Ok(intent) if intent.status == PaymentIntentStatus::Succeeded => {
                        tracing::info!(payment_intent = %intent.id, "Payment succeeded");
                        self.finish().await
                    }
                    Ok(intent) => {
                        tracing::warn!(payment_intent = %intent.id, status = ?intent.status, "Payment not completed");
                        self.show_error(None);
                        CheckoutOutcome::Notified(CheckoutFailure::PaymentNotSucceeded(intent.status))
                    }
                }
            }
            SubscriptionStatus::Succeeded => {
                tracing::info!("Payment already confirmed");
                self.finish().await
            }
            SubscriptionStatus::Other => {
                tracing::error!(subscription_id = ?subscription.subscription_id, "Unhandled subscription status");
                self.show_error(None);
                CheckoutOutcome::Notified(CheckoutFailure::UnhandledStatus)
            }
        }
    }

    /// Refresh the session, load farm data and move on to onboarding
    async fn finish(&self) -> CheckoutOutcome {
        if let Err(e) = refresh_profile(
            self.backend.as_ref(),
            self.sessions.as_ref(),
            PersistPolicy::RequireActiveSubscription,
        )
        .await
        {
            tracing::error!(error = %e, "Profile refresh after payment failed");
        }
        if let Err(e) = self.farm.initialize_data().await {
            tracing::warn!(error = %e, "Farm data initialization failed");
        }
        if let Err(e) = self.farm.fetch_product_names().await {
            tracing::warn!(error = %e, "Product names fetch failed");
        }

        self.navigator.navigate(&Route::Onboarding);
        CheckoutOutcome::Completed
    }

    /// Statuses in the retryable set carry a message for the user; anything
    /// else is only logged.
    fn backend_failure(
        &self,
        error: FarmError,
        wrap: fn(FarmError) -> CheckoutFailure,
    ) -> CheckoutOutcome {
        if error.is_user_facing() {
            tracing::warn!(error = %error, "Backend rejected checkout step");
            self.show_error(error.user_message());
            CheckoutOutcome::Notified(wrap(error))
        } else {
            tracing::error!(error = %error, "Checkout step failed");
            CheckoutOutcome::Aborted(wrap(error))
        }
    }

    /// Without a subscription there is no status to act on: the generic
    /// error is shown unless the backend supplied a message of its own.
    fn subscription_failure(&self, error: FarmError) -> CheckoutOutcome {
        if error.is_user_facing() {
            return self.backend_failure(error, CheckoutFailure::SubscriptionCreation);
        }
        tracing::error!(error = %error, "Subscription creation failed");
        self.show_error(None);
        CheckoutOutcome::Notified(CheckoutFailure::SubscriptionCreation(error))
    }

    fn show_error(&self, message: Option<&str>) {
        let message = message.unwrap_or(self.copy.went_wrong.as_str());
        self.notifier.notify(Notification::error(
            &self.copy.error_title,
            message,
            &self.copy.button_ok,
        ));
    }
}

/// Builder for [`CheckoutOrchestrator`]
#[derive(Default)]
pub struct CheckoutBuilder {
    backend: Option<Arc<dyn BackendApi>>,
    processor: Option<Arc<dyn PaymentProcessor>>,
    sessions: Option<Arc<dyn SessionStore>>,
    farm: Option<Arc<dyn FarmData>>,
    notifier: Option<Arc<dyn Notifier>>,
    navigator: Option<Arc<dyn Navigator>>,
    copy: PaymentCopy,
}

impl CheckoutBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn backend(mut self, backend: Arc<dyn BackendApi>) -> Self {
        self.backend = Some(backend);
        self
    }

    #[must_use]
    pub fn processor(mut self, processor: Arc<dyn PaymentProcessor>) -> Self {
        self.processor = Some(processor);
        self
    }

    #[must_use]
    pub fn sessions(mut self, sessions: Arc<dyn SessionStore>) -> Self {
        self.sessions = Some(sessions);
        self
    }

    #[must_use]
    pub fn farm(mut self, farm: Arc<dyn FarmData>) -> Self {
        self.farm = Some(farm);
        self
    }

    #[must_use]
    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    #[must_use]
    pub fn navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    #[must_use]
    pub fn copy(mut self, copy: PaymentCopy) -> Self {
        self.copy = copy;
        self
    }

    pub fn build(self) -> Result<CheckoutOrchestrator> {
        let missing = |what: &str| FarmError::Config(format!("{what} is required"));

        Ok(CheckoutOrchestrator {
            backend: self.backend.ok_or_else(|| missing("Backend"))?,
            processor: self.processor.ok_or_else(|| missing("Payment processor"))?,
            sessions: self.sessions.ok_or_else(|| missing("Session store"))?,
            farm: self.farm.ok_or_else(|| missing("Farm data service"))?,
            notifier: self.notifier.ok_or_else(|| missing("Notifier"))?,
            navigator: self.navigator.ok_or_else(|| missing("Navigator"))?,
            copy: self.copy,
            catalog: PriceCatalog::default(),
            toggle: PlanToggle::default(),
            card: CardCapture::new(),
            email: String::new(),
            monthly_price: None,
            yearly_price: None,
            savings_percent: 0,
            coupon: CouponDisplay::default(),
            submitting: false,
        })
    }
}
