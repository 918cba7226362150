//! Backend API Strategy
//!
//! Every call the portal makes against the application backend. The HTTP
//! implementation lives in `farm-runtime`; tests substitute in-memory fakes.

use async_trait::async_trait;

use crate::error::Result;
use crate::model::{
    CreateCustomerRequest, CreateSubscriptionRequest, CustomerCreated, PricePlan,
    SubscriptionResult,
};
use crate::session::UserSession;

/// Application backend
///
/// Non-success HTTP answers surface as [`FarmError::Backend`](crate::FarmError::Backend)
/// carrying the status and the payload's `error` message.
#[async_trait]
pub trait BackendApi: Send + Sync {
    /// `GET stripePrices`
    async fn stripe_prices(&self) -> Result<Vec<PricePlan>>;

    /// `POST stripeCustomer`
    async fn create_customer(&self, request: &CreateCustomerRequest) -> Result<CustomerCreated>;

    /// `POST stripeSubscription`
    async fn create_subscription(
        &self,
        request: &CreateSubscriptionRequest,
    ) -> Result<SubscriptionResult>;

    /// `GET farmer?type=1`; `None` when the backend answers with an empty body
    async fn farmer_profile(&self) -> Result<Option<UserSession>>;

    /// `GET verifyEmail?token=...`
    async fn verify_email(&self, token: &str) -> Result<Option<UserSession>>;

    /// `POST powenConnection`
    async fn link_connection(&self, connection_id: &str) -> Result<()>;

    /// `GET productsName`
    async fn product_names(&self) -> Result<Vec<String>>;
}
