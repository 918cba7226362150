//! Profile Refresh
//!
//! Re-reads the signed-in farmer from the backend and stores it, keeping the
//! tokens the profile endpoint does not return.

use crate::backend::BackendApi;
use crate::error::{FarmError, Result};
use crate::session::{SessionStore, UserSession};

/// When a refreshed profile may replace the stored session
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PersistPolicy {
    /// Only once the backend confirms an active subscription; the session is
    /// then also flagged as authenticated
    RequireActiveSubscription,

    /// Always, leaving the authentication flag untouched
    Always,
}

/// Fetch `farmer?type=1`, carry credentials over and persist per `policy`
///
/// Returns the stored record, or `None` when nothing was persisted.
pub async fn refresh_profile(
    backend: &dyn BackendApi,
    sessions: &dyn SessionStore,
    policy: PersistPolicy,
) -> Result<Option<UserSession>> {
    let previous = sessions
        .current()?
        .ok_or_else(|| FarmError::Session("no signed-in user".into()))?;

    let Some(mut profile) = backend.farmer_profile().await? else {
        tracing::debug!("Profile endpoint returned no record");
        return Ok(None);
    };
    profile.carry_credentials(&previous);

    match policy {
        PersistPolicy::RequireActiveSubscription if !profile.has_active_subscription() => {
            tracing::info!(user_id = ?profile.id, "Subscription not active yet, keeping session");
            Ok(None)
        }
        PersistPolicy::RequireActiveSubscription => {
            sessions.save(profile.clone())?;
            sessions.mark_authenticated()?;
            tracing::info!(user_id = ?profile.id, "Session refreshed with active subscription");
            Ok(Some(profile))
        }
        PersistPolicy::Always => {
            sessions.save(profile.clone())?;
            tracing::info!(user_id = ?profile.id, "Session refreshed");
            Ok(Some(profile))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        CreateCustomerRequest, CreateSubscriptionRequest, CustomerCreated, PricePlan,
        SubscriptionResult,
    };
    use crate::session::{MemorySessionStore, SubscriptionFlag};
    use async_trait::async_trait;

    struct ProfileOnly(Option<UserSession>);

    #[async_trait]
    impl BackendApi for ProfileOnly {
        async fn stripe_prices(&self) -> Result<Vec<PricePlan>> {
            Ok(Vec::new())
        }
        async fn create_customer(&self, _: &CreateCustomerRequest) -> Result<CustomerCreated> {
            Err(FarmError::Validation("unused".into()))
        }
        async fn create_subscription(
            &self,
            _: &CreateSubscriptionRequest,
        ) -> Result<SubscriptionResult> {
            Err(FarmError::Validation("unused".into()))
        }
        async fn farmer_profile(&self) -> Result<Option<UserSession>> {
            Ok(self.0.clone())
        }
        async fn verify_email(&self, _: &str) -> Result<Option<UserSession>> {
            Ok(None)
        }
        async fn link_connection(&self, _: &str) -> Result<()> {
            Ok(())
        }
        async fn product_names(&self) -> Result<Vec<String>> {
            Ok(Vec::new())
        }
    }

    fn signed_in() -> MemorySessionStore {
        let store = MemorySessionStore::new();
        store
            .save(UserSession {
                id: Some(1),
                access_token: Some("at".into()),
                refresh_token: Some("rt".into()),
                is_service_provider: Some(true),
                ..UserSession::default()
            })
            .unwrap();
        store
    }

    fn profile(flag: SubscriptionFlag) -> UserSession {
        UserSession {
            id: Some(1),
            email: "farmer@example.com".into(),
            subscription_status: flag,
            ..UserSession::default()
        }
    }

    #[tokio::test]
    async fn test_active_subscription_is_persisted() {
        let store = signed_in();
        let backend = ProfileOnly(Some(profile(SubscriptionFlag::Yes)));

        let stored = refresh_profile(&backend, &store, PersistPolicy::RequireActiveSubscription)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(stored.access_token.as_deref(), Some("at"));
        assert_eq!(stored.is_service_provider, Some(true));
        assert!(store.is_authenticated());
        assert_eq!(store.current().unwrap().unwrap().email, "farmer@example.com");
    }

    #[tokio::test]
    async fn test_inactive_subscription_keeps_session() {
        let store = signed_in();
        let backend = ProfileOnly(Some(profile(SubscriptionFlag::No)));

        let stored = refresh_profile(&backend, &store, PersistPolicy::RequireActiveSubscription)
            .await
            .unwrap();

        assert!(stored.is_none());
        assert!(!store.is_authenticated());
        assert_eq!(store.current().unwrap().unwrap().email, "");
    }

    #[tokio::test]
    async fn test_always_policy_ignores_subscription() {
        let store = signed_in();
        let backend = ProfileOnly(Some(profile(SubscriptionFlag::No)));

        let stored = refresh_profile(&backend, &store, PersistPolicy::Always)
            .await
            .unwrap();

        assert!(stored.is_some());
        assert_eq!(store.current().unwrap().unwrap().refresh_token.as_deref(), Some("rt"));
    }

    #[tokio::test]
    async fn test_requires_session() {
        let store = MemorySessionStore::new();
        let backend = ProfileOnly(None);
        let result = refresh_profile(&backend, &store, PersistPolicy::Always).await;
        assert!(matches!(result, Err(FarmError::Session(_))));
    }
}
