//! Session Management
//!
//! The signed-in user's record and the store that owns it. Workflows never
//! reach for global state: they receive a [`SessionStore`] and go through it
//! for every read and write.

use serde::{Deserialize, Serialize};
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{FarmError, Result};

/// Account role
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    #[default]
    Farmer,

    /// Manages several farms; never goes through onboarding
    ServiceProvider,

    #[serde(other)]
    Other,
}

/// Subscription flag carried on the user record
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionFlag {
    Yes,

    #[default]
    #[serde(other)]
    No,
}

/// How the account was created
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignupMode {
    CouponCode,
    Payment,

    #[serde(other)]
    Other,
}

/// The signed-in user as known to the client
///
/// The backend returns this shape from `verifyEmail` and `farmer?type=1`;
/// the latter omits the tokens, which is why [`UserSession::carry_credentials`]
/// exists.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSession {
    #[serde(default)]
    pub id: Option<i64>,

    #[serde(default)]
    pub email: String,

    #[serde(default)]
    pub access_token: Option<String>,

    #[serde(default)]
    pub refresh_token: Option<String>,

    #[serde(default)]
    pub role: UserRole,

    #[serde(default)]
    pub subscription_status: SubscriptionFlag,

    #[serde(default)]
    pub signup_mode: Option<SignupMode>,

    #[serde(default)]
    pub is_service_provider: Option<bool>,

    #[serde(default, alias = "isOnboardingCompleted")]
    pub onboarding_completed: bool,

    /// External bank-aggregation connection
    #[serde(default)]
    pub connection_id: Option<String>,
}

impl UserSession {
    /// Copy tokens and the service-provider flag from the previous record
    pub fn carry_credentials(&mut self, previous: &Self) {
        self.access_token.clone_from(&previous.access_token);
        self.refresh_token.clone_from(&previous.refresh_token);
        self.is_service_provider = previous.is_service_provider;
    }

    pub fn has_active_subscription(&self) -> bool {
        self.subscription_status == SubscriptionFlag::Yes
    }

    pub fn is_service_provider(&self) -> bool {
        self.role == UserRole::ServiceProvider
    }
}

/// Session store trait
pub trait SessionStore: Send + Sync {
    /// Currently stored user, if any
    fn current(&self) -> Result<Option<UserSession>>;

    /// Replace the stored user
    fn save(&self, session: UserSession) -> Result<()>;

    /// Flag the session as authenticated
    fn mark_authenticated(&self) -> Result<()>;

    /// Whether a user is stored and flagged as authenticated
    fn is_authenticated(&self) -> bool;

    /// Drop the stored user
    fn clear(&self) -> Result<()>;

    /// Bearer token of the stored user
    fn access_token(&self) -> Result<Option<String>> {
        Ok(self.current()?.and_then(|s| s.access_token))
    }
}

/// In-memory session store
pub struct MemorySessionStore {
    session: RwLock<Option<UserSession>>,
    authenticated: AtomicBool,
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySessionStore {
    pub const fn new() -> Self {
        Self {
            session: RwLock::new(None),
            authenticated: AtomicBool::new(false),
        }
    }

    /// Start with a signed-in user
    pub fn authenticated(session: UserSession) -> Self {
        Self {
            session: RwLock::new(Some(session)),
            authenticated: AtomicBool::new(true),
        }
    }
}

fn poisoned<T>(_: T) -> FarmError {
    FarmError::Session("session lock poisoned".into())
}

impl SessionStore for MemorySessionStore {
    fn current(&self) -> Result<Option<UserSession>> {
        let session = self.session.read().map_err(poisoned)?;
        Ok(session.clone())
    }

    fn save(&self, session: UserSession) -> Result<()> {
        let mut slot = self.session.write().map_err(poisoned)?;
        tracing::debug!(user_id = ?session.id, "Stored session user");
        *slot = Some(session);
        Ok(())
    }

    fn mark_authenticated(&self) -> Result<()> {
        self.authenticated.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn is_authenticated(&self) -> bool {
        self.authenticated.load(Ordering::SeqCst)
            && self.session.read().is_ok_and(|s| s.is_some())
    }

    fn clear(&self) -> Result<()> {
        let mut slot = self.session.write().map_err(poisoned)?;
        *slot = None;
        self.authenticated.store(false, Ordering::SeqCst);
        Ok(())
    }
}
