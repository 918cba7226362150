//! Session Bootstrapper
//!
//! Runs once when the application shell starts, then again on every query
//! parameter change.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use farm_core::{
    BackendApi, FarmData, Navigator, PersistPolicy, Result, Route, SessionStore, SignupMode,
    SubscriptionFlag, UserSession, refresh_profile,
};
use serde::Serialize;

use crate::query::QueryParams;
use crate::window::LookbackWindow;

/// What a query parameter change led to
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum BootstrapDecision {
    /// Nothing to act on
    Idle,

    /// The verification token did not resolve to a user
    Unverified,

    /// Email verified and session stored; `route` is where the user was sent
    Verified { route: Option<Route> },

    /// Bank connection linked to the farmer
    ConnectionLinked,

    /// Bank connection could not be linked (logged)
    ConnectionFailed,
}

impl BootstrapDecision {
    /// Route the decision navigated to, if any
    pub const fn navigation(&self) -> Option<&Route> {
        match self {
            Self::Verified { route } => route.as_ref(),
            _ => None,
        }
    }
}

/// Application shell startup
pub struct SessionBootstrapper {
    backend: Arc<dyn BackendApi>,
    sessions: Arc<dyn SessionStore>,
    farm: Arc<dyn FarmData>,
    navigator: Arc<dyn Navigator>,

    current_route: String,
    user_id: Option<i64>,
    connection_id: Option<String>,
    window: Option<LookbackWindow>,
}

impl SessionBootstrapper {
    pub fn new(
        backend: Arc<dyn BackendApi>,
        sessions: Arc<dyn SessionStore>,
        farm: Arc<dyn FarmData>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            backend,
            sessions,
            farm,
            navigator,
            current_route: String::new(),
            user_id: None,
            connection_id: None,
            window: None,
        }
    }

    /// Restore the stored user and route, then check onboarding
    pub async fn start(&mut self, current_route: impl Into<String>, now: DateTime<Utc>) -> Result<()> {
        self.current_route = current_route.into();

        if let Some(user) = self.sessions.current()? {
            self.user_id = user.id;
            self.connection_id = user.connection_id;
        }
        self.window = Some(LookbackWindow::ending_at(now));

        tracing::info!(
            route = %self.current_route,
            user_id = ?self.user_id,
            connected = self.connection_id.is_some(),
            "Shell started"
        );

        self.check_onboarding().await;
        Ok(())
    }

    /// Load farm data for an authenticated farmer and send them to
    /// onboarding while it is incomplete
    ///
    /// Returns the route navigated to, if any.
    pub async fn check_onboarding(&self) -> Option<Route> {
        if !self.sessions.is_authenticated() {
            return None;
        }
        let user = match self.sessions.current() {
            Ok(Some(user)) => user,
            Ok(None) => return None,
            Err(e) => {
                tracing::error!(error = %e, "Session unreadable");
                return None;
            }
        };
        if user.is_service_provider() {
            return None;
        }

        if let Err(e) = self.farm.initialize_data().await {
            tracing::error!(error = %e, "Farm data initialization failed");
            return None;
        }
        if let Err(e) = self.farm.fetch_product_names().await {
            tracing::warn!(error = %e, "Product names fetch failed");
        }

        if self.farm.is_onboarding_completed() {
            None
        } else {
            tracing::info!(user_id = ?user.id, "Onboarding incomplete");
            self.navigator.navigate(&Route::Onboarding);
            Some(Route::Onboarding)
        }
    }

    /// React to the current query parameters
    pub async fn handle_query(&mut self, params: &QueryParams) -> Result<BootstrapDecision> {
        if let Some(token) = params.token() {
            return self.verify_email(token).await;
        }

        match params.connection_id() {
            Some(id) if !self.on_route(&Route::Economy) => Ok(self.link_connection(id).await),
            Some(_) => {
                tracing::debug!("Connection callback on the economy route, left to that view");
                Ok(BootstrapDecision::Idle)
            }
            None => Ok(BootstrapDecision::Idle),
        }
    }

    async fn verify_email(&mut self, token: &str) -> Result<BootstrapDecision> {
        let Some(user) = self.backend.verify_email(token).await? else {
            tracing::warn!("Verification token returned no user");
            return Ok(BootstrapDecision::Unverified);
        };

        let route = landing_route(&user);
        self.user_id = user.id;
        self.connection_id.clone_from(&user.connection_id);
        self.sessions.save(user)?;
        self.sessions.mark_authenticated()?;
        tracing::info!(user_id = ?self.user_id, route = ?route, "Email verified");

        if let Some(route) = &route {
            self.navigator.navigate(route);
            if *route == Route::Onboarding {
                self.check_onboarding().await;
            }
        }

        Ok(BootstrapDecision::Verified { route })
    }

    async fn link_connection(&mut self, connection_id: &str) -> BootstrapDecision {
        if let Err(e) = self.backend.link_connection(connection_id).await {
            tracing::error!(error = %e, "Bank connection link failed");
            return BootstrapDecision::ConnectionFailed;
        }
        tracing::info!(connection_id, "Bank connection linked");

        match refresh_profile(
            self.backend.as_ref(),
            self.sessions.as_ref(),
            PersistPolicy::Always,
        )
        .await
        {
            Ok(Some(profile)) => self.connection_id = profile.connection_id,
            Ok(None) => {}
            Err(e) => tracing::error!(error = %e, "Profile refresh after linking failed"),
        }
        BootstrapDecision::ConnectionLinked
    }

    /// Whether the shell was loaded on `route`, ignoring any query string
    fn on_route(&self, route: &Route) -> bool {
        let path = self.current_route.split(['?', '#']).next().unwrap_or_default();
        path == route.path()
    }

    pub fn current_route(&self) -> &str {
        &self.current_route
    }

    pub const fn user_id(&self) -> Option<i64> {
        self.user_id
    }

    pub fn connection_id(&self) -> Option<&str> {
        self.connection_id.as_deref()
    }

    /// Transactions date range computed at startup
    pub const fn window(&self) -> Option<&LookbackWindow> {
        self.window.as_ref()
    }
}

/// Where a freshly verified user lands
fn landing_route(user: &UserSession) -> Option<Route> {
    if user.is_service_provider() {
        return Some(Route::Farms);
    }
    match (user.signup_mode, user.subscription_status) {
        (Some(SignupMode::CouponCode), _) | (Some(SignupMode::Payment), SubscriptionFlag::Yes) => {
            Some(Route::Onboarding)
        }
        (Some(SignupMode::Payment), SubscriptionFlag::No) => Some(Route::Payment),
        _ => None,
    }
}
