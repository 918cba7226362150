//! UI Side Channels
//!
//! Popups, navigation and the farm data service are owned by the front end.
//! The workflows only see these traits.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

use crate::error::Result;

/// Popup flavor
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PopupKind {
    Error,
}

/// A popup shown to the user
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub kind: PopupKind,
    pub title: String,
    pub message: String,
    pub button: String,
}

impl Notification {
    pub fn error(
        title: impl Into<String>,
        message: impl Into<String>,
        button: impl Into<String>,
    ) -> Self {
        Self {
            kind: PopupKind::Error,
            title: title.into(),
            message: message.into(),
            button: button.into(),
        }
    }
}

/// Application routes the workflows can send the user to
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Route {
    Onboarding,
    Payment,
    Farms,
    Economy,
}

impl Route {
    pub const fn path(&self) -> &'static str {
        match self {
            Self::Onboarding => "/onboarding",
            Self::Payment => "/payment",
            Self::Farms => "/farms",
            Self::Economy => "/economy",
        }
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}

/// Popup channel
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Router
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: &Route);
}

/// Farm-domain data service
#[async_trait]
pub trait FarmData: Send + Sync {
    /// Load the farm data the rest of the application relies on
    async fn initialize_data(&self) -> Result<()>;

    /// Load product names for the catalog pickers
    async fn fetch_product_names(&self) -> Result<Vec<String>>;

    /// Whether the loaded farm has finished onboarding
    fn is_onboarding_completed(&self) -> bool;
}

/// Notifier that keeps every popup until drained
#[derive(Default)]
pub struct RecordingNotifier {
    shown: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take all popups shown so far
    pub fn drain(&self) -> Vec<Notification> {
        self.shown
            .lock()
            .map(|mut shown| std::mem::take(&mut *shown))
            .unwrap_or_default()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        tracing::debug!(title = %notification.title, message = %notification.message, "Popup");
        if let Ok(mut shown) = self.shown.lock() {
            shown.push(notification);
        }
    }
}

/// Navigator that keeps every route change until drained
#[derive(Default)]
pub struct RecordingNavigator {
    visited: Mutex<Vec<Route>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take all route changes so far
    pub fn drain(&self) -> Vec<Route> {
        self.visited
            .lock()
            .map(|mut visited| std::mem::take(&mut *visited))
            .unwrap_or_default()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: &Route) {
        tracing::debug!(route = %route, "Navigate");
        if let Ok(mut visited) = self.visited.lock() {
            visited.push(route.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_paths() {
        assert_eq!(Route::Onboarding.path(), "/onboarding");
        assert_eq!(Route::Economy.to_string(), "/economy");
    }

    #[test]
    fn test_recorders_drain() {
        let notifier = RecordingNotifier::new();
        notifier.notify(Notification::error("Error", "Declined", "OK"));
        assert_eq!(notifier.drain().len(), 1);
        assert!(notifier.drain().is_empty());

        let navigator = RecordingNavigator::new();
        navigator.navigate(&Route::Farms);
        assert_eq!(navigator.drain(), vec![Route::Farms]);
    }
}
