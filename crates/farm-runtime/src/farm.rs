//! Farm Data Service
//!
//! Loads and caches what the rest of the application needs about the
//! signed-in farm: the onboarding state and the product catalog names.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use farm_core::{BackendApi, FarmData, FarmError, Result};

#[derive(Debug, Default)]
struct FarmCache {
    onboarding_completed: bool,
    product_names: Vec<String>,
}

/// `FarmData` backed by the farm backend
pub struct FarmService {
    backend: Arc<dyn BackendApi>,
    cache: RwLock<FarmCache>,
}

impl FarmService {
    pub fn new(backend: Arc<dyn BackendApi>) -> Self {
        Self {
            backend,
            cache: RwLock::new(FarmCache::default()),
        }
    }

    /// Product names from the last fetch
    pub fn product_names(&self) -> Vec<String> {
        self.cache
            .read()
            .map(|c| c.product_names.clone())
            .unwrap_or_default()
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, FarmCache>> {
        self.cache
            .write()
            .map_err(|_| FarmError::Session("farm cache lock poisoned".into()))
    }
}

#[async_trait]
impl FarmData for FarmService {
    async fn initialize_data(&self) -> Result<()> {
        let profile = self.backend.farmer_profile().await?;
        let completed = profile.is_some_and(|p| p.onboarding_completed);

        self.write()?.onboarding_completed = completed;
        tracing::info!(onboarding_completed = completed, "Farm data loaded");
        Ok(())
    }

    async fn fetch_product_names(&self) -> Result<Vec<String>> {
        let names = self.backend.product_names().await?;
        tracing::debug!(count = names.len(), "Product names loaded");

        self.write()?.product_names.clone_from(&names);
        Ok(names)
    }

    fn is_onboarding_completed(&self) -> bool {
        self.cache.read().is_ok_and(|c| c.onboarding_completed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use farm_core::UserSession;
    use farm_core::mock::MockBackend;

    #[tokio::test]
    async fn test_initialize_reads_onboarding_state() {
        let backend = MockBackend::new().with_profile(Some(UserSession {
            onboarding_completed: true,
            ..UserSession::default()
        }));
        let service = FarmService::new(Arc::new(backend));
        assert!(!service.is_onboarding_completed());

        service.initialize_data().await.unwrap();
        assert!(service.is_onboarding_completed());
    }

    #[tokio::test]
    async fn test_missing_profile_means_not_onboarded() {
        let service = FarmService::new(Arc::new(MockBackend::new()));
        service.initialize_data().await.unwrap();
        assert!(!service.is_onboarding_completed());
    }

    #[tokio::test]
    async fn test_product_names_cached() {
        let backend = MockBackend::new().with_products(vec!["Blé".into(), "Colza".into()]);
        let service = FarmService::new(Arc::new(backend));

        let names = service.fetch_product_names().await.unwrap();
        assert_eq!(names.len(), 2);
        assert_eq!(service.product_names(), vec!["Blé", "Colza"]);
    }
}
