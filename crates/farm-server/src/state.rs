//! Application State

use std::sync::Arc;

use farm_billing::CheckoutOrchestrator;
use farm_core::{
    BackendApi, FarmData, MemorySessionStore, PaymentCopy, PaymentProcessor, RecordingNavigator,
    RecordingNotifier, Result,
};
use farm_session::SessionBootstrapper;
use tokio::sync::Mutex;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Signed-in user
    pub sessions: Arc<MemorySessionStore>,

    /// Popups raised since the last response
    pub notifier: Arc<RecordingNotifier>,

    /// Route changes since the last response
    pub navigator: Arc<RecordingNavigator>,

    /// Payment screen (None if Stripe is not configured)
    pub checkout: Option<Arc<Mutex<CheckoutOrchestrator>>>,

    /// Application shell
    pub shell: Arc<Mutex<SessionBootstrapper>>,
}

impl AppState {
    /// Wire both workflows onto the same collaborators
    pub fn new(
        backend: Arc<dyn BackendApi>,
        processor: Option<Arc<dyn PaymentProcessor>>,
        farm: Arc<dyn FarmData>,
        sessions: Arc<MemorySessionStore>,
        copy: PaymentCopy,
    ) -> Result<Self> {
        let notifier = Arc::new(RecordingNotifier::new());
        let navigator = Arc::new(RecordingNavigator::new());

        let checkout = processor
            .map(|processor| {
                CheckoutOrchestrator::builder()
                    .backend(backend.clone())
                    .processor(processor)
                    .sessions(sessions.clone())
                    .farm(farm.clone())
                    .notifier(notifier.clone())
                    .navigator(navigator.clone())
                    .copy(copy)
                    .build()
            })
            .transpose()?
            .map(|checkout| Arc::new(Mutex::new(checkout)));

        let shell = SessionBootstrapper::new(backend, sessions.clone(), farm, navigator.clone());

        Ok(Self {
            sessions,
            notifier,
            navigator,
            checkout,
            shell: Arc::new(Mutex::new(shell)),
        })
    }
}
