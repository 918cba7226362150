//! # farm-core
//!
//! Shared domain model and collaborator traits for the farm portal.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │        CheckoutOrchestrator        SessionBootstrapper        │
//! │               │                            │                 │
//! │  ┌────────────┼──────────────┬─────────────┼──────────────┐  │
//! │  │ BackendApi │ PaymentProc. │ SessionStore│ FarmData     │  │
//! │  │  (HTTP)    │  (Stripe)    │ (memory)    │ Notifier/Nav │  │
//! │  └────────────┴──────────────┴─────────────┴──────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The orchestrators only ever talk to the traits defined here, so the
//! HTTP clients, the processor, and the UI side channels can be swapped
//! (or mocked in tests) without touching the workflows.

pub mod backend;
pub mod copy;
pub mod error;
pub mod mock;
pub mod model;
pub mod processor;
pub mod profile;
pub mod session;
pub mod surface;

pub use backend::BackendApi;
pub use copy::PaymentCopy;
pub use error::{FarmError, Result, RETRYABLE_STATUSES, is_retryable_status};
pub use model::{
    AppliedCoupon, CheckoutForm, CreateCustomerRequest, CreateSubscriptionRequest,
    CustomerCreated, LookupKey, PricePlan, SubscriptionResult, SubscriptionStatus,
};
pub use processor::{
    CardCapture, CardField, PaymentIntent, PaymentIntentStatus, PaymentMethod, PaymentProcessor,
};
pub use profile::{PersistPolicy, refresh_profile};
pub use session::{
    MemorySessionStore, SessionStore, SignupMode, SubscriptionFlag, UserRole, UserSession,
};
pub use surface::{
    FarmData, Navigator, Notification, Notifier, PopupKind, RecordingNavigator,
    RecordingNotifier, Route,
};
