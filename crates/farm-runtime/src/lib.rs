//! # farm-runtime
//!
//! Network-backed implementations of the farm-core collaborator traits.
//!
//! - [`HttpBackend`]: the farm backend (`BackendApi`)
//! - [`StripeProcessor`]: card tokenization and intent confirmation
//!   (`PaymentProcessor`)
//! - [`FarmService`]: onboarding state and product names (`FarmData`)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use farm_runtime::{ApiConfig, HttpBackend, StripeProcessor};
//!
//! let backend = Arc::new(HttpBackend::new(ApiConfig::from_env(), sessions.clone())?);
//! let processor = Arc::new(StripeProcessor::from_env()?);
//! ```

pub mod config;
pub mod farm;
pub mod http;
pub mod stripe;

pub use config::{ApiConfig, StripeConfig};
pub use farm::FarmService;
pub use http::HttpBackend;
pub use stripe::StripeProcessor;

// Re-export core types for convenience
pub use farm_core::{BackendApi, FarmData, FarmError, PaymentProcessor, Result};
