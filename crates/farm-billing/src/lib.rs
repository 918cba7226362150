//! # farm-billing
//!
//! The subscription payment workflow.
//!
//! ## Checkout Sequence
//!
//! ```text
//! ┌──────────┐   ┌────────────────┐   ┌────────────────┐   ┌────────────────────┐
//! │ validate │──▶│ processor:     │──▶│ backend:       │──▶│ backend:           │
//! │ form     │   │ payment method │   │ stripeCustomer │   │ stripeSubscription │
//! └──────────┘   └────────────────┘   └────────────────┘   └─────────┬──────────┘
//!                                                                    │ status
//!                       ┌──────────────────────────┬─────────────────┴──────┐
//!                       ▼                          ▼                        ▼
//!          requires_confirmation             succeeded                  anything else
//!          processor: confirm ──────────▶ refresh profile,            generic error
//!                                         farm data, onboarding
//! ```
//!
//! Every step either moves on, shows one popup, or gets logged; nothing is
//! retried automatically. [`CheckoutOutcome`] tells the caller which of those
//! happened.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use farm_billing::CheckoutOrchestrator;
//!
//! let mut checkout = CheckoutOrchestrator::builder()
//!     .backend(backend)
//!     .processor(processor)
//!     .sessions(sessions)
//!     .farm(farm)
//!     .notifier(notifier)
//!     .navigator(navigator)
//!     .build()?;
//!
//! checkout.initialize().await?;
//! checkout.toggle_monthly(true);
//! let outcome = checkout.submit(&form).await;
//! ```

mod checkout;
mod outcome;
mod pricing;
mod toggle;

pub use checkout::{CheckoutBuilder, CheckoutOrchestrator, PaymentView};
pub use outcome::{CheckoutFailure, CheckoutOutcome};
pub use pricing::{CouponDisplay, PriceCatalog, annual_savings_percent, format_amount};
pub use toggle::PlanToggle;
