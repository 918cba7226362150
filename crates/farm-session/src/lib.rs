//! # farm-session
//!
//! Application shell bootstrap.
//!
//! On startup the shell restores the stored user, computes the date range
//! for the transactions view and makes sure an authenticated farmer who has
//! not finished onboarding lands there. After that it watches the query
//! string:
//!
//! ```text
//! ?token=…           verifyEmail ──▶ store session ──▶ farms | onboarding | payment
//! ?connection_id=…   powenConnection ──▶ refresh profile   (not on /economy)
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use farm_session::{QueryParams, SessionBootstrapper};
//!
//! let mut shell = SessionBootstrapper::new(backend, sessions, farm, navigator);
//! shell.start("/farms", chrono::Utc::now()).await?;
//! let decision = shell.handle_query(&QueryParams::parse(query)).await?;
//! ```

mod bootstrap;
mod query;
mod window;

pub use bootstrap::{BootstrapDecision, SessionBootstrapper};
pub use query::QueryParams;
pub use window::LookbackWindow;
