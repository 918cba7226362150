//! farm-portal HTTP Server
//!
//! Axum server exposing the payment screen and the application shell
//! bootstrap as JSON for a thin front end.

mod handlers;
mod state;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post, put},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use farm_core::{MemorySessionStore, PaymentCopy, PaymentProcessor};
use farm_runtime::{ApiConfig, FarmService, HttpBackend, StripeProcessor};

use crate::handlers::{
    bootstrap, get_payment, health_check, set_language, submit_payment, toggle_plan,
};
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment
    dotenvy::dotenv().ok();

    let sessions = Arc::new(MemorySessionStore::new());

    // Farm backend
    let api_config = ApiConfig::from_env();
    tracing::info!(base_url = %api_config.base_url, "Farm backend configured");
    let backend = Arc::new(HttpBackend::new(api_config, sessions.clone())?);
    let farm = Arc::new(FarmService::new(backend.clone()));

    // Payments
    let processor: Option<Arc<dyn PaymentProcessor>> = match StripeProcessor::from_env() {
        Ok(stripe) => {
            tracing::info!("✓ Stripe configured");
            Some(Arc::new(stripe))
        }
        Err(e) => {
            tracing::warn!("⚠ Stripe not configured - payments disabled ({e})");
            tracing::warn!("  Set STRIPE_PUBLISHABLE_KEY in .env");
            None
        }
    };

    let lang = std::env::var("FARM_LANG").unwrap_or_else(|_| "fr".into());
    let state = AppState::new(backend, processor, farm, sessions, PaymentCopy::for_lang(&lang))?;

    let app = router(state);

    // Start server
    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("🚀 farm-portal server running on http://{}", addr);
    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health              - Health check");
    tracing::info!("  GET  /api/payment         - Load payment screen");
    tracing::info!("  POST /api/payment/toggle  - Switch monthly/annual");
    tracing::info!("  POST /api/payment/submit  - Subscribe");
    tracing::info!("  PUT  /api/lang            - Reload payment strings");
    tracing::info!("  GET  /api/bootstrap       - Shell startup and URL tokens");

    axum::serve(listener, app).await?;

    Ok(())
}

fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health
        .route("/health", get(health_check))
        // Payment screen
        .route("/api/payment", get(get_payment))
        .route("/api/payment/toggle", post(toggle_plan))
        .route("/api/payment/submit", post(submit_payment))
        .route("/api/lang", put(set_language))
        // Application shell
        .route("/api/bootstrap", get(bootstrap))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
