//! HTTP Handlers

use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use farm_billing::{CheckoutOrchestrator, PaymentView};
use farm_core::{
    CardField, CheckoutForm, FarmError, LookupKey, Notification, PaymentCopy, Route,
    SessionStore,
};
use farm_session::{BootstrapDecision, LookbackWindow, QueryParams};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize};
use tokio::sync::Mutex;
use tracing::Instrument;
use uuid::Uuid;

use crate::state::AppState;

type ApiError = (StatusCode, Json<ErrorResponse>);

// ============================================================================
// Request / Response Types
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub stripe_configured: bool,
    pub authenticated: bool,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

#[derive(Debug, Deserialize)]
pub struct TogglePlanRequest {
    pub plan: LookupKey,
    pub selected: bool,
}

/// Card fields as typed by the user
///
/// Number and CVC never leave the secret wrapper until they reach the
/// card capture, so `Debug` output stays redacted.
#[derive(Debug, Default, Deserialize)]
pub struct CardInput {
    #[serde(default, deserialize_with = "secret")]
    pub number: Option<SecretString>,
    #[serde(default)]
    pub expiry: String,
    #[serde(default, deserialize_with = "secret")]
    pub cvc: Option<SecretString>,
}

fn secret<'de, D>(deserializer: D) -> Result<Option<SecretString>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.map(SecretString::from))
}

#[derive(Debug, Deserialize)]
pub struct SubmitPaymentRequest {
    pub form: CheckoutForm,
    #[serde(default)]
    pub card: Option<CardInput>,
}

#[derive(Debug, Serialize)]
pub struct SubmitPaymentResponse {
    pub attempt_id: Uuid,
    pub outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<&'static str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing: Vec<&'static str>,
    pub notifications: Vec<Notification>,
    pub navigation: Vec<Route>,
    pub view: PaymentView,
}

#[derive(Debug, Deserialize)]
pub struct LanguageRequest {
    pub lang: String,
    /// Strings from the loaded language pack; built-in ones otherwise
    #[serde(default)]
    pub copy: Option<PaymentCopy>,
}

#[derive(Debug, Deserialize)]
pub struct BootstrapQuery {
    #[serde(default)]
    pub route: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub connection_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BootstrapResponse {
    #[serde(flatten)]
    pub decision: BootstrapDecision,
    pub user_id: Option<i64>,
    pub connected: bool,
    pub window: Option<LookbackWindow>,
    pub navigation: Vec<Route>,
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        stripe_configured: state.checkout.is_some(),
        authenticated: state.sessions.is_authenticated(),
    })
}

/// Load prices and mount the card fields
pub async fn get_payment(State(state): State<AppState>) -> Result<Json<PaymentView>, ApiError> {
    let checkout = checkout(&state)?;
    let mut checkout = checkout.lock().await;

    checkout.initialize().await.map_err(|e| error_response(&e))?;
    Ok(Json(checkout.view()))
}

/// Flip the monthly or annual switch
pub async fn toggle_plan(
    State(state): State<AppState>,
    Json(payload): Json<TogglePlanRequest>,
) -> Result<Json<PaymentView>, ApiError> {
    let checkout = checkout(&state)?;
    let mut checkout = checkout.lock().await;

    match payload.plan {
        LookupKey::PaidMonthly => checkout.toggle_monthly(payload.selected),
        LookupKey::PaidYearly => checkout.toggle_annual(payload.selected),
        LookupKey::Other => {
            return Err(api_error(StatusCode::BAD_REQUEST, "Unknown plan", "UNKNOWN_PLAN"));
        }
    }
    Ok(Json(checkout.view()))
}

/// Run the checkout sequence
pub async fn submit_payment(
    State(state): State<AppState>,
    Json(payload): Json<SubmitPaymentRequest>,
) -> Result<Json<SubmitPaymentResponse>, ApiError> {
    let checkout = checkout(&state)?;
    let mut checkout = checkout.lock().await;
    let attempt_id = Uuid::new_v4();

    if let Some(card) = payload.card {
        let capture = checkout.card_mut();
        capture.fill(CardField::CardNumber, exposed(card.number.as_ref()));
        capture.fill(CardField::CardExpiry, card.expiry);
        capture.fill(CardField::CardCvc, exposed(card.cvc.as_ref()));
    }

    let outcome = checkout
        .submit(&payload.form)
        .instrument(tracing::info_span!("checkout", %attempt_id))
        .await;
    if outcome.is_completed() {
        checkout.card_mut().clear();
    }

    let missing = match &outcome {
        farm_billing::CheckoutOutcome::Blocked { missing } => missing.clone(),
        _ => Vec::new(),
    };

    Ok(Json(SubmitPaymentResponse {
        attempt_id,
        outcome: outcome.label(),
        failure: outcome.failure().map(farm_billing::CheckoutFailure::code),
        missing,
        notifications: state.notifier.drain(),
        navigation: state.navigator.drain(),
        view: checkout.view(),
    }))
}

/// Swap the payment strings for another language
pub async fn set_language(
    State(state): State<AppState>,
    Json(payload): Json<LanguageRequest>,
) -> Result<Json<PaymentView>, ApiError> {
    let checkout = checkout(&state)?;
    let mut checkout = checkout.lock().await;

    let copy = payload
        .copy
        .unwrap_or_else(|| PaymentCopy::for_lang(&payload.lang));
    tracing::info!(lang = %copy.lang, "Language loaded");

    checkout.on_language_loaded(copy);
    Ok(Json(checkout.view()))
}

/// Shell startup plus query-parameter handling
pub async fn bootstrap(
    State(state): State<AppState>,
    Query(query): Query<BootstrapQuery>,
) -> Result<Json<BootstrapResponse>, ApiError> {
    let mut shell = state.shell.lock().await;

    let route = query.route.unwrap_or_else(|| "/".into());
    shell
        .start(route, chrono::Utc::now())
        .await
        .map_err(|e| error_response(&e))?;

    let params = QueryParams {
        token: query.token,
        connection_id: query.connection_id,
    };
    let decision = shell
        .handle_query(&params)
        .await
        .map_err(|e| error_response(&e))?;

    Ok(Json(BootstrapResponse {
        decision,
        user_id: shell.user_id(),
        connected: shell.connection_id().is_some(),
        window: shell.window().copied(),
        navigation: state.navigator.drain(),
    }))
}

// ============================================================================
// Helpers
// ============================================================================

fn checkout(state: &AppState) -> Result<Arc<Mutex<CheckoutOrchestrator>>, ApiError> {
    state.checkout.clone().ok_or_else(|| {
        api_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "Payments are not configured",
            "PAYMENTS_DISABLED",
        )
    })
}

fn exposed(value: Option<&SecretString>) -> String {
    value.map(|v| v.expose_secret().to_owned()).unwrap_or_default()
}

fn api_error(status: StatusCode, error: &str, code: &str) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
            code: code.into(),
        }),
    )
}

fn error_response(err: &FarmError) -> ApiError {
    let (status, code) = match err {
        FarmError::Session(_) => (StatusCode::UNAUTHORIZED, "NOT_SIGNED_IN"),
        FarmError::Backend { .. } | FarmError::Transport(_) => {
            (StatusCode::BAD_GATEWAY, "BACKEND_ERROR")
        }
        FarmError::Decode(_) => (StatusCode::BAD_GATEWAY, "BAD_RESPONSE"),
        FarmError::Validation(_) => (StatusCode::BAD_REQUEST, "INVALID_REQUEST"),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
    };
    tracing::error!(error = %err, code, upstream_status = ?err.status(), "Request failed");

    api_error(status, &err.to_string(), code)
}
