//! Farm Backend Client
//!
//! `BackendApi` over HTTP. Endpoint names are appended to the configured base
//! URL and the stored access token goes out as a bearer token.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use farm_core::{
    BackendApi, CreateCustomerRequest, CreateSubscriptionRequest, CustomerCreated, FarmError,
    PricePlan, Result, SessionStore, SubscriptionResult, UserSession,
};
use reqwest::{Client, Method, RequestBuilder};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::ApiConfig;

/// Farm backend over HTTP
pub struct HttpBackend {
    client: Client,
    config: ApiConfig,
    sessions: Arc<dyn SessionStore>,
}

impl HttpBackend {
    pub fn new(config: ApiConfig, sessions: Arc<dyn SessionStore>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| FarmError::Config(format!("HTTP client: {e}")))?;

        Ok(Self {
            client,
            config,
            sessions,
        })
    }

    pub fn from_env(sessions: Arc<dyn SessionStore>) -> Result<Self> {
        Self::new(ApiConfig::from_env(), sessions)
    }

    fn request(&self, method: Method, name: &str) -> Result<RequestBuilder> {
        let request = self.client.request(method, self.config.endpoint(name));
        Ok(match self.sessions.access_token()? {
            Some(token) => request.bearer_auth(token),
            None => request,
        })
    }

    async fn send(&self, name: &str, request: RequestBuilder) -> Result<String> {
        let response = request.send().await.map_err(|e| {
            tracing::warn!(endpoint = name, error = %e, "Backend unreachable");
            FarmError::Transport(e.to_string())
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| FarmError::Transport(e.to_string()))?;

        if !status.is_success() {
            tracing::warn!(endpoint = name, status = status.as_u16(), "Backend error");
            return Err(FarmError::Backend {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }
        tracing::debug!(endpoint = name, status = status.as_u16(), "Backend call");
        Ok(body)
    }

    async fn fetch<T: DeserializeOwned>(&self, name: &str, request: RequestBuilder) -> Result<T> {
        let body = self.send(name, request).await?;
        serde_json::from_str(&body).map_err(|e| FarmError::Decode(format!("{name}: {e}")))
    }

    async fn fetch_optional<T: DeserializeOwned>(
        &self,
        name: &str,
        request: RequestBuilder,
    ) -> Result<Option<T>> {
        let body = self.send(name, request).await?;
        decode_optional(&body).map_err(|e| FarmError::Decode(format!("{name}: {e}")))
    }
}

#[async_trait]
impl BackendApi for HttpBackend {
    async fn stripe_prices(&self) -> Result<Vec<PricePlan>> {
        let request = self.request(Method::GET, "stripePrices")?;
        self.fetch("stripePrices", request).await
    }

    async fn create_customer(&self, request: &CreateCustomerRequest) -> Result<CustomerCreated> {
        let http = self.request(Method::POST, "stripeCustomer")?.json(request);
        self.fetch("stripeCustomer", http).await
    }

    async fn create_subscription(
        &self,
        request: &CreateSubscriptionRequest,
    ) -> Result<SubscriptionResult> {
        let http = self.request(Method::POST, "stripeSubscription")?.json(request);
        self.fetch("stripeSubscription", http).await
    }

    async fn farmer_profile(&self) -> Result<Option<UserSession>> {
        let request = self.request(Method::GET, "farmer")?.query(&[("type", "1")]);
        self.fetch_optional("farmer", request).await
    }

    async fn verify_email(&self, token: &str) -> Result<Option<UserSession>> {
        let request = self.request(Method::GET, "verifyEmail")?.query(&[("token", token)]);
        self.fetch_optional("verifyEmail", request).await
    }

    async fn link_connection(&self, connection_id: &str) -> Result<()> {
        let request = self
            .request(Method::POST, "powenConnection")?
            .json(&serde_json::json!({ "connectionId": connection_id }));
        self.send("powenConnection", request).await.map(|_| ())
    }

    async fn product_names(&self) -> Result<Vec<String>> {
        let request = self.request(Method::GET, "productsName")?;
        self.fetch("productsName", request).await
    }
}

/// Error text from a backend error body: `{"error": "…"}`,
/// `{"error": {"message": "…"}}` or `{"message": "…"}`
pub(crate) fn error_message(body: &str) -> Option<String> {
    #[derive(Deserialize)]
    struct ErrorBody {
        #[serde(default)]
        error: Option<Value>,
        #[serde(default)]
        message: Option<String>,
    }

    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    let message = match parsed.error {
        Some(Value::String(text)) => Some(text),
        Some(Value::Object(map)) => map.get("message").and_then(Value::as_str).map(String::from),
        _ => parsed.message,
    };
    message.filter(|m| !m.trim().is_empty())
}

/// Empty bodies and `null` both mean "no record"
fn decode_optional<T: DeserializeOwned>(body: &str) -> serde_json::Result<Option<T>> {
    if body.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use farm_core::{MemorySessionStore, SubscriptionFlag};

    #[test]
    fn test_error_message_shapes() {
        assert_eq!(
            error_message(r#"{"error":"Your card was declined."}"#).as_deref(),
            Some("Your card was declined.")
        );
        assert_eq!(
            error_message(r#"{"error":{"message":"Invalid price"}}"#).as_deref(),
            Some("Invalid price")
        );
        assert_eq!(error_message(r#"{"message":"Nope"}"#).as_deref(), Some("Nope"));
        assert_eq!(error_message(r#"{"error":""}"#), None);
        assert_eq!(error_message("<html>Bad Gateway</html>"), None);
    }

    #[test]
    fn test_decode_optional() {
        let none: Option<UserSession> = decode_optional("").unwrap();
        assert!(none.is_none());
        let none: Option<UserSession> = decode_optional("null").unwrap();
        assert!(none.is_none());

        let user: Option<UserSession> =
            decode_optional(r#"{"id":3,"email":"a@b.c","subscriptionStatus":"yes"}"#).unwrap();
        let user = user.unwrap();
        assert_eq!(user.id, Some(3));
        assert_eq!(user.subscription_status, SubscriptionFlag::Yes);
    }

    #[test]
    fn test_request_carries_bearer_token() {
        let sessions = Arc::new(MemorySessionStore::authenticated(UserSession {
            access_token: Some("tok".into()),
            ..UserSession::default()
        }));
        let backend = HttpBackend::new(ApiConfig::default(), sessions).unwrap();

        let request = backend
            .request(Method::GET, "stripePrices")
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(request.url().as_str(), "http://localhost:8080/api/stripePrices");
        assert_eq!(
            request.headers().get("authorization").and_then(|v| v.to_str().ok()),
            Some("Bearer tok")
        );
    }

    #[test]
    fn test_anonymous_request_has_no_token() {
        let backend =
            HttpBackend::new(ApiConfig::default(), Arc::new(MemorySessionStore::new())).unwrap();
        let request = backend
            .request(Method::GET, "verifyEmail")
            .unwrap()
            .query(&[("token", "a b")])
            .build()
            .unwrap();

        assert!(request.headers().get("authorization").is_none());
        assert_eq!(request.url().query(), Some("token=a+b"));
    }
}
