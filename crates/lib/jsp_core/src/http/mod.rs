//! Outbound HTTP with credential decoration and failure classification.
//!
//! Every request reads the token from the [`TokenStore`] and sends it as a
//! bearer credential when present. Responses are classified by status:
//!
//! - `2xx` → success
//! - `401` → [`ClientError::Unauthorized`], body ignored
//! - anything else → [`ClientError::Server`] with the body's `message`, if any
//!
//! Delivery is at-most-once: no retry, no de-duplication.

pub mod transport;

use std::sync::Arc;

pub use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

pub use transport::{ApiRequest, ApiResponse, ReqwestTransport, Transport, TransportError};

use crate::config::ClientConfig;
use crate::token_store::{FileTokenStore, TokenStore};

/// Shown for transport failures; the cause is only logged.
pub const NETWORK_ERROR_MESSAGE: &str = "Impossible de joindre le serveur, veuillez réessayer.";

/// Shown when the session was rejected by the backend.
pub const SESSION_EXPIRED_MESSAGE: &str = "Session expirée, veuillez vous reconnecter.";

/// Used when a failed response carries no `message`.
pub const DEFAULT_SERVER_MESSAGE: &str = "Une erreur est survenue";

/// Classified request failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Server error {status}: {}", .message.as_deref().unwrap_or(DEFAULT_SERVER_MESSAGE))]
    Server {
        status: u16,
        message: Option<String>,
    },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl ClientError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ClientError::Unauthorized)
    }

    /// Text for the presentation layer: the server's own message verbatim,
    /// otherwise `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ClientError::Unauthorized => SESSION_EXPIRED_MESSAGE.to_string(),
            ClientError::Network(_) => NETWORK_ERROR_MESSAGE.to_string(),
            ClientError::Server {
                message: Some(message),
                ..
            } => message.clone(),
            ClientError::Server { message: None, .. } | ClientError::InvalidResponse(_) => {
                fallback.to_string()
            }
        }
    }
}

/// Outcome of a status code, independent of the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    Success,
    Unauthorized,
    Failure,
}

/// Classify a response status.
pub fn classify_status(status: u16) -> StatusClass {
    match status {
        200..=299 => StatusClass::Success,
        401 => StatusClass::Unauthorized,
        _ => StatusClass::Failure,
    }
}

/// Extract the `message` field of a JSON error body.
fn server_message(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    value
        .get("message")
        .and_then(|m| m.as_str())
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
}

/// Credential-decorating HTTP client.
#[derive(Clone)]
pub struct HttpClient {
    transport: Arc<dyn Transport>,
    tokens: Arc<dyn TokenStore>,
}

impl HttpClient {
    pub fn new(transport: Arc<dyn Transport>, tokens: Arc<dyn TokenStore>) -> Self {
        Self { transport, tokens }
    }

    /// `reqwest` transport and file token store, as configured.
    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(
            Arc::new(ReqwestTransport::new(config.base_url.clone())),
            Arc::new(FileTokenStore::new(&config.token_path)),
        )
    }

    pub fn token_store(&self) -> &Arc<dyn TokenStore> {
        &self.tokens
    }

    /// Send a request and classify the response.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<ApiResponse, ClientError> {
        let request = ApiRequest {
            method: method.clone(),
            path: path.to_string(),
            bearer: self.tokens.read(),
            body,
        };
        let authenticated = request.bearer.is_some();

        let resp = self.transport.send(request).await.map_err(|e| {
            debug!(%method, path, "request failed: {e}");
            ClientError::Network(e.0)
        })?;

        debug!(%method, path, status = resp.status, authenticated, "request completed");

        match classify_status(resp.status) {
            StatusClass::Success => Ok(resp),
            StatusClass::Unauthorized => Err(ClientError::Unauthorized),
            StatusClass::Failure => Err(ClientError::Server {
                status: resp.status,
                message: server_message(&resp.body),
            }),
        }
    }

    /// `GET` a JSON document.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let resp = self.request(Method::GET, path, None).await?;
        decode(path, &resp.body)
    }

    /// `GET` a JSON array. A body that is not an array yields an empty list.
    pub async fn get_list<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, ClientError> {
        let value: serde_json::Value = self.get_json(path).await?;
        match value {
            serde_json::Value::Array(_) => serde_json::from_value(value)
                .map_err(|e| ClientError::InvalidResponse(format!("{path}: {e}"))),
            other => {
                debug!(path, kind = json_kind(&other), "expected an array, using empty list");
                Ok(Vec::new())
            }
        }
    }

    /// `POST` a JSON body and decode the JSON answer.
    pub async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let body = serde_json::to_value(body)
            .map_err(|e| ClientError::InvalidResponse(format!("encoding request: {e}")))?;
        let resp = self.request(Method::POST, path, Some(body)).await?;
        decode(path, &resp.body)
    }

    /// `POST` without a body, ignoring the answer.
    pub async fn post(&self, path: &str) -> Result<(), ClientError> {
        self.request(Method::POST, path, None).await.map(|_| ())
    }

    /// `DELETE`, ignoring the answer.
    pub async fn delete(&self, path: &str) -> Result<(), ClientError> {
        self.request(Method::DELETE, path, None).await.map(|_| ())
    }
}

fn decode<T: DeserializeOwned>(path: &str, body: &[u8]) -> Result<T, ClientError> {
    // An empty success body decodes like `null`.
    let body: &[u8] = if body.iter().all(u8::is_ascii_whitespace) {
        b"null"
    } else {
        body
    };
    serde_json::from_slice(body).map_err(|e| ClientError::InvalidResponse(format!("{path}: {e}")))
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::test_support::ScriptedTransport;
    use crate::token_store::MemoryTokenStore;

    fn client(transport: &Arc<ScriptedTransport>, token: Option<&str>) -> HttpClient {
        let store = match token {
            Some(t) => MemoryTokenStore::with_token(t),
            None => MemoryTokenStore::new(),
        };
        HttpClient::new(transport.clone(), Arc::new(store))
    }

    #[test]
    fn status_classification() {
        assert_eq!(classify_status(200), StatusClass::Success);
        assert_eq!(classify_status(204), StatusClass::Success);
        assert_eq!(classify_status(401), StatusClass::Unauthorized);
        assert_eq!(classify_status(403), StatusClass::Failure);
        assert_eq!(classify_status(500), StatusClass::Failure);
        assert_eq!(classify_status(302), StatusClass::Failure);
    }

    #[tokio::test]
    async fn attaches_bearer_token_when_present() {
        let transport = ScriptedTransport::new();
        transport.respond(Method::GET, "/quiz", 200, json!([]));

        client(&transport, Some("tok")).get_json::<serde_json::Value>("/quiz").await.unwrap();
        client(&transport, None).get_json::<serde_json::Value>("/quiz").await.unwrap();

        let calls = transport.calls();
        assert_eq!(calls[0].bearer.as_deref(), Some("tok"));
        assert_eq!(calls[1].bearer, None);
    }

    #[tokio::test]
    async fn unauthorized_ignores_body() {
        let transport = ScriptedTransport::new();
        transport.respond(Method::GET, "/auth/me", 401, json!({ "message": "expired" }));

        let err = client(&transport, Some("old"))
            .get_json::<serde_json::Value>("/auth/me")
            .await
            .unwrap_err();
        assert_eq!(err, ClientError::Unauthorized);
    }

    #[tokio::test]
    async fn server_errors_carry_status_and_message() {
        let transport = ScriptedTransport::new();
        transport.respond(Method::POST, "/cours/5/suivre", 409, json!({ "message": "Déjà inscrit" }));
        transport.respond_raw(Method::DELETE, "/cours/5/suivre", 500, b"<html>oops</html>".to_vec());

        let c = client(&transport, Some("tok"));
        let err = c.post("/cours/5/suivre").await.unwrap_err();
        assert_eq!(
            err,
            ClientError::Server {
                status: 409,
                message: Some("Déjà inscrit".into())
            }
        );
        assert_eq!(err.user_message("fallback"), "Déjà inscrit");

        let err = c.delete("/cours/5/suivre").await.unwrap_err();
        assert_eq!(err, ClientError::Server { status: 500, message: None });
        assert_eq!(err.user_message("fallback"), "fallback");
        assert_eq!(err.to_string(), format!("Server error 500: {DEFAULT_SERVER_MESSAGE}"));
    }

    #[tokio::test]
    async fn transport_failures_are_network_errors() {
        let transport = ScriptedTransport::new();
        transport.fail(Method::GET, "/cours");

        let err = client(&transport, None).get_list::<serde_json::Value>("/cours").await.unwrap_err();
        assert!(matches!(err, ClientError::Network(_)));
        assert_eq!(err.user_message("fallback"), NETWORK_ERROR_MESSAGE);
    }

    #[tokio::test]
    async fn non_array_list_body_is_empty() {
        let transport = ScriptedTransport::new();
        transport.respond(Method::GET, "/cours", 200, json!({ "items": [1, 2] }));

        let list: Vec<serde_json::Value> = client(&transport, None).get_list("/cours").await.unwrap();
        assert!(list.is_empty());
    }

    #[tokio::test]
    async fn empty_success_body_is_accepted_for_mutations() {
        let transport = ScriptedTransport::new();
        transport.respond_raw(Method::POST, "/cours/1/suivre", 204, Vec::new());

        client(&transport, Some("tok")).post("/cours/1/suivre").await.unwrap();
        assert_eq!(transport.count(Method::POST, "/cours/1/suivre"), 1);
    }

    #[tokio::test]
    async fn malformed_success_body_is_invalid_response() {
        let transport = ScriptedTransport::new();
        transport.respond(Method::GET, "/quiz", 200, json!([{ "titre": "no id" }]));

        let err = client(&transport, None)
            .get_list::<crate::models::RawQuiz>("/quiz")
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::InvalidResponse(_)));
        assert_eq!(err.user_message("Erreur"), "Erreur");
    }
}
