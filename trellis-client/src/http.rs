//! reqwest-backed [`Requestor`] implementation.

use crate::error::{ClientError, ClientResult};
use crate::requestor::{Method, Request, Requestor, Response, TokenSource, UnauthorizedObserver};
use async_trait::async_trait;
use parking_lot::RwLock;
use reqwest::Client;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Configuration for the HTTP transport.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// API base URL, without a trailing slash.
    pub base_url: String,
    /// Application credential sent with every request.
    pub app_token: Option<String>,
    /// Request timeout in seconds. Timeout policy belongs to this transport;
    /// the session and sync layers impose none of their own.
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.trellis.app/v1".to_string(),
            app_token: None,
            timeout_secs: 60,
        }
    }
}

/// Production requestor backed by reqwest.
///
/// Attaches the application token and, when a [`TokenSource`] is wired, the
/// current session token. Unsuccessful statuses are mapped to
/// [`ClientError`] kinds per the wire contract: 401/403 to
/// `AuthenticationRejected`, 404 to `NotFound`, 409 to `AlreadyExists`.
pub struct HttpRequestor {
    config: HttpConfig,
    client: Client,
    tokens: RwLock<Option<Arc<dyn TokenSource>>>,
    unauthorized: RwLock<Option<Arc<dyn UnauthorizedObserver>>>,
}

impl HttpRequestor {
    /// Creates a new requestor.
    pub fn new(config: HttpConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ClientError::Transport(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            config,
            client,
            tokens: RwLock::new(None),
            unauthorized: RwLock::new(None),
        })
    }

    /// Wires the source of the session token attached to requests.
    pub fn set_token_source(&self, source: Arc<dyn TokenSource>) {
        *self.tokens.write() = Some(source);
    }

    /// Wires the observer notified when the server rejects the session.
    pub fn set_unauthorized_observer(&self, observer: Arc<dyn UnauthorizedObserver>) {
        *self.unauthorized.write() = Some(observer);
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }
}

#[async_trait]
impl Requestor for HttpRequestor {
    async fn request(&self, request: Request) -> ClientResult<Response> {
        let url = self.url_for(&request.path);
        let mut builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
            Method::Delete => self.client.delete(&url),
        };

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(app_token) = &self.config.app_token {
            builder = builder.header("X-App-Token", app_token);
        }
        let token = self.tokens.read().as_ref().and_then(|s| s.current_token());
        if let Some(token) = &token {
            builder = builder.header("X-User-Token", token.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        debug!(method = ?request.method, path = %request.path, "issuing request");

        let response = builder
            .send()
            .await
            .map_err(|e| ClientError::Transport(format!("request failed: {e}")))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.to_string(), value.to_string()))
            })
            .collect::<HashMap<_, _>>();

        let text = response
            .text()
            .await
            .map_err(|e| ClientError::Transport(format!("failed to read response body: {e}")))?;
        let content: Value = serde_json::from_str(&text).unwrap_or(Value::Null);

        if (200..300).contains(&status) {
            return Ok(Response {
                content,
                status,
                headers,
            });
        }

        let message = content
            .get("error")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or(text);

        match status {
            401 | 403 => {
                if status == 401 && request.allow_deauthorization {
                    let observer = self.unauthorized.read().as_ref().cloned();
                    if let Some(observer) = observer {
                        warn!(path = %request.path, "session rejected by server");
                        observer.on_unauthorized();
                    }
                }
                Err(ClientError::AuthenticationRejected(message))
            }
            404 => Err(ClientError::NotFound(message)),
            409 => Err(ClientError::AlreadyExists(message)),
            _ => Err(ClientError::Api { status, message }),
        }
    }
}
