//! Session token lifecycle.
//!
//! Locking discipline:
//! - [`TokenCell`] guards every read and mutation of the cached value; its
//!   critical section is brief and free of I/O.
//! - `auth_lock` serializes whole authorize/deauthorize flows, from request
//!   dispatch to cache commit, so two flows can never interleave and lose
//!   an update. [`TokenManager::current_token`] never touches it.
//! - The change event is emitted inside the cell's critical section; the
//!   persistence write happens after it, still under `auth_lock`, so store
//!   writes land in commit order.

use crate::cell::TokenCell;
use crate::store::{AccessPolicy, SecureTokenStore, StoreStatus};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, warn};
use trellis_client::{ClientResult, Request, Requestor, TokenSource};
use trellis_types::{ClientEvent, EventSink, Token};

/// Delays between persisted-token read retries after a transient failure.
const READ_RETRY_DELAYS: [Duration; 2] =
    [Duration::from_millis(500), Duration::from_millis(1500)];

/// Configuration for the token lifecycle.
#[derive(Debug, Clone)]
pub struct TokenManagerConfig {
    /// Secure-store key under which the session token is persisted.
    pub token_key: String,
    /// Device identifier bound into authorization requests.
    pub device_name: String,
}

impl Default for TokenManagerConfig {
    fn default() -> Self {
        Self {
            token_key: "trellis.session-token".to_string(),
            device_name: "Trellis Client".to_string(),
        }
    }
}

/// Login credentials. Transient; never persisted by this crate.
#[derive(Clone)]
pub struct Credentials {
    /// Account identity, typically an email address.
    pub identifier: String,
    /// Account secret, typically a password.
    pub secret: String,
}

impl Credentials {
    /// Creates credentials from an identity and a secret.
    pub fn new(identifier: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            secret: secret.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("identifier", &self.identifier)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Multi-factor challenge returned alongside (or instead of) a token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MfaChallenge {
    /// Challenge kind, e.g. "totp" or "email".
    #[serde(rename = "type")]
    pub challenge_type: Option<String>,
    /// Token to resume the flow with
    /// [`TokenManager::authorize_with_retry_token`].
    pub retry_token: Option<String>,
    /// Any additional challenge fields the server included.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Result of an authorization attempt.
#[derive(Debug, Clone)]
pub struct AuthOutcome {
    /// The session token, when the server granted one.
    pub token: Option<Token>,
    /// A multi-factor challenge, when the server requires another step.
    pub mfa: Option<MfaChallenge>,
}

/// Owns the session token: caching, persistence, authorization flows and
/// change notification.
pub struct TokenManager {
    config: TokenManagerConfig,
    cell: TokenCell,
    auth_lock: Mutex<()>,
    requestor: Arc<dyn Requestor>,
    store: Arc<dyn SecureTokenStore>,
    events: Arc<dyn EventSink>,
}

impl TokenManager {
    /// Creates a manager with an empty cache; call
    /// [`bootstrap`](TokenManager::bootstrap) to restore a persisted
    /// session.
    pub fn new(
        config: TokenManagerConfig,
        requestor: Arc<dyn Requestor>,
        store: Arc<dyn SecureTokenStore>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            config,
            cell: TokenCell::new(),
            auth_lock: Mutex::new(()),
            requestor,
            store,
            events,
        }
    }

    /// Restores the persisted session token into the cache.
    ///
    /// Runs once at process start; safe to call again later — it re-reads
    /// the store and re-compares. Holds the authorization lock so a restore
    /// cannot interleave with an in-flight authorize.
    pub async fn bootstrap(&self) {
        let _flow = self.auth_lock.lock().await;
        let restored = self.read_persisted_token().await;
        if self
            .cell
            .compare_and_set(restored, |token| self.emit_change(token))
        {
            debug!("cached session token updated from persisted store");
        }
    }

    /// Returns the cached token. Never blocks on I/O or on an in-flight
    /// authorization.
    pub fn current_token(&self) -> Option<Token> {
        self.cell.read()
    }

    /// Authorizes with identity + secret credentials.
    pub async fn authorize_with_credentials(
        &self,
        credentials: &Credentials,
    ) -> ClientResult<AuthOutcome> {
        self.authorize(json!({
            "identity": { "email": credentials.identifier },
            "secret": { "password": credentials.secret },
        }))
        .await
    }

    /// Authorizes with an onboarding token only — no identity fields, which
    /// is what anonymous account creation uses.
    pub async fn authorize_with_onboarding_token(
        &self,
        token: &str,
    ) -> ClientResult<AuthOutcome> {
        self.authorize(json!({
            "secret": { "onboarding_token": token },
        }))
        .await
    }

    /// Resumes a partially completed authorization flow, optionally
    /// answering a challenge with an activation token.
    pub async fn authorize_with_retry_token(
        &self,
        retry_token: &str,
        activation_token: Option<&str>,
    ) -> ClientResult<AuthOutcome> {
        let body = match activation_token {
            Some(activation) => json!({
                "identity": { "retry_token": retry_token },
                "secret": { "activation_token": activation },
            }),
            None => json!({
                "identity": { "retry_token": retry_token },
            }),
        };
        self.authorize(body).await
    }

    /// Invalidates the current session, or every session when `all`.
    ///
    /// Best-effort: whatever the server answers, the local cache is cleared
    /// and the persisted copy deleted — local state must not outlive an
    /// invalidation attempt. Calling this while unauthenticated is an
    /// immediate no-op success with no network traffic.
    pub async fn deauthorize(&self, all: bool) -> ClientResult<()> {
        if self.cell.read().is_none() {
            return Ok(());
        }
        let _flow = self.auth_lock.lock().await;
        let path = if all {
            "sessions/invalidate"
        } else {
            "sessions/current/invalidate"
        };
        let result = self
            .requestor
            .request(Request::post(path).without_deauthorization())
            .await;
        self.commit(None);
        result.map(|_| ())
    }

    /// Shared authorize routine: one serialized network exchange, then a
    /// cache commit on success.
    async fn authorize(&self, body: Value) -> ClientResult<AuthOutcome> {
        let _flow = self.auth_lock.lock().await;

        let body = self.with_device_identity(body);
        let response = self
            .requestor
            .request(
                Request::post("sessions/create")
                    .query("is_non_cookies", "true")
                    .body(body),
            )
            .await?;

        let token = response
            .content
            .get("token")
            .and_then(Value::as_str)
            .map(Token::new);
        let mfa = response
            .content
            .get("mfa")
            .cloned()
            .and_then(|value| serde_json::from_value::<MfaChallenge>(value).ok());

        self.commit(token.clone());
        Ok(AuthOutcome { token, mfa })
    }

    /// Binds the device identifier into the request's identity object.
    fn with_device_identity(&self, mut body: Value) -> Value {
        if let Some(root) = body.as_object_mut() {
            let identity = root
                .entry("identity")
                .or_insert_with(|| Value::Object(Map::new()));
            if let Some(identity) = identity.as_object_mut() {
                identity.insert(
                    "device".to_string(),
                    Value::String(self.config.device_name.clone()),
                );
            }
        }
        body
    }

    /// Commits a new cached value: swap + event under the cell lock, then
    /// the persistence write. No-op when the value is unchanged.
    fn commit(&self, next: Option<Token>) {
        let changed = self
            .cell
            .compare_and_set(next.clone(), |token| self.emit_change(token));
        if changed {
            self.persist(next.as_ref());
        }
    }

    fn emit_change(&self, token: Option<&Token>) {
        self.events.emit(ClientEvent::AuthorizationStatusChanged {
            token: token.cloned(),
        });
    }

    /// Writes the token to the secure store, or deletes the entry when
    /// absent. Write failures are logged and swallowed: the in-memory cache
    /// stays authoritative for the rest of the process lifetime, and the
    /// next effective change re-attempts the write.
    fn persist(&self, token: Option<&Token>) {
        match token {
            Some(token) => {
                let committed = self.store.set(
                    &self.config.token_key,
                    token.as_str(),
                    AccessPolicy::WhenUnlockedThisDevice,
                );
                if !committed {
                    warn!("failed to persist session token; keeping in-memory value");
                }
            }
            None => self.store.delete(&self.config.token_key),
        }
    }

    /// Reads the persisted token, retrying transient store failures with an
    /// escalating delay. The last attempt's value is returned even if that
    /// attempt also failed — a best-available answer beats blocking on a
    /// flaky store.
    async fn read_persisted_token(&self) -> Option<Token> {
        let mut read = self.store.get(&self.config.token_key);
        for delay in READ_RETRY_DELAYS {
            if read.status != StoreStatus::TransientFailure {
                break;
            }
            warn!(?delay, "secure store read failed, retrying");
            tokio::time::sleep(delay).await;
            read = self.store.get(&self.config.token_key);
        }
        if read.status == StoreStatus::TransientFailure {
            warn!("secure store still failing after retries, proceeding without a persisted token");
        }
        read.value.map(Token::new)
    }
}

impl TokenSource for TokenManager {
    fn current_token(&self) -> Option<Token> {
        self.cell.read()
    }
}
