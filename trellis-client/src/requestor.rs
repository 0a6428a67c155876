//! The [`Requestor`] trait and its request/response value types.

use crate::error::ClientResult;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use trellis_types::Token;

/// HTTP method subset used by the protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Delete,
}

/// A single request to the service.
#[derive(Debug, Clone)]
pub struct Request {
    /// HTTP method.
    pub method: Method,
    /// Path relative to the API base URL, without a leading slash.
    pub path: String,
    /// Query string parameters.
    pub query: Vec<(String, String)>,
    /// JSON body, if any.
    pub body: Option<Value>,
    /// When false, a 401 on this request must not trigger the automatic
    /// session invalidation. The deauthorize call itself sets this to false
    /// to avoid recursing into itself.
    pub allow_deauthorization: bool,
}

impl Request {
    fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            allow_deauthorization: true,
        }
    }

    /// Creates a GET request.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    /// Creates a POST request.
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    /// Creates a DELETE request.
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    /// Appends a query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Sets the JSON body.
    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Suppresses automatic deauthorization on a 401 response.
    pub fn without_deauthorization(mut self) -> Self {
        self.allow_deauthorization = false;
        self
    }
}

/// A parsed response from the service. Always carries a success status;
/// error statuses are mapped to [`ClientError`](crate::ClientError) kinds by
/// the requestor.
#[derive(Debug, Clone)]
pub struct Response {
    /// The response body parsed as JSON (`Null` when the body was empty or
    /// not JSON).
    pub content: Value,
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: HashMap<String, String>,
}

impl Response {
    /// The `data` payload as an array, if present.
    pub fn data_array(&self) -> Option<&Vec<Value>> {
        self.content.get("data").and_then(Value::as_array)
    }

    /// A keyed object inside the `data` payload, if present.
    pub fn data_object(&self, key: &str) -> Option<&Value> {
        self.content.get("data").and_then(|data| data.get(key))
    }

    /// The `metadata` envelope, if present.
    pub fn metadata(&self) -> Option<&Value> {
        self.content.get("metadata")
    }
}

/// Performs authenticated HTTP calls against the service.
#[async_trait]
pub trait Requestor: Send + Sync {
    /// Issues one request and returns the parsed response.
    async fn request(&self, request: Request) -> ClientResult<Response>;
}

/// Provides the current session token to the transport without coupling it
/// to the token lifecycle layer.
pub trait TokenSource: Send + Sync {
    /// Returns the cached session token, if any. Must not block on I/O.
    fn current_token(&self) -> Option<Token>;
}

/// Observer notified when the server rejects the session (401) on a request
/// that allows automatic deauthorization.
pub trait UnauthorizedObserver: Send + Sync {
    /// Called once per rejected request. Fire-and-forget; implementations
    /// typically schedule a local deauthorize.
    fn on_unauthorized(&self);
}

/// Scriptable requestor for tests.
pub mod mock {
    use super::{Request, Requestor, Response};
    use crate::error::{ClientError, ClientResult};
    use async_trait::async_trait;
    use serde_json::Value;
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// A requestor that returns scripted results in order and records every
    /// request it was asked to perform.
    #[derive(Default)]
    pub struct MockRequestor {
        requests: Mutex<Vec<Request>>,
        script: Mutex<VecDeque<ClientResult<Response>>>,
        delay: Mutex<Option<Duration>>,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl MockRequestor {
        /// Creates an empty mock with no scripted responses.
        pub fn new() -> Self {
            Self::default()
        }

        /// Queues the next result to return.
        pub fn enqueue(&self, result: ClientResult<Response>) {
            self.script.lock().unwrap().push_back(result);
        }

        /// Queues a success response with the given JSON content.
        pub fn enqueue_json(&self, content: Value) {
            self.enqueue(Ok(Response {
                content,
                status: 200,
                headers: HashMap::new(),
            }));
        }

        /// Queues an error.
        pub fn enqueue_error(&self, error: ClientError) {
            self.enqueue(Err(error));
        }

        /// Adds an artificial service delay to every request, which gives
        /// concurrent callers a chance to overlap.
        pub fn set_delay(&self, delay: Duration) {
            *self.delay.lock().unwrap() = Some(delay);
        }

        /// All requests issued so far.
        pub fn requests(&self) -> Vec<Request> {
            self.requests.lock().unwrap().clone()
        }

        /// Number of requests issued so far.
        pub fn request_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }

        /// Highest number of requests ever in flight at the same time.
        pub fn max_in_flight(&self) -> usize {
            self.max_in_flight.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Requestor for MockRequestor {
        async fn request(&self, request: Request) -> ClientResult<Response> {
            self.requests.lock().unwrap().push(request);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            let delay = *self.delay.lock().unwrap();
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(ClientError::Transport("no scripted response".to_string())))
        }
    }
}
