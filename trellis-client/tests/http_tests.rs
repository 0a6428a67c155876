use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use trellis_client::{
    ClientError, HttpConfig, HttpRequestor, Request, Requestor, TokenSource, UnauthorizedObserver,
};
use trellis_types::Token;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn requestor_for(server: &MockServer) -> HttpRequestor {
    HttpRequestor::new(HttpConfig {
        base_url: server.uri(),
        app_token: Some("app-token-1".to_string()),
        ..Default::default()
    })
    .unwrap()
}

struct FixedToken(Token);

impl TokenSource for FixedToken {
    fn current_token(&self) -> Option<Token> {
        Some(self.0.clone())
    }
}

#[derive(Default)]
struct CountingObserver {
    calls: AtomicUsize,
}

impl UnauthorizedObserver for CountingObserver {
    fn on_unauthorized(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

// ── Config defaults ─────────────────────────────────────────────

#[test]
fn http_config_default() {
    let config = HttpConfig::default();
    assert_eq!(config.base_url, "https://api.trellis.app/v1");
    assert!(config.app_token.is_none());
    assert_eq!(config.timeout_secs, 60);
}

// ── Success path ────────────────────────────────────────────────

#[tokio::test]
async fn success_response_is_parsed_as_json() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ping"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": [{"muid": "a"}],
            "metadata": {"model_version": 1}
        })))
        .mount(&server)
        .await;

    let requestor = requestor_for(&server);
    let response = requestor.request(Request::get("ping")).await.unwrap();
    assert_eq!(response.status, 200);
    assert_eq!(response.data_array().unwrap().len(), 1);
}

#[tokio::test]
async fn app_token_header_is_attached() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ping"))
        .and(header("X-App-Token", "app-token-1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let requestor = requestor_for(&server);
    requestor.request(Request::get("ping")).await.unwrap();
}

#[tokio::test]
async fn session_token_header_is_attached_when_source_is_wired() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ping"))
        .and(header("X-User-Token", "tok-42"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let requestor = requestor_for(&server);
    requestor.set_token_source(Arc::new(FixedToken(Token::new("tok-42"))));
    requestor.request(Request::get("ping")).await.unwrap();
}

#[tokio::test]
async fn query_parameters_are_forwarded() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/self/links"))
        .and(query_param("last_model_version", "3"))
        .and(query_param("offset", "100"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let requestor = requestor_for(&server);
    requestor
        .request(
            Request::get("users/self/links")
                .query("last_model_version", 3)
                .query("offset", 100),
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn json_body_is_forwarded() {
    let server = MockServer::start().await;
    let body = serde_json::json!({ "data": [{"muid": "l-1"}] });

    Mock::given(method("POST"))
        .and(path("/links/batched"))
        .and(body_json(body.clone()))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let requestor = requestor_for(&server);
    requestor
        .request(Request::post("links/batched").body(body))
        .await
        .unwrap();
}

#[tokio::test]
async fn non_json_body_becomes_null_content() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ping"))
        .respond_with(ResponseTemplate::new(200).set_body_string("pong"))
        .mount(&server)
        .await;

    let requestor = requestor_for(&server);
    let response = requestor.request(Request::get("ping")).await.unwrap();
    assert!(response.content.is_null());
}

// ── Status mapping ──────────────────────────────────────────────

#[tokio::test]
async fn unauthorized_maps_to_authentication_rejected() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ping"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(serde_json::json!({"error": "session expired"})),
        )
        .mount(&server)
        .await;

    let requestor = requestor_for(&server);
    let result = requestor.request(Request::get("ping")).await;
    match result {
        Err(ClientError::AuthenticationRejected(message)) => {
            assert_eq!(message, "session expired");
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn not_found_maps_to_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/media/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let requestor = requestor_for(&server);
    let result = requestor.request(Request::get("media/missing")).await;
    assert!(matches!(result, Err(ClientError::NotFound(_))));
}

#[tokio::test]
async fn conflict_maps_to_already_exists() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/users"))
        .respond_with(ResponseTemplate::new(409))
        .mount(&server)
        .await;

    let requestor = requestor_for(&server);
    let result = requestor.request(Request::post("users")).await;
    assert!(matches!(result, Err(ClientError::AlreadyExists(_))));
}

#[tokio::test]
async fn other_failures_map_to_api_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ping"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal"))
        .mount(&server)
        .await;

    let requestor = requestor_for(&server);
    let result = requestor.request(Request::get("ping")).await;
    match result {
        Err(ClientError::Api { status, message }) => {
            assert_eq!(status, 500);
            assert_eq!(message, "internal");
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn connection_failure_maps_to_transport() {
    // Point at a server that was already shut down.
    let server = MockServer::start().await;
    let uri = server.uri();
    drop(server);

    let requestor = HttpRequestor::new(HttpConfig {
        base_url: uri,
        ..Default::default()
    })
    .unwrap();
    let result = requestor.request(Request::get("ping")).await;
    assert!(matches!(result, Err(ClientError::Transport(_))));
}

// ── Unauthorized observer ───────────────────────────────────────

#[tokio::test]
async fn observer_notified_on_401_when_allowed() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ping"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let requestor = requestor_for(&server);
    let observer = Arc::new(CountingObserver::default());
    requestor.set_unauthorized_observer(observer.clone());

    let _ = requestor.request(Request::get("ping")).await;
    assert_eq!(observer.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn observer_suppressed_when_deauthorization_disallowed() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/sessions/current/invalidate"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let requestor = requestor_for(&server);
    let observer = Arc::new(CountingObserver::default());
    requestor.set_unauthorized_observer(observer.clone());

    let _ = requestor
        .request(Request::post("sessions/current/invalidate").without_deauthorization())
        .await;
    assert_eq!(observer.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn observer_not_notified_on_403() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ping"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let requestor = requestor_for(&server);
    let observer = Arc::new(CountingObserver::default());
    requestor.set_unauthorized_observer(observer.clone());

    let result = requestor.request(Request::get("ping")).await;
    assert!(matches!(result, Err(ClientError::AuthenticationRejected(_))));
    assert_eq!(observer.calls.load(Ordering::SeqCst), 0);
}
