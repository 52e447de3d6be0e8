use std::net::SocketAddr;
use std::time::Duration;

use axum::http::HeaderValue;
use axum::routing::{delete, get, post};
use axum::Router;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use solace_store::retention::RetentionSweep;
use solace_store::Database;

use crate::handlers::{self, AppState};

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub port: u16,
    /// `*` anywhere in the list allows every origin.
    pub cors_origins: Vec<String>,
    pub request_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8001,
            cors_origins: vec!["*".to_string()],
            request_timeout: Duration::from_secs(60),
        }
    }
}

/// Build the Axum router with all routes.
pub fn build_router(state: AppState, config: &ServerConfig) -> Router {
    Router::new()
        .route("/api", get(handlers::root))
        .route("/api/", get(handlers::root))
        .route("/api/health", get(handlers::health))
        .route("/api/session", post(handlers::create_session))
        .route("/api/session/{id}", get(handlers::get_session))
        .route("/api/session/{id}/data", delete(handlers::delete_session_data))
        .route("/api/chat", post(handlers::chat))
        .route("/api/chat/{id}/history", get(handlers::chat_history))
        .route("/api/mood", post(handlers::log_mood))
        .route("/api/mood/{id}/history", get(handlers::mood_history))
        .route("/api/sentiment/{id}/trends", get(handlers::sentiment_trends))
        .route("/api/resources", get(handlers::resources))
        .with_state(state)
        .layer(TimeoutLayer::new(config.request_timeout))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config.cors_origins))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Purge idle sessions once. Failures are logged and reported as zero.
pub fn run_retention_sweep(db: &Database, retention_days: u32) -> usize {
    match RetentionSweep::new(db.clone()).run(retention_days) {
        Ok(purged) => purged,
        Err(e) => {
            error!(error = %e, "retention sweep failed");
            0
        }
    }
}

/// Bind and start serving. Returns a handle to shut it down.
pub async fn start(config: &ServerConfig, state: AppState) -> Result<ServerHandle, std::io::Error> {
    let router = build_router(state, config);
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let local_addr = listener.local_addr()?;

    info!(port = local_addr.port(), "Solace server started");

    let shutdown = CancellationToken::new();
    let signal = shutdown.clone();
    let join = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router)
            .with_graceful_shutdown(async move { signal.cancelled().await })
            .await
        {
            error!(error = %e, "server terminated with error");
        }
    });

    Ok(ServerHandle {
        port: local_addr.port(),
        shutdown,
        join,
    })
}

/// Handle returned by `start()`.
pub struct ServerHandle {
    pub port: u16,
    shutdown: CancellationToken,
    join: JoinHandle<()>,
}

impl ServerHandle {
    /// Stop accepting connections and wait for in-flight requests.
    pub async fn shutdown(self) {
        self.shutdown.cancel();
        if let Err(e) = self.join.await {
            error!(error = %e, "server task panicked");
        }
        info!("Solace server stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use chrono::Utc;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use solace_core::errors::GatewayError;
    use solace_engine::policy::{CRISIS_FALLBACK, GENERIC_FALLBACK};
    use solace_engine::{ResponsePolicy, SqliteConversationStore};
    use solace_llm::{MockGenerator, MockResponse};
    use solace_store::messages::{MessageRepo, NewMessage};
    use solace_store::sessions::SessionRepo;

    fn state_with(mock: MockGenerator) -> (AppState, Database) {
        let db = Database::in_memory().unwrap();
        let store = Arc::new(SqliteConversationStore::new(db.clone()));
        let policy = Arc::new(ResponsePolicy::new(Arc::new(mock), store));
        (AppState::new(db.clone(), policy), db)
    }

    fn app(mock: MockGenerator) -> (Router, Database) {
        let (state, db) = state_with(mock);
        (build_router(state, &ServerConfig::default()), db)
    }

    fn replying(text: &str) -> MockGenerator {
        MockGenerator::always(MockResponse::text(text))
    }

    async fn send(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let response = router.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), 1 << 20).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    #[tokio::test]
    async fn root_and_health() {
        let (router, _) = app(replying("hi"));

        let (status, body) = send(&router, "GET", "/api/", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"message": "Solace API is running"}));

        let (status, body) = send(&router, "GET", "/api/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "healthy"}));
    }

    #[tokio::test]
    async fn create_then_fetch_session() {
        let (router, _) = app(replying("hi"));

        let (status, created) = send(&router, "POST", "/api/session", Some(json!({"nickname": "river"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(created["nickname"], "river");
        let id = created["id"].as_str().unwrap().to_string();
        assert!(id.starts_with("sess_"));

        let (status, fetched) = send(&router, "GET", &format!("/api/session/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn create_session_without_nickname() {
        let (router, _) = app(replying("hi"));
        let (status, created) = send(&router, "POST", "/api/session", Some(json!({}))).await;
        assert_eq!(status, StatusCode::OK);
        assert!(created["nickname"].is_null());
    }

    #[tokio::test]
    async fn missing_session_is_404() {
        let (router, _) = app(replying("hi"));
        let (status, body) = send(&router, "GET", "/api/session/sess_nope", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"detail": "Session not found"}));
    }

    #[tokio::test]
    async fn chat_auto_creates_session_and_persists_both_turns() {
        let (router, db) = app(replying("  That sounds like a lovely day.  "));

        let (status, body) = send(&router, "POST", "/api/chat", Some(json!({"message": "I had a great day at the park"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "That sounds like a lovely day.");
        assert_eq!(body["crisis_detected"], false);
        assert!(body["resources"].is_null());
        assert_eq!(body["sentiment"]["label"], "positive");
        assert!(body["sentiment"].get("emotional_state").is_some());

        let session_id = body["session_id"].as_str().unwrap();
        let sid = solace_core::ids::SessionId::from_raw(session_id);
        assert!(SessionRepo::new(db.clone()).exists(&sid).unwrap());
        assert_eq!(MessageRepo::new(db).count(&sid).unwrap(), 2);
    }

    #[tokio::test]
    async fn crisis_chat_returns_resources_and_fallback() {
        let (router, _) = app(MockGenerator::always(MockResponse::Error(GatewayError::NetworkError(
            "connection reset".into(),
        ))));

        let (status, body) = send(
            &router,
            "POST",
            "/api/chat",
            Some(json!({"message": "I feel hopeless and want to end my life"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["crisis_detected"], true);
        assert_eq!(body["message"], CRISIS_FALLBACK);
        let resources = body["resources"].as_array().unwrap();
        assert_eq!(resources.len(), 3);
        assert_eq!(resources[0]["phone"], "988");
        assert!(resources[0].get("website").is_none());
    }

    #[tokio::test]
    async fn calm_chat_failure_uses_generic_fallback() {
        let (router, _) = app(MockGenerator::always(MockResponse::Error(GatewayError::RateLimited)));
        let (status, body) = send(&router, "POST", "/api/chat", Some(json!({"message": "hello"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], GENERIC_FALLBACK);
    }

    #[tokio::test]
    async fn chat_with_unknown_session_is_404() {
        let (router, _) = app(replying("hi"));
        let (status, body) = send(
            &router,
            "POST",
            "/api/chat",
            Some(json!({"message": "hello", "session_id": "sess_ghost"})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["detail"], "Session not found");
    }

    #[tokio::test]
    async fn chat_without_message_is_rejected() {
        let (router, _) = app(replying("hi"));
        let (status, body) = send(&router, "POST", "/api/chat", Some(json!({"session_id": "sess_x"}))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["detail"].as_str().unwrap().contains("message"));
    }

    #[tokio::test]
    async fn malformed_bodies_get_detail_json() {
        let (router, _) = app(replying("hi"));

        let (status, body) = send(
            &router,
            "POST",
            "/api/mood",
            Some(json!({"mood_score": "high", "session_id": "sess_x"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["detail"].is_string());

        let request = Request::builder()
            .method("POST")
            .uri("/api/chat")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let bytes = axum::body::to_bytes(response.into_body(), 1 << 20).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert!(body["detail"].is_string());
    }

    #[tokio::test]
    async fn bad_query_parameters_get_detail_json() {
        let (router, _) = app(replying("hi"));
        let (status, body) = send(&router, "GET", "/api/chat/sess_x/history?limit=lots", None).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["detail"].is_string());
    }

    #[tokio::test]
    async fn oversized_day_windows_are_rejected() {
        let (router, _) = app(replying("hi"));
        for uri in [
            "/api/mood/sess_x/history?days=4294967295",
            "/api/sentiment/sess_x/trends?days=4294967295",
        ] {
            let (status, body) = send(&router, "GET", uri, None).await;
            assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{uri}");
            assert!(body["detail"].as_str().unwrap().contains("out of range"), "{uri}");
        }
    }

    #[tokio::test]
    async fn history_respects_limit_and_is_chronological() {
        let (router, db) = app(replying("hi"));
        let sid = SessionRepo::new(db.clone()).create(None).unwrap().id;
        let messages = MessageRepo::new(db);
        for text in ["one", "two", "three"] {
            messages.insert(NewMessage::assistant(sid.clone(), text)).unwrap();
        }

        let (status, body) = send(&router, "GET", &format!("/api/chat/{sid}/history?limit=2"), None).await;
        assert_eq!(status, StatusCode::OK);
        let contents: Vec<_> = body.as_array().unwrap().iter().map(|m| m["content"].as_str().unwrap()).collect();
        assert_eq!(contents, ["two", "three"]);

        let (_, body) = send(&router, "GET", &format!("/api/chat/{sid}/history"), None).await;
        assert_eq!(body.as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn mood_validation_and_lookup() {
        let (router, db) = app(replying("hi"));
        let sid = SessionRepo::new(db).create(None).unwrap().id;

        for score in [0, 6, -1] {
            let (status, body) = send(
                &router,
                "POST",
                "/api/mood",
                Some(json!({"mood_score": score, "session_id": sid.as_str()})),
            )
            .await;
            assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "score {score}");
            assert!(body["detail"].as_str().unwrap().contains("between 1 and 5"));
        }

        let (status, _) = send(
            &router,
            "POST",
            "/api/mood",
            Some(json!({"mood_score": 3, "session_id": "sess_ghost"})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, entry) = send(
            &router,
            "POST",
            "/api/mood",
            Some(json!({"mood_score": 4, "note": "walked outside", "session_id": sid.as_str()})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(entry["mood_score"], 4);
        assert_eq!(entry["note"], "walked outside");

        let (status, history) = send(&router, "GET", &format!("/api/mood/{sid}/history?days=7"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(history.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn trends_cover_scored_user_messages() {
        let (router, _) = app(replying("I hear you."));
        let (_, chat) = send(&router, "POST", "/api/chat", Some(json!({"message": "I had a great day at the park"}))).await;
        let sid = chat["session_id"].as_str().unwrap().to_string();

        let (status, report) = send(&router, "GET", &format!("/api/sentiment/{sid}/trends"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(report["summary"]["total_messages"], 1);
        assert_eq!(report["summary"]["days_analyzed"], 7);
        let trends = report["trends"].as_array().unwrap();
        assert_eq!(trends.len(), 1);
        assert_eq!(trends[0]["date"], Utc::now().date_naive().to_string());
        assert_eq!(trends[0]["message_count"], 1);
    }

    #[tokio::test]
    async fn trends_for_empty_session() {
        let (router, _) = app(replying("hi"));
        let (status, report) = send(&router, "GET", "/api/sentiment/sess_none/trends?days=14", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(report["trends"], json!([]));
        assert_eq!(report["summary"]["avg_sentiment"], 0.0);
        assert_eq!(report["summary"]["days_analyzed"], 14);
    }

    #[tokio::test]
    async fn resources_lists_every_category() {
        let (router, _) = app(replying("hi"));
        let (status, body) = send(&router, "GET", "/api/resources", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["crisis"].as_array().unwrap().len(), 3);
        assert!(body["general"].is_array());
        assert!(body["coping_strategies"].is_array());
    }

    #[tokio::test]
    async fn delete_removes_session_data() {
        let (router, db) = app(replying("hi"));
        let (_, chat) = send(&router, "POST", "/api/chat", Some(json!({"message": "hello"}))).await;
        let sid = chat["session_id"].as_str().unwrap().to_string();

        let (status, body) = send(&router, "DELETE", &format!("/api/session/{sid}/data"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"message": "All user data deleted successfully"}));

        let (status, _) = send(&router, "GET", &format!("/api/session/{sid}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let sid = solace_core::ids::SessionId::from_raw(sid);
        assert_eq!(MessageRepo::new(db).count(&sid).unwrap(), 0);

        // deleting again still reports success
        let (status, _) = send(&router, "DELETE", &format!("/api/session/{sid}/data"), None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn cors_with_origin_list_echoes_allowed_origin() {
        let (state, _) = state_with(replying("hi"));
        let config = ServerConfig {
            cors_origins: vec!["http://app.test".into()],
            ..Default::default()
        };
        let router = build_router(state, &config);

        let request = Request::builder()
            .uri("/api/health")
            .header("origin", "http://app.test")
            .body(Body::empty())
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        assert_eq!(
            response.headers().get("access-control-allow-origin").unwrap(),
            "http://app.test"
        );
    }

    #[tokio::test]
    async fn permissive_cors_allows_any_origin() {
        let (router, _) = app(replying("hi"));
        let request = Request::builder()
            .uri("/api/health")
            .header("origin", "http://anywhere.test")
            .body(Body::empty())
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.headers().get("access-control-allow-origin").unwrap(), "*");
    }

    #[test]
    fn retention_sweep_helper_reports_purged_count() {
        let db = Database::in_memory().unwrap();
        let sessions = SessionRepo::new(db.clone());
        let stale = sessions.create(None).unwrap().id;
        sessions
            .set_last_activity(&stale, Utc::now() - chrono::Duration::days(40))
            .unwrap();
        sessions.create(None).unwrap();

        assert_eq!(run_retention_sweep(&db, 30), 1);
        assert_eq!(run_retention_sweep(&db, 30), 0);
    }

    #[tokio::test]
    async fn server_starts_and_serves_health() {
        let (state, _) = state_with(replying("hi"));
        let config = ServerConfig {
            port: 0,
            ..Default::default()
        };

        let handle = start(&config, state).await.unwrap();
        assert!(handle.port > 0);

        let url = format!("http://127.0.0.1:{}/api/health", handle.port);
        let resp = reqwest::get(&url).await.unwrap();
        assert_eq!(resp.status(), 200);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["status"], "healthy");

        handle.shutdown().await;
    }
}
