//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with all handlers
//! - Wire up middleware (request ID, tracing, CORS, body limit, timeout)
//! - Bind the server to a listener and stop on shutdown

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::extract::DefaultBodyLimit;
use axum::http::Request;
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::capture::{IntentRules, Normalizer};
use crate::config::InspectorConfig;
use crate::error::InspectorResult;
use crate::http::request::{RequestIdExt, RequestIdLayer};
use crate::http::{capture, info, proxy};
use crate::lifecycle::shutdown;
use crate::proxy::OutboundProxy;
use crate::security::cors::cors_layer;
use crate::store::CaptureStore;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CaptureStore>,
    pub normalizer: Normalizer,
    pub intent: Arc<IntentRules>,
    pub proxy: OutboundProxy,
}

impl AppState {
    pub fn new(config: &InspectorConfig, store: Arc<dyn CaptureStore>) -> InspectorResult<Self> {
        Ok(Self {
            proxy: OutboundProxy::new(&config.proxy, Arc::clone(&store))?,
            normalizer: Normalizer::new(config.capture.trust_forwarded_for),
            intent: Arc::new(IntentRules {
                fetch_flag: config.capture.fetch_flag.clone(),
                dashboard_host: config.capture.dashboard_host.clone(),
            }),
            store,
        })
    }
}

/// HTTP server for the inspector API.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server backed by `store`.
    pub fn new(config: &InspectorConfig, store: Arc<dyn CaptureStore>) -> InspectorResult<Self> {
        let state = AppState::new(config, store)?;
        let router = Self::build_router(config, state);
        Ok(Self { router })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &InspectorConfig, state: AppState) -> Router {
        Router::new()
            .route(
                "/",
                get(info::service_info)
                    .post(capture::missing_session)
                    .put(capture::missing_session)
                    .patch(capture::missing_session)
                    .delete(capture::missing_session)
                    .fallback(info::not_found),
            )
            .route("/up", get(info::up).fallback(info::not_found))
            .route("/proxy", post(proxy::relay).fallback(info::not_found))
            .route("/api/proxy", post(proxy::relay).fallback(info::not_found))
            .route(
                "/{session_id}",
                post(capture::create)
                    .get(capture::fetch_or_record)
                    .put(capture::record)
                    .patch(capture::record)
                    .delete(capture::record)
                    .fallback(info::not_found),
            )
            .fallback(info::not_found)
            .with_state(state)
            .layer(DefaultBodyLimit::max(config.security.max_body_size))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(cors_layer(&config.security))
            .layer(
                TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                    let request_id = request
                        .request_id()
                        .map(ToString::to_string)
                        .unwrap_or_default();
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        path = %request.uri().path(),
                        request_id = %request_id,
                    )
                }),
            )
            .layer(RequestIdLayer)
    }

    /// The configured router, for driving the service without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown::wait(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::request::X_REQUEST_ID;
    use crate::store::SqliteStore;
    use axum::http::{header, Method, StatusCode};
    use tower::ServiceExt;

    fn server() -> HttpServer {
        let store = Arc::new(SqliteStore::open_in_memory().unwrap());
        HttpServer::new(&InspectorConfig::default(), store).unwrap()
    }

    async fn send(request: Request<Body>) -> axum::response::Response {
        server().router().oneshot(request).await.unwrap()
    }

    #[tokio::test]
    async fn test_up_carries_request_id() {
        let response = send(Request::get("/up").body(Body::empty()).unwrap()).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(X_REQUEST_ID));
    }

    #[tokio::test]
    async fn test_post_without_session_is_bad_request() {
        let response = send(Request::post("/").body(Body::from("{}")).unwrap()).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_blank_session_is_bad_request() {
        let response = send(Request::post("/%20").body(Body::from("{}")).unwrap()).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_path_hits_fallback() {
        let response = send(Request::get("/a/b/c").body(Body::empty()).unwrap()).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unsupported_verb_hits_fallback() {
        let response = send(
            Request::builder()
                .method(Method::TRACE)
                .uri("/abc123")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_oversized_body_is_rejected() {
        let store = Arc::new(SqliteStore::open_in_memory().unwrap());
        let mut config = InspectorConfig::default();
        config.security.max_body_size = 16;
        let router = HttpServer::new(&config, store).unwrap().router();
        let body = format!("{{\"padding\":\"{}\"}}", "x".repeat(64));
        let response = router
            .oneshot(Request::post("/abc123").body(Body::from(body)).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_cors_allows_configured_wildcard_origin() {
        let store = Arc::new(SqliteStore::open_in_memory().unwrap());
        let mut config = InspectorConfig::default();
        config.security.cors_origins = vec![
            "http://localhost:3000".into(),
            "https://*.neetodeployapp.com".into(),
        ];
        let router = HttpServer::new(&config, store).unwrap().router();

        let request = |origin: &'static str| {
            Request::get("/up")
                .header(header::ORIGIN, origin)
                .body(Body::empty())
                .unwrap()
        };

        let allowed = router
            .clone()
            .oneshot(request("https://webhooks.neetodeployapp.com"))
            .await
            .unwrap();
        assert_eq!(
            allowed.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "https://webhooks.neetodeployapp.com"
        );

        let local = router.clone().oneshot(request("http://localhost:3000")).await.unwrap();
        assert_eq!(
            local.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "http://localhost:3000"
        );

        let denied = router.oneshot(request("https://evil.example.com")).await.unwrap();
        assert!(!denied
            .headers()
            .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
    }
}
