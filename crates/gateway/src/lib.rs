//! HTTP API gateway for Cowork.
//!
//! Exposes the chat endpoint (an NDJSON event stream), the tool catalog and
//! a health check. Built on Axum.

pub mod api;

use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method, header};
use axum::{Router, response::Json, routing::get, routing::post};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use cowork_agent::AgentLoop;
use cowork_config::AppConfig;
use cowork_core::error::{Error, ToolError};
use cowork_providers::GeminiProvider;
use cowork_tools::{ToolExecutor, WorkspaceServices, workspace_registry};

/// Shared application state for the gateway.
pub struct GatewayState {
    pub config: AppConfig,
    pub agent: Arc<AgentLoop>,
}

pub type SharedState = Arc<GatewayState>;

/// Assemble the production agent: Gemini, Google services, the full catalog.
pub fn build_agent(config: &AppConfig) -> Result<AgentLoop, Error> {
    let provider = Arc::new(GeminiProvider::from_config(config)?);
    let services = WorkspaceServices::google(config).map_err(ToolError::from)?;
    let registry = Arc::new(workspace_registry(&services));
    let executor = Arc::new(ToolExecutor::new(
        registry,
        Duration::from_secs(config.agent.tool_timeout_secs),
    ));
    Ok(AgentLoop::from_config(provider, executor, config))
}

/// CORS for the browser frontend. Credentials are allowed, so only the
/// configured origin is granted.
fn cors_layer(frontend_url: &str) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600));

    match HeaderValue::from_str(frontend_url.trim_end_matches('/')) {
        Ok(origin) => cors.allow_origin([origin]),
        Err(_) => {
            warn!(frontend_url, "Invalid frontend URL, cross-origin requests disabled");
            cors
        }
    }
}

/// Build the Axum router with all gateway routes.
pub fn build_router(state: SharedState) -> Router {
    let cors = cors_layer(&state.config.gateway.frontend_url);

    Router::new()
        .route("/health", get(health_handler))
        .route("/api/chat", post(api::chat_handler))
        .route("/api/tools", get(api::tools_handler))
        .layer(DefaultBodyLimit::max(1024 * 1024))
        .layer(cors)
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the gateway HTTP server.
pub async fn start(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);

    let agent = Arc::new(build_agent(&config)?);
    info!(
        tools = agent.executor().registry().len(),
        model = %config.model.name,
        "Agent ready"
    );

    let state = Arc::new(GatewayState { config, agent });
    let app = build_router(state);

    info!(addr = %addr, "Gateway listening");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// --- Handlers ---

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    #[tokio::test]
    async fn health_endpoint() {
        let app = build_router(state_with(Arc::new(ScriptedProvider::new(vec![]))));

        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn cors_preflight_allows_frontend_with_credentials() {
        let app = build_router(state_with(Arc::new(ScriptedProvider::new(vec![]))));

        let req = Request::builder()
            .method("OPTIONS")
            .uri("/api/chat")
            .header("Origin", "http://localhost:5173")
            .header("Access-Control-Request-Method", "POST")
            .header("Access-Control-Request-Headers", "content-type,authorization")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(req).await.unwrap();
        let headers = response.headers();
        assert_eq!(
            headers.get("access-control-allow-origin").unwrap(),
            "http://localhost:5173"
        );
        assert_eq!(
            headers.get("access-control-allow-credentials").unwrap(),
            "true"
        );
    }

    #[tokio::test]
    async fn unknown_origin_gets_no_cors_grant() {
        let app = build_router(state_with(Arc::new(ScriptedProvider::new(vec![]))));

        let req = Request::builder()
            .uri("/health")
            .header("Origin", "https://evil.example")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(req).await.unwrap();
        assert!(response.headers().get("access-control-allow-origin").is_none());
    }

    #[test]
    fn build_agent_requires_api_key() {
        let err = build_agent(&AppConfig::default()).err().unwrap();
        assert!(matches!(err, Error::Provider(_)));
    }

    #[test]
    fn build_agent_with_key() {
        let config = AppConfig {
            api_key: Some("test-key".into()),
            ..AppConfig::default()
        };
        let agent = build_agent(&config).unwrap();
        assert_eq!(agent.executor().registry().len(), 9);
    }
}
