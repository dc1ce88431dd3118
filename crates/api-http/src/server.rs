//! HTTP Server
//!
//! Binds the axum router on TCP and serves until the shutdown token fires.

use std::time::Duration;

use axum::http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, HeaderValue, Method};
use axum::Router;
use qprint_core::application::ShutdownToken;
use qprint_core::error::Result;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::routes;
use crate::state::AppState;

const DEFAULT_HTTP_HOST: &str = "127.0.0.1";
const DEFAULT_HTTP_PORT: u16 = 8080;
const CORS_MAX_AGE: Duration = Duration::from_secs(300);

/// HTTP Server Configuration
#[derive(Debug, Clone)]
pub struct HttpServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HTTP_HOST.to_string(),
            port: DEFAULT_HTTP_PORT,
        }
    }
}

impl HttpServerConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Browser clients on any http(s) origin, with credentials
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(|origin: &HeaderValue, _| {
            let origin = origin.as_bytes();
            origin.starts_with(b"http://") || origin.starts_with(b"https://")
        }))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            ACCEPT,
            AUTHORIZATION,
            CONTENT_TYPE,
            HeaderName::from_static("x-csrf-token"),
        ])
        .allow_credentials(true)
        .max_age(CORS_MAX_AGE)
}

/// Full application router with tracing and CORS layers
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(routes::system_routes())
        .merge(routes::account_routes())
        .merge(routes::file_routes(state.max_upload_bytes()))
        .merge(routes::queue_routes())
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }),
        )
        .layer(cors_layer())
        .with_state(state)
}

/// HTTP Server
pub struct HttpServer {
    config: HttpServerConfig,
    state: AppState,
}

impl HttpServer {
    pub fn new(config: HttpServerConfig, state: AppState) -> Self {
        Self { config, state }
    }

    /// Serve until `shutdown` fires, then drain in-flight requests
    pub async fn run(self, mut shutdown: ShutdownToken) -> Result<()> {
        let addr = self.config.addr();
        let listener = tokio::net::TcpListener::bind(&addr).await?;

        info!(
            host = %self.config.host,
            port = self.config.port,
            "HTTP server listening"
        );

        axum::serve(listener, build_router(self.state))
            .with_graceful_shutdown(async move { shutdown.wait().await })
            .await?;

        info!("HTTP server stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = HttpServerConfig::default();
        assert_eq!(config.addr(), "127.0.0.1:8080");
    }
}
