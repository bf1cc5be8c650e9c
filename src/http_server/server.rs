//! # HTTP Server
//!
//! Mounts the blog route table with the session middleware, request tracing
//! and CORS.

use axum::middleware;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use super::config::HttpServerConfig;
use super::state::AppState;
use crate::auth::session_middleware;
use crate::blog::handlers::routes;
use crate::web::WebResult;

/// HTTP server for the blog
pub struct HttpServer {
    config: HttpServerConfig,
    router: Router,
}

impl HttpServer {
    /// Create a server over `state`
    pub fn with_config(config: HttpServerConfig, state: AppState) -> WebResult<Self> {
        let router = Self::build_router(&config, state)?;
        Ok(Self { config, router })
    }

    /// Build the router with every handler and layer
    pub fn build_router(config: &HttpServerConfig, state: AppState) -> WebResult<Router> {
        let router = routes()?
            .into_router()?
            .layer(middleware::from_fn_with_state(state.clone(), session_middleware))
            .layer(TraceLayer::new_for_http());
        let router = match config.cors_layer() {
            Some(cors) => router.layer(cors),
            None => {
                info!("no CORS origins configured, cross-origin calls are refused");
                router
            }
        };
        Ok(router.with_state(state))
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    /// Start the HTTP server (async)
    pub async fn start(self) -> Result<(), std::io::Error> {
        let addr = self.config.bind_addr()?;

        let listener = TcpListener::bind(addr).await?;
        info!(%addr, "server started");
        axum::serve(listener, self.router).await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blog::models::all_schemas;
    use crate::config::SessionConfig;
    use crate::orm::Database;
    use axum::body::Body;
    use axum::http::{self, header, StatusCode};
    use tower::ServiceExt;

    async fn state() -> AppState {
        let db = Database::in_memory().await.unwrap();
        db.create_tables(&all_schemas()).await.unwrap();
        AppState::new(db, SessionConfig::default())
    }

    async fn allow_origin_header(config: &HttpServerConfig) -> Option<String> {
        let app = HttpServer::build_router(config, state().await).unwrap();
        let response = app
            .oneshot(
                http::Request::builder()
                    .uri("/api/blogs")
                    .header(header::ORIGIN, "http://localhost:9000")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    }

    #[tokio::test]
    async fn test_server_with_custom_port() {
        let server = HttpServer::with_config(HttpServerConfig::with_port(8080), state().await).unwrap();
        assert_eq!(server.socket_addr(), "127.0.0.1:8080");
        let _router = server.router();
    }

    #[tokio::test]
    async fn test_configured_origin_is_allowed() {
        let config = HttpServerConfig::default();
        assert_eq!(
            allow_origin_header(&config).await.as_deref(),
            Some("http://localhost:9000")
        );
    }

    #[tokio::test]
    async fn test_empty_origins_send_no_cors_headers() {
        let config = HttpServerConfig {
            cors_origins: Vec::new(),
            ..Default::default()
        };
        assert!(allow_origin_header(&config).await.is_none());
    }
}
