//! Web server for filedrop.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{header, Extensions, HeaderMap, StatusCode, Version};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::compression::predicate::{DefaultPredicate, NotForContentType, Predicate};
use tower_http::compression::CompressionLayer;

use crate::config::{Config, WebConfig};
use crate::{FiledropError, Result};

use super::handlers::AppState;
use super::router::{create_router, create_static_router};

/// Web server for the API.
pub struct WebServer {
    /// Server address.
    addr: SocketAddr,
    /// Application state.
    app_state: Arc<AppState>,
    /// Web configuration.
    web_config: WebConfig,
}

impl WebServer {
    /// Create a new web server from configuration.
    pub fn new(config: &Config) -> Result<Self> {
        let addr = format!("{}:{}", config.server.host, config.server.port)
            .parse()
            .map_err(|e| {
                FiledropError::Config(format!(
                    "invalid listen address {}:{}: {e}",
                    config.server.host, config.server.port
                ))
            })?;

        Ok(Self {
            addr,
            app_state: Arc::new(AppState::from_config(&config.files)),
            web_config: config.web.clone(),
        })
    }

    /// Get the server address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Build the full application router.
    fn build_router(&self) -> Router {
        let mut router = create_router(self.app_state.clone(), &self.web_config);

        if self.web_config.serve_static {
            if let Some(static_router) = create_static_router(&self.web_config.static_path) {
                router = router.merge(static_router);
            }
        }

        // ZIP bodies are already deflated.
        let predicate = DefaultPredicate::new()
            .and(NotForContentType::new("application/zip"))
            .and(not_for_attachments);
        router.layer(CompressionLayer::new().compress_when(predicate))
    }

    /// Bind the listener and prepare the store root.
    async fn bind(&self) -> Result<(TcpListener, Router)> {
        self.app_state.store.ensure_root()?;
        tracing::info!("File store at: {}", self.app_state.store.root().display());

        let router = self.build_router();
        let listener = TcpListener::bind(self.addr).await?;
        Ok((listener, router))
    }

    /// Run the web server.
    pub async fn run(self) -> Result<()> {
        let (listener, router) = self.bind().await?;
        tracing::info!("Web server listening on http://{}", listener.local_addr()?);

        axum::serve(listener, router).await?;
        Ok(())
    }

    /// Run the server and return the actual bound address.
    ///
    /// This is useful for testing when binding to port 0.
    pub async fn run_with_addr(self) -> Result<SocketAddr> {
        let (listener, router) = self.bind().await?;
        let local_addr = listener.local_addr()?;
        tracing::info!("Web server listening on http://{}", local_addr);

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                tracing::error!("Web server error: {}", e);
            }
        });

        Ok(local_addr)
    }
}

/// Downloads keep their exact bytes and Content-Length.
fn not_for_attachments(
    _status: StatusCode,
    _version: Version,
    headers: &HeaderMap,
    _extensions: &Extensions,
) -> bool {
    !headers
        .get(header::CONTENT_DISPOSITION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("attachment"))
}
