//! Application bootstrap implementation.
//!
//! `TileProxyApp` wires the configuration into the component graph in
//! dependency order: HTTP client, WMS client, cache, engine, router. The
//! CLI only has to build a config and call [`TileProxyApp::serve`].

use std::sync::Arc;

use axum::Router;
use tracing::info;

use crate::cache::TileCache;
use crate::engine::TileEngine;
use crate::provider::{AsyncReqwestClient, WmsClient, WmsConfig};
use crate::server;

use super::config::ProxyConfig;
use super::error::AppError;

/// The assembled tile proxy application.
pub struct TileProxyApp {
    engine: Arc<TileEngine<AsyncReqwestClient>>,
    config: ProxyConfig,
}

impl TileProxyApp {
    /// Builds the application from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Config`] if validation fails or
    /// [`AppError::HttpClient`] if the upstream client cannot be built.
    pub fn new(config: ProxyConfig) -> Result<Self, AppError> {
        config.validate()?;

        let http_client = AsyncReqwestClient::with_timeout(config.request_timeout_secs)?;
        let wms = WmsClient::new(
            http_client,
            WmsConfig {
                base_url: config.upstream_url.clone(),
                version: config.wms_version.clone(),
                srs: config.srs.clone(),
                tile_size: config.tile_size,
            },
        );
        let cache = Arc::new(TileCache::new(config.cache_capacity));
        let engine = Arc::new(TileEngine::new(wms, cache, config.max_zoom));

        Ok(Self { engine, config })
    }

    /// The configuration the app was built with.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    /// The shared tile engine.
    pub fn engine(&self) -> &Arc<TileEngine<AsyncReqwestClient>> {
        &self.engine
    }

    /// The HTTP router serving tiles and the health probe.
    pub fn router(&self) -> Router {
        server::router(Arc::clone(&self.engine))
    }

    /// Binds the listen address and serves until ctrl-c.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Bind`] if the address cannot be bound, or
    /// [`AppError::Serve`] if the server stops with an error.
    pub async fn serve(self) -> Result<(), AppError> {
        let addr = self.config.bind_addr.clone();
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|source| AppError::Bind {
                addr: addr.clone(),
                source,
            })?;

        info!(
            address = %addr,
            upstream = %self.config.upstream_url,
            cache_capacity = self.config.cache_capacity,
            max_zoom = self.config.max_zoom,
            "Tile proxy server started"
        );

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(AppError::Serve)
    }
}

/// Resolves when the process receives ctrl-c.
async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}
