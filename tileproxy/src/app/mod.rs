//! Application bootstrap and lifecycle management.
//!
//! This module provides the `TileProxyApp` type which assembles the
//! component graph from a single validated configuration and runs the
//! HTTP server with graceful shutdown.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │                     TileProxyApp                       │
//! │                                                        │
//! │  ProxyConfig ──► AsyncReqwestClient ──► WmsClient      │
//! │                  TileCache ─────────┐                  │
//! │                                     ▼                  │
//! │                  TileEngine ──► axum Router ──► serve  │
//! └────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use tileproxy::app::{ProxyConfig, TileProxyApp};
//!
//! let config = ProxyConfig::from_env()?;
//! TileProxyApp::new(config)?.serve().await?;
//! ```

mod bootstrap;
mod config;
mod error;

pub use bootstrap::TileProxyApp;
pub use config::{
    ProxyConfig, DEFAULT_BIND_ADDR, DEFAULT_CACHE_CAPACITY, DEFAULT_TILE_SIZE,
    DEFAULT_UPSTREAM_URL,
};
pub use error::AppError;
