//! Proxy configuration.
//!
//! All settings live in [`ProxyConfig`], an explicit immutable struct built
//! once at startup and validated before anything is constructed from it.
//! Core logic never reads the environment; `from_env` is the single place
//! environment variables are consulted.

use std::env;
use std::str::FromStr;

use crate::coord;
use crate::provider::{DEFAULT_SRS, DEFAULT_WMS_VERSION};

use super::error::AppError;

/// Default upstream WMS endpoint (a local GeoServer).
pub const DEFAULT_UPSTREAM_URL: &str = "http://localhost:8080/geoserver/wms";

/// Default cache capacity in tile entries.
pub const DEFAULT_CACHE_CAPACITY: usize = 10_000;

/// Default tile edge length in pixels.
pub const DEFAULT_TILE_SIZE: u32 = 256;

/// Default listen address.
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";

/// Configuration for the tile proxy.
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    /// Base URL of the upstream WMS endpoint.
    pub upstream_url: String,

    /// Maximum number of tiles held in the memory cache.
    pub cache_capacity: usize,

    /// Tile edge length in pixels (WMS WIDTH/HEIGHT).
    pub tile_size: u32,

    /// Spatial reference sent to the upstream (`SRS`).
    pub srs: String,

    /// Deepest zoom level served.
    pub max_zoom: u8,

    /// WMS protocol version.
    pub wms_version: String,

    /// Upstream request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Address the HTTP server binds to.
    pub bind_addr: String,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            upstream_url: DEFAULT_UPSTREAM_URL.to_string(),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            tile_size: DEFAULT_TILE_SIZE,
            srs: DEFAULT_SRS.to_string(),
            max_zoom: coord::MAX_ZOOM,
            wms_version: DEFAULT_WMS_VERSION.to_string(),
            request_timeout_secs: 10,
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
        }
    }
}

impl ProxyConfig {
    /// Loads configuration from environment variables, falling back to
    /// defaults for anything unset.
    ///
    /// Recognised variables: `GEOSERVER_URL`, `CACHE_SIZE`, `TILE_SIZE`,
    /// `SRS`, `MAX_ZOOM`, `WMS_VERSION`, `REQUEST_TIMEOUT`, `BIND_ADDR`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Config`] if a set variable fails to parse or
    /// the resulting configuration is invalid.
    pub fn from_env() -> Result<Self, AppError> {
        let mut config = Self::default();

        if let Ok(url) = env::var("GEOSERVER_URL") {
            config.upstream_url = url;
        }
        if let Some(capacity) = env_parse("CACHE_SIZE")? {
            config.cache_capacity = capacity;
        }
        if let Some(size) = env_parse("TILE_SIZE")? {
            config.tile_size = size;
        }
        if let Ok(srs) = env::var("SRS") {
            config.srs = srs;
        }
        if let Some(zoom) = env_parse("MAX_ZOOM")? {
            config.max_zoom = zoom;
        }
        if let Ok(version) = env::var("WMS_VERSION") {
            config.wms_version = version;
        }
        if let Some(timeout) = env_parse("REQUEST_TIMEOUT")? {
            config.request_timeout_secs = timeout;
        }
        if let Ok(addr) = env::var("BIND_ADDR") {
            config.bind_addr = addr;
        }

        config.validate()?;
        Ok(config)
    }

    /// Set the upstream WMS URL.
    pub fn with_upstream_url(mut self, url: impl Into<String>) -> Self {
        self.upstream_url = url.into();
        self
    }

    /// Set the cache capacity in entries.
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    /// Set the tile pixel size.
    pub fn with_tile_size(mut self, size: u32) -> Self {
        self.tile_size = size;
        self
    }

    /// Set the deepest zoom level served.
    pub fn with_max_zoom(mut self, max_zoom: u8) -> Self {
        self.max_zoom = max_zoom;
        self
    }

    /// Set the listen address.
    pub fn with_bind_addr(mut self, addr: impl Into<String>) -> Self {
        self.bind_addr = addr.into();
        self
    }

    /// Checks the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Config`] naming the offending field.
    pub fn validate(&self) -> Result<(), AppError> {
        reqwest::Url::parse(&self.upstream_url).map_err(|e| {
            AppError::Config(format!(
                "upstream URL {:?} does not parse: {}",
                self.upstream_url, e
            ))
        })?;

        if self.cache_capacity == 0 {
            return Err(AppError::Config(
                "cache capacity must be at least 1 entry".to_string(),
            ));
        }
        if self.tile_size == 0 {
            return Err(AppError::Config(
                "tile size must be at least 1 pixel".to_string(),
            ));
        }
        if self.max_zoom > coord::MAX_ZOOM {
            return Err(AppError::Config(format!(
                "max zoom {} exceeds the supported maximum {}",
                self.max_zoom,
                coord::MAX_ZOOM
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(AppError::Config(
                "request timeout must be at least 1 second".to_string(),
            ));
        }
        self.bind_addr
            .parse::<std::net::SocketAddr>()
            .map_err(|e| {
                AppError::Config(format!(
                    "bind address {:?} does not parse: {}",
                    self.bind_addr, e
                ))
            })?;

        Ok(())
    }
}

/// Parses an optional environment variable, erroring only if it is set to
/// something unparseable.
fn env_parse<T: FromStr>(name: &str) -> Result<Option<T>, AppError>
where
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(value) => value
            .parse()
            .map(Some)
            .map_err(|e| AppError::Config(format!("{} = {:?} does not parse: {}", name, value, e))),
        Err(_) => Ok(None),
    }
}
