//! WMS GetMap client.
//!
//! Builds OGC WMS `GetMap` requests against a fixed upstream server
//! (typically GeoServer) and fetches the rendered image through an
//! [`AsyncHttpClient`].
//!
//! # Request shape
//!
//! `{base}?SERVICE=WMS&VERSION=1.1.0&REQUEST=GetMap&LAYERS={layer}&STYLES=`
//! `&FORMAT=image/png&TRANSPARENT=TRUE&SRS=EPSG:3857&BBOX={minx},{miny},{maxx},{maxy}`
//! `&WIDTH={size}&HEIGHT={size}`
//!
//! Query parameters are assembled through URL query-pair encoding, so layer
//! names containing characters like `:` or spaces are percent-encoded
//! correctly rather than interpolated raw.

use tracing::debug;

use crate::coord::BoundingBox;

use super::http::AsyncHttpClient;
use super::types::{HttpResponse, ProviderError};

/// Default WMS protocol version, matching GeoServer's broadest support.
pub const DEFAULT_WMS_VERSION: &str = "1.1.0";

/// Default spatial reference for tile bounding boxes.
pub const DEFAULT_SRS: &str = "EPSG:3857";

/// Image format requested from the upstream.
const WMS_FORMAT: &str = "image/png";

/// Upstream WMS endpoint configuration.
#[derive(Debug, Clone)]
pub struct WmsConfig {
    /// Base URL of the WMS endpoint, without query parameters.
    pub base_url: String,
    /// WMS protocol version sent as `VERSION`.
    pub version: String,
    /// Spatial reference sent as `SRS`; must match the bbox projection.
    pub srs: String,
    /// Output width and height in pixels.
    pub tile_size: u32,
}

impl Default for WmsConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/geoserver/wms".to_string(),
            version: DEFAULT_WMS_VERSION.to_string(),
            srs: DEFAULT_SRS.to_string(),
            tile_size: 256,
        }
    }
}

/// Client for a single upstream WMS server.
///
/// Generic over the HTTP client so tests can inject mocks, mirroring the
/// real/mock split of [`AsyncReqwestClient`](super::AsyncReqwestClient).
pub struct WmsClient<C: AsyncHttpClient> {
    http_client: C,
    config: WmsConfig,
}

impl<C: AsyncHttpClient> WmsClient<C> {
    /// Creates a new WMS client.
    ///
    /// # Arguments
    ///
    /// * `http_client` - HTTP client for making requests
    /// * `config` - Upstream endpoint configuration
    pub fn new(http_client: C, config: WmsConfig) -> Self {
        Self {
            http_client,
            config,
        }
    }

    /// The endpoint configuration this client was built with.
    pub fn config(&self) -> &WmsConfig {
        &self.config
    }

    /// Builds the GetMap request URL for a layer and bounding box.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::InvalidUrl`] if the configured base URL does
    /// not parse.
    pub fn getmap_url(&self, layer: &str, bbox: &BoundingBox) -> Result<String, ProviderError> {
        let mut url = reqwest::Url::parse(&self.config.base_url)
            .map_err(|e| ProviderError::InvalidUrl(format!("{}: {}", self.config.base_url, e)))?;

        url.query_pairs_mut()
            .append_pair("SERVICE", "WMS")
            .append_pair("VERSION", &self.config.version)
            .append_pair("REQUEST", "GetMap")
            .append_pair("LAYERS", layer)
            .append_pair("STYLES", "")
            .append_pair("FORMAT", WMS_FORMAT)
            .append_pair("TRANSPARENT", "TRUE")
            .append_pair("SRS", &self.config.srs)
            .append_pair("BBOX", &bbox.to_string())
            .append_pair("WIDTH", &self.config.tile_size.to_string())
            .append_pair("HEIGHT", &self.config.tile_size.to_string());

        Ok(url.into())
    }

    /// Fetches a rendered map image for a layer and bounding box.
    ///
    /// Reads the full response body; the image is passed through untouched.
    pub async fn get_map(
        &self,
        layer: &str,
        bbox: &BoundingBox,
    ) -> Result<HttpResponse, ProviderError> {
        let url = self.getmap_url(layer, bbox)?;
        debug!(layer, bbox = %bbox, "Requesting WMS GetMap");
        self.http_client.get(&url).await
    }
}
