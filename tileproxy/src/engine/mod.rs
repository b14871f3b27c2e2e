//! Tile fetch/cache engine
//!
//! The [`TileEngine`] is the core of the proxy. Given a validated tile
//! request it returns the cached image if present, and otherwise performs
//! exactly one upstream WMS GetMap fetch per tile key, no matter how many
//! requests for that key arrive concurrently.
//!
//! # Request flow
//!
//! ```text
//! get_tile ──► validate ──► cache lookup ──► Hit ──► return immediately
//!                                │ Miss
//!                                ▼
//!                          RequestCoalescer ──► Coalesced ──► await shared outcome
//!                                │ New
//!                                ▼
//!                          spawn detached fetch task
//!                          (bbox ► GetMap ► cache insert ► complete)
//! ```
//!
//! The fetch runs on a detached task so a caller whose HTTP connection
//! closes does not cancel the fetch other waiters still need; the result
//! is cached regardless.

mod coalescer;

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

use crate::cache::{TileCache, TileImage, TileKey};
use crate::coord::{tile_bbox, CoordError, TileCoord};
use crate::provider::{AsyncHttpClient, ProviderError, WmsClient};

pub use coalescer::{CoalesceResult, FetchOutcome, RequestCoalescer};

/// Errors surfaced by [`TileEngine::get_tile`].
///
/// Clonable so one failure can be delivered to every coalesced waiter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TileError {
    /// The requested tile coordinate is outside the valid range.
    /// Rejected before anything reaches the upstream.
    #[error("bad tile coordinate: {0}")]
    InvalidCoordinate(#[from] CoordError),

    /// The upstream WMS fetch failed. Not cached, not retried.
    #[error("upstream fetch failed: {0}")]
    Upstream(#[from] ProviderError),

    /// The in-flight fetch ended without delivering a result.
    #[error("in-flight fetch ended without a result")]
    FetchAbandoned,
}

/// The tile fetch/cache engine.
///
/// Constructed once at startup and shared by reference across request
/// handlers. Generic over the HTTP client so tests can inject mocks.
pub struct TileEngine<C: AsyncHttpClient> {
    wms: Arc<WmsClient<C>>,
    cache: Arc<TileCache>,
    coalescer: Arc<RequestCoalescer>,
    max_zoom: u8,
}

impl<C: AsyncHttpClient + 'static> TileEngine<C> {
    /// Creates a new engine.
    ///
    /// # Arguments
    ///
    /// * `wms` - Upstream WMS client
    /// * `cache` - Tile cache, injected so tests can inspect it
    /// * `max_zoom` - Deepest zoom level served; requests beyond it are
    ///   rejected as invalid coordinates
    pub fn new(wms: WmsClient<C>, cache: Arc<TileCache>, max_zoom: u8) -> Self {
        Self {
            wms: Arc::new(wms),
            cache,
            coalescer: Arc::new(RequestCoalescer::new()),
            max_zoom,
        }
    }

    /// The engine's tile cache.
    pub fn cache(&self) -> &Arc<TileCache> {
        &self.cache
    }

    /// Fetches a tile, from cache or upstream.
    ///
    /// `x` and `y` are signed so out-of-range values from URL parameters
    /// are rejected here rather than wrapping.
    ///
    /// # Errors
    ///
    /// * [`TileError::InvalidCoordinate`] - zoom or index out of range
    /// * [`TileError::Upstream`] - the single shared fetch failed; every
    ///   concurrent waiter for the key receives the same error
    pub async fn get_tile(
        &self,
        layer: &str,
        zoom: u8,
        x: i64,
        y: i64,
    ) -> Result<TileImage, TileError> {
        if zoom > self.max_zoom {
            return Err(CoordError::InvalidZoom(zoom).into());
        }
        let coord = TileCoord::new(zoom, x, y)?;
        let key = TileKey::new(layer, coord);

        // Fast path: synchronous lookup, no suspension.
        if let Some(tile) = self.cache.get(&key) {
            debug!(key = %key, "Cache hit");
            return Ok(tile);
        }

        match self.coalescer.register(&key) {
            CoalesceResult::Coalesced(mut rx) => {
                debug!(key = %key, "Coalesced onto in-flight fetch");
                rx.recv().await.map_err(|_| TileError::FetchAbandoned)?
            }
            CoalesceResult::New(mut rx) => {
                // A concurrent fetch may have completed between the cache
                // miss and registration; serve it rather than refetching.
                if let Some(tile) = self.cache.get(&key) {
                    self.coalescer.complete(&key, Ok(tile.clone()));
                    return Ok(tile);
                }

                self.spawn_fetch(key, coord);
                rx.recv().await.map_err(|_| TileError::FetchAbandoned)?
            }
        }
    }

    /// Runs the upstream fetch on a detached task and completes the
    /// coalescer with the outcome, success or failure.
    fn spawn_fetch(&self, key: TileKey, coord: TileCoord) {
        let wms = Arc::clone(&self.wms);
        let cache = Arc::clone(&self.cache);
        let coalescer = Arc::clone(&self.coalescer);

        tokio::spawn(async move {
            let bbox = tile_bbox(&coord);
            let outcome = match wms.get_map(&key.layer, &bbox).await {
                Ok(response) => {
                    let content_type = response
                        .content_type
                        .unwrap_or_else(|| "image/png".to_string());
                    let tile = TileImage::new(response.body, content_type);
                    cache.insert(key.clone(), tile.clone());
                    debug!(key = %key, bytes = tile.data.len(), "Fetched and cached tile");
                    Ok(tile)
                }
                Err(e) => {
                    warn!(key = %key, error = %e, "Upstream fetch failed");
                    Err(TileError::Upstream(e))
                }
            };

            coalescer.complete(&key, outcome);
        });
    }
}
