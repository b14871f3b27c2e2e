//! In-memory tile cache
//!
//! Stores fetched tile images keyed by `(layer, zoom, x, y)` with strict
//! least-recently-used eviction at a fixed entry-count capacity.

mod memory;

use bytes::Bytes;

use crate::coord::TileCoord;

pub use memory::{CacheStats, TileCache};

/// Cache key for a tile: layer name plus validated tile coordinate.
///
/// Exact-match lookup; no normalisation beyond the integer range checks
/// performed when the [`TileCoord`] was constructed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TileKey {
    /// Upstream WMS layer name.
    pub layer: String,
    /// Validated tile coordinate.
    pub coord: TileCoord,
}

impl TileKey {
    /// Creates a new cache key.
    pub fn new(layer: impl Into<String>, coord: TileCoord) -> Self {
        Self {
            layer: layer.into(),
            coord,
        }
    }
}

impl std::fmt::Display for TileKey {
    /// Format: `tile:{layer}:{zoom}:{x}:{y}`, for logs and debugging.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "tile:{}:{}:{}:{}",
            self.layer, self.coord.zoom, self.coord.x, self.coord.y
        )
    }
}

/// A fetched tile image as served to clients and stored in the cache.
///
/// The body is a [`Bytes`] so that the cache, concurrent waiters, and the
/// HTTP response can share one allocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileImage {
    /// Raw image bytes, passed through from the upstream unmodified.
    pub data: Bytes,
    /// Content type reported by the upstream (normally `image/png`).
    pub content_type: String,
}

impl TileImage {
    /// Creates a tile image.
    pub fn new(data: Bytes, content_type: impl Into<String>) -> Self {
        Self {
            data,
            content_type: content_type.into(),
        }
    }
}
