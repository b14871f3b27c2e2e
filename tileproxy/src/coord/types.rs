//! Tile coordinate types and validation.

use thiserror::Error;

/// Minimum zoom level served by the proxy.
pub const MIN_ZOOM: u8 = 0;

/// Maximum zoom level served by the proxy.
///
/// Matches the deepest level commonly published by GeoServer layers.
/// Individual deployments may lower this via configuration.
pub const MAX_ZOOM: u8 = 22;

/// Errors produced when tile coordinates fail validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CoordError {
    /// Zoom level outside the supported range.
    #[error("zoom level {0} is out of range (0-{MAX_ZOOM})")]
    InvalidZoom(u8),

    /// Tile column negative or beyond the grid at this zoom.
    #[error("tile column {x} is out of range for zoom {zoom}")]
    InvalidColumn { x: i64, zoom: u8 },

    /// Tile row negative or beyond the grid at this zoom.
    #[error("tile row {y} is out of range for zoom {zoom}")]
    InvalidRow { y: i64, zoom: u8 },
}

/// A validated Slippy Map (XYZ) tile coordinate.
///
/// `x` is the column (west to east), `y` the row (north to south), both in
/// `0..2^zoom`. Construction through [`TileCoord::new`] is the only way to
/// obtain a value, so holders can rely on the ranges being valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileCoord {
    /// Zoom level (0 to [`MAX_ZOOM`]).
    pub zoom: u8,
    /// Tile column (0 to 2^zoom - 1).
    pub x: u32,
    /// Tile row (0 to 2^zoom - 1).
    pub y: u32,
}

impl TileCoord {
    /// Validates and creates a tile coordinate.
    ///
    /// `x` and `y` are accepted as signed integers so that negative inputs
    /// coming from URL parameters are rejected here rather than wrapping.
    ///
    /// # Errors
    ///
    /// Returns [`CoordError`] if the zoom exceeds [`MAX_ZOOM`] or either
    /// index falls outside `0..2^zoom`.
    pub fn new(zoom: u8, x: i64, y: i64) -> Result<Self, CoordError> {
        if zoom > MAX_ZOOM {
            return Err(CoordError::InvalidZoom(zoom));
        }

        let n = 1i64 << zoom;
        if x < 0 || x >= n {
            return Err(CoordError::InvalidColumn { x, zoom });
        }
        if y < 0 || y >= n {
            return Err(CoordError::InvalidRow { y, zoom });
        }

        Ok(Self {
            zoom,
            x: x as u32,
            y: y as u32,
        })
    }
}

impl std::fmt::Display for TileCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.zoom, self.x, self.y)
    }
}

/// A projected bounding box in the upstream spatial reference (EPSG:3857).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    /// Width of the box in projected units.
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Height of the box in projected units.
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

impl std::fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{},{},{},{}",
            self.min_x, self.min_y, self.max_x, self.max_y
        )
    }
}
