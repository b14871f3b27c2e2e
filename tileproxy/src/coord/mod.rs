//! Coordinate conversion module
//!
//! Converts Slippy Map (XYZ) tile indices to projected Web Mercator
//! bounding boxes suitable for WMS GetMap requests.

mod types;

pub use types::{BoundingBox, CoordError, TileCoord, MAX_ZOOM, MIN_ZOOM};

/// Half-extent of the Web Mercator (EPSG:3857) projection in metres.
///
/// The projected world spans `[-HALF_EXTENT, HALF_EXTENT]` on both axes.
/// This is the rounded constant GeoServer and most WMS deployments use.
pub const WEB_MERCATOR_HALF_EXTENT: f64 = 20_037_508.34;

/// Converts a tile coordinate to its projected bounding box.
///
/// The world at zoom `z` is a `2^z × 2^z` grid of square tiles; tile rows
/// grow southward while projected Y grows northward, so the Y axis is
/// inverted. Both edges of each axis are computed directly from the tile
/// index (`-H + x * span` and `-H + (x+1) * span`) so that adjacent tiles
/// share bit-identical edges with no gap or overlap.
///
/// Pure function: the result depends only on the input coordinate.
#[inline]
pub fn tile_bbox(tile: &TileCoord) -> BoundingBox {
    let n = 2.0_f64.powi(tile.zoom as i32);
    let span = (2.0 * WEB_MERCATOR_HALF_EXTENT) / n;

    let min_x = -WEB_MERCATOR_HALF_EXTENT + tile.x as f64 * span;
    let max_x = -WEB_MERCATOR_HALF_EXTENT + (tile.x as f64 + 1.0) * span;
    let max_y = WEB_MERCATOR_HALF_EXTENT - tile.y as f64 * span;
    let min_y = WEB_MERCATOR_HALF_EXTENT - (tile.y as f64 + 1.0) * span;

    BoundingBox {
        min_x,
        min_y,
        max_x,
        max_y,
    }
}
