//! TileProxy - XYZ tile proxy for WMS map servers
//!
//! Accepts Slippy Map (XYZ) tile requests from web mapping clients and
//! translates each into a WMS GetMap request against a fixed upstream
//! server (typically GeoServer), streaming the rendered image back and
//! caching it in memory.
//!
//! The interesting parts are the pure tile-to-bbox transform in [`coord`]
//! and the fetch/cache engine in [`engine`], which collapses concurrent
//! requests for the same tile into a single upstream fetch. The rest is
//! HTTP plumbing.

pub mod app;
pub mod cache;
pub mod coord;
pub mod engine;
pub mod provider;
pub mod server;
