//! HTTP server wiring
//!
//! Exposes the tile engine over HTTP:
//!
//! - `GET /tiles/{layer}/{z}/{x}/{y}.png` - proxied tile
//! - `GET /health` - liveness probe
//!
//! The handlers are thin: parse path parameters, call
//! [`TileEngine::get_tile`], map [`TileError`] onto an HTTP status.
//! CORS is wide open so browser map clients can load tiles directly.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::debug;

use crate::engine::{TileEngine, TileError};
use crate::provider::{AsyncHttpClient, ProviderError};

/// Builds the proxy router around a shared tile engine.
pub fn router<C>(engine: Arc<TileEngine<C>>) -> Router
where
    C: AsyncHttpClient + 'static,
{
    Router::new()
        .route("/tiles/:layer/:z/:x/:y", get(serve_tile::<C>))
        .route("/health", get(health))
        .with_state(engine)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Liveness probe.
async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// Serves one tile.
///
/// The final path segment carries the `.png` suffix (`{y}.png`), so it is
/// extracted as a string and split here.
async fn serve_tile<C>(
    State(engine): State<Arc<TileEngine<C>>>,
    Path((layer, z, x, y)): Path<(String, u8, i64, String)>,
) -> Response
where
    C: AsyncHttpClient + 'static,
{
    debug!(layer, z, x, y, "Received tile request");

    let Some(y) = parse_y_segment(&y) else {
        return error_response(
            StatusCode::BAD_REQUEST,
            &format!("bad tile coordinate: row segment {:?} is not a tile row", y),
        );
    };

    match engine.get_tile(&layer, z, x, y).await {
        Ok(tile) => {
            let content_type = HeaderValue::from_str(&tile.content_type)
                .unwrap_or_else(|_| HeaderValue::from_static("image/png"));
            ([(header::CONTENT_TYPE, content_type)], tile.data).into_response()
        }
        Err(e) => error_response(tile_error_status(&e), &e.to_string()),
    }
}

/// Parses the `{y}.png` path segment into a tile row.
fn parse_y_segment(segment: &str) -> Option<i64> {
    segment.strip_suffix(".png")?.parse().ok()
}

/// Maps an engine error onto the HTTP status served to tile clients.
///
/// Upstream status/body details stay in the logs; clients only see the
/// error class.
fn tile_error_status(error: &TileError) -> StatusCode {
    match error {
        TileError::InvalidCoordinate(_) => StatusCode::BAD_REQUEST,
        TileError::Upstream(ProviderError::Timeout(_)) => StatusCode::GATEWAY_TIMEOUT,
        TileError::Upstream(_) => StatusCode::BAD_GATEWAY,
        TileError::FetchAbandoned => StatusCode::BAD_GATEWAY,
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}
