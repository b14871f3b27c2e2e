//! End-to-end tests driving the HTTP router against a stub upstream.
//!
//! The stub implements `AsyncHttpClient` and records every GetMap URL it
//! receives, so tests can assert on upstream call counts and on the exact
//! query parameters the proxy sends.

use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use bytes::Bytes;
use tower::ServiceExt;

use tileproxy::cache::TileCache;
use tileproxy::coord::{tile_bbox, TileCoord};
use tileproxy::engine::TileEngine;
use tileproxy::provider::{
    AsyncHttpClient, HttpResponse, ProviderError, WmsClient, WmsConfig,
};
use tileproxy::server;

/// PNG signature followed by filler; the proxy passes bytes through
/// without decoding them.
const PNG_FIXTURE: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
    0x52,
];

/// Stub upstream that returns a fixed PNG for any GetMap request and
/// records the URLs it was asked for.
#[derive(Clone)]
struct StubUpstream {
    urls: Arc<Mutex<Vec<String>>>,
}

impl StubUpstream {
    fn new() -> Self {
        Self {
            urls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn recorded_urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }

    fn call_count(&self) -> usize {
        self.urls.lock().unwrap().len()
    }
}

impl AsyncHttpClient for StubUpstream {
    async fn get(&self, url: &str) -> Result<HttpResponse, ProviderError> {
        self.urls.lock().unwrap().push(url.to_string());
        Ok(HttpResponse {
            body: Bytes::from_static(PNG_FIXTURE),
            content_type: Some("image/png".to_string()),
        })
    }
}

fn stub_router(stub: &StubUpstream, cache_capacity: usize) -> axum::Router {
    let wms = WmsClient::new(stub.clone(), WmsConfig::default());
    let cache = Arc::new(TileCache::new(cache_capacity));
    server::router(Arc::new(TileEngine::new(wms, cache, 22)))
}

async fn get(router: axum::Router, uri: &str) -> (StatusCode, Vec<u8>, Option<String>) {
    let response = router
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string());
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec();

    (status, body, content_type)
}

/// Pulls a decoded query parameter out of a recorded URL.
fn query_param(url: &str, name: &str) -> Option<String> {
    let parsed = reqwest::Url::parse(url).unwrap();
    parsed
        .query_pairs()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}

#[tokio::test]
async fn end_to_end_tile_request_builds_correct_getmap() {
    let stub = StubUpstream::new();
    let router = stub_router(&stub, 100);

    let (status, body, content_type) = get(router, "/tiles/demo/5/10/12.png").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, PNG_FIXTURE);
    assert_eq!(content_type.as_deref(), Some("image/png"));

    let urls = stub.recorded_urls();
    assert_eq!(urls.len(), 1);
    let url = &urls[0];

    assert_eq!(query_param(url, "SERVICE").as_deref(), Some("WMS"));
    assert_eq!(query_param(url, "REQUEST").as_deref(), Some("GetMap"));
    assert_eq!(query_param(url, "LAYERS").as_deref(), Some("demo"));
    assert_eq!(query_param(url, "SRS").as_deref(), Some("EPSG:3857"));
    assert_eq!(query_param(url, "WIDTH").as_deref(), Some("256"));
    assert_eq!(query_param(url, "HEIGHT").as_deref(), Some("256"));
    assert_eq!(query_param(url, "FORMAT").as_deref(), Some("image/png"));

    // The BBOX must match the computed bounding box to within 1e-9.
    let bbox_param = query_param(url, "BBOX").unwrap();
    let sent: Vec<f64> = bbox_param
        .split(',')
        .map(|v| v.parse().unwrap())
        .collect();
    let expected = tile_bbox(&TileCoord::new(5, 10, 12).unwrap());

    assert_eq!(sent.len(), 4);
    assert!((sent[0] - expected.min_x).abs() < 1e-9);
    assert!((sent[1] - expected.min_y).abs() < 1e-9);
    assert!((sent[2] - expected.max_x).abs() < 1e-9);
    assert!((sent[3] - expected.max_y).abs() < 1e-9);
}

#[tokio::test]
async fn repeated_request_is_served_from_cache() {
    let stub = StubUpstream::new();
    let router = stub_router(&stub, 100);

    let (status_a, body_a, _) = get(router.clone(), "/tiles/demo/3/4/5.png").await;
    let (status_b, body_b, _) = get(router, "/tiles/demo/3/4/5.png").await;

    assert_eq!(status_a, StatusCode::OK);
    assert_eq!(status_b, StatusCode::OK);
    assert_eq!(body_a, body_b);
    assert_eq!(stub.call_count(), 1);
}

#[tokio::test]
async fn invalid_coordinates_never_reach_upstream() {
    let stub = StubUpstream::new();
    let router = stub_router(&stub, 100);

    let (status, _, _) = get(router.clone(), "/tiles/demo/5/32/0.png").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _, _) = get(router.clone(), "/tiles/demo/5/0/-1.png").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _, _) = get(router, "/tiles/demo/23/0/0.png").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(stub.call_count(), 0);
}

#[tokio::test]
async fn eviction_causes_refetch_of_displaced_tile() {
    let stub = StubUpstream::new();
    let router = stub_router(&stub, 2);

    // Fill the two-entry cache, then displace the oldest tile.
    get(router.clone(), "/tiles/demo/4/0/0.png").await;
    get(router.clone(), "/tiles/demo/4/1/0.png").await;
    get(router.clone(), "/tiles/demo/4/2/0.png").await;
    assert_eq!(stub.call_count(), 3);

    // Still cached: no new upstream call.
    get(router.clone(), "/tiles/demo/4/2/0.png").await;
    assert_eq!(stub.call_count(), 3);

    // Evicted: fetched again.
    get(router, "/tiles/demo/4/0/0.png").await;
    assert_eq!(stub.call_count(), 4);
}

#[tokio::test]
async fn health_endpoint_reports_ok() {
    let stub = StubUpstream::new();
    let router = stub_router(&stub, 10);

    let (status, body, _) = get(router, "/health").await;

    assert_eq!(status, StatusCode::OK);
    let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(value["status"], "ok");
}
