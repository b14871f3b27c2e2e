//! Upstream map server abstraction
//!
//! Provides the HTTP client trait used for dependency injection and the
//! WMS GetMap client that talks to the configured upstream server.

mod http;
mod types;
mod wms;

pub use http::{AsyncHttpClient, AsyncReqwestClient};
pub use types::{HttpResponse, ProviderError};
pub use wms::{WmsClient, WmsConfig, DEFAULT_SRS, DEFAULT_WMS_VERSION};

#[cfg(test)]
pub use http::tests::MockAsyncHttpClient;
