//! Shared provider types.

use bytes::Bytes;
use thiserror::Error;

/// Errors that can occur while talking to the upstream map server.
///
/// Variants carry owned strings rather than source errors so that a single
/// failure can be cloned and broadcast to every caller waiting on the same
/// in-flight fetch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// Network-level failure (connection refused, DNS, TLS, ...).
    #[error("request failed: {0}")]
    Http(String),

    /// The upstream did not respond within the configured timeout.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// The upstream responded with a non-2xx status.
    #[error("upstream returned HTTP {status}")]
    Status { status: u16 },

    /// The configured base URL or built request URL is not valid.
    #[error("invalid upstream URL: {0}")]
    InvalidUrl(String),
}

/// A successful HTTP response body with its advertised content type.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// Full response body.
    pub body: Bytes,
    /// Value of the `Content-Type` header, if the upstream sent one.
    pub content_type: Option<String>,
}
