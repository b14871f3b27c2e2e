//! HTTP client abstraction for testability

use std::future::Future;
use std::time::Duration;

use bytes::Bytes;

use super::types::{HttpResponse, ProviderError};

/// Trait for async HTTP GET operations.
///
/// This abstraction allows for dependency injection and easier testing
/// by enabling mock HTTP clients in tests. The returned future must be
/// `Send` so fetches can run on spawned tasks.
pub trait AsyncHttpClient: Send + Sync {
    /// Performs an HTTP GET request and reads the full response body.
    ///
    /// # Arguments
    ///
    /// * `url` - The URL to request
    ///
    /// # Returns
    ///
    /// The response body and content type, or an error. A non-2xx status
    /// is reported as [`ProviderError::Status`].
    fn get(&self, url: &str) -> impl Future<Output = Result<HttpResponse, ProviderError>> + Send;
}

/// Real HTTP client implementation using reqwest.
pub struct AsyncReqwestClient {
    client: reqwest::Client,
    timeout_secs: u64,
}

impl AsyncReqwestClient {
    /// Default request timeout in seconds.
    ///
    /// The upstream WMS renders tiles on demand; ten seconds covers slow
    /// renders without letting a dead upstream pin waiters indefinitely.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

    /// Creates a new client with the default timeout.
    pub fn new() -> Result<Self, ProviderError> {
        Self::with_timeout(Self::DEFAULT_TIMEOUT_SECS)
    }

    /// Creates a new client with a custom timeout.
    pub fn with_timeout(timeout_secs: u64) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ProviderError::Http(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            timeout_secs,
        })
    }
}

impl AsyncHttpClient for AsyncReqwestClient {
    async fn get(&self, url: &str) -> Result<HttpResponse, ProviderError> {
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                ProviderError::Timeout(self.timeout_secs)
            } else {
                ProviderError::Http(format!("request failed: {}", e))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status {
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string());

        let body: Bytes = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                ProviderError::Timeout(self.timeout_secs)
            } else {
                ProviderError::Http(format!("failed to read response: {}", e))
            }
        })?;

        Ok(HttpResponse { body, content_type })
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;

    /// Mock HTTP client for testing
    pub struct MockAsyncHttpClient {
        pub response: Result<HttpResponse, ProviderError>,
    }

    impl MockAsyncHttpClient {
        pub fn ok(body: Vec<u8>, content_type: &str) -> Self {
            Self {
                response: Ok(HttpResponse {
                    body: Bytes::from(body),
                    content_type: Some(content_type.to_string()),
                }),
            }
        }

        pub fn err(error: ProviderError) -> Self {
            Self {
                response: Err(error),
            }
        }
    }

    impl AsyncHttpClient for MockAsyncHttpClient {
        async fn get(&self, _url: &str) -> Result<HttpResponse, ProviderError> {
            self.response.clone()
        }
    }

    #[tokio::test]
    async fn test_mock_client_success() {
        let mock = MockAsyncHttpClient::ok(vec![1, 2, 3, 4], "image/png");

        let result = mock.get("http://example.com").await.unwrap();
        assert_eq!(result.body.as_ref(), &[1, 2, 3, 4]);
        assert_eq!(result.content_type.as_deref(), Some("image/png"));
    }

    #[tokio::test]
    async fn test_mock_client_error() {
        let mock = MockAsyncHttpClient::err(ProviderError::Http("test error".to_string()));

        let result = mock.get("http://example.com").await;
        assert!(result.is_err());
    }

    #[test]
    fn test_reqwest_client_creation() {
        let client = AsyncReqwestClient::new();
        assert!(client.is_ok());

        let client = AsyncReqwestClient::with_timeout(30);
        assert!(client.is_ok());
    }
}
