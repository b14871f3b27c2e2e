//! Application error types.

use std::io;

use thiserror::Error;

use crate::provider::ProviderError;

/// Errors that can occur during application lifecycle.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Failed to construct the upstream HTTP client.
    #[error("failed to create HTTP client: {0}")]
    HttpClient(#[from] ProviderError),

    /// Failed to bind the listen address.
    #[error("failed to bind {addr}: {source}")]
    Bind { addr: String, source: io::Error },

    /// The HTTP server stopped with an error.
    #[error("server error: {0}")]
    Serve(#[source] io::Error),
}
