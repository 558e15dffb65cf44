use std::fmt;

use async_trait::async_trait;

use super::types::{GeneratedImage, ImageRequest};

/// Errors that can occur during provider operations.
/// Callers above the content layer never see these; they are logged and
/// turned into empty or fallback results.
#[derive(Debug)]
pub enum ProviderError {
    /// Provider misconfigured (missing API key, bad URL).
    Config(String),
    /// Network-level failure (timeout, DNS, connection refused).
    Network(String),
    /// API returned an error response.
    Api { status: u16, message: String },
    /// Failed to parse the provider's response, or it did not match the schema.
    Parse(String),
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::Config(msg) => write!(f, "config error: {msg}"),
            ProviderError::Network(msg) => write!(f, "network error: {msg}"),
            ProviderError::Api { status, message } => {
                write!(f, "API error (HTTP {status}): {message}")
            }
            ProviderError::Parse(msg) => write!(f, "parse error: {msg}"),
        }
    }
}

impl std::error::Error for ProviderError {}

#[async_trait]
pub trait GenerativeProvider: Send + Sync {
    /// Returns the name of the provider.
    fn name(&self) -> &str;

    /// Generates JSON text constrained by `schema`. The caller parses it.
    async fn generate_structured(
        &self,
        prompt: &str,
        schema: &serde_json::Value,
    ) -> Result<String, ProviderError>;

    /// Free-form text generation.
    async fn generate_text(&self, prompt: &str) -> Result<String, ProviderError>;

    /// Generates images. An empty vector means the model produced nothing.
    async fn generate_images(
        &self,
        request: ImageRequest<'_>,
    ) -> Result<Vec<GeneratedImage>, ProviderError>;
}
