pub mod provider;
pub mod providers;
pub mod types;

pub use provider::{GenerativeProvider, ProviderError};
pub use providers::GeminiProvider;
pub use types::{GeneratedImage, ImageFormat, ImageRequest};
