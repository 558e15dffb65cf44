//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::core::Profile;
use crate::inference::{GeneratedImage, GenerativeProvider, ImageRequest, ProviderError};

/// A request the scripted provider received.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderCall {
    Structured {
        prompt: String,
        schema: serde_json::Value,
    },
    Text {
        prompt: String,
    },
    Images {
        prompt: String,
        aspect_ratio: String,
        image_count: u8,
    },
}

/// A provider that answers from per-method queues of canned responses and
/// records every call. An exhausted queue answers with a config error.
#[derive(Default)]
pub struct ScriptedProvider {
    structured: Mutex<VecDeque<Result<String, ProviderError>>>,
    text: Mutex<VecDeque<Result<String, ProviderError>>>,
    images: Mutex<VecDeque<Result<Vec<GeneratedImage>, ProviderError>>>,
    calls: Mutex<Vec<ProviderCall>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_structured(&self, response: Result<String, ProviderError>) {
        self.structured.lock().unwrap().push_back(response);
    }

    pub fn push_text(&self, response: Result<String, ProviderError>) {
        self.text.lock().unwrap().push_back(response);
    }

    pub fn push_images(&self, response: Result<Vec<GeneratedImage>, ProviderError>) {
        self.images.lock().unwrap().push_back(response);
    }

    /// Queues a single JPEG image.
    pub fn push_image(&self, data_base64: &str) {
        self.push_images(Ok(vec![GeneratedImage {
            mime_type: "image/jpeg".to_string(),
            data_base64: data_base64.to_string(),
        }]));
    }

    pub fn calls(&self) -> Vec<ProviderCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: ProviderCall) {
        self.calls.lock().unwrap().push(call);
    }
}

fn next<T>(queue: &Mutex<VecDeque<Result<T, ProviderError>>>) -> Result<T, ProviderError> {
    queue
        .lock()
        .unwrap()
        .pop_front()
        .unwrap_or_else(|| Err(ProviderError::Config("no scripted response".to_string())))
}

#[async_trait]
impl GenerativeProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate_structured(
        &self,
        prompt: &str,
        schema: &serde_json::Value,
    ) -> Result<String, ProviderError> {
        self.record(ProviderCall::Structured {
            prompt: prompt.to_string(),
            schema: schema.clone(),
        });
        next(&self.structured)
    }

    async fn generate_text(&self, prompt: &str) -> Result<String, ProviderError> {
        self.record(ProviderCall::Text {
            prompt: prompt.to_string(),
        });
        next(&self.text)
    }

    async fn generate_images(
        &self,
        request: ImageRequest<'_>,
    ) -> Result<Vec<GeneratedImage>, ProviderError> {
        self.record(ProviderCall::Images {
            prompt: request.prompt.to_string(),
            aspect_ratio: request.aspect_ratio.to_string(),
            image_count: request.image_count,
        });
        next(&self.images)
    }
}

/// A minimal batch-style profile.
pub fn sample_profile(id: &str, name: &str) -> Profile {
    Profile {
        id: id.to_string(),
        name: name.to_string(),
        age: 28,
        job: "Barista".to_string(),
        bio: "Latte art and bad puns.".to_string(),
        interests: vec!["coffee".to_string(), "puns".to_string()],
        image_url: format!("https://picsum.photos/seed/{name}0/400/600"),
        is_ai_generated_image: false,
    }
}
