//! Gemini provider implementation using the Generative Language REST API.
//!
//! Text and structured output go through `models/{model}:generateContent`.
//! Portraits go through the Imagen `models/{model}:predict` endpoint.
//! Both authenticate with the `x-goog-api-key` header.

use async_trait::async_trait;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::inference::{GeneratedImage, GenerativeProvider, ImageRequest, ProviderError};

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_TEXT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_IMAGE_MODEL: &str = "imagen-4.0-generate-001";

// ============================================================================
// generateContent Types
// ============================================================================

#[derive(Serialize, Debug)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize, Debug)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    response_mime_type: &'static str,
    response_schema: &'a serde_json::Value,
}

/// The request body for generateContent
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig<'a>>,
}

#[derive(Deserialize, Debug, Default)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: CandidateContent,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize, Debug)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

// ============================================================================
// Imagen predict Types
// ============================================================================

#[derive(Serialize, Debug)]
struct PredictInstance<'a> {
    prompt: &'a str,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct OutputOptions {
    mime_type: &'static str,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct PredictParameters<'a> {
    sample_count: u8,
    aspect_ratio: &'a str,
    output_options: OutputOptions,
}

#[derive(Serialize, Debug)]
struct PredictRequest<'a> {
    instances: Vec<PredictInstance<'a>>,
    parameters: PredictParameters<'a>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct Prediction {
    #[serde(default)]
    bytes_base64_encoded: Option<String>,
    #[serde(default)]
    mime_type: Option<String>,
}

#[derive(Deserialize, Debug)]
struct PredictResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
}

// ============================================================================
// Translation Layer
// ============================================================================

fn text_request<'a>(
    prompt: &'a str,
    schema: Option<&'a serde_json::Value>,
) -> GenerateContentRequest<'a> {
    GenerateContentRequest {
        contents: vec![Content {
            role: "user",
            parts: vec![Part { text: prompt }],
        }],
        generation_config: schema.map(|response_schema| GenerationConfig {
            response_mime_type: "application/json",
            response_schema,
        }),
    }
}

fn image_request<'a>(request: &ImageRequest<'a>) -> PredictRequest<'a> {
    PredictRequest {
        instances: vec![PredictInstance {
            prompt: request.prompt,
        }],
        parameters: PredictParameters {
            sample_count: request.image_count,
            aspect_ratio: request.aspect_ratio,
            output_options: OutputOptions {
                mime_type: request.output_format.mime_type(),
            },
        },
    }
}

/// Joins the text parts of the first candidate.
/// A response with no candidates is a parse failure; a candidate with no text is "".
fn first_candidate_text(response: GenerateContentResponse) -> Result<String, ProviderError> {
    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::Parse("response contained no candidates".to_string()))?;

    if let Some(reason) = candidate.finish_reason.as_deref()
        && reason != "STOP"
    {
        debug!("Gemini candidate finished with reason {}", reason);
    }

    Ok(candidate
        .content
        .parts
        .into_iter()
        .filter_map(|p| p.text)
        .collect())
}

/// Keeps predictions that actually carry bytes. Missing mime types fall back to the requested one.
fn predictions_to_images(response: PredictResponse, requested_mime: &str) -> Vec<GeneratedImage> {
    response
        .predictions
        .into_iter()
        .filter_map(|p| {
            let data = p.bytes_base64_encoded.filter(|b| !b.is_empty())?;
            Some(GeneratedImage {
                mime_type: p.mime_type.unwrap_or_else(|| requested_mime.to_string()),
                data_base64: data,
            })
        })
        .collect()
}

// ============================================================================
// Provider Implementation
// ============================================================================

/// Gemini API provider (text via Gemini, images via Imagen)
pub struct GeminiProvider {
    api_key: String,
    base_url: String,
    text_model: String,
    image_model: String,
    client: reqwest::Client,
}

impl GeminiProvider {
    /// Creates a new Gemini provider.
    ///
    /// # Arguments
    /// * `api_key` - Generative Language API key
    /// * `base_url` - Optional custom base URL (defaults to Google's v1beta endpoint)
    pub fn new(api_key: String, base_url: Option<String>) -> Self {
        Self {
            api_key,
            base_url: base_url.unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string()),
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn with_models(mut self, text_model: String, image_model: String) -> Self {
        self.text_model = text_model;
        self.image_model = image_model;
        self
    }

    /// POSTs `body` to `models/{model}:{method}` and returns the successful response.
    async fn send_request<T: Serialize>(
        &self,
        model: &str,
        method: &str,
        body: &T,
    ) -> Result<reqwest::Response, ProviderError> {
        if self.api_key.is_empty() {
            return Err(ProviderError::Config("Gemini API key is empty".to_string()));
        }

        let json_body = serde_json::to_string(body)
            .map_err(|e| ProviderError::Parse(format!("Request serialization failed: {e}")))?;
        debug!("Gemini {}:{} request: {} bytes", model, method, json_body.len());

        let response = self
            .client
            .post(format!("{}/models/{}:{}", self.base_url, model, method))
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .body(json_body)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        debug!("Gemini response status: {}", response.status());

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let err_body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            warn!("Gemini API error: {} - {}", status, err_body);
            return Err(ProviderError::Api {
                status,
                message: err_body,
            });
        }

        Ok(response)
    }

    async fn generate_content(
        &self,
        prompt: &str,
        schema: Option<&serde_json::Value>,
    ) -> Result<String, ProviderError> {
        info!(
            "Gemini generateContent: model={}, prompt_len={}, structured={}",
            self.text_model,
            prompt.len(),
            schema.is_some()
        );
        let request = text_request(prompt, schema);
        let response = self
            .send_request(&self.text_model, "generateContent", &request)
            .await?;
        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;
        first_candidate_text(parsed)
    }
}

#[async_trait]
impl GenerativeProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate_structured(
        &self,
        prompt: &str,
        schema: &serde_json::Value,
    ) -> Result<String, ProviderError> {
        self.generate_content(prompt, Some(schema)).await
    }

    async fn generate_text(&self, prompt: &str) -> Result<String, ProviderError> {
        self.generate_content(prompt, None).await
    }

    async fn generate_images(
        &self,
        request: ImageRequest<'_>,
    ) -> Result<Vec<GeneratedImage>, ProviderError> {
        info!(
            "Imagen predict: model={}, count={}, aspect_ratio={}",
            self.image_model, request.image_count, request.aspect_ratio
        );
        let body = image_request(&request);
        let response = self
            .send_request(&self.image_model, "predict", &body)
            .await?;
        let parsed: PredictResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;
        let images = predictions_to_images(parsed, request.output_format.mime_type());
        info!("Imagen returned {} image(s)", images.len());
        Ok(images)
    }
}
