//! # Content Client
//!
//! Turns the three things a session needs from the generative service
//! (a batch of profiles, a dream match, a chat reply) into typed records.
//!
//! Nothing here ever returns an error to the caller. Provider failures are
//! logged and degrade to an empty batch, no dream match, or a stock reply.

pub mod prompts;

use std::sync::Arc;

use log::{info, warn};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::core::{ChatMessage, Profile};
use crate::inference::{GenerativeProvider, ImageFormat, ImageRequest, ProviderError};

/// Reply used when the chat request fails outright.
pub const FALLBACK_REPLY: &str = "Sorry, I got distracted! What was that?";
/// Reply used when the model answers with nothing.
pub const EMPTY_REPLY: &str = "...";

/// Persona fields as the model returns them, before an id and image are attached.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct ProfileDraft {
    pub name: String,
    pub age: u32,
    pub job: String,
    pub bio: String,
    pub interests: Vec<String>,
}

impl ProfileDraft {
    fn into_profile(self, image_url: String, is_ai_generated_image: bool) -> Profile {
        Profile {
            id: uuid::Uuid::new_v4().to_string(),
            name: self.name,
            age: self.age,
            job: self.job,
            bio: self.bio,
            interests: self.interests,
            image_url,
            is_ai_generated_image,
        }
    }
}

fn parse_json<T: DeserializeOwned>(raw: &str) -> Result<T, ProviderError> {
    serde_json::from_str(raw.trim()).map_err(|e| ProviderError::Parse(e.to_string()))
}

pub struct ContentClient {
    provider: Arc<dyn GenerativeProvider>,
}

impl ContentClient {
    pub fn new(provider: Arc<dyn GenerativeProvider>) -> Self {
        Self { provider }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Requests `count` profiles in one structured call.
    /// Returns whatever the model produced (possibly fewer), or nothing on failure.
    pub async fn generate_profiles(&self, count: usize) -> Vec<Profile> {
        if count == 0 {
            return Vec::new();
        }
        match self.fetch_profiles(count).await {
            Ok(profiles) => {
                info!("Generated {} of {} requested profile(s)", profiles.len(), count);
                profiles
            }
            Err(e) => {
                warn!("Error generating profiles: {}", e);
                Vec::new()
            }
        }
    }

    async fn fetch_profiles(&self, count: usize) -> Result<Vec<Profile>, ProviderError> {
        let raw = self
            .provider
            .generate_structured(
                &prompts::profile_batch_prompt(count),
                &prompts::profile_list_schema(),
            )
            .await?;
        let drafts: Vec<ProfileDraft> = parse_json(&raw)?;

        Ok(drafts
            .into_iter()
            .enumerate()
            .map(|(index, draft)| {
                let image_url = prompts::placeholder_image_url(&draft.name, index);
                draft.into_profile(image_url, false)
            })
            .collect())
    }

    /// Portrait first, then persona details. Both must succeed.
    pub async fn generate_dream_match(&self, description: &str) -> Option<Profile> {
        match self.fetch_dream_match(description).await {
            Ok(profile) => {
                info!("Dream match created: {} ({})", profile.name, profile.id);
                Some(profile)
            }
            Err(e) => {
                warn!("Error creating dream match: {}", e);
                None
            }
        }
    }

    async fn fetch_dream_match(&self, description: &str) -> Result<Profile, ProviderError> {
        let portrait_prompt = prompts::portrait_prompt(description);
        let image = self
            .provider
            .generate_images(ImageRequest {
                prompt: &portrait_prompt,
                aspect_ratio: prompts::PORTRAIT_ASPECT_RATIO,
                image_count: 1,
                output_format: ImageFormat::Jpeg,
            })
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::Parse("no image generated".to_string()))?;

        let raw = self
            .provider
            .generate_structured(
                &prompts::persona_prompt(description),
                &prompts::persona_schema(),
            )
            .await?;
        let draft: ProfileDraft = parse_json(&raw)?;

        Ok(draft.into_profile(image.to_data_url(), true))
    }

    /// In-character reply to `user_message`, which is normally the last entry of `history`.
    pub async fn generate_chat_reply(
        &self,
        persona: &Profile,
        history: &[ChatMessage],
        user_message: &str,
    ) -> String {
        let prompt = prompts::chat_prompt(persona, history, user_message);
        match self.provider.generate_text(&prompt).await {
            Ok(text) if text.is_empty() => EMPTY_REPLY.to_string(),
            Ok(text) => text,
            Err(e) => {
                warn!("Chat error for {}: {}", persona.id, e);
                FALLBACK_REPLY.to_string()
            }
        }
    }
}
