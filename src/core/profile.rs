//! # Profiles
//!
//! A `Profile` is a swipeable candidate. Profiles come out of the content
//! layer fully formed and are never edited afterwards; `id` is their identity.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How many characters of an embedded image to show in Debug output.
const DEBUG_IMAGE_PREFIX: usize = 48;

#[derive(Serialize, Deserialize, Clone, PartialEq)]
pub struct Profile {
    pub id: String,
    pub name: String,
    pub age: u32,
    pub job: String,
    pub bio: String,
    pub interests: Vec<String>,
    /// Either a plain URL or a `data:` URI holding the whole image.
    pub image_url: String,
    pub is_ai_generated_image: bool,
}

impl Profile {
    pub fn has_embedded_image(&self) -> bool {
        self.image_url.starts_with("data:")
    }
}

// Embedded portraits run to hundreds of kilobytes, which would swamp the log.
impl fmt::Debug for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let image = if self.has_embedded_image() && self.image_url.len() > DEBUG_IMAGE_PREFIX {
            let cut = self
                .image_url
                .char_indices()
                .nth(DEBUG_IMAGE_PREFIX)
                .map_or(self.image_url.len(), |(i, _)| i);
            format!("{}... ({} bytes)", &self.image_url[..cut], self.image_url.len())
        } else {
            self.image_url.clone()
        };
        f.debug_struct("Profile")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("age", &self.age)
            .field("job", &self.job)
            .field("bio", &self.bio)
            .field("interests", &self.interests)
            .field("image_url", &image)
            .field("is_ai_generated_image", &self.is_ai_generated_image)
            .finish()
    }
}
