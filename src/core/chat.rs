use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Who wrote a chat message.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Copy)]
pub enum Sender {
    #[serde(rename = "user")]
    User,
    #[serde(rename = "match")]
    Match,
}

/// One line of a conversation. Histories are ordered by append order;
/// two messages may share a timestamp.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub sender: Sender,
    pub text: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
}

impl ChatMessage {
    pub fn new(sender: Sender, text: String) -> Self {
        Self {
            sender,
            text,
            timestamp: Utc::now().timestamp_millis(),
        }
    }

    pub fn from_user(text: String) -> Self {
        Self::new(Sender::User, text)
    }

    pub fn from_match(text: String) -> Self {
        Self::new(Sender::Match, text)
    }
}
