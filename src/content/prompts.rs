//! Prompt templates, response schemas and the chat transcript format.
//!
//! Schemas use the Gemini `responseSchema` dialect (upper-case type names).

use serde_json::{Value, json};

use crate::core::{ChatMessage, Profile, Sender};

pub const PORTRAIT_ASPECT_RATIO: &str = "3:4";

const USER_LABEL: &str = "User";
const MATCH_FALLBACK_LABEL: &str = "Match";

// ============================================================================
// Profiles
// ============================================================================

pub fn profile_batch_prompt(count: usize) -> String {
    format!(
        "Generate {count} distinct dating profiles.\n\
         Each profile should have: name, age (18-35), job, a short witty bio (max 150 chars), and 3 interests.\n\
         Return JSON only."
    )
}

fn persona_properties() -> Value {
    json!({
        "name": { "type": "STRING" },
        "age": { "type": "INTEGER" },
        "job": { "type": "STRING" },
        "bio": { "type": "STRING" },
        "interests": { "type": "ARRAY", "items": { "type": "STRING" } }
    })
}

/// One persona object with every field required.
pub fn persona_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": persona_properties(),
        "required": ["name", "age", "job", "bio", "interests"]
    })
}

pub fn profile_list_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": persona_schema()
    })
}

/// Cheap stand-in portrait for batch profiles. Same name and position, same URL.
pub fn placeholder_image_url(name: &str, index: usize) -> String {
    let mut seed: String = name.chars().filter(|c| c.is_ascii_alphanumeric()).collect();
    if seed.is_empty() {
        seed.push_str("profile");
    }
    format!("https://picsum.photos/seed/{seed}{index}/400/600")
}

// ============================================================================
// Dream match
// ============================================================================

pub fn portrait_prompt(description: &str) -> String {
    format!(
        "Portrait of a person matching this description: {description}. \
         High quality, photorealistic, dating profile photo style, smiling, warm lighting."
    )
}

pub fn persona_prompt(description: &str) -> String {
    format!(
        "Create a dating profile persona based on this description: \"{description}\". Return JSON."
    )
}

// ============================================================================
// Chat
// ============================================================================

/// Label used for the persona's lines. Falls back to a neutral label when the
/// name could be confused with the user's label or the line separator.
pub fn match_label(persona_name: &str) -> &str {
    let name = persona_name.trim();
    if name.is_empty() || name == USER_LABEL || name.contains(':') || name.contains('\n') {
        MATCH_FALLBACK_LABEL
    } else {
        name
    }
}

pub fn chat_prompt(persona: &Profile, history: &[ChatMessage], user_message: &str) -> String {
    let label = match_label(&persona.name);
    let transcript = format_transcript(&persona.name, history);
    format!(
        "You are roleplaying as {name} on a dating app.\n\
         Your details: Age {age}, Job: {job}.\n\
         Bio: {bio}.\n\
         Interests: {interests}.\n\
         \n\
         Current conversation history:\n\
         {transcript}\n\
         \n\
         User just said: \"{user_message}\"\n\
         \n\
         Reply as {name}. Keep it casual, flirty if appropriate, and short (under 2 sentences).\n\
         Do not break character. Do not include \"{USER_LABEL}:\" or \"{label}:\" in your output. Just the message.",
        name = persona.name,
        age = persona.age,
        job = persona.job,
        bio = persona.bio,
        interests = persona.interests.join(", "),
    )
}

/// A transcript line read back from `format_transcript` output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptLine {
    pub sender: Sender,
    pub text: String,
}

/// `Sender: text` lines, oldest first. Backslashes and line breaks inside a
/// message are escaped so every message stays on one line.
pub fn format_transcript(persona_name: &str, history: &[ChatMessage]) -> String {
    let label = match_label(persona_name);
    history
        .iter()
        .map(|msg| {
            let who = match msg.sender {
                Sender::User => USER_LABEL,
                Sender::Match => label,
            };
            format!("{who}: {}", escape_line(&msg.text))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Inverse of `format_transcript`. Lines with an unknown label are skipped.
pub fn parse_transcript(persona_name: &str, transcript: &str) -> Vec<TranscriptLine> {
    let user_prefix = format!("{USER_LABEL}: ");
    let match_prefix = format!("{}: ", match_label(persona_name));
    transcript
        .lines()
        .filter_map(|line| {
            if let Some(rest) = line.strip_prefix(&user_prefix) {
                Some((Sender::User, rest))
            } else {
                line.strip_prefix(&match_prefix)
                    .map(|rest| (Sender::Match, rest))
            }
        })
        .map(|(sender, rest)| TranscriptLine {
            sender,
            text: unescape_line(rest),
        })
        .collect()
}

fn escape_line(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            other => out.push(other),
        }
    }
    out
}

fn unescape_line(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
