//! # Session State
//!
//! Everything one user session knows, in one record. No UI types and no
//! handles to I/O live here; the runtime owns those.
//!
//! ```text
//! Session
//! ├── view: View                         // which screen is showing
//! ├── profile_queue: Vec<Profile>        // the swipe deck
//! ├── active_profile_index: usize        // cursor into the deck (may run past the end)
//! ├── matches: Vec<Profile>              // liked profiles, most recent first
//! ├── chat_histories: HashMap            // match id -> messages, append-only
//! ├── active_match_id: Option<String>    // open conversation
//! ├── is_loading: bool                   // initial deck load in flight
//! ├── is_creating_match: bool            // dream match in flight
//! ├── dream_match_prompt: String         // free-text dream match description
//! ├── refill_pending: bool               // background deck top-up in flight
//! ├── pending_replies: HashSet<String>   // match ids awaiting a reply
//! └── deck: DeckSettings                 // batch sizes and refill threshold
//! ```
//!
//! State changes only happen through `update(state, action)` in action.rs.
//! Derived views (current profile, active match, active chat) are computed
//! on demand from the record, never stored.

use std::collections::{HashMap, HashSet};

use crate::core::chat::ChatMessage;
use crate::core::profile::Profile;

pub const DEFAULT_INITIAL_BATCH: usize = 5;
pub const DEFAULT_REFILL_BATCH: usize = 3;
pub const DEFAULT_REFILL_THRESHOLD: usize = 2;

/// Which screen the session is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Discover,
    Matches,
    Chat,
    CreateMatch,
}

impl View {
    pub fn label(self) -> &'static str {
        match self {
            View::Discover => "discover",
            View::Matches => "matches",
            View::Chat => "chat",
            View::CreateMatch => "create-match",
        }
    }
}

/// Deck sizing knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeckSettings {
    /// Profiles requested when the session starts.
    pub initial_batch: usize,
    /// Profiles requested by each background top-up.
    pub refill_batch: usize,
    /// A top-up starts once this many or fewer profiles remain ahead of the cursor.
    pub refill_threshold: usize,
}

impl Default for DeckSettings {
    fn default() -> Self {
        Self {
            initial_batch: DEFAULT_INITIAL_BATCH,
            refill_batch: DEFAULT_REFILL_BATCH,
            refill_threshold: DEFAULT_REFILL_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Session {
    pub view: View,
    pub profile_queue: Vec<Profile>,
    pub active_profile_index: usize,
    pub matches: Vec<Profile>,
    pub chat_histories: HashMap<String, Vec<ChatMessage>>,
    pub active_match_id: Option<String>,
    pub is_loading: bool,
    pub is_creating_match: bool,
    pub dream_match_prompt: String,
    pub refill_pending: bool,
    /// Match ids with a reply request in flight.
    pub pending_replies: HashSet<String>,
    pub deck: DeckSettings,
}

impl Session {
    pub fn new(deck: DeckSettings) -> Self {
        Self {
            deck,
            ..Default::default()
        }
    }

    /// The profile under the cursor, if the cursor is still inside the deck.
    pub fn current_profile(&self) -> Option<&Profile> {
        self.profile_queue.get(self.active_profile_index)
    }

    /// Profiles left in the deck counting the current one.
    pub fn remaining_profiles(&self) -> usize {
        self.profile_queue
            .len()
            .saturating_sub(self.active_profile_index)
    }

    pub fn find_match(&self, id: &str) -> Option<&Profile> {
        self.matches.iter().find(|m| m.id == id)
    }

    pub fn active_match(&self) -> Option<&Profile> {
        self.active_match_id
            .as_deref()
            .and_then(|id| self.find_match(id))
    }

    /// Messages of the open conversation; empty when no chat is open.
    pub fn active_chat_messages(&self) -> &[ChatMessage] {
        self.active_match_id
            .as_deref()
            .and_then(|id| self.chat_histories.get(id))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn history(&self, match_id: &str) -> &[ChatMessage] {
        self.chat_histories
            .get(match_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// True while the open conversation is waiting on a reply.
    pub fn is_match_typing(&self) -> bool {
        self.active_match_id
            .as_deref()
            .is_some_and(|id| self.pending_replies.contains(id))
    }
}
