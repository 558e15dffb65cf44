//! # Actions
//!
//! Everything that can happen in a session becomes an `Action`.
//! User swipes right? That's `Action::Like`.
//! A batch of profiles lands? That's `Action::ProfilesLoaded { .. }`.
//!
//! The `update()` function takes the current state and an action, mutates
//! the state and returns the `Effect` the runtime should perform. No I/O here.
//!
//! ```text
//! State + Action  →  update()  →  New State + Effect
//! ```
//!
//! Completion actions only ever touch their own slice of state (the deck,
//! one match's history, the dream-match flag), so results landing in any
//! order leave the session consistent.

use log::debug;

use crate::core::chat::ChatMessage;
use crate::core::profile::Profile;
use crate::core::state::{Session, View};

/// Why a batch of profiles was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPurpose {
    /// First deck of the session; drives `is_loading`.
    Initial,
    /// Background top-up when the deck runs low.
    Refill,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Session start: load the first deck.
    Start,
    Like,
    Pass,
    OpenChat(String),
    BackToMatches,
    ToggleCreateMatch,
    SetView(View),
    SetDreamPrompt(String),
    CreateDreamMatch,
    SendMessage(String),

    // Completions fed back by the runtime
    ProfilesLoaded {
        purpose: LoadPurpose,
        profiles: Vec<Profile>,
    },
    ReplyReceived {
        match_id: String,
        text: String,
    },
    DreamMatchReady(Option<Profile>),
}

/// Work the runtime must do after a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    None,
    LoadProfiles {
        count: usize,
        purpose: LoadPurpose,
    },
    /// `history` already ends with the user message carrying `text`.
    RequestReply {
        persona: Profile,
        history: Vec<ChatMessage>,
        text: String,
    },
    RequestDreamMatch {
        description: String,
    },
}

pub fn update(session: &mut Session, action: Action) -> Effect {
    match action {
        Action::Start => {
            if session.is_loading {
                debug!("Start ignored: initial load already in flight");
                return Effect::None;
            }
            session.is_loading = true;
            Effect::LoadProfiles {
                count: session.deck.initial_batch,
                purpose: LoadPurpose::Initial,
            }
        }
        Action::Like => {
            if let Some(profile) = session.current_profile().cloned() {
                session
                    .chat_histories
                    .entry(profile.id.clone())
                    .or_default();
                if session.find_match(&profile.id).is_none() {
                    session.matches.insert(0, profile);
                } else {
                    debug!("Like on {} ignored: already a match", profile.id);
                }
            }
            advance(session)
        }
        Action::Pass => advance(session),
        Action::OpenChat(id) => {
            if session.find_match(&id).is_some() {
                session.active_match_id = Some(id);
                session.view = View::Chat;
            } else {
                debug!("OpenChat ignored: {} is not a match", id);
            }
            Effect::None
        }
        Action::BackToMatches => {
            session.view = View::Matches;
            session.active_match_id = None;
            Effect::None
        }
        Action::ToggleCreateMatch => {
            session.view = View::CreateMatch;
            session.dream_match_prompt.clear();
            Effect::None
        }
        Action::SetView(view) => {
            session.view = view;
            Effect::None
        }
        Action::SetDreamPrompt(prompt) => {
            session.dream_match_prompt = prompt;
            Effect::None
        }
        Action::CreateDreamMatch => {
            if session.dream_match_prompt.trim().is_empty() {
                debug!("CreateDreamMatch ignored: empty prompt");
                return Effect::None;
            }
            if session.is_creating_match {
                debug!("CreateDreamMatch ignored: creation already in flight");
                return Effect::None;
            }
            session.is_creating_match = true;
            Effect::RequestDreamMatch {
                description: session.dream_match_prompt.clone(),
            }
        }
        Action::SendMessage(text) => send_message(session, text),
        Action::ProfilesLoaded { purpose, profiles } => {
            debug!("{:?} batch landed with {} profile(s)", purpose, profiles.len());
            match purpose {
                LoadPurpose::Initial => session.is_loading = false,
                LoadPurpose::Refill => session.refill_pending = false,
            }
            session.profile_queue.extend(profiles);
            Effect::None
        }
        Action::ReplyReceived { match_id, text } => {
            session.pending_replies.remove(&match_id);
            match session.chat_histories.get_mut(&match_id) {
                Some(history) => history.push(ChatMessage::from_match(text)),
                None => debug!("Reply for unknown match {} dropped", match_id),
            }
            Effect::None
        }
        Action::DreamMatchReady(profile) => {
            session.is_creating_match = false;
            if let Some(profile) = profile {
                // Shown next, ahead of the rest of the deck. Swipe position is discarded.
                session.profile_queue.insert(0, profile);
                session.active_profile_index = 0;
                session.view = View::Discover;
            }
            Effect::None
        }
    }
}

/// Moves the cursor forward and asks for a top-up when the deck runs low.
/// At most one top-up is in flight, so a run of swipes below the threshold
/// produces a single request.
fn advance(session: &mut Session) -> Effect {
    session.active_profile_index += 1;

    if session.refill_pending || session.remaining_profiles() > session.deck.refill_threshold {
        return Effect::None;
    }

    session.refill_pending = true;
    Effect::LoadProfiles {
        count: session.deck.refill_batch,
        purpose: LoadPurpose::Refill,
    }
}

fn send_message(session: &mut Session, text: String) -> Effect {
    let Some(persona) = session.active_match().cloned() else {
        debug!("SendMessage ignored: no active match");
        return Effect::None;
    };
    if text.trim().is_empty() {
        debug!("SendMessage ignored: empty text");
        return Effect::None;
    }
    if session.pending_replies.contains(&persona.id) {
        debug!("SendMessage ignored: {} is still replying", persona.id);
        return Effect::None;
    }

    session
        .chat_histories
        .entry(persona.id.clone())
        .or_default()
        .push(ChatMessage::from_user(text.clone()));
    session.pending_replies.insert(persona.id.clone());
    let history = session.history(&persona.id).to_vec();

    Effect::RequestReply {
        persona,
        history,
        text,
    }
}
