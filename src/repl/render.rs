//! Plain-text views of the session for the terminal front-end.

use std::fmt::Write;

use crate::core::{Profile, Sender, Session, View};

pub fn profile_card(profile: &Profile) -> String {
    let image = if profile.has_embedded_image() {
        format!("[AI portrait, {} KB]", profile.image_url.len() / 1024)
    } else {
        profile.image_url.clone()
    };
    format!(
        "{name}, {age} · {job}\n  {bio}\n  Interests: {interests}\n  Photo: {image}",
        name = profile.name,
        age = profile.age,
        job = profile.job,
        bio = profile.bio,
        interests = profile.interests.join(", "),
    )
}

pub fn render(session: &Session) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "── {} ──", session.view.label());

    match session.view {
        View::Discover => {
            if let Some(profile) = session.current_profile() {
                out.push_str(&profile_card(profile));
                out.push('\n');
            } else if session.is_loading {
                out.push_str("Finding people near you...\n");
            } else {
                out.push_str("No more profiles right now.\n");
            }
        }
        View::Matches => {
            if session.matches.is_empty() {
                out.push_str("No matches yet. Go like someone!\n");
            }
            for (i, m) in session.matches.iter().enumerate() {
                let last = session
                    .history(&m.id)
                    .last()
                    .map(|msg| msg.text.as_str())
                    .unwrap_or("Say hi!");
                let _ = writeln!(out, "{:>2}. {} ({}): {}", i + 1, m.name, m.age, last);
            }
        }
        View::Chat => {
            let name = session
                .active_match()
                .map(|m| m.name.as_str())
                .unwrap_or("?");
            for msg in session.active_chat_messages() {
                let who = match msg.sender {
                    Sender::User => "You",
                    Sender::Match => name,
                };
                let _ = writeln!(out, "{who}: {}", msg.text);
            }
            if session.is_match_typing() {
                let _ = writeln!(out, "{name} is typing...");
            }
        }
        View::CreateMatch => {
            if session.is_creating_match {
                out.push_str("Dreaming up your match...\n");
            } else if session.dream_match_prompt.is_empty() {
                out.push_str("Describe your dream match with `describe <text>`, then `create`.\n");
            } else {
                let _ = writeln!(out, "Description: {}", session.dream_match_prompt);
            }
        }
    }
    out
}
