//! # Session Runtime
//!
//! Owns a `Session` and carries out the `Effect`s that `update()` returns.
//! Every effect becomes one tokio task that awaits the content client and
//! sends exactly one completion `Action` back over a channel. Completions are
//! applied by whoever owns the runtime, in arrival order, through the same
//! `update()` as user actions.
//!
//! ```text
//!  dispatch(Action) ──► update() ──► Effect ──► tokio::spawn ──► ContentClient
//!        ▲                                                          │
//!        └──────────── completion Action ◄── mpsc ◄─────────────────┘
//! ```
//!
//! Nothing is cancelled once started.

use std::sync::Arc;

use log::{debug, info, warn};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::content::ContentClient;
use crate::core::{Action, DeckSettings, Effect, Session, update};

pub struct SessionRuntime {
    session: Session,
    content: Arc<ContentClient>,
    tx: UnboundedSender<Action>,
    rx: UnboundedReceiver<Action>,
    /// Spawned tasks whose completion has not been received yet.
    in_flight: usize,
}

impl SessionRuntime {
    pub fn new(content: Arc<ContentClient>, deck: DeckSettings) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            session: Session::new(deck),
            content,
            tx,
            rx,
            in_flight: 0,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Applies an action and starts whatever work it asks for.
    /// Returns without waiting for that work.
    pub fn dispatch(&mut self, action: Action) {
        debug!("Dispatch: {:?}", action);
        let effect = update(&mut self.session, action);
        self.execute(effect);
    }

    /// Applies every completion that has already arrived. Never waits.
    pub fn drain(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(action) = self.rx.try_recv() {
            self.in_flight = self.in_flight.saturating_sub(1);
            self.dispatch(action);
            applied += 1;
        }
        applied
    }

    /// Waits for the next completion. `None` when nothing is in flight.
    /// Cancel-safe: dropping the future loses no completion.
    pub async fn next_completion(&mut self) -> Option<Action> {
        if self.in_flight == 0 {
            return None;
        }
        let action = self.rx.recv().await?;
        self.in_flight -= 1;
        Some(action)
    }

    /// Waits for one completion and applies it. Returns false when idle.
    pub async fn step(&mut self) -> bool {
        match self.next_completion().await {
            Some(action) => {
                self.dispatch(action);
                true
            }
            None => false,
        }
    }

    /// Runs until every started request has completed and been applied.
    pub async fn settle(&mut self) {
        while self.step().await {}
    }

    fn execute(&mut self, effect: Effect) {
        let content = self.content.clone();
        let tx = self.tx.clone();

        match effect {
            Effect::None => return,
            Effect::LoadProfiles { count, purpose } => {
                info!("Spawning {:?} profile load (count={})", purpose, count);
                tokio::spawn(async move {
                    let profiles = content.generate_profiles(count).await;
                    send(&tx, Action::ProfilesLoaded { purpose, profiles });
                });
            }
            Effect::RequestReply {
                persona,
                history,
                text,
            } => {
                info!(
                    "Spawning chat reply for {} (history={})",
                    persona.id,
                    history.len()
                );
                tokio::spawn(async move {
                    let reply = content.generate_chat_reply(&persona, &history, &text).await;
                    send(
                        &tx,
                        Action::ReplyReceived {
                            match_id: persona.id,
                            text: reply,
                        },
                    );
                });
            }
            Effect::RequestDreamMatch { description } => {
                info!("Spawning dream match request");
                tokio::spawn(async move {
                    let profile = content.generate_dream_match(&description).await;
                    send(&tx, Action::DreamMatchReady(profile));
                });
            }
        }
        self.in_flight += 1;
    }
}

fn send(tx: &UnboundedSender<Action>, action: Action) {
    if tx.send(action).is_err() {
        warn!("Failed to deliver completion: runtime dropped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::FALLBACK_REPLY;
    use crate::core::{Sender, View};
    use crate::inference::ProviderError;
    use crate::test_support::{ProviderCall, ScriptedProvider};

    fn batch_json(names: &[&str]) -> String {
        let items: Vec<String> = names
            .iter()
            .map(|n| {
                format!(
                    r#"{{"name":"{n}","age":25,"job":"Florist","bio":"Petal pusher.","interests":["plants"]}}"#
                )
            })
            .collect();
        format!("[{}]", items.join(","))
    }

    fn runtime(provider: &Arc<ScriptedProvider>) -> SessionRuntime {
        let content = Arc::new(ContentClient::new(provider.clone()));
        SessionRuntime::new(content, DeckSettings::default())
    }

    async fn started(provider: &Arc<ScriptedProvider>, names: &[&str]) -> SessionRuntime {
        provider.push_structured(Ok(batch_json(names)));
        let mut rt = runtime(provider);
        rt.dispatch(Action::Start);
        rt.settle().await;
        rt
    }

    fn structured_calls(provider: &ScriptedProvider) -> usize {
        provider
            .calls()
            .iter()
            .filter(|c| matches!(c, ProviderCall::Structured { .. }))
            .count()
    }

    #[tokio::test]
    async fn test_initial_load_with_short_batch() {
        let provider = Arc::new(ScriptedProvider::new());
        provider.push_structured(Ok(batch_json(&["Ann", "Bo"])));
        let mut rt = runtime(&provider);

        rt.dispatch(Action::Start);
        assert!(rt.session().is_loading);
        assert_eq!(rt.in_flight(), 1);

        rt.settle().await;

        assert!(!rt.session().is_loading);
        assert_eq!(rt.session().profile_queue.len(), 2);
        assert_eq!(rt.session().profile_queue[0].name, "Ann");
        assert!(
            matches!(&provider.calls()[0], ProviderCall::Structured { prompt, .. } if prompt.starts_with("Generate 5 "))
        );
    }

    #[tokio::test]
    async fn test_initial_load_failure_leaves_empty_deck() {
        let provider = Arc::new(ScriptedProvider::new());
        provider.push_structured(Err(ProviderError::Network("down".to_string())));
        let mut rt = runtime(&provider);

        rt.dispatch(Action::Start);
        rt.settle().await;

        assert!(!rt.session().is_loading);
        assert!(rt.session().profile_queue.is_empty());
        assert!(rt.session().current_profile().is_none());
    }

    #[tokio::test]
    async fn test_swipe_does_not_wait_for_refill() {
        let provider = Arc::new(ScriptedProvider::new());
        let mut rt = started(&provider, &["A", "B", "C"]).await;
        provider.push_structured(Ok(batch_json(&["D", "E", "F"])));

        // 3 profiles, threshold 2: the first pass crosses it.
        rt.dispatch(Action::Pass);
        assert_eq!(rt.session().active_profile_index, 1);
        assert_eq!(rt.session().profile_queue.len(), 3);
        assert!(rt.session().refill_pending);

        rt.dispatch(Action::Like);
        rt.dispatch(Action::Pass);
        assert_eq!(rt.in_flight(), 1);

        rt.settle().await;
        assert_eq!(rt.session().profile_queue.len(), 6);
        assert_eq!(rt.session().current_profile().unwrap().name, "D");
        assert_eq!(rt.session().matches[0].name, "B");
        assert_eq!(structured_calls(&provider), 2);
        assert!(
            matches!(&provider.calls()[1], ProviderCall::Structured { prompt, .. } if prompt.starts_with("Generate 3 "))
        );
    }

    #[tokio::test]
    async fn test_chat_exchange_round_trip() {
        let provider = Arc::new(ScriptedProvider::new());
        let mut rt = started(&provider, &["Ann", "Bo", "Cy", "Di", "Ed"]).await;
        let ann = rt.session().current_profile().unwrap().id.clone();

        rt.dispatch(Action::Like);
        rt.dispatch(Action::OpenChat(ann.clone()));
        provider.push_text(Ok("Hi yourself.".to_string()));
        rt.dispatch(Action::SendMessage("Hi!".to_string()));

        // The user's line is visible before the reply lands.
        assert_eq!(rt.session().active_chat_messages().len(), 1);
        assert!(rt.session().is_match_typing());

        rt.settle().await;
        let messages = rt.session().active_chat_messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].sender, Sender::Match);
        assert_eq!(messages[1].text, "Hi yourself.");
        assert!(!rt.session().is_match_typing());

        // The transcript sent to the model already ends with the user's line.
        let prompt = provider
            .calls()
            .into_iter()
            .find_map(|c| match c {
                ProviderCall::Text { prompt } => Some(prompt),
                _ => None,
            })
            .unwrap();
        assert!(prompt.contains("Current conversation history:\nUser: Hi!\n"));
        assert!(prompt.contains("User just said: \"Hi!\""));
    }

    #[tokio::test]
    async fn test_failed_reply_uses_fallback_line() {
        let provider = Arc::new(ScriptedProvider::new());
        let mut rt = started(&provider, &["Ann", "Bo", "Cy", "Di", "Ed"]).await;
        let ann = rt.session().current_profile().unwrap().id.clone();
        rt.dispatch(Action::Like);
        rt.dispatch(Action::OpenChat(ann));

        provider.push_text(Err(ProviderError::Api {
            status: 503,
            message: "busy".to_string(),
        }));
        rt.dispatch(Action::SendMessage("Hello?".to_string()));
        rt.settle().await;

        let messages = rt.session().active_chat_messages();
        assert_eq!(messages[1].text, FALLBACK_REPLY);
    }

    #[tokio::test]
    async fn test_refill_and_reply_in_flight_together() {
        let provider = Arc::new(ScriptedProvider::new());
        let mut rt = started(&provider, &["Ann", "Bo", "Cy"]).await;
        let ann = rt.session().current_profile().unwrap().id.clone();

        provider.push_structured(Ok(batch_json(&["Di"])));
        provider.push_text(Ok("hey".to_string()));

        rt.dispatch(Action::Like); // crosses the threshold
        rt.dispatch(Action::OpenChat(ann.clone()));
        rt.dispatch(Action::SendMessage("yo".to_string()));
        assert_eq!(rt.in_flight(), 2);

        rt.settle().await;
        assert_eq!(rt.session().profile_queue.len(), 4);
        assert_eq!(rt.session().history(&ann).len(), 2);
        assert!(!rt.session().refill_pending);
    }

    #[tokio::test]
    async fn test_dream_match_goes_to_front_of_deck() {
        let provider = Arc::new(ScriptedProvider::new());
        let mut rt = started(&provider, &["Ann", "Bo", "Cy", "Di", "Ed"]).await;
        rt.dispatch(Action::Pass);
        rt.dispatch(Action::Pass);

        provider.push_image("/9j/AAAA");
        provider.push_structured(Ok(
            r#"{"name":"Remy","age":30,"job":"Chef","bio":"Sauce boss.","interests":["markets","knives"]}"#
                .to_string(),
        ));

        rt.dispatch(Action::ToggleCreateMatch);
        rt.dispatch(Action::SetDreamPrompt("adventurous chef".to_string()));
        rt.dispatch(Action::CreateDreamMatch);
        assert!(rt.session().is_creating_match);

        rt.settle().await;
        let session = rt.session();
        assert!(!session.is_creating_match);
        assert_eq!(session.view, View::Discover);
        assert_eq!(session.active_profile_index, 0);
        assert_eq!(session.profile_queue.len(), 6);
        let dream = session.current_profile().unwrap();
        assert_eq!(dream.name, "Remy");
        assert!(dream.is_ai_generated_image);
        assert!(dream.image_url.starts_with("data:image/jpeg;base64,"));
    }

    #[tokio::test]
    async fn test_empty_dream_prompt_makes_no_request() {
        let provider = Arc::new(ScriptedProvider::new());
        let mut rt = started(&provider, &["Ann"]).await;
        let calls_before = provider.calls().len();

        rt.dispatch(Action::ToggleCreateMatch);
        rt.dispatch(Action::CreateDreamMatch);

        assert_eq!(rt.in_flight(), 0);
        assert!(!rt.session().is_creating_match);
        assert_eq!(rt.session().view, View::CreateMatch);
        assert_eq!(provider.calls().len(), calls_before);
    }

    #[tokio::test]
    async fn test_drain_applies_only_finished_work() {
        let provider = Arc::new(ScriptedProvider::new());
        provider.push_structured(Ok(batch_json(&["Ann"])));
        let mut rt = runtime(&provider);

        assert_eq!(rt.drain(), 0);
        rt.dispatch(Action::Start);
        // Let the spawned task run to completion on this thread.
        while rt.session().is_loading {
            tokio::task::yield_now().await;
            rt.drain();
        }
        assert_eq!(rt.in_flight(), 0);
        assert_eq!(rt.session().profile_queue.len(), 1);
        assert!(rt.next_completion().await.is_none());
    }
}
