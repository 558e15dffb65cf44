//! Property-based tests for the session reducer
//!
//! These tests verify key invariants hold across arbitrary action sequences.

use super::action::*;
use super::state::*;
use crate::test_support::sample_profile;
use proptest::prelude::*;

// ============================================================================
// Test Helpers
// ============================================================================

fn deck(len: usize) -> Vec<crate::core::profile::Profile> {
    (0..len)
        .map(|i| sample_profile(&format!("p{i}"), &format!("Name{i}")))
        .collect()
}

fn session_with(len: usize, settings: DeckSettings) -> Session {
    let mut session = Session::new(settings);
    session.profile_queue = deck(len);
    session
}

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_swipe() -> impl Strategy<Value = bool> {
    // true = like, false = pass
    any::<bool>()
}

fn arb_view() -> impl Strategy<Value = View> {
    prop_oneof![
        Just(View::Discover),
        Just(View::Matches),
        Just(View::Chat),
        Just(View::CreateMatch),
    ]
}

fn arb_action(max_id: usize) -> impl Strategy<Value = Action> {
    prop_oneof![
        Just(Action::Like),
        Just(Action::Pass),
        (0..max_id).prop_map(|i| Action::OpenChat(format!("p{i}"))),
        Just(Action::BackToMatches),
        Just(Action::ToggleCreateMatch),
        arb_view().prop_map(Action::SetView),
        "[a-z]{1,8}".prop_map(Action::SendMessage),
        (0..max_id).prop_map(|i| Action::ReplyReceived {
            match_id: format!("p{i}"),
            text: "ok".to_string(),
        }),
    ]
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_matches_are_exactly_the_liked_profiles(
        swipes in prop::collection::vec(arb_swipe(), 0..40),
        len in 0usize..30,
    ) {
        let mut session = session_with(len, DeckSettings::default());
        let mut expected: Vec<String> = Vec::new();

        for (i, like) in swipes.iter().enumerate() {
            if *like {
                if i < len {
                    expected.insert(0, format!("p{i}"));
                }
                update(&mut session, Action::Like);
            } else {
                update(&mut session, Action::Pass);
            }
        }

        let actual: Vec<String> = session.matches.iter().map(|m| m.id.clone()).collect();
        prop_assert_eq!(&actual, &expected);
        for id in &expected {
            prop_assert!(session.history(id).is_empty());
        }
        prop_assert_eq!(session.chat_histories.len(), expected.len());
        prop_assert_eq!(session.active_profile_index, swipes.len());
    }

    #[test]
    fn prop_active_match_is_always_a_match(
        actions in prop::collection::vec(arb_action(8), 0..60),
    ) {
        let mut session = session_with(8, DeckSettings::default());
        for action in actions {
            update(&mut session, action);
            if let Some(id) = session.active_match_id.as_deref() {
                prop_assert!(session.find_match(id).is_some());
            }
            for m in &session.matches {
                prop_assert!(session.chat_histories.contains_key(&m.id));
            }
        }
    }

    #[test]
    fn prop_histories_only_grow(
        actions in prop::collection::vec(arb_action(6), 0..60),
    ) {
        let mut session = session_with(6, DeckSettings::default());
        for action in actions {
            let before = session.chat_histories.clone();
            update(&mut session, action);
            for (id, old) in &before {
                let new = session.history(id);
                prop_assert!(new.len() >= old.len());
                prop_assert_eq!(&new[..old.len()], old.as_slice());
            }
        }
    }

    #[test]
    fn prop_one_refill_per_crossing(
        len in 0usize..20,
        threshold in 0usize..5,
        swipes in 1usize..40,
    ) {
        let settings = DeckSettings { refill_threshold: threshold, ..DeckSettings::default() };
        let mut session = session_with(len, settings);

        let requests = (0..swipes)
            .filter(|_| matches!(update(&mut session, Action::Pass), Effect::LoadProfiles { .. }))
            .count();

        // Nothing lands in between, so a single crossing means a single request.
        let crossed = swipes + threshold >= len;
        prop_assert_eq!(requests, usize::from(crossed));
        prop_assert_eq!(session.refill_pending, crossed);
    }
}
