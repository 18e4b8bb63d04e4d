//! Property-based tests for the history window
//!
//! These tests verify the capacity and eviction invariants across arbitrary
//! append sequences.

use super::*;
use proptest::prelude::*;

fn run<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("runtime")
        .block_on(future)
}

fn arb_key() -> impl Strategy<Value = ConversationKey> {
    prop_oneof![Just("alpha"), Just("beta"), Just("gamma")].prop_map(ConversationKey::from)
}

proptest! {
    // Invariant: stored length never exceeds 2 * max_turn_pairs
    #[test]
    fn prop_length_never_exceeds_capacity(
        max_pairs in 0usize..8,
        appends in 0usize..40,
    ) {
        run(async {
            let store = HistoryStore::new(max_pairs);
            let key = ConversationKey::from("general");
            for i in 0..appends {
                store
                    .append(&key, Turn::user(format!("q{i}")), Turn::model(format!("a{i}")))
                    .await;
                let len = store.get(&key).await.len();
                prop_assert!(len <= 2 * max_pairs, "len {} > cap {}", len, 2 * max_pairs);
            }
            Ok(())
        })?;
    }

    // Invariant: the window is exactly the most recent pairs, in order
    #[test]
    fn prop_retains_most_recent_suffix(
        max_pairs in 1usize..8,
        appends in 1usize..40,
    ) {
        run(async {
            let store = HistoryStore::new(max_pairs);
            let key = ConversationKey::from("general");
            for i in 0..appends {
                store
                    .append(&key, Turn::user(format!("q{i}")), Turn::model(format!("a{i}")))
                    .await;
            }

            let kept = appends.min(max_pairs);
            let expected: Vec<Turn> = (appends - kept..appends)
                .flat_map(|i| [Turn::user(format!("q{i}")), Turn::model(format!("a{i}"))])
                .collect();
            prop_assert_eq!(store.get(&key).await, expected);
            Ok(())
        })?;
    }

    // Invariant: windows always alternate user/model starting with user
    #[test]
    fn prop_window_starts_on_pair_boundary(
        keys in prop::collection::vec(arb_key(), 0..50),
        max_pairs in 1usize..6,
    ) {
        run(async {
            let store = HistoryStore::new(max_pairs);
            for (i, key) in keys.iter().enumerate() {
                store
                    .append(key, Turn::user(format!("q{i}")), Turn::model(format!("a{i}")))
                    .await;
            }
            for key in &keys {
                let turns = store.get(key).await;
                prop_assert!(turns.len() % 2 == 0);
                for (idx, turn) in turns.iter().enumerate() {
                    let expected = if idx % 2 == 0 { Role::User } else { Role::Model };
                    prop_assert_eq!(turn.role(), expected);
                }
            }
            Ok(())
        })?;
    }
}
