//! Property-based tests for backoff and the retry state machine
//!
//! These tests verify the attempt bound and backoff window hold for all
//! observation sequences.

use super::outcome::{CompletionOutcome, TRANSPORT_MESSAGE_LIMIT};
use super::retry::{backoff, AttemptState, Observation, Step};
use proptest::prelude::*;
use std::time::Duration;

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_observation() -> impl Strategy<Value = Observation> {
    prop_oneof![
        3 => Just(Observation::RateLimited),
        1 => proptest::option::of("[a-zA-Z ]{1,30}").prop_map(Observation::Completed),
        1 => (400u16..600)
            .prop_filter("not 429", |s| *s != 429)
            .prop_map(|status| Observation::Rejected {
                status,
                body: "error".to_string(),
            }),
        1 => ".{0,200}".prop_map(Observation::TransportFailed),
    ]
}

/// Drive the machine over `observations` until it finishes
fn drive(max_attempts: u32, observations: &[Observation]) -> (u32, Option<CompletionOutcome>) {
    let mut state = AttemptState::first(max_attempts);
    let mut attempts = 0;
    for observation in observations {
        attempts += 1;
        match state.step(observation.clone(), 0.5) {
            Step::Retry { next, .. } => state = next,
            Step::Done(outcome) => return (attempts, Some(outcome)),
        }
    }
    (attempts, None)
}

proptest! {
    // backoff(n) lies in [2^n, 2^n + 1)
    #[test]
    fn prop_backoff_bounds(attempt in 0u32..10, jitter in 0.0f64..1.0) {
        let delay = backoff(attempt, jitter);
        let floor = Duration::from_secs(1 << attempt);
        prop_assert!(delay >= floor);
        prop_assert!(delay < floor + Duration::from_secs(1));
    }

    // Worst-case delay for n never exceeds best-case delay for n + 1
    #[test]
    fn prop_backoff_non_decreasing(attempt in 0u32..10, a in 0.0f64..1.0, b in 0.0f64..1.0) {
        prop_assert!(backoff(attempt, a) <= backoff(attempt + 1, b));
    }

    // The machine never makes more than max_attempts attempts
    #[test]
    fn prop_attempts_bounded(
        max_attempts in 1u32..6,
        observations in prop::collection::vec(arb_observation(), 10),
    ) {
        let (attempts, outcome) = drive(max_attempts, &observations);
        prop_assert!(attempts <= max_attempts);
        prop_assert!(outcome.is_some(), "must finish within the budget");
    }

    // Only a rate limit on the final attempt yields ExhaustedRetries
    #[test]
    fn prop_all_rate_limited_exhausts(max_attempts in 1u32..6) {
        let observations = vec![Observation::RateLimited; 10];
        let (attempts, outcome) = drive(max_attempts, &observations);
        prop_assert_eq!(attempts, max_attempts);
        let expected = CompletionOutcome::ExhaustedRetries { attempts: max_attempts };
        prop_assert_eq!(outcome, Some(expected));
    }

    // Non-rate-limit observations always finish on the spot
    #[test]
    fn prop_non_rate_limit_is_terminal(
        max_attempts in 1u32..6,
        observation in arb_observation()
            .prop_filter("terminal", |o| *o != Observation::RateLimited),
    ) {
        let step = AttemptState::first(max_attempts).step(observation, 0.5);
        let Step::Done(outcome) = step else {
            return Err(TestCaseError::fail("expected a terminal step"));
        };
        let exhausted = matches!(outcome, CompletionOutcome::ExhaustedRetries { .. });
        prop_assert!(!exhausted);
        if let CompletionOutcome::TransportError { message } = outcome {
            prop_assert!(message.chars().count() <= TRANSPORT_MESSAGE_LIMIT);
        }
    }
}
