//! Property-based tests for the session state machine
//!
//! These tests verify key invariants hold across all possible inputs.

use super::state::*;
use super::transition::*;
use super::*;
use crate::contacts::normalize;
use proptest::prelude::*;

// ============================================================================
// Test Helpers
// ============================================================================

fn test_context() -> SessionContext {
    SessionContext::new(7, 7)
}

fn naming() -> Naming {
    Naming {
        contact_name: "Budi".into(),
        base_name: "kontak".into(),
    }
}

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_feature() -> impl Strategy<Value = Feature> {
    proptest::sample::select(Feature::ALL.to_vec())
}

fn arb_recipient() -> impl Strategy<Value = Recipient> {
    prop_oneof![Just(Recipient::Requester), any::<i64>().prop_map(Recipient::Chat)]
}

fn arb_progress() -> impl Strategy<Value = UploadProgress> {
    (1usize..10, 0usize..10).prop_map(|(target, uploads)| {
        let mut progress = UploadProgress::new(target);
        progress.uploads = uploads.min(target);
        progress
    })
}

/// Steps whose only valid input is a positive integer
fn arb_numeric_step() -> impl Strategy<Value = SessionState> {
    prop_oneof![
        arb_recipient().prop_map(|recipient| SessionState::Convert(ConvertStep::UploadCount {
            naming: naming(),
            recipient,
        })),
        (arb_recipient(), 1usize..10).prop_map(|(recipient, expected)| {
            SessionState::Convert(ConvertStep::SequenceStart {
                naming: naming(),
                recipient,
                expected,
            })
        }),
        Just(SessionState::ConvertAny(ConvertAnyStep::UploadCount { naming: naming() })),
        Just(SessionState::Extract(ExtractStep::LineCount)),
        Just(SessionState::CopyNumber(CopyNumberStep::ColumnIndex)),
        Just(SessionState::Split(SplitStep::SplitCount { naming: naming() })),
        Just(SessionState::Insert(InsertStep::UploadCount {
            naming: naming(),
            numbers: normalize("0812").into_iter().collect(),
        })),
    ]
}

fn arb_active_state() -> impl Strategy<Value = SessionState> {
    prop_oneof![
        arb_numeric_step(),
        Just(SessionState::Convert(ConvertStep::ContactName)),
        "[a-z]{1,8}".prop_map(|contact_name| SessionState::Split(SplitStep::BaseName {
            contact_name
        })),
        (arb_recipient(), arb_progress()).prop_map(|(recipient, progress)| {
            SessionState::Convert(ConvertStep::AwaitUpload(ConvertJob {
                naming: naming(),
                recipient,
                seq_start: 1,
                progress,
            }))
        }),
        (1usize..50, arb_progress()).prop_map(|(line_count, progress)| {
            SessionState::Extract(ExtractStep::AwaitDecision(ExtractJob {
                line_count,
                progress,
            }))
        }),
        Just(SessionState::CustomNumber(CustomNumberStep::CollectNumbers {
            naming: naming(),
            numbers: vec![],
        })),
        Just(SessionState::Rename(RenameStep::AwaitUpload)),
    ]
}

fn arb_state() -> impl Strategy<Value = SessionState> {
    prop_oneof![Just(SessionState::Idle), arb_active_state()]
}

/// Text that never parses as a positive integer
fn arb_non_positive_text() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        Just("0".to_string()),
        Just("   ".to_string()),
        "-[1-9][0-9]{0,5}",
        "[a-zA-Z ]{1,12}",
        "[0-9]{1,3}\\.[0-9]{1,2}",
    ]
}

fn arb_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        arb_feature().prop_map(Event::Begin),
        Just(Event::Cancel),
        "[a-zA-Z0-9 ]{0,20}".prop_map(Event::Text),
        ("[a-z]{1,6}\\.(txt|csv|vcf|pdf)", "[0-9\n]{0,40}")
            .prop_map(|(name, body)| Event::document(name, body.into_bytes())),
    ]
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn prop_invalid_numeric_input_never_advances(
        state in arb_numeric_step(),
        text in arb_non_positive_text()
    ) {
        let expected = prompt(&state);
        let result = transition(&state, &test_context(), Event::Text(text));
        prop_assert_eq!(&result.new_state, &state);
        prop_assert!(result.deliveries().is_empty());
        prop_assert!(!result.ends_session());
        prop_assert_eq!(result.replies().last().copied(), Some(expected.as_str()));
    }

    #[test]
    fn prop_documents_never_satisfy_numeric_steps(state in arb_numeric_step()) {
        let result = transition(&state, &test_context(), Event::document("a.txt", b"5".to_vec()));
        prop_assert_eq!(result.new_state, state);
    }

    #[test]
    fn prop_cancel_always_returns_to_idle(state in arb_state()) {
        let result = transition(&state, &test_context(), Event::Cancel);
        prop_assert_eq!(&result.new_state, &SessionState::Idle);
        prop_assert!(result.deliveries().is_empty());
        prop_assert_eq!(result.ends_session(), !state.is_idle());
    }

    #[test]
    fn prop_begin_always_resets(state in arb_state(), feature in arb_feature()) {
        let result = transition(&state, &test_context(), Event::Begin(feature));
        prop_assert_eq!(&result.new_state, &initial_state(feature));
        prop_assert_eq!(result.new_state.feature(), Some(feature));
        prop_assert!(result.deliveries().is_empty());
        prop_assert_eq!(result.ends_session(), !state.is_idle());
    }

    #[test]
    fn prop_transitions_are_deterministic(state in arb_state(), event in arb_event()) {
        let first = transition(&state, &test_context(), event.clone());
        let second = transition(&state, &test_context(), event);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_every_transition_replies(state in arb_state(), event in arb_event()) {
        let result = transition(&state, &test_context(), event);
        prop_assert!(!result.replies().is_empty());
    }

    #[test]
    fn prop_delivered_names_are_single_components(
        state in arb_state(),
        events in proptest::collection::vec(arb_event(), 0..20)
    ) {
        let mut state = state;
        for event in events {
            let result = transition(&state, &test_context(), event);
            for (_, artifact) in result.deliveries() {
                prop_assert!(!artifact.file_name.is_empty());
                prop_assert!(!artifact.file_name.contains('/'));
                prop_assert!(!artifact.bytes.is_empty());
            }
            state = result.new_state;
        }
    }

    #[test]
    fn prop_idle_ignores_non_commands(text in "[a-zA-Z0-9 ]{0,20}") {
        let result = transition(&SessionState::Idle, &test_context(), Event::Text(text));
        prop_assert_eq!(&result.new_state, &SessionState::Idle);
        prop_assert!(!result.ends_session());
    }
}
