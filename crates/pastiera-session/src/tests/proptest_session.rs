//! Property-based tests for PredictionSession.
//!
//! Random typing sequences must keep the context window bounded and the
//! suggestion strip consistent with the chosen mode.

use proptest::prelude::*;

use pastiera_core::settings::settings;
use pastiera_core::{PredictionConfig, SuggestionMode};

use super::new_session;

#[derive(Debug, Clone)]
enum Action {
    Word(&'static str),
    Punctuation(char),
    EndSentence,
    SetMaxSuggestions(usize),
    ToggleLearning,
}

fn arb_action() -> impl Strategy<Value = Action> {
    prop_oneof![
        10 => prop::sample::select(vec![
            "how", "are", "you", "good", "morning", "i", "like", "eat", "Pizza", "don't",
            "…", "42",
        ])
        .prop_map(Action::Word),
        2 => prop::sample::select(vec!['.', ',', '!', '?', '\n', ';'])
            .prop_map(Action::Punctuation),
        1 => Just(Action::EndSentence),
        1 => (0usize..6).prop_map(Action::SetMaxSuggestions),
        1 => Just(Action::ToggleLearning),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_session_invariants(
        actions in prop::collection::vec(arb_action(), 1..40),
        has_current_word in any::<bool>(),
    ) {
        let (mut session, _) = new_session();
        let max_context = settings().context.max_context_length;

        for action in actions {
            match action {
                Action::Word(w) => session.commit_word(w),
                Action::Punctuation(c) => session.commit_punctuation(c),
                Action::EndSentence => session.end_sentence(),
                Action::SetMaxSuggestions(n) => session.set_config(PredictionConfig {
                    max_suggestions: n,
                    ..session.config()
                }),
                Action::ToggleLearning => {
                    let config = session.config();
                    session.set_config(PredictionConfig {
                        user_learning_enabled: !config.user_learning_enabled,
                        ..config
                    });
                }
            }

            let context = session.context_words();
            prop_assert!(context.len() <= max_context);

            let s = session.suggestions(has_current_word);
            prop_assert!(s.predictions.len() <= session.config().max_suggestions);
            if has_current_word || context.is_empty() {
                prop_assert_eq!(s.mode, SuggestionMode::CurrentWord);
                prop_assert!(s.predictions.is_empty());
            } else {
                prop_assert_eq!(s.mode, SuggestionMode::NextWord);
            }
        }
    }
}
