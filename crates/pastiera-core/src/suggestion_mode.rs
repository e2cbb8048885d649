use serde::{Deserialize, Serialize};

/// What the suggestion strip should show.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionMode {
    /// Completions and corrections of the word being typed.
    CurrentWord,
    /// Predictions of the word after the last committed one.
    NextWord,
    /// Both, depending on whether a word is in progress.
    #[default]
    Hybrid,
}

impl SuggestionMode {
    pub fn shows_predictions(&self) -> bool {
        matches!(self, Self::NextWord | Self::Hybrid)
    }

    pub fn shows_completions(&self) -> bool {
        matches!(self, Self::CurrentWord | Self::Hybrid)
    }
}

/// Pick the mode for this keystroke.
///
/// Live typing always wins: with a word in progress the answer is
/// `CurrentWord` regardless of `preferred`. Without one, a non-empty context
/// follows `preferred`, where `Hybrid` has nothing to complete and collapses
/// to `NextWord`.
pub fn determine_mode(
    has_current_word: bool,
    context_length: usize,
    next_word_prediction_enabled: bool,
    preferred: SuggestionMode,
) -> SuggestionMode {
    if !next_word_prediction_enabled || has_current_word {
        return SuggestionMode::CurrentWord;
    }
    if context_length == 0 {
        return SuggestionMode::CurrentWord;
    }
    match preferred {
        SuggestionMode::Hybrid => SuggestionMode::NextWord,
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [SuggestionMode; 3] = [
        SuggestionMode::CurrentWord,
        SuggestionMode::NextWord,
        SuggestionMode::Hybrid,
    ];

    #[test]
    fn test_current_word_takes_priority() {
        for preferred in ALL {
            assert_eq!(
                determine_mode(true, 5, true, preferred),
                SuggestionMode::CurrentWord
            );
        }
    }

    #[test]
    fn test_disabled_overrides_everything() {
        for preferred in ALL {
            for has_current_word in [false, true] {
                assert_eq!(
                    determine_mode(has_current_word, 2, false, preferred),
                    SuggestionMode::CurrentWord
                );
            }
        }
    }

    #[test]
    fn test_context_follows_preference() {
        assert_eq!(
            determine_mode(false, 1, true, SuggestionMode::NextWord),
            SuggestionMode::NextWord
        );
        assert_eq!(
            determine_mode(false, 1, true, SuggestionMode::Hybrid),
            SuggestionMode::NextWord
        );
        assert_eq!(
            determine_mode(false, 3, true, SuggestionMode::CurrentWord),
            SuggestionMode::CurrentWord
        );
    }

    #[test]
    fn test_empty_context_defaults_to_current_word() {
        for preferred in ALL {
            assert_eq!(
                determine_mode(false, 0, true, preferred),
                SuggestionMode::CurrentWord
            );
        }
    }

    #[test]
    fn test_display_queries() {
        assert!(SuggestionMode::Hybrid.shows_predictions());
        assert!(SuggestionMode::Hybrid.shows_completions());
        assert!(SuggestionMode::NextWord.shows_predictions());
        assert!(!SuggestionMode::NextWord.shows_completions());
        assert!(!SuggestionMode::CurrentWord.shows_predictions());
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&SuggestionMode::NextWord).unwrap();
        assert_eq!(json, "\"next_word\"");
        let back: SuggestionMode = serde_json::from_str("\"current_word\"").unwrap();
        assert_eq!(back, SuggestionMode::CurrentWord);
    }
}
