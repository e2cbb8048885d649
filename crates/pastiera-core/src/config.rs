//! Caller-owned prediction preferences, handed to the core by value on every
//! call. The core never stores or mutates them.

use serde::{Deserialize, Serialize};

use crate::suggestion_mode::{determine_mode, SuggestionMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictionConfig {
    pub max_suggestions: usize,
    pub next_word_prediction_enabled: bool,
    pub next_word_prediction_mode: SuggestionMode,
    pub user_learning_enabled: bool,
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            max_suggestions: 3,
            next_word_prediction_enabled: true,
            next_word_prediction_mode: SuggestionMode::Hybrid,
            user_learning_enabled: true,
        }
    }
}

impl PredictionConfig {
    pub fn suggestion_mode(&self, has_current_word: bool, context_length: usize) -> SuggestionMode {
        determine_mode(
            has_current_word,
            context_length,
            self.next_word_prediction_enabled,
            self.next_word_prediction_mode,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let c = PredictionConfig::default();
        assert_eq!(c.max_suggestions, 3);
        assert!(c.next_word_prediction_enabled);
        assert!(c.user_learning_enabled);
        assert_eq!(c.suggestion_mode(false, 2), SuggestionMode::NextWord);
        assert_eq!(c.suggestion_mode(true, 2), SuggestionMode::CurrentWord);
    }

    #[test]
    fn test_disabled_prediction() {
        let c = PredictionConfig {
            next_word_prediction_enabled: false,
            ..PredictionConfig::default()
        };
        assert_eq!(c.suggestion_mode(false, 3), SuggestionMode::CurrentWord);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let c: PredictionConfig =
            serde_json::from_str(r#"{"max_suggestions": 5, "next_word_prediction_mode": "current_word"}"#)
                .unwrap();
        assert_eq!(c.max_suggestions, 5);
        assert_eq!(c.next_word_prediction_mode, SuggestionMode::CurrentWord);
        assert!(c.user_learning_enabled);
    }
}
