use pastiera_core::SuggestionMode;

/// Words in one sentence buffer before it is learned from anyway.
pub(super) const MAX_SENTENCE_WORDS: usize = 100;

/// What the suggestion strip should show after the current keystroke.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestions {
    pub mode: SuggestionMode,
    /// Ranked next-word predictions; empty unless `mode` shows them.
    pub predictions: Vec<String>,
}

impl Suggestions {
    pub(super) fn completions_only() -> Self {
        Self {
            mode: SuggestionMode::CurrentWord,
            predictions: Vec::new(),
        }
    }
}
