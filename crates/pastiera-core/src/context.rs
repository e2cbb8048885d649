//! Sliding window of recently committed words.

use std::collections::VecDeque;
use std::sync::Arc;

use crate::normalize::Normalizer;
use crate::settings::settings;

/// Bounded window of normalized words, oldest first.
///
/// Words keep their apostrophes so contractions stay distinct here; the
/// prediction side strips them again when it builds table keys.
pub struct ContextTracker {
    normalizer: Arc<Normalizer>,
    max_len: usize,
    words: VecDeque<String>,
}

impl ContextTracker {
    pub fn new(normalizer: Arc<Normalizer>) -> Self {
        Self::with_max_len(normalizer, settings().context.max_context_length)
    }

    pub fn with_max_len(normalizer: Arc<Normalizer>, max_len: usize) -> Self {
        let max_len = max_len.max(1);
        Self {
            normalizer,
            max_len,
            words: VecDeque::with_capacity(max_len + 1),
        }
    }

    /// Append a committed word. Words that normalize to nothing are ignored.
    pub fn add_word(&mut self, word: &str) {
        let normalized = self.normalizer.normalize(word, true);
        if normalized.is_empty() {
            return;
        }
        self.words.push_back(normalized);
        while self.words.len() > self.max_len {
            self.words.pop_front();
        }
    }

    /// Snapshot of the window, oldest to newest.
    pub fn context(&self) -> Vec<String> {
        self.words.iter().cloned().collect()
    }

    /// The last `n` words in typed order, or nothing if fewer are known.
    pub fn last_words(&self, n: usize) -> Vec<String> {
        if n == 0 || self.words.len() < n {
            return Vec::new();
        }
        self.words.iter().skip(self.words.len() - n).cloned().collect()
    }

    pub fn last_word(&self) -> Option<&str> {
        self.words.back().map(String::as_str)
    }

    pub fn last_two_words(&self) -> Option<(&str, &str)> {
        let len = self.words.len();
        if len < 2 {
            return None;
        }
        Some((self.words[len - 2].as_str(), self.words[len - 1].as_str()))
    }

    pub fn reset(&mut self) {
        self.words.clear();
    }

    /// Called on `.`, `!`, `?` and newline.
    pub fn on_sentence_boundary(&mut self) {
        self.reset();
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }
}

/// Characters that end a sentence and reset the context.
pub fn is_sentence_boundary(c: char) -> bool {
    matches!(c, '.' | '!' | '?' | '\n')
}
