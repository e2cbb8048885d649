//! The dictionary collaborator consumed by the prediction pipeline.
//!
//! The full fuzzy-matching engine lives elsewhere; the pipeline only needs
//! readiness, word frequencies and the preprocessed n-gram tables, which is
//! what [`Dictionary`] exposes. [`WordListDictionary`] is an in-memory
//! implementation over the JSON word-list format produced by the dictionary
//! build tools (`[{"w": "word", "f": 123}, ...]`).

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ngram::NgramTables;
use crate::normalize::normalize;

#[derive(Debug, thiserror::Error)]
pub enum DictError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("word list parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordEntry {
    #[serde(rename = "w")]
    pub word: String,
    #[serde(rename = "f", default = "default_frequency")]
    pub frequency: u32,
}

fn default_frequency() -> u32 {
    1
}

impl WordEntry {
    pub fn new(word: impl Into<String>, frequency: u32) -> Self {
        Self {
            word: word.into(),
            frequency,
        }
    }
}

pub trait Dictionary: Send + Sync {
    /// Whether loading has finished. Predictions are empty until it has.
    fn is_ready(&self) -> bool;

    /// Frequency of `word` (a normalized key), 0 when unknown.
    fn exact_word_frequency(&self, word: &str) -> u32;

    /// Every entry eligible for the unigram fallback.
    fn candidates(&self) -> Vec<WordEntry>;

    /// Preprocessed base tables shipped with the dictionary, if any.
    fn ngram_tables(&self) -> Option<NgramTables>;

    /// Ranking frequency of an entry. Engines that apply user or recency
    /// adjustments override this.
    fn effective_frequency(&self, entry: &WordEntry) -> f64 {
        entry.frequency as f64
    }
}

#[derive(Default)]
pub struct WordListDictionary {
    entries: Vec<WordEntry>,
    /// normalized key → highest frequency among its surface forms
    frequencies: HashMap<String, u32>,
    ngrams: Option<NgramTables>,
    ready: bool,
}

impl WordListDictionary {
    pub fn from_entries(entries: Vec<WordEntry>) -> Self {
        let mut frequencies: HashMap<String, u32> = HashMap::with_capacity(entries.len());
        for entry in &entries {
            let key = normalize(&entry.word, false);
            if key.is_empty() {
                continue;
            }
            let slot = frequencies.entry(key).or_insert(0);
            *slot = (*slot).max(entry.frequency);
        }
        Self {
            entries,
            frequencies,
            ngrams: None,
            ready: true,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, DictError> {
        let entries: Vec<WordEntry> = serde_json::from_str(json)?;
        Ok(Self::from_entries(entries))
    }

    pub fn open(path: &Path) -> Result<Self, DictError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn with_ngrams(mut self, tables: NgramTables) -> Self {
        self.ngrams = Some(tables);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Dictionary for WordListDictionary {
    fn is_ready(&self) -> bool {
        self.ready
    }

    fn exact_word_frequency(&self, word: &str) -> u32 {
        self.frequencies.get(word).copied().unwrap_or(0)
    }

    fn candidates(&self) -> Vec<WordEntry> {
        self.entries.clone()
    }

    fn ngram_tables(&self) -> Option<NgramTables> {
        self.ngrams.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json() {
        let dict = WordListDictionary::from_json(
            r#"[{"w": "Parenzo", "f": 120}, {"w": "pizza", "f": 900}, {"w": "ciao"}]"#,
        )
        .unwrap();
        assert!(dict.is_ready());
        assert_eq!(dict.len(), 3);
        assert_eq!(dict.exact_word_frequency("parenzo"), 120);
        assert_eq!(dict.exact_word_frequency("pizza"), 900);
        assert_eq!(dict.exact_word_frequency("ciao"), 1);
        assert_eq!(dict.exact_word_frequency("pasta"), 0);
    }

    #[test]
    fn test_duplicate_keys_keep_max() {
        let dict = WordListDictionary::from_entries(vec![
            WordEntry::new("perché", 40),
            WordEntry::new("Perche", 70),
        ]);
        assert_eq!(dict.exact_word_frequency("perche"), 70);
        assert_eq!(dict.candidates().len(), 2);
    }

    #[test]
    fn test_default_is_not_ready() {
        let dict = WordListDictionary::default();
        assert!(!dict.is_ready());
        assert!(dict.ngram_tables().is_none());
    }

    #[test]
    fn test_parse_error() {
        let err = WordListDictionary::from_json("{not a list").err().unwrap();
        assert!(matches!(err, DictError::Parse(_)));
    }

    #[test]
    fn test_open_missing_file() {
        let err = WordListDictionary::open(Path::new("/nonexistent/words.json"))
            .err()
            .unwrap();
        assert!(matches!(err, DictError::Io(_)));
    }
}
