//! Static n-gram language model with trigram → bigram → unigram backoff.
//!
//! Base tables come preprocessed with the dictionary and are installed in one
//! atomic swap, so a prediction running concurrently with a load sees either
//! the old tables or the new ones.

pub mod builder;
pub mod io;

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use tracing::{debug, debug_span};

use crate::dict::Dictionary;
use crate::normalize::Normalizer;
use crate::settings::settings;

/// word1 → (word2 → count)
pub type BigramTable = HashMap<String, HashMap<String, u32>>;
/// word1 → word2 → (word3 → count)
pub type TrigramTable = HashMap<String, HashMap<String, HashMap<String, u32>>>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NgramTables {
    pub bigrams: BigramTable,
    pub trigrams: TrigramTable,
}

impl NgramTables {
    pub fn new(bigrams: BigramTable, trigrams: TrigramTable) -> Self {
        Self { bigrams, trigrams }
    }

    pub fn is_empty(&self) -> bool {
        self.bigrams.is_empty() && self.trigrams.is_empty()
    }

    /// Number of distinct (w1, w2) pairs.
    pub fn bigram_count(&self) -> usize {
        self.bigrams.values().map(HashMap::len).sum()
    }

    /// Number of distinct (w1, w2, w3) triples.
    pub fn trigram_count(&self) -> usize {
        self.trigrams
            .values()
            .flat_map(HashMap::values)
            .map(HashMap::len)
            .sum()
    }

    pub fn bigram_continuations(&self, w1: &str) -> Option<&HashMap<String, u32>> {
        self.bigrams.get(w1)
    }

    pub fn trigram_continuations(&self, w1: &str, w2: &str) -> Option<&HashMap<String, u32>> {
        self.trigrams.get(w1).and_then(|inner| inner.get(w2))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NgramSource {
    Trigram,
    Bigram,
    Unigram,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PredictionResult {
    pub word: String,
    pub score: f64,
    pub source: NgramSource,
}

/// Descending score, then alphabetical so equal scores rank deterministically.
pub(crate) fn by_score_desc(a_word: &str, a: f64, b_word: &str, b: f64) -> Ordering {
    b.partial_cmp(&a)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a_word.cmp(b_word))
}

fn rank(results: &mut Vec<PredictionResult>, limit: usize) {
    results.sort_by(|a, b| by_score_desc(&a.word, a.score, &b.word, b.score));
    results.truncate(limit);
}

/// Conditional probability of `word` among the observed continuations.
fn conditional_probability(continuations: Option<&HashMap<String, u32>>, word: &str) -> f64 {
    let Some(continuations) = continuations else {
        return 0.0;
    };
    let total: u64 = continuations.values().map(|&c| c as u64).sum();
    if total == 0 {
        return 0.0;
    }
    continuations.get(word).map_or(0.0, |&c| c as f64 / total as f64)
}

pub struct NgramLanguageModel {
    dict: Arc<dyn Dictionary>,
    normalizer: Arc<Normalizer>,
    tables: RwLock<Arc<NgramTables>>,
    loaded: AtomicBool,
}

impl NgramLanguageModel {
    pub fn new(dict: Arc<dyn Dictionary>, normalizer: Arc<Normalizer>) -> Self {
        Self {
            dict,
            normalizer,
            tables: RwLock::new(Arc::new(NgramTables::default())),
            loaded: AtomicBool::new(false),
        }
    }

    pub fn dictionary(&self) -> &Arc<dyn Dictionary> {
        &self.dict
    }

    pub fn normalizer(&self) -> &Arc<Normalizer> {
        &self.normalizer
    }

    /// Replace the base tables in one step.
    pub fn load_ngrams(&self, tables: NgramTables) {
        let next = Arc::new(tables);
        debug!(
            bigrams = next.bigram_count(),
            trigrams = next.trigram_count(),
            "installing base n-gram tables"
        );
        match self.tables.write() {
            Ok(mut guard) => *guard = next,
            Err(poisoned) => *poisoned.into_inner() = next,
        }
        self.loaded.store(true, AtomicOrdering::Release);
    }

    /// Pull the dictionary's preprocessed tables and install them.
    /// Returns false when the dictionary ships none.
    pub fn load_from_dictionary(&self) -> bool {
        match self.dict.ngram_tables() {
            Some(tables) => {
                self.load_ngrams(tables);
                true
            }
            None => false,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.load(AtomicOrdering::Acquire)
    }

    /// Current tables; readers keep their snapshot even if a swap happens.
    pub fn snapshot(&self) -> Arc<NgramTables> {
        match self.tables.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    /// Ranked next-word predictions for `context`, at most `limit` of them.
    pub fn predict_next<S: AsRef<str>>(&self, context: &[S], limit: usize) -> Vec<String> {
        self.predict_scored(context, limit)
            .into_iter()
            .map(|r| r.word)
            .collect()
    }

    pub(crate) fn predict_scored<S: AsRef<str>>(
        &self,
        context: &[S],
        limit: usize,
    ) -> Vec<PredictionResult> {
        let _span = debug_span!("predict_next", context_len = context.len(), limit).entered();
        if limit == 0 || !self.dict.is_ready() {
            return Vec::new();
        }

        let words = self.normalizer.normalize_all(context, false);
        let tables = self.snapshot();

        if let [.., w1, w2] = words.as_slice() {
            if let Some(continuations) = tables.trigram_continuations(w1, w2) {
                if !continuations.is_empty() {
                    let results = self.score_continuations(continuations, NgramSource::Trigram, limit);
                    debug!(count = results.len(), "trigram hit");
                    return results;
                }
            }
        }

        if let Some(last) = words.last() {
            if let Some(continuations) = tables.bigram_continuations(last) {
                if !continuations.is_empty() {
                    let results = self.score_continuations(continuations, NgramSource::Bigram, limit);
                    debug!(count = results.len(), "bigram hit");
                    return results;
                }
            }
        }

        let results = self.unigram_fallback(limit);
        debug!(count = results.len(), "unigram fallback");
        results
    }

    fn score_continuations(
        &self,
        continuations: &HashMap<String, u32>,
        source: NgramSource,
        limit: usize,
    ) -> Vec<PredictionResult> {
        let scale = settings().prediction.frequency_scale;
        let total: u64 = continuations.values().map(|&c| c as u64).sum();
        if total == 0 {
            return Vec::new();
        }
        let mut results: Vec<PredictionResult> = continuations
            .iter()
            .map(|(word, &count)| {
                let probability = count as f64 / total as f64;
                let dict_freq = self.dict.exact_word_frequency(word) as f64;
                PredictionResult {
                    word: word.clone(),
                    score: probability * (1.0 + dict_freq / scale),
                    source,
                }
            })
            .collect();
        rank(&mut results, limit);
        results
    }

    fn unigram_fallback(&self, limit: usize) -> Vec<PredictionResult> {
        let scale = settings().prediction.frequency_scale;
        let mut results: Vec<PredictionResult> = self
            .dict
            .candidates()
            .iter()
            .filter(|entry| !entry.word.trim().is_empty())
            .map(|entry| PredictionResult {
                word: entry.word.clone(),
                score: self.dict.effective_frequency(entry) / scale,
                source: NgramSource::Unigram,
            })
            .collect();
        results.sort_by(|a, b| by_score_desc(&a.word, a.score, &b.word, b.score));
        let mut seen = HashSet::new();
        results.retain(|r| seen.insert(r.word.clone()));
        results.truncate(limit);
        results
    }

    /// P(w2 | w1) from the base tables; 0.0 when `w1` was never seen.
    pub fn bigram_probability(&self, w1: &str, w2: &str) -> f64 {
        let w1 = self.normalizer.normalize(w1, false);
        let w2 = self.normalizer.normalize(w2, false);
        let tables = self.snapshot();
        conditional_probability(tables.bigram_continuations(&w1), &w2)
    }

    /// P(w3 | w1, w2) from the base tables; 0.0 when (w1, w2) was never seen.
    pub fn trigram_probability(&self, w1: &str, w2: &str, w3: &str) -> f64 {
        let w1 = self.normalizer.normalize(w1, false);
        let w2 = self.normalizer.normalize(w2, false);
        let w3 = self.normalizer.normalize(w3, false);
        let tables = self.snapshot();
        conditional_probability(tables.trigram_continuations(&w1, &w2), &w3)
    }
}
