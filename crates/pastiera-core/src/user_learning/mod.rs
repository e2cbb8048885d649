//! Online personalization: bigram and trigram counts learned from the
//! sentences the user actually types.
//!
//! Tables mirror the shape of the base n-gram tables and are persisted as two
//! independent blobs through a [`KeyValueStore`](crate::store::KeyValueStore).

mod persistence;

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::ngram::{BigramTable, TrigramTable};
use crate::normalize::Normalizer;
use crate::settings::settings;

pub use persistence::{EncodedTables, PersistError, BIGRAMS_KEY, FORMAT_VERSION, TRIGRAMS_KEY};

pub struct UserLearningStore {
    normalizer: Arc<Normalizer>,
    bigrams: BigramTable,
    trigrams: TrigramTable,
}

impl UserLearningStore {
    pub fn new(normalizer: Arc<Normalizer>) -> Self {
        Self {
            normalizer,
            bigrams: HashMap::new(),
            trigrams: HashMap::new(),
        }
    }

    /// Learn from one completed sentence: every consecutive pair and triple
    /// gains one count. Sequences shorter than two words are ignored.
    pub fn record_sequence<S: AsRef<str>>(&mut self, words: &[S]) {
        let none: &[S] = &[];
        self.record_continuation(none, words);
    }

    /// Learn from the next chunk of a sentence whose earlier part was already
    /// recorded. `before` is that earlier part; only pairs and triples ending
    /// inside `words` gain a count.
    pub fn record_continuation<S: AsRef<str>>(&mut self, before: &[S], words: &[S]) {
        let mut all = self.normalizer.normalize_all(before, false);
        let cut = all.len().saturating_sub(2);
        all.drain(..cut);
        let skip = all.len();
        all.extend(self.normalizer.normalize_all(words, false));
        if all.len() < 2 || all.len() == skip {
            return;
        }

        for (i, pair) in all.windows(2).enumerate() {
            if i + 1 < skip {
                continue;
            }
            *self
                .bigrams
                .entry(pair[0].clone())
                .or_default()
                .entry(pair[1].clone())
                .or_insert(0) += 1;
        }

        for (i, triple) in all.windows(3).enumerate() {
            if i + 2 < skip {
                continue;
            }
            *self
                .trigrams
                .entry(triple[0].clone())
                .or_default()
                .entry(triple[1].clone())
                .or_default()
                .entry(triple[2].clone())
                .or_insert(0) += 1;
        }

        self.evict(&all);
    }

    /// Deep copy of the learned bigrams.
    pub fn user_bigrams(&self) -> BigramTable {
        self.bigrams.clone()
    }

    /// Deep copy of the learned trigrams.
    pub fn user_trigrams(&self) -> TrigramTable {
        self.trigrams.clone()
    }

    pub fn bigram_frequency(&self, w1: &str, w2: &str) -> u32 {
        let w1 = self.normalizer.normalize(w1, false);
        let w2 = self.normalizer.normalize(w2, false);
        self.bigrams
            .get(&w1)
            .and_then(|inner| inner.get(&w2))
            .copied()
            .unwrap_or(0)
    }

    pub fn trigram_frequency(&self, w1: &str, w2: &str, w3: &str) -> u32 {
        let w1 = self.normalizer.normalize(w1, false);
        let w2 = self.normalizer.normalize(w2, false);
        let w3 = self.normalizer.normalize(w3, false);
        self.trigrams
            .get(&w1)
            .and_then(|middle| middle.get(&w2))
            .and_then(|inner| inner.get(&w3))
            .copied()
            .unwrap_or(0)
    }

    /// Learned successors of `w1` (a normalized key).
    pub fn bigram_continuations(&self, w1: &str) -> Option<&HashMap<String, u32>> {
        self.bigrams.get(w1)
    }

    /// Learned successors of `(w1, w2)` (normalized keys).
    pub fn trigram_continuations(&self, w1: &str, w2: &str) -> Option<&HashMap<String, u32>> {
        self.trigrams.get(w1).and_then(|middle| middle.get(w2))
    }

    pub fn bigram_count(&self) -> usize {
        self.bigrams.values().map(HashMap::len).sum()
    }

    pub fn trigram_count(&self) -> usize {
        self.trigrams
            .values()
            .flat_map(HashMap::values)
            .map(HashMap::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.bigrams.is_empty() && self.trigrams.is_empty()
    }

    /// `recent` is the sentence just recorded; its n-grams lose count ties.
    fn evict(&mut self, recent: &[String]) {
        let s = settings();
        evict_bigrams(&mut self.bigrams, s.learning.max_bigrams, recent);
        evict_trigrams(&mut self.trigrams, s.learning.max_trigrams, recent);
    }
}

/// Drop the lowest-count pairs once the table holds more than `max`.
/// Among equal counts, pairs from `recent` go last.
fn evict_bigrams(table: &mut BigramTable, max: usize, recent: &[String]) {
    let count: usize = table.values().map(HashMap::len).sum();
    if count <= max {
        return;
    }
    let mut all: Vec<(String, String, u32)> = table
        .iter()
        .flat_map(|(w1, inner)| {
            inner
                .iter()
                .map(move |(w2, &c)| (w1.clone(), w2.clone(), c))
        })
        .collect();
    let fresh: HashSet<(&str, &str)> = recent
        .windows(2)
        .map(|p| (p[0].as_str(), p[1].as_str()))
        .collect();
    let to_remove = count - max;
    all.select_nth_unstable_by_key(to_remove - 1, |(w1, w2, c)| {
        (*c, fresh.contains(&(w1.as_str(), w2.as_str())))
    });
    for (w1, w2, _) in &all[..to_remove] {
        if let Some(inner) = table.get_mut(w1) {
            inner.remove(w2);
            if inner.is_empty() {
                table.remove(w1);
            }
        }
    }
}

/// Drop the lowest-count triples once the table holds more than `max`.
/// Among equal counts, triples from `recent` go last.
fn evict_trigrams(table: &mut TrigramTable, max: usize, recent: &[String]) {
    let count: usize = table
        .values()
        .flat_map(HashMap::values)
        .map(HashMap::len)
        .sum();
    if count <= max {
        return;
    }
    let mut all: Vec<(String, String, String, u32)> = Vec::with_capacity(count);
    for (w1, middle) in table.iter() {
        for (w2, inner) in middle {
            for (w3, &c) in inner {
                all.push((w1.clone(), w2.clone(), w3.clone(), c));
            }
        }
    }
    let fresh: HashSet<(&str, &str, &str)> = recent
        .windows(3)
        .map(|t| (t[0].as_str(), t[1].as_str(), t[2].as_str()))
        .collect();
    let to_remove = count - max;
    all.select_nth_unstable_by_key(to_remove - 1, |(w1, w2, w3, c)| {
        (*c, fresh.contains(&(w1.as_str(), w2.as_str(), w3.as_str())))
    });
    for (w1, w2, w3, _) in &all[..to_remove] {
        let Some(middle) = table.get_mut(w1) else {
            continue;
        };
        if let Some(inner) = middle.get_mut(w2) {
            inner.remove(w3);
            if inner.is_empty() {
                middle.remove(w2);
            }
        }
        if middle.is_empty() {
            table.remove(w1);
        }
    }
}
