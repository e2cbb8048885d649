//! Blends the static n-gram model with what the user has taught us.
//!
//! Shared candidates get a multiplicative boost from the user's own counts;
//! continuations only the user has produced are injected with a small
//! additive score so they surface without crowding out the base model.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::{debug, debug_span};

use crate::config::PredictionConfig;
use crate::ngram::{by_score_desc, NgramLanguageModel};
use crate::settings::settings;
use crate::user_learning::UserLearningStore;

/// Personalization boost in [0, 1] from the user's trigram and bigram counts.
fn boost(user_trigram: u32, user_bigram: u32) -> f64 {
    let tri = (user_trigram as f64 + 1.0).log10() / 3.0;
    let bi = (user_bigram as f64 + 1.0).log10() / 3.0;
    tri.max(bi).clamp(0.0, 1.0)
}

/// Score for a continuation the base model never proposed.
fn novel_score(user_frequency: u32) -> f64 {
    (user_frequency as f64 + 1.0).log10() / 2.0
}

pub struct NextWordPredictor {
    model: Arc<NgramLanguageModel>,
    learning: Option<Arc<RwLock<UserLearningStore>>>,
}

impl NextWordPredictor {
    pub fn new(
        model: Arc<NgramLanguageModel>,
        learning: Option<Arc<RwLock<UserLearningStore>>>,
    ) -> Self {
        Self { model, learning }
    }

    pub fn model(&self) -> &Arc<NgramLanguageModel> {
        &self.model
    }

    /// Up to `limit` ranked next words for `context` (oldest word first).
    pub fn predict<S: AsRef<str>>(&self, context: &[S], limit: usize) -> Vec<String> {
        into_words(self.predict_scored(context, limit, true))
    }

    /// Like [`predict`](Self::predict), honoring the caller's preferences:
    /// `max_suggestions` bounds the list, disabled prediction yields nothing,
    /// and disabled learning skips personalization.
    pub fn predict_with_config<S: AsRef<str>>(
        &self,
        context: &[S],
        config: &PredictionConfig,
    ) -> Vec<String> {
        if !config.next_word_prediction_enabled {
            return Vec::new();
        }
        into_words(self.predict_scored(
            context,
            config.max_suggestions,
            config.user_learning_enabled,
        ))
    }

    pub(crate) fn predict_scored<S: AsRef<str>>(
        &self,
        context: &[S],
        limit: usize,
        personalize: bool,
    ) -> Vec<(String, f64)> {
        let _span = debug_span!("predict", context_len = context.len(), limit).entered();
        if limit == 0 || context.is_empty() || !self.model.dictionary().is_ready() {
            return Vec::new();
        }

        let normalizer = self.model.normalizer();
        let words = normalizer.normalize_all(context, false);
        let Some(w2) = words.last() else {
            return Vec::new();
        };
        let w1 = words.len().checked_sub(2).map(|i| words[i].as_str());

        let fetch = limit.saturating_mul(settings().prediction.base_candidate_factor);
        // Keyed by normalized form; the first spelling seen is the one shown.
        let mut scores: HashMap<String, (String, f64)> = HashMap::new();
        for r in self.model.predict_scored(&words, fetch) {
            let key = normalizer.normalize(&r.word, false);
            if key.is_empty() {
                continue;
            }
            scores.entry(key).or_insert((r.word, r.score));
        }
        let base_count = scores.len();

        let guard = match (&self.learning, personalize) {
            (Some(learning), true) => learning.read().ok(),
            _ => None,
        };
        if let Some(learning) = guard.as_deref() {
            let multiplier = settings().prediction.boost_multiplier;
            let user_trigrams = w1.and_then(|w1| learning.trigram_continuations(w1, w2));
            let user_bigrams = learning.bigram_continuations(w2);

            for (key, (_, score)) in scores.iter_mut() {
                let tri = user_trigrams.and_then(|m| m.get(key)).copied().unwrap_or(0);
                let bi = user_bigrams.and_then(|m| m.get(key)).copied().unwrap_or(0);
                *score *= 1.0 + boost(tri, bi) * multiplier;
            }

            for continuations in [user_trigrams, user_bigrams].into_iter().flatten() {
                for (word, &freq) in continuations {
                    scores
                        .entry(word.clone())
                        .or_insert_with(|| (word.clone(), novel_score(freq)));
                }
            }
        }

        let mut ranked: Vec<(String, f64)> = scores.into_values().collect();
        ranked.sort_by(|a, b| by_score_desc(&a.0, a.1, &b.0, b.1));
        ranked.truncate(limit);
        debug!(
            base = base_count,
            returned = ranked.len(),
            "next-word prediction"
        );
        ranked
    }
}

fn into_words(ranked: Vec<(String, f64)>) -> Vec<String> {
    ranked.into_iter().map(|(word, _)| word).collect()
}
