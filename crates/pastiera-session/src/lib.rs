//! Per-session glue around the prediction core.
//!
//! `PredictionSession` owns the active locale's context window and language
//! model, buffers the sentence being typed so it can be learned from at the
//! next boundary, and persists the learning store in the background every few
//! sentences.

mod types;

#[cfg(test)]
mod tests;

use std::sync::{Arc, RwLock};

use pastiera_core::casing::apply_casing;
use pastiera_core::context::is_sentence_boundary;
use pastiera_core::loader::BackgroundLoader;
use pastiera_core::settings::settings;
use pastiera_core::store::SharedStore;
use pastiera_core::{
    ContextTracker, Dictionary, Locale, NextWordPredictor, NgramLanguageModel, Normalizer,
    PredictionConfig, UserLearningStore,
};
use tracing::{debug, debug_span, warn};

pub use types::Suggestions;

use types::MAX_SENTENCE_WORDS;

pub struct PredictionSession {
    dict: Arc<dyn Dictionary>,
    normalizer: Arc<Normalizer>,
    context: ContextTracker,
    model: Arc<NgramLanguageModel>,
    predictor: NextWordPredictor,

    learning: Arc<RwLock<UserLearningStore>>,
    store: SharedStore,
    loader: BackgroundLoader,

    config: PredictionConfig,

    // Raw words of the sentence in progress
    sentence: Vec<String>,
    // Tail of a run-on sentence already learned from
    carried: Vec<String>,
    sentences_since_persist: usize,
}

impl PredictionSession {
    /// Start a session: the learning store is read from `store` right away,
    /// the dictionary's base tables are installed in the background.
    pub fn new(dict: Arc<dyn Dictionary>, locale: Locale, store: SharedStore) -> Self {
        let normalizer = Arc::new(Normalizer::new(locale));

        let mut learning = UserLearningStore::new(Arc::clone(&normalizer));
        match store.lock() {
            Ok(guard) => learning.load(&*guard),
            Err(_) => warn!("store lock poisoned, starting with empty user learning"),
        }
        let learning = Arc::new(RwLock::new(learning));

        let model = Arc::new(NgramLanguageModel::new(
            Arc::clone(&dict),
            Arc::clone(&normalizer),
        ));
        let predictor = NextWordPredictor::new(Arc::clone(&model), Some(Arc::clone(&learning)));
        let loader = BackgroundLoader::new();
        loader.submit_load(Arc::clone(&model));

        Self {
            dict,
            context: ContextTracker::new(Arc::clone(&normalizer)),
            normalizer,
            model,
            predictor,
            learning,
            store,
            loader,
            config: PredictionConfig::default(),
            sentence: Vec::new(),
            carried: Vec::new(),
            sentences_since_persist: 0,
        }
    }

    pub fn set_config(&mut self, config: PredictionConfig) {
        self.config = config;
    }

    pub fn config(&self) -> PredictionConfig {
        self.config
    }

    pub fn locale(&self) -> Locale {
        self.normalizer.locale()
    }

    /// Base tables installed and dictionary usable.
    pub fn is_ready(&self) -> bool {
        self.dict.is_ready() && self.model.is_loaded()
    }

    /// Switch to another language. Outstanding loads for the previous locale
    /// are abandoned; the context window and model start over. The learning
    /// store is kept as is.
    pub fn switch_locale(&mut self, dict: Arc<dyn Dictionary>, locale: Locale) {
        let _span = debug_span!("switch_locale", locale = locale.tag()).entered();
        self.loader.cancel_loads();
        self.normalizer.set_locale(locale);

        self.dict = dict;
        self.context = ContextTracker::new(Arc::clone(&self.normalizer));
        self.sentence.clear();
        self.carried.clear();
        self.model = Arc::new(NgramLanguageModel::new(
            Arc::clone(&self.dict),
            Arc::clone(&self.normalizer),
        ));
        self.predictor = NextWordPredictor::new(
            Arc::clone(&self.model),
            Some(Arc::clone(&self.learning)),
        );
        self.loader.submit_load(Arc::clone(&self.model));
    }

    /// Record a word the user finished typing.
    pub fn commit_word(&mut self, word: &str) {
        if self.normalizer.normalize(word, true).is_empty() {
            return;
        }
        self.context.add_word(word);
        self.sentence.push(word.to_string());
        if self.sentence.len() >= MAX_SENTENCE_WORDS {
            let tail = self.sentence[self.sentence.len().saturating_sub(2)..].to_vec();
            self.learn_sentence();
            self.carried = tail;
        }
    }

    /// Case `candidate` after what the user typed, then commit it.
    /// Returns the text to insert.
    pub fn accept_suggestion(
        &mut self,
        candidate: &str,
        typed: &str,
        force_leading_capital: bool,
    ) -> String {
        let text = apply_casing(candidate, typed, force_leading_capital);
        self.commit_word(&text);
        text
    }

    /// Feed a non-word character; sentence-ending ones close the sentence.
    pub fn commit_punctuation(&mut self, c: char) {
        if is_sentence_boundary(c) {
            self.end_sentence();
        }
    }

    /// Close the current sentence: the context resets and the sentence is
    /// learned from when learning is enabled.
    pub fn end_sentence(&mut self) {
        self.context.on_sentence_boundary();
        self.learn_sentence();
        self.carried.clear();
    }

    fn learn_sentence(&mut self) {
        let words = std::mem::take(&mut self.sentence);
        let carried = std::mem::take(&mut self.carried);
        if !self.config.user_learning_enabled
            || words.is_empty()
            || words.len() + carried.len() < 2
        {
            return;
        }
        match self.learning.write() {
            Ok(mut learning) => learning.record_continuation(&carried, &words),
            Err(_) => {
                warn!("user learning lock poisoned, sentence dropped");
                return;
            }
        }
        self.sentences_since_persist += 1;
        debug!(
            words = words.len(),
            pending = self.sentences_since_persist,
            "learned sentence"
        );
        if self.sentences_since_persist >= settings().learning.persist_every_sentences {
            self.persist();
        }
    }

    /// Suggestions for the current keystroke. `has_current_word` is true
    /// while a word is being typed.
    pub fn suggestions(&self, has_current_word: bool) -> Suggestions {
        let mode = self
            .config
            .suggestion_mode(has_current_word, self.context.len());
        if !mode.shows_predictions() {
            return Suggestions {
                mode,
                ..Suggestions::completions_only()
            };
        }
        let predictions = self
            .predictor
            .predict_with_config(&self.context.context(), &self.config);
        Suggestions { mode, predictions }
    }

    pub fn context_words(&self) -> Vec<String> {
        self.context.context()
    }

    pub fn learning(&self) -> &Arc<RwLock<UserLearningStore>> {
        &self.learning
    }

    /// Schedule a background write of the learning store.
    pub fn persist(&mut self) {
        self.sentences_since_persist = 0;
        self.loader
            .submit_persist(Arc::clone(&self.learning), Arc::clone(&self.store));
    }

    /// Forget everything learned, in memory and in the store.
    pub fn clear_learning(&mut self) {
        self.sentence.clear();
        self.carried.clear();
        self.sentences_since_persist = 0;
        let Ok(mut learning) = self.learning.write() else {
            warn!("user learning lock poisoned, clear skipped");
            return;
        };
        let mut store = self.store.lock().unwrap_or_else(|e| e.into_inner());
        learning.clear(&mut *store);
    }

    /// Persist now and wait for every background job to finish.
    pub fn flush(&mut self) {
        self.persist();
        self.loader.wait_idle();
    }

    /// Block until pending table loads and writes have run.
    pub fn wait_idle(&self) {
        self.loader.wait_idle();
    }
}
