//! Next-word prediction and personalization core for the Pastiera keyboard.
//!
//! A committed word flows through [`normalize`] into the [`context`] window,
//! is used to query the backed-off [`ngram`] model, gets boosted by the
//! [`user_learning`] store in [`predictor`], is gated by [`suggestion_mode`],
//! and is re-cased by [`casing`] before insertion.

pub mod casing;
pub mod config;
pub mod context;
pub mod dict;
pub mod loader;
pub mod ngram;
pub mod normalize;
pub mod predictor;
pub mod settings;
pub mod store;
pub mod suggestion_mode;
pub mod user_learning;

pub use config::PredictionConfig;
pub use context::ContextTracker;
pub use dict::{Dictionary, WordEntry, WordListDictionary};
pub use ngram::{NgramLanguageModel, NgramTables};
pub use normalize::{normalize, Locale, Normalizer};
pub use predictor::NextWordPredictor;
pub use store::{FileStore, KeyValueStore, MemoryStore};
pub use suggestion_mode::{determine_mode, SuggestionMode};
pub use user_learning::UserLearningStore;
