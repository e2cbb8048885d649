use std::path::Path;
use std::sync::{Arc, Mutex};

use pastiera_core::context::is_sentence_boundary;
use pastiera_core::store::{FileStore, MemoryStore, SharedStore};
use pastiera_core::{Locale, NgramTables, PredictionConfig, WordListDictionary};
use pastiera_session::{PredictionSession, Suggestions};
use tracing::info;

use super::CliError;

pub struct PredictOptions<'a> {
    pub words_file: &'a str,
    pub tables_file: &'a str,
    pub locale: &'a str,
    pub store_dir: Option<&'a str>,
    pub max_suggestions: usize,
}

fn shared_store(dir: Option<&str>) -> SharedStore {
    match dir {
        Some(dir) => Arc::new(Mutex::new(FileStore::new(dir))),
        None => Arc::new(Mutex::new(MemoryStore::new())),
    }
}

/// Feed `text` to the session token by token, honoring sentence punctuation.
pub fn feed_text(session: &mut PredictionSession, text: &str) {
    for token in text.split_whitespace() {
        let word = token.trim_end_matches(|c: char| !c.is_alphanumeric() && c != '\'');
        session.commit_word(word);
        for c in token[word.len()..].chars() {
            session.commit_punctuation(c);
        }
    }
}

pub fn predict_context(opts: &PredictOptions, context: &[String]) -> Result<Suggestions, CliError> {
    let tables = NgramTables::open(Path::new(opts.tables_file))?;
    let dict = WordListDictionary::open(Path::new(opts.words_file))?.with_ngrams(tables);
    info!(words = dict.len(), "dictionary loaded");

    let mut session = PredictionSession::new(
        Arc::new(dict),
        Locale::new(opts.locale),
        shared_store(opts.store_dir),
    );
    session.set_config(PredictionConfig {
        max_suggestions: opts.max_suggestions,
        ..PredictionConfig::default()
    });
    session.wait_idle();
    feed_text(&mut session, &context.join(" "));
    Ok(session.suggestions(false))
}

pub fn predict(opts: &PredictOptions, context: &[String]) {
    let s = die!(predict_context(opts, context), "Error: {}");
    println!("mode: {:?}", s.mode);
    if s.predictions.is_empty() {
        println!("(no predictions)");
    }
    for (i, word) in s.predictions.iter().enumerate() {
        println!("{:>2}. {word}", i + 1);
    }
}

/// Learn from `text` and write the result to the store in `store_dir`.
/// Returns the number of learned bigrams afterwards.
pub fn learn_text(store_dir: &str, text: &str) -> usize {
    let mut session = PredictionSession::new(
        Arc::new(WordListDictionary::default()),
        Locale::default(),
        shared_store(Some(store_dir)),
    );
    feed_text(&mut session, text);
    session.end_sentence();
    session.flush();
    let count = session.learning().read().map(|l| l.bigram_count());
    count.unwrap_or(0)
}

pub fn learn(store_dir: &str, sentence: &[String]) {
    let count = learn_text(store_dir, &sentence.join(" "));
    println!("OK: {count} learned bigrams in {store_dir}");
}
