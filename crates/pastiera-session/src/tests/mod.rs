mod learning;
mod proptest_session;

use std::sync::{Arc, Mutex};

use pastiera_core::store::MemoryStore;
use pastiera_core::{Dictionary, Locale, NgramTables, WordEntry, WordListDictionary};

use super::PredictionSession;

pub(super) fn make_test_dict() -> Arc<dyn Dictionary> {
    let tables = NgramTables::from_json(
        r#"{
            "good": {"morning": 8, "night": 3},
            "are": {"we": 4, "they": 2},
            "eat": {"pasta": 10, "pizza": 9}
        }"#,
        r#"{
            "how": {"are": {"you": 50, "u": 5}},
            "i": {"like": {"pizza": 10}}
        }"#,
    )
    .unwrap();
    let entries = vec![
        WordEntry::new("the", 5000),
        WordEntry::new("you", 3000),
        WordEntry::new("pizza", 800),
        WordEntry::new("morning", 600),
        WordEntry::new("Parenzo", 50),
    ];
    Arc::new(WordListDictionary::from_entries(entries).with_ngrams(tables))
}

pub(super) fn make_italian_dict() -> Arc<dyn Dictionary> {
    let tables = NgramTables::from_json(r#"{"buon": {"giorno": 4, "appetito": 2}}"#, "{}").unwrap();
    let entries = vec![WordEntry::new("giorno", 900), WordEntry::new("buon", 700)];
    Arc::new(WordListDictionary::from_entries(entries).with_ngrams(tables))
}

/// A ready session plus a handle on its backing store.
pub(super) fn new_session() -> (PredictionSession, Arc<Mutex<MemoryStore>>) {
    session_with_store(MemoryStore::new())
}

pub(super) fn session_with_store(
    store: MemoryStore,
) -> (PredictionSession, Arc<Mutex<MemoryStore>>) {
    let store = Arc::new(Mutex::new(store));
    let session = PredictionSession::new(make_test_dict(), Locale::new("en"), store.clone());
    session.wait_idle();
    (session, store)
}

pub(super) fn type_sentence(session: &mut PredictionSession, words: &[&str]) {
    for w in words {
        session.commit_word(w);
    }
    session.commit_punctuation('.');
}
