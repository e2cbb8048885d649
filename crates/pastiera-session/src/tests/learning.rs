use pastiera_core::settings::settings;
use pastiera_core::store::{KeyValueStore, MemoryStore};
use pastiera_core::user_learning::{BIGRAMS_KEY, TRIGRAMS_KEY};
use pastiera_core::PredictionConfig;

use super::{new_session, session_with_store, type_sentence};

#[test]
fn test_sentence_is_learned_at_boundary() {
    let (mut session, _) = new_session();
    session.commit_word("Good");
    session.commit_word("morning");
    session.commit_word("everyone");
    assert!(session.learning().read().unwrap().is_empty());

    session.commit_punctuation('.');
    let learning = session.learning().read().unwrap();
    assert_eq!(learning.bigram_frequency("good", "morning"), 1);
    assert_eq!(learning.trigram_frequency("good", "morning", "everyone"), 1);
}

#[test]
fn test_single_word_sentence_not_learned() {
    let (mut session, _) = new_session();
    type_sentence(&mut session, &["hello"]);
    assert!(session.learning().read().unwrap().is_empty());
}

#[test]
fn test_learning_disabled() {
    let (mut session, _) = new_session();
    session.set_config(PredictionConfig {
        user_learning_enabled: false,
        ..PredictionConfig::default()
    });
    type_sentence(&mut session, &["good", "morning"]);
    assert!(session.learning().read().unwrap().is_empty());
}

#[test]
fn test_personal_phrase_surfaces() {
    let (mut session, _) = new_session();
    type_sentence(&mut session, &["I", "like", "sushi"]);
    session.commit_word("i");
    session.commit_word("like");
    assert_eq!(session.suggestions(false).predictions, vec!["pizza", "sushi"]);
}

#[test]
fn test_periodic_persistence() {
    let every = settings().learning.persist_every_sentences;
    let (mut session, store) = new_session();
    for _ in 1..every {
        type_sentence(&mut session, &["good", "morning"]);
    }
    session.wait_idle();
    assert!(!store.lock().unwrap().contains(BIGRAMS_KEY));

    type_sentence(&mut session, &["good", "morning"]);
    session.wait_idle();
    let store = store.lock().unwrap();
    assert!(store.contains(BIGRAMS_KEY));
    assert!(store.contains(TRIGRAMS_KEY));
}

#[test]
fn test_restored_from_store() {
    let mut store = MemoryStore::new();
    store
        .put_string(TRIGRAMS_KEY, r#"{"i": {"like": {"ramen": 3}}}"#)
        .unwrap();
    let (mut session, _) = session_with_store(store);
    assert_eq!(
        session
            .learning()
            .read()
            .unwrap()
            .trigram_frequency("i", "like", "ramen"),
        3
    );
    session.commit_word("i");
    session.commit_word("like");
    assert!(session
        .suggestions(false)
        .predictions
        .contains(&"ramen".to_string()));
}

#[test]
fn test_malformed_store_starts_empty() {
    let mut store = MemoryStore::new();
    store.put_string(BIGRAMS_KEY, "{broken").unwrap();
    let (session, _) = session_with_store(store);
    assert!(session.learning().read().unwrap().is_empty());
}

#[test]
fn test_flush_writes_immediately() {
    let (mut session, store) = new_session();
    type_sentence(&mut session, &["see", "you", "soon"]);
    session.flush();

    let mut restored = pastiera_core::UserLearningStore::new(std::sync::Arc::new(
        pastiera_core::Normalizer::default(),
    ));
    restored.try_load(&*store.lock().unwrap()).unwrap();
    assert_eq!(restored.trigram_frequency("see", "you", "soon"), 1);
}

#[test]
fn test_clear_learning() {
    let (mut session, store) = new_session();
    type_sentence(&mut session, &["good", "morning"]);
    session.flush();
    assert!(!store.lock().unwrap().is_empty());

    session.clear_learning();
    assert!(session.learning().read().unwrap().is_empty());
    assert!(store.lock().unwrap().is_empty());
}

#[test]
fn test_long_run_on_sentence_is_learned() {
    let (mut session, _) = new_session();
    for i in 0..100 {
        session.commit_word(if i % 2 == 0 { "alpha" } else { "beta" });
    }
    {
        let learning = session.learning().read().unwrap();
        assert_eq!(learning.bigram_frequency("alpha", "beta"), 50);
        assert_eq!(learning.bigram_frequency("beta", "alpha"), 49);
        assert_eq!(learning.trigram_frequency("alpha", "beta", "alpha"), 49);
    }

    // The sentence goes on past the cut; n-grams spanning it are learned once.
    session.commit_word("alpha");
    session.end_sentence();
    let learning = session.learning().read().unwrap();
    assert_eq!(learning.bigram_frequency("alpha", "beta"), 50);
    assert_eq!(learning.bigram_frequency("beta", "alpha"), 50);
    assert_eq!(learning.trigram_frequency("alpha", "beta", "alpha"), 50);
    assert_eq!(learning.trigram_frequency("beta", "alpha", "beta"), 49);
}
