//! Offline n-gram extraction from plain-text corpora, and the nested JSON
//! shape the build tools exchange (`{"w1": {"w2": n}}` for bigrams,
//! `{"w1": {"w2": {"w3": n}}}` for trigrams).

use crate::normalize::normalize;

use super::{BigramTable, NgramTables, TrigramTable};

/// Shorter tokens are mostly tokenizer debris in raw corpora.
const MIN_WORD_CHARS: usize = 2;

#[derive(Default)]
pub struct NgramBuilder {
    bigrams: BigramTable,
    trigrams: TrigramTable,
    sentences: usize,
}

impl NgramBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count every consecutive pair and triple of an already tokenized line.
    pub fn add_words<S: AsRef<str>>(&mut self, words: &[S]) {
        let words: Vec<String> = words
            .iter()
            .map(|w| normalize(w.as_ref(), false))
            .filter(|w| w.chars().count() >= MIN_WORD_CHARS)
            .collect();
        if words.len() < 2 {
            return;
        }
        self.sentences += 1;

        for pair in words.windows(2) {
            *self
                .bigrams
                .entry(pair[0].clone())
                .or_default()
                .entry(pair[1].clone())
                .or_insert(0) += 1;
        }
        for triple in words.windows(3) {
            *self
                .trigrams
                .entry(triple[0].clone())
                .or_default()
                .entry(triple[1].clone())
                .or_default()
                .entry(triple[2].clone())
                .or_insert(0) += 1;
        }
    }

    /// Tokenize one line of running text on whitespace.
    pub fn add_line(&mut self, line: &str) {
        let words: Vec<&str> = line.split_whitespace().collect();
        self.add_words(&words);
    }

    pub fn add_text(&mut self, text: &str) {
        for line in text.lines() {
            self.add_line(line);
        }
    }

    /// Lines that contributed at least one bigram.
    pub fn sentence_count(&self) -> usize {
        self.sentences
    }

    /// Finish, dropping every n-gram seen fewer than `min_freq` times.
    pub fn build(self, min_freq: u32) -> NgramTables {
        let mut tables = NgramTables::new(self.bigrams, self.trigrams);
        if min_freq > 1 {
            prune(&mut tables, min_freq);
        }
        tables
    }
}

fn prune(tables: &mut NgramTables, min_freq: u32) {
    tables.bigrams.retain(|_, inner| {
        inner.retain(|_, count| *count >= min_freq);
        !inner.is_empty()
    });
    tables.trigrams.retain(|_, middle| {
        middle.retain(|_, inner| {
            inner.retain(|_, count| *count >= min_freq);
            !inner.is_empty()
        });
        !middle.is_empty()
    });
}

impl NgramTables {
    /// Parse the nested bigram and trigram JSON documents.
    pub fn from_json(bigrams: &str, trigrams: &str) -> Result<Self, serde_json::Error> {
        let bigrams: BigramTable = serde_json::from_str(bigrams)?;
        let trigrams: TrigramTable = serde_json::from_str(trigrams)?;
        Ok(Self::new(bigrams, trigrams))
    }

    pub fn bigrams_to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.bigrams)
    }

    pub fn trigrams_to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.trigrams)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_pairs_and_triples() {
        let mut b = NgramBuilder::new();
        b.add_line("How are you today");
        b.add_line("how are you");
        let tables = b.build(1);
        assert_eq!(tables.bigrams["how"]["are"], 2);
        assert_eq!(tables.bigrams["you"]["today"], 1);
        assert_eq!(tables.trigrams["how"]["are"]["you"], 2);
        assert_eq!(tables.trigrams["are"]["you"]["today"], 1);
    }

    #[test]
    fn test_short_words_and_punctuation_dropped() {
        let mut b = NgramBuilder::new();
        b.add_line("I said: hello, world!");
        let tables = b.build(1);
        assert!(!tables.bigrams.contains_key("i"));
        assert_eq!(tables.bigrams["said"]["hello"], 1);
        assert_eq!(tables.bigrams["hello"]["world"], 1);
    }

    #[test]
    fn test_min_freq_prunes_empty_branches() {
        let mut b = NgramBuilder::new();
        b.add_text("good morning everyone\ngood morning\ngood night");
        assert_eq!(b.sentence_count(), 3);
        let tables = b.build(2);
        assert_eq!(tables.bigrams["good"].len(), 1);
        assert_eq!(tables.bigrams["good"]["morning"], 2);
        assert!(!tables.bigrams.contains_key("morning"));
        assert!(tables.trigrams.is_empty());
    }

    #[test]
    fn test_single_word_lines_ignored() {
        let mut b = NgramBuilder::new();
        b.add_line("hello");
        b.add_line("");
        assert_eq!(b.sentence_count(), 0);
        assert!(b.build(1).is_empty());
    }

    #[test]
    fn test_json_import() {
        let tables = NgramTables::from_json(
            r#"{"how": {"are": 10}}"#,
            r#"{"how": {"are": {"you": 50, "u": 5}}}"#,
        )
        .unwrap();
        assert_eq!(tables.bigram_count(), 1);
        assert_eq!(tables.trigram_count(), 2);
        assert_eq!(tables.trigram_continuations("how", "are").unwrap()["u"], 5);

        let json = tables.trigrams_to_json().unwrap();
        let back: TrigramTable = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tables.trigrams);
    }

    #[test]
    fn test_json_import_rejects_bad_shape() {
        assert!(NgramTables::from_json(r#"{"how": 3}"#, "{}").is_err());
    }
}
