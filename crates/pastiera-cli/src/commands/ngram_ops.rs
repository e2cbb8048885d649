use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::Path;

use pastiera_core::ngram::builder::NgramBuilder;
use pastiera_core::NgramTables;
use tracing::info;

use super::CliError;

/// Count n-grams over a plain-text corpus, one sentence per line.
pub fn extract_tables(corpus: &str, min_freq: u32) -> Result<NgramTables, CliError> {
    let file = File::open(corpus).map_err(CliError::io(corpus))?;
    let mut builder = NgramBuilder::new();
    for line in BufReader::new(file).lines() {
        let line = line.map_err(CliError::io(corpus))?;
        builder.add_line(&line);
    }
    info!(sentences = builder.sentence_count(), "corpus read");
    Ok(builder.build(min_freq))
}

pub fn read_json_tables(bigrams: &str, trigrams: &str) -> Result<NgramTables, CliError> {
    let b = fs::read_to_string(bigrams).map_err(CliError::io(bigrams))?;
    let t = fs::read_to_string(trigrams).map_err(CliError::io(trigrams))?;
    Ok(NgramTables::from_json(&b, &t)?)
}

fn write_text(path: &str, content: &str) -> Result<(), CliError> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(CliError::io(path))?;
        }
    }
    fs::write(path, content).map_err(CliError::io(path))
}

pub fn extract(corpus: &str, bigrams_out: &str, trigrams_out: &str, min_freq: u32) {
    let tables = die!(extract_tables(corpus, min_freq), "Error: {}");
    let bigrams = die!(tables.bigrams_to_json(), "Error serializing bigrams: {}");
    let trigrams = die!(tables.trigrams_to_json(), "Error serializing trigrams: {}");
    die!(write_text(bigrams_out, &bigrams), "Error: {}");
    die!(write_text(trigrams_out, &trigrams), "Error: {}");
    println!(
        "Extracted {} bigrams, {} trigrams (min freq {min_freq})",
        tables.bigram_count(),
        tables.trigram_count()
    );
}

pub fn compile(bigrams: &str, trigrams: &str, output: &str) {
    let tables = die!(read_json_tables(bigrams, trigrams), "Error: {}");
    die!(tables.save(Path::new(output)), "Error writing {output}: {}");
    println!(
        "Compiled {} bigrams, {} trigrams -> {output}",
        tables.bigram_count(),
        tables.trigram_count()
    );
}

pub fn stats(file: &str) {
    let tables = die!(NgramTables::open(Path::new(file)), "Error reading {file}: {}");
    println!("Bigram contexts:  {}", tables.bigrams.len());
    println!("Bigrams:          {}", tables.bigram_count());
    println!("Trigram contexts: {}", tables.trigrams.values().map(|m| m.len()).sum::<usize>());
    println!("Trigrams:         {}", tables.trigram_count());

    let mut top: Vec<(&String, usize)> = tables
        .bigrams
        .iter()
        .map(|(w, next)| (w, next.len()))
        .collect();
    top.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    if !top.is_empty() {
        println!("\nWidest bigram contexts:");
        for (word, width) in top.iter().take(10) {
            println!("  {word:<20} {width}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_then_compile() {
        let dir = tempfile::tempdir().unwrap();
        let corpus = dir.path().join("corpus.txt");
        fs::write(&corpus, "how are you\nhow are you doing\nhow are they\n").unwrap();

        let tables = extract_tables(corpus.to_str().unwrap(), 2).unwrap();
        assert_eq!(tables.bigrams["how"]["are"], 3);
        assert_eq!(tables.trigrams["how"]["are"]["you"], 2);
        assert!(!tables.trigrams["how"]["are"].contains_key("they"));

        let b = dir.path().join("json").join("bigrams.json");
        let t = dir.path().join("json").join("trigrams.json");
        write_text(b.to_str().unwrap(), &tables.bigrams_to_json().unwrap()).unwrap();
        write_text(t.to_str().unwrap(), &tables.trigrams_to_json().unwrap()).unwrap();
        let back = read_json_tables(b.to_str().unwrap(), t.to_str().unwrap()).unwrap();
        assert_eq!(back, tables);
    }

    #[test]
    fn test_missing_corpus_names_path() {
        let err = extract_tables("/nonexistent/corpus.txt", 1).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/corpus.txt"));
    }
}
