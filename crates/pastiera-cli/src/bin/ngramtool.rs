use clap::{Parser, Subcommand};

use pastiera_cli::commands::ngram_ops;
use pastiera_cli::trace_init::init_tracing;

#[derive(Parser)]
#[command(name = "ngramtool", about = "Pastiera n-gram table build tool")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Count bigrams and trigrams in a plain-text corpus
    Extract {
        /// Corpus file, one sentence per line
        corpus: String,
        /// Output JSON file for bigrams
        bigrams_out: String,
        /// Output JSON file for trigrams
        trigrams_out: String,
        /// Minimum frequency to keep
        #[arg(long, default_value = "1")]
        min_freq: u32,
    },
    /// Compile bigram and trigram JSON into a binary table file
    Compile {
        /// Bigram JSON file
        bigrams: String,
        /// Trigram JSON file
        trigrams: String,
        /// Output table file (.psng)
        output_file: String,
    },
    /// Show statistics for a compiled table file
    Stats {
        /// Table file (.psng)
        file: String,
    },
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Extract {
            corpus,
            bigrams_out,
            trigrams_out,
            min_freq,
        } => ngram_ops::extract(&corpus, &bigrams_out, &trigrams_out, min_freq),
        Command::Compile {
            bigrams,
            trigrams,
            output_file,
        } => ngram_ops::compile(&bigrams, &trigrams, &output_file),
        Command::Stats { file } => ngram_ops::stats(&file),
    }
}
