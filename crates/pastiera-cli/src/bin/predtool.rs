use clap::{Parser, Subcommand};

use pastiera_cli::commands::config_ops;
use pastiera_cli::commands::predict_ops::{self, PredictOptions};
use pastiera_cli::trace_init::init_tracing;

#[derive(Parser)]
#[command(name = "predtool", about = "Pastiera next-word prediction diagnostics")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Predict the next word after a context
    Predict {
        /// Word list JSON file ([{"w": ..., "f": ...}])
        words_file: String,
        /// Compiled n-gram table file (.psng)
        tables_file: String,
        /// Context words, oldest first
        #[arg(required = true)]
        context: Vec<String>,
        /// Number of predictions
        #[arg(short, long, default_value = "3")]
        n: usize,
        /// Locale tag used for lowercasing
        #[arg(long, default_value = "en")]
        locale: String,
        /// Directory holding the user learning store (optional)
        #[arg(long)]
        store: Option<String>,
    },
    /// Learn from typed text and save it to a store directory
    Learn {
        /// Directory holding the user learning store
        store_dir: String,
        /// Text to learn from; `.`, `!` and `?` end sentences
        #[arg(required = true)]
        sentence: Vec<String>,
    },
    /// Settings TOML helpers
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(Subcommand)]
enum SettingsAction {
    /// Export default settings as TOML
    Export,
    /// Validate a custom settings TOML file
    Validate {
        /// Path to the TOML file
        file: String,
    },
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Predict {
            words_file,
            tables_file,
            context,
            n,
            locale,
            store,
        } => {
            let opts = PredictOptions {
                words_file: &words_file,
                tables_file: &tables_file,
                locale: &locale,
                store_dir: store.as_deref(),
                max_suggestions: n,
            };
            predict_ops::predict(&opts, &context);
        }
        Command::Learn {
            store_dir,
            sentence,
        } => predict_ops::learn(&store_dir, &sentence),
        Command::Settings { action } => match action {
            SettingsAction::Export => config_ops::settings_export(),
            SettingsAction::Validate { file } => config_ops::settings_validate(&file),
        },
    }
}
