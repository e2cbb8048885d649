use std::io;

use pastiera_core::dict::DictError;
use pastiera_core::ngram::io::NgramIoError;

macro_rules! die {
    ($result:expr, $($arg:tt)*) => {
        $result.unwrap_or_else(|e| {
            eprintln!($($arg)*, e);
            std::process::exit(1);
        })
    };
}

pub mod config_ops;
pub mod ngram_ops;
pub mod predict_ops;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("n-gram table error: {0}")]
    Ngram(#[from] NgramIoError),

    #[error("dictionary error: {0}")]
    Dict(#[from] DictError),
}

impl CliError {
    pub(crate) fn io(path: &str) -> impl FnOnce(io::Error) -> Self + '_ {
        move |source| Self::Io {
            path: path.to_string(),
            source,
        }
    }
}
