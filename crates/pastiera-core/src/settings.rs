//! Global settings loaded from TOML.
//!
//! - `init_custom(toml_content)` sets a custom TOML before first `settings()` call
//! - `settings()` returns `&'static Settings` (lazy-init singleton)
//! - Default values are embedded via `include_str!("default_settings.toml")`

use std::sync::OnceLock;

use serde::Deserialize;

pub const DEFAULT_SETTINGS_TOML: &str = include_str!("default_settings.toml");

static CUSTOM_TOML: OnceLock<String> = OnceLock::new();

/// Set custom TOML before first `settings()` call.
pub fn init_custom(toml_content: String) -> Result<(), SettingsError> {
    parse_settings_toml(&toml_content)?;
    CUSTOM_TOML
        .set(toml_content)
        .map_err(|_| SettingsError::AlreadyInitialized)
}

/// Get or initialize the global settings singleton.
pub fn settings() -> &'static Settings {
    static INSTANCE: OnceLock<Settings> = OnceLock::new();
    INSTANCE.get_or_init(|| {
        let toml_str = CUSTOM_TOML
            .get()
            .map(|s| s.as_str())
            .unwrap_or(DEFAULT_SETTINGS_TOML);
        parse_settings_toml(toml_str).expect("settings TOML must be valid")
    })
}

/// Returns the embedded default settings TOML content.
pub fn default_toml() -> &'static str {
    DEFAULT_SETTINGS_TOML
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("TOML parse error: {0}")]
    Parse(String),
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
    #[error("settings already initialized")]
    AlreadyInitialized,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub context: ContextSettings,
    pub prediction: PredictionSettings,
    pub learning: LearningSettings,
    pub normalize: NormalizeSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContextSettings {
    pub max_context_length: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PredictionSettings {
    pub boost_multiplier: f64,
    pub base_candidate_factor: usize,
    pub frequency_scale: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LearningSettings {
    pub max_bigrams: usize,
    pub max_trigrams: usize,
    pub persist_every_sentences: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NormalizeSettings {
    /// Zero disables memoization.
    pub cache_capacity: usize,
}

pub fn parse_settings_toml(toml_str: &str) -> Result<Settings, SettingsError> {
    let s: Settings = toml::from_str(toml_str).map_err(|e| SettingsError::Parse(e.to_string()))?;
    validate(&s)?;
    Ok(s)
}

fn validate(s: &Settings) -> Result<(), SettingsError> {
    macro_rules! check_positive_usize {
        ($section:ident . $field:ident) => {
            if s.$section.$field == 0 {
                return Err(SettingsError::InvalidValue {
                    field: concat!(stringify!($section), ".", stringify!($field)).to_string(),
                    reason: "must be positive".to_string(),
                });
            }
        };
    }
    macro_rules! check_positive_f64 {
        ($section:ident . $field:ident) => {
            if s.$section.$field <= 0.0 || !s.$section.$field.is_finite() {
                return Err(SettingsError::InvalidValue {
                    field: concat!(stringify!($section), ".", stringify!($field)).to_string(),
                    reason: "must be a positive finite number".to_string(),
                });
            }
        };
    }

    check_positive_usize!(context.max_context_length);

    check_positive_f64!(prediction.frequency_scale);
    check_positive_usize!(prediction.base_candidate_factor);
    if s.prediction.boost_multiplier < 0.0 || !s.prediction.boost_multiplier.is_finite() {
        return Err(SettingsError::InvalidValue {
            field: "prediction.boost_multiplier".to_string(),
            reason: "must be non-negative".to_string(),
        });
    }

    check_positive_usize!(learning.max_bigrams);
    check_positive_usize!(learning.max_trigrams);
    check_positive_usize!(learning.persist_every_sentences);

    Ok(())
}
