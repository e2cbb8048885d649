use std::fs;

pub fn settings_export() {
    print!("{}", pastiera_core::settings::default_toml());
}

pub fn settings_validate(file: &str) {
    let content = die!(fs::read_to_string(file), "Error reading {file}: {}");
    let s = die!(
        pastiera_core::settings::parse_settings_toml(&content),
        "Error: {}"
    );
    println!(
        "OK: context.max_context_length={}, prediction.boost_multiplier={}, learning.persist_every_sentences={}",
        s.context.max_context_length, s.prediction.boost_multiplier, s.learning.persist_every_sentences
    );
}
