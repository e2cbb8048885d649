//! Word normalization: the canonical key used by every lookup table.
//!
//! One function serves all call sites; `keep_apostrophes` selects between the
//! contraction-preserving form used by the context window and the stripped
//! form used by the n-gram and user-learning tables ("don't" and "dont" then
//! share a key).

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::settings::settings;

/// Code points typed or pasted in place of an ASCII apostrophe.
const APOSTROPHE_VARIANTS: &[char] = &[
    '\u{2019}', // right single quotation mark
    '\u{2018}', // left single quotation mark
    '\u{201B}', // single high-reversed-9 quotation mark
    '\u{2032}', // prime
    '\u{0060}', // grave accent
    '\u{00B4}', // acute accent
    '\u{02BC}', // modifier letter apostrophe
    '\u{02B9}', // modifier letter prime
    '\u{FF07}', // fullwidth apostrophe
];

pub fn is_apostrophe(c: char) -> bool {
    c == '\'' || APOSTROPHE_VARIANTS.contains(&c)
}

/// Locale used for case folding.
///
/// Only the primary language subtag matters: Turkish and Azeri have their own
/// dotted/dotless `i` mapping, every other language uses Unicode default
/// lowercasing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locale {
    tag: String,
}

impl Locale {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.trim().replace('_', "-"),
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Primary language subtag, lowercased (`"tr"` for `"tr-TR"`).
    pub fn language(&self) -> String {
        self.tag
            .split('-')
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase()
    }

    fn has_turkic_casing(&self) -> bool {
        matches!(self.language().as_str(), "tr" | "az")
    }

    /// Lowercase `s` using this locale's case rules.
    pub fn lowercase(&self, s: &str) -> String {
        if !self.has_turkic_casing() {
            return s.to_lowercase();
        }
        let mut out = String::with_capacity(s.len());
        for c in s.chars() {
            match c {
                'I' => out.push('ı'),
                'İ' => out.push('i'),
                _ => out.extend(c.to_lowercase()),
            }
        }
        out
    }
}

impl Default for Locale {
    fn default() -> Self {
        Self::new("en")
    }
}

/// Canonicalize `word` for matching under the default locale.
pub fn normalize(word: &str, keep_apostrophes: bool) -> String {
    normalize_in(&Locale::default(), word, keep_apostrophes)
}

/// Canonicalize `word` for matching under `locale`.
///
/// 1. apostrophe-like code points become `'`
/// 2. locale-aware lowercasing
/// 3. NFD decomposition with combining marks removed
/// 4. everything but letters (and `'` when `keep_apostrophes`) is dropped
pub fn normalize_in(locale: &Locale, word: &str, keep_apostrophes: bool) -> String {
    if word.trim().is_empty() {
        return String::new();
    }
    let unified: String = word
        .chars()
        .map(|c| if is_apostrophe(c) { '\'' } else { c })
        .collect();
    locale
        .lowercase(&unified)
        .nfd()
        .filter(|&c| !is_combining_mark(c))
        .filter(|&c| c.is_alphabetic() || (keep_apostrophes && c == '\''))
        .collect()
}

// ---------------------------------------------------------------------------
// Bounded memoization
// ---------------------------------------------------------------------------

type CacheKey = (String, bool);

/// Fixed-capacity cache; the oldest insertion is evicted first.
struct NormalizeCache {
    capacity: usize,
    entries: HashMap<CacheKey, String>,
    order: VecDeque<CacheKey>,
}

impl NormalizeCache {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    fn get(&self, word: &str, keep_apostrophes: bool) -> Option<&String> {
        self.entries.get(&(word.to_string(), keep_apostrophes))
    }

    fn insert(&mut self, word: &str, keep_apostrophes: bool, normalized: String) {
        if self.capacity == 0 {
            return;
        }
        let key = (word.to_string(), keep_apostrophes);
        if self.entries.contains_key(&key) {
            return;
        }
        while self.entries.len() >= self.capacity {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            self.entries.remove(&oldest);
        }
        self.order.push_back(key.clone());
        self.entries.insert(key, normalized);
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

struct NormalizerState {
    locale: Locale,
    cache: NormalizeCache,
}

/// Locale-bound normalizer with one shared, capped cache.
///
/// Shared as `Arc<Normalizer>` by the context tracker, the n-gram model, the
/// learning store and the predictor so that they can never disagree on a key.
pub struct Normalizer {
    state: Mutex<NormalizerState>,
}

impl Normalizer {
    pub fn new(locale: Locale) -> Self {
        Self::with_capacity(locale, settings().normalize.cache_capacity)
    }

    pub fn with_capacity(locale: Locale, capacity: usize) -> Self {
        Self {
            state: Mutex::new(NormalizerState {
                locale,
                cache: NormalizeCache::new(capacity),
            }),
        }
    }

    pub fn normalize(&self, word: &str, keep_apostrophes: bool) -> String {
        // A poisoned lock only means a panic elsewhere mid-insert; the cache
        // contents are still valid strings.
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(hit) = state.cache.get(word, keep_apostrophes) {
            return hit.clone();
        }
        let normalized = normalize_in(&state.locale, word, keep_apostrophes);
        state
            .cache
            .insert(word, keep_apostrophes, normalized.clone());
        normalized
    }

    /// Normalize every word and drop the ones that become blank.
    pub fn normalize_all<S: AsRef<str>>(&self, words: &[S], keep_apostrophes: bool) -> Vec<String> {
        words
            .iter()
            .map(|w| self.normalize(w.as_ref(), keep_apostrophes))
            .filter(|w| !w.is_empty())
            .collect()
    }

    pub fn locale(&self) -> Locale {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .locale
            .clone()
    }

    /// Switch case rules; cached keys from the old locale are dropped.
    pub fn set_locale(&self, locale: Locale) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if state.locale != locale {
            state.locale = locale;
            state.cache.clear();
        }
    }

    pub fn cached_len(&self) -> usize {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .cache
            .len()
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(Locale::default())
    }
}
