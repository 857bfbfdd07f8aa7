//! Language-aware syllable boundary lookup.
//!
//! Wraps the `hyphenation` crate's Knuth-Liang pattern dictionaries behind a
//! process-wide cache. Dictionaries are loaded lazily on first use and shared
//! read-only afterwards, so parallel document workers can look up boundaries
//! without coordination.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use hyphenation::{Hyphenator, Language, Load, Standard};
use log::{debug, warn};
use once_cell::sync::Lazy;

/// Source of syllable boundaries for a word.
///
/// Implementations return the interior byte offsets at which a new syllable
/// starts: strictly increasing, excluding 0 and the word's length. An empty
/// vector means the whole word is a single syllable, which is also the
/// required fallback for words or languages the implementation cannot split.
pub trait Syllables {
    fn breaks(&self, word: &str) -> Vec<usize>;
}

/// Loaded dictionaries, keyed by language. `None` records a failed load so
/// each language is attempted exactly once per process.
static DICTIONARIES: Lazy<RwLock<HashMap<Language, Option<Arc<Standard>>>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// A hyphenation dictionary for one language.
///
/// Obtained via [`Dictionary::load`]; cheap to clone and safe to share across
/// threads. When the requested language has no embedded dictionary, the
/// returned value still works but never splits a word.
#[derive(Clone)]
pub struct Dictionary {
    inner: Option<Arc<Standard>>,
}

impl Dictionary {
    /// Load the dictionary for a language tag like `"en"`, `"en-GB"`, or
    /// `"de_DE"`.
    ///
    /// Never fails: an unrecognized tag or a dictionary that cannot be
    /// loaded yields a whole-word-as-one-syllable fallback, logged once.
    pub fn load(tag: &str) -> Dictionary {
        let Some(language) = language_for_tag(tag) else {
            warn!("no hyphenation dictionary for language '{tag}', words will not be split");
            return Dictionary { inner: None };
        };

        if let Some(cached) = DICTIONARIES.read().expect("dictionary cache poisoned").get(&language)
        {
            return Dictionary {
                inner: cached.clone(),
            };
        }

        let mut cache = DICTIONARIES.write().expect("dictionary cache poisoned");
        // Re-check: another thread may have loaded it while we waited.
        let entry = cache.entry(language).or_insert_with(|| {
            match Standard::from_embedded(language) {
                Ok(dict) => {
                    debug!("loaded hyphenation dictionary for {language:?}");
                    Some(Arc::new(dict))
                }
                Err(e) => {
                    warn!("failed to load hyphenation dictionary for {language:?}: {e}");
                    None
                }
            }
        });

        Dictionary {
            inner: entry.clone(),
        }
    }

    /// Whether a real dictionary backs this value (false for the fallback).
    pub fn is_loaded(&self) -> bool {
        self.inner.is_some()
    }
}

impl Syllables for Dictionary {
    fn breaks(&self, word: &str) -> Vec<usize> {
        if word.is_empty() {
            return Vec::new();
        }
        match &self.inner {
            Some(dict) => dict.hyphenate(word).breaks,
            None => Vec::new(),
        }
    }
}

/// Map a BCP 47-style tag to an embedded dictionary language.
///
/// Matching is case-insensitive and accepts `_` as the subtag separator.
/// Only the primary language and region subtags are considered.
fn language_for_tag(tag: &str) -> Option<Language> {
    let normalized = tag.trim().to_ascii_lowercase().replace('_', "-");
    let mut subtags = normalized.split('-');
    let primary = subtags.next()?;
    let region = subtags.next().unwrap_or("");

    let language = match (primary, region) {
        ("en", "gb") => Language::EnglishGB,
        ("en", _) => Language::EnglishUS,
        ("de", "ch") => Language::GermanSwiss,
        ("de", "1901") => Language::German1901,
        ("de", _) => Language::German1996,
        ("fr", _) => Language::French,
        ("es", _) => Language::Spanish,
        ("it", _) => Language::Italian,
        ("nl", _) => Language::Dutch,
        ("pt", _) => Language::Portuguese,
        ("da", _) => Language::Danish,
        ("sv", _) => Language::Swedish,
        ("nb" | "no", _) => Language::NorwegianBokmal,
        ("nn", _) => Language::NorwegianNynorsk,
        ("fi", _) => Language::Finnish,
        ("is", _) => Language::Icelandic,
        ("pl", _) => Language::Polish,
        ("cs", _) => Language::Czech,
        ("sk", _) => Language::Slovak,
        ("sl", _) => Language::Slovenian,
        ("hr", _) => Language::Croatian,
        ("hu", _) => Language::Hungarian,
        ("ro", _) => Language::Romanian,
        ("ru", _) => Language::Russian,
        ("uk", _) => Language::Ukrainian,
        ("bg", _) => Language::Bulgarian,
        ("ca", _) => Language::Catalan,
        ("tr", _) => Language::Turkish,
        ("et", _) => Language::Estonian,
        ("lv", _) => Language::Latvian,
        ("lt", _) => Language::Lithuanian,
        ("ga", _) => Language::Irish,
        ("af", _) => Language::Afrikaans,
        ("cy", _) => Language::Welsh,
        ("id", _) => Language::Indonesian,
        _ => return None,
    };
    Some(language)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_language_never_splits() {
        let dict = Dictionary::load("zz");
        assert!(!dict.is_loaded());
        assert!(dict.breaks("extraordinary").is_empty());
    }

    #[test]
    fn test_tag_normalization() {
        assert_eq!(language_for_tag("EN_us"), Some(Language::EnglishUS));
        assert_eq!(language_for_tag("en-GB"), Some(Language::EnglishGB));
        assert_eq!(language_for_tag("de_DE"), Some(Language::German1996));
        assert_eq!(language_for_tag("de-CH"), Some(Language::GermanSwiss));
        assert_eq!(language_for_tag("klingon"), None);
    }

    #[test]
    fn test_english_breaks_are_valid_offsets() {
        let dict = Dictionary::load("en");
        assert!(dict.is_loaded());

        let word = "anfractuous";
        let breaks = dict.breaks(word);
        assert!(!breaks.is_empty(), "expected at least one break in {word}");
        for pair in breaks.windows(2) {
            assert!(pair[0] < pair[1], "breaks must be strictly increasing");
        }
        for &offset in &breaks {
            assert!(offset > 0 && offset < word.len());
            assert!(word.is_char_boundary(offset));
        }
    }

    #[test]
    fn test_german_compound_splits() {
        let dict = Dictionary::load("de");
        assert!(dict.is_loaded());
        assert!(!dict.breaks("Silbentrennung").is_empty());
    }

    #[test]
    fn test_deterministic() {
        let dict = Dictionary::load("en");
        assert_eq!(dict.breaks("determinism"), dict.breaks("determinism"));
    }

    #[test]
    fn test_cache_shares_one_instance() {
        let a = Dictionary::load("fr");
        let b = Dictionary::load("fr-FR");
        match (&a.inner, &b.inner) {
            (Some(a), Some(b)) => assert!(Arc::ptr_eq(a, b)),
            _ => panic!("French dictionary should load"),
        }
    }

    #[test]
    fn test_empty_word() {
        let dict = Dictionary::load("en");
        assert!(dict.breaks("").is_empty());
    }
}
