//! Reference vocabulary for the supported target languages.
//!
//! The table is embedded at build time and parsed once on first use. It is
//! only used to bias the completion request; words missing from it are left
//! to the model.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Source word or phrase → translated word or phrase.
pub type Translations = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DictionaryEntry {
    pub id: u32,
    pub language: String,
    pub translation: Translations,
}

/// Languages offered by the form. Names match the dictionary's `language` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    Noongar,
    Kriol,
    Bunuba,
    Walmajarri,
}

impl Language {
    pub const ALL: [Language; 4] = [
        Language::Noongar,
        Language::Kriol,
        Language::Bunuba,
        Language::Walmajarri,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Language::Noongar => "Australian Aboriginal Noongar",
            Language::Kriol => "Australian Aboriginal Kriol",
            Language::Bunuba => "Australian Aboriginal Bunuba",
            Language::Walmajarri => "Australian Aboriginal Walmajarri",
        }
    }
}

const DICTIONARY_JSON: &str = include_str!("data/dictionary.json");

static DICTIONARY: Lazy<Vec<DictionaryEntry>> = Lazy::new(|| {
    parse_entries(DICTIONARY_JSON).expect("embedded dictionary.json is malformed")
});

pub fn parse_entries(json: &str) -> serde_json::Result<Vec<DictionaryEntry>> {
    serde_json::from_str(json)
}

pub fn entries() -> &'static [DictionaryEntry] {
    &DICTIONARY
}

/// First entry whose language equals `language` exactly.
pub fn entry(language: &str) -> Option<&'static DictionaryEntry> {
    find_in(entries(), language)
}

pub fn lookup(language: &str) -> Option<&'static Translations> {
    entry(language).map(|e| &e.translation)
}

fn find_in<'a>(entries: &'a [DictionaryEntry], language: &str) -> Option<&'a DictionaryEntry> {
    entries.iter().find(|e| e.language == language)
}
