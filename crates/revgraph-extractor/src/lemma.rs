//! Rule-based English lemmatizer
//!
//! Pronouns map to `PRONOUN_LEMMA`, irregular forms come from a table and
//! plural nouns lose their suffix under a few conservative rules. Anything
//! else is returned lower-cased.

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;

use crate::PRONOUN_LEMMA;

static PRONOUNS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "i", "me", "my", "mine", "myself", "you", "your", "yours", "yourself", "yourselves",
        "he", "him", "his", "himself", "she", "her", "hers", "herself", "it", "its", "itself",
        "we", "us", "our", "ours", "ourselves", "they", "them", "their", "theirs",
        "themselves",
    ]
    .into_iter()
    .collect()
});

static IRREGULAR: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    [
        ("am", "be"),
        ("is", "be"),
        ("are", "be"),
        ("was", "be"),
        ("were", "be"),
        ("been", "be"),
        ("being", "be"),
        ("'m", "be"),
        ("'re", "be"),
        ("’m", "be"),
        ("’re", "be"),
        ("has", "have"),
        ("had", "have"),
        ("having", "have"),
        ("'ve", "have"),
        ("’ve", "have"),
        ("does", "do"),
        ("did", "do"),
        ("done", "do"),
        ("doing", "do"),
        ("n't", "not"),
        ("n’t", "not"),
        ("'ll", "will"),
        ("’ll", "will"),
        ("'d", "would"),
        ("’d", "would"),
        ("ca", "can"),
        ("wo", "will"),
        ("went", "go"),
        ("gone", "go"),
        ("made", "make"),
        ("men", "man"),
        ("women", "woman"),
        ("children", "child"),
        ("leaves", "leaf"),
        ("knives", "knife"),
        ("feet", "foot"),
        ("teeth", "tooth"),
        ("shoes", "shoe"),
    ]
    .into_iter()
    .collect()
});

/// Words ending in `s` that are not plurals
static KEEP: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "always", "perhaps", "whereas", "yes", "thus", "series", "species", "across",
        "afterwards", "towards", "besides", "sometimes", "nevertheless", "lees", "molasses",
        "gas", "bus", "bias", "lens", "news", "chablis", "cassis", "pastis", "hors",
    ]
    .into_iter()
    .collect()
});

/// Suffix- and table-driven lemmatizer
#[derive(Debug, Default, Clone)]
pub struct Lemmatizer;

impl Lemmatizer {
    pub fn new() -> Self {
        Self
    }

    /// Base form of `word`
    pub fn lemma(&self, word: &str) -> String {
        let lower = word.to_lowercase();

        if PRONOUNS.contains(lower.as_str()) {
            return PRONOUN_LEMMA.to_string();
        }
        if let Some(base) = IRREGULAR.get(lower.as_str()) {
            return (*base).to_string();
        }
        if !lower.chars().all(char::is_alphabetic) || KEEP.contains(lower.as_str()) {
            return lower;
        }

        singular(&lower).unwrap_or(lower)
    }
}

fn singular(word: &str) -> Option<String> {
    let len = word.len();

    if word.ends_with("ies") && len > 4 {
        return Some(format!("{}y", &word[..len - 3]));
    }
    if word.ends_with("sses") {
        return Some(word[..len - 2].to_string());
    }
    if ["xes", "ches", "shes", "oes"]
        .iter()
        .any(|suffix| word.ends_with(suffix))
        && len > 4
    {
        return Some(word[..len - 2].to_string());
    }
    if word.ends_with('s')
        && len > 3
        && !["ss", "us", "is", "ous"].iter().any(|suffix| word.ends_with(suffix))
    {
        return Some(word[..len - 1].to_string());
    }

    None
}
