//! Revgraph Extractor - Feature extraction pipeline
//!
//! Turns one (name, raw text) pair into a `ReviewRecord`: token and sentence
//! counts, processed text, named entities, sentiment and flavor keywords.
//! The linguistic work is delegated to a `LanguagePipeline`, so the concrete
//! engine can be swapped without touching the extraction rules.

use revgraph_core::{EntityMention, Result, Sentiment};

pub mod builder;
pub mod features;
pub mod ingest;
pub mod lemma;
pub mod ner;
pub mod pipeline;
pub mod sentiment;
pub mod tokenizer;
pub mod vocab;

pub use builder::RecordBuilder;
pub use features::{ExtractionOptions, FeatureExtractor};
pub use ingest::{ingest_directory, list_review_files, read_review, review_name};
pub use pipeline::RulePipeline;

/// Lemma reported for pronouns
pub const PRONOUN_LEMMA: &str = "-PRON-";

/// A token with its byte span in the source text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub start: usize,
    pub end: usize,
}

impl Token {
    pub fn new(text: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            text: text.into(),
            start,
            end,
        }
    }
}

/// A byte range of the source text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

/// Linguistic capabilities the extractor depends on
pub trait LanguagePipeline: Send + Sync {
    /// Split text into tokens, punctuation included
    fn tokenize(&self, text: &str) -> Result<Vec<Token>>;

    /// Group tokens of `text` into sentences
    fn sentences(&self, text: &str, tokens: &[Token]) -> Result<Vec<Span>>;

    /// Base form of a token; pronouns yield `PRONOUN_LEMMA`
    fn lemmatize(&self, token: &Token) -> Result<String>;

    /// Named-entity mentions in order of appearance
    fn entities(&self, text: &str) -> Result<Vec<EntityMention>>;

    /// Whole-text sentiment
    fn sentiment(&self, text: &str) -> Result<Sentiment>;

    /// Engine name for logging
    fn name(&self) -> &str;
}
