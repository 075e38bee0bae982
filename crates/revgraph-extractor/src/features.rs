//! Feature extraction
//!
//! `FeatureExtractor::extract` turns a (name, raw text) pair into a
//! `ReviewRecord` and appends it to a caller-owned batch:
//!
//! 1. tokenize and sentence-split the raw text
//! 2. lemmatize every token, lower-case it, and drop stop words and
//!    punctuation (tested on the lemma, not the surface form)
//! 3. match flavor keywords against the processed text
//! 4. optionally recognize entities and score sentiment on the raw text

use std::path::Path;
use std::sync::Arc;

use revgraph_core::{ExtractionConfig, Result, ReviewRecord};
use tracing::debug;

use crate::builder::RecordBuilder;
use crate::ingest::review_name;
use crate::vocab::{is_punctuation, is_stop_word, match_flavors};
use crate::{LanguagePipeline, PRONOUN_LEMMA};

/// Which optional analyses run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractionOptions {
    pub ner: bool,
    pub sentiment: bool,
    pub topics: bool,
}

impl Default for ExtractionOptions {
    fn default() -> Self {
        Self {
            ner: true,
            sentiment: true,
            topics: false,
        }
    }
}

impl From<&ExtractionConfig> for ExtractionOptions {
    fn from(config: &ExtractionConfig) -> Self {
        Self {
            ner: config.ner,
            sentiment: config.sentiment,
            topics: config.topics,
        }
    }
}

/// Extracts review features through an injected language pipeline
#[derive(Clone)]
pub struct FeatureExtractor {
    pipeline: Arc<dyn LanguagePipeline>,
    options: ExtractionOptions,
}

impl FeatureExtractor {
    pub fn new(pipeline: Arc<dyn LanguagePipeline>, options: ExtractionOptions) -> Self {
        Self { pipeline, options }
    }

    pub fn options(&self) -> ExtractionOptions {
        self.options
    }

    /// Extract one review, append its record to `batch` and return the
    /// processed text.
    ///
    /// `name` may be a file name; only its stem is kept. Pipeline errors
    /// propagate unchanged.
    pub fn extract(
        &self,
        name: &str,
        raw_text: &str,
        batch: &mut Vec<ReviewRecord>,
    ) -> Result<String> {
        let name = review_name(Path::new(name));
        let pipeline = self.pipeline.as_ref();

        let tokens = pipeline.tokenize(raw_text)?;
        let sentences = pipeline.sentences(raw_text, &tokens)?;

        let mut kept = Vec::with_capacity(tokens.len());
        for token in &tokens {
            let lemma = pipeline.lemmatize(token)?;
            let normalized = if lemma == PRONOUN_LEMMA {
                token.text.to_lowercase()
            } else {
                lemma.to_lowercase().trim().to_string()
            };

            if is_stop_word(&normalized) || is_punctuation(&normalized) {
                continue;
            }
            kept.push(normalized);
        }
        let processed = kept.join(" ");

        let entities = if self.options.ner {
            Some(pipeline.entities(raw_text)?)
        } else {
            None
        };

        let sentiment = if self.options.sentiment {
            Some(pipeline.sentiment(raw_text)?)
        } else {
            None
        };

        if self.options.topics {
            debug!(review = %name, "Topic extraction is not available; skipping");
        }

        let flavors = match_flavors(&processed);

        debug!(
            review = %name,
            pipeline = pipeline.name(),
            words = tokens.len(),
            sentences = sentences.len(),
            flavors = flavors.len(),
            "Extracted review features"
        );

        RecordBuilder::new(name, raw_text)
            .counts(tokens.len(), sentences.len())
            .processed_text(processed.clone())
            .flavors(flavors)
            .entities(entities)
            .sentiment(sentiment)
            .append_to(batch);

        Ok(processed)
    }
}
