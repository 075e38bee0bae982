//! Revgraph Core - Review records, error types and shared configuration
//!
//! This crate defines the pieces every stage of the pipeline agrees on:
//! - The canonical `ReviewRecord` produced by extraction and consumed by loading
//! - The error taxonomy (configuration, input, I/O, backend, transaction, query)
//! - Configuration management
//! - The batch file that decouples extraction from loading

pub mod batch;
pub mod config;

pub use batch::BatchFile;
pub use config::{
    AppConfig, ConfigError, EdgePolicy, ExtractionConfig, GraphBackendKind, GraphConfig,
    LoggingConfig, PathsConfig,
};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Core error type for pipeline operations
#[derive(Error, Debug)]
pub enum RevgraphError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Input folder not found: {}", .0.display())]
    InputDirMissing(PathBuf),

    #[error("No files found in input folder: {}", .0.display())]
    InputDirEmpty(PathBuf),

    #[error("Invalid upload limit {limit}: enter a number from 1 to {available}")]
    InvalidLimit { limit: usize, available: usize },

    #[error("Input file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Batch file not found: {}", .0.display())]
    BatchMissing(PathBuf),

    #[error("Failed to write batch file {}: {source}", path.display())]
    BatchWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read batch file {}: {source}", path.display())]
    BatchRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed batch file {}: {source}", path.display())]
    BatchFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Graph backend error: {0}")]
    Backend(String),

    #[error("Commit was not acknowledged within {0:?}")]
    CommitTimeout(Duration),

    #[error("Clearing the graph failed: {source}")]
    Clear {
        #[source]
        source: Box<RevgraphError>,
    },

    #[error("Transaction for entry {} ('{}') failed: {source}", .index + 1, .record.name)]
    Transaction {
        /// Position of the record in its batch
        index: usize,
        /// The in-flight record, kept for postmortem logging
        record: Box<ReviewRecord>,
        #[source]
        source: Box<RevgraphError>,
    },

    #[error("Query error: {0}")]
    Query(String),

    #[error("Language pipeline error: {0}")]
    Pipeline(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, RevgraphError>;

/// Failure classes used for reporting and exit codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad configuration or invalid enumerated values
    Config,
    /// Missing input files or invalid parameters
    Input,
    /// Reading or writing durable files
    Io,
    /// Graph backend unreachable or rejecting requests
    Backend,
    /// A load transaction (clear or per-record) failed
    Transaction,
    /// A read-only query failed
    Query,
    /// Raised by the injected language pipeline
    Pipeline,
}

impl RevgraphError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(_) => ErrorKind::Config,
            Self::InputDirMissing(_)
            | Self::InputDirEmpty(_)
            | Self::InvalidLimit { .. }
            | Self::InputNotFound(_)
            | Self::InvalidInput(_)
            | Self::BatchMissing(_) => ErrorKind::Input,
            Self::Io { .. }
            | Self::BatchWrite { .. }
            | Self::BatchRead { .. }
            | Self::BatchFormat { .. } => ErrorKind::Io,
            Self::Backend(_) | Self::CommitTimeout(_) => ErrorKind::Backend,
            Self::Clear { .. } | Self::Transaction { .. } => ErrorKind::Transaction,
            Self::Query(_) => ErrorKind::Query,
            Self::Pipeline(_) | Self::Other(_) => ErrorKind::Pipeline,
        }
    }

    /// Wrap an I/O error with the path it occurred on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

// ============================================================================
// Review Records
// ============================================================================

/// One review and the features derived from its text.
///
/// This is the unit of the batch interchange format. Field names serialize in
/// camelCase and every field round-trips losslessly through JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRecord {
    /// Identity, derived from the source file stem
    pub name: String,

    /// Number of tokens, punctuation included
    pub word_count: u64,

    /// Number of sentences
    pub sentence_count: u64,

    /// Present only when sentiment analysis is enabled
    pub sentiment: Option<Sentiment>,

    /// The original text
    pub raw_text: String,

    /// Lemmatized, lower-cased text with stop words and punctuation removed
    pub processed_text: String,

    /// Named-entity mentions in order of appearance, duplicates kept
    pub entities: Vec<EntityMention>,

    /// Flavor keywords in order of appearance, duplicates kept
    pub flavors: Vec<String>,

    /// Reserved, always empty
    pub varietals: Vec<String>,
}

impl ReviewRecord {
    /// Start a record with only its identity and raw text filled in
    pub fn new(name: impl Into<String>, raw_text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            word_count: 0,
            sentence_count: 0,
            sentiment: None,
            raw_text: raw_text.into(),
            processed_text: String::new(),
            entities: Vec::new(),
            flavors: Vec::new(),
            varietals: Vec::new(),
        }
    }

    /// Polarity score if sentiment was computed
    pub fn polarity(&self) -> Option<f64> {
        self.sentiment.as_ref().map(|s| s.polarity)
    }
}

/// Sentiment of a whole review
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sentiment {
    /// -1.0 (negative) to 1.0 (positive)
    pub polarity: f64,

    /// 0.0 (objective) to 1.0 (subjective)
    pub subjectivity: f64,

    /// Scored phrases that contributed, in text order
    pub assessments: Vec<Assessment>,
}

impl Sentiment {
    /// A neutral score with no evidence
    pub fn neutral() -> Self {
        Self {
            polarity: 0.0,
            subjectivity: 0.0,
            assessments: Vec::new(),
        }
    }
}

/// One piece of sentiment evidence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    pub token: String,
    pub score: f64,
}

/// A named-entity mention
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityMention {
    /// Surface text as it appears in the review
    pub text: String,

    /// Numeric label identifier (e.g. 391)
    pub label_code: u64,

    /// Label name (e.g. "DATE")
    pub label_name: String,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> ReviewRecord {
        ReviewRecord {
            name: "f0001".to_string(),
            word_count: 10,
            sentence_count: 1,
            sentiment: Some(Sentiment {
                polarity: 0.5,
                subjectivity: 0.75,
                assessments: vec![Assessment {
                    token: "lovely".to_string(),
                    score: 0.5,
                }],
            }),
            raw_text: "A lovely cherry and oak note, quite fruity.".to_string(),
            processed_text: "lovely cherry oak note fruity".to_string(),
            entities: vec![],
            flavors: vec!["cherry".to_string(), "oak".to_string(), "fruity".to_string()],
            varietals: vec![],
        }
    }

    #[test]
    fn test_record_serializes_camel_case() {
        let value = serde_json::to_value(sample_record()).unwrap();

        assert_eq!(value["wordCount"], 10);
        assert_eq!(value["sentenceCount"], 1);
        assert_eq!(value["processedText"], "lovely cherry oak note fruity");
        assert_eq!(value["sentiment"]["assessments"][0]["token"], "lovely");
        assert!(value["varietals"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_missing_sentiment_is_null() {
        let mut record = sample_record();
        record.sentiment = None;

        let value = serde_json::to_value(&record).unwrap();
        assert!(value["sentiment"].is_null());
        assert_eq!(record.polarity(), None);
    }

    #[test]
    fn test_entity_mention_keys() {
        let mention = EntityMention {
            text: "2020".to_string(),
            label_code: 391,
            label_name: "DATE".to_string(),
        };
        let value = serde_json::to_value(&mention).unwrap();
        assert_eq!(value["labelCode"], 391);
        assert_eq!(value["labelName"], "DATE");
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            RevgraphError::InputDirEmpty(PathBuf::from("inData")).kind(),
            ErrorKind::Input
        );
        assert_eq!(
            RevgraphError::CommitTimeout(Duration::from_secs(1)).kind(),
            ErrorKind::Backend
        );

        let err = RevgraphError::Transaction {
            index: 2,
            record: Box::new(sample_record()),
            source: Box::new(RevgraphError::Backend("boom".to_string())),
        };
        assert_eq!(err.kind(), ErrorKind::Transaction);
        assert!(err.to_string().contains("entry 3"));
        assert!(err.to_string().contains("f0001"));
    }
}
