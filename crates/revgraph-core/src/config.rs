//! Revgraph Configuration Management
//!
//! Handles configuration from environment variables and TOML files,
//! with defaults that match the conventional working-directory layout.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Graph backend connection
    pub graph: GraphConfig,

    /// Feature extraction toggles
    pub extraction: ExtractionConfig,

    /// Working directories and file names
    pub paths: PathsConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        // Graph backend
        if let Ok(backend) = std::env::var("REVGRAPH_GRAPH_BACKEND") {
            config.graph.backend = backend.parse()?;
        }
        if let Ok(url) = std::env::var("SURREALDB_URL") {
            config.graph.surrealdb_url = url;
        }
        if let Ok(user) = std::env::var("SURREALDB_USER") {
            config.graph.surrealdb_user = user;
        }
        if let Ok(pass) = std::env::var("SURREALDB_PASS") {
            config.graph.surrealdb_pass = pass;
        }
        if let Ok(ns) = std::env::var("SURREALDB_NAMESPACE") {
            config.graph.surrealdb_namespace = ns;
        }
        if let Ok(db) = std::env::var("SURREALDB_DATABASE") {
            config.graph.surrealdb_database = db;
        }
        if let Ok(secs) = std::env::var("REVGRAPH_COMMIT_TIMEOUT_SECS") {
            config.graph.commit_timeout_secs =
                secs.parse().map_err(|_| ConfigError::InvalidValue {
                    key: "REVGRAPH_COMMIT_TIMEOUT_SECS".to_string(),
                    value: secs,
                })?;
        }
        if let Ok(policy) = std::env::var("REVGRAPH_EDGE_POLICY") {
            config.graph.edge_policy = policy.parse()?;
        }

        // Extraction
        if let Ok(flag) = std::env::var("REVGRAPH_NER") {
            config.extraction.ner = parse_flag("REVGRAPH_NER", &flag)?;
        }
        if let Ok(flag) = std::env::var("REVGRAPH_SENTIMENT") {
            config.extraction.sentiment = parse_flag("REVGRAPH_SENTIMENT", &flag)?;
        }

        // Paths
        if let Ok(dir) = std::env::var("REVGRAPH_INPUT_DIR") {
            config.paths.input_dir = dir.into();
        }
        if let Ok(dir) = std::env::var("REVGRAPH_OUTPUT_DIR") {
            config.paths.output_dir = dir.into();
        }

        // Logging
        if let Ok(level) = std::env::var("LOG_LEVEL") {
            config.logging.level = level;
        }
        if let Ok(file) = std::env::var("LOG_FILE") {
            config.logging.file = Some(file.into());
        }
        if let Ok(flag) = std::env::var("LOG_JSON") {
            config.logging.json_format = parse_flag("LOG_JSON", &flag)?;
        }

        Ok(config)
    }

    /// Load from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::FileReadError {
            path: path.clone(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path,
            message: e.to_string(),
        })
    }

    /// Merge with environment variables (env takes precedence)
    pub fn with_env_override(mut self) -> Result<Self, ConfigError> {
        let env_config = Self::from_env()?;
        let set = |key: &str| std::env::var(key).is_ok();

        // Only override what the environment actually sets
        if set("REVGRAPH_GRAPH_BACKEND") {
            self.graph.backend = env_config.graph.backend;
        }
        if set("SURREALDB_URL") {
            self.graph.surrealdb_url = env_config.graph.surrealdb_url;
        }
        if set("REVGRAPH_COMMIT_TIMEOUT_SECS") {
            self.graph.commit_timeout_secs = env_config.graph.commit_timeout_secs;
        }
        if set("REVGRAPH_EDGE_POLICY") {
            self.graph.edge_policy = env_config.graph.edge_policy;
        }
        if set("REVGRAPH_NER") {
            self.extraction.ner = env_config.extraction.ner;
        }
        if set("REVGRAPH_SENTIMENT") {
            self.extraction.sentiment = env_config.extraction.sentiment;
        }
        if set("REVGRAPH_INPUT_DIR") {
            self.paths.input_dir = env_config.paths.input_dir;
        }
        if set("REVGRAPH_OUTPUT_DIR") {
            self.paths.output_dir = env_config.paths.output_dir;
        }
        if set("LOG_LEVEL") {
            self.logging.level = env_config.logging.level;
        }
        if set("LOG_FILE") {
            self.logging.file = env_config.logging.file;
        }
        if set("LOG_JSON") {
            self.logging.json_format = env_config.logging.json_format;
        }

        // Always use env for credentials
        if set("SURREALDB_USER") {
            self.graph.surrealdb_user = env_config.graph.surrealdb_user;
        }
        if set("SURREALDB_PASS") {
            self.graph.surrealdb_pass = env_config.graph.surrealdb_pass;
        }
        if set("SURREALDB_NAMESPACE") {
            self.graph.surrealdb_namespace = env_config.graph.surrealdb_namespace;
        }
        if set("SURREALDB_DATABASE") {
            self.graph.surrealdb_database = env_config.graph.surrealdb_database;
        }

        Ok(self)
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_lowercase().as_str() {
        "1" | "true" | "y" | "yes" => Ok(true),
        "0" | "false" | "n" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

/// Graph backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Which backend to connect to
    pub backend: GraphBackendKind,

    /// SurrealDB WebSocket URL
    pub surrealdb_url: String,

    /// SurrealDB username
    pub surrealdb_user: String,

    /// SurrealDB password
    pub surrealdb_pass: String,

    /// SurrealDB namespace
    pub surrealdb_namespace: String,

    /// SurrealDB database name
    pub surrealdb_database: String,

    /// How long to wait for a commit acknowledgment
    pub commit_timeout_secs: u64,

    /// Whether relationships are merged or always created
    pub edge_policy: EdgePolicy,
}

impl GraphConfig {
    /// Commit timeout as a duration
    pub fn commit_timeout(&self) -> Duration {
        Duration::from_secs(self.commit_timeout_secs)
    }
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            backend: GraphBackendKind::SurrealDb,
            surrealdb_url: "ws://localhost:8000".to_string(),
            surrealdb_user: "root".to_string(),
            surrealdb_pass: "root".to_string(),
            surrealdb_namespace: "revgraph".to_string(),
            surrealdb_database: "reviews".to_string(),
            commit_timeout_secs: 30,
            edge_policy: EdgePolicy::Merge,
        }
    }
}

/// Supported graph backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GraphBackendKind {
    /// In-process graph, lost on exit
    Memory,
    /// SurrealDB over WebSocket
    #[serde(rename = "surrealdb")]
    SurrealDb,
}

impl std::str::FromStr for GraphBackendKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" | "mem" => Ok(Self::Memory),
            "surrealdb" | "surreal" => Ok(Self::SurrealDb),
            _ => Err(ConfigError::InvalidValue {
                key: "REVGRAPH_GRAPH_BACKEND".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// How the loader writes Review -> Entity/Flavor relationships.
///
/// `Create` issues an unconditional create on every load, so reloading a
/// record duplicates its relationships. `Merge` creates a relationship only
/// when the same (review, target) pair is not already connected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgePolicy {
    #[default]
    Merge,
    Create,
}

impl std::str::FromStr for EdgePolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "merge" => Ok(Self::Merge),
            "create" => Ok(Self::Create),
            _ => Err(ConfigError::InvalidValue {
                key: "REVGRAPH_EDGE_POLICY".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// Feature extraction toggles
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Run named-entity recognition
    pub ner: bool,

    /// Run sentiment analysis
    pub sentiment: bool,

    /// Topic modeling placeholder; enabling it produces nothing
    pub topics: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            ner: true,
            sentiment: true,
            topics: false,
        }
    }
}

/// Working directories and file names
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Folder holding one review per text file
    pub input_dir: PathBuf,

    /// Folder for batch files
    pub output_dir: PathBuf,

    /// Batch file written by bulk ingestion
    pub batch_file: String,

    /// Batch file written by single-file uploads
    pub upload_batch_file: String,

    /// Review file name prefix
    pub input_prefix: String,

    /// Review file extension, without the dot
    pub input_extension: String,
}

impl PathsConfig {
    /// Full path of the bulk batch file
    pub fn batch_path(&self) -> PathBuf {
        self.output_dir.join(&self.batch_file)
    }

    /// Full path of the upload batch file
    pub fn upload_batch_path(&self) -> PathBuf {
        self.output_dir.join(&self.upload_batch_file)
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("inData"),
            output_dir: PathBuf::from("outData"),
            batch_file: "temp_neo_data.json".to_string(),
            upload_batch_file: "user_input_temp_neo_data.json".to_string(),
            input_prefix: "f".to_string(),
            input_extension: "txt".to_string(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// JSON format for logs
    pub json_format: bool,

    /// Include file/line in logs
    pub include_location: bool,

    /// Write logs to this file instead of stderr
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            include_location: false,
            file: None,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", path.display())]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {}: {message}", path.display())]
    ParseError { path: PathBuf, message: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}
