//! Interactive command dispatch
//!
//! Each user action (upload a file, run one of the three queries) is a
//! `Command`. Dispatching never fails: every outcome, including bad input and
//! an unreachable graph, comes back as a `CommandReport`.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use revgraph_core::{Result, RevgraphError};
use revgraph_graph::{connect, GraphBackend, LabelCount, QueryEngine};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::OnceCell;
use tracing::{info, warn};

use crate::pipeline::ReviewPipeline;

/// A user action
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Extract one review file and add it to the graph
    Upload { path: PathBuf },
    /// Count nodes of a label, e.g. "flavor"
    CountByLabel { input: String },
    /// Count reviews above a word count and polarity, e.g. "20,0.15"
    ThresholdFilter { input: String },
    /// Reviews having any of the listed flavors, e.g. "pepper,strawberry"
    FlavorMembership { input: String },
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Upload { .. } => "upload",
            Self::CountByLabel { .. } => "count-by-label",
            Self::ThresholdFilter { .. } => "threshold-filter",
            Self::FlavorMembership { .. } => "flavor-membership",
        }
    }
}

/// Whether a command succeeded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Ok,
    Failed,
}

/// Outcome of one command
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandReport {
    pub status: Status,
    pub message: String,
    pub result: Option<Value>,
}

impl CommandReport {
    fn ok(message: impl Into<String>, result: impl Serialize) -> Self {
        Self {
            status: Status::Ok,
            message: message.into(),
            result: serde_json::to_value(result).ok(),
        }
    }

    fn failed(message: impl Into<String>) -> Self {
        Self {
            status: Status::Failed,
            message: message.into(),
            result: None,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == Status::Ok
    }
}

impl fmt::Display for CommandReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = match self.status {
            Status::Ok => "OK",
            Status::Failed => "FAILED",
        };
        write!(f, "[{status}] {}", self.message)?;
        if let Some(result) = &self.result {
            let rendered = serde_json::to_string_pretty(result).map_err(|_| fmt::Error)?;
            write!(f, "\n{rendered}")?;
        }
        Ok(())
    }
}

/// Parse "minWords,minPolarity", e.g. "20,0.15"
pub fn parse_threshold(input: &str) -> Result<(i64, f64)> {
    let invalid = || {
        RevgraphError::InvalidInput(format!(
            "'{input}': expected an integer, a comma and a number, e.g. 20,0.15"
        ))
    };

    let (words, polarity) = input.trim().split_once(',').ok_or_else(invalid)?;
    let words = words.trim().parse::<i64>().map_err(|_| invalid())?;
    let polarity = polarity.trim().parse::<f64>().map_err(|_| invalid())?;
    if !polarity.is_finite() {
        return Err(invalid());
    }

    Ok((words, polarity))
}

/// Parse a comma-separated flavor list, e.g. "pepper, strawberry"
pub fn parse_flavors(input: &str) -> Result<Vec<String>> {
    let flavors: Vec<String> = input
        .split(',')
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(str::to_string)
        .collect();

    if flavors.is_empty() {
        return Err(RevgraphError::InvalidInput(format!(
            "'{input}': expected flavor names separated by commas, e.g. cherry,coffee"
        )));
    }
    Ok(flavors)
}

/// Runs commands against the pipeline and graph.
///
/// The graph is connected on the first command that needs it and reused
/// afterwards. A failed connection is not kept, so the next command tries
/// again.
pub struct Dispatcher {
    pipeline: ReviewPipeline,
    backend: OnceCell<Arc<dyn GraphBackend>>,
}

impl Dispatcher {
    /// Dispatcher that connects to the configured graph when first needed
    pub fn new(pipeline: ReviewPipeline) -> Self {
        Self {
            pipeline,
            backend: OnceCell::new(),
        }
    }

    /// Use an already connected backend instead
    pub fn with_backend(mut self, backend: Arc<dyn GraphBackend>) -> Self {
        self.backend = OnceCell::from(backend);
        self
    }

    async fn backend(&self, command: &str) -> Result<Arc<dyn GraphBackend>> {
        let config = &self.pipeline.config().graph;
        self.backend
            .get_or_try_init(|| async {
                tokio::time::timeout(config.commit_timeout(), connect(config))
                    .await
                    .unwrap_or_else(|_| Err(RevgraphError::CommitTimeout(config.commit_timeout())))
            })
            .await
            .cloned()
            .map_err(|e| {
                RevgraphError::Backend(format!("Could not connect to the graph for {command}: {e}"))
            })
    }

    fn queries(&self, backend: Arc<dyn GraphBackend>) -> QueryEngine {
        QueryEngine::new(backend, self.pipeline.config().graph.commit_timeout())
    }

    /// Run a command and report its outcome
    pub async fn dispatch(&self, command: Command) -> CommandReport {
        let name = command.name();
        info!(command = name, "Dispatching command");

        let report = match self.run(command).await {
            Ok(report) => report,
            Err(e) => CommandReport::failed(e.to_string()),
        };

        if report.is_ok() {
            info!(command = name, "{}", report.message);
        } else {
            warn!(command = name, "{}", report.message);
        }
        report
    }

    async fn run(&self, command: Command) -> Result<CommandReport> {
        // Input is validated before connecting
        let name = command.name();

        match command {
            Command::Upload { path } => {
                if !path.is_file() {
                    return Err(RevgraphError::InputNotFound(path));
                }
                let backend = self.backend(name).await?;
                let record = self.pipeline.upload(backend, &path).await?;
                Ok(CommandReport::ok(
                    format!(
                        "Processed {} and added review '{}' to the graph",
                        path.display(),
                        record.name
                    ),
                    &record,
                ))
            }
            Command::CountByLabel { input } => {
                let input = input.trim();
                if input.is_empty() {
                    return Err(RevgraphError::InvalidInput(
                        "expected a label: Review, Entity or Flavor".to_string(),
                    ));
                }

                let backend = self.backend(name).await?;
                let outcome = self.queries(backend).count_by_label(input).await?;
                Ok(match &outcome {
                    LabelCount::Count { label, count } => CommandReport::ok(
                        format!("Found {count} nodes of label {label}"),
                        &outcome,
                    ),
                    LabelCount::NoMatch { .. } => CommandReport {
                        status: Status::Failed,
                        message: outcome.to_string(),
                        result: serde_json::to_value(&outcome).ok(),
                    },
                })
            }
            Command::ThresholdFilter { input } => {
                let (min_words, min_polarity) = parse_threshold(&input)?;
                let backend = self.backend(name).await?;
                let outcome = self
                    .queries(backend)
                    .threshold_filter(min_words, min_polarity)
                    .await?;
                Ok(CommandReport::ok(
                    format!(
                        "Found {} reviews with more than {min_words} words and sentiment above {min_polarity}",
                        outcome.count
                    ),
                    &outcome,
                ))
            }
            Command::FlavorMembership { input } => {
                let flavors = parse_flavors(&input)?;
                let backend = self.backend(name).await?;
                let outcome = self.queries(backend).flavor_membership(&flavors).await?;
                Ok(CommandReport::ok(
                    format!(
                        "Found {} reviews with one or more of {}: {}",
                        outcome.count,
                        flavors.join(", "),
                        outcome.reviews.join(", ")
                    ),
                    &outcome,
                ))
            }
        }
    }
}
