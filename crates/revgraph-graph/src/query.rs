//! Canned read-only queries over the review graph

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use revgraph_core::{Result, RevgraphError};
use serde::Serialize;
use tracing::{debug, warn};

use crate::{GraphBackend, NodeLabel};

/// Result of a count-by-label query
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum LabelCount {
    /// The input named a label; `count` distinct nodes carry it
    Count { label: NodeLabel, count: u64 },
    /// The input named no known label
    NoMatch { requested: String },
}

impl fmt::Display for LabelCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Count { label, count } => write!(f, "{count} {label} nodes"),
            Self::NoMatch { requested } => write!(
                f,
                "No match for '{requested}': expected Review, Entity or Flavor"
            ),
        }
    }
}

/// Result of a threshold filter
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThresholdCount {
    pub min_words: i64,
    pub min_polarity: f64,
    pub count: u64,
}

/// Result of a flavor membership query
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlavorMembership {
    pub flavors: Vec<String>,
    pub count: usize,
    pub reviews: Vec<String>,
}

/// Runs the three analytic queries against a backend.
///
/// Any backend failure comes back as `RevgraphError::Query` so callers can
/// report it and carry on.
pub struct QueryEngine {
    backend: Arc<dyn GraphBackend>,
    timeout: Duration,
}

impl QueryEngine {
    pub fn new(backend: Arc<dyn GraphBackend>, timeout: Duration) -> Self {
        Self { backend, timeout }
    }

    async fn run<T>(&self, what: &str, query: impl Future<Output = Result<T>>) -> Result<T> {
        let outcome = match tokio::time::timeout(self.timeout, query).await {
            Ok(Ok(value)) => return Ok(value),
            Ok(Err(e)) => format!("{what} failed: {e}"),
            Err(_) => format!("{what} timed out after {:?}", self.timeout),
        };

        warn!(backend = self.backend.name(), "{}", outcome);
        Err(RevgraphError::Query(outcome))
    }

    /// Count the nodes of a label named case-insensitively
    pub async fn count_by_label(&self, input: &str) -> Result<LabelCount> {
        let Some(label) = NodeLabel::parse(input) else {
            debug!(input, "Label not in schema");
            return Ok(LabelCount::NoMatch {
                requested: input.to_string(),
            });
        };

        let count = self
            .run("Count query", self.backend.count_label(label))
            .await?;
        Ok(LabelCount::Count { label, count })
    }

    /// Count reviews whose word count and polarity both exceed the minimums
    pub async fn threshold_filter(&self, min_words: i64, min_polarity: f64) -> Result<ThresholdCount> {
        let count = self
            .run(
                "Threshold query",
                self.backend.count_reviews_above(min_words, min_polarity),
            )
            .await?;

        Ok(ThresholdCount {
            min_words,
            min_polarity,
            count,
        })
    }

    /// Reviews having any of the given flavors
    pub async fn flavor_membership(&self, flavors: &[String]) -> Result<FlavorMembership> {
        let reviews = self
            .run("Flavor query", self.backend.reviews_with_flavors(flavors))
            .await?;

        Ok(FlavorMembership {
            flavors: flavors.to_vec(),
            count: reviews.len(),
            reviews,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{memory::MemoryGraph, EdgeType, ReviewNode, Transaction};
    use async_trait::async_trait;
    use revgraph_core::EdgePolicy;

    async fn seeded() -> QueryEngine {
        let graph = MemoryGraph::new();
        let review = |name: &str, words, polarity| ReviewNode {
            name: name.to_string(),
            word_count: words,
            sentence_count: 1,
            polarity: Some(polarity),
            raw_text: String::new(),
            processed_text: String::new(),
        };

        graph
            .commit(
                Transaction::new()
                    .merge_review(review("f0001", 30, 0.4))
                    .merge_review(review("f0002", 10, 0.9))
                    .merge_flavor("pepper")
                    .merge_flavor("strawberry")
                    .relate(EdgeType::HasFlavor, "f0001", "pepper", EdgePolicy::Merge)
                    .relate(EdgeType::HasFlavor, "f0001", "strawberry", EdgePolicy::Merge)
                    .relate(EdgeType::HasFlavor, "f0002", "strawberry", EdgePolicy::Merge),
            )
            .await
            .unwrap();

        QueryEngine::new(Arc::new(graph), Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_count_by_label() {
        let engine = seeded().await;

        assert_eq!(
            engine.count_by_label("flavor").await.unwrap(),
            LabelCount::Count {
                label: NodeLabel::Flavor,
                count: 2
            }
        );
        assert_eq!(
            engine.count_by_label("Vintage").await.unwrap(),
            LabelCount::NoMatch {
                requested: "Vintage".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_threshold_filter() {
        let engine = seeded().await;
        assert_eq!(engine.threshold_filter(20, 0.15).await.unwrap().count, 1);
        assert_eq!(engine.threshold_filter(5, 0.15).await.unwrap().count, 2);
        assert_eq!(engine.threshold_filter(30, 0.0).await.unwrap().count, 0);
    }

    #[tokio::test]
    async fn test_flavor_membership() {
        let engine = seeded().await;
        let result = engine
            .flavor_membership(&["pepper".to_string(), "strawberry".to_string()])
            .await
            .unwrap();

        assert_eq!(result.count, 2);
        assert_eq!(result.reviews, vec!["f0001", "f0002"]);
    }

    struct Unreachable;

    #[async_trait]
    impl GraphBackend for Unreachable {
        async fn commit(&self, _tx: Transaction) -> Result<()> {
            Err(RevgraphError::Backend("connection refused".to_string()))
        }
        async fn count_label(&self, _label: NodeLabel) -> Result<u64> {
            Err(RevgraphError::Backend("connection refused".to_string()))
        }
        async fn count_reviews_above(&self, _min_words: i64, _min_polarity: f64) -> Result<u64> {
            Err(RevgraphError::Backend("connection refused".to_string()))
        }
        async fn reviews_with_flavors(&self, _flavors: &[String]) -> Result<Vec<String>> {
            Err(RevgraphError::Backend("connection refused".to_string()))
        }
        async fn node_count(&self) -> Result<u64> {
            Err(RevgraphError::Backend("connection refused".to_string()))
        }
        async fn relationship_count(&self) -> Result<u64> {
            Err(RevgraphError::Backend("connection refused".to_string()))
        }
        fn name(&self) -> &str {
            "unreachable"
        }
    }

    #[tokio::test]
    async fn test_backend_failures_become_query_errors() {
        let engine = QueryEngine::new(Arc::new(Unreachable), Duration::from_secs(1));

        let err = engine.count_by_label("review").await.unwrap_err();
        assert!(matches!(err, RevgraphError::Query(ref msg) if msg.contains("connection refused")));

        assert!(matches!(
            engine.threshold_filter(1, 0.0).await,
            Err(RevgraphError::Query(_))
        ));

        // Invalid labels never reach the backend
        assert!(matches!(
            engine.count_by_label("Vintage").await,
            Ok(LabelCount::NoMatch { .. })
        ));
    }
}
