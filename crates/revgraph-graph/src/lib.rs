//! Revgraph Graph - Review graph storage
//!
//! Reviews, the entities they mention and the flavors they carry are stored
//! as a property graph:
//!
//! ```text
//! (Review {name}) -[RELATES_TO_ENTITY]-> (Entity {text})
//! (Review {name}) -[HAS_FLAVOR]->        (Flavor {name})
//! ```
//!
//! Writes go through `Transaction`s that a `GraphBackend` commits atomically.
//! The loader turns batch records into transactions and the query engine runs
//! the read-only analytics.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use revgraph_core::{
    EdgePolicy, EntityMention, GraphBackendKind, GraphConfig, Result, ReviewRecord,
};
use serde::{Deserialize, Serialize};

pub mod loader;
pub mod memory;
pub mod query;
pub mod surrealdb_store;

pub use loader::{GraphLoader, LoadSummary};
pub use memory::MemoryGraph;
pub use query::{FlavorMembership, LabelCount, QueryEngine, ThresholdCount};
pub use surrealdb_store::SurrealGraph;

// ============================================================================
// Schema
// ============================================================================

/// Node labels of the review graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum NodeLabel {
    Review,
    Entity,
    Flavor,
}

impl NodeLabel {
    pub const ALL: [NodeLabel; 3] = [Self::Review, Self::Entity, Self::Flavor];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Review => "Review",
            Self::Entity => "Entity",
            Self::Flavor => "Flavor",
        }
    }

    /// Case-insensitive lookup; `None` for anything outside the schema
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        Self::ALL
            .into_iter()
            .find(|label| label.as_str().eq_ignore_ascii_case(input))
    }
}

impl fmt::Display for NodeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Relationship types of the review graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeType {
    RelatesToEntity,
    HasFlavor,
}

impl EdgeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RelatesToEntity => "RELATES_TO_ENTITY",
            Self::HasFlavor => "HAS_FLAVOR",
        }
    }

    /// Label of the node the relationship points to
    pub fn target(&self) -> NodeLabel {
        match self {
            Self::RelatesToEntity => NodeLabel::Entity,
            Self::HasFlavor => NodeLabel::Flavor,
        }
    }
}

impl fmt::Display for EdgeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Attributes stored on a Review node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewNode {
    pub name: String,
    pub word_count: u64,
    pub sentence_count: u64,
    pub polarity: Option<f64>,
    pub raw_text: String,
    pub processed_text: String,
}

impl From<&ReviewRecord> for ReviewNode {
    fn from(record: &ReviewRecord) -> Self {
        Self {
            name: record.name.clone(),
            word_count: record.word_count,
            sentence_count: record.sentence_count,
            polarity: record.polarity(),
            raw_text: record.raw_text.clone(),
            processed_text: record.processed_text.clone(),
        }
    }
}

/// Attributes stored on an Entity node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityNode {
    pub text: String,
    pub label_code: u64,
    pub label_name: String,
}

impl From<&EntityMention> for EntityNode {
    fn from(mention: &EntityMention) -> Self {
        Self {
            text: mention.text.clone(),
            label_code: mention.label_code,
            label_name: mention.label_name.clone(),
        }
    }
}

// ============================================================================
// Transactions
// ============================================================================

/// One write inside a transaction
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// Delete every node and relationship
    ClearAll,
    /// Upsert a Review by name, overwriting its attributes
    MergeReview(ReviewNode),
    /// Upsert an Entity by text, overwriting its attributes
    MergeEntity(EntityNode),
    /// Upsert a Flavor by name
    MergeFlavor(String),
    /// Connect a Review to a node; a missing endpoint makes this a no-op
    Relate {
        edge: EdgeType,
        review: String,
        target: String,
        policy: EdgePolicy,
    },
}

/// An ordered list of statements committed all-or-nothing
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transaction {
    statements: Vec<Statement>,
}

impl Transaction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear_all(mut self) -> Self {
        self.statements.push(Statement::ClearAll);
        self
    }

    pub fn merge_review(mut self, review: ReviewNode) -> Self {
        self.statements.push(Statement::MergeReview(review));
        self
    }

    pub fn merge_entity(mut self, entity: EntityNode) -> Self {
        self.statements.push(Statement::MergeEntity(entity));
        self
    }

    pub fn merge_flavor(mut self, flavor: impl Into<String>) -> Self {
        self.statements.push(Statement::MergeFlavor(flavor.into()));
        self
    }

    pub fn relate(
        mut self,
        edge: EdgeType,
        review: impl Into<String>,
        target: impl Into<String>,
        policy: EdgePolicy,
    ) -> Self {
        self.statements.push(Statement::Relate {
            edge,
            review: review.into(),
            target: target.into(),
            policy,
        });
        self
    }

    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

// ============================================================================
// Backend trait
// ============================================================================

/// Trait for review graph storage
#[async_trait]
pub trait GraphBackend: Send + Sync {
    /// Apply every statement or none of them; returns once the commit is
    /// acknowledged
    async fn commit(&self, tx: Transaction) -> Result<()>;

    /// Distinct nodes carrying `label`
    async fn count_label(&self, label: NodeLabel) -> Result<u64>;

    /// Reviews with word count > `min_words` and polarity > `min_polarity`
    async fn count_reviews_above(&self, min_words: i64, min_polarity: f64) -> Result<u64>;

    /// Distinct names of reviews with a HAS_FLAVOR edge to any of `flavors`
    async fn reviews_with_flavors(&self, flavors: &[String]) -> Result<Vec<String>>;

    /// All nodes regardless of label
    async fn node_count(&self) -> Result<u64>;

    /// All relationships regardless of type
    async fn relationship_count(&self) -> Result<u64>;

    /// Backend name for logging
    fn name(&self) -> &str;
}

/// Build the configured backend
pub async fn connect(config: &GraphConfig) -> Result<Arc<dyn GraphBackend>> {
    match config.backend {
        GraphBackendKind::Memory => Ok(Arc::new(MemoryGraph::new())),
        GraphBackendKind::SurrealDb => Ok(Arc::new(SurrealGraph::connect(config).await?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use revgraph_core::Sentiment;

    #[test]
    fn test_label_parse_is_case_insensitive() {
        assert_eq!(NodeLabel::parse("flavor"), Some(NodeLabel::Flavor));
        assert_eq!(NodeLabel::parse("REVIEW"), Some(NodeLabel::Review));
        assert_eq!(NodeLabel::parse(" Entity "), Some(NodeLabel::Entity));
        assert_eq!(NodeLabel::parse("Vintage"), None);
        assert_eq!(NodeLabel::parse(""), None);
    }

    #[test]
    fn test_review_node_from_record() {
        let mut record = ReviewRecord::new("f0001", "Oak.");
        record.word_count = 2;
        assert_eq!(ReviewNode::from(&record).polarity, None);

        record.sentiment = Some(Sentiment::neutral());
        let node = ReviewNode::from(&record);
        assert_eq!(node.name, "f0001");
        assert_eq!(node.word_count, 2);
        assert_eq!(node.polarity, Some(0.0));
    }

    #[test]
    fn test_transaction_keeps_statement_order() {
        let tx = Transaction::new()
            .merge_flavor("oak")
            .relate(EdgeType::HasFlavor, "f0001", "oak", EdgePolicy::Merge);

        assert_eq!(tx.len(), 2);
        assert_eq!(tx.statements()[0], Statement::MergeFlavor("oak".to_string()));
        assert!(matches!(
            tx.statements()[1],
            Statement::Relate { edge: EdgeType::HasFlavor, .. }
        ));
    }

    #[tokio::test]
    async fn test_connect_memory_backend() {
        let config = GraphConfig {
            backend: GraphBackendKind::Memory,
            ..GraphConfig::default()
        };
        let backend = connect(&config).await.unwrap();
        assert_eq!(backend.name(), "memory");
        assert_eq!(backend.node_count().await.unwrap(), 0);
    }
}
