//! Graph Loader module
//!
//! Loads a batch of review records into a `GraphBackend`, one transaction
//! per record, in batch order. The first failing record aborts the load;
//! records committed before it stay in the graph.

use std::sync::Arc;
use std::time::Duration;

use revgraph_core::{
    BatchFile, EdgePolicy, GraphConfig, Result, RevgraphError, ReviewRecord,
};
use tracing::{debug, error, info};

use crate::{EdgeType, EntityNode, GraphBackend, ReviewNode, Transaction};

// ============================================================================
// Conversion
// ============================================================================

/// The write transaction for one record: the Review node, then each entity
/// node and its relationship, then each flavor node and its relationship
pub fn record_transaction(record: &ReviewRecord, policy: EdgePolicy) -> Transaction {
    let mut tx = Transaction::new().merge_review(ReviewNode::from(record));

    for mention in &record.entities {
        tx = tx.merge_entity(EntityNode::from(mention)).relate(
            EdgeType::RelatesToEntity,
            &record.name,
            &mention.text,
            policy,
        );
    }

    for flavor in &record.flavors {
        tx = tx
            .merge_flavor(flavor)
            .relate(EdgeType::HasFlavor, &record.name, flavor, policy);
    }

    tx
}

// ============================================================================
// Graph Loader
// ============================================================================

/// Counts of merge and relate operations issued by a load
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    /// Review merges
    pub reviews: usize,
    /// Entity merges
    pub entities: usize,
    /// Flavor merges
    pub flavors: usize,
    /// Relationship writes
    pub relationships: usize,
}

impl LoadSummary {
    fn add(&mut self, record: &ReviewRecord) {
        self.reviews += 1;
        self.entities += record.entities.len();
        self.flavors += record.flavors.len();
        self.relationships += record.entities.len() + record.flavors.len();
    }

    /// Check if nothing was loaded
    pub fn is_empty(&self) -> bool {
        self.reviews == 0
    }

    /// Total node merges
    pub fn nodes(&self) -> usize {
        self.reviews + self.entities + self.flavors
    }
}

/// Loads review records into a graph backend
pub struct GraphLoader {
    backend: Arc<dyn GraphBackend>,
    edge_policy: EdgePolicy,
    commit_timeout: Duration,
}

impl GraphLoader {
    pub fn new(
        backend: Arc<dyn GraphBackend>,
        edge_policy: EdgePolicy,
        commit_timeout: Duration,
    ) -> Self {
        Self {
            backend,
            edge_policy,
            commit_timeout,
        }
    }

    /// Loader using the edge policy and timeout from `config`
    pub fn from_config(backend: Arc<dyn GraphBackend>, config: &GraphConfig) -> Self {
        Self::new(backend, config.edge_policy, config.commit_timeout())
    }

    pub fn edge_policy(&self) -> EdgePolicy {
        self.edge_policy
    }

    /// Commit and wait for acknowledgment, up to the commit timeout
    async fn commit(&self, tx: Transaction) -> Result<()> {
        tokio::time::timeout(self.commit_timeout, self.backend.commit(tx))
            .await
            .map_err(|_| RevgraphError::CommitTimeout(self.commit_timeout))?
    }

    /// Delete every node and relationship in one transaction
    pub async fn clear(&self) -> Result<()> {
        info!(backend = self.backend.name(), "Clearing graph");
        self.commit(Transaction::new().clear_all())
            .await
            .map_err(|e| {
                error!(error = %e, "Clearing the graph failed");
                RevgraphError::Clear {
                    source: Box::new(e),
                }
            })
    }

    /// Read a batch file and load it
    pub async fn load(&self, batch: &BatchFile, clear_first: bool) -> Result<LoadSummary> {
        let records = batch.read()?;
        self.load_records(&records, clear_first).await
    }

    /// Load records in order, optionally clearing the graph first
    pub async fn load_records(
        &self,
        records: &[ReviewRecord],
        clear_first: bool,
    ) -> Result<LoadSummary> {
        if clear_first {
            self.clear().await?;
        }

        let total = records.len();
        let mut summary = LoadSummary::default();

        for (index, record) in records.iter().enumerate() {
            debug!("Attempting to update entry {} of {}", index + 1, total);

            let tx = record_transaction(record, self.edge_policy);
            if let Err(e) = self.commit(tx).await {
                let contents = serde_json::to_string(record)
                    .unwrap_or_else(|json_err| format!("<unrenderable record: {json_err}>"));
                error!(
                    entry = index + 1,
                    review = %record.name,
                    error = %e,
                    "Transaction failed, aborting load"
                );
                error!(record = %contents, "In-flight record");

                return Err(RevgraphError::Transaction {
                    index,
                    record: Box::new(record.clone()),
                    source: Box::new(e),
                });
            }

            summary.add(record);
            debug!("Completed entry {} of {}", index + 1, total);
        }

        info!(
            backend = self.backend.name(),
            reviews = summary.reviews,
            entities = summary.entities,
            flavors = summary.flavors,
            relationships = summary.relationships,
            "Load complete"
        );

        Ok(summary)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MemoryGraph, NodeLabel, Statement};
    use revgraph_core::EntityMention;

    fn record(name: &str) -> ReviewRecord {
        let mut record = ReviewRecord::new(name, "A 2015 oak and cherry wine.");
        record.word_count = 7;
        record.sentence_count = 1;
        record.processed_text = "2015 oak cherry wine".to_string();
        record.entities = vec![EntityMention {
            text: "2015".to_string(),
            label_code: 391,
            label_name: "DATE".to_string(),
        }];
        record.flavors = vec!["oak".to_string(), "cherry".to_string()];
        record
    }

    fn loader(backend: Arc<dyn GraphBackend>, policy: EdgePolicy) -> GraphLoader {
        GraphLoader::new(backend, policy, Duration::from_secs(5))
    }

    #[test]
    fn test_record_transaction_order() {
        let tx = record_transaction(&record("f0001"), EdgePolicy::Merge);
        let kinds: Vec<&str> = tx
            .statements()
            .iter()
            .map(|s| match s {
                Statement::MergeReview(_) => "review",
                Statement::MergeEntity(_) => "entity",
                Statement::MergeFlavor(_) => "flavor",
                Statement::Relate { .. } => "relate",
                Statement::ClearAll => "clear",
            })
            .collect();

        assert_eq!(
            kinds,
            vec!["review", "entity", "relate", "flavor", "relate", "flavor", "relate"]
        );
    }

    #[tokio::test]
    async fn test_load_summary() {
        let graph = Arc::new(MemoryGraph::new());
        let summary = loader(graph.clone(), EdgePolicy::Merge)
            .load_records(&[record("f0001"), record("f0002")], false)
            .await
            .unwrap();

        assert_eq!(
            summary,
            LoadSummary {
                reviews: 2,
                entities: 2,
                flavors: 4,
                relationships: 6,
            }
        );
        assert_eq!(summary.nodes(), 8);
        assert_eq!(graph.count_label(NodeLabel::Entity).await.unwrap(), 1);
        assert_eq!(graph.count_label(NodeLabel::Flavor).await.unwrap(), 2);
        assert_eq!(graph.relationship_count().await.unwrap(), 6);
    }

    #[tokio::test]
    async fn test_duplicate_flavors_collapse_under_merge() {
        let graph = Arc::new(MemoryGraph::new());
        let mut rec = record("f0001");
        rec.flavors = vec!["oak".to_string(), "oak".to_string()];

        loader(graph.clone(), EdgePolicy::Merge)
            .load_records(&[rec], false)
            .await
            .unwrap();

        assert_eq!(graph.outgoing("f0001", EdgeType::HasFlavor).await, vec!["oak"]);
    }

    #[tokio::test]
    async fn test_clear_first() {
        let graph = Arc::new(MemoryGraph::new());
        let loader = loader(graph.clone(), EdgePolicy::Merge);

        loader.load_records(&[record("f0001")], false).await.unwrap();
        loader.load_records(&[record("f0002")], true).await.unwrap();

        assert_eq!(graph.count_label(NodeLabel::Review).await.unwrap(), 1);
        assert!(graph.node_properties(NodeLabel::Review, "f0001").await.is_none());
    }

    #[tokio::test]
    async fn test_load_from_missing_batch() {
        let dir = tempfile::TempDir::new().unwrap();
        let batch = BatchFile::new(dir.path().join("missing.json"));
        let err = loader(Arc::new(MemoryGraph::new()), EdgePolicy::Merge)
            .load(&batch, false)
            .await
            .unwrap_err();

        assert!(matches!(err, RevgraphError::BatchMissing(_)));
    }
}
