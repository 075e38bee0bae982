//! In-process review graph
//!
//! Nodes are kept in a map keyed by id with a label index and a
//! (label, key) index for merges; relationships live in a list with an
//! outgoing adjacency index per node. A transaction is encoded in full
//! before the write lock is taken and then applied in place, so either every
//! statement lands or none does.

use std::collections::{BTreeSet, HashMap, HashSet};

use async_trait::async_trait;
use revgraph_core::{EdgePolicy, Result, RevgraphError};
use serde_json::{json, Map, Value};
use tokio::sync::RwLock;
use tracing::trace;

use crate::{EdgeType, EntityNode, GraphBackend, NodeLabel, ReviewNode, Statement, Transaction};

pub type NodeId = u64;

/// A labelled node with its merge key and attributes
#[derive(Debug, Clone)]
pub struct Node {
    pub id: NodeId,
    pub label: NodeLabel,
    pub key: String,
    pub properties: Map<String, Value>,
}

/// A directed relationship between two nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub source: NodeId,
    pub target: NodeId,
    pub edge_type: EdgeType,
}

#[derive(Debug, Clone, Default)]
struct GraphData {
    nodes: HashMap<NodeId, Node>,
    edges: Vec<Edge>,
    outgoing: HashMap<NodeId, Vec<usize>>,
    label_index: HashMap<NodeLabel, HashSet<NodeId>>,
    key_index: HashMap<(NodeLabel, String), NodeId>,
    next_node_id: NodeId,
}

impl GraphData {
    fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
        self.outgoing.clear();
        self.label_index.clear();
        self.key_index.clear();
    }

    fn find(&self, label: NodeLabel, key: &str) -> Option<NodeId> {
        self.key_index.get(&(label, key.to_string())).copied()
    }

    /// Find or create the node, then overwrite the given properties
    fn merge_node(&mut self, label: NodeLabel, key: &str, properties: Map<String, Value>) -> NodeId {
        let id = match self.find(label, key) {
            Some(id) => id,
            None => {
                let id = self.next_node_id;
                self.next_node_id += 1;
                self.nodes.insert(
                    id,
                    Node {
                        id,
                        label,
                        key: key.to_string(),
                        properties: Map::new(),
                    },
                );
                self.label_index.entry(label).or_default().insert(id);
                self.key_index.insert((label, key.to_string()), id);
                id
            }
        };

        if let Some(node) = self.nodes.get_mut(&id) {
            node.properties.extend(properties);
        }
        id
    }

    fn relate(&mut self, edge_type: EdgeType, review: &str, target: &str, policy: EdgePolicy) {
        let (Some(source), Some(target)) = (
            self.find(NodeLabel::Review, review),
            self.find(edge_type.target(), target),
        ) else {
            // Unmatched endpoints create nothing
            return;
        };

        let edge = Edge {
            source,
            target,
            edge_type,
        };

        if policy == EdgePolicy::Merge && self.outgoing_edges(source).any(|e| *e == edge) {
            return;
        }

        self.outgoing.entry(source).or_default().push(self.edges.len());
        self.edges.push(edge);
    }

    fn outgoing_edges(&self, id: NodeId) -> impl Iterator<Item = &Edge> {
        self.outgoing
            .get(&id)
            .into_iter()
            .flatten()
            .filter_map(|&index| self.edges.get(index))
    }

    fn nodes_by_label(&self, label: NodeLabel) -> impl Iterator<Item = &Node> {
        self.label_index
            .get(&label)
            .into_iter()
            .flatten()
            .filter_map(|id| self.nodes.get(id))
    }

    fn apply(&mut self, write: Write<'_>) {
        match write {
            Write::Clear => self.clear(),
            Write::Merge {
                label,
                key,
                properties,
            } => {
                self.merge_node(label, key, properties);
            }
            Write::Relate {
                edge,
                review,
                target,
                policy,
            } => self.relate(edge, review, target, policy),
        }
    }
}

/// A statement with its attributes already encoded, so applying it cannot fail
enum Write<'a> {
    Clear,
    Merge {
        label: NodeLabel,
        key: &'a str,
        properties: Map<String, Value>,
    },
    Relate {
        edge: EdgeType,
        review: &'a str,
        target: &'a str,
        policy: EdgePolicy,
    },
}

impl<'a> Write<'a> {
    fn prepare(statement: &'a Statement) -> Result<Self> {
        Ok(match statement {
            Statement::ClearAll => Self::Clear,
            Statement::MergeReview(review) => Self::Merge {
                label: NodeLabel::Review,
                key: review.name.as_str(),
                properties: review_properties(review)?,
            },
            Statement::MergeEntity(entity) => Self::Merge {
                label: NodeLabel::Entity,
                key: entity.text.as_str(),
                properties: entity_properties(entity),
            },
            Statement::MergeFlavor(name) => Self::Merge {
                label: NodeLabel::Flavor,
                key: name.as_str(),
                properties: Map::new(),
            },
            Statement::Relate {
                edge,
                review,
                target,
                policy,
            } => Self::Relate {
                edge: *edge,
                review: review.as_str(),
                target: target.as_str(),
                policy: *policy,
            },
        })
    }
}

fn review_properties(review: &ReviewNode) -> Result<Map<String, Value>> {
    match serde_json::to_value(review) {
        Ok(Value::Object(mut map)) => {
            map.remove("name");
            Ok(map)
        }
        Ok(other) => Err(RevgraphError::Backend(format!(
            "Review attributes must serialize to an object, got {other}"
        ))),
        Err(e) => Err(RevgraphError::Backend(format!(
            "Failed to encode review attributes: {e}"
        ))),
    }
}

fn entity_properties(entity: &EntityNode) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert("labelCode".to_string(), json!(entity.label_code));
    map.insert("labelName".to_string(), json!(entity.label_name));
    map
}

/// In-memory `GraphBackend`
#[derive(Debug, Default)]
pub struct MemoryGraph {
    data: RwLock<GraphData>,
}

impl MemoryGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attributes of a node, if present
    pub async fn node_properties(&self, label: NodeLabel, key: &str) -> Option<Map<String, Value>> {
        let data = self.data.read().await;
        data.find(label, key)
            .and_then(|id| data.nodes.get(&id))
            .map(|node| node.properties.clone())
    }

    /// Relationships of one type leaving a Review, as target keys
    pub async fn outgoing(&self, review: &str, edge_type: EdgeType) -> Vec<String> {
        let data = self.data.read().await;
        let Some(source) = data.find(NodeLabel::Review, review) else {
            return Vec::new();
        };

        data.outgoing_edges(source)
            .filter(|edge| edge.edge_type == edge_type)
            .filter_map(|edge| data.nodes.get(&edge.target))
            .map(|node| node.key.clone())
            .collect()
    }
}

#[async_trait]
impl GraphBackend for MemoryGraph {
    async fn commit(&self, tx: Transaction) -> Result<()> {
        // Encode everything up front; the graph is only touched once nothing can fail
        let writes = tx
            .statements()
            .iter()
            .map(Write::prepare)
            .collect::<Result<Vec<_>>>()?;

        let mut data = self.data.write().await;
        for write in writes {
            data.apply(write);
        }

        trace!(statements = tx.len(), "Committed in-memory transaction");
        Ok(())
    }

    async fn count_label(&self, label: NodeLabel) -> Result<u64> {
        let data = self.data.read().await;
        Ok(data.label_index.get(&label).map_or(0, |ids| ids.len() as u64))
    }

    async fn count_reviews_above(&self, min_words: i64, min_polarity: f64) -> Result<u64> {
        let data = self.data.read().await;
        let count = data
            .nodes_by_label(NodeLabel::Review)
            .filter(|node| {
                let words = node.properties.get("wordCount").and_then(Value::as_i64);
                let polarity = node.properties.get("polarity").and_then(Value::as_f64);
                matches!((words, polarity), (Some(w), Some(p)) if w > min_words && p > min_polarity)
            })
            .count();
        Ok(count as u64)
    }

    async fn reviews_with_flavors(&self, flavors: &[String]) -> Result<Vec<String>> {
        let data = self.data.read().await;
        let wanted: HashSet<&str> = flavors.iter().map(String::as_str).collect();

        let names: BTreeSet<String> = data
            .nodes_by_label(NodeLabel::Review)
            .filter(|review| {
                data.outgoing_edges(review.id).any(|edge| {
                    edge.edge_type == EdgeType::HasFlavor
                        && data
                            .nodes
                            .get(&edge.target)
                            .is_some_and(|flavor| wanted.contains(flavor.key.as_str()))
                })
            })
            .map(|review| review.key.clone())
            .collect();

        Ok(names.into_iter().collect())
    }

    async fn node_count(&self) -> Result<u64> {
        Ok(self.data.read().await.nodes.len() as u64)
    }

    async fn relationship_count(&self) -> Result<u64> {
        Ok(self.data.read().await.edges.len() as u64)
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn review(name: &str, words: u64, polarity: Option<f64>) -> ReviewNode {
        ReviewNode {
            name: name.to_string(),
            word_count: words,
            sentence_count: 1,
            polarity,
            raw_text: String::new(),
            processed_text: String::new(),
        }
    }

    fn date(text: &str) -> EntityNode {
        EntityNode {
            text: text.to_string(),
            label_code: 391,
            label_name: "DATE".to_string(),
        }
    }

    #[tokio::test]
    async fn test_merge_is_keyed() {
        let graph = MemoryGraph::new();
        for words in [5, 7] {
            graph
                .commit(
                    Transaction::new()
                        .merge_review(review("f0001", words, Some(0.1)))
                        .merge_entity(date("2015"))
                        .merge_flavor("oak"),
                )
                .await
                .unwrap();
        }

        assert_eq!(graph.node_count().await.unwrap(), 3);
        assert_eq!(graph.count_label(NodeLabel::Review).await.unwrap(), 1);

        let props = graph.node_properties(NodeLabel::Review, "f0001").await.unwrap();
        assert_eq!(props["wordCount"], json!(7));
        assert!(!props.contains_key("name"));
    }

    #[tokio::test]
    async fn test_edge_policies() {
        let graph = MemoryGraph::new();
        let write = |policy: EdgePolicy| {
            Transaction::new()
                .merge_review(review("f0001", 5, None))
                .merge_flavor("oak")
                .relate(EdgeType::HasFlavor, "f0001", "oak", policy)
                .relate(EdgeType::HasFlavor, "f0001", "oak", policy)
        };

        graph.commit(write(EdgePolicy::Merge)).await.unwrap();
        assert_eq!(graph.relationship_count().await.unwrap(), 1);

        graph.commit(write(EdgePolicy::Create)).await.unwrap();
        assert_eq!(graph.relationship_count().await.unwrap(), 3);
        assert_eq!(graph.outgoing("f0001", EdgeType::HasFlavor).await.len(), 3);
    }

    #[tokio::test]
    async fn test_relate_without_endpoint_is_noop() {
        let graph = MemoryGraph::new();
        graph
            .commit(Transaction::new().merge_review(review("f0001", 5, None)).relate(
                EdgeType::RelatesToEntity,
                "f0001",
                "1990s",
                EdgePolicy::Create,
            ))
            .await
            .unwrap();

        assert_eq!(graph.relationship_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_statements_apply_in_order_in_place() {
        let graph = MemoryGraph::new();
        graph
            .commit(Transaction::new().merge_review(review("f0001", 5, None)))
            .await
            .unwrap();

        graph
            .commit(
                Transaction::new()
                    .merge_flavor("oak")
                    .clear_all()
                    .merge_review(review("f0002", 6, None))
                    .merge_flavor("plum")
                    .relate(EdgeType::HasFlavor, "f0002", "plum", EdgePolicy::Merge)
                    .relate(EdgeType::HasFlavor, "f0002", "oak", EdgePolicy::Merge),
            )
            .await
            .unwrap();

        assert_eq!(graph.node_count().await.unwrap(), 2);
        assert!(graph.node_properties(NodeLabel::Review, "f0001").await.is_none());
        assert!(graph.node_properties(NodeLabel::Flavor, "oak").await.is_none());
        assert_eq!(graph.outgoing("f0002", EdgeType::HasFlavor).await, vec!["plum"]);

        // Later commits build on the same graph
        graph
            .commit(Transaction::new().merge_review(review("f0003", 7, None)))
            .await
            .unwrap();
        assert_eq!(graph.count_label(NodeLabel::Review).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_clear_removes_everything() {
        let graph = MemoryGraph::new();
        graph
            .commit(
                Transaction::new()
                    .merge_review(review("f0001", 5, None))
                    .merge_flavor("oak")
                    .relate(EdgeType::HasFlavor, "f0001", "oak", EdgePolicy::Merge),
            )
            .await
            .unwrap();

        graph.commit(Transaction::new().clear_all()).await.unwrap();
        assert_eq!(graph.node_count().await.unwrap(), 0);
        assert_eq!(graph.relationship_count().await.unwrap(), 0);
        assert!(graph.outgoing("f0001", EdgeType::HasFlavor).await.is_empty());
    }

    #[tokio::test]
    async fn test_threshold_is_strict_and_skips_missing_polarity() {
        let graph = MemoryGraph::new();
        graph
            .commit(
                Transaction::new()
                    .merge_review(review("f0001", 20, Some(0.15)))
                    .merge_review(review("f0002", 21, Some(0.16)))
                    .merge_review(review("f0003", 50, None)),
            )
            .await
            .unwrap();

        assert_eq!(graph.count_reviews_above(20, 0.15).await.unwrap(), 1);
        assert_eq!(graph.count_reviews_above(19, 0.1).await.unwrap(), 2);
        assert_eq!(graph.count_reviews_above(-1, -1.0).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_reviews_with_flavors_are_distinct() {
        let graph = MemoryGraph::new();
        let mut tx = Transaction::new();
        for (name, flavors) in [("f0002", vec!["oak", "plum"]), ("f0001", vec!["oak"]), ("f0003", vec!["honey"])] {
            tx = tx.merge_review(review(name, 5, None));
            for flavor in flavors {
                tx = tx
                    .merge_flavor(flavor)
                    .relate(EdgeType::HasFlavor, name, flavor, EdgePolicy::Create);
            }
        }
        graph.commit(tx).await.unwrap();

        let wanted = vec!["oak".to_string(), "plum".to_string()];
        assert_eq!(
            graph.reviews_with_flavors(&wanted).await.unwrap(),
            vec!["f0001", "f0002"]
        );
        assert!(graph.reviews_with_flavors(&[]).await.unwrap().is_empty());
    }
}
