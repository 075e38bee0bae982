//! SurrealDB implementation for the review graph
//!
//! Labels map to tables (`review`, `entity`, `flavor`) with the merge key as
//! record id, and relationship types map to edge tables (`relates_to_entity`,
//! `has_flavor`). A `Transaction` is rendered as one
//! `BEGIN TRANSACTION; ...; COMMIT TRANSACTION;` request in which every value
//! is a bound parameter.

use async_trait::async_trait;
use revgraph_core::{EdgePolicy, GraphConfig, Result, RevgraphError};
use serde::Deserialize;
use serde_json::{json, Value};
use surrealdb::engine::remote::ws::{Client, Ws};
use surrealdb::opt::auth::Root;
use surrealdb::Surreal;
use tracing::{debug, info};

use crate::{EdgeType, GraphBackend, NodeLabel, Statement, Transaction};

fn node_table(label: NodeLabel) -> &'static str {
    match label {
        NodeLabel::Review => "review",
        NodeLabel::Entity => "entity",
        NodeLabel::Flavor => "flavor",
    }
}

fn edge_table(edge: EdgeType) -> &'static str {
    match edge {
        EdgeType::RelatesToEntity => "relates_to_entity",
        EdgeType::HasFlavor => "has_flavor",
    }
}

fn backend_error(context: &str, e: surrealdb::Error) -> RevgraphError {
    RevgraphError::Backend(format!("{context}: {e}"))
}

/// SurrealDB graph backend
pub struct SurrealGraph {
    client: Surreal<Client>,
}

impl SurrealGraph {
    /// Connect, authenticate and select the configured namespace/database
    pub async fn connect(config: &GraphConfig) -> Result<Self> {
        // The ws engine adds the scheme itself
        let url = config
            .surrealdb_url
            .strip_prefix("ws://")
            .or_else(|| config.surrealdb_url.strip_prefix("wss://"))
            .unwrap_or(&config.surrealdb_url);

        let client = Surreal::new::<Ws>(url)
            .await
            .map_err(|e| backend_error("SurrealDB connection failed", e))?;

        client
            .signin(Root {
                username: &config.surrealdb_user,
                password: &config.surrealdb_pass,
            })
            .await
            .map_err(|e| backend_error("SurrealDB auth failed", e))?;

        client
            .use_ns(&config.surrealdb_namespace)
            .use_db(&config.surrealdb_database)
            .await
            .map_err(|e| backend_error("SurrealDB namespace error", e))?;

        let store = Self { client };
        store.init_schema().await?;

        info!(
            url = %config.surrealdb_url,
            namespace = %config.surrealdb_namespace,
            database = %config.surrealdb_database,
            "Connected to SurrealDB"
        );
        Ok(store)
    }

    /// Define tables and edge indexes if they do not exist yet
    pub async fn init_schema(&self) -> Result<()> {
        self.client
            .query(
                r#"
                DEFINE TABLE IF NOT EXISTS review SCHEMALESS;
                DEFINE TABLE IF NOT EXISTS entity SCHEMALESS;
                DEFINE TABLE IF NOT EXISTS flavor SCHEMALESS;
                DEFINE TABLE IF NOT EXISTS relates_to_entity SCHEMALESS;
                DEFINE TABLE IF NOT EXISTS has_flavor SCHEMALESS;
                DEFINE INDEX IF NOT EXISTS idx_relates_to_entity_pair ON relates_to_entity FIELDS in, out;
                DEFINE INDEX IF NOT EXISTS idx_has_flavor_pair ON has_flavor FIELDS in, out;
            "#,
            )
            .await
            .and_then(|response| response.check())
            .map_err(|e| backend_error("Schema init failed", e))?;

        Ok(())
    }

    async fn count_table(&self, table: &'static str) -> Result<u64> {
        let query = format!("SELECT count() AS count FROM {table} GROUP ALL");
        let row: Option<CountRow> = self
            .client
            .query(query)
            .await
            .map_err(|e| backend_error("Count query failed", e))?
            .take(0)
            .map_err(|e| backend_error("Result extraction failed", e))?;

        Ok(row.map_or(0, |r| r.count))
    }
}

#[derive(Debug, Deserialize)]
struct CountRow {
    count: u64,
}

#[derive(Debug, Deserialize)]
struct NameRow {
    name: String,
}

/// SurrealQL text plus its bound parameters
#[derive(Debug, Default)]
struct RenderedTransaction {
    sql: String,
    params: Vec<(String, Value)>,
}

impl RenderedTransaction {
    fn render(tx: &Transaction) -> Self {
        let mut out = Self::default();
        out.sql.push_str("BEGIN TRANSACTION;\n");

        for (i, statement) in tx.statements().iter().enumerate() {
            let p = format!("s{i}");
            match statement {
                Statement::ClearAll => {
                    for table in ["relates_to_entity", "has_flavor", "review", "entity", "flavor"] {
                        out.sql.push_str(&format!("DELETE {table};\n"));
                    }
                }
                Statement::MergeReview(review) => {
                    out.sql.push_str(&format!(
                        "UPSERT type::thing('review', ${p}_key) MERGE ${p}_data;\n"
                    ));
                    out.bind(&p, "key", json!(review.name));
                    out.bind(&p, "data", json!(review));
                }
                Statement::MergeEntity(entity) => {
                    out.sql.push_str(&format!(
                        "UPSERT type::thing('entity', ${p}_key) MERGE ${p}_data;\n"
                    ));
                    out.bind(&p, "key", json!(entity.text));
                    out.bind(&p, "data", json!(entity));
                }
                Statement::MergeFlavor(name) => {
                    out.sql.push_str(&format!(
                        "UPSERT type::thing('flavor', ${p}_key) MERGE {{ name: ${p}_key }};\n"
                    ));
                    out.bind(&p, "key", json!(name));
                }
                Statement::Relate {
                    edge,
                    review,
                    target,
                    policy,
                } => {
                    let edge_table = edge_table(*edge);
                    let target_table = node_table(edge.target());
                    let mut guard =
                        format!("record::exists(${p}_from) AND record::exists(${p}_to)");
                    if *policy == EdgePolicy::Merge {
                        guard.push_str(&format!(
                            " AND count((SELECT id FROM {edge_table} WHERE in = ${p}_from AND out = ${p}_to)) = 0"
                        ));
                    }

                    out.sql.push_str(&format!(
                        "LET ${p}_from = type::thing('review', ${p}_review);\n\
                         LET ${p}_to = type::thing('{target_table}', ${p}_target);\n\
                         IF {guard} {{ RELATE ${p}_from->{edge_table}->${p}_to; }};\n"
                    ));
                    out.bind(&p, "review", json!(review));
                    out.bind(&p, "target", json!(target));
                }
            }
        }

        out.sql.push_str("COMMIT TRANSACTION;\n");
        out
    }

    fn bind(&mut self, prefix: &str, name: &str, value: Value) {
        self.params.push((format!("{prefix}_{name}"), value));
    }
}

#[async_trait]
impl GraphBackend for SurrealGraph {
    async fn commit(&self, tx: Transaction) -> Result<()> {
        let rendered = RenderedTransaction::render(&tx);
        debug!(
            statements = tx.len(),
            params = rendered.params.len(),
            "Sending SurrealDB transaction"
        );

        let mut query = self.client.query(rendered.sql);
        for param in rendered.params {
            query = query.bind(param);
        }

        query
            .await
            .and_then(|response| response.check())
            .map_err(|e| backend_error("Transaction failed", e))?;

        Ok(())
    }

    async fn count_label(&self, label: NodeLabel) -> Result<u64> {
        self.count_table(node_table(label)).await
    }

    async fn count_reviews_above(&self, min_words: i64, min_polarity: f64) -> Result<u64> {
        let row: Option<CountRow> = self
            .client
            .query(
                "SELECT count() AS count FROM review \
                 WHERE type::is::number(polarity) \
                 AND wordCount > $min_words AND polarity > $min_polarity GROUP ALL",
            )
            .bind(("min_words", min_words))
            .bind(("min_polarity", min_polarity))
            .await
            .map_err(|e| backend_error("Threshold query failed", e))?
            .take(0)
            .map_err(|e| backend_error("Result extraction failed", e))?;

        Ok(row.map_or(0, |r| r.count))
    }

    async fn reviews_with_flavors(&self, flavors: &[String]) -> Result<Vec<String>> {
        let rows: Vec<NameRow> = self
            .client
            .query(
                "SELECT name FROM review \
                 WHERE ->has_flavor->flavor.name ANYINSIDE $flavors ORDER BY name",
            )
            .bind(("flavors", flavors.to_vec()))
            .await
            .map_err(|e| backend_error("Flavor query failed", e))?
            .take(0)
            .map_err(|e| backend_error("Result extraction failed", e))?;

        let mut names: Vec<String> = rows.into_iter().map(|r| r.name).collect();
        names.dedup();
        Ok(names)
    }

    async fn node_count(&self) -> Result<u64> {
        let mut total = 0;
        for label in NodeLabel::ALL {
            total += self.count_table(node_table(label)).await?;
        }
        Ok(total)
    }

    async fn relationship_count(&self) -> Result<u64> {
        let mut total = 0;
        for edge in [EdgeType::RelatesToEntity, EdgeType::HasFlavor] {
            total += self.count_table(edge_table(edge)).await?;
        }
        Ok(total)
    }

    fn name(&self) -> &str {
        "surrealdb"
    }
}
