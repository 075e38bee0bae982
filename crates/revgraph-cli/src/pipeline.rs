//! Pipeline stages
//!
//! Extraction writes a batch file; loading reads one. The two halves only
//! meet through that file, so either can be rerun on its own.

use std::path::Path;
use std::sync::Arc;

use revgraph_core::{AppConfig, BatchFile, Result, ReviewRecord};
use revgraph_extractor::{
    ingest_directory, read_review, ExtractionOptions, FeatureExtractor, LanguagePipeline,
    RulePipeline,
};
use revgraph_graph::{GraphBackend, GraphLoader, LoadSummary};
use tracing::info;

/// Extraction and loading configured from an `AppConfig`
pub struct ReviewPipeline {
    config: AppConfig,
    extractor: FeatureExtractor,
}

impl ReviewPipeline {
    /// Pipeline using the rule-based language engine
    pub fn new(config: AppConfig) -> Self {
        Self::with_language(config, Arc::new(RulePipeline::new()))
    }

    pub fn with_language(config: AppConfig, language: Arc<dyn LanguagePipeline>) -> Self {
        let options = ExtractionOptions::from(&config.extraction);
        Self {
            extractor: FeatureExtractor::new(language, options),
            config,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn extractor(&self) -> &FeatureExtractor {
        &self.extractor
    }

    pub fn loader(&self, backend: Arc<dyn GraphBackend>) -> GraphLoader {
        GraphLoader::from_config(backend, &self.config.graph)
    }

    /// Extract the first `limit` input files and write the bulk batch file
    pub fn ingest(&self, limit: usize) -> Result<Vec<ReviewRecord>> {
        let records = ingest_directory(&self.extractor, &self.config.paths, limit)?;
        BatchFile::new(self.config.paths.batch_path()).write(&records)?;
        Ok(records)
    }

    /// Load the bulk batch file
    pub async fn load(&self, backend: Arc<dyn GraphBackend>, clear: bool) -> Result<LoadSummary> {
        let batch = BatchFile::new(self.config.paths.batch_path());
        self.loader(backend).load(&batch, clear).await
    }

    /// Ingest, then replace the graph contents with the new batch
    pub async fn reload(&self, backend: Arc<dyn GraphBackend>, limit: usize) -> Result<LoadSummary> {
        self.ingest(limit)?;
        self.load(backend, true).await
    }

    /// Extract one file, write it to the upload batch file and load it
    /// without clearing
    pub async fn upload(&self, backend: Arc<dyn GraphBackend>, path: &Path) -> Result<ReviewRecord> {
        let (name, text) = read_review(path)?;
        info!(file = %path.display(), review = %name, "Uploading review");

        let mut batch = Vec::with_capacity(1);
        self.extractor.extract(&name, &text, &mut batch)?;

        let file = BatchFile::new(self.config.paths.upload_batch_path());
        file.write(&batch)?;

        let mut records = file.read()?;
        self.loader(backend).load_records(&records, false).await?;

        records
            .pop()
            .ok_or_else(|| revgraph_core::RevgraphError::Pipeline("upload batch is empty".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use revgraph_core::{PathsConfig, RevgraphError};
    use revgraph_graph::{MemoryGraph, NodeLabel};
    use std::fs;
    use tempfile::TempDir;

    fn pipeline(root: &Path) -> ReviewPipeline {
        let config = AppConfig {
            paths: PathsConfig {
                input_dir: root.join("inData"),
                output_dir: root.join("outData"),
                ..PathsConfig::default()
            },
            ..AppConfig::default()
        };
        ReviewPipeline::new(config)
    }

    fn seed_inputs(root: &Path) {
        let input = root.join("inData");
        fs::create_dir_all(&input).unwrap();
        fs::write(input.join("f0001.txt"), "A lovely cherry and oak note, quite fruity.").unwrap();
        fs::write(input.join("f0002.txt"), "Plum and pepper. Very good.").unwrap();
    }

    #[tokio::test]
    async fn test_reload_replaces_graph() {
        let dir = TempDir::new().unwrap();
        seed_inputs(dir.path());
        let pipeline = pipeline(dir.path());
        let graph = Arc::new(MemoryGraph::new());

        let first = pipeline.reload(graph.clone(), 2).await.unwrap();
        assert_eq!(first.reviews, 2);
        assert!(dir.path().join("outData/temp_neo_data.json").is_file());

        let second = pipeline.reload(graph.clone(), 1).await.unwrap();
        assert_eq!(second.reviews, 1);
        assert_eq!(graph.count_label(NodeLabel::Review).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_upload_adds_without_clearing() {
        let dir = TempDir::new().unwrap();
        seed_inputs(dir.path());
        let pipeline = pipeline(dir.path());
        let graph = Arc::new(MemoryGraph::new());

        pipeline.reload(graph.clone(), 1).await.unwrap();
        let record = pipeline
            .upload(graph.clone(), &dir.path().join("inData/f0002.txt"))
            .await
            .unwrap();

        assert_eq!(record.name, "f0002");
        assert_eq!(record.flavors, vec!["plum", "pepper"]);
        assert_eq!(graph.count_label(NodeLabel::Review).await.unwrap(), 2);
        assert!(dir
            .path()
            .join("outData/user_input_temp_neo_data.json")
            .is_file());
    }

    #[tokio::test]
    async fn test_upload_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = pipeline(dir.path())
            .upload(Arc::new(MemoryGraph::new()), &dir.path().join("nope.txt"))
            .await
            .unwrap_err();

        assert!(matches!(err, RevgraphError::InputNotFound(_)));
    }
}
