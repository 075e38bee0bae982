//! Review file ingestion
//!
//! Input reviews are plain-text files, one review per file, named
//! `<prefix>NNNN.<extension>` (e.g. `f0001.txt`).

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use revgraph_core::{PathsConfig, Result, RevgraphError, ReviewRecord};
use tracing::{debug, info};

use crate::features::FeatureExtractor;

/// Record name for a review file: its stem
pub fn review_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

/// Read one review file as (name, text)
pub fn read_review(path: &Path) -> Result<(String, String)> {
    let text = fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => RevgraphError::InputNotFound(path.to_path_buf()),
        _ => RevgraphError::io(path, e),
    })?;

    Ok((review_name(path), text))
}

/// Review files in `dir`, sorted by file name
pub fn list_review_files(dir: &Path, prefix: &str, extension: &str) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(RevgraphError::InputDirMissing(dir.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| RevgraphError::io(dir, e))? {
        let path = entry.map_err(|e| RevgraphError::io(dir, e))?.path();
        if !path.is_file() {
            continue;
        }

        let matches_prefix = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with(prefix));
        let matches_extension = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e == extension);

        if matches_prefix && matches_extension {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

/// Extract the first `limit` review files of the configured input directory.
///
/// Fails before extracting anything if the directory is missing, holds no
/// review files, or `limit` is not between 1 and the number of files.
pub fn ingest_directory(
    extractor: &FeatureExtractor,
    paths: &PathsConfig,
    limit: usize,
) -> Result<Vec<ReviewRecord>> {
    let dir = paths.input_dir.as_path();
    let files = list_review_files(dir, &paths.input_prefix, &paths.input_extension)?;

    if files.is_empty() {
        return Err(RevgraphError::InputDirEmpty(dir.to_path_buf()));
    }
    if limit == 0 || limit > files.len() {
        return Err(RevgraphError::InvalidLimit {
            limit,
            available: files.len(),
        });
    }

    info!(dir = %dir.display(), limit, available = files.len(), "Extracting reviews");

    let mut batch = Vec::with_capacity(limit);
    for (i, path) in files.iter().take(limit).enumerate() {
        let (name, text) = read_review(path)?;
        debug!("Extracting entry {} of {}: {}", i + 1, limit, name);
        extractor.extract(&name, &text, &mut batch)?;
    }

    info!(records = batch.len(), "Extraction complete");
    Ok(batch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::ExtractionOptions;
    use crate::pipeline::RulePipeline;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn extractor() -> FeatureExtractor {
        FeatureExtractor::new(Arc::new(RulePipeline::new()), ExtractionOptions::default())
    }

    fn paths_for(dir: &Path) -> PathsConfig {
        PathsConfig {
            input_dir: dir.to_path_buf(),
            ..PathsConfig::default()
        }
    }

    fn corpus() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("f0002.txt"), "Smoky plum.").unwrap();
        fs::write(dir.path().join("f0001.txt"), "Ripe cherry.").unwrap();
        fs::write(dir.path().join("f0003.txt"), "Oak and vanilla.").unwrap();
        fs::write(dir.path().join("notes.md"), "ignored").unwrap();
        fs::write(dir.path().join("g0001.txt"), "ignored").unwrap();
        dir
    }

    #[test]
    fn test_review_name() {
        assert_eq!(review_name(Path::new("inData/f0001.txt")), "f0001");
        assert_eq!(review_name(Path::new("f0001")), "f0001");
    }

    #[test]
    fn test_read_missing_review() {
        let err = read_review(Path::new("/nonexistent/f0001.txt")).unwrap_err();
        assert!(matches!(err, RevgraphError::InputNotFound(_)));
    }

    #[test]
    fn test_list_is_filtered_and_sorted() {
        let dir = corpus();
        let files = list_review_files(dir.path(), "f", "txt").unwrap();
        let names: Vec<_> = files.iter().map(|p| review_name(p)).collect();
        assert_eq!(names, vec!["f0001", "f0002", "f0003"]);
    }

    #[test]
    fn test_ingest_respects_limit() {
        let dir = corpus();
        let batch = ingest_directory(&extractor(), &paths_for(dir.path()), 2).unwrap();

        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0].name, "f0001");
        assert_eq!(batch[0].flavors, vec!["cherry"]);
        assert_eq!(batch[1].name, "f0002");
        assert_eq!(batch[1].flavors, vec!["smoky", "plum"]);
    }

    #[test]
    fn test_ingest_validation() {
        let dir = corpus();
        let paths = paths_for(dir.path());

        assert!(matches!(
            ingest_directory(&extractor(), &paths, 0),
            Err(RevgraphError::InvalidLimit { limit: 0, available: 3 })
        ));
        assert!(matches!(
            ingest_directory(&extractor(), &paths, 4),
            Err(RevgraphError::InvalidLimit { limit: 4, available: 3 })
        ));

        let empty = TempDir::new().unwrap();
        assert!(matches!(
            ingest_directory(&extractor(), &paths_for(empty.path()), 1),
            Err(RevgraphError::InputDirEmpty(_))
        ));

        let missing = empty.path().join("missing");
        assert!(matches!(
            ingest_directory(&extractor(), &paths_for(&missing), 1),
            Err(RevgraphError::InputDirMissing(_))
        ));
    }
}
