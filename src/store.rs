//! Persistence of generated strategies
//!
//! Each record is a pair of files in the output directory: `<stem>.<ext>`
//! with the raw source and `<stem>.json` with metadata. Existing files with
//! the same stem are overwritten.

use crate::error::{Error, Result, ResultExt};
use crate::types::{ArtifactOrigin, Dialect, GeneratedArtifact};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Sidecar metadata written next to each source file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyMetadata {
    /// Prompt the strategy was generated from
    pub description: String,
    /// Dialect of the source file
    pub language: Dialect,
    /// Generation time
    pub timestamp: DateTime<Utc>,
    /// Absolute path of the source file
    pub filename: PathBuf,
    /// Where the source came from
    pub origin: ArtifactOrigin,
}

impl StrategyMetadata {
    /// Read a sidecar back from disk
    pub fn read_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// Writes artifacts into an output directory
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    output_dir: PathBuf,
}

impl ArtifactStore {
    /// Store rooted at `output_dir`; the directory is created on first write
    pub fn new<P: Into<PathBuf>>(output_dir: P) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Output directory
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Path of the sidecar belonging to a stem
    pub fn metadata_path(&self, stem: &str) -> PathBuf {
        self.output_dir.join(format!("{}.json", stem))
    }

    /// Write the source file and its sidecar; returns the source path.
    ///
    /// The artifact is written as-is; validating it is the caller's job.
    pub fn persist(&self, artifact: &GeneratedArtifact, stem: &str) -> Result<PathBuf> {
        check_stem(stem)?;

        fs::create_dir_all(&self.output_dir)
            .map_err(Error::from)
            .with_context(|| format!("creating output directory {}", self.output_dir.display()))?;

        let source_path = self
            .output_dir
            .join(format!("{}.{}", stem, artifact.dialect().extension()));
        fs::write(&source_path, artifact.source_code())
            .map_err(|e| Error::persistence(&source_path, e.to_string()))?;

        if let Err(e) = self.write_sidecar(artifact, stem, &source_path) {
            // Never leave a source file without its sidecar
            if let Err(cleanup) = fs::remove_file(&source_path) {
                tracing::warn!("Could not remove {}: {}", source_path.display(), cleanup);
            }
            return Err(e);
        }

        tracing::debug!(
            "Saved {} and {}",
            source_path.display(),
            self.metadata_path(stem).display()
        );
        Ok(source_path)
    }

    fn write_sidecar(&self, artifact: &GeneratedArtifact, stem: &str, source_path: &Path) -> Result<()> {
        let filename = fs::canonicalize(source_path)
            .map_err(|e| Error::persistence(source_path, e.to_string()))?;

        let metadata = StrategyMetadata {
            description: artifact.description().to_string(),
            language: artifact.dialect(),
            timestamp: artifact.created_at(),
            filename,
            origin: artifact.origin().clone(),
        };

        let metadata_path = self.metadata_path(stem);
        let json = serde_json::to_string_pretty(&metadata)?;
        fs::write(&metadata_path, json).map_err(|e| Error::persistence(&metadata_path, e.to_string()))
    }
}

fn check_stem(stem: &str) -> Result<()> {
    if stem.trim().is_empty() {
        return Err(Error::invalid_stem(stem, "must not be empty"));
    }
    if stem.contains(['/', '\\']) {
        return Err(Error::invalid_stem(stem, "must not contain path separators"));
    }
    if stem.contains("..") {
        return Err(Error::invalid_stem(stem, "must not contain '..'"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn artifact(dialect: Dialect) -> GeneratedArtifact {
        GeneratedArtifact::new(
            "from AlgorithmImports import *\n# ünïcode ✓",
            "Bollinger mean reversion",
            dialect,
            ArtifactOrigin::Fallback,
        )
        .unwrap()
    }

    #[test]
    fn test_persist_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(dir.path().join("nested").join("out"));
        let artifact = artifact(Dialect::Python);

        let path = store.persist(&artifact, "strategy_1").unwrap();
        assert_eq!(path.file_name().unwrap(), "strategy_1.py");
        assert_eq!(fs::read(&path).unwrap(), artifact.source_code().as_bytes());

        let metadata = StrategyMetadata::read_from(store.metadata_path("strategy_1")).unwrap();
        assert_eq!(metadata.description, "Bollinger mean reversion");
        assert_eq!(metadata.language, Dialect::Python);
        assert_eq!(metadata.timestamp, artifact.created_at());
        assert!(metadata.filename.is_absolute());
        assert_eq!(
            fs::canonicalize(&metadata.filename).unwrap(),
            fs::canonicalize(&path).unwrap()
        );
        assert!(metadata.origin.is_fallback());
    }

    #[test]
    fn test_sidecar_field_names() {
        let dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(dir.path());
        store.persist(&artifact(Dialect::CSharp), "algo").unwrap();

        let raw = fs::read_to_string(dir.path().join("algo.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["language"], "csharp");
        assert!(value["timestamp"].is_string());
        assert!(value["filename"].as_str().unwrap().ends_with("algo.cs"));
        assert!(raw.contains("\n  \"description\""));
    }

    #[test]
    fn test_persist_overwrites_existing_record() {
        let dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(dir.path());
        store.persist(&artifact(Dialect::Python), "s").unwrap();

        let second = GeneratedArtifact::new("second", "d2", Dialect::Python, ArtifactOrigin::Fallback)
            .unwrap();
        let path = store.persist(&second, "s").unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "second");
        let metadata = StrategyMetadata::read_from(store.metadata_path("s")).unwrap();
        assert_eq!(metadata.description, "d2");
    }

    #[test]
    fn test_rejects_unsafe_stems() {
        let dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(dir.path());
        for stem in ["", "  ", "../up", "a/b", "a\\b", ".."] {
            let err = store.persist(&artifact(Dialect::Python), stem).unwrap_err();
            assert!(matches!(err, Error::InvalidStem { .. }), "stem {:?}", stem);
        }
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_failed_sidecar_leaves_no_source_behind() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("s.json")).unwrap();

        let store = ArtifactStore::new(dir.path());
        let err = store.persist(&artifact(Dialect::Python), "s").unwrap_err();
        assert!(matches!(err, Error::Persistence { .. }));
        assert!(!dir.path().join("s.py").exists());
    }

    #[test]
    fn test_unwritable_directory_is_an_error() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, "x").unwrap();

        let store = ArtifactStore::new(&blocker);
        let err = store.persist(&artifact(Dialect::Python), "s").unwrap_err();
        assert!(err.is_storage());
    }
}
