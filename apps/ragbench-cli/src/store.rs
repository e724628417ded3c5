//! Ground-truth datasets kept as `<dataset>.json` files in one directory.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

use ragbench_core::dataset::{
    chunk_level_from_examples, chunk_level_to_examples, token_level_from_examples,
    token_level_to_examples, ChunkLevelExample, TokenLevelExample,
};
use ragbench_core::{ChunkLevelGroundTruth, GroundTruthLoader, GroundTruthUploader, TokenLevelGroundTruth};

#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store rooted at the file's directory plus the dataset name it holds.
    pub fn for_file(path: &Path) -> Result<(Self, String)> {
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .with_context(|| format!("dataset path {} has no file name", path.display()))?;
        let dir = path.parent().map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        Ok((Self::new(dir), name.to_string()))
    }

    pub fn path_for(&self, dataset: &str) -> PathBuf {
        self.dir.join(format!("{dataset}.json"))
    }

    async fn read<T: DeserializeOwned>(&self, dataset: &str) -> Result<Vec<T>> {
        let path = self.path_for(dataset);
        let raw = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("reading {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
    }

    async fn write<T: Serialize + Sync>(&self, dataset: &str, records: &[T]) -> Result<String> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("creating {}", self.dir.display()))?;
        let path = self.path_for(dataset);
        let body = serde_json::to_string_pretty(records)?;
        tokio::fs::write(&path, body)
            .await
            .with_context(|| format!("writing {}", path.display()))?;
        info!(dataset, records = records.len(), path = %path.display(), "Wrote dataset");
        Ok(dataset.to_string())
    }
}

#[async_trait]
impl GroundTruthLoader for JsonFileStore {
    async fn load_chunk_level(&self, dataset: &str) -> Result<Vec<ChunkLevelGroundTruth>> {
        let examples: Vec<ChunkLevelExample> = self.read(dataset).await?;
        Ok(chunk_level_from_examples(examples))
    }

    async fn load_token_level(&self, dataset: &str) -> Result<Vec<TokenLevelGroundTruth>> {
        let examples: Vec<TokenLevelExample> = self.read(dataset).await?;
        Ok(token_level_from_examples(examples))
    }
}

#[async_trait]
impl GroundTruthUploader for JsonFileStore {
    async fn upload_chunk_level(&self, dataset: &str, ground_truth: &[ChunkLevelGroundTruth]) -> Result<String> {
        self.write(dataset, &chunk_level_to_examples(ground_truth)).await
    }

    async fn upload_token_level(&self, dataset: &str, ground_truth: &[TokenLevelGroundTruth]) -> Result<String> {
        self.write(dataset, &token_level_to_examples(ground_truth)).await
    }
}
