use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::Arc;
use tracing::info;

use ragbench_core::dataset::{DEFAULT_CHUNK_LEVEL_DATASET, DEFAULT_TOKEN_LEVEL_DATASET};
use ragbench_core::{
    ChunkLevelGroundTruth, Chunker, CompletionRequest, Corpus, Error, GroundTruthUploader, LlmClient,
    Result, TokenLevelGroundTruth,
};

use crate::{chunk_level, token_level};

pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const DEFAULT_QUERIES_PER_DOC: usize = 5;

/// How labels are tied to the corpus.
#[derive(Clone)]
pub enum GenerationStrategy {
    /// Label questions with content-hash ids of chunks from this chunker.
    ChunkLevel(Arc<dyn Chunker>),
    /// Label questions with exact character spans.
    TokenLevel,
}

impl fmt::Debug for GenerationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerationStrategy::ChunkLevel(c) => f.debug_tuple("ChunkLevel").field(&c.name()).finish(),
            GenerationStrategy::TokenLevel => f.write_str("TokenLevel"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Upload {
    #[default]
    Skip,
    /// Upload under the strategy's default dataset name.
    Default,
    Named(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateOptions {
    pub queries_per_doc: usize,
    pub upload: Upload,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self { queries_per_doc: DEFAULT_QUERIES_PER_DOC, upload: Upload::Skip }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GeneratedDataset {
    ChunkLevel(Vec<ChunkLevelGroundTruth>),
    TokenLevel(Vec<TokenLevelGroundTruth>),
}

impl GeneratedDataset {
    pub fn len(&self) -> usize {
        match self {
            GeneratedDataset::ChunkLevel(v) => v.len(),
            GeneratedDataset::TokenLevel(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Holds the injected LLM handle and the corpus to label.
pub struct SyntheticDatasetGenerator {
    llm: Arc<dyn LlmClient>,
    corpus: Arc<Corpus>,
    model: String,
    uploader: Option<Arc<dyn GroundTruthUploader>>,
}

impl SyntheticDatasetGenerator {
    pub fn new(llm: Arc<dyn LlmClient>, corpus: impl Into<Arc<Corpus>>) -> Self {
        Self { llm, corpus: corpus.into(), model: DEFAULT_MODEL.to_string(), uploader: None }
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    #[must_use]
    pub fn with_uploader(mut self, uploader: Arc<dyn GroundTruthUploader>) -> Self {
        self.uploader = Some(uploader);
        self
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    pub async fn generate(&self, strategy: &GenerationStrategy, options: &GenerateOptions) -> Result<GeneratedDataset> {
        if options.queries_per_doc == 0 {
            return Err(Error::InvalidConfig("queries_per_doc must be greater than 0".into()));
        }
        if options.upload != Upload::Skip && self.uploader.is_none() {
            return Err(Error::InvalidConfig("upload requested but no uploader configured".into()));
        }

        let dataset = match strategy {
            GenerationStrategy::ChunkLevel(chunker) => GeneratedDataset::ChunkLevel(
                chunk_level::generate(self, chunker.as_ref(), options.queries_per_doc).await?,
            ),
            GenerationStrategy::TokenLevel => {
                GeneratedDataset::TokenLevel(token_level::generate(self, options.queries_per_doc).await?)
            }
        };
        info!(queries = dataset.len(), strategy = ?strategy, "Generated synthetic dataset");

        if let Some(uploader) = &self.uploader {
            upload(uploader.as_ref(), &dataset, &options.upload).await?;
        }
        Ok(dataset)
    }

    /// Ask the model for a JSON object and decode it as `T`.
    pub(crate) async fn call_json<T: DeserializeOwned>(&self, system: &str, prompt: String) -> Result<T> {
        let request = CompletionRequest {
            model: self.model.clone(),
            system: system.to_string(),
            prompt,
            json_response: true,
        };
        let raw = self
            .llm
            .complete(request)
            .await
            .map_err(|e| Error::Generation(format!("LLM call failed: {e:#}")))?;
        serde_json::from_str(&raw).map_err(|e| Error::Generation(format!("malformed LLM response: {e}")))
    }
}

async fn upload(uploader: &dyn GroundTruthUploader, dataset: &GeneratedDataset, target: &Upload) -> Result<()> {
    let named = |default: &str| match target {
        Upload::Skip => None,
        Upload::Default => Some(default.to_string()),
        Upload::Named(n) => Some(n.clone()),
    };
    let written = match dataset {
        GeneratedDataset::ChunkLevel(gt) => match named(DEFAULT_CHUNK_LEVEL_DATASET) {
            Some(name) => Some(uploader.upload_chunk_level(&name, gt).await.map_err(|e| upload_error(&name, &e))?),
            None => None,
        },
        GeneratedDataset::TokenLevel(gt) => match named(DEFAULT_TOKEN_LEVEL_DATASET) {
            Some(name) => Some(uploader.upload_token_level(&name, gt).await.map_err(|e| upload_error(&name, &e))?),
            None => None,
        },
    };
    if let Some(name) = written {
        info!(dataset = %name, "Uploaded synthetic dataset");
    }
    Ok(())
}

fn upload_error(name: &str, e: &anyhow::Error) -> Error {
    Error::Generation(format!("upload to '{name}' failed: {e:#}"))
}
