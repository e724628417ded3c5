//! Layered run configuration and path helpers.
//!
//! Uses Figment to merge built-in defaults, `ragbench.toml`,
//! `ragbench.<env>.toml` and `RAGBENCH_*` env vars (`__` separates nested
//! keys, e.g. `RAGBENCH_RETRIEVAL__K=10`). The environment name comes from
//! `RAGBENCH_ENV` and defaults to `dev`. Relative paths handed to
//! [`Config::resolve`] are taken from the directory the files were read from.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkingSettings {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub separators: Vec<String>,
}

impl Default for ChunkingSettings {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
            separators: ["\n\n", "\n", ". ", " ", ""].iter().map(ToString::to_string).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrievalSettings {
    pub k: usize,
    pub batch_size: usize,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self { k: 5, batch_size: 100 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddingSettings {
    pub dimension: usize,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self { dimension: 256 }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvalSettings {
    #[serde(default)]
    pub chunking: ChunkingSettings,
    #[serde(default)]
    pub retrieval: RetrievalSettings,
    #[serde(default)]
    pub embedding: EmbeddingSettings,
}

impl EvalSettings {
    pub fn validate(&self) -> Result<()> {
        let c = &self.chunking;
        if c.chunk_size == 0 {
            return Err(Error::InvalidConfig("chunking.chunk_size must be > 0".into()));
        }
        if c.chunk_overlap >= c.chunk_size {
            return Err(Error::InvalidConfig(format!(
                "chunking.chunk_overlap ({}) must be < chunking.chunk_size ({})",
                c.chunk_overlap, c.chunk_size
            )));
        }
        if self.retrieval.k == 0 {
            return Err(Error::InvalidConfig("retrieval.k must be > 0".into()));
        }
        if self.retrieval.batch_size == 0 {
            return Err(Error::InvalidConfig("retrieval.batch_size must be > 0".into()));
        }
        if self.embedding.dimension == 0 {
            return Err(Error::InvalidConfig("embedding.dimension must be > 0".into()));
        }
        Ok(())
    }
}

pub struct Config {
    figment: Figment,
    base: PathBuf,
}

impl Config {
    /// Load `ragbench.toml` and `ragbench.<env>.toml` from `dir`.
    pub fn load_from(dir: &Path) -> Result<Self> {
        let env_name = env::var("RAGBENCH_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::from(Serialized::defaults(EvalSettings::default()))
            .merge(Toml::file(dir.join("ragbench.toml")));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file(dir.join("ragbench.dev.toml"))),
            "prod" | "production" => figment = figment.merge(Toml::file(dir.join("ragbench.prod.toml"))),
            "test" | "testing" => figment = figment.merge(Toml::file(dir.join("ragbench.test.toml"))),
            other => {
                return Err(Error::InvalidConfig(format!("unknown RAGBENCH_ENV '{other}'")));
            }
        }
        figment = figment.merge(Env::prefixed("RAGBENCH_").ignore(&["ENV"]).split("__"));

        Ok(Self { figment, base: dir.to_path_buf() })
    }

    /// Expand a user-supplied path and resolve it against the directory the
    /// config was loaded from.
    pub fn resolve(&self, input: &str) -> Result<PathBuf> {
        resolve_path(&self.base, input)
    }

    pub fn get<T>(&self, key: &str) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| Error::InvalidConfig(format!("failed to get '{key}': {e}")))
    }

    /// Typed, validated settings.
    pub fn settings(&self) -> Result<EvalSettings> {
        let settings: EvalSettings = self
            .figment
            .extract()
            .map_err(|e| Error::InvalidConfig(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }
}

/// Expand `~` and `$VAR` / `${VAR}` in `input`, then join it onto `base`
/// unless it is already absolute. An unset variable is a config error.
pub fn resolve_path(base: &Path, input: &str) -> Result<PathBuf> {
    let expanded = shellexpand::full(input)
        .map_err(|e| Error::InvalidConfig(format!("cannot expand path '{input}': {e}")))?;
    let path = Path::new(expanded.as_ref());
    Ok(if path.is_absolute() { path.to_path_buf() } else { base.join(path) })
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_apply_without_files() {
        Jail::expect_with(|jail| {
            let settings = Config::load_from(jail.directory())
                .and_then(|c| c.settings())
                .map_err(|e| e.to_string())?;
            assert_eq!(settings, EvalSettings::default());
            assert_eq!(settings.chunking.separators.last().map(String::as_str), Some(""));
            Ok(())
        });
    }

    #[test]
    fn file_then_env_layers_override() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "ragbench.toml",
                r#"
                [retrieval]
                k = 10

                [chunking]
                chunk_size = 400
                chunk_overlap = 50
                "#,
            )?;
            jail.create_file("ragbench.test.toml", "[retrieval]\nbatch_size = 8\n")?;
            jail.set_env("RAGBENCH_ENV", "test");
            jail.set_env("RAGBENCH_RETRIEVAL__K", "3");

            let config = Config::load_from(jail.directory()).map_err(|e| e.to_string())?;
            let settings = config.settings().map_err(|e| e.to_string())?;
            assert_eq!(settings.retrieval, RetrievalSettings { k: 3, batch_size: 8 });
            assert_eq!(settings.chunking.chunk_size, 400);
            assert_eq!(settings.chunking.chunk_overlap, 50);
            assert_eq!(config.get::<usize>("embedding.dimension").map_err(|e| e.to_string())?, 256);
            Ok(())
        });
    }

    #[test]
    fn invalid_overlap_is_rejected() {
        Jail::expect_with(|jail| {
            jail.create_file("ragbench.toml", "[chunking]\nchunk_size = 100\nchunk_overlap = 100\n")?;
            let config = Config::load_from(jail.directory()).map_err(|e| e.to_string())?;
            assert!(matches!(config.settings(), Err(Error::InvalidConfig(_))));
            Ok(())
        });
    }

    #[test]
    fn unknown_env_name_is_rejected() {
        Jail::expect_with(|jail| {
            jail.set_env("RAGBENCH_ENV", "staging");
            assert!(matches!(Config::load_from(jail.directory()), Err(Error::InvalidConfig(_))));
            Ok(())
        });
    }

    #[test]
    fn paths_resolve_against_config_dir() {
        Jail::expect_with(|jail| {
            jail.set_env("LABEL_ROOT", "/srv/labels");
            let config = Config::load_from(jail.directory()).map_err(|e| e.to_string())?;
            assert_eq!(config.resolve("docs").map_err(|e| e.to_string())?, jail.directory().join("docs"));
            assert_eq!(
                config.resolve("${LABEL_ROOT}/chunk.json").map_err(|e| e.to_string())?,
                PathBuf::from("/srv/labels/chunk.json")
            );
            assert_eq!(config.resolve("/abs/docs").map_err(|e| e.to_string())?, PathBuf::from("/abs/docs"));
            Ok(())
        });
    }

    #[test]
    fn unset_variable_in_path_is_rejected() {
        let resolved = resolve_path(Path::new("/data"), "$RAGBENCH_UNSET_LABEL_DIR/gt.json");
        assert!(matches!(resolved, Err(Error::InvalidConfig(msg)) if msg.contains("RAGBENCH_UNSET_LABEL_DIR")));
    }
}
