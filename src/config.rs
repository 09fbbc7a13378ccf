use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CulinaConfig {
    pub server: ServerConfig,
    pub build: BuildConfig,
    pub embedding: EmbeddingConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub log_level: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct BuildConfig {
    /// Directory the three store artifacts are written to.
    pub out_dir: String,
    /// Records per model call during corpus embedding. Bounds peak memory,
    /// not parallelism — batches run strictly one after another.
    pub batch_size: usize,
    pub max_openrecipes: usize,
    pub max_wikibooks: usize,
    pub openrecipes_url: String,
    pub wikibooks_url: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub model: String,
    pub cache_dir: String,
    /// Shape-inference boundary for the embedding output normalizer: a row
    /// buffer longer than `dim * pooled_len_ratio` is treated as per-token
    /// output that still needs mean pooling. Best-effort heuristic, not a
    /// backend guarantee.
    pub pooled_len_ratio: f32,
}

impl Default for CulinaConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            build: BuildConfig::default(),
            embedding: EmbeddingConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 7878,
            log_level: "info".into(),
        }
    }
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            out_dir: "assets".into(),
            batch_size: 48,
            max_openrecipes: 15_000,
            max_wikibooks: 4_000,
            openrecipes_url:
                "https://raw.githubusercontent.com/jakevdp/open-recipe-data/main/recipeitems.json.gz"
                    .into(),
            wikibooks_url:
                "https://huggingface.co/datasets/gossminn/wikibooks-cookbook/resolve/main/recipes_parsed.mini.json"
                    .into(),
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        let cache_dir = default_culina_dir()
            .join("models")
            .to_string_lossy()
            .into_owned();
        Self {
            model: "all-MiniLM-L6-v2".into(),
            cache_dir,
            pooled_len_ratio: 1.5,
        }
    }
}

/// Returns `~/.culina/`
pub fn default_culina_dir() -> PathBuf {
    dirs::home_dir()
        .expect("home directory must exist")
        .join(".culina")
}

/// Returns the default config file path: `~/.culina/config.toml`
pub fn default_config_path() -> PathBuf {
    default_culina_dir().join("config.toml")
}

impl CulinaConfig {
    /// Load config from TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            CulinaConfig::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides (CULINA_OUT_DIR, CULINA_MODEL_DIR, CULINA_LOG_LEVEL).
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("CULINA_OUT_DIR") {
            self.build.out_dir = val;
        }
        if let Ok(val) = std::env::var("CULINA_MODEL_DIR") {
            self.embedding.cache_dir = val;
        }
        if let Ok(val) = std::env::var("CULINA_LOG_LEVEL") {
            self.server.log_level = val;
        }
    }

    /// Resolve the output directory, expanding `~` if needed.
    pub fn resolved_out_dir(&self) -> PathBuf {
        expand_tilde(&self.build.out_dir)
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        dirs::home_dir()
            .expect("home directory must exist")
            .join(rest)
    } else {
        PathBuf::from(path)
    }
}
