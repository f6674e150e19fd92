use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::models::ollama::{DEFAULT_MODEL, DEFAULT_OLLAMA_URL};
use crate::models::openai::{DEFAULT_OPENAI_MODEL, DEFAULT_OPENAI_URL};
use crate::models::{GenerativeModel, ModelProvider, OllamaClient, OpenAiClient, ResponseMode};
use crate::rag::context::{ContextConfig, ContextFormatter};
use crate::rag::pipeline::{DynOrchestrator, RcaOrchestrator};
use crate::rag::retrieval::pinecone::{DEFAULT_CONTROL_PLANE_URL, DEFAULT_INDEX_NAME};
use crate::rag::retrieval::{PineconeClient, PineconeSettings, QueryParams, RerankSpec, VectorStore};
use crate::types::MAX_MATCHES;

/// Environment variable holding the index API key
pub const INDEX_API_KEY_ENV: &str = "PINECONE_API_KEY";

/// Environment variable holding the hosted model API key
pub const MODEL_API_KEY_ENV: &str = "LLM_API_KEY";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub index: IndexConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub context: ContextConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// Vector index connection and query settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    pub name: String,
    /// Data-plane host; looked up by name when unset
    pub host: Option<String>,
    pub namespace: String,
    pub api_key: Option<String>,
    pub top_k: usize,
    pub timeout_secs: u64,
    pub control_plane_url: String,
    pub rerank: RerankConfig,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_INDEX_NAME.to_string(),
            host: None,
            namespace: String::new(),
            api_key: None,
            top_k: MAX_MATCHES,
            timeout_secs: 30,
            control_plane_url: DEFAULT_CONTROL_PLANE_URL.to_string(),
            rerank: RerankConfig::default(),
        }
    }
}

/// Rerank stage settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RerankConfig {
    pub enabled: bool,
    pub model: String,
    pub top_n: usize,
    /// Record fields the reranker scores against
    pub rank_fields: Vec<String>,
}

impl Default for RerankConfig {
    fn default() -> Self {
        let spec = RerankSpec::default();
        Self {
            enabled: true,
            model: spec.model,
            top_n: spec.top_n,
            rank_fields: spec.rank_fields,
        }
    }
}

/// Generative model settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub provider: ModelProvider,
    /// Provider default when unset
    pub base_url: Option<String>,
    /// Provider default when unset
    pub model: Option<String>,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
    /// OpenAI-compatible only: `json_schema`, or `json_object` for models
    /// without schema-constrained decoding
    pub response_format: ResponseMode,
    /// OpenAI-compatible only: request strict schema adherence
    pub strict_schema: bool,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: ModelProvider::Ollama,
            base_url: None,
            model: None,
            api_key: None,
            timeout_secs: 120,
            response_format: ResponseMode::JsonSchema,
            strict_schema: true,
        }
    }
}

impl ModelConfig {
    /// Model name, falling back to the provider default
    pub fn model_name(&self) -> &str {
        match (&self.model, self.provider) {
            (Some(model), _) => model,
            (None, ModelProvider::Ollama) => DEFAULT_MODEL,
            (None, ModelProvider::OpenAi) => DEFAULT_OPENAI_MODEL,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:9000".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from an explicit path, or the default location
    ///
    /// An explicit path must exist; a missing default file yields defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let default_path = Self::config_path()?;
                if !default_path.exists() {
                    return Ok(Config::default());
                }
                default_path
            }
        };

        let contents = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file {}", config_path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file {}", config_path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let toml_string = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, toml_string).context("Failed to write config file")?;

        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Could not determine home directory")?;

        Ok(home.join(".logsleuth").join("config.toml"))
    }

    /// REPL history file next to the configuration
    pub fn history_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".logsleuth").join("history"))
    }

    /// Fill unset secrets from the environment
    pub fn apply_env(&mut self) {
        self.apply_env_from(|name| std::env::var(name).ok());
    }

    pub(crate) fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if self.index.api_key.is_none() {
            self.index.api_key = lookup(INDEX_API_KEY_ENV);
        }
        if self.model.api_key.is_none() {
            self.model.api_key = lookup(MODEL_API_KEY_ENV);
        }
    }

    /// Copy with secrets masked, for display
    pub fn redacted(&self) -> Self {
        let mask = |secret: &Option<String>| secret.as_ref().map(|_| "********".to_string());
        let mut config = self.clone();
        config.index.api_key = mask(&self.index.api_key);
        config.model.api_key = mask(&self.model.api_key);
        config
    }

    /// Query parameters sent to the index
    pub fn query_params(&self) -> QueryParams {
        let rerank = &self.index.rerank;
        QueryParams {
            top_k: self.index.top_k,
            rerank: rerank.enabled.then(|| RerankSpec {
                model: rerank.model.clone(),
                top_n: rerank.top_n,
                rank_fields: rerank.rank_fields.clone(),
            }),
        }
    }

    pub fn build_vector_store(&self) -> Result<Arc<dyn VectorStore>> {
        let settings = PineconeSettings {
            index_name: self.index.name.clone(),
            host: self.index.host.clone(),
            namespace: self.index.namespace.clone(),
            api_key: self.index.api_key.clone().unwrap_or_default(),
            timeout: Duration::from_secs(self.index.timeout_secs),
            params: self.query_params(),
            control_plane_url: self.index.control_plane_url.clone(),
        };

        let client = PineconeClient::new(settings).with_context(|| {
            format!("Set index.api_key or the {} environment variable", INDEX_API_KEY_ENV)
        })?;
        Ok(Arc::new(client))
    }

    pub fn build_model(&self) -> Result<Arc<dyn GenerativeModel>> {
        let timeout = Duration::from_secs(self.model.timeout_secs);

        let model: Arc<dyn GenerativeModel> = match self.model.provider {
            ModelProvider::Ollama => Arc::new(OllamaClient::with_config(
                self.model.base_url.as_deref().unwrap_or(DEFAULT_OLLAMA_URL),
                self.model.model_name(),
                timeout,
            )?),
            ModelProvider::OpenAi => Arc::new(
                OpenAiClient::with_config(
                    self.model.base_url.as_deref().unwrap_or(DEFAULT_OPENAI_URL),
                    self.model.model_name(),
                    self.model.api_key.as_deref().unwrap_or_default(),
                    timeout,
                )
                .with_context(|| {
                    format!("Set model.api_key or the {} environment variable", MODEL_API_KEY_ENV)
                })?
                .with_response_mode(self.model.response_format, self.model.strict_schema),
            ),
        };
        Ok(model)
    }

    /// Wire the full pipeline from this configuration
    pub fn build_orchestrator(&self) -> Result<DynOrchestrator> {
        Ok(RcaOrchestrator::with_formatter(
            self.build_vector_store()?,
            self.build_model()?,
            ContextFormatter::with_config(self.context.clone()),
        ))
    }
}
