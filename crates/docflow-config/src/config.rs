//! Configuration structures and loading.

use crate::error::{ConfigError, ConfigResult};
use crate::paths::AppPaths;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable holding the Gemini API key.
pub const GOOGLE_API_KEY_VAR: &str = "GOOGLE_API_KEY";

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default)]
    pub gemini: GeminiConfig,

    #[serde(default)]
    pub ollama: OllamaConfig,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub server: ServerConfig,
}

impl Config {
    /// Load configuration: `.env`, then the resolved config file (if any),
    /// then environment overrides.
    pub fn load(explicit: Option<&Path>) -> ConfigResult<Self> {
        dotenvy::dotenv().ok();

        let mut config = match AppPaths::resolve_config_file(explicit) {
            Some(path) => {
                debug!("Loading configuration from {}", path.display());
                Self::load_from(&path)?
            }
            None => Self::default(),
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Apply overrides from a variable lookup (the process environment in production).
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(key) = get(GOOGLE_API_KEY_VAR) {
            self.gemini.api_key = Some(key);
        }
        if let Some(model) = get("DOCFLOW_GEMINI_MODEL") {
            self.gemini.model = model;
        }
        if let Some(host) = get("DOCFLOW_OLLAMA_HOST") {
            self.ollama.host = host;
        }
        if let Some(model) = get("DOCFLOW_OLLAMA_MODEL") {
            self.ollama.model = model;
        }
        if let Some(model) = get("DOCFLOW_EMBEDDING_MODEL") {
            self.ollama.embedding_model = model;
        }
        if let Some(path) = get("DOCFLOW_STORE_PATH") {
            self.store.path = PathBuf::from(path);
        }
        if let Some(bind) = get("DOCFLOW_BIND") {
            self.server.bind = bind;
        }
    }

    /// Check values that would only fail much later otherwise.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.gemini.sample_chars == 0 {
            return Err(ConfigError::Invalid(
                "gemini.sample_chars must be greater than zero".to_string(),
            ));
        }
        if self.ollama.host.trim().is_empty() {
            return Err(ConfigError::Invalid("ollama.host must not be empty".to_string()));
        }
        Ok(())
    }

    /// The Gemini API key, required by the extraction stage.
    pub fn gemini_api_key(&self) -> ConfigResult<&str> {
        self.gemini
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or(ConfigError::MissingCredential(GOOGLE_API_KEY_VAR))
    }

    /// Render the configuration as TOML with the API key masked.
    pub fn to_display_string(&self) -> ConfigResult<String> {
        let mut shown = self.clone();
        if let Some(key) = shown.gemini.api_key.as_mut() {
            *key = mask_secret(key);
        }
        Ok(toml::to_string_pretty(&shown)?)
    }

    /// Create a default config file with comments.
    pub fn create_default_file(path: &Path) -> ConfigResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, Self::default_config_string())?;
        Ok(())
    }

    /// Generate a default config file with helpful comments.
    pub fn default_config_string() -> String {
        r#"# Docflow Configuration

[paths]
# Incoming PDF documents (consumed once converted)
pdf_dir = "pdf_documents"
# Extracted JSON records, one directory per document type
invoices_dir = "invoices"
contracts_dir = "contracts"

[gemini]
# The API key is read from GOOGLE_API_KEY (environment or .env)
# api_key = ""
model = "gemini-2.5-flash"
base_url = "https://generativelanguage.googleapis.com"
timeout_seconds = 120
# Leading characters of the first page sent for classification
sample_chars = 1000

[ollama]
host = "http://localhost:11434"
# Model answering questions
model = "llama3"
# Model producing embeddings
embedding_model = "paraphrase-multilingual"
timeout_seconds = 300

[store]
# Directory holding the vector store
path = "./my_documents_db"

[server]
bind = "127.0.0.1:5000"
"#
        .to_string()
    }
}

fn mask_secret(secret: &str) -> String {
    let visible: String = secret.chars().take(4).collect();
    format!("{}****", visible)
}

/// Input and output directories of the batch stages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub pdf_dir: PathBuf,
    pub invoices_dir: PathBuf,
    pub contracts_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            pdf_dir: PathBuf::from("pdf_documents"),
            invoices_dir: PathBuf::from("invoices"),
            contracts_dir: PathBuf::from("contracts"),
        }
    }
}

/// Hosted model used for classification and field extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout_seconds: u64,
    pub sample_chars: usize,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gemini-2.5-flash".to_string(),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            timeout_seconds: 120,
            sample_chars: 1000,
        }
    }
}

/// Local Ollama settings (answers and embeddings).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OllamaConfig {
    pub host: String,
    pub model: String,
    pub embedding_model: String,
    pub timeout_seconds: u64,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: "http://localhost:11434".to_string(),
            model: "llama3".to_string(),
            embedding_model: "paraphrase-multilingual".to_string(),
            timeout_seconds: 300,
        }
    }
}

/// Vector store location.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./my_documents_db"),
        }
    }
}

/// HTTP query service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:5000".to_string(),
        }
    }
}
