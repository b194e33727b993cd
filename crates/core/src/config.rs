//! Configuration management for Docent.
//!
//! Configuration is assembled in layers, later layers winning:
//! - Built-in defaults
//! - Config file (`.docent/config.yaml`, or the file named by `DOCENT_CONFIG`)
//! - Environment variables
//! - Command-line flags
//!
//! The resulting [`AppConfig`] is handed explicitly to the provider factories
//! and index constructors; pipeline code never reads the environment itself.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Embedding providers the knowledge crate knows how to build.
pub const EMBEDDING_PROVIDERS: [&str; 3] = ["openai", "ollama", "hashing"];

/// Chat-completion providers the llm crate knows how to build.
pub const GENERATION_PROVIDERS: [&str; 2] = ["openai", "ollama"];

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .docent/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Document ingested when `docent ingest` gets no path
    pub document_path: Option<PathBuf>,

    /// Embedding service settings
    pub embedding: EmbeddingSettings,

    /// Generation service settings
    pub generation: GenerationSettings,

    /// Vector store settings
    pub index: IndexSettings,

    /// Chunker settings
    pub chunking: ChunkingSettings,

    /// Retrieval settings
    pub retrieval: RetrievalSettings,

    /// Prompt definition id under `.docent/prompts/` replacing the built-in template
    pub prompt_id: Option<String>,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,
}

/// Embedding service configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EmbeddingSettings {
    /// "openai", "ollama" or "hashing"
    pub provider: String,

    /// Model identifier sent to the service
    pub model: String,

    /// Base URL override
    pub endpoint: Option<String>,

    /// Environment variable holding the API key
    pub api_key_env: Option<String>,

    /// Vector size for providers that cannot report it (hashing)
    pub dimensions: usize,

    /// Maximum texts per embedding request
    pub batch_size: usize,

    /// HTTP client timeout
    pub timeout_secs: u64,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "text-embedding-3-small".to_string(),
            endpoint: None,
            api_key_env: Some("OPENAI_API_KEY".to_string()),
            dimensions: 384,
            batch_size: 100,
            timeout_secs: 60,
        }
    }
}

impl EmbeddingSettings {
    /// Resolve the API key from the configured environment variable.
    pub fn api_key(&self) -> Option<String> {
        resolve_env(self.api_key_env.as_deref())
    }
}

/// Chat-completion service configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GenerationSettings {
    /// "openai" or "ollama"
    pub provider: String,

    /// Model identifier sent to the service
    pub model: String,

    /// Base URL override
    pub endpoint: Option<String>,

    /// Environment variable holding the API key
    pub api_key_env: Option<String>,

    /// Sampling temperature (0 requests greedy decoding)
    pub temperature: f32,

    /// Upper bound on answer length; unset leaves it to the service
    pub max_tokens: Option<u32>,

    /// HTTP client timeout
    pub timeout_secs: u64,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "gpt-4o-mini".to_string(),
            endpoint: None,
            api_key_env: Some("OPENAI_API_KEY".to_string()),
            temperature: 0.0,
            max_tokens: None,
            timeout_secs: 120,
        }
    }
}

impl GenerationSettings {
    /// Resolve the API key from the configured environment variable.
    pub fn api_key(&self) -> Option<String> {
        resolve_env(self.api_key_env.as_deref())
    }
}

/// Vector store configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IndexSettings {
    /// Connection string (LanceDB URI); relative paths resolve against the workspace
    pub uri: String,

    /// Collection (table) name
    pub collection: String,

    /// Store metadata in a JSON-typed column
    pub json_metadata: bool,
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self {
            uri: ".docent/index".to_string(),
            collection: "documents".to_string(),
            json_metadata: true,
        }
    }
}

/// Chunker configuration, in characters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingSettings {
    pub size: usize,
    pub overlap: usize,
}

impl Default for ChunkingSettings {
    fn default() -> Self {
        Self {
            size: 1000,
            overlap: 150,
        }
    }
}

/// Retrieval configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RetrievalSettings {
    /// Passages fetched per question
    pub top_k: usize,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self { top_k: 10 }
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    document_path: Option<PathBuf>,
    embedding: Option<EmbeddingSettings>,
    generation: Option<GenerationSettings>,
    index: Option<IndexSettings>,
    chunking: Option<ChunkingSettings>,
    retrieval: Option<RetrievalSettings>,
    prompt_id: Option<String>,
    logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            document_path: None,
            embedding: EmbeddingSettings::default(),
            generation: GenerationSettings::default(),
            index: IndexSettings::default(),
            chunking: ChunkingSettings::default(),
            retrieval: RetrievalSettings::default(),
            prompt_id: None,
            log_level: None,
            verbose: false,
            no_color: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from the config file and environment variables.
    ///
    /// Environment variables:
    /// - `DOCENT_DOCUMENT_PATH`: Document to ingest by default
    /// - `DOCENT_EMBEDDING_PROVIDER` / `DOCENT_EMBEDDING_MODEL`
    /// - `DOCENT_CHAT_PROVIDER` / `DOCENT_CHAT_MODEL`
    /// - `DOCENT_INDEX_URI` / `DOCENT_COLLECTION`
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// # Example
    /// ```no_run
    /// use docent_core::config::AppConfig;
    ///
    /// let config = AppConfig::load(None, None).expect("Failed to load config");
    /// println!("Collection: {}", config.index.collection);
    /// ```
    pub fn load(workspace: Option<PathBuf>, config_file: Option<PathBuf>) -> AppResult<Self> {
        Self::load_from(workspace, config_file, |key| std::env::var(key).ok())
    }

    /// Load configuration with an explicit environment lookup.
    pub fn load_from<F>(
        workspace: Option<PathBuf>,
        config_file: Option<PathBuf>,
        env: F,
    ) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(workspace) = workspace {
            config.workspace = workspace;
        }
        config.config_file = config_file;

        // Validate workspace exists
        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = match config.config_file {
            Some(ref cf) => cf.clone(),
            None => config.docent_dir().join("config.yaml"),
        };

        if config_path.exists() {
            config.merge_yaml(&config_path)?;
        } else if config.config_file.is_some() {
            return Err(AppError::Config(format!(
                "Config file not found: {:?}",
                config_path
            )));
        }

        // Environment variables override YAML config
        if let Some(path) = env("DOCENT_DOCUMENT_PATH") {
            config.document_path = Some(PathBuf::from(path));
        }
        if let Some(provider) = env("DOCENT_EMBEDDING_PROVIDER") {
            config.embedding.provider = provider;
        }
        if let Some(model) = env("DOCENT_EMBEDDING_MODEL") {
            config.embedding.model = model;
        }
        if let Some(provider) = env("DOCENT_CHAT_PROVIDER") {
            config.generation.provider = provider;
        }
        if let Some(model) = env("DOCENT_CHAT_MODEL") {
            config.generation.model = model;
        }
        if let Some(uri) = env("DOCENT_INDEX_URI") {
            config.index.uri = uri;
        }
        if let Some(collection) = env("DOCENT_COLLECTION") {
            config.index.collection = collection;
        }
        if let Some(level) = env("RUST_LOG") {
            config.log_level = Some(level);
        }
        if env("NO_COLOR").is_some() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge YAML configuration file into this config.
    fn merge_yaml(&mut self, path: &Path) -> AppResult<()> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        if let Some(document_path) = file.document_path {
            self.document_path = Some(document_path);
        }
        if let Some(embedding) = file.embedding {
            self.embedding = embedding;
        }
        if let Some(generation) = file.generation {
            self.generation = generation;
        }
        if let Some(index) = file.index {
            self.index = index;
        }
        if let Some(chunking) = file.chunking {
            self.chunking = chunking;
        }
        if let Some(retrieval) = file.retrieval {
            self.retrieval = retrieval;
        }
        if let Some(prompt_id) = file.prompt_id {
            self.prompt_id = Some(prompt_id);
        }
        if let Some(logging) = file.logging {
            if let Some(level) = logging.level {
                self.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                self.no_color = !color;
            }
        }

        tracing::debug!("Merged config file {:?}", path);
        Ok(())
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// CLI flags take precedence over environment variables and the config file.
    pub fn with_overrides(
        mut self,
        document_path: Option<PathBuf>,
        chat_model: Option<String>,
        embedding_model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(document_path) = document_path {
            self.document_path = Some(document_path);
        }

        if let Some(model) = chat_model {
            self.generation.model = model;
        }

        if let Some(model) = embedding_model {
            self.embedding.model = model;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Get the path to the .docent directory.
    pub fn docent_dir(&self) -> PathBuf {
        self.workspace.join(".docent")
    }

    /// Ensure the .docent directory exists.
    pub fn ensure_docent_dir(&self) -> AppResult<()> {
        let docent_dir = self.docent_dir();
        if !docent_dir.exists() {
            std::fs::create_dir_all(&docent_dir).map_err(|e| {
                AppError::Config(format!("Failed to create .docent directory: {}", e))
            })?;
        }
        Ok(())
    }

    /// Connection string for the vector store.
    ///
    /// URIs with a scheme (`s3://`, `db://`) are returned untouched; plain
    /// relative paths are anchored at the workspace.
    pub fn index_uri(&self) -> String {
        if self.index.uri.contains("://") || Path::new(&self.index.uri).is_absolute() {
            self.index.uri.clone()
        } else {
            self.workspace.join(&self.index.uri).to_string_lossy().to_string()
        }
    }

    /// Validate configuration before building any service.
    pub fn validate(&self) -> AppResult<()> {
        if !EMBEDDING_PROVIDERS.contains(&self.embedding.provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown embedding provider: {}. Supported: {}",
                self.embedding.provider,
                EMBEDDING_PROVIDERS.join(", ")
            )));
        }

        if !GENERATION_PROVIDERS.contains(&self.generation.provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown chat provider: {}. Supported: {}",
                self.generation.provider,
                GENERATION_PROVIDERS.join(", ")
            )));
        }

        if self.chunking.size == 0 || self.chunking.overlap >= self.chunking.size {
            return Err(AppError::Config(format!(
                "Chunk overlap ({}) must be smaller than chunk size ({})",
                self.chunking.overlap, self.chunking.size
            )));
        }

        if self.retrieval.top_k == 0 {
            return Err(AppError::Config("retrieval.topK must be at least 1".to_string()));
        }

        if self.embedding.batch_size == 0 {
            return Err(AppError::Config(
                "embedding.batchSize must be at least 1".to_string(),
            ));
        }

        if self.index.collection.trim().is_empty() {
            return Err(AppError::Config("index.collection cannot be empty".to_string()));
        }

        Ok(())
    }
}

fn resolve_env(var: Option<&str>) -> Option<String> {
    var.and_then(|name| std::env::var(name).ok())
        .filter(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.embedding.provider, "openai");
        assert_eq!(config.embedding.model, "text-embedding-3-small");
        assert_eq!(config.generation.model, "gpt-4o-mini");
        assert_eq!(config.generation.temperature, 0.0);
        assert_eq!(config.generation.max_tokens, None);
        assert_eq!(config.chunking.size, 1000);
        assert_eq!(config.chunking.overlap, 150);
        assert_eq!(config.retrieval.top_k, 10);
        assert!(config.index.json_metadata);
        assert!(!config.verbose);
    }

    #[test]
    fn test_docent_dir() {
        let config = AppConfig::default();
        assert!(config.docent_dir().ends_with(".docent"));
    }

    #[test]
    fn test_yaml_then_env_layering() {
        let temp = TempDir::new().unwrap();
        let docent_dir = temp.path().join(".docent");
        std::fs::create_dir_all(&docent_dir).unwrap();
        std::fs::write(
            docent_dir.join("config.yaml"),
            r#"
documentPath: manual.pdf
embedding:
  provider: hashing
  dimensions: 64
generation:
  maxTokens: 256
index:
  collection: manuals
retrieval:
  topK: 4
logging:
  color: false
"#,
        )
        .unwrap();

        let env: HashMap<&str, &str> = [("DOCENT_COLLECTION", "from-env")].into_iter().collect();
        let config = AppConfig::load_from(Some(temp.path().to_path_buf()), None, |key| {
            env.get(key).map(|v| v.to_string())
        })
        .unwrap();

        assert_eq!(config.document_path, Some(PathBuf::from("manual.pdf")));
        assert_eq!(config.embedding.provider, "hashing");
        assert_eq!(config.embedding.dimensions, 64);
        // Fields missing from a YAML section fall back to defaults
        assert_eq!(config.embedding.batch_size, 100);
        assert_eq!(config.generation.max_tokens, Some(256));
        assert_eq!(config.generation.model, "gpt-4o-mini");
        assert_eq!(config.retrieval.top_k, 4);
        assert_eq!(config.index.collection, "from-env");
        assert!(config.no_color);
    }

    #[test]
    fn test_missing_explicit_config_file() {
        let temp = TempDir::new().unwrap();
        let result = AppConfig::load_from(
            Some(temp.path().to_path_buf()),
            Some(temp.path().join("absent.yaml")),
            no_env,
        );
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_missing_workspace() {
        let result = AppConfig::load_from(Some(PathBuf::from("/definitely/not/here")), None, no_env);
        assert!(result.is_err());
    }

    #[test]
    fn test_with_overrides() {
        let config = AppConfig::default().with_overrides(
            Some(PathBuf::from("doc.pdf")),
            Some("gpt-4o".to_string()),
            None,
            None,
            true,
            false,
        );

        assert_eq!(config.document_path, Some(PathBuf::from("doc.pdf")));
        assert_eq!(config.generation.model, "gpt-4o");
        assert_eq!(config.embedding.model, "text-embedding-3-small");
        assert!(config.verbose);
        assert_eq!(config.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_index_uri_resolution() {
        let mut config = AppConfig::default();
        config.workspace = PathBuf::from("/work");
        assert_eq!(config.index_uri(), "/work/.docent/index");

        config.index.uri = "s3://bucket/index".to_string();
        assert_eq!(config.index_uri(), "s3://bucket/index");
    }

    #[test]
    fn test_validate_unknown_provider() {
        let mut config = AppConfig::default();
        config.embedding.provider = "unknown".to_string();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.generation.provider = "hashing".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_chunking() {
        let mut config = AppConfig::default();
        config.chunking.overlap = 1000;
        assert!(config.validate().is_err());

        config.chunking.overlap = 150;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_top_k() {
        let mut config = AppConfig::default();
        config.retrieval.top_k = 0;
        assert!(config.validate().is_err());
    }
}
