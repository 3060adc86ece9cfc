//! Configuration management for grcrag
//!
//! Provides TOML-based configuration with defaults and validation.
//! Location: ~/.grcrag/config.toml

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use crate::errors::{RagError, Result};

/// Complete configuration for grcrag
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub ollama: OllamaConfig,
    pub indexing: IndexingConfig,
    pub search: SearchConfig,
    pub sessions: SessionsConfig,
    pub paths: PathsConfig,
    pub logging: LoggingConfig,
}

/// Ollama connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OllamaConfig {
    pub host: String,
    pub port: u16,
    pub chat_model: String,
    pub embed_model: String,
    pub request_timeout_secs: u64,
    /// Total embedding attempts per chunk (1 = no retry)
    pub embed_attempts: u32,
}

/// Document indexing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexingConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub file_batch_size: usize,
    /// Used when no DOCS_PATH setting has been stored
    pub default_docs_path: String,
}

/// Retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub top_k: usize,
    pub max_context_chars: usize,
}

/// Chat session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionsConfig {
    pub ttl_minutes: u64,
    pub max_messages: usize,
}

/// File system paths configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub state_dir: String,
}

/// Log output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ollama: OllamaConfig::default(),
            indexing: IndexingConfig::default(),
            search: SearchConfig::default(),
            sessions: SessionsConfig::default(),
            paths: PathsConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 11434,
            chat_model: "llama3".to_string(),
            embed_model: "nomic-embed-text".to_string(),
            request_timeout_secs: 120,
            embed_attempts: 1,
        }
    }
}

impl Default for IndexingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
            file_batch_size: 2,
            default_docs_path: "~/grc/normes".to_string(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            top_k: 3,
            max_context_chars: 6000,
        }
    }
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self {
            ttl_minutes: 30,
            max_messages: 20,
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            state_dir: "~/.grcrag".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl Config {
    /// Load configuration from file or use defaults, then apply env overrides
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let mut config = if let Some(config_path) = path {
            Self::load_from_file(&config_path)?
        } else {
            Self::load_default()?
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from specific file
    pub fn load_from_file(path: &PathBuf) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| RagError::ConfigError(format!("Failed to read config: {}", e)))?;

        let config: Config = toml::from_str(&contents)
            .map_err(|e| RagError::ConfigError(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Load default configuration from standard location or use built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Some(home) = dirs::home_dir() {
            let config_path = home.join(".grcrag").join("config.toml");
            if config_path.exists() {
                return Self::load_from_file(&config_path);
            }
        }

        Ok(Config::default())
    }

    /// `OLLAMA_MODEL` and `OLLAMA_EMBED_MODEL` take precedence over the file
    pub fn apply_env_overrides(&mut self) {
        if let Ok(model) = std::env::var("OLLAMA_MODEL") {
            if !model.trim().is_empty() {
                self.ollama.chat_model = model;
            }
        }
        if let Ok(model) = std::env::var("OLLAMA_EMBED_MODEL") {
            if !model.trim().is_empty() {
                self.ollama.embed_model = model;
            }
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.indexing.chunk_size == 0 {
            return Err(RagError::ConfigError(
                "chunk_size must be greater than 0".to_string()
            ));
        }

        if self.indexing.chunk_overlap >= self.indexing.chunk_size {
            return Err(RagError::ConfigError(
                "chunk_overlap must be less than chunk_size".to_string()
            ));
        }

        if self.indexing.file_batch_size == 0 {
            return Err(RagError::ConfigError(
                "file_batch_size must be greater than 0".to_string()
            ));
        }

        if self.search.top_k == 0 {
            return Err(RagError::ConfigError(
                "top_k must be greater than 0".to_string()
            ));
        }

        if self.ollama.embed_attempts == 0 {
            return Err(RagError::ConfigError(
                "embed_attempts must be at least 1".to_string()
            ));
        }

        match self.logging.level.as_str() {
            "error" | "warn" | "info" | "debug" | "trace" => {}
            _ => return Err(RagError::ConfigError(
                format!("Invalid log level: {}", self.logging.level)
            )),
        }

        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self, path: &PathBuf) -> Result<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| RagError::ConfigError(format!("Failed to serialize config: {}", e)))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| RagError::ConfigError(format!("Failed to create config dir: {}", e)))?;
        }

        std::fs::write(path, contents)
            .map_err(|e| RagError::ConfigError(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    /// Get Ollama base URL
    pub fn ollama_url(&self) -> String {
        format!("http://{}:{}", self.ollama.host, self.ollama.port)
    }

    /// Expand tilde in paths
    pub fn expand_path(path: &str) -> PathBuf {
        if let Some(rest) = path.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(rest);
            }
        }
        PathBuf::from(path)
    }

    /// Get state directory path
    pub fn state_dir(&self) -> PathBuf {
        Self::expand_path(&self.paths.state_dir)
    }

    /// Vector database file
    pub fn vector_db_path(&self) -> PathBuf {
        self.state_dir().join("storage").join("vector_db.json")
    }

    /// Persisted key/value settings file
    pub fn settings_path(&self) -> PathBuf {
        self.state_dir().join("settings.json")
    }

    /// Fallback document root
    pub fn default_docs_path(&self) -> PathBuf {
        Self::expand_path(&self.indexing.default_docs_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.ollama.host, "127.0.0.1");
        assert_eq!(config.ollama.port, 11434);
        assert_eq!(config.ollama.embed_model, "nomic-embed-text");
        assert_eq!(config.indexing.chunk_size, 1000);
        assert_eq!(config.indexing.chunk_overlap, 200);
        assert_eq!(config.search.top_k, 3);
    }

    #[test]
    fn test_config_validation_success() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_overlap() {
        let mut config = Config::default();
        config.indexing.chunk_overlap = 1000;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_zero_chunk() {
        let mut config = Config::default();
        config.indexing.chunk_size = 0;
        config.indexing.chunk_overlap = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_log_level() {
        let mut config = Config::default();
        config.logging.level = "loud".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "[search]\ntop_k = 5\n").unwrap();

        let config = Config::load_from_file(&path).unwrap();
        assert_eq!(config.search.top_k, 5);
        assert_eq!(config.indexing.chunk_size, 1000);
        assert_eq!(config.ollama.chat_model, "llama3");
    }

    #[test]
    fn test_save_and_reload() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("config.toml");
        let mut config = Config::default();
        config.ollama.chat_model = "mistral".to_string();
        config.save(&path).unwrap();

        let loaded = Config::load_from_file(&path).unwrap();
        assert_eq!(loaded.ollama.chat_model, "mistral");
    }

    #[test]
    fn test_ollama_url() {
        let config = Config::default();
        assert_eq!(config.ollama_url(), "http://127.0.0.1:11434");
    }

    #[test]
    fn test_vector_db_path_under_state_dir() {
        let mut config = Config::default();
        config.paths.state_dir = "/var/lib/grcrag".to_string();
        assert_eq!(
            config.vector_db_path(),
            PathBuf::from("/var/lib/grcrag/storage/vector_db.json")
        );
    }

    #[test]
    fn test_expand_path_without_tilde() {
        let path = "/absolute/path";
        let expanded = Config::expand_path(path);
        assert_eq!(expanded.to_string_lossy(), path);
    }
}
