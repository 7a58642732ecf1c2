//! Configuration schema for Zani
//!
//! Global configuration lives at `~/.config/zani/config.toml`; a project may
//! override any table with a `.zani.toml` at or above the workspace root.

use serde::{Deserialize, Serialize};

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Remote model settings
    pub model: ModelConfig,

    /// Explicit context cache thresholds
    pub explicit_cache: CacheConfig,

    /// Workspace scanning settings
    pub workspace: WorkspaceConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: String,

    /// Enable audit logging of cache lifecycle events
    pub audit_log: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
            audit_log: true,
        }
    }
}

/// Remote model settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Model name the cache is built for
    pub name: String,

    /// Environment variable holding the API key
    pub api_key_env: String,

    /// Base URL of the Generative Language API
    pub endpoint: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: "gemini-3-flash-preview".to_string(),
            api_key_env: "GOOGLE_API_KEY".to_string(),
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
        }
    }
}

/// Explicit cache creation and invalidation thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Minimum project size (tokens) before offering to create a cache
    pub min_tokens: u64,

    /// Cache lifetime in hours
    pub ttl_hours: u32,

    /// Drift percentage that forces a rebuild
    pub force_percent: f64,

    /// Changed tokens that force a rebuild
    pub force_tokens: u64,

    /// Drift percentage that recommends a rebuild
    pub recommend_percent: f64,

    /// Changed tokens that recommend a rebuild
    pub recommend_tokens: u64,

    /// Relative paths whose change always forces a rebuild
    pub critical_files: Vec<String>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            min_tokens: 4096,
            ttl_hours: 1,
            force_percent: 30.0,
            force_tokens: 50_000,
            recommend_percent: 10.0,
            recommend_tokens: 10_000,
            critical_files: vec![],
        }
    }
}

/// Workspace scanning settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkspaceConfig {
    /// Directory names never descended into
    pub static_ignore: Vec<String>,

    /// Files larger than this are not considered source
    pub max_file_size_kb: u64,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            static_ignore: [".git", "venv", ".venv", "node_modules", "target", ".zani"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            max_file_size_kb: 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = Config::default();
        let toml = toml::to_string_pretty(&config).unwrap();
        assert!(toml.contains("[general]"));
        assert!(toml.contains("[explicit_cache]"));
    }

    #[test]
    fn config_deserializes_empty() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.explicit_cache.min_tokens, 4096);
        assert_eq!(config.model.api_key_env, "GOOGLE_API_KEY");
    }

    #[test]
    fn config_deserializes_partial() {
        let toml = r#"
            [explicit_cache]
            force_percent = 50.0
            critical_files = ["Cargo.toml"]
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.explicit_cache.force_percent, 50.0);
        assert_eq!(config.explicit_cache.critical_files, vec!["Cargo.toml"]);
        assert_eq!(config.explicit_cache.recommend_percent, 10.0); // default preserved
        assert_eq!(config.workspace.max_file_size_kb, 500);
    }
}
