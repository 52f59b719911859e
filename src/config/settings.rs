//! Application settings management
//!
//! This module defines the configuration structure and provides methods
//! for loading settings from TOML files and environment variables.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Logical attachment category, each mapped to its own storage namespace.
///
/// The namespace is configuration, never derived from a request path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentCategory {
    Workshops,
    Events,
    Posts,
    Services,
}

impl AttachmentCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttachmentCategory::Workshops => "workshops",
            AttachmentCategory::Events => "events",
            AttachmentCategory::Posts => "posts",
            AttachmentCategory::Services => "services",
        }
    }
}

/// Main application configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

/// Attachment storage configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Root directory under which every namespace lives.
    pub root_dir: PathBuf,
    /// Category -> subdirectory mapping.
    pub namespaces: HashMap<AttachmentCategory, String>,
    /// Per-file size ceiling in bytes.
    pub max_file_size: i64,
    /// File count ceiling per mutation.
    pub max_files_per_request: usize,
}

impl StorageConfig {
    /// Resolve the namespace directory name for a category.
    pub fn namespace(&self, category: AttachmentCategory) -> &str {
        self.namespaces
            .get(&category)
            .map(String::as_str)
            .unwrap_or_else(|| category.as_str())
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub file_path: String,
}

impl Settings {
    /// Load settings from configuration file and environment variables
    pub fn new() -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name("config").required(false))
            .add_source(config::Environment::with_prefix("SKILLHUB"))
            .build()?;

        settings.try_deserialize()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), crate::utils::errors::SkillhubError> {
        super::validation::validate_settings(self)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "postgresql://localhost/skillhub".to_string(),
                max_connections: 10,
                min_connections: 1,
            },
            storage: StorageConfig::default(),
            logging: LoggingConfig {
                level: "info".to_string(),
                file_path: "/var/log/skillhub".to_string(),
            },
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        let namespaces = [
            AttachmentCategory::Workshops,
            AttachmentCategory::Events,
            AttachmentCategory::Posts,
            AttachmentCategory::Services,
        ]
        .into_iter()
        .map(|category| (category, category.as_str().to_string()))
        .collect();

        Self {
            root_dir: PathBuf::from("uploads"),
            namespaces,
            max_file_size: 10 * 1024 * 1024,
            max_files_per_request: 5,
        }
    }
}
