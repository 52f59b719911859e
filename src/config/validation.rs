//! Configuration validation module
//!
//! This module provides validation functions for application configuration
//! to ensure all required settings are properly configured.

use crate::utils::errors::{Result, SkillhubError};

use super::Settings;

/// Validate all configuration settings
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_database_config(&settings.database)?;
    validate_storage_config(&settings.storage)?;
    validate_logging_config(&settings.logging)?;

    Ok(())
}

/// Validate database configuration
fn validate_database_config(config: &super::DatabaseConfig) -> Result<()> {
    if config.url.is_empty() {
        return Err(SkillhubError::Config(
            "Database URL is required".to_string(),
        ));
    }

    if config.max_connections == 0 {
        return Err(SkillhubError::Config(
            "Max connections must be greater than 0".to_string(),
        ));
    }

    if config.min_connections > config.max_connections {
        return Err(SkillhubError::Config(
            "Min connections cannot be greater than max connections".to_string(),
        ));
    }

    Ok(())
}

/// Validate attachment storage configuration
fn validate_storage_config(config: &super::StorageConfig) -> Result<()> {
    if config.root_dir.as_os_str().is_empty() {
        return Err(SkillhubError::Config(
            "Storage root directory is required".to_string(),
        ));
    }

    if config.max_file_size <= 0 {
        return Err(SkillhubError::Config(
            "Max file size must be greater than 0".to_string(),
        ));
    }

    if config.max_files_per_request == 0 {
        return Err(SkillhubError::Config(
            "Max files per request must be greater than 0".to_string(),
        ));
    }

    for namespace in config.namespaces.values() {
        if namespace.is_empty() || namespace.contains("..") || namespace.contains('/') {
            return Err(SkillhubError::Config(format!(
                "Invalid storage namespace: {:?}",
                namespace
            )));
        }
    }

    Ok(())
}

/// Validate logging configuration
fn validate_logging_config(config: &super::LoggingConfig) -> Result<()> {
    if config.level.is_empty() {
        return Err(SkillhubError::Config(
            "Logging level is required".to_string(),
        ));
    }

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.level.as_str()) {
        return Err(SkillhubError::Config(format!(
            "Invalid logging level: {}",
            config.level
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::AttachmentCategory;

    #[test]
    fn test_default_settings_are_valid() {
        let settings = Settings::default();
        assert!(validate_settings(&settings).is_ok());
    }

    #[test]
    fn test_empty_database_url_rejected() {
        let mut settings = Settings::default();
        settings.database.url = String::new();
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn test_traversal_namespace_rejected() {
        let mut settings = Settings::default();
        settings
            .storage
            .namespaces
            .insert(AttachmentCategory::Posts, "../outside".to_string());
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn test_unknown_logging_level_rejected() {
        let mut settings = Settings::default();
        settings.logging.level = "verbose".to_string();
        assert!(validate_settings(&settings).is_err());
    }
}
