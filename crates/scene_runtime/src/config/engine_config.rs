//! Engine settings

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::{Config, ConfigError};
use crate::foundation::logging;

/// Engine configuration
///
/// ```toml
/// loading_thread_count = 4
/// log_level = "info"
/// scheduler_path = "resources/scheduler.json"
/// scene_path = "resources/scene.json"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Worker threads used to build scene entities
    pub loading_thread_count: usize,
    /// Bound of the entity construction queue; `None` fits every entity
    pub entity_queue_capacity: Option<usize>,
    /// Default log filter, overridable through `RUST_LOG`
    pub log_level: String,
    /// Scheduler description loaded at start-up
    pub scheduler_path: Option<PathBuf>,
    /// Scene description loaded at start-up
    pub scene_path: Option<PathBuf>,
}

impl EngineConfig {
    /// Create a new engine configuration
    pub fn new() -> Self {
        Self {
            loading_thread_count: 4,
            entity_queue_capacity: None,
            log_level: "info".to_string(),
            scheduler_path: None,
            scene_path: None,
        }
    }

    /// Set the number of scene loading threads
    pub fn with_loading_threads(mut self, count: usize) -> Self {
        self.loading_thread_count = count;
        self
    }

    /// Bound the entity construction queue
    pub fn with_entity_queue_capacity(mut self, capacity: usize) -> Self {
        self.entity_queue_capacity = Some(capacity);
        self
    }

    /// Set log level
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Log filter parsed from `log_level`
    pub fn log_filter(&self) -> log::LevelFilter {
        logging::parse_level(&self.log_level)
    }

    /// Check ranges that serde cannot express
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.loading_thread_count == 0 {
            return Err(ConfigError::Invalid {
                field: "loading_thread_count",
                reason: "at least one loading thread is required".to_string(),
            });
        }
        if self.entity_queue_capacity == Some(0) {
            return Err(ConfigError::Invalid {
                field: "entity_queue_capacity",
                reason: "a bounded queue needs room for at least one entity".to_string(),
            });
        }
        if self.log_level.parse::<log::LevelFilter>().is_err() {
            return Err(ConfigError::Invalid {
                field: "log_level",
                reason: format!("unknown level \"{}\"", self.log_level),
            });
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl Config for EngineConfig {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.loading_thread_count, 4);
        assert!(config.validate().is_ok());
        assert_eq!(config.log_filter(), log::LevelFilter::Info);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: EngineConfig = toml::from_str("log_level = \"debug\"").unwrap();
        assert_eq!(config.loading_thread_count, 4);
        assert_eq!(config.log_filter(), log::LevelFilter::Debug);
    }

    #[test]
    fn test_validate() {
        assert!(matches!(
            EngineConfig::new().with_loading_threads(0).validate(),
            Err(ConfigError::Invalid { field: "loading_thread_count", .. })
        ));
        assert!(EngineConfig::new().with_entity_queue_capacity(0).validate().is_err());
        assert!(EngineConfig::new().with_log_level("loud").validate().is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        let config = EngineConfig::new()
            .with_loading_threads(8)
            .with_entity_queue_capacity(64)
            .with_log_level("warn");
        config.save_to_file(file.path()).unwrap();
        assert_eq!(EngineConfig::load_from_file(file.path()).unwrap(), config);
    }

    #[test]
    fn test_ron_round_trip() {
        let file = tempfile::Builder::new().suffix(".ron").tempfile().unwrap();
        let mut config = EngineConfig::new();
        config.scene_path = Some(PathBuf::from("resources/scene.json"));
        config.save_to_file(file.path()).unwrap();
        assert_eq!(EngineConfig::load_from_file(file.path()).unwrap(), config);
    }

    #[test]
    fn test_unsupported_extension() {
        assert!(matches!(
            EngineConfig::new().save_to_file("engine.yaml"),
            Err(ConfigError::UnsupportedFormat(_))
        ));
    }
}
