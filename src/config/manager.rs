use super::{search::SearchConfig, traits::ConfigSection};
use crate::error::SynthesisError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, RwLock};

pub const ENV_PREFIX: &str = "TYPESYNTH";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub search: SearchConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), SynthesisError> {
        self.search.validate().map_err(|e| match e {
            SynthesisError::Configuration(msg) => {
                SynthesisError::Configuration(format!("[{}] {}", SearchConfig::section_name(), msg))
            }
            other => other,
        })
    }

    /// Layer defaults, an optional file and `TYPESYNTH_*` environment
    /// variables (`TYPESYNTH_SEARCH__ITERATIONS=500`).
    pub fn layered(path: Option<&Path>) -> Result<Self, SynthesisError> {
        let mut builder = ::config::Config::builder()
            .add_source(::config::Config::try_from(&AppConfig::default())?);

        if let Some(path) = path {
            builder = builder.add_source(::config::File::from(path).required(true));
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: AppConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }
}

pub struct ConfigManager {
    config: Arc<RwLock<AppConfig>>,
}

impl ConfigManager {
    pub fn new() -> Self {
        Self {
            config: Arc::new(RwLock::new(AppConfig::default())),
        }
    }

    /// Replace the current configuration with the layered result of
    /// defaults, `path` and the environment.
    pub fn load_from_file<P: AsRef<Path>>(&self, path: P) -> Result<(), SynthesisError> {
        let config = AppConfig::layered(Some(path.as_ref())).map_err(|e| {
            SynthesisError::Configuration(format!(
                "Failed to load config {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        *self.config.write().unwrap_or_else(|e| e.into_inner()) = config;
        Ok(())
    }

    /// Defaults plus environment only.
    pub fn load_from_env(&self) -> Result<(), SynthesisError> {
        let config = AppConfig::layered(None)?;
        *self.config.write().unwrap_or_else(|e| e.into_inner()) = config;
        Ok(())
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), SynthesisError> {
        let config = self.get();
        let toml_str = toml::to_string_pretty(&config)
            .map_err(|e| SynthesisError::Configuration(format!("Failed to serialize: {}", e)))?;

        std::fs::write(path, toml_str)
            .map_err(|e| SynthesisError::Configuration(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    pub fn get(&self) -> AppConfig {
        self.config.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Apply `f`, keeping the previous configuration if the result is invalid.
    pub fn update<F>(&self, f: F) -> Result<(), SynthesisError>
    where
        F: FnOnce(&mut AppConfig),
    {
        let mut config = self.config.write().unwrap_or_else(|e| e.into_inner());
        let mut updated = config.clone();
        f(&mut updated);
        updated.validate()?;
        *config = updated;
        Ok(())
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::search::TournamentOrder;

    #[test]
    fn test_update_rejects_invalid_values() {
        let manager = ConfigManager::new();
        let result = manager.update(|c| c.search.argument_rate = f64::NAN);
        assert!(matches!(
            result,
            Err(SynthesisError::Configuration(msg)) if msg.starts_with("[search]")
        ));
        assert_eq!(manager.get().search.argument_rate, 0.7);
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("typesynth.toml");

        let manager = ConfigManager::new();
        manager
            .update(|c| {
                c.search.iterations = 42;
                c.search.seed = Some(7);
                c.search.tournament_order = TournamentOrder::Parsimonious;
            })
            .unwrap();
        manager.save_to_file(&path).unwrap();

        let loaded = ConfigManager::new();
        loaded.load_from_file(&path).unwrap();
        let search = loaded.get().search;
        assert_eq!(search.iterations, 42);
        assert_eq!(search.seed, Some(7));
        assert_eq!(search.tournament_order, TournamentOrder::Parsimonious);
    }
}
