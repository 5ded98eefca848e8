use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use scriptable_api::Value;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::container::RunPolicy;

const APP_NAME: &str = "scriptable";

#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("config file not found at {}", .0.display())]
    NotFound(PathBuf),
    #[error("could not determine a config directory")]
    NoConfigDir,
    #[error("IO error on config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("slot {slot} has a null parameter, which TOML cannot store")]
    NullParameter { slot: usize },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Also write logs to a file in the data directory
    #[serde(default)]
    pub file: bool,
}

/// One slot of a configured container.
///
/// TOML has no null, so parameters containing [`Value::Null`] can be used in
/// memory but are rejected by [`ScriptableConfig::save_to`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SlotConfig {
    /// Registered component id; the slot stays empty when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,

    /// Parameters passed to `start`
    #[serde(default)]
    pub start: Vec<Value>,

    /// Parameters passed to `run` on every tick
    #[serde(default)]
    pub run: Vec<Value>,
}

fn default_ticks() -> u32 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerConfig {
    #[serde(default)]
    pub run_policy: RunPolicy,

    /// How many times `run` drives every slot (default: 1)
    #[serde(default = "default_ticks")]
    pub ticks: u32,

    #[serde(default)]
    pub slots: Vec<SlotConfig>,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            run_policy: RunPolicy::default(),
            ticks: default_ticks(),
            slots: Vec::new(),
        }
    }
}

impl ContainerConfig {
    /// Per-slot `run` parameters, in slot order
    pub fn run_parameters(&self) -> Vec<Vec<Value>> {
        self.slots.iter().map(|slot| slot.run.clone()).collect()
    }

    /// Index of the first slot with a null anywhere in its parameters
    fn first_null_slot(&self) -> Option<usize> {
        fn has_null(values: &[Value]) -> bool {
            values.iter().any(|value| match value {
                Value::Null => true,
                Value::List(items) => has_null(items),
                _ => false,
            })
        }

        self.slots
            .iter()
            .position(|slot| has_null(&slot.start) || has_null(&slot.run))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScriptableConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub container: ContainerConfig,
}

impl ScriptableConfig {
    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("", "", APP_NAME)
    }

    pub fn config_path() -> Result<PathBuf, ConfigLoadError> {
        Self::project_dirs()
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .ok_or(ConfigLoadError::NoConfigDir)
    }

    /// Data directory, used for log files
    pub fn data_dir() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.data_dir().to_path_buf())
    }

    /// Load from the default config path
    pub fn load() -> Result<Self, ConfigLoadError> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigLoadError> {
        if !path.exists() {
            return Err(ConfigLoadError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let config = toml::from_str(&content)?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigLoadError> {
        if let Some(slot) = self.container.first_null_slot() {
            return Err(ConfigLoadError::NullParameter { slot });
        }

        // Create parent directories if they don't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(&self)?;
        fs::write(path, content)?;
        info!("Saved config to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_file() {
        let config: ScriptableConfig = toml::from_str("").unwrap();
        assert!(!config.logging.file);
        assert_eq!(config.container.ticks, 1);
        assert_eq!(config.container.run_policy, RunPolicy::Continue);
        assert!(config.container.slots.is_empty());
    }

    #[test]
    fn test_parse_slots() {
        let config: ScriptableConfig = toml::from_str(
            r#"
[container]
run_policy = "halt"
ticks = 3

[[container.slots]]
component = "counter"
start = [5]
run = [1]

[[container.slots]]

[[container.slots]]
component = "seeded"
start = [42]
"#,
        )
        .unwrap();

        let container = &config.container;
        assert_eq!(container.run_policy, RunPolicy::Halt);
        assert_eq!(container.ticks, 3);
        assert_eq!(container.slots.len(), 3);
        assert_eq!(container.slots[0].component.as_deref(), Some("counter"));
        assert_eq!(container.slots[0].start, vec![Value::Int(5)]);
        assert_eq!(container.slots[1], SlotConfig::default());
        assert_eq!(
            container.run_parameters(),
            vec![vec![Value::Int(1)], vec![], vec![]]
        );
    }

    #[test]
    fn test_save_rejects_null_parameters() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = ScriptableConfig::default();
        config.container.slots.push(SlotConfig::default());
        config.container.slots.push(SlotConfig {
            component: Some("echo".into()),
            start: vec![],
            run: vec![Value::List(vec![Value::Int(1), Value::Null])],
        });

        assert!(matches!(
            config.save_to(&path),
            Err(ConfigLoadError::NullParameter { slot: 1 })
        ));
        assert!(!path.exists());

        config.container.slots[1].run = vec![Value::Int(1)];
        config.save_to(&path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_unknown_policy_is_rejected() {
        let result: Result<ScriptableConfig, _> = toml::from_str(
            r#"
[container]
run_policy = "sometimes"
"#,
        );
        assert!(result.is_err());
    }
}
