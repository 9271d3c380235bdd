// src/config/loader.rs
//! Layered configuration loader
//!
//! Resolution order, later layers overriding earlier ones:
//! built-in defaults, every existing file in the search path, then
//! `EMG_`-prefixed environment variables (`__` separates sections, e.g.
//! `EMG_DETECTION__MERGE_THRESHOLD_MS=200`). The merged document is
//! validated before it is returned.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::constants::paths;
use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, AnalysisErrorBuilder, AnalysisResult};

/// Configuration loader
pub struct ConfigLoader {
    config_paths: Vec<PathBuf>,
    apply_environment: bool,
}

impl ConfigLoader {
    /// Create a loader using the standard search path
    pub fn new() -> Self {
        Self {
            config_paths: Self::discover_config_paths(),
            apply_environment: true,
        }
    }

    /// Create loader with custom paths
    pub fn with_paths(paths: Vec<PathBuf>) -> Self {
        Self {
            config_paths: paths,
            apply_environment: true,
        }
    }

    /// Disable `EMG_` environment overrides
    pub fn without_environment(mut self) -> Self {
        self.apply_environment = false;
        self
    }

    /// Paths consulted, in precedence order
    pub fn config_paths(&self) -> &[PathBuf] {
        &self.config_paths
    }

    /// Load, merge and validate the analysis configuration
    pub fn load(&self) -> AnalysisResult<AnalysisConfig> {
        let mut merged = toml::Value::try_from(AnalysisConfig::default())
            .map_err(|e| Self::error("serialize_defaults", &e.to_string()))?;

        for config_path in &self.config_paths {
            if !config_path.exists() {
                continue;
            }
            let file_config = self.load_config_file(config_path)?;
            debug!(path = %config_path.display(), "merging configuration file");
            merge_toml_values(&mut merged, file_config);
        }

        if self.apply_environment {
            apply_environment_overrides(&mut merged, std::env::vars());
        }

        let config: AnalysisConfig = merged
            .try_into()
            .map_err(|e: toml::de::Error| Self::error("deserialize", &e.to_string()))?;
        config.validate()?;

        info!(summary = ?config.get_summary(), "analysis configuration loaded");
        Ok(config)
    }

    /// Validate a single configuration file without loading it
    pub fn validate_config_file<P: AsRef<Path>>(&self, path: P) -> AnalysisResult<()> {
        let value = self.load_config_file(path.as_ref())?;
        let config: AnalysisConfig = value
            .try_into()
            .map_err(|e: toml::de::Error| Self::error("validate_file", &e.to_string()))?;
        config.validate()
    }

    /// Export a configuration to a TOML file
    pub fn export_config<P: AsRef<Path>>(config: &AnalysisConfig, path: P) -> AnalysisResult<()> {
        let toml_content =
            toml::to_string_pretty(config).map_err(|e| Self::error("export", &e.to_string()))?;
        std::fs::write(path, toml_content).map_err(|e| Self::error("export", &e.to_string()))
    }

    fn load_config_file(&self, path: &Path) -> AnalysisResult<toml::Value> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Self::error("read_file", &format!("{}: {}", path.display(), e)))?;
        toml::from_str(&content)
            .map_err(|e: toml::de::Error| Self::error("parse_file", &format!("{}: {}", path.display(), e)))
    }

    fn error(operation: &str, reason: &str) -> AnalysisError {
        AnalysisErrorBuilder::new("config_loader", operation).configuration(reason)
    }

    fn discover_config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(paths::SYSTEM_CONFIG_PATH)];

        if let Some(home_dir) = std::env::var_os("HOME").or_else(|| std::env::var_os("USERPROFILE")) {
            paths.push(PathBuf::from(home_dir).join(paths::USER_CONFIG_DIR).join("config.toml"));
        }

        paths.push(PathBuf::from(paths::DEFAULT_CONFIG_FILE));
        paths.push(PathBuf::from(paths::LOCAL_CONFIG_FILE));
        paths
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn merge_toml_values(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
            for (key, value) in overlay_table {
                if let Some(base_value) = base_table.get_mut(&key) {
                    merge_toml_values(base_value, value);
                } else {
                    base_table.insert(key, value);
                }
            }
        }
        (base_value, overlay_value) => {
            *base_value = overlay_value;
        }
    }
}

fn apply_environment_overrides<I>(config: &mut toml::Value, vars: I)
where
    I: IntoIterator<Item = (String, String)>,
{
    for (key, value) in vars {
        let Some(stripped) = key.strip_prefix(paths::ENV_PREFIX) else {
            continue;
        };
        let path: Vec<String> = stripped
            .split(paths::ENV_SECTION_SEPARATOR)
            .map(|part| part.to_lowercase())
            .collect();
        if path.len() < 2 || path.iter().any(|part| part.is_empty()) {
            warn!(variable = %key, "ignoring malformed configuration override");
            continue;
        }
        debug!(variable = %key, "applying environment override");
        set_nested_value(config, &path, parse_env_value(&value));
    }
}

fn parse_env_value(value: &str) -> toml::Value {
    if let Ok(int_val) = value.parse::<i64>() {
        toml::Value::Integer(int_val)
    } else if let Ok(float_val) = value.parse::<f64>() {
        toml::Value::Float(float_val)
    } else if let Ok(bool_val) = value.parse::<bool>() {
        toml::Value::Boolean(bool_val)
    } else {
        toml::Value::String(value.to_string())
    }
}

fn set_nested_value(config: &mut toml::Value, path: &[String], value: toml::Value) {
    let Some((last, parents)) = path.split_last() else {
        return;
    };

    let mut current = config;
    for part in parents {
        let toml::Value::Table(table) = current else {
            return;
        };
        current = table
            .entry(part.clone())
            .or_insert_with(|| toml::Value::Table(toml::value::Table::new()));
    }

    if let toml::Value::Table(table) = current {
        let value = match (table.get(last), value) {
            // Whole numbers only widen where the current value is a float.
            (Some(toml::Value::Float(_)), toml::Value::Integer(i)) => toml::Value::Float(i as f64),
            (_, value) => value,
        };
        table.insert(last.clone(), value);
    }
}
