//! Rule set loading from `<config_dir>/<name>.json`

use crate::types::RuleConfig;
use scenecheck_core::{Result, SceneCheckError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Rule set used when none is named
pub const DEFAULT_CONFIG: &str = "bg_checks";

/// One available rule set, as shown in listings
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigSummary {
    /// File stem, the name passed to `load_rule_config`
    pub id: String,
    pub name: String,
    pub description: String,
}

#[derive(Deserialize)]
struct ConfigHeader {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: String,
}

pub fn config_path<P: AsRef<Path>>(dir: P, name: &str) -> PathBuf {
    dir.as_ref().join(format!("{}.json", name))
}

/// Load a rule set strictly: a missing or invalid file is an error
pub fn try_load_rule_config<P: AsRef<Path>>(dir: P, name: &str) -> Result<RuleConfig> {
    let path = config_path(dir, name);
    if !path.exists() {
        return Err(SceneCheckError::ConfigError(format!(
            "no rule set at {}",
            path.display()
        )));
    }
    let content = fs::read_to_string(&path)?;
    serde_json::from_str(&content).map_err(|e| {
        SceneCheckError::ConfigError(format!("failed to parse {}: {}", path.display(), e))
    })
}

/// Load a rule set, falling back to the empty default set.
///
/// A missing file is expected (the default set is empty) and logged at debug;
/// an unreadable or invalid file is logged as a warning.
pub fn load_rule_config<P: AsRef<Path>>(dir: P, name: &str) -> RuleConfig {
    let dir = dir.as_ref();
    if !config_path(dir, name).exists() {
        tracing::debug!(dir = %dir.display(), name, "rule set not found; using defaults");
        return RuleConfig::default();
    }
    match try_load_rule_config(dir, name) {
        Ok(config) => {
            tracing::debug!(name, rules = config.rules().len(), "rule set loaded");
            config
        }
        Err(err) => {
            tracing::warn!(name, error = %err, "failed to load rule set; using defaults");
            RuleConfig::default()
        }
    }
}

/// Every readable rule set in the directory, sorted by id.
///
/// A missing directory yields an empty list; unreadable files are skipped.
pub fn list_configs<P: AsRef<Path>>(dir: P) -> Vec<ConfigSummary> {
    let dir = dir.as_ref();
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut configs: Vec<ConfigSummary> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().map(|e| e == "json").unwrap_or(false))
        .filter_map(|path| {
            let id = path.file_stem()?.to_string_lossy().into_owned();
            let header = fs::read_to_string(&path)
                .ok()
                .and_then(|content| serde_json::from_str::<ConfigHeader>(&content).ok());
            match header {
                Some(header) => Some(ConfigSummary {
                    name: header.name.unwrap_or_else(|| id.clone()),
                    description: header.description,
                    id,
                }),
                None => {
                    tracing::debug!(path = %path.display(), "unreadable rule set skipped");
                    None
                }
            }
        })
        .collect();

    configs.sort_by(|a, b| a.id.cmp(&b.id));
    configs
}
