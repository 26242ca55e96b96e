use crate::io;
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Project-level configuration, overlaying defaults with
/// `.kaizen/config.json` when present. Every field defaults, so a partial
/// config file only overrides what it mentions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub version: String,
    pub pdca: PdcaSettings,
    pub task_classification: ClassificationSettings,
    pub conventions: Conventions,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PdcaSettings {
    pub match_rate_threshold: f64,
    pub max_iterations: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClassificationSettings {
    pub quick_fix: u32,
    pub minor_change: u32,
    pub feature: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Conventions {
    pub components: String,
    pub functions: String,
    pub constants: String,
    pub files: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0.0".to_string(),
            pdca: PdcaSettings::default(),
            task_classification: ClassificationSettings::default(),
            conventions: Conventions::default(),
        }
    }
}

impl Default for PdcaSettings {
    fn default() -> Self {
        Self {
            match_rate_threshold: 90.0,
            max_iterations: 5,
        }
    }
}

impl Default for ClassificationSettings {
    fn default() -> Self {
        Self {
            quick_fix: 10,
            minor_change: 50,
            feature: 200,
        }
    }
}

impl Default for Conventions {
    fn default() -> Self {
        Self {
            components: "PascalCase".to_string(),
            functions: "camelCase".to_string(),
            constants: "UPPER_SNAKE_CASE".to_string(),
            files: "kebab-case".to_string(),
        }
    }
}

impl Config {
    /// Load the project config. Missing or unreadable files are logged and
    /// fall back to defaults rather than failing the workflow.
    pub async fn load(root: &Path) -> Config {
        let path = paths::config_path(root);
        if io::file_exists(&path).await {
            match io::read_json::<Config>(&path).await {
                Ok(config) => return config,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "unreadable config, using defaults");
                }
            }
        }
        Config::default()
    }

    /// Structural sanity checks beyond what serde enforces.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if !(0.0..=100.0).contains(&self.pdca.match_rate_threshold) {
            errors.push("pdca.matchRateThreshold must be within 0..=100".to_string());
        }
        if self.pdca.max_iterations == 0 {
            errors.push("pdca.maxIterations must be at least 1".to_string());
        }
        let t = &self.task_classification;
        if !(t.quick_fix < t.minor_change && t.minor_change < t.feature) {
            errors.push("taskClassification thresholds must be strictly increasing".to_string());
        }
        errors
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
