//! Linter configuration
//!
//! Defines the schema for revisar.yaml configuration files.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration file name looked up at the repository root.
pub const CONFIG_FILE: &str = "revisar.yaml";

/// Main linter configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RevisarConfig {
    /// Rules to enable (if empty, all rules are enabled)
    pub enabled_rules: Vec<String>,

    /// Rules to disable
    pub disabled_rules: Vec<String>,

    /// CI pipeline settings
    pub ci: CiSettings,

    /// Copyright header settings
    pub copyright: CopyrightSettings,

    /// Filename portability settings
    pub filenames: FilenameSettings,

    /// Secret wrapper settings
    pub secrets: SecretsSettings,
}

impl RevisarConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from the repository root or use defaults
    pub fn load_or_default(root: &Path) -> Self {
        let config_path = root.join(CONFIG_FILE);
        if config_path.exists() {
            Self::load(&config_path).unwrap_or_else(|e| {
                tracing::warn!("failed to load {}: {e}", config_path.display());
                Self::default()
            })
        } else {
            Self::default()
        }
    }
}

/// CI pipeline settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CiSettings {
    /// Pipeline entry point, relative to the repository root
    pub entry_point: String,

    /// Files defining e2e test jobs; entries may be glob patterns
    pub job_files: Vec<String>,

    /// Jobs exempt from the change-path requirement
    pub allow_list: Vec<String>,
}

impl Default for CiSettings {
    fn default() -> Self {
        Self {
            entry_point: ".gitlab-ci.yml".to_string(),
            job_files: vec![
                ".gitlab/e2e/e2e.yml".to_string(),
                ".gitlab/e2e/install_packages/*.yml".to_string(),
            ],
            allow_list: Vec::new(),
        }
    }
}

/// Copyright header settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CopyrightSettings {
    /// File extensions to check
    pub extensions: Vec<String>,

    /// Expected header lines, matched at the top of each file
    pub header: Vec<String>,

    /// Glob patterns for files exempt from the header check
    pub exclude: Vec<String>,
}

impl Default for CopyrightSettings {
    fn default() -> Self {
        Self {
            extensions: vec!["go".to_string()],
            header: vec![
                "// Unless explicitly stated otherwise all files in this repository are licensed"
                    .to_string(),
                "// under the Apache License Version 2.0.".to_string(),
            ],
            exclude: Vec::new(),
        }
    }
}

/// Filename portability settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilenameSettings {
    /// Maximum path length supported by the win32 API
    pub max_length: usize,

    /// Approximate checkout prefix length on Windows build machines
    pub prefix_length: usize,

    /// Path prefixes exempt from the length check
    pub length_exempt_prefixes: Vec<String>,
}

impl Default for FilenameSettings {
    fn default() -> Self {
        Self {
            max_length: 255,
            prefix_length: 160,
            length_exempt_prefixes: Vec::new(),
        }
    }
}

/// Secret wrapper settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecretsSettings {
    /// Folders whose files are scanned (path prefix match)
    pub folders: Vec<String>,

    /// Which call sites count as violations
    pub mode: SecretsMode,
}

impl Default for SecretsSettings {
    fn default() -> Self {
        Self {
            folders: vec![
                ".circleci".to_string(),
                ".github".to_string(),
                ".gitlab".to_string(),
                "test".to_string(),
            ],
            mode: SecretsMode::All,
        }
    }
}

/// Filter for secret call violations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SecretsMode {
    /// Report every offending call
    #[default]
    All,
    /// Report only calls not going through the wrapper
    Wrapper,
    /// Report only calls not reading the parameter from an environment variable
    Env,
}
