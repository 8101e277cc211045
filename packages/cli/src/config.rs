use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_CONFIG_NAME: &str = "apicollab.config.json";

/// apicollab configuration file format
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// `tracing` filter directive used when `RUST_LOG` is not set
    #[serde(default = "default_log_filter")]
    pub log_filter: String,

    /// Pretty-print documents written by `replay`
    #[serde(default = "default_pretty")]
    pub pretty: bool,

    /// Let `verify` also try every arrival order of the journal
    #[serde(default)]
    pub check_permutations: bool,

    /// Journals with more finalized commands than this skip the permutation check
    #[serde(default = "default_max_permutation_commands")]
    pub max_permutation_commands: usize,
}

fn default_log_filter() -> String {
    "warn".to_string()
}

fn default_pretty() -> bool {
    true
}

fn default_max_permutation_commands() -> usize {
    7
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &str) -> anyhow::Result<Self> {
        let config_path = Self::path(cwd);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            // Return default config if none exists
            Ok(Config::default())
        }
    }

    pub fn path(cwd: &str) -> PathBuf {
        PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter(),
            pretty: default_pretty(),
            check_permutations: false,
            max_permutation_commands: default_max_permutation_commands(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let json = r#"{
            "logFilter": "apicollab_editor=debug",
            "pretty": false,
            "checkPermutations": true
        }"#;

        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.log_filter, "apicollab_editor=debug");
        assert!(!config.pretty);
        assert!(config.check_permutations);
        assert_eq!(config.max_permutation_commands, 7);
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.log_filter, "warn");
        assert!(config.pretty);
        assert!(!config.check_permutations);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = std::env::temp_dir().join("apicollab-config-missing");
        let config = Config::load(&dir.display().to_string()).unwrap();
        assert_eq!(config.log_filter, "warn");
    }
}
