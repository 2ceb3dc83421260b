use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use pvault_history::HistoryConfig;

/// Config file picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "pvault.toml";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// JSON file holding processes, versions and profiles.
    pub store_path: PathBuf,
    /// JSON file holding assistant agent configurations.
    pub agents_path: PathBuf,
    /// User id recorded as the author of new versions.
    pub author: String,
    pub history: HistoryConfig,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from("pvault.json"),
            agents_path: PathBuf::from("agents.json"),
            author: "local".into(),
            history: HistoryConfig::default(),
        }
    }
}

impl CliConfig {
    /// Load `explicit` (which must exist), else `pvault.toml` if present,
    /// else defaults. Relative store paths resolve against the config file.
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !fallback.exists() {
                    return Ok(Self::default());
                }
                fallback
            }
        };

        let source = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let mut config = Self::from_toml_str(&source)
            .with_context(|| format!("parsing config {}", path.display()))?;
        if let Some(base) = path.parent() {
            config.store_path = base.join(&config.store_path);
            config.agents_path = base.join(&config.agents_path);
        }
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Parse and check a TOML configuration.
    pub fn from_toml_str(source: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(source)?;
        anyhow::ensure!(config.history.board_page_size > 0, "history.board_page_size must be at least 1");
        anyhow::ensure!(!config.author.trim().is_empty(), "author must not be empty");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use pvault_types::VersionStatus;

    use super::*;

    #[test]
    fn default_config() {
        let c = CliConfig::default();
        assert_eq!(c.store_path, PathBuf::from("pvault.json"));
        assert_eq!(c.agents_path, PathBuf::from("agents.json"));
        assert_eq!(c.author, "local");
        assert_eq!(c.history, HistoryConfig::default());
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let c = CliConfig::from_toml_str(
            r#"
author = "ana"

[history]
default_status = "draft"
board_page_size = 20
"#,
        )
        .unwrap();
        assert_eq!(c.author, "ana");
        assert_eq!(c.history.default_status, VersionStatus::Draft);
        assert_eq!(c.history.board_page_size, 20);
        assert!(c.history.serialize_creates);
        assert_eq!(c.store_path, PathBuf::from("pvault.json"));
    }

    #[test]
    fn rejects_bad_values() {
        assert!(CliConfig::from_toml_str("[history]\nboard_page_size = 0").is_err());
        assert!(CliConfig::from_toml_str("author = \" \"").is_err());
        assert!(CliConfig::from_toml_str("author = 3").is_err());
    }

    #[test]
    fn paths_resolve_against_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pvault.toml");
        std::fs::write(&path, "store_path = \"data/store.json\"\n").unwrap();

        let c = CliConfig::load(Some(&path)).unwrap();
        assert_eq!(c.store_path, dir.path().join("data/store.json"));
        assert_eq!(c.agents_path, dir.path().join("agents.json"));

        assert!(CliConfig::load(Some(&dir.path().join("missing.toml"))).is_err());
    }
}
