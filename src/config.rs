use crate::domain::Preferences;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "gitpane";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub config_version: u32,
    pub path_separator: String,
    pub commit_limit: usize,
    pub prune_on_fetch: bool,
    pub log_file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let preferences = Preferences::default();
        Self {
            config_version: 1,
            path_separator: "/".to_string(),
            commit_limit: preferences.commit_limit,
            prune_on_fetch: preferences.prune_on_fetch,
            log_file: None,
        }
    }
}

impl AppConfig {
    pub fn load_or_default() -> Result<Self> {
        let path = config_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(&path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;

        let parsed = toml::from_str::<AppConfig>(&raw)
            .with_context(|| format!("failed to parse config: {}", path.display()))?;

        Ok(parsed)
    }

    pub fn save(&self) -> Result<PathBuf> {
        let path = config_path()?;
        ensure_parent_dir(&path)?;

        let body = toml::to_string_pretty(self).context("failed to serialize config")?;
        fs::write(&path, body)
            .with_context(|| format!("failed to write config: {}", path.display()))?;

        Ok(path)
    }

    pub fn preferences(&self) -> Preferences {
        Preferences {
            commit_limit: self.commit_limit,
            prune_on_fetch: self.prune_on_fetch,
        }
    }

    pub fn apply_preferences(&mut self, preferences: Preferences) {
        self.commit_limit = preferences.commit_limit;
        self.prune_on_fetch = preferences.prune_on_fetch;
    }

    pub fn log_file_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.log_file {
            return Ok(path.clone());
        }
        let base = dirs::data_local_dir().context("could not resolve data directory")?;
        Ok(base.join(APP_DIR).join("gitpane.log"))
    }
}

pub fn config_path() -> Result<PathBuf> {
    let base = dirs::config_dir().context("could not resolve config directory")?;
    Ok(base.join(APP_DIR).join("config.toml"))
}

pub(crate) fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory: {}", parent.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_values_are_safe() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.config_version, 1);
        assert_eq!(cfg.path_separator, "/");
        assert_eq!(cfg.preferences(), Preferences::default());
        assert!(cfg.log_file.is_none());
    }

    #[test]
    fn config_without_new_fields_is_deserialized_with_defaults() {
        let raw = r#"
config_version = 1
path_separator = "/"
"#;

        let cfg = toml::from_str::<AppConfig>(raw).expect("parse minimal config");
        assert_eq!(cfg.commit_limit, Preferences::default().commit_limit);
        assert!(!cfg.prune_on_fetch);
    }

    #[test]
    fn preferences_round_trip_through_config() {
        let mut cfg = AppConfig::default();
        cfg.apply_preferences(Preferences {
            commit_limit: 42,
            prune_on_fetch: true,
        });
        let body = toml::to_string_pretty(&cfg).expect("serialize");
        let parsed = toml::from_str::<AppConfig>(&body).expect("parse");
        assert_eq!(
            parsed.preferences(),
            Preferences {
                commit_limit: 42,
                prune_on_fetch: true,
            }
        );
    }

    #[test]
    fn explicit_log_file_wins() {
        let cfg = AppConfig {
            log_file: Some(PathBuf::from("/tmp/gitpane-test.log")),
            ..AppConfig::default()
        };
        assert_eq!(
            cfg.log_file_path().expect("path"),
            PathBuf::from("/tmp/gitpane-test.log")
        );
    }
}
