use crate::quantity::DEFAULT_KEYWORDS;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Quantity-indicator keywords in match-priority order. Order is a
    /// user-visible disambiguation mechanism, so this stays a list.
    #[serde(default = "default_keywords")]
    pub quantity_keywords: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DefaultsConfig {
    /// Default machine tag applied when the command line doesn't pick one
    /// (e.g. "cs" or "ce"). None means every operation must select one.
    #[serde(default)]
    pub machine: Option<String>,

    /// Default path of the party-code CSV.
    #[serde(default)]
    pub parties_csv: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            defaults: DefaultsConfig::default(),
            quantity_keywords: default_keywords(),
        }
    }
}

fn default_keywords() -> Vec<String> {
    DEFAULT_KEYWORDS.iter().map(ToString::to_string).collect()
}

impl Config {
    /// Load config from .plotnamer/config.toml if it exists
    pub fn load() -> Result<Self> {
        if let Ok(cwd) = std::env::current_dir() {
            let config_path = cwd.join(".plotnamer").join("config.toml");
            if config_path.exists() {
                return Self::load_from_path(&config_path);
            }
        }

        Ok(Self::default())
    }

    /// Load config from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save config to a specific path, creating the parent directory on demand
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Add a keyword at the end of the priority list. Keywords are trimmed
    /// and lower-cased; duplicates are rejected. Returns whether it was added.
    pub fn add_keyword(&mut self, keyword: &str) -> bool {
        let keyword = keyword.trim().to_lowercase();
        if keyword.is_empty() || self.quantity_keywords.contains(&keyword) {
            return false;
        }
        self.quantity_keywords.push(keyword);
        true
    }

    /// Remove a keyword. Returns whether it was present.
    pub fn remove_keyword(&mut self, keyword: &str) -> bool {
        let keyword = keyword.trim().to_lowercase();
        let before = self.quantity_keywords.len();
        self.quantity_keywords.retain(|k| k != &keyword);
        self.quantity_keywords.len() != before
    }

    /// Restore the built-in keyword list.
    pub fn reset_keywords(&mut self) {
        self.quantity_keywords = default_keywords();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_has_builtin_keywords() {
        let config = Config::default();
        assert_eq!(
            config.quantity_keywords,
            vec!["copy", "copies", "pcs", "pieces", "x"]
        );
        assert_eq!(config.defaults.machine, None);
    }

    #[test]
    fn load_save_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join(".plotnamer").join("config.toml");

        let mut config = Config::default();
        config.defaults.machine = Some("cs".to_string());
        config.add_keyword("layout");
        config.save_to_path(&config_path).unwrap();

        let loaded = Config::load_from_path(&config_path).unwrap();
        assert_eq!(loaded.defaults.machine, Some("cs".to_string()));
        assert!(loaded.quantity_keywords.contains(&"layout".to_string()));
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let toml_content = r#"
[defaults]
machine = "ce"
"#;
        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.defaults.machine, Some("ce".to_string()));
        assert_eq!(config.quantity_keywords.len(), 5);
    }

    #[test]
    fn add_keyword_normalizes_and_rejects_duplicates() {
        let mut config = Config::default();
        assert!(config.add_keyword("  Layout "));
        assert_eq!(config.quantity_keywords.last().unwrap(), "layout");
        assert!(!config.add_keyword("layout"));
        assert!(!config.add_keyword("copy"));
        assert!(!config.add_keyword("  "));
    }

    #[test]
    fn remove_and_reset() {
        let mut config = Config::default();
        assert!(config.remove_keyword("copy"));
        assert!(!config.remove_keyword("copy"));
        config.reset_keywords();
        assert_eq!(config.quantity_keywords.len(), 5);
    }

    #[test]
    fn keyword_order_is_preserved() {
        let mut config = Config::default();
        config.add_keyword("layout");
        config.add_keyword("design");
        let tail: Vec<_> = config
            .quantity_keywords
            .iter()
            .rev()
            .take(2)
            .rev()
            .collect();
        assert_eq!(tail, vec!["layout", "design"]);
    }
}
