use serde::{Deserialize, Serialize};

use super::section::Palette;

/// Configuration from config.toml in the data directory
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub palette: Palette,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Prefix of the three record keys (`<prefix>:categories`, ...)
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            key_prefix: default_key_prefix(),
        }
    }
}

fn default_key_prefix() -> String {
    "todo".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiConfig {
    /// Print today's date above `tl list`
    #[serde(default = "default_true")]
    pub show_date: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        UiConfig { show_date: true }
    }
}

fn default_true() -> bool {
    true
}
