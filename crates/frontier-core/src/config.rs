//! TOML configuration: one versioned store per game.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use frontier_store::GitStoreConfig;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::game::Game;

fn default_remote() -> String {
    "origin".to_string()
}

fn default_author_name() -> String {
    "frontier-archive".to_string()
}

fn default_author_email() -> String {
    "frontier-archive@localhost".to_string()
}

/// Top-level configuration file.
///
/// ```toml
/// [[store]]
/// game = "space_chem"
/// path = "/var/lib/archive/spacechem"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArchiveConfig {
    #[serde(default, rename = "store")]
    pub stores: Vec<StoreConfig>,
}

/// Where one game's archive lives and how commits are attributed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub game: Game,

    /// Root of the cloned working tree.
    pub path: PathBuf,

    #[serde(default = "default_remote")]
    pub remote: String,

    /// Browsable base URL for commit and file links.
    #[serde(default)]
    pub web_url: Option<String>,

    /// Raw-file base URL for archive links.
    #[serde(default)]
    pub raw_url: Option<String>,

    #[serde(default = "default_author_name")]
    pub author_name: String,

    #[serde(default = "default_author_email")]
    pub author_email: String,
}

impl StoreConfig {
    pub fn git_config(&self) -> GitStoreConfig {
        let mut config = GitStoreConfig::new(&self.path)
            .with_author(&self.author_name, &self.author_email);
        config.remote = self.remote.clone();
        config.web_url = self.web_url.clone();
        config.raw_url = self.raw_url.clone();
        config
    }
}

impl ArchiveConfig {
    /// Read and parse a configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;

        let mut seen = BTreeSet::new();
        for store in &config.stores {
            if !seen.insert(store.game) {
                return Err(ConfigError::DuplicateStore(store.game));
            }
        }
        Ok(config)
    }

    pub fn store(&self, game: Game) -> Option<&StoreConfig> {
        self.stores.iter().find(|s| s.game == game)
    }
}
