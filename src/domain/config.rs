use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Planner settings, stored as `planner.toml` in the workspace root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct Config {
    /// Directory holding one catalog JSON document per subject, relative to
    /// the workspace root.
    catalog_dir: PathBuf,

    /// The persisted cart, relative to the workspace root.
    cart_file: PathBuf,

    /// Term used when a command does not name one.
    pub default_term: Option<String>,
}

/// Errors reading or writing the config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("Failed to read config file: {0}")]
    Read(#[source] std::io::Error),
    /// The file is not a valid config.
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    /// The config could not be rendered as TOML.
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    /// The file could not be written.
    #[error("Failed to write config file: {0}")]
    Write(#[source] std::io::Error),
    /// A `config set` key that does not exist.
    #[error("Unknown config key '{0}'")]
    UnknownKey(String),
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog_dir: default_catalog_dir(),
            cart_file: default_cart_file(),
            default_term: None,
        }
    }
}

impl Config {
    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Read)?;
        Ok(toml::from_str(&content)?)
    }

    /// Saves the configuration to a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized to TOML or if
    /// the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(ConfigError::Write)
    }

    /// Catalog directory, relative to the workspace root.
    #[must_use]
    pub fn catalog_dir(&self) -> &Path {
        &self.catalog_dir
    }

    /// Cart file, relative to the workspace root.
    #[must_use]
    pub fn cart_file(&self) -> &Path {
        &self.cart_file
    }

    /// Set a value by key, as given on the command line.
    ///
    /// An empty value clears `default_term`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownKey`] for anything other than
    /// `catalog_dir`, `cart_file` or `default_term`.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "catalog_dir" => self.catalog_dir = PathBuf::from(value),
            "cart_file" => self.cart_file = PathBuf::from(value),
            "default_term" => {
                self.default_term = Some(value.trim().to_string()).filter(|t| !t.is_empty());
            }
            other => return Err(ConfigError::UnknownKey(other.to_string())),
        }
        Ok(())
    }
}

fn default_catalog_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_cart_file() -> PathBuf {
    PathBuf::from("cart.json")
}

/// The serialized versions of the configuration.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default = "default_catalog_dir")]
        catalog_dir: PathBuf,

        #[serde(default = "default_cart_file")]
        cart_file: PathBuf,

        #[serde(default, skip_serializing_if = "Option::is_none")]
        default_term: Option<String>,
    },
}

impl From<Versions> for Config {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                catalog_dir,
                cart_file,
                default_term,
            } => Self {
                catalog_dir,
                cart_file,
                default_term,
            },
        }
    }
}

impl From<Config> for Versions {
    fn from(config: Config) -> Self {
        Self::V1 {
            catalog_dir: config.catalog_dir,
            cart_file: config.cart_file,
            default_term: config.default_term,
        }
    }
}
