//! Configuration for schema derivation and extra metadata.
//!
//! Configuration can be loaded from:
//! - TOML files (default: ~/.config/metagrid/metagrid.toml)
//! - Environment variables (METAGRID_* prefixed)
//!
//! # Example
//!
//! ```rust,no_run
//! use metagrid_core::config::MetagridConfig;
//!
//! // Load from default path or fall back to env vars
//! let config = MetagridConfig::load().expect("Failed to load config");
//!
//! // Or explicitly from a file
//! let config = MetagridConfig::from_file(std::path::Path::new("metagrid.toml")).expect("Failed to load");
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::defaults;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Validation error: {0}")]
    Validation(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Which descendant classes the descendant merger walks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DescendantScope {
    /// Every descendant class.
    #[default]
    All,
    /// Only descendants that are not abstract.
    Active,
}

impl FromStr for DescendantScope {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(Self::All),
            "active" => Ok(Self::Active),
            _ => Err(ConfigError::InvalidValue {
                key: "descendant_scope".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for DescendantScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::Active => write!(f, "active"),
        }
    }
}

/// JSON shape of state selector items.
///
/// `list` emits `[{value, text}]`; `map` emits the legacy `{name: title}`
/// object that older grid clients expect.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemShape {
    #[default]
    List,
    Map,
}

impl FromStr for ItemShape {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "list" => Ok(Self::List),
            "map" => Ok(Self::Map),
            _ => Err(ConfigError::InvalidValue {
                key: "state_items".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for ItemShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::List => write!(f, "list"),
            Self::Map => write!(f, "map"),
        }
    }
}

/// Options of the filter schema deriver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Label of the synthetic descendant column.
    pub descendant_label: String,
    /// Which descendants contribute to the descendant column.
    pub descendant_scope: DescendantScope,
    /// Shape of state selector items.
    pub state_items: ItemShape,
    /// Remote endpoint for user selectors.
    pub user_select_url: String,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            descendant_label: defaults::DESCENDANT_COLUMN_LABEL.to_string(),
            descendant_scope: DescendantScope::All,
            state_items: ItemShape::List,
            user_select_url: defaults::USER_SELECT_URL.to_string(),
        }
    }
}

impl FilterConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.descendant_label.trim().is_empty() {
            return Err(ConfigError::Validation(
                "filter descendant_label cannot be empty".to_string(),
            ));
        }
        if self.user_select_url.is_empty() {
            return Err(ConfigError::Validation(
                "filter user_select_url cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Endpoints and switches used when preparing grid metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtraMetaConfig {
    pub download_url: String,
    pub thumbnail_url: String,
    pub upload_url: String,
    pub delete_url: String,
    /// Route that edits a model; relation cells link here.
    pub update_url: String,
    /// Whether the file storage generates thumbnails.
    pub thumbnails_enabled: bool,
}

impl Default for ExtraMetaConfig {
    fn default() -> Self {
        Self {
            download_url: defaults::DOWNLOAD_URL.to_string(),
            thumbnail_url: defaults::THUMBNAIL_URL.to_string(),
            upload_url: defaults::UPLOAD_URL.to_string(),
            delete_url: defaults::DELETE_URL.to_string(),
            update_url: defaults::UPDATE_URL.to_string(),
            thumbnails_enabled: true,
        }
    }
}

impl ExtraMetaConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        let urls = [
            ("download_url", &self.download_url),
            ("thumbnail_url", &self.thumbnail_url),
            ("upload_url", &self.upload_url),
            ("delete_url", &self.delete_url),
            ("update_url", &self.update_url),
        ];
        for (key, value) in urls {
            if value.is_empty() {
                return Err(ConfigError::Validation(format!(
                    "extra_meta {} cannot be empty",
                    key
                )));
            }
        }
        Ok(())
    }
}

/// Main configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetagridConfig {
    pub filter: FilterConfig,
    pub extra_meta: ExtraMetaConfig,
}

impl MetagridConfig {
    /// Get the default config file path.
    ///
    /// Returns: ~/.config/metagrid/metagrid.toml
    pub fn default_config_path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from(".config"));
        path.push(defaults::CONFIG_DIR_NAME);
        path.push(defaults::CONFIG_FILE_NAME);
        path
    }

    /// Load configuration from the default path, falling back to environment variables.
    pub fn load() -> ConfigResult<Self> {
        let path = Self::default_config_path();

        if path.exists() {
            info!(subsystem = "config", "Loading config from: {}", path.display());
            Self::from_file(&path)
        } else {
            debug!(
                subsystem = "config",
                "Config file not found at {}, using environment variables",
                path.display()
            );
            let config = Self::from_env();
            config.validate()?;
            Ok(config)
        }
    }

    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from environment variables with fallback to defaults.
    ///
    /// Unparseable values are logged and ignored.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = env::var("METAGRID_DESCENDANT_LABEL") {
            config.filter.descendant_label = val;
        }

        if let Ok(val) = env::var("METAGRID_DESCENDANT_SCOPE") {
            match val.parse() {
                Ok(scope) => config.filter.descendant_scope = scope,
                Err(_) => {
                    warn!(value = %val, "Invalid METAGRID_DESCENDANT_SCOPE, using default")
                }
            }
        }

        if let Ok(val) = env::var("METAGRID_STATE_ITEMS") {
            match val.parse() {
                Ok(shape) => config.filter.state_items = shape,
                Err(_) => warn!(value = %val, "Invalid METAGRID_STATE_ITEMS, using default"),
            }
        }

        if let Ok(val) = env::var("METAGRID_USER_SELECT_URL") {
            config.filter.user_select_url = val;
        }

        if let Ok(val) = env::var("METAGRID_DOWNLOAD_URL") {
            config.extra_meta.download_url = val;
        }

        if let Ok(val) = env::var("METAGRID_THUMBNAIL_URL") {
            config.extra_meta.thumbnail_url = val;
        }

        if let Ok(val) = env::var("METAGRID_UPLOAD_URL") {
            config.extra_meta.upload_url = val;
        }

        if let Ok(val) = env::var("METAGRID_THUMBNAILS_ENABLED") {
            config.extra_meta.thumbnails_enabled = val != "false" && val != "0";
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        self.filter.validate()?;
        self.extra_meta.validate()
    }
}
