//! Configuration management for socialshare
//!
//! Configuration lives in a TOML file. Every section is optional; a missing
//! file or section falls back to the built-in defaults.
//!
//! ```toml
//! [defaults]
//! timeout_secs = 30
//! networks = ["twitter", "facebook"]
//!
//! [debug]
//! print = true
//!
//! [twitter]
//! use_tco = true
//!
//! [linkedin]
//! api_base = "https://api.linkedin.com/v1"
//! visibility = "connections-only"
//!
//! [facebook]
//! graph_base = "https://graph.facebook.com"
//!
//! [aliases]
//! fb = "FacebookBackend"
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::registry::{BackendKind, BackendRegistry};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub defaults: DefaultsConfig,
    pub debug: DebugConfig,
    pub twitter: TwitterConfig,
    pub linkedin: LinkedInConfig,
    pub facebook: FacebookConfig,
    /// Extra network names, mapped to adapter ids
    pub aliases: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    /// Deadline for each outbound call, in seconds
    pub timeout_secs: u64,
    /// Networks to share with when the caller names none
    pub networks: Vec<String>,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            networks: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    /// Write a human-readable dump of every share to stdout
    pub print: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TwitterConfig {
    /// Budget composed statuses for t.co-wrapped links
    pub use_tco: bool,
}

impl Default for TwitterConfig {
    fn default() -> Self {
        Self { use_tco: true }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkedInConfig {
    pub api_base: String,
    pub visibility: Visibility,
}

impl Default for LinkedInConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.linkedin.com/v1".to_string(),
            visibility: Visibility::Anyone,
        }
    }
}

/// Who can see a LinkedIn share
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Visibility {
    #[default]
    Anyone,
    ConnectionsOnly,
}

impl Visibility {
    pub fn code(&self) -> &'static str {
        match self {
            Visibility::Anyone => "anyone",
            Visibility::ConnectionsOnly => "connections-only",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FacebookConfig {
    pub graph_base: String,
}

impl Default for FacebookConfig {
    fn default() -> Self {
        Self {
            graph_base: "https://graph.facebook.com".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        let config_path = resolve_config_path()?;
        Self::load_from_path(&config_path)
    }

    /// Load configuration from the default location, or defaults if there is
    /// no file there
    pub fn load_or_default() -> Result<Self> {
        let config_path = resolve_config_path()?;
        if !config_path.exists() {
            tracing::debug!(
                "No config file at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        Self::from_toml(&content)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).map_err(ConfigError::ParseError)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.defaults.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "defaults.timeout_secs must be greater than zero".to_string(),
            )
            .into());
        }

        for (network, adapter) in &self.aliases {
            adapter.parse::<BackendKind>().map_err(|e| {
                ConfigError::InvalidValue(format!("aliases.{}: {}", network, e))
            })?;
        }

        Ok(())
    }

    /// Per-call deadline for outbound requests
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.defaults.timeout_secs)
    }

    /// The built-in registry with this configuration's aliases applied
    pub fn registry(&self) -> Result<BackendRegistry> {
        let mut registry = BackendRegistry::with_builtin();
        for (network, adapter) in &self.aliases {
            let kind = adapter.parse::<BackendKind>().map_err(|e| {
                ConfigError::InvalidValue(format!("aliases.{}: {}", network, e))
            })?;
            registry.register(network, kind);
        }
        Ok(registry)
    }
}

/// Resolve the configuration file path following XDG Base Directory spec
pub fn resolve_config_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var("SOCIALSHARE_CONFIG") {
        return Ok(PathBuf::from(shellexpand::tilde(&path).to_string()));
    }

    let config_dir = dirs::config_dir()
        .ok_or_else(|| ConfigError::MissingField("config directory".to_string()))?;

    Ok(config_dir.join("socialshare").join("config.toml"))
}
