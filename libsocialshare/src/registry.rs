//! Network name to backend resolution
//!
//! A [`BackendRegistry`] is an ordinary value owned by the application. It
//! starts out knowing the built-in networks and can be extended or
//! overridden at any time by whoever owns it. Registering a name that is
//! already present replaces the previous mapping.
//!
//! # Examples
//!
//! ```
//! use libsocialshare::registry::{BackendKind, BackendRegistry};
//!
//! let mut registry = BackendRegistry::default();
//! registry.register("fb", BackendKind::Facebook);
//!
//! assert_eq!(registry.resolve("fb").unwrap(), BackendKind::Facebook);
//! assert!(registry.resolve("unknown-network").is_err());
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::backends::debug::DebugBackend;
use crate::backends::facebook::FacebookBackend;
use crate::backends::linkedin::LinkedInBackend;
use crate::backends::twitter::TwitterBackend;
use crate::backends::ShareBackend;
use crate::config::Config;
use crate::content::ShareContent;
use crate::credentials::Credentials;
use crate::error::{Result, ShareError};

/// The closed set of backend implementations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BackendKind {
    Debug,
    Twitter,
    LinkedIn,
    Facebook,
}

impl BackendKind {
    pub const ALL: [BackendKind; 4] = [
        BackendKind::Debug,
        BackendKind::Twitter,
        BackendKind::LinkedIn,
        BackendKind::Facebook,
    ];

    /// Adapter identifier, e.g. `"TwitterBackend"`
    pub fn adapter_id(&self) -> &'static str {
        match self {
            BackendKind::Debug => "DebugBackend",
            BackendKind::Twitter => "TwitterBackend",
            BackendKind::LinkedIn => "LinkedInBackend",
            BackendKind::Facebook => "FacebookBackend",
        }
    }

    /// Network name the kind is registered under by default
    pub fn network_name(&self) -> &'static str {
        match self {
            BackendKind::Debug => "debug",
            BackendKind::Twitter => "twitter",
            BackendKind::LinkedIn => "linkedin",
            BackendKind::Facebook => "facebook",
        }
    }

    /// Construct the backend for this kind
    pub fn build(
        self,
        credentials: Credentials,
        content: ShareContent,
        config: &Config,
    ) -> Result<Box<dyn ShareBackend>> {
        let timeout = config.timeout();
        let backend: Box<dyn ShareBackend> = match self {
            BackendKind::Debug => Box::new(DebugBackend::new(
                credentials,
                content,
                &config.debug,
                timeout,
            )),
            BackendKind::Twitter => Box::new(TwitterBackend::new(
                credentials,
                content,
                &config.twitter,
                timeout,
            )),
            BackendKind::LinkedIn => Box::new(LinkedInBackend::new(
                credentials,
                content,
                &config.linkedin,
                timeout,
            )?),
            BackendKind::Facebook => Box::new(FacebookBackend::new(
                credentials,
                content,
                &config.facebook,
                timeout,
            )?),
        };
        Ok(backend)
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.adapter_id())
    }
}

impl FromStr for BackendKind {
    type Err = String;

    /// Accepts an adapter id (`"DebugBackend"`) or a built-in network name
    /// (`"debug"`), ignoring case
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = s.trim();
        BackendKind::ALL
            .into_iter()
            .find(|kind| {
                kind.adapter_id().eq_ignore_ascii_case(wanted)
                    || kind.network_name().eq_ignore_ascii_case(wanted)
            })
            .ok_or_else(|| {
                format!(
                    "Unknown adapter: '{}'. Valid options: DebugBackend, TwitterBackend, LinkedInBackend, FacebookBackend",
                    s
                )
            })
    }
}

/// Mapping from network name to backend kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendRegistry {
    entries: BTreeMap<String, BackendKind>,
}

impl BackendRegistry {
    /// A registry with no networks at all
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// A registry holding the built-in networks
    pub fn with_builtin() -> Self {
        let mut registry = Self::empty();
        for kind in BackendKind::ALL {
            registry.register(kind.network_name(), kind);
        }
        registry
    }

    /// Map `network` to `kind`, returning the mapping it replaced
    ///
    /// Names are case-sensitive; only surrounding whitespace is ignored.
    pub fn register(&mut self, network: impl AsRef<str>, kind: BackendKind) -> Option<BackendKind> {
        let key = normalize_name(network.as_ref());
        let previous = self.entries.insert(key.clone(), kind);
        match previous {
            Some(old) if old != kind => {
                tracing::debug!(network = %key, from = %old, to = %kind, "Backend registration replaced")
            }
            _ => tracing::debug!(network = %key, adapter = %kind, "Backend registered"),
        }
        previous
    }

    /// Look up the backend kind registered for `network`
    ///
    /// # Errors
    ///
    /// Returns `ShareError::UnknownNetwork` if nothing is registered under
    /// that name.
    pub fn resolve(&self, network: &str) -> Result<BackendKind> {
        self.entries
            .get(&normalize_name(network))
            .copied()
            .ok_or_else(|| ShareError::UnknownNetwork(network.to_string()).into())
    }

    pub fn contains(&self, network: &str) -> bool {
        self.entries.contains_key(&normalize_name(network))
    }

    /// Registered network names, sorted
    pub fn networks(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for BackendRegistry {
    fn default() -> Self {
        Self::with_builtin()
    }
}

fn normalize_name(network: &str) -> String {
    network.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SocialShareError;

    #[test]
    fn test_builtin_networks() {
        let registry = BackendRegistry::default();
        assert_eq!(registry.networks(), vec!["debug", "facebook", "linkedin", "twitter"]);
        assert_eq!(registry.resolve("twitter").unwrap(), BackendKind::Twitter);
        assert_eq!(registry.resolve(" linkedin ").unwrap(), BackendKind::LinkedIn);
    }

    #[test]
    fn test_names_are_case_sensitive() {
        let mut registry = BackendRegistry::default();
        assert!(registry.resolve("LinkedIn").is_err());

        let previous = registry.register("Twitter", BackendKind::Debug);
        assert_eq!(previous, None);
        assert_eq!(registry.resolve("Twitter").unwrap(), BackendKind::Debug);
        assert_eq!(registry.resolve("twitter").unwrap(), BackendKind::Twitter);
        assert_eq!(registry.len(), 5);
    }

    #[test]
    fn test_register_new_network() {
        let mut registry = BackendRegistry::empty();
        assert!(registry.is_empty());

        let previous = registry.register("debug", "DebugBackend".parse().unwrap());
        assert_eq!(previous, None);
        assert_eq!(registry.resolve("debug").unwrap(), BackendKind::Debug);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_register_twice_overwrites() {
        let mut registry = BackendRegistry::empty();
        registry.register("test", BackendKind::Debug);
        let previous = registry.register("test", BackendKind::Twitter);

        assert_eq!(previous, Some(BackendKind::Debug));
        assert_eq!(registry.resolve("test").unwrap(), BackendKind::Twitter);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_resolve_unknown_network() {
        let registry = BackendRegistry::default();
        let result = registry.resolve("unknown-network");

        match result {
            Err(SocialShareError::Share(ShareError::UnknownNetwork(name))) => {
                assert_eq!(name, "unknown-network");
            }
            other => panic!("Expected UnknownNetwork, got {:?}", other),
        }
    }

    #[test]
    fn test_registries_are_independent() {
        let mut first = BackendRegistry::default();
        let second = BackendRegistry::default();

        first.register("myspace", BackendKind::Debug);
        assert!(first.contains("myspace"));
        assert!(!second.contains("myspace"));
    }

    #[test]
    fn test_backend_kind_from_str() {
        assert_eq!("DebugBackend".parse::<BackendKind>().unwrap(), BackendKind::Debug);
        assert_eq!("twitterbackend".parse::<BackendKind>().unwrap(), BackendKind::Twitter);
        assert_eq!("linkedin".parse::<BackendKind>().unwrap(), BackendKind::LinkedIn);
        assert_eq!(" Facebook ".parse::<BackendKind>().unwrap(), BackendKind::Facebook);

        let err = "TestBackend".parse::<BackendKind>().unwrap_err();
        assert!(err.contains("Unknown adapter: 'TestBackend'"));
    }

    #[test]
    fn test_backend_kind_display() {
        for kind in BackendKind::ALL {
            assert_eq!(kind.to_string(), kind.adapter_id());
            assert_eq!(kind.to_string().parse::<BackendKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_build_debug_backend() {
        let config = Config::default();
        let backend = BackendKind::Debug
            .build(
                Credentials::new("token", "shh"),
                ShareContent::default(),
                &config,
            )
            .unwrap();
        assert_eq!(backend.name(), "debug");
        assert_eq!(backend.timeout(), config.timeout());
    }
}
