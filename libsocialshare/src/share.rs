//! Bulk share orchestration
//!
//! A [`Share`] holds one piece of content, default credentials and a list of
//! [`ShareDescriptor`]s naming the networks to publish to. Each descriptor is
//! resolved through the registry and shared concurrently; every descriptor
//! gets its own [`ShareResult`], so one network failing never hides or
//! blocks another.
//!
//! # Examples
//!
//! ```no_run
//! use libsocialshare::content::ContentFields;
//! use libsocialshare::credentials::Credentials;
//! use libsocialshare::share::{Share, ShareDescriptor};
//!
//! # async fn example() {
//! let share = Share::new(
//!     Credentials::new("app-token", "app-secret"),
//!     ContentFields::new().message("Corgis are the new cats."),
//! )
//! .with_shares(vec![
//!     ShareDescriptor::new("twitter").with_consumer("ct", "cs"),
//!     ShareDescriptor::new("facebook"),
//! ]);
//!
//! for result in share.share_all().await {
//!     match &result.outcome {
//!         Ok(receipt) => println!("{}: {:?}", result.network, receipt.remote_ids),
//!         Err(e) => eprintln!("{}: {}", result.network, e),
//!     }
//! }
//! # }
//! ```

use std::str::FromStr;

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::backends::{ShareBackend, ShareReceipt};
use crate::config::Config;
use crate::content::{ContentFields, ShareContent};
use crate::credentials::Credentials;
use crate::error::{Result, SocialShareError};
use crate::registry::BackendRegistry;

/// One target of a bulk share
///
/// Consumer credentials left out here fall back to the orchestrator's
/// defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareDescriptor {
    pub network: String,
    #[serde(default)]
    pub consumer_token: Option<String>,
    #[serde(default)]
    pub consumer_secret: Option<String>,
}

impl ShareDescriptor {
    pub fn new(network: impl Into<String>) -> Self {
        Self {
            network: network.into(),
            consumer_token: None,
            consumer_secret: None,
        }
    }

    #[must_use]
    pub fn with_consumer(
        mut self,
        consumer_token: impl Into<String>,
        consumer_secret: impl Into<String>,
    ) -> Self {
        self.consumer_token = Some(consumer_token.into());
        self.consumer_secret = Some(consumer_secret.into());
        self
    }
}

impl FromStr for ShareDescriptor {
    type Err = String;

    /// Parses `network` or `network:consumer_token:consumer_secret`
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut parts = s.splitn(3, ':');
        let network = parts.next().unwrap_or_default().trim();
        if network.is_empty() {
            return Err(format!("Invalid share target: '{}'. Expected NETWORK[:TOKEN:SECRET]", s));
        }

        match (parts.next(), parts.next()) {
            (None, None) => Ok(Self::new(network)),
            (Some(token), Some(secret)) => Ok(Self::new(network).with_consumer(token, secret)),
            _ => Err(format!(
                "Invalid share target: '{}'. Expected NETWORK[:TOKEN:SECRET]",
                s
            )),
        }
    }
}

/// Outcome of sharing to one descriptor
#[derive(Debug)]
pub struct ShareResult {
    /// Network name as given in the descriptor
    pub network: String,
    pub outcome: Result<ShareReceipt>,
}

impl ShareResult {
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn receipt(&self) -> Option<&ShareReceipt> {
        self.outcome.as_ref().ok()
    }

    pub fn error(&self) -> Option<&SocialShareError> {
        self.outcome.as_ref().err()
    }
}

/// Shares one piece of content with any number of networks
pub struct Share {
    registry: BackendRegistry,
    config: Config,
    credentials: Credentials,
    content: ShareContent,
    shares: Vec<ShareDescriptor>,
}

impl Share {
    /// Normalizes `fields` and uses the built-in registry and default
    /// configuration
    pub fn new(credentials: Credentials, fields: ContentFields) -> Self {
        Self {
            registry: BackendRegistry::default(),
            config: Config::default(),
            credentials,
            content: ShareContent::new(fields),
            shares: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_registry(mut self, registry: BackendRegistry) -> Self {
        self.registry = registry;
        self
    }

    #[must_use]
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn with_shares(mut self, shares: Vec<ShareDescriptor>) -> Self {
        self.shares = shares;
        self
    }

    pub fn add_share(&mut self, descriptor: ShareDescriptor) {
        self.shares.push(descriptor);
    }

    pub fn shares(&self) -> &[ShareDescriptor] {
        &self.shares
    }

    pub fn content(&self) -> &ShareContent {
        &self.content
    }

    /// Replace the content, re-applying normalization
    pub fn set_content(&mut self, fields: ContentFields) {
        self.content.update(fields);
    }

    pub fn registry(&self) -> &BackendRegistry {
        &self.registry
    }

    /// Build the backend a descriptor points at
    ///
    /// # Errors
    ///
    /// Returns `ShareError::UnknownNetwork` if the descriptor's network is not
    /// registered.
    pub fn backend_for(&self, descriptor: &ShareDescriptor) -> Result<Box<dyn ShareBackend>> {
        let kind = self.registry.resolve(&descriptor.network)?;
        let credentials = self.credentials.overridden_by(
            descriptor.consumer_token.as_deref(),
            descriptor.consumer_secret.as_deref(),
        );
        tracing::debug!(network = %descriptor.network, adapter = %kind, "Resolved backend");
        kind.build(credentials, self.content.clone(), &self.config)
    }

    /// Share with every descriptor, concurrently
    ///
    /// Returns one result per descriptor, in descriptor order.
    pub async fn share_all(&self) -> Vec<ShareResult> {
        info!(targets = self.shares.len(), "Starting bulk share");
        let results = join_all(self.shares.iter().map(|d| self.dispatch(d, None))).await;

        let failed = results.iter().filter(|r| !r.is_success()).count();
        if failed > 0 {
            warn!(
                "Bulk share finished: {} of {} target(s) failed",
                failed,
                results.len()
            );
        } else {
            info!("Bulk share finished: {} target(s) succeeded", results.len());
        }
        results
    }

    /// Share with a single network
    pub async fn share_single(&self, descriptor: &ShareDescriptor) -> ShareResult {
        self.dispatch(descriptor, None).await
    }

    /// Send the content as a direct message through one network
    pub async fn send_message(&self, descriptor: &ShareDescriptor, recipients: &[String]) -> ShareResult {
        self.dispatch(descriptor, Some(recipients)).await
    }

    async fn dispatch(&self, descriptor: &ShareDescriptor, recipients: Option<&[String]>) -> ShareResult {
        let outcome = match self.backend_for(descriptor) {
            Ok(backend) => match recipients {
                Some(recipients) => backend.send_message(recipients).await,
                None => backend.share().await,
            },
            Err(e) => {
                warn!(network = %descriptor.network, error = %e, "Could not build backend");
                Err(e)
            }
        };

        ShareResult {
            network: descriptor.network.clone(),
            outcome,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ShareError;
    use crate::registry::BackendKind;

    #[test]
    fn test_descriptor_from_str() {
        assert_eq!(
            "debug".parse::<ShareDescriptor>().unwrap(),
            ShareDescriptor::new("debug")
        );
        assert_eq!(
            "twitter:t:s".parse::<ShareDescriptor>().unwrap(),
            ShareDescriptor::new("twitter").with_consumer("t", "s")
        );
        assert_eq!(
            "facebook:t:s:with:colons".parse::<ShareDescriptor>().unwrap(),
            ShareDescriptor::new("facebook").with_consumer("t", "s:with:colons")
        );
        assert!("twitter:only-token".parse::<ShareDescriptor>().is_err());
        assert!(":t:s".parse::<ShareDescriptor>().is_err());
        assert!("".parse::<ShareDescriptor>().is_err());
    }

    #[tokio::test]
    async fn test_bulk_share_single_debug_descriptor() {
        let mut registry = BackendRegistry::empty();
        registry.register("debug", BackendKind::Debug);

        let share = Share::new(
            Credentials::new("token", "shh"),
            ContentFields::new().message("hello"),
        )
        .with_registry(registry)
        .with_shares(vec![ShareDescriptor::new("debug").with_consumer("t", "s")]);

        let results = share.share_all().await;

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].network, "debug");
        let receipt = results[0].receipt().unwrap();
        assert_eq!(receipt.field("message"), Some("hello"));
        assert_eq!(receipt.field("consumer_token"), Some("t"));
    }

    #[tokio::test]
    async fn test_descriptor_falls_back_to_default_consumer() {
        let share = Share::new(
            Credentials::new("token", "shh").with_consumer("default-ct", "default-cs"),
            ContentFields::new().message("hello"),
        );

        let result = share.share_single(&ShareDescriptor::new("debug")).await;
        assert_eq!(result.receipt().unwrap().field("consumer_token"), Some("default-ct"));
    }

    #[tokio::test]
    async fn test_unknown_network_reported_per_descriptor() {
        let share = Share::new(Credentials::new("token", "shh"), ContentFields::new().message("hi"))
            .with_shares(vec![
                ShareDescriptor::new("myspace"),
                ShareDescriptor::new("debug"),
            ]);

        let results = share.share_all().await;

        assert_eq!(results.len(), 2);
        assert!(matches!(
            results[0].error(),
            Some(SocialShareError::Share(ShareError::UnknownNetwork(name))) if name == "myspace"
        ));
        assert!(results[1].is_success());
    }

    #[tokio::test]
    async fn test_send_message_through_orchestrator() {
        let share = Share::new(Credentials::new("token", "shh"), ContentFields::new().message("psst"));
        let descriptor = ShareDescriptor::new("debug");

        let empty = share.send_message(&descriptor, &[]).await;
        assert!(matches!(
            empty.error(),
            Some(SocialShareError::Share(ShareError::NoRecipients(_)))
        ));

        let sent = share
            .send_message(&descriptor, &["1".to_string(), "2".to_string()])
            .await;
        assert_eq!(sent.receipt().unwrap().delivered_to, vec!["1", "2"]);
    }

    #[test]
    fn test_set_content_renormalizes() {
        let mut share = Share::new(Credentials::new("token", "shh"), ContentFields::new());
        share.set_content(ContentFields::new().short_text(" s".repeat(200)));
        assert!(share.content().short_text().chars().count() <= 160);
        assert!(share.content().short_text().starts_with('s'));
    }

    #[test]
    fn test_backend_for_unknown_network() {
        let share = Share::new(Credentials::new("token", "shh"), ContentFields::new());
        let result = share.backend_for(&ShareDescriptor::new("unknown-network"));
        assert!(matches!(
            result,
            Err(SocialShareError::Share(ShareError::UnknownNetwork(_)))
        ));
    }
}
