//! Share backends
//!
//! Every network is reached through the [`ShareBackend`] trait. A backend is
//! built for one share operation with the credentials and normalized content
//! it should publish, then asked to either [`share`](ShareBackend::share) to
//! the account's public feed or [`send_message`](ShareBackend::send_message)
//! to specific recipients.
//!
//! Implementations only provide [`publish`](ShareBackend::publish) and
//! [`deliver`](ShareBackend::deliver), bounding each outbound call with
//! [`timeout`](ShareBackend::timeout). The provided methods add the
//! recipient check and logging, so all backends fail the same way.
//!
//! # Examples
//!
//! ```no_run
//! use libsocialshare::backends::ShareBackend;
//! use libsocialshare::config::Config;
//! use libsocialshare::content::{ContentFields, ShareContent};
//! use libsocialshare::credentials::Credentials;
//! use libsocialshare::registry::BackendKind;
//!
//! # async fn example() -> libsocialshare::error::Result<()> {
//! let content = ShareContent::new(ContentFields::new().short_text("Corgis = cats."));
//! let credentials = Credentials::new("app-token", "app-secret")
//!     .with_consumer("user-token", "user-secret");
//!
//! let backend = BackendKind::Twitter.build(credentials, content, &Config::default())?;
//! let receipt = backend.share().await?;
//! println!("Posted to {}: {:?}", receipt.network, receipt.remote_ids);
//! # Ok(())
//! # }
//! ```

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{info, warn};

use crate::content::{ContentFields, ShareContent};
use crate::error::{FailureKind, Result, ShareError, SocialShareError};

pub mod debug;
pub mod facebook;
pub(crate) mod http;
pub mod linkedin;
pub mod twitter;

/// Deadline for a single outbound call when nothing else is configured
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// A named value echoed back by a backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EchoField {
    pub name: String,
    pub value: String,
}

/// What a backend reports after a successful share or message send
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShareReceipt {
    /// Backend name (e.g., "twitter")
    pub network: String,
    /// Ids the network assigned to whatever was created
    pub remote_ids: Vec<String>,
    /// Recipients a message was accepted for
    pub delivered_to: Vec<String>,
    /// Submitted fields, for backends that echo them
    pub fields: Vec<EchoField>,
    /// Unix timestamp of completion
    pub shared_at: i64,
}

impl ShareReceipt {
    pub fn new(network: &str) -> Self {
        Self {
            network: network.to_string(),
            remote_ids: Vec::new(),
            delivered_to: Vec::new(),
            fields: Vec::new(),
            shared_at: chrono::Utc::now().timestamp(),
        }
    }

    #[must_use]
    pub fn with_remote_id(mut self, id: impl Into<String>) -> Self {
        self.remote_ids.push(id.into());
        self
    }

    /// Value of the first echoed field called `name`
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|field| field.name == name)
            .map(|field| field.value.as_str())
    }

    /// Whether any echoed field carries exactly `value`
    pub fn contains_value(&self, value: &str) -> bool {
        self.fields.iter().any(|field| field.value == value)
    }
}

/// Uniform share/send-message contract for a social network
#[async_trait]
pub trait ShareBackend: Send + Sync {
    /// Lowercase backend name (e.g., "twitter", "linkedin")
    fn name(&self) -> &str;

    /// Content this backend will publish
    fn content(&self) -> &ShareContent;

    fn content_mut(&mut self) -> &mut ShareContent;

    /// Deadline for each outbound call
    ///
    /// A send that makes several calls gets a fresh deadline per call.
    fn timeout(&self) -> Duration {
        DEFAULT_TIMEOUT
    }

    /// Publish the content to the account's public feed
    ///
    /// Called by [`share`](ShareBackend::share).
    async fn publish(&self) -> Result<ShareReceipt>;

    /// Send the content privately to `recipients`
    ///
    /// Called by [`send_message`](ShareBackend::send_message) with a
    /// non-empty recipient list. When a later call fails after earlier ones
    /// went through, the error is a `ShareError::PartialDelivery` naming the
    /// recipients already reached.
    async fn deliver(&self, recipients: &[String]) -> Result<ShareReceipt>;

    /// Replace the content, re-applying normalization
    fn set_content(&mut self, fields: ContentFields) {
        self.content_mut().update(fields);
    }

    /// Publish the content to the network's feed
    ///
    /// Every call creates a new post; calling twice posts twice.
    ///
    /// # Errors
    ///
    /// Returns `ShareError::RemoteShareFailure` when the network refuses the
    /// post, cannot be reached, or does not answer within [`timeout`](ShareBackend::timeout).
    async fn share(&self) -> Result<ShareReceipt> {
        info!(network = self.name(), "Sharing content");
        let result = self.publish().await;
        match &result {
            Ok(receipt) => info!(network = self.name(), remote_ids = ?receipt.remote_ids, "Shared"),
            Err(e) => warn!(network = self.name(), error = %e, "Share failed"),
        }
        result
    }

    /// Send the content as a direct message to each recipient
    ///
    /// # Errors
    ///
    /// Returns `ShareError::NoRecipients` without contacting the network when
    /// `recipients` is empty, `ShareError::RemoteShareFailure` when nothing
    /// was sent, and `ShareError::PartialDelivery` when some recipients were
    /// reached before a call failed.
    async fn send_message(&self, recipients: &[String]) -> Result<ShareReceipt> {
        if recipients.is_empty() {
            return Err(ShareError::NoRecipients(self.name().to_string()).into());
        }

        info!(
            network = self.name(),
            recipients = recipients.len(),
            "Sending message"
        );
        let result = self.deliver(recipients).await;
        if let Err(e) = &result {
            warn!(network = self.name(), error = %e, "Message send failed");
        }
        result
    }
}

/// Run one outbound call, failing with a timeout error if it outlives `limit`
pub(crate) async fn within_timeout<T, F>(network: &str, limit: Duration, call: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(ShareError::remote(
            network,
            FailureKind::Timeout,
            format!("no response within {:?}", limit),
        )
        .into()),
    }
}

/// Attach the recipients in `receipt` to an error that cut a send short
///
/// Errors other than a remote failure, and failures before anyone was
/// reached, pass through unchanged.
pub(crate) fn interrupted(receipt: ShareReceipt, error: SocialShareError) -> SocialShareError {
    if receipt.delivered_to.is_empty() {
        return error;
    }

    match error {
        SocialShareError::Share(ShareError::RemoteShareFailure {
            network,
            kind,
            message,
        }) => ShareError::PartialDelivery {
            network,
            kind,
            message,
            delivered_to: receipt.delivered_to,
            remote_ids: receipt.remote_ids,
        }
        .into(),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Backend making one outbound "call" per recipient, each taking `delay`;
    /// the recipient "slow" never answers in time
    struct CountingBackend {
        content: ShareContent,
        delay: Duration,
        calls: AtomicUsize,
    }

    impl CountingBackend {
        fn new(delay: Duration) -> Self {
            Self {
                content: ShareContent::default(),
                delay,
                calls: AtomicUsize::new(0),
            }
        }

        async fn call(&self, delay: Duration) -> Result<String> {
            within_timeout(self.name(), self.timeout(), async {
                let n = self.calls.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(delay).await;
                Ok(n.to_string())
            })
            .await
        }
    }

    #[async_trait]
    impl ShareBackend for CountingBackend {
        fn name(&self) -> &str {
            "counting"
        }

        fn content(&self) -> &ShareContent {
            &self.content
        }

        fn content_mut(&mut self) -> &mut ShareContent {
            &mut self.content
        }

        fn timeout(&self) -> Duration {
            Duration::from_millis(50)
        }

        async fn publish(&self) -> Result<ShareReceipt> {
            let id = self.call(self.delay).await?;
            Ok(ShareReceipt::new(self.name()).with_remote_id(id))
        }

        async fn deliver(&self, recipients: &[String]) -> Result<ShareReceipt> {
            let mut receipt = ShareReceipt::new(self.name());
            for recipient in recipients {
                let delay = if recipient == "slow" {
                    Duration::from_millis(500)
                } else {
                    self.delay
                };
                match self.call(delay).await {
                    Ok(id) => {
                        receipt.remote_ids.push(id);
                        receipt.delivered_to.push(recipient.clone());
                    }
                    Err(e) => return Err(interrupted(receipt, e)),
                }
            }
            Ok(receipt)
        }
    }

    fn recipients(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[tokio::test]
    async fn test_send_message_without_recipients_makes_no_call() {
        let backend = CountingBackend::new(Duration::ZERO);

        let result = backend.send_message(&[]).await;
        match result {
            Err(SocialShareError::Share(ShareError::NoRecipients(network))) => {
                assert_eq!(network, "counting");
            }
            other => panic!("Expected NoRecipients, got {:?}", other),
        }
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_send_message_passes_recipients() {
        let backend = CountingBackend::new(Duration::ZERO);
        let to = recipients(&["1", "2"]);

        let receipt = backend.send_message(&to).await.unwrap();
        assert_eq!(receipt.delivered_to, to);
        assert_eq!(backend.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_deadline_applies_per_call() {
        // Four 30ms calls take longer than one 50ms deadline in total
        let backend = CountingBackend::new(Duration::from_millis(30));
        let to = recipients(&["0", "1", "2", "3"]);

        let receipt = backend.send_message(&to).await.unwrap();
        assert_eq!(receipt.delivered_to, to);
        assert_eq!(receipt.remote_ids.len(), 4);
        assert_eq!(backend.calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_timeout_mid_send_reports_partial_delivery() {
        let backend = CountingBackend::new(Duration::from_millis(1));
        let to = recipients(&["alice", "bob", "slow", "carol"]);

        let error = backend.send_message(&to).await.unwrap_err();
        match error.as_share_error() {
            Some(ShareError::PartialDelivery {
                network,
                kind,
                delivered_to,
                remote_ids,
                ..
            }) => {
                assert_eq!(network, "counting");
                assert_eq!(*kind, FailureKind::Timeout);
                assert_eq!(delivered_to, &recipients(&["alice", "bob"]));
                assert_eq!(remote_ids.len(), 2);
            }
            other => panic!("Expected PartialDelivery, got {:?}", other),
        }
        // Nothing is attempted after the failing call
        assert_eq!(backend.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_failure_before_any_delivery_stays_remote_failure() {
        let backend = CountingBackend::new(Duration::ZERO);

        let error = backend.send_message(&recipients(&["slow", "alice"])).await.unwrap_err();
        assert!(matches!(
            error.as_share_error(),
            Some(ShareError::RemoteShareFailure {
                kind: FailureKind::Timeout,
                ..
            })
        ));
    }

    #[test]
    fn test_interrupted_passes_other_errors_through() {
        let mut receipt = ShareReceipt::new("counting");
        receipt.delivered_to.push("alice".to_string());

        let error = interrupted(receipt, ShareError::NoRecipients("counting".into()).into());
        assert!(matches!(
            error,
            SocialShareError::Share(ShareError::NoRecipients(_))
        ));
    }

    #[tokio::test]
    async fn test_share_times_out() {
        let backend = CountingBackend::new(Duration::from_millis(500));

        let result = backend.share().await;
        let error = result.unwrap_err();
        assert_eq!(
            error.as_share_error().and_then(ShareError::failure_kind),
            Some(FailureKind::Timeout)
        );
    }

    #[tokio::test]
    async fn test_share_within_timeout() {
        let backend = CountingBackend::new(Duration::from_millis(1));
        let receipt = backend.share().await.unwrap();
        assert_eq!(receipt.remote_ids, vec!["0"]);
    }

    #[test]
    fn test_set_content_renormalizes() {
        let mut backend = CountingBackend::new(Duration::ZERO);
        backend.set_content(ContentFields::new().headline(format!(" {} ", "h".repeat(300))));
        assert_eq!(backend.content().headline().len(), 128);
    }

    #[test]
    fn test_receipt_lookup() {
        let mut receipt = ShareReceipt::new("debug");
        receipt.fields.push(EchoField {
            name: "message".to_string(),
            value: "hello".to_string(),
        });

        assert_eq!(receipt.field("message"), Some("hello"));
        assert_eq!(receipt.field("headline"), None);
        assert!(receipt.contains_value("hello"));
        assert!(!receipt.contains_value("goodbye"));
    }
}
