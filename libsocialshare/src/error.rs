//! Error types for socialshare

use std::fmt;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SocialShareError>;

#[derive(Error, Debug)]
pub enum SocialShareError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Share error: {0}")]
    Share(#[from] ShareError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl SocialShareError {
    /// Returns the appropriate exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            SocialShareError::InvalidInput(_) => 3,
            SocialShareError::Share(ShareError::UnknownNetwork(_))
            | SocialShareError::Share(ShareError::NoRecipients(_)) => 2,
            SocialShareError::Share(_) => 1,
            SocialShareError::Config(_) => 1,
        }
    }

    /// The share-level error, if this is one
    pub fn as_share_error(&self) -> Option<&ShareError> {
        match self {
            SocialShareError::Share(e) => Some(e),
            _ => None,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShareError {
    #[error("Unknown network: {0}")]
    UnknownNetwork(String),

    #[error("No recipients to send to via {0}")]
    NoRecipients(String),

    #[error("{network} share failed ({kind}): {message}")]
    RemoteShareFailure {
        network: String,
        kind: FailureKind,
        message: String,
    },

    /// A multi-call send stopped partway; the listed recipients already got
    /// the message
    #[error("{network} message failed after reaching {} recipient(s) ({kind}): {message}", .delivered_to.len())]
    PartialDelivery {
        network: String,
        kind: FailureKind,
        message: String,
        delivered_to: Vec<String>,
        remote_ids: Vec<String>,
    },
}

impl ShareError {
    pub fn remote(network: &str, kind: FailureKind, message: impl Into<String>) -> Self {
        ShareError::RemoteShareFailure {
            network: network.to_string(),
            kind,
            message: message.into(),
        }
    }

    /// Failure classification for remote errors
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            ShareError::RemoteShareFailure { kind, .. }
            | ShareError::PartialDelivery { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Recipients reached before a send failed
    pub fn delivered_to(&self) -> &[String] {
        match self {
            ShareError::PartialDelivery { delivered_to, .. } => delivered_to,
            _ => &[],
        }
    }
}

/// Why a call to a vendor API did not succeed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// Credentials were refused (HTTP 401/403)
    Authentication,
    /// The network refused the content itself (HTTP 400/422)
    Rejected,
    /// Too many requests (HTTP 429)
    RateLimit,
    /// Connection, DNS or server-side (5xx) trouble
    Network,
    /// No answer before the configured deadline
    Timeout,
    /// The call "succeeded" but carried nothing identifying the post
    EmptyResponse,
    /// Anything else the vendor reported
    Posting,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FailureKind::Authentication => "authentication",
            FailureKind::Rejected => "rejected",
            FailureKind::RateLimit => "rate limit",
            FailureKind::Network => "network",
            FailureKind::Timeout => "timeout",
            FailureKind::EmptyResponse => "empty response",
            FailureKind::Posting => "posting",
        };
        f.write_str(label)
    }
}

impl From<u16> for FailureKind {
    /// Classify an HTTP status code returned by a vendor API
    fn from(status: u16) -> Self {
        match status {
            401 | 403 => FailureKind::Authentication,
            429 => FailureKind::RateLimit,
            400..=499 => FailureKind::Rejected,
            500..=599 => FailureKind::Network,
            _ => FailureKind::Posting,
        }
    }
}
