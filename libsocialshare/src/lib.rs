//! socialshare - share to multiple social networks at one time
//!
//! This library puts Twitter, LinkedIn and Facebook behind one share /
//! send-message contract. Callers build content once, name the networks to
//! reach, and get back one result per network. Authentication is not done
//! here: bring OAuth tokens you already hold.

pub mod backends;
pub mod config;
pub mod content;
pub mod credentials;
pub mod error;
pub mod registry;
pub mod share;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Re-export commonly used types
pub use backends::{ShareBackend, ShareReceipt};
pub use config::Config;
pub use content::{ContentFields, ShareContent};
pub use credentials::Credentials;
pub use error::{FailureKind, Result, ShareError, SocialShareError};
pub use registry::{BackendKind, BackendRegistry};
pub use share::{Share, ShareDescriptor, ShareResult};
