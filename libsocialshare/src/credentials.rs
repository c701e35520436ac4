//! Per-network credentials
//!
//! Credentials are handed in by the caller; nothing here talks to an OAuth
//! provider or checks that a token is still good. Secrets are held in
//! [`SecretString`] so they are zeroed on drop and redacted from `Debug`
//! output.

use secrecy::{ExposeSecret, SecretString};

/// OAuth token/secret pairs for one network
///
/// `api_token`/`api_secret` identify the application; the optional consumer
/// pair identifies the user account being posted as.
#[derive(Debug)]
pub struct Credentials {
    api_token: String,
    api_secret: SecretString,
    consumer_token: Option<String>,
    consumer_secret: Option<SecretString>,
}

impl Credentials {
    pub fn new(api_token: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_token: api_token.into().trim().to_string(),
            api_secret: secret(api_secret.into()),
            consumer_token: None,
            consumer_secret: None,
        }
    }

    /// Attach a consumer token/secret pair
    ///
    /// Blank values are treated as absent.
    #[must_use]
    pub fn with_consumer(
        mut self,
        consumer_token: impl Into<String>,
        consumer_secret: impl Into<String>,
    ) -> Self {
        self.consumer_token = non_blank(consumer_token.into());
        self.consumer_secret = non_blank(consumer_secret.into()).map(secret);
        self
    }

    /// Copy of these credentials with the consumer pair overridden
    ///
    /// Each override only applies when it is present and non-blank; otherwise
    /// the current value is kept.
    pub fn overridden_by(&self, consumer_token: Option<&str>, consumer_secret: Option<&str>) -> Self {
        let mut credentials = self.clone();
        if let Some(token) = consumer_token.and_then(|t| non_blank(t.to_string())) {
            credentials.consumer_token = Some(token);
        }
        if let Some(secret_value) = consumer_secret.and_then(|s| non_blank(s.to_string())) {
            credentials.consumer_secret = Some(secret(secret_value));
        }
        credentials
    }

    pub fn api_token(&self) -> &str {
        &self.api_token
    }

    pub fn api_secret(&self) -> &str {
        self.api_secret.expose_secret()
    }

    pub fn consumer_token(&self) -> Option<&str> {
        self.consumer_token.as_deref()
    }

    pub fn consumer_secret(&self) -> Option<&str> {
        self.consumer_secret.as_ref().map(|s| s.expose_secret())
    }

    /// Token a network should treat as the user's access token
    ///
    /// The consumer token when one is set, the api token otherwise.
    pub fn access_token(&self) -> &str {
        self.consumer_token().unwrap_or(&self.api_token)
    }
}

impl Clone for Credentials {
    fn clone(&self) -> Self {
        Self {
            api_token: self.api_token.clone(),
            api_secret: secret(self.api_secret().to_string()),
            consumer_token: self.consumer_token.clone(),
            consumer_secret: self.consumer_secret().map(|s| secret(s.to_string())),
        }
    }
}

fn secret(value: String) -> SecretString {
    SecretString::from(value.trim().to_string())
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_values_are_trimmed() {
        let credentials = Credentials::new(" token ", "\tshh\n").with_consumer(" ct", "hush ");

        assert_eq!(credentials.api_token(), "token");
        assert_eq!(credentials.api_secret(), "shh");
        assert_eq!(credentials.consumer_token(), Some("ct"));
        assert_eq!(credentials.consumer_secret(), Some("hush"));
    }

    #[test]
    fn test_blank_consumer_is_absent() {
        let credentials = Credentials::new("token", "shh").with_consumer("  ", "");
        assert_eq!(credentials.consumer_token(), None);
        assert_eq!(credentials.consumer_secret(), None);
        assert_eq!(credentials.access_token(), "token");
    }

    #[test]
    fn test_override_falls_back_to_defaults() {
        let defaults = Credentials::new("token", "shh").with_consumer("default-ct", "default-cs");

        let overridden = defaults.overridden_by(Some("t"), Some("s"));
        assert_eq!(overridden.consumer_token(), Some("t"));
        assert_eq!(overridden.consumer_secret(), Some("s"));

        let partial = defaults.overridden_by(None, Some(""));
        assert_eq!(partial.consumer_token(), Some("default-ct"));
        assert_eq!(partial.consumer_secret(), Some("default-cs"));

        // The source credentials are untouched
        assert_eq!(defaults.consumer_token(), Some("default-ct"));
    }

    #[test]
    fn test_access_token_prefers_consumer() {
        let credentials = Credentials::new("app", "shh").with_consumer("user", "hush");
        assert_eq!(credentials.access_token(), "user");
    }

    #[test]
    fn test_debug_output_redacts_secrets() {
        let credentials = Credentials::new("token", "super-secret").with_consumer("ct", "hush-hush");
        let debug = format!("{:?}", credentials);

        assert!(debug.contains("token"));
        assert!(!debug.contains("super-secret"));
        assert!(!debug.contains("hush-hush"));
    }

    #[test]
    fn test_clone_keeps_secrets() {
        let credentials = Credentials::new("token", "shh").with_consumer("ct", "hush");
        let cloned = credentials.clone();
        assert_eq!(cloned.api_secret(), "shh");
        assert_eq!(cloned.consumer_secret(), Some("hush"));
    }
}
