//! Debug backend
//!
//! Makes no network calls. Shares and messages come back as a receipt
//! echoing every submitted field, and can optionally be dumped to stdout.
//! Useful for exercising the whole dispatch path without live credentials.

use std::fmt::Write as _;
use std::time::Duration;

use async_trait::async_trait;

use crate::backends::{EchoField, ShareBackend, ShareReceipt};
use crate::config::DebugConfig;
use crate::content::ShareContent;
use crate::credentials::Credentials;
use crate::error::Result;

pub struct DebugBackend {
    credentials: Credentials,
    content: ShareContent,
    print: bool,
    timeout: Duration,
}

impl DebugBackend {
    pub fn new(
        credentials: Credentials,
        content: ShareContent,
        config: &DebugConfig,
        timeout: Duration,
    ) -> Self {
        Self {
            credentials,
            content,
            print: config.print,
            timeout,
        }
    }

    /// Echoed fields: the token identifiers, then every non-empty content
    /// field, then one `to` entry per recipient
    ///
    /// Secrets are never echoed.
    pub fn fields(&self, recipients: &[String]) -> Vec<EchoField> {
        let mut fields = vec![echo("api_token", self.credentials.api_token())];
        if let Some(token) = self.credentials.consumer_token() {
            fields.push(echo("consumer_token", token));
        }
        fields.extend(
            self.content
                .non_empty_fields()
                .into_iter()
                .map(|(name, value)| echo(name, value)),
        );
        fields.extend(recipients.iter().map(|to| echo("to", to)));
        fields
    }

    /// Human-readable dump of what would be sent
    pub fn render_dump(&self, recipients: &[String]) -> String {
        let mut dump = String::new();
        let consumer_token = self.credentials.consumer_token().unwrap_or("None");
        let _ = writeln!(dump, "consumer token: {}", consumer_token);
        for to in recipients {
            let _ = writeln!(dump, "to:             {}", to);
        }
        let subject_label = if recipients.is_empty() { "headline" } else { "subject" };
        let _ = writeln!(dump, "{:<16}{}", format!("{}:", subject_label), or_none(self.content.headline()));
        let _ = writeln!(dump, "excerpt:        {}", or_none(self.content.excerpt()));
        let _ = writeln!(dump, "message:        {}", or_none(self.content.message()));
        let _ = writeln!(dump, "url:            {}", or_none(self.content.url()));
        let _ = writeln!(dump, "image_url:      {}", or_none(self.content.image_url()));
        dump
    }

    fn receipt(&self, recipients: &[String]) -> ShareReceipt {
        if self.print {
            print!("{}", self.render_dump(recipients));
        }

        let mut receipt = ShareReceipt::new(self.name());
        receipt.fields = self.fields(recipients);
        receipt
    }
}

#[async_trait]
impl ShareBackend for DebugBackend {
    fn name(&self) -> &str {
        "debug"
    }

    fn content(&self) -> &ShareContent {
        &self.content
    }

    fn content_mut(&mut self) -> &mut ShareContent {
        &mut self.content
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn publish(&self) -> Result<ShareReceipt> {
        let receipt = self
            .receipt(&[])
            .with_remote_id(format!("debug:{}", uuid::Uuid::new_v4()));
        Ok(receipt)
    }

    async fn deliver(&self, recipients: &[String]) -> Result<ShareReceipt> {
        let mut receipt = self.receipt(recipients);
        for to in recipients {
            receipt.remote_ids.push(format!("debug:{}", uuid::Uuid::new_v4()));
            receipt.delivered_to.push(to.clone());
        }
        Ok(receipt)
    }
}

fn echo(name: &str, value: &str) -> EchoField {
    EchoField {
        name: name.to_string(),
        value: value.to_string(),
    }
}

fn or_none(value: &str) -> &str {
    if value.is_empty() {
        "None"
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ContentFields;
    use crate::error::{ShareError, SocialShareError};

    fn corgi_content() -> ShareContent {
        ShareContent::new(
            ContentFields::new()
                .message("Corgis are the new cats. Learn to love it.")
                .headline("Corgis are the new cats. Deal with it.")
                .excerpt("Corgis have displaced cats on the internet.")
                .short_text("Corgis = cats. Get over it.")
                .url("http://bit.ly/x0c2e8")
                .url_title("Corgis are the New Cats of Internet Culture")
                .url_description("According to GeekOut, corgis are the new cats.")
                .image_url("http://mrg.bz/oDTL0z")
                .image_url_title("Laughing Corgi is Laughing")
                .image_url_description("lolcorgis > lolcats"),
        )
    }

    fn backend(content: ShareContent) -> DebugBackend {
        DebugBackend::new(
            Credentials::new("token", "shh").with_consumer("ct", "hush"),
            content,
            &DebugConfig::default(),
            Duration::from_secs(1),
        )
    }

    #[tokio::test]
    async fn test_share_echoes_every_field() {
        let content = corgi_content();
        let backend = backend(content.clone());

        let receipt = backend.share().await.unwrap();

        assert_eq!(receipt.network, "debug");
        assert_eq!(receipt.field("api_token"), Some("token"));
        assert_eq!(receipt.field("consumer_token"), Some("ct"));
        for (name, value) in content.non_empty_fields() {
            assert_eq!(receipt.field(name), Some(value), "missing field {}", name);
        }
        assert_eq!(receipt.remote_ids.len(), 1);
        assert!(receipt.remote_ids[0].starts_with("debug:"));
    }

    #[tokio::test]
    async fn test_share_never_echoes_secrets() {
        let receipt = backend(corgi_content()).share().await.unwrap();
        assert!(!receipt.contains_value("shh"));
        assert!(!receipt.contains_value("hush"));
    }

    #[tokio::test]
    async fn test_share_skips_empty_fields() {
        let backend = backend(ShareContent::new(ContentFields::new().message("hello")));
        let receipt = backend.share().await.unwrap();

        assert_eq!(receipt.field("message"), Some("hello"));
        assert_eq!(receipt.field("headline"), None);
        assert_eq!(receipt.fields.len(), 3);
    }

    #[tokio::test]
    async fn test_send_message_lists_recipients() {
        let backend = backend(corgi_content());
        let to = vec!["1".to_string(), "2".to_string(), "3".to_string()];

        let receipt = backend.send_message(&to).await.unwrap();

        assert_eq!(receipt.delivered_to, to);
        assert_eq!(receipt.remote_ids.len(), 3);
        let echoed: Vec<&str> = receipt
            .fields
            .iter()
            .filter(|f| f.name == "to")
            .map(|f| f.value.as_str())
            .collect();
        assert_eq!(echoed, vec!["1", "2", "3"]);
    }

    #[tokio::test]
    async fn test_send_message_without_recipients() {
        let result = backend(corgi_content()).send_message(&[]).await;
        assert!(matches!(
            result,
            Err(SocialShareError::Share(ShareError::NoRecipients(_)))
        ));
    }

    #[test]
    fn test_render_dump() {
        let backend = backend(ShareContent::new(
            ContentFields::new().headline("Corgis").message("hello"),
        ));

        let dump = backend.render_dump(&[]);
        assert!(dump.contains("consumer token: ct"));
        assert!(dump.contains("headline:       Corgis"));
        assert!(dump.contains("message:        hello"));
        assert!(dump.contains("url:            None"));
        assert!(!dump.contains("to:"));

        let dump = backend.render_dump(&["42".to_string()]);
        assert!(dump.contains("to:             42"));
        assert!(dump.contains("subject:        Corgis"));
    }
}
