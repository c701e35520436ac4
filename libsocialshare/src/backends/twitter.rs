//! Twitter backend
//!
//! Shares become status updates and messages become direct messages, both
//! sent through the egg-mode client. The short text is used as the status;
//! when it is empty a status is composed from the headline (or message) and
//! the URL.

use std::time::Duration;

use async_trait::async_trait;
use egg_mode::direct::DraftMessage;
use egg_mode::tweet::DraftTweet;
use egg_mode::user::UserID;
use egg_mode::{KeyPair, Token};

use crate::backends::{interrupted, within_timeout, ShareBackend, ShareReceipt};
use crate::config::TwitterConfig;
use crate::content::{truncate_chars, ShareContent, SHORT_TEXT_LIMIT};
use crate::credentials::Credentials;
use crate::error::{FailureKind, Result, ShareError, SocialShareError};

/// Characters reserved for a link once t.co has wrapped it
pub const TCO_LINK_BUDGET: usize = 19;

pub struct TwitterBackend {
    token: Token,
    content: ShareContent,
    use_tco: bool,
    timeout: Duration,
}

impl TwitterBackend {
    /// The consumer pair is the application key; the api pair is the user's
    /// access token.
    pub fn new(
        credentials: Credentials,
        content: ShareContent,
        config: &TwitterConfig,
        timeout: Duration,
    ) -> Self {
        let token = Token::Access {
            consumer: KeyPair::new(
                credentials.consumer_token().unwrap_or_default().to_string(),
                credentials.consumer_secret().unwrap_or_default().to_string(),
            ),
            access: KeyPair::new(
                credentials.api_token().to_string(),
                credentials.api_secret().to_string(),
            ),
        };

        Self {
            token,
            content,
            use_tco: config.use_tco,
            timeout,
        }
    }

    /// Status text that will be posted
    pub fn status(&self) -> String {
        compose_status(&self.content, self.use_tco)
    }

    fn checked_status(&self) -> Result<String> {
        let status = self.status();
        if status.is_empty() {
            return Err(ShareError::remote(
                self.name(),
                FailureKind::Rejected,
                "nothing to post: short_text, headline, message and url are all empty",
            )
            .into());
        }
        Ok(status)
    }
}

#[async_trait]
impl ShareBackend for TwitterBackend {
    fn name(&self) -> &str {
        "twitter"
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
        let status = self.checked_status()?;
        tracing::debug!("Posting status to Twitter: {} characters", status.chars().count());

        let response = within_timeout(self.name(), self.timeout, async move {
            DraftTweet::new(status)
                .send(&self.token)
                .await
                .map_err(|e| SocialShareError::from(map_twitter_error(e, "update status")))
        })
        .await?;

        Ok(ShareReceipt::new(self.name()).with_remote_id(response.response.id.to_string()))
    }

    /// Recipients are numeric user ids or screen names, one call each. Sends
    /// stop at the first failure.
    async fn deliver(&self, recipients: &[String]) -> Result<ShareReceipt> {
        let text = self.checked_status()?;
        let mut receipt = ShareReceipt::new(self.name());

        for recipient in recipients {
            let context = format!("direct message to {}", recipient);
            let sent = within_timeout(self.name(), self.timeout, async {
                DraftMessage::new(text.clone(), user_id(recipient))
                    .send(&self.token)
                    .await
                    .map_err(|e| SocialShareError::from(map_twitter_error(e, &context)))
            })
            .await;

            match sent {
                Ok(response) => {
                    receipt.remote_ids.push(response.response.id.to_string());
                    receipt.delivered_to.push(recipient.clone());
                }
                Err(e) => return Err(interrupted(receipt, e)),
            }
        }

        Ok(receipt)
    }
}

/// Build status text from content
///
/// The short text wins when present. Otherwise the headline (or, failing
/// that, the message) is cut to leave room for a space and the URL: a fixed
/// [`TCO_LINK_BUDGET`] when links are t.co-wrapped, the URL's own length
/// when they are not.
pub fn compose_status(content: &ShareContent, use_tco: bool) -> String {
    if !content.short_text().is_empty() {
        return content.short_text().to_string();
    }

    let base = if content.headline().is_empty() {
        content.message()
    } else {
        content.headline()
    };
    let url = content.url();

    if url.is_empty() {
        return truncate_chars(base, SHORT_TEXT_LIMIT).trim_end().to_string();
    }

    let budget = if use_tco {
        SHORT_TEXT_LIMIT - TCO_LINK_BUDGET
    } else {
        SHORT_TEXT_LIMIT.saturating_sub(url.chars().count() + 1)
    };

    let text = truncate_chars(base, budget).trim_end();
    if text.is_empty() {
        url.to_string()
    } else {
        format!("{} {}", text, url)
    }
}

fn user_id(recipient: &str) -> UserID {
    match recipient.parse::<u64>() {
        Ok(id) => UserID::ID(id),
        Err(_) => UserID::ScreenName(recipient.trim_start_matches('@').to_string().into()),
    }
}

/// Map egg-mode errors to a share failure
fn map_twitter_error(error: egg_mode::error::Error, context: &str) -> ShareError {
    use egg_mode::error::Error;

    let kind = match &error {
        Error::RateLimit(_) => FailureKind::RateLimit,
        Error::NetError(_) => FailureKind::Network,
        Error::BadStatus(status) => FailureKind::from(status.as_u16()),
        Error::TwitterError(_, errors) => classify_error_codes(errors.errors.iter().map(|e| e.code)),
        Error::InvalidResponse(..) | Error::MissingValue(_) => FailureKind::EmptyResponse,
        _ => FailureKind::Posting,
    };

    ShareError::remote("twitter", kind, format!("{}: {}", context, error))
}

/// Classify Twitter API error codes; the first code with a known meaning wins
fn classify_error_codes(codes: impl IntoIterator<Item = i32>) -> FailureKind {
    codes
        .into_iter()
        .map(|code| match code {
            // bad, expired, suspended or revoked credentials
            32 | 64 | 89 | 135 | 215 | 326 => FailureKind::Authentication,
            88 | 185 => FailureKind::RateLimit,
            // over capacity, internal error
            130 | 131 => FailureKind::Network,
            // not allowed to DM, too long, duplicate, DMs closed
            150 | 151 | 186 | 187 | 349 => FailureKind::Rejected,
            _ => FailureKind::Posting,
        })
        .find(|kind| *kind != FailureKind::Posting)
        .unwrap_or(FailureKind::Posting)
}
