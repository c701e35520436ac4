//! LinkedIn backend
//!
//! Shares go to the member's share feed; messages go through the mailbox
//! API with the headline as subject. Both authenticate with the access
//! token as a bearer token.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::backends::http::{build_client, endpoint, expect_success, map_request_error};
use crate::backends::{interrupted, within_timeout, ShareBackend, ShareReceipt};
use crate::config::{LinkedInConfig, Visibility};
use crate::content::ShareContent;
use crate::credentials::Credentials;
use crate::error::{Result, SocialShareError};

/// Most recipients the mailbox API accepts per message
pub const MAX_RECIPIENTS_PER_MESSAGE: usize = 10;

pub struct LinkedInBackend {
    client: reqwest::Client,
    api_base: String,
    visibility: Visibility,
    credentials: Credentials,
    content: ShareContent,
    timeout: Duration,
}

#[derive(Debug, Serialize)]
struct ShareRequest<'a> {
    comment: &'a str,
    content: ShareRequestContent<'a>,
    visibility: VisibilityCode<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "kebab-case")]
struct ShareRequestContent<'a> {
    #[serde(skip_serializing_if = "str::is_empty")]
    title: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    submitted_url: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    submitted_image_url: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    description: &'a str,
}

#[derive(Debug, Serialize)]
struct VisibilityCode<'a> {
    code: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ShareResponse {
    update_key: Option<String>,
}

#[derive(Debug, Serialize)]
struct MessageRequest<'a> {
    recipients: MessageRecipients,
    subject: &'a str,
    body: &'a str,
}

#[derive(Debug, Serialize)]
struct MessageRecipients {
    values: Vec<MessageRecipient>,
}

#[derive(Debug, Serialize)]
struct MessageRecipient {
    person: PersonPath,
}

#[derive(Debug, Serialize)]
struct PersonPath {
    #[serde(rename = "_path")]
    path: String,
}

impl LinkedInBackend {
    pub fn new(
        credentials: Credentials,
        content: ShareContent,
        config: &LinkedInConfig,
        timeout: Duration,
    ) -> Result<Self> {
        Ok(Self {
            client: build_client("linkedin", timeout)?,
            api_base: config.api_base.clone(),
            visibility: config.visibility,
            credentials,
            content,
            timeout,
        })
    }

    fn share_request(&self) -> ShareRequest<'_> {
        ShareRequest {
            comment: self.content.message(),
            content: ShareRequestContent {
                title: self.content.headline(),
                submitted_url: self.content.url(),
                submitted_image_url: self.content.image_url(),
                description: self.content.excerpt(),
            },
            visibility: VisibilityCode {
                code: self.visibility.code(),
            },
        }
    }

    fn message_request<'a>(&'a self, recipients: &[String]) -> MessageRequest<'a> {
        MessageRequest {
            recipients: MessageRecipients {
                values: recipients
                    .iter()
                    .map(|id| MessageRecipient {
                        person: PersonPath {
                            path: format!("/people/{}", id),
                        },
                    })
                    .collect(),
            },
            subject: self.content.headline(),
            body: self.content.message(),
        }
    }

    /// One mailbox request per [`MAX_RECIPIENTS_PER_MESSAGE`] recipients, in
    /// order
    fn message_batches<'a>(&'a self, recipients: &[String]) -> Vec<MessageRequest<'a>> {
        recipients
            .chunks(MAX_RECIPIENTS_PER_MESSAGE)
            .map(|batch| self.message_request(batch))
            .collect()
    }
}

#[async_trait]
impl ShareBackend for LinkedInBackend {
    fn name(&self) -> &str {
        "linkedin"
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
        let url = endpoint(&self.api_base, "people/~/shares");
        tracing::debug!(%url, visibility = self.visibility.code(), "Posting LinkedIn share");

        let body = within_timeout(self.name(), self.timeout, async {
            let response = self
                .client
                .post(&url)
                .query(&[("format", "json")])
                .bearer_auth(self.credentials.access_token())
                .json(&self.share_request())
                .send()
                .await
                .map_err(|e| map_request_error(self.name(), "share update", e))?;
            let response = expect_success(self.name(), "share update", response).await?;

            response
                .text()
                .await
                .map_err(|e| SocialShareError::from(map_request_error(self.name(), "share update", e)))
        })
        .await?;

        // LinkedIn answers 201 with an update key; an empty body still means
        // the share was accepted.
        let update_key = serde_json::from_str::<ShareResponse>(&body)
            .ok()
            .and_then(|r| r.update_key);

        let mut receipt = ShareReceipt::new(self.name());
        if let Some(key) = update_key {
            receipt.remote_ids.push(key);
        }
        Ok(receipt)
    }

    /// Recipients are LinkedIn member ids, sent in batches of
    /// [`MAX_RECIPIENTS_PER_MESSAGE`] with one call per batch. Sends stop at
    /// the first failed batch.
    async fn deliver(&self, recipients: &[String]) -> Result<ShareReceipt> {
        let url = endpoint(&self.api_base, "people/~/mailbox");
        let mut receipt = ShareReceipt::new(self.name());

        let batches = recipients
            .chunks(MAX_RECIPIENTS_PER_MESSAGE)
            .zip(self.message_batches(recipients));
        for (batch, request) in batches {
            tracing::debug!(%url, recipients = batch.len(), "Sending LinkedIn message");

            let sent = within_timeout(self.name(), self.timeout, async {
                let response = self
                    .client
                    .post(&url)
                    .bearer_auth(self.credentials.access_token())
                    .json(&request)
                    .send()
                    .await
                    .map_err(|e| map_request_error(self.name(), "send message", e))?;
                expect_success(self.name(), "send message", response).await
            })
            .await;

            match sent {
                Ok(_) => receipt.delivered_to.extend(batch.iter().cloned()),
                Err(e) => return Err(interrupted(receipt, e)),
            }
        }

        Ok(receipt)
    }
}
