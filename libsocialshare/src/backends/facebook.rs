//! Facebook backend
//!
//! Uses the Graph API: shares are posts to `me/feed`, messages are posts to
//! `me/outbox`. A successful Graph call answers with the new object's id;
//! an answer without one is treated as a failure.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::backends::http::{build_client, endpoint, expect_success, map_request_error};
use crate::backends::{within_timeout, ShareBackend, ShareReceipt};
use crate::config::FacebookConfig;
use crate::content::ShareContent;
use crate::credentials::Credentials;
use crate::error::{FailureKind, Result, ShareError, SocialShareError};

pub struct FacebookBackend {
    client: reqwest::Client,
    graph_base: String,
    credentials: Credentials,
    content: ShareContent,
    timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct GraphResponse {
    id: Option<String>,
}

impl FacebookBackend {
    pub fn new(
        credentials: Credentials,
        content: ShareContent,
        config: &FacebookConfig,
        timeout: Duration,
    ) -> Result<Self> {
        Ok(Self {
            client: build_client("facebook", timeout)?,
            graph_base: config.graph_base.clone(),
            credentials,
            content,
            timeout,
        })
    }

    /// Form parameters for a feed or outbox post, skipping empty values
    fn params(&self, recipients: Option<&str>) -> Vec<(&'static str, String)> {
        let mut params = vec![("message", self.content.message().to_string())];
        if !self.content.image_url().is_empty() {
            params.push(("picture", self.content.image_url().to_string()));
        }
        if !self.content.url().is_empty() {
            params.push(("link", self.content.url().to_string()));
        }
        if let Some(to) = recipients {
            params.push(("to", to.to_string()));
        }
        params.push(("access_token", self.credentials.access_token().to_string()));
        params
    }

    /// One Graph API call, bounded by the backend timeout
    async fn post_graph(&self, path: &str, context: &str, params: &[(&'static str, String)]) -> Result<String> {
        let url = endpoint(&self.graph_base, path);
        tracing::debug!(%url, "Posting to Facebook Graph API");

        let body = within_timeout(self.name(), self.timeout, async {
            let response = self
                .client
                .post(&url)
                .form(params)
                .send()
                .await
                .map_err(|e| map_request_error(self.name(), context, e))?;
            let response = expect_success(self.name(), context, response).await?;

            response
                .text()
                .await
                .map_err(|e| SocialShareError::from(map_request_error(self.name(), context, e)))
        })
        .await?;

        graph_object_id(&body).ok_or_else(|| {
            ShareError::remote(
                self.name(),
                FailureKind::EmptyResponse,
                format!("{}: no id in response", context),
            )
            .into()
        })
    }
}

#[async_trait]
impl ShareBackend for FacebookBackend {
    fn name(&self) -> &str {
        "facebook"
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
        let id = self
            .post_graph("me/feed", "post to feed", &self.params(None))
            .await?;
        Ok(ShareReceipt::new(self.name()).with_remote_id(id))
    }

    /// Recipients are Facebook user ids; one outbox post reaches all of them.
    async fn deliver(&self, recipients: &[String]) -> Result<ShareReceipt> {
        let to = recipients.join(",");
        let id = self
            .post_graph("me/outbox", "post to outbox", &self.params(Some(&to)))
            .await?;

        let mut receipt = ShareReceipt::new(self.name()).with_remote_id(id);
        receipt.delivered_to = recipients.to_vec();
        Ok(receipt)
    }
}

/// Object id from a Graph API response body
fn graph_object_id(body: &str) -> Option<String> {
    serde_json::from_str::<GraphResponse>(body)
        .ok()
        .and_then(|r| r.id)
        .filter(|id| !id.is_empty())
}
