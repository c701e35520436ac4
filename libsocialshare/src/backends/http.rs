//! Shared plumbing for backends that talk to plain REST APIs

use std::time::Duration;

use reqwest::Response;

use crate::error::{FailureKind, Result, ShareError};

const USER_AGENT: &str = concat!("socialshare/", env!("CARGO_PKG_VERSION"));

/// Longest slice of an error body kept in a failure message
const ERROR_BODY_LIMIT: usize = 200;

/// Client for one backend; `timeout` also bounds every request at the
/// transport level
pub(crate) fn build_client(network: &str, timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
        .map_err(|e| {
            ShareError::remote(
                network,
                FailureKind::Network,
                format!("failed to create HTTP client: {}", e),
            )
            .into()
        })
}

/// Join a configured base URL and an API path
pub(crate) fn endpoint(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Map a transport-level reqwest error to a share failure
pub(crate) fn map_request_error(network: &str, context: &str, error: reqwest::Error) -> ShareError {
    let kind = if error.is_timeout() {
        FailureKind::Timeout
    } else if let Some(status) = error.status() {
        FailureKind::from(status.as_u16())
    } else if error.is_decode() {
        FailureKind::EmptyResponse
    } else {
        FailureKind::Network
    };

    ShareError::remote(network, kind, format!("{}: {}", context, error))
}

/// Pass through successful responses; turn anything else into a failure
/// carrying the status and the start of the body
pub(crate) async fn expect_success(network: &str, context: &str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let body = crate::content::truncate_chars(body.trim(), ERROR_BODY_LIMIT);
    tracing::debug!(network, context, %status, body = %body, "Request rejected");

    Err(ShareError::remote(
        network,
        FailureKind::from(status.as_u16()),
        format!("{}: HTTP {}: {}", context, status, body),
    )
    .into())
}
