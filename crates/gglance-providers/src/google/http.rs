//! Shared request plumbing for the Google REST clients.

use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::warn;

use crate::error::{ProviderError, ProviderResult};

/// Builds the HTTP client used by the resource clients.
pub(crate) fn build_client(timeout: Duration, user_agent: &str) -> ProviderResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(user_agent)
        .build()
        .map_err(|e| ProviderError::configuration(format!("failed to create HTTP client: {}", e)))
}

/// Sends `request` and decodes a JSON body, mapping HTTP failures to
/// provider errors tagged with `service`.
pub(crate) async fn send_json<T: DeserializeOwned>(
    request: reqwest::RequestBuilder,
    service: &str,
) -> ProviderResult<T> {
    let response = request
        .send()
        .await
        .map_err(|e| ProviderError::from_transport("request failed", e).with_provider(service))?;

    let status = response.status();

    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get("Retry-After")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok());
        return Err(ProviderError::rate_limited(format!(
            "rate limit exceeded{}",
            retry_after
                .map(|s| format!(", retry after {} seconds", s))
                .unwrap_or_default()
        ))
        .with_provider(service));
    }

    if status == reqwest::StatusCode::UNAUTHORIZED {
        return Err(
            ProviderError::authentication("access token expired or invalid").with_provider(service)
        );
    }

    if status == reqwest::StatusCode::FORBIDDEN {
        let body = response.text().await.unwrap_or_default();
        warn!(service, "access denied: {}", body);
        return Err(ProviderError::authorization(format!("access denied ({})", status))
            .with_provider(service));
    }

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(
            ProviderError::server(format!("API error ({}): {}", status, body)).with_provider(service)
        );
    }

    let body = response.text().await.map_err(|e| {
        ProviderError::from_transport("failed to read response", e).with_provider(service)
    })?;

    serde_json::from_str(&body).map_err(|e| {
        ProviderError::invalid_response(format!("failed to parse response: {}", e))
            .with_provider(service)
    })
}
