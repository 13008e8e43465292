//! Shared HTTP plumbing for the provider implementations.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response};
use tracing::{debug, warn};

use crate::error::ProviderError;

/// Default request timeout for provider calls.
pub(crate) const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

pub(crate) fn build_client(timeout: Duration) -> Result<Client, ProviderError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ProviderError::Config(e.to_string()))
}

/// Join a base endpoint and a path without doubling slashes.
pub(crate) fn join_url(endpoint: &str, path: &str) -> Result<String, ProviderError> {
    let base = endpoint.trim_end_matches('/');
    if base.is_empty() {
        return Err(ProviderError::Config(
            "no endpoint configured for this provider".to_string(),
        ));
    }
    Ok(format!("{}{}", base, path))
}

/// Send a request and turn non-success statuses into [`ProviderError::Http`].
pub(crate) async fn send(request: RequestBuilder, provider: &str) -> Result<Response, ProviderError> {
    let response = request.send().await?;
    let status = response.status();

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        warn!(provider, status = status.as_u16(), "Provider returned an error status");
        return Err(ProviderError::Http {
            provider: provider.to_string(),
            status: status.as_u16(),
            body,
        });
    }

    debug!(provider, status = status.as_u16(), "Provider responded");
    Ok(response)
}
