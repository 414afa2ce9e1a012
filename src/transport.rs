use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::error::{AvatarError, Result};
use crate::models::{ChatRequest, ChatResponse, ImageRequest, ImageResponse};

pub const CHAT_PROVIDER: &str = "chat provider";
pub const IMAGE_PROVIDER: &str = "image provider";

#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn chat(&self, req: &ChatRequest) -> Result<ChatResponse>;
}

#[async_trait]
pub trait ImageTransport: Send + Sync {
    async fn generate(&self, req: &ImageRequest) -> Result<ImageResponse>;
}

/// Client for an OpenAI-compatible chat completions endpoint. One attempt
/// per request; the pipeline deliberately does not retry.
pub struct HttpChatTransport {
    client: Client,
    api_url: String,
    api_key: String,
}

impl HttpChatTransport {
    pub fn new(api_url: String, api_key: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AvatarError::Internal(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            api_url,
            api_key,
        })
    }
}

#[async_trait]
impl ChatTransport for HttpChatTransport {
    async fn chat(&self, req: &ChatRequest) -> Result<ChatResponse> {
        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(req)
            .send()
            .await
            .map_err(|e| send_error(CHAT_PROVIDER, e))?;

        let status = response.status();
        if status.is_success() {
            response.json().await.map_err(|e| {
                AvatarError::Internal(format!("Failed to parse chat provider response: {e}"))
            })
        } else {
            Err(status_error(CHAT_PROVIDER, status, response).await)
        }
    }
}

/// Client for a Together-style image generations endpoint.
pub struct HttpImageTransport {
    client: Client,
    api_url: String,
    api_key: String,
}

impl HttpImageTransport {
    pub fn new(api_url: String, api_key: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AvatarError::Internal(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            api_url,
            api_key,
        })
    }
}

#[async_trait]
impl ImageTransport for HttpImageTransport {
    async fn generate(&self, req: &ImageRequest) -> Result<ImageResponse> {
        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(req)
            .send()
            .await
            .map_err(|e| send_error(IMAGE_PROVIDER, e))?;

        let status = response.status();
        if status.is_success() {
            response.json().await.map_err(|e| {
                AvatarError::Internal(format!("Failed to parse image provider response: {e}"))
            })
        } else {
            Err(status_error(IMAGE_PROVIDER, status, response).await)
        }
    }
}

fn send_error(provider: &'static str, e: reqwest::Error) -> AvatarError {
    let reason = if e.is_timeout() {
        "request timed out".to_string()
    } else if e.is_connect() {
        "connection failed".to_string()
    } else {
        format!("transport error: {e}")
    };
    AvatarError::UpstreamUnavailable { provider, reason }
}

async fn status_error(
    provider: &'static str,
    status: reqwest::StatusCode,
    response: reqwest::Response,
) -> AvatarError {
    // Bodies can carry provider stack traces; log them, never forward them.
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<unreadable body>".to_string());
    tracing::warn!(provider, %status, body, "Upstream returned error status");

    classify_status(provider, status)
}

fn classify_status(provider: &'static str, status: reqwest::StatusCode) -> AvatarError {
    if status.is_client_error() {
        AvatarError::UpstreamRejected {
            provider,
            reason: format!("declined the request (HTTP {status})"),
        }
    } else {
        AvatarError::UpstreamUnavailable {
            provider,
            reason: format!("returned HTTP {status}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_4xx_maps_to_rejected() {
        let err = classify_status(CHAT_PROVIDER, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(matches!(err, AvatarError::UpstreamRejected { .. }));
    }

    #[test]
    fn test_5xx_maps_to_unavailable() {
        let err = classify_status(IMAGE_PROVIDER, StatusCode::SERVICE_UNAVAILABLE);
        assert!(matches!(err, AvatarError::UpstreamUnavailable { .. }));
    }

    #[test]
    fn test_status_errors_do_not_carry_response_bodies() {
        let err = classify_status(CHAT_PROVIDER, StatusCode::BAD_REQUEST);
        assert!(!err.to_string().contains("Traceback"));
        assert!(err.to_string().contains("HTTP 400"));
    }
}
