//! HTTP client for the contact endpoint.
//!
//! Mirrors what the website does on submit: one POST with a 10 second
//! timeout, no retries, and three distinct failure categories (timeout,
//! rejection by the server, no connection).

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::api::SubmitResponse;
use crate::models::inquiry::InquiryDraft;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const CONTACT_PATH: &str = "/api/contact";

#[derive(Debug, Error)]
pub enum ContactClientError {
    #[error("Request timed out. Please check your connection and try again.")]
    Timeout,

    /// The server answered with a non-success status.
    #[error("{message}")]
    Rejected { status: u16, message: String },

    #[error("Unable to connect to server. Please check your internet connection.")]
    Unreachable(#[source] reqwest::Error),

    #[error("Something went wrong. Please try again later.")]
    Unexpected(String),
}

#[derive(Debug, Deserialize)]
struct ErrorMessage {
    message: Option<String>,
}

#[derive(Clone)]
pub struct ContactClient {
    client: Client,
    endpoint: Url,
}

impl ContactClient {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let endpoint = Url::parse(base_url)
            .and_then(|base| base.join(CONTACT_PATH))
            .map_err(|e| anyhow::anyhow!("Invalid API base URL '{base_url}': {e}"))?;

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("Atelier/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {e}"))?;

        Ok(Self { client, endpoint })
    }

    #[must_use]
    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub async fn submit(&self, draft: &InquiryDraft) -> Result<SubmitResponse, ContactClientError> {
        debug!("Submitting inquiry to {}", self.endpoint);

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(draft)
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();

        if status.is_success() {
            return response.json::<SubmitResponse>().await.map_err(|e| {
                if e.is_timeout() {
                    ContactClientError::Timeout
                } else {
                    ContactClientError::Unexpected(e.to_string())
                }
            });
        }

        let message = response
            .json::<ErrorMessage>()
            .await
            .ok()
            .and_then(|body| body.message)
            .unwrap_or_else(|| fallback_message(status));

        Err(ContactClientError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}

fn classify(err: reqwest::Error) -> ContactClientError {
    if err.is_timeout() {
        ContactClientError::Timeout
    } else {
        ContactClientError::Unreachable(err)
    }
}

fn fallback_message(status: StatusCode) -> String {
    format!("Server error: {}", status.as_u16())
}
