///! Failure taxonomy for one fetch-and-normalize attempt
///!
///! Every failure is classified into exactly one of four kinds. Status
///! inspection happens before the body is touched, so an HTTP error is never
///! reported as a payload problem.

use std::error::Error as _;

use reqwest::StatusCode;
use thiserror::Error;

use crate::module::locale::Messages;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeedFailure {
    /// The feed answered 403; the shared key is out of quota.
    #[error("feed quota exceeded (HTTP 403)")]
    QuotaExceeded,

    /// Any other non-success status.
    #[error("feed returned HTTP {0}")]
    Http(u16),

    /// The request never produced a complete response.
    #[error("network failure: {0}")]
    Network(String),

    /// The body was readable but not shaped the way the normalizer needs.
    #[error("malformed payload: {0}")]
    MalformedPayload(String),
}

impl FeedFailure {
    /// `None` for success statuses.
    pub fn from_status(status: StatusCode) -> Option<Self> {
        if status.is_success() {
            None
        } else if status == StatusCode::FORBIDDEN {
            Some(FeedFailure::QuotaExceeded)
        } else {
            Some(FeedFailure::Http(status.as_u16()))
        }
    }

    /// Classify a transport error. The request URL is stripped because it
    /// carries the API key.
    pub fn from_transport(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            if let Some(failure) = Self::from_status(status) {
                return failure;
            }
        }
        FeedFailure::Network(describe_transport_error(err))
    }

    pub fn malformed(detail: impl Into<String>) -> Self {
        FeedFailure::MalformedPayload(detail.into())
    }

    /// Stable label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            FeedFailure::QuotaExceeded => "quota_exceeded",
            FeedFailure::Http(_) => "http_error",
            FeedFailure::Network(_) => "network_error",
            FeedFailure::MalformedPayload(_) => "malformed_payload",
        }
    }

    /// The one message shown to the user for this attempt.
    pub fn user_message(&self, messages: &Messages) -> String {
        match self {
            FeedFailure::QuotaExceeded => messages.quota_exceeded().to_string(),
            FeedFailure::Http(status) => messages.http_error(*status),
            FeedFailure::Network(detail) => messages.network_error(detail),
            FeedFailure::MalformedPayload(_) => messages.malformed_payload().to_string(),
        }
    }
}

fn describe_transport_error(err: reqwest::Error) -> String {
    let err = err.without_url();
    let mut parts: Vec<String> = Vec::new();

    if err.is_timeout() {
        parts.push("request timed out".to_string());
    } else if err.is_connect() {
        parts.push("connection failed".to_string());
    }
    parts.push(err.to_string());

    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !parts.contains(&text) {
            parts.push(text);
        }
        source = cause.source();
    }

    parts.join(": ")
}
