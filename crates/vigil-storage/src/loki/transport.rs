//! HTTP transport behind the uploader.

use std::time::Duration;

use vigil_core::errors::StorageError;

use super::payload::PushRequest;
use super::token::{parse_token_response, AccessToken, ClientCredentials};

/// One failed push attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushAttemptError {
    pub reason: String,
    /// Client errors other than throttling are not retried.
    pub retryable: bool,
}

/// The network side of an upload, replaceable in tests.
pub trait LokiTransport: Send + Sync {
    fn exchange_token(&self, credentials: &ClientCredentials) -> Result<AccessToken, StorageError>;

    fn push(
        &self,
        push_url: &str,
        bearer: Option<&str>,
        request: &PushRequest,
    ) -> Result<(), PushAttemptError>;
}

impl<T: LokiTransport + ?Sized> LokiTransport for Box<T> {
    fn exchange_token(&self, credentials: &ClientCredentials) -> Result<AccessToken, StorageError> {
        (**self).exchange_token(credentials)
    }

    fn push(
        &self,
        push_url: &str,
        bearer: Option<&str>,
        request: &PushRequest,
    ) -> Result<(), PushAttemptError> {
        (**self).push(push_url, bearer, request)
    }
}

/// Blocking `reqwest` transport with gzip and a per-request timeout.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, StorageError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .gzip(true)
            .build()
            .map_err(|e| StorageError::Transport {
                reason: e.to_string(),
            })?;
        Ok(Self { client })
    }
}

fn truncated(body: &str) -> &str {
    let mut end = body.len().min(200);
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}

impl LokiTransport for HttpTransport {
    fn exchange_token(&self, credentials: &ClientCredentials) -> Result<AccessToken, StorageError> {
        let response = self
            .client
            .post(&credentials.token_url)
            .form(&credentials.form())
            .send()
            .map_err(|e| StorageError::TokenExchange {
                reason: format!("token request failed: {e}"),
            })?;
        let status = response.status();
        let body = response.text().map_err(|e| StorageError::TokenExchange {
            reason: format!("failed to read token response: {e}"),
        })?;
        if !status.is_success() && !body.trim_start().starts_with('{') {
            return Err(StorageError::TokenExchange {
                reason: format!("HTTP {status}: {}", truncated(&body)),
            });
        }
        parse_token_response(&body)
    }

    fn push(
        &self,
        push_url: &str,
        bearer: Option<&str>,
        request: &PushRequest,
    ) -> Result<(), PushAttemptError> {
        let mut builder = self.client.post(push_url).json(request);
        if let Some(token) = bearer {
            builder = builder.bearer_auth(token);
        }
        match builder.send() {
            Ok(response) if response.status().is_success() => Ok(()),
            Ok(response) => {
                let status = response.status();
                let body = response.text().unwrap_or_default();
                Err(PushAttemptError {
                    reason: format!("HTTP {status}: {}", truncated(&body)),
                    retryable: !status.is_client_error()
                        || status == reqwest::StatusCode::TOO_MANY_REQUESTS,
                })
            }
            Err(e) => Err(PushAttemptError {
                reason: e.to_string(),
                retryable: true,
            }),
        }
    }
}
