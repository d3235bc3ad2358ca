//! Batched push with exponential backoff.

use std::time::Duration;

use vigil_core::config::LokiConfig;
use vigil_core::constants::LOKI_MAX_BATCH_SIZE;
use vigil_core::errors::StorageError;
use vigil_core::interval::Intervals;
use vigil_core::traits::Cancellable;

use super::payload::{build_push_request, PushRequest};
use super::token::ClientCredentials;
use super::transport::LokiTransport;

/// Retry schedule for one batch: at most `steps` attempts, the n-th retry
/// waiting `base * factor^(n-1)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Backoff {
    pub steps: u32,
    pub factor: f64,
    pub base: Duration,
}

impl Backoff {
    /// Wait before the given retry (1-based).
    pub fn delay(&self, retry: u32) -> Duration {
        let exponent = i32::try_from(retry.saturating_sub(1)).unwrap_or(i32::MAX);
        let secs = self.base.as_secs_f64() * self.factor.powi(exponent);
        Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
    }

    /// Total attempts, never fewer than one.
    pub fn attempts(&self) -> u32 {
        self.steps.max(1)
    }
}

#[derive(Debug, Clone)]
pub struct UploadSettings {
    pub push_url: String,
    /// Pushes are unauthenticated without credentials.
    pub credentials: Option<ClientCredentials>,
    pub invoker: String,
    pub batch_size: usize,
    pub backoff: Backoff,
}

impl UploadSettings {
    /// `None` when no push URL is configured.
    pub fn from_config(config: &LokiConfig) -> Option<Self> {
        let push_url = config.push_url.clone().filter(|u| !u.is_empty())?;
        let credentials = match (&config.token_url, &config.client_id, &config.client_secret) {
            (Some(token_url), Some(client_id), Some(client_secret)) => Some(ClientCredentials {
                token_url: token_url.clone(),
                client_id: client_id.clone(),
                client_secret: client_secret.clone(),
            }),
            _ => None,
        };
        Some(Self {
            push_url,
            credentials,
            invoker: config.effective_invoker().to_string(),
            batch_size: config.effective_batch_size().clamp(1, LOKI_MAX_BATCH_SIZE),
            backoff: Backoff {
                steps: config.effective_backoff_steps(),
                factor: config.effective_backoff_factor(),
                base: config.effective_backoff_base(),
            },
        })
    }
}

/// Advisory outcome of an upload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UploadReport {
    pub batches_sent: usize,
    pub batches_failed: usize,
    pub entries_sent: usize,
}

impl UploadReport {
    pub fn is_complete(&self) -> bool {
        self.batches_failed == 0
    }
}

pub struct LokiUploader<T: LokiTransport> {
    transport: T,
    settings: UploadSettings,
}

impl<T: LokiTransport> LokiUploader<T> {
    pub fn new(transport: T, settings: UploadSettings) -> Self {
        Self {
            transport,
            settings,
        }
    }

    pub fn settings(&self) -> &UploadSettings {
        &self.settings
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Push `intervals` in batches. Only a failed token exchange is returned
    /// as an error; batch failures are logged and counted. Cancellation stops
    /// before the next batch or retry.
    pub fn upload(
        &self,
        intervals: &Intervals,
        cancel: &dyn Cancellable,
    ) -> Result<UploadReport, StorageError> {
        let mut report = UploadReport::default();
        if intervals.is_empty() {
            return Ok(report);
        }

        let token = match &self.settings.credentials {
            Some(credentials) => Some(self.transport.exchange_token(credentials)?),
            None => None,
        };
        let bearer = token.as_ref().map(|t| t.access_token.as_str());

        for (batch, chunk) in intervals.chunks(self.settings.batch_size.max(1)).enumerate() {
            if cancel.is_cancelled() {
                tracing::info!(event = "loki_upload_cancelled", batch, "stopping upload");
                break;
            }
            let request = match build_push_request(chunk, &self.settings.invoker) {
                Ok(request) => request,
                Err(e) => {
                    tracing::warn!(event = "loki_batch_unencodable", batch, error = %e);
                    report.batches_failed += 1;
                    continue;
                }
            };
            match self.push_with_retry(batch, bearer, &request, cancel) {
                Ok(()) => {
                    report.batches_sent += 1;
                    report.entries_sent += request.entry_count();
                }
                Err(e) => {
                    tracing::warn!(event = "loki_batch_failed", batch, error = %e);
                    report.batches_failed += 1;
                }
            }
        }

        tracing::info!(
            event = "loki_upload_finished",
            batches_sent = report.batches_sent,
            batches_failed = report.batches_failed,
            entries_sent = report.entries_sent,
        );
        Ok(report)
    }

    /// A cancelled upload gives up on the batch instead of sleeping out the
    /// backoff.
    fn push_with_retry(
        &self,
        batch: usize,
        bearer: Option<&str>,
        request: &PushRequest,
        cancel: &dyn Cancellable,
    ) -> Result<(), StorageError> {
        let attempts = self.settings.backoff.attempts();
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.transport.push(&self.settings.push_url, bearer, request) {
                Ok(()) => return Ok(()),
                Err(e) if !e.retryable || attempt >= attempts => {
                    return Err(StorageError::PushFailed {
                        batch,
                        attempts: attempt,
                        reason: e.reason,
                    });
                }
                Err(e) if cancel.is_cancelled() => {
                    return Err(StorageError::PushFailed {
                        batch,
                        attempts: attempt,
                        reason: format!("upload cancelled after: {}", e.reason),
                    });
                }
                Err(e) => {
                    let delay = self.settings.backoff.delay(attempt);
                    tracing::debug!(
                        event = "loki_push_retry",
                        batch,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        reason = %e.reason,
                    );
                    if !delay.is_zero() {
                        std::thread::sleep(delay);
                    }
                }
            }
        }
    }
}
