//! Artifact storage and upload errors.

use super::error_code::{self, VigilErrorCode};

/// Errors raised while writing artifacts or pushing to the log store.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization failed for {artifact}: {message}")]
    Serialization { artifact: String, message: String },

    #[error("HTTP transport unavailable: {reason}")]
    Transport { reason: String },

    #[error("token exchange failed: {reason}")]
    TokenExchange { reason: String },

    #[error("push of batch {batch} failed after {attempts} attempts: {reason}")]
    PushFailed {
        batch: usize,
        attempts: u32,
        reason: String,
    },
}

impl VigilErrorCode for StorageError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Transport { .. } | Self::TokenExchange { .. } | Self::PushFailed { .. } => {
                error_code::UPLOAD_ERROR
            }
            _ => error_code::STORAGE_ERROR,
        }
    }
}
