//! Best-effort upload of the final interval set to a Loki-compatible store.
//!
//! Uploading is advisory. Token exchange failures are returned to the caller,
//! failed batches are counted in the [`UploadReport`], and callers log both at
//! warn and carry on with the run.

pub mod payload;
pub mod token;
pub mod transport;
pub mod uploader;

pub use payload::{build_push_request, LokiStream, PushRequest};
pub use token::{parse_token_response, AccessToken, ClientCredentials};
pub use transport::{HttpTransport, LokiTransport, PushAttemptError};
pub use uploader::{Backoff, LokiUploader, UploadReport, UploadSettings};
