//! Typed errors crossing the remote-client boundary

use thiserror::Error;

/// Failure of a remote service call.
///
/// The orchestrator converts these into fallback or skipped-enrichment
/// behavior; they never escape [`crate::MetadataService::resolve`].
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("unexpected status {0}")]
    Status(reqwest::StatusCode),

    #[error("failed to decode response: {0}")]
    Decode(#[source] reqwest::Error),
}
