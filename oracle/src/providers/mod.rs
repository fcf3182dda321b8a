//! # Identity Providers
//!
//! One client per signed-attestation source. Each makes exactly one
//! outbound call per request, with the configured timeout, and never
//! retries. Only the fields needed for an [`Evidence`] survive the call.
//!
//! | source     | endpoint                                             | datum                     |
//! |------------|------------------------------------------------------|---------------------------|
//! | `gitcoin`  | `GET {base}/registry/score/{scorer}/{address}`       | `evidence.rawScore` or score |
//! | `poh`      | `POST {graph}` (GraphQL `submission(id)`)            | submission id             |
//! | `brightid` | `GET {node}/verifications/{context}/{address}`       | first context id or address |

pub mod brightid;
pub mod gitcoin;
pub mod poh;

pub use brightid::BrightIdProvider;
pub use gitcoin::GitcoinProvider;
pub use poh::PohProvider;

use async_trait::async_trait;
use notabot_protocol::{Address, Evidence, Source};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::error::OracleError;

#[async_trait]
pub trait EvidenceProvider: Send + Sync {
    fn source(&self) -> Source;

    /// Query the provider about `subject`.
    async fn fetch_evidence(&self, subject: &Address) -> Result<Evidence, OracleError>;
}

/// Providers keyed by source.
pub type ProviderSet = HashMap<Source, Arc<dyn EvidenceProvider>>;

/// Shared HTTP client for all providers.
pub fn http_client(timeout: Duration) -> Result<reqwest::Client, OracleError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(5)))
        .build()
        .map_err(|e| OracleError::Internal(format!("http client: {e}")))
}

/// Classify a transport-level failure.
pub(crate) fn transport_error(source: Source, e: reqwest::Error) -> OracleError {
    if e.is_timeout() {
        OracleError::UpstreamTimeout(source)
    } else {
        OracleError::UpstreamUnavailable {
            provider: source,
            reason: e.to_string(),
        }
    }
}

/// Classify a non-success HTTP status. 404 is "no record", 401 is a
/// configuration problem, everything else is the provider being down.
pub(crate) fn status_error(source: Source, status: reqwest::StatusCode) -> OracleError {
    match status.as_u16() {
        404 => OracleError::NoRecordFound(source),
        401 => OracleError::InvalidApiKey(source),
        _ => OracleError::UpstreamUnavailable {
            provider: source,
            reason: format!("HTTP status {status}"),
        },
    }
}

pub(crate) fn invalid_response(source: Source, e: impl std::fmt::Display) -> OracleError {
    OracleError::UpstreamUnavailable {
        provider: source,
        reason: format!("failed to parse response: {e}"),
    }
}
