//! # Oracle Errors
//!
//! [`OracleError`] is what handlers and providers return internally. It is
//! never serialized directly: [`OracleError::sanitize`] maps it to a stable
//! [`ErrorCode`], an HTTP status and a fixed public message. The raw cause
//! (upstream bodies, transport errors) is only attached as `details` in
//! development mode.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use notabot_protocol::Source;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OracleError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("unknown source: {0}")]
    UnknownSource(String),

    #[error("source {0} does not go through the oracle")]
    UnsupportedSource(Source),

    #[error("score {score} below minimum {min_score}")]
    ScoreTooLow { score: u64, min_score: u64 },

    #[error("no {0} record for this address")]
    NoRecordFound(Source),

    #[error("{0} did not answer in time")]
    UpstreamTimeout(Source),

    #[error("{provider} unavailable: {reason}")]
    UpstreamUnavailable { provider: Source, reason: String },

    #[error("{0} rejected the configured API key")]
    InvalidApiKey(Source),

    #[error("rate limit exceeded")]
    RateLimited,

    #[error("internal error: {0}")]
    Internal(String),
}

/// Stable public error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    InvalidInput,
    InvalidAddress,
    UnknownSource,
    UnsupportedSource,
    ScoreTooLow,
    NoRecordFound,
    UpstreamTimeout,
    UpstreamUnavailable,
    InvalidApiKey,
    RateLimited,
    InternalError,
}

impl ErrorCode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidInput => "INVALID_INPUT",
            Self::InvalidAddress => "INVALID_ADDRESS",
            Self::UnknownSource => "UNKNOWN_SOURCE",
            Self::UnsupportedSource => "UNSUPPORTED_SOURCE",
            Self::ScoreTooLow => "SCORE_TOO_LOW",
            Self::NoRecordFound => "NO_RECORD_FOUND",
            Self::UpstreamTimeout => "UPSTREAM_TIMEOUT",
            Self::UpstreamUnavailable => "UPSTREAM_UNAVAILABLE",
            Self::InvalidApiKey => "INVALID_API_KEY",
            Self::RateLimited => "RATE_LIMITED",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    pub const fn status(self) -> StatusCode {
        match self {
            Self::InvalidInput
            | Self::InvalidAddress
            | Self::UnsupportedSource
            | Self::ScoreTooLow => StatusCode::BAD_REQUEST,
            Self::UnknownSource | Self::NoRecordFound => StatusCode::NOT_FOUND,
            Self::UpstreamTimeout => StatusCode::GATEWAY_TIMEOUT,
            Self::UpstreamUnavailable | Self::InvalidApiKey => StatusCode::BAD_GATEWAY,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown to clients regardless of mode.
    pub const fn public_message(self) -> &'static str {
        match self {
            Self::InvalidInput => "Missing or malformed request body",
            Self::InvalidAddress => "Invalid address",
            Self::UnknownSource => "Unknown verification source",
            Self::UnsupportedSource => "This source is verified without the oracle",
            Self::ScoreTooLow => "Score below minimum threshold",
            Self::NoRecordFound => "No verification record found for this address",
            Self::UpstreamTimeout => "Provider timeout, please try again",
            Self::UpstreamUnavailable => "Provider unavailable, please try again later",
            Self::InvalidApiKey => "Backend API configuration error",
            Self::RateLimited => "Too many requests, please slow down",
            Self::InternalError => "Internal server error",
        }
    }
}

/// Error response body: `{ error, code [, details] }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: ErrorCode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl OracleError {
    pub fn code(&self) -> ErrorCode {
        match self {
            OracleError::InvalidInput(_) => ErrorCode::InvalidInput,
            OracleError::InvalidAddress(_) => ErrorCode::InvalidAddress,
            OracleError::UnknownSource(_) => ErrorCode::UnknownSource,
            OracleError::UnsupportedSource(_) => ErrorCode::UnsupportedSource,
            OracleError::ScoreTooLow { .. } => ErrorCode::ScoreTooLow,
            OracleError::NoRecordFound(_) => ErrorCode::NoRecordFound,
            OracleError::UpstreamTimeout(_) => ErrorCode::UpstreamTimeout,
            OracleError::UpstreamUnavailable { .. } => ErrorCode::UpstreamUnavailable,
            OracleError::InvalidApiKey(_) => ErrorCode::InvalidApiKey,
            OracleError::RateLimited => ErrorCode::RateLimited,
            OracleError::Internal(_) => ErrorCode::InternalError,
        }
    }

    /// Public form of this error. `details` carries the raw cause only when
    /// `dev_mode` is set.
    pub fn sanitize(&self, dev_mode: bool) -> (StatusCode, ErrorBody) {
        let code = self.code();
        let body = ErrorBody {
            error: code.public_message().to_string(),
            code,
            details: dev_mode.then(|| self.to_string()),
        };
        (code.status(), body)
    }
}

/// An [`OracleError`] bound to the rendering mode, ready to become a
/// response.
#[derive(Debug)]
pub struct ApiError {
    pub error: OracleError,
    pub dev_mode: bool,
}

impl ApiError {
    pub fn new(error: OracleError, dev_mode: bool) -> Self {
        Self { error, dev_mode }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = self.error.sanitize(self.dev_mode);
        (status, Json(body)).into_response()
    }
}
