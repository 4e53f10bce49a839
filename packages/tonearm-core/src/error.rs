//! Centralized error types for the Tonearm gateway.
//!
//! This module provides a unified error handling system that:
//! - Defines the HTTP-facing [`GatewayError`] using `thiserror`
//! - Maps errors to appropriate HTTP status codes
//! - Implements `IntoResponse` for automatic JSON error responses

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::lyrics::LyricsError;
use crate::services::readiness::InitError;
use crate::services::stream_proxy::StreamError;
use crate::upstream::UpstreamError;

/// Trait for error types that provide machine-readable error codes.
///
/// Lower-level errors use it in log lines so that a 500 in the access log
/// can be traced to the layer that produced it.
pub trait ErrorCode {
    /// Returns a machine-readable error code.
    fn code(&self) -> &'static str;
}

impl ErrorCode for UpstreamError {
    fn code(&self) -> &'static str {
        match self {
            Self::Http(_) => "http_request_failed",
            Self::HttpStatus(_, _) => "http_error_status",
            Self::Parse(_) => "upstream_parse_error",
            Self::Bootstrap(_) => "upstream_bootstrap_failed",
        }
    }
}

impl ErrorCode for InitError {
    fn code(&self) -> &'static str {
        "init_exhausted"
    }
}

impl ErrorCode for StreamError {
    fn code(&self) -> &'static str {
        match self {
            Self::NotReady(_) => "not_ready",
            Self::Forbidden(_) => "playback_restricted",
            Self::NoAudio(_) => "no_audio",
            Self::Upstream(e) => e.code(),
        }
    }
}

impl ErrorCode for LyricsError {
    fn code(&self) -> &'static str {
        match self {
            Self::Http(_) => "http_request_failed",
            Self::HttpStatus(_) => "http_error_status",
            Self::Parse(_) => "lyrics_parse_error",
        }
    }
}

/// Application-wide error type returned by HTTP handlers.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The upstream session could not be established.
    #[error("Upstream not ready: {0}")]
    NotReady(String),

    /// Requested media does not exist or has no audio.
    #[error("{0}")]
    NotFound(String),

    /// Playback is restricted by upstream policy.
    #[error("{0}")]
    Forbidden(String),

    /// An outbound call exceeded its deadline.
    #[error("{0}")]
    Timeout(String),

    /// Upstream failed in a way the caller cannot fix.
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// A third-party service answered with a non-success status.
    #[error("Bad gateway: {0}")]
    BadGateway(String),

    /// Client sent an invalid or malformed request.
    #[error("{0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// Returns a machine-readable error code for API responses.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotReady(_) => "not_ready",
            Self::NotFound(_) => "not_found",
            Self::Forbidden(_) => "forbidden",
            Self::Timeout(_) => "timeout",
            Self::Upstream(_) => "upstream_error",
            Self::BadGateway(_) => "bad_gateway",
            Self::BadRequest(_) => "bad_request",
            Self::Internal(_) => "internal_error",
        }
    }

    /// Maps the error to an appropriate HTTP status code.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotReady(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            Self::BadGateway(_) => StatusCode::BAD_GATEWAY,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Upstream(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Convenient Result alias for handler-level operations.
pub type GatewayResult<T> = Result<T, GatewayError>;

/// JSON response body for error responses.
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    code: &'static str,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: self.to_string(),
            code: self.code(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<InitError> for GatewayError {
    fn from(err: InitError) -> Self {
        Self::NotReady(err.to_string())
    }
}

impl From<UpstreamError> for GatewayError {
    fn from(err: UpstreamError) -> Self {
        Self::Upstream(err.to_string())
    }
}

impl From<StreamError> for GatewayError {
    fn from(err: StreamError) -> Self {
        match err {
            StreamError::NotReady(e) => e.into(),
            StreamError::Forbidden(reason) => Self::Forbidden(reason),
            StreamError::NoAudio(id) => Self::NotFound(format!("No audio available for {id}")),
            StreamError::Upstream(e) => e.into(),
        }
    }
}

impl From<LyricsError> for GatewayError {
    fn from(err: LyricsError) -> Self {
        match err {
            LyricsError::HttpStatus(_) => Self::BadGateway(err.to_string()),
            LyricsError::Http(_) | LyricsError::Parse(_) => Self::Upstream(err.to_string()),
        }
    }
}
