use std::any::Any;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};

/// Faults raised by the translation pipeline.
///
/// The HTTP status and the caller-facing message are derived from the variant
/// at the outermost boundary; the `Display` text is for logs only.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Bad, oversized or unsupported input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Missing or unusable operator configuration (e.g. no API key).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Provider answered with a success status but an unusable body.
    #[error("external provider error: {0}")]
    ExternalProvider(String),

    /// The provider could not be reached.
    #[error("network error: {0}")]
    Network(String),

    /// The provider did not answer within the configured timeout.
    #[error("timeout: {0}")]
    Timeout(String),

    #[error(transparent)]
    Unknown(#[from] anyhow::Error),
}

impl GatewayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::Validation(_) => StatusCode::BAD_REQUEST,
            GatewayError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            GatewayError::ExternalProvider(_) => StatusCode::SERVICE_UNAVAILABLE,
            GatewayError::Network(_) => StatusCode::SERVICE_UNAVAILABLE,
            GatewayError::Timeout(_) => StatusCode::REQUEST_TIMEOUT,
            GatewayError::Unknown(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show the caller. Only validation messages are echoed.
    pub fn public_message(&self) -> String {
        match self {
            GatewayError::Validation(msg) => msg.clone(),
            GatewayError::Configuration(_) => "Configuration error.".to_string(),
            GatewayError::ExternalProvider(_) => "External service error.".to_string(),
            GatewayError::Network(_) => "Network connection error.".to_string(),
            GatewayError::Timeout(_) => "The request timed out.".to_string(),
            GatewayError::Unknown(_) => "An unexpected error occurred.".to_string(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            GatewayError::Validation(_) => "validation",
            GatewayError::Configuration(_) => "configuration",
            GatewayError::ExternalProvider(_) => "external_provider",
            GatewayError::Network(_) => "network",
            GatewayError::Timeout(_) => "timeout",
            GatewayError::Unknown(_) => "unknown",
        }
    }

    pub fn log(&self) {
        match self {
            GatewayError::Validation(_) => warn!(kind = self.kind(), "Request rejected: {}", self),
            _ => error!(kind = self.kind(), "Exception handled: {:?}", self),
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GatewayError::Timeout(err.to_string())
        } else {
            GatewayError::Network(err.to_string())
        }
    }
}

/// Uniform error envelope returned for every fault.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorResponse {
    pub error: String,
    pub status_code: u16,
    pub timestamp: DateTime<Utc>,
}

impl From<&GatewayError> for ApiErrorResponse {
    fn from(err: &GatewayError) -> Self {
        Self {
            error: err.public_message(),
            status_code: err.status_code().as_u16(),
            timestamp: Utc::now(),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        self.log();
        let status = self.status_code();
        (status, Json(ApiErrorResponse::from(&self))).into_response()
    }
}

/// Render a panicked handler as the generic 500 envelope.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else if let Some(msg) = panic.downcast_ref::<&str>() {
        msg.to_string()
    } else {
        "unknown panic payload".to_string()
    };
    GatewayError::Unknown(anyhow::anyhow!("handler panicked: {}", detail)).into_response()
}
