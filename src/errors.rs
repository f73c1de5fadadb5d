use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::time::Duration;
use thiserror::Error as ThisError;

use crate::models::api::ErrorBody;

pub const TIMEOUT_MESSAGE: &str = "The request timed out. The agent took too long to respond.";
pub const UNREACHABLE_MESSAGE: &str = "Failed to reach the AI agent backend.";

#[derive(ThisError, Debug)]
pub enum ProxyError {
    /// Upstream answered 4xx; never retried
    #[error("Agent rejected the request ({status}): {message}")]
    ClientRejected { status: StatusCode, message: String },

    /// Upstream answered 5xx on the final attempt
    #[error("Agent failed ({status}): {message}")]
    UpstreamServerError { status: StatusCode, message: String },

    #[error("Agent did not respond within {budget:?}")]
    DeadlineExceeded { budget: Duration },

    /// Connection, DNS or body decoding failure
    #[error(transparent)]
    TransportUnreachable(#[from] reqwest::Error),

    #[error("Demo agent URL is not configured")]
    NotConfigured,

    /// Client body was unusable; `status` is the one axum chose for the rejection
    #[error("{message}")]
    BadRequest { status: StatusCode, message: String },
}

impl ProxyError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ProxyError::ClientRejected { status, .. } => *status,
            ProxyError::UpstreamServerError { status, .. } => *status,
            ProxyError::DeadlineExceeded { .. } => StatusCode::GATEWAY_TIMEOUT,
            ProxyError::TransportUnreachable(_) => StatusCode::BAD_GATEWAY,
            ProxyError::NotConfigured => StatusCode::BAD_GATEWAY,
            ProxyError::BadRequest { status, .. } => *status,
        }
    }

    /// Message shown to the browser client. Transport details stay in the logs.
    pub fn user_message(&self) -> String {
        match self {
            ProxyError::ClientRejected { message, .. } => message.clone(),
            ProxyError::UpstreamServerError { message, .. } => message.clone(),
            ProxyError::DeadlineExceeded { .. } => TIMEOUT_MESSAGE.to_string(),
            ProxyError::TransportUnreachable(_) | ProxyError::NotConfigured => {
                UNREACHABLE_MESSAGE.to_string()
            }
            ProxyError::BadRequest { message, .. } => message.clone(),
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let body = ErrorBody { error: self.user_message() };
        (self.status_code(), Json(body)).into_response()
    }
}
