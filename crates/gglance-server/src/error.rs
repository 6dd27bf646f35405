//! Server error types.

use std::io;
use std::net::SocketAddr;

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use gglance_core::render_error;
use gglance_providers::{ProviderError, ProviderErrorCode};
use thiserror::Error;

use crate::state::StateRejection;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Errors that stop the server from starting or running.
#[derive(Debug, Error)]
pub enum ServerError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Could not bind the listen address.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Provider setup error.
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Tracing setup error.
    #[error("Tracing error: {0}")]
    Tracing(#[from] gglance_core::TracingError),
}

impl ServerError {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

/// Failures of a single callback request.
///
/// Each variant becomes an HTML response; none of them affect other
/// requests.
#[derive(Debug, Error)]
pub enum CallbackError {
    /// The returned state does not match what was issued.
    #[error("Invalid OAuth state")]
    InvalidState(StateRejection),

    /// The provider redirected back with an `error` parameter.
    #[error("Authorization denied: {0}")]
    AuthorizationDenied(String),

    /// No authorization code in the callback.
    #[error("Missing authorization code")]
    MissingCode,

    /// The code-for-token exchange failed.
    #[error("OAuth exchange failed: {0}")]
    Exchange(ProviderError),

    /// The resource fetch collaborator failed.
    #[error("{}", resource_message(.0))]
    ResourceFetch(ProviderError),
}

fn resource_message(err: &ProviderError) -> String {
    match err.provider() {
        Some("calendar") => format!("Error retrieving calendar events: {}", err),
        Some("drive") => format!("Error retrieving drive files: {}", err),
        _ => format!("Error retrieving resources: {}", err),
    }
}

/// Upstream failures are 502, or 504 when the upstream timed out.
fn upstream_status(err: &ProviderError) -> StatusCode {
    if err.code() == ProviderErrorCode::Timeout {
        StatusCode::GATEWAY_TIMEOUT
    } else {
        StatusCode::BAD_GATEWAY
    }
}

impl CallbackError {
    /// Returns the HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidState(_) | Self::AuthorizationDenied(_) | Self::MissingCode => {
                StatusCode::BAD_REQUEST
            }
            Self::Exchange(err) | Self::ResourceFetch(err) => upstream_status(err),
        }
    }
}

impl IntoResponse for CallbackError {
    fn into_response(self) -> Response {
        (self.status(), Html(render_error(&self.to_string()))).into_response()
    }
}
