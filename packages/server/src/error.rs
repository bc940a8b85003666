//! Gateway error type.
//!
//! Every failure is reported the same way: HTTP 500 with a JSON body of
//! the form `{"error": "<message>"}`. The variants only exist so logs and
//! callers can tell the causes apart.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use travel_emissions_provider::ProviderError;
use travel_emissions_server_models::ValidationError;
use travel_emissions_trip::TripError;

/// Errors surfaced by the gateway handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request body was rejected before any upstream call.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The upstream provider failed or was unreachable.
    #[error("{0}")]
    Upstream(String),

    /// The upstream provider answered with data of an unexpected shape.
    #[error("{0}")]
    Computation(String),
}

impl From<ProviderError> for ApiError {
    fn from(e: ProviderError) -> Self {
        match e {
            ProviderError::Payload { .. } => Self::Computation(e.to_string()),
            _ => Self::Upstream(e.to_string()),
        }
    }
}

impl From<TripError> for ApiError {
    fn from(e: TripError) -> Self {
        match e {
            TripError::Upstream(_) => Self::Upstream(e.to_string()),
            TripError::Computation { .. } => Self::Computation(e.to_string()),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "error": self.to_string()
        }))
    }
}
