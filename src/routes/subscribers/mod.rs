mod delete;
mod get;
mod post;

pub use delete::delete_subscriber;
pub use get::{list_subscribers, ListParameters};
pub use post::create_subscribers;

use crate::domain::{PayloadShapeError, ValidationErrors};
use crate::ingest::IngestError;
use crate::store::StoreError;
use crate::utils::error_chain_fmt;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};

/// Everything a `/subscribers` handler can fail with, and how each failure looks on the wire.
#[derive(thiserror::Error)]
pub enum SubscriberError {
    #[error(transparent)]
    InvalidPayload(#[from] PayloadShapeError),
    #[error(transparent)]
    ValidationError(#[from] ValidationErrors),
    #[error("No location input found")]
    MissingLocation,
    #[error("Not found.")]
    NotFound(#[source] StoreError),
    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}

impl std::fmt::Debug for SubscriberError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl From<StoreError> for SubscriberError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::SubscriberNotFound(_) => Self::NotFound(e),
            e => Self::UnexpectedError(anyhow::Error::from(e)),
        }
    }
}

impl From<IngestError> for SubscriberError {
    fn from(e: IngestError) -> Self {
        match e {
            IngestError::MissingLocation => Self::MissingLocation,
            IngestError::Store(e) => Self::from(e),
        }
    }
}

impl ResponseError for SubscriberError {
    fn status_code(&self) -> StatusCode {
        match self {
            SubscriberError::InvalidPayload(_)
            | SubscriberError::ValidationError(_)
            | SubscriberError::MissingLocation => StatusCode::BAD_REQUEST,
            SubscriberError::NotFound(_) => StatusCode::NOT_FOUND,
            SubscriberError::UnexpectedError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut response = HttpResponse::build(self.status_code());
        match self {
            SubscriberError::InvalidPayload(e) => response.json(e.to_string()),
            SubscriberError::ValidationError(errors) => response.json(errors),
            SubscriberError::MissingLocation => response.json([self.to_string()]),
            SubscriberError::NotFound(_) => {
                response.json(serde_json::json!({ "detail": self.to_string() }))
            }
            SubscriberError::UnexpectedError(_) => response.finish(),
        }
    }
}
