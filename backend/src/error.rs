use rocket::http::Status;
use rocket::response::Responder;
use rocket::serde::json::Json;
use serde::Serialize;
use shared::{ErrorResponse, ValidationError};
use thiserror::Error;
use crate::store::StoreError;
use crate::voting::CastError;

#[derive(Error, Debug, Serialize)]
pub enum ApiError {
    #[error("Unknown voter")]
    UnknownVoter,
    #[error("{0}")]
    InvalidInput(String),
    #[error("Data store is not configured")]
    NotConfigured,
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        ApiError::InvalidInput(e.to_string())
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotConfigured => ApiError::NotConfigured,
            StoreError::NotFound(_) => ApiError::UnknownVoter,
            StoreError::Database(msg) => ApiError::Internal(msg),
        }
    }
}

impl From<CastError> for ApiError {
    fn from(e: CastError) -> Self {
        match e {
            CastError::InvalidCandidate(v) => v.into(),
            CastError::NotConfigured => ApiError::NotConfigured,
            CastError::Store(StoreError::NotFound(_)) => ApiError::UnknownVoter,
            CastError::Store(other) => ApiError::Internal(other.to_string()),
        }
    }
}

impl ApiError {
    pub fn status(&self) -> Status {
        match self {
            ApiError::UnknownVoter => Status::Unauthorized,
            ApiError::InvalidInput(_) => Status::BadRequest,
            ApiError::NotConfigured => Status::ServiceUnavailable,
            ApiError::Internal(_) => Status::InternalServerError,
        }
    }
}

impl<'r, 'o: 'r> Responder<'r, 'o> for ApiError {
    fn respond_to(self, req: &'r rocket::Request<'_>) -> rocket::response::Result<'o> {
        let status = self.status();
        rocket::Response::build_from(Json(ErrorResponse::new(self.to_string())).respond_to(req)?)
            .status(status)
            .ok()
    }
}
