use std::path::PathBuf;

use actix_web::error::JsonPayloadError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

/// Failures while loading or running the classification model.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model file not found: {0}")]
    NotFound(PathBuf),
    #[error("failed to load model {path}: {reason}")]
    Load { path: PathBuf, reason: String },
    #[error("inference failed: {0}")]
    Inference(String),
    #[error("model produced {actual} scores, expected {expected}")]
    OutputShape { expected: usize, actual: usize },
    #[error("model output contains no finite score")]
    NoScore,
}

/// Errors returned to clients of the prediction endpoint.
#[derive(Debug, Error)]
pub enum PredictError {
    #[error("missing required field `image`")]
    MissingField,
    #[error("malformed request body: {0}")]
    MalformedBody(String),
    #[error("request body exceeds {limit} bytes")]
    PayloadTooLarge { limit: usize },
    #[error("image is not valid base64: {0}")]
    InvalidEncoding(#[from] base64::DecodeError),
    #[error("could not decode image: {0}")]
    UnsupportedImageFormat(#[from] image::ImageError),
    #[error("model invocation failed: {0}")]
    ModelInvocationFailure(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl From<ModelError> for PredictError {
    fn from(err: ModelError) -> Self {
        PredictError::ModelInvocationFailure(err.to_string())
    }
}

impl From<JsonPayloadError> for PredictError {
    fn from(err: JsonPayloadError) -> Self {
        match err {
            JsonPayloadError::OverflowKnownLength { limit, .. }
            | JsonPayloadError::Overflow { limit } => PredictError::PayloadTooLarge { limit },
            other => PredictError::MalformedBody(other.to_string()),
        }
    }
}

impl ResponseError for PredictError {
    fn status_code(&self) -> StatusCode {
        match self {
            PredictError::MissingField
            | PredictError::MalformedBody(_)
            | PredictError::InvalidEncoding(_) => StatusCode::BAD_REQUEST,
            PredictError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            PredictError::UnsupportedImageFormat(_) => StatusCode::UNPROCESSABLE_ENTITY,
            PredictError::ModelInvocationFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.to_string(),
        })
    }
}
