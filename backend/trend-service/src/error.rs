/// Error types for Trend Service
///
/// Failures at single-fetch or single-term granularity are recovered where
/// they occur (skip the page, score the term 0). Only whole-pipeline failures
/// surface as `AppError`, and those are absorbed at the cache boundary, so
/// the HTTP layer never maps an upstream outage to a 5xx.
use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;

use crate::services::fetcher::FetchError;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("upstream fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("no candidate terms survived filtering")]
    EmptyCandidatePool,

    #[error("cache persistence failed: {0}")]
    CachePersistence(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Fetch(_) => StatusCode::BAD_GATEWAY,
            AppError::EmptyCandidatePool => StatusCode::SERVICE_UNAVAILABLE,
            AppError::CachePersistence(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "error": self.to_string(),
        }))
    }
}
