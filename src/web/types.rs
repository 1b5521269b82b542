// src/web/types.rs
use rocket::http::Status;
use rocket::response::{self, Responder};
use rocket::serde::json::Json;
use rocket::serde::Serialize;
use rocket::Request;
use std::sync::Arc;
use thiserror::Error;
use tracing::error;

use crate::config::AppConfig;
use crate::resume_tailor::{ResumeSource, TailorError};
use crate::types::job::FlagUpdateError;

/// Everything the route handlers need besides the job store
pub struct ServerConfig {
    pub app: AppConfig,
    pub resume_source: Arc<dyn ResumeSource>,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct SuccessResponse {
    pub success: String,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct CoverLetterResponse {
    pub cover_letter: Option<String>,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct ResumeResponse {
    pub resume: String,
}

/// Handler failure, rendered as `{"error": message}` with a matching status
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn job_not_found() -> Self {
        ApiError::NotFound("Job not found".to_string())
    }

    /// Log the underlying failure and hide it behind a generic 500
    pub fn database(err: anyhow::Error) -> Self {
        error!("Database error: {:#}", err);
        ApiError::Internal("Database error".to_string())
    }

    pub fn status(&self) -> Status {
        match self {
            ApiError::BadRequest(_) => Status::BadRequest,
            ApiError::NotFound(_) => Status::NotFound,
            ApiError::Internal(_) => Status::InternalServerError,
        }
    }
}

impl<'r> Responder<'r, 'static> for ApiError {
    fn respond_to(self, request: &'r Request<'_>) -> response::Result<'static> {
        let status = self.status();
        let body = Json(ErrorResponse {
            error: self.to_string(),
        });
        (status, body).respond_to(request)
    }
}

impl From<FlagUpdateError> for ApiError {
    fn from(err: FlagUpdateError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl From<TailorError> for ApiError {
    fn from(err: TailorError) -> Self {
        match err {
            TailorError::MissingCredential | TailorError::DocumentUnreadable => {
                ApiError::BadRequest(err.to_string())
            }
            TailorError::JobNotFound => ApiError::job_not_found(),
            TailorError::Upstream(_) => {
                error!("Resume generation failed: {}", err);
                ApiError::Internal(err.to_string())
            }
            TailorError::Storage(e) => ApiError::database(e),
        }
    }
}
