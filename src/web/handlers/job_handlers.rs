// src/web/handlers/job_handlers.rs
use rocket::response::content::RawHtml;
use rocket::serde::json::Json;
use rocket::State;
use serde_json::Value;
use tracing::{error, info, warn};

use crate::core::JobStore;
use crate::types::job::{parse_flag_updates, FlagUpdateError};
use crate::types::JobPosting;
use crate::web::page::render_job_list;
use crate::web::types::*;

pub async fn index_handler(store: &State<JobStore>) -> Result<RawHtml<String>, ApiError> {
    let jobs = store.list_jobs(false).await.map_err(ApiError::database)?;
    let html = render_job_list(&jobs).map_err(|e| {
        error!("Failed to render job list: {}", e);
        ApiError::Internal("Failed to render page".to_string())
    })?;
    Ok(RawHtml(html))
}

pub async fn get_all_jobs_handler(
    store: &State<JobStore>,
) -> Result<Json<Vec<JobPosting>>, ApiError> {
    let jobs = store.list_jobs(false).await.map_err(ApiError::database)?;
    Ok(Json(jobs))
}

pub async fn job_details_handler(
    id: i64,
    store: &State<JobStore>,
) -> Result<Json<JobPosting>, ApiError> {
    match store.find_job(id).await.map_err(ApiError::database)? {
        Some(job) => Ok(Json(job)),
        None => Err(ApiError::job_not_found()),
    }
}

pub async fn update_job_handler(
    id: i64,
    body: String,
    store: &State<JobStore>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let fields = match serde_json::from_str::<Value>(&body) {
        Ok(Value::Object(fields)) => fields,
        Ok(_) | Err(_) => {
            warn!("Rejected update for job {}: body is not a JSON object", id);
            return Err(FlagUpdateError::NoValidFields.into());
        }
    };

    let updates = parse_flag_updates(&fields)?;

    if !store
        .update_flags(id, &updates)
        .await
        .map_err(ApiError::database)?
    {
        return Err(ApiError::job_not_found());
    }

    info!("Updated {} flag(s) on job {}", updates.len(), id);
    Ok(Json(SuccessResponse {
        success: "Job updated successfully".to_string(),
    }))
}

pub async fn get_cover_letter_handler(
    id: i64,
    store: &State<JobStore>,
) -> Result<Json<CoverLetterResponse>, ApiError> {
    match store.cover_letter(id).await.map_err(ApiError::database)? {
        Some(cover_letter) => Ok(Json(CoverLetterResponse { cover_letter })),
        None => Err(ApiError::NotFound("Cover letter not found".to_string())),
    }
}
