// src/web/handlers/resume_handlers.rs
use rocket::serde::json::Json;
use rocket::State;

use crate::core::JobStore;
use crate::resume_tailor::ResumeTailor;
use crate::web::types::*;

pub async fn get_resume_handler(
    id: i64,
    config: &State<ServerConfig>,
    store: &State<JobStore>,
) -> Result<Json<ResumeResponse>, ApiError> {
    let tailor = ResumeTailor::new(&config.app, store, config.resume_source.clone());
    let resume = tailor.tailor(id).await?;
    Ok(Json(ResumeResponse { resume }))
}
