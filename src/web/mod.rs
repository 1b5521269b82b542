// src/web/mod.rs

pub mod handlers;
pub mod page;
pub mod types;

pub use types::*;

use anyhow::{Context, Result};
use rocket::fairing::{Fairing, Info, Kind};
use rocket::http::{Header, Status};
use rocket::response::content::RawHtml;
use rocket::serde::json::Json;
use rocket::{catchers, get, options, post, routes, Build, Request, Response, Rocket, State};
use std::sync::Arc;
use tracing::{error, info};

use crate::config::AppConfig;
use crate::core::JobStore;
use crate::resume_tailor::PdfResume;
use crate::types::JobPosting;

// CORS Fairing
pub struct Cors;

#[rocket::async_trait]
impl Fairing for Cors {
    fn info(&self) -> Info {
        Info {
            name: "Add CORS headers to responses",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, _request: &'r Request<'_>, response: &mut Response<'r>) {
        response.set_header(Header::new("Access-Control-Allow-Origin", "*"));
        response.set_header(Header::new(
            "Access-Control-Allow-Methods",
            "POST, GET, OPTIONS",
        ));
        response.set_header(Header::new("Access-Control-Allow-Headers", "*"));
    }
}

#[get("/")]
pub async fn index(store: &State<JobStore>) -> Result<RawHtml<String>, ApiError> {
    handlers::index_handler(store).await
}

#[get("/get_all_jobs")]
pub async fn get_all_jobs(store: &State<JobStore>) -> Result<Json<Vec<JobPosting>>, ApiError> {
    handlers::get_all_jobs_handler(store).await
}

#[get("/job_details/<id>")]
pub async fn job_details(id: i64, store: &State<JobStore>) -> Result<Json<JobPosting>, ApiError> {
    handlers::job_details_handler(id, store).await
}

#[post("/update_job/<id>", data = "<body>")]
pub async fn update_job(
    id: i64,
    body: String,
    store: &State<JobStore>,
) -> Result<Json<SuccessResponse>, ApiError> {
    handlers::update_job_handler(id, body, store).await
}

#[get("/get_cover_letter/<id>")]
pub async fn get_cover_letter(
    id: i64,
    store: &State<JobStore>,
) -> Result<Json<CoverLetterResponse>, ApiError> {
    handlers::get_cover_letter_handler(id, store).await
}

#[post("/get_resume/<id>")]
pub async fn get_resume(
    id: i64,
    config: &State<ServerConfig>,
    store: &State<JobStore>,
) -> Result<Json<ResumeResponse>, ApiError> {
    handlers::get_resume_handler(id, config, store).await
}

#[get("/health")]
pub async fn health() -> Json<&'static str> {
    handlers::health_handler().await
}

#[options("/<_..>")]
pub async fn options() -> Status {
    Status::Ok
}

// Error catchers
#[rocket::catch(400)]
pub fn bad_request() -> Json<ErrorResponse> {
    Json(ErrorResponse {
        error: "Invalid request".to_string(),
    })
}

#[rocket::catch(404)]
pub fn not_found() -> Json<ErrorResponse> {
    Json(ErrorResponse {
        error: "Not found".to_string(),
    })
}

#[rocket::catch(500)]
pub fn internal_error() -> Json<ErrorResponse> {
    Json(ErrorResponse {
        error: "Internal server error".to_string(),
    })
}

#[rocket::catch(default)]
pub fn default_catcher(status: Status, _request: &Request<'_>) -> Json<ErrorResponse> {
    Json(ErrorResponse {
        error: status.reason_lossy().to_string(),
    })
}

/// Assemble the application without launching it
pub fn build_rocket(config: ServerConfig, store: JobStore) -> Rocket<Build> {
    let figment = rocket::Config::figment()
        .merge(("address", config.app.server.address.clone()))
        .merge(("port", config.app.server.port));

    rocket::custom(figment)
        .attach(Cors)
        .manage(config)
        .manage(store)
        .register("/", catchers![bad_request, not_found, internal_error, default_catcher])
        .mount(
            "/",
            routes![
                index,
                get_all_jobs,
                job_details,
                update_job,
                get_cover_letter,
                get_resume,
                health,
                options,
            ],
        )
}

// Main server start function
pub async fn start_web_server(app: AppConfig) -> Result<()> {
    let store = JobStore::connect(&app.db_path, &app.jobs_tablename).await?;

    let applied = match store.reconcile_schema().await {
        Ok(applied) => applied,
        Err(e) => {
            error!("Failed to reconcile database schema: {:#}", e);
            return Err(e);
        }
    };
    for step in &applied {
        info!("Schema step {}: {}", step.version, step.description);
    }

    info!("Starting job board API server");
    info!("Database: {}", app.db_path.display());
    info!("Listening on {}:{}", app.server.address, app.server.port);

    let resume_source = Arc::new(PdfResume::new(app.resume_path.clone()));
    let config = ServerConfig { app, resume_source };

    build_rocket(config, store)
        .launch()
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))
        .context("Web server stopped with an error")?;

    Ok(())
}
