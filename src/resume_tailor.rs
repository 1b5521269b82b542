// src/resume_tailor.rs
//! Tailored resume generation: stored job + base resume PDF → language model → job row

use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::config::AppConfig;
use crate::core::{CompletionClient, CompletionError, JobStore};
use crate::types::JobContext;

#[derive(Debug, Error)]
pub enum TailorError {
    #[error("Missing OpenAI API key in configuration")]
    MissingCredential,

    #[error("Job not found")]
    JobNotFound,

    #[error("Resume file not readable")]
    DocumentUnreadable,

    #[error("OpenAI error: {0}")]
    Upstream(#[from] CompletionError),

    #[error("Database error: {0}")]
    Storage(anyhow::Error),
}

/// Where the base resume text comes from.
pub trait ResumeSource: Send + Sync {
    /// Plain text of the resume, `None` when nothing could be read
    fn extract_text(&self) -> Option<String>;
}

pub struct PdfResume {
    path: PathBuf,
}

impl PdfResume {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl ResumeSource for PdfResume {
    fn extract_text(&self) -> Option<String> {
        match pdf_extract::extract_text(&self.path) {
            Ok(text) => Some(text),
            Err(e) => {
                warn!("PDF read error for {}: {}", self.path.display(), e);
                None
            }
        }
    }
}

pub fn build_prompt(job: &JobContext, resume_text: &str) -> String {
    format!(
        "Tailor the resume for the job: {} at {}.\nJob description: {}\nCurrent resume: {}",
        job.title,
        job.company,
        job.job_description.as_deref().unwrap_or(""),
        resume_text
    )
}

pub struct ResumeTailor<'a> {
    config: &'a AppConfig,
    store: &'a JobStore,
    source: Arc<dyn ResumeSource>,
}

impl<'a> ResumeTailor<'a> {
    pub fn new(config: &'a AppConfig, store: &'a JobStore, source: Arc<dyn ResumeSource>) -> Self {
        Self {
            config,
            store,
            source,
        }
    }

    /// Generate a resume for `job_id` and store it on the job row
    pub async fn tailor(&self, job_id: i64) -> Result<String, TailorError> {
        let api_key = self
            .config
            .openai_api_key()
            .ok_or(TailorError::MissingCredential)?;

        let job = self
            .store
            .job_context(job_id)
            .await
            .map_err(TailorError::Storage)?
            .ok_or(TailorError::JobNotFound)?;

        let resume_text = self
            .read_resume()
            .await
            .ok_or(TailorError::DocumentUnreadable)?;

        let client = CompletionClient::new(
            api_key,
            &self.config.openai_base_url,
            &self.config.openai_model,
            self.config.openai_timeout_secs,
        )?;

        info!("Generating tailored resume for job {}", job_id);
        let tailored = client.complete(&build_prompt(&job, &resume_text)).await?;

        self.store
            .set_resume(job_id, &tailored)
            .await
            .map_err(TailorError::Storage)?;

        info!("Stored tailored resume for job {}", job_id);
        Ok(tailored)
    }

    async fn read_resume(&self) -> Option<String> {
        let source = self.source.clone();

        match tokio::task::spawn_blocking(move || source.extract_text()).await {
            Ok(text) => text.filter(|t| !t.trim().is_empty()),
            Err(e) => {
                error!("Resume extraction aborted: {}", e);
                None
            }
        }
    }
}
