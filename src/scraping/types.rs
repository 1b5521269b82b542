// src/scraping/types.rs
use serde::Serialize;
use tracing::warn;

use crate::types::job::NewJob;

/// One summary block of a search-results page, as scraped.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct JobCard {
    pub id: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub date: String,
    pub job_url: String,
}

impl JobCard {
    /// Storable record, or `None` when the card carries no numeric id
    pub fn into_new_job(self, job_description: Option<String>) -> Option<NewJob> {
        let Ok(id) = self.id.parse::<i64>() else {
            warn!(
                "Skipping card '{}' at {} without a usable id ('{}')",
                self.title, self.company, self.id
            );
            return None;
        };

        Some(NewJob {
            id,
            title: self.title,
            company: self.company,
            location: self.location,
            date: self.date,
            job_url: self.job_url,
            job_description,
        })
    }
}
