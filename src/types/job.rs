// src/types/job.rs
//! Job posting records shared by the scraper and the API server

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Stored when a posting's detail page could not be read. Never replaces a
/// real description already on file.
pub const DESCRIPTION_UNAVAILABLE: &str = "Description not available.";

/// Column list in table order, used by every SELECT against the jobs table.
pub const JOB_COLUMNS: &str = "id, title, company, location, date, job_url, hidden, applied, \
     interview, rejected, cover_letter, resume, job_description";

// ===== Stored Job =====

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct JobPosting {
    pub id: i64,
    pub title: String,
    pub company: String,
    pub location: String,
    pub date: String,
    pub job_url: String,
    pub hidden: bool,
    pub applied: bool,
    pub interview: bool,
    pub rejected: bool,
    pub cover_letter: Option<String>,
    pub resume: Option<String>,
    pub job_description: Option<String>,
}

/// Scraped fields of a posting, before any annotation exists.
#[derive(Debug, Clone, PartialEq)]
pub struct NewJob {
    pub id: i64,
    pub title: String,
    pub company: String,
    pub location: String,
    pub date: String,
    pub job_url: String,
    pub job_description: Option<String>,
}

/// Columns read when tailoring a resume.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct JobContext {
    pub title: String,
    pub company: String,
    pub job_description: Option<String>,
}

// ===== Updatable Flags =====

/// The only fields the update endpoint may touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobFlag {
    Hidden,
    Applied,
    Interview,
    Rejected,
}

impl JobFlag {
    pub const ALL: [JobFlag; 4] = [
        JobFlag::Hidden,
        JobFlag::Applied,
        JobFlag::Interview,
        JobFlag::Rejected,
    ];

    pub fn column(self) -> &'static str {
        match self {
            JobFlag::Hidden => "hidden",
            JobFlag::Applied => "applied",
            JobFlag::Interview => "interview",
            JobFlag::Rejected => "rejected",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|flag| flag.column() == key)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlagUpdate {
    pub flag: JobFlag,
    pub value: bool,
}

#[derive(Debug, Error, PartialEq)]
pub enum FlagUpdateError {
    #[error("Invalid update fields")]
    NoValidFields,
    #[error("Invalid value for field '{0}'")]
    InvalidValue(&'static str),
}

/// Pick the allow-listed flags out of an update body. Unknown keys are ignored.
pub fn parse_flag_updates(body: &Map<String, Value>) -> Result<Vec<FlagUpdate>, FlagUpdateError> {
    let mut updates = Vec::new();

    for (key, value) in body {
        let Some(flag) = JobFlag::from_key(key) else {
            continue;
        };

        let value = flag_value(value).ok_or(FlagUpdateError::InvalidValue(flag.column()))?;
        updates.push(FlagUpdate { flag, value });
    }

    if updates.is_empty() {
        return Err(FlagUpdateError::NoValidFields);
    }

    Ok(updates)
}

fn flag_value(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|n| n != 0.0),
        _ => None,
    }
}
