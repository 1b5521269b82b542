// src/core/database.rs
//! SQLite access for the jobs table - shared by the scraper and the API server

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info};

use crate::config::PersistMode;
use crate::core::migrations::{self, AppliedMigration};
use crate::types::job::{
    FlagUpdate, JobContext, JobPosting, NewJob, DESCRIPTION_UNAVAILABLE, JOB_COLUMNS,
};
use crate::utils::ensure_dir_exists;

/// Result of writing a scrape run's records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Nothing to write; the table was left as it was.
    Skipped,
    Saved { count: usize },
}

pub struct JobStore {
    pool: SqlitePool,
    table: String,
}

impl JobStore {
    /// Open (creating if needed) the database file at `database_path`
    pub async fn connect(database_path: &Path, table: &str) -> Result<Self> {
        if let Some(parent) = database_path.parent() {
            if !parent.as_os_str().is_empty() {
                ensure_dir_exists(parent).await?;
            }
        }

        let database_url = format!("sqlite:{}?mode=rwc", database_path.display());
        let pool = SqlitePool::connect(&database_url).await.with_context(|| {
            format!("Failed to connect to database: {}", database_path.display())
        })?;

        info!(
            "Database connection established: {}",
            database_path.display()
        );

        Ok(Self::from_pool(pool, table))
    }

    pub fn from_pool(pool: SqlitePool, table: &str) -> Self {
        Self {
            pool,
            table: table.to_string(),
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Add whatever the jobs table is missing
    pub async fn reconcile_schema(&self) -> Result<Vec<AppliedMigration>> {
        migrations::reconcile(&self.pool, &self.table).await
    }

    /// Jobs with the given hidden flag, newest id first
    pub async fn list_jobs(&self, hidden: bool) -> Result<Vec<JobPosting>> {
        let sql = format!(
            "SELECT {} FROM \"{}\" WHERE hidden = ? ORDER BY id DESC",
            JOB_COLUMNS, self.table
        );

        sqlx::query_as::<_, JobPosting>(&sql)
            .bind(hidden)
            .fetch_all(&self.pool)
            .await
            .context("Failed to list jobs")
    }

    pub async fn find_job(&self, id: i64) -> Result<Option<JobPosting>> {
        let sql = format!("SELECT {} FROM \"{}\" WHERE id = ?", JOB_COLUMNS, self.table);

        sqlx::query_as::<_, JobPosting>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("Failed to load job {}", id))
    }

    /// Apply flag changes in one statement. Returns false when no row has `id`.
    pub async fn update_flags(&self, id: i64, updates: &[FlagUpdate]) -> Result<bool> {
        if updates.is_empty() {
            return Ok(false);
        }

        let assignments = updates
            .iter()
            .map(|update| format!("{} = ?", update.flag.column()))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!("UPDATE \"{}\" SET {} WHERE id = ?", self.table, assignments);

        let mut query = sqlx::query(&sql);
        for update in updates {
            query = query.bind(update.value);
        }

        let result = query
            .bind(id)
            .execute(&self.pool)
            .await
            .with_context(|| format!("Failed to update job {}", id))?;

        Ok(result.rows_affected() > 0)
    }

    /// Outer `None`: no such job. Inner `None`: job exists without a letter.
    pub async fn cover_letter(&self, id: i64) -> Result<Option<Option<String>>> {
        let sql = format!("SELECT cover_letter FROM \"{}\" WHERE id = ?", self.table);

        let row: Option<(Option<String>,)> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("Failed to load cover letter for job {}", id))?;

        Ok(row.map(|(letter,)| letter))
    }

    pub async fn job_context(&self, id: i64) -> Result<Option<JobContext>> {
        let sql = format!(
            "SELECT title, company, job_description FROM \"{}\" WHERE id = ?",
            self.table
        );

        sqlx::query_as::<_, JobContext>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("Failed to load job {}", id))
    }

    pub async fn set_resume(&self, id: i64, resume: &str) -> Result<bool> {
        let sql = format!("UPDATE \"{}\" SET resume = ? WHERE id = ?", self.table);

        let result = sqlx::query(&sql)
            .bind(resume)
            .bind(id)
            .execute(&self.pool)
            .await
            .with_context(|| format!("Failed to store resume for job {}", id))?;

        Ok(result.rows_affected() > 0)
    }

    /// Write a scrape run's records. An empty set leaves the table untouched.
    pub async fn save_jobs(&self, jobs: &[NewJob], mode: PersistMode) -> Result<SaveOutcome> {
        if jobs.is_empty() {
            info!("No data to save for {}.", self.table);
            return Ok(SaveOutcome::Skipped);
        }

        let jobs = latest_by_id(jobs);
        let mut tx = self.pool.begin().await?;

        let insert = match mode {
            PersistMode::Replace => {
                sqlx::query(&format!("DELETE FROM \"{}\"", self.table))
                    .execute(&mut *tx)
                    .await
                    .with_context(|| format!("Failed to clear {}", self.table))?;

                format!(
                    "INSERT OR REPLACE INTO \"{}\" \
                     (id, title, company, location, date, job_url, job_description) \
                     VALUES (?, ?, ?, ?, ?, ?, ?)",
                    self.table
                )
            }
            PersistMode::Upsert => format!(
                "INSERT INTO \"{t}\" \
                 (id, title, company, location, date, job_url, job_description) \
                 VALUES (?, ?, ?, ?, ?, ?, ?) \
                 ON CONFLICT(id) DO UPDATE SET \
                 title = excluded.title, \
                 company = excluded.company, \
                 location = excluded.location, \
                 date = excluded.date, \
                 job_url = excluded.job_url, \
                 job_description = COALESCE(\
                     NULLIF(excluded.job_description, ?), \
                     \"{t}\".job_description, \
                     excluded.job_description)",
                t = self.table
            ),
        };

        for job in &jobs {
            let mut query = sqlx::query(&insert)
                .bind(job.id)
                .bind(&job.title)
                .bind(&job.company)
                .bind(&job.location)
                .bind(&job.date)
                .bind(&job.job_url)
                .bind(&job.job_description);
            if mode == PersistMode::Upsert {
                query = query.bind(DESCRIPTION_UNAVAILABLE);
            }

            query
                .execute(&mut *tx)
                .await
                .with_context(|| format!("Failed to save job {}", job.id))?;
        }

        tx.commit().await?;

        info!("Saved {} records to {} ({:?}).", jobs.len(), self.table, mode);
        Ok(SaveOutcome::Saved { count: jobs.len() })
    }
}

/// One record per id, the last occurrence winning, in first-seen order of survivors
fn latest_by_id(jobs: &[NewJob]) -> Vec<&NewJob> {
    let mut seen = HashSet::new();
    let mut unique: Vec<&NewJob> = jobs.iter().rev().filter(|job| seen.insert(job.id)).collect();
    unique.reverse();

    if unique.len() < jobs.len() {
        debug!(
            "Dropped {} duplicate job id(s) from the result set",
            jobs.len() - unique.len()
        );
    }
    unique
}

/// Single-connection in-memory pool; one connection keeps one database alive.
#[cfg(test)]
pub(crate) async fn memory_pool() -> SqlitePool {
    sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap()
}

#[cfg(test)]
pub(crate) async fn memory_store() -> JobStore {
    let store = JobStore::from_pool(memory_pool().await, "filtered_jobs");
    store.reconcile_schema().await.unwrap();
    store
}

#[cfg(test)]
pub(crate) fn sample_job(id: i64, title: &str) -> NewJob {
    NewJob {
        id,
        title: title.to_string(),
        company: "Acme".to_string(),
        location: "Berlin".to_string(),
        date: "2024-05-01".to_string(),
        job_url: format!("https://www.linkedin.com/jobs/view/{}/", id),
        job_description: Some(format!("Description of {}", title)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::job::JobFlag;

    #[tokio::test]
    async fn test_connect_creates_database_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("jobs.db");

        let store = JobStore::connect(&path, "filtered_jobs").await.unwrap();
        store.reconcile_schema().await.unwrap();

        assert!(path.exists());
        assert!(store.list_jobs(false).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_orders_by_id_descending_and_filters_hidden() {
        let store = memory_store().await;
        store
            .save_jobs(
                &[sample_job(1, "A"), sample_job(3, "C"), sample_job(2, "B")],
                PersistMode::Upsert,
            )
            .await
            .unwrap();
        store
            .update_flags(
                2,
                &[FlagUpdate {
                    flag: JobFlag::Hidden,
                    value: true,
                }],
            )
            .await
            .unwrap();

        let visible: Vec<i64> = store
            .list_jobs(false)
            .await
            .unwrap()
            .iter()
            .map(|j| j.id)
            .collect();
        assert_eq!(visible, vec![3, 1]);

        let hidden: Vec<i64> = store
            .list_jobs(true)
            .await
            .unwrap()
            .iter()
            .map(|j| j.id)
            .collect();
        assert_eq!(hidden, vec![2]);
    }

    #[tokio::test]
    async fn test_empty_save_is_skipped() {
        let store = memory_store().await;
        store
            .save_jobs(&[sample_job(1, "A")], PersistMode::Replace)
            .await
            .unwrap();

        let outcome = store.save_jobs(&[], PersistMode::Replace).await.unwrap();

        assert_eq!(outcome, SaveOutcome::Skipped);
        assert_eq!(store.list_jobs(false).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_replace_discards_annotations() {
        let store = memory_store().await;
        let jobs = vec![sample_job(10, "Rust Engineer"), sample_job(11, "Go Engineer")];

        store.save_jobs(&jobs, PersistMode::Replace).await.unwrap();
        store
            .update_flags(
                10,
                &[FlagUpdate {
                    flag: JobFlag::Applied,
                    value: true,
                }],
            )
            .await
            .unwrap();
        store.save_jobs(&jobs, PersistMode::Replace).await.unwrap();

        let rows = store.list_jobs(false).await.unwrap();
        assert_eq!(rows.len(), 2);
        let job = store.find_job(10).await.unwrap().unwrap();
        assert!(!job.applied);
    }

    #[tokio::test]
    async fn test_replace_drops_rows_missing_from_new_set() {
        let store = memory_store().await;
        store
            .save_jobs(&[sample_job(1, "A"), sample_job(2, "B")], PersistMode::Replace)
            .await
            .unwrap();
        store
            .save_jobs(&[sample_job(2, "B")], PersistMode::Replace)
            .await
            .unwrap();

        assert!(store.find_job(1).await.unwrap().is_none());
        assert!(store.find_job(2).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_upsert_keeps_annotations_and_refreshes_fields() {
        let store = memory_store().await;
        store
            .save_jobs(&[sample_job(10, "Rust Engineer")], PersistMode::Upsert)
            .await
            .unwrap();
        store
            .update_flags(
                10,
                &[FlagUpdate {
                    flag: JobFlag::Interview,
                    value: true,
                }],
            )
            .await
            .unwrap();
        store.set_resume(10, "tailored").await.unwrap();

        let mut refreshed = sample_job(10, "Senior Rust Engineer");
        refreshed.job_description = None;
        store
            .save_jobs(&[refreshed, sample_job(12, "New")], PersistMode::Upsert)
            .await
            .unwrap();

        let job = store.find_job(10).await.unwrap().unwrap();
        assert_eq!(job.title, "Senior Rust Engineer");
        assert!(job.interview);
        assert_eq!(job.resume.as_deref(), Some("tailored"));
        assert_eq!(
            job.job_description.as_deref(),
            Some("Description of Rust Engineer")
        );
        assert_eq!(store.list_jobs(false).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_ids_in_one_run_are_stored_once() {
        let store = memory_store().await;
        let outcome = store
            .save_jobs(
                &[sample_job(5, "First"), sample_job(5, "Second")],
                PersistMode::Replace,
            )
            .await
            .unwrap();

        assert_eq!(outcome, SaveOutcome::Saved { count: 1 });
        let rows = store.list_jobs(false).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].title, "Second");

        let outcome = store
            .save_jobs(
                &[sample_job(5, "Third"), sample_job(6, "Other"), sample_job(5, "Fourth")],
                PersistMode::Upsert,
            )
            .await
            .unwrap();
        assert_eq!(outcome, SaveOutcome::Saved { count: 2 });
        assert_eq!(store.find_job(5).await.unwrap().unwrap().title, "Fourth");
    }

    #[tokio::test]
    async fn test_unavailable_description_never_replaces_stored_one() {
        let store = memory_store().await;
        store
            .save_jobs(&[sample_job(10, "Rust Engineer")], PersistMode::Upsert)
            .await
            .unwrap();

        let mut failed_fetch = sample_job(10, "Rust Engineer");
        failed_fetch.job_description = Some(DESCRIPTION_UNAVAILABLE.to_string());
        let mut fresh = sample_job(11, "Go Engineer");
        fresh.job_description = Some(DESCRIPTION_UNAVAILABLE.to_string());
        store
            .save_jobs(&[failed_fetch, fresh], PersistMode::Upsert)
            .await
            .unwrap();

        let kept = store.find_job(10).await.unwrap().unwrap();
        assert_eq!(
            kept.job_description.as_deref(),
            Some("Description of Rust Engineer")
        );
        // a new row still records that the page could not be read
        let new_row = store.find_job(11).await.unwrap().unwrap();
        assert_eq!(
            new_row.job_description.as_deref(),
            Some(DESCRIPTION_UNAVAILABLE)
        );

        let mut updated = sample_job(10, "Rust Engineer");
        updated.job_description = Some("Rewritten posting".to_string());
        store
            .save_jobs(&[updated], PersistMode::Upsert)
            .await
            .unwrap();
        assert_eq!(
            store.find_job(10).await.unwrap().unwrap().job_description.as_deref(),
            Some("Rewritten posting")
        );
    }

    #[tokio::test]
    async fn test_update_flags_unknown_id() {
        let store = memory_store().await;
        let updated = store
            .update_flags(
                404,
                &[FlagUpdate {
                    flag: JobFlag::Hidden,
                    value: true,
                }],
            )
            .await
            .unwrap();
        assert!(!updated);
    }

    #[tokio::test]
    async fn test_cover_letter_distinguishes_missing_job() {
        let store = memory_store().await;
        store
            .save_jobs(&[sample_job(1, "A")], PersistMode::Upsert)
            .await
            .unwrap();

        assert_eq!(store.cover_letter(1).await.unwrap(), Some(None));
        assert_eq!(store.cover_letter(2).await.unwrap(), None);

        sqlx::query("UPDATE filtered_jobs SET cover_letter = 'Dear team' WHERE id = 1")
            .execute(store.pool())
            .await
            .unwrap();
        assert_eq!(
            store.cover_letter(1).await.unwrap(),
            Some(Some("Dear team".to_string()))
        );
    }

    #[tokio::test]
    async fn test_job_context() {
        let store = memory_store().await;
        store
            .save_jobs(&[sample_job(1, "Rust Engineer")], PersistMode::Upsert)
            .await
            .unwrap();

        let context = store.job_context(1).await.unwrap().unwrap();
        assert_eq!(context.title, "Rust Engineer");
        assert_eq!(context.company, "Acme");
        assert!(store.job_context(2).await.unwrap().is_none());
    }
}
