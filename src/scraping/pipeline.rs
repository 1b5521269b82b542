// src/scraping/pipeline.rs
use anyhow::{Context, Result};
use reqwest::Url;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use super::fetcher::Fetcher;
use super::filter::JobFilter;
use super::job_scraper::JobScraper;
use super::language::{LanguageDetector, WhatlangDetector};
use super::types::JobCard;
use crate::config::{AppConfig, PersistMode, SearchQuery};
use crate::core::{JobStore, SaveOutcome};
use crate::types::NewJob;

#[derive(Debug, Clone, PartialEq)]
pub struct ScrapeSummary {
    pub run_id: Uuid,
    pub pages_fetched: usize,
    pub pages_failed: usize,
    pub cards_found: usize,
    pub jobs_kept: usize,
    pub outcome: SaveOutcome,
}

/// One linear pass: search pages → cards → filter → descriptions → table.
pub struct ScrapeRun<'a> {
    config: &'a AppConfig,
    scraper: JobScraper,
    detector: Box<dyn LanguageDetector>,
    persist_mode: PersistMode,
    fetch_descriptions: bool,
}

impl<'a> ScrapeRun<'a> {
    pub fn new(config: &'a AppConfig) -> Result<Self> {
        Ok(Self {
            config,
            scraper: JobScraper::new(Fetcher::new(config)?)
                .with_view_url(&config.job_view_url),
            detector: Box::new(WhatlangDetector),
            persist_mode: config.persist_mode,
            fetch_descriptions: config.fetch_descriptions,
        })
    }

    pub fn with_detector(mut self, detector: Box<dyn LanguageDetector>) -> Self {
        self.detector = detector;
        self
    }

    pub fn with_persist_mode(mut self, mode: PersistMode) -> Self {
        self.persist_mode = mode;
        self
    }

    pub fn with_descriptions(mut self, enabled: bool) -> Self {
        self.fetch_descriptions = enabled;
        self
    }

    pub async fn run(&self, store: &JobStore) -> Result<ScrapeSummary> {
        let run_id = Uuid::new_v4();
        self.run_inner(store, run_id)
            .instrument(info_span!("scrape_run", %run_id))
            .await
    }

    async fn run_inner(&self, store: &JobStore, run_id: Uuid) -> Result<ScrapeSummary> {
        info!(
            "Starting scrape: {} queries x {} pages ({:?} mode)",
            self.config.search_queries.len(),
            self.config.pages_to_scrape,
            self.persist_mode
        );

        let mut all_cards = Vec::new();
        let mut pages_fetched = 0;
        let mut pages_failed = 0;

        for query in &self.config.search_queries {
            for page in 0..self.config.pages_to_scrape {
                let start = page * self.config.page_size;
                let url = search_url(&self.config.search_url, query, start)?;

                match self.scraper.fetch_cards(url.as_str()).await {
                    Some(cards) => {
                        pages_fetched += 1;
                        all_cards.extend(cards);
                    }
                    None => {
                        pages_failed += 1;
                        warn!(
                            "Skipping page {} of '{}' in {}",
                            page + 1,
                            query.keywords,
                            query.location
                        );
                    }
                }
            }
        }

        let cards_found = all_cards.len();
        let filter = JobFilter::new(
            &self.config.title_exclude,
            &self.config.languages,
            self.detector.as_ref(),
        );
        let kept = filter.apply(all_cards);

        let jobs = self.attach_descriptions(kept).await;
        let jobs_kept = jobs.len();

        store
            .reconcile_schema()
            .await
            .context("Failed to prepare jobs table")?;
        let outcome = store.save_jobs(&jobs, self.persist_mode).await?;

        info!(
            "Job scraping completed: {} pages fetched, {} failed, {} cards, {} kept",
            pages_fetched, pages_failed, cards_found, jobs_kept
        );

        Ok(ScrapeSummary {
            run_id,
            pages_fetched,
            pages_failed,
            cards_found,
            jobs_kept,
            outcome,
        })
    }

    async fn attach_descriptions(&self, cards: Vec<JobCard>) -> Vec<NewJob> {
        let mut jobs = Vec::with_capacity(cards.len());

        for card in cards {
            let description = if self.fetch_descriptions && !card.job_url.is_empty() {
                Some(self.scraper.fetch_description(&card.job_url).await)
            } else {
                None
            };

            if let Some(job) = card.into_new_job(description) {
                jobs.push(job);
            }
        }

        jobs
    }
}

/// Search-results URL for one page of a query
pub fn search_url(base: &str, query: &SearchQuery, start: u32) -> Result<Url> {
    let start = start.to_string();
    Url::parse_with_params(
        base,
        &[
            ("keywords", query.keywords.as_str()),
            ("location", query.location.as_str()),
            ("start", start.as_str()),
        ],
    )
    .with_context(|| format!("Invalid search URL: {}", base))
}
