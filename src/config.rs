// src/config.rs
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::utils::is_sql_identifier;

pub const DEFAULT_CONFIG_PATH: &str = "config.json";
const DEFAULT_SEARCH_URL: &str =
    "https://www.linkedin.com/jobs-guest/jobs/api/seeMoreJobPostings/search";
const DEFAULT_JOB_VIEW_URL: &str = "https://www.linkedin.com/jobs/view";

/// Settings shared by the scraper and the API server, read once from the JSON
/// config file and handed to each component that needs them.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub db_path: PathBuf,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    #[serde(default)]
    pub proxies: Option<HashMap<String, String>>,
    #[serde(default)]
    pub search_queries: Vec<SearchQuery>,
    #[serde(default = "default_pages")]
    pub pages_to_scrape: u32,
    #[serde(default = "default_tablename")]
    pub jobs_tablename: String,
    #[serde(default)]
    pub title_exclude: Vec<String>,
    #[serde(default = "default_languages")]
    pub languages: Vec<String>,
    #[serde(rename = "OpenAI_API_KEY", default)]
    pub openai_api_key: Option<String>,
    #[serde(default)]
    pub resume_path: PathBuf,

    #[serde(default = "default_retries")]
    pub max_retries: u32,
    #[serde(default = "default_retry_delay")]
    pub retry_delay_secs: u64,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default = "default_search_url")]
    pub search_url: String,
    #[serde(default = "default_job_view_url")]
    pub job_view_url: String,
    #[serde(default = "default_true")]
    pub fetch_descriptions: bool,
    #[serde(default)]
    pub persist_mode: PersistMode,

    #[serde(default = "default_openai_model")]
    pub openai_model: String,
    #[serde(default = "default_openai_base_url")]
    pub openai_base_url: String,
    #[serde(default = "default_openai_timeout")]
    pub openai_timeout_secs: u64,

    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SearchQuery {
    pub keywords: String,
    pub location: String,
}

/// How a scrape run writes its result set.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PersistMode {
    /// Insert new ids, refresh scraped fields, keep annotations.
    #[default]
    Upsert,
    /// Drop the table and write the new set as its only contents.
    Replace,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_address")]
    pub address: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            address: default_address(),
            port: default_port(),
        }
    }
}

fn default_pages() -> u32 {
    1
}
fn default_tablename() -> String {
    "filtered_jobs".to_string()
}
fn default_languages() -> Vec<String> {
    vec!["en".to_string()]
}
fn default_retries() -> u32 {
    3
}
fn default_retry_delay() -> u64 {
    1
}
fn default_request_timeout() -> u64 {
    5
}
fn default_page_size() -> u32 {
    25
}
fn default_search_url() -> String {
    DEFAULT_SEARCH_URL.to_string()
}
fn default_job_view_url() -> String {
    DEFAULT_JOB_VIEW_URL.to_string()
}
fn default_true() -> bool {
    true
}
fn default_openai_model() -> String {
    "gpt-3.5-turbo".to_string()
}
fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}
fn default_openai_timeout() -> u64 {
    120
}
fn default_address() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    5001
}

impl AppConfig {
    /// Load and validate the configuration file
    pub fn load(path: &Path) -> Result<Self> {
        info!("Loading configuration from: {}", path.display());

        if !path.exists() {
            anyhow::bail!(
                "{} not found. Cannot start without configuration.",
                path.display()
            );
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        Self::from_json(&content).with_context(|| format!("Invalid config in {}", path.display()))
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let config: AppConfig =
            serde_json::from_str(content).context("Failed to parse configuration JSON")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if !is_sql_identifier(&self.jobs_tablename) {
            anyhow::bail!(
                "jobs_tablename '{}' must contain only letters, digits and underscores",
                self.jobs_tablename
            );
        }

        if self.max_retries == 0 {
            anyhow::bail!("max_retries must be at least 1");
        }

        Ok(())
    }

    /// The API key, if one is configured and non-empty
    pub fn openai_api_key(&self) -> Option<&str> {
        self.openai_api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}
