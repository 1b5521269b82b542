// src/scraping/mod.rs
//! Listing-site scraper: fetch, parse, filter, persist

pub mod fetcher;
pub mod filter;
pub mod job_scraper;
pub mod language;
pub mod pipeline;
pub mod types;

pub use fetcher::Fetcher;
pub use filter::JobFilter;
pub use job_scraper::{JobScraper, DESCRIPTION_UNAVAILABLE};
pub use language::{LanguageDetector, WhatlangDetector};
pub use pipeline::{ScrapeRun, ScrapeSummary};
pub use types::JobCard;
