//! Job board: scrape listing pages into SQLite, then browse, annotate and
//! tailor resumes through a small web API.

pub mod cli;
pub mod config;
pub mod core;
pub mod logging;
pub mod resume_tailor;
pub mod scraping;
pub mod types;
pub mod utils;
pub mod web;

#[cfg(test)]
mod test_support;

pub use crate::config::AppConfig;
pub use crate::core::JobStore;
pub use crate::web::start_web_server;
