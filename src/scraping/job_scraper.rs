// src/scraping/job_scraper.rs
use scraper::{ElementRef, Html, Selector};
use tracing::{info, warn};

use super::fetcher::Fetcher;
use super::types::JobCard;
pub use crate::types::job::DESCRIPTION_UNAVAILABLE;
use crate::utils::{clean_multiline, clean_text, normalize_date};
pub const JOB_VIEW_URL: &str = "https://www.linkedin.com/jobs/view";

const CARD_SELECTOR: &str = "div.base-search-card__info";
const TITLE_SELECTOR: &str = "h3";
const COMPANY_SELECTORS: [&str; 2] = ["a.hidden-nested-link", "h4.base-search-card__subtitle"];
const LOCATION_SELECTOR: &str = "span.job-search-card__location";
const DATE_SELECTOR: &str = "time";

const DESCRIPTION_SELECTORS: [&str; 3] = [
    "div.description__text--rich",
    "div.show-more-less-html__markup",
    "div.description__text",
];

pub struct JobScraper {
    fetcher: Fetcher,
    view_url: String,
}

impl JobScraper {
    pub fn new(fetcher: Fetcher) -> Self {
        Self {
            fetcher,
            view_url: JOB_VIEW_URL.to_string(),
        }
    }

    /// Base of the detail-page links built from card ids
    pub fn with_view_url(mut self, view_url: &str) -> Self {
        self.view_url = view_url.trim_end_matches('/').to_string();
        self
    }

    /// Fetch one search-results page and parse its cards. `None` when the
    /// page could not be retrieved.
    pub async fn fetch_cards(&self, url: &str) -> Option<Vec<JobCard>> {
        let html = self.fetcher.fetch(url).await?;
        let cards = parse_job_cards_with(&html, &self.view_url);
        info!("Parsed {} job cards from {}", cards.len(), url);
        Some(cards)
    }

    /// Long-form description of a detail page, or the sentinel text
    pub async fn fetch_description(&self, job_url: &str) -> String {
        let Some(html) = self.fetcher.fetch(job_url).await else {
            return DESCRIPTION_UNAVAILABLE.to_string();
        };

        parse_description(&html).unwrap_or_else(|| {
            warn!("No description found on {}", job_url);
            DESCRIPTION_UNAVAILABLE.to_string()
        })
    }
}

pub fn job_view_url(view_url: &str, id: &str) -> String {
    format!("{}/{}/", view_url, id)
}

/// Extract every job card of a search-results page. Missing sub-fields
/// become empty strings; a page without cards yields an empty list.
pub fn parse_job_cards(html: &str) -> Vec<JobCard> {
    parse_job_cards_with(html, JOB_VIEW_URL)
}

/// Same as [`parse_job_cards`], with detail links under `view_url`
pub fn parse_job_cards_with(html: &str, view_url: &str) -> Vec<JobCard> {
    let document = Html::parse_document(html);
    let Some(card_selector) = selector(CARD_SELECTOR) else {
        return Vec::new();
    };

    document
        .select(&card_selector)
        .map(|card| {
            let id = entity_id(&card);
            let job_url = if id.is_empty() {
                String::new()
            } else {
                job_view_url(view_url, &id)
            };

            JobCard {
                title: first_text(&card, &[TITLE_SELECTOR]),
                company: first_text(&card, &COMPANY_SELECTORS),
                location: first_text(&card, &[LOCATION_SELECTOR]),
                date: posting_date(&card),
                id,
                job_url,
            }
        })
        .collect()
}

/// Description text with its line structure kept
pub fn parse_description(html: &str) -> Option<String> {
    let document = Html::parse_document(html);

    DESCRIPTION_SELECTORS.iter().find_map(|selector_str| {
        let selector = selector(selector_str)?;
        let element = document.select(&selector).next()?;
        let text = clean_multiline(&element.text().collect::<Vec<_>>().join("\n"));
        (!text.is_empty()).then_some(text)
    })
}

fn selector(selector_str: &str) -> Option<Selector> {
    Selector::parse(selector_str).ok()
}

fn first_text(card: &ElementRef, selectors: &[&str]) -> String {
    selectors
        .iter()
        .filter_map(|s| selector(s))
        .find_map(|selector| {
            card.select(&selector)
                .next()
                .map(|element| clean_text(&element.text().collect::<String>()))
                .filter(|text| !text.is_empty())
        })
        .unwrap_or_default()
}

/// Last segment of the nearest `data-entity-urn`, e.g. `urn:li:jobPosting:42`
fn entity_id(card: &ElementRef) -> String {
    card.ancestors()
        .filter_map(ElementRef::wrap)
        .find_map(|element| element.value().attr("data-entity-urn"))
        .and_then(|urn| urn.rsplit(':').next())
        .map(|id| id.trim().to_string())
        .unwrap_or_default()
}

fn posting_date(card: &ElementRef) -> String {
    selector(DATE_SELECTOR)
        .and_then(|s| card.select(&s).next())
        .and_then(|time| time.value().attr("datetime"))
        .map(normalize_date)
        .unwrap_or_default()
}
