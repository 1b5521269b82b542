// src/scraping/filter.rs
use tracing::{debug, info};

use super::language::{is_accepted, LanguageDetector};
use super::types::JobCard;

/// Title-based relevance rules: exclusion words plus accepted languages.
pub struct JobFilter<'a> {
    excluded_words: Vec<String>,
    languages: &'a [String],
    detector: &'a dyn LanguageDetector,
}

impl<'a> JobFilter<'a> {
    pub fn new(
        title_exclude: &[String],
        languages: &'a [String],
        detector: &'a dyn LanguageDetector,
    ) -> Self {
        let excluded_words = title_exclude
            .iter()
            .map(|word| word.trim().to_lowercase())
            .filter(|word| !word.is_empty())
            .collect();

        Self {
            excluded_words,
            languages,
            detector,
        }
    }

    pub fn keep(&self, card: &JobCard) -> bool {
        let title = card.title.to_lowercase();

        if let Some(word) = self.excluded_words.iter().find(|w| title.contains(w.as_str())) {
            debug!("Excluding '{}': title contains '{}'", card.title, word);
            return false;
        }

        match self.detector.detect(&card.title) {
            Some(lang) if is_accepted(&lang, self.languages) => true,
            Some(lang) => {
                debug!("Excluding '{}': detected language {}", card.title, lang);
                false
            }
            None => {
                debug!("Excluding '{}': language could not be detected", card.title);
                false
            }
        }
    }

    pub fn apply(&self, cards: Vec<JobCard>) -> Vec<JobCard> {
        let total = cards.len();
        let kept: Vec<JobCard> = cards.into_iter().filter(|card| self.keep(card)).collect();
        info!("Filter kept {} of {} job cards", kept.len(), total);
        kept
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Detector answering from a fixed title → language table
    pub(crate) struct StubDetector(pub HashMap<String, String>);

    impl StubDetector {
        pub(crate) fn new(entries: &[(&str, &str)]) -> Self {
            Self(
                entries
                    .iter()
                    .map(|(title, lang)| (title.to_string(), lang.to_string()))
                    .collect(),
            )
        }
    }

    impl LanguageDetector for StubDetector {
        fn detect(&self, text: &str) -> Option<String> {
            self.0.get(text).cloned()
        }
    }

    fn card(title: &str) -> JobCard {
        JobCard {
            id: "1".to_string(),
            title: title.to_string(),
            ..Default::default()
        }
    }

    fn strings(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_excluded_word_wins_regardless_of_language() {
        let detector = StubDetector::new(&[
            ("Senior Rust Engineer", "en"),
            ("Rust Engineer (SENIOR)", "en"),
            ("Seniority-free Rust role", "en"),
        ]);
        let languages = strings(&["en"]);
        let filter = JobFilter::new(&strings(&["senior"]), &languages, &detector);

        assert!(!filter.keep(&card("Senior Rust Engineer")));
        assert!(!filter.keep(&card("Rust Engineer (SENIOR)")));
        // substring match, any position
        assert!(!filter.keep(&card("Seniority-free Rust role")));
    }

    #[test]
    fn test_language_outside_accepted_set_is_excluded() {
        let detector = StubDetector::new(&[
            ("Rust Engineer", "en"),
            ("Ingénieur Rust", "fr"),
        ]);
        let languages = strings(&["en"]);
        let filter = JobFilter::new(&[], &languages, &detector);

        assert!(filter.keep(&card("Rust Engineer")));
        assert!(!filter.keep(&card("Ingénieur Rust")));
    }

    #[test]
    fn test_detection_failure_excludes() {
        let detector = StubDetector::new(&[]);
        let languages = strings(&["en"]);
        let filter = JobFilter::new(&[], &languages, &detector);

        assert!(!filter.keep(&card("???")));
    }

    #[test]
    fn test_blank_exclusion_words_are_ignored() {
        let detector = StubDetector::new(&[("Rust Engineer", "en")]);
        let languages = strings(&["en"]);
        let filter = JobFilter::new(&strings(&["", "  "]), &languages, &detector);

        assert!(filter.keep(&card("Rust Engineer")));
    }

    #[test]
    fn test_apply_keeps_order() {
        let detector = StubDetector::new(&[
            ("Backend Engineer", "en"),
            ("Frontend Intern", "en"),
            ("Data Engineer", "en"),
            ("Entwickler", "de"),
        ]);
        let languages = strings(&["en"]);
        let filter = JobFilter::new(&strings(&["intern"]), &languages, &detector);

        let kept: Vec<String> = filter
            .apply(vec![
                card("Backend Engineer"),
                card("Frontend Intern"),
                card("Entwickler"),
                card("Data Engineer"),
            ])
            .into_iter()
            .map(|c| c.title)
            .collect();

        assert_eq!(kept, vec!["Backend Engineer", "Data Engineer"]);
    }
}
