// src/web/page.rs
//! Server-rendered job list for `GET /`

use askama::Template;

use crate::types::JobPosting;

/// Rendered from `templates/jobs.html`; every field is HTML-escaped by the template
#[derive(Template)]
#[template(path = "jobs.html")]
pub struct JobListPage<'a> {
    pub rows: Vec<JobRow<'a>>,
}

pub struct JobRow<'a> {
    pub job: &'a JobPosting,
    pub status: &'static str,
}

impl<'a> JobListPage<'a> {
    pub fn new(jobs: &'a [JobPosting]) -> Self {
        let rows = jobs
            .iter()
            .map(|job| JobRow {
                job,
                status: status_label(job).unwrap_or(""),
            })
            .collect();
        Self { rows }
    }
}

pub fn render_job_list(jobs: &[JobPosting]) -> Result<String, askama::Error> {
    JobListPage::new(jobs).render()
}

/// Most advanced stage reached
fn status_label(job: &JobPosting) -> Option<&'static str> {
    if job.rejected {
        Some("rejected")
    } else if job.interview {
        Some("interview")
    } else if job.applied {
        Some("applied")
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(id: i64, title: &str) -> JobPosting {
        JobPosting {
            id,
            title: title.to_string(),
            company: "Acme & Sons".to_string(),
            location: "Remote".to_string(),
            date: "2024-06-01".to_string(),
            job_url: format!("https://example.com/jobs/view/{}", id),
            hidden: false,
            applied: false,
            interview: false,
            rejected: false,
            cover_letter: None,
            resume: None,
            job_description: None,
        }
    }

    #[test]
    fn test_rows_are_escaped() {
        let html = render_job_list(&[job(1, "<script>alert(1)</script>")]).unwrap();

        assert!(html.contains("&lt;script&gt;alert(1)"));
        assert!(html.contains("Acme &amp; Sons"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("Job postings (1)"));
    }

    #[test]
    fn test_status_class() {
        let mut applied = job(2, "Rust Engineer");
        applied.applied = true;
        let mut interview = job(3, "Go Engineer");
        interview.applied = true;
        interview.interview = true;
        let mut rejected = job(4, "C Engineer");
        rejected.interview = true;
        rejected.rejected = true;

        let html = render_job_list(&[applied, interview, rejected, job(5, "Plain")]).unwrap();
        assert!(html.contains(r#"<tr id="job-2" class="applied">"#));
        assert!(html.contains(r#"<tr id="job-3" class="interview">"#));
        assert!(html.contains(r#"<tr id="job-4" class="rejected">"#));
        assert!(html.contains(r#"<tr id="job-5" class="">"#));
    }

    #[test]
    fn test_empty_list() {
        let html = render_job_list(&[]).unwrap();
        assert!(html.contains("No jobs yet."));
        assert!(html.contains("Job postings (0)"));
        assert!(!html.contains("<table>"));
    }
}
