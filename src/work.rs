use chrono::{DateTime, Utc};
use serde::Serialize;

pub mod api;
pub mod feed;
pub mod jsonld;
pub mod render;
pub mod scrape;

/// A title/DOI pair read off the rendered profile page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScrapedWork {
    pub title: String,
    pub doi: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Work {
    pub title: String,
    pub doi: Option<String>,
    pub kind: Option<String>,
    pub journal: Option<String>,
    pub publication_date: Option<PublicationDate>,
    pub last_modified: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublicationDate {
    pub year: i32,
    pub month: Option<u32>,
    pub day: Option<u32>,
}

impl PublicationDate {
    /// `2024-05-17`, `2024-05` or `2024`, depending on what is known.
    pub fn to_iso(&self) -> String {
        match (self.month, self.day) {
            (Some(month), Some(day)) => format!("{:04}-{:02}-{:02}", self.year, month, day),
            (Some(month), None) => format!("{:04}-{:02}", self.year, month),
            _ => format!("{:04}", self.year),
        }
    }
}

impl Work {
    pub fn year(&self) -> Option<i32> {
        self.publication_date.map(|date| date.year)
    }

    pub fn doi_url(&self) -> Option<String> {
        self.doi.as_deref().map(doi_url)
    }
}

pub fn doi_url(doi: &str) -> String {
    format!("https://doi.org/{}", doi)
}
