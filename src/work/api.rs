use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, USER_AGENT};
use serde::Deserialize;

use crate::config::Config;
use crate::error::Error;
use crate::work::{PublicationDate, Work};

// Every field of the ORCID works document is optional; a missing or null
// field is a `None` that extraction has to deal with explicitly.

#[derive(Debug, Deserialize)]
pub struct WorksResponse {
    pub group: Option<Vec<Group>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Group {
    pub last_modified_date: Option<Timestamp>,
    pub external_ids: Option<ExternalIds>,
    pub work_summary: Option<Vec<WorkSummary>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct WorkSummary {
    pub title: Option<WorkTitle>,
    pub publication_date: Option<FuzzyDate>,
    pub last_modified_date: Option<Timestamp>,
    pub external_ids: Option<ExternalIds>,
    pub journal_title: Option<StringValue>,
    #[serde(rename = "type")]
    pub work_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WorkTitle {
    pub title: Option<StringValue>,
}

#[derive(Debug, Deserialize)]
pub struct StringValue {
    pub value: Option<String>,
}

/// Milliseconds since the epoch.
#[derive(Debug, Deserialize)]
pub struct Timestamp {
    pub value: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct FuzzyDate {
    pub year: Option<StringValue>,
    pub month: Option<StringValue>,
    pub day: Option<StringValue>,
}

#[derive(Debug, Deserialize)]
pub struct ExternalIds {
    #[serde(rename = "external-id")]
    pub external_id: Option<Vec<ExternalId>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ExternalId {
    pub external_id_type: Option<String>,
    pub external_id_value: Option<String>,
}

impl Group {
    fn first_summary(&self) -> Option<&WorkSummary> {
        self.work_summary.as_ref()?.first()
    }

    fn last_modified(&self) -> Option<i64> {
        let group = self.last_modified_date.as_ref().and_then(|date| date.value);
        return group.or_else(|| {
            self.first_summary()?
                .last_modified_date
                .as_ref()?
                .value
        });
    }
}

pub fn fetch(client: &Client, config: &Config) -> Result<WorksResponse, Error> {
    let url = config.works_url();
    debug!("Fetching works from {}", url);

    let res = client
        .get(&url)
        .header(ACCEPT, "application/json")
        .header(USER_AGENT, &config.user_agent)
        .send()?;

    if !res.status().is_success() {
        warn!("Got status {} from ORCID works API", res.status());
        return Err(Error::Status(res.status()));
    }

    let body = res.text()?;
    let response = serde_json::from_str::<WorksResponse>(&body)?;

    Ok(response)
}

/// Fetches and extracts the works, newest modification first.
pub fn get(client: &Client, config: &Config) -> Result<Vec<Work>, Error> {
    let works = works(fetch(client, config)?);
    info!("Extracted {} works for {}", works.len(), config.orcid_id);
    Ok(works)
}

pub fn works(response: WorksResponse) -> Vec<Work> {
    let mut groups = response.group.unwrap_or_default();

    // Stable, and `None` orders below every `Some`, so untimestamped groups
    // end up last once reversed.
    groups.sort_by(|a, b| b.last_modified().cmp(&a.last_modified()));

    groups.iter().filter_map(work_from_group).collect()
}

fn work_from_group(group: &Group) -> Option<Work> {
    let summary = match group.first_summary() {
        Some(summary) => summary,
        None => {
            debug!("Group has no work summaries");
            return None;
        }
    };

    let title = match get_title(summary) {
        Some(title) => title,
        None => {
            debug!("Work summary has no title");
            return None;
        }
    };

    let doi = find_doi(summary.external_ids.as_ref())
        .or_else(|| find_doi(group.external_ids.as_ref()));

    let last_modified = group
        .last_modified()
        .and_then(DateTime::<Utc>::from_timestamp_millis);

    Some(Work {
        title,
        doi,
        kind: summary.work_type.clone(),
        journal: get_journal(summary),
        publication_date: get_publication_date(summary),
        last_modified,
    })
}

fn get_title(summary: &WorkSummary) -> Option<String> {
    let title = summary.title.as_ref()?.title.as_ref()?.value.as_deref()?.trim();
    if title.is_empty() {
        return None;
    }
    return Some(title.to_string());
}

fn get_journal(summary: &WorkSummary) -> Option<String> {
    let journal = summary.journal_title.as_ref()?.value.as_deref()?.trim();
    if journal.is_empty() {
        return None;
    }
    Some(journal.to_string())
}

fn get_publication_date(summary: &WorkSummary) -> Option<PublicationDate> {
    let date = summary.publication_date.as_ref()?;
    let year = parse_part::<i32>(date.year.as_ref())?;

    Some(PublicationDate {
        year,
        month: parse_part(date.month.as_ref()),
        day: parse_part(date.day.as_ref()),
    })
}

fn parse_part<T: std::str::FromStr>(part: Option<&StringValue>) -> Option<T> {
    part?.value.as_deref()?.trim().parse::<T>().ok()
}

fn find_doi(external_ids: Option<&ExternalIds>) -> Option<String> {
    external_ids?
        .external_id
        .as_ref()?
        .iter()
        .filter(|id| {
            id.external_id_type
                .as_deref()
                .map_or(false, |kind| kind.trim().eq_ignore_ascii_case("doi"))
        })
        .filter_map(|id| id.external_id_value.as_deref())
        .map(str::trim)
        .find(|value| !value.is_empty())
        .map(str::to_string)
}
