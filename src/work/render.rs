use log::{debug, error, warn};
use regex::Regex;

use crate::config::Config;
use crate::error::Error;
use crate::work::{jsonld, Work};

pub const NO_PUBLICATIONS: &str = "<p>No publications found.</p>";
pub const COULD_NOT_LOAD: &str = "<p>Could not load publications.</p>";

const NOT_AVAILABLE: &str = "N/A";

/// What ends up in the display region.
#[derive(Debug)]
pub enum Outcome {
    Works(Vec<Work>),
    Empty,
    Failed,
}

impl Outcome {
    pub fn from_result(result: Result<Vec<Work>, Error>) -> Outcome {
        match result {
            Ok(works) if works.is_empty() => Outcome::Empty,
            Ok(works) => Outcome::Works(works),
            Err(err) => {
                error!("Could not load ORCID works: {}", err);
                Outcome::Failed
            }
        }
    }

    /// The works the page metadata should list; `None` when loading failed.
    pub fn works(&self) -> Option<&[Work]> {
        match self {
            Outcome::Works(works) => Some(works.as_slice()),
            Outcome::Empty => Some(&[][..]),
            Outcome::Failed => None,
        }
    }

    pub fn to_html(&self) -> String {
        match self {
            Outcome::Works(works) => render_list(works),
            Outcome::Empty => NO_PUBLICATIONS.to_string(),
            Outcome::Failed => COULD_NOT_LOAD.to_string(),
        }
    }
}

pub fn render_list(works: &[Work]) -> String {
    let mut html = String::from("<ul class=\"orcid-works\">\n");
    for work in works {
        html.push_str(&render_item(work));
    }
    html.push_str("</ul>");
    html
}

fn render_item(work: &Work) -> String {
    let year = work
        .year()
        .map(|year| year.to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());
    let last_modified = work
        .last_modified
        .map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());

    let mut item = format!(
        "  <li>\n    <strong>{}</strong><br>\n    <span class=\"publication-year\">Published: {}</span> | <span class=\"last-modified\">Last modified: {}</span>\n",
        escape(&work.title),
        year,
        last_modified,
    );

    if let (Some(doi), Some(url)) = (&work.doi, work.doi_url()) {
        item.push_str(&format!(
            "    <br><a href=\"{}\" target=\"_blank\" rel=\"noopener\">DOI: {}</a>\n",
            escape(&url),
            escape(doi)
        ));
    }

    item.push_str("  </li>\n");
    item
}

pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Blanks out `<!-- ... -->` with spaces, keeping every byte offset intact.
pub(crate) fn mask_comments(document: &str) -> Result<String, Error> {
    let comment = Regex::new(r"(?s)<!--.*?-->").map_err(|err| Error::Selector(err.to_string()))?;

    let mut masked = String::with_capacity(document.len());
    let mut last = 0;
    for found in comment.find_iter(document) {
        masked.push_str(&document[last..found.start()]);
        masked.push_str(&" ".repeat(found.end() - found.start()));
        last = found.end();
    }
    masked.push_str(&document[last..]);

    Ok(masked)
}

/// Replaces the inner HTML of the element with the given id.
///
/// Same-named tags nested inside the element are balanced, so a `<div>`
/// region holding other `<div>`s is replaced as a whole. Markup inside
/// comments is not considered.
pub fn inject(document: &str, region_id: &str, markup: &str) -> Result<String, Error> {
    let masked = mask_comments(document)?;

    let open = Regex::new(&format!(
        r#"(?i)<([a-z][a-z0-9-]*)\b[^>]*\sid\s*=\s*["']{}["'][^>]*>"#,
        regex::escape(region_id)
    ))
    .map_err(|err| Error::Selector(err.to_string()))?;

    let captures = open
        .captures(&masked)
        .ok_or_else(|| Error::MissingElement(format!("#{}", region_id)))?;
    let (opening, tag) = match (captures.get(0), captures.get(1)) {
        (Some(opening), Some(tag)) => (opening, tag.as_str()),
        _ => return Err(Error::MissingElement(format!("#{}", region_id))),
    };
    let inner_start = opening.end();

    let tags = Regex::new(&format!(r"(?i)<(/?){}\b[^>]*>", regex::escape(tag)))
        .map_err(|err| Error::Selector(err.to_string()))?;

    let mut depth = 1;
    let mut inner_end = None;
    for found in tags.captures_iter(&masked[inner_start..]) {
        let whole = match found.get(0) {
            Some(whole) => whole,
            None => continue,
        };
        let closing = found.get(1).map_or(false, |slash| !slash.as_str().is_empty());

        if closing {
            depth -= 1;
            if depth == 0 {
                inner_end = Some(inner_start + whole.start());
                break;
            }
        } else if !whole.as_str().ends_with("/>") {
            depth += 1;
        }
    }

    let inner_end = inner_end.ok_or_else(|| Error::MissingElement(format!("</{}>", tag)))?;
    debug!(
        "Replacing {} bytes inside <{} id=\"{}\">",
        inner_end - inner_start,
        tag,
        region_id
    );

    Ok(format!(
        "{}{}{}",
        &document[..inner_start],
        markup,
        &document[inner_end..]
    ))
}

/// Rewrites the host document: the display region always, the JSON-LD
/// metadata only when the works were loaded.
pub fn update_document(document: &str, config: &Config, outcome: &Outcome) -> Result<String, Error> {
    let document = inject(document, &config.display_region, &outcome.to_html())?;

    let works = match outcome.works() {
        Some(works) => works,
        None => return Ok(document),
    };

    match jsonld::replace(&document, &jsonld::build(works, config)) {
        Ok(updated) => Ok(updated),
        Err(Error::MissingElement(what)) => {
            warn!("No {} in host document, metadata left as is", what);
            Ok(document)
        }
        Err(err) => Err(err),
    }
}
