use std::future::Future;
use std::time::Duration;

use log::{debug, info, warn};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::config::Config;
use crate::error::Error;
use crate::work::ScrapedWork;

pub use self::browser::{Browser, ChromiumBrowser};

mod browser;

pub const WORKS_CONTAINER: &str = "#works-container";
const WORK_ITEM: &str = "#works-container cy-list-item";
const WORK_TITLE: &str = "cy-list-item-title a";
const DOI_LINK: &str = "a[href*=\"doi.org\"]";

/// Scrapes the profile page, then closes the browser whatever happened.
pub async fn run<B: Browser>(mut browser: B, config: &Config) -> Result<Vec<ScrapedWork>, Error> {
    let result = scrape_profile(&mut browser, config).await;

    if let Err(err) = browser.close().await {
        warn!("Failed to close browser cleanly: {}", err);
    }

    result
}

async fn scrape_profile<B: Browser>(
    browser: &mut B,
    config: &Config,
) -> Result<Vec<ScrapedWork>, Error> {
    let url = config.profile_url();

    info!("Navigating to {}", url);
    within(config.navigation_timeout, &url, browser.goto(&url)).await?;

    within(
        config.selector_timeout,
        WORKS_CONTAINER,
        browser.wait_for_selector(WORKS_CONTAINER),
    )
    .await?;

    // Items keep rendering for a moment after the container shows up.
    tokio::time::sleep(config.settle_delay).await;

    let html = browser.content().await?;
    extract_works(&html)
}

async fn within<T>(
    limit: Duration,
    what: &str,
    step: impl Future<Output = Result<T, Error>>,
) -> Result<T, Error> {
    match tokio::time::timeout(limit, step).await {
        Ok(result) => result,
        Err(_) => Err(Error::Timeout {
            what: what.to_string(),
            after: limit,
        }),
    }
}

fn selector(css: &str) -> Result<Selector, Error> {
    Selector::parse(css).map_err(|_| Error::Selector(css.to_string()))
}

fn resolver_prefix() -> Result<Regex, Error> {
    Regex::new(r"(?i)^\s*(https?:)?//(dx\.)?doi\.org/").map_err(|err| Error::Selector(err.to_string()))
}

/// Reads title/DOI pairs out of the rendered works list. Items lacking either
/// are dropped.
pub fn extract_works(html: &str) -> Result<Vec<ScrapedWork>, Error> {
    let document = Html::parse_document(html);
    let item_selector = selector(WORK_ITEM)?;
    let title_selector = selector(WORK_TITLE)?;
    let doi_selector = selector(DOI_LINK)?;
    let resolver = resolver_prefix()?;

    let works: Vec<ScrapedWork> = document
        .select(&item_selector)
        .filter_map(|item| {
            let title = get_title(item, &title_selector);
            let doi = get_doi(item, &doi_selector, &resolver);
            match (title, doi) {
                (Some(title), Some(doi)) => Some(ScrapedWork { title, doi }),
                _ => {
                    debug!("Skipping list item without both title and DOI");
                    None
                }
            }
        })
        .collect();

    Ok(works)
}

fn get_title(item: ElementRef, title_selector: &Selector) -> Option<String> {
    let element = item.select(title_selector).next()?;
    let title = element.text().collect::<String>();
    let title = title.split_whitespace().collect::<Vec<_>>().join(" ");

    if title.is_empty() {
        return None;
    }
    return Some(title);
}

fn get_doi(item: ElementRef, doi_selector: &Selector, resolver: &Regex) -> Option<String> {
    let href = item.select(doi_selector).next()?.value().attr("href")?;
    let doi = strip_resolver(resolver, href);

    if doi.is_empty() {
        return None;
    }
    return Some(doi);
}

/// `https://doi.org/10.1000/xyz` -> `10.1000/xyz`
pub fn strip_resolver(resolver: &Regex, href: &str) -> String {
    resolver.replace(href, "").trim().to_string()
}
