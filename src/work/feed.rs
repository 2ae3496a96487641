use std::collections::HashSet;

use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone};
use log::debug;

use crate::config::Config;
use crate::work::{PublicationDate, Work};

const JST_OFFSET_SECS: i32 = 9 * 3600;

struct FeedItem<'a> {
    title: &'a str,
    doi: &'a str,
    link: String,
    kind: String,
    pub_date: Option<String>,
}

fn first_letter_to_upper_case(s: &str) -> String {
    let mut c = s.chars();
    match c.next() {
        None => String::new(),
        Some(f) => f.to_uppercase().to_string() + c.as_str(),
    }
}

/// `journal-article` -> `Journal Article`
pub(crate) fn kind_label(kind: Option<&str>) -> String {
    let label = kind
        .unwrap_or_default()
        .split(|c: char| c == '-' || c == '_' || c == ' ')
        .filter(|word| !word.is_empty())
        .map(|word| first_letter_to_upper_case(&word.to_lowercase()))
        .collect::<Vec<_>>()
        .join(" ");

    if label.is_empty() {
        return String::from("Work");
    }
    return label;
}

/// Midnight in JST, as RFC 2822. Only complete dates qualify.
fn pub_date(date: Option<PublicationDate>) -> Option<String> {
    let date = date?;
    let day = NaiveDate::from_ymd_opt(date.year, date.month?, date.day?)?;
    let midnight = day.and_hms_opt(0, 0, 0)?;
    let jst = FixedOffset::east_opt(JST_OFFSET_SECS)?;
    let local = jst.from_local_datetime(&midnight).single()?;
    Some(local.to_rfc2822())
}

fn feed_items(works: &[Work]) -> Vec<FeedItem<'_>> {
    let mut seen = HashSet::new();
    let mut items = Vec::new();

    for work in works {
        let doi = match work.doi.as_deref() {
            Some(doi) => doi,
            None => continue,
        };
        if !seen.insert(doi.to_lowercase()) {
            debug!("Skipping duplicate DOI {}", doi);
            continue;
        }

        items.push(FeedItem {
            title: &work.title,
            doi,
            link: super::doi_url(doi),
            kind: kind_label(work.kind.as_deref()),
            pub_date: pub_date(work.publication_date),
        });
    }

    items
}

pub fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Builds an RSS 2.0 document for the works that carry a DOI.
pub fn build<Tz: TimeZone>(works: &[Work], config: &Config, now: DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let channel = &config.feed;
    let author_name = escape(&config.author.name);
    let author_uri = escape(&config.profile_url());

    let mut rss = vec![
        String::from(r#"<?xml version="1.0" encoding="UTF-8"?>"#),
        String::from(
            r#"<rss version="2.0" xmlns:atom="http://www.w3.org/2005/Atom" xmlns:dc="http://purl.org/dc/elements/1.1/">"#,
        ),
        String::from("<channel>"),
        format!("  <title>{}</title>", escape(&channel.title)),
        format!("  <link>{}</link>", escape(&channel.site_url)),
        format!("  <description>{}</description>", escape(&channel.description)),
        format!("  <language>{}</language>", escape(&channel.language)),
        format!("  <lastBuildDate>{}</lastBuildDate>", now.to_rfc2822()),
        format!(
            r#"  <atom:link rel="self" type="application/rss+xml" href="{}" />"#,
            escape(&channel.feed_url)
        ),
        String::from("  <atom:author>"),
        format!("    <atom:name>{}</atom:name>", author_name),
        format!("    <atom:uri>{}</atom:uri>", author_uri),
        String::from("  </atom:author>"),
    ];

    for item in feed_items(works) {
        rss.push(String::from("  <item>"));
        rss.push(format!("    <title>{}</title>", escape(item.title)));
        rss.push(format!("    <link>{}</link>", escape(&item.link)));
        rss.push(format!(
            r#"    <guid isPermaLink="true">{}</guid>"#,
            escape(&item.link)
        ));
        if let Some(pub_date) = item.pub_date {
            rss.push(format!("    <pubDate>{}</pubDate>", pub_date));
        }
        rss.push(format!("    <dc:creator>{}</dc:creator>", author_name));
        rss.push(String::from("    <atom:author>"));
        rss.push(format!("      <atom:name>{}</atom:name>", author_name));
        rss.push(format!("      <atom:uri>{}</atom:uri>", author_uri));
        rss.push(String::from("    </atom:author>"));
        rss.push(String::from("    <description><![CDATA["));
        rss.push(format!(
            "      {} - DOI: {}",
            item.kind,
            item.doi.replace("]]>", "]]]]><![CDATA[>")
        ));
        rss.push(String::from("    ]]></description>"));
        rss.push(String::from("  </item>"));
    }

    rss.push(String::from("</channel>"));
    rss.push(String::from("</rss>"));

    rss.join("\n") + "\n"
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn work(title: &str, doi: Option<&str>, date: Option<(i32, Option<u32>, Option<u32>)>) -> Work {
        Work {
            title: title.to_string(),
            doi: doi.map(str::to_string),
            kind: Some(String::from("journal-article")),
            journal: None,
            publication_date: date.map(|(year, month, day)| PublicationDate { year, month, day }),
            last_modified: None,
        }
    }

    fn feed(works: &[Work]) -> String {
        build(
            works,
            &Config::default(),
            Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap(),
        )
    }

    #[test]
    fn channel_carries_author_and_self_link() {
        let rss = feed(&[]);

        assert!(rss.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<rss version=\"2.0\""));
        assert!(rss.contains("<lastBuildDate>Thu, 2 Jan 2025 03:04:05 +0000</lastBuildDate>"));
        assert!(rss.contains("<atom:uri>https://orcid.org/0009-0004-4273-3365</atom:uri>"));
        assert!(rss.contains("rel=\"self\""));
        assert!(!rss.contains("<item>"));
        assert!(rss.ends_with("</rss>\n"));
    }

    #[test]
    fn items_link_to_the_doi_and_skip_works_without_one() {
        let rss = feed(&[
            work("Linked", Some("10.1000/xyz123"), None),
            work("Unlinked", None, None),
        ]);

        assert!(rss.contains("<link>https://doi.org/10.1000/xyz123</link>"));
        assert!(rss.contains("<guid isPermaLink=\"true\">https://doi.org/10.1000/xyz123</guid>"));
        assert!(rss.contains("Journal Article - DOI: 10.1000/xyz123"));
        assert!(!rss.contains("Unlinked"));
    }

    #[test]
    fn duplicate_dois_are_dropped_case_insensitively() {
        let rss = feed(&[
            work("Original", Some("10.5281/ZENODO.1"), None),
            work("Copy", Some("10.5281/zenodo.1"), None),
        ]);

        assert_eq!(rss.matches("<item>").count(), 1);
        assert!(rss.contains("Original"));
    }

    #[test]
    fn pub_date_only_for_full_dates() {
        let rss = feed(&[
            work("Full", Some("10.1/a"), Some((2024, Some(5), Some(17)))),
            work("Partial", Some("10.1/b"), Some((2024, Some(5), None))),
        ]);

        assert_eq!(rss.matches("<pubDate>").count(), 1);
        assert!(rss.contains("<pubDate>Fri, 17 May 2024 00:00:00 +0900</pubDate>"));
    }

    #[test]
    fn text_is_escaped() {
        let rss = feed(&[work("A <b> & C", Some("10.1/a"), None)]);
        assert!(rss.contains("<title>A &lt;b&gt; &amp; C</title>"));
    }

    #[test]
    fn kind_labels() {
        assert_eq!(kind_label(Some("preprint")), "Preprint");
        assert_eq!(kind_label(Some("BOOK_CHAPTER")), "Book Chapter");
        assert_eq!(kind_label(None), "Work");
    }
}
