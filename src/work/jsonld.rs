use log::debug;
use regex::Regex;
use serde_json::{json, Value};

use crate::config::Config;
use crate::error::Error;
use crate::work::render::mask_comments;
use crate::work::Work;

const LD_SCRIPT: &str = "script[type=\"application/ld+json\"]";

/// ORCID (and CSL) work types to the genre shown to search engines.
fn genre(kind: Option<&str>) -> String {
    let kind = match kind {
        Some(kind) => kind.trim().to_lowercase(),
        None => return String::from("Preprint"),
    };

    let genre = match kind.as_str() {
        "" | "article" | "preprint" => "Preprint",
        "journal-article" | "article-journal" => "Article",
        "report" => "Report",
        "book" => "Book",
        "chapter" | "book-chapter" => "Book Chapter",
        "dataset" | "data-set" => "Dataset",
        "software" => "Software",
        other => return super::feed::kind_label(Some(other)),
    };
    genre.to_string()
}

fn citation(work: &Work, author: &str) -> String {
    let date = work
        .publication_date
        .map(|date| date.to_iso())
        .unwrap_or_else(|| String::from("n.d."));

    let mut citation = format!("{} ({}). {}.", author, date, work.title);
    if let Some(journal) = &work.journal {
        citation.push_str(&format!(" {}.", journal));
    }
    if let Some(url) = work.doi_url() {
        citation.push_str(&format!(" {}", url));
    }
    citation
}

fn publication(work: &Work, author: &str) -> Value {
    let mut entry = json!({
        "@type": "ScholarlyArticle",
        "name": work.title,
        "genre": genre(work.kind.as_deref()),
        "author": [{ "@type": "Person", "name": author }],
        "citation": citation(work, author),
    });

    if let Some(url) = work.doi_url() {
        entry["url"] = json!(url);
    }
    if let Some(date) = work.publication_date {
        entry["datePublished"] = json!(date.to_iso());
    }
    if let Some(journal) = &work.journal {
        entry["isPartOf"] = json!({ "@type": "Periodical", "name": journal });
    }

    entry
}

/// The schema.org `CollectionPage` describing the researcher and their works.
pub fn build(works: &[Work], config: &Config) -> Value {
    let author = &config.author;
    let publications: Vec<Value> = works
        .iter()
        .map(|work| publication(work, &author.name))
        .collect();

    json!({
        "@context": "https://schema.org",
        "@type": "CollectionPage",
        "mainEntity": {
            "@type": "Person",
            "@id": "#person",
            "name": author.name,
            "jobTitle": author.job_title,
            "description": author.description,
            "url": author.url,
            "knowsAbout": author.knows_about,
            "sameAs": author.same_as,
            "publication": publications,
        }
    })
}

/// Swaps the body of the first `application/ld+json` script for `metadata`.
pub fn replace(document: &str, metadata: &Value) -> Result<String, Error> {
    let masked = mask_comments(document)?;
    let script = Regex::new(
        r#"(?is)<script\b[^>]*\stype\s*=\s*["']application/ld\+json["'][^>]*>(.*?)</script\s*>"#,
    )
    .map_err(|err| Error::Selector(err.to_string()))?;

    let body = script
        .captures(&masked)
        .and_then(|captures| captures.get(1))
        .ok_or_else(|| Error::MissingElement(LD_SCRIPT.to_string()))?;

    // `</script>` inside a string value would end the element early.
    let json = serde_json::to_string_pretty(metadata)?.replace("</", "<\\/");
    debug!("Replacing {} bytes of JSON-LD", body.end() - body.start());

    Ok(format!(
        "{}\n{}\n{}",
        &document[..body.start()],
        json,
        &document[body.end()..]
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::work::PublicationDate;

    fn work(title: &str, kind: Option<&str>, doi: Option<&str>) -> Work {
        Work {
            title: title.to_string(),
            doi: doi.map(str::to_string),
            kind: kind.map(str::to_string),
            journal: None,
            publication_date: None,
            last_modified: None,
        }
    }

    #[test]
    fn describes_the_researcher_and_each_work() {
        let mut article = work("Poiesis in Practice", Some("journal-article"), Some("10.1000/xyz123"));
        article.journal = Some(String::from("Zenodo"));
        article.publication_date = Some(PublicationDate {
            year: 2024,
            month: Some(5),
            day: Some(7),
        });

        let metadata = build(&[article, work("Notes", None, None)], &Config::default());

        assert_eq!(metadata["@type"], "CollectionPage");
        let person = &metadata["mainEntity"];
        assert_eq!(person["@type"], "Person");
        assert_eq!(person["name"], "K. Takahashi");
        assert_eq!(person["sameAs"][0], "https://orcid.org/0009-0004-4273-3365");

        let publications = person["publication"].as_array().unwrap();
        assert_eq!(publications.len(), 2);
        assert_eq!(
            publications[0],
            json!({
                "@type": "ScholarlyArticle",
                "name": "Poiesis in Practice",
                "genre": "Article",
                "url": "https://doi.org/10.1000/xyz123",
                "datePublished": "2024-05-07",
                "author": [{ "@type": "Person", "name": "K. Takahashi" }],
                "isPartOf": { "@type": "Periodical", "name": "Zenodo" },
                "citation": "K. Takahashi (2024-05-07). Poiesis in Practice. Zenodo. https://doi.org/10.1000/xyz123",
            })
        );

        let bare = &publications[1];
        assert_eq!(bare["genre"], "Preprint");
        assert_eq!(bare["citation"], "K. Takahashi (n.d.). Notes.");
        assert!(bare.get("url").is_none());
        assert!(bare.get("datePublished").is_none());
        assert!(bare.get("isPartOf").is_none());
    }

    #[test]
    fn genres_follow_the_work_type() {
        assert_eq!(genre(Some("book")), "Book");
        assert_eq!(genre(Some("book-chapter")), "Book Chapter");
        assert_eq!(genre(Some("chapter")), "Book Chapter");
        assert_eq!(genre(Some("data-set")), "Dataset");
        assert_eq!(genre(Some("preprint")), "Preprint");
        assert_eq!(genre(Some("working-paper")), "Working Paper");
        assert_eq!(genre(None), "Preprint");
    }

    #[test]
    fn replaces_the_script_body_in_place() {
        let document = "<head>\n<!-- <script type=\"application/ld+json\">{\"stale\": 1}</script> -->\n<script type=\"application/ld+json\">\n{\"old\": true}\n</script>\n</head><body id=\"b\"></body>";

        let replaced = replace(document, &json!({ "name": "a</script>b" })).unwrap();

        assert_eq!(
            replaced,
            "<head>\n<!-- <script type=\"application/ld+json\">{\"stale\": 1}</script> -->\n<script type=\"application/ld+json\">\n{\n  \"name\": \"a<\\/script>b\"\n}\n</script>\n</head><body id=\"b\"></body>"
        );

        let body = replaced.split("<script type=\"application/ld+json\">").nth(2).unwrap();
        let json = body.split("</script>").next().unwrap();
        let parsed: Value = serde_json::from_str(json).unwrap();
        assert_eq!(parsed["name"], "a</script>b");
    }

    #[test]
    fn missing_script_is_an_error() {
        match replace("<script src=\"app.js\"></script>", &json!({})) {
            Err(Error::MissingElement(_)) => (),
            other => panic!("expected missing element, got {:?}", other),
        }
    }
}
