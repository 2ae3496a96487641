use std::path::PathBuf;
use std::time::Duration;

/// Everything the binaries need to know about where to look and where to write.
///
/// There are no flags or environment variables; `Config::default()` is what
/// runs in production and tests build their own values.
#[derive(Debug, Clone)]
pub struct Config {
    pub orcid_id: String,
    pub api_base: String,
    pub profile_base: String,
    pub user_agent: String,

    pub navigation_timeout: Duration,
    pub selector_timeout: Duration,
    pub settle_delay: Duration,

    pub host_document: PathBuf,
    pub display_region: String,

    pub feed_path: PathBuf,
    pub feed: FeedChannel,

    pub author: Author,
}

/// The researcher, as described in the page's schema.org metadata.
#[derive(Debug, Clone)]
pub struct Author {
    pub name: String,
    pub job_title: String,
    pub description: String,
    pub url: String,
    pub knows_about: Vec<String>,
    pub same_as: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct FeedChannel {
    pub title: String,
    pub description: String,
    pub site_url: String,
    pub feed_url: String,
    pub language: String,
}

impl Config {
    pub fn works_url(&self) -> String {
        format!(
            "{}/{}/works",
            self.api_base.trim_end_matches('/'),
            urlencoding::encode(&self.orcid_id)
        )
    }

    pub fn profile_url(&self) -> String {
        format!(
            "{}/{}",
            self.profile_base.trim_end_matches('/'),
            urlencoding::encode(&self.orcid_id)
        )
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            orcid_id: String::from("0009-0004-4273-3365"),
            api_base: String::from("https://pub.orcid.org/v3.0"),
            profile_base: String::from("https://orcid.org"),
            user_agent: String::from("orcid-works (+https://kadubon.github.io/github.io/)"),

            navigation_timeout: Duration::from_secs(30),
            selector_timeout: Duration::from_secs(30),
            settle_delay: Duration::from_secs(2),

            host_document: PathBuf::from("works.html"),
            display_region: String::from("orcid-works"),

            feed_path: PathBuf::from("feed.xml"),
            feed: FeedChannel {
                title: String::from("K. Takahashi - Research Updates"),
                description: String::from(
                    "Research preprints and theoretical works by K. Takahashi",
                ),
                site_url: String::from("https://kadubon.github.io/github.io/"),
                feed_url: String::from("https://kadubon.github.io/github.io/feed.xml"),
                language: String::from("en"),
            },

            author: Author {
                name: String::from("K. Takahashi"),
                job_title: String::from("Researcher"),
                description: String::from(
                    "A researcher specializing in artificial intelligence, self-organizing systems, and computational philosophy.",
                ),
                url: String::from("https://kadubon.github.io/github.io/"),
                knows_about: [
                    "Artificial Intelligence",
                    "Large Language Models",
                    "AI Alignment",
                    "AI Safety",
                    "Superintelligence",
                    "Computational Philosophy",
                    "Self-Organizing Systems",
                    "Category Theory",
                    "Free Energy Principle",
                    "Poiesis",
                ]
                .iter()
                .map(|topic| topic.to_string())
                .collect(),
                same_as: [
                    "https://orcid.org/0009-0004-4273-3365",
                    "https://scholar.google.com/citations?view_op=list_works&hl=ja&hl=ja&user=0iEnSjkAAAAJ",
                    "https://medium.com/@omanyuk",
                    "https://x.com/YukiMiyake1919",
                    "https://note.com/omanyuk",
                    "https://independent.academia.edu/KTakahashi8",
                    "https://huggingface.co/kadubon",
                ]
                .iter()
                .map(|url| url.to_string())
                .collect(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_are_built_from_the_orcid_id() {
        let config = Config {
            api_base: String::from("http://localhost:8080/v3.0/"),
            ..Config::default()
        };

        assert_eq!(
            config.works_url(),
            "http://localhost:8080/v3.0/0009-0004-4273-3365/works"
        );
        assert_eq!(config.profile_url(), "https://orcid.org/0009-0004-4273-3365");
    }
}
