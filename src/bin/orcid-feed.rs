use std::fs;

use chrono::Utc;
use log::{error, info};
use orcid_works::work::{api, feed};
use orcid_works::Config;
use reqwest::blocking::Client;

extern crate log;
extern crate pretty_env_logger;

fn main() {
    pretty_env_logger::init();

    let config = Config::default();

    let client = match Client::builder().build() {
        Ok(client) => client,
        Err(err) => {
            error!("Couldn't build HTTP client: {}", err);
            return;
        }
    };

    let works = match api::get(&client, &config) {
        Ok(works) => works,
        Err(err) => {
            error!("Could not load ORCID works, feed not written: {}", err);
            return;
        }
    };

    let rss = feed::build(&works, &config, Utc::now());
    let items = rss.matches("<item>").count();

    match fs::write(&config.feed_path, rss) {
        Ok(()) => info!(
            "Wrote {} with {} items (ORCID={})",
            config.feed_path.display(),
            items,
            config.profile_url()
        ),
        Err(err) => error!("Couldn't write {}: {}", config.feed_path.display(), err),
    }
}
