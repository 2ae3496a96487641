use log::error;
use orcid_works::work::scrape::{self, ChromiumBrowser};
use orcid_works::Config;

extern crate log;
extern crate pretty_env_logger;

#[tokio::main]
async fn main() {
    pretty_env_logger::init();

    let config = Config::default();

    let browser = match ChromiumBrowser::launch().await {
        Ok(browser) => browser,
        Err(err) => {
            error!("Error scraping ORCID page: {}", err);
            return;
        }
    };

    match scrape::run(browser, &config).await {
        Ok(works) if works.is_empty() => {
            error!("No works with DOIs were found. The page structure might have changed.");
        }
        Ok(works) => match serde_json::to_string_pretty(&works) {
            Ok(json) => println!("{}", json),
            Err(err) => error!("Couldn't serialize works: {}", err),
        },
        Err(err) => error!("Error scraping ORCID page: {}", err),
    }
}
