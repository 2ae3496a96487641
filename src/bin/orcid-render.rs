use std::fs;

use log::{info, warn};
use orcid_works::work::api;
use orcid_works::work::render::{self, Outcome};
use orcid_works::{Config, Error};
use reqwest::blocking::Client;

extern crate log;
extern crate pretty_env_logger;

fn fetch_outcome(config: &Config) -> Outcome {
    let client = match Client::builder().build() {
        Ok(client) => client,
        Err(err) => return Outcome::from_result(Err(Error::Transport(err))),
    };

    Outcome::from_result(api::get(&client, config))
}

fn write_document(config: &Config, outcome: &Outcome) -> Result<(), Error> {
    let document = fs::read_to_string(&config.host_document)?;
    let document = render::update_document(&document, config, outcome)?;
    fs::write(&config.host_document, document)?;
    Ok(())
}

fn main() {
    pretty_env_logger::init();

    let config = Config::default();
    let outcome = fetch_outcome(&config);

    match write_document(&config, &outcome) {
        Ok(()) => info!(
            "Updated #{} in {}",
            config.display_region,
            config.host_document.display()
        ),
        Err(err) => {
            warn!(
                "Couldn't update {}: {}",
                config.host_document.display(),
                err
            );
            println!("{}", outcome.to_html());
        }
    }
}
