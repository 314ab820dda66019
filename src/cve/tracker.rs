use reqwest::StatusCode;
use reqwest::blocking::Client;
use tracing::debug;
use url::Url;

use super::{CveSource, Error};

/// Plain-text record store of the Ubuntu CVE tracker.
const TRACKER_BASE: &str = "https://git.launchpad.net/ubuntu-cve-tracker/plain";

/// The tracker directories a record can live in, in lookup order.
const LOCATIONS: [&str; 3] = ["active", "retired", "ignored"];

/// Fetches CVE records from the Ubuntu CVE tracker over HTTP.
///
/// A record is looked up in the `active`, `retired` and `ignored` trees in
/// that order, short-circuiting on the first hit. A 404 from one tree moves
/// on to the next; a 404 from every tree is "not found". Any other failure
/// is reported as an error, since it signals misconfiguration rather than
/// absence.
#[derive(Debug)]
pub struct UbuntuCveTracker {
    client: Client,
    base: Url,
}

impl UbuntuCveTracker {
    /// Creates a tracker client against the canonical record store.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn new() -> Result<Self, Error> {
        let client = Client::builder()
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()?;
        let base = Url::parse(TRACKER_BASE).expect("base URL is valid");
        Ok(Self { client, base })
    }

    fn record_url(&self, location: &str, id: &str) -> Url {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .expect("base URL has a path")
            .push(location)
            .push(id);
        url
    }

    /// Retrieves one candidate location, distinguishing absence from failure.
    fn try_location(&self, location: &str, id: &str) -> Result<Option<Vec<String>>, Error> {
        let url = self.record_url(location, id);
        debug!(%url, "fetching CVE record");
        let response = self.client.get(url.clone()).send()?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let text = response.text()?;
                Ok(Some(text.lines().map(ToString::to_string).collect()))
            }
            status => Err(Error::Status {
                url: url.into(),
                status,
            }),
        }
    }
}

impl CveSource for UbuntuCveTracker {
    fn fetch(&self, id: &str) -> Result<Option<Vec<String>>, Error> {
        for location in LOCATIONS {
            if let Some(lines) = self.try_location(location, id)? {
                return Ok(Some(lines));
            }
        }
        debug!(cve = %id, "record absent in all tracker locations");
        Ok(None)
    }
}
