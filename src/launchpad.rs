//! Anonymous client for the Launchpad web API.
//!
//! Resolves a package published in an Ubuntu series and pocket to its
//! changelog URL, following the same lookup chain as `launchpadlib`:
//! `getSeries` on the distribution, then `getPublishedSources` (or
//! `getPublishedBinaries` for binary package names) on the archive, then the
//! publication's `changelogUrl` operation. Absent packages and changelogs
//! are reported as `None`, never as errors.

use std::fmt;
use std::str::FromStr;

use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::debug;
use url::Url;

/// The Launchpad API root used for all lookups.
const API_ROOT: &str = "https://api.launchpad.net/devel";

/// Base of the static changelog mirror on changelogs.ubuntu.com.
const CHANGELOGS_BASE: &str = "http://changelogs.ubuntu.com/changelogs/pool";

/// A named release channel within a distribution series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pocket {
    /// The original release archive.
    Release,
    /// Security updates.
    Security,
    /// Recommended post-release updates.
    Updates,
    /// Updates proposed for testing.
    Proposed,
    /// Backports of newer software.
    Backports,
}

impl Pocket {
    /// All pockets, in the order the CLI lists them.
    pub const ALL: [Self; 5] = [
        Self::Release,
        Self::Security,
        Self::Updates,
        Self::Proposed,
        Self::Backports,
    ];

    /// The pocket name as the Launchpad API spells it.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Release => "Release",
            Self::Security => "Security",
            Self::Updates => "Updates",
            Self::Proposed => "Proposed",
            Self::Backports => "Backports",
        }
    }
}

impl fmt::Display for Pocket {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Pocket {
    type Err = ParsePocketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|pocket| pocket.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParsePocketError(s.to_string()))
    }
}

/// Error returned when a string names no known pocket.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unknown pocket '{0}': expected Release, Security, Updates, Proposed or Backports")]
pub struct ParsePocketError(String);

/// A personal package archive, addressed as `OWNER/NAME`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ppa {
    owner: String,
    name: String,
}

impl Ppa {
    /// The Launchpad user or team owning the archive.
    #[must_use]
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// The archive name within the owner's namespace.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl FromStr for Ppa {
    type Err = ParsePpaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('/') {
            Some((owner, name)) if !owner.is_empty() && !name.is_empty() => Ok(Self {
                owner: owner.to_string(),
                name: name.to_string(),
            }),
            _ => Err(ParsePpaError(s.to_string())),
        }
    }
}

/// Error returned when a PPA reference is not of the form `OWNER/NAME`.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("invalid PPA reference '{0}': expected OWNER/NAME")]
pub struct ParsePpaError(String);

/// One published source package, as returned by `getPublishedSources`.
#[derive(Debug, Clone, Deserialize)]
pub struct SourcePublication {
    self_link: String,
    source_package_name: String,
    source_package_version: String,
    component_name: String,
}

impl SourcePublication {
    /// The source package name.
    #[must_use]
    pub fn source_package_name(&self) -> &str {
        &self.source_package_name
    }

    /// The published version, including any epoch.
    #[must_use]
    pub fn source_package_version(&self) -> &str {
        &self.source_package_version
    }

    /// The archive component (main, universe, ...) of the publication.
    #[must_use]
    pub fn component_name(&self) -> &str {
        &self.component_name
    }

    /// The changelog address on the changelogs.ubuntu.com mirror.
    ///
    /// The mirror follows the archive pool layout: the component, the pool
    /// prefix of the source name, then `<source>_<version>` with the epoch
    /// stripped, since epochs never appear in pool paths.
    #[must_use]
    pub fn pool_changelog_url(&self) -> String {
        let source = &self.source_package_name;
        let version = self
            .source_package_version
            .split_once(':')
            .map_or(self.source_package_version.as_str(), |(_, rest)| rest);
        format!(
            "{CHANGELOGS_BASE}/{}/{}/{source}/{source}_{version}/changelog",
            self.component_name,
            pool_prefix(source)
        )
    }
}

/// The pool directory prefix of a source package name: the first character,
/// or the first four characters for `lib*` packages.
fn pool_prefix(source: &str) -> &str {
    if source.starts_with("lib") && source.len() >= 4 {
        &source[..4]
    } else {
        &source[..1]
    }
}

#[derive(Debug, Deserialize)]
struct Collection<T> {
    entries: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct DistroSeries {
    self_link: String,
}

#[derive(Debug, Deserialize)]
struct BinaryPublication {
    source_package_name: String,
}

/// Anonymous Launchpad API client.
#[derive(Debug)]
pub struct Launchpad {
    client: Client,
}

impl Launchpad {
    /// Creates an anonymous client identifying itself as `consumer`.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn anonymous(consumer: &str) -> Result<Self, Error> {
        let client = Client::builder().user_agent(consumer.to_string()).build()?;
        Ok(Self { client })
    }

    /// Performs a GET, treating 404 and 400 as absence.
    ///
    /// Launchpad answers named operations with 400 when a lookup value names
    /// nothing (an unknown series, for instance), so both statuses map to
    /// `None`.
    fn get(&self, url: Url) -> Result<Option<String>, Error> {
        debug!(%url, "launchpad request");
        let response = self.client.get(url.clone()).send()?;
        match response.status() {
            status if status.is_success() => Ok(Some(response.text()?)),
            StatusCode::NOT_FOUND | StatusCode::BAD_REQUEST => Ok(None),
            status => Err(Error::Status {
                url: url.into(),
                status,
            }),
        }
    }

    fn operation(path: &str, op: &str, params: &[(&str, &str)]) -> Result<Url, Error> {
        let mut url = Url::parse(&format!("{API_ROOT}/{path}"))?;
        url.query_pairs_mut().append_pair("ws.op", op);
        for (key, value) in params {
            url.query_pairs_mut().append_pair(key, value);
        }
        Ok(url)
    }

    /// Resolves a series name or version ("focal" or "20.04") to the
    /// distro-series resource link.
    fn series_link(&self, series: &str) -> Result<Option<String>, Error> {
        let url = Self::operation("ubuntu", "getSeries", &[("name_or_version", series)])?;
        let Some(body) = self.get(url)? else {
            return Ok(None);
        };
        let series: DistroSeries = serde_json::from_str(&body)?;
        Ok(Some(series.self_link))
    }

    fn archive_path(ppa: Option<&Ppa>) -> String {
        ppa.map_or_else(
            || "ubuntu/+archive/primary".to_string(),
            |ppa| format!("~{}/+archive/ubuntu/{}", ppa.owner, ppa.name),
        )
    }

    /// Looks up the newest published source of `package` in the given
    /// series and pocket.
    ///
    /// # Errors
    ///
    /// Propagates transport failures and unexpected API responses; an
    /// unknown series, package or archive yields `Ok(None)`.
    pub fn source_publication(
        &self,
        series: &str,
        pocket: Pocket,
        package: &str,
        ppa: Option<&Ppa>,
    ) -> Result<Option<SourcePublication>, Error> {
        let Some(series_link) = self.series_link(series)? else {
            return Ok(None);
        };
        let url = Self::operation(
            &Self::archive_path(ppa),
            "getPublishedSources",
            &[
                ("exact_match", "true"),
                ("source_name", package),
                ("pocket", pocket.as_str()),
                ("distro_series", &series_link),
                ("status", "Published"),
                ("order_by_date", "true"),
            ],
        )?;
        let Some(body) = self.get(url)? else {
            return Ok(None);
        };
        let collection: Collection<SourcePublication> = serde_json::from_str(&body)?;
        Ok(collection.entries.into_iter().next())
    }

    /// Resolves a binary package name to the source package it was built
    /// from, for the given series, architecture and pocket.
    ///
    /// # Errors
    ///
    /// Propagates transport failures and unexpected API responses; an
    /// unknown binary yields `Ok(None)`.
    pub fn binary_source_name(
        &self,
        series: &str,
        architecture: &str,
        pocket: Pocket,
        package: &str,
        ppa: Option<&Ppa>,
    ) -> Result<Option<String>, Error> {
        let Some(series_link) = self.series_link(series)? else {
            return Ok(None);
        };
        let arch_series_link = format!("{series_link}/{architecture}");
        let url = Self::operation(
            &Self::archive_path(ppa),
            "getPublishedBinaries",
            &[
                ("exact_match", "true"),
                ("binary_name", package),
                ("pocket", pocket.as_str()),
                ("distro_arch_series", &arch_series_link),
                ("status", "Published"),
                ("order_by_date", "true"),
            ],
        )?;
        let Some(body) = self.get(url)? else {
            return Ok(None);
        };
        let collection: Collection<BinaryPublication> = serde_json::from_str(&body)?;
        Ok(collection
            .entries
            .into_iter()
            .next()
            .map(|publication| publication.source_package_name))
    }

    /// Asks Launchpad for the librarian URL of a publication's changelog.
    ///
    /// # Errors
    ///
    /// Propagates transport failures and unexpected API responses; a
    /// publication without a changelog yields `Ok(None)`.
    pub fn changelog_url(&self, publication: &SourcePublication) -> Result<Option<String>, Error> {
        let mut url = Url::parse(&publication.self_link)?;
        url.query_pairs_mut().append_pair("ws.op", "changelogUrl");
        let Some(body) = self.get(url)? else {
            return Ok(None);
        };
        // The operation answers with a JSON string, or null when the
        // publication carries no changelog.
        let changelog_url: Option<String> = serde_json::from_str(&body)?;
        Ok(changelog_url)
    }

    /// Downloads the raw changelog text from `address`.
    ///
    /// # Errors
    ///
    /// Propagates transport failures; a missing changelog file yields
    /// `Ok(None)`.
    pub fn fetch_changelog(&self, address: &str) -> Result<Option<String>, Error> {
        let url = Url::parse(address)?;
        self.get(url)
    }
}

/// Failures while talking to Launchpad or downloading a changelog.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The HTTP request could not be performed.
    #[error("launchpad request failed")]
    Http(#[from] reqwest::Error),

    /// The server answered with an unexpected status.
    #[error("unexpected status {status} from {url}")]
    Status {
        /// The address that was queried.
        url: String,
        /// The response status code.
        status: StatusCode,
    },

    /// The API answered with a payload of an unexpected shape.
    #[error("unexpected launchpad response")]
    Json(#[from] serde_json::Error),

    /// An address could not be parsed or constructed.
    #[error("invalid URL")]
    Url(#[from] url::ParseError),
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    fn publication(source: &str, version: &str, component: &str) -> SourcePublication {
        SourcePublication {
            self_link: format!("https://api.launchpad.net/devel/ubuntu/+archive/primary/+sourcepub/1/{source}"),
            source_package_name: source.to_string(),
            source_package_version: version.to_string(),
            component_name: component.to_string(),
        }
    }

    #[test_case("Release", Pocket::Release)]
    #[test_case("security", Pocket::Security)]
    #[test_case("UPDATES", Pocket::Updates)]
    fn pocket_parses_case_insensitively(input: &str, expected: Pocket) {
        assert_eq!(input.parse::<Pocket>().unwrap(), expected);
    }

    #[test]
    fn unknown_pocket_rejected() {
        assert!("Experimental".parse::<Pocket>().is_err());
    }

    #[test]
    fn ppa_parses_owner_and_name() {
        let ppa: Ppa = "canonical-kernel-team/ppa".parse().unwrap();

        assert_eq!(ppa.owner(), "canonical-kernel-team");
        assert_eq!(ppa.name(), "ppa");
    }

    #[test_case(""; "empty")]
    #[test_case("owner"; "missing name")]
    #[test_case("/name"; "missing owner")]
    #[test_case("owner/"; "empty name")]
    fn malformed_ppa_rejected(input: &str) {
        assert!(input.parse::<Ppa>().is_err());
    }

    #[test_case("hello", "h"; "plain package")]
    #[test_case("libssl3", "libs"; "lib package")]
    #[test_case("lib", "l"; "bare lib")]
    fn pool_prefixes(source: &str, expected: &str) {
        assert_eq!(pool_prefix(source), expected);
    }

    #[test]
    fn pool_url_strips_epoch() {
        let publication = publication("openssl", "3:3.0.2-0ubuntu1", "main");

        assert_eq!(
            publication.pool_changelog_url(),
            "http://changelogs.ubuntu.com/changelogs/pool/main/o/openssl/openssl_3.0.2-0ubuntu1/changelog"
        );
    }

    #[test]
    fn pool_url_for_lib_package() {
        let publication = publication("libxml2", "2.9.13+dfsg-1", "main");

        assert_eq!(
            publication.pool_changelog_url(),
            "http://changelogs.ubuntu.com/changelogs/pool/main/libx/libxml2/libxml2_2.9.13+dfsg-1/changelog"
        );
    }

    #[test]
    fn publication_deserializes_from_collection_payload() {
        let body = r#"{
            "start": 0,
            "total_size": 1,
            "entries": [{
                "self_link": "https://api.launchpad.net/devel/ubuntu/+archive/primary/+sourcepub/123/hello",
                "source_package_name": "hello",
                "source_package_version": "2.10-3build2",
                "component_name": "main",
                "status": "Published"
            }]
        }"#;

        let collection: Collection<SourcePublication> = serde_json::from_str(body).unwrap();
        let publication = collection.entries.into_iter().next().unwrap();

        assert_eq!(publication.source_package_name(), "hello");
        assert_eq!(publication.source_package_version(), "2.10-3build2");
        assert_eq!(publication.component_name(), "main");
    }

    #[test]
    fn changelog_url_payload_may_be_null() {
        assert_eq!(
            serde_json::from_str::<Option<String>>("null").unwrap(),
            None
        );
        assert_eq!(
            serde_json::from_str::<Option<String>>(
                "\"https://launchpad.net/changelog\""
            )
            .unwrap()
            .as_deref(),
            Some("https://launchpad.net/changelog")
        );
    }

    #[test]
    fn archive_paths() {
        assert_eq!(Launchpad::archive_path(None), "ubuntu/+archive/primary");

        let ppa: Ppa = "me/testing".parse().unwrap();
        assert_eq!(
            Launchpad::archive_path(Some(&ppa)),
            "~me/+archive/ubuntu/testing"
        );
    }

    #[test]
    fn operation_urls_carry_parameters() {
        let url =
            Launchpad::operation("ubuntu", "getSeries", &[("name_or_version", "focal")]).unwrap();

        assert_eq!(
            url.as_str(),
            "https://api.launchpad.net/devel/ubuntu?ws.op=getSeries&name_or_version=focal"
        );
    }
}
