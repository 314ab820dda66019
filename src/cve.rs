//! CVE discovery and Ubuntu CVE tracker records.
//!
//! [`annotate`] scans a changelog entry for `CVE-<year>-<number>` references
//! and attaches a [`CveAnnotation`] per unique id, fetching each record
//! through a [`CveSource`]. [`UbuntuCveTracker`] is the HTTP-backed source
//! reading the plain-text records published by the Ubuntu CVE tracker.

mod record;
mod scan;
mod tracker;

pub use scan::annotate;
pub use tracker::UbuntuCveTracker;

/// Metadata about one CVE referenced by a changelog entry.
///
/// Owned by the entry that discovered it; the same id appearing in a later
/// entry is fetched and parsed again, so annotations never leak state across
/// entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CveAnnotation {
    id: String,
    priority: Option<String>,
    description: String,
}

impl CveAnnotation {
    /// Builds an annotation from parsed record fields.
    #[must_use]
    pub const fn new(id: String, priority: Option<String>, description: String) -> Self {
        Self {
            id,
            priority,
            description,
        }
    }

    /// The canonical `CVE-<year>-<number>` identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The tracker's severity label, if the record carried one.
    #[must_use]
    pub fn priority(&self) -> Option<&str> {
        self.priority.as_deref()
    }

    /// The chosen description text; empty when descriptions were not
    /// requested or the record had none.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }
}

/// A store of per-CVE records, keyed by CVE id.
///
/// `Ok(None)` means the record is absent everywhere the source looked; the
/// caller proceeds with an annotation lacking detail. `Err` signals a
/// transport failure, which aborts the whole run.
pub trait CveSource {
    /// Fetches the record for `id` as an ordered sequence of lines.
    ///
    /// # Errors
    ///
    /// Returns an error for any failure other than the record being absent.
    fn fetch(&self, id: &str) -> Result<Option<Vec<String>>, Error>;
}

/// Failures while retrieving a CVE record.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The HTTP request could not be performed.
    #[error("failed to fetch CVE record")]
    Http(#[from] reqwest::Error),

    /// The server answered with an unexpected status.
    #[error("unexpected status {status} fetching {url}")]
    Status {
        /// The address that was queried.
        url: String,
        /// The response status code.
        status: reqwest::StatusCode,
    },
}
