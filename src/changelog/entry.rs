use crate::cve::CveAnnotation;

/// One release's changelog block.
///
/// Holds every line of the entry in source order, the version token from the
/// header line, and the CVEs discovered in the entry (empty until
/// [`annotate`](crate::cve::annotate) has run).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangelogEntry {
    version: String,
    raw_lines: Vec<String>,
    cves: Vec<CveAnnotation>,
}

impl ChangelogEntry {
    /// The version token extracted from the header line.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// All lines of the entry, including header and trailer.
    #[must_use]
    pub fn raw_lines(&self) -> &[String] {
        &self.raw_lines
    }

    /// CVEs discovered in this entry, in encounter order, unique by id.
    #[must_use]
    pub fn cves(&self) -> &[CveAnnotation] {
        &self.cves
    }

    /// Records a discovered CVE.
    ///
    /// Callers are responsible for deduplication; the scanner checks ids
    /// against [`Self::cves`] before fetching.
    pub fn push_cve(&mut self, cve: CveAnnotation) {
        self.cves.push(cve);
    }
}

/// Accumulates the lines of the entry currently being parsed.
///
/// A builder is created when a header line is seen and consumed by value when
/// the trailer line arrives, so no accumulator state survives across entries.
#[derive(Debug)]
pub(crate) struct EntryBuilder {
    version: String,
    lines: Vec<String>,
}

impl EntryBuilder {
    pub(crate) const fn new(version: String) -> Self {
        Self {
            version,
            lines: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, line: &str) {
        self.lines.push(line.to_string());
    }

    pub(crate) fn finish(self) -> ChangelogEntry {
        ChangelogEntry {
            version: self.version,
            raw_lines: self.lines,
            cves: Vec::new(),
        }
    }
}

/// Rendering configuration, resolved once from the invocation flags.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    /// Stop after this many finalized entries; 0 means unbounded.
    pub max_entries: usize,

    /// Detect CVE references and insert an annotation block per entry.
    pub highlight_cves: bool,

    /// Print only the entry header and the CVE block, dropping body lines.
    pub cves_only: bool,

    /// Fetch and render CVE descriptions alongside priorities.
    pub show_cve_description: bool,
}

impl RenderOptions {
    /// Whether entries should be scanned for CVE references at all.
    #[must_use]
    pub const fn annotate(&self) -> bool {
        self.highlight_cves || self.cves_only
    }
}
