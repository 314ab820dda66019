use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::record::CveRecord;
use super::{CveAnnotation, CveSource, Error};
use crate::changelog::ChangelogEntry;

/// Matches `CVE-<digits>-<digits>`; the literal `CVE` prefix is
/// case-sensitive, so lowercase references are not picked up.
static CVE_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"CVE-\d+-\d+").expect("pattern is valid"));

/// Scans an entry for CVE references and attaches one annotation per unique
/// id, in encounter order.
///
/// Each new id is fetched from `source` exactly once per entry; ids already
/// recorded on the entry are skipped without a fetch. An absent record still
/// yields an annotation, with no priority and an empty description.
///
/// # Errors
///
/// Propagates transport failures from the source. Absent records are not
/// errors.
pub fn annotate<S: CveSource>(
    entry: &mut ChangelogEntry,
    source: &S,
    with_description: bool,
) -> Result<(), Error> {
    // Collect ids first; the entry cannot be mutated while its lines are
    // borrowed.
    let mut ids: Vec<String> = Vec::new();
    for line in entry.raw_lines() {
        if !line.contains("CVE") {
            continue;
        }
        for found in CVE_ID.find_iter(line) {
            let id = found.as_str();
            if !ids.iter().any(|known| known == id) {
                ids.push(id.to_string());
            }
        }
    }

    for id in ids {
        debug!(cve = %id, "looking up CVE record");
        let annotation = match source.fetch(&id)? {
            Some(lines) => {
                let CveRecord {
                    priority,
                    description,
                } = CveRecord::parse(&lines, with_description);
                CveAnnotation::new(id, priority, description)
            }
            None => CveAnnotation::new(id, None, String::new()),
        };
        entry.push_cve(annotation);
    }

    Ok(())
}
