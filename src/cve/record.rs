/// Marker opening the Ubuntu-specific description section of a record.
const UBUNTU_DESCRIPTION: &str = "Ubuntu-Description:";

/// Marker opening the upstream description section of a record.
const DESCRIPTION: &str = "Description:";

/// Marker carrying the severity label.
const PRIORITY: &str = "Priority:";

/// The fields extracted from one tracker record.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct CveRecord {
    pub(crate) priority: Option<String>,
    pub(crate) description: String,
}

impl CveRecord {
    /// Parses a record in a single forward scan.
    ///
    /// A `Priority:` line anywhere in the record sets the priority, first
    /// occurrence winning. Description text is collected from the lines
    /// following a `Description:` or `Ubuntu-Description:` marker, up to the
    /// first line opening the other section or the end of the record; the
    /// Ubuntu-specific text is preferred when both are non-empty. Collection
    /// is skipped entirely unless `with_description` is set.
    pub(crate) fn parse<S: AsRef<str>>(lines: &[S], with_description: bool) -> Self {
        let mut priority = None;
        let mut ubuntu = Vec::new();
        let mut generic = Vec::new();

        for (i, line) in lines.iter().enumerate() {
            let line = line.as_ref();
            if let Some(value) = line.strip_prefix(PRIORITY) {
                if priority.is_none() {
                    priority = Some(value.trim().to_string());
                }
            }
            if !with_description {
                continue;
            }
            if line.starts_with(UBUNTU_DESCRIPTION) {
                collect_section(&lines[i + 1..], DESCRIPTION, &mut ubuntu);
            } else if line.starts_with(DESCRIPTION) {
                collect_section(&lines[i + 1..], UBUNTU_DESCRIPTION, &mut generic);
            }
        }

        let description = join_nonempty(if ubuntu.iter().any(|l| !l.is_empty()) {
            &ubuntu
        } else {
            &generic
        });

        Self {
            priority,
            description,
        }
    }
}

/// Collects section lines until the delimiting marker or end of record.
fn collect_section<S: AsRef<str>>(rest: &[S], delimiter: &str, out: &mut Vec<String>) {
    for line in rest {
        let line = line.as_ref();
        if line.starts_with(delimiter) {
            break;
        }
        out.push(line.trim().to_string());
    }
}

fn join_nonempty(lines: &[String]) -> String {
    lines
        .iter()
        .filter(|line| !line.is_empty())
        .cloned()
        .collect::<Vec<_>>()
        .join(" ")
}
