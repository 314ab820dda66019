use super::entry::{ChangelogEntry, RenderOptions};

/// Renders a finalized entry to output lines.
///
/// Entries without discovered CVEs, or rendered with annotation disabled,
/// pass through unchanged. Otherwise a CVE block is inserted immediately
/// after the header line: one block header naming the package and version,
/// then one line per CVE in discovery order. Missing priority or description
/// fields render as empty strings.
///
/// With `cves_only`, body lines are dropped: the output is the entry header,
/// the CVE block, the last two lines of the original entry (the blank
/// context line and the trailer), and one blank separator line. This tail
/// slice mirrors the shape every well-formed entry ends with; consumers rely
/// on it, so it is reproduced as-is rather than re-derived.
#[must_use]
pub fn render(entry: &ChangelogEntry, package: &str, options: &RenderOptions) -> Vec<String> {
    if entry.cves().is_empty() || !options.annotate() {
        return entry.raw_lines().to_vec();
    }

    let mut block = Vec::with_capacity(entry.cves().len() + 1);
    block.push(format!(
        "\n  CVEs addressed/mitigated in {package} version {}:",
        entry.version()
    ));
    for cve in entry.cves() {
        let mut line = format!(
            "    {} ({} priority)",
            cve.id(),
            cve.priority().unwrap_or_default()
        );
        if options.show_cve_description && !cve.description().is_empty() {
            line.push_str(": ");
            line.push_str(cve.description());
        }
        block.push(line);
    }

    let raw = entry.raw_lines();
    let mut out = vec![raw[0].clone()];
    out.extend(block);
    if options.cves_only {
        out.extend(raw[raw.len().saturating_sub(2)..].iter().cloned());
        out.push(String::new());
    } else {
        out.extend(raw[1..].iter().cloned());
    }
    out
}
