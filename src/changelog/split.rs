use std::str::Lines;

use super::entry::{ChangelogEntry, EntryBuilder};

/// The canonical Debian changelog entry terminator prefix.
const TRAILER_PREFIX: &str = " -- ";

/// A line opens a new entry when it starts with the source package name and
/// carries a parenthesised version after that prefix.
fn is_header(line: &str, package: &str) -> bool {
    let Some(rest) = line.strip_prefix(package) else {
        return false;
    };
    rest.find('(').is_some_and(|open| rest[open..].contains(')'))
}

/// The version token is the text strictly between the first `(` and the first
/// `)` after it. Callers only pass lines that [`is_header`] accepted.
fn header_version(line: &str) -> String {
    let open = line.find('(').map_or(0, |i| i + 1);
    let close = line[open..].find(')').map_or(line.len(), |i| open + i);
    line[open..close].to_string()
}

/// Lazy iterator over the finalized entries of a changelog.
///
/// Produced by [`Entries::new`]; finite and not restartable. Yields each
/// entry once its trailer line has been seen and stops immediately after
/// `max_entries` entries (0 = no limit), leaving the remaining text unread.
/// A partially accumulated entry at the cut-off is discarded.
#[derive(Debug)]
pub struct Entries<'a> {
    lines: Lines<'a>,
    package: &'a str,
    max_entries: usize,
    emitted: usize,
    current: Option<EntryBuilder>,
}

impl<'a> Entries<'a> {
    /// Splits `text` into the changelog entries of `package`.
    #[must_use]
    pub fn new(text: &'a str, package: &'a str, max_entries: usize) -> Self {
        Self {
            lines: text.lines(),
            package,
            max_entries,
            emitted: 0,
            current: None,
        }
    }
}

impl Iterator for Entries<'_> {
    type Item = ChangelogEntry;

    fn next(&mut self) -> Option<Self::Item> {
        if self.max_entries > 0 && self.emitted >= self.max_entries {
            return None;
        }

        for line in self.lines.by_ref() {
            if is_header(line, self.package) {
                self.current = Some(EntryBuilder::new(header_version(line)));
            }

            // Every line of the entry is accumulated, header and trailer
            // included. Lines before the first header belong to no entry
            // (malformed input) and are skipped.
            let Some(builder) = self.current.as_mut() else {
                continue;
            };
            builder.push(line);

            if line.starts_with(TRAILER_PREFIX) {
                let entry = self
                    .current
                    .take()
                    .expect("builder checked above")
                    .finish();
                self.emitted += 1;
                return Some(entry);
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    const TWO_ENTRIES: &str = "\
hello (2.10-3build2) noble; urgency=medium

  * No-change rebuild for CVE-2024-0001.

 -- Ubuntu Dev <dev@ubuntu.com>  Mon, 01 Apr 2024 10:00:00 +0000

hello (2.10-3build1) mantic; urgency=medium

  * Initial build.

 -- Ubuntu Dev <dev@ubuntu.com>  Mon, 01 Jan 2024 10:00:00 +0000
";

    #[test]
    fn splits_entries_in_order() {
        let entries: Vec<_> = Entries::new(TWO_ENTRIES, "hello", 0).collect();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].version(), "2.10-3build2");
        assert_eq!(entries[1].version(), "2.10-3build1");
    }

    #[test]
    fn entry_keeps_every_line_including_header_and_trailer() {
        let entry = Entries::new(TWO_ENTRIES, "hello", 1).next().unwrap();

        assert_eq!(entry.raw_lines().len(), 5);
        assert_eq!(
            entry.raw_lines()[0],
            "hello (2.10-3build2) noble; urgency=medium"
        );
        assert!(entry.raw_lines().last().unwrap().starts_with(" -- "));
    }

    #[test]
    fn max_entries_truncates() {
        let entries: Vec<_> = Entries::new(TWO_ENTRIES, "hello", 1).collect();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].version(), "2.10-3build2");
    }

    #[test]
    fn max_entries_zero_means_unbounded() {
        assert_eq!(Entries::new(TWO_ENTRIES, "hello", 0).count(), 2);
    }

    #[test]
    fn stops_reading_once_limit_reached() {
        let mut entries = Entries::new(TWO_ENTRIES, "hello", 1);
        entries.next().unwrap();

        assert!(entries.next().is_none());
        // Nothing past the first trailer has been read; the separator line
        // and the whole second entry are still in the underlying iterator.
        let remaining: Vec<_> = entries.lines.collect();
        assert_eq!(remaining[0], "");
        assert_eq!(
            remaining[1],
            "hello (2.10-3build1) mantic; urgency=medium"
        );
    }

    #[test]
    fn partial_entry_at_end_of_text_is_discarded() {
        let text = "hello (1.0-1) focal; urgency=medium\n\n  * Unterminated.\n";

        assert_eq!(Entries::new(text, "hello", 0).count(), 0);
    }

    #[test]
    fn lines_before_first_header_are_ignored() {
        let text = format!("Format: 1.8\n\n{TWO_ENTRIES}");

        let entries: Vec<_> = Entries::new(&text, "hello", 0).collect();
        assert_eq!(entries.len(), 2);
        assert_eq!(
            entries[0].raw_lines()[0],
            "hello (2.10-3build2) noble; urgency=medium"
        );
    }

    #[test_case("hello (1.0) focal; urgency=low", true; "plain header")]
    #[test_case("hello(1.0) focal", true; "no space before version")]
    #[test_case("other (1.0) focal; urgency=low", false; "different package")]
    #[test_case("hello 1.0 focal", false; "no parentheses")]
    #[test_case("hello (1.0 focal", false; "unclosed version")]
    #[test_case("  hello (1.0) focal", false; "indented")]
    fn header_detection(line: &str, expected: bool) {
        assert_eq!(is_header(line, "hello"), expected);
    }

    #[test]
    fn version_is_text_between_first_parens() {
        assert_eq!(
            header_version("hello (1:2.10-3ubuntu1) noble; urgency=medium"),
            "1:2.10-3ubuntu1"
        );
    }
}
