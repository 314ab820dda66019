//! Changelogs for Ubuntu packages
//!
//! Resolves a package (source or binary) published in an Ubuntu series and
//! pocket to its Debian changelog, and optionally annotates each changelog
//! entry with the CVEs it references, using per-CVE records from the Ubuntu
//! CVE tracker.

pub mod changelog;
pub use changelog::{ChangelogEntry, Entries, RenderOptions, render};

pub mod cve;
pub use cve::{CveAnnotation, CveSource, UbuntuCveTracker, annotate};

pub mod launchpad;
pub use launchpad::{Launchpad, Pocket, Ppa};
