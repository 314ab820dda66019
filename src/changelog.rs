//! Debian changelog parsing and rendering.
//!
//! A changelog is a sequence of entries, each bounded by a header line
//! (`package (version) series; urgency=...`) and a trailer line
//! (`" -- Maintainer <email>  date"`). [`Entries`] splits raw changelog text
//! into [`ChangelogEntry`] values lazily; [`render`] turns an entry back into
//! output lines, inserting a CVE block when the entry carries annotations.

mod entry;
mod render;
mod split;

pub use entry::{ChangelogEntry, RenderOptions};
pub use render::render;
pub use split::Entries;
