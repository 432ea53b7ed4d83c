//! Shared types passed from the builder to the page generator.
//!
//! These are also what `portrait-gal scan` prints as JSON, so field names
//! are part of the debugging surface.

use crate::naming::parse_name_tag;
use serde::Serialize;

/// One image on the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GalleryEntry {
    /// Position across the whole page, 1-based, in build order.
    pub sequence_number: u32,
    /// Position within the entry's name prefix, 1-based.
    pub local_index: u32,
    /// `prefix + local_index`, e.g. `p12`. Unique on the page.
    pub name_tag: String,
    /// Page-relative URL of the full-size image (`books/book1_1.png`).
    pub full_image_path: String,
    /// Page-relative URL of the thumbnail (`books/book1_1t.png`).
    pub thumbnail_path: String,
    pub full_width: u32,
    pub full_height: u32,
    pub thumb_width: u32,
    pub thumb_height: u32,
    pub alt_text: String,
}

/// A built gallery section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    pub header: String,
    pub folder: String,
    pub dom_id: String,
    pub name_prefix: String,
    pub entries: Vec<GalleryEntry>,
}

/// Everything the page generator needs from the builder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Manifest {
    /// Sections in build (and page) order.
    pub sections: Vec<Section>,
}

impl Manifest {
    /// Total number of entries on the page.
    pub fn total(&self) -> usize {
        self.sections.iter().map(|s| s.entries.len()).sum()
    }

    /// All entries in page order.
    pub fn entries(&self) -> impl Iterator<Item = &GalleryEntry> {
        self.sections.iter().flat_map(|s| s.entries.iter())
    }

    /// Distinct name prefixes in first-use order.
    pub fn prefixes(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for section in &self.sections {
            if !seen.contains(&section.name_prefix.as_str()) {
                seen.push(&section.name_prefix);
            }
        }
        seen
    }

    /// Resolve a URL fragment (`#p12`) to the entry's 0-based position in
    /// the combined gallery, i.e. the index the lightbox opens.
    ///
    /// Returns `None` for fragments that are not name tags or that name an
    /// entry not on the page.
    pub fn position_of(&self, fragment: &str) -> Option<usize> {
        let tag = parse_name_tag(fragment, &self.prefixes())?.to_string();
        self.entries().position(|e| e.name_tag == tag)
    }
}

/// Per-run values that are allowed to differ between otherwise identical builds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildStamp {
    /// Unix seconds; appended to the stylesheet URL so browsers refetch it.
    pub epoch: i64,
    /// Human-readable local time, printed in the page's trailing comment.
    pub formatted: String,
}

impl BuildStamp {
    /// Stamp for the current local time.
    pub fn now() -> Self {
        let now = chrono::Local::now();
        Self {
            epoch: now.timestamp(),
            formatted: now.format("%Y-%m-%d %H:%M:%S %Z").to_string(),
        }
    }

    /// A fixed stamp, for reproducible renders.
    pub fn fixed(epoch: i64, formatted: &str) -> Self {
        Self {
            epoch,
            formatted: formatted.to_string(),
        }
    }
}
