//! Shared test utilities for the portrait-gal test suite.
//!
//! Builds source trees on disk (real PNGs or empty placeholder files) and
//! provides lookup helpers and bulk extractors over a built [`Manifest`].
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_portfolio();
//! let manifest = scan(tmp.path(), &SiteConfig::default(), &RustBackend::new()).unwrap();
//!
//! let books = find_section(&manifest, "books_gallery");
//! assert_eq!(name_tags(books), vec!["p1", "p2", "p3", "p4"]);
//! ```

use std::fs;
use std::path::Path;
use tempfile::TempDir;

use crate::config::{SectionConfig, SiteConfig};
use crate::types::{Manifest, Section};

// =========================================================================
// Fixture setup
// =========================================================================

/// Write a solid-colour PNG of the given size, creating parent directories.
pub fn write_png(path: &Path, width: u32, height: u32) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([180, 170, 160]));
    img.save(path).unwrap();
}

/// Create empty files named `names` in `dir`. Contents don't matter when the
/// test uses `MockBackend`.
pub fn touch(dir: &Path, names: &[&str]) {
    fs::create_dir_all(dir).unwrap();
    for name in names {
        fs::write(dir.join(name), b"").unwrap();
    }
}

/// Like [`touch`], also creating each file's `t` thumbnail.
pub fn touch_with_thumbs(dir: &Path, names: &[&str]) {
    touch(dir, names);
    for name in names {
        let thumb = crate::naming::thumbnail_name(name, "t");
        fs::write(dir.join(thumb), b"").unwrap();
    }
}

/// Write a full-size PNG and its thumbnail into `dir`.
pub fn add_portrait(dir: &Path, name: &str, full: (u32, u32), thumb: (u32, u32)) {
    write_png(&dir.join(name), full.0, full.1);
    write_png(
        &dir.join(crate::naming::thumbnail_name(name, "t")),
        thumb.0,
        thumb.1,
    );
}

/// A source tree matching the default configuration.
///
/// ```text
/// books/  book1_1, book1_2, book2_9, book2_10   (+ thumbnails)
///         book1_13 (+ thumbnail), book1_38       (ignored by default)
/// misc/   1                                      (+ thumbnail)
/// ```
///
/// Five entries in total: `p1`..`p4` then `m1`.
pub fn setup_portfolio() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let books = tmp.path().join("books");
    let misc = tmp.path().join("misc");

    add_portrait(&books, "book1_1.png", (60, 80), (15, 20));
    add_portrait(&books, "book1_2.png", (80, 60), (20, 15));
    add_portrait(&books, "book2_9.png", (50, 50), (10, 10));
    add_portrait(&books, "book2_10.png", (40, 90), (8, 18));
    add_portrait(&books, "book1_13.png", (30, 30), (6, 6));
    write_png(&books.join("book1_38.png"), 30, 30);
    add_portrait(&misc, "1.png", (70, 100), (14, 20));

    tmp
}

/// Default config with the given sections in place of the stock two.
pub fn config_with_sections(sections: Vec<SectionConfig>) -> SiteConfig {
    SiteConfig {
        sections,
        ..SiteConfig::default()
    }
}

// =========================================================================
// Manifest lookups, panicking with a clear message on miss
// =========================================================================

/// Find a section by DOM id. Panics if not found.
pub fn find_section<'a>(manifest: &'a Manifest, dom_id: &str) -> &'a Section {
    manifest
        .sections
        .iter()
        .find(|s| s.dom_id == dom_id)
        .unwrap_or_else(|| {
            let ids: Vec<&str> = manifest.sections.iter().map(|s| s.dom_id.as_str()).collect();
            panic!("section '{dom_id}' not found. Available: {ids:?}")
        })
}

// =========================================================================
// Bulk extractors
// =========================================================================

/// Global numbers of a section's entries, in order.
pub fn sequence_numbers(section: &Section) -> Vec<u32> {
    section.entries.iter().map(|e| e.sequence_number).collect()
}

/// Per-prefix numbers of a section's entries, in order.
pub fn local_indices(section: &Section) -> Vec<u32> {
    section.entries.iter().map(|e| e.local_index).collect()
}

/// Anchor names of a section's entries, in order.
pub fn name_tags(section: &Section) -> Vec<&str> {
    section.entries.iter().map(|e| e.name_tag.as_str()).collect()
}
