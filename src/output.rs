//! CLI output formatting for the build commands.
//!
//! # Information-First Display
//!
//! Every section leads with its heading and entry count, then lists its
//! entries by global index and anchor name, with the source path and sizes
//! as trailing context. The same listing backs `build` and `check`, so both
//! read as an inventory of the page.
//!
//! # Output Format
//!
//! ## Build
//!
//! ```text
//! Sketchbook portraits (2 portraits) → #books_gallery
//!     001 p1  books/book1_1.png  1200x1600, thumb 150x200
//!     002 p2  books/book1_2.png  1200x1600, thumb 150x200
//! Miscellaneous portraits (1 portrait) → #misc_gallery
//!     003 m1  misc/1.png  900x1200, thumb 150x200
//!
//! Generated index.html, css/styles.css (3 portraits)
//! ```
//!
//! ## Check
//!
//! ```text
//! <listing as above>
//!
//! Warning: ./js/photoswipe.esm.min.js not found
//! Content is valid: 3 portraits in 2 sections
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::generate::WrittenSite;
use crate::types::{GalleryEntry, Manifest, Section};
use std::path::Path;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: u32) -> String {
    format!("{:0>3}", pos)
}

/// `1 portrait`, `2 portraits`.
fn portrait_count(n: usize) -> String {
    if n == 1 {
        "1 portrait".to_string()
    } else {
        format!("{n} portraits")
    }
}

/// Section header: heading, entry count, and the container it renders into.
///
/// ```text
/// Sketchbook portraits (2 portraits) → #books_gallery
/// ```
fn section_header(section: &Section) -> String {
    format!(
        "{} ({}) \u{2192} #{}",
        section.header,
        portrait_count(section.entries.len()),
        section.dom_id
    )
}

/// Entry line: global index and anchor first, then where it came from.
fn entry_line(entry: &GalleryEntry) -> String {
    format!(
        "    {} {}  {}  {}x{}, thumb {}x{}",
        format_index(entry.sequence_number),
        entry.name_tag,
        entry.full_image_path,
        entry.full_width,
        entry.full_height,
        entry.thumb_width,
        entry.thumb_height
    )
}

/// Display a written file relative to the source root when possible.
fn display_path(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}

// ============================================================================
// Manifest listing
// ============================================================================

/// List every section and entry in page order.
pub fn format_manifest(manifest: &Manifest) -> Vec<String> {
    let mut lines = Vec::new();
    for section in &manifest.sections {
        lines.push(section_header(section));
        for entry in &section.entries {
            lines.push(entry_line(entry));
        }
    }
    lines
}

// ============================================================================
// Build
// ============================================================================

/// Format `build` output: the listing plus what was written.
pub fn format_build_output(manifest: &Manifest, site: &WrittenSite, root: &Path) -> Vec<String> {
    let mut lines = format_manifest(manifest);
    lines.push(String::new());
    lines.push(format!(
        "Generated {}, {} ({})",
        display_path(&site.html, root),
        display_path(&site.css, root),
        portrait_count(manifest.total())
    ));
    lines
}

/// Print build output to stdout.
pub fn print_build_output(manifest: &Manifest, site: &WrittenSite, root: &Path) {
    for line in format_build_output(manifest, site, root) {
        println!("{}", line);
    }
}

// ============================================================================
// Check
// ============================================================================

/// Format `check` output: the listing, warnings for includes the page would
/// reference but that don't exist, and a summary.
pub fn format_check_output(manifest: &Manifest, missing_includes: &[&str]) -> Vec<String> {
    let mut lines = format_manifest(manifest);
    lines.push(String::new());
    for include in missing_includes {
        lines.push(format!("Warning: {include} not found"));
    }
    let sections = manifest.sections.len();
    lines.push(format!(
        "Content is valid: {} in {} section{}",
        portrait_count(manifest.total()),
        sections,
        if sections == 1 { "" } else { "s" }
    ));
    lines
}

/// Print check output to stdout.
pub fn print_check_output(manifest: &Manifest, missing_includes: &[&str]) {
    for line in format_check_output(manifest, missing_includes) {
        println!("{}", line);
    }
}
