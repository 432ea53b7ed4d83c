//! # Portrait Gal
//!
//! Builds a single-page portrait gallery from folders of images. Each folder
//! becomes a section of the page; each image in it becomes a numbered
//! thumbnail that opens full-size in a PhotoSwipe lightbox and can be linked
//! to directly with a URL fragment such as `#p12`.
//!
//! # Architecture: Two Stages
//!
//! ```text
//! 1. Scan      section folders  →  Manifest             (filesystem → structured data)
//! 2. Generate  Manifest         →  index.html + css     (typed templates → files)
//! ```
//!
//! Both stages run in one process. The [`types::Manifest`] between them is
//! plain data and serializes to JSON (`portrait-gal scan`), so what the page
//! will contain can be inspected without rendering it.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Stage 1: filters, orders, pairs thumbnails, reads dimensions, numbers entries |
//! | [`generate`] | Stage 2: renders the page with Maud and the stylesheet, writes both |
//! | [`config`] | `config.toml` loading, validation, merging, and color CSS generation |
//! | [`types`] | Entries, sections, the manifest, and the build stamp |
//! | [`naming`] | Natural sort, thumbnail names, anchor-name parsing |
//! | [`imaging`] | Image dimension reading behind the [`imaging::ImageBackend`] trait |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Pre-made Thumbnails
//!
//! Thumbnails are produced by whatever tool scanned the drawings and live next
//! to the originals as `<stem><marker>.<ext>` (`book1_1t.png`). This crate only
//! reads their headers; a missing or unreadable thumbnail fails the build
//! rather than silently dropping a portrait.
//!
//! ## Two Counters
//!
//! Every entry has a global number (its position on the page, used in alt
//! text and by `data-pswp-open` links) and a per-prefix number that forms its
//! anchor name. Anchors stay stable for a section even when an earlier section
//! grows. Both counters live in one [`scan::Numbering`] value passed from
//! section to section.
//!
//! ## Maud Over Template Engines
//!
//! HTML is generated with [Maud](https://maud.lambda.xyz/). Templates are Rust
//! code, interpolation is escaped by default, and there is no template
//! directory to ship. Values injected into scripts go through `serde_json`.

pub mod config;
pub mod generate;
pub mod imaging;
pub mod naming;
pub mod output;
pub mod scan;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;

/// `dev@<hash>` for builds from a git checkout, the package version otherwise.
pub fn version_string() -> &'static str {
    let hash = env!("GIT_HASH");
    if hash.is_empty() {
        env!("CARGO_PKG_VERSION")
    } else {
        static VERSION: std::sync::OnceLock<String> = std::sync::OnceLock::new();
        VERSION.get_or_init(|| format!("dev@{hash}")).as_str()
    }
}
