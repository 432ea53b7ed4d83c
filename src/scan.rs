//! Gallery building.
//!
//! Stage 1 of the build. Reads every configured section folder and produces
//! the [`Manifest`] the page generator renders.
//!
//! ## Directory Structure
//!
//! ```text
//! site/                       # Source root (and output root)
//! ├── config.toml             # Optional overrides
//! ├── intro.md                # Optional intro text
//! ├── books/                  # Section "Sketchbook portraits", prefix p
//! │   ├── book1_1.png         # Full-size image
//! │   ├── book1_1t.png        # Its thumbnail (marker "t")
//! │   ├── book1_2.png
//! │   ├── book1_2t.png
//! │   └── book1_13.png        # On the ignore list: skipped, not counted
//! └── misc/                   # Section "Miscellaneous portraits", prefix m
//!     ├── 1.png
//!     └── 1t.png
//! ```
//!
//! ## Selection and Order
//!
//! A file becomes an entry when it has the configured extension, is not on
//! the ignore list, and is not itself a thumbnail. Entries are ordered by
//! [`natural_cmp`] on the filename.
//!
//! ## Numbering
//!
//! Two counters run side by side, carried in a [`Numbering`] value that each
//! section build takes and hands back:
//!
//! - the **global** number spans every section in build order, so the first
//!   section's images always get the lowest numbers;
//! - the **local** number counts per name prefix, starting at 1 the first
//!   time a prefix is used and continuing if a later section reuses it.
//!
//! The anchor name of an entry is `prefix + local` (`p12`).
//!
//! ## Validation
//!
//! Every problem is fatal: a missing section folder, a missing thumbnail, or
//! an image (full or thumbnail) whose dimensions cannot be read.

use crate::config::{ConfigError, ImagesConfig, SectionConfig, SiteConfig};
use crate::imaging::{BackendError, ImageBackend};
use crate::naming::{is_thumbnail_name, natural_cmp, split_extension, thumbnail_name};
use crate::types::{GalleryEntry, Manifest, Section};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Cannot list directory: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("Section folder not found: {0}")]
    MissingFolder(PathBuf),
    #[error("Thumbnail {thumbnail} missing for {image}")]
    MissingThumbnail { image: PathBuf, thumbnail: PathBuf },
    #[error("Image error: {0}")]
    Imaging(#[from] BackendError),
}

/// Running counters threaded through the section builds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Numbering {
    global: u32,
    per_prefix: BTreeMap<String, u32>,
}

impl Numbering {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries numbered so far, across all prefixes.
    pub fn global(&self) -> u32 {
        self.global
    }

    /// Entries numbered so far under `prefix`.
    pub fn local(&self, prefix: &str) -> u32 {
        self.per_prefix.get(prefix).copied().unwrap_or(0)
    }

    /// Count one more entry under `prefix`; returns its `(global, local)` numbers.
    pub fn advance(&mut self, prefix: &str) -> (u32, u32) {
        self.global += 1;
        let local = self.per_prefix.entry(prefix.to_string()).or_insert(0);
        *local += 1;
        (self.global, *local)
    }
}

/// Build every configured section, in order.
pub fn scan(
    root: &Path,
    config: &SiteConfig,
    backend: &impl ImageBackend,
) -> Result<Manifest, ScanError> {
    config.validate()?;

    let mut numbering = Numbering::new();
    let mut sections = Vec::with_capacity(config.sections.len());

    for section_config in &config.sections {
        let (section, next) =
            build_section(root, section_config, &config.images, backend, numbering)?;
        numbering = next;
        sections.push(section);
    }

    Ok(Manifest { sections })
}

/// Build one section, continuing from `numbering` and returning the advanced counters.
pub fn build_section(
    root: &Path,
    section: &SectionConfig,
    images: &ImagesConfig,
    backend: &impl ImageBackend,
    mut numbering: Numbering,
) -> Result<(Section, Numbering), ScanError> {
    let folder = root.join(&section.folder);
    if !folder.is_dir() {
        return Err(ScanError::MissingFolder(folder));
    }

    let filenames = list_images(&folder, images)?;
    let mut entries = Vec::with_capacity(filenames.len());

    for filename in &filenames {
        let thumb_name = thumbnail_name(filename, &images.thumbnail_marker);
        let image_path = folder.join(filename);
        let thumb_path = folder.join(&thumb_name);

        if !thumb_path.is_file() {
            return Err(ScanError::MissingThumbnail {
                image: image_path,
                thumbnail: thumb_path,
            });
        }

        let full = backend.identify(&image_path)?;
        let thumb = backend.identify(&thumb_path)?;
        let (sequence_number, local_index) = numbering.advance(&section.name_prefix);

        entries.push(GalleryEntry {
            sequence_number,
            local_index,
            name_tag: format!("{}{}", section.name_prefix, local_index),
            full_image_path: page_path(&section.folder, filename),
            thumbnail_path: page_path(&section.folder, &thumb_name),
            full_width: full.width,
            full_height: full.height,
            thumb_width: thumb.width,
            thumb_height: thumb.height,
            alt_text: images
                .alt_text
                .replace("{n}", &sequence_number.to_string()),
        });
    }

    let built = Section {
        header: section.header.clone(),
        folder: section.folder.clone(),
        dom_id: section.dom_id.clone(),
        name_prefix: section.name_prefix.clone(),
        entries,
    };
    Ok((built, numbering))
}

/// Eligible image filenames in `folder`, in natural order.
pub fn list_images(folder: &Path, images: &ImagesConfig) -> Result<Vec<String>, ScanError> {
    let mut names = Vec::new();
    for entry in WalkDir::new(folder)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
    {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        // Non-UTF-8 names can't match the configured extension anyway
        let Some(name) = entry.file_name().to_str() else {
            continue;
        };
        if is_gallery_image(name, images) {
            names.push(name.to_string());
        }
    }
    names.sort_by(|a, b| natural_cmp(a, b));
    Ok(names)
}

fn is_gallery_image(filename: &str, images: &ImagesConfig) -> bool {
    let (_, ext) = split_extension(filename);
    ext == Some(images.extension.as_str())
        && !images.ignore.iter().any(|ignored| ignored == filename)
        && !is_thumbnail_name(filename, &images.thumbnail_marker)
}

/// URL of a file relative to the page, always `/`-separated.
fn page_path(folder: &str, filename: &str) -> String {
    format!("{}/{}", folder.trim_end_matches('/'), filename)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::RustBackend;
    use crate::imaging::backend::tests::MockBackend;
    use crate::test_helpers::*;
    use std::fs;
    use tempfile::TempDir;

    fn images() -> ImagesConfig {
        ImagesConfig {
            ignore: vec![],
            ..ImagesConfig::default()
        }
    }

    // =========================================================================
    // Numbering
    // =========================================================================

    #[test]
    fn numbering_counts_globally_and_per_prefix() {
        let mut n = Numbering::new();
        assert_eq!(n.advance("p"), (1, 1));
        assert_eq!(n.advance("p"), (2, 2));
        assert_eq!(n.advance("m"), (3, 1));
        assert_eq!(n.advance("p"), (4, 3));
        assert_eq!(n.global(), 4);
        assert_eq!(n.local("p"), 3);
        assert_eq!(n.local("m"), 1);
        assert_eq!(n.local("x"), 0);
    }

    // =========================================================================
    // Selection and ordering
    // =========================================================================

    #[test]
    fn natural_order_not_lexicographic() {
        let tmp = TempDir::new().unwrap();
        touch_with_thumbs(tmp.path(), &["a_2.png", "a_10.png", "a_1.png"]);

        let names = list_images(tmp.path(), &images()).unwrap();
        assert_eq!(names, vec!["a_1.png", "a_2.png", "a_10.png"]);
    }

    #[test]
    fn only_matching_extension_non_thumbnail_files() {
        let tmp = TempDir::new().unwrap();
        touch(
            tmp.path(),
            &[
                "book1_1.png",
                "book1_1t.png",
                "book1_2.png",
                "book1_2t.png",
                "notes.txt",
                "scan.jpg",
                "upper.PNG",
            ],
        );
        fs::create_dir(tmp.path().join("dir.png")).unwrap();

        let names = list_images(tmp.path(), &images()).unwrap();
        assert_eq!(names, vec!["book1_1.png", "book1_2.png"]);
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_images_are_entries() {
        use std::os::unix::fs::symlink;

        let tmp = TempDir::new().unwrap();
        let store = tmp.path().join("store");
        write_png(&store.join("x.png"), 40, 60);
        write_png(&store.join("xt.png"), 4, 6);
        let folder = tmp.path().join("a");
        fs::create_dir(&folder).unwrap();
        symlink(store.join("x.png"), folder.join("1.png")).unwrap();
        symlink(store.join("xt.png"), folder.join("1t.png")).unwrap();
        let config = config_with_sections(vec![SectionConfig::new("A", "a", "a_g", "p")]);

        let manifest = scan(tmp.path(), &config, &RustBackend::new()).unwrap();
        assert_eq!(manifest.total(), 1);
        let entry = &find_section(&manifest, "a_g").entries[0];
        assert_eq!(entry.full_image_path, "a/1.png");
        assert_eq!((entry.full_width, entry.full_height), (40, 60));
        assert_eq!((entry.thumb_width, entry.thumb_height), (4, 6));
    }

    #[test]
    fn ignored_names_are_dropped() {
        let tmp = TempDir::new().unwrap();
        touch_with_thumbs(tmp.path(), &["a_1.png", "a_2.png", "a_3.png"]);
        let config = ImagesConfig {
            ignore: vec!["a_2.png".to_string()],
            ..ImagesConfig::default()
        };

        let names = list_images(tmp.path(), &config).unwrap();
        assert_eq!(names, vec!["a_1.png", "a_3.png"]);
    }

    #[test]
    fn custom_extension_and_marker() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), &["x1.jpg", "x1_thumb.jpg", "x2.png"]);
        let config = ImagesConfig {
            extension: "jpg".to_string(),
            thumbnail_marker: "_thumb".to_string(),
            ignore: vec![],
            ..ImagesConfig::default()
        };

        let names = list_images(tmp.path(), &config).unwrap();
        assert_eq!(names, vec!["x1.jpg"]);
    }

    // =========================================================================
    // Section building
    // =========================================================================

    #[test]
    fn entry_count_matches_eligible_files() {
        let tmp = TempDir::new().unwrap();
        let folder = tmp.path().join("books");
        touch_with_thumbs(&folder, &["b_1.png", "b_2.png", "b_3.png", "b_4.png"]);
        touch(&folder, &["readme.txt"]);

        let section = SectionConfig::new("Books", "books", "books_gallery", "p");
        let (built, numbering) = build_section(
            tmp.path(),
            &section,
            &images(),
            &MockBackend::new(),
            Numbering::new(),
        )
        .unwrap();

        assert_eq!(built.entries.len(), 4);
        assert_eq!(numbering.global(), 4);
    }

    #[test]
    fn two_sections_number_globally_then_locally() {
        let tmp = TempDir::new().unwrap();
        touch_with_thumbs(&tmp.path().join("a"), &["1.png", "2.png", "3.png"]);
        touch_with_thumbs(&tmp.path().join("b"), &["1.png", "2.png"]);
        let config = config_with_sections(vec![
            SectionConfig::new("A", "a", "a_gallery", "p"),
            SectionConfig::new("B", "b", "b_gallery", "m"),
        ]);

        let manifest = scan(tmp.path(), &config, &MockBackend::new()).unwrap();

        let a = find_section(&manifest, "a_gallery");
        let b = find_section(&manifest, "b_gallery");
        assert_eq!(sequence_numbers(a), vec![1, 2, 3]);
        assert_eq!(sequence_numbers(b), vec![4, 5]);
        assert_eq!(local_indices(a), vec![1, 2, 3]);
        assert_eq!(local_indices(b), vec![1, 2]);
        assert_eq!(name_tags(a), vec!["p1", "p2", "p3"]);
        assert_eq!(name_tags(b), vec!["m1", "m2"]);
    }

    #[test]
    fn build_order_follows_config_not_alphabet() {
        let tmp = TempDir::new().unwrap();
        touch_with_thumbs(&tmp.path().join("zeta"), &["1.png"]);
        touch_with_thumbs(&tmp.path().join("alpha"), &["1.png"]);
        let config = config_with_sections(vec![
            SectionConfig::new("Z", "zeta", "z_gallery", "z"),
            SectionConfig::new("A", "alpha", "a_gallery", "a"),
        ]);

        let manifest = scan(tmp.path(), &config, &MockBackend::new()).unwrap();
        assert_eq!(sequence_numbers(find_section(&manifest, "z_gallery")), vec![1]);
        assert_eq!(sequence_numbers(find_section(&manifest, "a_gallery")), vec![2]);
    }

    #[test]
    fn shared_prefix_keeps_counting() {
        let tmp = TempDir::new().unwrap();
        touch_with_thumbs(&tmp.path().join("one"), &["1.png", "2.png"]);
        touch_with_thumbs(&tmp.path().join("mid"), &["1.png"]);
        touch_with_thumbs(&tmp.path().join("two"), &["1.png"]);
        let config = config_with_sections(vec![
            SectionConfig::new("One", "one", "one_gallery", "p"),
            SectionConfig::new("Mid", "mid", "mid_gallery", "m"),
            SectionConfig::new("Two", "two", "two_gallery", "p"),
        ]);

        let manifest = scan(tmp.path(), &config, &MockBackend::new()).unwrap();
        assert_eq!(name_tags(find_section(&manifest, "two_gallery")), vec!["p3"]);
        assert_eq!(
            sequence_numbers(find_section(&manifest, "two_gallery")),
            vec![4]
        );
    }

    #[test]
    fn ignored_file_not_counted() {
        let tmp = TempDir::new().unwrap();
        touch_with_thumbs(&tmp.path().join("a"), &["1.png", "2.png", "3.png"]);
        let mut config = config_with_sections(vec![SectionConfig::new("A", "a", "a_g", "p")]);
        config.images.ignore = vec!["2.png".to_string()];

        let manifest = scan(tmp.path(), &config, &MockBackend::new()).unwrap();
        let a = find_section(&manifest, "a_g");
        assert_eq!(sequence_numbers(a), vec![1, 2]);
        assert_eq!(name_tags(a), vec!["p1", "p2"]);
        assert!(a.entries.iter().all(|e| !e.full_image_path.ends_with("/2.png")));
    }

    #[test]
    fn ignored_book_scenario_yields_single_entry() {
        let tmp = TempDir::new().unwrap();
        touch(
            &tmp.path().join("books"),
            &[
                "book1_1.png",
                "book1_1t.png",
                "book1_13.png",
                "book1_13t.png",
                "book1_38.png",
            ],
        );
        let config =
            config_with_sections(vec![SectionConfig::new("Books", "books", "books_gallery", "p")]);

        let manifest = scan(tmp.path(), &config, &MockBackend::new()).unwrap();
        let books = find_section(&manifest, "books_gallery");
        assert_eq!(books.entries.len(), 1);
        assert_eq!(books.entries[0].full_image_path, "books/book1_1.png");
        assert_eq!(manifest.total(), 1);
    }

    #[test]
    fn entry_paths_and_alt_text() {
        let tmp = TempDir::new().unwrap();
        touch_with_thumbs(&tmp.path().join("misc"), &["7.png"]);
        let section = SectionConfig::new("Misc", "misc", "misc_gallery", "m");
        let mut numbering = Numbering::new();
        numbering.advance("p");
        numbering.advance("p");

        let (built, _) =
            build_section(tmp.path(), &section, &images(), &MockBackend::new(), numbering)
                .unwrap();

        let entry = &built.entries[0];
        assert_eq!(entry.full_image_path, "misc/7.png");
        assert_eq!(entry.thumbnail_path, "misc/7t.png");
        assert_eq!(entry.sequence_number, 3);
        assert_eq!(entry.name_tag, "m1");
        assert_eq!(entry.alt_text, "portrait #3, a portrait drawing of me");
    }

    #[test]
    fn dimensions_come_from_backend() {
        let tmp = TempDir::new().unwrap();
        let folder = tmp.path().join("a");
        touch_with_thumbs(&folder, &["1.png"]);
        let backend = MockBackend::new()
            .with_size(folder.join("1.png"), 2000, 3000)
            .with_size(folder.join("1t.png"), 200, 300);
        let section = SectionConfig::new("A", "a", "a_g", "p");

        let (built, _) =
            build_section(tmp.path(), &section, &images(), &backend, Numbering::new()).unwrap();

        let e = &built.entries[0];
        assert_eq!((e.full_width, e.full_height), (2000, 3000));
        assert_eq!((e.thumb_width, e.thumb_height), (200, 300));
        assert_eq!(backend.identified(), vec![folder.join("1.png"), folder.join("1t.png")]);
    }

    // =========================================================================
    // Errors
    // =========================================================================

    #[test]
    fn missing_thumbnail_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let folder = tmp.path().join("a");
        touch_with_thumbs(&folder, &["1.png"]);
        touch(&folder, &["2.png"]);
        let config = config_with_sections(vec![SectionConfig::new("A", "a", "a_g", "p")]);

        let result = scan(tmp.path(), &config, &MockBackend::new());
        match result {
            Err(ScanError::MissingThumbnail { image, thumbnail }) => {
                assert_eq!(image, folder.join("2.png"));
                assert_eq!(thumbnail, folder.join("2t.png"));
            }
            other => panic!("expected MissingThumbnail, got {other:?}"),
        }
    }

    #[test]
    fn missing_folder_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let config = config_with_sections(vec![SectionConfig::new("A", "nope", "a_g", "p")]);

        let result = scan(tmp.path(), &config, &MockBackend::new());
        assert!(matches!(result, Err(ScanError::MissingFolder(p)) if p.ends_with("nope")));
    }

    #[test]
    fn invalid_config_rejected_before_reading() {
        let tmp = TempDir::new().unwrap();
        touch_with_thumbs(&tmp.path().join("a"), &["1.png"]);
        let config = config_with_sections(vec![
            SectionConfig::new("A", "a", "same", "p"),
            SectionConfig::new("B", "a", "same", "m"),
        ]);
        let backend = MockBackend::new();

        let result = scan(tmp.path(), &config, &backend);
        assert!(matches!(result, Err(ScanError::Config(_))));
        assert!(backend.identified().is_empty());
    }

    #[test]
    fn corrupt_image_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let folder = tmp.path().join("a");
        touch_with_thumbs(&folder, &["1.png"]);
        let backend = MockBackend::new().with_broken(folder.join("1t.png"));
        let config = config_with_sections(vec![SectionConfig::new("A", "a", "a_g", "p")]);

        let result = scan(tmp.path(), &config, &backend);
        assert!(matches!(result, Err(ScanError::Imaging(_))));
    }

    #[test]
    fn corrupt_real_file_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let folder = tmp.path().join("a");
        write_png(&folder.join("1.png"), 20, 30);
        fs::write(folder.join("1t.png"), "garbage").unwrap();
        let config = config_with_sections(vec![SectionConfig::new("A", "a", "a_g", "p")]);

        let result = scan(tmp.path(), &config, &RustBackend::new());
        assert!(matches!(result, Err(ScanError::Imaging(_))));
    }

    // =========================================================================
    // Real images
    // =========================================================================

    #[test]
    fn declared_thumbnails_exist_with_matching_dimensions() {
        let tmp = setup_portfolio();
        let config = SiteConfig::default();

        let manifest = scan(tmp.path(), &config, &RustBackend::new()).unwrap();
        assert_eq!(manifest.total(), 5);

        for entry in manifest.entries() {
            let thumb = tmp.path().join(&entry.thumbnail_path);
            let full = tmp.path().join(&entry.full_image_path);
            assert_eq!(
                image::image_dimensions(&thumb).unwrap(),
                (entry.thumb_width, entry.thumb_height)
            );
            assert_eq!(
                image::image_dimensions(&full).unwrap(),
                (entry.full_width, entry.full_height)
            );
        }
    }

    #[test]
    fn default_ignore_list_applies_to_portfolio() {
        let tmp = setup_portfolio();
        let manifest = scan(tmp.path(), &SiteConfig::default(), &RustBackend::new()).unwrap();

        let books = find_section(&manifest, "books_gallery");
        let paths: Vec<&str> = books
            .entries
            .iter()
            .map(|e| e.full_image_path.as_str())
            .collect();
        assert_eq!(
            paths,
            vec!["books/book1_1.png", "books/book1_2.png", "books/book2_9.png", "books/book2_10.png"]
        );
    }

    #[test]
    fn scanning_twice_is_identical() {
        let tmp = setup_portfolio();
        let config = SiteConfig::default();
        let first = scan(tmp.path(), &config, &RustBackend::new()).unwrap();
        let second = scan(tmp.path(), &config, &RustBackend::new()).unwrap();
        assert_eq!(first, second);
    }
}
