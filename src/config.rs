//! Site configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. Stock defaults
//! reproduce the portraits page as it has always been built; a `config.toml`
//! in the source root overrides only the keys it names.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [page]
//! title = "Portraits"
//! home_link_text = "// gar.lol"
//! home_link_href = "/"
//! intro = "intro.md"          # Markdown intro, `{total}` → image count
//! # analytics_id = "G-XXXX"   # Google Analytics tag (omit to disable)
//! fonts = ["https://fonts.googleapis.com/..."]
//!
//! [output]
//! html = "index.html"
//! css = "css/styles.css"
//!
//! [images]
//! extension = "png"
//! thumbnail_marker = "t"      # book1_1.png → book1_1t.png
//! ignore = ["book1_13.png", "book1_38.png"]
//! alt_text = "portrait #{n}, a portrait drawing of me"
//!
//! [[sections]]
//! header = "Sketchbook portraits"
//! folder = "books"
//! dom_id = "books_gallery"
//! name_prefix = "p"
//!
//! [lightbox]
//! css = "./css/photoswipe.css"
//! module = "./js/photoswipe-lightbox.esm.min.js"
//! core = "./js/photoswipe.esm.min.js"
//! smartquotes = "./js/smartquotes.min.js"
//!
//! [colors.light]
//! background = "#fff"
//! # ...
//! ```
//!
//! `sections` is an array: a config that sets it replaces the whole list.
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Element ids the page layout uses itself.
const RESERVED_IDS: &[&str] = &["gallery", "menu", "home-link", "theme-toggle"];

/// Site configuration loaded from `config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Page chrome: title, menu link, intro, analytics, fonts.
    pub page: PageConfig,
    /// Where the HTML and CSS are written, relative to the source root.
    pub output: OutputConfig,
    /// Which files count as gallery images and how they are described.
    pub images: ImagesConfig,
    /// Gallery sections, built and numbered in this order.
    pub sections: Vec<SectionConfig>,
    /// Pre-built lightbox and smart-quotes includes.
    pub lightbox: LightboxConfig,
    /// Light and dark theme colors.
    pub colors: ColorConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            page: PageConfig::default(),
            output: OutputConfig::default(),
            images: ImagesConfig::default(),
            sections: default_sections(),
            lightbox: LightboxConfig::default(),
            colors: ColorConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Validate config values after merging.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sections.is_empty() {
            return Err(ConfigError::Validation(
                "at least one [[sections]] entry is required".into(),
            ));
        }
        if self.images.extension.is_empty() {
            return Err(ConfigError::Validation(
                "images.extension must not be empty".into(),
            ));
        }
        if self.images.thumbnail_marker.is_empty() {
            return Err(ConfigError::Validation(
                "images.thumbnail_marker must not be empty".into(),
            ));
        }

        // Image and stylesheet URLs are written relative to the root
        if self.output.html.is_empty() || self.output.html.contains(['/', '\\']) {
            return Err(ConfigError::Validation(format!(
                "output.html must be a file name in the source root, got '{}'",
                self.output.html
            )));
        }
        if self.output.css.is_empty() {
            return Err(ConfigError::Validation(
                "output.css must not be empty".into(),
            ));
        }

        let mut dom_ids = HashSet::new();
        for section in &self.sections {
            if section.folder.is_empty() {
                return Err(ConfigError::Validation(format!(
                    "section '{}' has an empty folder",
                    section.header
                )));
            }
            if section.name_prefix.is_empty()
                || !section.name_prefix.bytes().all(|b| b.is_ascii_alphabetic())
            {
                return Err(ConfigError::Validation(format!(
                    "section '{}': name_prefix must be one or more ASCII letters, got '{}'",
                    section.header, section.name_prefix
                )));
            }
            if section.dom_id.is_empty()
                || !section
                    .dom_id
                    .bytes()
                    .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
            {
                return Err(ConfigError::Validation(format!(
                    "section '{}': dom_id must match [A-Za-z0-9_-]+, got '{}'",
                    section.header, section.dom_id
                )));
            }
            if RESERVED_IDS.contains(&section.dom_id.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "section '{}': dom_id '{}' is already used by the page",
                    section.header, section.dom_id
                )));
            }
            // Section headings take the folder name as their id
            if let Some(other) = self.sections.iter().find(|s| s.folder == section.dom_id) {
                return Err(ConfigError::Validation(format!(
                    "section '{}': dom_id '{}' clashes with the heading id of section '{}'",
                    section.header, section.dom_id, other.header
                )));
            }
            if !dom_ids.insert(section.dom_id.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "duplicate section dom_id '{}'",
                    section.dom_id
                )));
            }
        }

        if let Some(id) = &self.page.analytics_id
            && (id.is_empty() || !id.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-'))
        {
            return Err(ConfigError::Validation(format!(
                "page.analytics_id must match [A-Za-z0-9-]+, got '{id}'"
            )));
        }
        Ok(())
    }
}

/// Page chrome settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PageConfig {
    /// `<title>` and `<h1>` text.
    pub title: String,
    /// Text of the home link in the menu bar.
    pub home_link_text: String,
    /// Target of the home link.
    pub home_link_href: String,
    /// Markdown intro file, relative to the source root. Missing file = no intro.
    pub intro: String,
    /// Google Analytics measurement id. No tag is emitted when absent.
    pub analytics_id: Option<String>,
    /// Font stylesheet URLs, linked in order.
    pub fonts: Vec<String>,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            title: "Portraits".to_string(),
            home_link_text: "// gar.lol".to_string(),
            home_link_href: "/".to_string(),
            intro: "intro.md".to_string(),
            analytics_id: None,
            fonts: vec![
                "https://fonts.googleapis.com/css?family=Droid+Sans".to_string(),
                "https://fonts.googleapis.com/css2?family=Assistant:wght@400&display=swap"
                    .to_string(),
                "https://fonts.googleapis.com/css2?family=Libre+Baskerville:wght@400&display=swap"
                    .to_string(),
            ],
        }
    }
}

/// Output file locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub html: String,
    pub css: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            html: "index.html".to_string(),
            css: "css/styles.css".to_string(),
        }
    }
}

/// Gallery image selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImagesConfig {
    /// File extension of gallery images, without the dot. Matched exactly.
    pub extension: String,
    /// Appended to the stem to name a thumbnail.
    pub thumbnail_marker: String,
    /// Filenames never included in any section.
    pub ignore: Vec<String>,
    /// Alt text template; `{n}` is replaced by the global sequence number.
    pub alt_text: String,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            extension: "png".to_string(),
            thumbnail_marker: "t".to_string(),
            ignore: vec!["book1_13.png".to_string(), "book1_38.png".to_string()],
            alt_text: "portrait #{n}, a portrait drawing of me".to_string(),
        }
    }
}

/// One gallery section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SectionConfig {
    /// Heading shown above the section.
    pub header: String,
    /// Image folder relative to the source root; also the heading's id.
    pub folder: String,
    /// Id of the section's grid container.
    pub dom_id: String,
    /// Letters that prefix each entry's anchor name.
    pub name_prefix: String,
}

impl SectionConfig {
    pub fn new(header: &str, folder: &str, dom_id: &str, name_prefix: &str) -> Self {
        Self {
            header: header.to_string(),
            folder: folder.to_string(),
            dom_id: dom_id.to_string(),
            name_prefix: name_prefix.to_string(),
        }
    }
}

/// Stock sections: sketchbooks first, then the miscellaneous drawings.
fn default_sections() -> Vec<SectionConfig> {
    vec![
        SectionConfig::new("Sketchbook portraits", "books", "books_gallery", "p"),
        SectionConfig::new("Miscellaneous portraits", "misc", "misc_gallery", "m"),
    ]
}

/// Paths of the pre-built client-side libraries, as referenced from the page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LightboxConfig {
    /// PhotoSwipe stylesheet.
    pub css: String,
    /// PhotoSwipe lightbox ES module.
    pub module: String,
    /// PhotoSwipe core ES module, loaded lazily by the lightbox.
    pub core: String,
    /// Smart-quotes script. Omitted from the page when absent or empty.
    pub smartquotes: Option<String>,
}

impl Default for LightboxConfig {
    fn default() -> Self {
        Self {
            css: "./css/photoswipe.css".to_string(),
            module: "./js/photoswipe-lightbox.esm.min.js".to_string(),
            core: "./js/photoswipe.esm.min.js".to_string(),
            smartquotes: Some("./js/smartquotes.min.js".to_string()),
        }
    }
}

impl LightboxConfig {
    /// The smart-quotes include, if enabled.
    pub fn smartquotes_path(&self) -> Option<&str> {
        self.smartquotes.as_deref().filter(|s| !s.is_empty())
    }

    /// Include paths that live next to the page (not absolute URLs).
    pub fn local_includes(&self) -> Vec<&str> {
        let mut paths = vec![self.css.as_str(), self.module.as_str(), self.core.as_str()];
        if let Some(sq) = self.smartquotes_path() {
            paths.push(sq);
        }
        paths
            .into_iter()
            .filter(|p| !p.contains("://") && !p.starts_with("//"))
            .collect()
    }
}

/// Color configuration for light and dark modes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorConfig {
    pub light: ColorScheme,
    pub dark: ColorScheme,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            light: ColorScheme::default_light(),
            dark: ColorScheme::default_dark(),
        }
    }
}

/// Individual color scheme (light or dark).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorScheme {
    pub background: String,
    pub text: String,
    /// Background behind inline paragraph links.
    pub link_background: String,
    pub link: String,
    /// Home link in the menu bar.
    pub menu: String,
    pub menu_shadow: String,
    /// Placeholder behind thumbnails while they load.
    pub image_background: String,
}

impl ColorScheme {
    pub fn default_light() -> Self {
        Self {
            background: "#fff".to_string(),
            text: "#222".to_string(),
            link_background: "#edf6fb".to_string(),
            link: "#259".to_string(),
            menu: "#369".to_string(),
            menu_shadow: "#ccc".to_string(),
            image_background: "#ddd".to_string(),
        }
    }

    pub fn default_dark() -> Self {
        Self {
            background: "#1a1a1a".to_string(),
            text: "#e0e0e0".to_string(),
            link_background: "#2a3f4a".to_string(),
            link: "#7cb4d9".to_string(),
            menu: "#7cb4d9".to_string(),
            menu_shadow: "#000".to_string(),
            image_background: "#333".to_string(),
        }
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self::default_light()
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// Tables merge key by key; any other overlay value (arrays included)
/// replaces the base value.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `config.toml` from a directory as a raw TOML value, if present.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = path.join("config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the source root, on top of stock defaults.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    resolve_config(stock_defaults_value(), load_raw_config(root)?)
}

/// Returns a fully-commented stock `config.toml`. Used by `gen-config`.
pub fn stock_config_toml() -> &'static str {
    r##"# portrait-gal configuration
# ==========================
# All settings are optional. Values shown are the defaults.
# Place this file as config.toml next to the section folders.
# Unknown keys cause an error.

# ---------------------------------------------------------------------------
# Page
# ---------------------------------------------------------------------------
[page]
title = "Portraits"
home_link_text = "// gar.lol"
home_link_href = "/"

# Markdown intro shown above the galleries. Raw HTML is allowed.
# "{total}" is replaced with the number of images on the page.
intro = "intro.md"

# Google Analytics measurement id. Leave commented out to emit no tag.
# analytics_id = "G-XXXXXXXXXX"

fonts = [
    "https://fonts.googleapis.com/css?family=Droid+Sans",
    "https://fonts.googleapis.com/css2?family=Assistant:wght@400&display=swap",
    "https://fonts.googleapis.com/css2?family=Libre+Baskerville:wght@400&display=swap",
]

# ---------------------------------------------------------------------------
# Output files (relative to the source directory, overwritten on build)
# ---------------------------------------------------------------------------
[output]
# A plain file name: the page links images and CSS relative to the root.
html = "index.html"
css = "css/styles.css"

# ---------------------------------------------------------------------------
# Image selection
# ---------------------------------------------------------------------------
[images]
# Only files with exactly this extension are gallery images.
extension = "png"

# Thumbnails are named <stem><marker>.<extension> and must exist for
# every gallery image. Files whose stem ends with the marker are skipped.
thumbnail_marker = "t"

# Filenames left out of every section (and out of the numbering).
ignore = ["book1_13.png", "book1_38.png"]

# "{n}" is the image's number across the whole page.
alt_text = "portrait #{n}, a portrait drawing of me"

# ---------------------------------------------------------------------------
# Sections, built and numbered in this order.
# Setting [[sections]] replaces the whole default list.
# ---------------------------------------------------------------------------
[[sections]]
header = "Sketchbook portraits"
folder = "books"
dom_id = "books_gallery"
name_prefix = "p"

[[sections]]
header = "Miscellaneous portraits"
folder = "misc"
dom_id = "misc_gallery"
name_prefix = "m"

# ---------------------------------------------------------------------------
# Pre-built client-side libraries
# ---------------------------------------------------------------------------
[lightbox]
css = "./css/photoswipe.css"
module = "./js/photoswipe-lightbox.esm.min.js"
core = "./js/photoswipe.esm.min.js"
# Set to "" to leave smart quotes off the page.
smartquotes = "./js/smartquotes.min.js"

# ---------------------------------------------------------------------------
# Colors
# ---------------------------------------------------------------------------
[colors.light]
background = "#fff"
text = "#222"
link_background = "#edf6fb"
link = "#259"
menu = "#369"
menu_shadow = "#ccc"
image_background = "#ddd"

[colors.dark]
background = "#1a1a1a"
text = "#e0e0e0"
link_background = "#2a3f4a"
link = "#7cb4d9"
menu = "#7cb4d9"
menu_shadow = "#000"
image_background = "#333"
"##
}

/// Generate CSS custom properties for both themes.
///
/// Light values sit on `:root`; the dark scheme applies when the page sets
/// `data-theme="dark"` on the document element.
pub fn generate_color_css(colors: &ColorConfig) -> String {
    format!(
        r#":root {{
{light}
    transition: background-color 0.3s ease, color 0.3s ease;
}}

[data-theme="dark"] {{
{dark}
}}"#,
        light = color_vars(&colors.light),
        dark = color_vars(&colors.dark),
    )
}

fn color_vars(scheme: &ColorScheme) -> String {
    [
        ("--bg-color", &scheme.background),
        ("--text-color", &scheme.text),
        ("--link-bg", &scheme.link_background),
        ("--link-color", &scheme.link),
        ("--menu-color", &scheme.menu),
        ("--menu-shadow", &scheme.menu_shadow),
        ("--img-bg", &scheme.image_background),
    ]
    .iter()
    .map(|(name, value)| format!("    {name}: {value};"))
    .collect::<Vec<_>>()
    .join("\n")
}
