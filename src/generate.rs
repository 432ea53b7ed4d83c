//! HTML and CSS generation.
//!
//! Stage 2 of the build. Takes the [`Manifest`] from the gallery builder and
//! renders the gallery page plus its stylesheet.
//!
//! ## Output Structure
//!
//! ```text
//! site/
//! ├── index.html            # The gallery page (output.html)
//! └── css/
//!     └── styles.css        # Theme colors + layout (output.css)
//! ```
//!
//! Images are never copied: the page links to them where they already live,
//! and the lightbox and smart-quotes libraries are referenced by path from
//! `[lightbox]` in the config.
//!
//! ## Page Layout
//!
//! - **Head**: optional analytics tag, title, lightbox CSS, the generated
//!   stylesheet with a `?<epoch>` cache-buster, font stylesheets, optional
//!   smart-quotes include, and the inline theme script.
//! - **Body**: menu bar (home link + theme toggle), `h1`, intro, then
//!   `div#gallery` holding one `h2#<folder>` + `div#<dom_id>` per section.
//! - **Scripts**: the lightbox module (deep links, URL hash upkeep), the
//!   smart-quotes call, and a trailing `Last updated` comment.
//!
//! Every entry is an `<a>` carrying the full-size URL, its anchor `name`, and
//! the `data-pswp-width`/`data-pswp-height` the lightbox needs to open without
//! first downloading the image.
//!
//! ## Static Assets
//!
//! Embedded at compile time:
//! - `static/style.css`: base styles (colors and grid rules prepended/appended)
//! - `static/theme.js`: light/dark toggle
//! - `static/lightbox.js`: PhotoSwipe init and deep linking, with include
//!   paths and the anchor pattern injected as JSON string literals
//!
//! ## Writing
//!
//! Both documents are rendered fully in memory first. Both are then written
//! to temporary siblings, and only once both are staged are they renamed into
//! place. A failure before the renames removes the temporaries and leaves the
//! previous page and stylesheet as they were.

use crate::config::{self, SiteConfig};
use crate::naming::name_tag_pattern;
use crate::types::{BuildStamp, GalleryEntry, Manifest, Section};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use pulldown_cmark::{Parser, html as md_html};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

const CSS_STATIC: &str = include_str!("../static/style.css");
const THEME_JS: &str = include_str!("../static/theme.js");
const LIGHTBOX_JS: &str = include_str!("../static/lightbox.js");

/// Paths of the files a build wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenSite {
    pub html: PathBuf,
    pub css: PathBuf,
}

/// Render and write the page and stylesheet under `root`.
pub fn write_site(
    root: &Path,
    config: &SiteConfig,
    manifest: &Manifest,
    stamp: &BuildStamp,
) -> Result<WrittenSite, GenerateError> {
    let intro = load_intro(root, config, manifest.total())?;
    let page = render_page(manifest, config, intro.as_deref(), stamp)?;
    let css = generate_css(config, manifest);

    let site = WrittenSite {
        html: root.join(&config.output.html),
        css: root.join(&config.output.css),
    };
    let html = page.into_string();
    let files = [(site.css.as_path(), css.as_bytes()), (site.html.as_path(), html.as_bytes())];

    let mut staged = Vec::with_capacity(files.len());
    for (path, contents) in files {
        match stage(path, contents) {
            Ok(tmp) => staged.push((tmp, path)),
            Err(e) => {
                discard(&staged);
                return Err(e);
            }
        }
    }

    // Every target must be replaceable before the first rename
    for (_, path) in &staged {
        if path.is_dir() {
            discard(&staged);
            return Err(std::io::Error::other(format!(
                "{} is a directory",
                path.display()
            ))
            .into());
        }
    }

    for (tmp, path) in &staged {
        if let Err(e) = fs::rename(tmp, path) {
            discard(&staged);
            return Err(e.into());
        }
    }
    Ok(site)
}

/// Write `contents` to a temporary sibling of `path` and return its path.
fn stage(path: &Path, contents: &[u8]) -> Result<PathBuf, GenerateError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp = path.with_file_name(tmp_name);

    if let Err(e) = fs::write(&tmp, contents) {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }
    Ok(tmp)
}

/// Remove staged files that were not renamed into place.
fn discard(staged: &[(PathBuf, &Path)]) {
    for (tmp, _) in staged {
        let _ = fs::remove_file(tmp);
    }
}

/// Local lightbox and smart-quotes includes that are not present under `root`.
///
/// The page still builds without them; the lightbox just won't open.
pub fn missing_includes<'a>(root: &Path, config: &'a SiteConfig) -> Vec<&'a str> {
    config
        .lightbox
        .local_includes()
        .into_iter()
        .filter(|include| {
            let relative = include.trim_start_matches("./").trim_start_matches('/');
            !root.join(relative).is_file()
        })
        .collect()
}

/// Read the intro markdown, if the configured file exists, and render it.
pub fn load_intro(
    root: &Path,
    config: &SiteConfig,
    total: usize,
) -> Result<Option<String>, GenerateError> {
    if config.page.intro.is_empty() {
        return Ok(None);
    }
    let path = root.join(&config.page.intro);
    if !path.is_file() {
        return Ok(None);
    }
    let markdown = fs::read_to_string(&path)?;
    Ok(Some(render_intro(&markdown, total)))
}

/// Convert intro markdown to HTML after substituting `{total}`.
///
/// Raw HTML in the markdown passes through, so links such as
/// `<a href="javascript:void(0)" data-pswp-open="144">` keep working.
pub fn render_intro(markdown: &str, total: usize) -> String {
    let text = markdown.replace("{total}", &total.to_string());
    let parser = Parser::new(&text);
    let mut html = String::new();
    md_html::push_html(&mut html, parser);
    html
}

// ============================================================================
// CSS
// ============================================================================

/// The complete stylesheet: theme variables, base styles, then grid rules
/// for every section container.
pub fn generate_css(config: &SiteConfig, manifest: &Manifest) -> String {
    let color_css = config::generate_color_css(&config.colors);
    let dom_ids: Vec<&str> = manifest.sections.iter().map(|s| s.dom_id.as_str()).collect();
    format!(
        "{}\n\n{}\n{}",
        color_css,
        CSS_STATIC,
        gallery_grid_css(&dom_ids)
    )
}

fn gallery_grid_css(dom_ids: &[&str]) -> String {
    if dom_ids.is_empty() {
        return String::new();
    }
    let select = |suffix: &str| {
        dom_ids
            .iter()
            .map(|id| format!("#{id}{suffix}"))
            .collect::<Vec<_>>()
            .join(", ")
    };
    let grid = select("");
    let links = select(" a");
    let images = select(" a img");

    format!(
        r#"{grid} {{
    max-width: 1200px;
    display: flex;
    flex-wrap: wrap;
    margin: 0 -10px;
}}

{links} {{
    margin: 10px;
}}

{images} {{
    background-color: var(--img-bg);
}}

@media only screen and (max-width: 800px) {{
    {links} {{
        margin: 6px;
    }}

    {images} {{
        height: 190px;
        width: auto;
    }}
}}

@media only screen and (max-width: 600px) {{
    {links} {{
        margin: 4px;
    }}

    {images} {{
        height: 150px;
        width: auto;
    }}
}}
"#
    )
}

// ============================================================================
// Scripts
// ============================================================================

/// The lightbox module: PhotoSwipe init, hash deep links, and
/// `data-pswp-open` shortcuts.
pub fn lightbox_script(config: &SiteConfig, prefixes: &[&str]) -> Result<String, GenerateError> {
    Ok(LIGHTBOX_JS
        .replace("__LIGHTBOX_MODULE__", &js_string(&config.lightbox.module)?)
        .replace("__CORE_MODULE__", &js_string(&config.lightbox.core)?)
        .replace("__NAME_TAG_PATTERN__", &js_string(&name_tag_pattern(prefixes))?))
}

/// A JS string literal safe to place inside a `<script>` element.
fn js_string(value: &str) -> Result<String, GenerateError> {
    Ok(serde_json::to_string(value)?.replace("</", "<\\/"))
}

fn analytics_snippet(id: &str) -> String {
    format!(
        r#"window.dataLayer = window.dataLayer || [];
function gtag(){{dataLayer.push(arguments);}}
gtag('js', new Date());
gtag('config', '{id}');"#
    )
}

// ============================================================================
// HTML Components
// ============================================================================

/// Render the whole gallery page.
pub fn render_page(
    manifest: &Manifest,
    config: &SiteConfig,
    intro_html: Option<&str>,
    stamp: &BuildStamp,
) -> Result<Markup, GenerateError> {
    let script = lightbox_script(config, &manifest.prefixes())?;
    let page = &config.page;
    let stylesheet = format!("./{}?{}", config.output.css, stamp.epoch);

    Ok(html! {
        (DOCTYPE)
        html lang="en" {
            head {
                @if let Some(id) = &page.analytics_id {
                    script async src={ "https://www.googletagmanager.com/gtag/js?id=" (id) } {}
                    script { (PreEscaped(analytics_snippet(id))) }
                }
                title { (page.title) }
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                link rel="stylesheet" href=(config.lightbox.css);
                link rel="stylesheet" href=(stylesheet);
                @for font in &page.fonts {
                    link href=(font) rel="stylesheet";
                }
                @if let Some(path) = config.lightbox.smartquotes_path() {
                    script src=(path) {}
                }
                script { (PreEscaped(THEME_JS)) }
            }
            body {
                (menu(config))
                h1 { (page.title) }
                @if let Some(intro) = intro_html {
                    (PreEscaped(intro))
                }
                div id="gallery" {
                    @for section in &manifest.sections {
                        (render_section(section))
                    }
                }
                script type="module" { (PreEscaped(script)) }
                @if config.lightbox.smartquotes_path().is_some() {
                    script type="module" {
                        (PreEscaped("document.addEventListener('DOMContentLoaded', () => smartquotes());"))
                    }
                }
                (PreEscaped(footer_comment(stamp)))
            }
        }
    })
}

fn menu(config: &SiteConfig) -> Markup {
    html! {
        div id="menu" {
            a id="home-link" href=(config.page.home_link_href) { (config.page.home_link_text) }
            button id="theme-toggle" aria-label="Toggle dark mode" { "🌙" }
        }
    }
}

/// One section: heading (linkable as `#<folder>`) and its grid of entries.
pub fn render_section(section: &Section) -> Markup {
    html! {
        h2 id=(section.folder) { (section.header) }
        div id=(section.dom_id) {
            @for entry in &section.entries {
                (render_entry(entry))
            }
        }
    }
}

/// One thumbnail link. The lightbox reads the full-size dimensions from the
/// `data-pswp-*` attributes.
pub fn render_entry(entry: &GalleryEntry) -> Markup {
    html! {
        a href=(entry.full_image_path)
            name=(entry.name_tag)
            data-pswp-width=(entry.full_width)
            data-pswp-height=(entry.full_height)
            target="_blank" {
            img alt=(entry.alt_text)
                src=(entry.thumbnail_path)
                width=(entry.thumb_width)
                height=(entry.thumb_height);
        }
    }
}

fn footer_comment(stamp: &BuildStamp) -> String {
    // "--" would end the comment early
    let updated = stamp.formatted.replace("--", "- -");
    format!(
        "<!--\nLast updated: {updated}\nGenerated by portrait-gal {}\n-->",
        crate::version_string()
    )
}

// ============================================================================
// Tests
// ============================================================================
