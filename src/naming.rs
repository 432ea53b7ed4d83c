//! Filename conventions shared by the builder and the page.
//!
//! Three conventions live here so that scanning, rendering, and deep-link
//! resolution agree on them:
//!
//! - **Natural order**: `book2_9.png` sorts before `book2_10.png`. Digit runs
//!   compare by value, everything else compares as text.
//! - **Thumbnail names**: the thumbnail of `book1_1.png` is `book1_1t.png`,
//!   i.e. the marker is appended to the stem, before the extension.
//! - **Name tags**: each entry is addressable as `<prefix><n>` (`#p12`,
//!   `#m4`). Prefixes are ASCII letters only, so the split point between
//!   prefix and number is always the first digit.

use std::cmp::Ordering;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Chunk<'a> {
    Digits(&'a str),
    Text(&'a str),
}

fn split_chunks(s: &str) -> Vec<Chunk<'_>> {
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut current: Option<bool> = None;

    for (i, c) in s.char_indices() {
        let is_digit = c.is_ascii_digit();
        match current {
            Some(prev) if prev == is_digit => {}
            Some(prev) => {
                chunks.push(make_chunk(&s[start..i], prev));
                start = i;
                current = Some(is_digit);
            }
            None => current = Some(is_digit),
        }
    }
    if let Some(prev) = current {
        chunks.push(make_chunk(&s[start..], prev));
    }
    chunks
}

fn make_chunk(s: &str, digits: bool) -> Chunk<'_> {
    if digits {
        Chunk::Digits(s)
    } else {
        Chunk::Text(s)
    }
}

/// Compare two digit runs by numeric value without parsing (no overflow).
fn cmp_digit_runs(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// Natural ("human") ordering of two strings.
///
/// - `"a_2.png"` < `"a_10.png"` (digit runs compare by value)
/// - `"1x"` < `"x"` (a leading number sorts before leading text)
/// - text runs compare case-sensitively, byte by byte
///
/// Strings that are equal under natural comparison (`"a01"` vs `"a1"`) fall
/// back to plain string order, so the result is a total order and sorting is
/// deterministic regardless of directory listing order.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let left = split_chunks(a);
    let right = split_chunks(b);

    for (x, y) in left.iter().zip(right.iter()) {
        let ord = match (x, y) {
            (Chunk::Digits(x), Chunk::Digits(y)) => cmp_digit_runs(x, y),
            (Chunk::Text(x), Chunk::Text(y)) => x.cmp(y),
            (Chunk::Digits(_), Chunk::Text(_)) => Ordering::Less,
            (Chunk::Text(_), Chunk::Digits(_)) => Ordering::Greater,
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }

    left.len().cmp(&right.len()).then_with(|| a.cmp(b))
}

/// Split `name.ext` into `("name", Some("ext"))`. Only the last dot counts.
pub fn split_extension(filename: &str) -> (&str, Option<&str>) {
    match filename.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
        _ => (filename, None),
    }
}

/// Derive the thumbnail filename: `book1_1.png` + `t` → `book1_1t.png`.
pub fn thumbnail_name(filename: &str, marker: &str) -> String {
    match split_extension(filename) {
        (stem, Some(ext)) => format!("{stem}{marker}.{ext}"),
        (stem, None) => format!("{stem}{marker}"),
    }
}

/// Whether a filename is itself a thumbnail (its stem ends with the marker).
///
/// This is purely name based: a full-size `cat.png` counts as a thumbnail
/// under the default `t` marker.
pub fn is_thumbnail_name(filename: &str, marker: &str) -> bool {
    let (stem, _) = split_extension(filename);
    stem.ends_with(marker)
}

/// A parsed `<prefix><n>` anchor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NameTag {
    pub prefix: String,
    pub index: u32,
}

impl NameTag {
    pub fn new(prefix: &str, index: u32) -> Self {
        Self {
            prefix: prefix.to_string(),
            index,
        }
    }
}

impl fmt::Display for NameTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.prefix, self.index)
    }
}

/// Parse a URL fragment like `#p12` or `m004` against the known prefixes.
///
/// Accepts exactly what the page's client-side pattern accepts: one of the
/// prefixes followed by one or more ASCII digits and nothing else. Leading
/// zeros are allowed and dropped (`p012` addresses `p12`), mirroring
/// `parseInt` in the browser.
pub fn parse_name_tag(fragment: &str, prefixes: &[&str]) -> Option<NameTag> {
    let fragment = fragment.strip_prefix('#').unwrap_or(fragment);
    let split = fragment.find(|c: char| c.is_ascii_digit())?;
    let (prefix, digits) = fragment.split_at(split);

    if !prefixes.contains(&prefix) || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let index = digits.parse::<u32>().ok()?;
    Some(NameTag::new(prefix, index))
}

/// JavaScript regex source matching every valid name tag, e.g. `^(p|m)(\d+)$`.
///
/// Prefixes are validated to be ASCII letters, so they need no escaping.
pub fn name_tag_pattern(prefixes: &[&str]) -> String {
    format!("^({})(\\d+)$", prefixes.join("|"))
}
