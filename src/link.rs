//! Rewrites links between posts. Posts link to each other by their source
//! file (e.g., `other-post.md`), which doesn't exist in the output site; the
//! link has to point at the generated page instead.

use std::path::Path;
use url::{ParseError, Url};

use crate::post::{slugify, HTML_EXTENSION};

/// A link destination that was rewritten to point at a post page.
#[derive(Debug, PartialEq, Eq)]
pub struct Converted {
    /// The new link destination, relative to a post page.
    pub destination: String,

    /// The slug of the post the link points to.
    pub slug: String,
}

/// Converts `destination` if it is a relative link to a Markdown source file.
/// Post pages all live in the same output directory, so the target resolves
/// to `{slug}.html` regardless of where the source files sit relative to one
/// another. Any query string or fragment is carried over.
///
/// Returns `None` for anything that should be left alone: absolute URLs,
/// root-relative paths, in-page anchors and links to non-Markdown files.
pub fn convert(destination: &str) -> Option<Converted> {
    if destination.is_empty() || destination.starts_with('/') || destination.starts_with('#') {
        return None;
    }
    match Url::parse(destination) {
        Err(ParseError::RelativeUrlWithoutBase) => (),
        _ => return None,
    }

    let split = destination.find(|c: char| c == '?' || c == '#').unwrap_or(destination.len());
    let (path, suffix) = destination.split_at(split);
    let path = Path::new(path);
    if !crate::post::is_markdown(path) {
        return None;
    }
    let slug = slugify(path.file_stem()?.to_str()?);
    if slug.is_empty() {
        return None;
    }
    Some(Converted {
        destination: format!("{}.{}{}", slug, HTML_EXTENSION, suffix),
        slug,
    })
}
