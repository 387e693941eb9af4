//! Defines the [`Post`] type and the logic for turning a single source file
//! into one. See [`crate::value`] for how posts are converted into template
//! values.

use chrono::NaiveDate;
use std::io;
use std::path::{Path, PathBuf};

use crate::frontmatter::{self, Frontmatter, MetadataWarning};
use crate::markdown;
use crate::tag::Tag;

/// The extensions of post source files, compared case-insensitively.
pub const MARKDOWN_EXTENSIONS: &[&str] = &["md", "markdown"];

pub const HTML_EXTENSION: &str = "html";

const FOLD_TAG: &str = "<!-- more -->";

/// A single post: the normalized frontmatter of a source file plus its
/// rendered body.
#[derive(Clone, Debug, PartialEq)]
pub struct Post {
    /// Identifies the post within a site. Derived from the source file name
    /// and used as the post page's file name.
    pub slug: String,

    /// The title of the post. Falls back to the source file's stem.
    pub title: String,

    /// The date of the post. Undated posts are never given a made-up date.
    pub date: Option<NaiveDate>,

    /// A short summary of the post.
    pub tldr: Option<String>,

    /// The tags of the post in the order they were written.
    pub tags: Vec<Tag>,

    /// The post body as HTML.
    pub body_html: String,

    /// Slugs of the other posts this post links to.
    pub links: Vec<String>,

    /// The source file the post was parsed from.
    pub source_path: PathBuf,

    /// The location of the post's output page.
    pub output_path: PathBuf,
}

impl Post {
    /// Builds a post from parsed frontmatter and the Markdown `body` of the
    /// file at `source_path`. The output page goes into `posts_directory`.
    pub fn new(
        frontmatter: Frontmatter,
        body: &str,
        source_path: &Path,
        posts_directory: &Path,
    ) -> Result<Post> {
        let stem = source_path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .ok_or_else(|| Error::InvalidFileName(source_path.to_owned()))?;
        let slug = slugify(stem);
        if slug.is_empty() {
            return Err(Error::InvalidFileName(source_path.to_owned()));
        }

        let html = markdown::to_html(body);
        Ok(Post {
            title: frontmatter
                .title
                .filter(|title| !title.trim().is_empty())
                .unwrap_or_else(|| stem.to_owned()),
            date: frontmatter.date,
            tldr: frontmatter.tldr,
            tags: frontmatter.tags.iter().map(|name| Tag::new(name)).collect(),
            body_html: html.body,
            links: html.links,
            source_path: source_path.to_owned(),
            output_path: posts_directory.join(format!("{}.{}", slug, HTML_EXTENSION)),
            slug,
        })
    }

    /// Returns the part of the body above the `<!-- more -->` fold and whether
    /// the body was actually folded.
    pub fn summary(&self) -> (&str, bool) {
        match self.body_html.find(FOLD_TAG) {
            Some(i) => (&self.body_html[..i], true),
            None => (&self.body_html, false),
        }
    }
}

/// Normalizes a file stem into a slug: lowercase ASCII letters and digits with
/// every run of other characters (spaces, underscores, punctuation) turned
/// into a single hyphen. `My Post` and `my_post` both become `my-post`.
pub fn slugify(stem: &str) -> String {
    slug::slugify(stem)
}

/// Reports whether `path` has one of the [`MARKDOWN_EXTENSIONS`].
pub fn is_markdown(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| {
            MARKDOWN_EXTENSIONS
                .iter()
                .any(|md| ext.eq_ignore_ascii_case(md))
        })
}

/// Reads and parses the post at `source_path`, returning it along with any
/// frontmatter warnings.
pub fn parse_post(
    source_path: &Path,
    posts_directory: &Path,
) -> Result<(Post, Vec<MetadataWarning>)> {
    let contents = std::fs::read_to_string(source_path).map_err(|err| Error::Io {
        path: source_path.to_owned(),
        err,
    })?;
    let parsed = frontmatter::parse(&contents);
    let post = Post::new(parsed.frontmatter, parsed.body, source_path, posts_directory)?;
    Ok((post, parsed.warnings))
}

/// Represents the result of a [`Post`]-parse operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error parsing a [`Post`] object.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when a source file can't be read (including when it isn't
    /// valid UTF-8).
    #[error("reading post `{}`: {err}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        err: io::Error,
    },

    /// Returned when a source file's name doesn't yield a usable slug.
    #[error("invalid file name: {0:?}")]
    InvalidFileName(PathBuf),
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    fn new_post(file_name: &str, frontmatter: Frontmatter, body: &str) -> Result<Post> {
        Post::new(
            frontmatter,
            body,
            &Path::new("src/posts").join(file_name),
            Path::new("out/posts"),
        )
    }

    #[test]
    fn test_new_applies_defaults() -> Result<()> {
        let post = new_post("My First_Post.md", Frontmatter::default(), "Hi")?;
        assert_eq!("my-first-post", post.slug);
        assert_eq!("My First_Post", post.title);
        assert_eq!(None, post.date);
        assert_eq!(None, post.tldr);
        assert!(post.tags.is_empty());
        assert_eq!("<p>Hi</p>\n", post.body_html);
        assert_eq!(PathBuf::from("out/posts/my-first-post.html"), post.output_path);
        assert_eq!(PathBuf::from("src/posts/My First_Post.md"), post.source_path);
        Ok(())
    }

    #[test]
    fn test_new_keeps_frontmatter() -> Result<()> {
        let frontmatter = Frontmatter {
            title: Some(String::from("Hello")),
            date: NaiveDate::from_ymd_opt(2023, 1, 3),
            tldr: Some(String::from("short")),
            tags: vec![String::from("Rust"), String::from("web")],
        };
        let post = new_post("hello.md", frontmatter, "See [x](x.md)")?;
        assert_eq!("Hello", post.title);
        assert_eq!(NaiveDate::from_ymd_opt(2023, 1, 3), post.date);
        assert_eq!(Some(String::from("short")), post.tldr);
        assert_eq!(
            vec!["Rust", "web"],
            post.tags.iter().map(|t| t.name.as_str()).collect::<Vec<_>>()
        );
        assert_eq!(vec![String::from("x")], post.links);
        Ok(())
    }

    #[test]
    fn test_blank_title_falls_back_to_stem() -> Result<()> {
        let frontmatter = Frontmatter {
            title: Some(String::from("   ")),
            ..Frontmatter::default()
        };
        assert_eq!("notes", new_post("notes.md", frontmatter, "")?.title);
        Ok(())
    }

    #[test]
    fn test_invalid_file_name() {
        assert!(matches!(
            new_post("!!!.md", Frontmatter::default(), ""),
            Err(Error::InvalidFileName(_))
        ));
    }

    #[test]
    fn test_summary() -> Result<()> {
        let post = new_post("a.md", Frontmatter::default(), "above\n\n<!-- more -->\n\nbelow")?;
        assert_eq!(("<p>above</p>\n", true), post.summary());

        let post = new_post("b.md", Frontmatter::default(), "all of it")?;
        assert_eq!(("<p>all of it</p>\n", false), post.summary());
        Ok(())
    }

    #[test]
    fn test_is_markdown() {
        assert!(is_markdown(Path::new("a.md")));
        assert!(is_markdown(Path::new("dir/a.Markdown")));
        assert!(is_markdown(Path::new("A.MD")));
        assert!(!is_markdown(Path::new("a.txt")));
        assert!(!is_markdown(Path::new("md")));
    }

    #[test]
    fn test_parse_post_missing_file() {
        let result = parse_post(Path::new("does/not/exist.md"), Path::new("out"));
        assert!(matches!(result, Err(Error::Io { .. })));
    }
}
