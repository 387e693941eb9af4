//! Exports [`SiteBuilder`], which stitches together the high-level steps of
//! building the output static site. A build moves through the [`Stage`]s in
//! order:
//!
//! 1. Discovering the Markdown sources in the input directory (recursively)
//! 2. Parsing them into [`Post`]s ([`crate::post`])
//! 3. Aggregating the posts into a [`PostCollection`] and a [`TagIndex`]
//! 4. Rendering every page in memory ([`crate::render`])
//! 5. Writing the pages to the output directory ([`crate::write`])
//!
//! Any error stops the build in the stage it happened in. Nothing is written
//! before the writing stage, so a bad post or a broken template leaves the
//! previous output untouched.

use rayon::prelude::*;
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::{DirEntry, WalkDir};

use crate::collection::{PostCollection, SlugCollision};
use crate::config::GenerationConfig;
use crate::frontmatter::MetadataWarning;
use crate::post::{self, Post};
use crate::render::{self, GtmplRenderer, Page, PageContext, Renderer, SiteLinks};
use crate::tag::{TagCollision, TagIndex};
use crate::write::{self, OutputFile};

/// Builds the site described by `config` with [`GtmplRenderer`].
pub fn build_site(config: &GenerationConfig) -> std::result::Result<BuildReport, BuildError> {
    SiteBuilder::new(config).build()
}

/// The stages of a build, in order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Discovering,
    Parsing,
    Aggregating,
    Rendering,
    Writing,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Stage::Discovering => "discovering",
            Stage::Parsing => "parsing",
            Stage::Aggregating => "aggregating",
            Stage::Rendering => "rendering",
            Stage::Writing => "writing",
            Stage::Done => "done",
        })
    }
}

/// A non-fatal problem found during a build.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Warning {
    /// A post's frontmatter had a field that was ignored.
    Metadata {
        path: PathBuf,
        warning: MetadataWarning,
    },

    /// A post links to a Markdown file that isn't one of the site's posts.
    DanglingLink { path: PathBuf, slug: String },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Warning::Metadata { path, warning } => write!(f, "{}: {}", path.display(), warning),
            Warning::DanglingLink { path, slug } => {
                write!(f, "{}: links to missing post `{}`", path.display(), slug)
            }
        }
    }
}

/// The outcome of a successful build.
#[derive(Debug, Default)]
pub struct BuildReport {
    /// The number of posts in the site.
    pub posts: usize,

    /// Every file that was written, in the order it was written.
    pub written: Vec<PathBuf>,

    pub warnings: Vec<Warning>,
}

impl BuildReport {
    /// The line logged after a build that produced warnings, or `None` for a
    /// clean build.
    pub fn warning_summary(&self) -> Option<String> {
        match self.warnings.len() {
            0 => None,
            n => Some(format!(
                "built {} post(s) with {} warning(s)",
                self.posts, n
            )),
        }
    }
}

/// Runs the build pipeline for one [`GenerationConfig`]. The renderer is a
/// type parameter so that templates can be rendered by something other than
/// [`GtmplRenderer`].
pub struct SiteBuilder<'c, R = GtmplRenderer> {
    config: &'c GenerationConfig,
    renderer: R,
}

impl<'c> SiteBuilder<'c> {
    pub fn new(config: &'c GenerationConfig) -> Self {
        SiteBuilder::with_renderer(config, GtmplRenderer::new())
    }
}

impl<'c, R: Renderer> SiteBuilder<'c, R> {
    pub fn with_renderer(config: &'c GenerationConfig, renderer: R) -> Self {
        SiteBuilder { config, renderer }
    }

    /// Runs every stage of the build. See the module documentation.
    pub fn build(&self) -> std::result::Result<BuildReport, BuildError> {
        let mut warnings = Vec::new();

        enter(Stage::Discovering);
        let sources = self.discover().map_err(failed(Stage::Discovering))?;
        debug!(sources = sources.len(), "discovered post sources");

        enter(Stage::Parsing);
        let posts = self
            .parse(&sources, &mut warnings)
            .map_err(failed(Stage::Parsing))?;

        enter(Stage::Aggregating);
        let tags = TagIndex::new(&posts);
        if self.config.tag_template_path.is_some() {
            tags.check_pages().map_err(failed(Stage::Aggregating))?;
        }
        check_links(&posts, &mut warnings);

        enter(Stage::Rendering);
        let files = self.render(&posts, &tags).map_err(failed(Stage::Rendering))?;

        enter(Stage::Writing);
        let written = write::write_all(&files).map_err(failed(Stage::Writing))?;

        enter(Stage::Done);
        info!(
            posts = posts.len(),
            tags = tags.len(),
            pages = written.len(),
            "built site in {}",
            self.config.output_dir.display()
        );
        Ok(BuildReport {
            posts: posts.len(),
            written,
            warnings,
        })
    }

    /// Finds every Markdown file below the input directory, in a stable order.
    /// Hidden files and directories are skipped.
    fn discover(&self) -> Result<Vec<PathBuf>> {
        let input_dir = &self.config.input_dir;
        if !input_dir.is_dir() {
            return Err(Error::InputDirectoryNotFound(input_dir.clone()));
        }

        let mut sources = Vec::new();
        let walker = WalkDir::new(input_dir)
            .sort_by(|a, b| a.file_name().cmp(b.file_name()))
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry));
        for result in walker {
            let entry = result?;
            if entry.file_type().is_file() && post::is_markdown(entry.path()) {
                sources.push(entry.into_path());
            }
        }
        Ok(sources)
    }

    /// Parses every source on a thread pool, then adds the posts to a
    /// collection in discovery order so that errors and warnings come out the
    /// same way on every run.
    fn parse(&self, sources: &[PathBuf], warnings: &mut Vec<Warning>) -> Result<PostCollection> {
        let posts_directory = self.config.posts_directory();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.threads.unwrap_or(0))
            .build()?;
        let results: Vec<post::Result<(Post, Vec<MetadataWarning>)>> = pool.install(|| {
            sources
                .par_iter()
                .map(|source| post::parse_post(source, &posts_directory))
                .collect()
        });

        let mut posts = PostCollection::new();
        for result in results {
            let (post, post_warnings) = result?;
            for warning in post_warnings {
                debug!(path = %post.source_path.display(), "{}", warning);
                warnings.push(Warning::Metadata {
                    path: post.source_path.clone(),
                    warning,
                });
            }
            posts.add(post)?;
        }
        Ok(posts)
    }

    /// Renders every page. Post pages and the main index are always rendered;
    /// the other pages only when their template is configured.
    fn render(&self, posts: &PostCollection, tags: &TagIndex<'_>) -> Result<Vec<OutputFile>> {
        let config = self.config;
        let site = SiteLinks::from(config);
        let sorted = posts.sorted();
        let latest = posts.latest(config.num_posts);
        let mut files = Vec::with_capacity(sorted.len() + tags.len() + 3);

        for (i, &post) in sorted.iter().enumerate() {
            let page = Page::Post {
                post,
                prev: match i {
                    0 => None,
                    _ => Some(sorted[i - 1]),
                },
                next: sorted.get(i + 1).copied(),
            };
            files.push(self.page(&config.post_template_path, &post.output_path, page, &site)?);
        }

        let page = Page::Index {
            posts: &latest,
            all_posts: &sorted,
        };
        files.push(self.page(&config.index_template_path, &config.index_path(), page, &site)?);

        if let Some(template) = &config.tag_template_path {
            for tag in tags.iter() {
                let page = Page::Tag {
                    tag_name: &tag.name,
                    posts: &tag.posts,
                };
                files.push(self.page(template, &config.tag_path(&tag.slug), page, &site)?);
            }
        }

        if let Some(template) = &config.all_tags_template_path {
            let page = Page::AllTags { tag_index: tags };
            files.push(self.page(template, &config.all_tags_path(), page, &site)?);
        }

        if let Some(template) = &config.all_posts_template_path {
            let page = Page::AllPosts { posts: &sorted };
            files.push(self.page(template, &config.all_posts_path(), page, &site)?);
        }

        Ok(files)
    }

    fn page(
        &self,
        template: &Path,
        path: &Path,
        page: Page<'_>,
        site: &SiteLinks,
    ) -> Result<OutputFile> {
        debug!(template = %template.display(), page = %path.display(), "rendering page");
        let context = PageContext { page, site };
        Ok(OutputFile {
            path: path.to_owned(),
            html: self.renderer.render(template, &context)?,
        })
    }
}

/// Records a [`Warning::DanglingLink`] for every post link whose target isn't
/// in `posts`.
fn check_links(posts: &PostCollection, warnings: &mut Vec<Warning>) {
    for post in posts.sorted() {
        let targets: BTreeSet<&str> = post.links.iter().map(String::as_str).collect();
        for slug in targets.into_iter().filter(|slug| posts.get(slug).is_none()) {
            debug!(path = %post.source_path.display(), slug, "dangling post link");
            warnings.push(Warning::DanglingLink {
                path: post.source_path.clone(),
                slug: slug.to_owned(),
            });
        }
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map_or(false, |name| name.starts_with('.'))
}

fn enter(stage: Stage) {
    debug!(%stage, "entering stage");
}

fn failed<E: Into<Error>>(stage: Stage) -> impl FnOnce(E) -> BuildError {
    move |cause| {
        let cause = cause.into();
        debug!(%stage, "stage failed: {}", cause);
        BuildError { stage, cause }
    }
}

type Result<T> = std::result::Result<T, Error>;

/// A build that stopped in `stage` because of `cause`.
#[derive(Debug, thiserror::Error)]
#[error("{stage} failed: {cause}")]
pub struct BuildError {
    pub stage: Stage,
    #[source]
    pub cause: Error,
}

/// The error type for building a site.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when the input directory doesn't exist.
    #[error("input directory `{}` not found", .0.display())]
    InputDirectoryNotFound(PathBuf),

    /// Returned for I/O errors while searching the input directory.
    #[error("searching for posts: {0}")]
    Discover(#[from] walkdir::Error),

    /// Returned when the parsing thread pool can't be started.
    #[error("starting worker threads: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// Returned for errors reading a post.
    #[error(transparent)]
    Post(#[from] post::Error),

    /// Returned when two posts have the same slug.
    #[error(transparent)]
    SlugCollision(#[from] SlugCollision),

    /// Returned when two tags would share a tag page.
    #[error(transparent)]
    TagCollision(#[from] TagCollision),

    /// Returned for errors rendering a page.
    #[error(transparent)]
    Render(#[from] render::Error),

    /// Returned for errors writing a page to disk.
    #[error(transparent)]
    Write(#[from] write::Error),
}
