//! Defines the [`Renderer`] capability, which turns a template and a
//! [`PageContext`] into HTML, and [`GtmplRenderer`], which implements it with
//! Go-style [`gtmpl`] templates.
//!
//! The builder only depends on the trait, so another template engine can be
//! dropped in by implementing [`Renderer`] for it. What a template gets to see
//! is fixed by [`Page`] (see [`crate::value`] for the exact bindings).

use gtmpl::{Context, Template};
use std::cell::RefCell;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::config::GenerationConfig;
use crate::post::Post;
use crate::tag::TagIndex;

/// Renders a page through a template.
pub trait Renderer {
    /// Renders the template at `template_path` with `context` and returns the
    /// resulting HTML.
    fn render(&self, template_path: &Path, context: &PageContext<'_>) -> Result<String>;
}

/// The kinds of page in a site, each carrying the data its template receives.
#[derive(Debug)]
pub enum Page<'a> {
    /// A single post, with its newer (`prev`) and older (`next`) neighbours.
    Post {
        post: &'a Post,
        prev: Option<&'a Post>,
        next: Option<&'a Post>,
    },

    /// The main index: the latest posts plus the complete list.
    Index {
        posts: &'a [&'a Post],
        all_posts: &'a [&'a Post],
    },

    /// The posts for one tag.
    Tag {
        tag_name: &'a str,
        posts: &'a [&'a Post],
    },

    /// Every tag.
    AllTags { tag_index: &'a TagIndex<'a> },

    /// Every post.
    AllPosts { posts: &'a [&'a Post] },
}

/// Which of the optional pages exist. Links to pages that aren't generated
/// are never handed to templates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SiteLinks {
    pub tag_pages: bool,
    pub all_tags_page: bool,
    pub all_posts_page: bool,
}

impl From<&GenerationConfig> for SiteLinks {
    fn from(config: &GenerationConfig) -> SiteLinks {
        SiteLinks {
            tag_pages: config.tag_template_path.is_some(),
            all_tags_page: config.all_tags_template_path.is_some(),
            all_posts_page: config.all_posts_template_path.is_some(),
        }
    }
}

/// Everything a template is rendered with.
#[derive(Debug)]
pub struct PageContext<'a> {
    pub page: Page<'a>,
    pub site: &'a SiteLinks,
}

impl PageContext<'_> {
    /// The relative path from the page back to the root of the site. Post and
    /// tag pages live one directory down.
    pub fn root(&self) -> &'static str {
        match self.page {
            Page::Post { .. } | Page::Tag { .. } => "../",
            Page::Index { .. } | Page::AllTags { .. } | Page::AllPosts { .. } => "",
        }
    }
}

/// A [`Renderer`] for [`gtmpl`] templates. Each template file is read and
/// parsed the first time it is used and kept for the rest of the build.
#[derive(Default)]
pub struct GtmplRenderer {
    templates: RefCell<HashMap<PathBuf, Rc<Template>>>,
}

impl GtmplRenderer {
    pub fn new() -> GtmplRenderer {
        GtmplRenderer::default()
    }

    fn template(&self, path: &Path) -> Result<Rc<Template>> {
        if let Some(template) = self.templates.borrow().get(path) {
            return Ok(Rc::clone(template));
        }

        let contents = std::fs::read_to_string(path).map_err(|err| Error::TemplateNotFound {
            path: path.to_owned(),
            err,
        })?;
        let mut template = Template::default();
        template
            .parse(&contents)
            .map_err(|err| Error::render(path, err))?;

        let template = Rc::new(template);
        self.templates
            .borrow_mut()
            .insert(path.to_owned(), Rc::clone(&template));
        Ok(template)
    }
}

impl Renderer for GtmplRenderer {
    fn render(&self, template_path: &Path, context: &PageContext<'_>) -> Result<String> {
        let template = self.template(template_path)?;
        let data = Context::from(context.to_value()).map_err(|err| Error::render(template_path, err))?;

        let mut html = Vec::new();
        template
            .execute(&mut html, &data)
            .map_err(|err| Error::render(template_path, err))?;
        String::from_utf8(html).map_err(|err| Error::render(template_path, err))
    }
}

/// The result of a fallible rendering operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error rendering a page.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when a template file can't be read.
    #[error("template `{}` not found: {err}", path.display())]
    TemplateNotFound {
        path: PathBuf,
        #[source]
        err: io::Error,
    },

    /// Returned when the template engine fails to parse or execute a
    /// template.
    #[error("rendering template `{}`: {message}", path.display())]
    TemplateRender { path: PathBuf, message: String },
}

impl Error {
    fn render(path: &Path, err: impl ToString) -> Error {
        Error::TemplateRender {
            path: path.to_owned(),
            message: err.to_string(),
        }
    }
}
