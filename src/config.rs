//! Resolves the [`GenerationConfig`] a build runs from.
//!
//! Every setting can come from three places: the command line, a YAML
//! configuration file, and built-in defaults. Each tier is a [`Settings`]
//! value with every field optional, and the tiers are merged field by field
//! with [`Settings::or`]: a value from the command line beats one from the
//! file, which beats the default.
//!
//! ```yaml
//! input_dir: posts
//! output_dir: site
//! post_template_path: theme/post.html
//! index_template_path: theme/index.html
//! tag_template_path: theme/tag.html
//! num_posts: 5
//! ```

use serde::Deserialize;
use std::io;
use std::path::{Path, PathBuf};

/// The configuration file that is picked up from the working directory when
/// no other file is named.
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";

/// The default number of posts on the main index page.
pub const DEFAULT_NUM_POSTS: usize = 8;

const POSTS_DIRECTORY: &str = "posts";
const TAGS_DIRECTORY: &str = "tags";
const INDEX_FILE: &str = "index.html";
const ALL_TAGS_FILE: &str = "all_tags.html";
const ALL_POSTS_FILE: &str = "all_posts.html";

/// The fully resolved configuration for a build. The optional pages (tag
/// pages, the all-tags page and the all-posts page) are generated exactly
/// when their template is given.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenerationConfig {
    /// The directory searched (recursively) for Markdown sources.
    pub input_dir: PathBuf,

    /// The root directory of the generated site.
    pub output_dir: PathBuf,

    pub post_template_path: PathBuf,
    pub index_template_path: PathBuf,
    pub tag_template_path: Option<PathBuf>,
    pub all_tags_template_path: Option<PathBuf>,
    pub all_posts_template_path: Option<PathBuf>,

    /// How many of the latest posts the main index page shows.
    pub num_posts: usize,

    /// The number of threads used to parse posts. `None` lets the thread pool
    /// pick one per CPU.
    pub threads: Option<usize>,
}

impl GenerationConfig {
    /// The directory holding the post pages.
    pub fn posts_directory(&self) -> PathBuf {
        self.output_dir.join(POSTS_DIRECTORY)
    }

    /// The directory holding the tag pages.
    pub fn tags_directory(&self) -> PathBuf {
        self.output_dir.join(TAGS_DIRECTORY)
    }

    pub fn index_path(&self) -> PathBuf {
        self.output_dir.join(INDEX_FILE)
    }

    /// The page for the tag whose page slug is `tag`.
    pub fn tag_path(&self, tag: &str) -> PathBuf {
        self.tags_directory().join(format!("{}.html", tag))
    }

    pub fn all_tags_path(&self) -> PathBuf {
        self.output_dir.join(ALL_TAGS_FILE)
    }

    pub fn all_posts_path(&self) -> PathBuf {
        self.output_dir.join(ALL_POSTS_FILE)
    }
}

/// Links between pages, relative to the output root. Used to build the URLs
/// handed to templates.
pub mod layout {
    pub const POSTS: &str = super::POSTS_DIRECTORY;
    pub const TAGS: &str = super::TAGS_DIRECTORY;
    pub const INDEX: &str = super::INDEX_FILE;
    pub const ALL_TAGS: &str = super::ALL_TAGS_FILE;
    pub const ALL_POSTS: &str = super::ALL_POSTS_FILE;
}

/// One tier of configuration. Every field is optional.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub input_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub post_template_path: Option<PathBuf>,
    pub index_template_path: Option<PathBuf>,
    pub tag_template_path: Option<PathBuf>,
    pub all_tags_template_path: Option<PathBuf>,
    pub all_posts_template_path: Option<PathBuf>,
    pub num_posts: Option<usize>,
    pub threads: Option<usize>,
}

impl Settings {
    /// Loads the file tier. An explicitly named file must exist; otherwise
    /// [`DEFAULT_CONFIG_FILE`] is used if present and an empty tier if not.
    pub fn load(config_path: Option<&Path>) -> Result<Settings> {
        match config_path {
            Some(path) if !path.exists() => Err(Error::NotFound(path.to_owned())),
            Some(path) => Settings::from_file(path),
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.is_file() {
                    Settings::from_file(path)
                } else {
                    Ok(Settings::default())
                }
            }
        }
    }

    /// Parses the configuration file at `path`. Relative paths in the file
    /// are resolved against the directory containing it.
    pub fn from_file(path: &Path) -> Result<Settings> {
        let contents = std::fs::read_to_string(path).map_err(|err| Error::Io {
            path: path.to_owned(),
            err,
        })?;
        if contents.trim().is_empty() {
            return Ok(Settings::default());
        }
        let settings: Settings = serde_yaml::from_str(&contents).map_err(|err| Error::Parse {
            path: path.to_owned(),
            err,
        })?;
        Ok(settings.relative_to(path.parent().unwrap_or_else(|| Path::new(""))))
    }

    /// The built-in defaults.
    pub fn defaults() -> Settings {
        Settings {
            num_posts: Some(DEFAULT_NUM_POSTS),
            ..Settings::default()
        }
    }

    /// Merges two tiers, keeping every value set in `self` and taking the
    /// rest from `fallback`.
    pub fn or(self, fallback: Settings) -> Settings {
        Settings {
            input_dir: self.input_dir.or(fallback.input_dir),
            output_dir: self.output_dir.or(fallback.output_dir),
            post_template_path: self.post_template_path.or(fallback.post_template_path),
            index_template_path: self.index_template_path.or(fallback.index_template_path),
            tag_template_path: self.tag_template_path.or(fallback.tag_template_path),
            all_tags_template_path: self
                .all_tags_template_path
                .or(fallback.all_tags_template_path),
            all_posts_template_path: self
                .all_posts_template_path
                .or(fallback.all_posts_template_path),
            num_posts: self.num_posts.or(fallback.num_posts),
            threads: self.threads.or(fallback.threads),
        }
    }

    /// Turns merged settings into a [`GenerationConfig`], failing with every
    /// required setting that is still missing.
    pub fn resolve(self) -> Result<GenerationConfig> {
        let mut missing = Vec::new();
        let mut require = |value: Option<PathBuf>, name: &'static str| {
            if value.is_none() {
                missing.push(name);
            }
            value.unwrap_or_default()
        };
        let input_dir = require(self.input_dir, "input_dir");
        let output_dir = require(self.output_dir, "output_dir");
        let post_template_path = require(self.post_template_path, "post_template_path");
        let index_template_path = require(self.index_template_path, "index_template_path");
        if !missing.is_empty() {
            return Err(Error::Missing(missing));
        }

        Ok(GenerationConfig {
            input_dir,
            output_dir,
            post_template_path,
            index_template_path,
            tag_template_path: self.tag_template_path,
            all_tags_template_path: self.all_tags_template_path,
            all_posts_template_path: self.all_posts_template_path,
            num_posts: self.num_posts.unwrap_or(DEFAULT_NUM_POSTS),
            threads: self.threads.filter(|&threads| threads > 0),
        })
    }

    fn relative_to(self, base: &Path) -> Settings {
        let join = |path: Option<PathBuf>| path.map(|p| base.join(p));
        Settings {
            input_dir: join(self.input_dir),
            output_dir: join(self.output_dir),
            post_template_path: join(self.post_template_path),
            index_template_path: join(self.index_template_path),
            tag_template_path: join(self.tag_template_path),
            all_tags_template_path: join(self.all_tags_template_path),
            all_posts_template_path: join(self.all_posts_template_path),
            ..self
        }
    }
}

/// Merges the three tiers and resolves the result.
pub fn resolve(cli: Settings, file: Settings) -> Result<GenerationConfig> {
    cli.or(file).or(Settings::defaults()).resolve()
}

pub type Result<T> = std::result::Result<T, Error>;

/// Represents a problem loading or resolving configuration.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when an explicitly named configuration file doesn't exist.
    #[error("configuration file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Returned when the configuration file can't be read.
    #[error("reading configuration file `{}`: {err}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        err: io::Error,
    },

    /// Returned when the configuration file isn't valid.
    #[error("parsing configuration file `{}`: {err}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        err: serde_yaml::Error,
    },

    /// Returned when required settings are missing from every tier.
    #[error("missing required setting(s): {}", .0.join(", "))]
    Missing(Vec<&'static str>),

    /// Returned when reading an answer in interactive mode fails.
    #[error("reading interactive input: {0}")]
    Prompt(#[source] io::Error),
}
