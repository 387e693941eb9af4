//! The library code for the `mdnet` static site generator. The architecture
//! can be generally broken down into two distinct steps:
//!
//! 1. Parsing posts from source files on disk ([`crate::frontmatter`],
//!    [`crate::markdown`] and [`crate::post`])
//! 2. Converting the posts into output files on disk ([`crate::render`] and
//!    [`crate::write`])
//!
//! Between the two, the posts are gathered into a [`collection::PostCollection`]
//! which owns them and hands out sorted views, and a [`tag::TagIndex`] is
//! derived from the collection. Neither changes once the pages start being
//! rendered.
//!
//! The second step renders one page per post, the main index page, and
//! optionally one page per tag, a page listing all tags and a page listing all
//! posts. Every page is rendered in memory before anything is written, so a
//! broken template never leaves a half-updated site behind.
//!
//! [`build::SiteBuilder`] stitches the steps together; [`config`] resolves the
//! [`config::GenerationConfig`] it runs from.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod build;
pub mod collection;
pub mod config;
pub mod frontmatter;
pub mod link;
pub mod markdown;
pub mod post;
pub mod prompt;
pub mod render;
pub mod tag;
pub mod value;
pub mod write;
