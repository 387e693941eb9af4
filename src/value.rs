//! Converts [`PageContext`]s into the [`Value`]s templates are executed with.
//!
//! Every page gets these bindings:
//!
//! * `root`: the relative path back to the site root (`""` or `"../"`)
//! * `index_url`: the main index page
//! * `all_posts_url`, `all_tags_url`: those pages, or nil when not generated
//!
//! plus the bindings of its kind of [`Page`]:
//!
//! * post page: `post`, `prev` (the newer post or nil), `next` (the older
//!   post or nil)
//! * main index: `posts` (the latest posts), `all_posts`
//! * tag page: `tag_name` (as written by the newest post carrying it),
//!   `posts`
//! * all-tags page: `tags` (a list of `name`, `key`, `url` and `posts`,
//!   sorted by key) and `tag_index` (tag key to posts)
//! * all-posts page: `posts`
//!
//! A post is an object with `slug`, `title`, `date` (`YYYY-MM-DD` or nil),
//! `tldr` (or nil), `tags` (a list of `name`, `key` and `url`), `body`,
//! `summary`, `summarized` and `url`. All URLs are relative to the page being
//! rendered, and a tag's `url` is nil unless tag pages are generated.

use gtmpl::Value;
use std::collections::HashMap;

use crate::config::layout;
use crate::frontmatter::DATE_FORMAT;
use crate::post::Post;
use crate::render::{Page, PageContext, SiteLinks};
use crate::tag::Tag;

impl PageContext<'_> {
    /// Converts the context into a [`Value::Object`] for templating. See the
    /// module documentation for the bindings.
    pub fn to_value(&self) -> Value {
        let urls = Urls {
            root: self.root(),
            site: self.site,
        };

        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("root".to_owned(), Value::String(urls.root.to_owned()));
        m.insert("index_url".to_owned(), urls.page(true, layout::INDEX));
        m.insert(
            "all_posts_url".to_owned(),
            urls.page(self.site.all_posts_page, layout::ALL_POSTS),
        );
        m.insert(
            "all_tags_url".to_owned(),
            urls.page(self.site.all_tags_page, layout::ALL_TAGS),
        );

        match &self.page {
            Page::Post { post, prev, next } => {
                m.insert("post".to_owned(), urls.post_value(post));
                m.insert("prev".to_owned(), urls.optional_post(*prev));
                m.insert("next".to_owned(), urls.optional_post(*next));
            }
            Page::Index { posts, all_posts } => {
                m.insert("posts".to_owned(), urls.posts_value(posts));
                m.insert("all_posts".to_owned(), urls.posts_value(all_posts));
            }
            Page::Tag { tag_name, posts } => {
                m.insert("tag_name".to_owned(), Value::String((*tag_name).to_owned()));
                m.insert("posts".to_owned(), urls.posts_value(posts));
            }
            Page::AllTags { tag_index } => {
                let mut tags = Vec::with_capacity(tag_index.len());
                let mut index: HashMap<String, Value> = HashMap::new();
                for entry in tag_index.iter() {
                    let mut tag: HashMap<String, Value> = HashMap::new();
                    tag.insert("name".to_owned(), Value::String(entry.name.clone()));
                    tag.insert("key".to_owned(), Value::String(entry.key.clone()));
                    tag.insert("url".to_owned(), urls.tag(&entry.slug));
                    tag.insert("posts".to_owned(), urls.posts_value(&entry.posts));
                    tags.push(Value::Object(tag));
                    index.insert(entry.key.clone(), urls.posts_value(&entry.posts));
                }
                m.insert("tags".to_owned(), Value::Array(tags));
                m.insert("tag_index".to_owned(), Value::Object(index));
            }
            Page::AllPosts { posts } => {
                m.insert("posts".to_owned(), urls.posts_value(posts));
            }
        }
        Value::Object(m)
    }
}

/// Builds values whose URLs are relative to one page.
struct Urls<'a> {
    root: &'static str,
    site: &'a SiteLinks,
}

impl Urls<'_> {
    fn page(&self, enabled: bool, file_name: &str) -> Value {
        match enabled {
            true => Value::String(format!("{}{}", self.root, file_name)),
            false => Value::Nil,
        }
    }

    fn post_url(&self, post: &Post) -> String {
        format!("{}{}/{}.html", self.root, layout::POSTS, post.slug)
    }

    fn tag(&self, slug: &str) -> Value {
        match self.site.tag_pages {
            true => Value::String(format!("{}{}/{}.html", self.root, layout::TAGS, slug)),
            false => Value::Nil,
        }
    }

    fn tag_value(&self, tag: &Tag) -> Value {
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("name".to_owned(), Value::String(tag.name.clone()));
        m.insert("key".to_owned(), Value::String(tag.key.clone()));
        m.insert("url".to_owned(), self.tag(&tag.slug));
        Value::Object(m)
    }

    fn post_value(&self, post: &Post) -> Value {
        let option_to_value = |opt: Option<String>| match opt {
            Some(s) => Value::String(s),
            None => Value::Nil,
        };
        let (summary, summarized) = post.summary();

        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("slug".to_owned(), Value::String(post.slug.clone()));
        m.insert("title".to_owned(), Value::String(post.title.clone()));
        m.insert(
            "date".to_owned(),
            option_to_value(post.date.map(|d| d.format(DATE_FORMAT).to_string())),
        );
        m.insert("tldr".to_owned(), option_to_value(post.tldr.clone()));
        m.insert(
            "tags".to_owned(),
            Value::Array(post.tags.iter().map(|t| self.tag_value(t)).collect()),
        );
        m.insert("body".to_owned(), Value::String(post.body_html.clone()));
        m.insert("summary".to_owned(), Value::String(summary.to_owned()));
        m.insert("summarized".to_owned(), Value::Bool(summarized));
        m.insert("url".to_owned(), Value::String(self.post_url(post)));
        Value::Object(m)
    }

    fn optional_post(&self, post: Option<&Post>) -> Value {
        match post {
            Some(post) => self.post_value(post),
            None => Value::Nil,
        }
    }

    fn posts_value(&self, posts: &[&Post]) -> Value {
        Value::Array(posts.iter().map(|p| self.post_value(p)).collect())
    }
}
