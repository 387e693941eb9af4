//! Defines the [`Tag`] type, which represents a [`crate::post::Post`] tag, and
//! the [`TagIndex`] which groups posts by tag.

use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

use crate::collection::PostCollection;
use crate::post::Post;

/// Represents a [`crate::post::Post`] tag.
#[derive(Clone, Debug)]
pub struct Tag {
    /// The tag as it was written in the post's frontmatter.
    pub name: String,

    /// The normalized tag, so e.g., `macOS` and `MacOS ` resolve to the same
    /// value. See [`normalize`].
    pub key: String,

    /// The file stem of the tag's page. See [`page_slug`].
    pub slug: String,
}

impl Tag {
    pub fn new(name: &str) -> Tag {
        let key = normalize(name);
        Tag {
            name: name.trim().to_owned(),
            slug: page_slug(&key),
            key,
        }
    }
}

impl Hash for Tag {
    /// Implements [`Hash`] for [`Tag`] by delegating directly to the `key`
    /// field.
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state)
    }
}

impl PartialEq for Tag {
    /// Implements [`PartialEq`] and [`Eq`] for [`Tag`] by delegating directly
    /// to the `key` field.
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}
impl Eq for Tag {}

/// Normalizes a tag name into its key: trimmed, lowercased, with every run of
/// whitespace collapsed into a single space. Punctuation is kept, so `C`,
/// `C++` and `C#` stay distinct.
pub fn normalize(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// The file stem of a tag's page: the slugified tag. Returns an empty string
/// for tags without any alphanumeric characters, which can't have a page.
pub fn page_slug(name: &str) -> String {
    slug::slugify(name)
}

/// One tag of a [`TagIndex`] and the posts carrying it.
#[derive(Debug)]
pub struct TagEntry<'a> {
    /// The normalized tag.
    pub key: String,

    /// The tag as written by the newest post carrying it.
    pub name: String,

    /// The file stem of the tag's page.
    pub slug: String,

    pub posts: Vec<&'a Post>,
}

/// Maps each tag key to the posts carrying that tag. Built once from a
/// [`PostCollection`] and never modified afterwards.
#[derive(Debug)]
pub struct TagIndex<'a> {
    tags: BTreeMap<String, TagEntry<'a>>,
}

impl<'a> TagIndex<'a> {
    /// Indexes `posts` by tag. Each tag's posts come out in the same order as
    /// [`PostCollection::sorted`], and a post that lists the same tag twice
    /// (in any spelling) appears in that tag's bucket only once.
    pub fn new(posts: &'a PostCollection) -> TagIndex<'a> {
        let mut tags: BTreeMap<String, TagEntry<'a>> = BTreeMap::new();
        for post in posts.sorted() {
            for tag in post.tags.iter().filter(|t| !t.key.is_empty()) {
                let entry = tags.entry(tag.key.clone()).or_insert_with(|| TagEntry {
                    key: tag.key.clone(),
                    name: tag.name.clone(),
                    slug: tag.slug.clone(),
                    posts: Vec::new(),
                });
                // posts arrive in order, so a repeat can only be the last one
                if entry.posts.last().map_or(true, |last| last.slug != post.slug) {
                    entry.posts.push(post);
                }
            }
        }
        TagIndex { tags }
    }

    /// All tag keys in alphabetical order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.tags.keys().map(String::as_str)
    }

    /// The entry for `tag`, which may be given in any spelling that
    /// normalizes to the tag's key.
    pub fn get(&self, tag: &str) -> Option<&TagEntry<'a>> {
        self.tags.get(&normalize(tag))
    }

    /// The posts for `tag`. See [`TagIndex::get`].
    pub fn posts(&self, tag: &str) -> Option<&[&'a Post]> {
        self.get(tag).map(|entry| entry.posts.as_slice())
    }

    /// The tags alphabetically by key.
    pub fn iter(&self) -> impl Iterator<Item = &TagEntry<'a>> {
        self.tags.values()
    }

    /// Fails if two different tags would be written to the same tag page.
    pub fn check_pages(&self) -> Result<(), TagCollision> {
        let mut pages: BTreeMap<&str, &TagEntry<'a>> = BTreeMap::new();
        for entry in self.tags.values() {
            if let Some(first) = pages.insert(&entry.slug, entry) {
                return Err(TagCollision {
                    slug: entry.slug.clone(),
                    first: first.name.clone(),
                    second: entry.name.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

/// Returned when two different tags slugify to the same page name.
#[derive(Debug, thiserror::Error)]
#[error("tags `{first}` and `{second}` would both be written as tag page `{slug}`")]
pub struct TagCollision {
    pub slug: String,
    pub first: String,
    pub second: String,
}
