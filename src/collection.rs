//! Defines [`PostCollection`], which owns every [`Post`] of a build and hands
//! out views of them in a stable order.

use std::cmp::Ordering;
use std::collections::hash_map::{Entry, HashMap};
use std::path::PathBuf;

use crate::post::Post;

/// Owns the posts of a single build. Posts are appended while the source
/// files are parsed; afterwards the collection is only ever borrowed.
#[derive(Debug, Default)]
pub struct PostCollection {
    posts: Vec<Post>,

    /// Maps each slug to its index in `posts`.
    slugs: HashMap<String, usize>,
}

impl PostCollection {
    pub fn new() -> PostCollection {
        PostCollection::default()
    }

    /// Appends `post`. Fails if another post already has the same slug, since
    /// one of the two pages would silently overwrite the other.
    pub fn add(&mut self, post: Post) -> Result<(), SlugCollision> {
        match self.slugs.entry(post.slug.clone()) {
            Entry::Occupied(entry) => Err(SlugCollision {
                first: self.posts[*entry.get()].source_path.clone(),
                second: post.source_path,
                slug: post.slug,
            }),
            Entry::Vacant(entry) => {
                entry.insert(self.posts.len());
                self.posts.push(post);
                Ok(())
            }
        }
    }

    /// All posts, newest first. Undated posts come after every dated post and
    /// posts with the same date are ordered by slug, so the order only depends
    /// on the posts themselves and not on the order they were added in.
    pub fn sorted(&self) -> Vec<&Post> {
        let mut posts: Vec<&Post> = self.posts.iter().collect();
        posts.sort_by(|a, b| chronological(a, b));
        posts
    }

    /// The first `n` posts of [`PostCollection::sorted`], or all of them if
    /// there are fewer than `n`.
    pub fn latest(&self, n: usize) -> Vec<&Post> {
        let mut posts = self.sorted();
        posts.truncate(n);
        posts
    }

    pub fn get(&self, slug: &str) -> Option<&Post> {
        self.slugs.get(slug).map(|&i| &self.posts[i])
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }
}

/// Orders posts newest first, then undated, with ties broken by slug.
pub fn chronological(a: &Post, b: &Post) -> Ordering {
    // `None` sorts before `Some`, so reversing puts undated posts last
    b.date.cmp(&a.date).then_with(|| a.slug.cmp(&b.slug))
}

/// Returned when two source files normalize to the same slug.
#[derive(Debug, thiserror::Error)]
#[error(
    "`{}` and `{}` would both be written as post `{slug}`",
    first.display(),
    second.display()
)]
pub struct SlugCollision {
    pub slug: String,

    /// The source file that claimed the slug first.
    pub first: PathBuf,

    /// The source file that was rejected.
    pub second: PathBuf,
}
