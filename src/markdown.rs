//! Converts post bodies from Markdown to HTML.

use pulldown_cmark::{html, CowStr, Event, LinkType, Options, Parser, Tag};

use crate::link;

/// The HTML for a post body along with the posts it links to.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Html {
    pub body: String,

    /// Slugs of the posts referenced by relative Markdown links, in document
    /// order.
    pub links: Vec<String>,
}

/// Converts `markdown` to HTML. Relative links to other Markdown files are
/// rewritten to point at their post pages (see [`link::convert`]).
pub fn to_html(markdown: &str) -> Html {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_SMART_PUNCTUATION);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);

    let mut links = Vec::new();
    let events = Parser::new_ext(markdown, options).map(|ev| match ev {
        Event::Start(Tag::Link(
            link_type @ (LinkType::Inline
            | LinkType::Reference
            | LinkType::ReferenceUnknown
            | LinkType::Shortcut
            | LinkType::ShortcutUnknown
            | LinkType::Collapsed
            | LinkType::CollapsedUnknown),
            destination,
            title,
        )) => match link::convert(&destination) {
            Some(converted) => {
                links.push(converted.slug);
                Event::Start(Tag::Link(
                    link_type,
                    CowStr::Boxed(converted.destination.into_boxed_str()),
                    title,
                ))
            }
            None => Event::Start(Tag::Link(link_type, destination, title)),
        },
        _ => ev,
    });

    let mut body = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut body, events);
    Html { body, links }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_to_html() {
        let html = to_html("# Hello\n\nWorld");
        assert_eq!("<h1>Hello</h1>\n<p>World</p>\n", html.body);
        assert!(html.links.is_empty());
    }

    #[test]
    fn test_rewrites_post_links() {
        let html = to_html("See [the other post](other_post.md#top) and [docs](https://example.org/a.md).");
        assert_eq!(
            "<p>See <a href=\"other-post.html#top\">the other post</a> and <a href=\"https://example.org/a.md\">docs</a>.</p>\n",
            html.body
        );
        assert_eq!(vec![String::from("other-post")], html.links);
    }

    #[test]
    fn test_rewrites_reference_links() {
        let html = to_html("[first][1] and [again][1]\n\n[1]: first.md\n");
        assert_eq!(vec![String::from("first"), String::from("first")], html.links);
        assert!(html.body.contains("href=\"first.html\""));
    }

    #[test]
    fn test_extensions_enabled() {
        let html = to_html("~~gone~~\n\n| a |\n|---|\n| b |\n");
        assert!(html.body.contains("<del>gone</del>"));
        assert!(html.body.contains("<table>"));
    }
}
