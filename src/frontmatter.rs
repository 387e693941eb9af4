//! Splits a source document into its YAML frontmatter and its Markdown body,
//! and normalizes the frontmatter into a [`Frontmatter`] record.
//!
//! Frontmatter problems never abort a build. A field that can't be understood
//! is treated as absent and a [`MetadataWarning`] is reported instead.

use chrono::NaiveDate;
use serde_yaml::{Mapping, Value};

use crate::tag;

const FENCE: &str = "---";

/// The format of the `date` field.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// The recognized frontmatter fields. Unknown keys are dropped during
/// parsing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Frontmatter {
    /// The title of the post.
    pub title: Option<String>,

    /// The date of the post.
    pub date: Option<NaiveDate>,

    /// A short summary of the post.
    pub tldr: Option<String>,

    /// The tags as written in the source file, in order. Duplicates are kept.
    pub tags: Vec<String>,
}

/// The result of [`parse`]: the normalized frontmatter, the body that follows
/// it, and any problems found along the way.
#[derive(Debug, PartialEq)]
pub struct Parsed<'a> {
    pub frontmatter: Frontmatter,
    pub body: &'a str,
    pub warnings: Vec<MetadataWarning>,
}

/// A non-fatal problem with a post's frontmatter. The offending field (or tag
/// item) is ignored.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum MetadataWarning {
    /// The text between the fences isn't valid YAML. All fields default.
    #[error("frontmatter is not valid YAML: {0}")]
    InvalidYaml(String),

    /// The frontmatter is valid YAML but not a mapping. All fields default.
    #[error("frontmatter must be a mapping of keys to values")]
    NotAMapping,

    /// `date` isn't a `YYYY-MM-DD` calendar date.
    #[error("`date` must be a YYYY-MM-DD date, found `{0}`")]
    MalformedDate(String),

    /// `title` or `tldr` isn't a scalar.
    #[error("`{0}` must be a string")]
    NotAString(&'static str),

    /// `tags` is neither a list nor a single scalar.
    #[error("`tags` must be a list of strings")]
    TagsNotAList,

    /// A single `tags` item isn't a scalar or has no usable characters.
    #[error("ignoring tag `{0}`")]
    InvalidTag(String),
}

/// Parses `input` into frontmatter and body.
///
/// The frontmatter block is only recognized when the very first line is `---`
/// and a later line is `---` as well. Without a well-formed block every field
/// takes its default and the whole input is the body. With one, the body is
/// everything after the closing fence line.
///
/// ```md
/// ---
/// title: Hello, world!
/// date: 2021-04-16
/// tldr: A greeting.
/// tags: [greet]
/// ---
/// # Hello
///
/// World
/// ```
pub fn parse(input: &str) -> Parsed<'_> {
    let input = input.strip_prefix('\u{feff}').unwrap_or(input);
    match split(input) {
        None => Parsed {
            frontmatter: Frontmatter::default(),
            body: input,
            warnings: Vec::new(),
        },
        Some((yaml, body)) => {
            let mut warnings = Vec::new();
            let frontmatter = normalize(yaml, &mut warnings);
            Parsed {
                frontmatter,
                body,
                warnings,
            }
        }
    }
}

/// Returns the YAML between the fences and the body after the closing fence,
/// or `None` if `input` doesn't start with a complete frontmatter block.
fn split(input: &str) -> Option<(&str, &str)> {
    let (first, mut rest) = next_line(input)?;
    if !is_fence(first) {
        return None;
    }
    let yaml_start = input.len() - rest.len();
    loop {
        let (line, after) = next_line(rest)?;
        if is_fence(line) {
            let yaml_stop = input.len() - rest.len();
            return Some((&input[yaml_start..yaml_stop], after));
        }
        rest = after;
    }
}

fn next_line(s: &str) -> Option<(&str, &str)> {
    if s.is_empty() {
        return None;
    }
    Some(match s.find('\n') {
        Some(i) => (&s[..i], &s[i + 1..]),
        None => (s, ""),
    })
}

fn is_fence(line: &str) -> bool {
    line.trim_end() == FENCE
}

fn normalize(yaml: &str, warnings: &mut Vec<MetadataWarning>) -> Frontmatter {
    if yaml.trim().is_empty() {
        return Frontmatter::default();
    }

    let mapping = match serde_yaml::from_str::<Value>(yaml) {
        Ok(Value::Mapping(mapping)) => mapping,
        // a block holding nothing but comments
        Ok(Value::Null) => return Frontmatter::default(),
        Ok(_) => {
            warnings.push(MetadataWarning::NotAMapping);
            return Frontmatter::default();
        }
        Err(err) => {
            warnings.push(MetadataWarning::InvalidYaml(err.to_string()));
            return Frontmatter::default();
        }
    };

    let title = field(&mapping, "title").and_then(|v| string_field("title", v, warnings));
    let date = field(&mapping, "date").and_then(|v| date_field(v, warnings));
    let tldr = field(&mapping, "tldr").and_then(|v| string_field("tldr", v, warnings));
    let tags = field(&mapping, "tags")
        .map(|v| tags_field(v, warnings))
        .unwrap_or_default();

    Frontmatter {
        title,
        date,
        tldr,
        tags,
    }
}

fn field<'m>(mapping: &'m Mapping, key: &str) -> Option<&'m Value> {
    mapping.get(&Value::String(key.to_owned()))
}

/// Numbers and booleans are accepted where strings are expected, since YAML
/// happily turns `title: 1984` into an integer.
fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn string_field(
    key: &'static str,
    value: &Value,
    warnings: &mut Vec<MetadataWarning>,
) -> Option<String> {
    if let Value::Null = value {
        return None;
    }
    let s = scalar(value);
    if s.is_none() {
        warnings.push(MetadataWarning::NotAString(key));
    }
    s
}

fn date_field(value: &Value, warnings: &mut Vec<MetadataWarning>) -> Option<NaiveDate> {
    let raw = match value {
        Value::Null => return None,
        Value::String(s) => s.trim().to_owned(),
        other => scalar(other).unwrap_or_else(|| format!("{:?}", other)),
    };
    // chrono accepts unpadded fields like `2023-1-3`; only the canonical
    // spelling round-trips.
    match NaiveDate::parse_from_str(&raw, DATE_FORMAT) {
        Ok(date) if date.format(DATE_FORMAT).to_string() == raw => Some(date),
        _ => {
            warnings.push(MetadataWarning::MalformedDate(raw));
            None
        }
    }
}

fn tags_field(value: &Value, warnings: &mut Vec<MetadataWarning>) -> Vec<String> {
    let items = match value {
        Value::Null => return Vec::new(),
        Value::Sequence(items) => items.iter().collect::<Vec<_>>(),
        Value::Mapping(_) => {
            warnings.push(MetadataWarning::TagsNotAList);
            return Vec::new();
        }
        single => vec![single],
    };

    let mut tags = Vec::with_capacity(items.len());
    for item in items {
        match scalar(item) {
            Some(name) if !tag::page_slug(&name).is_empty() => {
                tags.push(name.trim().to_owned())
            }
            Some(name) => warnings.push(MetadataWarning::InvalidTag(name)),
            None => warnings.push(MetadataWarning::InvalidTag(format!("{:?}", item))),
        }
    }
    tags
}
