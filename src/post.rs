//! Defines the [`Post`] type: one content file parsed into an open metadata
//! mapping plus a markdown body, with derived fields (URL path identity,
//! typed metadata accessors, lazily rendered HTML).

use crate::{frontmatter, markdown};
use chrono::{Local, NaiveDate};
use serde_yaml::{Mapping, Value};
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::OnceLock;

/// The date format accepted in a post's `date` metadata field.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Represents one content file. A post is immutable once loaded except for
/// its lazily rendered HTML; picking up an on-disk edit means loading a new
/// [`Post`] for the same file.
#[derive(Clone, Debug)]
pub struct Post {
    /// The post's URL identity: its path relative to the content root with
    /// the file extension stripped and separators normalized to `/`. No two
    /// posts in a repository share a `url_path`.
    url_path: String,

    /// Where the post was loaded from; the source of truth for reloads.
    file_path: PathBuf,

    /// The parsed metadata header. Keys the generator doesn't recognize are
    /// kept and exposed to templates untouched.
    metadata: Mapping,

    /// The markdown body (everything after the metadata header).
    body: String,

    /// The publication date used when the header doesn't set one: the day
    /// the post was loaded.
    loaded: NaiveDate,

    /// The rendered HTML, computed on first access.
    html: OnceLock<String>,
}

impl Post {
    /// Loads a post from `file_path`, which must live under `root` and end
    /// with `extension`. The file is read once; a malformed metadata header
    /// is logged and replaced with an empty mapping so the post still loads
    /// with defaulted fields. An unreadable file is an error for the caller.
    pub fn load(file_path: &Path, root: &Path, extension: &str) -> io::Result<Post> {
        let content = fs::read_to_string(file_path)?;
        let (header, body) = frontmatter::split(&content);
        let metadata = match frontmatter::parse_header(header) {
            Ok(mapping) => mapping,
            Err(err) => {
                crate::log!("post"; "{}: {}; loading with empty metadata", file_path.display(), err);
                Mapping::new()
            }
        };

        Ok(Post {
            url_path: url_path_for(file_path, root, extension),
            file_path: file_path.to_owned(),
            metadata,
            body: body.to_owned(),
            loaded: Local::now().date_naive(),
            html: OnceLock::new(),
        })
    }

    pub fn url_path(&self) -> &str {
        &self.url_path
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    /// The full metadata mapping, recognized keys and opaque ones alike.
    pub fn metadata(&self) -> &Mapping {
        &self.metadata
    }

    /// The site-relative URL for the post's page.
    pub fn url(&self) -> String {
        format!("/blog/{}/", self.url_path)
    }

    /// The post's title: the `title` metadata field, or a humanized form of
    /// the file name (`some-first_post` becomes `Some First Post`).
    pub fn title(&self) -> String {
        match self.meta_str("title") {
            Some(title) => title.to_owned(),
            None => humanize(self.url_path.rsplit('/').next().unwrap_or(&self.url_path)),
        }
    }

    /// The `subtitle` metadata field, if present. Feeds combine it with the
    /// title; templates may use it independently.
    pub fn subtitle(&self) -> Option<&str> {
        self.meta_str("subtitle")
    }

    /// The publication date: the `date` metadata field (`YYYY-MM-DD`), or
    /// the day the post was loaded. An unparseable date falls back the same
    /// way as a missing one.
    pub fn date(&self) -> NaiveDate {
        self.meta_str("date")
            .and_then(|s| NaiveDate::parse_from_str(s, DATE_FORMAT).ok())
            .unwrap_or(self.loaded)
    }

    /// Whether the post is published. Defaults to `false`, so drafts are the
    /// default and publishing is opt-in.
    pub fn published(&self) -> bool {
        self.meta("published").and_then(Value::as_bool).unwrap_or(false)
    }

    /// The rendered HTML body. Computed from the buffered markdown on first
    /// access and cached for the lifetime of this instance.
    pub fn html(&self) -> &str {
        self.html.get_or_init(|| markdown::to_html(&self.body))
    }

    fn meta(&self, key: &str) -> Option<&Value> {
        self.metadata.get(&Value::String(key.to_owned()))
    }

    fn meta_str(&self, key: &str) -> Option<&str> {
        self.meta(key).and_then(Value::as_str)
    }

    /// Converts the post into a template value. Every metadata key is passed
    /// through opaquely; the computed fields (`url_path`, `url`, `title`,
    /// `date`, `date_iso`, `published`, `html`) are overlaid afterwards so
    /// metadata can never clobber the post's identity or derived state.
    pub fn to_value(&self) -> gtmpl::Value {
        use std::collections::HashMap;

        let mut m: HashMap<String, gtmpl::Value> = HashMap::new();
        for (key, value) in &self.metadata {
            if let Some(key) = value_key(key) {
                m.insert(key, crate::value::from_yaml(value));
            }
        }
        m.insert("url_path".to_owned(), gtmpl::Value::from(self.url_path()));
        m.insert("url".to_owned(), gtmpl::Value::from(self.url()));
        m.insert("title".to_owned(), gtmpl::Value::from(self.title()));
        m.insert(
            "date".to_owned(),
            gtmpl::Value::from(self.date().format("%B %d, %Y").to_string()),
        );
        m.insert(
            "date_iso".to_owned(),
            gtmpl::Value::from(self.date().format(DATE_FORMAT).to_string()),
        );
        m.insert("published".to_owned(), gtmpl::Value::Bool(self.published()));
        m.insert("html".to_owned(), gtmpl::Value::from(self.html()));
        gtmpl::Value::Object(m)
    }
}

/// Template object keys must be strings; YAML mapping keys usually are, and
/// anything else is dropped rather than coerced.
fn value_key(key: &Value) -> Option<String> {
    key.as_str().map(str::to_owned)
}

/// Derives a post's URL path from its file path: the `root` prefix is
/// stripped, OS separators become `/`, and the trailing `extension` is
/// removed.
fn url_path_for(file_path: &Path, root: &Path, extension: &str) -> String {
    let relative = file_path.strip_prefix(root).unwrap_or(file_path);
    let joined = relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(segment) => Some(segment.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/");
    let trimmed = joined.strip_suffix(extension).unwrap_or(&joined);
    trimmed.trim_matches('/').to_owned()
}

/// Turns a file stem into a display title: `-` and `_` become spaces and
/// each word is title-cased.
fn humanize(stem: &str) -> String {
    stem.split(|c| c == '-' || c == '_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
