//! Support for creating Atom feeds from the repository's published posts.

use crate::config::{Author, Config};
use crate::post::Post;
use atom_syndication::{Content, Entry, Error as AtomError, Feed, Link, Person};
use chrono::{NaiveTime, Utc};
use std::collections::BTreeMap;
use std::fmt;
use std::io::Write;

/// Creates a feed from the site configuration and an ordered, published-only
/// post list, and writes the result to a [`std::io::Write`]. Only the first
/// `feed_length` posts are included.
pub fn write_feed<W: Write>(config: &Config, posts: &[Post], w: W) -> Result<()> {
    feed(config, posts)?.write_to(w)?;
    Ok(())
}

fn feed(config: &Config, posts: &[Post]) -> Result<Feed> {
    let recent = &posts[..posts.len().min(config.feed_length)];
    Ok(Feed {
        entries: feed_entries(config, recent),
        title: config.title.clone().into(),
        id: config.site_root.to_string(),
        updated: Utc::now().fixed_offset(),
        authors: author_to_people(config.author.clone()),
        categories: Vec::new(),
        contributors: Vec::new(),
        generator: None,
        icon: None,
        logo: None,
        rights: None,
        subtitle: None,
        base: None,
        lang: None,
        extensions: BTreeMap::new(),
        namespaces: BTreeMap::new(),
        links: vec![Link {
            href: config.site_root.to_string(),
            rel: "alternate".to_string(),
            title: None,
            hreflang: None,
            mime_type: None,
            length: None,
        }],
    })
}

fn feed_entries(config: &Config, posts: &[Post]) -> Vec<Entry> {
    let mut entries: Vec<Entry> = Vec::with_capacity(posts.len());

    for post in posts {
        // Post URLs are site-relative; the feed needs them absolute.
        let url = match config.site_root.join(&post.url()) {
            Ok(url) => url.to_string(),
            Err(_) => format!("{}{}", config.site_root, post.url().trim_start_matches('/')),
        };
        let date = post.date().and_time(NaiveTime::MIN).and_utc().fixed_offset();

        entries.push(Entry {
            id: url.clone(),
            title: entry_title(post).into(),
            updated: date,
            authors: author_to_people(config.author.clone()),
            links: vec![Link {
                href: url,
                rel: "alternate".to_owned(),
                title: None,
                mime_type: None,
                hreflang: None,
                length: None,
            }],
            rights: None,
            summary: None,
            categories: Vec::new(),
            contributors: Vec::new(),
            published: Some(date),
            source: None,
            content: Some(Content {
                base: None,
                lang: None,
                value: Some(post.html().to_owned()),
                src: None,
                content_type: Some("html".to_owned()),
            }),
            extensions: BTreeMap::new(),
        })
    }
    entries
}

/// An entry's title is `"{title}: {subtitle}"` when the post has a subtitle
/// and just the title otherwise.
fn entry_title(post: &Post) -> String {
    match post.subtitle() {
        Some(subtitle) => format!("{}: {}", post.title(), subtitle),
        None => post.title(),
    }
}

fn author_to_people(author: Option<Author>) -> Vec<Person> {
    match author {
        Some(author) => vec![Person {
            name: author.name,
            email: author.email,
            uri: None,
        }],
        None => Vec::new(),
    }
}

/// Represents the result of a feed operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a problem creating a feed.
#[derive(Debug)]
pub enum Error {
    /// Returned when there is a generic I/O error.
    Io(std::io::Error),

    /// Returned when there is an Atom-related error.
    Atom(AtomError),
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Io(err) => err.fmt(f),
            Error::Atom(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Atom(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for Error {
    /// Converts [`std::io::Error`]s into [`Error`]. This allows us to use
    /// the `?` operator in fallible feed operations.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<AtomError> for Error {
    /// Converts [`AtomError`]s into [`Error`]. This allows us to use the
    /// `?` operator in fallible feed operations.
    fn from(err: AtomError) -> Error {
        Error::Atom(err)
    }
}
