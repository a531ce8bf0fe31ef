//! Splits a post source file into its metadata header and its body, and
//! parses the header as YAML. The header is every leading line up to the
//! first blank line; the body is everything after it:
//!
//! ```md
//! title: Hello, world!
//! date: 2021-04-16
//! published: true
//!
//! # Hello
//!
//! World
//! ```
//!
//! Unlike fenced front matter there is no delimiter syntax to get wrong, so
//! the only failure mode is a header that isn't a YAML mapping. Callers are
//! expected to recover from that by substituting an empty mapping so a
//! degenerate header never prevents a post from loading.

use serde_yaml::{Mapping, Value};
use std::fmt;

/// Splits raw file content into `(header, body)` at the first blank line.
/// The blank line itself belongs to neither part. Content without any blank
/// line is all header; content starting with a blank line has an empty
/// header.
pub fn split(content: &str) -> (&str, &str) {
    let mut offset = 0;
    for line in content.split_inclusive('\n') {
        if line.trim().is_empty() {
            return (&content[..offset], &content[offset + line.len()..]);
        }
        offset += line.len();
    }
    (content, "")
}

/// Parses a header block into a YAML [`Mapping`]. An empty header yields an
/// empty mapping. A header that parses to anything other than a mapping
/// (a bare scalar, a list) is an [`Error::NotAMapping`].
pub fn parse_header(header: &str) -> Result<Mapping> {
    if header.trim().is_empty() {
        return Ok(Mapping::new());
    }
    match serde_yaml::from_str::<Value>(header)? {
        Value::Mapping(mapping) => Ok(mapping),
        Value::Null => Ok(Mapping::new()),
        other => Err(Error::NotAMapping(type_name(&other))),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
    }
}

/// Represents the result of a header-parse operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error parsing a metadata header.
#[derive(Debug)]
pub enum Error {
    /// Returned when the header is not valid YAML at all.
    Yaml(serde_yaml::Error),

    /// Returned when the header parses to a non-mapping document. Carries
    /// the name of the type the document actually parsed to.
    NotAMapping(&'static str),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Yaml(err) => err.fmt(f),
            Error::NotAMapping(found) => {
                write!(f, "metadata header must be a mapping, found a {}", found)
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Yaml(err) => Some(err),
            Error::NotAMapping(_) => None,
        }
    }
}

impl From<serde_yaml::Error> for Error {
    /// Converts a [`serde_yaml::Error`] into an [`Error`]. It allows us to
    /// use the `?` operator for [`serde_yaml`] deserialization functions.
    fn from(err: serde_yaml::Error) -> Error {
        Error::Yaml(err)
    }
}
