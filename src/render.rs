//! Template rendering for the index and post pages. Templates live in the
//! project's template directory as `index.html` and `post.html` and use the
//! template engine's standard syntax; both receive `site_title`,
//! `site_root`, and `feed_url` alongside their own data (`posts` for the
//! index, `post` for a post page).

use crate::config::Config;
use crate::post::Post;
use gtmpl::{Template, Value};
use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

/// Holds the parsed index and post templates for a project.
pub struct Renderer {
    index: Template,
    post: Template,
}

impl Renderer {
    /// Parses `index.html` and `post.html` from the template directory.
    pub fn from_directory(template_directory: &Path) -> Result<Renderer> {
        Ok(Renderer {
            index: parse_template(&template_directory.join("index.html"))?,
            post: parse_template(&template_directory.join("post.html"))?,
        })
    }

    /// Renders the index page for an already ordered, already filtered post
    /// list.
    pub fn render_index(&self, posts: &[Post], config: &Config) -> Result<String> {
        let mut page = site_fields(config);
        page.insert(
            "posts".to_owned(),
            Value::Array(posts.iter().map(Post::to_value).collect()),
        );
        execute(&self.index, Value::Object(page))
    }

    /// Renders one post's page.
    pub fn render_post(&self, post: &Post, config: &Config) -> Result<String> {
        let mut page = site_fields(config);
        page.insert("post".to_owned(), post.to_value());
        execute(&self.post, Value::Object(page))
    }
}

fn site_fields(config: &Config) -> HashMap<String, Value> {
    let mut m: HashMap<String, Value> = HashMap::new();
    m.insert("site_title".to_owned(), Value::from(config.title.as_str()));
    m.insert(
        "site_root".to_owned(),
        Value::String(config.site_root.to_string()),
    );
    m.insert("feed_url".to_owned(), Value::from("/feed.atom"));
    m
}

// Loads the template file contents and parses the result into a template.
fn parse_template(template_file: &Path) -> Result<Template> {
    let mut contents = String::new();
    {
        use std::io::Read;
        File::open(template_file)
            .map_err(|e| Error::OpenTemplateFile {
                path: template_file.to_owned(),
                err: e,
            })?
            .read_to_string(&mut contents)?;
    }

    let mut template = Template::default();
    template.parse(&contents).map_err(Error::ParseTemplate)?;
    Ok(template)
}

fn execute(template: &Template, value: Value) -> Result<String> {
    let mut out: Vec<u8> = Vec::new();
    template.execute(&mut out, &gtmpl::Context::from(value).unwrap())?;
    Ok(String::from_utf8_lossy(&out).into_owned())
}

/// Represents the result of a template operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error loading, parsing, or executing templates.
#[derive(Debug)]
pub enum Error {
    /// Returned for I/O problems while opening template files.
    OpenTemplateFile { path: PathBuf, err: io::Error },

    /// Returned for errors parsing template files.
    ParseTemplate(String),

    /// Returned for errors executing a template against a page value.
    Execute(String),

    /// Returned for other I/O errors.
    Io(io::Error),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::OpenTemplateFile { path, err } => {
                write!(f, "Opening template file '{}': {}", path.display(), err)
            }
            Error::ParseTemplate(err) => err.fmt(f),
            Error::Execute(err) => err.fmt(f),
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::OpenTemplateFile { path: _, err } => Some(err),
            Error::ParseTemplate(_) => None,
            Error::Execute(_) => None,
            Error::Io(err) => Some(err),
        }
    }
}

impl From<String> for Error {
    /// Converts a template-execution error message into an [`Error`]. This
    /// allows us to use the `?` operator for template operations.
    fn from(err: String) -> Error {
        Error::Execute(err)
    }
}

impl From<io::Error> for Error {
    /// Converts an [`io::Error`] into an [`Error`]. This allows us to use
    /// the `?` operator for fallible I/O operations.
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}
