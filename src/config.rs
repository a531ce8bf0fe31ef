//! Project configuration. A `quern.yaml` file marks the project root; it is
//! found by walking up from the starting directory, so commands work from
//! anywhere inside the project:
//!
//! ```yaml
//! title: My Awesome Blog
//! site_root: https://blog.example.com/
//! author:
//!   name: A. Writer
//!   email: writer@example.com
//! ```
//!
//! Content and template locations default to `posts/` and `templates/`
//! next to the project file.

use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::fs::File;
use std::path::{Path, PathBuf};
use url::Url;

#[derive(Deserialize)]
struct PostsDirectory(PathBuf);
impl Default for PostsDirectory {
    fn default() -> Self {
        PostsDirectory(PathBuf::from("posts"))
    }
}

#[derive(Deserialize)]
struct PostsExtension(String);
impl Default for PostsExtension {
    fn default() -> Self {
        PostsExtension(".md".to_owned())
    }
}

#[derive(Deserialize)]
struct TemplateDirectory(PathBuf);
impl Default for TemplateDirectory {
    fn default() -> Self {
        TemplateDirectory(PathBuf::from("templates"))
    }
}

#[derive(Deserialize)]
struct FeedLength(usize);
impl Default for FeedLength {
    fn default() -> Self {
        FeedLength(10)
    }
}

/// The author credited in the Atom feed.
#[derive(Deserialize, Clone)]
pub struct Author {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Deserialize)]
struct Project {
    title: String,
    site_root: Url,

    #[serde(default)]
    author: Option<Author>,

    #[serde(default)]
    posts_directory: PostsDirectory,

    #[serde(default)]
    posts_extension: PostsExtension,

    #[serde(default)]
    template_directory: TemplateDirectory,

    #[serde(default)]
    feed_length: FeedLength,
}

/// Resolved configuration: relative paths from the project file are rooted
/// at its directory.
pub struct Config {
    pub title: String,
    pub site_root: Url,
    pub author: Option<Author>,
    pub posts_directory: PathBuf,
    pub posts_extension: String,
    pub template_directory: PathBuf,
    pub feed_length: usize,
}

/// The project file's name; its presence marks the project root.
pub const PROJECT_FILE: &str = "quern.yaml";

impl Config {
    /// Finds `quern.yaml` in `dir` or the nearest ancestor directory and
    /// loads it.
    pub fn from_directory(dir: &Path) -> Result<Config> {
        let path = dir.join(PROJECT_FILE);
        if path.exists() {
            match Config::from_project_file(&path) {
                Ok(config) => Ok(config),
                Err(e) => Err(anyhow!("Loading configuration: {:?}", e)),
            }
        } else {
            match dir.parent() {
                Some(parent) => Config::from_directory(parent),
                None => Err(anyhow!(
                    "Could not find `{}` in any parent directory",
                    PROJECT_FILE
                )),
            }
        }
    }

    /// Loads configuration from a specific project file.
    pub fn from_project_file(path: &Path) -> Result<Config> {
        let project: Project = serde_yaml::from_reader(open(path, "project")?)?;
        match path.parent() {
            None => Err(anyhow!(
                "Can't get parent directory for provided project file path '{:?}'",
                path
            )),
            Some(project_root) => Ok(Config {
                title: project.title,
                site_root: project.site_root,
                author: project.author,
                posts_directory: project_root.join(project.posts_directory.0),
                posts_extension: project.posts_extension.0,
                template_directory: project_root.join(project.template_directory.0),
                feed_length: project.feed_length.0,
            }),
        }
    }
}

fn open(path: &Path, kind: &str) -> Result<File> {
    match File::open(path) {
        Err(e) => Err(anyhow!("Opening {} file `{}`: {}", kind, path.display(), e)),
        Ok(file) => Ok(file),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::fs;

    const PROJECT: &str = "title: My Awesome Blog\nsite_root: https://blog.example.com/\nauthor:\n  name: A. Writer\n";

    #[test]
    fn test_from_project_file_defaults() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join(PROJECT_FILE);
        fs::write(&path, PROJECT)?;

        let config = Config::from_project_file(&path)?;
        assert_eq!(config.title, "My Awesome Blog");
        assert_eq!(config.posts_directory, dir.path().join("posts"));
        assert_eq!(config.posts_extension, ".md");
        assert_eq!(config.template_directory, dir.path().join("templates"));
        assert_eq!(config.feed_length, 10);
        assert_eq!(config.author.as_ref().map(|a| a.name.as_str()), Some("A. Writer"));
        Ok(())
    }

    #[test]
    fn test_from_directory_walks_up() -> Result<()> {
        let dir = tempfile::tempdir()?;
        fs::write(dir.path().join(PROJECT_FILE), PROJECT)?;
        let nested = dir.path().join("posts").join("2023");
        fs::create_dir_all(&nested)?;

        let config = Config::from_directory(&nested)?;
        assert_eq!(config.title, "My Awesome Blog");
        Ok(())
    }

    #[test]
    fn test_overrides() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join(PROJECT_FILE);
        fs::write(
            &path,
            "title: T\nsite_root: https://t.example.com/\nposts_directory: content\nposts_extension: .markdown\nfeed_length: 3\n",
        )?;

        let config = Config::from_project_file(&path)?;
        assert_eq!(config.posts_directory, dir.path().join("content"));
        assert_eq!(config.posts_extension, ".markdown");
        assert_eq!(config.feed_length, 3);
        assert!(config.author.is_none());
        Ok(())
    }
}
