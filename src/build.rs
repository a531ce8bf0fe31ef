//! Exports the [`build_site`] function, which freezes the blog into a
//! static file tree: the index page at the root, one directory per
//! published post mirroring the live `/blog/<path>/` route, and the Atom
//! feed at `feed.atom`. The result is servable by any static file server
//! with directory-index resolution.

use crate::config::Config;
use crate::feed::{self, Error as FeedError};
use crate::render::{Error as RenderError, Renderer};
use crate::repo::Repository;
use std::fmt;
use std::fs;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Builds the site into `output_directory`. The repository must have been
/// constructed without live reload so only published content is captured;
/// discovery runs here, so a freshly constructed repository is fine.
pub fn build_site(repo: &Repository, config: &Config, output_directory: &Path) -> Result<()> {
    let discovered = repo.discover_all();
    let posts = repo.all(false);
    crate::log!("build"; "rendering {} published posts ({} discovered)", posts.len(), discovered);

    let renderer = Renderer::from_directory(&config.template_directory)?;

    // Blow away the old post tree so renamed posts don't leave stale pages
    // behind. The rest of the output directory is left alone; the user may
    // keep other files there (CNAME and friends).
    rmdir(&output_directory.join("blog"))?;
    fs::create_dir_all(output_directory)?;

    fs::write(
        output_directory.join("index.html"),
        renderer.render_index(&posts, config)?,
    )?;

    for post in &posts {
        let dir = output_directory.join("blog").join(post.url_path());
        fs::create_dir_all(&dir)?;
        fs::write(dir.join("index.html"), renderer.render_post(post, config)?)?;
    }

    feed::write_feed(
        config,
        &posts,
        File::create(output_directory.join("feed.atom"))?,
    )?;

    Ok(())
}

fn rmdir(dir: &Path) -> Result<()> {
    match fs::remove_dir_all(dir) {
        Ok(x) => Ok(x),
        Err(e) => match e.kind() {
            std::io::ErrorKind::NotFound => Ok(()),
            _ => Err(Error::Clean {
                path: dir.to_owned(),
                err: e,
            }),
        },
    }
}

/// Represents the result of a site build.
pub type Result<T> = std::result::Result<T, Error>;

/// The error type for building a site. Errors can be during rendering,
/// cleaning the output tree, writing the feed, and other I/O.
#[derive(Debug)]
pub enum Error {
    /// Returned for template loading and rendering errors.
    Render(RenderError),

    /// Returned for I/O problems while cleaning the old post tree.
    Clean { path: PathBuf, err: std::io::Error },

    /// Returned for errors writing the feed.
    Feed(FeedError),

    /// Returned for other I/O errors.
    Io(std::io::Error),
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Render(err) => err.fmt(f),
            Error::Clean { path, err } => {
                write!(f, "Cleaning directory '{}': {}", path.display(), err)
            }
            Error::Feed(err) => err.fmt(f),
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Render(err) => Some(err),
            Error::Clean { path: _, err } => Some(err),
            Error::Feed(err) => Some(err),
            Error::Io(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for Error {
    /// Converts [`std::io::Error`]s into [`Error`]. This allows us to use
    /// the `?` operator.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<RenderError> for Error {
    /// Converts [`RenderError`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: RenderError) -> Error {
        Error::Render(err)
    }
}

impl From<FeedError> for Error {
    /// Converts [`FeedError`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: FeedError) -> Error {
        Error::Feed(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::path::Path;

    fn project(dir: &Path) -> Config {
        let posts = dir.join("posts");
        let templates = dir.join("templates");
        fs::create_dir_all(&posts).unwrap();
        fs::create_dir_all(&templates).unwrap();
        fs::write(
            templates.join("index.html"),
            "{{range .posts}}<a href=\"{{.url}}\">{{.title}}</a>{{end}}",
        )
        .unwrap();
        fs::write(templates.join("post.html"), "{{.post.html}}").unwrap();

        Config {
            title: "Test Blog".to_owned(),
            site_root: url::Url::parse("https://example.com/").unwrap(),
            author: None,
            posts_directory: posts,
            posts_extension: ".md".to_owned(),
            template_directory: templates,
            feed_length: 10,
        }
    }

    #[test]
    fn test_build_site_layout() -> Result<()> {
        let dir = tempfile::tempdir().unwrap();
        let config = project(dir.path());
        fs::write(
            config.posts_directory.join("hello.md"),
            "published: true\ndate: 2023-01-01\n\n# Hello\n",
        )?;
        fs::write(config.posts_directory.join("draft.md"), "\nwip\n")?;

        let output = dir.path().join("build");
        let repo = Repository::new(&config.posts_directory, ".md", false);
        build_site(&repo, &config, &output)?;

        assert!(output.join("index.html").is_file());
        assert!(output.join("feed.atom").is_file());
        assert!(output.join("blog/hello/index.html").is_file());
        assert!(!output.join("blog/draft").exists());

        let page = fs::read_to_string(output.join("blog/hello/index.html"))?;
        assert!(page.contains("<h1>Hello</h1>"));
        Ok(())
    }

    #[test]
    fn test_rebuild_drops_stale_pages() -> Result<()> {
        let dir = tempfile::tempdir().unwrap();
        let config = project(dir.path());
        let output = dir.path().join("build");

        fs::write(
            config.posts_directory.join("old-name.md"),
            "published: true\n\nbody\n",
        )?;
        let repo = Repository::new(&config.posts_directory, ".md", false);
        build_site(&repo, &config, &output)?;
        assert!(output.join("blog/old-name/index.html").is_file());

        fs::rename(
            config.posts_directory.join("old-name.md"),
            config.posts_directory.join("new-name.md"),
        )?;
        let repo = Repository::new(&config.posts_directory, ".md", false);
        build_site(&repo, &config, &output)?;
        assert!(!output.join("blog/old-name").exists());
        assert!(output.join("blog/new-name/index.html").is_file());
        Ok(())
    }
}
