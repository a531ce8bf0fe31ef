//! Defines the [`Repository`]: discovers posts under a content root, keeps
//! them in an [`OrderedIndex`], and answers lookups by URL path. In live
//! mode the cache is never trusted, so on-disk edits show up without a
//! restart; in frozen mode lookups are served from the index and only a
//! genuine miss touches the disk.

use crate::index::OrderedIndex;
use crate::post::Post;
use std::fmt;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};
use walkdir::WalkDir;

/// The post store for one content root. Collaborators (routes, the feed,
/// the freeze step) receive a reference to an explicitly constructed
/// instance; there is no ambient global.
pub struct Repository {
    root: PathBuf,
    extension: String,
    live_reload: bool,
    index: Mutex<OrderedIndex>,
}

impl Repository {
    /// Creates an empty repository for content files under `root` ending in
    /// `extension` (leading dot included, e.g. `.md`). With `live_reload`
    /// set, every lookup re-reads its file from disk and drafts are meant
    /// to be visible to callers.
    pub fn new<P, S>(root: P, extension: S, live_reload: bool) -> Repository
    where
        P: Into<PathBuf>,
        S: Into<String>,
    {
        Repository {
            root: root.into(),
            extension: extension.into(),
            live_reload,
            index: Mutex::new(OrderedIndex::new()),
        }
    }

    pub fn live_reload(&self) -> bool {
        self.live_reload
    }

    /// Walks the content root and indexes every file ending in the content
    /// extension. A root with no matching files leaves the index empty; an
    /// unreadable file or walk entry is logged and skipped without aborting
    /// the rest of the walk. Returns the number of indexed posts.
    pub fn discover_all(&self) -> usize {
        let mut index = self.lock();
        for entry in WalkDir::new(&self.root) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    crate::log!("repo"; "skipping unwalkable entry: {}", err);
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            if !entry.file_name().to_string_lossy().ends_with(&self.extension) {
                continue;
            }
            match Post::load(entry.path(), &self.root, &self.extension) {
                Ok(post) => index.set(post.url_path().to_owned(), post),
                Err(err) => {
                    crate::log!("repo"; "skipping {}: {}", entry.path().display(), err);
                }
            }
        }
        index.len()
    }

    /// Looks up a post by URL path. A cached entry is served as-is unless
    /// `live_reload` is set, in which case the file is re-read on every
    /// lookup and the fresh post overwrites the stale entry. A path with no
    /// corresponding readable file is [`Error::NotFound`].
    pub fn get(&self, url_path: &str) -> Result<Post> {
        let key = url_path.trim_matches('/');
        let mut index = self.lock();

        if !self.live_reload {
            if let Some(post) = index.get(key) {
                return Ok(post.clone());
            }
        }

        if key.is_empty() || key.split('/').any(|segment| segment == "..") {
            return Err(Error::NotFound(key.to_owned()));
        }
        let file = self.root.join(format!("{}{}", key, self.extension));
        if !file.is_file() {
            return Err(Error::NotFound(key.to_owned()));
        }
        let post = Post::load(&file, &self.root, &self.extension)
            .map_err(|_| Error::NotFound(key.to_owned()))?;
        index.set(post.url_path().to_owned(), post.clone());
        Ok(post)
    }

    /// Returns every indexed post newest-first, filtered to published posts
    /// unless `include_unpublished` is set (the preview server passes the
    /// live-reload flag here so drafts show up while writing; builds and
    /// feeds never do).
    pub fn all(&self, include_unpublished: bool) -> Vec<Post> {
        self.lock()
            .values()
            .filter(|post| include_unpublished || post.published())
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<OrderedIndex> {
        self.index.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Represents the result of a repository lookup.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a failed repository lookup.
#[derive(Debug)]
pub enum Error {
    /// Returned when a URL path has no corresponding content file (or its
    /// file became unreadable between discovery and the read). The routing
    /// layer renders this as a not-found response.
    NotFound(String),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::NotFound(url_path) => write!(f, "no post at `{}`", url_path),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        None
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::fs;
    use std::path::Path;

    fn write_post(dir: &Path, name: &str, content: &str) {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_discover_empty_root() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::new(dir.path(), ".md", false);
        assert_eq!(repo.discover_all(), 0);
        assert!(repo.is_empty());
    }

    #[test]
    fn test_discover_and_get_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        write_post(
            dir.path(),
            "2023-intro.md",
            "title: Intro\ndate: 2023-01-01\npublished: true\n\n# Hello\n",
        );
        write_post(dir.path(), "notes/scratch.txt", "not a post\n");

        let repo = Repository::new(dir.path(), ".md", false);
        assert_eq!(repo.discover_all(), 1);

        let post = repo.get("2023-intro").unwrap();
        assert_eq!(post.title(), "Intro");
        assert!(post.published());
        assert!(post.html().contains("<h1>Hello</h1>"));

        for discovered in repo.all(true) {
            let fetched = repo.get(discovered.url_path()).unwrap();
            assert_eq!(fetched.html(), discovered.html());
        }
    }

    #[test]
    fn test_get_missing_post() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::new(dir.path(), ".md", false);
        match repo.get("missing-post") {
            Err(Error::NotFound(path)) => assert_eq!(path, "missing-post"),
            other => panic!("expected NotFound, got {:?}", other.map(|p| p.url_path().to_owned())),
        }
    }

    #[test]
    fn test_get_rejects_parent_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::new(dir.path().join("posts"), ".md", false);
        fs::create_dir_all(dir.path().join("posts")).unwrap();
        write_post(dir.path(), "secret.md", "\ntop secret\n");

        assert!(repo.get("../secret").is_err());
    }

    #[test]
    fn test_ordering_of_all() {
        let dir = tempfile::tempdir().unwrap();
        write_post(
            dir.path(),
            "older.md",
            "date: 2023-01-01\npublished: true\n\nold\n",
        );
        write_post(
            dir.path(),
            "newer.md",
            "date: 2023-02-01\npublished: true\n\nnew\n",
        );

        let repo = Repository::new(dir.path(), ".md", false);
        repo.discover_all();

        let paths: Vec<String> = repo
            .all(false)
            .iter()
            .map(|p| p.url_path().to_owned())
            .collect();
        assert_eq!(paths, vec!["newer", "older"]);
    }

    #[test]
    fn test_draft_filtering() {
        let dir = tempfile::tempdir().unwrap();
        write_post(dir.path(), "live.md", "published: true\n\nlive\n");
        write_post(dir.path(), "draft.md", "\nwip\n");

        let repo = Repository::new(dir.path(), ".md", false);
        repo.discover_all();

        let published: Vec<String> = repo
            .all(false)
            .iter()
            .map(|p| p.url_path().to_owned())
            .collect();
        assert_eq!(published, vec!["live"]);
        assert_eq!(repo.all(true).len(), 2);
    }

    #[test]
    fn test_live_reload_picks_up_edits() {
        let dir = tempfile::tempdir().unwrap();
        write_post(dir.path(), "wip.md", "\nfirst draft\n");

        let repo = Repository::new(dir.path(), ".md", true);
        repo.discover_all();
        assert!(repo.get("wip").unwrap().html().contains("first draft"));

        write_post(dir.path(), "wip.md", "\nsecond draft\n");
        assert!(repo.get("wip").unwrap().html().contains("second draft"));
    }

    #[test]
    fn test_frozen_cache_serves_stale_entry() {
        let dir = tempfile::tempdir().unwrap();
        write_post(dir.path(), "stable.md", "\nfirst\n");

        let repo = Repository::new(dir.path(), ".md", false);
        repo.discover_all();
        assert!(repo.get("stable").unwrap().html().contains("first"));

        write_post(dir.path(), "stable.md", "\nsecond\n");
        assert!(repo.get("stable").unwrap().html().contains("first"));
    }

    #[test]
    fn test_cache_miss_loads_from_disk_when_frozen() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::new(dir.path(), ".md", false);
        repo.discover_all();

        write_post(dir.path(), "late.md", "\nlate arrival\n");
        let post = repo.get("late").unwrap();
        assert!(post.html().contains("late arrival"));
        assert_eq!(repo.len(), 1);
    }

    #[test]
    fn test_nested_posts_use_forward_slash_paths() {
        let dir = tempfile::tempdir().unwrap();
        write_post(dir.path(), "2023/deep/dive.md", "published: true\n\nbody\n");

        let repo = Repository::new(dir.path(), ".md", false);
        repo.discover_all();

        let post = repo.get("2023/deep/dive").unwrap();
        assert_eq!(post.url_path(), "2023/deep/dive");
    }
}
