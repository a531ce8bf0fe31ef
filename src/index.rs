//! Defines [`OrderedIndex`]: the repository's view of every known post,
//! keyed by URL path and iterable newest-first. A plain map holds the posts
//! and a separately maintained key list holds the order; every mutation
//! re-sorts the list, which is plenty for the hundreds of posts a blog has.

use crate::post::Post;
use std::collections::HashMap;

/// A mapping from URL path to [`Post`] whose iteration order is always
/// publication date descending. The key list and the map always hold
/// exactly the same key set.
#[derive(Default)]
pub struct OrderedIndex {
    items: HashMap<String, Post>,
    order: Vec<String>,
}

impl OrderedIndex {
    pub fn new() -> OrderedIndex {
        OrderedIndex::default()
    }

    /// Inserts or replaces the post at `key` and restores the newest-first
    /// order. The sort is stable, so posts sharing a date keep their
    /// relative insertion order; replacing a key never duplicates its order
    /// entry.
    pub fn set(&mut self, key: String, post: Post) {
        if self.items.insert(key.clone(), post).is_none() {
            self.order.push(key);
        }
        let items = &self.items;
        self.order.sort_by(|a, b| items[b].date().cmp(&items[a].date()));
    }

    pub fn get(&self, key: &str) -> Option<&Post> {
        self.items.get(key)
    }

    /// Removes the post at `key` from both the map and the order list; a
    /// no-op for unknown keys.
    pub fn remove(&mut self, key: &str) -> Option<Post> {
        let removed = self.items.remove(key);
        if removed.is_some() {
            self.order.retain(|k| k != key);
        }
        removed
    }

    /// Iterates over posts newest-first.
    pub fn values(&self) -> impl Iterator<Item = &Post> {
        self.order.iter().map(move |key| &self.items[key])
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
