//! Manually ordered lead-news list.
//!
//! The order only reaches the server on an explicit save; until then the
//! list tracks whether it diverged from what was loaded.

use crate::api::{LeadOrderEntry, Post};

#[derive(Debug, Clone, Default)]
pub struct LeadNewsList {
    articles: Vec<Post>,
    dirty: bool,
    /// Bumped on every reorder.
    revision: u64,
}

impl LeadNewsList {
    pub fn new(articles: Vec<Post>) -> Self {
        Self {
            articles,
            dirty: false,
            revision: 0,
        }
    }

    /// Replace the list with the server's copy.
    pub fn load(&mut self, articles: Vec<Post>) {
        self.articles = articles;
        self.dirty = false;
        self.revision += 1;
    }

    pub fn articles(&self) -> &[Post] {
        &self.articles
    }

    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Clear the dirty flag if the order is still the one saved at `revision`.
    pub fn mark_saved(&mut self, revision: u64) -> bool {
        if revision != self.revision {
            return false;
        }
        self.dirty = false;
        true
    }

    fn touch(&mut self) {
        self.dirty = true;
        self.revision += 1;
    }

    pub fn contains(&self, id: u64) -> bool {
        self.articles.iter().any(|a| a.id == id)
    }

    /// Drop the article at `from` onto the slot at `drop`.
    ///
    /// The dragged item is removed first, so when moving forward it lands
    /// one slot before `drop`. Equal or out-of-range indices do nothing.
    /// Returns the item's new index.
    pub fn move_item(&mut self, from: usize, drop: usize) -> Option<usize> {
        let len = self.articles.len();
        if from == drop || from >= len || drop >= len {
            return None;
        }

        let article = self.articles.remove(from);
        let insert_at = if from < drop { drop - 1 } else { drop };
        self.articles.insert(insert_at, article);
        self.touch();
        Some(insert_at)
    }

    /// Swap with the previous article. Returns the new index.
    pub fn move_up(&mut self, index: usize) -> Option<usize> {
        if index == 0 || index >= self.articles.len() {
            return None;
        }
        self.articles.swap(index - 1, index);
        self.touch();
        Some(index - 1)
    }

    /// Swap with the next article. Returns the new index.
    pub fn move_down(&mut self, index: usize) -> Option<usize> {
        if index + 1 >= self.articles.len() {
            return None;
        }
        self.articles.swap(index, index + 1);
        self.touch();
        Some(index + 1)
    }

    /// Drop an article locally, e.g. after the server removed it.
    pub fn remove(&mut self, id: u64) -> Option<Post> {
        let index = self.articles.iter().position(|a| a.id == id)?;
        Some(self.articles.remove(index))
    }

    /// Reorder body: ids with 1-based positions in current order.
    pub fn order(&self) -> Vec<LeadOrderEntry> {
        self.articles
            .iter()
            .enumerate()
            .map(|(index, article)| LeadOrderEntry {
                id: article.id,
                position: index + 1,
            })
            .collect()
    }
}
