//! In-memory view of the collection plus the client-only star annotations.
//!
//! # Design
//! The store is the single source of truth for what gets rendered and its
//! mutation methods are the only way to change it. Every mutation is keyed
//! by `ItemId` and none of them can leave two items with the same id.
//! Unknown ids are absorbed as no-ops so late-arriving responses for items
//! that have since disappeared are harmless.

use std::collections::HashSet;

use crate::types::{Item, ItemId, ItemPatch};

#[derive(Debug, Clone, Default)]
pub struct ItemStore {
    items: Vec<Item>,
    starred: HashSet<ItemId>,
}

impl ItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a freshly loaded collection. Later duplicates of an id are
    /// dropped, and stars on ids that are no longer present are forgotten.
    pub fn replace_all(&mut self, items: Vec<Item>) {
        let mut seen = HashSet::with_capacity(items.len());
        self.items = items
            .into_iter()
            .filter(|item| seen.insert(item.id.clone()))
            .collect();
        self.starred.retain(|id| seen.contains(id));
    }

    /// Insert at the front. An existing item with the same id is replaced.
    pub fn prepend(&mut self, item: Item) {
        self.items.retain(|existing| existing.id != item.id);
        self.items.insert(0, item);
    }

    /// Drop the item and its star. Returns whether an item was removed.
    pub fn remove(&mut self, id: &ItemId) -> bool {
        self.starred.remove(id);
        let before = self.items.len();
        self.items.retain(|item| &item.id != id);
        self.items.len() != before
    }

    /// Merge `patch` into the matching item. Returns whether one matched.
    pub fn patch(&mut self, id: &ItemId, patch: ItemPatch) -> bool {
        let Some(item) = self.items.iter_mut().find(|item| &item.id == id) else {
            return false;
        };
        if let Some(description) = patch.description {
            item.description = description;
        }
        if let Some(done) = patch.done {
            item.done = done;
        }
        true
    }

    /// Flip the star on `id` and return the new state. Works for any id;
    /// the store does not check that the item exists.
    pub fn toggle_star(&mut self, id: &ItemId) -> bool {
        if self.starred.remove(id) {
            false
        } else {
            self.starred.insert(id.clone());
            true
        }
    }

    pub fn is_starred(&self, id: &ItemId) -> bool {
        self.starred.contains(id)
    }

    pub fn starred_ids(&self) -> impl Iterator<Item = &ItemId> {
        self.starred.iter()
    }

    pub fn get(&self, id: &ItemId) -> Option<&Item> {
        self.items.iter().find(|item| &item.id == id)
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items not yet done, in collection order.
    pub fn pending(&self) -> Vec<&Item> {
        self.items.iter().filter(|item| !item.done).collect()
    }

    /// Items marked done, in collection order.
    pub fn completed(&self) -> Vec<&Item> {
        self.items.iter().filter(|item| item.done).collect()
    }
}
