use std::collections::HashSet;

use postline_domain::{ApiError, EntityId, Identified, Page, PageMeta};

/// One paginated list plus its loading and error flags
#[derive(Debug, Clone, PartialEq)]
pub struct Collection<T> {
    /// Unique by id, in server order
    pub items: Vec<T>,
    pub page_meta: PageMeta,
    pub is_fetching: bool,
    pub last_error: Option<ApiError>,
    /// Owner the items belong to (owner-scoped feeds only)
    pub owner_id: Option<EntityId>,
    /// Set once the first fetch has completed, successfully or not
    pub initial_fetch_done: bool,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            page_meta: PageMeta::default(),
            is_fetching: false,
            last_error: None,
            owner_id: None,
            initial_fetch_done: false,
        }
    }
}

impl<T> Collection<T> {
    pub fn has_more_pages(&self) -> bool {
        self.page_meta.has_more_pages()
    }

    pub fn is_last_page(&self) -> bool {
        self.page_meta.is_last_page()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Server reported a total of zero items
    pub fn is_empty_feed(&self) -> bool {
        self.page_meta.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}

impl<T: Identified> Collection<T> {
    /// Replace items and metadata with a first page
    pub fn replace_page(&mut self, page: Page<T>) -> usize {
        self.items.clear();
        self.page_meta = page.meta;
        self.append_unseen(page.data)
    }

    /// Append the items of a following page whose ids are not present yet,
    /// keeping server order. Metadata is replaced.
    pub fn merge_page(&mut self, page: Page<T>) -> usize {
        self.page_meta = page.meta;
        self.append_unseen(page.data)
    }

    fn append_unseen(&mut self, incoming: Vec<T>) -> usize {
        let mut seen: HashSet<EntityId> = self.items.iter().map(|item| item.id().clone()).collect();
        let before = self.items.len();
        self.items.extend(incoming.into_iter().filter(|item| seen.insert(item.id().clone())));
        self.items.len() - before
    }

    /// Replace every item with the same id; returns whether one matched
    pub fn replace_item(&mut self, item: &T) -> bool
    where
        T: Clone,
    {
        let mut replaced = false;
        for existing in self.items.iter_mut().filter(|existing| existing.id() == item.id()) {
            *existing = item.clone();
            replaced = true;
        }
        replaced
    }

    /// Insert at the front, dropping an older copy with the same id
    pub fn prepend(&mut self, item: T) {
        self.items.retain(|existing| existing.id() != item.id());
        self.items.insert(0, item);
    }

    pub fn get(&self, id: &EntityId) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }
}
