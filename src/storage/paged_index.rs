use std::sync::Arc;

use crate::{
    debugger::{Component, Debugger},
    error::IndexError,
    idx_debug, idx_trace,
    storage::{
        index::RecordIndex,
        page::{PageId, Record, RecordPage},
    },
};

pub const DEFAULT_PAGE_SIZE: usize = 256;

/// Unordered baseline index: records sit in fixed-capacity pages in arrival
/// order and every lookup scans all of them.
pub struct PagedIndex<K, V> {
    page_size: usize,
    pages: Vec<RecordPage<K, V>>,
    len: usize,
    debugger: Arc<Debugger>,
}

impl<K, V> PagedIndex<K, V> {
    pub fn new(page_size: usize) -> Self {
        assert!(page_size > 0, "page size must be at least 1");

        Self {
            page_size,
            pages: vec![RecordPage::new(PageId(0), page_size)],
            len: 0,
            debugger: Arc::new(Debugger::disabled()),
        }
    }

    pub fn try_new(page_size: usize) -> Result<Self, IndexError> {
        if page_size == 0 {
            return Err(IndexError::InvalidPageSize { page_size });
        }
        Ok(Self::new(page_size))
    }

    pub fn with_debugger(mut self, debugger: Arc<Debugger>) -> Self {
        self.debugger = debugger;
        self
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Stores the record in the first page with room, appending a page when
    /// all are full. Space freed by removals is reused this way.
    pub fn insert(&mut self, key: K, value: V) {
        let mut record = Record::new(key, value);

        for page in &mut self.pages {
            match page.push(record) {
                Ok(_) => {
                    self.len += 1;
                    return;
                }
                Err(back) => record = back,
            }
        }

        let mut page = RecordPage::new(PageId(self.pages.len() as u64), self.page_size);
        idx_debug!(
            self.debugger,
            Component::Pages,
            "all {} pages full, appending page {}",
            self.pages.len(),
            page.id().0
        );

        if page.push(record).is_ok() {
            self.len += 1;
        }
        self.pages.push(page);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Record<K, V>> {
        self.pages.iter().flat_map(|p| p.iter())
    }
}

impl<K: Ord, V> PagedIndex<K, V> {
    /// Removes every record stored under `key`.
    pub fn remove(&mut self, key: &K) -> usize {
        let removed: usize = self.pages.iter_mut().map(|p| p.remove_key(key)).sum();
        self.len -= removed;

        idx_trace!(self.debugger, Component::Pages, "removed {} record(s)", removed);
        removed
    }

    /// Values under `key` in arrival order.
    pub fn search<'a>(&'a self, key: &'a K) -> Vec<&'a V> {
        self.pages.iter().flat_map(|p| p.values_for(key)).collect()
    }

    /// Full scan for `from <= key <= to`, then a stable sort by key so equal
    /// keys keep arrival order.
    pub fn range_scan(&self, from: &K, to: &K) -> Vec<(&K, &V)> {
        let mut out: Vec<(&K, &V)> = self
            .iter()
            .filter(|r| r.key >= *from && r.key <= *to)
            .map(|r| (&r.key, &r.value))
            .collect();

        out.sort_by(|a, b| a.0.cmp(b.0));
        out
    }
}

impl<K: Ord + Clone, V: Clone> RecordIndex<K, V> for PagedIndex<K, V> {
    fn name(&self) -> &'static str {
        "pages"
    }

    fn insert(&mut self, key: K, value: V) {
        PagedIndex::insert(self, key, value);
    }

    fn remove(&mut self, key: &K) {
        PagedIndex::remove(self, key);
    }

    fn search(&self, key: &K) -> Vec<V> {
        PagedIndex::search(self, key).into_iter().cloned().collect()
    }

    fn range(&self, from: &K, to: &K) -> Vec<(K, V)> {
        self.range_scan(from, to)
            .into_iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    fn len(&self) -> usize {
        self.len
    }
}
