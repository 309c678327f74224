#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageId(pub u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record<K, V> {
    pub key: K,
    pub value: V,
}

impl<K, V> Record<K, V> {
    pub fn new(key: K, value: V) -> Self {
        Self { key, value }
    }
}

/// Fixed-capacity bucket of records, kept in arrival order.
#[derive(Debug, Clone)]
pub struct RecordPage<K, V> {
    id: PageId,
    records: Vec<Record<K, V>>,
    capacity: usize,
}

impl<K, V> RecordPage<K, V> {
    pub fn new(id: PageId, capacity: usize) -> Self {
        Self {
            id,
            records: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn id(&self) -> PageId {
        self.id
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn num_records(&self) -> usize {
        self.records.len()
    }

    pub fn is_full(&self) -> bool {
        self.num_records() >= self.capacity
    }

    /// Hands the record back when the page has no room.
    pub fn push(&mut self, record: Record<K, V>) -> Result<usize, Record<K, V>> {
        if self.is_full() {
            return Err(record);
        }

        self.records.push(record);
        Ok(self.records.len() - 1)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Record<K, V>> {
        self.records.iter()
    }
}

impl<K: PartialEq, V> RecordPage<K, V> {
    /// Drops every record with `key`, returning how many went.
    pub fn remove_key(&mut self, key: &K) -> usize {
        let before = self.records.len();
        self.records.retain(|r| r.key != *key);
        before - self.records.len()
    }

    pub fn values_for<'a>(&'a self, key: &'a K) -> impl Iterator<Item = &'a V> + 'a {
        self.records
            .iter()
            .filter(move |r| r.key == *key)
            .map(|r| &r.value)
    }
}

#[cfg(test)]
mod tests {
    use crate::storage::page::{PageId, Record, RecordPage};

    #[test]
    fn page_respects_capacity() {
        let mut page = RecordPage::new(PageId(1), 2);

        assert!(page.push(Record::new(1, "a")).is_ok());
        assert!(page.push(Record::new(2, "b")).is_ok());

        assert!(page.is_full());
        assert_eq!(page.push(Record::new(3, "c")), Err(Record::new(3, "c")));
    }

    #[test]
    fn page_capacity_and_count() {
        let mut page = RecordPage::new(PageId(0), 2);

        assert_eq!(page.capacity(), 2);
        assert_eq!(page.num_records(), 0);
        assert!(!page.is_full());

        page.push(Record::new(1, ())).unwrap();
        assert_eq!(page.num_records(), 1);

        page.push(Record::new(2, ())).unwrap();
        assert!(page.is_full());
    }

    #[test]
    fn remove_key_frees_room() {
        let mut page = RecordPage::new(PageId(0), 3);
        page.push(Record::new(5, "x")).unwrap();
        page.push(Record::new(6, "y")).unwrap();
        page.push(Record::new(5, "z")).unwrap();

        assert_eq!(page.remove_key(&5), 2);
        assert_eq!(page.remove_key(&5), 0);
        assert!(!page.is_full());
        assert_eq!(page.values_for(&6).collect::<Vec<_>>(), vec![&"y"]);
    }
}
