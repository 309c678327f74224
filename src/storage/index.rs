/// Common surface of the ordered tree and the flat page index, so front
/// ends can drive either backend.
pub trait RecordIndex<K, V> {
    fn name(&self) -> &'static str;

    fn insert(&mut self, key: K, value: V);

    /// Removes every value stored under `key`; a missing key is a no-op.
    fn remove(&mut self, key: &K);

    /// Every value stored under `key`, oldest first.
    fn search(&self, key: &K) -> Vec<V>;

    /// Entries with `from <= key <= to`, ascending by key.
    fn range(&self, from: &K, to: &K) -> Vec<(K, V)>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
