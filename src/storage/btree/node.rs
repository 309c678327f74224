use crate::storage::btree::{internal::InternalNode, leaf::LeafNode};

/// Position of a node inside the tree's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub(crate) fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
pub enum BPlusNode<K, V> {
    Internal(InternalNode<K>),
    Leaf(LeafNode<K, V>),
}

impl<K, V> BPlusNode<K, V> {
    pub fn keys(&self) -> &[K] {
        match self {
            BPlusNode::Internal(i) => &i.keys,
            BPlusNode::Leaf(l) => &l.keys,
        }
    }

    pub fn key_count(&self) -> usize {
        self.keys().len()
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, BPlusNode::Leaf(_))
    }
}

/// Index of the child to descend into: the first separator strictly
/// greater than `key`. A key equal to a separator routes right.
pub(crate) fn child_index<K: Ord>(keys: &[K], key: &K) -> usize {
    keys.partition_point(|k| k <= key)
}

/// First position whose key is `>= key`.
pub(crate) fn lower_bound<K: Ord>(keys: &[K], key: &K) -> usize {
    keys.partition_point(|k| k < key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn child_index_routes_equal_keys_right() {
        let keys = [10, 20, 30];

        assert_eq!(child_index(&keys, &5), 0);
        assert_eq!(child_index(&keys, &10), 1);
        assert_eq!(child_index(&keys, &25), 2);
        assert_eq!(child_index(&keys, &30), 3);
        assert_eq!(child_index(&keys, &99), 3);
    }

    #[test]
    fn lower_bound_stops_on_equal_key() {
        let keys = [10, 20, 30];

        assert_eq!(lower_bound(&keys, &10), 0);
        assert_eq!(lower_bound(&keys, &15), 1);
        assert_eq!(lower_bound(&keys, &30), 2);
        assert_eq!(lower_bound(&keys, &31), 3);
    }
}
