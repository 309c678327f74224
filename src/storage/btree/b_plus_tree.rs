use std::fmt;
use std::sync::Arc;

use crate::{
    debugger::{Component, Debugger},
    error::IndexError,
    idx_debug, idx_trace,
    storage::{
        btree::{
            arena::Arena,
            internal::InternalNode,
            leaf::LeafNode,
            node::{BPlusNode, NodeId, child_index, lower_bound},
        },
        index::RecordIndex,
    },
};

/// In-memory B+ tree keyed by `K`, storing one or more `V` per key.
///
/// Nodes live in an arena and refer to each other by [`NodeId`]. Leaves are
/// chained left to right through `next` so range scans never climb back up
/// the tree. Both mutating operations work top-down in a single pass: insert
/// splits full children before descending, delete tops up deficient children
/// before descending.
pub struct BPlusTree<K, V> {
    order: usize,
    root: NodeId,
    nodes: Arena<BPlusNode<K, V>>,
    len: usize,
    debugger: Arc<Debugger>,
}

impl<K, V> BPlusTree<K, V> {
    pub fn order(&self) -> usize {
        self.order
    }

    /// Number of stored values, counting every duplicate.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn height(&self) -> usize {
        let mut height = 1;
        let mut node = self.root;

        while let BPlusNode::Internal(internal) = self.nodes.get(node) {
            node = internal.children[0];
            height += 1;
        }

        height
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn with_debugger(mut self, debugger: Arc<Debugger>) -> Self {
        self.debugger = debugger;
        self
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = self.nodes.alloc(BPlusNode::Leaf(LeafNode::empty()));
        self.len = 0;
    }

    /// All entries in ascending key order; duplicates in insertion order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            tree: self,
            leaf: Some(self.leftmost_leaf(self.root)),
            pos: 0,
            dup: 0,
        }
    }

    fn key_count(&self, id: NodeId) -> usize {
        self.nodes.get(id).key_count()
    }

    fn leaf(&self, id: NodeId) -> &LeafNode<K, V> {
        match self.nodes.get(id) {
            BPlusNode::Leaf(l) => l,
            _ => unreachable!(),
        }
    }

    fn leaf_mut(&mut self, id: NodeId) -> &mut LeafNode<K, V> {
        match self.nodes.get_mut(id) {
            BPlusNode::Leaf(l) => l,
            _ => unreachable!(),
        }
    }

    fn internal(&self, id: NodeId) -> &InternalNode<K> {
        match self.nodes.get(id) {
            BPlusNode::Internal(i) => i,
            _ => unreachable!(),
        }
    }

    fn internal_mut(&mut self, id: NodeId) -> &mut InternalNode<K> {
        match self.nodes.get_mut(id) {
            BPlusNode::Internal(i) => i,
            _ => unreachable!(),
        }
    }

    fn leftmost_leaf(&self, mut node: NodeId) -> NodeId {
        while let BPlusNode::Internal(internal) = self.nodes.get(node) {
            node = internal.children[0];
        }
        node
    }

    fn rightmost_leaf(&self, mut node: NodeId) -> NodeId {
        while let BPlusNode::Internal(internal) = self.nodes.get(node) {
            node = internal.children[internal.children.len() - 1];
        }
        node
    }
}

impl<K: Ord + Clone + fmt::Debug, V> BPlusTree<K, V> {
    pub fn new(order: usize) -> Self {
        assert!(order >= 3, "B+Tree order must be ≥ 3");

        let mut nodes = Arena::new();
        let root = nodes.alloc(BPlusNode::Leaf(LeafNode::empty()));

        Self {
            order,
            root,
            nodes,
            len: 0,
            debugger: Arc::new(Debugger::disabled()),
        }
    }

    pub fn try_new(order: usize) -> Result<Self, IndexError> {
        if order < 3 {
            return Err(IndexError::InvalidOrder { order });
        }
        Ok(Self::new(order))
    }

    fn find_leaf(&self, key: &K) -> NodeId {
        let mut node = self.root;

        loop {
            match self.nodes.get(node) {
                BPlusNode::Leaf(_) => return node,
                BPlusNode::Internal(internal) => {
                    node = internal.children[child_index(&internal.keys, key)];
                }
            }
        }
    }

    /// Earliest value stored under `key`.
    pub fn search(&self, key: &K) -> Option<&V> {
        self.search_all(key).first()
    }

    /// Every value stored under `key`, oldest first.
    pub fn search_all(&self, key: &K) -> &[V] {
        let leaf = self.leaf(self.find_leaf(key));

        match leaf.keys.binary_search(key) {
            Ok(i) => &leaf.values[i],
            Err(_) => &[],
        }
    }

    pub fn contains_key(&self, key: &K) -> bool {
        !self.search_all(key).is_empty()
    }

    /// Entries with `start <= key <= end`, ascending.
    pub fn range_query(&self, start: &K, end: &K) -> Vec<(&K, &V)> {
        let mut out = Vec::new();
        if start > end {
            return out;
        }

        let mut node = self.find_leaf(start);

        loop {
            let leaf = self.leaf(node);

            for (k, group) in leaf.keys.iter().zip(&leaf.values) {
                if k > end {
                    return out;
                }
                if k >= start {
                    out.extend(group.iter().map(|v| (k, v)));
                }
            }

            match leaf.next {
                Some(next) => node = next,
                None => break,
            }
        }

        out
    }

    pub fn insert(&mut self, key: K, value: V) {
        if self.is_full(self.root) {
            // Root split → grow tree height
            let old_root = self.root;
            self.root = self.nodes.alloc(BPlusNode::Internal(InternalNode {
                keys: Vec::new(),
                children: vec![old_root],
            }));
            self.split_child(self.root, 0);

            idx_debug!(
                self.debugger,
                Component::Tree,
                "root split, height now {}",
                self.height()
            );
        }

        let mut node = self.root;

        loop {
            let (mut idx, child) = match self.nodes.get(node) {
                BPlusNode::Leaf(_) => break,
                BPlusNode::Internal(internal) => {
                    let idx = child_index(&internal.keys, &key);
                    (idx, internal.children[idx])
                }
            };

            if self.is_full(child) {
                self.split_child(node, idx);
                if key >= self.internal(node).keys[idx] {
                    idx += 1;
                }
            }

            node = self.internal(node).children[idx];
        }

        self.insert_into_leaf(node, key, value);
        self.len += 1;
    }

    fn insert_into_leaf(&mut self, leaf_id: NodeId, key: K, value: V) {
        let leaf = self.leaf_mut(leaf_id);

        match leaf.keys.binary_search(&key) {
            Ok(i) => leaf.values[i].push(value),
            Err(i) => {
                leaf.keys.insert(i, key);
                leaf.values.insert(i, vec![value]);
            }
        }
    }

    /// Splits the full child at `index` of `parent` and promotes its median.
    fn split_child(&mut self, parent: NodeId, index: usize) {
        let child_id = self.internal(parent).children[index];

        let (separator, sibling) = match self.nodes.get_mut(child_id) {
            BPlusNode::Leaf(leaf) => {
                let mid = leaf.keys.len() / 2;

                // The median stays at leaf level as the sibling's first key.
                let keys = leaf.keys.split_off(mid);
                let values = leaf.values.split_off(mid);
                let separator = keys[0].clone();

                let sibling = LeafNode {
                    keys,
                    values,
                    next: leaf.next,
                };
                (separator, BPlusNode::Leaf(sibling))
            }

            BPlusNode::Internal(internal) => {
                let mid = internal.keys.len() / 2;

                let mut right_keys = internal.keys.split_off(mid);
                let separator = right_keys.remove(0);
                let right_children = internal.children.split_off(mid + 1);

                let sibling = InternalNode {
                    keys: right_keys,
                    children: right_children,
                };
                (separator, BPlusNode::Internal(sibling))
            }
        };

        let sibling_id = self.nodes.alloc(sibling);
        if let BPlusNode::Leaf(leaf) = self.nodes.get_mut(child_id) {
            leaf.next = Some(sibling_id);
        }

        idx_trace!(
            self.debugger,
            Component::Tree,
            "split {:?} → {:?}, promoted {:?}",
            child_id,
            sibling_id,
            separator
        );

        let p = self.internal_mut(parent);
        p.keys.insert(index, separator);
        p.children.insert(index + 1, sibling_id);
    }

    /// Removes the earliest value stored under `key`. Absent keys are ignored
    /// and leave the tree untouched.
    pub fn delete(&mut self, key: &K) {
        let leaf_id = self.find_leaf(key);

        let group_len = {
            let leaf = self.leaf(leaf_id);
            match leaf.keys.binary_search(key) {
                Ok(i) => leaf.values[i].len(),
                Err(_) => {
                    idx_trace!(self.debugger, Component::Tree, "delete {:?}: absent", key);
                    return;
                }
            }
        };

        if group_len > 1 {
            // Only a duplicate goes away; the key itself stays.
            let leaf = self.leaf_mut(leaf_id);
            if let Ok(i) = leaf.keys.binary_search(key) {
                leaf.values[i].remove(0);
            }
        } else {
            self.remove_key(key);
            self.collapse_root();
        }

        self.len -= 1;
    }

    /// Removes `key` with every value stored under it, returning how many
    /// values went.
    pub fn delete_all(&mut self, key: &K) -> usize {
        let mut removed = 0;
        while self.contains_key(key) {
            self.delete(key);
            removed += 1;
        }
        removed
    }

    fn collapse_root(&mut self) {
        loop {
            let promoted = match self.nodes.get(self.root) {
                BPlusNode::Internal(i) if i.keys.is_empty() => i.children[0],
                _ => break,
            };

            self.nodes.take(self.root);
            self.root = promoted;

            idx_debug!(
                self.debugger,
                Component::Tree,
                "root collapsed, height now {}",
                self.height()
            );
        }
    }

    /// Removes `key` and its whole value group, rebalancing on the way down.
    fn remove_key(&mut self, key: &K) {
        let mut node = self.root;

        loop {
            let (idx, separator_match) = match self.nodes.get(node) {
                BPlusNode::Leaf(_) => break,
                BPlusNode::Internal(internal) => {
                    let idx = lower_bound(&internal.keys, key);
                    (idx, idx < internal.keys.len() && internal.keys[idx] == *key)
                }
            };

            node = if separator_match {
                self.replace_separator(node, idx, key)
            } else {
                self.prepare_child(node, idx, key)
            };
        }

        let leaf = self.leaf_mut(node);
        if let Ok(i) = leaf.keys.binary_search(key) {
            leaf.keys.remove(i);
            leaf.values.remove(i);
        }
    }

    /// `key` is the separator at `idx` of `node` and therefore the smallest
    /// key under `children[idx + 1]`. Picks a substitute separator (or merges)
    /// and returns the child in which the deletion continues.
    fn replace_separator(&mut self, node: NodeId, idx: usize, key: &K) -> NodeId {
        let threshold = self.min_keys();
        let (left, right) = {
            let n = self.internal(node);
            (n.children[idx], n.children[idx + 1])
        };

        if self.key_count(left) >= threshold {
            let predecessor = self.swap_with_predecessor(left, right);

            idx_trace!(
                self.debugger,
                Component::Tree,
                "separator {:?} replaced by predecessor {:?}",
                key,
                predecessor
            );

            self.internal_mut(node).keys[idx] = predecessor;
            left
        } else if self.key_count(right) >= threshold {
            let successor = self.successor_in(right);

            idx_trace!(
                self.debugger,
                Component::Tree,
                "separator {:?} replaced by successor {:?}",
                key,
                successor
            );

            self.internal_mut(node).keys[idx] = successor;
            right
        } else if self.can_merge(node, idx) {
            self.merge_children(node, idx);
            self.internal(node).children[idx]
        } else {
            // merged node would overflow; rotate instead so the separator
            // moves down as the first key of `right`
            self.borrow_from_left(node, idx + 1);
            right
        }
    }

    /// Exchanges the largest entry under `left` with the smallest entry under
    /// `right` and returns the key now heading `right`.
    fn swap_with_predecessor(&mut self, left: NodeId, right: NodeId) -> K {
        let donor = self.rightmost_leaf(left);
        let target = self.leftmost_leaf(right);

        match self.nodes.pair_mut(donor, target) {
            (BPlusNode::Leaf(d), BPlusNode::Leaf(t)) => {
                let last = d.keys.len() - 1;
                std::mem::swap(&mut d.keys[last], &mut t.keys[0]);
                std::mem::swap(&mut d.values[last], &mut t.values[0]);
                t.keys[0].clone()
            }
            _ => unreachable!(),
        }
    }

    /// Second smallest key under `subtree`, i.e. the key that heads it once
    /// its smallest key is gone.
    fn successor_in(&self, subtree: NodeId) -> K {
        let leaf = self.leaf(self.leftmost_leaf(subtree));

        match leaf.keys.get(1) {
            Some(k) => k.clone(),
            None => {
                let next = leaf.next.expect("successor leaf must exist");
                self.leaf(next).keys[0].clone()
            }
        }
    }

    /// Makes sure `children[idx]` can lose a key, then returns the child that
    /// now covers `key`.
    fn prepare_child(&mut self, node: NodeId, idx: usize, key: &K) -> NodeId {
        let child = self.internal(node).children[idx];
        if self.key_count(child) >= self.min_keys() {
            return child;
        }

        self.rebalance(node, idx);

        let n = self.internal(node);
        n.children[child_index(&n.keys, key)]
    }

    fn rebalance(&mut self, parent: NodeId, idx: usize) {
        let threshold = self.min_keys();
        let (left, right) = {
            let p = self.internal(parent);
            (
                idx.checked_sub(1).map(|l| p.children[l]),
                p.children.get(idx + 1).copied(),
            )
        };

        // Try borrow from LEFT
        if let Some(left) = left {
            if self.key_count(left) > threshold {
                self.borrow_from_left(parent, idx);
                return;
            }
        }

        // Try borrow from RIGHT
        if let Some(right) = right {
            if self.key_count(right) > threshold {
                self.borrow_from_right(parent, idx);
                return;
            }
        }

        // Must merge, preferring the right sibling
        let (merge_at, sibling_on_right) = match (left, right) {
            (_, Some(_)) => (idx, true),
            (Some(_), None) => (idx - 1, false),
            (None, None) => return,
        };

        if self.can_merge(parent, merge_at) {
            self.merge_children(parent, merge_at);
        } else if sibling_on_right {
            self.borrow_from_right(parent, idx);
        } else {
            self.borrow_from_left(parent, idx);
        }
    }

    fn can_merge(&self, parent: NodeId, idx: usize) -> bool {
        let p = self.internal(parent);
        let left = self.nodes.get(p.children[idx]);
        let right = self.nodes.get(p.children[idx + 1]);

        let separator = if left.is_leaf() { 0 } else { 1 };
        left.key_count() + separator + right.key_count() <= self.max_keys()
    }

    fn borrow_from_left(&mut self, parent: NodeId, child_idx: usize) {
        let sep_idx = child_idx - 1;

        let (left_id, child_id, sep) = {
            let p = self.internal(parent);
            (
                p.children[child_idx - 1],
                p.children[child_idx],
                p.keys[sep_idx].clone(),
            )
        };

        let new_sep = match self.nodes.pair_mut(left_id, child_id) {
            (BPlusNode::Leaf(l), BPlusNode::Leaf(c)) => {
                let key = l.keys.pop().expect("left sibling has a key to lend");
                let group = l.values.pop().expect("left sibling has a value to lend");
                c.keys.insert(0, key);
                c.values.insert(0, group);

                // separator must be the min key of the right-hand node
                c.keys[0].clone()
            }

            (BPlusNode::Internal(l), BPlusNode::Internal(c)) => {
                // Move separator down to child
                c.keys.insert(0, sep);

                // Move last child pointer from left to child
                let ptr = l.children.pop().expect("left sibling has a child to lend");
                c.children.insert(0, ptr);

                // Move last key from left up as new separator
                l.keys.pop().expect("left sibling has a key to lend")
            }

            _ => unreachable!(),
        };

        idx_trace!(
            self.debugger,
            Component::Tree,
            "borrowed from left into {:?}, separator now {:?}",
            child_id,
            new_sep
        );

        self.internal_mut(parent).keys[sep_idx] = new_sep;
    }

    fn borrow_from_right(&mut self, parent: NodeId, child_idx: usize) {
        let sep_idx = child_idx;

        let (child_id, right_id, sep) = {
            let p = self.internal(parent);
            (
                p.children[child_idx],
                p.children[child_idx + 1],
                p.keys[sep_idx].clone(),
            )
        };

        let new_sep = match self.nodes.pair_mut(child_id, right_id) {
            (BPlusNode::Leaf(c), BPlusNode::Leaf(r)) => {
                c.keys.push(r.keys.remove(0));
                c.values.push(r.values.remove(0));
                r.keys[0].clone()
            }

            (BPlusNode::Internal(c), BPlusNode::Internal(r)) => {
                c.keys.push(sep);
                c.children.push(r.children.remove(0));
                r.keys.remove(0)
            }

            _ => unreachable!(),
        };

        idx_trace!(
            self.debugger,
            Component::Tree,
            "borrowed from right into {:?}, separator now {:?}",
            child_id,
            new_sep
        );

        self.internal_mut(parent).keys[sep_idx] = new_sep;
    }

    /// Folds `children[idx + 1]` into `children[idx]` and frees its slot.
    fn merge_children(&mut self, parent: NodeId, idx: usize) {
        let (left_id, right_id, separator) = {
            let p = self.internal_mut(parent);
            let right_id = p.children.remove(idx + 1);
            (p.children[idx], right_id, p.keys.remove(idx))
        };

        let right = self.nodes.take(right_id);

        match (self.nodes.get_mut(left_id), right) {
            (BPlusNode::Leaf(l), BPlusNode::Leaf(r)) => {
                l.keys.extend(r.keys);
                l.values.extend(r.values);
                l.next = r.next;
            }

            (BPlusNode::Internal(l), BPlusNode::Internal(r)) => {
                l.keys.push(separator);
                l.keys.extend(r.keys);
                l.children.extend(r.children);
            }

            _ => unreachable!(),
        }

        idx_debug!(
            self.debugger,
            Component::Tree,
            "merged {:?} into {:?}",
            right_id,
            left_id
        );
    }

    fn is_full(&self, id: NodeId) -> bool {
        self.key_count(id) >= self.max_keys()
    }
}

impl<K, V> BPlusTree<K, V> {
    fn max_keys(&self) -> usize {
        self.order - 1
    }

    /// Occupancy threshold: below it a node is topped up before the delete
    /// descends into it.
    fn min_keys(&self) -> usize {
        (self.order + 1) / 2
    }
}

impl<K: Ord + Clone + fmt::Debug, V: Clone> RecordIndex<K, V> for BPlusTree<K, V> {
    fn name(&self) -> &'static str {
        "b+tree"
    }

    fn insert(&mut self, key: K, value: V) {
        BPlusTree::insert(self, key, value);
    }

    fn remove(&mut self, key: &K) {
        self.delete_all(key);
    }

    fn search(&self, key: &K) -> Vec<V> {
        self.search_all(key).to_vec()
    }

    fn range(&self, from: &K, to: &K) -> Vec<(K, V)> {
        self.range_query(from, to)
            .into_iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    fn len(&self) -> usize {
        self.len
    }
}

impl<K: fmt::Debug, V> fmt::Debug for BPlusTree<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BPlusTree")
            .field("order", &self.order)
            .field("len", &self.len)
            .field("height", &self.height())
            .finish()
    }
}

pub struct Iter<'a, K, V> {
    tree: &'a BPlusTree<K, V>,
    leaf: Option<NodeId>,
    pos: usize,
    dup: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let tree = self.tree;

        loop {
            let leaf = tree.leaf(self.leaf?);

            if let Some(group) = leaf.values.get(self.pos) {
                if let Some(value) = group.get(self.dup) {
                    self.dup += 1;
                    return Some((&leaf.keys[self.pos], value));
                }
                self.pos += 1;
                self.dup = 0;
                continue;
            }

            self.leaf = leaf.next;
            self.pos = 0;
        }
    }
}

impl<'a, K, V> IntoIterator for &'a BPlusTree<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
impl<K: Ord + Clone + fmt::Debug, V> BPlusTree<K, V> {
    pub(crate) fn assert_invariants(&self) {
        assert!(self.order >= 3);

        let mut leaf_depth = None;
        let mut leaves = Vec::new();
        self.assert_node(self.root, None, None, 0, &mut leaf_depth, &mut leaves);

        // the sibling chain visits exactly the leaves, left to right
        let mut chain = Vec::new();
        let mut cursor = Some(self.leftmost_leaf(self.root));
        while let Some(id) = cursor {
            chain.push(id);
            cursor = self.leaf(id).next;
        }
        assert_eq!(chain, leaves, "leaf chain out of order");

        let stored: usize = leaves
            .iter()
            .map(|&id| self.leaf(id).values.iter().map(Vec::len).sum::<usize>())
            .sum();
        assert_eq!(stored, self.len);
    }

    fn assert_node<'a>(
        &'a self,
        id: NodeId,
        lower: Option<&'a K>,
        upper: Option<&'a K>,
        depth: usize,
        leaf_depth: &mut Option<usize>,
        leaves: &mut Vec<NodeId>,
    ) -> Option<&'a K> {
        let in_bounds = |k: &K| lower.is_none_or(|lo| k >= lo) && upper.is_none_or(|hi| k < hi);

        match self.nodes.get(id) {
            BPlusNode::Leaf(l) => {
                // keys & values match
                assert_eq!(l.keys.len(), l.values.len());

                // sorted keys
                assert!(l.keys.windows(2).all(|w| w[0] < w[1]));

                // size bound
                assert!(l.keys.len() <= self.max_keys());

                assert!(l.values.iter().all(|g| !g.is_empty()));
                assert!(l.keys.iter().all(in_bounds), "leaf key out of bounds");

                if id != self.root {
                    assert!(!l.keys.is_empty(), "non-root leaf is empty");
                }

                // all leaves on one level
                let expected = *leaf_depth.get_or_insert(depth);
                assert_eq!(expected, depth, "leaves at different depths");

                leaves.push(id);
                l.keys.first()
            }

            BPlusNode::Internal(i) => {
                assert_eq!(i.children.len(), i.keys.len() + 1);

                if id == self.root {
                    assert!(!i.keys.is_empty(), "internal root without keys");
                }

                // sorted keys
                assert!(i.keys.windows(2).all(|w| w[0] < w[1]));

                // size bound
                assert!(i.keys.len() <= self.max_keys());
                assert!(i.keys.iter().all(in_bounds), "separator out of bounds");

                let mut min = None;
                for (j, &child) in i.children.iter().enumerate() {
                    let lo = if j == 0 { lower } else { Some(&i.keys[j - 1]) };
                    let hi = if j == i.keys.len() { upper } else { Some(&i.keys[j]) };

                    let child_min = self.assert_node(child, lo, hi, depth + 1, leaf_depth, leaves);

                    if j == 0 {
                        min = child_min;
                    } else {
                        // separator equals the smallest key to its right
                        assert_eq!(child_min, Some(&i.keys[j - 1]), "inexact separator");
                    }
                }

                min
            }
        }
    }
}
