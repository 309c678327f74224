use crate::storage::btree::node::NodeId;

/// Slot storage for tree nodes. Released slots are reused by later
/// allocations so merges do not leak memory.
#[derive(Clone)]
pub(crate) struct Arena<T> {
    slots: Vec<Option<T>>,
    free: Vec<NodeId>,
}

impl<T> Arena<T> {
    pub(crate) fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub(crate) fn alloc(&mut self, element: T) -> NodeId {
        if let Some(id) = self.free.pop() {
            self.slots[id.index()] = Some(element);
            id
        } else {
            self.slots.push(Some(element));
            NodeId(self.slots.len() - 1)
        }
    }

    pub(crate) fn get(&self, id: NodeId) -> &T {
        self.slots[id.index()]
            .as_ref()
            .expect("node id refers to a released slot")
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> &mut T {
        self.slots[id.index()]
            .as_mut()
            .expect("node id refers to a released slot")
    }

    /// Mutable access to two distinct slots at once.
    pub(crate) fn pair_mut(&mut self, a: NodeId, b: NodeId) -> (&mut T, &mut T) {
        assert_ne!(a, b, "pair_mut needs two distinct nodes");

        let (first, second) = if a.index() < b.index() {
            let (l, r) = self.slots.split_at_mut(b.index());
            (&mut l[a.index()], &mut r[0])
        } else {
            let (l, r) = self.slots.split_at_mut(a.index());
            (&mut r[0], &mut l[b.index()])
        };

        (
            first.as_mut().expect("node id refers to a released slot"),
            second.as_mut().expect("node id refers to a released slot"),
        )
    }

    /// Removes the element and recycles its slot.
    pub(crate) fn take(&mut self, id: NodeId) -> T {
        let element = self.slots[id.index()]
            .take()
            .expect("node id refers to a released slot");
        self.free.push(id);
        element
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
    }
}
