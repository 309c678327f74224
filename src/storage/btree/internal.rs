use crate::storage::btree::node::NodeId;

#[derive(Debug, Clone)]
pub struct InternalNode<K> {
    pub keys: Vec<K>,
    pub children: Vec<NodeId>, // children.len() = keys.len() + 1
}
