mod arena;
pub mod b_plus_tree;
pub mod internal;
pub mod leaf;
pub mod node;

pub use b_plus_tree::{BPlusTree, Iter};
pub use node::NodeId;
