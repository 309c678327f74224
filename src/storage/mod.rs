pub mod btree;
pub mod index;
pub mod page;
pub mod paged_index;
pub mod unit_tests;

pub use btree::BPlusTree;
pub use index::RecordIndex;
pub use paged_index::PagedIndex;
