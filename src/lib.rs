//! In-memory ordered index over a B+ tree, with a flat page index as a
//! baseline and an interactive shell that drives either one.

pub mod cli;
pub mod config;
pub mod debugger;
pub mod error;
pub mod storage;
