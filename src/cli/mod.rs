pub mod command;
pub mod loader;
pub mod repl;

pub use command::Command;
pub use repl::{Repl, execute};
