pub mod debugger;
mod macros;
pub mod unit_tests;

pub use debugger::{
    Component, DebugLevel, Debugger, FileSink, LogSink, MemorySink, StderrSink,
};
