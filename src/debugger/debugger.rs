use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum DebugLevel {
    Off = 0,
    Error = 1,
    Warn = 2,
    Info = 3,
    Debug = 4,
    Trace = 5,
}

impl DebugLevel {
    fn label(self) -> &'static str {
        match self {
            DebugLevel::Off => "",
            DebugLevel::Error => "ERROR",
            DebugLevel::Warn => "WARN",
            DebugLevel::Info => "INFO",
            DebugLevel::Debug => "DEBUG",
            DebugLevel::Trace => "TRACE",
        }
    }

    fn color(self) -> &'static str {
        use color::*;
        match self {
            DebugLevel::Off => RESET,
            DebugLevel::Error => RED,
            DebugLevel::Warn => YELLOW,
            DebugLevel::Info => GREEN,
            DebugLevel::Debug => BLUE,
            DebugLevel::Trace => GRAY,
        }
    }
}

impl FromStr for DebugLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "OFF" => Ok(DebugLevel::Off),
            "ERROR" => Ok(DebugLevel::Error),
            "WARN" => Ok(DebugLevel::Warn),
            "INFO" => Ok(DebugLevel::Info),
            "DEBUG" => Ok(DebugLevel::Debug),
            "TRACE" => Ok(DebugLevel::Trace),
            other => Err(format!("unknown debug level '{}'", other)),
        }
    }
}

/// Subsystem tag printed in brackets on every log line.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Component {
    Tree,
    Pages,
    Loader,
    Shell,
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Component::Tree => "TREE",
            Component::Pages => "PAGES",
            Component::Loader => "LOADER",
            Component::Shell => "SHELL",
        };
        f.write_str(name)
    }
}

pub mod color {
    pub const RED: &str = "\x1b[31m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const GREEN: &str = "\x1b[32m";
    pub const BLUE: &str = "\x1b[34m";
    pub const GRAY: &str = "\x1b[90m";
    pub const RESET: &str = "\x1b[0m";
}

/// Destination for formatted log lines.
pub trait LogSink: Send + Sync {
    fn write_line(&self, line: &str);

    fn supports_color(&self) -> bool {
        false
    }
}

pub struct StderrSink;

impl LogSink for StderrSink {
    fn write_line(&self, line: &str) {
        eprintln!("{line}");
    }

    fn supports_color(&self) -> bool {
        true
    }
}

pub struct FileSink {
    file: Mutex<File>,
}

impl FileSink {
    pub fn create(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl LogSink for FileSink {
    fn write_line(&self, line: &str) {
        if let Ok(mut file) = self.file.lock() {
            // a failed log write must never take the index down with it
            let _ = writeln!(file, "{line}");
        }
    }
}

/// Keeps every line in memory; used by tests to assert on emitted logs.
#[derive(Default)]
pub struct MemorySink {
    lines: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }
}

impl LogSink for MemorySink {
    fn write_line(&self, line: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(line.to_string());
        }
    }
}

/// Logging handle handed to each index explicitly.
pub struct Debugger {
    level: DebugLevel,
    depth: AtomicUsize,
    sinks: Vec<Arc<dyn LogSink>>,
}

impl Debugger {
    pub fn new(level: DebugLevel) -> Self {
        Self {
            level,
            depth: AtomicUsize::new(0),
            sinks: Vec::new(),
        }
    }

    pub fn disabled() -> Self {
        Self::new(DebugLevel::Off)
    }

    pub fn stderr(level: DebugLevel) -> Self {
        Self::new(level).with_sink(Arc::new(StderrSink))
    }

    pub fn with_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn should_log(&self, level: DebugLevel) -> bool {
        level != DebugLevel::Off && level <= self.level && !self.sinks.is_empty()
    }

    pub fn log(&self, level: DebugLevel, component: Component, args: fmt::Arguments<'_>) {
        if !self.should_log(level) {
            return;
        }

        let indent = self.format_indent();
        let plain = format!("{}{} [{}] {}", indent, level.label(), component, args);
        let mut colored: Option<String> = None;

        for sink in &self.sinks {
            if sink.supports_color() {
                let line = colored.get_or_insert_with(|| {
                    format!(
                        "{}{}{}{} [{}] {}",
                        indent,
                        level.color(),
                        level.label(),
                        color::RESET,
                        component,
                        args
                    )
                });
                sink.write_line(line);
            } else {
                sink.write_line(&plain);
            }
        }
    }

    pub fn indent(&self) {
        self.depth.fetch_add(1, Ordering::Relaxed);
    }

    pub fn dedent(&self) {
        let _ = self
            .depth
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |d| d.checked_sub(1));
    }

    fn format_indent(&self) -> String {
        "  ".repeat(self.depth.load(Ordering::Relaxed))
    }
}

impl Default for Debugger {
    fn default() -> Self {
        Self::disabled()
    }
}

impl fmt::Debug for Debugger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Debugger")
            .field("level", &self.level)
            .field("sinks", &self.sinks.len())
            .finish()
    }
}
