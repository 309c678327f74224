use std::{fmt, path::PathBuf, str::FromStr, sync::Arc};

use anyhow::Context;

use crate::{
    debugger::{DebugLevel, Debugger, FileSink},
    error::IndexError,
    storage::{BPlusTree, PagedIndex, RecordIndex, paged_index::DEFAULT_PAGE_SIZE},
};

pub const DEFAULT_ORDER: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backend {
    #[default]
    Tree,
    Pages,
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "tree" | "btree" | "b+tree" => Ok(Backend::Tree),
            "pages" | "paged" => Ok(Backend::Pages),
            other => Err(format!("unknown backend '{}' (expected tree or pages)", other)),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Tree => write!(f, "tree"),
            Backend::Pages => write!(f, "pages"),
        }
    }
}

/// Everything the shell needs to stand up an index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexConfig {
    pub order: usize,
    pub page_size: usize,
    pub backend: Backend,
    pub debug: bool,
    pub log_file: Option<PathBuf>,
    /// CSV of `key,value` records loaded before the shell starts.
    pub input: Option<PathBuf>,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            order: DEFAULT_ORDER,
            page_size: DEFAULT_PAGE_SIZE,
            backend: Backend::Tree,
            debug: false,
            log_file: None,
            input: None,
        }
    }
}

impl IndexConfig {
    pub fn validate(&self) -> Result<(), IndexError> {
        if self.order < 3 {
            return Err(IndexError::InvalidOrder { order: self.order });
        }
        if self.page_size == 0 {
            return Err(IndexError::InvalidPageSize {
                page_size: self.page_size,
            });
        }
        Ok(())
    }

    pub fn debug_level(&self) -> DebugLevel {
        if self.debug {
            DebugLevel::Debug
        } else {
            DebugLevel::Warn
        }
    }

    /// Stderr logging, plus a file sink when `log_file` is set.
    pub fn build_debugger(&self) -> anyhow::Result<Arc<Debugger>> {
        let mut debugger = Debugger::stderr(self.debug_level());

        if let Some(path) = &self.log_file {
            let sink = FileSink::create(path)
                .with_context(|| format!("failed to open log file '{}'", path.display()))?;
            debugger = debugger.with_sink(Arc::new(sink));
        }

        Ok(Arc::new(debugger))
    }

    pub fn build_index(
        &self,
        debugger: Arc<Debugger>,
    ) -> anyhow::Result<Box<dyn RecordIndex<i64, String>>> {
        self.validate()?;

        let index: Box<dyn RecordIndex<i64, String>> = match self.backend {
            Backend::Tree => Box::new(BPlusTree::try_new(self.order)?.with_debugger(debugger)),
            Backend::Pages => Box::new(PagedIndex::try_new(self.page_size)?.with_debugger(debugger)),
        };

        Ok(index)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::{
        config::{Backend, IndexConfig},
        debugger::Debugger,
        error::IndexError,
    };

    #[test]
    fn defaults_are_valid() {
        let config = IndexConfig::default();

        assert_eq!(config.order, 4);
        assert_eq!(config.page_size, 256);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn rejects_small_order_and_empty_pages() {
        let config = IndexConfig {
            order: 2,
            ..IndexConfig::default()
        };
        assert_eq!(config.validate(), Err(IndexError::InvalidOrder { order: 2 }));

        let config = IndexConfig {
            page_size: 0,
            ..IndexConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(IndexError::InvalidPageSize { page_size: 0 })
        );
        assert!(config.build_index(Arc::new(Debugger::disabled())).is_err());
    }

    #[test]
    fn parses_backend_names() {
        assert_eq!("Tree".parse::<Backend>(), Ok(Backend::Tree));
        assert_eq!(" pages ".parse::<Backend>(), Ok(Backend::Pages));
        assert!("hash".parse::<Backend>().is_err());
    }

    #[test]
    fn builds_the_selected_backend() {
        let dbg = Arc::new(Debugger::disabled());

        let tree = IndexConfig::default().build_index(dbg.clone()).unwrap();
        assert_eq!(tree.name(), "b+tree");

        let pages = IndexConfig {
            backend: Backend::Pages,
            ..IndexConfig::default()
        }
        .build_index(dbg)
        .unwrap();
        assert_eq!(pages.name(), "pages");
    }
}
