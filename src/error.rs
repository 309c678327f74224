use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexError {
    InvalidOrder { order: usize },

    InvalidPageSize { page_size: usize },

    InvalidCommand { input: String, usage: &'static str },

    InvalidRecord { line: usize, reason: String },
}

impl fmt::Display for IndexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexError::InvalidOrder { order } => {
                write!(f, "index error: tree order must be at least 3 (got {})", order)
            }

            IndexError::InvalidPageSize { page_size } => {
                write!(
                    f,
                    "index error: page size must hold at least one record (got {})",
                    page_size
                )
            }

            IndexError::InvalidCommand { input, usage } => {
                write!(f, "invalid input '{}'. Use: {}", input, usage)
            }

            IndexError::InvalidRecord { line, reason } => {
                write!(f, "invalid record on line {}: {}", line, reason)
            }
        }
    }
}

impl std::error::Error for IndexError {}
