use std::sync::{Arc, OnceLock};

use bplus_index::debugger::{DebugLevel, Debugger};

static DEBUGGER: OnceLock<Arc<Debugger>> = OnceLock::new();

/// Shared stderr logger for integration tests; `RUST_LOG` picks the level
/// and defaults to off so test output stays quiet.
#[allow(dead_code)]
pub fn test_debugger() -> Arc<Debugger> {
    DEBUGGER
        .get_or_init(|| {
            let level = std::env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse::<DebugLevel>().ok())
                .unwrap_or(DebugLevel::Off);

            Arc::new(Debugger::stderr(level))
        })
        .clone()
}

#[allow(dead_code)]
pub fn scenario_records() -> Vec<(i64, String)> {
    [(10, "A"), (20, "B"), (5, "C"), (6, "D"), (30, "E"), (25, "F")]
        .into_iter()
        .map(|(k, v)| (k, v.to_string()))
        .collect()
}
