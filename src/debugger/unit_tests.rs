#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::debugger::{Component, DebugLevel, Debugger, MemorySink};
    use crate::{idx_debug, idx_error, idx_info, idx_scope, idx_trace, idx_warn};

    fn capture(level: DebugLevel) -> (Debugger, Arc<MemorySink>) {
        let sink = Arc::new(MemorySink::default());
        let dbg = Debugger::new(level).with_sink(sink.clone());
        (dbg, sink)
    }

    #[test]
    fn filters_by_level() {
        let (dbg, sink) = capture(DebugLevel::Info);

        idx_info!(dbg, Component::Tree, "kept {}", 1);
        idx_debug!(dbg, Component::Tree, "dropped");

        assert_eq!(sink.lines(), vec!["INFO [TREE] kept 1".to_string()]);
    }

    #[test]
    fn off_level_logs_nothing() {
        let (dbg, sink) = capture(DebugLevel::Off);

        idx_info!(dbg, Component::Pages, "nope");

        assert!(sink.lines().is_empty());
    }

    #[test]
    fn scope_indents_nested_lines() {
        let (dbg, sink) = capture(DebugLevel::Trace);

        let value = idx_scope!(dbg, DebugLevel::Debug, Component::Tree, "split", {
            idx_trace!(dbg, Component::Tree, "inside");
            7
        });

        assert_eq!(value, 7);
        assert_eq!(
            sink.lines(),
            vec![
                "DEBUG [TREE] → split".to_string(),
                "  TRACE [TREE] inside".to_string(),
                "DEBUG [TREE] ← split".to_string(),
            ]
        );
    }

    #[test]
    fn memory_sink_lines_are_plain_text() {
        let (dbg, sink) = capture(DebugLevel::Trace);

        idx_trace!(dbg, Component::Shell, "x");

        assert!(!sink.lines()[0].contains('\x1b'));
    }

    #[test]
    fn parses_levels_case_insensitively() {
        assert_eq!("debug".parse::<DebugLevel>(), Ok(DebugLevel::Debug));
        assert_eq!(" TRACE ".parse::<DebugLevel>(), Ok(DebugLevel::Trace));
        assert!("loud".parse::<DebugLevel>().is_err());
    }

    #[test]
    fn dedent_never_underflows() {
        let (dbg, sink) = capture(DebugLevel::Info);

        dbg.dedent();
        idx_info!(dbg, Component::Loader, "flat");

        assert_eq!(sink.lines(), vec!["INFO [LOADER] flat".to_string()]);
    }

    #[test]
    fn error_passes_a_warn_filter() {
        let (dbg, sink) = capture(DebugLevel::Warn);

        idx_error!(dbg, Component::Shell, "readline failed: {}", "eof");
        idx_warn!(dbg, Component::Shell, "rejected");
        idx_info!(dbg, Component::Shell, "dropped");

        assert_eq!(
            sink.lines(),
            vec![
                "ERROR [SHELL] readline failed: eof".to_string(),
                "WARN [SHELL] rejected".to_string(),
            ]
        );
    }
}
