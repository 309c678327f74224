// Every macro takes the injected `Debugger` handle as its first argument.

#[macro_export]
macro_rules! idx_log {
    ($dbg:expr, $level:expr, $component:expr, $($arg:tt)*) => {
        if $dbg.should_log($level) {
            $dbg.log($level, $component, format_args!($($arg)*));
        }
    };
}

#[macro_export]
macro_rules! idx_error {
    ($dbg:expr, $component:expr, $($arg:tt)*) => {
        $crate::idx_log!($dbg, $crate::debugger::DebugLevel::Error, $component, $($arg)*)
    };
}

#[macro_export]
macro_rules! idx_warn {
    ($dbg:expr, $component:expr, $($arg:tt)*) => {
        $crate::idx_log!($dbg, $crate::debugger::DebugLevel::Warn, $component, $($arg)*)
    };
}

#[macro_export]
macro_rules! idx_info {
    ($dbg:expr, $component:expr, $($arg:tt)*) => {
        $crate::idx_log!($dbg, $crate::debugger::DebugLevel::Info, $component, $($arg)*)
    };
}

#[macro_export]
macro_rules! idx_debug {
    ($dbg:expr, $component:expr, $($arg:tt)*) => {
        $crate::idx_log!($dbg, $crate::debugger::DebugLevel::Debug, $component, $($arg)*)
    };
}

#[macro_export]
macro_rules! idx_trace {
    ($dbg:expr, $component:expr, $($arg:tt)*) => {
        $crate::idx_log!($dbg, $crate::debugger::DebugLevel::Trace, $component, $($arg)*)
    };
}

// Scoped debugging - automatically indents/dedents
#[macro_export]
macro_rules! idx_scope {
    ($dbg:expr, $level:expr, $component:expr, $name:expr, $body:block) => {{
        let enabled = $dbg.should_log($level);
        if enabled {
            $crate::idx_log!($dbg, $level, $component, "→ {}", $name);
            $dbg.indent();
        }

        let result = $body;

        if enabled {
            $dbg.dedent();
            $crate::idx_log!($dbg, $level, $component, "← {}", $name);
        }

        result
    }};
}
