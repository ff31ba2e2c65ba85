use crate::error::{PeekError, Result};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Registry, fmt, prelude::*, reload};

/// Environment variable consulted before `RUST_LOG`.
pub const LOG_ENV: &str = "MODELPEEK_LOG";

/// Filter installed while debug logging is switched on.
pub const DEBUG_DIRECTIVES: &str = "info,modelpeek_core=debug,modelpeek_cli=debug";

pub type FilterHandle = reload::Handle<EnvFilter, Registry>;

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Switches the live filter between the environment default and debug.
pub struct LogControl {
    filter: FilterHandle,
    debug: AtomicBool,
}

impl LogControl {
    pub fn new(filter: FilterHandle) -> Self {
        Self {
            filter,
            debug: AtomicBool::new(false),
        }
    }

    pub fn is_debug(&self) -> bool {
        self.debug.load(Ordering::Relaxed)
    }

    pub fn set_debug(&self, enabled: bool) -> Result<()> {
        let filter = if enabled {
            EnvFilter::new(DEBUG_DIRECTIVES)
        } else {
            env_filter()
        };
        self.filter
            .reload(filter)
            .map_err(|e| PeekError::Logging(e.to_string()))?;
        self.debug.store(enabled, Ordering::Relaxed);
        Ok(())
    }

    /// Flips debug logging and returns the new state.
    pub fn toggle_debug(&self) -> Result<bool> {
        let enabled = !self.is_debug();
        self.set_debug(enabled)?;
        Ok(enabled)
    }
}

/// Keeps the file writer flushing and exposes the filter switch.
pub struct LogGuard {
    _worker: WorkerGuard,
    control: Arc<LogControl>,
}

impl LogGuard {
    pub fn control(&self) -> Arc<LogControl> {
        self.control.clone()
    }
}

/// Installs the global subscriber: a daily file under `log_dir`, plus
/// stderr when `to_stderr` is set. Keep the guard alive until exit.
pub fn init_logging(log_dir: &Path, component: &str, to_stderr: bool) -> LogGuard {
    let _ = std::fs::create_dir_all(log_dir);

    // Files like shell.log.2026-01-21
    let file_appender = tracing_appender::rolling::daily(log_dir, format!("{component}.log"));
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true);

    let (filter_layer, filter_handle) = reload::Layer::new(env_filter());
    let registry = tracing_subscriber::registry()
        .with(filter_layer)
        .with(file_layer);

    if to_stderr {
        let stderr_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(true)
            .with_target(false);
        let _ = registry.with(stderr_layer).try_init();
    } else {
        let _ = registry.try_init();
    }

    LogGuard {
        _worker: guard,
        control: Arc::new(LogControl::new(filter_handle)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn current(handle: &FilterHandle) -> String {
        handle.with_current(|f| f.to_string()).unwrap()
    }

    #[test]
    fn test_toggle_debug_swaps_filter() {
        let (layer, handle) = reload::Layer::new(EnvFilter::new("warn"));
        let _subscriber = tracing_subscriber::registry().with(layer);
        let control = LogControl::new(handle.clone());

        assert!(!control.is_debug());
        assert!(control.toggle_debug().unwrap());
        assert!(control.is_debug());
        assert!(current(&handle).contains("modelpeek_core=debug"));

        assert!(!control.toggle_debug().unwrap());
        assert!(!current(&handle).contains("modelpeek_core=debug"));
    }

    #[test]
    fn test_reload_without_subscriber_is_error() {
        let (layer, handle) = reload::Layer::<EnvFilter, Registry>::new(EnvFilter::new("warn"));
        drop(layer);
        let control = LogControl::new(handle);
        assert!(matches!(control.set_debug(true), Err(PeekError::Logging(_))));
        assert!(!control.is_debug());
    }
}
