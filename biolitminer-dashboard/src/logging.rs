use std::sync::Mutex;

use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry, reload};

/// Filter used when `RUST_LOG` is not set
pub const DEFAULT_FILTER: &str = "warn";
const VERBOSE_FILTER: &str = "debug";

type FilterHandle = reload::Handle<EnvFilter, Registry>;

/// Install the subscriber and return a handle for switching verbosity
pub fn init() -> LogControl {
    let directives = std::env::var(EnvFilter::DEFAULT_ENV)
        .ok()
        .filter(|d| !d.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_FILTER.to_string());

    let (filter, handle) = reload::Layer::new(EnvFilter::new(&directives));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    LogControl {
        handle: Some(handle),
        base_directives: directives,
        verbose: Mutex::new(false),
    }
}

/// Switches the live log filter between its startup directives and debug
pub struct LogControl {
    handle: Option<FilterHandle>,
    base_directives: String,
    verbose: Mutex<bool>,
}

impl LogControl {
    /// A control that only records the requested state
    pub fn detached() -> Self {
        Self {
            handle: None,
            base_directives: DEFAULT_FILTER.to_string(),
            verbose: Mutex::new(false),
        }
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose.lock().map(|v| *v).unwrap_or(false)
    }

    pub fn set_verbose(&self, verbose: bool) {
        let Ok(mut current) = self.verbose.lock() else {
            return;
        };
        if *current == verbose {
            return;
        }
        *current = verbose;

        let Some(handle) = &self.handle else {
            return;
        };
        let directives = if verbose {
            VERBOSE_FILTER
        } else {
            self.base_directives.as_str()
        };
        match handle.reload(EnvFilter::new(directives)) {
            Ok(()) => info!(verbose, "Log filter updated"),
            Err(e) => warn!(error = %e, "Failed to update log filter"),
        }
    }
}
