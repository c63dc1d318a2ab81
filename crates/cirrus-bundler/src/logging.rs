//! Subscriber setup for applications embedding cirrus.
//!
//! Only available with the `logging` feature. Libraries should install their
//! own subscriber; the helpers here scope output to the cirrus crates so
//! resolver and dependency noise stays out of the build log.

use std::fmt;
use std::str::FromStr;
use std::sync::Once;

use tracing_subscriber::{EnvFilter, fmt as fmt_layer, layer::SubscriberExt, util::SubscriberInitExt};

/// Targets that receive the requested level
pub const LOG_TARGETS: &[&str] = &["cirrus_bundler", "cirrus_config", "cirrus_target"];

static INIT: Once = Once::new();

/// Verbosity of cirrus output
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
    Silent,
    Error,
    Warn,
    /// Finished assemblies
    #[default]
    Info,
    /// Layer merges, detected targets and the stage order
    Debug,
    /// Every shadowed alias and identifier collision
    Trace,
}

impl LogLevel {
    fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Silent => "off",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }

    /// Filter directives applying this level to [`LOG_TARGETS`] only
    ///
    /// ```
    /// use cirrus_bundler::logging::LogLevel;
    ///
    /// assert_eq!(
    ///     LogLevel::Debug.directives(),
    ///     "cirrus_bundler=debug,cirrus_config=debug,cirrus_target=debug"
    /// );
    /// ```
    pub fn directives(&self) -> String {
        if *self == LogLevel::Silent {
            return "off".to_string();
        }
        LOG_TARGETS
            .iter()
            .map(|target| format!("{target}={}", self.as_str()))
            .collect::<Vec<_>>()
            .join(",")
    }

    pub fn filter(&self) -> EnvFilter {
        EnvFilter::new(self.directives())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "silent" | "off" | "quiet" => Ok(LogLevel::Silent),
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            other => Err(format!("Invalid log level: {other}")),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Install a compact subscriber for the cirrus crates at `level`
///
/// Returns `false` when a global subscriber was already set, either by an
/// earlier call or by the host application.
///
/// ```rust,no_run
/// use cirrus_bundler::logging::{init_logging, LogLevel};
///
/// init_logging(LogLevel::Debug);
/// ```
pub fn init_logging(level: LogLevel) -> bool {
    install(level.filter())
}

/// Like [`init_logging`], but `RUST_LOG` wins when it is set and valid
///
/// Falls back to `CIRRUS_LOG` (a [`LogLevel`] name), then to `Info`.
pub fn init_logging_from_env() -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        std::env::var("CIRRUS_LOG")
            .ok()
            .and_then(|value| value.parse::<LogLevel>().ok())
            .unwrap_or_default()
            .filter()
    });
    install(filter)
}

fn install(filter: EnvFilter) -> bool {
    let mut installed = false;
    INIT.call_once(|| {
        installed = tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer::layer().compact().with_target(false).without_time())
            .try_init()
            .is_ok();
    });
    installed
}
