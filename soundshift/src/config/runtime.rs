// RUNTIME PREFERENCES (User Experience)

use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompilerPreferences {
    /// Whether a later `name = value` may replace an earlier definition
    pub allow_variable_redefinition: bool,

    /// Whether to log every expanded rule at debug level
    pub log_expansion_details: bool,

    /// Whether to log per-phase timing information
    pub log_phase_timings: bool,
}

impl Default for CompilerPreferences {
    fn default() -> Self {
        Self {
            allow_variable_redefinition: env::var(env_vars::COMPILER_ALLOW_REDEFINITION)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            log_expansion_details: env::var(env_vars::COMPILER_LOG_EXPANSION_DETAILS)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            log_phase_timings: env::var(env_vars::COMPILER_LOG_PHASE_TIMINGS)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReverserPreferences {
    /// Whether reusable reversers memoize results per input word
    pub enable_cache: bool,

    /// Whether to drop candidates that can never pass the final source filter
    /// as soon as they are produced
    pub early_pruning: bool,

    /// Whether an input word violating declared target phonotactics yields no sources.
    /// Off by default: forward output is not bound by target patterns.
    pub check_target_phonotactics: bool,

    /// Whether to log candidate counts after every rule
    pub log_candidate_counts: bool,
}

impl Default for ReverserPreferences {
    fn default() -> Self {
        Self {
            enable_cache: env::var(env_vars::REVERSER_ENABLE_CACHE)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            early_pruning: env::var(env_vars::REVERSER_EARLY_PRUNING)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            check_target_phonotactics: env::var(env_vars::REVERSER_CHECK_TARGET_PHONOTACTICS)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            log_candidate_counts: env::var(env_vars::REVERSER_LOG_CANDIDATE_COUNTS)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchPreferences {
    /// Whether to report progress while processing large word lists
    pub progress_reporting: bool,

    /// Number of words between progress reports
    pub progress_interval: usize,
}

impl Default for BatchPreferences {
    fn default() -> Self {
        Self {
            progress_reporting: env::var(env_vars::BATCH_PROGRESS_REPORTING)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            progress_interval: env::var(env_vars::BATCH_PROGRESS_INTERVAL)
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|n: &usize| *n > 0)
                .unwrap_or(1000),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingPreferences {
    /// Whether to use structured JSON logging (user preference)
    pub use_structured_logging: bool,

    /// Whether to enable console output (user preference)
    pub enable_console_logging: bool,

    /// User preferred minimum log level
    pub min_log_level: LogLevel,
}

impl Default for LoggingPreferences {
    fn default() -> Self {
        Self {
            use_structured_logging: env::var(env_vars::LOGGING_USE_STRUCTURED)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            enable_console_logging: env::var(env_vars::LOGGING_ENABLE_CONSOLE)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            min_log_level: env::var(env_vars::LOGGING_MIN_LEVEL)
                .ok()
                .and_then(|v| parse_log_level(&v))
                .unwrap_or(LogLevel::Warning),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    Error = 0,
    Warning = 1,
    Info = 2,
    Debug = 3,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warning => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }

    /// Convert to events::LogLevel
    pub fn to_events_log_level(&self) -> crate::logging::events::LogLevel {
        match self {
            LogLevel::Error => crate::logging::events::LogLevel::Error,
            LogLevel::Warning => crate::logging::events::LogLevel::Warning,
            LogLevel::Info => crate::logging::events::LogLevel::Info,
            LogLevel::Debug => crate::logging::events::LogLevel::Debug,
        }
    }
}

/// Parse log level from string (used for environment variables and the CLI)
pub fn parse_log_level(level: &str) -> Option<LogLevel> {
    match level.to_lowercase().as_str() {
        "error" | "0" => Some(LogLevel::Error),
        "warning" | "warn" | "1" => Some(LogLevel::Warning),
        "info" | "2" => Some(LogLevel::Info),
        "debug" | "3" => Some(LogLevel::Debug),
        _ => None,
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuntimeConfig {
    pub compiler: CompilerPreferences,
    pub reverser: ReverserPreferences,
    pub batch: BatchPreferences,
    pub logging: LoggingPreferences,
}

/// Environment variable names for configuration
pub mod env_vars {
    // Compiler
    pub const COMPILER_ALLOW_REDEFINITION: &str = "SOUNDSHIFT_COMPILER_ALLOW_REDEFINITION";
    pub const COMPILER_LOG_EXPANSION_DETAILS: &str = "SOUNDSHIFT_COMPILER_LOG_EXPANSION_DETAILS";
    pub const COMPILER_LOG_PHASE_TIMINGS: &str = "SOUNDSHIFT_COMPILER_LOG_PHASE_TIMINGS";

    // Reverser
    pub const REVERSER_ENABLE_CACHE: &str = "SOUNDSHIFT_REVERSER_ENABLE_CACHE";
    pub const REVERSER_EARLY_PRUNING: &str = "SOUNDSHIFT_REVERSER_EARLY_PRUNING";
    pub const REVERSER_CHECK_TARGET_PHONOTACTICS: &str =
        "SOUNDSHIFT_REVERSER_CHECK_TARGET_PHONOTACTICS";
    pub const REVERSER_LOG_CANDIDATE_COUNTS: &str = "SOUNDSHIFT_REVERSER_LOG_CANDIDATE_COUNTS";

    // Batch
    pub const BATCH_PROGRESS_REPORTING: &str = "SOUNDSHIFT_BATCH_PROGRESS_REPORTING";
    pub const BATCH_PROGRESS_INTERVAL: &str = "SOUNDSHIFT_BATCH_PROGRESS_INTERVAL";

    // Logging
    pub const LOGGING_USE_STRUCTURED: &str = "SOUNDSHIFT_LOGGING_USE_STRUCTURED";
    pub const LOGGING_ENABLE_CONSOLE: &str = "SOUNDSHIFT_LOGGING_ENABLE_CONSOLE";
    pub const LOGGING_MIN_LEVEL: &str = "SOUNDSHIFT_LOGGING_MIN_LEVEL";
}
