#![forbid(unsafe_code)]

//! Runtime configuration for the TestDeck harness.
//!
//! A [`RuntimeConfig`] is parsed from a structured JSON document and decides
//! which suites and cases of a [`Catalog`] are enabled for a run. Enablement
//! is a strict most-specific-wins cascade:
//!
//! 1. an explicit per-case override, if recorded;
//! 2. otherwise an explicit per-suite override, if recorded;
//! 3. otherwise the global `skip_tests_by_default` setting.
//!
//! Overrides are tri-state ([`SkipOverride`]): a key that is absent from the
//! document is `Unset`, which is semantically distinct from an explicit
//! `"skipped": false`. Both currently resolve the same way, but the
//! distinction survives load → apply → dump round trips.
//!
//! Loading happens in one of two explicit [`ParseMode`]s. `Strict` fails the
//! whole load on the first type mismatch, with a key-path-qualified message;
//! `Tolerant` records the same message as a warning and skips the entry,
//! which is what template-consuming callers want.

mod dump;
mod load;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use tdeck_core::Catalog;

/// Maximum accepted size of a raw configuration document.
pub const MAX_CONFIG_FILE_SIZE: u64 = 128 * 1024;

/// Default output directory when the document does not name one.
pub const DEFAULT_OUTPUT_DIRECTORY: &str = "tdeck_output";

/// How the loader reacts to malformed entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    /// Any type mismatch aborts the whole load.
    Strict,
    /// Malformed entries are recorded as warnings and skipped.
    Tolerant,
}

/// Tri-state enable/disable instruction recorded from the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SkipOverride {
    /// No explicit instruction; the next cascade level decides.
    #[default]
    Unset,
    /// Explicitly skipped.
    Skipped,
    /// Explicitly not skipped.
    Unskipped,
}

impl SkipOverride {
    /// Map a document-level `"skipped"` boolean onto an override.
    #[must_use]
    pub fn from_skipped(skipped: bool) -> Self {
        if skipped { Self::Skipped } else { Self::Unskipped }
    }

    /// True unless the override is [`SkipOverride::Unset`].
    #[must_use]
    pub fn is_set(self) -> bool {
        self != Self::Unset
    }
}

/// Errors surfaced while loading or writing a configuration document.
#[derive(Debug)]
pub enum ConfigError {
    /// The document file does not exist or cannot be read.
    Unreadable {
        /// Offending path.
        path: PathBuf,
        /// Underlying I/O failure.
        source: io::Error,
    },
    /// The raw document exceeds [`MAX_CONFIG_FILE_SIZE`].
    TooLarge {
        /// Offending path.
        path: PathBuf,
        /// Observed size in bytes.
        size: u64,
    },
    /// The document is not syntactically valid JSON.
    Syntax(String),
    /// A documented key has the wrong type (strict mode only). The message
    /// is key-path qualified.
    Schema(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unreadable { path, source } => {
                write!(f, "config file {} unreadable: {source}", path.display())
            }
            Self::TooLarge { path, size } => write!(
                f,
                "config file {} is too large ({size} bytes, limit {MAX_CONFIG_FILE_SIZE})",
                path.display()
            ),
            Self::Syntax(detail) => write!(f, "failed to parse config document: {detail}"),
            Self::Schema(message) => write!(f, "{message}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Unreadable { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Parsed runtime configuration.
///
/// Immutable once parsed; [`RuntimeConfig::apply`] consumes it against a
/// catalog without mutating the config itself.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Emit per-case progress events at `info!` level.
    pub enable_progress_log: bool,
    /// Suppress the autorun countdown entirely.
    pub disable_autorun: bool,
    /// Skip the countdown and start the bulk run immediately.
    pub enable_autorun_immediately: bool,
    /// Request device shutdown after a completed bulk run.
    pub enable_shutdown_on_completion: bool,
    /// Opaque passthrough for the device-side register diff feature.
    pub enable_pgraph_region_diff: bool,
    /// Global default: cases with no override at any level are skipped.
    pub skip_tests_by_default: bool,
    /// Artificial pause before each case run, in milliseconds.
    pub delay_milliseconds_between_tests: u64,
    /// Where result artifacts land; forward slashes are rewritten to the
    /// platform separator at load time.
    pub output_directory_path: String,

    suite_overrides: BTreeMap<String, SkipOverride>,
    case_overrides: BTreeMap<String, BTreeMap<String, SkipOverride>>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            enable_progress_log: false,
            disable_autorun: false,
            enable_autorun_immediately: false,
            enable_shutdown_on_completion: false,
            enable_pgraph_region_diff: false,
            skip_tests_by_default: false,
            delay_milliseconds_between_tests: 0,
            output_directory_path: DEFAULT_OUTPUT_DIRECTORY.to_string(),
            suite_overrides: BTreeMap::new(),
            case_overrides: BTreeMap::new(),
        }
    }
}

impl RuntimeConfig {
    /// The recorded override for a suite, `Unset` when absent.
    #[must_use]
    pub fn suite_override(&self, suite: &str) -> SkipOverride {
        self.suite_overrides.get(suite).copied().unwrap_or_default()
    }

    /// The recorded override for a case, `Unset` when absent.
    #[must_use]
    pub fn case_override(&self, suite: &str, case: &str) -> SkipOverride {
        self.case_overrides
            .get(suite)
            .and_then(|cases| cases.get(case))
            .copied()
            .unwrap_or_default()
    }

    /// Record an explicit suite-level override.
    pub fn set_suite_override(&mut self, suite: impl Into<String>, value: SkipOverride) {
        match value {
            SkipOverride::Unset => {
                self.suite_overrides.remove(&suite.into());
            }
            _ => {
                self.suite_overrides.insert(suite.into(), value);
            }
        }
    }

    /// Record an explicit case-level override.
    pub fn set_case_override(
        &mut self,
        suite: impl Into<String>,
        case: impl Into<String>,
        value: SkipOverride,
    ) {
        let suite = suite.into();
        match value {
            SkipOverride::Unset => {
                if let Some(cases) = self.case_overrides.get_mut(&suite) {
                    cases.remove(&case.into());
                    if cases.is_empty() {
                        self.case_overrides.remove(&suite);
                    }
                }
            }
            _ => {
                self.case_overrides
                    .entry(suite)
                    .or_default()
                    .insert(case.into(), value);
            }
        }
    }

    /// Resolve the cascade for one case: case override, else suite override,
    /// else the inverse of the global default.
    #[must_use]
    pub fn is_case_enabled(&self, suite: &str, case: &str) -> bool {
        match self.case_override(suite, case) {
            SkipOverride::Skipped => false,
            SkipOverride::Unskipped => true,
            SkipOverride::Unset => !self.suite_resolves_skipped(suite),
        }
    }

    /// The suite-level resolution, ignoring case overrides (cascade steps
    /// 2–3 only).
    #[must_use]
    pub fn suite_resolves_skipped(&self, suite: &str) -> bool {
        match self.suite_override(suite) {
            SkipOverride::Skipped => true,
            SkipOverride::Unskipped => false,
            SkipOverride::Unset => self.skip_tests_by_default,
        }
    }

    /// The per-case delay as a [`Duration`].
    #[must_use]
    pub fn case_delay(&self) -> Duration {
        Duration::from_millis(self.delay_milliseconds_between_tests)
    }

    /// Filter `catalog` in place according to the cascade.
    ///
    /// Two phases. First, suite-level culling: a suite is dropped entirely
    /// when its suite-level resolution is "skipped" and no recorded
    /// case-level `Unskipped` override would rescue one of its cases.
    /// Second, case-level culling: each surviving suite has the cases whose
    /// full cascade resolution is "disabled" removed. Applying the same
    /// config twice is a no-op the second time.
    pub fn apply(&self, catalog: &mut Catalog) {
        let mut allowed = BTreeSet::new();
        for suite in catalog.suites() {
            let name = suite.name();
            let rescued = suite
                .case_names()
                .iter()
                .any(|case| self.case_override(name, case) == SkipOverride::Unskipped);
            if !self.suite_resolves_skipped(name) || rescued {
                allowed.insert(name.to_string());
            }
        }
        catalog.remove_suites_not_in(&allowed);

        for suite in catalog.suites_mut() {
            let name = suite.name().to_string();
            let disabled: BTreeSet<String> = suite
                .case_names()
                .iter()
                .filter(|case| !self.is_case_enabled(&name, case))
                .map(|case| case.to_string())
                .collect();
            if !disabled.is_empty() {
                suite.disable_cases(&disabled);
            }
        }
    }

    /// Propagate passthrough run settings (progress log, per-case delay)
    /// to every suite in `catalog`.
    pub fn configure_runs(&self, catalog: &mut Catalog) {
        catalog.set_progress_log(self.enable_progress_log);
        catalog.set_case_delay(self.case_delay());
    }

    pub(crate) fn suite_override_names(&self) -> impl Iterator<Item = &str> {
        self.suite_overrides.keys().map(String::as_str)
    }

    pub(crate) fn case_override_suite_names(&self) -> impl Iterator<Item = &str> {
        self.case_overrides.keys().map(String::as_str)
    }

    pub(crate) fn case_override_names(&self, suite: &str) -> impl Iterator<Item = &str> {
        self.case_overrides
            .get(suite)
            .into_iter()
            .flat_map(|cases| cases.keys().map(String::as_str))
    }
}
