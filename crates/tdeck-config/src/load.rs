#![forbid(unsafe_code)]

//! Document parsing.
//!
//! The loader walks a [`serde_json::Value`] tree by hand so every type
//! mismatch carries its full key path (`test_suites[Suite][Case][skipped]
//! must be a boolean`). Unknown members inside a case entry are never fatal;
//! they are reported and skipped in both parse modes, since they do not
//! violate the documented shape, only extend it.

use std::fs;
use std::path::{Path, MAIN_SEPARATOR};

use serde_json::Value;
use tracing::warn;

use crate::{ConfigError, ParseMode, RuntimeConfig, SkipOverride, MAX_CONFIG_FILE_SIZE};

struct ParseContext<'a> {
    mode: ParseMode,
    warnings: &'a mut Vec<String>,
}

impl ParseContext<'_> {
    /// Handle a type mismatch: fatal in strict mode, a warning otherwise.
    fn mismatch(&mut self, message: String) -> Result<(), ConfigError> {
        match self.mode {
            ParseMode::Strict => Err(ConfigError::Schema(message)),
            ParseMode::Tolerant => {
                warn!(%message, "ignoring malformed config entry");
                self.warnings.push(message);
                Ok(())
            }
        }
    }

    /// Record an unsupported-but-harmless member. Never fatal.
    fn unsupported(&mut self, message: String) {
        warn!(%message, "ignoring unsupported config entry");
        self.warnings.push(message);
    }
}

/// Rewrite forward slashes to the platform's native separator.
fn sanitize_path(path: &str) -> String {
    path.replace('/', &MAIN_SEPARATOR.to_string())
}

fn load_bool(
    object: &Value,
    key: &str,
    out: &mut bool,
    cx: &mut ParseContext<'_>,
) -> Result<(), ConfigError> {
    match object.get(key) {
        None => Ok(()),
        Some(Value::Bool(value)) => {
            *out = *value;
            Ok(())
        }
        Some(_) => cx.mismatch(format!("settings[{key}] must be a boolean")),
    }
}

impl RuntimeConfig {
    /// Load a configuration document from disk.
    ///
    /// Unreadable and over-limit files are load errors; the caller is
    /// expected to fall back to [`RuntimeConfig::default`] and surface the
    /// error string.
    pub fn load_file(
        path: &Path,
        mode: ParseMode,
        warnings: &mut Vec<String>,
    ) -> Result<Self, ConfigError> {
        let metadata = fs::metadata(path).map_err(|source| ConfigError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
        if metadata.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::TooLarge {
                path: path.to_path_buf(),
                size: metadata.len(),
            });
        }

        let text = fs::read_to_string(path).map_err(|source| ConfigError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
        Self::load_str(&text, mode, warnings)
    }

    /// Parse a configuration document from a string buffer.
    pub fn load_str(
        text: &str,
        mode: ParseMode,
        warnings: &mut Vec<String>,
    ) -> Result<Self, ConfigError> {
        let document: Value =
            serde_json::from_str(text).map_err(|e| ConfigError::Syntax(e.to_string()))?;
        Self::from_document(&document, mode, warnings)
    }

    /// Parse an already-decoded structured document.
    pub fn from_document(
        document: &Value,
        mode: ParseMode,
        warnings: &mut Vec<String>,
    ) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let mut cx = ParseContext { mode, warnings };

        match document.get("settings") {
            None => cx.mismatch("'settings' not found".to_string())?,
            Some(settings) if !settings.is_object() => {
                cx.mismatch("'settings' not an object".to_string())?;
            }
            Some(settings) => config.parse_settings(settings, &mut cx)?,
        }

        match document.get("test_suites") {
            None => {}
            Some(suites) if !suites.is_object() => {
                cx.mismatch("'test_suites' not an object".to_string())?;
            }
            Some(suites) => config.parse_test_suites(suites, &mut cx)?,
        }

        Ok(config)
    }

    fn parse_settings(
        &mut self,
        settings: &Value,
        cx: &mut ParseContext<'_>,
    ) -> Result<(), ConfigError> {
        load_bool(settings, "enable_progress_log", &mut self.enable_progress_log, cx)?;
        load_bool(settings, "disable_autorun", &mut self.disable_autorun, cx)?;
        load_bool(
            settings,
            "enable_autorun_immediately",
            &mut self.enable_autorun_immediately,
            cx,
        )?;
        load_bool(
            settings,
            "enable_shutdown_on_completion",
            &mut self.enable_shutdown_on_completion,
            cx,
        )?;
        load_bool(
            settings,
            "enable_pgraph_region_diff",
            &mut self.enable_pgraph_region_diff,
            cx,
        )?;
        load_bool(settings, "skip_tests_by_default", &mut self.skip_tests_by_default, cx)?;

        match settings.get("delay_milliseconds_between_tests") {
            None => {}
            Some(value) => match value.as_u64() {
                Some(ms) => self.delay_milliseconds_between_tests = ms,
                None => cx.mismatch(
                    "settings[delay_milliseconds_between_tests] must be a positive integer"
                        .to_string(),
                )?,
            },
        }

        match settings.get("output_directory_path") {
            None => {}
            Some(Value::String(path)) => self.output_directory_path = sanitize_path(path),
            Some(_) => {
                cx.mismatch("settings[output_directory_path] must be a string".to_string())?;
            }
        }

        Ok(())
    }

    fn parse_test_suites(
        &mut self,
        suites: &Value,
        cx: &mut ParseContext<'_>,
    ) -> Result<(), ConfigError> {
        let Some(entries) = suites.as_object() else {
            return Ok(());
        };

        for (suite_name, entry) in entries {
            let prefix = format!("test_suites[{suite_name}]");
            let Some(members) = entry.as_object() else {
                cx.mismatch(format!("{prefix} must be an object"))?;
                continue;
            };

            for (member_name, member) in members {
                if member_name == "skipped" {
                    match member {
                        Value::Bool(skipped) => {
                            self.set_suite_override(
                                suite_name.clone(),
                                SkipOverride::from_skipped(*skipped),
                            );
                        }
                        _ => cx.mismatch(format!("{prefix}[skipped] must be a boolean"))?,
                    }
                    continue;
                }

                self.parse_test_case(suite_name, member_name, member, &prefix, cx)?;
            }
        }

        Ok(())
    }

    fn parse_test_case(
        &mut self,
        suite_name: &str,
        case_name: &str,
        entry: &Value,
        suite_prefix: &str,
        cx: &mut ParseContext<'_>,
    ) -> Result<(), ConfigError> {
        let prefix = format!("{suite_prefix}[{case_name}]");
        let Some(members) = entry.as_object() else {
            return cx.mismatch(format!("{prefix} must be an object"));
        };

        for (member_name, member) in members {
            if member_name != "skipped" {
                cx.unsupported(format!("{prefix}[{member_name}] unsupported"));
                continue;
            }

            match member {
                Value::Bool(skipped) => {
                    self.set_case_override(
                        suite_name,
                        case_name,
                        SkipOverride::from_skipped(*skipped),
                    );
                }
                _ => cx.mismatch(format!("{prefix}[skipped] must be a boolean"))?,
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_rewrites_forward_slashes() {
        let sanitized = sanitize_path("a/b/c");
        assert_eq!(sanitized, format!("a{MAIN_SEPARATOR}b{MAIN_SEPARATOR}c"));
    }

    #[test]
    fn absent_members_fall_back_to_defaults() {
        let mut warnings = Vec::new();
        let config =
            RuntimeConfig::load_str(r#"{"settings": {}}"#, ParseMode::Strict, &mut warnings)
                .unwrap();
        assert!(!config.skip_tests_by_default);
        assert!(!config.enable_progress_log);
        assert_eq!(config.delay_milliseconds_between_tests, 0);
        assert!(warnings.is_empty());
    }

    #[test]
    fn negative_delay_is_a_type_error() {
        let mut warnings = Vec::new();
        let err = RuntimeConfig::load_str(
            r#"{"settings": {"delay_milliseconds_between_tests": -5}}"#,
            ParseMode::Strict,
            &mut warnings,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Schema(_)));
        assert!(err
            .to_string()
            .contains("settings[delay_milliseconds_between_tests] must be a positive integer"));
    }
}
