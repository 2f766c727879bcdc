#![forbid(unsafe_code)]

//! Template generation: serialize recorded state back to a document.
//!
//! Dump is not the inverse of apply. It reflects *recorded* overrides, not
//! resolved enabled-state: a suite or case gets a `"skipped"` member only if
//! an explicit override was recorded for it, so re-consuming a dumped
//! document reproduces the same enabled set without inventing inherited
//! defaults. Every suite and case known to either the catalog or the
//! recorded override maps is emitted, so explicit entries survive even when
//! apply removed their suite from the catalog.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use serde_json::{Map, Value};
use tdeck_core::Catalog;

use crate::{ConfigError, RuntimeConfig, SkipOverride};

/// Rewrite platform separators back to forward slashes for the document.
fn escape_path(path: &str) -> String {
    path.replace('\\', "/")
}

fn override_value(value: SkipOverride) -> Option<Value> {
    match value {
        SkipOverride::Unset => None,
        SkipOverride::Skipped => Some(Value::Bool(true)),
        SkipOverride::Unskipped => Some(Value::Bool(false)),
    }
}

impl RuntimeConfig {
    /// Serialize the settings and recorded overrides to a document tree.
    #[must_use]
    pub fn dump(&self, catalog: &Catalog) -> Value {
        let mut settings = Map::new();
        settings.insert(
            "enable_progress_log".to_string(),
            Value::Bool(self.enable_progress_log),
        );
        settings.insert(
            "disable_autorun".to_string(),
            Value::Bool(self.disable_autorun),
        );
        settings.insert(
            "enable_autorun_immediately".to_string(),
            Value::Bool(self.enable_autorun_immediately),
        );
        settings.insert(
            "enable_shutdown_on_completion".to_string(),
            Value::Bool(self.enable_shutdown_on_completion),
        );
        settings.insert(
            "enable_pgraph_region_diff".to_string(),
            Value::Bool(self.enable_pgraph_region_diff),
        );
        settings.insert(
            "skip_tests_by_default".to_string(),
            Value::Bool(self.skip_tests_by_default),
        );
        settings.insert(
            "delay_milliseconds_between_tests".to_string(),
            Value::from(self.delay_milliseconds_between_tests),
        );
        settings.insert(
            "output_directory_path".to_string(),
            Value::String(escape_path(&self.output_directory_path)),
        );

        let mut suite_names: BTreeSet<String> = catalog
            .suites()
            .map(|suite| suite.name().to_string())
            .collect();
        suite_names.extend(self.suite_override_names().map(str::to_string));
        suite_names.extend(self.case_override_suite_names().map(str::to_string));

        let mut test_suites = Map::new();
        for suite_name in &suite_names {
            let mut entry = Map::new();
            if let Some(value) = override_value(self.suite_override(suite_name)) {
                entry.insert("skipped".to_string(), value);
            }

            let mut case_names: BTreeSet<String> = catalog
                .suite(suite_name)
                .map(|suite| suite.case_names().iter().map(|c| c.to_string()).collect())
                .unwrap_or_default();
            case_names.extend(self.case_override_names(suite_name).map(str::to_string));

            for case_name in &case_names {
                let mut case_entry = Map::new();
                if let Some(value) = override_value(self.case_override(suite_name, case_name)) {
                    case_entry.insert("skipped".to_string(), value);
                }
                entry.insert(case_name.clone(), Value::Object(case_entry));
            }

            test_suites.insert(suite_name.clone(), Value::Object(entry));
        }

        let mut document = Map::new();
        document.insert("settings".to_string(), Value::Object(settings));
        document.insert("test_suites".to_string(), Value::Object(test_suites));
        Value::Object(document)
    }

    /// Pretty-printed form of [`RuntimeConfig::dump`].
    #[must_use]
    pub fn dump_to_string(&self, catalog: &Catalog) -> String {
        let document = self.dump(catalog);
        serde_json::to_string_pretty(&document).unwrap_or_else(|_| "{}".to_string())
    }

    /// Write the dumped document to `path`.
    pub fn dump_to_file(&self, path: &Path, catalog: &Catalog) -> Result<(), ConfigError> {
        fs::write(path, self.dump_to_string(catalog)).map_err(|source| ConfigError::Unreadable {
            path: path.to_path_buf(),
            source,
        })
    }
}
