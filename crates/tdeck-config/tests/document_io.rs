//! Document loading, parse modes, size limits, and dump round trips.

use std::io::Write;

use serde_json::Value;
use tdeck_config::{ConfigError, ParseMode, RuntimeConfig, SkipOverride, MAX_CONFIG_FILE_SIZE};
use tdeck_core::{Catalog, TestSuite};

fn two_suite_catalog() -> Catalog {
    let mut catalog = Catalog::new();
    for suite_name in ["Suite_1", "Suite_2"] {
        let mut suite = TestSuite::new(suite_name);
        for case_name in ["Test_1", "Test_2", "Test_3"] {
            suite.add(case_name, || {});
        }
        catalog.register(suite);
    }
    catalog
}

const FULL_DOCUMENT: &str = r#"{
  "settings": {
    "enable_progress_log": true,
    "disable_autorun": true,
    "enable_autorun_immediately": false,
    "enable_shutdown_on_completion": false,
    "enable_pgraph_region_diff": true,
    "skip_tests_by_default": false,
    "delay_milliseconds_between_tests": 250,
    "output_directory_path": "results/run_1"
  },
  "test_suites": {
    "Suite_1": {
      "skipped": true,
      "Test_2": { "skipped": false }
    },
    "Suite_2": {
      "Test_1": { "skipped": true }
    }
  }
}"#;

#[test]
fn full_document_loads_every_field() {
    let mut warnings = Vec::new();
    let config =
        RuntimeConfig::load_str(FULL_DOCUMENT, ParseMode::Strict, &mut warnings).unwrap();

    assert!(config.enable_progress_log);
    assert!(config.disable_autorun);
    assert!(config.enable_pgraph_region_diff);
    assert!(!config.skip_tests_by_default);
    assert_eq!(config.delay_milliseconds_between_tests, 250);
    assert_eq!(
        config.output_directory_path,
        format!("results{}run_1", std::path::MAIN_SEPARATOR)
    );
    assert_eq!(config.suite_override("Suite_1"), SkipOverride::Skipped);
    assert_eq!(
        config.case_override("Suite_1", "Test_2"),
        SkipOverride::Unskipped
    );
    assert_eq!(
        config.case_override("Suite_2", "Test_1"),
        SkipOverride::Skipped
    );
    assert_eq!(config.suite_override("Suite_2"), SkipOverride::Unset);
    assert!(warnings.is_empty());
}

#[test]
fn strict_mode_fails_on_a_mistyped_boolean() {
    let mut warnings = Vec::new();
    let err = RuntimeConfig::load_str(
        r#"{"settings": {"enable_progress_log": "yes"}}"#,
        ParseMode::Strict,
        &mut warnings,
    )
    .unwrap_err();

    assert!(matches!(err, ConfigError::Schema(_)));
    assert_eq!(
        err.to_string(),
        "settings[enable_progress_log] must be a boolean"
    );
}

#[test]
fn strict_mode_fails_on_a_mistyped_suite_entry() {
    let mut warnings = Vec::new();
    let err = RuntimeConfig::load_str(
        r#"{"settings": {}, "test_suites": {"Suite_1": "nope"}}"#,
        ParseMode::Strict,
        &mut warnings,
    )
    .unwrap_err();

    assert_eq!(err.to_string(), "test_suites[Suite_1] must be an object");
}

#[test]
fn tolerant_mode_records_warnings_and_keeps_the_rest() {
    let mut warnings = Vec::new();
    let config = RuntimeConfig::load_str(
        r#"{
          "settings": {"skip_tests_by_default": "maybe"},
          "test_suites": {
            "Suite_1": "nope",
            "Suite_2": {"skipped": true}
          }
        }"#,
        ParseMode::Tolerant,
        &mut warnings,
    )
    .unwrap();

    assert!(!config.skip_tests_by_default);
    assert_eq!(config.suite_override("Suite_1"), SkipOverride::Unset);
    assert_eq!(config.suite_override("Suite_2"), SkipOverride::Skipped);
    assert_eq!(
        warnings,
        vec![
            "settings[skip_tests_by_default] must be a boolean".to_string(),
            "test_suites[Suite_1] must be an object".to_string(),
        ]
    );
}

#[test]
fn unsupported_case_members_warn_in_both_modes() {
    for mode in [ParseMode::Strict, ParseMode::Tolerant] {
        let mut warnings = Vec::new();
        let config = RuntimeConfig::load_str(
            r#"{
              "settings": {},
              "test_suites": {"Suite_1": {"Test_1": {"skipped": true, "retries": 3}}}
            }"#,
            mode,
            &mut warnings,
        )
        .unwrap();

        assert_eq!(
            config.case_override("Suite_1", "Test_1"),
            SkipOverride::Skipped
        );
        assert_eq!(
            warnings,
            vec!["test_suites[Suite_1][Test_1][retries] unsupported".to_string()]
        );
    }
}

#[test]
fn syntactically_broken_documents_fail_in_both_modes() {
    for mode in [ParseMode::Strict, ParseMode::Tolerant] {
        let mut warnings = Vec::new();
        let err = RuntimeConfig::load_str("{not json", mode, &mut warnings).unwrap_err();
        assert!(matches!(err, ConfigError::Syntax(_)));
    }
}

#[test]
fn missing_file_is_an_error_string_not_a_panic() {
    let mut warnings = Vec::new();
    let err = RuntimeConfig::load_file(
        std::path::Path::new("/nonexistent/tdeck.json"),
        ParseMode::Strict,
        &mut warnings,
    )
    .unwrap_err();

    assert!(matches!(err, ConfigError::Unreadable { .. }));
    assert!(err.to_string().contains("/nonexistent/tdeck.json"));
}

#[test]
fn oversized_files_are_rejected() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    let filler = vec![b' '; (MAX_CONFIG_FILE_SIZE + 1) as usize];
    file.write_all(&filler).unwrap();
    file.flush().unwrap();

    let mut warnings = Vec::new();
    let err =
        RuntimeConfig::load_file(file.path(), ParseMode::Strict, &mut warnings).unwrap_err();
    assert!(matches!(err, ConfigError::TooLarge { .. }));
}

#[test]
fn config_files_load_from_disk() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(FULL_DOCUMENT.as_bytes()).unwrap();
    file.flush().unwrap();

    let mut warnings = Vec::new();
    let config =
        RuntimeConfig::load_file(file.path(), ParseMode::Strict, &mut warnings).unwrap();
    assert_eq!(config.suite_override("Suite_1"), SkipOverride::Skipped);
}

/// `Dump(Apply(Load(doc)))` reproduces exactly the explicit `skipped`
/// entries of `doc`: none dropped, none invented.
#[test]
fn dump_round_trips_explicit_entries() {
    let mut warnings = Vec::new();
    let config =
        RuntimeConfig::load_str(FULL_DOCUMENT, ParseMode::Strict, &mut warnings).unwrap();

    let mut catalog = two_suite_catalog();
    config.apply(&mut catalog);
    let dumped = config.dump(&catalog);

    // Explicit entries present in the source document survive.
    assert_eq!(dumped["test_suites"]["Suite_1"]["skipped"], Value::Bool(true));
    assert_eq!(
        dumped["test_suites"]["Suite_1"]["Test_2"]["skipped"],
        Value::Bool(false)
    );
    assert_eq!(
        dumped["test_suites"]["Suite_2"]["Test_1"]["skipped"],
        Value::Bool(true)
    );

    // No inherited defaults are invented for untouched entries.
    assert!(dumped["test_suites"]["Suite_2"].get("skipped").is_none());
    assert!(dumped["test_suites"]["Suite_2"]["Test_2"]
        .as_object()
        .unwrap()
        .is_empty());

    // Re-consuming the dump yields the same enabled set.
    let mut warnings = Vec::new();
    let reloaded = RuntimeConfig::load_str(
        &serde_json::to_string(&dumped).unwrap(),
        ParseMode::Tolerant,
        &mut warnings,
    )
    .unwrap();
    let mut fresh = two_suite_catalog();
    reloaded.apply(&mut fresh);

    let survivors: Vec<String> = fresh
        .suites()
        .flat_map(|suite| {
            suite
                .case_names()
                .into_iter()
                .map(|case| format!("{}::{case}", suite.name()))
                .collect::<Vec<_>>()
        })
        .collect();
    assert_eq!(
        survivors,
        vec![
            "Suite_1::Test_2".to_string(),
            "Suite_2::Test_2".to_string(),
            "Suite_2::Test_3".to_string(),
        ]
    );
}
