// crates/upgrade-suite-core/tests/pipeline.rs
// ============================================================================
// Module: Selection Pipeline Tests
// Description: End-to-end tests for transport decoding through commit.
// Purpose: Ensure selection is fail-fast and commits only on success.
// Dependencies: upgrade-suite-core, tempfile
// ============================================================================
//! ## Overview
//! Drives [`SelectionPipeline`] with transport strings and checks the
//! committed [`UpgradeConfig`], the error surfaced for each failure kind, and
//! the audit trail.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::time::Duration;

use upgrade_suite_core::AbortAt;
use upgrade_suite_core::DisruptReboot;
use upgrade_suite_core::FileAuditSink;
use upgrade_suite_core::InMemoryAuditSink;
use upgrade_suite_core::KnobError;
use upgrade_suite_core::SelectionError;
use upgrade_suite_core::SelectionOutcome;
use upgrade_suite_core::SelectionPipeline;
use upgrade_suite_core::StaticTestRegistry;
use upgrade_suite_core::SuiteCatalog;
use upgrade_suite_core::SuiteName;
use upgrade_suite_core::TestName;
use upgrade_suite_core::TestRegistry;
use upgrade_suite_core::TransportError;
use upgrade_suite_core::UpgradeConfig;
use upgrade_suite_core::UpgradeKnobs;
use upgrade_suite_core::UpgradeOptions;

type TestResult = Result<(), String>;

fn registry() -> StaticTestRegistry {
    StaticTestRegistry::new(["etcd-available", "control-plane-available", "image-registry"])
}

fn transport(suite: &str, options: &[&str]) -> String {
    UpgradeOptions {
        suite: SuiteName::new(suite),
        to_image: "registry/x:y".to_string(),
        junit_dir: String::new(),
        test_options: options.iter().map(ToString::to_string).collect(),
    }
    .to_transport()
    .expect("encode")
}

fn select(input: &str) -> Result<UpgradeConfig, SelectionError> {
    let catalog = SuiteCatalog::build();
    let registry = registry();
    let outcome = SelectionPipeline::new(&catalog, &registry).run(input)?;
    outcome.into_config().ok_or_else(|| SelectionError::Decode(TransportError::Decode(
        "pipeline skipped".to_string(),
    )))
}

// ============================================================================
// SECTION: Success Paths
// ============================================================================

#[test]
fn empty_transport_is_skipped_with_default_record() {
    let catalog = SuiteCatalog::build();
    let registry = registry();
    let audit = InMemoryAuditSink::new();
    let outcome = SelectionPipeline::new(&catalog, &registry).with_audit(&audit).run("").unwrap();
    assert_eq!(outcome, SelectionOutcome::Skipped(UpgradeOptions::default()));
    assert!(outcome.config().is_none());
    let events = audit.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event, "selection_skipped");
}

#[test]
fn platform_scenario_selects_sentinel_and_sets_abort_point() {
    let config = select(
        r#"{"Suite":"platform","ToImage":"registry/x:y","TestOptions":["abort-at=50"]}"#,
    )
    .unwrap();
    assert_eq!(config.suite().as_str(), "platform");
    assert_eq!(config.to_image(), "registry/x:y");
    assert_eq!(config.tests(), [TestName::from("control-plane-available")]);
    assert_eq!(config.knobs().abort_at, AbortAt::Percent(50));
    assert_eq!(config.knobs().disrupt_reboot, DisruptReboot::None);
    assert_eq!(config.timeout(), Duration::from_secs(240 * 60));
}

#[test]
fn transport_without_options_selects_with_default_knobs() {
    let config =
        select(r#"{"Suite":"all","ToImage":"registry/x:y","JUnitDir":"","TestOptions":null}"#)
            .unwrap();
    assert_eq!(config.suite().as_str(), "all");
    assert_eq!(config.tests(), registry().tests());
    assert_eq!(config.knobs(), UpgradeKnobs::default());
}

#[test]
fn all_suite_selects_every_registry_test() {
    let config = select(&transport("all", &["disrupt-reboot=graceful"])).unwrap();
    assert_eq!(config.tests(), registry().tests());
    assert_eq!(config.knobs().disrupt_reboot, DisruptReboot::Graceful);
}

#[test]
fn empty_match_set_is_not_an_error() -> TestResult {
    let catalog = SuiteCatalog::build();
    let registry = StaticTestRegistry::new(["etcd-available"]);
    let outcome = SelectionPipeline::new(&catalog, &registry)
        .run(&transport("platform", &[]))
        .map_err(|err| err.to_string())?;
    let config = outcome.into_config().ok_or("expected a selection")?;
    if !config.tests().is_empty() {
        return Err(format!("expected no tests, got {:?}", config.tests()));
    }
    Ok(())
}

#[test]
fn junit_dir_passes_through() {
    let input = UpgradeOptions {
        suite: SuiteName::new("all"),
        junit_dir: "/tmp/junit".to_string(),
        ..UpgradeOptions::default()
    }
    .to_transport()
    .unwrap();
    let config = select(&input).unwrap();
    assert_eq!(config.junit_dir(), "/tmp/junit");
    assert_eq!(config.to_image(), "");
}

#[test]
fn select_accepts_decoded_record() {
    let catalog = SuiteCatalog::build();
    let registry = registry();
    let record = UpgradeOptions {
        suite: SuiteName::new("all"),
        test_options: vec!["abort-at=random".to_string()],
        ..UpgradeOptions::default()
    };
    let config = SelectionPipeline::new(&catalog, &registry).select(&record).unwrap();
    assert_eq!(config.knobs().abort_at, AbortAt::Random);
    assert_eq!(config.into_tests().len(), 3);
}

#[test]
fn unset_environment_variable_is_skipped() {
    let catalog = SuiteCatalog::build();
    let registry = registry();
    let outcome = SelectionPipeline::new(&catalog, &registry)
        .run_from_env("UPGRADE_SUITE_TEST_UNSET_TRANSPORT_VARIABLE")
        .unwrap();
    assert!(matches!(outcome, SelectionOutcome::Skipped(_)));
}

// ============================================================================
// SECTION: Failure Paths
// ============================================================================

#[test]
fn malformed_transport_is_decode_error() {
    let err = select("{not json").unwrap_err();
    assert!(matches!(err, SelectionError::Decode(TransportError::Decode(_))));
    assert_eq!(err.kind(), "decode_error");
}

#[test]
fn transport_limit_applies() {
    let catalog = SuiteCatalog::build();
    let registry = registry();
    let input = transport("all", &[]);
    let err = SelectionPipeline::new(&catalog, &registry)
        .with_max_transport_bytes(4)
        .run(&input)
        .unwrap_err();
    assert!(matches!(err, SelectionError::Decode(TransportError::TooLarge { .. })));
}

#[test]
fn unknown_suite_is_unrecognized() {
    let err = select(&transport("nightly", &[])).unwrap_err();
    assert_eq!(
        err,
        SelectionError::UnrecognizedSuite {
            suite: SuiteName::new("nightly")
        }
    );
    assert!(err.to_string().contains("nightly"));
}

#[test]
fn unknown_suite_wins_over_bad_options() {
    let err = select(&transport("nightly", &["junk"])).unwrap_err();
    assert_eq!(err.kind(), "unrecognized_suite");
}

#[test]
fn duplicate_option_fails_before_any_handler_runs() {
    let catalog = SuiteCatalog::build();
    let registry = registry();
    let audit = InMemoryAuditSink::new();
    let err = SelectionPipeline::new(&catalog, &registry)
        .with_audit(&audit)
        .run(&transport("platform", &["abort-at=50", "abort-at=60"]))
        .unwrap_err();
    assert_eq!(
        err,
        SelectionError::DuplicateOption {
            key: "abort-at".to_string()
        }
    );
    assert!(audit.events().iter().all(|event| event.event != "option_applied"));
}

#[test]
fn malformed_option_is_reported_with_entry() {
    let err = select(&transport("all", &["abort-at"])).unwrap_err();
    assert_eq!(
        err,
        SelectionError::MalformedOption {
            entry: "abort-at".to_string()
        }
    );
}

#[test]
fn unknown_option_is_rejected() {
    let err = select(&transport("platform", &["unknown=1"])).unwrap_err();
    assert_eq!(
        err,
        SelectionError::UnrecognizedOption {
            suite: SuiteName::new("platform"),
            key: "unknown".to_string()
        }
    );
    assert!(err.to_string().contains("unknown"));
}

#[test]
fn setter_failure_is_init_error() {
    let err = select(&transport("all", &["abort-at=200"])).unwrap_err();
    assert_eq!(
        err,
        SelectionError::Init {
            suite: SuiteName::new("all"),
            key: "abort-at".to_string(),
            source: KnobError::InvalidAbortAt("200".to_string()),
        }
    );
}

#[test]
fn options_apply_in_key_order_until_first_failure() {
    let catalog = SuiteCatalog::build();
    let registry = registry();
    let audit = InMemoryAuditSink::new();
    let err = SelectionPipeline::new(&catalog, &registry)
        .with_audit(&audit)
        .run(&transport("all", &["zzz=1", "abort-at=10"]))
        .unwrap_err();
    assert_eq!(err.kind(), "unrecognized_option");
    let applied: Vec<String> = audit
        .events()
        .into_iter()
        .filter(|event| event.event == "option_applied")
        .filter_map(|event| event.option_key)
        .collect();
    assert_eq!(applied, vec!["abort-at".to_string()]);
}

// ============================================================================
// SECTION: Audit Trail
// ============================================================================

#[test]
fn successful_run_emits_started_applied_completed() {
    let catalog = SuiteCatalog::build();
    let registry = registry();
    let audit = InMemoryAuditSink::new();
    SelectionPipeline::new(&catalog, &registry)
        .with_audit(&audit)
        .run(&transport("platform", &["abort-at=50", "disrupt-reboot=force"]))
        .unwrap();
    let labels: Vec<&str> = audit.events().iter().map(|event| event.event).collect();
    assert_eq!(
        labels,
        vec!["selection_started", "option_applied", "option_applied", "selection_completed"]
    );
    let completed = audit.events().pop().unwrap();
    assert_eq!(completed.selected_tests, Some(1));
    assert_eq!(completed.registry_tests, Some(3));
}

#[test]
fn failed_run_emits_failure_event_with_kind() {
    let catalog = SuiteCatalog::build();
    let registry = registry();
    let audit = InMemoryAuditSink::new();
    let _ = SelectionPipeline::new(&catalog, &registry)
        .with_audit(&audit)
        .run(&transport("nightly", &[]));
    let failed = audit.events().pop().unwrap();
    assert_eq!(failed.event, "selection_failed");
    assert_eq!(failed.error_kind, Some("unrecognized_suite"));
    assert_eq!(failed.suite, Some(SuiteName::new("nightly")));
}

#[test]
fn file_sink_appends_json_lines() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("audit.jsonl");
    let catalog = SuiteCatalog::build();
    let registry = registry();
    {
        let sink = FileAuditSink::new(&path).unwrap();
        SelectionPipeline::new(&catalog, &registry)
            .with_audit(&sink)
            .run(&transport("all", &[]))
            .unwrap();
    }
    let contents = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<serde_json::Value> =
        contents.lines().map(|line| serde_json::from_str(line).unwrap()).collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["event"], "selection_started");
    assert_eq!(lines[1]["event"], "selection_completed");
    assert_eq!(lines[1]["selected_tests"], 3);
}

#[test]
fn knobs_default_when_no_options() {
    let config = select(&transport("all", &[])).unwrap();
    assert_eq!(config.knobs(), UpgradeKnobs::default());
}
