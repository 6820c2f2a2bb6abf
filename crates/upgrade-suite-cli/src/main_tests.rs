// crates/upgrade-suite-cli/src/main_tests.rs
// ============================================================================
// Module: CLI Main Helpers Tests
// Description: Unit tests for flag binding, bounded reads, and reports.
// Purpose: Ensure flags map onto the options record and inputs fail closed.
// Dependencies: upgrade-suite-cli main helpers, tempfile
// ============================================================================

//! ## Overview
//! Validates clap parsing for each command, `--options` splitting,
//! `read_bytes_with_limit` size enforcement, and selection report rendering.

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

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;

use clap::Parser;
use upgrade_suite_config::AuditConfig;
use upgrade_suite_config::UpgradeSuiteConfig;
use upgrade_suite_core::AbortAt;
use upgrade_suite_core::SelectionOutcome;
use upgrade_suite_core::SelectionPipeline;
use upgrade_suite_core::StaticTestRegistry;
use upgrade_suite_core::SuiteCatalog;
use upgrade_suite_core::UpgradeOptions;

use super::Cli;
use super::Commands;
use super::ReadLimitError;
use super::SelectionReport;
use super::SelectionStatus;
use super::SuitesCommand;
use super::build_audit_sink;
use super::format_timeout;
use super::load_registry;
use super::options_from_flags;
use super::read_bytes_with_limit;

// ============================================================================
// SECTION: Argument Parsing
// ============================================================================

#[test]
fn encode_binds_flags_and_splits_options() {
    let cli = Cli::try_parse_from([
        "upgrade-suite",
        "encode",
        "--suite",
        "platform",
        "--to-image",
        "registry/x:y",
        "--options",
        "abort-at=50,disrupt-reboot=force",
        "--options",
        "x=1",
    ])
    .expect("parse encode");
    let Some(Commands::Encode(command)) = cli.command else {
        panic!("expected encode command");
    };
    let options = options_from_flags(command);
    assert_eq!(options.suite.as_str(), "platform");
    assert_eq!(options.to_image, "registry/x:y");
    assert_eq!(options.junit_dir, "");
    assert_eq!(options.test_options, vec!["abort-at=50", "disrupt-reboot=force", "x=1"]);
}

#[test]
fn encode_requires_suite_and_image() {
    assert!(Cli::try_parse_from(["upgrade-suite", "encode", "--suite", "all"]).is_err());
    assert!(Cli::try_parse_from(["upgrade-suite", "encode", "--to-image", "img"]).is_err());
}

#[test]
fn select_flags_are_optional() {
    let cli = Cli::try_parse_from(["upgrade-suite", "select"]).expect("parse select");
    let Some(Commands::Select(command)) = cli.command else {
        panic!("expected select command");
    };
    assert!(command.transport.is_none());
    assert!(command.config.is_none());
    assert!(command.registry.is_none());
}

#[test]
fn suites_list_parses() {
    let cli = Cli::try_parse_from(["upgrade-suite", "suites", "list"]).expect("parse suites");
    assert!(matches!(
        cli.command,
        Some(Commands::Suites {
            command: SuitesCommand::List
        })
    ));
}

#[test]
fn version_flag_is_global() {
    let cli = Cli::try_parse_from(["upgrade-suite", "--version"]).expect("parse version");
    assert!(cli.show_version);
    assert!(cli.command.is_none());
}

// ============================================================================
// SECTION: Bounded Reads
// ============================================================================

#[test]
fn read_bytes_with_limit_allows_small_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("small.bin");
    fs::write(&path, b"ok").expect("write small file");
    assert_eq!(read_bytes_with_limit(&path, 16).expect("read small file"), b"ok");
}

#[test]
fn read_bytes_with_limit_rejects_large_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("large.bin");
    let limit = 8_usize;
    fs::write(&path, vec![0_u8; limit + 1]).expect("write large file");
    match read_bytes_with_limit(&path, limit).expect_err("expected size limit failure") {
        ReadLimitError::TooLarge {
            size,
            limit: reported,
        } => {
            assert_eq!(size, 9);
            assert_eq!(reported, limit);
        }
        ReadLimitError::Io(err) => panic!("unexpected IO error: {err}"),
    }
}

// ============================================================================
// SECTION: Registry and Audit
// ============================================================================

#[test]
fn load_registry_prefers_flag_over_config() {
    let dir = tempfile::tempdir().expect("tempdir");
    let flag_path = dir.path().join("flag.json");
    fs::write(&flag_path, r#"["control-plane-available","etcd"]"#).expect("write listing");
    let mut config = UpgradeSuiteConfig::default();
    config.registry.path = Some(dir.path().join("absent.json").display().to_string());

    let registry = load_registry(&config, Some(&flag_path)).expect("load registry");
    assert_eq!(registry.len(), 2);
}

#[test]
fn load_registry_without_listing_is_empty() {
    let registry = load_registry(&UpgradeSuiteConfig::default(), None).expect("empty registry");
    assert!(registry.is_empty());
}

#[test]
fn load_registry_enforces_size_limit() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("registry.json");
    fs::write(&path, r#"["a","b","c"]"#).expect("write listing");
    let mut config = UpgradeSuiteConfig::default();
    config.registry.max_bytes = 4;
    let err = load_registry(&config, Some(&path)).expect_err("expected size failure");
    assert!(err.to_string().contains("limit 4"));
}

#[test]
fn load_registry_rejects_malformed_listing() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("registry.json");
    fs::write(&path, r#"{"tests":[]}"#).expect("write listing");
    let err = load_registry(&UpgradeSuiteConfig::default(), Some(&path)).expect_err("malformed");
    assert!(err.to_string().starts_with("Failed to parse test registry"));
}

#[test]
fn build_audit_sink_opens_configured_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("audit.jsonl");
    let config = AuditConfig {
        enabled: true,
        path: Some(path.display().to_string()),
    };
    let sink = build_audit_sink(&config).expect("file sink");
    let catalog = SuiteCatalog::build();
    let registry = StaticTestRegistry::default();
    SelectionPipeline::new(&catalog, &registry).with_audit(sink.as_ref()).run("").expect("skip");
    let contents = fs::read_to_string(&path).expect("read audit log");
    assert!(contents.contains("\"event\":\"selection_skipped\""));
}

// ============================================================================
// SECTION: Reports
// ============================================================================

#[test]
fn skipped_report_has_no_selection() {
    let report = SelectionReport::from_outcome(SelectionOutcome::Skipped(UpgradeOptions::default()));
    assert_eq!(report.status, SelectionStatus::Skipped);
    let rendered = serde_json::to_string(&report).expect("render");
    assert_eq!(rendered, r#"{"status":"skipped","tests":[]}"#);
}

#[test]
fn selected_report_carries_configuration() {
    let catalog = SuiteCatalog::build();
    let registry = StaticTestRegistry::new(["etcd", "control-plane-available"]);
    let outcome = SelectionPipeline::new(&catalog, &registry)
        .run(r#"{"Suite":"platform","ToImage":"registry/x:y","TestOptions":["abort-at=50"]}"#)
        .expect("select");
    let report = SelectionReport::from_outcome(outcome);
    assert_eq!(report.status, SelectionStatus::Selected);
    assert_eq!(report.timeout_secs, Some(240 * 60));
    assert_eq!(report.knobs.map(|knobs| knobs.abort_at), Some(AbortAt::Percent(50)));
    let value = serde_json::to_value(&report).expect("render");
    assert_eq!(value["suite"], "platform");
    assert_eq!(value["to_image"], "registry/x:y");
    assert_eq!(value["tests"], serde_json::json!(["control-plane-available"]));
}

#[test]
fn format_timeout_prefers_minutes() {
    assert_eq!(format_timeout(240 * 60), "240m");
    assert_eq!(format_timeout(90), "90s");
}
