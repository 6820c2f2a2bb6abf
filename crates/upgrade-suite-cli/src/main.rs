// crates/upgrade-suite-cli/src/main.rs
// ============================================================================
// Module: Upgrade Suite CLI Entry Point
// Description: Command dispatcher for upgrade suite encoding and selection.
// Purpose: Provide a safe CLI around the transport codec and selection pipeline.
// Dependencies: clap, serde, serde_json, thiserror, upgrade-suite-config, upgrade-suite-core.
// ============================================================================

//! ## Overview
//! The `upgrade-suite` CLI binds caller-facing flags to an options record and
//! prints its transport string (`encode`), runs the selection pipeline over a
//! transport string and a test registry listing (`select`), and lists the
//! suite catalog (`suites list`). All user-facing strings are routed through
//! the i18n catalog. Any failure exits non-zero so the runner never starts.

// ============================================================================
// SECTION: Modules
// ============================================================================

#[cfg(test)]
mod main_tests;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::ArgAction;
use clap::Args;
use clap::CommandFactory;
use clap::Parser;
use clap::Subcommand;
use serde::Serialize;
use thiserror::Error;
use upgrade_suite_cli::t;
use upgrade_suite_config::AuditConfig;
use upgrade_suite_config::UpgradeSuiteConfig;
use upgrade_suite_core::FileAuditSink;
use upgrade_suite_core::NoopAuditSink;
use upgrade_suite_core::SelectionAuditSink;
use upgrade_suite_core::SelectionOutcome;
use upgrade_suite_core::SelectionPipeline;
use upgrade_suite_core::StaticTestRegistry;
use upgrade_suite_core::StderrAuditSink;
use upgrade_suite_core::SuiteCatalog;
use upgrade_suite_core::SuiteName;
use upgrade_suite_core::TestName;
use upgrade_suite_core::UpgradeKnobs;
use upgrade_suite_core::UpgradeOptions;
use upgrade_suite_core::split_option_list;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "upgrade-suite", disable_help_subcommand = true, disable_version_flag = true)]
struct Cli {
    /// Print version information and exit.
    #[arg(long = "version", action = ArgAction::SetTrue, global = true)]
    show_version: bool,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Encode upgrade options into a transport string.
    Encode(EncodeCommand),
    /// Select and configure an upgrade suite from a transport string.
    Select(SelectCommand),
    /// Suite catalog utilities.
    Suites {
        /// Selected suites subcommand.
        #[command(subcommand)]
        command: SuitesCommand,
    },
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Arguments for the `encode` command.
#[derive(Args, Debug)]
struct EncodeCommand {
    /// Upgrade suite to run.
    #[arg(long, value_name = "NAME")]
    suite: String,
    /// Image reference to upgrade to.
    #[arg(long = "to-image", value_name = "IMAGE")]
    to_image: String,
    /// Directory for JUnit results.
    #[arg(long = "junit-dir", value_name = "DIR", default_value = "")]
    junit_dir: String,
    /// Suite options as KEY=VALUE; repeatable or comma-separated.
    #[arg(long = "options", value_name = "KEY=VALUE")]
    options: Vec<String>,
}

/// Arguments for the `select` command.
#[derive(Args, Debug)]
struct SelectCommand {
    /// Transport string (defaults to the configured environment variable).
    #[arg(long, value_name = "STR")]
    transport: Option<String>,
    /// Optional config file path (defaults to upgrade-suite.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// JSON array of registry test names (overrides `registry.path`).
    #[arg(long, value_name = "PATH")]
    registry: Option<PathBuf>,
}

/// Suites subcommands.
#[derive(Subcommand, Debug)]
enum SuitesCommand {
    /// List the suite catalog.
    List,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Validate a config file.
    Validate(ConfigValidateCommand),
}

/// Arguments for `config validate`.
#[derive(Args, Debug)]
struct ConfigValidateCommand {
    /// Optional config file path (defaults to upgrade-suite.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for localized error messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a localized message.
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Reports
// ============================================================================

/// Selection status reported by `select`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum SelectionStatus {
    /// Transport was empty; nothing was selected.
    Skipped,
    /// A suite was selected and configured.
    Selected,
}

/// JSON report printed by `select`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct SelectionReport {
    /// Selection status.
    status: SelectionStatus,
    /// Selected suite name.
    #[serde(skip_serializing_if = "Option::is_none")]
    suite: Option<SuiteName>,
    /// Target image reference.
    #[serde(skip_serializing_if = "Option::is_none")]
    to_image: Option<String>,
    /// JUnit output directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    junit_dir: Option<String>,
    /// Advisory suite timeout in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    timeout_secs: Option<u64>,
    /// Knobs set through suite options.
    #[serde(skip_serializing_if = "Option::is_none")]
    knobs: Option<UpgradeKnobs>,
    /// Selected tests in registry order.
    tests: Vec<TestName>,
}

impl SelectionReport {
    /// Builds a report from a pipeline outcome.
    fn from_outcome(outcome: SelectionOutcome) -> Self {
        match outcome {
            SelectionOutcome::Skipped(_) => Self {
                status: SelectionStatus::Skipped,
                suite: None,
                to_image: None,
                junit_dir: None,
                timeout_secs: None,
                knobs: None,
                tests: Vec::new(),
            },
            SelectionOutcome::Selected(config) => Self {
                status: SelectionStatus::Selected,
                suite: Some(config.suite().clone()),
                to_image: Some(config.to_image().to_string()),
                junit_dir: Some(config.junit_dir().to_string()),
                timeout_secs: Some(config.timeout().as_secs()),
                knobs: Some(config.knobs()),
                tests: config.into_tests(),
            },
        }
    }
}

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();

    if cli.show_version {
        let version = env!("CARGO_PKG_VERSION");
        write_stdout_line(&t!("main.version", version = version))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    }

    let Some(command) = cli.command else {
        show_help()?;
        return Ok(ExitCode::SUCCESS);
    };

    match command {
        Commands::Encode(command) => command_encode(command),
        Commands::Select(command) => command_select(&command),
        Commands::Suites {
            command,
        } => command_suites(&command),
        Commands::Config {
            command,
        } => command_config(&command),
    }
}

/// Emits the top-level help message for the CLI.
fn show_help() -> CliResult<()> {
    let mut command = Cli::command();
    command.print_help().map_err(|err| CliError::new(output_error("stdout", &err)))?;
    write_stdout_line("").map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(())
}

// ============================================================================
// SECTION: Encode Command
// ============================================================================

/// Executes the `encode` command.
fn command_encode(command: EncodeCommand) -> CliResult<ExitCode> {
    let options = options_from_flags(command);
    let catalog = SuiteCatalog::build();
    let registry = StaticTestRegistry::default();
    SelectionPipeline::new(&catalog, &registry)
        .select(&options)
        .map_err(|err| CliError::new(t!("encode.invalid", error = err)))?;
    let transport = options
        .to_transport()
        .map_err(|err| CliError::new(t!("encode.failed", error = err)))?;
    write_stdout_line(&transport).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Binds `encode` flags to an options record.
fn options_from_flags(command: EncodeCommand) -> UpgradeOptions {
    UpgradeOptions {
        suite: SuiteName::new(command.suite),
        to_image: command.to_image,
        junit_dir: command.junit_dir,
        test_options: split_option_list(&command.options),
    }
}

// ============================================================================
// SECTION: Select Command
// ============================================================================

/// Executes the `select` command.
fn command_select(command: &SelectCommand) -> CliResult<ExitCode> {
    let config = UpgradeSuiteConfig::load(command.config.as_deref())
        .map_err(|err| CliError::new(t!("config.load_failed", error = err)))?;
    let registry = load_registry(&config, command.registry.as_deref())?;
    let audit = build_audit_sink(&config.audit)?;
    let catalog = SuiteCatalog::build();
    let pipeline = SelectionPipeline::new(&catalog, &registry)
        .with_audit(audit.as_ref())
        .with_max_transport_bytes(config.transport.max_bytes);
    let outcome = match &command.transport {
        Some(transport) => pipeline.run(transport),
        None => pipeline.run_from_env(&config.transport.env_var),
    }
    .map_err(|err| CliError::new(t!("select.failed", error = err)))?;
    let report = SelectionReport::from_outcome(outcome);
    let rendered = serde_json::to_string(&report)
        .map_err(|err| CliError::new(t!("select.serialize_failed", error = err)))?;
    write_stdout_line(&rendered).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Loads the test registry listing named by the flag or the config.
///
/// No listing yields an empty registry.
fn load_registry(
    config: &UpgradeSuiteConfig,
    override_path: Option<&Path>,
) -> CliResult<StaticTestRegistry> {
    let path = match (override_path, config.registry.path.as_deref()) {
        (Some(path), _) => path.to_path_buf(),
        (None, Some(path)) => PathBuf::from(path.trim()),
        (None, None) => return Ok(StaticTestRegistry::default()),
    };
    let kind = t!("registry.kind");
    let path_label = path.display().to_string();
    let bytes = read_bytes_with_limit(&path, config.registry.max_bytes).map_err(|err| match err {
        ReadLimitError::Io(err) => CliError::new(t!(
            "registry.read_failed",
            kind = kind,
            path = path_label,
            error = err
        )),
        ReadLimitError::TooLarge {
            size,
            limit,
        } => CliError::new(t!(
            "input.read_too_large",
            kind = kind,
            path = path_label,
            size = size,
            limit = limit
        )),
    })?;
    let listing = std::str::from_utf8(&bytes).map_err(|err| {
        CliError::new(t!("registry.parse_failed", kind = kind, path = path_label, error = err))
    })?;
    StaticTestRegistry::from_json(listing).map_err(|err| {
        CliError::new(t!("registry.parse_failed", kind = kind, path = path_label, error = err))
    })
}

/// Builds the audit sink described by the audit config.
fn build_audit_sink(config: &AuditConfig) -> CliResult<Box<dyn SelectionAuditSink>> {
    if !config.enabled {
        return Ok(Box::new(NoopAuditSink));
    }
    let Some(path) = config.path.as_deref() else {
        return Ok(Box::new(StderrAuditSink));
    };
    let path = Path::new(path.trim());
    let sink = FileAuditSink::new(path).map_err(|err| {
        CliError::new(t!("audit.open_failed", path = path.display(), error = err))
    })?;
    Ok(Box::new(sink))
}

// ============================================================================
// SECTION: Suites Command
// ============================================================================

/// Dispatches suites subcommands.
fn command_suites(command: &SuitesCommand) -> CliResult<ExitCode> {
    match command {
        SuitesCommand::List => command_suites_list(),
    }
}

/// Prints the suite catalog in registration order.
fn command_suites_list() -> CliResult<ExitCode> {
    let catalog = SuiteCatalog::build();
    let mut output = String::new();
    output.push_str(&t!("suites.list.header"));
    output.push('\n');
    for suite in catalog.suites() {
        let keys: Vec<&str> = suite.option_keys().collect();
        let options =
            if keys.is_empty() { t!("suites.list.options.none") } else { keys.join(", ") };
        output.push_str(&t!(
            "suites.list.entry",
            name = suite.name(),
            description = suite.description(),
            timeout = format_timeout(suite.timeout().as_secs()),
            options = options
        ));
        output.push('\n');
    }
    write_stdout_bytes(output.as_bytes())
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Formats a timeout as whole minutes when possible.
fn format_timeout(secs: u64) -> String {
    if secs % 60 == 0 { format!("{}m", secs / 60) } else { format!("{secs}s") }
}

// ============================================================================
// SECTION: Config Command
// ============================================================================

/// Dispatches config subcommands.
fn command_config(command: &ConfigCommand) -> CliResult<ExitCode> {
    match command {
        ConfigCommand::Validate(command) => command_config_validate(command),
    }
}

/// Executes the config validation command.
fn command_config_validate(command: &ConfigValidateCommand) -> CliResult<ExitCode> {
    let _config = UpgradeSuiteConfig::load(command.config.as_deref())
        .map_err(|err| CliError::new(t!("config.load_failed", error = err)))?;
    write_stdout_line(&t!("config.validate.ok"))
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Input Helpers
// ============================================================================

/// Errors returned by bounded file reads.
#[derive(Debug)]
enum ReadLimitError {
    /// File I/O failure.
    Io(std::io::Error),
    /// File size exceeds the configured limit.
    TooLarge {
        /// Actual size in bytes.
        size: u64,
        /// Allowed limit in bytes.
        limit: usize,
    },
}

/// Reads a file from disk while enforcing a hard size limit.
fn read_bytes_with_limit(path: &Path, max_bytes: usize) -> Result<Vec<u8>, ReadLimitError> {
    let file = File::open(path).map_err(ReadLimitError::Io)?;
    let size = file.metadata().map_err(ReadLimitError::Io)?.len();
    let limit = u64::try_from(max_bytes).map_err(|_| ReadLimitError::TooLarge {
        size,
        limit: max_bytes,
    })?;
    if size > limit {
        return Err(ReadLimitError::TooLarge {
            size,
            limit: max_bytes,
        });
    }

    // Files can grow between the metadata check and the read.
    let mut limited = file.take(limit.saturating_add(1));
    let mut bytes = Vec::new();
    limited.read_to_end(&mut bytes).map_err(ReadLimitError::Io)?;
    if bytes.len() > max_bytes {
        return Err(ReadLimitError::TooLarge {
            size: u64::try_from(bytes.len()).unwrap_or(u64::MAX),
            limit: max_bytes,
        });
    }
    Ok(bytes)
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes raw bytes to stdout without adding a newline.
fn write_stdout_bytes(bytes: &[u8]) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    stdout.write_all(bytes)
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats a localized output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    let stream_label = match stream {
        "stdout" => t!("output.stream.stdout"),
        "stderr" => t!("output.stream.stderr"),
        _ => t!("output.stream.unknown"),
    };
    t!("output.write_failed", stream = stream_label, error = error)
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
