// crates/upgrade-suite-core/src/runtime/pipeline.rs
// ============================================================================
// Module: Selection Pipeline
// Description: Decode, resolve, validate, configure, and filter upgrade suites.
// Purpose: Turn a transport string into the configuration handed to the runner.
// Dependencies: crate::{core, interfaces, runtime}, thiserror
// ============================================================================

//! ## Overview
//! [`SelectionPipeline`] runs once during process setup:
//!
//! 1. decode the transport string (empty means nothing to do),
//! 2. look up the requested suite,
//! 3. validate the raw `KEY=VALUE` options,
//! 4. dispatch each option to the suite's typed setter,
//! 5. filter registry tests through the suite,
//! 6. commit the result as an [`UpgradeConfig`].
//!
//! The first failing step ends the run. Options are dispatched in ascending
//! key order; knobs set before a failing key stay in the discarded working
//! state and are never published.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use thiserror::Error;

use crate::core::identifiers::SuiteName;
use crate::core::identifiers::TestName;
use crate::core::knobs::KnobError;
use crate::core::knobs::UpgradeKnobs;
use crate::core::options::MAX_TRANSPORT_BYTES;
use crate::core::options::OptionError;
use crate::core::options::TransportError;
use crate::core::options::UpgradeOptions;
use crate::interfaces::TestRegistry;
use crate::runtime::audit::NoopAuditSink;
use crate::runtime::audit::SelectionAuditEvent;
use crate::runtime::audit::SelectionAuditSink;
use crate::runtime::catalog::SuiteCatalog;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default environment variable carrying the transport string.
pub const DEFAULT_TRANSPORT_ENV: &str = "UPGRADE_SUITE_OPTIONS";

/// Shared no-op sink used when no audit sink is configured.
static NOOP_AUDIT: NoopAuditSink = NoopAuditSink;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors that end a selection run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    /// Transport string could not be decoded.
    #[error(transparent)]
    Decode(#[from] TransportError),
    /// Requested suite is not in the catalog.
    #[error("unrecognized upgrade info: no suite named {suite:?}")]
    UnrecognizedSuite {
        /// Requested suite name.
        suite: SuiteName,
    },
    /// Option entry lacks `=` or has an empty key.
    #[error("test option {entry:?} is not valid, must be KEY=VALUE")]
    MalformedOption {
        /// Offending raw entry.
        entry: String,
    },
    /// Option key repeats.
    #[error("option {key:?} declared twice")]
    DuplicateOption {
        /// Repeated key.
        key: String,
    },
    /// Option key is not recognized by the suite.
    #[error("unrecognized upgrade option: {key} (suite {suite})")]
    UnrecognizedOption {
        /// Suite that rejected the key.
        suite: SuiteName,
        /// Unrecognized key.
        key: String,
    },
    /// Option setter rejected its value.
    #[error("suite {suite} option {key}: {source}")]
    Init {
        /// Suite being initialized.
        suite: SuiteName,
        /// Option key whose setter failed.
        key: String,
        /// Setter error.
        source: KnobError,
    },
}

impl SelectionError {
    /// Returns a stable label for the error kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Decode(_) => "decode_error",
            Self::UnrecognizedSuite {
                ..
            } => "unrecognized_suite",
            Self::MalformedOption {
                ..
            } => "malformed_option",
            Self::DuplicateOption {
                ..
            } => "duplicate_option",
            Self::UnrecognizedOption {
                ..
            } => "unrecognized_option",
            Self::Init {
                ..
            } => "init_error",
        }
    }
}

impl From<OptionError> for SelectionError {
    fn from(error: OptionError) -> Self {
        match error {
            OptionError::Malformed {
                entry,
            } => Self::MalformedOption {
                entry,
            },
            OptionError::Duplicate {
                key,
            } => Self::DuplicateOption {
                key,
            },
        }
    }
}

// ============================================================================
// SECTION: Outputs
// ============================================================================

/// Configuration committed by a successful selection, owned by the runner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpgradeConfig {
    /// Selected suite.
    suite: SuiteName,
    /// Image reference to upgrade to.
    to_image: String,
    /// Directory for JUnit results.
    junit_dir: String,
    /// Registry tests in scope, in registry order.
    tests: Vec<TestName>,
    /// Knobs set through suite options.
    knobs: UpgradeKnobs,
    /// Advisory suite timeout.
    timeout: Duration,
}

impl UpgradeConfig {
    /// Returns the selected suite name.
    #[must_use]
    pub const fn suite(&self) -> &SuiteName {
        &self.suite
    }

    /// Returns the target image reference.
    #[must_use]
    pub fn to_image(&self) -> &str {
        &self.to_image
    }

    /// Returns the JUnit output directory.
    #[must_use]
    pub fn junit_dir(&self) -> &str {
        &self.junit_dir
    }

    /// Returns the selected tests.
    #[must_use]
    pub fn tests(&self) -> &[TestName] {
        &self.tests
    }

    /// Returns the configured knobs.
    #[must_use]
    pub const fn knobs(&self) -> UpgradeKnobs {
        self.knobs
    }

    /// Returns the advisory suite timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Consumes the configuration and returns the selected tests.
    #[must_use]
    pub fn into_tests(self) -> Vec<TestName> {
        self.tests
    }
}

/// Terminal state of a successful pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionOutcome {
    /// Transport was empty; the default record is returned and nothing is configured.
    Skipped(UpgradeOptions),
    /// A suite was selected and configured.
    Selected(UpgradeConfig),
}

impl SelectionOutcome {
    /// Returns the committed configuration when a suite was selected.
    #[must_use]
    pub const fn config(&self) -> Option<&UpgradeConfig> {
        match self {
            Self::Skipped(_) => None,
            Self::Selected(config) => Some(config),
        }
    }

    /// Consumes the outcome and returns the committed configuration.
    #[must_use]
    pub fn into_config(self) -> Option<UpgradeConfig> {
        match self {
            Self::Skipped(_) => None,
            Self::Selected(config) => Some(config),
        }
    }
}

// ============================================================================
// SECTION: Pipeline
// ============================================================================

/// One-shot selection pipeline over a catalog and a test registry.
pub struct SelectionPipeline<'a, R: TestRegistry + ?Sized> {
    /// Suites available for selection.
    catalog: &'a SuiteCatalog,
    /// Source of registry tests.
    registry: &'a R,
    /// Audit sink for selection events.
    audit: &'a dyn SelectionAuditSink,
    /// Maximum accepted transport size in bytes.
    max_transport_bytes: usize,
}

impl<'a, R: TestRegistry + ?Sized> SelectionPipeline<'a, R> {
    /// Creates a pipeline with no audit sink and the default transport limit.
    #[must_use]
    pub fn new(catalog: &'a SuiteCatalog, registry: &'a R) -> Self {
        Self {
            catalog,
            registry,
            audit: &NOOP_AUDIT,
            max_transport_bytes: MAX_TRANSPORT_BYTES,
        }
    }

    /// Routes audit events to `audit`.
    #[must_use]
    pub fn with_audit(mut self, audit: &'a dyn SelectionAuditSink) -> Self {
        self.audit = audit;
        self
    }

    /// Overrides the maximum accepted transport size.
    #[must_use]
    pub const fn with_max_transport_bytes(mut self, max_transport_bytes: usize) -> Self {
        self.max_transport_bytes = max_transport_bytes;
        self
    }

    /// Runs the pipeline over a transport string.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError`] from the first failing step.
    pub fn run(&self, transport: &str) -> Result<SelectionOutcome, SelectionError> {
        if transport.is_empty() {
            self.audit.record(&SelectionAuditEvent::skipped());
            return Ok(SelectionOutcome::Skipped(UpgradeOptions::default()));
        }
        let options =
            match UpgradeOptions::from_transport_with_limit(transport, self.max_transport_bytes) {
                Ok(options) => options,
                Err(err) => return Err(self.record_failure(None, err.into())),
            };
        self.select(&options).map(SelectionOutcome::Selected)
    }

    /// Runs the pipeline over the transport string stored in environment variable `name`.
    ///
    /// An unset variable behaves like an empty transport string.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError::Decode`] when the variable is not valid UTF-8,
    /// otherwise any error from [`SelectionPipeline::run`].
    pub fn run_from_env(&self, name: &str) -> Result<SelectionOutcome, SelectionError> {
        let transport = match std::env::var_os(name) {
            None => String::new(),
            Some(raw) => raw.into_string().map_err(|_| {
                self.record_failure(
                    None,
                    TransportError::Decode(format!("{name} must be valid UTF-8")).into(),
                )
            })?,
        };
        self.run(&transport)
    }

    /// Selects and configures a suite from an already decoded record.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError`] when the suite is unknown or an option is
    /// malformed, repeated, unrecognized, or rejected by its setter.
    pub fn select(&self, options: &UpgradeOptions) -> Result<UpgradeConfig, SelectionError> {
        self.audit.record(&SelectionAuditEvent::started(
            &options.suite,
            &options.to_image,
            options.test_options.len(),
        ));
        self.configure(options).map_err(|err| self.record_failure(Some(&options.suite), err))
    }

    /// Executes lookup, validation, dispatch, filtering, and commit.
    fn configure(&self, options: &UpgradeOptions) -> Result<UpgradeConfig, SelectionError> {
        let suite = self.catalog.lookup(&options.suite)?;
        let parsed = options.options_map()?;
        let mut knobs = UpgradeKnobs::default();
        for (key, value) in &parsed {
            suite.apply_option(&mut knobs, key, value)?;
            self.audit.record(&SelectionAuditEvent::option_applied(suite.name(), key, value));
        }
        let registry_tests = self.registry.tests();
        let tests = suite.filter(registry_tests);
        self.audit.record(&SelectionAuditEvent::completed(
            suite.name(),
            &options.to_image,
            tests.len(),
            registry_tests.len(),
        ));
        Ok(UpgradeConfig {
            suite: suite.name().clone(),
            to_image: options.to_image.clone(),
            junit_dir: options.junit_dir.clone(),
            tests,
            knobs,
            timeout: suite.timeout(),
        })
    }

    /// Records a failure event and returns the error unchanged.
    fn record_failure(&self, suite: Option<&SuiteName>, error: SelectionError) -> SelectionError {
        self.audit.record(&SelectionAuditEvent::failed(suite, error.kind(), error.to_string()));
        error
    }
}
