// crates/upgrade-suite-core/src/runtime/catalog.rs
// ============================================================================
// Module: Upgrade Suite Catalog
// Description: Ordered, immutable registry of named upgrade suites.
// Purpose: Resolve suites by exact name and apply their option setters.
// Dependencies: crate::{core, runtime::pipeline}, thiserror
// ============================================================================

//! ## Overview
//! A [`Suite`] pairs a name-matching predicate with a scope filter, a closed
//! table of option setters, and an advisory timeout. The [`SuiteCatalog`]
//! keeps suites in registration order and guarantees their names are unique,
//! so lookup by exact name is unambiguous.
//!
//! Matching is case-sensitive substring and equality testing only.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::time::Duration;

use thiserror::Error;

use crate::core::identifiers::SuiteName;
use crate::core::identifiers::TestName;
use crate::core::knobs::KnobError;
use crate::core::knobs::UpgradeKnobs;
use crate::runtime::pipeline::SelectionError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Tag carried by every cluster upgrade test.
pub const CLUSTER_UPGRADE_TAG: &str = "[Feature:ClusterUpgrade]";
/// Tag carried by every test in the openshift suite.
pub const OPENSHIFT_SUITE_TAG: &str = "[Suite:openshift]";
/// Test verifying the control plane stays available during an upgrade.
pub const CONTROL_PLANE_AVAILABLE_TEST: &str = "control-plane-available";
/// Option key controlling the abort point.
pub const ABORT_AT_OPTION: &str = "abort-at";
/// Option key controlling reboot disruption.
pub const DISRUPT_REBOOT_OPTION: &str = "disrupt-reboot";
/// Default advisory timeout for upgrade suites.
pub const DEFAULT_SUITE_TIMEOUT: Duration = Duration::from_secs(240 * 60);

// ============================================================================
// SECTION: Types
// ============================================================================

/// Predicate over test names.
pub type NameMatcher = fn(&str) -> bool;

/// Typed setter invoked for a recognized option key.
pub type OptionSetter = fn(&mut UpgradeKnobs, &str) -> Result<(), KnobError>;

/// Errors raised while building a catalog.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// Two suites share a name.
    #[error("suite {0:?} registered twice")]
    DuplicateSuite(SuiteName),
    /// A suite has an empty name.
    #[error("suite name must not be empty")]
    EmptyName,
}

// ============================================================================
// SECTION: Suite
// ============================================================================

/// Named group of upgrade tests with its initialization hooks.
#[derive(Debug, Clone)]
pub struct Suite {
    /// Unique suite name.
    name: SuiteName,
    /// Human-readable description.
    description: String,
    /// Predicate every selected test must satisfy.
    matcher: NameMatcher,
    /// Additional scope filter applied during initialization.
    scope: NameMatcher,
    /// Recognized option keys and their setters.
    setters: BTreeMap<&'static str, OptionSetter>,
    /// Advisory timeout handed to the runner.
    timeout: Duration,
}

impl Suite {
    /// Creates a suite with no options and an unrestricted scope.
    #[must_use]
    pub fn new(
        name: impl Into<SuiteName>,
        description: impl Into<String>,
        matcher: NameMatcher,
        timeout: Duration,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            matcher,
            scope: any_test,
            setters: BTreeMap::new(),
            timeout,
        }
    }

    /// Restricts the suite to tests accepted by `scope`.
    #[must_use]
    pub fn with_scope(mut self, scope: NameMatcher) -> Self {
        self.scope = scope;
        self
    }

    /// Registers a setter for `key`. A later registration replaces an earlier one.
    #[must_use]
    pub fn with_option(mut self, key: &'static str, setter: OptionSetter) -> Self {
        self.setters.insert(key, setter);
        self
    }

    /// Registers the standard upgrade knobs (`abort-at`, `disrupt-reboot`).
    #[must_use]
    pub fn with_upgrade_knobs(self) -> Self {
        self.with_option(ABORT_AT_OPTION, UpgradeKnobs::set_abort_at)
            .with_option(DISRUPT_REBOOT_OPTION, UpgradeKnobs::set_disrupt_reboot)
    }

    /// Returns the suite name.
    #[must_use]
    pub const fn name(&self) -> &SuiteName {
        &self.name
    }

    /// Returns the suite description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the advisory timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns the recognized option keys in ascending order.
    pub fn option_keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.setters.keys().copied()
    }

    /// Returns true when `name` satisfies both the matcher and the scope filter.
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        (self.matcher)(name) && (self.scope)(name)
    }

    /// Returns true when a registry test named `name` is in this suite's scope.
    #[must_use]
    pub fn in_scope(&self, name: &str) -> bool {
        (self.scope)(name)
    }

    /// Returns the registry tests in scope, preserving registry order.
    ///
    /// Registry tests are identified by their short upgrade-test names, which
    /// never carry the suite tags, so only the scope filter applies here.
    #[must_use]
    pub fn filter(&self, tests: &[TestName]) -> Vec<TestName> {
        tests.iter().filter(|test| self.in_scope(test.as_str())).cloned().collect()
    }

    /// Applies a single option through its registered setter.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError::UnrecognizedOption`] when `key` is not in the
    /// suite's table and [`SelectionError::Init`] when the setter rejects `value`.
    pub fn apply_option(
        &self,
        knobs: &mut UpgradeKnobs,
        key: &str,
        value: &str,
    ) -> Result<(), SelectionError> {
        let Some(setter) = self.setters.get(key) else {
            return Err(SelectionError::UnrecognizedOption {
                suite: self.name.clone(),
                key: key.to_string(),
            });
        };
        setter(knobs, value).map_err(|source| SelectionError::Init {
            suite: self.name.clone(),
            key: key.to_string(),
            source,
        })
    }
}

// ============================================================================
// SECTION: Catalog
// ============================================================================

/// Ordered collection of suites with unique names.
#[derive(Debug, Clone)]
pub struct SuiteCatalog {
    /// Suites in registration order.
    suites: Vec<Suite>,
}

impl SuiteCatalog {
    /// Builds a catalog from `suites`, rejecting empty or repeated names.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when a name is empty or registered twice.
    pub fn new(suites: Vec<Suite>) -> Result<Self, CatalogError> {
        let mut seen = BTreeSet::new();
        for suite in &suites {
            if suite.name.as_str().is_empty() {
                return Err(CatalogError::EmptyName);
            }
            if !seen.insert(suite.name.as_str()) {
                return Err(CatalogError::DuplicateSuite(suite.name.clone()));
            }
        }
        Ok(Self {
            suites,
        })
    }

    /// Returns the built-in upgrade suites.
    #[must_use]
    pub fn build() -> Self {
        Self {
            suites: vec![
                Suite::new("all", "Run all tests.", is_cluster_upgrade_test, DEFAULT_SUITE_TIMEOUT)
                    .with_upgrade_knobs(),
                Suite::new(
                    "platform",
                    "Run only the tests that verify the platform remains available.",
                    is_cluster_upgrade_test,
                    DEFAULT_SUITE_TIMEOUT,
                )
                .with_scope(is_control_plane_available)
                .with_upgrade_knobs(),
            ],
        }
    }

    /// Resolves a suite by exact name.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError::UnrecognizedSuite`] when no suite has that name.
    pub fn lookup(&self, name: &SuiteName) -> Result<&Suite, SelectionError> {
        self.suites.iter().find(|suite| suite.name == *name).ok_or_else(|| {
            SelectionError::UnrecognizedSuite {
                suite: name.clone(),
            }
        })
    }

    /// Returns the suites in registration order.
    #[must_use]
    pub fn suites(&self) -> &[Suite] {
        &self.suites
    }
}

impl Default for SuiteCatalog {
    fn default() -> Self {
        Self::build()
    }
}

// ============================================================================
// SECTION: Matchers
// ============================================================================

/// Accepts every test name.
#[must_use]
pub const fn any_test(_name: &str) -> bool {
    true
}

/// Returns true when `name` carries both the cluster-upgrade and openshift tags.
#[must_use]
pub fn is_cluster_upgrade_test(name: &str) -> bool {
    name.contains(CLUSTER_UPGRADE_TAG) && name.contains(OPENSHIFT_SUITE_TAG)
}

/// Returns true when `name` is exactly the control-plane availability test.
#[must_use]
pub fn is_control_plane_available(name: &str) -> bool {
    name == CONTROL_PLANE_AVAILABLE_TEST
}
