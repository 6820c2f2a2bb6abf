// crates/upgrade-suite-core/src/runtime/registry.rs
// ============================================================================
// Module: Static Test Registry
// Description: In-memory registry of upgrade test names.
// Purpose: Provide a simple registry for hosts and tests.
// Dependencies: crate::{core, interfaces}, serde_json, thiserror
// ============================================================================

//! ## Overview
//! [`StaticTestRegistry`] holds a fixed list of test names. Hosts that define
//! their tests elsewhere can load the list from a JSON array of strings.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::identifiers::TestName;
use crate::interfaces::TestRegistry;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while loading a registry listing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Listing is not a JSON array of strings.
    #[error("invalid test registry listing: {0}")]
    Parse(String),
    /// Listing contains an empty test name.
    #[error("test registry entry {0} has an empty name")]
    EmptyName(usize),
}

// ============================================================================
// SECTION: Registry
// ============================================================================

/// Fixed, ordered collection of upgrade test names.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StaticTestRegistry {
    /// Registered tests in registration order.
    tests: Vec<TestName>,
}

impl StaticTestRegistry {
    /// Creates a registry from test names.
    #[must_use]
    pub fn new<I, T>(tests: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<TestName>,
    {
        Self {
            tests: tests.into_iter().map(Into::into).collect(),
        }
    }

    /// Parses a JSON array of test names.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] when the listing is malformed or contains an
    /// empty name.
    pub fn from_json(listing: &str) -> Result<Self, RegistryError> {
        let names: Vec<String> =
            serde_json::from_str(listing).map_err(|err| RegistryError::Parse(err.to_string()))?;
        if let Some(index) = names.iter().position(String::is_empty) {
            return Err(RegistryError::EmptyName(index));
        }
        Ok(Self::new(names))
    }

    /// Returns the number of registered tests.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tests.len()
    }

    /// Returns true when no tests are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }
}

impl TestRegistry for StaticTestRegistry {
    fn tests(&self) -> &[TestName] {
        &self.tests
    }
}
