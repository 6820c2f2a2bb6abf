// crates/upgrade-suite-core/src/interfaces/mod.rs
// ============================================================================
// Module: Upgrade Suite Interfaces
// Description: Contract surfaces between the selection runtime and its hosts.
// Purpose: Decouple suite selection from where upgrade tests are defined.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! The selection runtime never defines upgrade tests itself. It reads them
//! from a [`TestRegistry`] supplied by the host binary and only ever looks at
//! their names.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::identifiers::TestName;

// ============================================================================
// SECTION: Test Registry
// ============================================================================

/// Source of every upgrade test known to the host.
pub trait TestRegistry {
    /// Returns all registered tests in registration order.
    fn tests(&self) -> &[TestName];
}

impl TestRegistry for [TestName] {
    fn tests(&self) -> &[TestName] {
        self
    }
}

impl TestRegistry for Vec<TestName> {
    fn tests(&self) -> &[TestName] {
        self
    }
}
