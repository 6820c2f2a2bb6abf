// crates/upgrade-suite-config/src/lib.rs
// ============================================================================
// Module: Upgrade Suite Config Library
// Description: Configuration model and validation for upgrade-suite.toml.
// Purpose: Single source of truth for selection tooling settings.
// Dependencies: upgrade-suite-core, serde, toml
// ============================================================================

//! ## Overview
//! `upgrade-suite-config` defines where the transport string is read from,
//! where the test registry listing lives, and where selection audit events
//! go. Validation is strict and fails closed.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
