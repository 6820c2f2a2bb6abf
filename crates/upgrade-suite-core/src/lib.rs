// crates/upgrade-suite-core/src/lib.rs
// ============================================================================
// Module: Upgrade Suite Core Library
// Description: Public API surface for upgrade suite selection.
// Purpose: Expose core types, interfaces, and the selection runtime.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Upgrade suite core selects a named subset of upgrade tests, validates the
//! options that configure it, and packages the request as a transport string
//! that another process can decode and replay. It never runs tests; the
//! resulting [`UpgradeConfig`] is handed to an external runner.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use crate::core::*;

pub use interfaces::TestRegistry;
pub use runtime::CatalogError;
pub use runtime::DEFAULT_TRANSPORT_ENV;
pub use runtime::FileAuditSink;
pub use runtime::InMemoryAuditSink;
pub use runtime::NoopAuditSink;
pub use runtime::RegistryError;
pub use runtime::SelectionAuditEvent;
pub use runtime::SelectionAuditSink;
pub use runtime::SelectionError;
pub use runtime::SelectionOutcome;
pub use runtime::SelectionPipeline;
pub use runtime::StderrAuditSink;
pub use runtime::StaticTestRegistry;
pub use runtime::Suite;
pub use runtime::SuiteCatalog;
pub use runtime::UpgradeConfig;
