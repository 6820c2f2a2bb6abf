// crates/upgrade-suite-core/src/runtime/mod.rs
// ============================================================================
// Module: Upgrade Suite Runtime
// Description: Suite catalog, selection pipeline, audit sinks, and registries.
// Purpose: Select and configure upgrade suites ahead of test execution.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! Runtime modules implement suite lookup, option dispatch, and test
//! filtering. Every caller goes through [`SelectionPipeline`] so the CLI and
//! embedding hosts observe identical behavior.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod audit;
pub mod catalog;
pub mod pipeline;
pub mod registry;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::FileAuditSink;
pub use audit::InMemoryAuditSink;
pub use audit::NoopAuditSink;
pub use audit::SelectionAuditEvent;
pub use audit::SelectionAuditSink;
pub use audit::StderrAuditSink;
pub use catalog::CatalogError;
pub use catalog::Suite;
pub use catalog::SuiteCatalog;
pub use pipeline::DEFAULT_TRANSPORT_ENV;
pub use pipeline::SelectionError;
pub use pipeline::SelectionOutcome;
pub use pipeline::SelectionPipeline;
pub use pipeline::UpgradeConfig;
pub use registry::RegistryError;
pub use registry::StaticTestRegistry;
