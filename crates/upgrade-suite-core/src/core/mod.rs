// crates/upgrade-suite-core/src/core/mod.rs
// ============================================================================
// Module: Upgrade Suite Core Types
// Description: Identifiers, typed knobs, and the options transport record.
// Purpose: Provide stable, serializable types shared by the selection runtime.
// Dependencies: serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! Core types are the data the selection pipeline consumes and produces. They
//! carry no behavior beyond parsing and encoding.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod identifiers;
pub mod knobs;
pub mod options;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use identifiers::SuiteName;
pub use identifiers::TestName;
pub use knobs::AbortAt;
pub use knobs::DisruptReboot;
pub use knobs::KnobError;
pub use knobs::UpgradeKnobs;
pub use options::MAX_TRANSPORT_BYTES;
pub use options::OptionError;
pub use options::OptionsMap;
pub use options::TransportError;
pub use options::UpgradeOptions;
pub use options::parse_options;
pub use options::split_option_list;
