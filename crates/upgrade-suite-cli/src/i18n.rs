// crates/upgrade-suite-cli/src/i18n.rs
// ============================================================================
// Module: Upgrade Suite CLI Messages
// Description: English message catalog for upgrade-suite command output.
// Purpose: Keep selection, encode, and config diagnostics worded in one place.
// Dependencies: std::collections::HashMap, std::sync::OnceLock
// ============================================================================

//! ## Overview
//! Every line `upgrade-suite` prints to a human (selection failures, encode
//! refusals, registry and config errors, the suite listing) is a keyed
//! template in [`CATALOG_ITEMS`]. Commands render them with the
//! [`t!`](crate::t) macro, which fills `{name}` placeholders from named
//! arguments. Machine-readable output (the transport string and the JSON
//! selection report) does not go through the catalog.
//!
//! ## Invariants
//! - Keys are unique and grouped by command prefix (`select.`, `encode.`, ...).
//! - An unknown key renders as the key itself.
//! - Placeholders without a matching argument are left untouched.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Named placeholder value passed to [`translate`].
#[derive(Clone)]
pub struct MessageArg {
    /// Placeholder name without braces, such as `path` or `suite`.
    pub key: &'static str,
    /// Rendered value substituted for the placeholder.
    pub value: String,
}

impl MessageArg {
    /// Pairs a placeholder name with its rendered value.
    pub fn new(key: &'static str, value: impl Into<String>) -> Self {
        Self {
            key,
            value: value.into(),
        }
    }
}

// ============================================================================
// SECTION: Catalog
// ============================================================================

/// Message templates keyed by command and outcome.
pub const CATALOG_ITEMS: &[(&str, &str)] = &[
    ("main.version", "upgrade-suite {version}"),
    ("output.stream.stdout", "stdout"),
    ("output.stream.stderr", "stderr"),
    ("output.stream.unknown", "output"),
    ("output.write_failed", "Failed to write to {stream}: {error}"),
    (
        "input.read_too_large",
        "Refusing to read {kind} at {path} because it is {size} bytes (limit {limit}).",
    ),
    ("config.load_failed", "Failed to load config: {error}"),
    ("config.validate.ok", "Config valid."),
    ("encode.invalid", "Refusing to encode invalid upgrade options: {error}"),
    ("encode.failed", "Failed to encode upgrade options: {error}"),
    ("registry.kind", "test registry"),
    ("registry.read_failed", "Failed to read {kind} at {path}: {error}"),
    ("registry.parse_failed", "Failed to parse {kind} at {path}: {error}"),
    ("audit.open_failed", "Failed to open audit log {path}: {error}"),
    ("select.failed", "Upgrade suite selection failed: {error}"),
    ("select.serialize_failed", "Failed to serialize selection report: {error}"),
    ("suites.list.header", "Available upgrade suites:"),
    ("suites.list.entry", "  {name}\t{description} (timeout {timeout}, options: {options})"),
    ("suites.list.options.none", "none"),
];

// ============================================================================
// SECTION: Translation
// ============================================================================

/// Renders the template for `key`, filling placeholders from `args` in order.
#[must_use]
pub fn translate(key: &str, args: Vec<MessageArg>) -> String {
    let template = messages().get(key).copied().unwrap_or(key);
    args.into_iter().fold(template.to_string(), |message, arg| {
        message.replace(&format!("{{{}}}", arg.key), &arg.value)
    })
}

/// Lazily indexes [`CATALOG_ITEMS`] by key.
fn messages() -> &'static HashMap<&'static str, &'static str> {
    static MESSAGES: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    MESSAGES.get_or_init(|| CATALOG_ITEMS.iter().copied().collect())
}

// ============================================================================
// SECTION: Macro
// ============================================================================

/// Renders a catalog message: `t!("select.failed", error = err)`.
///
/// Each `name = value` pair fills the `{name}` placeholder with the value's
/// `Display` output.
#[macro_export]
macro_rules! t {
    ($key:literal $(, $name:ident = $value:expr )* $(,)?) => {{
        let args = ::std::vec![
            $(
                $crate::i18n::MessageArg::new(stringify!($name), $value.to_string()),
            )*
        ];
        $crate::i18n::translate($key, args)
    }};
}
