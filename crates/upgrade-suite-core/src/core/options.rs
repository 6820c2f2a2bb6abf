// crates/upgrade-suite-core/src/core/options.rs
// ============================================================================
// Module: Upgrade Options Codec
// Description: KEY=VALUE option parsing and the upgrade options transport record.
// Purpose: Validate option shape and move selection requests across processes.
// Dependencies: serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! [`UpgradeOptions`] is the record a caller builds to request an upgrade
//! suite. It travels between processes as a JSON transport string with fixed
//! field names (`Suite`, `ToImage`, `JUnitDir`, `TestOptions`). The raw
//! `KEY=VALUE` strings are encoded as-is so the receiving side re-validates
//! them with [`parse_options`].
//!
//! ## Invariants
//! - An empty transport string decodes to the default record.
//! - A `null` field decodes to that field's default.
//! - Option keys are non-empty and unique; duplicates are rejected, never merged.
//! - Entries are checked in list order, shape before uniqueness, so the first
//!   violation in the list is the one reported.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::btree_map;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use thiserror::Error;

use crate::core::identifiers::SuiteName;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Separator between an option key and its value.
pub const OPTION_SEPARATOR: char = '=';
/// Separator between options packed into a single flag value.
pub const OPTION_LIST_SEPARATOR: char = ',';
/// Maximum accepted transport string size in bytes.
pub const MAX_TRANSPORT_BYTES: usize = 1024 * 1024;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while validating raw `KEY=VALUE` options.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OptionError {
    /// Entry has no separator or an empty key.
    #[error("test option {entry:?} is not valid, must be KEY=VALUE")]
    Malformed {
        /// Offending raw entry.
        entry: String,
    },
    /// Key appears more than once.
    #[error("option {key:?} declared twice")]
    Duplicate {
        /// Repeated key.
        key: String,
    },
}

/// Errors raised while encoding or decoding the transport string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Transport string exceeds [`MAX_TRANSPORT_BYTES`].
    #[error("upgrade options are {size} bytes (limit {limit})")]
    TooLarge {
        /// Observed size in bytes.
        size: usize,
        /// Configured limit in bytes.
        limit: usize,
    },
    /// Transport string is not a valid upgrade options record.
    #[error("invalid upgrade options: {0}")]
    Decode(String),
    /// Record could not be encoded. Not reachable for well-formed records.
    #[error("failed to encode upgrade options: {0}")]
    Encode(String),
}

// ============================================================================
// SECTION: Options Map
// ============================================================================

/// Validated option keys and values, iterated in ascending key order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OptionsMap(BTreeMap<String, String>);

impl OptionsMap {
    /// Returns the value stored for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Returns the number of options.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true when no options were supplied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates options in ascending key order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, String> {
        self.0.iter()
    }

    /// Returns the option keys in ascending order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl<'a> IntoIterator for &'a OptionsMap {
    type Item = (&'a String, &'a String);
    type IntoIter = btree_map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Parses raw `KEY=VALUE` entries into an [`OptionsMap`].
///
/// Each entry is split on its first `=`; any further `=` stays in the value.
///
/// # Errors
///
/// Returns [`OptionError::Malformed`] for an entry without `=` or with an empty
/// key, and [`OptionError::Duplicate`] when a key repeats.
pub fn parse_options<S: AsRef<str>>(raw: &[S]) -> Result<OptionsMap, OptionError> {
    let mut options = BTreeMap::new();
    for entry in raw {
        let entry = entry.as_ref();
        let Some((key, value)) = entry.split_once(OPTION_SEPARATOR) else {
            return Err(OptionError::Malformed {
                entry: entry.to_string(),
            });
        };
        if key.is_empty() {
            return Err(OptionError::Malformed {
                entry: entry.to_string(),
            });
        }
        if options.contains_key(key) {
            return Err(OptionError::Duplicate {
                key: key.to_string(),
            });
        }
        options.insert(key.to_string(), value.to_string());
    }
    Ok(OptionsMap(options))
}

/// Splits comma-separated flag values into individual option entries.
///
/// An empty flag value contributes nothing. Empty segments inside a value are
/// kept, so `a=1,,b=2` yields `["a=1", "", "b=2"]` and the empty entry is later
/// rejected by [`parse_options`].
#[must_use]
pub fn split_option_list<S: AsRef<str>>(values: &[S]) -> Vec<String> {
    values
        .iter()
        .map(AsRef::as_ref)
        .filter(|value| !value.is_empty())
        .flat_map(|value| value.split(OPTION_LIST_SEPARATOR))
        .map(str::to_string)
        .collect()
}

// ============================================================================
// SECTION: Transport Record
// ============================================================================

/// Upgrade suite request exchanged between processes.
///
/// Field names on the wire are part of the interoperability contract. Absent
/// fields and explicit `null` values both decode to the field default, which
/// is how encoders emit a request without options (`"TestOptions":null`).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UpgradeOptions {
    /// Name of the suite to select.
    #[serde(rename = "Suite", deserialize_with = "null_as_default")]
    pub suite: SuiteName,
    /// Image reference to upgrade to.
    #[serde(rename = "ToImage", deserialize_with = "null_as_default")]
    pub to_image: String,
    /// Directory for JUnit results, passed through to the runner.
    #[serde(rename = "JUnitDir", deserialize_with = "null_as_default")]
    pub junit_dir: String,
    /// Raw `KEY=VALUE` option strings in caller order.
    #[serde(rename = "TestOptions", deserialize_with = "null_as_default")]
    pub test_options: Vec<String>,
}

/// Deserializes an optional field, mapping `null` to the type default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl UpgradeOptions {
    /// Validates the raw options into an [`OptionsMap`].
    ///
    /// # Errors
    ///
    /// Returns [`OptionError`] when an entry is malformed or a key repeats.
    pub fn options_map(&self) -> Result<OptionsMap, OptionError> {
        parse_options(&self.test_options)
    }

    /// Encodes the record as a transport string.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Encode`] only if JSON encoding fails, which
    /// does not happen for this record type.
    pub fn to_transport(&self) -> Result<String, TransportError> {
        serde_json::to_string(self).map_err(|err| TransportError::Encode(err.to_string()))
    }

    /// Decodes a transport string. An empty string yields the default record.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when the input is too large or is not a
    /// valid upgrade options record.
    pub fn from_transport(value: &str) -> Result<Self, TransportError> {
        Self::from_transport_with_limit(value, MAX_TRANSPORT_BYTES)
    }

    /// Decodes a transport string, rejecting inputs above `limit` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when the input is too large or is not a
    /// valid upgrade options record.
    pub fn from_transport_with_limit(value: &str, limit: usize) -> Result<Self, TransportError> {
        if value.is_empty() {
            return Ok(Self::default());
        }
        if value.len() > limit {
            return Err(TransportError::TooLarge {
                size: value.len(),
                limit,
            });
        }
        serde_json::from_str(value).map_err(|err| TransportError::Decode(err.to_string()))
    }
}
