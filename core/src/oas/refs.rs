#![deny(missing_docs)]

//! # Reference Utilities
//!
//! Helpers for turning local `$ref` pointers into component names.
//!
//! Only pointers into the current document are understood; anything else is
//! reported as unresolvable and left to the caller's degradation policy.

use percent_encoding::percent_decode_str;

/// Prefix of a pointer into `components.schemas`.
pub const SCHEMA_REF_PREFIX: &str = "#/components/schemas/";

/// Prefix of a pointer into `components.parameters`.
pub const PARAMETER_REF_PREFIX: &str = "#/components/parameters/";

/// Extracts the schema name from `#/components/schemas/<Name>`.
///
/// Returns `None` for any other pointer, including deeper pointers such as
/// `#/components/schemas/User/properties/id`.
pub fn schema_ref_name(pointer: &str) -> Option<String> {
    component_name(pointer, SCHEMA_REF_PREFIX)
}

/// Extracts the parameter name from `#/components/parameters/<Name>`.
pub fn parameter_ref_name(pointer: &str) -> Option<String> {
    component_name(pointer, PARAMETER_REF_PREFIX)
}

fn component_name(pointer: &str, prefix: &str) -> Option<String> {
    let segment = pointer.strip_prefix(prefix)?;
    if segment.is_empty() || segment.contains('/') {
        return None;
    }
    Some(decode_pointer_segment(segment))
}

/// Decodes a JSON Pointer segment (handles `~1` and `~0`).
pub(crate) fn decode_pointer_segment(segment: &str) -> String {
    let decoded = segment.replace("~1", "/").replace("~0", "~");
    percent_decode_str(&decoded)
        .decode_utf8_lossy()
        .into_owned()
}
